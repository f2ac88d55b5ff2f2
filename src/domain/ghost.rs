/// Ghost AI — random wandering plus greedy pursuit inside a sight cone.
///
/// Each tick:
///   1. With a small probability, pick a uniformly random cardinal heading.
///   2. Build the sight rectangle: the ghost's box inflated by the sight
///      distance, pushed forward so its near edge is the ghost's leading edge.
///   3. If the player's box touches the sight rectangle, head along the axis
///      with the larger gap to the player (no pathfinding, walls ignored).
///
/// Movement itself is the caller's job (physics::move_body), which is
/// the only thing that can stop a ghost from following the chosen heading.

use rand::Rng;

use super::entity::Body;
use super::geom::{Direction, Rect};

#[derive(Clone, Debug)]
pub struct Ghost {
    pub body: Body,
}

impl Ghost {
    pub fn new(rect: Rect, speed: i32, heading: Direction) -> Self {
        let mut body = Body::new(rect, speed);
        body.dir = heading;
        Ghost { body }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    /// Forward-biased detection zone. The axis perpendicular to travel stays
    /// symmetric; an idle ghost looks all around.
    pub fn sight_rect(&self, distance: i32) -> Rect {
        let r = self.body.rect;
        let s = r.inflate(distance, distance);
        match self.body.dir {
            Direction::Right => Rect { x: r.right(), ..s },
            Direction::Left => Rect { x: r.x - s.w, ..s },
            Direction::Down => Rect { y: r.bottom(), ..s },
            Direction::Up => Rect { y: r.y - s.h, ..s },
            Direction::None => s,
        }
    }

    /// Pick a new heading for this tick. Returns true if the player was seen.
    pub fn think(&mut self, player: Rect, turn_chance: f64, sight_distance: i32, rng: &mut impl Rng) -> bool {
        if turn_chance > 0.0 && rng.random_bool(turn_chance.min(1.0)) {
            self.body.dir = random_direction(rng);
        }

        if !self.sight_rect(sight_distance).intersects(player) {
            return false;
        }
        let chase = pursuit_direction(self.body.rect, player);
        if !chase.is_none() {
            self.body.dir = chase;
        }
        true
    }
}

/// Uniform choice among the four cardinal directions.
pub fn random_direction(rng: &mut impl Rng) -> Direction {
    Direction::CARDINALS[rng.random_range(0..Direction::CARDINALS.len())]
}

/// Greedy step toward `to`: along whichever axis has the larger centre-to-centre
/// gap, signed toward the target. Ties go horizontal.
pub fn pursuit_direction(from: Rect, to: Rect) -> Direction {
    let (fx, fy) = from.center();
    let (tx, ty) = to.center();
    let (dx, dy) = (tx - fx, ty - fy);
    if dx == 0 && dy == 0 {
        Direction::None
    } else if dx.abs() >= dy.abs() {
        Direction::horizontal(dx)
    } else {
        Direction::vertical(dy)
    }
}
