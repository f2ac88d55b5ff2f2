/// Collision resolver — single source of truth for movement.
///
/// ## Model
///
/// One candidate box per tick: the body's box translated by
/// `direction * speed` on both axes at once. If that box overlaps any wall
/// the move is rejected and the body stays put; otherwise it is taken.
/// There is no swept test, so a body faster than a wall is thick can
/// tunnel through it between two ticks.
///
/// After the move (accepted or not) the box wraps around the play field:
/// leaving one edge by more than `margin` re-enters from the opposite edge,
/// independently per axis. The field is a torus, not a clamp.

use super::entity::Body;
use super::geom::Rect;

// ══════════════════════════════════════════════════════════════
// Move and block
// ══════════════════════════════════════════════════════════════

/// Does `rect` overlap any wall?
#[inline]
pub fn blocked(rect: Rect, walls: &[Rect]) -> bool {
    walls.iter().any(|w| w.intersects(rect))
}

/// Advance `body` one step unless the proposed box hits a wall.
/// Returns true if the body moved.
pub fn try_move(body: &mut Body, walls: &[Rect]) -> bool {
    if body.dir.is_none() || body.speed == 0 {
        return false;
    }
    let proposed = body.proposed();
    if blocked(proposed, walls) {
        return false;
    }
    body.rect = proposed;
    true
}

// ══════════════════════════════════════════════════════════════
// Wrap around
// ══════════════════════════════════════════════════════════════

/// Teleport a box that has left `field` by more than `margin` to the
/// opposite side, so that its trailing edge sits `margin` inside the field.
pub fn wrap_around(rect: &mut Rect, field: Rect, margin: i32) {
    if rect.x > field.right() - margin {
        rect.x = field.x + margin - rect.w;
    } else if rect.right() < field.x + margin {
        rect.x = field.right() - margin;
    }

    if rect.y > field.bottom() - margin {
        rect.y = field.y + margin - rect.h;
    } else if rect.bottom() < field.y + margin {
        rect.y = field.bottom() - margin;
    }
}

/// Full per-tick movement: collision first, then wrap.
pub fn move_body(body: &mut Body, walls: &[Rect], field: Rect, margin: i32) -> bool {
    let moved = try_move(body, walls);
    wrap_around(&mut body.rect, field, margin);
    moved
}

// ══════════════════════════════════════════════════════════════
// Broad-phase overlap queries between dynamic entities
// ══════════════════════════════════════════════════════════════

/// Indices of every box in `others` that overlaps `rect`, ascending.
pub fn overlapping<I>(rect: Rect, others: I) -> Vec<usize>
where
    I: IntoIterator<Item = Rect>,
{
    others.into_iter()
        .enumerate()
        .filter(|(_, r)| r.intersects(rect))
        .map(|(i, _)| i)
        .collect()
}

/// Does `rect` overlap any of `others`?
pub fn any_overlap<I>(rect: Rect, others: I) -> bool
where
    I: IntoIterator<Item = Rect>,
{
    others.into_iter().any(|r| r.intersects(rect))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geom::Direction;
    use proptest::prelude::*;

    const FIELD: Rect = Rect::new(0, 0, 400, 400);

    fn body_at(x: i32, y: i32, dir: Direction, speed: i32) -> Body {
        let mut b = Body::new(Rect::square(x, y, 32), speed);
        b.dir = dir;
        b
    }

    // ── try_move ──

    #[test]
    fn free_move_is_taken() {
        let mut b = body_at(100, 100, Direction::Right, 3);
        assert!(try_move(&mut b, &[]));
        assert_eq!(b.rect, Rect::square(103, 100, 32));
    }

    #[test]
    fn wall_blocks_whole_move() {
        let wall = Rect::square(134, 100, 40);
        let mut b = body_at(100, 100, Direction::Right, 3);
        assert!(!try_move(&mut b, &[wall]));
        assert_eq!(b.rect, Rect::square(100, 100, 32));
    }

    #[test]
    fn touching_wall_is_not_a_collision() {
        // Right edge ends exactly on the wall's left edge.
        let wall = Rect::square(135, 100, 40);
        let mut b = body_at(100, 100, Direction::Right, 3);
        assert!(try_move(&mut b, &[wall]));
        assert_eq!(b.rect.right(), wall.x);
    }

    #[test]
    fn idle_body_does_not_move() {
        let mut b = body_at(100, 100, Direction::None, 3);
        assert!(!try_move(&mut b, &[]));
        assert_eq!(b.rect.x, 100);
    }

    #[test]
    fn fast_body_tunnels_through_thin_wall() {
        // Single-step model: the candidate box lands past the wall.
        let wall = Rect::new(140, 100, 4, 40);
        let mut b = body_at(100, 100, Direction::Right, 50);
        assert!(try_move(&mut b, &[wall]));
        assert!(b.rect.x > wall.right());
    }

    // ── wrap_around ──

    #[test]
    fn wrap_right_edge_reappears_left() {
        let mut b = body_at(370, 100, Direction::Right, 3);
        let mut wrapped = false;
        for _ in 0..20 {
            let before = b.rect.x;
            move_body(&mut b, &[], FIELD, 10);
            if b.rect.x < before {
                wrapped = true;
                break;
            }
        }
        assert!(wrapped);
        assert_eq!(b.rect.right(), 10);

        // Keeps moving right from the left side without re-wrapping.
        move_body(&mut b, &[], FIELD, 10);
        assert_eq!(b.rect.right(), 13);
    }

    #[test]
    fn wrap_left_edge_reappears_right() {
        let mut r = Rect::square(-30, 50, 32); // right = 2 < margin
        wrap_around(&mut r, FIELD, 10);
        assert_eq!(r.x, 390);
        assert_eq!(r.y, 50);
    }

    #[test]
    fn wrap_vertical_independent_of_horizontal() {
        let mut r = Rect::square(100, 395, 32);
        wrap_around(&mut r, FIELD, 10);
        assert_eq!(r.x, 100);
        assert_eq!(r.bottom(), 10);

        let mut r = Rect::square(100, -25, 32); // bottom = 7
        wrap_around(&mut r, FIELD, 10);
        assert_eq!(r.y, 390);
    }

    #[test]
    fn inside_field_is_untouched() {
        let mut r = Rect::square(0, 0, 32);
        wrap_around(&mut r, FIELD, 10);
        assert_eq!(r, Rect::square(0, 0, 32));
        let mut r = Rect::square(368, 368, 32);
        wrap_around(&mut r, FIELD, 10);
        assert_eq!(r, Rect::square(368, 368, 32));
    }

    #[test]
    fn wrap_runs_after_rejected_move() {
        let wall = Rect::square(380, 100, 40);
        let mut b = body_at(395, 100, Direction::Left, 3);
        b.rect.x = 395; // overlapping the wall already; left shift still overlaps
        assert!(!move_body(&mut b, &[wall], FIELD, 10));
        assert_eq!(b.rect.right(), 10);
    }

    // ── overlap queries ──

    #[test]
    fn overlapping_reports_indices_in_order() {
        let me = Rect::square(0, 0, 20);
        let others = [
            Rect::square(50, 50, 5),
            Rect::square(10, 10, 5),
            Rect::square(19, 0, 5),
            Rect::square(20, 0, 5),
        ];
        assert_eq!(overlapping(me, others), vec![1, 2]);
        assert!(any_overlap(me, others));
        assert!(!any_overlap(me, [Rect::square(20, 20, 5)]));
    }

    // ── invariants ──

    fn dir_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::None),
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn accepted_move_never_overlaps_a_wall(
            x in 0i32..400,
            y in 0i32..400,
            speed in 1i32..8,
            dir in dir_strategy(),
            cells in proptest::collection::vec((0i32..10, 0i32..10), 0..30),
        ) {
            let walls: Vec<Rect> = cells.iter()
                .map(|&(c, r)| Rect::square(c * 40, r * 40, 40))
                .collect();
            let mut b = body_at(x, y, dir, speed);
            let before = b.rect;
            if try_move(&mut b, &walls) {
                prop_assert!(!blocked(b.rect, &walls));
            } else {
                prop_assert_eq!(b.rect, before);
            }
        }

        #[test]
        fn wrap_reenters_at_opposite_margin(x in -500i32..900, y in -500i32..900) {
            let mut r = Rect::square(x, y, 32);
            wrap_around(&mut r, FIELD, 10);

            if x > FIELD.right() - 10 {
                prop_assert_eq!(r.right(), 10);
            } else if x + 32 < 10 {
                prop_assert_eq!(r.x, FIELD.right() - 10);
            } else {
                prop_assert_eq!(r.x, x);
            }

            if y > FIELD.bottom() - 10 {
                prop_assert_eq!(r.bottom(), 10);
            } else if y + 32 < 10 {
                prop_assert_eq!(r.y, FIELD.bottom() - 10);
            } else {
                prop_assert_eq!(r.y, y);
            }
        }
    }
}
