/// Entities: the static and movable boxes that populate a level.
///
/// Walls are plain boxes, collectibles carry a kind and a point value,
/// and anything that moves owns a `Body`. Behaviour lives elsewhere
/// (`player`, `ghost`), attached by composition rather than inheritance.

use rand::Rng;

use crate::config::FoodConfig;

use super::geom::{Direction, Rect};

/// Collectible variants.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FoodKind {
    Common,    // random 1..=10 points
    Cherry,    // fixed bonus, heals
    Blueberry, // fixed bonus, grants immunity
}

/// Special effect applied to the player on pickup.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Effect {
    None,
    Heal,
    Immunity,
}

impl FoodKind {
    pub fn effect(self) -> Effect {
        match self {
            FoodKind::Common => Effect::None,
            FoodKind::Cherry => Effect::Heal,
            FoodKind::Blueberry => Effect::Immunity,
        }
    }

    /// Point value, rolled once when the food is placed.
    pub fn roll_points(self, cfg: &FoodConfig, rng: &mut impl Rng) -> u32 {
        match self {
            FoodKind::Common => rng.random_range(cfg.common_min..=cfg.common_max.max(cfg.common_min)),
            FoodKind::Cherry => cfg.cherry_points,
            FoodKind::Blueberry => cfg.blueberry_points,
        }
    }

    /// Edge length of the collectible's box.
    pub fn size(self, cfg: &FoodConfig) -> i32 {
        match self {
            FoodKind::Common => cfg.common_size,
            FoodKind::Cherry | FoodKind::Blueberry => cfg.bonus_size,
        }
    }
}

/// Closed set of things that can appear on the play field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    Wall,
    Food(FoodKind),
    Ghost,
    Player,
}

/// Read-only placement handed to the presentation layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Entity {
    pub kind: EntityKind,
    pub rect: Rect,
}

/// Movable box: position + heading + speed (pixels per tick).
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub rect: Rect,
    pub dir: Direction,
    pub speed: i32,
}

impl Body {
    pub fn new(rect: Rect, speed: i32) -> Self {
        Body { rect, dir: Direction::None, speed }
    }

    /// Box this body would occupy after one tick along its heading.
    pub fn proposed(&self) -> Rect {
        let (dx, dy) = self.dir.delta();
        self.rect.translate(dx * self.speed, dy * self.speed)
    }

    pub fn place_at(&mut self, x: i32, y: i32) {
        self.rect.x = x;
        self.rect.y = y;
    }
}

/// A collectible sitting on the field until eaten.
#[derive(Clone, Copy, Debug)]
pub struct Food {
    pub kind: FoodKind,
    pub rect: Rect,
    pub points: u32,
}
