/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and messages.

use crate::domain::entity::FoodKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// Raised by the frontend after a successful `World::load`.
    LevelLoaded { level: u32 },
    FoodEaten { kind: FoodKind, points: u32 },
    PlayerHit { health: u32 },
    PlayerHealed { health: u32 },
    ImmunityGranted,
    PlayerKilled,
    LevelCleared { level: u32 },
}
