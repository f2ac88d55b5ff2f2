/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Direction input
///   2. Death check (health 0 → Dead; a dead player freezes the level)
///   3. Timer updates (immunity expiry, blink)
///   4. Player movement (collision + wrap)
///   5. Ghost contact (damage)
///   6. Food pickup (score + effect)
///   7. Ghost thinking and movement
///   8. Win check
///
/// `now` is the caller's clock in milliseconds. Nothing here reads the
/// wall clock, so a step is deterministic given `now` and the world's RNG.

use crate::domain::entity::Effect;
use crate::domain::geom::Direction;
use crate::domain::physics;
use super::event::GameEvent;
use super::world::{Phase, World};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, input: Option<Direction>, now: u64) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();

    if let Some(dir) = input {
        world.player.handle_direction_input(dir);
    }

    if resolve_player_death(world, now, &mut events) { return events; }
    resolve_timers(world, now);
    resolve_player_movement(world);
    resolve_ghost_contact(world, now, &mut events);
    resolve_food_pickup(world, now, &mut events);
    resolve_ghost_movement(world);
    resolve_win(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Returns true while the player is dead; the caller owns what happens next.
fn resolve_player_death(world: &mut World, now: u64, events: &mut Vec<GameEvent>) -> bool {
    if world.player.dead { return true; }
    if world.player.health > 0 { return false; }

    if world.player.die(now) {
        log::info!("player died on level {} with score {}", world.current_level, world.player.score);
        events.push(GameEvent::PlayerKilled);
    }
    true
}

fn resolve_timers(world: &mut World, now: u64) {
    world.player.tick_timers(now);
}

fn resolve_player_movement(world: &mut World) {
    let margin = world.config.field.wrap_margin;
    physics::move_body(&mut world.player.body, &world.walls, world.field, margin);
}

fn resolve_ghost_contact(world: &mut World, now: u64, events: &mut Vec<GameEvent>) {
    let ghost_boxes = world.ghosts.iter().map(|g| g.rect());
    if !physics::any_overlap(world.player.rect(), ghost_boxes) { return; }

    if world.player.take_damage(now) {
        log::debug!("player hit, health {}", world.player.health);
        events.push(GameEvent::PlayerHit { health: world.player.health });
    }
}

/// Every overlapped food is eaten this tick, in collection order.
fn resolve_food_pickup(world: &mut World, now: u64, events: &mut Vec<GameEvent>) {
    let food_boxes = world.foods.iter().map(|f| f.rect);
    let hits = physics::overlapping(world.player.rect(), food_boxes);

    for &i in hits.iter().rev() {
        let food = world.foods.remove(i);
        let effect = world.player.eat(&food, now);
        events.push(GameEvent::FoodEaten { kind: food.kind, points: food.points });
        match effect {
            Effect::Heal => events.push(GameEvent::PlayerHealed { health: world.player.health }),
            Effect::Immunity => events.push(GameEvent::ImmunityGranted),
            Effect::None => {}
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Ghosts
// ══════════════════════════════════════════════════════════════

fn resolve_ghost_movement(world: &mut World) {
    let target = world.player.rect();
    let turn_chance = world.config.ghost.turn_chance;
    let sight = world.config.ghost.sight_distance;
    let margin = world.config.field.wrap_margin;

    for ghost in world.ghosts.iter_mut() {
        ghost.think(target, turn_chance, sight, &mut world.rng);
        physics::move_body(&mut ghost.body, &world.walls, world.field, margin);
    }
}

// ══════════════════════════════════════════════════════════════
// Win
// ══════════════════════════════════════════════════════════════

/// Fires on every live tick of a completed level, including one that was
/// loaded without food. The caller moves on to the next level or ends the game.
fn resolve_win(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.is_completed() {
        log::info!("level {} cleared, score {}", world.current_level, world.player.score);
        events.push(GameEvent::LevelCleared { level: world.current_level });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::FoodKind;
    use crate::domain::geom::Rect;
    use crate::sim::level::LevelSource;

    fn world_with(rows: &[&str]) -> World {
        let mut cfg = GameConfig::default();
        cfg.seed = 99;
        cfg.ghost.turn_chance = 0.0;
        let mut w = World::new(cfg);
        let src = LevelSource::Memory(vec![rows.iter().map(|r| r.to_string()).collect()]);
        w.load(1, &src).unwrap();
        w.phase = Phase::Playing;
        w
    }

    #[test]
    fn not_playing_is_a_no_op() {
        let mut w = world_with(&["P*"]);
        w.phase = Phase::Paused;
        assert!(step(&mut w, Some(Direction::Right), 0).is_empty());
        assert_eq!(w.player.body.dir, Direction::None);
    }

    #[test]
    fn walking_into_food_scores_and_clears_level() {
        let mut w = world_with(&["=P*="]);
        let mut events = vec![];
        let mut now = 0;
        for _ in 0..10 {
            events = step(&mut w, Some(Direction::Right), now);
            now += 16;
            if !events.is_empty() { break; }
        }
        let [GameEvent::FoodEaten { kind: FoodKind::Common, points }, GameEvent::LevelCleared { level: 1 }] =
            events.as_slice()
        else {
            panic!("unexpected events: {events:?}");
        };
        assert_eq!(w.player.score, *points);
        assert!(w.is_completed());
    }

    #[test]
    fn level_without_food_is_cleared_on_first_tick() {
        let mut w = world_with(&["=P  ="]);
        assert!(w.is_completed());
        let ev = step(&mut w, Some(Direction::Right), 0);
        assert_eq!(ev, vec![GameEvent::LevelCleared { level: 1 }]);
    }

    #[test]
    fn dead_player_on_empty_level_is_not_cleared() {
        let mut w = world_with(&["=P  ="]);
        w.player.health = 0;
        assert_eq!(step(&mut w, None, 0), vec![GameEvent::PlayerKilled]);
        assert!(step(&mut w, None, 16).is_empty());
    }

    #[test]
    fn wall_stops_the_player() {
        let mut w = world_with(&["=P=", " * "]);
        let start = w.player.rect();
        for t in 0..20 {
            step(&mut w, Some(Direction::Right), t * 16);
        }
        // 4px gap on each side of a 32px player in a 40px tile.
        assert_eq!(w.player.rect().x, start.x + 3);
        assert!(!physics::blocked(w.player.rect(), &w.walls));
    }

    #[test]
    fn ghost_contact_damages_once_per_immunity() {
        let mut w = world_with(&["PG*"]);
        w.ghosts[0].body.dir = Direction::None;
        w.ghosts[0].body.speed = 0;
        w.player.body.place_at(w.ghosts[0].rect().x - 10, w.player.rect().y);

        let ev = step(&mut w, None, 1000);
        assert_eq!(ev, vec![GameEvent::PlayerHit { health: 2 }]);
        assert!(step(&mut w, None, 1016).is_empty());
        assert_eq!(w.player.health, 2);

        // Still overlapping once immunity has run out: hit again.
        let ev = step(&mut w, None, 4000);
        assert_eq!(ev, vec![GameEvent::PlayerHit { health: 1 }]);
    }

    #[test]
    fn zero_health_kills_and_freezes() {
        let mut w = world_with(&["P G*"]);
        w.player.health = 0;
        let ghost_before = w.ghosts[0].rect();

        assert_eq!(step(&mut w, Some(Direction::Right), 500), vec![GameEvent::PlayerKilled]);
        assert!(w.player.dead);
        assert!(step(&mut w, Some(Direction::Right), 516).is_empty());
        assert_eq!(w.ghosts[0].rect(), ghost_before);
        assert_eq!(w.player.time_since_death(3500), 3000);
    }

    #[test]
    fn bonus_food_effects_are_reported() {
        let mut w = world_with(&["PC", " S", " *"]);
        w.player.health = 2;
        let cherry = w.foods[0].rect;
        w.player.body.place_at(cherry.x, cherry.y);

        let ev = step(&mut w, None, 0);
        assert_eq!(ev, vec![
            GameEvent::FoodEaten { kind: FoodKind::Cherry, points: 100 },
            GameEvent::PlayerHealed { health: 3 },
        ]);

        let berry = w.foods[0].rect;
        w.player.body.place_at(berry.x, berry.y);
        let ev = step(&mut w, None, 16);
        assert_eq!(ev, vec![
            GameEvent::FoodEaten { kind: FoodKind::Blueberry, points: 300 },
            GameEvent::ImmunityGranted,
        ]);
        assert!(w.player.immune);
        assert_eq!(w.player.score, 400);
    }

    #[test]
    fn ghost_chases_visible_player() {
        let mut w = world_with(&["P  G", "   *"]);
        w.ghosts[0].body.dir = Direction::Left;
        let x0 = w.ghosts[0].rect().x;
        step(&mut w, None, 0);
        assert_eq!(w.ghosts[0].body.dir, Direction::Left);
        assert_eq!(w.ghosts[0].rect().x, x0 - w.ghosts[0].body.speed);
    }

    #[test]
    fn player_wraps_at_field_edge() {
        let mut w = world_with(&["P  ", "  *"]);
        let mut wrapped_at = None;
        for t in 0..40 {
            let before = w.player.rect().x;
            step(&mut w, Some(Direction::Left), t * 16);
            if w.player.rect().x > before {
                wrapped_at = Some(w.player.rect().x);
                break;
            }
        }
        // Re-enters with its left edge `margin` inside the right border.
        assert_eq!(wrapped_at, Some(w.field.right() - w.config.field.wrap_margin));
    }

    #[test]
    fn deterministic_for_a_fixed_seed() {
        let run = || {
            let mut w = world_with(&["P    G", "  **  ", "G    *"]);
            w.config.ghost.turn_chance = 0.2;
            for t in 0..200 {
                step(&mut w, None, t * 16);
            }
            w.ghosts.iter().map(|g| g.rect()).collect::<Vec<Rect>>()
        };
        assert_eq!(run(), run());
    }
}
