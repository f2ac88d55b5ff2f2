/// World: the level session and everything the frontend shows.
///
/// ## Ownership
///
/// The world exclusively owns the entity collections of the current level:
///   - `walls`  — static boxes, never mutated after `load`
///   - `foods`  — shrinks as the player eats; empty ⇔ level complete
///   - `ghosts` — movable, one per `G` tile
///
/// `load` reads the level text before touching anything, so a failed load
/// (including `LevelError::NotFound`) leaves the previous level intact.
/// Only after a successful read are the collections cleared and refilled.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::domain::entity::{Entity, EntityKind, Food};
use crate::domain::geom::Rect;
use crate::domain::ghost::{self, Ghost};
use crate::domain::player::Player;
use crate::domain::tile::TileCode;
use crate::sim::level::{self, LevelError, LevelSource};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    Paused,
    GameOver,
    GameComplete,
}

/// Read-only numbers for the HUD.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hud {
    pub score: u32,
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
    pub dead: bool,
    pub immune: bool,
    pub visible: bool,
}

pub struct World {
    // ── Config ──
    pub config: GameConfig,

    // ── Entities ──
    pub walls: Vec<Rect>,
    pub foods: Vec<Food>,
    pub ghosts: Vec<Ghost>,
    pub player: Player,

    // ── Level ──
    pub current_level: u32,
    /// Pixel box of the play field; wrap-around happens at its edges.
    pub field: Rect,
    /// Map size in tiles (for the renderer).
    pub cols: usize,
    pub rows: usize,
    /// Top-left of the player box at the spawn tile.
    pub spawn: (i32, i32),

    // ── Meta ──
    pub phase: Phase,
    pub rng: Pcg32,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl World {
    pub fn new(config: GameConfig) -> Self {
        let seed = if config.seed == 0 { rand::random() } else { config.seed };
        let player = Player::new(0, 0, &config.player);
        World {
            config,
            walls: vec![],
            foods: vec![],
            ghosts: vec![],
            player,
            current_level: 1,
            field: Rect::default(),
            cols: 0,
            rows: 0,
            spawn: (0, 0),
            phase: Phase::Title,
            rng: Pcg32::seed_from_u64(seed),
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

// ── Level session ──

impl World {
    /// Replace the current level with level `level` from `source`.
    /// Score and health carry over; the player moves to the new spawn tile.
    pub fn load(&mut self, level: u32, source: &LevelSource) -> Result<(), LevelError> {
        let rows = match source.read(level) {
            Ok(rows) => rows,
            Err(e) => {
                match &e {
                    LevelError::NotFound { .. } => log::info!("{e}"),
                    LevelError::Read { .. } => log::error!("{e}"),
                }
                return Err(e);
            }
        };

        self.clear();

        let tile = self.config.field.tile_size;
        let (cols, nrows) = level::map_extent(&rows);
        self.cols = cols;
        self.rows = nrows;
        self.field = Rect::new(0, 0, cols as i32 * tile, nrows as i32 * tile);

        let ghost_speed = self.config.ghost_speed(level);
        let mut spawn = None;

        for p in level::parse_map(&rows) {
            match p.code {
                TileCode::Wall => self.walls.push(p.tile_box(tile)),
                TileCode::PlayerSpawn => {
                    if spawn.is_none() {
                        let r = p.centred_box(tile, self.config.player.size);
                        spawn = Some((r.x, r.y));
                    }
                }
                TileCode::Food(kind) => {
                    let rect = p.centred_box(tile, kind.size(&self.config.food));
                    let points = kind.roll_points(&self.config.food, &mut self.rng);
                    self.foods.push(Food { kind, rect, points });
                }
                TileCode::GhostSpawn => {
                    let rect = p.centred_box(tile, self.config.ghost.size);
                    let heading = ghost::random_direction(&mut self.rng);
                    self.ghosts.push(Ghost::new(rect, ghost_speed, heading));
                }
            }
        }

        match spawn {
            Some((x, y)) => {
                self.spawn = (x, y);
                self.player.place_at_spawn(x, y);
            }
            None => log::warn!("level {level} has no player spawn; keeping previous position"),
        }

        self.current_level = level;
        log::info!(
            "level {level} loaded: {} walls, {} food, {} ghosts (speed {ghost_speed})",
            self.walls.len(), self.foods.len(), self.ghosts.len(),
        );
        Ok(())
    }

    /// Level complete ⇔ nothing left to eat.
    pub fn is_completed(&self) -> bool {
        self.foods.is_empty()
    }

    /// Full game restart: empty the level, zero the score, back to level 1.
    /// The caller reloads.
    pub fn restart(&mut self) {
        self.clear();
        let (x, y) = self.spawn;
        self.player.restart(x, y);
        self.current_level = 1;
        log::info!("game restarted");
    }

    fn clear(&mut self) {
        self.walls.clear();
        self.foods.clear();
        self.ghosts.clear();
    }
}

// ── Presentation snapshots ──

impl World {
    /// Everything drawable, walls first and the player last. The player is
    /// omitted while the immunity blink hides it.
    pub fn sprites(&self) -> impl Iterator<Item = Entity> + '_ {
        let walls = self.walls.iter().map(|&rect| Entity { kind: EntityKind::Wall, rect });
        let foods = self.foods.iter().map(|f| Entity { kind: EntityKind::Food(f.kind), rect: f.rect });
        let ghosts = self.ghosts.iter().map(|g| Entity { kind: EntityKind::Ghost, rect: g.rect() });
        let player = (self.player.visible || self.player.dead)
            .then(|| Entity { kind: EntityKind::Player, rect: self.player.rect() });
        walls.chain(foods).chain(ghosts).chain(player)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.player.score,
            level: self.current_level,
            health: self.player.health,
            max_health: self.player.max_health,
            dead: self.player.dead,
            immune: self.player.immune,
            visible: self.player.visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::FoodKind;

    fn seeded() -> World {
        let mut cfg = GameConfig::default();
        cfg.seed = 1234;
        World::new(cfg)
    }

    fn source(levels: &[&[&str]]) -> LevelSource {
        LevelSource::Memory(
            levels.iter()
                .map(|rows| rows.iter().map(|r| r.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn load_single_row_map() {
        let mut w = seeded();
        w.load(1, &source(&[&["===P*==="]])).unwrap();

        assert_eq!(w.walls.len(), 6);
        assert_eq!(w.foods.len(), 1);
        assert_eq!(w.foods[0].kind, FoodKind::Common);
        assert_eq!(w.foods[0].rect, Rect::square(4 * 40 + 12, 12, 16));
        assert!((1..=10).contains(&w.foods[0].points));
        // Spawn tile: column 3, row 0, player centred.
        assert_eq!(w.spawn, (3 * 40 + 4, 4));
        assert_eq!((w.player.rect().x, w.player.rect().y), w.spawn);
        assert_eq!(w.field, Rect::new(0, 0, 320, 40));
        assert!(!w.is_completed());
    }

    #[test]
    fn bonus_food_and_ghosts() {
        let mut w = seeded();
        w.load(3, &source(&[&["P"], &["P"], &["=CSG=", "= G P"]])).unwrap();
        assert_eq!(w.current_level, 3);
        let kinds: Vec<_> = w.foods.iter().map(|f| (f.kind, f.points)).collect();
        assert_eq!(kinds, vec![(FoodKind::Cherry, 100), (FoodKind::Blueberry, 300)]);
        assert_eq!(w.ghosts.len(), 2);
        // Level 3 ghosts are one step faster than the base speed.
        assert!(w.ghosts.iter().all(|g| g.body.speed == 3));
        assert!(w.ghosts.iter().all(|g| !g.body.dir.is_none()));
    }

    #[test]
    fn only_first_spawn_is_honoured() {
        let mut w = seeded();
        w.load(1, &source(&[&["P  P", "*"]])).unwrap();
        assert_eq!(w.spawn, (4, 4));
    }

    #[test]
    fn missing_level_leaves_collections_untouched() {
        let mut w = seeded();
        let src = source(&[&["=G=P**"]]);
        w.load(1, &src).unwrap();
        let (walls, foods, ghosts) = (w.walls.clone(), w.foods.len(), w.ghosts.len());

        let err = w.load(2, &src).unwrap_err();
        assert!(matches!(err, LevelError::NotFound { level: 2 }));
        assert_eq!(w.walls, walls);
        assert_eq!(w.foods.len(), foods);
        assert_eq!(w.ghosts.len(), ghosts);
        assert_eq!(w.current_level, 1);
    }

    #[test]
    fn map_without_spawn_keeps_player_position() {
        let mut w = seeded();
        let src = source(&[&["=P*"], &["=**"]]);
        w.load(1, &src).unwrap();
        let before = w.player.rect();
        w.load(2, &src).unwrap();
        assert_eq!(w.player.rect(), before);
    }

    #[test]
    fn reload_replaces_previous_level() {
        let mut w = seeded();
        let src = source(&[&["====P*G"], &["=P*"]]);
        w.load(1, &src).unwrap();
        w.load(2, &src).unwrap();
        assert_eq!(w.walls.len(), 1);
        assert_eq!(w.foods.len(), 1);
        assert!(w.ghosts.is_empty());
    }

    #[test]
    fn health_and_score_carry_over_to_next_level() {
        let mut w = seeded();
        let src = source(&[&["=P*G"], &["==*", "P *"]]);
        w.load(1, &src).unwrap();
        w.player.score = 17;
        assert!(w.player.take_damage(0));

        w.load(2, &src).unwrap();
        assert_eq!(w.current_level, 2);
        assert_eq!(w.player.health, w.player.max_health - 1);
        assert!(w.player.immune);
        assert_eq!(w.player.score, 17);
        assert_eq!((w.player.rect().x, w.player.rect().y), (4, 44));
        assert_eq!(w.spawn, (4, 44));
    }

    #[test]
    fn restart_empties_and_zeroes_score() {
        let mut w = seeded();
        w.load(2, &source(&[&["P*"], &["=P*G"]])).unwrap();
        w.player.score = 42;
        w.restart();
        assert!(w.walls.is_empty() && w.foods.is_empty() && w.ghosts.is_empty());
        assert_eq!(w.player.score, 0);
        assert_eq!(w.current_level, 1);
        assert!(w.is_completed());
    }

    #[test]
    fn sprites_hide_blinking_player() {
        let mut w = seeded();
        w.load(1, &source(&[&["=P*G"]])).unwrap();
        assert_eq!(w.sprites().count(), 4);
        w.player.visible = false;
        assert!(w.sprites().all(|e| e.kind != EntityKind::Player));
        assert_eq!(w.hud().health, 3);
    }
}
