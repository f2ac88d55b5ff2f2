/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// The result is immutable for the lifetime of the process and handed by
/// reference to whatever needs tile sizes, speeds or durations.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub levels_dir: PathBuf,
    pub tick_rate_ms: u64,
    pub debug: bool,
    /// RNG seed; 0 means "seed from entropy".
    pub seed: u64,
    pub field: FieldConfig,
    pub player: PlayerConfig,
    pub ghost: GhostConfig,
    pub food: FoodConfig,
    pub sound: SoundConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct FieldConfig {
    #[serde(default = "default_tile_size")]
    pub tile_size: i32,
    /// How far a box may leave the field before it wraps to the other side.
    #[serde(default = "default_wrap_margin")]
    pub wrap_margin: i32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PlayerConfig {
    #[serde(default = "default_player_size")]
    pub size: i32,
    #[serde(default = "default_player_speed")]
    pub speed: i32,
    #[serde(default = "default_max_health")]
    pub max_health: u32,
    #[serde(default = "default_immunity_ms")]
    pub immunity_ms: u64,
    #[serde(default = "default_blink_ms")]
    pub blink_ms: u64,
    /// Delay between death and the game-over notification.
    #[serde(default = "default_death_grace_ms")]
    pub death_grace_ms: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GhostConfig {
    #[serde(default = "default_ghost_size")]
    pub size: i32,
    #[serde(default = "default_ghost_base_speed")]
    pub base_speed: i32,
    /// Ghosts gain +1 speed every this many levels.
    #[serde(default = "default_levels_per_speed_step")]
    pub levels_per_speed_step: u32,
    #[serde(default = "default_ghost_max_speed")]
    pub max_speed: i32,
    /// Per-tick probability of picking a new random heading.
    #[serde(default = "default_turn_chance")]
    pub turn_chance: f64,
    #[serde(default = "default_sight_distance")]
    pub sight_distance: i32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct FoodConfig {
    #[serde(default = "default_common_min")]
    pub common_min: u32,
    #[serde(default = "default_common_max")]
    pub common_max: u32,
    #[serde(default = "default_common_size")]
    pub common_size: i32,
    #[serde(default = "default_bonus_size")]
    pub bonus_size: i32,
    #[serde(default = "default_cherry_points")]
    pub cherry_points: u32,
    #[serde(default = "default_blueberry_points")]
    pub blueberry_points: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SoundConfig {
    #[serde(default = "default_sound_enabled")]
    pub enabled: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GamepadConfig {
    #[serde(default = "default_confirm")]
    pub confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    pub cancel: Vec<String>,
    #[serde(default = "default_pause")]
    pub pause: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    field: FieldConfig,
    #[serde(default)]
    player: PlayerConfig,
    #[serde(default)]
    ghost: GhostConfig,
    #[serde(default)]
    food: FoodConfig,
    #[serde(default)]
    sound: SoundConfig,
    #[serde(default)]
    gamepad: GamepadConfig,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    seed: u64,
}

// ── Defaults ──

fn default_levels_dir() -> String { "levels".to_string() }
fn default_tick_rate() -> u64 { 16 }    // ~60 fps, the original frame rate

fn default_tile_size() -> i32 { 40 }
fn default_wrap_margin() -> i32 { 10 }

fn default_player_size() -> i32 { 32 }
fn default_player_speed() -> i32 { 3 }
fn default_max_health() -> u32 { 3 }
fn default_immunity_ms() -> u64 { 3000 }
fn default_blink_ms() -> u64 { 200 }
fn default_death_grace_ms() -> u64 { 3000 }  // length of the explosion animation

fn default_ghost_size() -> i32 { 32 }
fn default_ghost_base_speed() -> i32 { 2 }
fn default_levels_per_speed_step() -> u32 { 2 }
fn default_ghost_max_speed() -> i32 { 4 }
fn default_turn_chance() -> f64 { 0.01 }
fn default_sight_distance() -> i32 { 120 }

fn default_common_min() -> u32 { 1 }
fn default_common_max() -> u32 { 10 }
fn default_common_size() -> i32 { 16 }
fn default_bonus_size() -> i32 { 32 }
fn default_cherry_points() -> u32 { 100 }
fn default_blueberry_points() -> u32 { 300 }

fn default_sound_enabled() -> bool { true }

fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_pause() -> Vec<String> { vec!["Y".into()] }

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            tile_size: default_tile_size(),
            wrap_margin: default_wrap_margin(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            size: default_player_size(),
            speed: default_player_speed(),
            max_health: default_max_health(),
            immunity_ms: default_immunity_ms(),
            blink_ms: default_blink_ms(),
            death_grace_ms: default_death_grace_ms(),
        }
    }
}

impl Default for GhostConfig {
    fn default() -> Self {
        GhostConfig {
            size: default_ghost_size(),
            base_speed: default_ghost_base_speed(),
            levels_per_speed_step: default_levels_per_speed_step(),
            max_speed: default_ghost_max_speed(),
            turn_chance: default_turn_chance(),
            sight_distance: default_sight_distance(),
        }
    }
}

impl Default for FoodConfig {
    fn default() -> Self {
        FoodConfig {
            common_min: default_common_min(),
            common_max: default_common_max(),
            common_size: default_common_size(),
            bonus_size: default_bonus_size(),
            cherry_points: default_cherry_points(),
            blueberry_points: default_blueberry_points(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        SoundConfig { enabled: default_sound_enabled() }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            confirm: default_confirm(),
            cancel: default_cancel(),
            pause: default_pause(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            tick_rate_ms: default_tick_rate(),
            debug: false,
            seed: 0,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly (no filesystem search).
    #[cfg(test)]
    pub fn parse_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            levels_dir,
            tick_rate_ms: toml_cfg.general.tick_rate_ms.max(1),
            debug: toml_cfg.general.debug,
            seed: toml_cfg.general.seed,
            field: toml_cfg.field,
            player: toml_cfg.player,
            ghost: toml_cfg.ghost,
            food: toml_cfg.food,
            sound: toml_cfg.sound,
            gamepad: toml_cfg.gamepad,
        }
    }

    /// Ghost speed for a level: base plus one per `levels_per_speed_step`
    /// levels, capped at `max_speed`.
    pub fn ghost_speed(&self, level: u32) -> i32 {
        let g = &self.ghost;
        let step = g.levels_per_speed_step.max(1);
        let bonus = (level.saturating_sub(1) / step) as i32;
        (g.base_speed + bonus).min(g.max_speed.max(g.base_speed))
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        log::info!("loaded {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    log::info!("no config.toml found, using defaults");
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::parse_str("").unwrap();
        assert_eq!(cfg.field.tile_size, 40);
        assert_eq!(cfg.player.max_health, 3);
        assert_eq!(cfg.player.immunity_ms, 3000);
        assert_eq!(cfg.player.blink_ms, 200);
        assert_eq!(cfg.food.cherry_points, 100);
        assert_eq!(cfg.food.blueberry_points, 300);
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse_str(
            "[player]\nspeed = 5\n[general]\nseed = 42\ndebug = true\n",
        ).unwrap();
        assert_eq!(cfg.player.speed, 5);
        assert_eq!(cfg.player.size, 32);
        assert_eq!(cfg.seed, 42);
        assert!(cfg.debug);
        assert_eq!(cfg.ghost.turn_chance, 0.01);
    }

    #[test]
    fn bad_types_are_rejected() {
        assert!(GameConfig::parse_str("[player]\nspeed = \"fast\"\n").is_err());
    }

    #[test]
    fn ghost_speed_scales_with_level_and_caps() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.ghost_speed(1), 2);
        assert_eq!(cfg.ghost_speed(2), 2);
        assert_eq!(cfg.ghost_speed(3), 3);
        assert_eq!(cfg.ghost_speed(5), 4);
        assert_eq!(cfg.ghost_speed(99), 4);
    }
}
