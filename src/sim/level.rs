/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory — level `n` lives in `{levels_dir}/{n}.txt`
///   2. Built-in levels compiled into the binary
///
/// A missing level is not an error the game retries: it means "no more
/// levels" and the caller ends the run.
///
/// ## Tile legend:
///   '=' = Wall                  'P' = Player spawn (first one wins)
///   '*' = Food (1-10 points)    'G' = Ghost spawn
///   'C' = Cherry (heals)        'S' = Blueberry (immunity)
///   anything else = empty floor
///
/// Rows may have different lengths; a short row simply yields fewer tiles.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::GameConfig;
use crate::domain::geom::Rect;
use crate::domain::tile::TileCode;

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// No resource backs this level number.
    #[error("level {level} not found")]
    NotFound { level: u32 },

    /// The resource exists but could not be read.
    #[error("failed to read level {level}: {source}")]
    Read {
        level: u32,
        #[source]
        source: io::Error,
    },
}

/// One non-blank map character, decoded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placement {
    pub code: TileCode,
    pub col: usize,
    pub row: usize,
}

impl Placement {
    /// Pixel box of the whole tile.
    pub fn tile_box(&self, tile: i32) -> Rect {
        Rect::square(self.col as i32 * tile, self.row as i32 * tile, tile)
    }

    /// Box of edge `size` centred inside the tile.
    pub fn centred_box(&self, tile: i32, size: i32) -> Rect {
        let t = self.tile_box(tile);
        let off = (tile - size) / 2;
        Rect::square(t.x + off, t.y + off, size)
    }
}

// ══════════════════════════════════════════════════════════════
// Grid parsing
// ══════════════════════════════════════════════════════════════

/// Decode every known character of the map, row-major.
pub fn parse_map<S: AsRef<str>>(rows: &[S]) -> Vec<Placement> {
    let mut out = vec![];
    for (row, line) in rows.iter().enumerate() {
        for (col, ch) in line.as_ref().chars().enumerate() {
            if let Some(code) = TileCode::from_char(ch) {
                out.push(Placement { code, col, row });
            }
        }
    }
    out
}

/// Map size in tiles: (longest row, row count).
pub fn map_extent<S: AsRef<str>>(rows: &[S]) -> (usize, usize) {
    let cols = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);
    (cols, rows.len())
}

// ══════════════════════════════════════════════════════════════
// Level sources
// ══════════════════════════════════════════════════════════════

const BUILTIN: &[&str] = &[
    include_str!("../../levels/1.txt"),
    include_str!("../../levels/2.txt"),
    include_str!("../../levels/3.txt"),
];

/// Where level text comes from.
#[derive(Clone, Debug)]
pub enum LevelSource {
    /// `{dir}/{n}.txt`
    Directory(PathBuf),
    /// Level `n` is element `n - 1`.
    Memory(Vec<Vec<String>>),
}

impl LevelSource {
    /// `levels_dir` when it exists, otherwise the built-in set.
    pub fn from_config(config: &GameConfig) -> Self {
        if config.levels_dir.is_dir() {
            log::info!("loading levels from {}", config.levels_dir.display());
            LevelSource::Directory(config.levels_dir.clone())
        } else {
            log::info!("{} not found, using built-in levels", config.levels_dir.display());
            LevelSource::builtin()
        }
    }

    pub fn builtin() -> Self {
        LevelSource::Memory(BUILTIN.iter().map(|text| split_rows(text)).collect())
    }

    /// Fetch the rows of level `level` (1-based).
    pub fn read(&self, level: u32) -> Result<Vec<String>, LevelError> {
        match self {
            LevelSource::Directory(dir) => read_level_file(dir, level),
            LevelSource::Memory(levels) => level.checked_sub(1)
                .and_then(|i| levels.get(i as usize))
                .cloned()
                .ok_or(LevelError::NotFound { level }),
        }
    }
}

pub fn level_path(dir: &Path, level: u32) -> PathBuf {
    dir.join(format!("{level}.txt"))
}

fn read_level_file(dir: &Path, level: u32) -> Result<Vec<String>, LevelError> {
    let path = level_path(dir, level);
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(split_rows(&text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LevelError::NotFound { level }),
        Err(source) => Err(LevelError::Read { level, source }),
    }
}

fn split_rows(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::FoodKind;

    #[test]
    fn parses_single_row() {
        let p = parse_map(&["===P*==="]);
        assert_eq!(p.iter().filter(|p| p.code == TileCode::Wall).count(), 6);
        assert_eq!(
            p.iter().find(|p| p.code == TileCode::PlayerSpawn),
            Some(&Placement { code: TileCode::PlayerSpawn, col: 3, row: 0 }),
        );
        assert_eq!(
            p.iter().find(|p| matches!(p.code, TileCode::Food(_))),
            Some(&Placement { code: TileCode::Food(FoodKind::Common), col: 4, row: 0 }),
        );
    }

    #[test]
    fn unknown_and_blank_chars_are_skipped() {
        let p = parse_map(&["= x?G", "  ", "C"]);
        let codes: Vec<_> = p.iter().map(|p| (p.code, p.col, p.row)).collect();
        assert_eq!(codes, vec![
            (TileCode::Wall, 0, 0),
            (TileCode::GhostSpawn, 4, 0),
            (TileCode::Food(FoodKind::Cherry), 0, 2),
        ]);
    }

    #[test]
    fn extent_uses_longest_row() {
        assert_eq!(map_extent(&["==", "=====", ""]), (5, 3));
        assert_eq!(map_extent::<&str>(&[]), (0, 0));
    }

    #[test]
    fn boxes_scale_with_tile_size() {
        let p = Placement { code: TileCode::Wall, col: 2, row: 3 };
        assert_eq!(p.tile_box(40), Rect::square(80, 120, 40));
        assert_eq!(p.centred_box(40, 32), Rect::square(84, 124, 32));
        assert_eq!(p.centred_box(40, 16), Rect::square(92, 132, 16));
    }

    #[test]
    fn memory_source_is_one_based() {
        let src = LevelSource::Memory(vec![vec!["=P*".to_string()]]);
        assert_eq!(src.read(1).unwrap(), vec!["=P*".to_string()]);
        assert!(matches!(src.read(0), Err(LevelError::NotFound { level: 0 })));
        assert!(matches!(src.read(2), Err(LevelError::NotFound { level: 2 })));
    }

    #[test]
    fn builtin_levels_have_exactly_one_spawn() {
        let LevelSource::Memory(levels) = LevelSource::builtin() else {
            panic!("builtin source must be in memory");
        };
        assert_eq!(levels.len(), BUILTIN.len());
        for rows in &levels {
            let spawns = parse_map(rows).iter()
                .filter(|p| p.code == TileCode::PlayerSpawn)
                .count();
            assert_eq!(spawns, 1);
        }
    }

    #[test]
    fn directory_source_reads_numbered_files() {
        let dir = std::env::temp_dir().join(format!("pacmaze-levels-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(level_path(&dir, 1), "=P=\r\n=*=\n").unwrap();

        let src = LevelSource::Directory(dir.clone());
        assert_eq!(src.read(1).unwrap(), vec!["=P=".to_string(), "=*=".to_string()]);
        assert!(matches!(src.read(2), Err(LevelError::NotFound { level: 2 })));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
