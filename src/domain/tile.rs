/// Tile codes of the textual level map.
/// The character legend lives here and nowhere else.

use super::entity::FoodKind;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileCode {
    Wall,           // '='
    PlayerSpawn,    // 'P'
    Food(FoodKind), // '*' common, 'C' cherry, 'S' blueberry
    GhostSpawn,     // 'G'
}

impl TileCode {
    /// Decode one map character. Anything outside the legend (including
    /// whitespace) is empty floor.
    pub fn from_char(ch: char) -> Option<TileCode> {
        match ch {
            '=' => Some(TileCode::Wall),
            'P' => Some(TileCode::PlayerSpawn),
            '*' => Some(TileCode::Food(FoodKind::Common)),
            'C' => Some(TileCode::Food(FoodKind::Cherry)),
            'S' => Some(TileCode::Food(FoodKind::Blueberry)),
            'G' => Some(TileCode::GhostSpawn),
            _ => None,
        }
    }
}
