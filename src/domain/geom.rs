/// Axis-aligned boxes and cardinal directions.
///
/// All positions in the simulation are pixel coordinates. A tile at
/// `(col, row)` covers `[col * tile, (col + 1) * tile)` on both axes, and
/// every entity is described by the box it occupies (top-left + size).

/// Axis-aligned rectangle. Edges are half-open: two boxes that merely touch
/// do not overlap.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub const fn square(x: i32, y: i32, size: i32) -> Self {
        Rect { x, y, w: size, h: size }
    }

    #[inline]
    pub fn right(self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Overlap iff both axis intervals intersect.
    #[inline]
    pub fn intersects(self, other: Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn translate(self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..self }
    }

    /// Grow by `dx` on the left and right, `dy` on the top and bottom.
    pub fn inflate(self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x - dx,
            y: self.y - dy,
            w: self.w + 2 * dx,
            h: self.h + 2 * dy,
        }
    }
}

/// Heading of a movable entity. Exactly one cardinal unit vector or idle,
/// so diagonal movement is unrepresentable.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector, components in {-1, 0, 1}. Screen y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Direction along the x axis toward the sign of `dx`.
    pub fn horizontal(dx: i32) -> Direction {
        match dx.signum() {
            -1 => Direction::Left,
            1 => Direction::Right,
            _ => Direction::None,
        }
    }

    /// Direction along the y axis toward the sign of `dy`.
    pub fn vertical(dy: i32) -> Direction {
        match dy.signum() {
            -1 => Direction::Up,
            1 => Direction::Down,
            _ => Direction::None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Direction::None
    }
}
