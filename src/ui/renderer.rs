/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The simulation works in pixels; the screen is a grid of tiles, each two
/// terminal columns wide. A sprite is drawn in the tile that holds its
/// centre, so a moving box hops from tile to tile as it crosses boundaries.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{EntityKind, FoodKind};
use crate::domain::geom::{Direction, Rect};
use crate::sim::world::{Hud, Phase, World};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every cell, so the gap between terminal rows
    /// matches the cell colour.
    const BASE_BG: Color = Color::Rgb { r: 10, g: 10, b: 24 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel that differs from any real cell, forcing a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Sprites ──

/// Terminal columns per tile.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const YELLOW: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };

/// Two-column glyph and colour for a sprite.
fn glyph(kind: EntityKind, hud: &Hud, facing: Direction) -> ([char; 2], Color) {
    match kind {
        EntityKind::Wall => (['█', '█'], Color::Rgb { r: 40, g: 60, b: 220 }),
        EntityKind::Food(FoodKind::Common) => ([' ', '·'], Color::Rgb { r: 255, g: 190, b: 150 }),
        EntityKind::Food(FoodKind::Cherry) => (['<', '3'], Color::Rgb { r: 230, g: 30, b: 60 }),
        EntityKind::Food(FoodKind::Blueberry) => (['{', '}'], Color::Rgb { r: 90, g: 120, b: 255 }),
        EntityKind::Ghost => (['Ѧ', 'Ѧ'], Color::Rgb { r: 255, g: 90, b: 200 }),
        EntityKind::Player if hud.dead => (['>', '<'], Color::Rgb { r: 255, g: 60, b: 60 }),
        EntityKind::Player => {
            let fg = if hud.immune { Color::Cyan } else { YELLOW };
            let ch = match facing {
                Direction::Up => ['\\', '/'],
                Direction::Down => ['/', '\\'],
                Direction::Left => ['<', ')'],
                Direction::Right => ['(', '>'],
                Direction::None => ['(', ')'],
            };
            (ch, fg)
        }
    }
}

/// Tile holding the centre of `rect`, or None if the centre lies outside
/// the map (a box part-way through a wrap).
fn tile_of(rect: Rect, tile: i32, cols: usize, rows: usize) -> Option<(usize, usize)> {
    let (cx, cy) = rect.center();
    if tile <= 0 || cx < 0 || cy < 0 {
        return None;
    }
    let (col, row) = ((cx / tile) as usize, (cy / tile) as usize);
    (col < cols && row < rows).then_some((col, row))
}

fn hearts(hud: &Hud) -> String {
    (0..hud.max_health)
        .map(|i| if i < hud.health { '♥' } else { '♡' })
        .collect()
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &World) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clean transition. Pausing keeps the board underneath.
        if self.last_phase != Some(world.phase) {
            let pause_toggle = matches!(
                (self.last_phase, world.phase),
                (Some(Phase::Playing), Phase::Paused) | (Some(Phase::Paused), Phase::Playing)
            );
            if !pause_toggle {
                self.back.cells.fill(Cell::INVALID);
                queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            }
            self.last_phase = Some(world.phase);
        }

        self.front.clear();

        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => self.compose_game(world),
            Phase::Paused => {
                self.compose_game(world);
                self.compose_pause_overlay(world);
            }
            Phase::GameOver => self.compose_game_over(world),
            Phase::GameComplete => self.compose_game_complete(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &World) {
        let hud = w.hud();

        // ── HUD row ──
        let status = if hud.dead {
            "  GAME OVER"
        } else if hud.immune && hud.visible {
            "  SHIELD"
        } else {
            ""
        };
        let line = format!(
            " Level {:<2}  Score {:<7}  {}{} ",
            hud.level, hud.score, hearts(&hud), status,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &line, Color::White, HUD_BG);

        // ── Map ──
        let tile = w.config.field.tile_size;
        let facing = w.player.body.dir;
        for sprite in w.sprites() {
            let Some((col, row)) = tile_of(sprite.rect, tile, w.cols, w.rows) else { continue };
            let ([a, b], fg) = glyph(sprite.kind, &hud, facing);
            let (x, y) = (col * CELL_W, MAP_ROW + row);
            self.front.set(x, y, Cell::new(a, fg, Color::Reset));
            self.front.set(x + 1, y, Cell::new(b, fg, Color::Reset));
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + w.rows + 1;
        if !w.message.is_empty() && msg_row < self.front.height {
            let msg = format!(" ◈ {} ", w.message);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + w.rows + 3;
        if help_row < self.front.height {
            let help = if w.config.debug {
                " ←→↑↓/WASD:Move  Esc/P:Pause  Q:Quit  │  F1:Restart  F2:Next  F3:Prev"
            } else {
                " ←→↑↓/WASD:Move  Esc/P:Pause  Q:Quit  │  Pad: D-pad/Stick  Y:Pause"
            };
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_title(&mut self, w: &World) {
        let title = [
            r"  ___              __  __              ",
            r" | _ \ __ _  __   |  \/  | __ _  ___ ___",
            r" |  _// _` |/ _|  | |\/| |/ _` ||_ // -_)",
            r" |_|  \__,_|\__|  |_|  |_|\__,_|/__|\___|",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, YELLOW, Color::Reset);
        }

        let base = 8;
        self.front.put_str(8, base, "ENTER   Start", GREEN, Color::Reset);
        self.front.put_str(8, base + 1, "  Q     Quit", Color::White, Color::Reset);

        let legend = [
            "Eat every dot to clear the maze.",
            "  · dot    1-10 pts",
            "  <3 cherry  +1 health",
            "  {} blueberry  temporary shield",
            "  Ѧ  ghost   costs 1 health on contact",
        ];
        for (i, line) in legend.iter().enumerate() {
            let fg = if i == 0 { YELLOW } else { Color::White };
            self.front.put_str(8, base + 3 + i, line, fg, Color::Reset);
        }

        let sound = if w.config.sound.enabled { "sound on" } else { "sound off" };
        self.front.put_str(8, base + 9, sound, Color::DarkGrey, Color::Reset);

        // Load errors land here.
        let msg_row = self.front.height.saturating_sub(1);
        if !w.message.is_empty() && msg_row > base + 9 {
            let msg = format!(" ◈ {} ", w.message);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }
    }

    fn compose_game_over(&mut self, w: &World) {
        let box_art = [
            "╔══════════════════════════════╗",
            "║         G A M E  O V E R      ║",
            "╚══════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset);
        }
        let hud = w.hud();
        self.front.put_str(8, 9, &format!("◈ Final Score: {}", hud.score), Color::White, Color::Reset);
        self.front.put_str(8, 10, &format!("◈ Reached Level: {}", hud.level), Color::White, Color::Reset);
        self.front.put_str(8, 12, "▸ ENTER: Play again from level 1", GREEN, Color::Reset);
        self.front.put_str(8, 13, "▸ Q:     Quit", Color::DarkGrey, Color::Reset);
    }

    fn compose_game_complete(&mut self, w: &World) {
        let box_art = [
            "╔══════════════════════════════╗",
            "║   ★ ALL MAZES CLEARED! ★    ║",
            "╚══════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, YELLOW, Color::Reset);
        }
        let hud = w.hud();
        self.front.put_str(8, 9, &format!("◈ Final Score: {}", hud.score), Color::White, Color::Reset);
        self.front.put_str(8, 12, "▸ ENTER: Play again", GREEN, Color::Reset);
        self.front.put_str(8, 13, "▸ Q:     Quit", Color::DarkGrey, Color::Reset);
    }

    fn compose_pause_overlay(&mut self, w: &World) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let view_cols = (w.cols * CELL_W).max(24);
        let box_w = 24_usize.min(self.front.width);
        let box_h = 5_usize;
        let box_x = view_cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + w.rows.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::White, dim));
            }
        }
        self.front.put_str(box_x + 8, box_y + 1, "PAUSED", YELLOW, dim);
        self.front.put_str(box_x + 2, box_y + 3, "Esc/P Resume  Q Quit", Color::Rgb { r: 100, g: 200, b: 255 }, dim);
    }
}
