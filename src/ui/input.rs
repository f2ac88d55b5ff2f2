/// Keyboard input tracker.
///
/// The maze is steered with discrete commands: a key press sets the
/// player's heading, which persists until the next press. Only fresh
/// presses matter, so there is no held-key bookkeeping.
///
/// Release events (reported by terminals with keyboard enhancement) are
/// ignored; Repeat events are ignored too, so holding a key does not
/// re-trigger menu actions.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::geom::Direction;

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
pub const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('p'), KeyCode::Char('P')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Keys pressed during the most recent `drain_events()`, in arrival order.
    fresh_presses: Vec<KeyCode>,
    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            ctrl_c: false,
        }
    }

    /// Drain all pending terminal events.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }
    }

    fn record(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
            return;
        }
        self.fresh_presses.push(key.code);
    }

    /// Was this key freshly pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Heading requested this frame. Several arrows in one frame: last wins.
    pub fn direction(&self) -> Option<Direction> {
        self.fresh_presses.iter().rev().find_map(|&code| key_direction(code))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }
}

fn key_direction(code: KeyCode) -> Option<Direction> {
    if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else {
        None
    }
}
