/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Steer (edge-triggered, heading persists)
///   Start                 →  Confirm / Restart
///   Select                →  Quit
///   Y                     →  Pause

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::geom::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    pause: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::Start],
            cancel:  vec![Btn::Select],
            pause:   vec![Btn::Y],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons that went down since the last `update()`.
    just_pressed: [bool; BTN_COUNT],

    /// Most recent d-pad press or stick deflection this frame.
    steer: Option<Direction>,
    stick: Option<Direction>,

    action_map: ActionMap,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs_opt = match Gilrs::new() {
            Ok(g) => {
                if g.gamepads().next().is_some() {
                    log::info!("gamepad found at startup");
                }
                Some(g)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            just_pressed: [false; BTN_COUNT],
            steer: None,
            stick: None,
            action_map: ActionMap::default(),
        }
    }

    /// Load button mapping from config. Unknown names are skipped; an
    /// action left with no valid buttons keeps its default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let map = &mut self.action_map;
        let cf = parse_list(&cfg.confirm);
        if !cf.is_empty() { map.confirm = cf; }
        let ca = parse_list(&cfg.cancel);
        if !ca.is_empty() { map.cancel = ca; }
        let pa = parse_list(&cfg.pause);
        if !pa.is_empty() { map.pause = pa; }
    }

    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.steer = None;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.press(btn),
                EventType::AxisChanged(axis, value, _) => self.update_axis(axis, value),
                EventType::Connected => log::info!("gamepad connected"),
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.stick = None;
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, gilrs_btn: Button) {
        let dir = match gilrs_btn {
            Button::DPadUp    => Some(Direction::Up),
            Button::DPadDown  => Some(Direction::Down),
            Button::DPadLeft  => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if dir.is_some() {
            self.steer = dir;
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.just_pressed[btn as usize] = true;
        }
    }

    /// Stick deflection acts like a d-pad press on the tick it crosses the
    /// deadzone along its dominant axis.
    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        let dir = match axis {
            Axis::LeftStickX if value < -STICK_DEADZONE => Some(Direction::Left),
            Axis::LeftStickX if value > STICK_DEADZONE => Some(Direction::Right),
            Axis::LeftStickY if value > STICK_DEADZONE => Some(Direction::Up),
            Axis::LeftStickY if value < -STICK_DEADZONE => Some(Direction::Down),
            Axis::LeftStickX | Axis::LeftStickY => None,
            _ => return,
        };
        if dir.is_some() && dir != self.stick {
            self.steer = dir;
        }
        self.stick = dir;
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn cancel_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.cancel)
    }
    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.pause)
    }

    pub fn direction(&self) -> Option<Direction> {
        self.steer
    }
}
