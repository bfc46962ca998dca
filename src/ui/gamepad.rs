/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Movement, menu navigation
///   A                     →  Jump
///   B / R1                →  Dash
///   X / Y                 →  Shoot (held)
///   A / Start             →  Confirm
///   Start                 →  Pause

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

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
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
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
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    jump: Vec<Btn>,
    dash: Vec<Btn>,
    shoot: Vec<Btn>,
    confirm: Vec<Btn>,
    pause: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump:    vec![Btn::A],
            dash:    vec![Btn::B, Btn::R1],
            shoot:   vec![Btn::X, Btn::Y],
            confirm: vec![Btn::A, Btn::Start],
            pause:   vec![Btn::Start],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; a list with no known names keeps the default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_into(names: &[String], slot: &mut Vec<Btn>) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() {
                if !names.is_empty() {
                    log::warn!("no known gamepad buttons in {:?}, keeping defaults", names);
                }
            } else {
                *slot = parsed;
            }
        }
        let mut map = ActionMap::default();
        parse_into(&cfg.jump, &mut map.jump);
        parse_into(&cfg.dash, &mut map.dash);
        parse_into(&cfg.shoot, &mut map.shoot);
        parse_into(&cfg.confirm, &mut map.confirm);
        parse_into(&cfg.pause, &mut map.pause);
        map
    }
}

/// Directions, from either the d-pad or the left stick.
#[derive(Clone, Copy, Debug, Default)]
struct Dirs {
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
}

impl Dirs {
    fn clear_edges(&mut self) {
        for d in [&mut self.up, &mut self.down, &mut self.left, &mut self.right] {
            d.just_pressed = false;
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: Dirs,
    stick: Dirs,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut state = GamepadState::disconnected();

        #[cfg(feature = "gamepad")]
        match Gilrs::new() {
            Ok(g) => {
                state.connected = g.gamepads().next().is_some();
                if state.connected {
                    log::info!("gamepad connected");
                }
                state.gilrs = Some(g);
            }
            Err(e) => log::warn!("gamepad support unavailable: {e}"),
        }

        state
    }

    /// A pad that never reports input.
    pub fn disconnected() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: Dirs::default(),
            stick: Dirs::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

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
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Derive stick digital states
        self.stick.left.set(self.stick_x < -STICK_DEADZONE);
        self.stick.right.set(self.stick_x > STICK_DEADZONE);
        self.stick.up.set(self.stick_y > STICK_DEADZONE);
        self.stick.down.set(self.stick_y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp    => self.dpad.up.set(held),
            Button::DPadDown  => self.dpad.down.set(held),
            Button::DPadLeft  => self.dpad.left.set(held),
            Button::DPadRight => self.dpad.right.set(held),
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    self.buttons[btn as usize].set(held);
                }
            }
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].held)
    }

    pub fn jump_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.jump)
    }
    pub fn dash_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.dash)
    }
    pub fn shoot_held(&self) -> bool {
        self.any_held(&self.action_map.shoot)
    }
    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.pause)
    }

    // Movement (continuous, held)
    pub fn up_held(&self) -> bool {
        self.dpad.up.held || self.stick.up.held
    }
    pub fn down_held(&self) -> bool {
        self.dpad.down.held || self.stick.down.held
    }
    pub fn left_held(&self) -> bool {
        self.dpad.left.held || self.stick.left.held
    }
    pub fn right_held(&self) -> bool {
        self.dpad.right.held || self.stick.right.held
    }

    // Menu navigation (edge)
    pub fn up_pressed(&self) -> bool {
        self.dpad.up.just_pressed || self.stick.up.just_pressed
    }
    pub fn down_pressed(&self) -> bool {
        self.dpad.down.just_pressed || self.stick.down.just_pressed
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.dpad.clear_edges();
        self.stick.clear_edges();
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = Dirs::default();
        self.stick = Dirs::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
