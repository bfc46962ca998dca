/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement and firing while a key is held
///   - Edge-triggered jump, dash and menu keys (only fire on initial press)
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// ## Bindings
///
///   ← → / A D          move
///   ↑ / W / Space      jump (↑ also climbs)
///   ↓ / S              climb down
///   X / J              shoot
///   C / K / Shift      dash
///   Esc / P            pause
///   Enter / Space      confirm
///   1-9                pick a menu entry

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::{FrameInput, PlayerInput};
use super::gamepad::GamepadState;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_JUMP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')];
pub const KEYS_SHOOT: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X'), KeyCode::Char('j'), KeyCode::Char('J')];
pub const KEYS_DASH: &[KeyCode] = &[KeyCode::Char('c'), KeyCode::Char('C'), KeyCode::Char('k'), KeyCode::Char('K')];
pub const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('p'), KeyCode::Char('P')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.begin_frame();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle(key);
            }
        }

        self.expire(Instant::now());
    }

    /// Forget last frame's edges.
    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
    }

    /// Apply one key event.
    fn handle(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Without enhancement, releases are unreliable; rely on timeout.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Expire keys that have timed out (fallback for terminals without Release).
    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Shift arrives as a modifier on other keys, never on its own.
    fn shift_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.kind == KeyEventKind::Press && k.modifiers.contains(KeyModifiers::SHIFT)
                && matches!(k.code, KeyCode::Left | KeyCode::Right)
        })
    }

    /// Digit keys 1-9 as a zero-based menu pick.
    fn digit_pick(&self) -> Option<usize> {
        self.fresh_presses.iter().find_map(|code| match code {
            KeyCode::Char(c @ '1'..='9') => Some(*c as usize - '1' as usize),
            _ => None,
        })
    }

    /// Everything the simulation needs from keyboard and gamepad this frame.
    pub fn frame_input(&self, pad: &GamepadState) -> FrameInput {
        // Ctrl+C quits; don't let its 'c' dash.
        let ctrl_c = self.ctrl_c_pressed();
        FrameInput {
            player: PlayerInput {
                left: self.any_held(KEYS_LEFT) || pad.left_held(),
                right: self.any_held(KEYS_RIGHT) || pad.right_held(),
                up: self.any_held(KEYS_UP) || pad.up_held(),
                down: self.any_held(KEYS_DOWN) || pad.down_held(),
            },
            jump: self.any_pressed(KEYS_JUMP) || pad.jump_pressed(),
            dash: (!ctrl_c && self.any_pressed(KEYS_DASH)) || self.shift_pressed() || pad.dash_pressed(),
            shoot: self.any_held(KEYS_SHOOT) || pad.shoot_held(),
            pause: self.any_pressed(KEYS_PAUSE) || pad.pause_pressed(),
            menu_up: self.any_pressed(KEYS_UP) || pad.up_pressed(),
            menu_down: self.any_pressed(KEYS_DOWN) || pad.down_pressed(),
            confirm: self.any_pressed(KEYS_CONFIRM) || pad.confirm_pressed(),
            menu_pick: self.digit_pick(),
        }
    }
}
