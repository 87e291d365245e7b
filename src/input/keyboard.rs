//! # Keyboard Input Mapper
//!
//! Fixed key → command table with a global debounce window and a running set
//! of held commands for display.
//!
//! ## Key Map
//!
//! | Key | Command | Wire code |
//! |-----|---------|-----------|
//! | Space | Arm | `arm` |
//! | Escape | Disarm | `disarm` |
//! | t | Takeoff | `takeoff` |
//! | l | Land | `land` |
//! | w / s | Throttle up/down | `throttle_up` / `throttle_down` |
//! | a / d | Yaw left/right | `yaw_left` / `yaw_right` |
//! | Arrow up/down | Pitch forward/backward | `pitch_forward` / `pitch_backward` |
//! | Arrow left/right | Roll left/right | `roll_left` / `roll_right` |
//!
//! ## Debounce
//!
//! The debounce window is GLOBAL across all keys: any key-down within the
//! window of a prior accepted key-down is dropped, even for a different key.
//! The window also advances on unmapped keys that pass the gate. This acts as
//! a rate limit on outbound control messages but suppresses legitimate
//! simultaneous multi-key input (e.g. diagonal movement); the behavior is
//! deliberate and pinned by tests rather than silently changed.
//!
//! Key-ups are never debounced; a held command must always be releasable.

use std::time::{Duration, Instant};

/// Default global debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// A discrete command the operator can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    Arm,
    Disarm,
    Takeoff,
    Land,
    ThrottleUp,
    ThrottleDown,
    YawLeft,
    YawRight,
    PitchForward,
    PitchBackward,
    RollLeft,
    RollRight,
}

impl CommandCode {
    /// Wire code carried in the `control` payload.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            CommandCode::Arm => "arm",
            CommandCode::Disarm => "disarm",
            CommandCode::Takeoff => "takeoff",
            CommandCode::Land => "land",
            CommandCode::ThrottleUp => "throttle_up",
            CommandCode::ThrottleDown => "throttle_down",
            CommandCode::YawLeft => "yaw_left",
            CommandCode::YawRight => "yaw_right",
            CommandCode::PitchForward => "pitch_forward",
            CommandCode::PitchBackward => "pitch_backward",
            CommandCode::RollLeft => "roll_left",
            CommandCode::RollRight => "roll_right",
        }
    }

    /// Human-readable label shown in the active-command list.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CommandCode::Arm => "Arm",
            CommandCode::Disarm => "Disarm",
            CommandCode::Takeoff => "Takeoff",
            CommandCode::Land => "Land",
            CommandCode::ThrottleUp => "↑ Throttle Up",
            CommandCode::ThrottleDown => "↓ Throttle Down",
            CommandCode::YawLeft => "← Yaw Left",
            CommandCode::YawRight => "→ Yaw Right",
            CommandCode::PitchForward => "↑ Pitch Forward",
            CommandCode::PitchBackward => "↓ Pitch Backward",
            CommandCode::RollLeft => "← Roll Left",
            CommandCode::RollRight => "→ Roll Right",
        }
    }
}

/// Looks up the command bound to a key, using the host's key names
/// (`" "`, `"Escape"`, `"w"`, `"ArrowUp"`, …).
#[must_use]
pub fn command_for_key(key: &str) -> Option<CommandCode> {
    match key {
        " " => Some(CommandCode::Arm),
        "Escape" => Some(CommandCode::Disarm),
        "t" => Some(CommandCode::Takeoff),
        "l" => Some(CommandCode::Land),
        "w" => Some(CommandCode::ThrottleUp),
        "s" => Some(CommandCode::ThrottleDown),
        "a" => Some(CommandCode::YawLeft),
        "d" => Some(CommandCode::YawRight),
        "ArrowUp" => Some(CommandCode::PitchForward),
        "ArrowDown" => Some(CommandCode::PitchBackward),
        "ArrowLeft" => Some(CommandCode::RollLeft),
        "ArrowRight" => Some(CommandCode::RollRight),
        _ => None,
    }
}

/// What the session should send for a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Key pressed: emit a start message for the code.
    Start(CommandCode),
    /// Key released: emit a `stop_`-prefixed message for the code.
    Stop(CommandCode),
    /// Blur: emit a neutral keyboard vector.
    Neutral,
}

/// Result of processing one key event.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardUpdate {
    pub action: KeyAction,
    /// Snapshot of held-command labels, in press order, for display.
    pub active_labels: Vec<&'static str>,
}

/// Keyboard state: the debounce window and the held-command set.
///
/// Not thread-safe; use from the single event-loop task only.
#[derive(Debug)]
pub struct KeyboardControls {
    debounce: Duration,
    last_command: Option<Instant>,
    active: Vec<&'static str>,
}

impl Default for KeyboardControls {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl KeyboardControls {
    /// Creates keyboard state with the given debounce window.
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            last_command: None,
            active: Vec::new(),
        }
    }

    /// Labels of currently-held commands, in press order.
    #[must_use]
    pub fn active_labels(&self) -> &[&'static str] {
        &self.active
    }

    /// Processes a key-down.
    ///
    /// Returns `None` when the event is dropped: either the global debounce
    /// window has not elapsed since the last accepted key-down, or the key is
    /// not in the command table. An unmapped key that passes the debounce
    /// gate still advances the window (original behavior, preserved).
    pub fn key_down(&mut self, key: &str, now: Instant) -> Option<KeyboardUpdate> {
        if let Some(last) = self.last_command {
            if now.duration_since(last) < self.debounce {
                return None;
            }
        }
        self.last_command = Some(now);

        let code = command_for_key(key)?;
        let label = code.label();
        if !self.active.contains(&label) {
            self.active.push(label);
        }

        Some(KeyboardUpdate {
            action: KeyAction::Start(code),
            active_labels: self.active.clone(),
        })
    }

    /// Processes a key-up. Never debounced.
    ///
    /// Returns `None` for keys outside the command table.
    pub fn key_up(&mut self, key: &str) -> Option<KeyboardUpdate> {
        let code = command_for_key(key)?;
        let label = code.label();
        self.active.retain(|&held| held != label);

        Some(KeyboardUpdate {
            action: KeyAction::Stop(code),
            active_labels: self.active.clone(),
        })
    }

    /// Clears all held commands (focus lost, view teardown) and yields the
    /// neutral vector to send.
    pub fn blur(&mut self) -> KeyboardUpdate {
        self.active.clear();
        KeyboardUpdate {
            action: KeyAction::Neutral,
            active_labels: Vec::new(),
        }
    }
}
