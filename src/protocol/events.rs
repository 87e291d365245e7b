//! # Event Types
//!
//! Typed representations of the channel's event surface.
//!
//! ## Outbound
//!
//! | Event | Payload | Source |
//! |-------|---------|--------|
//! | `control` | `{"type":"left-joystick","x":…,"y":…}` | joystick drag |
//! | `control` | `{"type":"keyboard","code":"throttle_up"}` | key press |
//! | `control` | `{"type":"keyboard","code":"stop_throttle_up"}` | key release |
//! | `control` | `{"type":"keyboard","x":0,"y":0}` | blur / neutral |
//! | `control` | `"takeoff"` / `"land"` / `"disarm"` | action buttons |
//! | `mode` | `"manual"` / `"ai"` / `"follow"` | mode switch |
//!
//! ## Inbound
//!
//! | Event | Payload |
//! |-------|---------|
//! | `telemetry` | [`TelemetrySample`] object |
//! | `arm` | bare boolean |
//! | `status` | bare string |
//! | `connect` / `disconnect` | none |
//!
//! Parsing the whole inbound surface lives in [`InboundEvent::parse`] so the
//! protocol is auditable in one place.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ConsoleError, Result};

/// Outbound event name for control messages.
pub const EVENT_CONTROL: &str = "control";

/// Outbound event name for mode switches.
pub const EVENT_MODE: &str = "mode";

/// Discrete button actions sent as bare strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Takeoff,
    Land,
    Disarm,
}

impl Action {
    /// Wire representation of the action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Takeoff => "takeoff",
            Action::Land => "land",
            Action::Disarm => "disarm",
        }
    }

    /// Transient status message shown locally when the action is sent.
    #[must_use]
    pub fn status_message(self) -> &'static str {
        match self {
            Action::Takeoff => "Taking off...",
            Action::Land => "Landing...",
            Action::Disarm => "EMERGENCY STOP!",
        }
    }
}

/// Which joystick produced a control vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    Left,
    Right,
}

impl Stick {
    /// The `type` discriminator used in joystick payloads.
    #[must_use]
    pub fn wire_type(self) -> &'static str {
        match self {
            Stick::Left => "left-joystick",
            Stick::Right => "right-joystick",
        }
    }
}

/// Operating mode of the control panel.
///
/// `Ai` and `Follow` are placeholders on the peer side; switching only emits
/// the event and toggles panel visibility locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Manual,
    Ai,
    Follow,
}

impl Mode {
    /// Wire representation of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Manual => "manual",
            Mode::Ai => "ai",
            Mode::Follow => "follow",
        }
    }
}

/// An outbound control message, before envelope wrapping.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// Discrete button action, sent as a bare string.
    Action(Action),
    /// Keyboard command start/stop, `code` is e.g. `"arm"` or `"stop_arm"`.
    Keyboard { code: String },
    /// Neutral keyboard vector emitted on blur.
    KeyboardVector { x: f64, y: f64 },
    /// Scaled joystick vector.
    Joystick { stick: Stick, x: f64, y: f64 },
}

impl ControlMessage {
    /// Event name this message is sent under. Always `control`.
    #[must_use]
    pub fn event(&self) -> &'static str {
        EVENT_CONTROL
    }

    /// JSON payload for the channel.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            ControlMessage::Action(action) => Value::String(action.as_str().to_string()),
            ControlMessage::Keyboard { code } => json!({ "type": "keyboard", "code": code }),
            ControlMessage::KeyboardVector { x, y } => {
                json!({ "type": "keyboard", "x": x, "y": y })
            }
            ControlMessage::Joystick { stick, x, y } => {
                json!({ "type": stick.wire_type(), "x": x, "y": y })
            }
        }
    }
}

/// Telemetry pushed wholesale from the peer.
///
/// `battery` and `signal` default to 0 when absent; the earliest peer variant
/// only sent position, altitude, and arm state.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TelemetrySample {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    #[serde(default)]
    pub battery: f64,
    #[serde(default)]
    pub signal: f64,
    pub armed: bool,
}

/// A parsed inbound event from the peer.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Telemetry(TelemetrySample),
    Arm(bool),
    Status(String),
    Connect,
    Disconnect,
}

impl InboundEvent {
    /// Parses a named event and its payload.
    ///
    /// Returns `Ok(None)` for event names outside the protocol surface so the
    /// caller can log and move on. Malformed payloads on known events are
    /// errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use drone_console::protocol::InboundEvent;
    /// use serde_json::json;
    ///
    /// let event = InboundEvent::parse("arm", &json!(true)).unwrap();
    /// assert_eq!(event, Some(InboundEvent::Arm(true)));
    ///
    /// assert_eq!(InboundEvent::parse("unrelated", &json!(null)).unwrap(), None);
    /// ```
    pub fn parse(event: &str, data: &Value) -> Result<Option<Self>> {
        match event {
            "telemetry" => {
                let sample: TelemetrySample = serde_json::from_value(data.clone())?;
                Ok(Some(InboundEvent::Telemetry(sample)))
            }
            "arm" => match data.as_bool() {
                Some(armed) => Ok(Some(InboundEvent::Arm(armed))),
                None => Err(ConsoleError::Protocol(format!(
                    "arm payload must be a boolean, got: {}",
                    data
                ))),
            },
            "status" => match data.as_str() {
                Some(message) => Ok(Some(InboundEvent::Status(message.to_string()))),
                None => Err(ConsoleError::Protocol(format!(
                    "status payload must be a string, got: {}",
                    data
                ))),
            },
            "connect" => Ok(Some(InboundEvent::Connect)),
            "disconnect" => Ok(Some(InboundEvent::Disconnect)),
            _ => Ok(None),
        }
    }
}
