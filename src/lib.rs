//! # Drone Console Library
//!
//! Operator console for a camera drone: joystick and keyboard input mapping,
//! control dispatch over a realtime channel, telemetry display, and video
//! feed health monitoring.
//!
//! This library provides the session logic behind the control panel; the
//! binary wires it to a WebSocket channel and an HTTP health probe.

pub mod config;
pub mod error;
pub mod protocol;
pub mod input;
pub mod channel;
pub mod feed;
pub mod session;
