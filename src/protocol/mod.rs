//! # Wire Protocol Module
//!
//! JSON event payloads exchanged with the remote controller process.
//!
//! This module handles:
//! - Building outbound `control` and `mode` payloads
//! - Parsing inbound `telemetry`, `arm`, `status`, `connect`, `disconnect` events
//! - Telemetry sample deserialization

pub mod events;

pub use events::{
    Action, ControlMessage, InboundEvent, Mode, Stick, TelemetrySample, EVENT_CONTROL, EVENT_MODE,
};
