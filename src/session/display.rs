//! # Display State
//!
//! Pure projection of session state into the strings and visibility flags
//! the panel renders. No I/O here; the session mutates this struct and the
//! frontend reads it.
//!
//! ## Formatting
//!
//! | Field | Format | Example |
//! |-------|--------|---------|
//! | latitude / longitude | 6 decimal places | `51.507400` |
//! | altitude | 1 decimal place | `10.5` |
//! | battery / signal | nearest integer | `88` |
//!
//! Units and `%` suffixes belong to the surrounding markup, not these values.
//!
//! Transient status messages stay fully visible for a configurable window
//! (default 3 s) and then fade; [`DisplayState::status_opacity`] reports the
//! current opacity for a given clock reading.

use std::time::{Duration, Instant};

use crate::feed::FeedUpdate;
use crate::protocol::{Mode, TelemetrySample};

/// Placeholder shown before the first telemetry sample arrives.
const NO_DATA: &str = "--";

/// Formatted telemetry readouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryText {
    pub lat: String,
    pub lon: String,
    pub alt: String,
    pub battery: String,
    pub signal: String,
}

impl Default for TelemetryText {
    fn default() -> Self {
        Self {
            lat: NO_DATA.to_string(),
            lon: NO_DATA.to_string(),
            alt: NO_DATA.to_string(),
            battery: NO_DATA.to_string(),
            signal: NO_DATA.to_string(),
        }
    }
}

impl TelemetryText {
    /// Formats a raw telemetry sample for display.
    #[must_use]
    pub fn from_sample(sample: &TelemetrySample) -> Self {
        Self {
            lat: format!("{:.6}", sample.lat),
            lon: format!("{:.6}", sample.lon),
            alt: format!("{:.1}", sample.alt),
            battery: format!("{}", sample.battery.round() as i64),
            signal: format!("{}", sample.signal.round() as i64),
        }
    }
}

/// Everything the panel renders, as plain data.
#[derive(Debug, Clone)]
pub struct DisplayState {
    status_fade: Duration,
    status: Option<(String, Instant)>,

    pub telemetry: TelemetryText,
    pub armed: bool,
    /// Held-command labels, in press order.
    pub active_commands: Vec<&'static str>,
    /// Connection-lost modal. Shown until the peer reports ready.
    pub connection_modal_visible: bool,

    pub show_stream: bool,
    pub show_no_feed: bool,
    /// Current source of the stream element, if it has been set.
    pub stream_src: Option<String>,

    pub ai_panel_visible: bool,
    pub follow_panel_visible: bool,
}

impl DisplayState {
    /// Creates the initial display state: no telemetry, disarmed, the
    /// connection modal up, and no feed yet.
    #[must_use]
    pub fn new(status_fade: Duration) -> Self {
        Self {
            status_fade,
            status: None,
            telemetry: TelemetryText::default(),
            armed: false,
            active_commands: Vec::new(),
            connection_modal_visible: true,
            show_stream: false,
            show_no_feed: false,
            stream_src: None,
            ai_panel_visible: false,
            follow_panel_visible: false,
        }
    }

    /// Arm-state label.
    #[must_use]
    pub fn arm_label(&self) -> &'static str {
        if self.armed {
            "Armed"
        } else {
            "Disarmed"
        }
    }

    /// Replaces the telemetry readouts with a fresh sample.
    pub fn apply_telemetry(&mut self, sample: &TelemetrySample) {
        self.telemetry = TelemetryText::from_sample(sample);
        self.armed = sample.armed;
    }

    /// Shows a transient status message, restarting the fade window.
    pub fn set_status(&mut self, message: impl Into<String>, now: Instant) {
        self.status = Some((message.into(), now));
    }

    /// Current status message text, regardless of fade.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status.as_ref().map(|(message, _)| message.as_str())
    }

    /// Opacity of the status message at the given clock reading: 1.0 inside
    /// the fade window, 0.0 after (or when no message was ever shown).
    #[must_use]
    pub fn status_opacity(&self, now: Instant) -> f64 {
        match &self.status {
            Some((_, shown_at)) if now.duration_since(*shown_at) < self.status_fade => 1.0,
            _ => 0.0,
        }
    }

    /// Applies the peer's readiness: the modal covers the panel whenever the
    /// peer is away.
    pub fn set_connected(&mut self, connected: bool) {
        self.connection_modal_visible = !connected;
    }

    /// Applies a feed update from the liveness monitor.
    pub fn apply_feed(&mut self, update: &FeedUpdate) {
        self.show_stream = update.show_stream;
        self.show_no_feed = update.show_no_feed;
        if let Some(src) = &update.refreshed_src {
            self.stream_src = Some(src.clone());
        }
    }

    /// Toggles the mode-specific side panels.
    pub fn set_mode(&mut self, mode: Mode) {
        self.ai_panel_visible = mode == Mode::Ai;
        self.follow_panel_visible = mode == Mode::Follow;
    }
}
