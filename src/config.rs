//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub peer: PeerConfig,
    pub joystick: JoystickConfig,
    pub keyboard: KeyboardConfig,
    pub feed: FeedConfig,
    pub display: DisplayConfig,
}

/// Remote peer endpoints
#[derive(Debug, Deserialize, Clone)]
pub struct PeerConfig {
    /// Base URL of the peer's media endpoint (healthcheck + video stream)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// WebSocket URL of the realtime channel
    #[serde(default = "default_channel_url")]
    pub channel_url: String,
}

/// Joystick widget configuration
#[derive(Debug, Deserialize, Clone)]
pub struct JoystickConfig {
    /// Visual radius of the joystick in display units
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Scale applied to the clamped normalized vector before sending.
    /// Negative by convention to match the peer's coordinate frame.
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Treat mouse press/drag as a synthetic pointer (desktop testing)
    #[serde(default)]
    pub mouse_fallback: bool,
}

/// Keyboard input configuration
#[derive(Debug, Deserialize, Clone)]
pub struct KeyboardConfig {
    /// Global debounce window across all keys, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Video feed liveness configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    /// Health-probe interval in seconds
    #[serde(default = "default_probe_interval_s")]
    pub probe_interval_s: u64,

    /// Consecutive probe failures before the feed is declared failed
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Display behavior configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// How long a transient status message stays fully visible, in milliseconds
    #[serde(default = "default_status_fade_ms")]
    pub status_fade_ms: u64,
}

// Default value functions
fn default_base_url() -> String { "http://192.168.5.198:8000".to_string() }
fn default_channel_url() -> String { "ws://192.168.5.198:5000/channel".to_string() }

fn default_max_distance() -> f64 { 30.0 }
fn default_scale_factor() -> f64 { -10.0 }

fn default_debounce_ms() -> u64 { 50 }

fn default_probe_interval_s() -> u64 { 3 }
fn default_max_retries() -> u32 { 5 }

fn default_status_fade_ms() -> u64 { 3000 }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use drone_console::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Validate peer endpoints
        let base = url::Url::parse(&self.peer.base_url).map_err(|e| {
            crate::error::ConsoleError::Config(
                toml::de::Error::custom(format!("base_url is not a valid URL: {}", e))
            )
        })?;

        if !["http", "https"].contains(&base.scheme()) {
            return Err(crate::error::ConsoleError::Config(
                toml::de::Error::custom("base_url scheme must be http or https")
            ));
        }

        let channel = url::Url::parse(&self.peer.channel_url).map_err(|e| {
            crate::error::ConsoleError::Config(
                toml::de::Error::custom(format!("channel_url is not a valid URL: {}", e))
            )
        })?;

        if !["ws", "wss"].contains(&channel.scheme()) {
            return Err(crate::error::ConsoleError::Config(
                toml::de::Error::custom("channel_url scheme must be ws or wss")
            ));
        }

        // Validate joystick geometry
        if self.joystick.max_distance <= 0.0 || self.joystick.max_distance > 500.0 {
            return Err(crate::error::ConsoleError::Config(
                toml::de::Error::custom("max_distance must be between 0 and 500 display units")
            ));
        }

        if self.joystick.scale_factor == 0.0 || !self.joystick.scale_factor.is_finite() {
            return Err(crate::error::ConsoleError::Config(
                toml::de::Error::custom("scale_factor must be a non-zero finite number")
            ));
        }

        // Validate timing fields
        if self.keyboard.debounce_ms == 0 || self.keyboard.debounce_ms > 1000 {
            return Err(crate::error::ConsoleError::Config(
                toml::de::Error::custom("debounce_ms must be between 1 and 1000")
            ));
        }

        if self.feed.probe_interval_s == 0 || self.feed.probe_interval_s > 60 {
            return Err(crate::error::ConsoleError::Config(
                toml::de::Error::custom("probe_interval_s must be between 1 and 60")
            ));
        }

        if self.feed.max_retries == 0 || self.feed.max_retries > 100 {
            return Err(crate::error::ConsoleError::Config(
                toml::de::Error::custom("max_retries must be between 1 and 100")
            ));
        }

        if self.display.status_fade_ms == 0 || self.display.status_fade_ms > 60000 {
            return Err(crate::error::ConsoleError::Config(
                toml::de::Error::custom("status_fade_ms must be between 1 and 60000")
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            peer: PeerConfig {
                base_url: default_base_url(),
                channel_url: default_channel_url(),
            },
            joystick: JoystickConfig {
                max_distance: default_max_distance(),
                scale_factor: default_scale_factor(),
                mouse_fallback: false,
            },
            keyboard: KeyboardConfig {
                debounce_ms: default_debounce_ms(),
            },
            feed: FeedConfig {
                probe_interval_s: default_probe_interval_s(),
                max_retries: default_max_retries(),
            },
            display: DisplayConfig {
                status_fade_ms: default_status_fade_ms(),
            },
        }
    }
}
