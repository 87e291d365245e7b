//! # Drone Console
//!
//! Operator console for a camera drone: maps joystick and keyboard input to
//! control messages on a realtime channel, renders telemetry, and watches
//! video feed health.

use anyhow::Result;
use chrono::Utc;
use std::time::Instant;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use tracing_subscriber;

use drone_console::channel;
use drone_console::config::Config;
use drone_console::feed::HttpFeedProbe;
use drone_console::protocol::InboundEvent;
use drone_console::session::capability::{self, NoCapabilities};
use drone_console::session::Session;

/// Main entry point for the drone console
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (path from the first argument, or
///      `config/default.toml`)
///    - Connect to the peer's realtime channel
///    - Request host display capabilities (best effort)
///
/// 2. **Main Loop**
///    - Dispatch inbound peer events (telemetry, arm state, status,
///      connect/disconnect) into the session
///    - Probe video feed health every few seconds
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be loaded or is invalid
/// - The channel connection cannot be established
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Drone Console v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load(&config_path)?;
    info!("Loaded configuration from {}", config_path);

    let (sender, mut receiver) = channel::connect(&config.peer.channel_url).await?;

    let probe = HttpFeedProbe::new(&config.peer.base_url);
    let mut probe_interval = interval(Duration::from_secs(config.feed.probe_interval_s));

    let mut session = Session::new(&config, sender);
    capability::engage(&mut NoCapabilities);

    info!("Console ready; waiting for peer events");
    info!("Press Ctrl+C to exit");

    // Main event loop
    loop {
        tokio::select! {
            // Inbound peer events
            inbound = receiver.next_event() => {
                match inbound {
                    Ok(Some((event, data))) => {
                        match InboundEvent::parse(&event, &data) {
                            Ok(Some(parsed)) => session.dispatch(parsed, Instant::now()),
                            Ok(None) => debug!("Ignoring unknown event: {}", event),
                            Err(e) => warn!("Dropping malformed {} event: {}", event, e),
                        }
                    }
                    Ok(None) => {
                        warn!("Channel closed by peer, shutting down");
                        break;
                    }
                    Err(e) => {
                        warn!("Channel read failed: {}", e);
                        break;
                    }
                }
            }

            // Periodic feed health probe
            _ = probe_interval.tick() => {
                let update = session.poll_feed(&probe, Utc::now().timestamp_millis()).await;
                if let Some(src) = update.refreshed_src {
                    info!("Feed degraded, retrying stream at {}", src);
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    Ok(())
}
