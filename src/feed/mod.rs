//! # Video Feed Liveness Module
//!
//! Polls the peer's media endpoint and tracks stream health with bounded
//! retry.
//!
//! ## State Machine
//!
//! ```text
//! Unknown → Live ⇄ Degraded(retry_count) → Failed
//! ```
//!
//! - A successful probe moves to `Live` and resets the retry count.
//! - A failed probe increments the count; below the maximum the monitor
//!   enters `Degraded` and re-requests the stream with a cache-busting
//!   timestamp parameter.
//! - Reaching the maximum (default 5 consecutive failures) commits to
//!   `Failed`: the no-feed message becomes persistent and the stream element
//!   is no longer refreshed. Probes keep running but `Failed` is sticky —
//!   even a healthy probe cannot leave it; only
//!   [`FeedMonitor::manual_refresh`] (the user-triggered retry) re-arms the
//!   monitor.
//!
//! The probe itself is behind the [`FeedProbe`] trait so the state machine
//! is testable without HTTP; [`HttpFeedProbe`] is the production
//! implementation against `<base>/healthcheck`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Consecutive probe failures before the feed is declared failed.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Liveness of the video feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// No probe has completed yet.
    Unknown,
    /// Last probe succeeded.
    Live,
    /// Probes failing; the stream is being re-requested.
    Degraded(u32),
    /// Retry budget exhausted. Sticky until a manual refresh.
    Failed,
}

/// What the display should do after a probe or refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedUpdate {
    /// Show the stream element.
    pub show_stream: bool,
    /// Show the no-feed message.
    pub show_no_feed: bool,
    /// When set, point the stream element at this cache-busted URL.
    pub refreshed_src: Option<String>,
}

/// Trait for the feed health probe
#[async_trait]
pub trait FeedProbe: Send + Sync {
    /// Returns true when the peer reports a healthy feed.
    async fn probe(&self) -> bool;
}

/// Health probe against `<base>/healthcheck`.
pub struct HttpFeedProbe {
    client: reqwest::Client,
    healthcheck_url: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

impl HttpFeedProbe {
    /// Creates a probe for the given peer base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            healthcheck_url: format!("{}/healthcheck", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl FeedProbe for HttpFeedProbe {
    async fn probe(&self) -> bool {
        // Any transport or decode failure counts as an unhealthy probe
        match self.client.get(&self.healthcheck_url).send().await {
            Ok(response) => match response.json::<HealthResponse>().await {
                Ok(body) => body.status == "healthy",
                Err(e) => {
                    debug!("Healthcheck body not readable: {}", e);
                    false
                }
            },
            Err(e) => {
                debug!("Healthcheck request failed: {}", e);
                false
            }
        }
    }
}

/// Tracks feed liveness and builds cache-busted stream URLs.
#[derive(Debug)]
pub struct FeedMonitor {
    base_url: String,
    max_retries: u32,
    status: FeedStatus,
}

impl FeedMonitor {
    /// Creates a monitor for the given peer base URL.
    #[must_use]
    pub fn new(base_url: &str, max_retries: u32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            status: FeedStatus::Unknown,
        }
    }

    /// Current liveness state.
    #[must_use]
    pub fn status(&self) -> FeedStatus {
        self.status
    }

    /// Cache-busted stream URL for the given timestamp.
    #[must_use]
    pub fn stream_url(&self, now_millis: i64) -> String {
        format!("{}/video_feed?t={}", self.base_url, now_millis)
    }

    /// Runs one probe and applies the result.
    pub async fn poll(&mut self, probe: &dyn FeedProbe, now_millis: i64) -> FeedUpdate {
        if probe.probe().await {
            self.record_success()
        } else {
            self.record_failure(now_millis)
        }
    }

    /// Applies a successful probe: feed is live, retry budget restored.
    ///
    /// A healthy probe does not leave `Failed`; once committed, only
    /// [`Self::manual_refresh`] re-arms the monitor.
    pub fn record_success(&mut self) -> FeedUpdate {
        if self.status == FeedStatus::Failed {
            debug!("Probe healthy but feed is failed; waiting for manual refresh");
            return FeedUpdate {
                show_stream: false,
                show_no_feed: true,
                refreshed_src: None,
            };
        }

        if self.status != FeedStatus::Live {
            info!("Video feed live");
        }
        self.status = FeedStatus::Live;

        FeedUpdate {
            show_stream: true,
            show_no_feed: false,
            refreshed_src: None,
        }
    }

    /// Applies a failed probe.
    ///
    /// Below the retry budget the stream is re-requested with a fresh
    /// cache-busting parameter; at the budget the monitor commits to
    /// `Failed` and stops refreshing. Further failures in `Failed` change
    /// nothing.
    pub fn record_failure(&mut self, now_millis: i64) -> FeedUpdate {
        if self.status == FeedStatus::Failed {
            return FeedUpdate {
                show_stream: false,
                show_no_feed: true,
                refreshed_src: None,
            };
        }

        let count = match self.status {
            FeedStatus::Degraded(n) => n + 1,
            _ => 1,
        };

        // The max_retries-th consecutive failure is final: with the default
        // of 5, the stream element is re-requested four times and the fifth
        // failure raises the persistent message
        if count >= self.max_retries {
            warn!(
                "Video feed failed after {} consecutive probe failures",
                count
            );
            self.status = FeedStatus::Failed;
            return FeedUpdate {
                show_stream: false,
                show_no_feed: true,
                refreshed_src: None,
            };
        }

        debug!("Video feed probe failed ({}/{})", count, self.max_retries);
        self.status = FeedStatus::Degraded(count);

        FeedUpdate {
            show_stream: false,
            show_no_feed: true,
            refreshed_src: Some(self.stream_url(now_millis)),
        }
    }

    /// User-triggered retry out of `Failed`: re-request the stream and wait
    /// for the next probe.
    pub fn manual_refresh(&mut self, now_millis: i64) -> FeedUpdate {
        info!("Manual feed refresh requested");
        self.status = FeedStatus::Degraded(0);

        FeedUpdate {
            show_stream: false,
            show_no_feed: true,
            refreshed_src: Some(self.stream_url(now_millis)),
        }
    }
}
