//! Usage analytics.
//!
//! Events are keyed by client address and event name. The relay only knows
//! the [`Analytics`] trait; the default sink writes structured `tracing`
//! events on the `analytics` target.

use std::fmt;
use std::sync::Arc;

use icsrelay_core::RelayError;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    HomepageVisited,
    CalendarCleaned,
    RequestError,
    HttpError,
    UnexpectedError,
}

impl AnalyticsEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsEvent::HomepageVisited => "homepage_visited",
            AnalyticsEvent::CalendarCleaned => "calendar_cleaned",
            AnalyticsEvent::RequestError => "request_error",
            AnalyticsEvent::HttpError => "http_error",
            AnalyticsEvent::UnexpectedError => "unexpected_error",
        }
    }

    /// The event recorded when a relay request fails with `err`.
    pub fn for_error(err: &RelayError) -> Self {
        match err {
            RelayError::InvalidUrl | RelayError::UpstreamStatus { .. } => AnalyticsEvent::HttpError,
            RelayError::Transport(_) => AnalyticsEvent::RequestError,
            RelayError::Decode(_) | RelayError::Unexpected(_) => AnalyticsEvent::UnexpectedError,
        }
    }
}

impl fmt::Display for AnalyticsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for analytics events. Implementations must not block.
pub trait Analytics: Send + Sync {
    fn track(&self, client: &str, event: AnalyticsEvent);
}

pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn track(&self, client: &str, event: AnalyticsEvent) {
        tracing::info!(target: "analytics", client, event = event.as_str(), "analytics event");
    }
}

pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn track(&self, _client: &str, _event: AnalyticsEvent) {}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub enabled: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig { enabled: true }
    }
}

impl AnalyticsConfig {
    pub fn build(&self) -> Arc<dyn Analytics> {
        if self.enabled {
            Arc::new(TracingAnalytics)
        } else {
            Arc::new(NoopAnalytics)
        }
    }
}
