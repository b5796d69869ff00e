use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use icsrelay_core::{CleanRules, UrlPolicy};

use crate::analytics::Analytics;
use crate::config::Config;
use crate::fetch::build_client;

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<UrlPolicy>,
    pub rules: Arc<CleanRules>,
    pub http: reqwest::Client,
    pub analytics: Arc<dyn Analytics>,
    pub content_disposition: HeaderValue,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let content_disposition =
            HeaderValue::from_str(&format!("attachment; filename={}", config.attachment_filename))
                .context("attachment_filename is not a valid header value")?;

        Ok(AppState {
            policy: Arc::new(config.url_policy()?),
            rules: Arc::new(config.rules.clone()),
            http: build_client(config.fetch_timeout(), &config.user_agent)?,
            analytics: config.analytics.build(),
            content_disposition,
        })
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn Analytics>) -> Self {
        self.analytics = analytics;
        self
    }
}
