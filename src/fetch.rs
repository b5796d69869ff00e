//! Upstream calendar download.

use std::time::Duration;

use anyhow::{Context, Result};
use icsrelay_core::{RelayError, RelayResult};

/// Build the shared HTTP client. The timeout covers connect, headers and body.
///
/// Redirects are not followed: only the allow-listed URL is ever fetched,
/// and a 3xx answer is reported as an upstream status.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` once and return the body of a 2xx response.
///
/// Connection failures and timeouts become [`RelayError::Transport`];
/// other statuses become [`RelayError::UpstreamStatus`] carrying the body text.
pub async fn fetch_calendar(client: &reqwest::Client, url: &str) -> RelayResult<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RelayError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "upstream returned error status");
        return Err(RelayError::UpstreamStatus {
            status: status.as_u16(),
            body,
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| RelayError::Transport(e.to_string()))?;

    Ok(body.to_vec())
}
