//! Calendar relay endpoint
//!
//! The calendar export URL is carried in the request path, optionally
//! percent-encoded, e.g.
//! `GET /https://www.fh-muenster.de:443/qisserver/...Export.faces?user=...&hash=...`

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use icsrelay_core::{RelayError, RelayResult};
use percent_encoding::percent_decode_str;

use crate::analytics::AnalyticsEvent;
use crate::fetch::fetch_calendar;
use crate::routes::{AppError, client_address};
use crate::state::AppState;

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

pub fn router() -> Router<AppState> {
    Router::new().route("/{*url}", get(clean_calendar))
}

/// GET /{url} - Fetch the calendar at `url` and return it cleaned
async fn clean_calendar(State(state): State<AppState>, request: Request) -> Response {
    let client = client_address(&request);

    match relay(&state, request.uri()).await {
        Ok(body) => {
            tracing::info!(%client, bytes = body.len(), "served cleaned calendar");
            state
                .analytics
                .track(&client, AnalyticsEvent::CalendarCleaned);

            (
                [
                    (
                        header::CONTENT_TYPE,
                        HeaderValue::from_static(CALENDAR_CONTENT_TYPE),
                    ),
                    (header::CONTENT_DISPOSITION, state.content_disposition.clone()),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => {
            match &err {
                RelayError::Decode(_) | RelayError::Unexpected(_) => {
                    tracing::error!(%client, error = %err, "relay failed")
                }
                _ => tracing::warn!(%client, error = %err, "relay request rejected"),
            }
            state
                .analytics
                .track(&client, AnalyticsEvent::for_error(&err));

            AppError(err).into_response()
        }
    }
}

async fn relay(state: &AppState, uri: &Uri) -> RelayResult<Vec<u8>> {
    let url = requested_url(uri)?;
    if !state.policy.is_allowed(&url) {
        return Err(RelayError::InvalidUrl);
    }

    let raw = fetch_calendar(&state.http, &url).await?;
    state.rules.clean(&raw)
}

/// Rebuild the calendar URL from the request path (percent-decoded) and
/// the raw query string.
pub fn requested_url(uri: &Uri) -> RelayResult<String> {
    let path = uri.path().strip_prefix('/').unwrap_or(uri.path());
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| RelayError::InvalidUrl)?;

    Ok(match uri.query() {
        Some(query) if !query.is_empty() => format!("{decoded}?{query}"),
        _ => decoded.into_owned(),
    })
}
