//! Homepage endpoint

use axum::{Json, Router, extract::Request, extract::State, routing::get};
use serde::Serialize;

use crate::analytics::AnalyticsEvent;
use crate::routes::client_address;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

#[derive(Serialize)]
pub struct Homepage {
    pub service: &'static str,
    pub version: &'static str,
    pub usage: &'static str,
}

/// GET / - Describe the service
async fn home(State(state): State<AppState>, request: Request) -> Json<Homepage> {
    state
        .analytics
        .track(&client_address(&request), AnalyticsEvent::HomepageVisited);

    Json(Homepage {
        service: "icsrelay",
        version: env!("CARGO_PKG_VERSION"),
        usage: "GET /<calendar export URL> returns the calendar without organizer, attendee and description fields",
    })
}
