use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::get;
use reqwest::Client;
use serde_json::Value;
use tokio::net::TcpListener;

use icsrelay::analytics::{Analytics, AnalyticsEvent};
use icsrelay::config::Config;
use icsrelay::state::AppState;

const CALENDAR: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Datenbanken - Praktikum\r\n\
ORGANIZER;CN=Dozent:mailto:dozent@fh-muenster.de\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

#[derive(Default)]
struct RecordingAnalytics {
    events: Mutex<Vec<(String, AnalyticsEvent)>>,
}

impl RecordingAnalytics {
    fn events(&self) -> Vec<(String, AnalyticsEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl Analytics for RecordingAnalytics {
    fn track(&self, client: &str, event: AnalyticsEvent) {
        self.events.lock().unwrap().push((client.to_string(), event));
    }
}

/// Fake calendar export. `mode=missing` answers 404, `mode=slow` stalls,
/// `mode=binary` returns bytes that are not UTF-8, `mode=redirect` sends
/// the client to an HTML login page.
async fn export(Query(params): Query<HashMap<String, String>>) -> axum::response::Response {
    use axum::response::IntoResponse;

    match params.get("mode").map(String::as_str) {
        Some("missing") => (StatusCode::NOT_FOUND, "no such timetable").into_response(),
        Some("slow") => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            CALENDAR.into_response()
        }
        Some("binary") => vec![0xffu8, 0xfe, 0x00].into_response(),
        Some("redirect") => Redirect::temporary("/login").into_response(),
        _ => CALENDAR.into_response(),
    }
}

async fn spawn_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/export.ics", get(export))
        .route("/login", get(|| async { "<html>login page</html>" }));
    tokio::spawn(async move { axum::serve(listener, app).await });
    addr
}

struct Relay {
    addr: SocketAddr,
    upstream: SocketAddr,
    analytics: Arc<RecordingAnalytics>,
}

impl Relay {
    async fn start() -> Self {
        let upstream = spawn_upstream().await;
        Self::start_for(upstream).await
    }

    async fn start_for(upstream: SocketAddr) -> Self {
        let config = Config {
            allowed_url: Some(format!("http://{upstream}/export.ics?user=&hash=")),
            fetch_timeout_secs: 1,
            ..Config::default()
        };
        let analytics = Arc::new(RecordingAnalytics::default());
        let state = AppState::from_config(&config)
            .unwrap()
            .with_analytics(analytics.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(icsrelay::serve(listener, state));

        Relay {
            addr,
            upstream,
            analytics,
        }
    }

    fn url(&self, query: &str) -> String {
        format!("http://{}/http://{}/export.ics?{}", self.addr, self.upstream, query)
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn serves_cleaned_calendar() {
    let relay = Relay::start().await;

    let response = Client::new()
        .get(relay.url("user=jdoe&hash=abc123"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(
        headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/calendar")
    );
    assert_eq!(
        headers["content-disposition"],
        "attachment; filename=CleanedCalendar.ics"
    );

    let body = response.text().await.unwrap();
    assert!(body.contains("SUMMARY:Datenbanken - Praktikum\r\n"));
    assert!(!body.contains("ORGANIZER"));

    let events = relay.analytics.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "127.0.0.1");
    assert_eq!(events[0].1, AnalyticsEvent::CalendarCleaned);
}

#[tokio::test]
async fn accepts_percent_encoded_url() {
    let relay = Relay::start().await;
    let url = format!(
        "http://{}/http%3A%2F%2F{}%2Fexport.ics?hash=abc123&user=jdoe&extra=1",
        relay.addr, relay.upstream
    );

    let response = Client::new().get(url).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.text().await.unwrap().contains("ORGANIZER"));
}

#[tokio::test]
async fn missing_hash_is_rejected() {
    let relay = Relay::start().await;

    let response = Client::new()
        .get(relay.url("user=jdoe"))
        .header("x-forwarded-for", "198.51.100.4")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid URL schema");
    assert_eq!(
        relay.analytics.events(),
        vec![("198.51.100.4".to_string(), AnalyticsEvent::HttpError)]
    );
}

#[tokio::test]
async fn foreign_host_is_rejected() {
    let relay = Relay::start().await;
    let url = format!(
        "http://{}/http://example.org/export.ics?user=a&hash=b&next=http://{}/export.ics",
        relay.addr, relay.upstream
    );

    let response = Client::new().get(url).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_404_is_propagated() {
    let relay = Relay::start().await;

    let response = Client::new()
        .get(relay.url("user=jdoe&hash=abc123&mode=missing"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let message = error_message(response).await;
    assert!(message.contains("no such timetable"), "{message}");
    assert_eq!(relay.analytics.events()[0].1, AnalyticsEvent::HttpError);
}

#[tokio::test]
async fn upstream_redirect_is_not_followed() {
    let relay = Relay::start().await;

    let response = Client::new()
        .get(relay.url("user=jdoe&hash=abc123&mode=redirect"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let message = error_message(response).await;
    assert!(message.starts_with("HTTP error"), "{message}");
    assert!(!message.contains("login page"), "{message}");
    assert_eq!(relay.analytics.events()[0].1, AnalyticsEvent::HttpError);
}

#[tokio::test]
async fn upstream_timeout_is_503() {
    let relay = Relay::start().await;

    let response = Client::new()
        .get(relay.url("user=jdoe&hash=abc123&mode=slow"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(error_message(response).await.starts_with("Error fetching the iCal file"));
    assert_eq!(relay.analytics.events()[0].1, AnalyticsEvent::RequestError);
}

#[tokio::test]
async fn unreachable_upstream_is_503() {
    // Reserve a port, then close it so nothing is listening there
    let closed = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let relay = Relay::start_for(closed).await;

    let response = Client::new()
        .get(relay.url("user=jdoe&hash=abc123"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn undecodable_calendar_is_500() {
    let relay = Relay::start().await;

    let response = Client::new()
        .get(relay.url("user=jdoe&hash=abc123&mode=binary"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_message(response).await.starts_with("An unexpected error occurred"));
    assert_eq!(relay.analytics.events()[0].1, AnalyticsEvent::UnexpectedError);
}

#[tokio::test]
async fn homepage_describes_service() {
    let relay = Relay::start().await;

    let response = Client::new()
        .get(format!("http://{}/", relay.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["service"], "icsrelay");
    assert_eq!(
        relay.analytics.events(),
        vec![("127.0.0.1".to_string(), AnalyticsEvent::HomepageVisited)]
    );
}
