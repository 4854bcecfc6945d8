//! Calendar sync engine driven against the Google Calendar adapter
//!
//! Exercises the full HTTP surface (list, get, delete, insert) through
//! wiremock so query parameters and request bodies are checked end to end.

use std::sync::Arc;

use calbot_core::{CalendarSyncEngine, SyncOutcome, SyncSettings};
use calbot_domain::{CalendarConfig, EventCandidate, PhysicalTalk, TalkCategory};
use calbot_infra::{GoogleCalendarStore, HttpClient, TokenSource};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENTS_PATH: &str = "/calendars/primary/events";

fn talk() -> EventCandidate {
    EventCandidate::PhysicalTalk(PhysicalTalk {
        first_name: "Grace".into(),
        last_name: Some("Hopper".into()),
        talk_date: "2025-10-24T11:45".into(),
        location: "Gates 104".into(),
        short_description: "Compilers, then and now.".into(),
        lunch_provided: true,
        category: TalkCategory::MachineLearning,
    })
}

fn engine(server: &MockServer) -> CalendarSyncEngine {
    let http = HttpClient::builder().max_attempts(1).build().expect("http client");
    let store = GoogleCalendarStore::new(http, TokenSource::fixed("test-token"))
        .with_api_base(server.uri())
        .expect("mock server uri");
    let settings = SyncSettings::from_config(&CalendarConfig::default()).expect("settings");
    CalendarSyncEngine::new(Arc::new(store), settings)
}

#[tokio::test]
async fn creates_entry_when_the_day_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("timeMin", "2025-10-24T04:00:00Z"))
        .and(query_param("timeMax", "2025-10-25T04:00:00Z"))
        .and(query_param("singleEvents", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .and(body_partial_json(json!({
            "summary": "Grace's Talk",
            "location": "Gates 104",
            "start": { "dateTime": "2025-10-24T11:45:00", "timeZone": "America/New_York" },
            "end": { "dateTime": "2025-10-24T12:45:00", "timeZone": "America/New_York" },
            "reminders": {
                "useDefault": false,
                "overrides": [
                    { "method": "email", "minutes": 1440 },
                    { "method": "email", "minutes": 60 }
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-new",
            "summary": "Grace's Talk"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = engine(&server)
        .sync_candidate(&talk(), &["https://chat.example/p1".to_string()], false)
        .await
        .unwrap();

    match outcome {
        SyncOutcome::Created(entry) => assert_eq!(entry.id, "evt-new"),
        other => panic!("expected Created, got {other:?}"),
    }
}

#[tokio::test]
async fn overwrite_deletes_series_master_before_inserting() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "series-1_20251024T154500Z",
                "summary": "Grace's Talk",
                "recurringEventId": "series-1"
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{EVENTS_PATH}/series-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "series-1",
            "summary": "Grace's Talk",
            "recurrence": ["RRULE:FREQ=WEEKLY"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{EVENTS_PATH}/series-1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-replacement",
            "summary": "Grace's Talk"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = engine(&server).sync_candidate(&talk(), &[], true).await.unwrap();

    match outcome {
        SyncOutcome::Replaced { removed, created } => {
            assert_eq!(removed.entry().id, "series-1");
            assert_eq!(created.id, "evt-replacement");
        }
        other => panic!("expected Replaced, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_delete_leaves_calendar_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "evt-old", "summary": "Grace's Talk" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{EVENTS_PATH}/evt-old")))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "never" })))
        .expect(0)
        .mount(&server)
        .await;

    let result = engine(&server).sync_candidate(&talk(), &[], true).await;

    assert!(result.is_err());
}
