#![allow(clippy::unwrap_used)]
// Integration tests for `PanelClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vigil_api::models::{ActionRequest, IgnoreRequest, ScheduleRequest};
use vigil_api::{Error, PanelClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, PanelClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = PanelClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Building tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_buildings() {
    let (server, client) = setup().await;

    let body = json!([
        { "id": 1, "name": "North Annex", "start_time": "09:00", "end_time": "17:00" },
        { "id": 2, "name": "Depot", "time": "06:30" }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let buildings = client.list_buildings().await.unwrap();

    assert_eq!(buildings.len(), 2);
    assert_eq!(buildings[0].name, "North Annex");
    assert_eq!(buildings[0].start_time.as_deref(), Some("09:00"));
    assert_eq!(buildings[0].end_time.as_deref(), Some("17:00"));
    assert_eq!(buildings[1].time.as_deref(), Some("06:30"));
    assert!(buildings[1].start_time.is_none());
}

#[tokio::test]
async fn test_set_building_schedule() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/buildings/7/time"))
        .and(body_partial_json(json!({
            "building_id": 7,
            "start_time": "08:00",
            "end_time": "18:00"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "building_id": 7,
            "start_time": "08:00",
            "end_time": "18:00",
            "updated": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_building_schedule(&ScheduleRequest {
            building_id: 7,
            start_time: Some("08:00".into()),
            end_time: Some("18:00".into()),
            time: None,
        })
        .await
        .unwrap();
}

// ── Device tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices_with_query() {
    let (server, client) = setup().await;

    let body = json!([
        {
            "id": 101,
            "name": "Lobby Door",
            "state": "armed",
            "is_ignored_on_arm": false,
            "is_ignored_on_disarm": true
        },
        { "id": 102, "name": "Loading Bay", "state": "disarmed" }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .and(query_param("building", "3"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .and(query_param("search", "door"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let devices = client.list_devices(3, 100, 0, "door").await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].state.as_deref(), Some("armed"));
    assert!(devices[0].is_ignored_on_disarm);
    // Missing ignore fields default to false.
    assert!(!devices[1].is_ignored_on_arm);
}

#[tokio::test]
async fn test_list_devices_omits_empty_search() {
    let (server, client) = setup().await;

    // A mock matching the query exactly; an extra `search` param would miss it.
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .and(query_param("building", "1"))
        .and(query_param("limit", "50"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.list_devices(1, 50, 100, "").await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_perform_action_mixed_outcome() {
    let (server, client) = setup().await;

    let body = json!({
        "success_count": 2,
        "failure_count": 1,
        "details": [
            { "device_id": 1, "status": "Success", "message": null },
            { "device_id": 2, "status": "Success", "message": null },
            { "device_id": 3, "status": "Failure", "message": "locked" }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/api/devices/action"))
        .and(body_partial_json(json!({
            "device_ids": [1, 2, 3],
            "action": "arm"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let summary = client
        .perform_action(&ActionRequest {
            device_ids: vec![1, 2, 3],
            action: "arm".into(),
        })
        .await
        .unwrap();

    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.failure_count, 1);
    assert_eq!(summary.details.len(), 3);
    assert_eq!(summary.details[2].status, "Failure");
    assert_eq!(summary.details[2].message.as_deref(), Some("locked"));
}

// ── Ignore flag tests ───────────────────────────────────────────────

#[tokio::test]
async fn test_set_ignore_flags() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/proevents/ignore"))
        .and(body_partial_json(json!({
            "device_id": 42,
            "ignore_on_arm": true,
            "ignore_on_disarm": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_ignore_flags(&IgnoreRequest {
            device_id: 42,
            ignore_on_arm: true,
            ignore_on_disarm: false,
        })
        .await
        .unwrap();
}

// ── Panel tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_panel_status_roundtrip() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/panel_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "armed": true })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/panel_status"))
        .and(body_partial_json(json!({ "armed": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "armed": false })))
        .mount(&server)
        .await;

    assert!(client.panel_status().await.unwrap().armed);
    assert!(!client.set_panel_status(false).await.unwrap().armed);
}

// ── Error decoding tests ────────────────────────────────────────────

#[tokio::test]
async fn test_error_body_detail_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "detail": "A building ID is required." })),
        )
        .mount(&server)
        .await;

    let result = client.list_devices(9, 100, 0, "").await;

    match result {
        Err(Error::Api { message, status }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "A building ID is required.");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_without_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/buildings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let result = client.list_buildings().await;

    match result {
        Err(Error::Api { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.list_buildings().await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}
