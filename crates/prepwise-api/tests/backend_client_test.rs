// Integration tests for `BackendClient` using wiremock.
#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prepwise_api::backend::models::{
    ContactPayload, ContactQuery, CoordinatesRecord, NewAlertLocation, NewAlertRequest, Recipients,
};
use prepwise_api::{BackendClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = BackendClient::with_client(reqwest::Client::new(), base);
    (server, client)
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_token_for_later_calls() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "a@b.test", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "token": "tok-123",
                "_id": "u1",
                "name": "Asha",
                "email": "a@b.test",
                "role": "teacher",
                "institution": "Central High"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let record = client
        .login("a@b.test", &SecretString::from("pw".to_owned()))
        .await
        .unwrap();
    assert_eq!(record.role.as_deref(), Some("teacher"));
    assert!(client.has_token());

    let alerts = client.list_alerts(true, 50).await.unwrap();
    assert!(alerts.is_empty());
}

#[tokio::test]
async fn test_login_rejection_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = client
        .login("a@b.test", &SecretString::from("bad".to_owned()))
        .await
        .unwrap_err();
    match err {
        Error::Authentication { message } => assert_eq!(message, "Invalid credentials"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(!client.has_token());
}

// ── Alerts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_alerts_sends_active_and_limit() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .and(query_param("active", "true"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "_id": "a1", "title": "Flood watch", "type": "flood", "severity": "high",
                  "location": { "name": "Patna", "coordinates": { "lat": 25.6, "lng": 85.1 } },
                  "isActive": true },
                { "_id": "a2", "title": "Heatwave" }
            ]
        })))
        .mount(&server)
        .await;

    let alerts = client.list_alerts(true, 50).await.unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].kind.as_deref(), Some("flood"));
    assert_eq!(alerts[0].is_active, Some(true));
    assert!(alerts[1].location.is_none());
}

#[tokio::test]
async fn test_alerts_near_sends_radius() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/alerts/location"))
        .and(query_param("lat", "19.07"))
        .and(query_param("lng", "72.87"))
        .and(query_param("radius", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "_id": "n1", "title": "Near" }] })))
        .mount(&server)
        .await;

    let alerts = client.alerts_near(19.07, 72.87, 100).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].title, "Near");
}

#[tokio::test]
async fn test_create_alert_body_shape() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/alerts"))
        .and(body_json(json!({
            "title": "Drill at noon",
            "description": "All staff",
            "type": "earthquake",
            "severity": "medium",
            "location": { "name": "Campus", "coordinates": { "lat": 1.0, "lng": 2.0 }, "radius": 50 },
            "recipients": { "allUsers": true }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "_id": "srv-1", "title": "Drill at noon" }
        })))
        .mount(&server)
        .await;

    let request = NewAlertRequest {
        title: "Drill at noon".into(),
        description: "All staff".into(),
        kind: "earthquake".into(),
        severity: "medium".into(),
        location: NewAlertLocation {
            name: "Campus".into(),
            coordinates: CoordinatesRecord {
                lat: Some(1.0),
                lng: Some(2.0),
            },
            radius: 50,
        },
        recipients: Recipients { all_users: true },
    };
    let echo = client.create_alert(&request).await.unwrap();
    assert_eq!(echo.id.as_deref(), Some("srv-1"));
}

#[tokio::test]
async fn test_create_alert_forbidden() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Not allowed" })))
        .mount(&server)
        .await;

    let request = NewAlertRequest {
        title: "x".into(),
        description: "y".into(),
        kind: "other".into(),
        severity: "low".into(),
        location: NewAlertLocation {
            name: "Unknown".into(),
            coordinates: CoordinatesRecord {
                lat: Some(0.0),
                lng: Some(0.0),
            },
            radius: 50,
        },
        recipients: Recipients { all_users: true },
    };
    let err = client.create_alert(&request).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden { ref message } if message == "Not allowed"));
}

#[tokio::test]
async fn test_get_alert_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/alerts/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.get_alert("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_acknowledge_alert_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/alerts/a1/acknowledge"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.acknowledge_alert("a1").await.unwrap();
}

// ── Contacts ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_contacts_crud() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/contacts"))
        .and(query_param("q", "fire"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "_id": "0123456789abcdef01234567", "name": "Fire & Rescue", "type": "fire", "phone": "101" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/contacts/0123456789abcdef01234567"))
        .and(body_json(json!({ "favorite": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "_id": "0123456789abcdef01234567", "name": "Fire & Rescue", "favorite": true }
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/contacts/0123456789abcdef01234567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ContactQuery {
        q: Some("fire".into()),
        kind: None,
    };
    let contacts = client.list_contacts(&query).await.unwrap();
    assert_eq!(contacts[0].phone.as_deref(), Some("101"));

    let payload = ContactPayload {
        favorite: Some(true),
        ..ContactPayload::default()
    };
    let updated = client
        .update_contact("0123456789abcdef01234567", &payload)
        .await
        .unwrap();
    assert_eq!(updated.favorite, Some(true));

    client
        .delete_contact("0123456789abcdef01234567")
        .await
        .unwrap();
}

// ── System ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_system_status_keeps_extra_fields() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/system/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "db": "connected", "uptime": 1234 }
        })))
        .mount(&server)
        .await;

    let status = client.system_status().await.unwrap();
    assert_eq!(status.db.as_deref(), Some("connected"));
    assert_eq!(status.extra["uptime"], 1234);
}

#[tokio::test]
async fn test_server_error_carries_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/admin-stats"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    let err = client.admin_stats().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, ref message } if message == "boom"));
}
