// Alert feed against a mocked backend.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prepwise_api::BackendClient;
use prepwise_api::backend::models::AlertRecord;
use prepwise_core::{AlertFeed, AlertFilter, Coordinates, HazardKind, LoadOutcome, Severity};

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&format!("{}/api", server.uri())).unwrap();
    (server, BackendClient::with_client(reqwest::Client::new(), base))
}

fn ids(feed: &AlertFeed) -> Vec<String> {
    feed.snapshot().iter().map(|a| a.id.to_string()).collect()
}

#[tokio::test]
async fn test_load_all_then_push_then_project() {
    let (server, backend) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .and(query_param("active", "true"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "_id": "a1",
                "title": "River Ganga above danger mark",
                "type": "flood",
                "severity": "high",
                "isActive": true
            }]
        })))
        .mount(&server)
        .await;

    let feed = AlertFeed::default();
    assert_eq!(
        feed.load_all(&backend).await,
        LoadOutcome::Applied { count: 1 }
    );

    let pushed: AlertRecord = serde_json::from_value(json!({
        "_id": "a2",
        "title": "Kitchen fire, Block C",
        "type": "fire",
        "severity": "low",
        "isActive": true
    }))
    .unwrap();
    feed.on_push(pushed);
    assert_eq!(ids(&feed), vec!["a2", "a1"]);

    let high = feed.project(&AlertFilter::default().severity(Severity::High));
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].id.to_string(), "a1");
    assert_eq!(high[0].kind, HazardKind::Flood);
    assert_eq!(high[0].coordinates, Coordinates::FALLBACK);
    assert_eq!(high[0].location, "Unknown");
}

#[tokio::test]
async fn test_failed_load_keeps_previous_alerts() {
    let (server, backend) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "_id": "a1", "title": "Heatwave", "type": "heatwave" }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "database down" })),
        )
        .mount(&server)
        .await;

    let feed = AlertFeed::default();
    feed.load_all(&backend).await;
    assert_eq!(feed.load_all(&backend).await, LoadOutcome::Failed);
    assert_eq!(ids(&feed), vec!["a1"]);
    assert!(feed.last_sync_error().is_some());
}

#[tokio::test]
async fn test_load_by_location_uses_query_point_and_recenters() {
    let (server, backend) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts/location"))
        .and(query_param("radius", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "_id": "n1", "title": "Landslide risk", "location": { "name": "Ridge Road" } },
                { "_id": "n2", "title": "Road flooding",
                  "location": { "coordinates": { "lat": 12.98, "lng": 77.6 } } }
            ]
        })))
        .mount(&server)
        .await;

    let feed = AlertFeed::default();
    let center = Coordinates::new(12.97, 77.59);
    assert_eq!(
        feed.load_by_location(&backend, center, 25).await,
        LoadOutcome::Applied { count: 2 }
    );

    let snap = feed.snapshot();
    assert_eq!(snap[0].coordinates, center);
    assert_eq!(snap[0].location, "Ridge Road");
    assert_eq!(snap[1].coordinates, Coordinates::new(12.98, 77.6));
    assert_eq!(snap[1].location, "Nearby");
    assert_eq!(feed.viewport(), center);
}

#[tokio::test]
async fn test_location_failure_does_not_recenter() {
    let (server, backend) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts/location"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let feed = AlertFeed::default();
    let outcome = feed
        .load_by_location(&backend, Coordinates::new(28.61, 77.2), 10)
        .await;
    assert_eq!(outcome, LoadOutcome::Failed);
    assert_eq!(feed.viewport(), Coordinates::FALLBACK);
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_null_fields_do_not_fail_the_page() {
    let (server, backend) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "_id": "a1", "title": "Gas leak", "description": null,
                  "location": { "name": null, "coordinates": null }, "severity": null },
                { "_id": "a2", "title": null, "type": "fire" }
            ]
        })))
        .mount(&server)
        .await;

    let feed = AlertFeed::default();
    assert_eq!(
        feed.load_all(&backend).await,
        LoadOutcome::Applied { count: 2 }
    );
    assert!(feed.last_sync_error().is_none());

    let snap = feed.snapshot();
    assert_eq!(snap[0].description, "");
    assert_eq!(snap[0].location, "Unknown");
    assert_eq!(snap[0].coordinates, Coordinates::FALLBACK);
    assert_eq!(snap[1].kind, HazardKind::Fire);
}
