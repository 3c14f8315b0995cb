// Live alerts: portal push bridge against a local WebSocket server.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prepwise_core::{LoadOutcome, Portal, PortalConfig};

const WAIT: Duration = Duration::from_secs(5);

async fn setup() -> (MockServer, TcpListener, Portal) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "token": "tok-1",
                "_id": "u1",
                "name": "Asha",
                "email": "asha@school.test",
                "role": "student",
                "institution": "Central High"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "_id": "a1", "title": "Heatwave", "type": "heatwave" }]
        })))
        .mount(&server)
        .await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = PortalConfig::new(Url::parse(&format!("{}/api", server.uri())).unwrap());
    config.push_url = Some(
        Url::parse(&format!("ws://{}/push", listener.local_addr().unwrap())).unwrap(),
    );
    config.reconnect.initial_delay = Duration::from_millis(10);
    (server, listener, Portal::new(config).unwrap())
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

async fn next_message(ws: &mut WebSocketStream<TcpStream>) -> Message {
    timeout(WAIT, ws.next()).await.unwrap().unwrap().unwrap()
}

async fn next_json(ws: &mut WebSocketStream<TcpStream>) -> serde_json::Value {
    match next_message(ws).await {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

fn new_alert(id: &str, title: &str) -> Message {
    let frame = json!({
        "event": "new-alert",
        "data": { "_id": id, "title": title, "description": null, "type": "cyclone" }
    });
    Message::text(frame.to_string())
}

#[tokio::test]
async fn test_live_push_lands_first_and_stops_on_teardown() {
    let (_server, listener, portal) = setup().await;
    portal
        .login("asha@school.test", &SecretString::from("pw".to_owned()))
        .await
        .unwrap();
    assert_eq!(
        portal.refresh_alerts().await,
        LoadOutcome::Applied { count: 1 }
    );

    let mut notes = portal.start_live().await.unwrap();
    let mut ws = accept(&listener).await;

    let user = next_json(&mut ws).await;
    assert_eq!(user["event"], "join-user");
    assert_eq!(user["data"], "u1");
    let institution = next_json(&mut ws).await;
    assert_eq!(institution["event"], "join-institution");
    assert_eq!(institution["data"], "Central High");

    ws.send(new_alert("p1", "Cyclone warning")).await.unwrap();
    let note = timeout(WAIT, notes.recv()).await.unwrap().unwrap();
    assert_eq!(note, "New alert: Cyclone warning");

    let snap = portal.feed().snapshot();
    assert_eq!(snap.len(), 2);
    assert_eq!(snap[0].id.to_string(), "p1");
    assert_eq!(snap[0].description, "");
    assert_eq!(snap[1].id.to_string(), "a1");

    portal.stop_live().await;
    assert!(matches!(next_message(&mut ws).await, Message::Close(_)));

    // The socket is closed; a late frame goes nowhere.
    let _ = ws.send(new_alert("p2", "Late alert")).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(portal.feed().len(), 2);
    assert!(
        timeout(Duration::from_millis(300), listener.accept())
            .await
            .is_err()
    );
}
