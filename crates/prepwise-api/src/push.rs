//! Push channel with auto-reconnect.
//!
//! Connects to the portal's push endpoint, joins the user and institution
//! rooms, and streams parsed events through a [`tokio::sync::broadcast`]
//! channel. Reconnects with exponential backoff + jitter, re-joining the
//! rooms on every new connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use prepwise_api::push::{PushEvent, PushHandle, PushRooms, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let url = Url::parse("wss://portal.example/push")?;
//! let rooms = PushRooms { user_id: Some("u1".into()), institution: None };
//!
//! let handle = PushHandle::connect(url, rooms, ReconnectConfig::default(), cancel, None).await?;
//! let mut rx = handle.subscribe();
//!
//! while let Ok(event) = rx.recv().await {
//!     if let PushEvent::NewAlert(alert) = event.as_ref() {
//!         println!("{}", alert.title);
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::backend::models::AlertRecord;
use crate::error::Error;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub const NEW_ALERT_EVENT: &str = "new-alert";
const JOIN_USER_EVENT: &str = "join-user";
const JOIN_INSTITUTION_EVENT: &str = "join-institution";

// ── Events ───────────────────────────────────────────────────────────

/// One frame on the push channel: `{ "event": "...", "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// A parsed push event.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// A newly published alert.
    NewAlert(AlertRecord),
    /// Any other event name, surfaced raw.
    Other { event: String, data: serde_json::Value },
}

/// Rooms to join after every (re)connect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushRooms {
    pub user_id: Option<String>,
    pub institution: Option<String>,
}

impl PushRooms {
    fn join_frames(&self) -> Vec<String> {
        let mut frames = Vec::with_capacity(2);
        if let Some(ref id) = self.user_id {
            frames.push(join_frame(JOIN_USER_EVENT, id));
        }
        if let Some(ref inst) = self.institution {
            frames.push(join_frame(JOIN_INSTITUTION_EVENT, inst));
        }
        frames
    }
}

fn join_frame(event: &str, room: &str) -> String {
    serde_json::json!({ "event": event, "data": room }).to_string()
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for push reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── PushHandle ───────────────────────────────────────────────────────

/// Handle to a running push subscription.
///
/// Call [`shutdown`](Self::shutdown) (or cancel the token passed to
/// [`connect`](Self::connect)) to tear down the background task.
pub struct PushHandle {
    event_rx: broadcast::Receiver<Arc<PushEvent>>,
    cancel: CancellationToken,
}

impl PushHandle {
    /// Spawn the connection loop and return immediately.
    ///
    /// The first connection attempt happens asynchronously. `token`, when
    /// present, is sent as a bearer `Authorization` header on the upgrade.
    pub async fn connect(
        url: Url,
        rooms: PushRooms,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
        token: Option<&SecretString>,
    ) -> Result<Self, Error> {
        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(Error::WebSocketConnect(format!(
                    "unsupported push URL scheme: {other}"
                )));
            }
        }

        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let auth = token.map(|t| format!("Bearer {}", t.expose_secret()));

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            push_loop(url, rooms, event_tx, reconnect, task_cancel, auth).await;
        });

        Ok(Self { event_rx, cancel })
    }

    /// A new receiver for the event stream. Slow consumers see
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PushEvent>> {
        self.event_rx.resubscribe()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

async fn push_loop(
    url: Url,
    rooms: PushRooms,
    event_tx: broadcast::Sender<Arc<PushEvent>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    auth: Option<String>,
) {
    let mut attempt: u32 = 0;

    // `connect_and_read` watches the token itself so it can close cleanly.
    while !cancel.is_cancelled() {
        match connect_and_read(&url, &rooms, &event_tx, &cancel, auth.as_deref()).await {
            Ok(()) => {
                if cancel.is_cancelled() {
                    break;
                }
                tracing::info!("push channel closed, reconnecting");
                attempt = 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "push channel error");

                if let Some(max) = reconnect.max_retries {
                    if attempt >= max {
                        tracing::error!(
                            max_retries = max,
                            "push reconnection limit reached, giving up"
                        );
                        break;
                    }
                }

                let delay = calculate_backoff(attempt, &reconnect);
                tracing::info!(
                    delay_ms = delay.as_millis() as u64,
                    attempt,
                    "waiting before reconnect"
                );

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }

                attempt += 1;
            }
        }
    }

    tracing::debug!("push loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

async fn connect_and_read(
    url: &Url,
    rooms: &PushRooms,
    event_tx: &broadcast::Sender<Arc<PushEvent>>,
    cancel: &CancellationToken,
    auth: Option<&str>,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to push channel");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let mut request = ClientRequestBuilder::new(uri);
    if let Some(value) = auth {
        request = request.with_header("Authorization", value);
    }

    let (ws_stream, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(()),
        connected = tokio_tungstenite::connect_async(request) => {
            connected.map_err(|e| Error::WebSocketConnect(e.to_string()))?
        }
    };

    tracing::info!("push channel connected");

    let (mut write, mut read) = ws_stream.split();

    for frame in rooms.join_frames() {
        write
            .send(tungstenite::Message::text(frame))
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;
    }

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                // The peer may already be gone.
                if let Err(e) = write.send(tungstenite::Message::Close(None)).await {
                    tracing::debug!(error = %e, "push close frame not sent");
                }
                return Ok(());
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_broadcast(text.as_str(), event_tx);
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "push close frame");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("push stream ended");
                        return Ok(());
                    }
                    _ => {}
                }
            }
        }
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// Decode a text frame into a [`PushEvent`]. `None` for malformed frames.
pub fn parse_event(text: &str) -> Option<PushEvent> {
    let frame: Frame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(error = %e, "malformed push frame");
            return None;
        }
    };

    if frame.event == NEW_ALERT_EVENT {
        match serde_json::from_value::<AlertRecord>(frame.data.clone()) {
            Ok(alert) => return Some(PushEvent::NewAlert(alert)),
            Err(e) => {
                tracing::debug!(error = %e, "new-alert payload did not decode, passing raw");
            }
        }
    }

    Some(PushEvent::Other {
        event: frame.event,
        data: frame.data,
    })
}

fn parse_and_broadcast(text: &str, event_tx: &broadcast::Sender<Arc<PushEvent>>) {
    if let Some(event) = parse_event(text) {
        // No subscribers is fine.
        let _ = event_tx.send(Arc::new(event));
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 +- 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(attempt.min(30) as i32);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * ((f64::from(attempt) * 7.3).sin());
    Duration::from_secs_f64((capped * jitter_factor).max(0.0))
}

// ── Tests ────────────────────────────────────────────────────────────
