// ── Alert feed ──
//
// Client-side newest-first alert collection. Full and location-scoped
// loads replace it wholesale; push events and created alerts are
// prepended without re-sorting. Every replace-load takes a monotonically
// increasing token and a response is applied only if its token is still
// the latest one issued.

mod filter;
mod push;
mod stream;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use prepwise_api::BackendClient;
use prepwise_api::backend::models::AlertRecord;

use crate::convert::{NEARBY_LOCATION, alert_from_record, new_alert_request};
use crate::error::CoreError;
use crate::model::{Alert, AlertDraft, AlertId, Capability, Coordinates, Session};

pub use filter::{AlertFilter, parse_kind_selector, parse_severity_selector};
pub use push::spawn_push_bridge;
pub use stream::{AlertSnapshot, AlertStream};

/// Page size for the full load.
pub const PAGE_SIZE: u32 = 50;
/// Lifetime of alerts created without publish rights.
pub const LOCAL_ALERT_DAYS: i64 = 7;
pub const LOCAL_ALERT_SOURCE: &str = "system";

const NOTIFICATION_CAPACITY: usize = 64;

/// Ticket for one replace-load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadToken(u64);

/// What happened to a load response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The collection was replaced with `count` alerts.
    Applied { count: usize },
    /// A newer load was issued first; the response was dropped.
    Stale,
    /// The load failed; the previous collection is kept.
    Failed,
}

pub struct AlertFeed {
    alerts: watch::Sender<AlertSnapshot>,
    generation: AtomicU64,
    last_sync_error: watch::Sender<Option<String>>,
    last_sync: watch::Sender<Option<DateTime<Utc>>>,
    viewport: watch::Sender<Coordinates>,
    notifications: broadcast::Sender<String>,
}

impl Default for AlertFeed {
    fn default() -> Self {
        Self::new(Coordinates::FALLBACK)
    }
}

impl AlertFeed {
    pub fn new(viewport: Coordinates) -> Self {
        let (alerts, _) = watch::channel(Arc::new(Vec::new()));
        let (last_sync_error, _) = watch::channel(None);
        let (last_sync, _) = watch::channel(None);
        let (viewport, _) = watch::channel(viewport);
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            alerts,
            generation: AtomicU64::new(0),
            last_sync_error,
            last_sync,
            viewport,
            notifications,
        }
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> AlertSnapshot {
        self.alerts.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.borrow().is_empty()
    }

    pub fn subscribe(&self) -> AlertStream {
        AlertStream::new(self.alerts.subscribe())
    }

    /// Transient user notifications, e.g. `"New alert: <title>"`.
    pub fn notifications(&self) -> broadcast::Receiver<String> {
        self.notifications.subscribe()
    }

    /// Message of the most recent failed load, cleared by the next
    /// successful one.
    pub fn last_sync_error(&self) -> Option<String> {
        self.last_sync_error.borrow().clone()
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.borrow()
    }

    pub fn viewport(&self) -> Coordinates {
        *self.viewport.borrow()
    }

    /// Filter the current collection. Order is preserved.
    pub fn project(&self, filter: &AlertFilter) -> Vec<Arc<Alert>> {
        self.alerts
            .borrow()
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &AlertId) -> Option<Arc<Alert>> {
        self.alerts.borrow().iter().find(|a| a.id == *id).cloned()
    }

    // ── Replace-loads ───────────────────────────────────────────────

    /// Issue a token for a new replace-load. Any earlier outstanding token
    /// becomes stale.
    pub fn begin_load(&self) -> LoadToken {
        LoadToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_latest(&self, token: LoadToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Apply a load result under `token`. On success the collection is
    /// replaced and, when `recenter` is set, the viewport moves there.
    pub fn apply_load(
        &self,
        token: LoadToken,
        result: Result<Vec<Alert>, CoreError>,
        recenter: Option<Coordinates>,
    ) -> LoadOutcome {
        if !self.is_latest(token) {
            debug!(token = token.0, "discarding stale alert load");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(alerts) => {
                let count = alerts.len();
                self.alerts
                    .send_replace(Arc::new(alerts.into_iter().map(Arc::new).collect()));
                self.last_sync_error.send_replace(None);
                self.last_sync.send_replace(Some(Utc::now()));
                if let Some(center) = recenter {
                    self.viewport.send_replace(center);
                }
                debug!(count, "alert feed replaced");
                LoadOutcome::Applied { count }
            }
            Err(e) => {
                warn!(error = %e, "alert load failed, keeping previous alerts");
                self.last_sync_error.send_replace(Some(e.to_string()));
                LoadOutcome::Failed
            }
        }
    }

    /// Load the active alerts. Failures are recorded, never returned.
    pub async fn load_all(&self, backend: &BackendClient) -> LoadOutcome {
        let token = self.begin_load();
        let result = backend
            .list_alerts(true, PAGE_SIZE)
            .await
            .map(|records| records.into_iter().map(Alert::from).collect())
            .map_err(CoreError::from);
        self.apply_load(token, result, None)
    }

    /// Load alerts within `radius_km` of `center`. Records without
    /// coordinates are placed at `center`. Recenters the viewport on
    /// success.
    pub async fn load_by_location(
        &self,
        backend: &BackendClient,
        center: Coordinates,
        radius_km: u32,
    ) -> LoadOutcome {
        let token = self.begin_load();
        let result = backend
            .alerts_near(center.lat, center.lng, radius_km)
            .await
            .map(|records| {
                records
                    .into_iter()
                    .map(|r| alert_from_record(r, center, NEARBY_LOCATION))
                    .collect()
            })
            .map_err(CoreError::from);
        self.apply_load(token, result, Some(center))
    }

    // ── Prepends ────────────────────────────────────────────────────

    fn prepend(&self, alert: Alert) -> Arc<Alert> {
        let alert = Arc::new(alert);
        let head = Arc::clone(&alert);
        self.alerts.send_modify(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(head);
            next.extend(current.iter().cloned());
            *current = Arc::new(next);
        });
        alert
    }

    /// A record delivered by the push channel. Always prepended and
    /// always announced.
    pub fn on_push(&self, record: AlertRecord) -> Arc<Alert> {
        let alert = self.prepend(Alert::from(record));
        let message = format!("New alert: {}", alert.title);
        info!(id = %alert.id, "{message}");
        // No subscribers is fine.
        let _ = self.notifications.send(message);
        alert
    }

    /// Synthesize an alert locally and prepend it.
    pub fn create_local(&self, draft: &AlertDraft) -> Arc<Alert> {
        let now = Utc::now();
        let alert = Alert {
            id: AlertId::new_local(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            kind: draft.kind.clone(),
            severity: draft.severity,
            location: draft.location.clone(),
            coordinates: Coordinates::FALLBACK,
            issued_at: Some(now),
            expires_at: Some(now + ChronoDuration::days(LOCAL_ALERT_DAYS)),
            source: LOCAL_ALERT_SOURCE.to_owned(),
            active: true,
        };
        debug!(id = %alert.id, "created local alert");
        self.prepend(alert)
    }

    /// Create an alert from user input.
    ///
    /// With publish rights the alert is sent to the backend and the
    /// server's echo is prepended; a failed publish commits nothing and
    /// returns the error. Without publish rights it is created locally.
    pub async fn create(
        &self,
        draft: &AlertDraft,
        session: Option<&Session>,
        backend: &BackendClient,
    ) -> Result<Arc<Alert>, CoreError> {
        if !draft.is_complete() {
            return Err(CoreError::validation(
                "title, description and location are required",
            ));
        }

        if session.is_some_and(|s| s.can(Capability::PublishAlerts)) {
            let record = backend.create_alert(&new_alert_request(draft)).await?;
            let alert = self.prepend(Alert::from(record));
            info!(id = %alert.id, "alert published");
            Ok(alert)
        } else {
            Ok(self.create_local(draft))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{HazardKind, Severity};
    use pretty_assertions::assert_eq;

    fn record(id: &str, kind: &str, severity: &str) -> AlertRecord {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "title": format!("Alert {id}"),
            "type": kind,
            "severity": severity,
            "isActive": true,
        }))
        .unwrap()
    }

    fn loaded(feed: &AlertFeed, records: Vec<AlertRecord>) {
        let token = feed.begin_load();
        let alerts = records.into_iter().map(Alert::from).collect();
        assert!(matches!(
            feed.apply_load(token, Ok(alerts), None),
            LoadOutcome::Applied { .. }
        ));
    }

    fn ids(alerts: &[Arc<Alert>]) -> Vec<String> {
        alerts.iter().map(|a| a.id.to_string()).collect()
    }

    #[test]
    fn push_prepends_and_keeps_order() {
        let feed = AlertFeed::default();
        loaded(
            &feed,
            vec![
                record("a1", "flood", "high"),
                record("a2", "fire", "low"),
                record("a3", "cyclone", "critical"),
            ],
        );
        let before = feed.len();
        feed.on_push(record("p1", "earthquake", "medium"));
        let snap = feed.snapshot();
        assert_eq!(snap.len(), before + 1);
        assert_eq!(ids(&snap), vec!["p1", "a1", "a2", "a3"]);
    }

    #[test]
    fn push_notifies_with_title() {
        let feed = AlertFeed::default();
        let mut rx = feed.notifications();
        feed.on_push(record("p1", "fire", "high"));
        assert_eq!(rx.try_recv().unwrap(), "New alert: Alert p1");
    }

    #[test]
    fn project_by_kind_preserves_order() {
        let feed = AlertFeed::default();
        loaded(
            &feed,
            vec![
                record("a1", "fire", "high"),
                record("a2", "flood", "high"),
                record("a3", "fire", "low"),
                record("a4", "earthquake", "low"),
            ],
        );
        let fires = feed.project(&AlertFilter::default().kind(HazardKind::Fire));
        assert_eq!(ids(&fires), vec!["a1", "a3"]);
        assert_eq!(feed.len(), 4);
    }

    #[test]
    fn project_matches_unknown_kind_in_any_case() {
        let feed = AlertFeed::default();
        loaded(
            &feed,
            vec![
                record("a1", "Tsunami", "high"),
                record("a2", "flood", "high"),
                record("a3", "TSUNAMI", "low"),
            ],
        );
        let selector = parse_kind_selector("tsunami").unwrap();
        let hits = feed.project(&AlertFilter::default().kind(selector));
        assert_eq!(ids(&hits), vec!["a1", "a3"]);
    }

    #[test]
    fn project_ands_predicates() {
        let feed = AlertFeed::default();
        let mut inactive = record("a3", "fire", "high");
        inactive.is_active = Some(false);
        loaded(
            &feed,
            vec![
                record("a1", "fire", "high"),
                record("a2", "fire", "low"),
                inactive,
            ],
        );
        let filter = AlertFilter::default()
            .kind(HazardKind::Fire)
            .severity(Severity::High)
            .active_only();
        assert_eq!(ids(&feed.project(&filter)), vec!["a1"]);
        assert_eq!(feed.project(&AlertFilter::default()).len(), 3);
    }

    #[test]
    fn failed_load_keeps_collection_and_records_error() {
        let feed = AlertFeed::default();
        loaded(&feed, vec![record("a1", "flood", "high")]);

        let token = feed.begin_load();
        let outcome = feed.apply_load(
            token,
            Err(CoreError::ConnectionFailed {
                reason: "refused".into(),
            }),
            None,
        );
        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(ids(&feed.snapshot()), vec!["a1"]);
        assert!(feed.last_sync_error().unwrap().contains("refused"));

        loaded(&feed, vec![record("a2", "fire", "low")]);
        assert!(feed.last_sync_error().is_none());
    }

    #[test]
    fn stale_response_is_discarded() {
        let feed = AlertFeed::default();
        let slow = feed.begin_load();
        let fast = feed.begin_load();

        let fast_alerts = vec![Alert::from(record("fast", "fire", "low"))];
        assert_eq!(
            feed.apply_load(fast, Ok(fast_alerts), None),
            LoadOutcome::Applied { count: 1 }
        );
        let slow_alerts = vec![Alert::from(record("slow", "flood", "high"))];
        assert_eq!(
            feed.apply_load(slow, Ok(slow_alerts), None),
            LoadOutcome::Stale
        );
        assert_eq!(ids(&feed.snapshot()), vec!["fast"]);
    }

    #[test]
    fn recenter_only_on_success() {
        let feed = AlertFeed::default();
        let center = Coordinates::new(19.07, 72.87);

        let token = feed.begin_load();
        feed.apply_load(
            token,
            Err(CoreError::Internal("boom".into())),
            Some(center),
        );
        assert_eq!(feed.viewport(), Coordinates::FALLBACK);

        let token = feed.begin_load();
        feed.apply_load(token, Ok(Vec::new()), Some(center));
        assert_eq!(feed.viewport(), center);
    }

    #[test]
    fn local_alert_shape() {
        let feed = AlertFeed::default();
        loaded(&feed, vec![record("a1", "flood", "high")]);
        let draft = AlertDraft::new("Gas leak", "Lab 3 evacuated", "Science block");
        let alert = feed.create_local(&draft);

        assert!(alert.id.is_local());
        assert_eq!(alert.source, "system");
        assert!(alert.active);
        let issued = alert.issued_at.unwrap();
        assert_eq!(alert.expires_at.unwrap() - issued, ChronoDuration::days(7));
        assert_eq!(feed.snapshot()[0].id, alert.id);
        assert_eq!(feed.len(), 2);
    }

    #[tokio::test]
    async fn arrivals_report_only_new_alerts() {
        let feed = AlertFeed::default();
        loaded(&feed, vec![record("a1", "flood", "high")]);
        let mut stream = feed.subscribe();
        assert_eq!(ids(stream.current()), vec!["a1"]);

        feed.on_push(record("p1", "fire", "high"));
        assert_eq!(ids(&stream.arrivals().await.unwrap()), vec!["p1"]);

        loaded(
            &feed,
            vec![
                record("a2", "cyclone", "critical"),
                record("p1", "fire", "high"),
                record("a1", "flood", "high"),
            ],
        );
        assert_eq!(ids(&stream.arrivals().await.unwrap()), vec!["a2"]);
    }

    #[tokio::test]
    async fn subscribers_see_prepends() {
        let feed = AlertFeed::default();
        let mut stream = feed.subscribe();
        assert!(stream.current().is_empty());
        feed.on_push(record("p1", "fire", "high"));
        let snap = stream.changed().await.unwrap();
        assert_eq!(ids(&snap), vec!["p1"]);
    }
}
