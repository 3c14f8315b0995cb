// ── Portal facade ──
//
// One entry point for consumers: owns the backend and services clients,
// the current session, the alert feed and the live push subscription.
// Every privileged action goes through `require`, which consults
// `Role::allows` and nothing else.

use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use prepwise_api::backend::models::AdminStatsRecord;
use prepwise_api::services::{AirQuality, CurrentWeather, Forecast, GeneratedImage, ImageResult};
use prepwise_api::{
    BackendClient, PushHandle, PushRooms, Service, ServicesClient, TransportConfig,
};

use crate::config::PortalConfig;
use crate::contacts::{ContactBook, ContactCache};
use crate::convert::session_from_login;
use crate::error::CoreError;
use crate::feed::{AlertFeed, LoadOutcome, spawn_push_bridge};
use crate::model::{Alert, AlertDraft, AlertId, Capability, Coordinates, Session};

/// Database state as reported by `GET /system/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    pub reachable: bool,
    pub database: String,
}

const UNKNOWN_DATABASE: &str = "unknown";

impl SystemStatus {
    fn unknown() -> Self {
        Self {
            reachable: false,
            database: UNKNOWN_DATABASE.to_owned(),
        }
    }
}

struct LiveFeed {
    push: PushHandle,
    bridge: JoinHandle<()>,
    cancel: CancellationToken,
}

struct PortalInner {
    config: PortalConfig,
    backend: BackendClient,
    services: ServicesClient,
    session: RwLock<Option<Session>>,
    feed: Arc<AlertFeed>,
    live: Mutex<Option<LiveFeed>>,
}

/// Cheaply cloneable handle to one portal deployment.
#[derive(Clone)]
pub struct Portal {
    inner: Arc<PortalInner>,
}

impl Portal {
    pub fn new(config: PortalConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone(),
            timeout: config.timeout,
        };
        let backend = BackendClient::new(config.backend_url.clone(), &transport)?;
        let services = ServicesClient::new(config.endpoints.clone(), &transport)?;
        let feed = Arc::new(AlertFeed::new(config.location));

        Ok(Self {
            inner: Arc::new(PortalInner {
                config,
                backend,
                services,
                session: RwLock::new(None),
                feed,
                live: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    pub fn feed(&self) -> &Arc<AlertFeed> {
        &self.inner.feed
    }

    // ── Session ─────────────────────────────────────────────────────

    pub fn session(&self) -> Option<Session> {
        self.inner
            .session
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    /// Adopt a previously stored session.
    pub fn restore_session(&self, session: Session) {
        self.inner.backend.set_token(session.token.clone());
        *self.inner.session.write().expect("session lock poisoned") = Some(session);
    }

    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, CoreError> {
        let record = self.inner.backend.login(email, password).await?;
        let session = session_from_login(record)?;
        info!(user = %session.user.name, role = %session.user.role, "logged in");
        self.restore_session(session.clone());
        Ok(session)
    }

    pub async fn logout(&self) {
        self.stop_live().await;
        self.inner.backend.clear_token();
        *self.inner.session.write().expect("session lock poisoned") = None;
        debug!("logged out");
    }

    /// The current session if it grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<Session, CoreError> {
        let session = self.session().ok_or(CoreError::NotLoggedIn)?;
        if session.can(capability) {
            Ok(session)
        } else {
            Err(CoreError::PermissionDenied {
                action: capability.to_string(),
            })
        }
    }

    // ── Dashboard ───────────────────────────────────────────────────

    /// Passive read: any failure reports the database as unknown.
    pub async fn system_status(&self) -> SystemStatus {
        match self.inner.backend.system_status().await {
            Ok(status) => SystemStatus {
                reachable: true,
                database: status
                    .db
                    .unwrap_or_else(|| UNKNOWN_DATABASE.to_owned()),
            },
            Err(e) => {
                debug!(error = %e, "system status unavailable");
                SystemStatus::unknown()
            }
        }
    }

    pub async fn admin_stats(&self) -> Result<AdminStatsRecord, CoreError> {
        self.require(Capability::ViewAdminDashboard)?;
        Ok(self.inner.backend.admin_stats().await?)
    }

    // ── Alerts ──────────────────────────────────────────────────────

    pub async fn refresh_alerts(&self) -> LoadOutcome {
        self.inner.feed.load_all(&self.inner.backend).await
    }

    /// Location-scoped refresh around `center` (default: configured
    /// location) within `radius_km` (default: configured radius).
    pub async fn refresh_nearby(
        &self,
        center: Option<Coordinates>,
        radius_km: Option<u32>,
    ) -> LoadOutcome {
        let center = center.unwrap_or(self.inner.config.location);
        let radius = radius_km.unwrap_or(self.inner.config.alert_radius_km);
        self.inner
            .feed
            .load_by_location(&self.inner.backend, center, radius)
            .await
    }

    /// Full detail for one alert. Local alerts are served from the feed.
    pub async fn alert(&self, id: &AlertId) -> Result<Alert, CoreError> {
        match id.as_remote() {
            Some(remote) => Ok(Alert::from(self.inner.backend.get_alert(remote).await?)),
            None => self
                .inner
                .feed
                .find(id)
                .map(|a| (*a).clone())
                .ok_or_else(|| CoreError::NotFound {
                    entity_type: "alert".into(),
                    identifier: id.to_string(),
                }),
        }
    }

    pub async fn acknowledge(&self, id: &AlertId) -> Result<(), CoreError> {
        if self.session().is_none() {
            return Err(CoreError::NotLoggedIn);
        }
        let remote = id.as_remote().ok_or_else(|| {
            CoreError::validation("alerts created on this machine cannot be acknowledged")
        })?;
        self.inner.backend.acknowledge_alert(remote).await?;
        info!(id = remote, "alert acknowledged");
        Ok(())
    }

    pub async fn create_alert(&self, draft: &AlertDraft) -> Result<Arc<Alert>, CoreError> {
        let session = self.session();
        self.inner
            .feed
            .create(draft, session.as_ref(), &self.inner.backend)
            .await
    }

    // ── Live push ───────────────────────────────────────────────────

    /// Connect the push channel and bridge new alerts into the feed.
    /// Returns the feed's notification receiver. Replaces any previous
    /// subscription.
    pub async fn start_live(&self) -> Result<broadcast::Receiver<String>, CoreError> {
        self.stop_live().await;

        let session = self.session();
        let rooms = PushRooms {
            user_id: session.as_ref().and_then(|s| s.user.id.clone()),
            institution: session.as_ref().and_then(|s| s.user.institution.clone()),
        };
        let notifications = self.inner.feed.notifications();
        let cancel = CancellationToken::new();
        let push = PushHandle::connect(
            self.inner.config.resolved_push_url(),
            rooms,
            self.inner.config.reconnect.clone(),
            cancel.child_token(),
            session.as_ref().map(|s| &s.token),
        )
        .await?;
        let bridge = spawn_push_bridge(Arc::clone(&self.inner.feed), push.subscribe(), cancel.clone());

        *self.inner.live.lock().await = Some(LiveFeed {
            push,
            bridge,
            cancel,
        });
        info!("live alerts started");
        Ok(notifications)
    }

    pub async fn stop_live(&self) {
        if let Some(live) = self.inner.live.lock().await.take() {
            live.push.shutdown();
            live.cancel.cancel();
            if let Err(e) = live.bridge.await {
                warn!(error = %e, "push bridge task failed");
            }
            info!("live alerts stopped");
        }
    }

    // ── Contacts ────────────────────────────────────────────────────

    pub async fn open_contacts(&self, cache: ContactCache) -> ContactBook {
        ContactBook::open(Some(&self.inner.backend), cache).await
    }

    // ── Third-party services ────────────────────────────────────────

    fn key(&self, service: Service) -> Result<&SecretString, CoreError> {
        self.inner
            .config
            .keys
            .get(service)
            .ok_or(CoreError::MissingKey { service })
    }

    fn point(&self, at: Option<Coordinates>) -> Coordinates {
        at.unwrap_or(self.inner.config.location)
    }

    pub async fn weather(&self, at: Option<Coordinates>) -> Result<CurrentWeather, CoreError> {
        let key = self.key(Service::OpenWeather)?;
        let p = self.point(at);
        Ok(self.inner.services.current_weather(p.lat, p.lng, key).await?)
    }

    pub async fn forecast(&self, at: Option<Coordinates>) -> Result<Forecast, CoreError> {
        let key = self.key(Service::OpenWeather)?;
        let p = self.point(at);
        Ok(self.inner.services.forecast(p.lat, p.lng, key).await?)
    }

    /// Ask the text model. An empty prompt is rejected before any request.
    pub async fn ask(&self, prompt: &str) -> Result<String, CoreError> {
        if prompt.trim().is_empty() {
            return Err(CoreError::validation("prompt is empty"));
        }
        let key = self.key(Service::Gemini)?;
        Ok(self
            .inner
            .services
            .generate_text(key, prompt, &self.inner.config.gemini_model)
            .await?)
    }

    pub async fn design(&self, prompt: &str) -> Result<GeneratedImage, CoreError> {
        if prompt.trim().is_empty() {
            return Err(CoreError::validation("prompt is empty"));
        }
        let key = self.key(Service::Gemini)?;
        Ok(self
            .inner
            .services
            .generate_image(key, prompt, &self.inner.config.gemini_model)
            .await?)
    }

    pub async fn images(&self, query: &str, num: u32) -> Result<Vec<ImageResult>, CoreError> {
        if query.trim().is_empty() {
            return Err(CoreError::validation("search query is empty"));
        }
        let key = self.key(Service::ImageSearch)?;
        let cx = self
            .inner
            .config
            .keys
            .search_cx
            .as_deref()
            .filter(|cx| !cx.is_empty())
            .ok_or_else(|| CoreError::Config {
                message: "no search engine id (cx) configured".into(),
            })?;
        Ok(self.inner.services.search_images(key, cx, query, num).await?)
    }

    pub async fn air_quality(&self, at: Option<Coordinates>) -> Result<AirQuality, CoreError> {
        let key = self.key(Service::AirQuality)?;
        let p = self.point(at);
        Ok(self
            .inner
            .services
            .air_quality(key, p.lat, p.lng, &self.inner.config.air_quality_region)
            .await?)
    }
}
