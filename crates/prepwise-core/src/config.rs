// ── Runtime portal configuration ──
//
// These types describe *how* to reach the portal and its third-party
// services. They carry credential data and connection tuning, but never
// touch disk. The CLI constructs a `PortalConfig` and hands it in.

use std::time::Duration;

use prepwise_api::{ReconnectConfig, Service, ServiceEndpoints, TlsMode};
use secrecy::SecretString;
use url::Url;

use crate::model::Coordinates;

/// Per-service API keys. The Custom Search engine id travels with them.
#[derive(Debug, Clone, Default)]
pub struct ServiceKeys {
    pub weather: Option<SecretString>,
    pub gemini: Option<SecretString>,
    pub search: Option<SecretString>,
    pub search_cx: Option<String>,
    pub maps: Option<SecretString>,
}

impl ServiceKeys {
    pub fn get(&self, service: Service) -> Option<&SecretString> {
        match service {
            Service::OpenWeather => self.weather.as_ref(),
            Service::Gemini => self.gemini.as_ref(),
            Service::ImageSearch => self.search.as_ref(),
            Service::AirQuality => self.maps.as_ref(),
        }
    }
}

/// Configuration for one portal deployment.
///
/// Built by the CLI, passed to [`Portal`](crate::Portal); core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// API root, e.g. `http://localhost:5000/api`.
    pub backend_url: Url,
    /// Push channel endpoint. Derived from the backend origin when unset.
    pub push_url: Option<Url>,
    pub tls: TlsMode,
    pub timeout: Duration,
    pub endpoints: ServiceEndpoints,
    pub keys: ServiceKeys,
    pub gemini_model: String,
    pub air_quality_region: String,
    /// Where the user is, for location-scoped queries and weather.
    pub location: Coordinates,
    /// Radius for location-scoped alert queries.
    pub alert_radius_km: u32,
    pub reconnect: ReconnectConfig,
}

impl PortalConfig {
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            push_url: None,
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            endpoints: ServiceEndpoints::default(),
            keys: ServiceKeys::default(),
            gemini_model: prepwise_api::services::DEFAULT_MODEL.to_owned(),
            air_quality_region: "us".into(),
            location: Coordinates::FALLBACK,
            alert_radius_km: 100,
            reconnect: ReconnectConfig::default(),
        }
    }

    /// The push endpoint: explicit, or the backend origin with a
    /// WebSocket scheme and `/push` path.
    pub fn resolved_push_url(&self) -> Url {
        if let Some(ref url) = self.push_url {
            return url.clone();
        }
        let mut url = self.backend_url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) is always an allowed scheme change.
        let _ = url.set_scheme(scheme);
        url.set_path("/push");
        url.set_query(None);
        url
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::new(Url::parse("http://localhost:5000/api").expect("valid default backend URL"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn push_url_derived_from_backend() {
        let config = PortalConfig::new(Url::parse("https://portal.example/api").unwrap());
        assert_eq!(
            config.resolved_push_url().as_str(),
            "wss://portal.example/push"
        );

        let local = PortalConfig::default();
        assert_eq!(local.resolved_push_url().as_str(), "ws://localhost:5000/push");
    }

    #[test]
    fn explicit_push_url_wins() {
        let mut config = PortalConfig::default();
        config.push_url = Some(Url::parse("ws://push.example:9000/rt").unwrap());
        assert_eq!(config.resolved_push_url().as_str(), "ws://push.example:9000/rt");
    }
}
