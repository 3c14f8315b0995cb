//! Third-party HTTP services the portal composes.
//!
//! Each service is a thin typed wrapper over one or two endpoints. Their
//! contracts are treated as opaque except for error-status mapping, which
//! is normalized into [`Error::InvalidKey`], [`Error::QuotaExceeded`],
//! [`Error::InvalidParameter`], [`Error::KeyRestricted`] and
//! [`Error::ServiceFailure`] so callers can react uniformly.

pub mod air_quality;
pub mod gemini;
pub mod search;
pub mod weather;

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Service, preview};
use crate::transport::TransportConfig;

pub use air_quality::{AirQuality, AqiIndex};
pub use gemini::{DEFAULT_MODEL, GeneratedImage};
pub use search::ImageResult;
pub use weather::{CurrentWeather, Forecast, ForecastEntry, WeatherCondition, WeatherMain};

// ── Endpoints ───────────────────────────────────────────────────────

const OPENWEATHER_BASE: &str = "https://api.openweathermap.org/data/2.5";
const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const CUSTOM_SEARCH_BASE: &str = "https://www.googleapis.com/customsearch/v1";
const AIR_QUALITY_BASE: &str = "https://airquality.googleapis.com/v1";

/// Base URLs for every service. Overridable so tests can point them at a
/// local mock server.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub openweather: Url,
    pub gemini: Url,
    pub custom_search: Url,
    pub air_quality: Url,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            openweather: Url::parse(OPENWEATHER_BASE).expect("valid OpenWeather URL"),
            gemini: Url::parse(GEMINI_BASE).expect("valid Gemini URL"),
            custom_search: Url::parse(CUSTOM_SEARCH_BASE).expect("valid Custom Search URL"),
            air_quality: Url::parse(AIR_QUALITY_BASE).expect("valid Air Quality URL"),
        }
    }
}

impl ServiceEndpoints {
    /// Point every service at the same root (used by tests).
    pub fn all_at(root: &Url) -> Self {
        Self {
            openweather: root.clone(),
            gemini: root.clone(),
            custom_search: root.clone(),
            air_quality: root.clone(),
        }
    }
}

/// Append a path to a base URL without `Url::join`'s last-segment rules.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    if path.is_empty() {
        return Ok(Url::parse(base)?);
    }
    Ok(Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))?)
}

// ── Client ──────────────────────────────────────────────────────────

/// HTTP client for all third-party services.
///
/// Keys are passed per call: they belong to the caller's session, not to
/// the client.
pub struct ServicesClient {
    http: reqwest::Client,
    endpoints: ServiceEndpoints,
    timeout_secs: u64,
}

impl ServicesClient {
    pub fn new(endpoints: ServiceEndpoints, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            endpoints,
            timeout_secs: transport.timeout_secs(),
        })
    }

    pub fn with_client(http: reqwest::Client, endpoints: ServiceEndpoints) -> Self {
        Self {
            http,
            endpoints,
            timeout_secs: 0,
        }
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send a request, map failures for `service`, parse the JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        service: Service,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                Error::Transport(e)
            }
        })?;

        let status = resp.status();
        debug!(%service, %status, "service response");
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(map_failure(service, status, &body));
        }

        trace!(%service, bytes = body.len(), "parsing service body");
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{service}: {e}"),
            body,
        })
    }
}

// ── Failure mapping ─────────────────────────────────────────────────

/// Error body shapes: Google's `{ error: { message, errors: [{ reason }] } }`
/// and OpenWeather's `{ cod, message }`.
#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    #[serde(default)]
    error: Option<GoogleError>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

const QUOTA_REASONS: [&str; 3] = ["dailylimitexceeded", "userratelimitexceeded", "quotaexceeded"];
const RESTRICTION_MARKERS: [&str; 3] = ["referrer", "restrictions", "not authorized"];

/// Translate a non-success service response into a typed error.
pub(crate) fn map_failure(service: Service, status: StatusCode, body: &str) -> Error {
    let parsed: FailureBody = serde_json::from_str(body).unwrap_or_default();
    let (message, reason) = match parsed.error {
        Some(g) => (
            g.message.unwrap_or_default(),
            g.errors
                .into_iter()
                .find_map(|d| d.reason)
                .unwrap_or_default(),
        ),
        None => (parsed.message.unwrap_or_default(), String::new()),
    };
    let message_lc = message.to_lowercase();
    let reason_lc = reason.to_lowercase();

    let auth_statuses: &[StatusCode] = match service {
        // OpenWeather uses 401 only; 403 there is not a key problem.
        Service::OpenWeather => &[StatusCode::UNAUTHORIZED],
        _ => &[StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN],
    };
    if auth_statuses.contains(&status) {
        return Error::InvalidKey { service };
    }

    if status == StatusCode::BAD_REQUEST && message_lc.contains("invalid value") {
        let message = if service == Service::ImageSearch && message_lc.contains("cx") {
            "Invalid Custom Search Engine ID (cx)".to_owned()
        } else {
            "Invalid query or parameters".to_owned()
        };
        return Error::InvalidParameter { service, message };
    }

    if status == StatusCode::TOO_MANY_REQUESTS
        || QUOTA_REASONS.iter().any(|r| reason_lc.contains(r))
    {
        return Error::QuotaExceeded { service };
    }

    if RESTRICTION_MARKERS.iter().any(|m| message_lc.contains(m)) {
        return Error::KeyRestricted { service };
    }

    let message = if message.is_empty() {
        if body.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            preview(body)
        }
    } else {
        message
    };
    Error::ServiceFailure { service, message }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn google_body(message: &str, reason: &str) -> String {
        serde_json::json!({
            "error": { "code": 400, "message": message, "errors": [{ "reason": reason }] }
        })
        .to_string()
    }

    #[test]
    fn forbidden_is_invalid_key_for_google_services() {
        let err = map_failure(Service::Gemini, StatusCode::FORBIDDEN, "{}");
        assert!(matches!(
            err,
            Error::InvalidKey {
                service: Service::Gemini
            }
        ));
    }

    #[test]
    fn forbidden_is_not_invalid_key_for_openweather() {
        let err = map_failure(Service::OpenWeather, StatusCode::FORBIDDEN, r#"{"message":"nope"}"#);
        assert!(matches!(err, Error::ServiceFailure { .. }));
    }

    #[test]
    fn invalid_cx_is_distinguished() {
        let body = google_body("Request contains an invalid argument. Invalid Value for cx", "invalid");
        let err = map_failure(Service::ImageSearch, StatusCode::BAD_REQUEST, &body);
        match err {
            Error::InvalidParameter { message, .. } => {
                assert_eq!(message, "Invalid Custom Search Engine ID (cx)");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_value_without_cx_is_generic_validation() {
        let body = google_body("Invalid Value", "invalid");
        let err = map_failure(Service::ImageSearch, StatusCode::BAD_REQUEST, &body);
        assert!(matches!(
            err,
            Error::InvalidParameter { ref message, .. } if message == "Invalid query or parameters"
        ));
    }

    #[test]
    fn quota_reason_maps_to_quota_exceeded() {
        let body = google_body("Quota exceeded for quota metric", "dailyLimitExceeded");
        let err = map_failure(Service::ImageSearch, StatusCode::BAD_REQUEST, &body);
        assert!(matches!(err, Error::QuotaExceeded { .. }));

        let err = map_failure(Service::AirQuality, StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, Error::QuotaExceeded { .. }));
    }

    #[test]
    fn referrer_restriction_detected() {
        let body = google_body("Requests from referer <empty> are blocked by referrer restrictions", "");
        let err = map_failure(Service::AirQuality, StatusCode::BAD_REQUEST, &body);
        assert!(matches!(err, Error::KeyRestricted { .. }));
    }

    #[test]
    fn generic_failure_keeps_message() {
        let err = map_failure(
            Service::OpenWeather,
            StatusCode::NOT_FOUND,
            r#"{"cod":"404","message":"city not found"}"#,
        );
        assert!(matches!(err, Error::ServiceFailure { ref message, .. } if message == "city not found"));
    }

    #[test]
    fn endpoint_appends_path() {
        let base = Url::parse("https://example.test/v1/").unwrap();
        let url = endpoint(&base, "models/x:generateContent").unwrap();
        assert_eq!(url.as_str(), "https://example.test/v1/models/x:generateContent");
    }
}
