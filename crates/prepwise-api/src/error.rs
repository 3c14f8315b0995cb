use std::fmt;

use thiserror::Error;

/// Third-party service an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    OpenWeather,
    Gemini,
    ImageSearch,
    AirQuality,
}

impl Service {
    /// Human-readable service name used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenWeather => "OpenWeather",
            Self::Gemini => "Gemini",
            Self::ImageSearch => "Google Custom Search",
            Self::AirQuality => "Google Air Quality",
        }
    }

    /// Config key under which this service's API key is stored.
    pub fn key_name(self) -> &'static str {
        match self {
            Self::OpenWeather => "weather",
            Self::Gemini => "gemini",
            Self::ImageSearch => "search",
            Self::AirQuality => "maps",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Top-level error type for the `prepwise-api` crate.
///
/// Covers every failure mode across all surfaces: the portal backend,
/// the push channel, and the third-party services.
/// `prepwise-core` maps these into user-facing categories.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Backend rejected the credentials or the bearer token (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Authenticated, but the role may not perform this action (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Resource does not exist (HTTP 404).
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Non-success status from the backend, with its `message` if present.
    #[error("Backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Success status but the envelope carried no `data`.
    #[error("Empty response from {path}")]
    EmptyResponse { path: String },

    // ── Third-party services ────────────────────────────────────────
    /// 401/403 from a service: the configured key is wrong or unauthorized.
    #[error("Invalid or unauthorized {service} API key")]
    InvalidKey { service: Service },

    /// 429 or a quota reason from a service.
    #[error("{service} quota or rate limit exceeded")]
    QuotaExceeded { service: Service },

    /// 400 with an invalid-value message.
    #[error("{service} rejected the request: {message}")]
    InvalidParameter { service: Service, message: String },

    /// The key is valid but restricted (referrer/IP restrictions).
    #[error("Blocked by {service} API key restrictions")]
    KeyRestricted { service: Service },

    /// Any other service failure, with the best message available.
    #[error("{service} request failed: {message}")]
    ServiceFailure { service: Service, message: String },

    /// Image generation returned neither inline data nor a JSON design.
    #[error("No image data returned")]
    NoImageData,

    // ── Push channel ────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("Push channel connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed unexpectedly.
    #[error("Push channel closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if re-entering credentials might resolve this error.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::InvalidKey { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::WebSocketConnect(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::NotFound { .. } | Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}

/// Truncate a response body for inclusion in error messages.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
