// ── Core error types ──
//
// User-facing errors from prepwise-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<prepwise_api::Error>`
// impl folds transport errors into the portal's taxonomy (invalid key,
// throttling, validation, generic failure).

use std::path::PathBuf;

use prepwise_api::Service;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the portal: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Auth errors ──────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Permission denied: {action} requires a privileged role")]
    PermissionDenied { action: String },

    // ── Third-party key errors ───────────────────────────────────────
    #[error("Invalid or unauthorized {service} key")]
    InvalidKey { service: Service },

    #[error("No {service} key configured")]
    MissingKey { service: Service },

    #[error("{service} quota exceeded or rate limited")]
    RateLimited { service: Service },

    #[error("{service} key is restricted (referrer or API restrictions)")]
    KeyRestricted { service: Service },

    #[error("{service} request failed: {message}")]
    ServiceFailed { service: Service, message: String },

    #[error("The model returned no image data")]
    NoImageData,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Cannot access {}: {message}", path.display())]
    Storage { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Credential problems: the caller should prompt for a login or key.
    pub fn needs_credentials(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. }
                | Self::NotLoggedIn
                | Self::InvalidKey { .. }
                | Self::MissingKey { .. }
        )
    }

    /// Network-level failures that a passive read may absorb.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<prepwise_api::Error> for CoreError {
    fn from(err: prepwise_api::Error) -> Self {
        use prepwise_api::Error as E;

        match err {
            E::Authentication { message } => CoreError::AuthenticationFailed { message },
            E::Forbidden { message } => CoreError::PermissionDenied { action: message },
            E::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            E::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            E::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            E::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            E::NotFound { path } => CoreError::NotFound {
                entity_type: "Resource".into(),
                identifier: path,
            },
            E::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            E::EmptyResponse { path } => CoreError::Api {
                message: format!("empty response from {path}"),
                status: None,
            },
            E::InvalidKey { service } => CoreError::InvalidKey { service },
            E::QuotaExceeded { service } => CoreError::RateLimited { service },
            E::InvalidParameter { message, .. } => CoreError::ValidationFailed { message },
            E::KeyRestricted { service } => CoreError::KeyRestricted { service },
            E::ServiceFailure { service, message } => CoreError::ServiceFailed { service, message },
            E::NoImageData => CoreError::NoImageData,
            E::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                reason: format!("push channel: {reason}"),
            },
            E::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                reason: format!("push channel closed (code {code}): {reason}"),
            },
            E::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
