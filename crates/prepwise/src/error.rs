//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use prepwise_config::ConfigError;
use prepwise_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const RATE_LIMITED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the portal")]
    #[diagnostic(
        code(prepwise::connection_failed),
        help(
            "{reason}\n\
             Check that the backend is running, or pass --backend.\n\
             Contacts keep working offline: prepwise contacts --offline list"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(prepwise::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(prepwise::auth_failed),
        help("Check your email and password, then run: prepwise login")
    )]
    AuthFailed { message: String },

    #[error("You are not logged in")]
    #[diagnostic(code(prepwise::not_logged_in), help("Run: prepwise login"))]
    NotLoggedIn,

    #[error("No {service} API key configured")]
    #[diagnostic(
        code(prepwise::missing_key),
        help(
            "Store one with: prepwise config set-key {key_name}\n\
             Or set the {env_var} environment variable."
        )
    )]
    MissingKey {
        service: String,
        key_name: String,
        env_var: String,
    },

    #[error("The {service} API key was rejected")]
    #[diagnostic(
        code(prepwise::invalid_key),
        help("Replace it with: prepwise config set-key {key_name}")
    )]
    InvalidKey { service: String, key_name: String },

    // ── Permissions ──────────────────────────────────────────────────
    #[error("Permission denied: {action}")]
    #[diagnostic(
        code(prepwise::permission_denied),
        help("This action needs a teacher or admin account.")
    )]
    PermissionDenied { action: String },

    #[error("The {service} API key is restricted")]
    #[diagnostic(
        code(prepwise::key_restricted),
        help("Allow this API for the key, or remove its referrer restrictions.")
    )]
    KeyRestricted { service: String },

    #[error("{service} quota exceeded or rate limited")]
    #[diagnostic(code(prepwise::rate_limited), help("Wait a while and try again."))]
    RateLimited { service: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(prepwise::not_found),
        help("Run: prepwise {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(prepwise::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    #[error("{service} request failed: {message}")]
    #[diagnostic(code(prepwise::service_failed))]
    ServiceFailed { service: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(prepwise::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(prepwise::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: prepwise config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(prepwise::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(prepwise::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(prepwise::json))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(prepwise::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. }
            | Self::NotLoggedIn
            | Self::MissingKey { .. }
            | Self::InvalidKey { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } | Self::KeyRestricted { .. } => exit_code::PERMISSION,
            Self::RateLimited { .. } => exit_code::RATE_LIMITED,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(resource_type: &str, identifier: &str, list_command: &str) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            list_command: list_command.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::NotLoggedIn => CliError::NotLoggedIn,

            CoreError::PermissionDenied { action } => CliError::PermissionDenied { action },

            CoreError::MissingKey { service } => CliError::MissingKey {
                service: service.to_string(),
                key_name: service.key_name().into(),
                env_var: prepwise_config::key_env_var(service),
            },

            CoreError::InvalidKey { service } => CliError::InvalidKey {
                service: service.to_string(),
                key_name: service.key_name().into(),
            },

            CoreError::RateLimited { service } => CliError::RateLimited {
                service: service.to_string(),
            },

            CoreError::KeyRestricted { service } => CliError::KeyRestricted {
                service: service.to_string(),
            },

            CoreError::ServiceFailed { service, message } => CliError::ServiceFailed {
                service: service.to_string(),
                message,
            },

            CoreError::NoImageData => CliError::ServiceFailed {
                service: "Gemini".into(),
                message: "the model returned no image data".into(),
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => {
                let resource_type = entity_type.to_lowercase();
                CliError::NotFound {
                    list_command: format!("{resource_type}s list"),
                    resource_type,
                    identifier,
                }
            }

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Storage { path, message } => CliError::Io(std::io::Error::other(format!(
                "{}: {message}",
                path.display()
            ))),

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prepwise_api::Service;

    #[test]
    fn core_errors_map_to_stable_exit_codes() {
        let cases = [
            (CoreError::NotLoggedIn, exit_code::AUTH),
            (
                CoreError::PermissionDenied {
                    action: "publishing alerts".into(),
                },
                exit_code::PERMISSION,
            ),
            (
                CoreError::RateLimited {
                    service: Service::Gemini,
                },
                exit_code::RATE_LIMITED,
            ),
            (
                CoreError::ConnectionFailed {
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 30 }, exit_code::TIMEOUT),
            (
                CoreError::NotFound {
                    entity_type: "alert".into(),
                    identifier: "a1".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::ValidationFailed {
                    message: "prompt is empty".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Api {
                    message: "boom".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn missing_key_names_the_env_var() {
        let err = CliError::from(CoreError::MissingKey {
            service: Service::OpenWeather,
        });
        match err {
            CliError::MissingKey {
                key_name, env_var, ..
            } => {
                assert_eq!(key_name, "weather");
                assert_eq!(env_var, "PREPWISE_WEATHER_KEY");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
