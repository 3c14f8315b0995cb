//! Shared configuration for the prepwise CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! session persistence, and translation to `prepwise_core::PortalConfig`.

mod session;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use prepwise_api::{Service, TlsMode};
use prepwise_core::{Coordinates, PortalConfig, ServiceKeys};

pub use session::SessionStore;

/// Keyring service name shared by every stored secret.
pub const KEYRING_SERVICE: &str = "prepwise";

const DEFAULT_BACKEND: &str = "http://localhost:5000/api";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("keyring unavailable: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to read {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named portal profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Sorted profile names, for listings and error help.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Store tokens and keys in the system keyring.
    #[serde(default = "default_keyring")]
    pub keyring: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            keyring: default_keyring(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_keyring() -> bool {
    true
}

/// Plaintext service keys (prefer keyring or env vars).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeyTable {
    pub weather: Option<String>,
    pub gemini: Option<String>,
    pub search: Option<String>,
    pub maps: Option<String>,
}

impl KeyTable {
    pub fn get(&self, service: Service) -> Option<&str> {
        let key = match service {
            Service::OpenWeather => self.weather.as_deref(),
            Service::Gemini => self.gemini.as_deref(),
            Service::ImageSearch => self.search.as_deref(),
            Service::AirQuality => self.maps.as_deref(),
        };
        key.filter(|k| !k.is_empty())
    }

    pub fn set(&mut self, service: Service, key: Option<String>) {
        let slot = match service {
            Service::OpenWeather => &mut self.weather,
            Service::Gemini => &mut self.gemini,
            Service::ImageSearch => &mut self.search,
            Service::AirQuality => &mut self.maps,
        };
        *slot = key;
    }
}

/// A named portal deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Backend API root (e.g., "http://localhost:5000/api").
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Push channel URL. Derived from `backend` when unset.
    pub push_url: Option<String>,

    /// Home latitude for weather and nearby alerts.
    pub latitude: Option<f64>,

    /// Home longitude for weather and nearby alerts.
    pub longitude: Option<f64>,

    /// Radius for nearby alert queries, in kilometres.
    pub alert_radius_km: Option<u32>,

    pub gemini_model: Option<String>,

    pub air_quality_region: Option<String>,

    /// Custom Search engine id.
    pub search_cx: Option<String>,

    #[serde(default)]
    pub keys: KeyTable,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            push_url: None,
            latitude: None,
            longitude: None,
            alert_radius_km: None,
            gemini_model: None,
            air_quality_region: None,
            search_cx: None,
            keys: KeyTable::default(),
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

fn default_backend() -> String {
    DEFAULT_BACKEND.into()
}

// ── Platform paths ──────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "prepwise", "prepwise")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "prepwise", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Durable per-user data (remembered sessions, contact caches).
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "prepwise"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Session-scoped storage: the runtime dir where the platform has one,
/// otherwise a directory under the system temp dir.
pub fn runtime_dir() -> PathBuf {
    project_dirs()
        .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::temp_dir().join("prepwise"))
}

/// Offline contact directory for a profile.
pub fn contacts_cache_path(profile_name: &str) -> PathBuf {
    data_dir()
        .join("contacts")
        .join(format!("{profile_name}.json"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Layer defaults, the TOML file at `path`, then `PREPWISE_*` env vars
/// (`__` separates nesting, e.g. `PREPWISE_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PREPWISE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Environment variable consulted first for a service key,
/// e.g. `PREPWISE_WEATHER_KEY`.
pub fn key_env_var(service: Service) -> String {
    format!("PREPWISE_{}_KEY", service.key_name().to_ascii_uppercase())
}

fn key_entry_name(profile_name: &str, service: Service) -> String {
    format!("{profile_name}/{}-key", service.key_name())
}

/// Resolve one service key: env var, then system keyring, then plaintext.
/// `None` means the service is unconfigured; the portal reports that
/// when the service is first used.
pub fn resolve_service_key(
    profile: &Profile,
    profile_name: &str,
    service: Service,
    use_keyring: bool,
) -> Option<SecretString> {
    // 1. Env var
    if let Ok(val) = std::env::var(key_env_var(service)) {
        if !val.is_empty() {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if use_keyring {
        if let Ok(entry) =
            keyring::Entry::new(KEYRING_SERVICE, &key_entry_name(profile_name, service))
        {
            if let Ok(secret) = entry.get_password() {
                return Some(SecretString::from(secret));
            }
        }
    }

    // 3. Plaintext in config
    profile
        .keys
        .get(service)
        .map(|k| SecretString::from(k.to_owned()))
}

/// Resolve every service key plus the search engine id.
pub fn resolve_keys(profile: &Profile, profile_name: &str, use_keyring: bool) -> ServiceKeys {
    let key = |service| resolve_service_key(profile, profile_name, service, use_keyring);
    let search_cx = std::env::var("PREPWISE_SEARCH_CX")
        .ok()
        .or_else(|| profile.search_cx.clone())
        .filter(|cx| !cx.is_empty());

    ServiceKeys {
        weather: key(Service::OpenWeather),
        gemini: key(Service::Gemini),
        search: key(Service::ImageSearch),
        search_cx,
        maps: key(Service::AirQuality),
    }
}

/// Store a service key in the system keyring.
pub fn store_service_key(
    profile_name: &str,
    service: Service,
    secret: &str,
) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &key_entry_name(profile_name, service))?;
    entry.set_password(secret)?;
    debug!(profile = profile_name, service = %service, "stored key in keyring");
    Ok(())
}

// ── Translation to PortalConfig ─────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `PortalConfig` from a profile and the global defaults.
pub fn profile_to_portal_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<PortalConfig, ConfigError> {
    let mut config = PortalConfig::new(parse_url("backend", &profile.backend)?);

    config.push_url = profile
        .push_url
        .as_deref()
        .map(|raw| parse_url("push_url", raw))
        .transpose()?;

    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.keys = resolve_keys(profile, profile_name, defaults.keyring);

    match (profile.latitude, profile.longitude) {
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(ConfigError::Validation {
                    field: "latitude/longitude".into(),
                    reason: format!("({lat}, {lng}) is not a valid position"),
                });
            }
            config.location = Coordinates::new(lat, lng);
        }
        (None, None) => {}
        _ => {
            return Err(ConfigError::Validation {
                field: "latitude/longitude".into(),
                reason: "set both or neither".into(),
            });
        }
    }

    if let Some(radius) = profile.alert_radius_km {
        config.alert_radius_km = radius;
    }
    if let Some(ref model) = profile.gemini_model {
        config.gemini_model.clone_from(model);
    }
    if let Some(ref region) = profile.air_quality_region {
        config.air_quality_region.clone_from(region);
    }

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "school"

[defaults]
timeout = 10

[profiles.school]
backend = "https://portal.school.test/api"
latitude = 19.07
longitude = 72.87
search_cx = "cx-123"

[profiles.school.keys]
weather = "plain-weather"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("school"));
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.output, "table");
        let school = &cfg.profiles["school"];
        assert_eq!(school.keys.get(Service::OpenWeather), Some("plain-weather"));
        assert_eq!(school.keys.get(Service::Gemini), None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
        assert!(cfg.defaults.keyring);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        let profile = Profile {
            alert_radius_km: Some(40),
            ..Profile::default()
        };
        cfg.profiles.insert("home".into(), profile);
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile_names(), vec!["home"]);
        assert_eq!(loaded.profiles["home"].alert_radius_km, Some(40));
        assert_eq!(loaded.profiles["home"].backend, DEFAULT_BACKEND);
    }

    #[test]
    fn profile_translates_to_portal_config() {
        let profile = Profile {
            backend: "https://portal.example/api".into(),
            latitude: Some(28.61),
            longitude: Some(77.2),
            alert_radius_km: Some(25),
            insecure: Some(true),
            search_cx: Some("cx-1".into()),
            keys: KeyTable {
                gemini: Some("plain-gemini".into()),
                ..KeyTable::default()
            },
            ..Profile::default()
        };

        let defaults = Defaults {
            keyring: false,
            ..Defaults::default()
        };
        let config = profile_to_portal_config(&profile, "prepwise-test", &defaults).unwrap();
        assert_eq!(config.backend_url.as_str(), "https://portal.example/api");
        assert_eq!(config.location, Coordinates::new(28.61, 77.2));
        assert_eq!(config.alert_radius_km, 25);
        assert!(matches!(config.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.keys.gemini.is_some());
        assert_eq!(config.keys.search_cx.as_deref(), Some("cx-1"));
        assert_eq!(
            config.resolved_push_url().as_str(),
            "wss://portal.example/push"
        );
    }

    #[test]
    fn half_a_location_is_rejected() {
        let profile = Profile {
            latitude: Some(12.0),
            ..Profile::default()
        };
        let err = profile_to_portal_config(&profile, "p", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn invalid_backend_url_is_rejected() {
        let profile = Profile {
            backend: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_portal_config(&profile, "p", &Defaults::default()).unwrap_err();
        assert!(err.to_string().contains("backend"));
    }

    #[test]
    fn key_env_var_names() {
        assert_eq!(key_env_var(Service::OpenWeather), "PREPWISE_WEATHER_KEY");
        assert_eq!(key_env_var(Service::AirQuality), "PREPWISE_MAPS_KEY");
    }
}
