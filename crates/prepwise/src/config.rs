//! CLI configuration: thin wrapper around `prepwise_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--profile, --backend, --insecure, --timeout).

use std::time::Duration;

use prepwise_api::TlsMode;
use prepwise_core::{ContactCache, PortalConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use prepwise_config::{
    Config, Profile, SessionStore, config_path, load_config, load_config_or_default, save_config,
    store_service_key,
};

/// The profile a command runs against, after flags and config are merged.
pub struct ActiveProfile {
    pub name: String,
    pub use_keyring: bool,
    pub portal: PortalConfig,
}

impl ActiveProfile {
    pub fn sessions(&self) -> SessionStore {
        SessionStore::for_profile(&self.name).with_keyring(self.use_keyring)
    }

    pub fn contact_cache(&self) -> ContactCache {
        ContactCache::new(prepwise_config::contacts_cache_path(&self.name))
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Load config and resolve the active profile with flag overrides.
///
/// A profile named by `--profile` must exist. The default profile may be
/// absent, in which case built-in defaults apply.
pub fn resolve(global: &GlobalOpts) -> Result<ActiveProfile, CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(&cfg),
            });
        }
        None => Profile::default(),
    };

    let mut portal = prepwise_config::profile_to_portal_config(&profile, &name, &cfg.defaults)?;

    if let Some(ref backend) = global.backend {
        portal.backend_url = backend
            .parse()
            .map_err(|_| CliError::validation("backend", format!("invalid URL: {backend}")))?;
    }
    if global.insecure {
        portal.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        portal.timeout = Duration::from_secs(secs);
    }

    Ok(ActiveProfile {
        name,
        use_keyring: cfg.defaults.keyring,
        portal,
    })
}

pub fn available_profiles(cfg: &Config) -> String {
    let names = cfg.profile_names();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}
