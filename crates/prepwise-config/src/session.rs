// ── Session persistence ──
//
// A remembered login lives in the data dir and survives restarts; an
// unremembered one lives in the runtime dir and disappears with the
// user session. The bearer token goes to the keyring when one is
// reachable, otherwise it is written into the session file.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use prepwise_core::{Session, UserProfile};

use crate::{ConfigError, KEYRING_SERVICE};

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    /// Present only when the keyring could not take the token.
    token: Option<String>,
    remember: bool,
    user: UserProfile,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    profile: String,
    durable: PathBuf,
    ephemeral: PathBuf,
    use_keyring: bool,
}

impl SessionStore {
    pub fn new(profile: &str, durable: PathBuf, ephemeral: PathBuf) -> Self {
        Self {
            profile: profile.to_owned(),
            durable,
            ephemeral,
            use_keyring: true,
        }
    }

    /// Store for `profile` at the platform data and runtime dirs.
    pub fn for_profile(profile: &str) -> Self {
        let file = format!("{profile}.toml");
        Self::new(
            profile,
            crate::data_dir().join("sessions").join(&file),
            crate::runtime_dir().join("sessions").join(file),
        )
    }

    pub fn with_keyring(mut self, enabled: bool) -> Self {
        self.use_keyring = enabled;
        self
    }

    fn path_for(&self, remember: bool) -> &Path {
        if remember {
            &self.durable
        } else {
            &self.ephemeral
        }
    }

    fn keyring_entry(&self) -> Option<keyring::Entry> {
        if !self.use_keyring {
            return None;
        }
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/session-token", self.profile)).ok()
    }

    /// Persist `session`, replacing whatever was stored before.
    pub fn save(&self, session: &Session, remember: bool) -> Result<PathBuf, ConfigError> {
        self.clear()?;

        let token = session.token.expose_secret();
        let in_keyring = self
            .keyring_entry()
            .is_some_and(|entry| match entry.set_password(token) {
                Ok(()) => true,
                Err(e) => {
                    debug!(error = %e, "keyring rejected session token, storing in file");
                    false
                }
            });

        let stored = StoredSession {
            token: (!in_keyring).then(|| token.to_owned()),
            remember,
            user: session.user.clone(),
        };

        let path = self.path_for(remember);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(&stored)?)?;
        debug!(path = %path.display(), remember, in_keyring, "session saved");
        Ok(path.to_path_buf())
    }

    /// The stored session, preferring the remembered one.
    pub fn load(&self) -> Result<Option<Session>, ConfigError> {
        for path in [&self.durable, &self.ephemeral] {
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let stored: StoredSession =
                toml::from_str(&text).map_err(|e| ConfigError::Corrupt {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;

            let token = match stored.token {
                Some(token) => Some(token),
                None => self.keyring_entry().and_then(|e| e.get_password().ok()),
            };
            if let Some(token) = token.filter(|t| !t.is_empty()) {
                return Ok(Some(Session::new(SecretString::from(token), stored.user)));
            }
            warn!(path = %path.display(), "session file has no token, ignoring it");
        }
        Ok(None)
    }

    /// Remove both session files and the keyring token.
    pub fn clear(&self) -> Result<(), ConfigError> {
        for path in [&self.durable, &self.ephemeral] {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "session file removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if let Some(entry) = self.keyring_entry() {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => debug!(error = %e, "could not clear keyring token"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use prepwise_core::Role;

    fn store(dir: &Path) -> SessionStore {
        SessionStore::new(
            "test",
            dir.join("data").join("s.toml"),
            dir.join("run").join("s.toml"),
        )
        .with_keyring(false)
    }

    fn session() -> Session {
        Session::new(
            SecretString::from("tok-9".to_owned()),
            UserProfile {
                id: Some("u9".into()),
                name: "Ravi".into(),
                email: "ravi@school.test".into(),
                role: Role::Teacher,
                institution: None,
            },
        )
    }

    #[test]
    fn remembered_session_goes_to_durable_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let path = store.save(&session(), true).unwrap();
        assert_eq!(path, dir.path().join("data").join("s.toml"));
        assert!(!dir.path().join("run").join("s.toml").exists());

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token.expose_secret(), "tok-9");
        assert_eq!(loaded.user.role, Role::Teacher);
        assert_eq!(loaded.user.id.as_deref(), Some("u9"));
    }

    #[test]
    fn unremembered_session_goes_to_runtime_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save(&session(), false).unwrap();
        assert!(dir.path().join("run").join("s.toml").exists());
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn saving_again_replaces_the_other_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save(&session(), true).unwrap();
        store.save(&session(), false).unwrap();
        assert!(!dir.path().join("data").join("s.toml").exists());
    }

    #[test]
    fn clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save(&session(), true).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let path = dir.path().join("data").join("s.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "user = 5").unwrap();
        assert!(matches!(store.load(), Err(ConfigError::Corrupt { .. })));
    }
}
