// ── Identity types ──
//
// Alerts and contacts are identified either by the backend (authoritative
// once assigned) or by a locally generated id for records that never
// reached the server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const LOCAL_ALERT_PREFIX: &str = "local-";

/// Length of a backend-assigned object id.
pub const REMOTE_ID_LEN: usize = 24;

// ── AlertId ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AlertId {
    /// Assigned by the backend.
    Remote(String),
    /// Synthesized for alerts created without publish rights.
    Local(Uuid),
}

impl AlertId {
    pub fn new_local() -> Self {
        Self::Local(Uuid::new_v4())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// The backend id, if this alert has one.
    pub fn as_remote(&self) -> Option<&str> {
        match self {
            Self::Remote(s) => Some(s),
            Self::Local(_) => None,
        }
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(s) => f.write_str(s),
            Self::Local(u) => write!(f, "{LOCAL_ALERT_PREFIX}{u}"),
        }
    }
}

impl From<String> for AlertId {
    fn from(s: String) -> Self {
        s.strip_prefix(LOCAL_ALERT_PREFIX)
            .and_then(|rest| Uuid::parse_str(rest).ok())
            .map_or(Self::Remote(s), Self::Local)
    }
}

impl From<AlertId> for String {
    fn from(id: AlertId) -> Self {
        id.to_string()
    }
}

impl FromStr for AlertId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

// ── ContactId ───────────────────────────────────────────────────────

/// Contact identifier. Only 24-character backend ids are ever sent to
/// the server; anything else is local to this machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ContactId {
    Remote(String),
    Local(String),
}

impl ContactId {
    pub fn new_local() -> Self {
        Self::Local(Uuid::new_v4().to_string())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn as_remote(&self) -> Option<&str> {
        match self {
            Self::Remote(s) => Some(s),
            Self::Local(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(s) | Self::Local(s) => s,
        }
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ContactId {
    fn from(s: String) -> Self {
        if s.len() == REMOTE_ID_LEN {
            Self::Remote(s)
        } else {
            Self::Local(s)
        }
    }
}

impl From<ContactId> for String {
    fn from(id: ContactId) -> Self {
        match id {
            ContactId::Remote(s) | ContactId::Local(s) => s,
        }
    }
}

impl FromStr for ContactId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn local_alert_id_round_trips_through_display() {
        let id = AlertId::new_local();
        let parsed: AlertId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!(parsed.is_local());
    }

    #[test]
    fn backend_alert_id_stays_remote() {
        let id = AlertId::from("65f0c0ffee".to_owned());
        assert_eq!(id.as_remote(), Some("65f0c0ffee"));
    }

    #[test]
    fn contact_id_remote_by_length() {
        assert!(ContactId::from("0123456789abcdef01234567".to_owned()).is_remote());
        assert!(!ContactId::new_local().is_remote());
        assert!(!ContactId::from("7".to_owned()).is_remote());
    }

    #[test]
    fn contact_id_serializes_as_plain_string() {
        let id = ContactId::from("0123456789abcdef01234567".to_owned());
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"0123456789abcdef01234567\""
        );
    }
}
