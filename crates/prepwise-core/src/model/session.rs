// ── Authenticated user and capabilities ──
//
// Every privileged action asks `Role::allows` with the capability it
// needs; no handler compares role strings itself.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::EnumString;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Teacher,
    Student,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or(Self::Unknown)
    }

    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::PublishAlerts => matches!(self, Self::Admin | Self::Teacher),
            Capability::ViewAdminDashboard => matches!(self, Self::Admin),
        }
    }
}

/// Actions gated on role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Capability {
    #[strum(to_string = "publishing alerts")]
    PublishAlerts,
    #[strum(to_string = "the admin dashboard")]
    ViewAdminDashboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub institution: Option<String>,
}

/// A logged-in user: bearer token plus profile. Built by the caller from
/// persisted state or a fresh login and passed in explicitly.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SecretString,
    pub user: UserProfile,
}

impl Session {
    pub fn new(token: SecretString, user: UserProfile) -> Self {
        Self { token, user }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.user.role.allows(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_requires_admin_or_teacher() {
        assert!(Role::Admin.allows(Capability::PublishAlerts));
        assert!(Role::Teacher.allows(Capability::PublishAlerts));
        assert!(!Role::Student.allows(Capability::PublishAlerts));
        assert!(!Role::Unknown.allows(Capability::PublishAlerts));
    }

    #[test]
    fn admin_dashboard_is_admin_only() {
        assert!(Role::Admin.allows(Capability::ViewAdminDashboard));
        assert!(!Role::Teacher.allows(Capability::ViewAdminDashboard));
    }

    #[test]
    fn role_parsing_is_lenient() {
        assert_eq!(Role::from_wire(Some("Teacher")), Role::Teacher);
        assert_eq!(Role::from_wire(Some("principal")), Role::Unknown);
        assert_eq!(Role::from_wire(None), Role::Unknown);
    }
}
