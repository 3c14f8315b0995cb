// ── Alert domain types ──

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

use super::ids::AlertId;

/// Kind of hazard an alert, drill or learning module is about.
///
/// Open-ended on the wire: unknown kinds are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum HazardKind {
    Warning,
    Earthquake,
    Flood,
    Fire,
    Cyclone,
    Heatwave,
    Other(String),
}

impl HazardKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Warning => "warning",
            Self::Earthquake => "earthquake",
            Self::Flood => "flood",
            Self::Fire => "fire",
            Self::Cyclone => "cyclone",
            Self::Heatwave => "heatwave",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds compare case-insensitively, so unknown ones are lowercased too.
impl From<String> for HazardKind {
    fn from(s: String) -> Self {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "warning" => Self::Warning,
            "earthquake" => Self::Earthquake,
            "flood" => Self::Flood,
            "fire" => Self::Fire,
            "cyclone" => Self::Cyclone,
            "heatwave" => Self::Heatwave,
            _ => Self::Other(lower),
        }
    }
}

impl From<&str> for HazardKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<HazardKind> for String {
    fn from(kind: HazardKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl FromStr for HazardKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a wire value; unknown or missing severities read as the default.
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

/// A point on the map, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Used whenever an alert carries no usable coordinates.
    pub const FALLBACK: Self = Self {
        lat: 20.5937,
        lng: 78.9629,
    };

    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// A time-bounded disaster notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub title: String,
    pub description: String,
    pub kind: HazardKind,
    pub severity: Severity,
    pub location: String,
    pub coordinates: Coordinates,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub source: String,
    pub active: bool,
}

/// User input for a new alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub title: String,
    pub description: String,
    pub kind: HazardKind,
    pub severity: Severity,
    pub location: String,
}

impl AlertDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: HazardKind::Warning,
            severity: Severity::Medium,
            location: location.into(),
        }
    }

    /// Title, description and location are required.
    pub fn is_complete(&self) -> bool {
        [&self.title, &self.description, &self.location]
            .iter()
            .all(|s| !s.trim().is_empty())
    }
}
