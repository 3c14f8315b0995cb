// Wire types for the portal backend.
//
// Field names follow the backend's JSON (`_id`, camelCase timestamps).
// Almost everything is optional: the portal tolerates partial records and
// fills defaults during domain conversion in `prepwise-core`.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response wrapper used by every backend endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Payload of a successful `POST /auth/login`: the token plus the user
/// profile, flattened into one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRecord {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
}

// ── Alerts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesRecord {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub coordinates: Option<CoordinatesRecord>,
}

/// An alert as the backend (and the push channel) sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub location: Option<LocationRecord>,
    #[serde(default)]
    pub issued_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Query for `GET /alerts`.
#[derive(Debug, Serialize)]
pub struct AlertListQuery {
    pub active: bool,
    pub limit: u32,
}

/// Query for `GET /alerts/location`.
#[derive(Debug, Serialize)]
pub struct AlertLocationQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAlertLocation {
    pub name: String,
    pub coordinates: CoordinatesRecord,
    pub radius: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipients {
    pub all_users: bool,
}

/// Body for `POST /alerts`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAlertRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub location: NewAlertLocation,
    pub recipients: Recipients,
}

// ── Contacts ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub favorite: Option<bool>,
}

/// Body for `POST /contacts` and `PUT /contacts/:id`. Absent fields are
/// omitted so partial updates (e.g. favorite only) stay partial.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

/// Query for `GET /contacts`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// ── System / dashboard ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatusRecord {
    #[serde(default)]
    pub db: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    #[serde(default)]
    pub total_users: Option<u64>,
    #[serde(default)]
    pub total_modules: Option<u64>,
    #[serde(default)]
    pub total_drills: Option<u64>,
}

/// `GET /dashboard/admin-stats`: a display-only aggregate snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsRecord {
    #[serde(default)]
    pub overview: AdminOverview,
    #[serde(default)]
    pub active_alerts: Option<u64>,
    #[serde(default)]
    pub users_by_role: Option<serde_json::Value>,
    #[serde(default)]
    pub popular_modules: Option<serde_json::Value>,
}
