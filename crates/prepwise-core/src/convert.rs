// ── API-to-domain type conversions ──
//
// Bridges raw `prepwise_api` wire records into canonical
// `prepwise_core::model` types. Each conversion normalizes field names,
// parses strings into strong types, and fills defaults for missing data.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use prepwise_api::backend::models::{
    AlertRecord, ContactPayload, ContactRecord, CoordinatesRecord, LoginRecord, NewAlertLocation,
    NewAlertRequest, Recipients,
};

use crate::error::CoreError;
use crate::model::{
    Alert, AlertDraft, AlertId, Contact, ContactId, ContactKind, ContactPatch, Coordinates,
    HazardKind, Role, Session, Severity, UserProfile,
};

/// Location name used when a record carries none.
pub const UNKNOWN_LOCATION: &str = "Unknown";
/// Location name used for location-scoped results that carry none.
pub const NEARBY_LOCATION: &str = "Nearby";
/// Radius sent with newly published alerts.
pub const NEW_ALERT_RADIUS_KM: u32 = 50;

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an ISO-8601 timestamp, silently dropping unparseable values.
fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fill each missing coordinate from `fallback` independently.
fn resolve_coordinates(raw: Option<CoordinatesRecord>, fallback: Coordinates) -> Coordinates {
    match raw {
        Some(c) => Coordinates {
            lat: c.lat.unwrap_or(fallback.lat),
            lng: c.lng.unwrap_or(fallback.lng),
        },
        None => fallback,
    }
}

// ── Alerts ─────────────────────────────────────────────────────────

/// Map a wire alert, filling missing coordinates from `fallback` and a
/// missing location name with `default_location`.
pub fn alert_from_record(
    record: AlertRecord,
    fallback: Coordinates,
    default_location: &str,
) -> Alert {
    let (location, coordinates) = match record.location {
        Some(loc) => (
            loc.name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| default_location.to_owned()),
            resolve_coordinates(loc.coordinates, fallback),
        ),
        None => (default_location.to_owned(), fallback),
    };

    Alert {
        id: record
            .id
            .map_or_else(AlertId::new_local, AlertId::from),
        title: record.title,
        description: record.description,
        kind: record
            .kind
            .map_or(HazardKind::Warning, HazardKind::from),
        severity: Severity::from_wire(record.severity.as_deref()),
        location,
        coordinates,
        issued_at: parse_datetime(record.issued_at.as_deref()),
        expires_at: parse_datetime(record.expires_at.as_deref()),
        source: record.source.unwrap_or_default(),
        active: record.is_active.unwrap_or(false),
    }
}

impl From<AlertRecord> for Alert {
    fn from(record: AlertRecord) -> Self {
        alert_from_record(record, Coordinates::FALLBACK, UNKNOWN_LOCATION)
    }
}

/// Body for publishing a draft. The draft has no coordinates of its own,
/// so the fallback point is sent.
pub fn new_alert_request(draft: &AlertDraft) -> NewAlertRequest {
    NewAlertRequest {
        title: draft.title.clone(),
        description: draft.description.clone(),
        kind: draft.kind.to_string(),
        severity: draft.severity.to_string(),
        location: NewAlertLocation {
            name: draft.location.clone(),
            coordinates: CoordinatesRecord {
                lat: Some(Coordinates::FALLBACK.lat),
                lng: Some(Coordinates::FALLBACK.lng),
            },
            radius: NEW_ALERT_RADIUS_KM,
        },
        recipients: Recipients { all_users: true },
    }
}

// ── Auth ───────────────────────────────────────────────────────────

/// Build a session from a login response. A response without a token is
/// an authentication failure.
pub fn session_from_login(record: LoginRecord) -> Result<Session, CoreError> {
    let token = record
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CoreError::AuthenticationFailed {
            message: "login response carried no token".into(),
        })?;

    let user = UserProfile {
        id: record.id,
        name: record.name.unwrap_or_default(),
        email: record.email.unwrap_or_default(),
        role: Role::from_wire(record.role.as_deref()),
        institution: record.institution.filter(|i| !i.is_empty()),
    };

    Ok(Session::new(SecretString::from(token), user))
}

// ── Contacts ───────────────────────────────────────────────────────

impl From<ContactRecord> for Contact {
    fn from(r: ContactRecord) -> Self {
        Contact {
            id: r.id.map_or_else(ContactId::new_local, ContactId::from),
            name: r.name,
            kind: ContactKind::from_wire(r.kind.as_deref()),
            phone: r.phone.unwrap_or_default(),
            email: r.email.unwrap_or_default(),
            address: r.address.unwrap_or_default(),
            hours: r.hours.unwrap_or_default(),
            website: r.website.unwrap_or_default(),
            notes: r.notes.unwrap_or_default(),
            favorite: r.favorite.unwrap_or(false),
        }
    }
}

impl From<&ContactPatch> for ContactPayload {
    fn from(p: &ContactPatch) -> Self {
        ContactPayload {
            name: p.name.clone(),
            kind: p.kind.map(|k| k.to_string()),
            phone: p.phone.clone(),
            email: p.email.clone(),
            address: p.address.clone(),
            hours: p.hours.clone(),
            website: p.website.clone(),
            notes: p.notes.clone(),
            favorite: p.favorite,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use prepwise_api::backend::models::LocationRecord;
    use secrecy::ExposeSecret;

    fn record(id: &str, title: &str) -> AlertRecord {
        serde_json::from_value(serde_json::json!({ "_id": id, "title": title })).unwrap()
    }

    #[test]
    fn missing_location_uses_fallback_point_and_unknown() {
        let alert = Alert::from(record("a1", "Flood"));
        assert_eq!(alert.coordinates, Coordinates::FALLBACK);
        assert_eq!(alert.location, "Unknown");
        assert_eq!(alert.id, AlertId::Remote("a1".into()));
    }

    #[test]
    fn partial_coordinates_fill_per_axis() {
        let mut rec = record("a1", "Quake");
        rec.location = Some(LocationRecord {
            name: Some("Shimla".into()),
            coordinates: Some(CoordinatesRecord {
                lat: Some(31.1),
                lng: None,
            }),
        });
        let query_point = Coordinates::new(30.0, 77.0);
        let alert = alert_from_record(rec, query_point, NEARBY_LOCATION);
        assert_eq!(alert.coordinates, Coordinates::new(31.1, 77.0));
        assert_eq!(alert.location, "Shimla");
    }

    #[test]
    fn timestamps_and_enums_parse() {
        let rec: AlertRecord = serde_json::from_value(serde_json::json!({
            "_id": "a9",
            "title": "Cyclone",
            "type": "cyclone",
            "severity": "critical",
            "issuedAt": "2026-10-01T08:00:00Z",
            "isActive": true
        }))
        .unwrap();
        let alert = Alert::from(rec);
        assert_eq!(alert.kind, HazardKind::Cyclone);
        assert_eq!(alert.severity, Severity::Critical);
        assert!(alert.issued_at.is_some());
        assert!(alert.expires_at.is_none());
        assert!(alert.active);
    }

    #[test]
    fn draft_request_uses_fixed_radius_and_all_users() {
        let draft = AlertDraft::new("Drill", "Noon drill", "Campus");
        let req = new_alert_request(&draft);
        assert_eq!(req.location.radius, 50);
        assert!(req.recipients.all_users);
        assert_eq!(req.kind, "warning");
        assert_eq!(req.severity, "medium");
    }

    #[test]
    fn login_without_token_fails() {
        let rec: LoginRecord =
            serde_json::from_value(serde_json::json!({ "name": "A", "role": "admin" })).unwrap();
        assert!(matches!(
            session_from_login(rec),
            Err(CoreError::AuthenticationFailed { .. })
        ));
    }

    #[test]
    fn login_builds_session() {
        let rec: LoginRecord = serde_json::from_value(serde_json::json!({
            "token": "t", "_id": "u1", "name": "Asha", "email": "a@b.test",
            "role": "teacher", "institution": "Central High"
        }))
        .unwrap();
        let session = session_from_login(rec).unwrap();
        assert_eq!(session.token.expose_secret(), "t");
        assert_eq!(session.user.role, Role::Teacher);
        assert_eq!(session.user.institution.as_deref(), Some("Central High"));
    }

    #[test]
    fn contact_record_maps_unknown_kind_to_police() {
        let rec: ContactRecord = serde_json::from_value(serde_json::json!({
            "_id": "0123456789abcdef01234567", "name": "X", "type": "volunteer"
        }))
        .unwrap();
        let contact = Contact::from(rec);
        assert_eq!(contact.kind, ContactKind::Police);
        assert!(contact.id.is_remote());
    }
}
