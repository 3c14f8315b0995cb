// ── Contact domain types ──

use serde::{Deserialize, Deserializer, Serialize};
use strum::{EnumIter, EnumString};

use super::ids::ContactId;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ContactKind {
    #[default]
    Police,
    Fire,
    Ambulance,
    Hospital,
    DisasterManagement,
    Rescue,
    Ngo,
}

impl ContactKind {
    /// Parse a wire value; unknown or missing kinds read as police.
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

/// One emergency contact. Empty strings mean "not provided".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ContactKind,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub favorite: bool,
}

impl Contact {
    /// Dedup identity for import and local saves.
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.phone)
    }

    /// Case-insensitive match against name, phone, email, address and notes.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        [
            &self.name,
            &self.phone,
            &self.email,
            &self.address,
            &self.notes,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// A partial contact: every field optional. Used for imports, edits and
/// seeding, where only present fields overwrite an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactPatch {
    pub name: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_kind")]
    pub kind: Option<ContactKind>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hours: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub favorite: Option<bool>,
}

/// Unknown kinds in imported data fall back to police instead of
/// rejecting the whole file.
fn lenient_kind<'de, D: Deserializer<'de>>(de: D) -> Result<Option<ContactKind>, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.map(|s| ContactKind::from_wire(Some(&s))))
}

fn non_empty(field: Option<&String>) -> bool {
    field.is_some_and(|s| !s.trim().is_empty())
}

impl ContactPatch {
    /// A contact needs a name and at least one of phone or email.
    pub fn is_valid(&self) -> bool {
        non_empty(self.name.as_ref())
            && (non_empty(self.phone.as_ref()) || non_empty(self.email.as_ref()))
    }

    /// `(name, phone)` with a missing phone reading as empty.
    pub fn key(&self) -> (&str, &str) {
        (
            self.name.as_deref().unwrap_or(""),
            self.phone.as_deref().unwrap_or(""),
        )
    }

    /// Overwrite the fields present in `self`; the id is never touched.
    pub fn apply_to(&self, contact: &mut Contact) {
        fn set(target: &mut String, value: Option<&String>) {
            if let Some(v) = value {
                target.clone_from(v);
            }
        }

        set(&mut contact.name, self.name.as_ref());
        if let Some(kind) = self.kind {
            contact.kind = kind;
        }
        set(&mut contact.phone, self.phone.as_ref());
        set(&mut contact.email, self.email.as_ref());
        set(&mut contact.address, self.address.as_ref());
        set(&mut contact.hours, self.hours.as_ref());
        set(&mut contact.website, self.website.as_ref());
        set(&mut contact.notes, self.notes.as_ref());
        if let Some(fav) = self.favorite {
            contact.favorite = fav;
        }
    }

    /// Build a full contact under `id`, filling absent fields with defaults.
    pub fn into_contact(self, id: ContactId) -> Contact {
        Contact {
            id,
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            hours: self.hours.unwrap_or_default(),
            website: self.website.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            favorite: self.favorite.unwrap_or(false),
        }
    }
}

impl From<&Contact> for ContactPatch {
    fn from(c: &Contact) -> Self {
        Self {
            name: Some(c.name.clone()),
            kind: Some(c.kind),
            phone: Some(c.phone.clone()),
            email: Some(c.email.clone()),
            address: Some(c.address.clone()),
            hours: Some(c.hours.clone()),
            website: Some(c.website.clone()),
            notes: Some(c.notes.clone()),
            favorite: Some(c.favorite),
        }
    }
}
