// ── In-memory contact directory ──
//
// Ordered list of contacts with the local merge rules: imports, seeding
// and local saves all deduplicate on `(name, phone)`. New records go to
// the front.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::csv;
use super::defaults::default_contacts;
use crate::error::CoreError;
use crate::model::{Contact, ContactId, ContactKind, ContactPatch};

/// Counts from one bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub merged: usize,
    pub inserted: usize,
    /// Records without a name, or without both phone and email.
    pub skipped: usize,
}

/// Search text plus kind filter for listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactView {
    pub search: Option<String>,
    pub kind: Option<ContactKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactDirectory {
    contacts: Vec<Contact>,
}

impl ContactDirectory {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    /// A directory holding only the seed contacts.
    pub fn with_defaults() -> Self {
        Self::new(
            default_contacts()
                .into_iter()
                .map(|p| p.into_contact(ContactId::new_local()))
                .collect(),
        )
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn into_contacts(self) -> Vec<Contact> {
        self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn get(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == *id)
    }

    fn position_by_key(&self, name: &str, phone: &str) -> Option<usize> {
        self.contacts.iter().position(|c| c.key() == (name, phone))
    }

    fn position_by_id(&self, id: &ContactId) -> Option<usize> {
        self.contacts.iter().position(|c| c.id == *id)
    }

    // ── Bulk merges ─────────────────────────────────────────────────

    /// Merge each record into the first contact with the same
    /// `(name, phone)`, keeping that contact's id; otherwise insert it at
    /// the front under a new local id.
    pub fn import(&mut self, patches: impl IntoIterator<Item = ContactPatch>) -> ImportReport {
        let mut report = ImportReport::default();
        for patch in patches {
            if !patch.is_valid() {
                report.skipped += 1;
                continue;
            }
            let (name, phone) = patch.key();
            if let Some(i) = self.position_by_key(name, phone) {
                if let Some(existing) = self.contacts.get_mut(i) {
                    patch.apply_to(existing);
                }
                report.merged += 1;
            } else {
                self.contacts
                    .insert(0, patch.into_contact(ContactId::new_local()));
                report.inserted += 1;
            }
        }
        debug!(?report, "contacts imported");
        report
    }

    /// Import a JSON array of contact objects.
    pub fn import_json(&mut self, text: &str) -> Result<ImportReport, CoreError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| CoreError::validation(format!("invalid JSON: {e}")))?;
        let serde_json::Value::Array(items) = value else {
            return Err(CoreError::validation("expected a JSON array of contacts"));
        };

        let mut unreadable = 0;
        let patches: Vec<ContactPatch> = items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value(item)
                    .inspect_err(|_| unreadable += 1)
                    .ok()
            })
            .collect();

        let mut report = self.import(patches);
        report.skipped += unreadable;
        Ok(report)
    }

    /// Import CSV text with a header row.
    pub fn import_csv(&mut self, text: &str) -> Result<ImportReport, CoreError> {
        let patches = csv::parse_contacts(text)?;
        Ok(self.import(patches))
    }

    /// Add every seed contact not already present. Returns how many were
    /// added; a second run adds none.
    pub fn seed_defaults(&mut self) -> usize {
        let mut added = 0;
        for seed in default_contacts() {
            let (name, phone) = seed.key();
            if self.position_by_key(name, phone).is_none() {
                self.contacts
                    .insert(0, seed.into_contact(ContactId::new_local()));
                added += 1;
            }
        }
        added
    }

    // ── Single-record edits ─────────────────────────────────────────

    /// Save user input locally.
    ///
    /// With `id` naming an existing contact, that contact is updated.
    /// Otherwise a contact with the same `(name, phone)` is merged into,
    /// or a new one is inserted at the front.
    pub fn save(
        &mut self,
        patch: ContactPatch,
        id: Option<&ContactId>,
    ) -> Result<Contact, CoreError> {
        if !patch.is_valid() {
            return Err(CoreError::validation(
                "a contact needs a name and a phone number or email",
            ));
        }

        let (name, phone) = patch.key();
        let target = id
            .and_then(|id| self.position_by_id(id))
            .or_else(|| self.position_by_key(name, phone));

        if let Some(existing) = target.and_then(|i| self.contacts.get_mut(i)) {
            patch.apply_to(existing);
            return Ok(existing.clone());
        }

        let contact = ContactPatch {
            favorite: Some(patch.favorite.unwrap_or(false)),
            ..patch
        }
        .into_contact(ContactId::new_local());
        self.contacts.insert(0, contact.clone());
        Ok(contact)
    }

    /// Put `contact` at the front, replacing any record with the same id.
    pub fn prepend(&mut self, contact: Contact) {
        self.contacts.retain(|c| c.id != contact.id);
        self.contacts.insert(0, contact);
    }

    /// Replace the record with `contact.id` in place. Returns `false` if
    /// no such record exists.
    pub fn replace(&mut self, contact: Contact) -> bool {
        match self.position_by_id(&contact.id) {
            Some(i) => {
                if let Some(slot) = self.contacts.get_mut(i) {
                    *slot = contact;
                }
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &ContactId) -> Option<Contact> {
        self.position_by_id(id).map(|i| self.contacts.remove(i))
    }

    /// Flip the favorite flag; returns the new value.
    pub fn toggle_favorite(&mut self, id: &ContactId) -> Option<bool> {
        let contact = self.contacts.iter_mut().find(|c| c.id == *id)?;
        contact.favorite = !contact.favorite;
        Some(contact.favorite)
    }

    pub fn set_favorite(&mut self, id: &ContactId, favorite: bool) -> bool {
        match self.contacts.iter_mut().find(|c| c.id == *id) {
            Some(c) => {
                c.favorite = favorite;
                true
            }
            None => false,
        }
    }

    // ── Listing ─────────────────────────────────────────────────────

    /// Contacts matching `view`, favorites first, otherwise in directory
    /// order.
    pub fn view(&self, view: &ContactView) -> Vec<&Contact> {
        let needle = view
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut out: Vec<&Contact> = self
            .contacts
            .iter()
            .filter(|c| view.kind.is_none_or(|k| c.kind == k))
            .filter(|c| needle.as_deref().is_none_or(|n| c.matches_text(n)))
            .collect();
        out.sort_by_key(|c| !c.favorite);
        out
    }
}
