// ── Contact book: remote or local ──
//
// On open the book tries the backend. If the backend answers, the book is
// in remote mode and edits of backend-owned records (24-char ids) go to
// the server first. Otherwise it runs from the on-disk cache, seeded with
// the default numbers when the cache is missing, empty or unreadable. The
// cache file is rewritten after every change in either mode.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use prepwise_api::BackendClient;
use prepwise_api::backend::models::{ContactPayload, ContactQuery};

use super::directory::{ContactDirectory, ContactView, ImportReport};
use crate::error::CoreError;
use crate::model::{Contact, ContactId, ContactPatch};

// ── Cache file ──────────────────────────────────────────────────────

/// JSON copy of the directory for offline use.
#[derive(Debug, Clone)]
pub struct ContactCache {
    path: PathBuf,
}

impl ContactCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, e: impl std::fmt::Display) -> CoreError {
        CoreError::Storage {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    /// `Ok(None)` when no cache file exists yet.
    pub fn load(&self) -> Result<Option<ContactDirectory>, CoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.storage_err(e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| self.storage_err(e))
    }

    pub fn save(&self, directory: &ContactDirectory) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.storage_err(e))?;
        }
        let json =
            serde_json::to_string_pretty(directory).map_err(|e| self.storage_err(e))?;
        fs::write(&self.path, json).map_err(|e| self.storage_err(e))
    }
}

// ── Book ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ContactMode {
    /// The backend answered; it owns records with remote ids.
    #[strum(to_string = "server")]
    Remote,
    /// Working from the local cache only.
    #[strum(to_string = "local")]
    Local,
}

pub struct ContactBook {
    directory: ContactDirectory,
    mode: ContactMode,
    cache: ContactCache,
}

impl ContactBook {
    /// Load from the backend when given one, falling back to the cache.
    pub async fn open(backend: Option<&BackendClient>, cache: ContactCache) -> Self {
        if let Some(backend) = backend {
            match backend.list_contacts(&ContactQuery::default()).await {
                Ok(records) => {
                    let directory =
                        ContactDirectory::new(records.into_iter().map(Contact::from).collect());
                    debug!(count = directory.len(), "contacts loaded from server");
                    let book = Self {
                        directory,
                        mode: ContactMode::Remote,
                        cache,
                    };
                    book.persist_quietly();
                    return book;
                }
                Err(e) => warn!(error = %e, "contacts server unreachable, using local copy"),
            }
        }
        Self::open_local(cache)
    }

    /// Work from the cache only.
    pub fn open_local(cache: ContactCache) -> Self {
        let directory = match cache.load() {
            Ok(Some(dir)) if !dir.is_empty() => dir,
            Ok(_) => {
                info!("no cached contacts, seeding defaults");
                ContactDirectory::with_defaults()
            }
            Err(e) => {
                warn!(error = %e, "contact cache unreadable, seeding defaults");
                ContactDirectory::with_defaults()
            }
        };
        let book = Self {
            directory,
            mode: ContactMode::Local,
            cache,
        };
        book.persist_quietly();
        book
    }

    pub fn mode(&self) -> ContactMode {
        self.mode
    }

    pub fn directory(&self) -> &ContactDirectory {
        &self.directory
    }

    pub fn cache(&self) -> &ContactCache {
        &self.cache
    }

    pub fn view(&self, view: &ContactView) -> Vec<&Contact> {
        self.directory.view(view)
    }

    /// Look a contact up by exact id, falling back to a case-insensitive
    /// name match.
    pub fn resolve(&self, query: &str) -> Option<&Contact> {
        let id = ContactId::from(query.to_owned());
        self.directory.get(&id).or_else(|| {
            self.directory
                .contacts()
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(query))
        })
    }

    /// In remote mode, ask the server to filter; otherwise filter locally.
    /// A failed server query falls back to the local view.
    pub async fn search(&self, backend: &BackendClient, view: &ContactView) -> Vec<Contact> {
        if self.mode == ContactMode::Remote {
            let query = ContactQuery {
                q: view.search.clone().filter(|s| !s.trim().is_empty()),
                kind: view.kind.map(|k| k.to_string()),
            };
            match backend.list_contacts(&query).await {
                Ok(records) => {
                    let found = ContactDirectory::new(
                        records.into_iter().map(Contact::from).collect(),
                    );
                    return found
                        .view(&ContactView::default())
                        .into_iter()
                        .cloned()
                        .collect();
                }
                Err(e) => warn!(error = %e, "contact search failed, filtering locally"),
            }
        }
        self.directory.view(view).into_iter().cloned().collect()
    }

    // ── Edits ───────────────────────────────────────────────────────

    fn remote_id<'a>(&self, id: Option<&'a ContactId>) -> Option<&'a str> {
        if self.mode == ContactMode::Remote {
            id.and_then(ContactId::as_remote)
        } else {
            None
        }
    }

    /// Add or edit a contact.
    ///
    /// Remote mode: an existing backend record is updated with `PUT`,
    /// anything else is created with `POST`; the server's echo is stored.
    /// A failed request changes nothing. Local mode applies the local
    /// `(name, phone)` merge rules.
    pub async fn save(
        &mut self,
        backend: Option<&BackendClient>,
        patch: ContactPatch,
        id: Option<&ContactId>,
    ) -> Result<Contact, CoreError> {
        if !patch.is_valid() {
            return Err(CoreError::validation(
                "a contact needs a name and a phone number or email",
            ));
        }

        let saved = match (self.mode, backend) {
            (ContactMode::Remote, Some(backend)) => {
                let payload = ContactPayload::from(&patch);
                if let Some(remote) = self.remote_id(id) {
                    let record = backend.update_contact(remote, &payload).await?;
                    let mut contact = Contact::from(record);
                    contact.id = ContactId::Remote(remote.to_owned());
                    if !self.directory.replace(contact.clone()) {
                        self.directory.prepend(contact.clone());
                    }
                    contact
                } else {
                    let record = backend.create_contact(&payload).await?;
                    let contact = Contact::from(record);
                    self.directory.prepend(contact.clone());
                    contact
                }
            }
            _ => self.directory.save(patch, id)?,
        };

        self.persist()?;
        Ok(saved)
    }

    /// Delete a contact. Backend records are deleted on the server first.
    pub async fn remove(
        &mut self,
        backend: Option<&BackendClient>,
        id: &ContactId,
    ) -> Result<Contact, CoreError> {
        if self.directory.get(id).is_none() {
            return Err(CoreError::NotFound {
                entity_type: "contact".into(),
                identifier: id.to_string(),
            });
        }
        if let (Some(remote), Some(backend)) = (self.remote_id(Some(id)), backend) {
            backend.delete_contact(remote).await?;
        }
        let removed = self.directory.remove(id).ok_or_else(|| CoreError::NotFound {
            entity_type: "contact".into(),
            identifier: id.to_string(),
        })?;
        self.persist()?;
        Ok(removed)
    }

    /// Flip the favorite flag. Backend records are updated on the server
    /// and take the server's value.
    pub async fn toggle_favorite(
        &mut self,
        backend: Option<&BackendClient>,
        id: &ContactId,
    ) -> Result<bool, CoreError> {
        let current = self
            .directory
            .get(id)
            .map(|c| c.favorite)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "contact".into(),
                identifier: id.to_string(),
            })?;
        let next = !current;

        let value = match (self.remote_id(Some(id)), backend) {
            (Some(remote), Some(backend)) => {
                let payload = ContactPayload {
                    favorite: Some(next),
                    ..ContactPayload::default()
                };
                let record = backend.update_contact(remote, &payload).await?;
                record.favorite.unwrap_or(false)
            }
            _ => next,
        };

        self.directory.set_favorite(id, value);
        self.persist()?;
        Ok(value)
    }

    /// Bulk import into the local directory. Imported records get local
    /// ids and are never sent to the server.
    pub fn import_json(&mut self, text: &str) -> Result<ImportReport, CoreError> {
        let report = self.directory.import_json(text)?;
        self.persist()?;
        Ok(report)
    }

    pub fn import_csv(&mut self, text: &str) -> Result<ImportReport, CoreError> {
        let report = self.directory.import_csv(text)?;
        self.persist()?;
        Ok(report)
    }

    pub fn seed_defaults(&mut self) -> Result<usize, CoreError> {
        let added = self.directory.seed_defaults();
        self.persist()?;
        Ok(added)
    }

    fn persist(&self) -> Result<(), CoreError> {
        self.cache.save(&self.directory)
    }

    fn persist_quietly(&self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "could not write contact cache");
        }
    }
}
