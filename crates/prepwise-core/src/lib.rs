//! Domain layer between `prepwise-api` and the `prepwise` CLI.
//!
//! - **[`Portal`]**: facade owning the backend and services clients, the
//!   current [`Session`], the [`AlertFeed`] and the live push bridge.
//!   Privileged actions are gated through [`Role::allows`].
//!
//! - **[`DrillRunner`]**: one drill at a time, a step index plus a
//!   one-second countdown driven by a background task.
//!
//! - **[`AlertFeed`]**: newest-first alert collection. Replace-loads are
//!   tagged with [`LoadToken`]s so stale responses are discarded; push
//!   events and created alerts are prepended.
//!
//! - **Contacts** ([`ContactDirectory`], [`ContactBook`]): `(name, phone)`
//!   merge rules for import and seeding, server/offline modes, CSV and
//!   vCard export.
//!
//! - **Domain model** ([`model`]): canonical types converted from wire
//!   records in [`convert`].

pub mod config;
pub mod contacts;
pub mod convert;
pub mod drill;
pub mod error;
pub mod feed;
pub mod model;
pub mod modules;
pub mod portal;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PortalConfig, ServiceKeys};
pub use contacts::{
    ContactBook, ContactCache, ContactDirectory, ContactMode, ContactView, ImportReport,
};
pub use drill::{DrillPhase, DrillRunner, DrillSession, StepOutcome};
pub use error::CoreError;
pub use feed::{AlertFeed, AlertFilter, AlertStream, LoadOutcome, LoadToken};
pub use portal::{Portal, SystemStatus};

pub use model::{
    Alert, AlertDraft, AlertId, Badge, Capability, Contact, ContactId, ContactKind, ContactPatch,
    Coordinates, Difficulty, Drill, DrillDuration, HazardKind, LearningModule, Lesson, LessonKind,
    ModuleTab, Role, Session, Severity, UserProfile,
};
