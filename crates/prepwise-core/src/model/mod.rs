// ── Domain model ──
//
// Canonical types consumed by the CLI. Wire records from `prepwise_api`
// are converted into these in `crate::convert`.

pub mod alert;
pub mod contact;
pub mod drill;
pub mod ids;
pub mod module;
pub mod session;

pub use alert::{Alert, AlertDraft, Coordinates, HazardKind, Severity};
pub use contact::{Contact, ContactKind, ContactPatch};
pub use drill::{Difficulty, Drill, DrillDuration};
pub use ids::{AlertId, ContactId};
pub use module::{Badge, LearningModule, Lesson, LessonKind, ModuleTab};
pub use session::{Capability, Role, Session, UserProfile};
