// ── Emergency contacts ──
//
// `ContactDirectory` holds the merge rules, `ContactBook` adds the
// backend/cache modes on top. Parsing and export formats live in their
// own modules.

mod book;
pub mod csv;
mod defaults;
mod directory;
pub mod export;

pub use book::{ContactBook, ContactCache, ContactMode};
pub use defaults::default_contacts;
pub use directory::{ContactDirectory, ContactView, ImportReport};
