//! Core library surface for the CliniGest TUI application: an offline-first
//! directory of a clinic's doctors, their specialties, rooms, and accepted
//! mutuas, with whole-dataset backup and restore.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the key-value persistence layer, the pure directory logic, and the
//! interactive front-end.
pub mod db;
pub mod directory;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer. These functions are
/// typically used by `main.rs` to open the local store and preload data.
pub use db::{load_or_seed_doctors, load_or_seed_specialties, Store};

/// The primary domain types that other layers manipulate.
pub use models::{BackupBundle, Doctor};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
