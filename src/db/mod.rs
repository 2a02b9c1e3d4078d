//! Persistence module split across logical submodules.

mod backup;
mod doctors;
mod specialties;
mod store;

pub use backup::{
    create_backup, default_export_dir, export_backup, parse_backup, read_backup_file,
    restore_backup, BackupError,
};
pub use doctors::{default_doctors, load_or_seed_doctors, save_doctors};
pub use specialties::{default_specialties, load_or_seed_specialties, save_specialties};
pub use store::{data_dir, StorageError, Store};
