//! Whole-dataset export and import. A backup is a self-contained JSON
//! document carrying the doctor and specialty lists (plus the always-empty
//! appointments placeholder); restoring one is a destructive full replace of
//! both stored records, never a merge.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use directories::UserDirs;
use serde_json::Value;
use thiserror::Error;

use crate::models::BackupBundle;

use super::doctors::{load_or_seed_doctors, save_doctors};
use super::specialties::{load_or_seed_specialties, save_specialties};
use super::store::{StorageError, Store};

/// Failures raised while exporting or importing a backup file. Validation
/// errors happen before anything is written, so a rejected import leaves both
/// stored lists untouched.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("invalid backup format: {0}")]
    InvalidFormat(String),
    #[error("could not access the backup file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Assemble a snapshot of the current dataset. Goes through the same
/// fail-soft loaders the UI uses, so even a partially unreadable store
/// produces a well-formed (if sparse) bundle.
pub fn create_backup(store: &Store) -> BackupBundle {
    BackupBundle {
        doctors: load_or_seed_doctors(store),
        specialties: load_or_seed_specialties(store),
        appointments: Vec::new(),
    }
}

/// Write the current dataset to `<dir>/clinigest_backup_<date>.json` and
/// return the full path for the confirmation message.
pub fn export_backup(store: &Store, dir: &Path) -> Result<PathBuf, BackupError> {
    let bundle = create_backup(store);
    let text = serde_json::to_string_pretty(&bundle)
        .map_err(|err| BackupError::InvalidFormat(err.to_string()))?;

    let file_name = format!("clinigest_backup_{}.json", Local::now().format("%Y-%m-%d"));
    let path = dir.join(file_name);
    fs::write(&path, text)?;
    Ok(path)
}

/// Directory backups are exported into by default: the user's Downloads
/// folder when one exists, otherwise their home directory.
pub fn default_export_dir() -> Option<PathBuf> {
    let user_dirs = UserDirs::new()?;
    Some(
        user_dirs
            .download_dir()
            .unwrap_or_else(|| user_dirs.home_dir())
            .to_path_buf(),
    )
}

/// Read and validate a candidate backup file. Convenience wrapper around
/// [`parse_backup`] for the import flow.
pub fn read_backup_file(path: &Path) -> Result<BackupBundle, BackupError> {
    let text = fs::read_to_string(path)?;
    parse_backup(&text)
}

/// Validate and decode a candidate backup document. The acceptance contract
/// is deliberately shallow: the document must be a JSON object whose
/// `doctors` field is present and is an array. Extra fields are ignored and
/// missing `specialties`/`appointments` default to empty.
pub fn parse_backup(text: &str) -> Result<BackupBundle, BackupError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|_| BackupError::InvalidFormat("the file is not valid JSON".to_string()))?;

    let doctors = value
        .get("doctors")
        .ok_or_else(|| BackupError::InvalidFormat("missing `doctors` field".to_string()))?;
    if !doctors.is_array() {
        return Err(BackupError::InvalidFormat(
            "`doctors` must be an array".to_string(),
        ));
    }

    // Typed decode comes after the shape check. Record fields carry serde
    // defaults, so this only rejects entries that are not objects or lack an
    // id/name entirely.
    serde_json::from_value(value).map_err(|err| {
        BackupError::InvalidFormat(format!("a record could not be decoded: {err}"))
    })
}

/// Replace the stored doctor and specialty lists with the bundle's contents.
/// The bundle has already passed validation by the time it gets here, so any
/// failure below is a storage write error, not a format problem.
pub fn restore_backup(store: &Store, bundle: &BackupBundle) -> Result<(), BackupError> {
    save_doctors(store, &bundle.doctors)?;
    save_specialties(store, &bundle.specialties)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::doctors::default_doctors;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Store::open_at(&dir.path().join("store.sqlite")).expect("open store");
        (dir, store)
    }

    #[test]
    fn backup_restore_round_trip_leaves_data_unchanged() {
        let (_dir, store) = temp_store();
        let doctors = load_or_seed_doctors(&store);
        let specialties = load_or_seed_specialties(&store);

        let bundle = create_backup(&store);
        assert!(bundle.appointments.is_empty());
        restore_backup(&store, &bundle).expect("restore");

        assert_eq!(load_or_seed_doctors(&store), doctors);
        assert_eq!(load_or_seed_specialties(&store), specialties);
    }

    #[test]
    fn export_then_parse_round_trips_through_the_file() {
        let (dir, store) = temp_store();
        load_or_seed_doctors(&store);
        load_or_seed_specialties(&store);

        let path = export_backup(&store, dir.path()).expect("export");
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("clinigest_backup_"));
        assert!(name.ends_with(".json"));

        let bundle = read_backup_file(&path).expect("parse exported file");
        assert_eq!(bundle, create_backup(&store));
    }

    #[test]
    fn missing_doctors_field_is_rejected_without_touching_the_store() {
        let (_dir, store) = temp_store();
        let before_doctors = load_or_seed_doctors(&store);
        let before_specialties = load_or_seed_specialties(&store);

        let result = parse_backup(r#"{"specialties": ["Cardiología"]}"#);
        assert!(matches!(result, Err(BackupError::InvalidFormat(_))));

        assert_eq!(load_or_seed_doctors(&store), before_doctors);
        assert_eq!(load_or_seed_specialties(&store), before_specialties);
    }

    #[test]
    fn non_array_doctors_field_is_rejected() {
        let result = parse_backup(r#"{"doctors": "DOC-001"}"#);
        assert!(matches!(result, Err(BackupError::InvalidFormat(_))));

        let result = parse_backup("not json at all");
        assert!(matches!(result, Err(BackupError::InvalidFormat(_))));
    }

    #[test]
    fn extra_fields_and_missing_optional_lists_are_tolerated() {
        let text = r#"{
            "doctors": [
                {"id": "DOC-009", "name": "Dra. Pilar Soto", "specialty": "Neurología"}
            ],
            "exportedBy": "clinigest web 1.0"
        }"#;

        let bundle = parse_backup(text).expect("parse");
        assert_eq!(bundle.doctors.len(), 1);
        assert_eq!(bundle.doctors[0].id, "DOC-009");
        // Defaults fill the fields the document leaves out.
        assert!(bundle.doctors[0].is_active);
        assert!(bundle.doctors[0].mutuas.is_empty());
        assert!(bundle.specialties.is_empty());
        assert!(bundle.appointments.is_empty());
    }

    #[test]
    fn restore_is_a_destructive_full_replace() {
        let (_dir, store) = temp_store();
        load_or_seed_doctors(&store);
        load_or_seed_specialties(&store);

        let bundle = BackupBundle {
            doctors: vec![default_doctors().remove(0)],
            specialties: vec!["Cardiología".to_string()],
            appointments: Vec::new(),
        };
        restore_backup(&store, &bundle).expect("restore");

        assert_eq!(load_or_seed_doctors(&store), bundle.doctors);
        assert_eq!(load_or_seed_specialties(&store), bundle.specialties);
    }
}
