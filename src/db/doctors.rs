//! Persistence for the doctor list. The list is stored as one JSON value and
//! rewritten in full on every change; there is no per-record update path.

use tracing::warn;

use crate::models::Doctor;

use super::store::{StorageError, Store};

/// Named record holding the full doctor list.
const DOCTORS_KEY: &str = "clinigest_doctors";

/// Load the doctor list, seeding the two built-in sample records on first
/// run. Read failures are downgraded to an empty list so the UI can still
/// come up; the cause lands in the log instead of on screen.
pub fn load_or_seed_doctors(store: &Store) -> Vec<Doctor> {
    match store.read::<Vec<Doctor>>(DOCTORS_KEY) {
        Ok(Some(doctors)) => doctors,
        Ok(None) => {
            let defaults = default_doctors();
            if let Err(err) = store.write(DOCTORS_KEY, &defaults) {
                warn!("failed to seed default doctors: {err}");
                return Vec::new();
            }
            defaults
        }
        Err(err) => {
            warn!("failed to load doctors, showing an empty directory: {err}");
            Vec::new()
        }
    }
}

/// Overwrite the stored doctor list with the given one. Unlike reads, write
/// failures surface so the user knows the change did not stick.
pub fn save_doctors(store: &Store, doctors: &[Doctor]) -> Result<(), StorageError> {
    store.write(DOCTORS_KEY, &doctors)
}

/// The two sample doctors written the first time the app runs against an
/// empty store, so the directory never opens on a blank screen.
pub fn default_doctors() -> Vec<Doctor> {
    vec![
        Doctor {
            id: "DOC-001".to_string(),
            name: "Dr. Alejandro Ruiz".to_string(),
            specialty: "Cardiología".to_string(),
            room: "101".to_string(),
            mutuas: vec!["Adeslas".to_string(), "Sanitas".to_string()],
            email: None,
            phone: None,
            avatar_url: "https://picsum.photos/100/100?random=1".to_string(),
            is_active: true,
        },
        Doctor {
            id: "DOC-002".to_string(),
            name: "Dra. Elena Costa".to_string(),
            specialty: "Pediatría".to_string(),
            room: "204".to_string(),
            mutuas: vec![
                "DKV".to_string(),
                "Mapfre".to_string(),
                "Asisa".to_string(),
            ],
            email: None,
            phone: None,
            avatar_url: "https://picsum.photos/100/100?random=2".to_string(),
            is_active: true,
        },
    ]
}
