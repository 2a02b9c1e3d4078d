//! Persistence for the specialty list. Same full-overwrite pattern as the
//! doctor list, but the fail-soft branch falls back to the built-in names
//! instead of an empty list so the doctor form always has options to offer.

use tracing::warn;

use super::store::{StorageError, Store};

/// Named record holding the ordered specialty list.
const SPECIALTIES_KEY: &str = "clinigest_specialties";

/// The nine specialties every fresh install starts with, in display order.
const DEFAULT_SPECIALTIES: [&str; 9] = [
    "Medicina General",
    "Pediatría",
    "Cardiología",
    "Dermatología",
    "Traumatología",
    "Ginecología",
    "Oftalmología",
    "Psiquiatría",
    "Neurología",
];

/// Load the specialty list, seeding the built-in names on first run. On read
/// failure the defaults are returned (not persisted) so filtering and the
/// doctor form keep working.
pub fn load_or_seed_specialties(store: &Store) -> Vec<String> {
    match store.read::<Vec<String>>(SPECIALTIES_KEY) {
        Ok(Some(specialties)) => specialties,
        Ok(None) => {
            let defaults = default_specialties();
            if let Err(err) = store.write(SPECIALTIES_KEY, &defaults) {
                warn!("failed to seed default specialties: {err}");
            }
            defaults
        }
        Err(err) => {
            warn!("failed to load specialties, using the built-in list: {err}");
            default_specialties()
        }
    }
}

/// Overwrite the stored specialty list with the given one.
pub fn save_specialties(store: &Store, specialties: &[String]) -> Result<(), StorageError> {
    store.write(SPECIALTIES_KEY, &specialties)
}

/// Built-in specialty names as owned strings.
pub fn default_specialties() -> Vec<String> {
    DEFAULT_SPECIALTIES.iter().map(|s| s.to_string()).collect()
}
