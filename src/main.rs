//! Binary entry point that glues the local key-value store to the TUI: bring
//! up logging and the database, hydrate the initial app state, and drive the
//! Ratatui event loop until the user exits.
use std::fs::{self, File};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use clinigest::{load_or_seed_doctors, load_or_seed_specialties, run_app, App, Store};

/// Route log output to a file inside the data directory. Logging to stderr
/// would corrupt the alternate screen, so if no log file can be opened the
/// app simply runs without logging.
fn init_logging() {
    let Ok(dir) = clinigest::db::data_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("clinigest.log")) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clinigest=info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
}

/// Initialize persistence, load cached data, and launch the Ratatui event
/// loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// the user's home directory being unwritable) to the terminal instead of
/// crashing silently. Read problems past that point are fail-soft: the
/// loaders downgrade them to empty lists and log the cause.
fn main() -> anyhow::Result<()> {
    init_logging();

    let store = Store::open()?;
    let doctors = load_or_seed_doctors(&store);
    let specialties = load_or_seed_specialties(&store);

    let mut app = App::new(store, doctors, specialties);
    run_app(&mut app)
}
