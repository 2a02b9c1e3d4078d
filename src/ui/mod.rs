//! Ratatui front-end split across logical submodules: the application state
//! machine, the input forms, the screen/list rendering, small layout helpers,
//! and the terminal event loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
