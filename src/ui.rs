//! Ratatui front-end: a four-command menu (View, New, Analyze, Backup) over
//! the open store. Key handling lives in `app`, the draw loop in `terminal`.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
