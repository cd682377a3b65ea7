//! Core library for the inventory manager: a SQLite store of brands and
//! products, a CSV loader, aggregate reports, and CSV backups. The binary in
//! `main.rs` wires these to a terminal menu and a handful of subcommands.
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod loader;
pub mod logging;
pub mod models;
pub mod report;
pub mod schema;
pub mod ui;

/// The store and the schema it is opened with.
pub use db::Store;
pub use schema::Schema;

/// Domain types other layers manipulate.
pub use models::{Brand, BrandCount, Cents, Product};

pub use error::{LoadError, RowError};
pub use loader::{load, load_all, EntityKind, ErrorPolicy, LoadSummary};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
