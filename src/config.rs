//! Command-line configuration. Every path can also come from the environment
//! so the binary can be pointed at another data set without flags.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::export::{BRANDS_BACKUP_FILE, PRODUCTS_BACKUP_FILE};
use crate::loader::ErrorPolicy;

#[derive(Debug, Parser)]
#[command(name = "inventory-manager")]
#[command(about = "Load, browse, analyze and back up a product inventory")]
pub struct Cli {
    /// SQLite database file, created when missing.
    #[arg(long, env = "INVENTORY_DB", default_value = "inventory.db")]
    pub db: PathBuf,

    /// Brand CSV loaded at startup.
    #[arg(long, env = "INVENTORY_BRANDS", default_value = "brands.csv")]
    pub brands: PathBuf,

    /// Product CSV loaded at startup, after the brands.
    #[arg(long, env = "INVENTORY_CSV", default_value = "inventory.csv")]
    pub inventory: PathBuf,

    /// Directory receiving brands_backup.csv and products_backup.csv.
    #[arg(long, env = "INVENTORY_BACKUP_DIR", default_value = ".")]
    pub backup_dir: PathBuf,

    /// How the loader treats malformed rows.
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    pub on_error: ErrorPolicy,

    /// Do not load the CSV files at startup.
    #[arg(long)]
    pub skip_load: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one product.
    View { id: i64 },
    /// Add a product, creating its brand if needed.
    Add(AddArgs),
    /// Print the price extremes and the brand with most products.
    Analyze,
    /// Write the backup CSV files.
    Backup,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub quantity: u32,
    /// Dollars, e.g. 2.99 or $2.99.
    #[arg(long)]
    pub price: String,
    #[arg(long)]
    pub brand: String,
}

impl Cli {
    pub fn brands_backup_path(&self) -> PathBuf {
        self.backup_dir.join(BRANDS_BACKUP_FILE)
    }

    pub fn products_backup_path(&self) -> PathBuf {
        self.backup_dir.join(PRODUCTS_BACKUP_FILE)
    }

    /// The terminal UI runs when no subcommand is given.
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }
}
