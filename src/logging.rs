//! Logger setup. The interactive shell logs to a file under the user's home
//! directory; one-shot commands log to stderr.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use env_logger::{Builder, Env, Target};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".inventory-manager";
/// Log file stored inside the application data directory.
const LOG_FILE_NAME: &str = "inventory-manager.log";

/// Where log records go. The terminal UI owns the screen, so it logs to a file.
pub enum LogTarget {
    File,
    Stderr,
}

/// Install the global logger. `RUST_LOG` overrides the default level.
/// Returns the log file path when logging to a file.
pub fn init(target: LogTarget) -> Result<Option<PathBuf>> {
    let (mut builder, path) = match target {
        LogTarget::Stderr => {
            let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
            builder.target(Target::Stderr);
            (builder, None)
        }
        LogTarget::File => {
            let path = log_file_path()?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("failed to create data directory")?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
            builder.target(Target::Pipe(Box::new(file)));
            (builder, Some(path))
        }
    };

    builder.try_init().context("logger already initialised")?;
    Ok(path)
}

/// Resolve the absolute path to the log file inside the user's home.
fn log_file_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME))
}
