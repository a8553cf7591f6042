//! Tracing setup.
//!
//! The terminal belongs to the UI, so log lines go to a file.

use crate::error::TuiError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "REGISTRAR_LOG";
pub const DEFAULT_DIRECTIVES: &str = "registrar_core=info,registrar_tui=info";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn init_logging(path: &Path) -> Result<(), TuiError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| TuiError::Logging(e.to_string()))
}
