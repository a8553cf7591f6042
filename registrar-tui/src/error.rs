//! Error types for the TUI.

use crate::api_client::ApiClientError;
use crate::config::ConfigError;
use crate::persistence::PersistenceError;
use registrar_core::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiClientError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
