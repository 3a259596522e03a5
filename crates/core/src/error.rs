use bundlescope_api::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundlescopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Invalid bundle definition in {path}: {message}")]
    Bundle { path: PathBuf, message: String },
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BundlescopeError>;
