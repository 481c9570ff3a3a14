use crate::config::ConfigError;
use crate::edit::EditError;
use crate::keypath::KeyPathError;
use thiserror::Error;

/// Top-level error type for the siteconf library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("edit failed: {0}")]
    Edit(#[from] EditError),

    #[error("invalid key path: {0}")]
    KeyPath(#[from] KeyPathError),
}
