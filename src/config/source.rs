use std::path::{Path, PathBuf};

use super::format::ConfigFormat;
use super::model::SiteConfig;
use super::ConfigError;

/// A configuration file as it was read from disk.
///
/// Kept alongside the resolved config so diagnostics can point back into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl AsRef<Path>, format: ConfigFormat, content: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
            content: content.into(),
        }
    }
}

/// Result of layering one source over a configuration.
#[derive(Debug, Clone)]
pub struct Applied {
    pub config: SiteConfig,
    pub file: Option<SourceFile>,
}

impl Applied {
    pub fn config(config: SiteConfig) -> Self {
        Self { config, file: None }
    }

    pub fn from_file(config: SiteConfig, file: SourceFile) -> Self {
        Self {
            config,
            file: Some(file),
        }
    }
}

/// One layer of the loading pipeline.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    /// Layers this source over `config`.
    fn apply(&self, config: SiteConfig) -> Result<Applied, ConfigError>;
}
