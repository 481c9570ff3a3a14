//! Configuration loading: format parsers, merging and environment overrides.

mod builder;
mod discover;
mod env;
mod error;
mod file;
pub mod format;
mod merge;
mod model;
mod source;

pub use builder::{ConfigBuilder, LoadedConfig};
pub use discover::{candidates, discover, user_config_path};
pub use env::{apply_env_overrides, EnvSource, DEFAULT_PREFIX};
pub use error::{ConfigError, SyntaxError};
pub use file::FileSource;
pub use format::ConfigFormat;
pub use merge::merge;
pub use model::*;
pub use source::{Applied, ConfigSource, SourceFile};
