//! Site configuration for markata-go projects: loading from TOML, YAML or
//! JSON with defaults and environment overrides, validation with source
//! positions, and comment-preserving edits of the original file.

pub mod config;
pub mod edit;
mod error;
pub mod keypath;
pub mod validate;

pub use config::{ConfigBuilder, ConfigError, ConfigFormat, LoadedConfig, SiteConfig};
pub use edit::{set_in_file, Edit, EditError, StructuralEditor, TomlEditor, YamlEditor};
pub use error::Error;
pub use keypath::{KeyPath, KeyPathError};
pub use validate::{
    validate, validate_with_positions, PositionTracker, PositionedError, Severity,
    ValidationError,
};
