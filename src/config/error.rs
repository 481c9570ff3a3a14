use std::path::PathBuf;
use thiserror::Error;

use super::format::ConfigFormat;

/// Underlying decoder error of a format parser.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {format} config{}: {source}", display_path(path))]
    Parse {
        format: ConfigFormat,
        path: Option<PathBuf>,
        source: SyntaxError,
    },

    #[error("unsupported config file extension: {0}")]
    UnsupportedFormat(PathBuf),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" '{}'", p.display()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let source = "a = ".parse::<toml::Table>().unwrap_err();
        let err = ConfigError::Parse {
            format: ConfigFormat::Toml,
            path: Some(PathBuf::from("markata-go.toml")),
            source: source.into(),
        };
        let display = err.to_string();
        assert!(display.starts_with("failed to parse TOML config 'markata-go.toml': "));
        assert!(std::error::Error::source(&err).is_some());
    }
}
