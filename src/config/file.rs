//! File-based configuration source.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::format::ConfigFormat;
use super::model::SiteConfig;
use super::source::{Applied, ConfigSource, SourceFile};
use super::ConfigError;

/// A configuration source that loads a TOML, YAML or JSON file.
///
/// The format is chosen by extension. Files can be marked as required or
/// optional; optional files that don't exist are silently skipped.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    /// Creates a new file source.
    ///
    /// If `required` is true, the build will fail if the file doesn't exist.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }

    /// Reads and parses the file without merging it.
    ///
    /// Returns `Ok(None)` if the file doesn't exist and is optional.
    pub fn load(&self) -> Result<Option<(SiteConfig, SourceFile)>, ConfigError> {
        let format = ConfigFormat::from_path(&self.path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(self.path.clone()))?;

        let Some(content) = read_config_file(&self.path, self.required)? else {
            debug!(path = %self.path.display(), "optional config file not present");
            return Ok(None);
        };

        let config = format.parse(&content, Some(&self.path))?;
        debug!(path = %self.path.display(), %format, "loaded config file");
        Ok(Some((config, SourceFile::new(&self.path, format, content))))
    }
}

impl ConfigSource for FileSource {
    fn apply(&self, config: SiteConfig) -> Result<Applied, ConfigError> {
        match self.load()? {
            Some((overlay, file)) => Ok(Applied::from_file(config.merge(&overlay), file)),
            None => Ok(Applied::config(config)),
        }
    }
}

/// Reads a config file's text.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn read_config_file(path: &Path, required: bool) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_config(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{body}").unwrap();
        file
    }

    #[test]
    fn test_file_source_merges_over_base() {
        let file = temp_config(".toml", "[markata-go]\ntitle = \"From File\"\n");

        let source = FileSource::new(file.path(), true);
        let applied = source.apply(SiteConfig::default()).unwrap();

        assert_eq!(applied.config.title, "From File");
        assert_eq!(applied.config.output_dir, "output");
        let source_file = applied.file.unwrap();
        assert_eq!(source_file.format, ConfigFormat::Toml);
        assert!(source_file.content.contains("From File"));
    }

    #[test]
    fn test_file_source_detects_yaml() {
        let file = temp_config(".yml", "markata-go:\n  output_dir: site\n");
        let (config, _) = FileSource::new(file.path(), true).load().unwrap().unwrap();
        assert_eq!(config.output_dir, "site");
    }

    #[test]
    fn test_file_source_required_missing() {
        let source = FileSource::new("/nonexistent/path/config.toml", true);
        let result = source.apply(SiteConfig::default());

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_file_source_optional_missing() {
        let source = FileSource::new("/nonexistent/path/config.toml", false);
        let applied = source.apply(SiteConfig::default()).unwrap();

        assert!(applied.file.is_none());
        assert_eq!(applied.config, SiteConfig::default());
    }

    #[test]
    fn test_file_source_rejects_unknown_extension() {
        let source = FileSource::new("site.ini", false);
        assert!(matches!(
            source.load(),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_file_source_parse_failure_is_fatal() {
        let file = temp_config(".json", "{\"markata-go\": ");
        let result = FileSource::new(file.path(), false).apply(SiteConfig::default());
        assert!(matches!(
            result,
            Err(ConfigError::Parse {
                format: ConfigFormat::Json,
                ..
            })
        ));
    }
}
