use std::path::{Path, PathBuf};

use tracing::debug;

use super::discover::{discover, user_config_path};
use super::env::{EnvSource, DEFAULT_PREFIX};
use super::file::FileSource;
use super::model::{SiteConfig, NAMESPACE};
use super::source::{ConfigSource, SourceFile};
use super::ConfigError;

/// The resolved configuration and the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SiteConfig,
    /// The last file source that was actually read.
    pub source: Option<SourceFile>,
}

/// Builder for layering configuration sources over the defaults.
///
/// Sources are applied in registration order, so later sources override
/// earlier ones. The usual chain is defaults, then a file, then the
/// environment:
///
/// ```no_run
/// use siteconf::SiteConfig;
///
/// let loaded = SiteConfig::builder()
///     .with_file("markata-go.toml", false)
///     .with_env("MARKATA_GO")
///     .build()?;
/// println!("{}", loaded.config.output_dir);
/// # Ok::<(), siteconf::ConfigError>(())
/// ```
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ConfigBuilder {
    defaults: SiteConfig,
    sources: Vec<Box<dyn ConfigSource>>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Creates a builder starting from [`SiteConfig::default`].
    pub fn new() -> Self {
        Self {
            defaults: SiteConfig::default(),
            sources: Vec::new(),
        }
    }

    /// Replaces the base configuration the sources are layered over.
    pub fn with_defaults(mut self, defaults: SiteConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Adds a config file; the format is chosen by extension.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Probes `dir` for `<name>.toml`, `.yaml`, `.yml`, `.json`, then
    /// `user_config`, and adds the first one found. Adds nothing otherwise.
    pub fn discover(self, dir: impl AsRef<Path>, name: &str, user_config: Option<PathBuf>) -> Self {
        match discover(dir.as_ref(), name, user_config.as_deref()) {
            Some(path) => self.with_file(path, true),
            None => self,
        }
    }

    /// Snapshots the process environment and applies `<prefix>_*` overrides.
    pub fn with_env(self, prefix: impl Into<String>) -> Self {
        self.with_source(EnvSource::from_process(prefix))
    }

    /// Applies `<prefix>_*` overrides from an explicit set of variables.
    pub fn with_env_vars<I, K, V>(self, prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.with_source(EnvSource::from_vars(prefix, vars))
    }

    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Applies every source in order. Any failure aborts the whole load.
    pub fn build(self) -> Result<LoadedConfig, ConfigError> {
        let mut config = self.defaults;
        let mut source = None;

        for layer in &self.sources {
            debug!(?layer, "applying config source");
            let applied = layer.apply(config)?;
            config = applied.config;
            if applied.file.is_some() {
                source = applied.file;
            }
        }

        Ok(LoadedConfig { config, source })
    }
}

impl SiteConfig {
    /// Loads the configuration for a project directory: defaults, then the
    /// discovered `markata-go.*` file (or the user-level config), then
    /// `MARKATA_GO_*` environment variables.
    pub fn load(dir: impl AsRef<Path>) -> Result<LoadedConfig, ConfigError> {
        SiteConfig::builder()
            .discover(dir, NAMESPACE, user_config_path(NAMESPACE))
            .with_env(DEFAULT_PREFIX)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_sources_yields_defaults() {
        let loaded = ConfigBuilder::new().build().unwrap();
        assert_eq!(loaded.config.output_dir, "output");
        assert_eq!(loaded.config.glob.patterns, vec!["content/**/*.md", "*.md"]);
        assert!(loaded.source.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("markata-go.toml");
        fs::write(&path, "[markata-go]\nconcurrency = 4\ntitle = \"File\"\n").unwrap();

        let loaded = SiteConfig::builder()
            .with_file(&path, true)
            .with_env_vars("MARKATA_GO", [("MARKATA_GO_CONCURRENCY", "8")])
            .build()
            .unwrap();

        assert_eq!(loaded.config.concurrency, 8);
        assert_eq!(loaded.config.title, "File");
        assert_eq!(loaded.source.unwrap().path, path);
    }

    #[test]
    fn test_later_files_override_earlier() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base.yaml");
        let local = dir.path().join("local.json");
        fs::write(&base, "markata-go:\n  title: Base\n  author: Ann\n").unwrap();
        fs::write(&local, r#"{"markata-go": {"title": "Local"}}"#).unwrap();

        let loaded = SiteConfig::builder()
            .with_file(&base, true)
            .with_file(&local, false)
            .build()
            .unwrap();

        assert_eq!(loaded.config.title, "Local");
        assert_eq!(loaded.config.author, "Ann");
        assert_eq!(loaded.source.unwrap().path, local);
    }

    #[test]
    fn test_discover_picks_first_candidate() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.json"), r#"{"markata-go": {"title": "Json"}}"#).unwrap();
        fs::write(dir.path().join("site.yml"), "markata-go:\n  title: Yml\n").unwrap();

        let loaded = SiteConfig::builder()
            .discover(dir.path(), "site", None)
            .build()
            .unwrap();

        assert_eq!(loaded.config.title, "Yml");
    }

    #[test]
    fn test_failed_source_returns_no_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[markata-go\n").unwrap();

        let result = SiteConfig::builder()
            .with_file(&path, true)
            .with_env_vars("MARKATA_GO", [("MARKATA_GO_TITLE", "x")])
            .build();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
