//! Format parsers for TOML, YAML and JSON configuration files.
//!
//! Each parser decodes text into its own generic tree, picks the
//! [`NAMESPACE`](crate::config::NAMESPACE) node (or the root when the file is
//! not namespaced), decodes that node into [`RawConfig`] and collects unknown
//! keys. The conversion to [`SiteConfig`] is shared.

mod json;
mod raw;
mod toml;
mod yaml;

use std::fmt;
use std::path::Path;

pub use self::json::JsonParser;
pub use self::raw::{RawConfig, KNOWN_KEYS};
pub use self::toml::TomlParser;
pub use self::yaml::YamlParser;

use super::error::{ConfigError, SyntaxError};
use super::model::{Extra, SiteConfig};

/// On-disk configuration format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// File extensions in discovery order.
    pub const EXTENSIONS: [(&'static str, ConfigFormat); 4] = [
        ("toml", ConfigFormat::Toml),
        ("yaml", ConfigFormat::Yaml),
        ("yml", ConfigFormat::Yaml),
        ("json", ConfigFormat::Json),
    ];

    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::EXTENSIONS
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, format)| *format)
    }

    pub fn name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }

    /// Parses `text` into a [`SiteConfig`] holding only what the file sets.
    ///
    /// `path` is only used for error reporting.
    pub fn parse(self, text: &str, path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
        let result = match self {
            ConfigFormat::Toml => TomlParser::parse(text),
            ConfigFormat::Yaml => YamlParser::parse(text),
            ConfigFormat::Json => JsonParser::parse(text),
        };
        result.map_err(|source| ConfigError::Parse {
            format: self,
            path: path.map(Path::to_path_buf),
            source,
        })
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoding steps a format implements; the conversion walk is shared.
pub trait FormatParser {
    /// The format's own generic value tree.
    type Tree;

    fn decode_tree(text: &str) -> Result<Self::Tree, SyntaxError>;

    /// Returns the namespace node, or the root when there is none.
    fn select_namespace(root: Self::Tree) -> Self::Tree;

    fn decode_record(node: &Self::Tree) -> Result<RawConfig, SyntaxError>;

    /// Keys of `node` not modeled by [`RawConfig`], converted verbatim.
    fn unknown_keys(node: &Self::Tree) -> Extra;

    fn parse(text: &str) -> Result<SiteConfig, SyntaxError> {
        let root = Self::decode_tree(text)?;
        let node = Self::select_namespace(root);
        let record = Self::decode_record(&node)?;
        let extra = Self::unknown_keys(&node);
        Ok(record.into_config(extra))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TOML_DOC: &str = r#"
[markata-go]
title = "Notes"
url = "https://example.com"
concurrency = 4
hooks = ["default", "glob"]

[markata-go.theme]
palette = "dark"

[[markata-go.feeds]]
slug = "blog"
items_per_page = 5

[markata-go.feeds.formats]
rss = false
atom = true

[markata-go.my_plugin]
answer = 42
"#;

    const YAML_DOC: &str = r#"
markata-go:
  title: Notes
  url: https://example.com
  concurrency: 4
  hooks: [default, glob]
  theme:
    palette: dark
  feeds:
    - slug: blog
      items_per_page: 5
      formats:
        rss: false
        atom: true
  my_plugin:
    answer: 42
"#;

    const JSON_DOC: &str = r#"{
  "markata-go": {
    "title": "Notes",
    "url": "https://example.com",
    "concurrency": 4,
    "hooks": ["default", "glob"],
    "theme": {"palette": "dark"},
    "feeds": [{"slug": "blog", "items_per_page": 5, "formats": {"rss": false, "atom": true}}],
    "my_plugin": {"answer": 42}
  }
}"#;

    #[test]
    fn test_formats_decode_to_same_model() {
        let toml = ConfigFormat::Toml.parse(TOML_DOC, None).unwrap();
        let yaml = ConfigFormat::Yaml.parse(YAML_DOC, None).unwrap();
        let json = ConfigFormat::Json.parse(JSON_DOC, None).unwrap();

        assert_eq!(toml, yaml);
        assert_eq!(toml, json);

        assert_eq!(toml.title, "Notes");
        assert_eq!(toml.concurrency, 4);
        assert_eq!(toml.theme.palette, "dark");
        assert_eq!(toml.feeds[0].formats.rss, Some(false));
        assert_eq!(toml.feeds[0].formats.atom, Some(true));
        assert_eq!(toml.feeds[0].formats.html, None);
        assert_eq!(toml.extra["my_plugin"]["answer"], serde_json::json!(42));
    }

    #[test]
    fn test_unnamespaced_root_is_read_directly() {
        let config = ConfigFormat::Toml
            .parse("output_dir = \"public\"\n", None)
            .unwrap();
        assert_eq!(config.output_dir, "public");
    }

    #[test]
    fn test_parse_error_names_format_and_path() {
        let err = ConfigFormat::Yaml
            .parse("markata-go: [unclosed", Some(Path::new("site.yaml")))
            .unwrap_err();
        match &err {
            ConfigError::Parse { format, path, .. } => {
                assert_eq!(*format, ConfigFormat::Yaml);
                assert_eq!(path.as_deref(), Some(Path::new("site.yaml")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("YAML"));
    }

    #[test]
    fn test_type_mismatch_is_a_parse_error() {
        let err = ConfigFormat::Json
            .parse(r#"{"markata-go": {"concurrency": "many"}}"#, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: ConfigFormat::Json, .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("a/markata-go.YML")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("site.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("site.ini")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("Makefile")), None);
    }
}
