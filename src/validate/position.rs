use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::trace;

use crate::config::{ConfigFormat, SourceFile};
use crate::edit::{StructuralEditor, TomlEditor, YamlEditor};
use crate::keypath::KeyPath;

/// 1-based line and column; `{0, 0}` when the field was not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldPosition {
    pub line: usize,
    pub column: usize,
}

impl FieldPosition {
    pub const UNKNOWN: FieldPosition = FieldPosition { line: 0, column: 0 };

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextLine {
    pub number: usize,
    pub text: String,
    pub is_target: bool,
}

/// Maps field paths to where they are written in one config file.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    path: PathBuf,
    format: Option<ConfigFormat>,
    content: String,
}

impl PositionTracker {
    pub fn new(content: impl Into<String>, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            format: ConfigFormat::from_path(&path),
            path,
            content: content.into(),
        }
    }

    pub fn from_source(file: &SourceFile) -> Self {
        Self {
            path: file.path.clone(),
            format: Some(file.format),
            content: file.content.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Option<ConfigFormat> {
        self.format
    }

    /// Where `field` (e.g. `feeds[0].formats`) is assigned.
    ///
    /// TOML and YAML files are resolved structurally, falling back to the
    /// closest present ancestor. Otherwise, or when nothing matches, the
    /// first line assigning the leaf name wins.
    pub fn find(&self, field: &str) -> FieldPosition {
        if let Some(position) = self.locate(field) {
            return position;
        }
        trace!(field, "falling back to leaf scan");
        self.scan(field)
    }

    /// Up to `radius` lines either side of `line`, with `line` marked.
    pub fn context(&self, line: usize, radius: usize) -> Vec<ContextLine> {
        let lines: Vec<&str> = self.content.lines().collect();
        if line == 0 || line > lines.len() {
            return Vec::new();
        }
        let first = line.saturating_sub(radius).max(1);
        let last = (line + radius).min(lines.len());
        (first..=last)
            .map(|number| ContextLine {
                number,
                text: lines[number - 1].to_string(),
                is_target: number == line,
            })
            .collect()
    }

    fn locate(&self, field: &str) -> Option<FieldPosition> {
        let path = KeyPath::parse(field).ok()?;
        let source = self.content.as_bytes();
        let mut candidate = Some(path);
        while let Some(path) = candidate.filter(|p| !p.is_empty()) {
            let span = match self.format? {
                ConfigFormat::Toml => TomlEditor::new().locate_key(source, &path),
                ConfigFormat::Yaml => YamlEditor::new().locate_key(source, &path),
                ConfigFormat::Json => return None,
            };
            if let Some(span) = span {
                return Some(self.position_of(span.start));
            }
            candidate = path.parent();
        }
        None
    }

    fn scan(&self, field: &str) -> FieldPosition {
        let leaf = leaf_name(field);
        let pattern = format!(r#"(?i)^\s*"?{}"?\s*[=:]"#, regex::escape(leaf));
        let Ok(pattern) = Regex::new(&pattern) else {
            return FieldPosition::UNKNOWN;
        };

        self.content
            .lines()
            .enumerate()
            .find(|(_, line)| pattern.is_match(line))
            .map_or(FieldPosition::UNKNOWN, |(i, line)| {
                let rest = line.trim_start();
                let indent = line[..line.len() - rest.len()].chars().count();
                let quote = usize::from(rest.starts_with('"'));
                FieldPosition {
                    line: i + 1,
                    column: indent + quote + 1,
                }
            })
    }

    fn position_of(&self, offset: usize) -> FieldPosition {
        let before = &self.content[..offset];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        FieldPosition {
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

/// Last path segment without its index: `feeds[0].formats` -> `formats`.
pub(crate) fn leaf_name(field: &str) -> &str {
    let last = field.rsplit('.').next().unwrap_or(field);
    last.split('[').next().unwrap_or(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = "[markata-go]\n\
        title = \"Site\"\n\
        url = \"example.com\"\n\
        \n\
        [markata-go.feed_defaults]\n\
        items_per_page = 10\n\
        \n\
        [[markata-go.feeds]]\n\
        slug = \"blog\"\n\
        items_per_page = -1\n";

    #[test]
    fn test_leaf_name() {
        assert_eq!(leaf_name("feeds[0].formats"), "formats");
        assert_eq!(leaf_name("nav[2]"), "nav");
        assert_eq!(leaf_name("url"), "url");
    }

    #[test]
    fn test_find_resolves_full_path_in_toml() {
        let tracker = PositionTracker::new(TOML, "markata-go.toml");
        assert_eq!(tracker.find("url"), FieldPosition { line: 3, column: 1 });
        // The leaf also appears under feed_defaults; the full path wins.
        assert_eq!(
            tracker.find("feeds[0].items_per_page"),
            FieldPosition { line: 10, column: 1 }
        );
        // Missing field falls back to its nearest present ancestor.
        assert_eq!(
            tracker.find("feeds[0].formats"),
            FieldPosition { line: 8, column: 1 }
        );
    }

    #[test]
    fn test_find_in_yaml() {
        let yaml = "markata-go:\n  title: Site\n  glob:\n    patterns: []\n";
        let tracker = PositionTracker::new(yaml, "markata-go.yaml");
        assert_eq!(
            tracker.find("glob.patterns"),
            FieldPosition { line: 4, column: 5 }
        );
    }

    #[test]
    fn test_leaf_scan_for_json() {
        let json = "{\n  \"markata-go\": {\n    \"URL\": \"example.com\"\n  }\n}\n";
        let tracker = PositionTracker::new(json, "markata-go.json");
        assert_eq!(tracker.find("url"), FieldPosition { line: 3, column: 6 });
        assert_eq!(tracker.find("concurrency"), FieldPosition::UNKNOWN);
    }

    #[test]
    fn test_context_window() {
        let tracker = PositionTracker::new(TOML, "markata-go.toml");
        let context = tracker.context(3, 2);
        let numbers: Vec<_> = context.iter().map(|l| l.number).collect();
        assert_eq!(numbers, [1, 2, 3, 4, 5]);
        assert!(context[2].is_target);
        assert_eq!(context[2].text, "url = \"example.com\"");

        assert_eq!(tracker.context(1, 2).len(), 3);
        assert!(tracker.context(0, 2).is_empty());
        assert!(tracker.context(99, 2).is_empty());
    }
}
