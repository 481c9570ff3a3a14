//! Structural editing of configuration files.
//!
//! Editors parse a file into a concrete syntax tree with byte spans, resolve a
//! [`KeyPath`] against it and produce a single [`Edit`] against the original
//! bytes. Nothing outside the edited range is touched, so comments, ordering
//! and formatting survive.
//!
//! Both editors are namespace-aware: when the document is wrapped in
//! [`NAMESPACE`] (or is empty) paths are resolved inside it, so
//! `theme.palette` addresses `markata-go.theme.palette`.

mod toml;
mod yaml;

use std::ops::Range;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub use self::toml::TomlEditor;
pub use self::yaml::YamlEditor;

use crate::config::{ConfigError, ConfigFormat, SyntaxError, NAMESPACE};
use crate::keypath::KeyPath;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EditError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("cannot resolve insertion point for '{path}': {reason}")]
    Unresolvable { path: String, reason: String },

    #[error("invalid document: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("malformed document at byte {offset}: {message}")]
    Malformed { offset: usize, message: String },

    #[error("cannot encode value: {0}")]
    Encode(String),

    #[error("edit range {start}..{end} out of bounds for buffer of {len} bytes")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl EditError {
    pub(crate) fn unresolvable(path: &KeyPath, reason: impl Into<String>) -> Self {
        EditError::Unresolvable {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// A byte-range replacement against one specific buffer.
///
/// `start == end` is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            replacement: text.into(),
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    /// Returns a new buffer with the edit applied.
    pub fn apply(&self, buffer: &[u8]) -> Result<Vec<u8>, EditError> {
        if self.start > self.end || self.end > buffer.len() {
            return Err(EditError::InvalidRange {
                start: self.start,
                end: self.end,
                len: buffer.len(),
            });
        }
        let mut out =
            Vec::with_capacity(buffer.len() - (self.end - self.start) + self.replacement.len());
        out.extend_from_slice(&buffer[..self.start]);
        out.extend_from_slice(self.replacement.as_bytes());
        out.extend_from_slice(&buffer[self.end..]);
        Ok(out)
    }

    /// Rewrites bare `\n` in the replacement to the line ending used where
    /// the edit lands.
    pub(crate) fn with_line_endings(mut self, src: &str) -> Self {
        if line_ending(src, self.start) == "\r\n" {
            self.replacement = self.replacement.replace("\r\n", "\n").replace('\n', "\r\n");
        }
        self
    }
}

/// Reads and rewrites single values of one file format.
pub trait StructuralEditor {
    /// The host format's native value type.
    type Value;

    /// Decodes the value stored at `path`.
    fn get(&self, source: &[u8], path: &KeyPath) -> Result<Self::Value, EditError>;

    /// Computes the edit that stores `value` at `path`, inserting the key (and
    /// any missing parent tables) when absent.
    fn plan_set<T: Serialize + ?Sized>(
        &self,
        source: &[u8],
        path: &KeyPath,
        value: &T,
    ) -> Result<Edit, EditError>;

    /// Byte span of the key that defines `path`, if present.
    fn locate_key(&self, source: &[u8], path: &KeyPath) -> Option<Range<usize>>;

    fn set<T: Serialize + ?Sized>(
        &self,
        source: &[u8],
        path: &KeyPath,
        value: &T,
    ) -> Result<Vec<u8>, EditError> {
        self.plan_set(source, path, value)?.apply(source)
    }
}

/// Rewrites `key` in the config file at `path`, leaving the rest of the file
/// untouched. The editor is chosen by extension; JSON files are rejected.
pub fn set_in_file<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    key: &str,
    value: &T,
) -> Result<(), crate::Error> {
    let path = path.as_ref();
    let key = KeyPath::parse(key)?;
    let source = std::fs::read(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let patched = match ConfigFormat::from_path(path) {
        Some(ConfigFormat::Toml) => TomlEditor::new().set(&source, &key, value)?,
        Some(ConfigFormat::Yaml) => YamlEditor::new().set(&source, &key, value)?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf()).into()),
    };

    std::fs::write(path, patched).map_err(|source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), %key, "updated config file");
    Ok(())
}

/// Prefixes `path` with `namespace` when the document uses it.
fn scoped_path(path: &KeyPath, namespace: Option<&str>, uses_namespace: bool) -> KeyPath {
    match namespace {
        Some(ns) if uses_namespace && !path.starts_with_name(ns) => path.prefixed(ns),
        _ => path.clone(),
    }
}

fn default_namespace() -> Option<String> {
    Some(NAMESPACE.to_string())
}

/// Byte offset of the start of the line containing `offset`.
fn line_start(src: &str, offset: usize) -> usize {
    src[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Byte offset just past the newline ending the line containing `offset`,
/// or the end of the buffer.
fn next_line_start(src: &str, offset: usize) -> usize {
    src[offset..]
        .find('\n')
        .map_or(src.len(), |i| offset + i + 1)
}

/// `\r\n` when the nearest line break before `at` (or after it, on the
/// first line) is CRLF.
fn line_ending(src: &str, at: usize) -> &'static str {
    let at = at.min(src.len());
    let nearest = src[..at]
        .rfind('\n')
        .or_else(|| src[at..].find('\n').map(|i| at + i));
    match nearest {
        Some(i) if i > 0 && src.as_bytes()[i - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

/// Text that places `line` on its own line at `at`.
fn line_insertion(src: &str, at: usize, line: &str) -> String {
    if at == src.len() && !src.is_empty() && !src.ends_with('\n') {
        format!("\n{line}\n")
    } else {
        format!("{line}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replacement_and_insertion() {
        let buf = b"title = \"a\"\n";
        let replaced = Edit::replace(8..11, "\"b\"").apply(buf).unwrap();
        assert_eq!(replaced, b"title = \"b\"\n");

        let inserted = Edit::insert(buf.len(), "url = \"x\"\n").apply(buf).unwrap();
        assert_eq!(inserted, b"title = \"a\"\nurl = \"x\"\n");
        assert!(Edit::insert(0, "").is_insertion());
    }

    #[test]
    fn test_apply_rejects_bad_ranges() {
        let buf = b"abc";
        assert!(matches!(
            Edit::replace(2..5, "x").apply(buf),
            Err(EditError::InvalidRange { len: 3, .. })
        ));
        let backwards = Edit {
            start: 2,
            end: 1,
            replacement: String::new(),
        };
        assert!(backwards.apply(buf).is_err());
    }

    #[test]
    fn test_line_helpers() {
        let src = "a = 1\nb = 2";
        assert_eq!(line_start(src, 8), 6);
        assert_eq!(next_line_start(src, 2), 6);
        assert_eq!(next_line_start(src, 8), src.len());
        assert_eq!(line_insertion(src, src.len(), "c = 3"), "\nc = 3\n");
        assert_eq!(line_insertion(src, 6, "c = 3"), "c = 3\n");
    }

    #[test]
    fn test_line_endings_follow_the_document() {
        let crlf = "a = 1\r\nb = 2\r\n";
        assert_eq!(line_ending(crlf, crlf.len()), "\r\n");
        assert_eq!(line_ending(crlf, 0), "\r\n");
        assert_eq!(line_ending("a = 1\nb = 2\n", 6), "\n");
        assert_eq!(line_ending("", 0), "\n");

        let edit = Edit::insert(crlf.len(), "[t]\nc = 3\n").with_line_endings(crlf);
        assert_eq!(edit.replacement, "[t]\r\nc = 3\r\n");
        let edit = Edit::insert(6, "c = 3\n").with_line_endings("a = 1\nb = 2\n");
        assert_eq!(edit.replacement, "c = 3\n");
    }

    #[test]
    fn test_set_in_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("markata-go.toml");
        std::fs::write(&path, "# mine\n[markata-go]\ntitle = \"a\"\n").unwrap();

        set_in_file(&path, "title", "b").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# mine\n[markata-go]\ntitle = \"b\"\n"
        );

        let json = dir.path().join("markata-go.json");
        std::fs::write(&json, "{}").unwrap();
        assert!(matches!(
            set_in_file(&json, "title", "b"),
            Err(crate::Error::Config(ConfigError::UnsupportedFormat(_)))
        ));
        assert!(matches!(
            set_in_file(&path, "a..b", "x"),
            Err(crate::Error::KeyPath(_))
        ));
    }

    #[test]
    fn test_scoped_path() {
        let path = KeyPath::parse("theme.palette").unwrap();
        assert_eq!(
            scoped_path(&path, Some("markata-go"), true).to_string(),
            "markata-go.theme.palette"
        );
        assert_eq!(scoped_path(&path, Some("markata-go"), false), path);
        let already = KeyPath::parse("markata-go.url").unwrap();
        assert_eq!(scoped_path(&already, Some("markata-go"), true), already);
    }
}
