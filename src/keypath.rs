//! Dotted key paths addressing a configuration field.
//!
//! The external form is dot-separated segments, each optionally followed by a
//! single `[N]` array index: `feeds[0].formats.html`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum KeyPathError {
    #[error("key path is empty")]
    Empty,

    #[error("empty segment in key path '{0}'")]
    EmptySegment(String),

    #[error("invalid array index in key path '{0}'")]
    InvalidIndex(String),

    #[error("unclosed '[' in key path '{0}'")]
    UnclosedIndex(String),

    #[error("unexpected text after ']' in key path '{0}'")]
    TrailingText(String),
}

/// One segment of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub name: String,
    pub index: Option<usize>,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}

/// An ordered, case-sensitive address into a configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parses the external `a.b[0].c` form.
    pub fn parse(input: &str) -> Result<Self, KeyPathError> {
        if input.trim().is_empty() {
            return Err(KeyPathError::Empty);
        }

        let segments = input
            .split('.')
            .map(|part| parse_segment(part, input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// The path without its last segment.
    pub fn parent(&self) -> Option<KeyPath> {
        let (_, rest) = self.segments.split_last()?;
        Some(KeyPath::new(rest.to_vec()))
    }

    /// Name of the last segment with any index removed.
    pub fn leaf_name(&self) -> Option<&str> {
        self.last().map(|s| s.name.as_str())
    }

    /// Returns a new path with `name` prepended as an unindexed segment.
    pub fn prefixed(&self, name: &str) -> KeyPath {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(Segment::new(name));
        segments.extend(self.segments.iter().cloned());
        KeyPath::new(segments)
    }

    pub fn starts_with_name(&self, name: &str) -> bool {
        self.first()
            .is_some_and(|s| s.index.is_none() && s.name == name)
    }
}

fn parse_segment(part: &str, whole: &str) -> Result<Segment, KeyPathError> {
    let Some(open) = part.find('[') else {
        if part.is_empty() || part.contains(']') {
            return Err(KeyPathError::EmptySegment(whole.to_string()));
        }
        return Ok(Segment::new(part));
    };

    let name = &part[..open];
    if name.is_empty() {
        return Err(KeyPathError::EmptySegment(whole.to_string()));
    }

    let rest = &part[open + 1..];
    let close = rest
        .find(']')
        .ok_or_else(|| KeyPathError::UnclosedIndex(whole.to_string()))?;
    if close + 1 != rest.len() {
        return Err(KeyPathError::TrailingText(whole.to_string()));
    }

    let index = rest[..close]
        .trim()
        .parse::<usize>()
        .map_err(|_| KeyPathError::InvalidIndex(whole.to_string()))?;

    Ok(Segment::indexed(name, index))
}

impl FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyPath::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_indexed_segments() {
        let path = KeyPath::parse("feeds[0].formats.html").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::indexed("feeds", 0),
                Segment::new("formats"),
                Segment::new("html"),
            ]
        );
        assert_eq!(path.leaf_name(), Some("html"));
    }

    #[test]
    fn test_display_matches_input() {
        for input in ["url", "theme.palette", "feeds[12].items_per_page", "nav[0]"] {
            assert_eq!(KeyPath::parse(input).unwrap().to_string(), input);
        }
    }

    #[test]
    fn test_case_is_preserved() {
        let path: KeyPath = "Theme.Palette".parse().unwrap();
        assert_eq!(path.segments()[0].name, "Theme");
    }

    #[test]
    fn test_rejects_malformed_paths() {
        assert_eq!(KeyPath::parse(""), Err(KeyPathError::Empty));
        assert!(matches!(
            KeyPath::parse("a..b"),
            Err(KeyPathError::EmptySegment(_))
        ));
        assert!(matches!(
            KeyPath::parse("feeds[x]"),
            Err(KeyPathError::InvalidIndex(_))
        ));
        assert!(matches!(
            KeyPath::parse("feeds[0"),
            Err(KeyPathError::UnclosedIndex(_))
        ));
        assert!(matches!(
            KeyPath::parse("feeds[0]x"),
            Err(KeyPathError::TrailingText(_))
        ));
        assert!(matches!(
            KeyPath::parse("[0]"),
            Err(KeyPathError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_parent_and_prefix() {
        let path = KeyPath::parse("theme.palette").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "theme");
        assert_eq!(path.prefixed("markata-go").to_string(), "markata-go.theme.palette");
        assert!(path.prefixed("markata-go").starts_with_name("markata-go"));
        assert!(KeyPath::parse("url").unwrap().parent().unwrap().is_empty());
    }
}
