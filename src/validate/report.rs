//! Validation findings tied to their place in the source file.

use std::fmt;
use std::path::PathBuf;

use owo_colors::{OwoColorize, Stream};

use super::position::{leaf_name, ContextLine, FieldPosition, PositionTracker};
use super::{findings, Severity, ValidationError};
use crate::config::{ConfigFormat, SiteConfig};

/// Lines of context shown on each side of the offending line.
const CONTEXT_RADIUS: usize = 2;

/// Failure categories with a canned fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixKind {
    UrlNoScheme,
    UrlInvalidScheme,
    UrlNoHost,
    NegativeValue,
    EmptyPatterns,
    NoFormats,
}

impl FixKind {
    /// Stable identifier of the category.
    pub fn key(self) -> &'static str {
        match self {
            FixKind::UrlNoScheme => "url_no_scheme",
            FixKind::UrlInvalidScheme => "url_invalid_scheme",
            FixKind::UrlNoHost => "url_no_host",
            FixKind::NegativeValue => "negative_value",
            FixKind::EmptyPatterns => "empty_patterns",
            FixKind::NoFormats => "no_formats",
        }
    }

    /// A replacement line for `key`, written in `format`'s assignment syntax.
    pub fn suggestion(self, key: &str, value: &str, format: ConfigFormat) -> String {
        let rhs = match self {
            FixKind::UrlNoScheme => quoted(&format!("https://{value}")),
            FixKind::UrlInvalidScheme => {
                let rest = value.split_once("://").map_or("example.com", |(_, rest)| rest);
                quoted(&format!("https://{rest}"))
            }
            FixKind::UrlNoHost => quoted("https://example.com"),
            FixKind::NegativeValue => "0".to_string(),
            FixKind::EmptyPatterns => r#"["content/**/*.md", "*.md"]"#.to_string(),
            FixKind::NoFormats => match format {
                ConfigFormat::Toml => "{ html = true, rss = true }".to_string(),
                ConfigFormat::Yaml | ConfigFormat::Json => "{ \"html\": true, \"rss\": true }".to_string(),
            },
        };
        match format {
            ConfigFormat::Toml => format!("{key} = {rhs}"),
            ConfigFormat::Yaml => format!("{key}: {rhs}"),
            ConfigFormat::Json => format!("\"{key}\": {rhs}"),
        }
    }
}

impl fmt::Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// A [`ValidationError`] with its file location, surrounding lines and a
/// suggested fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedError {
    pub error: ValidationError,
    pub file: Option<PathBuf>,
    /// 1-based; 0 when the field is not written in the file.
    pub line: usize,
    pub column: usize,
    pub value: String,
    pub fix_kind: Option<FixKind>,
    pub fix: Option<String>,
    pub context: Vec<ContextLine>,
}

impl PositionedError {
    pub fn position(&self) -> FieldPosition {
        FieldPosition {
            line: self.line,
            column: self.column,
        }
    }
}

/// Runs [`validate`](super::validate) and attaches file positions from
/// `tracker`. Fixes use TOML syntax when there is no tracker.
pub fn validate_with_positions(
    config: Option<&SiteConfig>,
    tracker: Option<&PositionTracker>,
) -> Vec<PositionedError> {
    let format = tracker
        .and_then(PositionTracker::format)
        .unwrap_or(ConfigFormat::Toml);

    findings(config)
        .into_iter()
        .map(|finding| {
            let position = tracker.map_or(FieldPosition::UNKNOWN, |t| t.find(&finding.error.path));
            let context = tracker
                .map(|t| t.context(position.line, CONTEXT_RADIUS))
                .unwrap_or_default();
            let fix = finding
                .fix
                .map(|kind| kind.suggestion(leaf_name(&finding.error.path), &finding.value, format));
            PositionedError {
                file: tracker.map(|t| t.path().to_path_buf()),
                line: position.line,
                column: position.column,
                value: finding.value,
                fix_kind: finding.fix,
                fix,
                context,
                error: finding.error,
            }
        })
        .collect()
}

impl fmt::Display for PositionedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error.severity {
            Severity::Error => write!(
                f,
                "{}",
                "error".if_supports_color(Stream::Stderr, |t| t.red())
            )?,
            Severity::Warning => write!(
                f,
                "{}",
                "warning".if_supports_color(Stream::Stderr, |t| t.yellow())
            )?,
        }
        writeln!(
            f,
            "{} {}",
            ":".if_supports_color(Stream::Stderr, |t| t.bold()),
            self.error.message
        )?;

        let width = self
            .context
            .iter()
            .map(|l| l.number.to_string().len())
            .max()
            .unwrap_or(1);
        let pad = " ".repeat(width);
        let gutter = "|".if_supports_color(Stream::Stderr, |t| t.blue()).to_string();

        let location = match &self.file {
            Some(file) if self.position().is_known() => {
                format!("{}:{}:{}", file.display(), self.line, self.column)
            }
            Some(file) => format!("{} ({})", file.display(), self.error.path),
            None => self.error.path.clone(),
        };
        write!(
            f,
            "{pad}{} {location}",
            "-->".if_supports_color(Stream::Stderr, |t| t.blue())
        )?;

        if !self.context.is_empty() {
            write!(f, "\n{pad} {gutter}")?;
        }
        for line in &self.context {
            write!(f, "\n{:>width$} {gutter} {}", line.number, line.text)?;
            if line.is_target && self.column > 0 {
                let leaf = leaf_name(&self.error.path);
                let underline = "^".repeat(leaf.chars().count().max(1));
                write!(
                    f,
                    "\n{pad} {gutter} {}{}",
                    " ".repeat(self.column - 1),
                    underline.if_supports_color(Stream::Stderr, |t| t.red())
                )?;
            }
        }

        if let Some(fix) = &self.fix {
            write!(
                f,
                "\n{pad} {} {fix}",
                "= fix:".if_supports_color(Stream::Stderr, |t| t.green())
            )?;
        }
        Ok(())
    }
}
