//! Semantic validation of a resolved [`SiteConfig`].
//!
//! [`validate`] returns plain records. [`validate_with_positions`] runs the
//! same checks and maps each finding back to the file that produced it.

mod position;
mod report;

use std::fmt;

use url::Url;

pub use position::{ContextLine, FieldPosition, PositionTracker};
pub use report::{validate_with_positions, FixKind, PositionedError};

use crate::config::SiteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Machine-stable field path, e.g. `feeds[0].formats`.
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Checks `config`; errors come first, then warnings, each in check order.
pub fn validate(config: Option<&SiteConfig>) -> Vec<ValidationError> {
    findings(config).into_iter().map(|f| f.error).collect()
}

/// One failed check with what the positioned variant needs.
#[derive(Debug)]
struct Finding {
    error: ValidationError,
    /// The offending value as written in the model.
    value: String,
    fix: Option<FixKind>,
}

#[derive(Default)]
struct Findings(Vec<Finding>);

impl Findings {
    fn push(
        &mut self,
        severity: Severity,
        path: impl Into<String>,
        message: impl Into<String>,
        value: impl fmt::Display,
        fix: Option<FixKind>,
    ) {
        self.0.push(Finding {
            error: ValidationError {
                path: path.into(),
                message: message.into(),
                severity,
            },
            value: value.to_string(),
            fix,
        });
    }

    fn non_negative(&mut self, path: impl Into<String>, value: i64) {
        if value < 0 {
            let path = path.into();
            let message = format!("{path} must not be negative (got {value})");
            self.push(
                Severity::Error,
                path,
                message,
                value,
                Some(FixKind::NegativeValue),
            );
        }
    }
}

fn findings(config: Option<&SiteConfig>) -> Vec<Finding> {
    let mut out = Findings::default();
    let Some(config) = config else {
        out.push(
            Severity::Error,
            "config",
            "configuration is missing",
            "",
            None,
        );
        return out.0;
    };

    if !config.url.is_empty() {
        if let Some((message, fix)) = check_url(&config.url) {
            out.push(Severity::Error, "url", message, &config.url, fix);
        }
    }

    out.non_negative("concurrency", config.concurrency);

    if config.glob.patterns.is_empty() {
        out.push(
            Severity::Warning,
            "glob.patterns",
            "no glob patterns configured; no content will be found",
            "[]",
            Some(FixKind::EmptyPatterns),
        );
    }

    for (i, feed) in config.feeds.iter().enumerate() {
        out.non_negative(format!("feeds[{i}].items_per_page"), feed.items_per_page);
        out.non_negative(format!("feeds[{i}].orphan_threshold"), feed.orphan_threshold);
        let formats = feed.formats.inherit(&config.feed_defaults.formats);
        if formats.enabled().is_empty() {
            let name = if feed.slug.is_empty() {
                format!("feeds[{i}]")
            } else {
                format!("'{}'", feed.slug)
            };
            out.push(
                Severity::Warning,
                format!("feeds[{i}].formats"),
                format!("feed {name} has no output formats enabled"),
                "{}",
                Some(FixKind::NoFormats),
            );
        }
    }

    out.non_negative(
        "feed_defaults.items_per_page",
        config.feed_defaults.items_per_page,
    );
    out.non_negative(
        "feed_defaults.orphan_threshold",
        config.feed_defaults.orphan_threshold,
    );

    let mut findings = out.0;
    findings.sort_by_key(|f| f.error.severity);
    findings
}

/// Parse, scheme, http(s), host: the first failure wins.
fn check_url(raw: &str) -> Option<(String, Option<FixKind>)> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Some((
                "URL is missing a scheme (e.g. https://)".to_string(),
                Some(FixKind::UrlNoScheme),
            ))
        }
        Err(url::ParseError::EmptyHost) => {
            return Some(("URL has no host".to_string(), Some(FixKind::UrlNoHost)))
        }
        Err(err) => return Some((format!("URL is not valid: {err}"), None)),
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Some((
            format!("URL scheme must be http or https (got '{}')", url.scheme()),
            Some(FixKind::UrlInvalidScheme),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Some(("URL has no host".to_string(), Some(FixKind::UrlNoHost)));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeedConfig, FeedFormats};

    fn paths(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(Some(&SiteConfig::default())).is_empty());
    }

    #[test]
    fn test_missing_config() {
        let errors = validate(None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "config");
        assert!(errors[0].is_error());
    }

    #[test]
    fn test_url_checks() {
        let cases = [
            ("example.com", Some(FixKind::UrlNoScheme)),
            ("ftp://example.com", Some(FixKind::UrlInvalidScheme)),
            ("https://", Some(FixKind::UrlNoHost)),
            ("https://example.com/blog/", None),
            ("http://localhost:8000", None),
        ];
        for (url, expected) in cases {
            let fix = check_url(url).and_then(|(_, fix)| fix);
            assert_eq!(fix, expected, "{url}");
        }

        let config = SiteConfig {
            url: "example.com".into(),
            ..SiteConfig::default()
        };
        let errors = validate(Some(&config));
        assert_eq!(paths(&errors), ["url"]);
        assert!(errors[0].message.contains("scheme"));
    }

    #[test]
    fn test_empty_url_is_not_checked() {
        let config = SiteConfig {
            url: String::new(),
            ..SiteConfig::default()
        };
        assert!(validate(Some(&config)).is_empty());
    }

    #[test]
    fn test_feed_without_formats_is_a_warning() {
        let mut config = SiteConfig::default();
        config.feeds.push(FeedConfig {
            slug: "blog".into(),
            formats: FeedFormats {
                html: Some(false),
                rss: Some(false),
                ..FeedFormats::default()
            },
            ..FeedConfig::default()
        });
        // Unset formats inherit html and rss from the defaults.
        config.feeds.push(FeedConfig::default());

        let errors = validate(Some(&config));
        assert_eq!(paths(&errors), ["feeds[0].formats"]);
        assert_eq!(errors[0].severity, Severity::Warning);
        assert!(errors[0].message.contains("'blog'"));
    }

    #[test]
    fn test_errors_before_warnings() {
        let mut config = SiteConfig::default();
        config.glob.patterns.clear();
        config.concurrency = -1;
        config.feed_defaults.orphan_threshold = -2;
        config.feeds.push(FeedConfig {
            items_per_page: -5,
            formats: FeedFormats {
                html: Some(false),
                rss: Some(false),
                ..FeedFormats::default()
            },
            ..FeedConfig::default()
        });

        let errors = validate(Some(&config));
        assert_eq!(
            paths(&errors),
            [
                "concurrency",
                "feeds[0].items_per_page",
                "feed_defaults.orphan_threshold",
                "glob.patterns",
                "feeds[0].formats",
            ]
        );
        assert_eq!(validate(Some(&config)), errors);
    }

    #[test]
    fn test_display() {
        let error = ValidationError {
            path: "concurrency".into(),
            message: "concurrency must not be negative (got -1)".into(),
            severity: Severity::Error,
        };
        assert_eq!(
            error.to_string(),
            "error: concurrency: concurrency must not be negative (got -1)"
        );
    }
}
