//! Feed definitions and the defaults they inherit from.

use serde::Serialize;

/// Output formats a feed can be rendered into.
///
/// Each flag is tri-state: `Some(true)` requests the format, `Some(false)`
/// explicitly disables it and `None` inherits from [`FeedDefaults::formats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedFormats {
    pub html: Option<bool>,
    pub rss: Option<bool>,
    pub atom: Option<bool>,
    pub json: Option<bool>,
    pub markdown: Option<bool>,
    pub text: Option<bool>,
    pub sitemap: Option<bool>,
}

impl FeedFormats {
    /// Formats enabled for a feed when nothing else is configured.
    pub fn standard() -> Self {
        Self {
            html: Some(true),
            rss: Some(true),
            ..Self::default()
        }
    }

    fn flags(&self) -> [Option<bool>; 7] {
        [
            self.html,
            self.rss,
            self.atom,
            self.json,
            self.markdown,
            self.text,
            self.sitemap,
        ]
    }

    /// True when at least one flag is explicitly `true`.
    pub fn any_requested(&self) -> bool {
        self.flags().iter().any(|f| *f == Some(true))
    }

    /// True when no flag is set in either direction.
    pub fn is_unset(&self) -> bool {
        self.flags().iter().all(Option::is_none)
    }

    /// Fills every unset flag from `defaults`.
    pub fn inherit(&self, defaults: &FeedFormats) -> FeedFormats {
        FeedFormats {
            html: self.html.or(defaults.html),
            rss: self.rss.or(defaults.rss),
            atom: self.atom.or(defaults.atom),
            json: self.json.or(defaults.json),
            markdown: self.markdown.or(defaults.markdown),
            text: self.text.or(defaults.text),
            sitemap: self.sitemap.or(defaults.sitemap),
        }
    }

    /// Names of the formats that end up enabled.
    pub fn enabled(&self) -> Vec<&'static str> {
        const NAMES: [&str; 7] = ["html", "rss", "atom", "json", "markdown", "text", "sitemap"];
        NAMES
            .iter()
            .zip(self.flags())
            .filter(|(_, flag)| *flag == Some(true))
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Template overrides per output format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedTemplates {
    pub html: String,
    pub rss: String,
    pub atom: String,
    pub json: String,
    pub card: String,
}

impl FeedTemplates {
    fn inherit(&self, defaults: &FeedTemplates) -> FeedTemplates {
        let pick = |own: &String, fallback: &String| {
            if own.is_empty() {
                fallback.clone()
            } else {
                own.clone()
            }
        };
        FeedTemplates {
            html: pick(&self.html, &defaults.html),
            rss: pick(&self.rss, &defaults.rss),
            atom: pick(&self.atom, &defaults.atom),
            json: pick(&self.json, &defaults.json),
            card: pick(&self.card, &defaults.card),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyndicationConfig {
    pub max_items: i64,
    pub include_content: bool,
}

impl Default for SyndicationConfig {
    fn default() -> Self {
        Self {
            max_items: 20,
            include_content: false,
        }
    }
}

/// A named, filtered, sorted view over site content.
///
/// An empty `slug` is the home-page feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedConfig {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub filter: String,
    pub sort: String,
    pub reverse: bool,
    pub items_per_page: i64,
    pub orphan_threshold: i64,
    pub formats: FeedFormats,
    pub templates: FeedTemplates,
}

impl FeedConfig {
    /// Returns a copy with zero counters, unset formats and empty templates
    /// filled from `defaults`.
    pub fn with_defaults(&self, defaults: &FeedDefaults) -> FeedConfig {
        FeedConfig {
            items_per_page: if self.items_per_page == 0 {
                defaults.items_per_page
            } else {
                self.items_per_page
            },
            orphan_threshold: if self.orphan_threshold == 0 {
                defaults.orphan_threshold
            } else {
                self.orphan_threshold
            },
            formats: self.formats.inherit(&defaults.formats),
            templates: self.templates.inherit(&defaults.templates),
            ..self.clone()
        }
    }
}

/// Settings every feed inherits unless it overrides them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedDefaults {
    pub items_per_page: i64,
    pub orphan_threshold: i64,
    pub formats: FeedFormats,
    pub templates: FeedTemplates,
    pub syndication: SyndicationConfig,
}

impl Default for FeedDefaults {
    fn default() -> Self {
        Self {
            items_per_page: 10,
            orphan_threshold: 3,
            formats: FeedFormats::standard(),
            templates: FeedTemplates::default(),
            syndication: SyndicationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherit_fills_only_unset_flags() {
        let own = FeedFormats {
            rss: Some(false),
            atom: Some(true),
            ..FeedFormats::default()
        };
        let resolved = own.inherit(&FeedFormats::standard());
        assert_eq!(resolved.html, Some(true));
        assert_eq!(resolved.rss, Some(false));
        assert_eq!(resolved.atom, Some(true));
        assert_eq!(resolved.enabled(), vec!["html", "atom"]);
    }

    #[test]
    fn test_with_defaults_keeps_explicit_values() {
        let feed = FeedConfig {
            slug: "blog".into(),
            items_per_page: 25,
            ..FeedConfig::default()
        };
        let resolved = feed.with_defaults(&FeedDefaults::default());
        assert_eq!(resolved.items_per_page, 25);
        assert_eq!(resolved.orphan_threshold, 3);
        assert_eq!(resolved.formats, FeedFormats::standard());
        assert_eq!(resolved.slug, "blog");
    }

    #[test]
    fn test_any_requested_ignores_explicit_false() {
        let formats = FeedFormats {
            html: Some(false),
            ..FeedFormats::default()
        };
        assert!(!formats.any_requested());
        assert!(!formats.is_unset());
        assert!(FeedFormats::default().is_unset());
    }
}
