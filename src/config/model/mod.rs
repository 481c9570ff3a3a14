//! The canonical, format-independent site configuration.

mod feed;
mod sections;

pub use feed::{FeedConfig, FeedDefaults, FeedFormats, FeedTemplates, SyndicationConfig};
pub use sections::{
    BlogrollConfig, EncryptionConfig, ExternalFeed, GlobConfig, MarkdownConfig, MentionsConfig,
    NavItem, PostFormatsConfig, SearchConfig, SeoConfig, SidebarConfig, ThemeConfig,
};

use serde::Serialize;

use super::builder::ConfigBuilder;
use super::format::RawConfig;

/// Key wrapping every field in an on-disk configuration file.
pub const NAMESPACE: &str = "markata-go";

/// Unknown keys of the namespace table, kept verbatim in file order.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Fully-resolved site configuration.
///
/// [`SiteConfig::default`] holds the documented defaults. Values decoded from a
/// file start from [`SiteConfig::empty`] and are layered over the defaults
/// with [`SiteConfig::merge`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteConfig {
    pub output_dir: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub assets_dir: String,
    pub templates_dir: String,
    /// Worker count; `0` auto-detects.
    pub concurrency: i64,
    pub hooks: Vec<String>,
    pub disabled_hooks: Vec<String>,
    pub nav: Vec<NavItem>,
    pub glob: GlobConfig,
    pub markdown: MarkdownConfig,
    pub feeds: Vec<FeedConfig>,
    pub feed_defaults: FeedDefaults,
    pub theme: ThemeConfig,
    pub seo: SeoConfig,
    pub post_formats: PostFormatsConfig,
    pub encryption: EncryptionConfig,
    pub mentions: MentionsConfig,
    pub blogroll: BlogrollConfig,
    pub sidebar: SidebarConfig,
    pub search: SearchConfig,
    pub extra: Extra,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            url: String::new(),
            title: String::new(),
            description: String::new(),
            author: String::new(),
            assets_dir: "static".to_string(),
            templates_dir: "templates".to_string(),
            concurrency: 0,
            hooks: vec!["default".to_string()],
            disabled_hooks: Vec::new(),
            nav: Vec::new(),
            glob: GlobConfig::default(),
            markdown: MarkdownConfig::default(),
            feeds: Vec::new(),
            feed_defaults: FeedDefaults::default(),
            theme: ThemeConfig::default(),
            seo: SeoConfig::default(),
            post_formats: PostFormatsConfig::default(),
            encryption: EncryptionConfig::default(),
            mentions: MentionsConfig::default(),
            blogroll: BlogrollConfig::default(),
            sidebar: SidebarConfig::default(),
            search: SearchConfig::default(),
            extra: Extra::new(),
        }
    }
}

impl SiteConfig {
    /// The zero value: what an empty configuration file decodes to.
    pub fn empty() -> Self {
        RawConfig::default().into_config(Extra::new())
    }

    /// Creates a loader for layering defaults, files and environment.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Feeds with [`FeedDefaults`] applied.
    pub fn resolved_feeds(&self) -> Vec<FeedConfig> {
        self.feeds
            .iter()
            .map(|feed| feed.with_defaults(&self.feed_defaults))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.output_dir, "output");
        assert_eq!(config.glob.patterns, vec!["content/**/*.md", "*.md"]);
        assert!(config.glob.use_gitignore());
        assert_eq!(config.feed_defaults.items_per_page, 10);
        assert_eq!(config.theme.name, "default");
        assert!(config.search.enabled());
    }

    #[test]
    fn test_empty_has_no_values() {
        let config = SiteConfig::empty();
        assert!(config.output_dir.is_empty());
        assert!(config.glob.patterns.is_empty());
        assert_eq!(config.glob.use_gitignore, None);
        assert_eq!(config.feed_defaults.items_per_page, 0);
        assert!(config.feed_defaults.formats.is_unset());
        assert!(config.theme.name.is_empty());
        // Accessors still apply documented defaults to unset tri-states.
        assert!(config.mentions.enabled());
    }

    #[test]
    fn test_resolved_feeds_inherit_defaults() {
        let config = SiteConfig {
            feeds: vec![FeedConfig {
                slug: "notes".into(),
                ..FeedConfig::default()
            }],
            ..SiteConfig::default()
        };
        let feeds = config.resolved_feeds();
        assert_eq!(feeds[0].items_per_page, 10);
        assert_eq!(feeds[0].formats.enabled(), vec!["html", "rss"]);
    }
}
