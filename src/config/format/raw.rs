//! The intermediate record every format decodes into, and the single walk
//! that turns it into a [`SiteConfig`].
//!
//! Every field is optional so an absent key can be told apart from a zero or
//! `false` value. The conversion fills absent fields with zero values; the
//! documented defaults are applied later by merging over
//! [`SiteConfig::default`].

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::config::model::{
    BlogrollConfig, EncryptionConfig, Extra, ExternalFeed, FeedConfig, FeedDefaults, FeedFormats,
    FeedTemplates, GlobConfig, MarkdownConfig, MentionsConfig, NavItem, PostFormatsConfig,
    SearchConfig, SeoConfig, SidebarConfig, SiteConfig, SyndicationConfig, ThemeConfig,
};

/// Top-level keys of the namespace table understood by [`RawConfig`].
///
/// Anything else is carried through to [`SiteConfig::extra`].
pub const KNOWN_KEYS: &[&str] = &[
    "output_dir",
    "url",
    "title",
    "description",
    "author",
    "assets_dir",
    "templates_dir",
    "concurrency",
    "hooks",
    "disabled_hooks",
    "nav",
    "glob",
    "markdown",
    "feeds",
    "feed_defaults",
    "theme",
    "seo",
    "post_formats",
    "encryption",
    "mentions",
    "blogroll",
    "sidebar",
    "search",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub output_dir: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub assets_dir: Option<String>,
    pub templates_dir: Option<String>,
    pub concurrency: Option<i64>,
    pub hooks: Option<Vec<String>>,
    pub disabled_hooks: Option<Vec<String>>,
    pub nav: Option<Vec<RawNavItem>>,
    pub glob: Option<RawGlob>,
    pub markdown: Option<RawMarkdown>,
    pub feeds: Option<Vec<RawFeed>>,
    pub feed_defaults: Option<RawFeedDefaults>,
    pub theme: Option<RawTheme>,
    pub seo: Option<RawSeo>,
    pub post_formats: Option<RawPostFormats>,
    pub encryption: Option<RawEncryption>,
    pub mentions: Option<RawMentions>,
    pub blogroll: Option<RawBlogroll>,
    pub sidebar: Option<RawSidebar>,
    pub search: Option<RawSearch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawNavItem {
    pub label: Option<String>,
    pub url: Option<String>,
    pub external: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawGlob {
    pub patterns: Option<Vec<String>>,
    pub use_gitignore: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMarkdown {
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFeedFormats {
    pub html: Option<bool>,
    pub rss: Option<bool>,
    pub atom: Option<bool>,
    pub json: Option<bool>,
    pub markdown: Option<bool>,
    pub text: Option<bool>,
    pub sitemap: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFeedTemplates {
    pub html: Option<String>,
    pub rss: Option<String>,
    pub atom: Option<String>,
    pub json: Option<String>,
    pub card: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFeed {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub reverse: Option<bool>,
    pub items_per_page: Option<i64>,
    pub orphan_threshold: Option<i64>,
    pub formats: Option<RawFeedFormats>,
    pub templates: Option<RawFeedTemplates>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSyndication {
    pub max_items: Option<i64>,
    pub include_content: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFeedDefaults {
    pub items_per_page: Option<i64>,
    pub orphan_threshold: Option<i64>,
    pub formats: Option<RawFeedFormats>,
    pub templates: Option<RawFeedTemplates>,
    pub syndication: Option<RawSyndication>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTheme {
    pub name: Option<String>,
    pub palette: Option<String>,
    pub variables: Option<BTreeMap<String, String>>,
    pub custom_css: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSeo {
    pub twitter_handle: Option<String>,
    pub default_image: Option<String>,
    pub logo_url: Option<String>,
    pub structured_data: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPostFormats {
    pub html: Option<bool>,
    pub markdown: Option<bool>,
    pub text: Option<bool>,
    pub og: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEncryption {
    pub enabled: Option<bool>,
    pub default_key: Option<String>,
    pub decryption_hint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMentions {
    pub enabled: Option<bool>,
    pub character: Option<String>,
    pub cache_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawExternalFeed {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBlogroll {
    pub enabled: Option<bool>,
    pub feeds: Option<Vec<RawExternalFeed>>,
    pub cache_dir: Option<String>,
    pub max_entries_per_feed: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSidebar {
    pub enabled: Option<bool>,
    pub position: Option<String>,
    pub title: Option<String>,
    pub nav: Option<Vec<RawNavItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearch {
    pub enabled: Option<bool>,
    pub placeholder: Option<String>,
    pub excerpt_length: Option<i64>,
}

fn nav_items(items: Option<Vec<RawNavItem>>) -> Vec<NavItem> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| NavItem {
            label: item.label.unwrap_or_default(),
            url: item.url.unwrap_or_default(),
            external: item.external.unwrap_or_default(),
        })
        .collect()
}

impl From<RawFeedFormats> for FeedFormats {
    fn from(raw: RawFeedFormats) -> Self {
        FeedFormats {
            html: raw.html,
            rss: raw.rss,
            atom: raw.atom,
            json: raw.json,
            markdown: raw.markdown,
            text: raw.text,
            sitemap: raw.sitemap,
        }
    }
}

impl From<RawFeedTemplates> for FeedTemplates {
    fn from(raw: RawFeedTemplates) -> Self {
        FeedTemplates {
            html: raw.html.unwrap_or_default(),
            rss: raw.rss.unwrap_or_default(),
            atom: raw.atom.unwrap_or_default(),
            json: raw.json.unwrap_or_default(),
            card: raw.card.unwrap_or_default(),
        }
    }
}

impl From<RawFeed> for FeedConfig {
    fn from(raw: RawFeed) -> Self {
        FeedConfig {
            slug: raw.slug.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            filter: raw.filter.unwrap_or_default(),
            sort: raw.sort.unwrap_or_default(),
            reverse: raw.reverse.unwrap_or_default(),
            items_per_page: raw.items_per_page.unwrap_or_default(),
            orphan_threshold: raw.orphan_threshold.unwrap_or_default(),
            formats: raw.formats.map(Into::into).unwrap_or_default(),
            templates: raw.templates.map(Into::into).unwrap_or_default(),
        }
    }
}

impl RawConfig {
    fn feeds(&mut self) -> Vec<FeedConfig> {
        self.feeds
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect()
    }

    fn feed_defaults(&mut self) -> FeedDefaults {
        let raw = self.feed_defaults.take().unwrap_or_default();
        let syndication = raw.syndication.unwrap_or_default();
        FeedDefaults {
            items_per_page: raw.items_per_page.unwrap_or_default(),
            orphan_threshold: raw.orphan_threshold.unwrap_or_default(),
            formats: raw.formats.map(Into::into).unwrap_or_default(),
            templates: raw.templates.map(Into::into).unwrap_or_default(),
            syndication: SyndicationConfig {
                max_items: syndication.max_items.unwrap_or_default(),
                include_content: syndication.include_content.unwrap_or_default(),
            },
        }
    }

    fn glob(&mut self) -> GlobConfig {
        let raw = self.glob.take().unwrap_or_default();
        GlobConfig {
            patterns: raw.patterns.unwrap_or_default(),
            use_gitignore: raw.use_gitignore,
        }
    }

    fn theme(&mut self) -> ThemeConfig {
        let raw = self.theme.take().unwrap_or_default();
        ThemeConfig {
            name: raw.name.unwrap_or_default(),
            palette: raw.palette.unwrap_or_default(),
            variables: raw.variables.unwrap_or_default(),
            custom_css: raw.custom_css.unwrap_or_default(),
        }
    }

    fn seo(&mut self) -> SeoConfig {
        let raw = self.seo.take().unwrap_or_default();
        SeoConfig {
            twitter_handle: raw.twitter_handle.unwrap_or_default(),
            default_image: raw.default_image.unwrap_or_default(),
            logo_url: raw.logo_url.unwrap_or_default(),
            structured_data: raw.structured_data,
        }
    }

    fn post_formats(&mut self) -> PostFormatsConfig {
        let raw = self.post_formats.take().unwrap_or_default();
        PostFormatsConfig {
            html: raw.html,
            markdown: raw.markdown.unwrap_or_default(),
            text: raw.text.unwrap_or_default(),
            og: raw.og.unwrap_or_default(),
        }
    }

    fn encryption(&mut self) -> EncryptionConfig {
        let raw = self.encryption.take().unwrap_or_default();
        EncryptionConfig {
            enabled: raw.enabled.unwrap_or_default(),
            default_key: raw.default_key.unwrap_or_default(),
            decryption_hint: raw.decryption_hint.unwrap_or_default(),
        }
    }

    fn mentions(&mut self) -> MentionsConfig {
        let raw = self.mentions.take().unwrap_or_default();
        MentionsConfig {
            enabled: raw.enabled,
            character: raw.character.unwrap_or_default(),
            cache_dir: raw.cache_dir.unwrap_or_default(),
        }
    }

    fn blogroll(&mut self) -> BlogrollConfig {
        let raw = self.blogroll.take().unwrap_or_default();
        BlogrollConfig {
            enabled: raw.enabled.unwrap_or_default(),
            feeds: raw
                .feeds
                .unwrap_or_default()
                .into_iter()
                .map(|feed| ExternalFeed {
                    url: feed.url.unwrap_or_default(),
                    title: feed.title.unwrap_or_default(),
                    description: feed.description.unwrap_or_default(),
                    category: feed.category.unwrap_or_default(),
                    tags: feed.tags.unwrap_or_default(),
                })
                .collect(),
            cache_dir: raw.cache_dir.unwrap_or_default(),
            max_entries_per_feed: raw.max_entries_per_feed.unwrap_or_default(),
        }
    }

    fn sidebar(&mut self) -> SidebarConfig {
        let raw = self.sidebar.take().unwrap_or_default();
        SidebarConfig {
            enabled: raw.enabled,
            position: raw.position.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            nav: nav_items(raw.nav),
        }
    }

    fn search(&mut self) -> SearchConfig {
        let raw = self.search.take().unwrap_or_default();
        SearchConfig {
            enabled: raw.enabled,
            placeholder: raw.placeholder.unwrap_or_default(),
            excerpt_length: raw.excerpt_length.unwrap_or_default(),
        }
    }

    /// Builds the canonical model. Absent fields become zero values.
    pub fn into_config(mut self, extra: Extra) -> SiteConfig {
        SiteConfig {
            glob: self.glob(),
            markdown: MarkdownConfig {
                extensions: self
                    .markdown
                    .take()
                    .and_then(|m| m.extensions)
                    .unwrap_or_default(),
            },
            feeds: self.feeds(),
            feed_defaults: self.feed_defaults(),
            theme: self.theme(),
            seo: self.seo(),
            post_formats: self.post_formats(),
            encryption: self.encryption(),
            mentions: self.mentions(),
            blogroll: self.blogroll(),
            sidebar: self.sidebar(),
            search: self.search(),
            nav: nav_items(self.nav.take()),
            output_dir: self.output_dir.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            assets_dir: self.assets_dir.unwrap_or_default(),
            templates_dir: self.templates_dir.unwrap_or_default(),
            concurrency: self.concurrency.unwrap_or_default(),
            hooks: self.hooks.unwrap_or_default(),
            disabled_hooks: self.disabled_hooks.unwrap_or_default(),
            extra,
        }
    }
}

/// True for keys that [`RawConfig`] does not model.
pub fn is_unknown_key(key: &str) -> bool {
    !KNOWN_KEYS.contains(&key)
}
