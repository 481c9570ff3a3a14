//! Field-by-field merging of two [`SiteConfig`] values.
//!
//! Rules:
//! - strings and integers: the overlay wins only when non-empty / non-zero
//! - plain booleans: the overlay always wins
//! - tri-state booleans: the overlay wins when set
//! - lists and maps: the overlay replaces the base wholesale when non-empty
//! - feed format groups: the overlay replaces the whole group when any of its
//!   flags is `true`
//!
//! An overlay therefore cannot reset a scalar back to empty or zero.

use std::collections::BTreeMap;

use super::model::{
    BlogrollConfig, EncryptionConfig, FeedDefaults, FeedFormats, FeedTemplates, GlobConfig,
    MarkdownConfig, MentionsConfig, PostFormatsConfig, SearchConfig, SeoConfig, SidebarConfig,
    SiteConfig, SyndicationConfig, ThemeConfig,
};

/// Merges optional configurations; a missing side yields the other side.
pub fn merge(base: Option<&SiteConfig>, overlay: Option<&SiteConfig>) -> Option<SiteConfig> {
    match (base, overlay) {
        (Some(base), Some(overlay)) => Some(base.merge(overlay)),
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (None, None) => None,
    }
}

fn string(base: &str, overlay: &str) -> String {
    let chosen = if overlay.is_empty() { base } else { overlay };
    chosen.to_string()
}

fn int(base: i64, overlay: i64) -> i64 {
    if overlay != 0 {
        overlay
    } else {
        base
    }
}

fn flag(base: Option<bool>, overlay: Option<bool>) -> Option<bool> {
    overlay.or(base)
}

fn list<T: Clone>(base: &[T], overlay: &[T]) -> Vec<T> {
    let chosen = if overlay.is_empty() { base } else { overlay };
    chosen.to_vec()
}

fn map(base: &BTreeMap<String, String>, overlay: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let chosen = if overlay.is_empty() { base } else { overlay };
    chosen.clone()
}

fn formats(base: &FeedFormats, overlay: &FeedFormats) -> FeedFormats {
    let chosen = if overlay.any_requested() { overlay } else { base };
    chosen.clone()
}

fn templates(base: &FeedTemplates, overlay: &FeedTemplates) -> FeedTemplates {
    FeedTemplates {
        html: string(&base.html, &overlay.html),
        rss: string(&base.rss, &overlay.rss),
        atom: string(&base.atom, &overlay.atom),
        json: string(&base.json, &overlay.json),
        card: string(&base.card, &overlay.card),
    }
}

impl SiteConfig {
    /// Returns `self` overridden by `overlay`. Neither input is modified.
    pub fn merge(&self, overlay: &SiteConfig) -> SiteConfig {
        let mut extra = self.extra.clone();
        for (key, value) in &overlay.extra {
            extra.insert(key.clone(), value.clone());
        }

        SiteConfig {
            output_dir: string(&self.output_dir, &overlay.output_dir),
            url: string(&self.url, &overlay.url),
            title: string(&self.title, &overlay.title),
            description: string(&self.description, &overlay.description),
            author: string(&self.author, &overlay.author),
            assets_dir: string(&self.assets_dir, &overlay.assets_dir),
            templates_dir: string(&self.templates_dir, &overlay.templates_dir),
            concurrency: int(self.concurrency, overlay.concurrency),
            hooks: list(&self.hooks, &overlay.hooks),
            disabled_hooks: list(&self.disabled_hooks, &overlay.disabled_hooks),
            nav: list(&self.nav, &overlay.nav),
            glob: GlobConfig {
                patterns: list(&self.glob.patterns, &overlay.glob.patterns),
                use_gitignore: flag(self.glob.use_gitignore, overlay.glob.use_gitignore),
            },
            markdown: MarkdownConfig {
                extensions: list(&self.markdown.extensions, &overlay.markdown.extensions),
            },
            feeds: list(&self.feeds, &overlay.feeds),
            feed_defaults: self.feed_defaults.merge(&overlay.feed_defaults),
            theme: ThemeConfig {
                name: string(&self.theme.name, &overlay.theme.name),
                palette: string(&self.theme.palette, &overlay.theme.palette),
                variables: map(&self.theme.variables, &overlay.theme.variables),
                custom_css: string(&self.theme.custom_css, &overlay.theme.custom_css),
            },
            seo: SeoConfig {
                twitter_handle: string(&self.seo.twitter_handle, &overlay.seo.twitter_handle),
                default_image: string(&self.seo.default_image, &overlay.seo.default_image),
                logo_url: string(&self.seo.logo_url, &overlay.seo.logo_url),
                structured_data: flag(self.seo.structured_data, overlay.seo.structured_data),
            },
            post_formats: PostFormatsConfig {
                html: flag(self.post_formats.html, overlay.post_formats.html),
                markdown: overlay.post_formats.markdown,
                text: overlay.post_formats.text,
                og: overlay.post_formats.og,
            },
            encryption: EncryptionConfig {
                enabled: overlay.encryption.enabled,
                default_key: string(&self.encryption.default_key, &overlay.encryption.default_key),
                decryption_hint: string(
                    &self.encryption.decryption_hint,
                    &overlay.encryption.decryption_hint,
                ),
            },
            mentions: MentionsConfig {
                enabled: flag(self.mentions.enabled, overlay.mentions.enabled),
                character: string(&self.mentions.character, &overlay.mentions.character),
                cache_dir: string(&self.mentions.cache_dir, &overlay.mentions.cache_dir),
            },
            blogroll: BlogrollConfig {
                enabled: overlay.blogroll.enabled,
                feeds: list(&self.blogroll.feeds, &overlay.blogroll.feeds),
                cache_dir: string(&self.blogroll.cache_dir, &overlay.blogroll.cache_dir),
                max_entries_per_feed: int(
                    self.blogroll.max_entries_per_feed,
                    overlay.blogroll.max_entries_per_feed,
                ),
            },
            sidebar: SidebarConfig {
                enabled: flag(self.sidebar.enabled, overlay.sidebar.enabled),
                position: string(&self.sidebar.position, &overlay.sidebar.position),
                title: string(&self.sidebar.title, &overlay.sidebar.title),
                nav: list(&self.sidebar.nav, &overlay.sidebar.nav),
            },
            search: SearchConfig {
                enabled: flag(self.search.enabled, overlay.search.enabled),
                placeholder: string(&self.search.placeholder, &overlay.search.placeholder),
                excerpt_length: int(self.search.excerpt_length, overlay.search.excerpt_length),
            },
            extra,
        }
    }
}

impl FeedDefaults {
    pub fn merge(&self, overlay: &FeedDefaults) -> FeedDefaults {
        FeedDefaults {
            items_per_page: int(self.items_per_page, overlay.items_per_page),
            orphan_threshold: int(self.orphan_threshold, overlay.orphan_threshold),
            formats: formats(&self.formats, &overlay.formats),
            templates: templates(&self.templates, &overlay.templates),
            syndication: SyndicationConfig {
                max_items: int(self.syndication.max_items, overlay.syndication.max_items),
                include_content: overlay.syndication.include_content,
            },
        }
    }
}
