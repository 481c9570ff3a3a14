//! Sub-configurations that hang off [`SiteConfig`](super::SiteConfig).

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: String,
    pub url: String,
    pub external: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobConfig {
    pub patterns: Vec<String>,
    pub use_gitignore: Option<bool>,
}

impl GlobConfig {
    pub fn use_gitignore(&self) -> bool {
        self.use_gitignore.unwrap_or(true)
    }
}

impl Default for GlobConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["content/**/*.md".to_string(), "*.md".to_string()],
            use_gitignore: Some(true),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkdownConfig {
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeConfig {
    pub name: String,
    pub palette: String,
    pub variables: BTreeMap<String, String>,
    pub custom_css: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            palette: "default-light".to_string(),
            variables: BTreeMap::new(),
            custom_css: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoConfig {
    pub twitter_handle: String,
    pub default_image: String,
    pub logo_url: String,
    pub structured_data: Option<bool>,
}

impl SeoConfig {
    pub fn structured_data(&self) -> bool {
        self.structured_data.unwrap_or(true)
    }
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            twitter_handle: String::new(),
            default_image: String::new(),
            logo_url: String::new(),
            structured_data: Some(true),
        }
    }
}

/// Extra per-post output formats besides the HTML page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostFormatsConfig {
    pub html: Option<bool>,
    pub markdown: bool,
    pub text: bool,
    pub og: bool,
}

impl PostFormatsConfig {
    pub fn html(&self) -> bool {
        self.html.unwrap_or(true)
    }
}

impl Default for PostFormatsConfig {
    fn default() -> Self {
        Self {
            html: Some(true),
            markdown: false,
            text: false,
            og: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncryptionConfig {
    pub enabled: bool,
    pub default_key: String,
    pub decryption_hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionsConfig {
    pub enabled: Option<bool>,
    pub character: String,
    pub cache_dir: String,
}

impl MentionsConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

impl Default for MentionsConfig {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            character: "@".to_string(),
            cache_dir: ".cache/mentions".to_string(),
        }
    }
}

/// An external feed followed by the blogroll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalFeed {
    pub url: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogrollConfig {
    pub enabled: bool,
    pub feeds: Vec<ExternalFeed>,
    pub cache_dir: String,
    pub max_entries_per_feed: i64,
}

impl Default for BlogrollConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            feeds: Vec::new(),
            cache_dir: ".cache/blogroll".to_string(),
            max_entries_per_feed: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarConfig {
    pub enabled: Option<bool>,
    pub position: String,
    pub title: String,
    pub nav: Vec<NavItem>,
}

impl SidebarConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            position: "left".to_string(),
            title: String::new(),
            nav: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    pub enabled: Option<bool>,
    pub placeholder: String,
    pub excerpt_length: i64,
}

impl SearchConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            placeholder: "Search...".to_string(),
            excerpt_length: 200,
        }
    }
}
