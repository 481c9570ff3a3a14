//! Environment variable overrides.
//!
//! Variables named `<PREFIX>_<FIELD>` override a fixed set of fields. Nested
//! fields are flattened with underscores, e.g.
//! `MARKATA_GO_FEED_DEFAULTS_ITEMS_PER_PAGE=20`.
//!
//! Coercion never fails: booleans accept `true`/`1`/`yes` and treat anything
//! else as `false`; lists are comma separated; integers that do not parse leave
//! the field unchanged.

use tracing::{debug, trace};

use super::model::SiteConfig;
use super::source::{Applied, ConfigSource};
use super::ConfigError;

/// Prefix used by [`SiteConfig::load`].
pub const DEFAULT_PREFIX: &str = "MARKATA_GO";

/// Environment overrides captured once from a set of variables.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    vars: Vec<(String, String)>,
}

impl EnvSource {
    /// Snapshots the process environment.
    pub fn from_process(prefix: impl Into<String>) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    /// Uses an explicit set of variables instead of the process environment.
    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let prefix = prefix.into();
        assert!(!prefix.is_empty(), "prefix must not be empty");
        Self {
            prefix,
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for EnvSource {
    fn apply(&self, mut config: SiteConfig) -> Result<Applied, ConfigError> {
        let vars = self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        apply_env_overrides(&mut config, &self.prefix, vars);
        Ok(Applied::config(config))
    }
}

/// Applies every recognized `<prefix>_*` variable to `config`.
///
/// Returns the number of variables that matched a known field.
pub fn apply_env_overrides<'a, I>(config: &mut SiteConfig, prefix: &str, vars: I) -> usize
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let prefix_with_sep = format!("{prefix}_");
    let mut applied = 0;

    for (key, value) in vars {
        let Some(name) = key.strip_prefix(&prefix_with_sep) else {
            continue;
        };
        let name = name.to_lowercase();
        if apply_one(config, &name, value) {
            debug!(variable = key, field = %name, "applied environment override");
            applied += 1;
        } else {
            trace!(variable = key, "ignoring unrecognized environment variable");
        }
    }

    applied
}

fn apply_one(config: &mut SiteConfig, name: &str, value: &str) -> bool {
    match name {
        "output_dir" => config.output_dir = value.to_string(),
        "url" => config.url = value.to_string(),
        "title" => config.title = value.to_string(),
        "description" => config.description = value.to_string(),
        "author" => config.author = value.to_string(),
        "assets_dir" => config.assets_dir = value.to_string(),
        "templates_dir" => config.templates_dir = value.to_string(),
        "concurrency" => set_int(&mut config.concurrency, name, value),
        "hooks" => config.hooks = parse_list(value),
        "disabled_hooks" => config.disabled_hooks = parse_list(value),
        "glob_patterns" => config.glob.patterns = parse_list(value),
        "glob_use_gitignore" => config.glob.use_gitignore = Some(parse_bool(value)),
        "markdown_extensions" => config.markdown.extensions = parse_list(value),
        "feed_defaults_items_per_page" => {
            set_int(&mut config.feed_defaults.items_per_page, name, value)
        }
        "feed_defaults_orphan_threshold" => {
            set_int(&mut config.feed_defaults.orphan_threshold, name, value)
        }
        "feed_defaults_formats_html" => config.feed_defaults.formats.html = Some(parse_bool(value)),
        "feed_defaults_formats_rss" => config.feed_defaults.formats.rss = Some(parse_bool(value)),
        "feed_defaults_formats_atom" => config.feed_defaults.formats.atom = Some(parse_bool(value)),
        "feed_defaults_formats_json" => config.feed_defaults.formats.json = Some(parse_bool(value)),
        "feed_defaults_formats_markdown" => config.feed_defaults.formats.markdown = Some(parse_bool(value)),
        "feed_defaults_formats_text" => config.feed_defaults.formats.text = Some(parse_bool(value)),
        "feed_defaults_formats_sitemap" => config.feed_defaults.formats.sitemap = Some(parse_bool(value)),
        "feed_defaults_syndication_max_items" => {
            set_int(&mut config.feed_defaults.syndication.max_items, name, value)
        }
        "theme_name" => config.theme.name = value.to_string(),
        "theme_palette" => config.theme.palette = value.to_string(),
        "theme_custom_css" => config.theme.custom_css = value.to_string(),
        "seo_twitter_handle" => config.seo.twitter_handle = value.to_string(),
        "seo_default_image" => config.seo.default_image = value.to_string(),
        "seo_logo_url" => config.seo.logo_url = value.to_string(),
        "encryption_enabled" => config.encryption.enabled = parse_bool(value),
        "encryption_default_key" => config.encryption.default_key = value.to_string(),
        "mentions_enabled" => config.mentions.enabled = Some(parse_bool(value)),
        "blogroll_enabled" => config.blogroll.enabled = parse_bool(value),
        "sidebar_enabled" => config.sidebar.enabled = Some(parse_bool(value)),
        "search_enabled" => config.search.enabled = Some(parse_bool(value)),
        _ => return false,
    }
    true
}

fn parse_bool(value: &str) -> bool {
    let value = value.trim();
    ["true", "1", "yes"]
        .iter()
        .any(|accepted| value.eq_ignore_ascii_case(accepted))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn set_int(field: &mut i64, name: &str, value: &str) {
    match value.trim().parse::<i64>() {
        Ok(parsed) => *field = parsed,
        Err(err) => debug!(field = name, value, %err, "ignoring non-numeric environment override"),
    }
}
