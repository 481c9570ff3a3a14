use std::fs;

use siteconf::config::{DEFAULT_PREFIX, NAMESPACE};
use siteconf::{
    set_in_file, validate, validate_with_positions, KeyPath, LoadedConfig, PositionTracker,
    Severity, SiteConfig, StructuralEditor, YamlEditor,
};
use tempfile::TempDir;

/// Loads `dir` the way `SiteConfig::load` does, but without the user-level
/// config or the real process environment.
fn load_isolated(dir: &TempDir, env: &[(&str, &str)]) -> LoadedConfig {
    SiteConfig::builder()
        .discover(dir.path(), NAMESPACE, None)
        .with_env_vars(DEFAULT_PREFIX, env.iter().copied())
        .build()
        .unwrap()
}

#[test]
fn test_defaults_without_file_or_environment() {
    let dir = TempDir::new().unwrap();
    let loaded = load_isolated(&dir, &[]);

    assert!(loaded.source.is_none());
    assert_eq!(loaded.config.output_dir, "output");
    assert_eq!(loaded.config.glob.patterns, vec!["content/**/*.md", "*.md"]);
}

#[test]
fn test_url_without_scheme_reports_fix() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("markata-go.toml"),
        "[markata-go]\ntitle = \"My Site\"\nurl = \"example.com\"\n",
    )
    .unwrap();

    let loaded = load_isolated(&dir, &[]);
    let tracker = PositionTracker::from_source(loaded.source.as_ref().unwrap());
    let errors = validate_with_positions(Some(&loaded.config), Some(&tracker));

    assert_eq!(errors.len(), 1);
    let error = &errors[0];
    assert_eq!(error.error.path, "url");
    assert_eq!(error.error.severity, Severity::Error);
    assert!(error.error.message.contains("scheme"));
    assert_eq!(error.fix.as_deref(), Some(r#"url = "https://example.com""#));
    assert_eq!((error.line, error.column), (3, 1));
    assert!(error.file.as_ref().unwrap().ends_with("markata-go.toml"));
}

#[test]
fn test_environment_beats_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("markata-go.toml"),
        "[markata-go]\nconcurrency = 4\n",
    )
    .unwrap();

    let loaded = load_isolated(&dir, &[("MARKATA_GO_CONCURRENCY", "8")]);
    assert_eq!(loaded.config.concurrency, 8);
}

#[test]
fn test_yaml_edit_touches_only_the_value() {
    let src = "markata-go:\n  theme:\n    palette: light\n";
    let path = KeyPath::parse("theme.palette").unwrap();
    let out = YamlEditor::new().set(src.as_bytes(), &path, "dark").unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("palette: dark"));
    let changed: Vec<_> = src
        .lines()
        .zip(out.lines())
        .filter(|(before, after)| before != after)
        .collect();
    assert_eq!(changed, [("    palette: light", "    palette: dark")]);
    assert_eq!(src.lines().count(), out.lines().count());
}

#[test]
fn test_feed_with_all_formats_disabled_warns() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("markata-go.toml"),
        "[markata-go]\n\n\
         [[markata-go.feeds]]\n\
         slug = \"blog\"\n\n\
         [markata-go.feeds.formats]\n\
         html = false\n\
         rss = false\n",
    )
    .unwrap();

    let loaded = load_isolated(&dir, &[]);
    let errors = validate(Some(&loaded.config));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "feeds[0].formats");
    assert_eq!(errors[0].severity, Severity::Warning);

    let tracker = PositionTracker::from_source(loaded.source.as_ref().unwrap());
    let positioned = validate_with_positions(Some(&loaded.config), Some(&tracker));
    assert_eq!(positioned[0].line, 6);
}

#[test]
fn test_edit_then_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("markata-go.yaml");
    fs::write(
        &path,
        "# site settings\nmarkata-go:\n  title: Blog  # shown in the header\n",
    )
    .unwrap();

    set_in_file(&path, "theme.palette", "dark").unwrap();
    set_in_file(&path, "concurrency", &4).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# site settings\nmarkata-go:\n  title: Blog  # shown in the header\n"));

    let loaded = load_isolated(&dir, &[]);
    assert_eq!(loaded.config.title, "Blog");
    assert_eq!(loaded.config.theme.palette, "dark");
    assert_eq!(loaded.config.concurrency, 4);
}

#[test]
fn test_same_config_in_every_format() {
    let bodies = [
        (
            "markata-go.toml",
            "[markata-go]\ntitle = \"T\"\n\n[markata-go.glob]\npatterns = [\"posts/*.md\"]\n",
        ),
        (
            "markata-go.yaml",
            "markata-go:\n  title: T\n  glob:\n    patterns:\n      - posts/*.md\n",
        ),
        (
            "markata-go.json",
            r#"{"markata-go": {"title": "T", "glob": {"patterns": ["posts/*.md"]}}}"#,
        ),
    ];

    let configs: Vec<_> = bodies
        .iter()
        .map(|(name, body)| {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join(name), body).unwrap();
            load_isolated(&dir, &[]).config
        })
        .collect();

    assert_eq!(configs[0].glob.patterns, vec!["posts/*.md"]);
    assert_eq!(configs[0], configs[1]);
    assert_eq!(configs[1], configs[2]);
}
