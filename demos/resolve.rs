//! Resolves the configuration for a project directory and prints any
//! validation findings.
//!
//! ```text
//! cargo run --example resolve -- path/to/site
//! RUST_LOG=siteconf=debug cargo run --example resolve
//! ```

use siteconf::{validate_with_positions, PositionTracker, SiteConfig};

fn main() -> Result<(), siteconf::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let loaded = SiteConfig::load(&dir)?;

    match &loaded.source {
        Some(file) => println!("Config: {} ({})", file.path.display(), file.format),
        None => println!("Config: defaults only"),
    }
    println!("Output dir: {}", loaded.config.output_dir);
    println!("Glob patterns: {:?}", loaded.config.glob.patterns);
    println!("Feeds: {}", loaded.config.feeds.len());

    let tracker = loaded.source.as_ref().map(PositionTracker::from_source);
    let findings = validate_with_positions(Some(&loaded.config), tracker.as_ref());
    for finding in &findings {
        eprintln!("{finding}\n");
    }
    if findings.iter().any(|f| f.error.is_error()) {
        std::process::exit(1);
    }

    Ok(())
}
