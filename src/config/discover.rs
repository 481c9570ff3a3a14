//! Locating the configuration file when no explicit path is given.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::format::ConfigFormat;

/// Candidate files for `name` in `dir`, in probe order.
pub fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    ConfigFormat::EXTENSIONS
        .iter()
        .map(|(ext, _)| dir.join(format!("{name}.{ext}")))
        .collect()
}

/// Returns the first existing candidate in `dir`, then `user_config` if it
/// exists. Finding nothing is not an error.
pub fn discover(dir: &Path, name: &str, user_config: Option<&Path>) -> Option<PathBuf> {
    let found = candidates(dir, name)
        .into_iter()
        .chain(user_config.map(Path::to_path_buf))
        .find(|path| path.is_file());

    match &found {
        Some(path) => debug!(path = %path.display(), "discovered config file"),
        None => debug!(dir = %dir.display(), name, "no config file found"),
    }
    found
}

/// User-level config path: `$XDG_CONFIG_HOME/<name>/config.toml`, falling back
/// to `$HOME/.config/<name>/config.toml`.
pub fn user_config_path(name: &str) -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join(name).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_candidates_order() {
        let names: Vec<_> = candidates(Path::new("."), "markata-go")
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "markata-go.toml",
                "markata-go.yaml",
                "markata-go.yml",
                "markata-go.json"
            ]
        );
    }

    #[test]
    fn test_toml_wins_over_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.yaml"), "").unwrap();
        fs::write(dir.path().join("site.toml"), "").unwrap();

        let found = discover(dir.path(), "site", None).unwrap();
        assert_eq!(found, dir.path().join("site.toml"));
    }

    #[test]
    fn test_falls_back_to_user_config() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.toml");
        fs::write(&user, "").unwrap();

        assert_eq!(discover(dir.path(), "site", Some(&user)), Some(user));
    }

    #[test]
    fn test_nothing_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(discover(dir.path(), "site", Some(&missing)), None);
    }
}
