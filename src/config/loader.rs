//! Configuration loading and discovery for `swatchmix.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::MixConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name searched for when no explicit config path is given.
pub const CONFIG_FILE: &str = "swatchmix.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse swatchmix.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override gallery directory
    pub data_dir: Option<PathBuf>,
    /// Override generator timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Find swatchmix.toml by walking up from the current working directory,
/// then falling back to the XDG config directory.
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Checks XDG_CONFIG_HOME/swatchmix/swatchmix.toml or
/// ~/.config/swatchmix/swatchmix.toml
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("swatchmix").join(CONFIG_FILE);
    config_path.exists().then_some(config_path)
}

/// Find swatchmix.toml by walking up from `start`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a file.
///
/// With `None`, the file is discovered with [`find_config`]; if none is
/// found the default configuration is returned. An explicit path that does
/// not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<MixConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            debug!("no config file found, using defaults");
            Ok(MixConfig::default())
        }
    }
}

fn load_config_file(path: &Path) -> Result<MixConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: MixConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    // A relative storage dir is relative to the file that names it
    if config.storage.dir.is_relative() {
        if let Some(root) = path.parent() {
            config.storage.dir = resolve_path(root, &config.storage.dir);
        }
    }

    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Merge CLI overrides into a configuration. CLI values win.
pub fn merge_cli_overrides(config: &mut MixConfig, overrides: &CliOverrides) {
    if let Some(ref dir) = overrides.data_dir {
        config.storage.dir = dir.clone();
    }

    if let Some(timeout) = overrides.timeout_secs {
        config.generator.timeout_secs = timeout;
    }
}

/// Join a relative path onto `root`; absolute paths are returned unchanged.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE);
        File::create(&path)
            .expect("should create config file")
            .write_all(body.as_bytes())
            .expect("should write config content");
        path
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");

        let subdir = temp.path().join("a").join("b");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        assert_eq!(find_config_from(subdir), Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().join("nope")), None);
    }

    #[test]
    fn test_load_config_resolves_storage_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            r#"
[storage]
dir = "galleries"

[generator]
command = "imagegen"
args = ["--aspect", "{aspect}", "{prompt}"]
timeout_secs = 5
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.storage.dir, temp.path().join("galleries"));
        assert_eq!(config.generator.command.as_deref(), Some("imagegen"));
        assert_eq!(config.generator.timeout_secs, 5);
    }

    #[test]
    fn test_load_config_missing_explicit_file() {
        let temp = TempDir::new().expect("should create temp dir");
        assert!(matches!(load_config(Some(&temp.path().join("x.toml"))), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "this is not valid toml {{{");
        assert!(matches!(load_config(Some(&config_path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[generator]\ntimeout_secs = 0\n");

        match load_config(Some(&config_path)) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("generator.timeout_secs"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = MixConfig::default();
        let overrides =
            CliOverrides { data_dir: Some(PathBuf::from("/tmp/g")), timeout_secs: Some(9) };
        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/g"));
        assert_eq!(config.generator.timeout_secs, 9);
    }

    #[test]
    #[serial]
    fn test_xdg_config_lookup() {
        let temp = TempDir::new().expect("should create temp dir");
        let dir = temp.path().join("swatchmix");
        fs::create_dir_all(&dir).expect("should create xdg dir");
        let expected = write_config(&dir, "");

        let previous = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", temp.path());
        let found = find_xdg_config();
        match previous {
            Some(v) => env::set_var("XDG_CONFIG_HOME", v),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }

        assert_eq!(found, Some(expected));
    }
}
