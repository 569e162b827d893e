//! Configuration file discovery and loading

use super::fuzzfix_config::FuzzfixConfig;
use crate::{FuzzfixError, Result};
use std::path::{Path, PathBuf};

/// Config file names in priority order
pub const CONFIG_FILE_NAMES: [&str; 3] = [".fuzzfixrc.json", ".fuzzfixrc.toml", "fuzzfix.json"];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover config file by traversing upward from start_path
    ///
    /// Searches each directory for `.fuzzfixrc.json`, `.fuzzfixrc.toml` and
    /// `fuzzfix.json`, in that order, moving up the directory tree until a
    /// config is found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| FuzzfixError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load config from path or auto-discover
    ///
    /// An explicit path must exist. Without one, the search starts at
    /// `start_dir`; finding nothing yields the default configuration.
    pub fn load(
        custom_path: Option<&Path>,
        start_dir: &Path,
    ) -> Result<(FuzzfixConfig, Option<PathBuf>)> {
        let config_path = match custom_path {
            Some(path) if !path.is_file() => {
                return Err(FuzzfixError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::auto_discover(start_dir)?,
        };

        match config_path {
            Some(path) => {
                let config = FuzzfixConfig::load(&path)?;
                tracing::info!("Loaded config from {}", path.display());
                Ok((config, Some(path)))
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok((FuzzfixConfig::default(), None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discovers_from_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "fuzzfix.json", "{}");
        let nested = temp_dir.path().join("src").join("lib");
        fs::create_dir_all(&nested).unwrap();

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "fuzzfix.json");
    }

    #[test]
    fn test_dotfile_wins_in_same_directory() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "fuzzfix.json", "{}");
        create_temp_config(temp_dir.path(), ".fuzzfixrc.toml", "");

        let found = ConfigLoader::auto_discover(temp_dir.path()).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), ".fuzzfixrc.toml");
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.json");
        assert!(ConfigLoader::load(Some(&missing), temp_dir.path()).is_err());
    }

    #[test]
    fn test_explicit_path_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(
            temp_dir.path(),
            "custom.json",
            r#"{ "rewrite": { "tempType": "long" } }"#,
        );
        let (config, used) = ConfigLoader::load(Some(&path), temp_dir.path()).unwrap();
        assert_eq!(used, Some(path));
        assert_eq!(config.rewrite_config().temp_type.as_deref(), Some("long"));
    }
}
