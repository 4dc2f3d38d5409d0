//! Configuration file support for lroot.
//!
//! Configuration is read from `$LROOT_CONFIG_DIR/config.toml` when that
//! variable is set, otherwise from `~/.config/lroot/config.toml` (or the
//! platform equivalent).
//!
//! # Example configuration
//!
//! ```toml
//! [client]
//! sys_root = "/sys/fs/lustre"
//! proc_root = "/proc/fs/lustre"
//! ```
//!
//! Command-line flags and `LUSTRE_SYS_ROOT` / `LUSTRE_PROC_ROOT` take
//! precedence over the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use lustre_fs::LlapiConfig;

/// Main configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Lustre client locations
    #[serde(default)]
    pub client: ClientSection,
}

/// `[client]` table. Unset keys fall back to the built-in defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ClientSection {
    pub sys_root: Option<PathBuf>,
    pub proc_root: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path, or return empty config if not found.
    pub fn load() -> Result<Self> {
        let Some(path) = config_path() else {
            return Ok(Config::default());
        };

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Merge flag values over the file over the defaults.
    pub fn llapi_config(&self, sys_root: Option<PathBuf>, proc_root: Option<PathBuf>) -> LlapiConfig {
        let defaults = LlapiConfig::default();
        LlapiConfig {
            sys_root: sys_root
                .or_else(|| self.client.sys_root.clone())
                .unwrap_or(defaults.sys_root),
            proc_root: proc_root
                .or_else(|| self.client.proc_root.clone())
                .unwrap_or(defaults.proc_root),
        }
    }
}

/// Get the path to the configuration file.
pub fn config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("LROOT_CONFIG_DIR") {
        return Some(PathBuf::from(dir).join("config.toml"));
    }
    let base_dirs = directories::BaseDirs::new()?;
    Some(base_dirs.config_dir().join("lroot").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lustre_fs::{DEFAULT_PROC_ROOT, DEFAULT_SYS_ROOT};

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.llapi_config(None, None), LlapiConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config: Config = toml::from_str("[client]\nsys_root = \"/srv/sys\"\n").unwrap();
        let llapi = config.llapi_config(None, None);
        assert_eq!(llapi.sys_root, PathBuf::from("/srv/sys"));
        assert_eq!(llapi.proc_root, PathBuf::from(DEFAULT_PROC_ROOT));
    }

    #[test]
    fn test_flags_override_file() {
        let config: Config =
            toml::from_str("[client]\nsys_root = \"/srv/sys\"\nproc_root = \"/srv/proc\"\n")
                .unwrap();
        let llapi = config.llapi_config(Some(PathBuf::from("/flag/sys")), None);
        assert_eq!(llapi.sys_root, PathBuf::from("/flag/sys"));
        assert_eq!(llapi.proc_root, PathBuf::from("/srv/proc"));
        assert_ne!(llapi.sys_root, PathBuf::from(DEFAULT_SYS_ROOT));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config: Config = toml::from_str("[other]\nkey = 1\n").unwrap();
        assert!(config.client.sys_root.is_none());
    }
}
