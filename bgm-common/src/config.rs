//! Configuration file discovery and data folder defaults

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Directory name used under platform config/data folders
const APP_DIR: &str = "bgm";

/// Locate a TOML configuration file
///
/// Priority order:
/// 1. Command-line argument (returned even if the file is missing so the
///    caller can report it)
/// 2. Environment variable (same)
/// 3. User config directory (`~/.config/bgm/<file_name>` on Linux)
/// 4. `/etc/bgm/<file_name>` on Linux
///
/// Returns `None` when no explicit path is given and no default file exists.
pub fn resolve_config_file(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file_name: &str,
) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join(file_name));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join(file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Read and parse a TOML file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Get OS-dependent default data folder
///
/// `~/.local/share/bgm` on Linux, `~/Library/Application Support/bgm` on
/// macOS, `%LOCALAPPDATA%\bgm` on Windows.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./bgm_data"))
}
