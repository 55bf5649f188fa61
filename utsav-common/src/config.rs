//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Server configuration assembled at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_folder: PathBuf,
}

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`data_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_folder())
}

/// Path of the SQLite database file inside the data folder
pub fn database_path(data_folder: &std::path::Path) -> PathBuf {
    data_folder.join("utsav.db")
}

/// Get configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/utsav/config.toml first, then /etc/utsav/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("utsav").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/utsav/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("utsav").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("utsav"))
        .unwrap_or_else(|| PathBuf::from("./utsav_data"))
}
