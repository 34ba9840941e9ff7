use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_max_iterations() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// A full research run can take minutes.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_iterations")]
    pub default_max_iterations: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            default_max_iterations: default_max_iterations(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 1200,
            height: 820,
            min_width: 720,
            min_height: 480,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::get_config_path());

        if let Ok(url) = std::env::var("RESEARCH_DESK_URL") {
            if !url.trim().is_empty() {
                config.service.base_url = url;
            }
        }

        config
    }

    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => warn!("Error parsing {}: {}. Using defaults.", config_path.display(), e),
                },
                Err(e) => warn!("Error reading {}: {}. Using defaults.", config_path.display(), e),
            }
        } else if let Some(parent) = config_path.parent() {
            // Create config directory if it doesn't exist
            let _ = fs::create_dir_all(parent);
        }

        Config::default()
    }

    pub fn get_config_path() -> PathBuf {
        if std::env::var_os("HOME").is_some() {
            Self::get_config_dir().join("config.toml")
        } else {
            PathBuf::from("config.toml")
        }
    }

    pub fn get_config_dir() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/research-desk")
        } else {
            PathBuf::from(".")
        }
    }

    /// Where downloaded reports go: the configured directory, else
    /// `~/Downloads` when present, else the working directory.
    pub fn export_dir(&self) -> PathBuf {
        if let Some(dir) = &self.export.directory {
            return dir.clone();
        }
        if let Some(home) = std::env::var_os("HOME") {
            let downloads = PathBuf::from(home).join("Downloads");
            if downloads.is_dir() {
                return downloads;
            }
        }
        PathBuf::from(".")
    }
}
