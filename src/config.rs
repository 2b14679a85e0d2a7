use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::pagination::PageSize;

/// File name looked up in the working directory, then in the home directory.
pub const CONFIG_FILE_NAME: &str = "admin-dashboard.toml";

/// Application configuration, loaded from `admin-dashboard.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin of the bot backend, without a trailing `/api`.
    pub api_base_url: String,
    pub default_page_size: PageSize,
    /// Upper bound on how long the terminal shell waits for a panel to settle.
    pub render_wait_secs: u64,
    pub enable_web: bool,
    pub web_port: u16,
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            default_page_size: PageSize::Ten,
            render_wait_secs: 10,
            enable_web: false,
            web_port: 3000,
            log_dir: "logs".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with the chain: `./admin-dashboard.toml` -> `~/admin-dashboard.toml` -> defaults.
    pub fn load() -> Self {
        let candidates = Self::config_paths();
        for path in &candidates {
            if let Ok(contents) = fs::read_to_string(path) {
                match toml::from_str::<AppConfig>(&contents) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        // Logging is not up yet: its directory comes from this file.
                        eprintln!("Warning: failed to parse {}: {}", path.display(), e);
                    }
                }
            }
        }
        Self::default()
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }
        paths
    }
}
