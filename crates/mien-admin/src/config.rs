use serde::Deserialize;
use std::path::PathBuf;

/// Optional on-disk configuration:
/// `$XDG_CONFIG_HOME/mien/config.toml` (or `~/.config/mien/config.toml`).
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    auth_url: Option<String>,
}

/// Admin CLI configuration. Environment variables override the config
/// file; both fall back to local defaults.
pub struct Config {
    /// Base URL of the session storage REST API.
    pub api_url: String,
    /// Base URL of the auth provider.
    pub auth_url: String,
}

impl Config {
    pub fn load() -> Self {
        let file = read_config_file();
        let api_url = std::env::var("MIEN_API_URL")
            .ok()
            .or(file.api_url)
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        let auth_url = std::env::var("MIEN_AUTH_URL")
            .ok()
            .or(file.auth_url)
            .unwrap_or_else(|| format!("{api_url}/auth"));
        Self { api_url, auth_url }
    }
}

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("mien")
        .join("config.toml")
}

fn read_config_file() -> ConfigFile {
    let path = config_path();
    let Ok(raw) = std::fs::read_to_string(&path) else {
        return ConfigFile::default();
    };
    match toml::from_str(&raw) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            ConfigFile::default()
        }
    }
}
