//! Application configuration.
//!
//! Defaults, optionally overridden by a TOML file and then by environment
//! variables:
//!
//! - `LISTING_DESK_API_URL` - base URL of the listing endpoint
//! - `LISTING_DESK_PORT` - port the server binds to
//! - `LISTING_DESK_ADMIN_PASSWORD` - pass-phrase required to create listings
//! - `LISTING_DESK_FAVORITES` - path of the local favorites file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "listing-desk.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub server: ServerConfig,
    pub favorites: FavoritesConfig,
}

/// Listing endpoint client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            timeout_secs: 30,
            user_agent: concat!("listing-desk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Listing endpoint server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// When set, create requests must carry this pass-phrase
    pub admin_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            admin_password: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FavoritesConfig {
    pub path: PathBuf,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("favorites.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (or `listing-desk.toml` if present) and
    /// apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply overrides looked up by environment variable name
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LISTING_DESK_API_URL") {
            self.api.base_url = url;
        }
        if let Some(port) = lookup("LISTING_DESK_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("LISTING_DESK_PORT is not a valid port: {port}"))?;
        }
        if let Some(password) = lookup("LISTING_DESK_ADMIN_PASSWORD") {
            self.server.admin_password = Some(password).filter(|p| !p.is_empty());
        }
        if let Some(path) = lookup("LISTING_DESK_FAVORITES") {
            self.favorites.path = PathBuf::from(path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.server.socket_addr(), "127.0.0.1:3000");
        assert_eq!(config.server.admin_password, None);
        assert_eq!(config.favorites.path, PathBuf::from("favorites.json"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 8080
            admin_password = "letmein"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.admin_password.as_deref(), Some("letmein"));
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"https://listings.example.com\"").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://listings.example.com");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LISTING_DESK_API_URL", "http://10.0.0.5:9000"),
            ("LISTING_DESK_PORT", "9000"),
            ("LISTING_DESK_ADMIN_PASSWORD", "s3cret"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.admin_password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "LISTING_DESK_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }
}
