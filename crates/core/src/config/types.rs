use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::filter::SortOrder;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub presets: PresetsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration (local preset storage)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("shelfview.db")
}

/// List view behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListConfig {
    /// Key activated on startup (e.g. "watching")
    #[serde(default = "default_list_key")]
    pub default_key: String,
    #[serde(default)]
    pub default_sort: SortOrder,
    /// Upper bound on a single list fetch
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Pause in search input before the term is applied
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_key: default_list_key(),
            default_sort: SortOrder::default(),
            fetch_timeout_secs: default_fetch_timeout(),
            search_debounce_ms: default_search_debounce(),
        }
    }
}

fn default_list_key() -> String {
    "watching".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_search_debounce() -> u64 {
    300
}

/// Remote list backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the REST API (e.g., "http://localhost:3000/api")
    pub base_url: String,
    /// Bearer token sent with every request
    #[serde(default)]
    pub api_token: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Where presets are persisted
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PresetStoreKind {
    /// Local SQLite database at `database.path`
    #[default]
    Sqlite,
    /// The remote backend's preset endpoints
    Backend,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PresetsConfig {
    #[serde(default)]
    pub store: PresetStoreKind,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub list: ListConfig,
    pub backend: SanitizedBackendConfig,
    pub presets: PresetsConfig,
}

/// Sanitized backend config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBackendConfig {
    pub base_url: String,
    pub api_token_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            list: config.list.clone(),
            backend: SanitizedBackendConfig {
                base_url: config.backend.base_url.clone(),
                api_token_configured: config
                    .backend
                    .api_token
                    .as_ref()
                    .is_some_and(|t| !t.is_empty()),
                timeout_secs: config.backend.timeout_secs,
            },
            presets: config.presets.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortKey;

    fn backend() -> BackendConfig {
        BackendConfig {
            base_url: "http://localhost:3000/api".to_string(),
            api_token: None,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[backend]
base_url = "http://localhost:3000/api"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:3000/api");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "shelfview.db");
        assert_eq!(config.list.default_key, "watching");
        assert_eq!(config.list.default_sort, SortOrder::default());
        assert_eq!(config.list.fetch_timeout_secs, 30);
        assert_eq!(config.list.search_debounce_ms, 300);
        assert_eq!(config.presets.store, PresetStoreKind::Sqlite);
    }

    #[test]
    fn test_deserialize_missing_backend_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_list_section() {
        let toml = r#"
[backend]
base_url = "http://localhost:3000/api"

[list]
default_key = "completed"
default_sort = "rating_desc"
fetch_timeout_secs = 5
search_debounce_ms = 150

[presets]
store = "backend"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.list.default_key, "completed");
        assert_eq!(config.list.default_sort, SortOrder::desc(SortKey::Rating));
        assert_eq!(config.list.fetch_timeout_secs, 5);
        assert_eq!(config.list.search_debounce_ms, 150);
        assert_eq!(config.presets.store, PresetStoreKind::Backend);
    }

    #[test]
    fn test_deserialize_invalid_sort_fails() {
        let toml = r#"
[backend]
base_url = "http://localhost:3000/api"

[list]
default_sort = "popularity_desc"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_token() {
        let config = Config {
            backend: BackendConfig {
                api_token: Some("secret-token".to_string()),
                timeout_secs: 60,
                ..backend()
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            list: ListConfig::default(),
            presets: PresetsConfig::default(),
        };

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.backend.api_token_configured);
        assert_eq!(sanitized.backend.timeout_secs, 60);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-token"));
    }

    #[test]
    fn test_sanitized_config_without_token() {
        let config = Config {
            backend: backend(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            list: ListConfig::default(),
            presets: PresetsConfig::default(),
        };
        let sanitized = SanitizedConfig::from(&config);
        assert!(!sanitized.backend.api_token_configured);
        assert_eq!(sanitized.database.path.to_str().unwrap(), "shelfview.db");
    }
}
