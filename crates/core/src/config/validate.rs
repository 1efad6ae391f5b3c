use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Backend section exists (enforced by serde)
/// - Server port is not 0
/// - Backend URL is an http(s) URL
/// - List fetch timeout is not 0 and the default key is not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Backend validation
    let base_url = config.backend.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "backend.base_url must be an http(s) URL, got '{}'",
            config.backend.base_url
        )));
    }
    if config.backend.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "backend.timeout_secs cannot be 0".to_string(),
        ));
    }

    // List validation
    if config.list.fetch_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "list.fetch_timeout_secs cannot be 0".to_string(),
        ));
    }
    if config.list.default_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "list.default_key cannot be blank".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BackendConfig, DatabaseConfig, ListConfig, PresetsConfig, ServerConfig,
    };
    use std::net::IpAddr;

    fn valid_config() -> Config {
        Config {
            backend: BackendConfig {
                base_url: "http://localhost:3000/api".to_string(),
                api_token: None,
                timeout_secs: 30,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            list: ListConfig::default(),
            presets: PresetsConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..valid_config()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_backend_url_scheme() {
        let mut config = valid_config();
        config.backend.base_url = "localhost:3000".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("backend.base_url"));
    }

    #[test]
    fn test_validate_zero_fetch_timeout_fails() {
        let mut config = valid_config();
        config.list.fetch_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_blank_default_key_fails() {
        let mut config = valid_config();
        config.list.default_key = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
