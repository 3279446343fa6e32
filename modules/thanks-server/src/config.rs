use std::env;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Token the platform echoes back during the subscription handshake.
    pub verify_token: String,
    /// Graph API bearer credential.
    pub access_token: String,
    /// Shared secret used to sign webhook deliveries.
    pub app_secret: String,
    pub database_url: String,

    // Web server
    pub host: String,
    pub port: u16,

    pub graph_api_url: String,
    /// Reject deliveries that carry no signature header at all.
    pub require_signature: bool,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                expected: "a port number",
                value: raw.clone(),
            })?,
            None => 5000,
        };

        let require_signature = match get("REQUIRE_SIGNATURE") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                key: "REQUIRE_SIGNATURE",
                expected: "true or false",
                value: raw.clone(),
            })?,
            None => false,
        };

        Ok(Self {
            verify_token: required("VERIFY_TOKEN")?,
            access_token: required("ACCESS_TOKEN")?,
            app_secret: required("APP_SECRET")?,
            database_url: required("DATABASE_URL")?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            graph_api_url: get("GRAPH_API_URL")
                .unwrap_or_else(|| graph_client::DEFAULT_BASE_URL.to_string()),
            require_signature,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("VERIFY_TOKEN", "verify"),
        ("ACCESS_TOKEN", "access"),
        ("APP_SECRET", "secret"),
        ("DATABASE_URL", "postgres://localhost/thanks"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();
        assert_eq!(config.verify_token, "verify");
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.graph_api_url, "https://graph.facebook.com");
        assert!(!config.require_signature);
        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn each_required_var_is_enforced() {
        for (missing, _) in REQUIRED {
            let pairs: Vec<_> = REQUIRED
                .iter()
                .filter(|(k, _)| k != missing)
                .copied()
                .collect();
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert_eq!(err, ConfigError::Missing(*missing));
        }
    }

    #[test]
    fn blank_required_var_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[2] = ("APP_SECRET", "  ");
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("APP_SECRET"));
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "http"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("GRAPH_API_URL", "http://localhost:9000"),
            ("REQUIRE_SIGNATURE", "TRUE"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.graph_api_url, "http://localhost:9000");
        assert!(config.require_signature);
    }
}
