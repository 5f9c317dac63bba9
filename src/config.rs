use std::env;
use thiserror::Error;

use crate::messages::Locale;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:you_choose.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub locale: Locale,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) | Err(_) => {
                    return Err(ConfigError::Invalid {
                        name: "DATABASE_MAX_CONNECTIONS",
                        message: format!("expected a positive integer, got '{}'", raw),
                    });
                }
                Ok(n) => n,
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let locale = match lookup("YOU_CHOOSE_LOCALE") {
            Some(tag) => Locale::parse(&tag).map_err(|message| ConfigError::Invalid {
                name: "YOU_CHOOSE_LOCALE",
                message,
            })?,
            None => Locale::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            locale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.locale.as_str(), "en-US");
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
            ("YOU_CHOOSE_LOCALE", "pt-BR"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.locale.as_str(), "pt-BR");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
        assert!(config_from(&[("DATABASE_MAX_CONNECTIONS", "many")]).is_err());
        assert!(config_from(&[("YOU_CHOOSE_LOCALE", "portuguese")]).is_err());
    }
}
