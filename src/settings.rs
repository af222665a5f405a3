use std::net::SocketAddr;

use anyhow::Context;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Settings {
    /// Defaults, then an optional `trivia.{toml,yaml,json}` next to the
    /// binary, then `TRIVIA_*` environment variables (`.env` included).
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::builder()?
            .add_source(File::with_name("trivia").required(false))
            .add_source(Environment::with_prefix("TRIVIA").try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database_url", "sqlite:trivia.db")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000_i64)
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.database_url, "sqlite:trivia.db");
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.addr().unwrap().port(), 5000);
    }

    #[test]
    fn overrides_take_precedence() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .set_override("port", 8080_i64)
            .unwrap()
            .set_override("host", "127.0.0.1")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.addr().unwrap(), "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn bad_host_is_reported() {
        let settings = Settings {
            database_url: "sqlite::memory:".to_owned(),
            host: "not a host".to_owned(),
            port: 1,
        };
        assert!(settings.addr().is_err());
    }
}
