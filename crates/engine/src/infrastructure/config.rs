//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};

/// Which record store backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND '{other}', expected sqlite or memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub store_backend: StoreBackend,
    /// Directory with monsters/items/spells/quests JSON overriding the bundled set.
    pub catalog_dir: Option<PathBuf>,
    pub cors_allowed_origins: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server_port = match non_empty("SERVER_PORT").or_else(|| non_empty("PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("SERVER_PORT must be a port number, got '{raw}'"))?,
            None => 3000,
        };
        let store_backend = match non_empty("STORE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StoreBackend::Sqlite,
        };

        Ok(Self {
            server_host: non_empty("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
            database_path: non_empty("DATABASE_PATH")
                .unwrap_or_else(|| "./data/tabletop.db".into()),
            store_backend,
            catalog_dir: non_empty("CATALOG_DIR").map(PathBuf::from),
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS"),
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid listen address {}:{}",
                    self.server_host, self.server_port
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).expect("defaults are valid");
        assert_eq!(cfg.server_host, "0.0.0.0");
        assert_eq!(cfg.server_port, 3000);
        assert_eq!(cfg.database_path, "./data/tabletop.db");
        assert_eq!(cfg.store_backend, StoreBackend::Sqlite);
        assert!(cfg.catalog_dir.is_none());
        assert!(cfg.cors_allowed_origins.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("SERVER_PORT", "8080"),
            ("STORE_BACKEND", "Memory"),
            ("CATALOG_DIR", "/srv/catalog"),
            ("CORS_ALLOWED_ORIGINS", " * "),
        ])
        .expect("valid overrides");
        assert_eq!(cfg.server_port, 8080);
        assert_eq!(cfg.store_backend, StoreBackend::Memory);
        assert_eq!(cfg.catalog_dir, Some(PathBuf::from("/srv/catalog")));
        assert_eq!(cfg.cors_allowed_origins.as_deref(), Some("*"));
        assert_eq!(
            cfg.socket_addr().expect("valid addr").port(),
            8080
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("SERVER_PORT", "eighty")]).is_err());
        assert!(config(&[("STORE_BACKEND", "postgres")]).is_err());
    }
}
