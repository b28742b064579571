//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Duration;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Upper bound for `STOCKARIUM_TOKEN_TTL_MINUTES`: one year.
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Where the API keeps its collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Process-local; lost on restart.
    InMemory,
    /// `<dir>/store.json`.
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub storage: StorageConfig,
    pub seed_demo: bool,
}

impl ApiConfig {
    /// Read `JWT_SECRET`, `STOCKARIUM_BIND_ADDR`, `STOCKARIUM_DATA_DIR`,
    /// `STOCKARIUM_TOKEN_TTL_MINUTES` and `STOCKARIUM_SEED_DEMO`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// In-memory configuration with the demo data seeded; used by tests.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::minutes(480),
            storage: StorageConfig::InMemory,
            seed_demo: true,
        }
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let bind_addr = var("STOCKARIUM_BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("STOCKARIUM_BIND_ADDR must be a socket address")?;

        let ttl_minutes: i64 = match var("STOCKARIUM_TOKEN_TTL_MINUTES") {
            Some(raw) => raw
                .parse()
                .context("STOCKARIUM_TOKEN_TTL_MINUTES must be an integer")?,
            None => 480,
        };
        anyhow::ensure!(
            (1..=MAX_TOKEN_TTL_MINUTES).contains(&ttl_minutes),
            "STOCKARIUM_TOKEN_TTL_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}"
        );
        let token_ttl = Duration::try_minutes(ttl_minutes)
            .context("STOCKARIUM_TOKEN_TTL_MINUTES is out of range")?;

        let data_dir = match var("STOCKARIUM_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .context("failed to determine platform data directory; set STOCKARIUM_DATA_DIR")?
                .join("stockarium"),
        };

        let seed_demo = match var("STOCKARIUM_SEED_DEMO") {
            Some(raw) => raw
                .parse()
                .context("STOCKARIUM_SEED_DEMO must be true or false")?,
            None => true,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            storage: StorageConfig::Directory(data_dir),
            seed_demo,
        })
    }
}
