use std::{net::SocketAddr, path::PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the server on in-memory stores.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

/// Longest token lifetime accepted from the environment.
pub const MAX_TTL_DAYS: i64 = 3650;

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Same as [`AppConfig::from_env`] with variables read through `get`.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = get("DATABASE_URL").filter(|v| !v.is_empty());
        let jwt = JwtConfig {
            secret: get("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "happy-thoughts".into()),
            ttl_days: get("JWT_TTL_DAYS")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30)
                .clamp(0, MAX_TTL_DAYS),
        };
        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = get("APP_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        Ok(Self {
            database_url,
            jwt,
            host,
            port,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Which backend the feed client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedBackend {
    Remote { api_url: String },
    Local { data_dir: PathBuf, seed: bool },
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub backend: FeedBackend,
}

impl FeedConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let source = get("THOUGHTS_SOURCE").unwrap_or_else(|| "local".into());
        let backend = match source.to_lowercase().as_str() {
            "remote" => FeedBackend::Remote {
                api_url: get("THOUGHTS_API_URL")
                    .unwrap_or_else(|| "http://localhost:8080/thoughts".into()),
            },
            "local" => FeedBackend::Local {
                data_dir: get("THOUGHTS_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
                seed: get("THOUGHTS_SEED")
                    .map(|v| v != "0" && v != "false")
                    .unwrap_or(true),
            },
            other => bail!("unknown THOUGHTS_SOURCE {other:?}, expected remote or local"),
        };
        Ok(Self { backend })
    }
}
