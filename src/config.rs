//! Server configuration from environment variables
//!
//! | Variable          | Default      | Meaning                                   |
//! |-------------------|--------------|-------------------------------------------|
//! | `PORT`            | 10000        | Listen port                               |
//! | `SOIL_THRESHOLDS` | (built-in)   | JSON file overriding rule thresholds      |
//! | `ALLOWED_ORIGINS` | (permissive) | Comma-separated CORS origins              |
//! | `CACHE_TTL_SECS`  | 300          | Response cache time-to-live               |
//! | `CACHE_CAPACITY`  | 10000        | Response cache max entries                |

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::thresholds::Thresholds;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub thresholds_path: Option<PathBuf>,
    /// Empty means permissive CORS
    pub allowed_origins: Vec<String>,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            thresholds_path: None,
            allowed_origins: Vec::new(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(p) => p.parse().with_context(|| format!("Invalid PORT: {:?}", p))?,
            None => DEFAULT_PORT,
        };

        let cache_ttl_secs: u64 = match get("CACHE_TTL_SECS") {
            Some(v) => v.parse().with_context(|| format!("Invalid CACHE_TTL_SECS: {:?}", v))?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        let cache_capacity = match get("CACHE_CAPACITY") {
            Some(v) => v.parse().with_context(|| format!("Invalid CACHE_CAPACITY: {:?}", v))?,
            None => DEFAULT_CACHE_CAPACITY,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port,
            thresholds_path: get("SOIL_THRESHOLDS").map(PathBuf::from),
            allowed_origins,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_capacity,
        })
    }

    /// Built-in thresholds, or the override file when configured
    pub fn load_thresholds(&self) -> Result<Thresholds> {
        match &self.thresholds_path {
            Some(path) => {
                tracing::info!("Loading thresholds from {:?}", path);
                Thresholds::load(path)
            }
            None => Ok(Thresholds::default()),
        }
    }
}
