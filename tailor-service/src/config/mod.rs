//! Service configuration, loaded from the environment on top of the
//! shared core settings.

use std::str::FromStr;

use serde::Deserialize;
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct TailorConfig {
    pub common: CoreConfig,
    pub mongodb: MongoConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Seed the in-memory backend with sample orders.
    pub seed_demo_data: bool,
    /// When the mongo backend is selected but unreachable at startup, fall
    /// back to a seeded in-memory store instead of failing.
    pub fallback_to_memory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown store backend: {}", other)),
        }
    }
}

impl TailorConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = CoreConfig::load()?;
        let is_prod = common.is_production();

        let backend = get_env("STORE_BACKEND", Some("mongo"), is_prod)?
            .parse::<StoreBackend>()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        Ok(TailorConfig {
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("star-tailors"), is_prod)?,
            },
            store: StoreConfig {
                backend,
                seed_demo_data: get_bool_env("STORE_SEED_DEMO_DATA", Some("true"), is_prod)?,
                fallback_to_memory: get_bool_env(
                    "STORE_FALLBACK_TO_MEMORY",
                    Some(if is_prod { "false" } else { "true" }),
                    is_prod,
                )?,
            },
            common,
        })
    }
}

/// Environment lookup with development defaults. Production requires every
/// key to be set explicitly.
fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match std::env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} must be set in production",
                    key
                )))
            } else if let Some(default) = default {
                Ok(default.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!("{} must be set", key)))
            }
        }
    }
}

fn get_bool_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<bool, AppError> {
    get_env(key, default, is_prod)?.parse::<bool>().map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("{} must be true or false", key))
    })
}
