use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;

/// Runtime configuration for the service.
///
/// Environment variables win over `cosmogenesis.toml`; the database path
/// and the token signing secret are required from one of the two.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_path: String,
    pub auth_secret: String,
    pub port: u16,
    pub verbose_errors: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub database_path: Option<String>,
    pub auth_secret: Option<String>,
    pub port: Option<u16>,
    pub verbose_errors: Option<bool>,
}

impl ServiceConfig {
    pub fn load() -> Result<Self> {
        let file = fs::read_to_string("cosmogenesis.toml")
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default();
        Self::resolve(file, |key| env::var(key).ok())
    }

    /// Resolves configuration from a parsed file and an env lookup;
    /// split out so tests can inject both.
    pub fn resolve(file: FileConfig, get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = get("COSMOGENESIS_DB")
            .or(file.database_path)
            .context("COSMOGENESIS_DB is required (SQLite path or :memory:)")?;
        let auth_secret = get("COSMOGENESIS_SECRET")
            .or(file.auth_secret)
            .context("COSMOGENESIS_SECRET is required to verify identity tokens")?;
        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => file.port.unwrap_or(3000),
        };
        let verbose_errors = match get("COSMOGENESIS_ENV") {
            Some(env_name) => env_name == "development",
            None => file.verbose_errors.unwrap_or(false),
        };

        Ok(Self {
            database_path,
            auth_secret,
            port,
            verbose_errors,
        })
    }
}
