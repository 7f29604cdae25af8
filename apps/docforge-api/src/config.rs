//! Runtime configuration from the environment

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 3002;
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Upper bound for one generation request
    pub timeout_ms: u64,
    /// Maximum request body in bytes
    pub body_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Config {
    /// Read `PORT`, `DOCFORGE_TIMEOUT_MS` and `DOCFORGE_BODY_LIMIT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            timeout_ms: parse_var(&lookup, "DOCFORGE_TIMEOUT_MS")?.unwrap_or(defaults.timeout_ms),
            body_limit: parse_var(&lookup, "DOCFORGE_BODY_LIMIT")?.unwrap_or(defaults.body_limit),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        _ => Ok(None),
    }
}
