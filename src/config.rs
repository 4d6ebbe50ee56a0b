use std::{fmt::Display, str::FromStr, time::Duration};

use anyhow::Context;

use crate::retention::{DEFAULT_RETENTION, DEFAULT_SWEEP_EVERY};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub retention: Duration,
    pub sweep_every: Duration,
    pub debounce: Duration,
    pub session_idle: time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://bridge.db".to_owned(),
            bind_addr: "0.0.0.0:8080".to_owned(),
            max_connections: 16,
            retention: DEFAULT_RETENTION,
            sweep_every: DEFAULT_SWEEP_EVERY,
            debounce: Duration::from_millis(300),
            session_idle: time::Duration::minutes(60),
        }
    }
}

impl Config {
    /// Reads `.env` and the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BRIDGE_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse(&lookup, "BRIDGE_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections),
            retention: parse(&lookup, "BRIDGE_RETENTION_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.retention),
            sweep_every: parse(&lookup, "BRIDGE_SWEEP_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_every),
            debounce: parse(&lookup, "BRIDGE_DEBOUNCE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.debounce),
            session_idle: parse(&lookup, "BRIDGE_SESSION_IDLE_MINS")?
                .map(time::Duration::minutes)
                .unwrap_or(defaults.session_idle),
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|err| anyhow::anyhow!("{err}"))
                .with_context(|| format!("{key}={raw:?} is not valid"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_five_hour_window() {
        let config = config(&[]).unwrap();

        assert_eq!(config.retention, Duration::from_secs(5 * 60 * 60));
        assert_eq!(config.sweep_every, Duration::from_secs(5 * 60 * 60));
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn overrides_are_applied() {
        let config = config(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BRIDGE_RETENTION_SECS", "60"),
            ("BRIDGE_DEBOUNCE_MS", " 50 "),
            ("BRIDGE_SESSION_IDLE_MINS", "5"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.retention, Duration::from_secs(60));
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.session_idle, time::Duration::minutes(5));
    }

    #[test]
    fn malformed_values_name_the_key() {
        let err = config(&[("BRIDGE_SWEEP_SECS", "soon")]).unwrap_err();

        assert!(err.to_string().contains("BRIDGE_SWEEP_SECS"));
    }
}
