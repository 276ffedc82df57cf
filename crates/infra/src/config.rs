//! Configuration loading and representation.
//!
//! Settings come from environment variables; every one has a default so an
//! empty environment yields a working in-memory setup.

use std::time::Duration;

use thiserror::Error;

use stockroll_inventory::{EngineError, InventoryEngine, LowQuantityPolicyKind};

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DB_MAX_CONNECTIONS: &str = "STOCKROLL_DB_MAX_CONNECTIONS";
pub const FETCH_TIMEOUT_MS: &str = "STOCKROLL_FETCH_TIMEOUT_MS";
pub const WORKER_THREADS: &str = "STOCKROLL_WORKER_THREADS";
pub const LOW_QUANTITY_POLICY: &str = "STOCKROLL_LOW_QUANTITY_POLICY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Postgres URL; `None` means no database-backed store is configured.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Upper bound on the bulk variant fetch.
    pub fetch_timeout: Duration,
    /// Worker pool size; `None` sizes it to available parallelism.
    pub worker_threads: Option<usize>,
    pub low_quantity_policy: LowQuantityPolicyKind,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: 5,
            fetch_timeout: Duration::from_millis(5_000),
            worker_threads: None,
            low_quantity_policy: LowQuantityPolicyKind::default(),
        }
    }
}

impl InventoryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_max_connections = match get(DB_MAX_CONNECTIONS) {
            Some(raw) => parse_positive(DB_MAX_CONNECTIONS, &raw)? as u32,
            None => defaults.db_max_connections,
        };

        let fetch_timeout = match get(FETCH_TIMEOUT_MS) {
            Some(raw) => Duration::from_millis(parse_positive(FETCH_TIMEOUT_MS, &raw)?),
            None => defaults.fetch_timeout,
        };

        let worker_threads = get(WORKER_THREADS)
            .map(|raw| parse_positive(WORKER_THREADS, &raw).map(|n| n as usize))
            .transpose()?;

        let low_quantity_policy = match get(LOW_QUANTITY_POLICY) {
            Some(raw) => raw.parse().map_err(|e: stockroll_core::DomainError| ConfigError::Invalid {
                key: LOW_QUANTITY_POLICY,
                message: e.to_string(),
            })?,
            None => defaults.low_quantity_policy,
        };

        Ok(Self {
            database_url: get(DATABASE_URL),
            db_max_connections,
            fetch_timeout,
            worker_threads,
            low_quantity_policy,
        })
    }

    /// Build the pooled engine described by this configuration.
    pub fn build_engine(&self) -> Result<InventoryEngine, EngineError> {
        let mut builder = InventoryEngine::builder().policy(self.low_quantity_policy.build());
        if let Some(threads) = self.worker_threads {
            builder = builder.worker_threads(threads);
        }
        builder.build()
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            message: "must be greater than zero".to_string(),
        }),
        Ok(n) if key == DB_MAX_CONNECTIONS && n > u32::MAX as u64 => Err(ConfigError::Invalid {
            key,
            message: format!("{n} is too large"),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            key,
            message: format!("'{}': {e}", raw.trim()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<InventoryConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        InventoryConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(from_pairs(&[]).unwrap(), InventoryConfig::default());
    }

    #[test]
    fn reads_every_setting() {
        let config = from_pairs(&[
            (DATABASE_URL, "postgres://localhost/catalog"),
            (DB_MAX_CONNECTIONS, "12"),
            (FETCH_TIMEOUT_MS, "250"),
            (WORKER_THREADS, "2"),
            (LOW_QUANTITY_POLICY, "option"),
        ])
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/catalog"));
        assert_eq!(config.db_max_connections, 12);
        assert_eq!(config.fetch_timeout, Duration::from_millis(250));
        assert_eq!(config.worker_threads, Some(2));
        assert_eq!(config.low_quantity_policy, LowQuantityPolicyKind::Option);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            from_pairs(&[(FETCH_TIMEOUT_MS, "soon")]),
            Err(ConfigError::Invalid { key: FETCH_TIMEOUT_MS, .. })
        ));
        assert!(matches!(
            from_pairs(&[(WORKER_THREADS, "0")]),
            Err(ConfigError::Invalid { key: WORKER_THREADS, .. })
        ));
        assert!(matches!(
            from_pairs(&[(LOW_QUANTITY_POLICY, "strict")]),
            Err(ConfigError::Invalid { key: LOW_QUANTITY_POLICY, .. })
        ));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = from_pairs(&[(DATABASE_URL, "  "), (WORKER_THREADS, "")]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.worker_threads, None);
    }

    #[test]
    fn builds_engine_with_requested_pool_size() {
        let config = from_pairs(&[(WORKER_THREADS, "2")]).unwrap();
        assert_eq!(config.build_engine().unwrap().worker_threads(), 2);
    }
}
