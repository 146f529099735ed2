//! Configuration for the data-scope module.

use serde::Deserialize;

/// Module configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataScopeConfig {
    pub cache: CacheConfig,
    pub database: DatabaseConfig,
}

/// Scope cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// When `false` every lookup recomputes from the durable stores.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Database connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_conns: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_owned(),
            // an in-memory SQLite database lives and dies with one connection
            max_conns: 1,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_cache() {
        let cfg = DataScopeConfig::default();
        assert!(cfg.cache.enabled);
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.database.max_conns, 1);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: DataScopeConfig =
            serde_json::from_str(r#"{"cache":{"enabled":false}}"#).unwrap();
        assert!(!cfg.cache.enabled);
        assert_eq!(cfg.database.max_conns, 1);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res = serde_json::from_str::<DataScopeConfig>(r#"{"cache":{"ttl":5}}"#);
        assert!(res.is_err());
    }
}
