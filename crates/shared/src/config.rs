//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration. Optional because reports can also run
    /// against an in-memory ledger file.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Mapping definition location.
    #[serde(default)]
    pub mapping: MappingConfig,
    /// Statement engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Mapping definition configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    /// Path to the JSON mapping definition.
    #[serde(default = "default_mapping_path")]
    pub path: String,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            path: default_mapping_path(),
        }
    }
}

fn default_mapping_path() -> String {
    "config/mapping.json".to_string()
}

/// Statement engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on concurrent ledger aggregator calls per statement.
    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_queries: default_max_concurrent_queries(),
        }
    }
}

fn default_max_concurrent_queries() -> usize {
    8
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STATERA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        temp_env::with_vars_unset(
            [
                "STATERA__DATABASE__URL",
                "STATERA__MAPPING__PATH",
                "STATERA__ENGINE__MAX_CONCURRENT_QUERIES",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert!(config.database.is_none());
                assert_eq!(config.mapping.path, "config/mapping.json");
                assert_eq!(config.engine.max_concurrent_queries, 8);
            },
        );
    }

    #[test]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("STATERA__DATABASE__URL", Some("postgres://localhost/statera")),
                ("STATERA__MAPPING__PATH", Some("/etc/statera/mapping.json")),
                ("STATERA__ENGINE__MAX_CONCURRENT_QUERIES", Some("2")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                let database = config.database.unwrap();
                assert_eq!(database.url, "postgres://localhost/statera");
                assert_eq!(database.max_connections, 10);
                assert_eq!(config.mapping.path, "/etc/statera/mapping.json");
                assert_eq!(config.engine.max_concurrent_queries, 2);
            },
        );
    }
}
