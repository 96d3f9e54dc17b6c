//! Configuration management for Kinship services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`KINSHIP__` prefix, `__` separator)
//! 2. Config file (`kinship.toml` by default)
//! 3. Defaults

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{validate_kind, FRIENDS};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub pathfind: PathfindSettings,
}

/// Connection settings for the Neo4j store.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// Bounds for path queries.
#[derive(Debug, Clone, Deserialize)]
pub struct PathfindSettings {
    /// Overall budget for one CLI invocation, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// DFS expansions between two context checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: usize,

    /// Relation kind followed by path queries.
    #[serde(default = "default_relation_kind")]
    pub relation_kind: String,
}

impl PathfindSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_poll_interval() -> usize {
    256
}

fn default_relation_kind() -> String {
    FRIENDS.to_string()
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for PathfindSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_interval: default_poll_interval(),
            relation_kind: default_relation_kind(),
        }
    }
}

impl Settings {
    /// Load settings from `<file_prefix>.toml` (optional) and `KINSHIP__*`
    /// environment variables.
    pub fn load(file_prefix: &str) -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("KINSHIP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        tracing::debug!(uri = %settings.neo4j.uri, "Loaded settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pathfind.poll_interval == 0 {
            return Err(ConfigError::Invalid(
                "pathfind.poll_interval must be at least 1".to_string(),
            ));
        }
        validate_kind(&self.pathfind.relation_kind)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(settings.neo4j.user, "neo4j");
        assert_eq!(settings.pathfind.timeout(), Duration::from_secs(10));
        assert_eq!(settings.pathfind.poll_interval, 256);
        assert_eq!(settings.pathfind.relation_kind, "FRIENDS");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let settings = Settings::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(settings.pathfind.poll_interval, 256);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kinship.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[neo4j]\nuri = \"bolt://graph:7687\"\n\n[pathfind]\ntimeout_ms = 2500\nrelation_kind = \"KNOWS\""
        )
        .unwrap();

        let prefix = dir.path().join("kinship");
        let settings = Settings::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(settings.neo4j.uri, "bolt://graph:7687");
        assert_eq!(settings.neo4j.user, "neo4j");
        assert_eq!(settings.pathfind.timeout(), Duration::from_millis(2500));
        assert_eq!(settings.pathfind.relation_kind, "KNOWS");
    }

    #[test]
    fn test_rejects_bad_relation_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[pathfind]\nrelation_kind = \"friends\"\n").unwrap();

        let prefix = dir.path().join("bad");
        let err = Settings::load(prefix.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
