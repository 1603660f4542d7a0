//! Settings for Reelgraph services.
//!
//! Settings are loaded from (in priority order):
//! 1. Environment variables (`REELGRAPH__` prefix, `__` separated)
//! 2. Config file (`reelgraph.toml` by default)
//! 3. Defaults, seeded from `NEO4J_URI` / `NEO4J_USERNAME` / `NEO4J_PASSWORD`

use serde::Deserialize;

use crate::error::Result;

/// Top-level settings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub service: ServiceSettings,
}

/// Connection settings for the Neo4j backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Database name; the server default when unset.
    #[serde(default)]
    pub database: Option<String>,

    /// Upper bound on concurrently open sessions.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// Behaviour of the recommendation service itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    /// Row limit used when a caller omits one.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_limit() -> u32 {
    10
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: String::new(),
            database: None,
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

impl Settings {
    /// Load settings from `<file_prefix>.toml` (optional) and the environment.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .set_default("neo4j.uri", env_or("NEO4J_URI", default_uri()))?
            .set_default("neo4j.user", env_or("NEO4J_USERNAME", default_user()))?
            .set_default("neo4j.password", env_or("NEO4J_PASSWORD", String::new()))?
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("REELGRAPH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        tracing::debug!(
            uri = %settings.neo4j.uri,
            max_connections = settings.neo4j.max_connections,
            "Loaded settings"
        );
        Ok(settings)
    }
}

fn env_or(key: &str, fallback: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(settings.neo4j.user, "neo4j");
        assert_eq!(settings.neo4j.max_connections, 16);
        assert_eq!(settings.service.default_limit, 10);
        assert!(settings.neo4j.database.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.toml");
        std::fs::write(
            &path,
            r#"
[neo4j]
uri = "bolt://graph.internal:7687"
user = "reader"
max_connections = 4

[service]
default_limit = 25
"#,
        )
        .unwrap();

        let prefix = dir.path().join("movies");
        let settings = Settings::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(settings.neo4j.uri, "bolt://graph.internal:7687");
        assert_eq!(settings.neo4j.user, "reader");
        assert_eq!(settings.neo4j.max_connections, 4);
        assert_eq!(settings.neo4j.fetch_size, 256);
        assert_eq!(settings.service.default_limit, 25);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let settings = Settings::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(settings.neo4j.max_connections, 16);
        assert_eq!(settings.service.default_limit, 10);
    }
}
