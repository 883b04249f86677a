//! Configuration management for Toy House
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables. Command line flags are applied on top by the binary.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "toy-house.toml";

/// Port used when neither the config file nor `PORT` provides one
pub const DEFAULT_PORT: u16 = 5000;

/// Available storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// MongoDB collection via the official driver
    Mongo,
    /// Process-local store, contents are lost on exit
    Memory,
}

impl std::str::FromStr for StorageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageType::Mongo),
            "memory" => Ok(StorageType::Memory),
            other => Err(Error::config(format!(
                "Invalid storage type: {}. Valid options: mongo, memory",
                other
            ))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Runtime tuning
    pub performance: PerformanceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend type
    pub storage_type: StorageType,

    /// Full connection string; when set, `host`, `srv` and credentials are ignored
    pub uri: Option<String>,

    /// Host (and port) of the deployment
    pub host: String,

    /// Use the `mongodb+srv` scheme
    pub srv: bool,

    /// Database user
    pub username: Option<String>,

    /// Database password
    pub password: Option<String>,

    /// Database name
    pub database: String,

    /// Collection holding the toy documents
    pub collection: String,

    /// Request the Stable API v1 in strict mode
    pub stable_api: bool,

    /// Default for updates that match no document: insert instead of failing
    pub upsert_on_update: bool,

    /// Maximum number of toys returned by the category listing
    pub category_limit: usize,
}

/// Runtime tuning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads (0 = auto-detect)
    pub worker_threads: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact)
    pub format: String,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics on `/metrics`
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Mongo,
            uri: None,
            host: "localhost:27017".to_string(),
            srv: false,
            username: None,
            password: None,
            database: "toyHouse".to_string(),
            collection: "toysCollection".to_string(),
            stable_api: true,
            upsert_on_update: true,
            category_limit: 20,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { worker_threads: 0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl StorageConfig {
    /// Connection string handed to the driver
    ///
    /// Credentials are never embedded here; they are attached to the client
    /// options separately so they need no percent-encoding.
    pub fn connection_uri(&self) -> String {
        if let Some(uri) = &self.uri {
            return uri.clone();
        }

        let scheme = if self.srv { "mongodb+srv" } else { "mongodb" };
        format!("{}://{}/?retryWrites=true&w=majority", scheme, self.host)
    }

    /// Username/password pair, if both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) if self.uri.is_none() => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or from `toy-house.toml` when
    /// present, then apply environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Config::default(),
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(addr) = lookup("TOY_HOUSE_HTTP_ADDR") {
            self.server.http_addr = addr
                .parse()
                .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
        }

        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|e| Error::config(format!("Invalid port: {}", e)))?;
            self.server.http_addr.set_port(port);
        }

        // Storage overrides
        if let Some(storage_type) = lookup("TOY_HOUSE_STORAGE") {
            self.storage.storage_type = storage_type.parse()?;
        }

        if let Some(uri) = lookup("MONGODB_URI") {
            self.storage.uri = Some(uri);
        }

        if let Some(user) = lookup("DB_USER") {
            self.storage.username = Some(user);
        }

        if let Some(pass) = lookup("DB_PASS") {
            self.storage.password = Some(pass);
        }

        if let Some(database) = lookup("TOY_HOUSE_DATABASE") {
            self.storage.database = database;
        }

        if let Some(collection) = lookup("TOY_HOUSE_COLLECTION") {
            self.storage.collection = collection;
        }

        // Performance overrides
        if let Some(workers) = lookup("TOY_HOUSE_WORKER_THREADS") {
            self.performance.worker_threads = workers
                .parse()
                .map_err(|e| Error::config(format!("Invalid worker threads: {}", e)))?;
        }

        // Logging overrides
        if let Some(level) = lookup("TOY_HOUSE_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("TOY_HOUSE_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(Error::config(format!("Invalid log level: {}", other))),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            other => return Err(Error::config(format!("Invalid log format: {}", other))),
        }

        if self.storage.database.trim().is_empty() {
            return Err(Error::config("Database name must not be empty"));
        }

        if self.storage.collection.trim().is_empty() {
            return Err(Error::config("Collection name must not be empty"));
        }

        if self.storage.category_limit == 0 {
            return Err(Error::config("Category limit must be at least 1"));
        }

        if self.performance.worker_threads > 1024 {
            return Err(Error::config("Too many worker threads (maximum 1024)"));
        }

        Ok(())
    }

    /// Get optimal number of worker threads
    pub fn optimal_worker_threads(&self) -> usize {
        if self.performance.worker_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.performance.worker_threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.http_addr.port(), DEFAULT_PORT);
        assert_eq!(config.storage.storage_type, StorageType::Mongo);
        assert_eq!(config.storage.database, "toyHouse");
        assert_eq!(config.storage.collection, "toysCollection");
        assert_eq!(config.storage.category_limit, 20);
        assert!(config.storage.upsert_on_update);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_env_overrides_default_port() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[("PORT", "7001")])).unwrap();
        assert_eq!(config.server.http_addr.port(), 7001);
        assert_eq!(config.server.http_addr.ip().to_string(), "0.0.0.0");
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides_from(env(&[("PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_credentials_from_env() {
        let mut config = Config::default();
        config
            .apply_overrides_from(env(&[("DB_USER", "toyadmin"), ("DB_PASS", "p@ss/word")]))
            .unwrap();
        assert_eq!(config.storage.credentials(), Some(("toyadmin", "p@ss/word")));
        assert_eq!(
            config.storage.connection_uri(),
            "mongodb://localhost:27017/?retryWrites=true&w=majority"
        );
    }

    #[test]
    fn test_explicit_uri_wins_over_credentials() {
        let mut config = Config::default();
        config
            .apply_overrides_from(env(&[
                ("MONGODB_URI", "mongodb://db.internal:27017"),
                ("DB_USER", "ignored"),
                ("DB_PASS", "ignored"),
            ]))
            .unwrap();
        assert_eq!(config.storage.connection_uri(), "mongodb://db.internal:27017");
        assert_eq!(config.storage.credentials(), None);
    }

    #[test]
    fn test_srv_scheme() {
        let storage = StorageConfig {
            srv: true,
            host: "cluster0.example.net".to_string(),
            ..Default::default()
        };
        assert_eq!(
            storage.connection_uri(),
            "mongodb+srv://cluster0.example.net/?retryWrites=true&w=majority"
        );
    }

    #[test]
    fn test_storage_type_parsing() {
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert_eq!("MongoDB".parse::<StorageType>().unwrap(), StorageType::Mongo);
        assert!("disk".parse::<StorageType>().is_err());
    }

    #[test]
    fn test_from_file_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
http_addr = "127.0.0.1:6000"

[storage]
storage_type = "memory"
category_limit = 5
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.http_addr.port(), 6000);
        assert_eq!(config.storage.storage_type, StorageType::Memory);
        assert_eq!(config.storage.category_limit, 5);
        // untouched keys keep their defaults
        assert_eq!(config.storage.database, "toyHouse");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.category_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.collection = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.performance.worker_threads = 4096;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_optimal_worker_threads() {
        let mut config = Config::default();
        assert!(config.optimal_worker_threads() >= 1);
        config.performance.worker_threads = 3;
        assert_eq!(config.optimal_worker_threads(), 3);
    }
}
