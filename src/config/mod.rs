use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CHARACTER_DATABASE: &str = "characters";
const DEFAULT_CHARACTER_COLLECTION: &str = "sheets";
const DEFAULT_CHARACTER_ARCHIVE: &str = "sheets_Archive";
const DEFAULT_LOG_LEVEL: &str = "trace";
const DEFAULT_ROLE_SERVICE_URL: &str = "http://localhost:8080";
const DEFAULT_RBAC_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DB_RETRY_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub log_level: String,
    pub storage: StorageConfig,
    pub rbac: RbacConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Base connection URL; its path is replaced by `database`.
    #[serde(skip_serializing)]
    pub database_url: Option<String>,
    pub database: String,
    pub collection: String,
    pub archive: String,
    pub connect_timeout_secs: u64,
    pub retry_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(&env::vars().collect())
    }

    /// Build the configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        Self::defaults().with_overrides(vars)
    }

    fn with_overrides(mut self, vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(v) = get("PORT") {
            self.port = v.parse().unwrap_or(self.port);
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v.to_string();
        }

        // Storage overrides
        if let Some(v) = get("STORAGE_BACKEND") {
            match v.parse() {
                Ok(backend) => self.storage.backend = backend,
                Err(e) => tracing::warn!("{}; keeping {:?}", e, self.storage.backend),
            }
        }
        if let Some(v) = get("DATABASE_URL") {
            self.storage.database_url = Some(v.to_string());
        }
        if let Some(v) = get("CHARACTER_DATABASE") {
            self.storage.database = v.to_string();
        }
        if let Some(v) = get("CHARACTER_COLLECTION") {
            self.storage.collection = v.to_string();
        }
        if let Some(v) = get("CHARACTER_ARCHIVE") {
            self.storage.archive = v.to_string();
        }
        if let Some(v) = get("DB_CONNECT_TIMEOUT_SECS") {
            self.storage.connect_timeout_secs = v.parse().unwrap_or(self.storage.connect_timeout_secs);
        }
        if let Some(v) = get("DB_RETRY_TIMEOUT_SECS") {
            self.storage.retry_timeout_secs = v.parse().unwrap_or(self.storage.retry_timeout_secs);
        }

        // Role service overrides
        if let Some(v) = get("JWT_TOKEN_DECODER") {
            self.rbac.base_url = v.to_string();
        }
        if let Some(v) = get("RBAC_TIMEOUT_SECS") {
            self.rbac.timeout_secs = v.parse().unwrap_or(self.rbac.timeout_secs);
        }

        self
    }

    fn defaults() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
                database_url: None,
                database: DEFAULT_CHARACTER_DATABASE.to_string(),
                collection: DEFAULT_CHARACTER_COLLECTION.to_string(),
                archive: DEFAULT_CHARACTER_ARCHIVE.to_string(),
                connect_timeout_secs: DEFAULT_DB_CONNECT_TIMEOUT_SECS,
                retry_timeout_secs: DEFAULT_DB_RETRY_TIMEOUT_SECS,
            },
            rbac: RbacConfig {
                base_url: DEFAULT_ROLE_SERVICE_URL.to_string(),
                timeout_secs: DEFAULT_RBAC_TIMEOUT_SECS,
                user_agent: format!("sheet-crud/{}", env!("CARGO_PKG_VERSION")),
            },
        }
    }

    /// Parsed tracing level. Unknown values fall back to `info`.
    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.parse::<tracing::Level>() {
            Ok(level) => level,
            Err(_) => {
                tracing::warn!("Cannot load log-level {:?}, using info", self.log_level);
                tracing::Level::INFO
            }
        }
    }
}

impl RbacConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl StorageConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_timeout(&self) -> Duration {
        Duration::from_secs(self.retry_timeout_secs)
    }
}
