//! 应用配置
//!
//! 从 TOML 文件（或默认值）加载，再用环境变量覆盖。`validate` 在启动任何服务前执行，
//! 缺少数据库连接串时进程直接退出。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// 默认配置文件位置，按顺序查找
const CONFIG_PATHS: [&str; 2] = ["config.toml", "./config/config.toml"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub scraper: ScraperConfig,
}

/// HTTP 监听配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_address: String,
    pub port: u16,
    /// 单个请求的超时上限，包含浏览器会话
    pub timeout_seconds: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_path: PathBuf,
    pub file_prefix: String,
    pub console_output: bool,
    pub file_output: bool,
    /// trace、debug、info、warn、error 之一，`RUST_LOG` 优先
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(ConfigError::Validation(format!(
                "unknown storage backend: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub request_timeout_seconds: u64,
    /// 页面没有可用图片时使用
    pub placeholder_image_url: String,
    pub browser: BrowserConfig,
}

/// 无头浏览器配置，用于 meta 标签不可靠的零售站点读取商品图片
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub enabled: bool,
    pub navigation_timeout_seconds: u64,
    pub selector_timeout_seconds: u64,
    pub overrides: Vec<BrowserOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserOverride {
    /// 作为页面域名的子串匹配
    pub domain_contains: String,
    pub image_selector: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            timeout_seconds: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./logs"),
            file_prefix: "wishlist".to_string(),
            console_output: true,
            file_output: false,
            level: "info".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            database_url: None,
            max_connections: 5,
            acquire_timeout_seconds: 8,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            request_timeout_seconds: 10,
            placeholder_image_url: "https://via.placeholder.com/400x400?text=No+Image+Available"
                .to_string(),
            browser: BrowserConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            navigation_timeout_seconds: 30,
            selector_timeout_seconds: 10,
            overrides: vec![BrowserOverride {
                domain_contains: "amazon".to_string(),
                image_selector: "#imgTagWrapperId img".to_string(),
            }],
        }
    }
}

impl Config {
    /// 依次尝试 `WISHLIST_CONFIG`、默认位置和默认值，然后应用环境变量并校验
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("WISHLIST_CONFIG") {
            Ok(path) => Self::load_from_file(path)?,
            Err(_) => match CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
                Some(path) => Self::load_from_file(path)?,
                None => Self::default(),
            },
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::FileWrite(e.to_string()))?;
        }

        fs::write(path.as_ref(), content).map_err(|e| ConfigError::FileWrite(e.to_string()))
    }

    /// 环境变量优先于文件中的值
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.storage.database_url = Some(url);
        }
        if let Some(backend) = var("STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }
        if let Some(port) = var("PORT") {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid PORT: {port}")))?;
        }
        if let Some(address) = var("BIND_ADDRESS") {
            self.http.bind_address = address;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level.to_ascii_lowercase();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation("http port must be greater than 0".to_string()));
        }
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Validation("bind address must not be empty".to_string()));
        }
        if self.http.timeout_seconds == 0 || self.scraper.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation("timeouts must be greater than 0".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "invalid log level: {}, expected one of {:?}",
                self.logging.level, valid_levels
            )));
        }

        if self.storage.backend == StorageBackend::Postgres {
            match self.storage.database_url.as_deref() {
                Some(url) if !url.trim().is_empty() => {}
                _ => return Err(ConfigError::MissingDatabaseUrl),
            }
        } else if self.storage.database_url.is_some() {
            warn!("DATABASE_URL is set but the memory backend is selected; it will be ignored");
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(String),
    #[error("failed to write config file: {0}")]
    FileWrite(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("invalid config: {0}")]
    Validation(String),
    #[error("DATABASE_URL must be set. Did you forget to provision a database?")]
    MissingDatabaseUrl,
}
