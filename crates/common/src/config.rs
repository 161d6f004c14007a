//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Blog behaviour settings.
    #[serde(default)]
    pub blog: BlogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Blog behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlogConfig {
    /// Number of comment levels allowed, counted from the root.
    #[serde(default = "default_max_comment_depth")]
    pub max_comment_depth: i16,
    /// Root comments per page when none is requested.
    #[serde(default = "default_page_size")]
    pub comment_page_size: u64,
    /// Upper bound for a requested comment page size.
    #[serde(default = "default_max_page_size")]
    pub max_comment_page_size: u64,
    /// Posts per page when none is requested.
    #[serde(default = "default_page_size")]
    pub post_page_size: u64,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            max_comment_depth: default_max_comment_depth(),
            comment_page_size: default_page_size(),
            max_comment_page_size: default_max_page_size(),
            post_page_size: default_page_size(),
        }
    }
}

impl BlogConfig {
    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.max_comment_depth < 1 {
            return Err(config::ConfigError::Message(
                "blog.max_comment_depth must be at least 1".to_string(),
            ));
        }
        if self.comment_page_size == 0 || self.post_page_size == 0 {
            return Err(config::ConfigError::Message(
                "blog page sizes must be greater than zero".to_string(),
            ));
        }
        if self.comment_page_size > self.max_comment_page_size {
            return Err(config::ConfigError::Message(
                "blog.comment_page_size must not exceed blog.max_comment_page_size".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_max_comment_depth() -> i16 {
    3
}

const fn default_page_size() -> u64 {
    10
}

const fn default_max_page_size() -> u64 {
    50
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `QUILL_ENV`)
    /// 3. Environment variables with `QUILL_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("QUILL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.blog.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.blog.validate()?;
        Ok(config)
    }
}
