use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Label the engine attaches to diagnostics pointing into the submitted script.
pub const DEFAULT_SOURCE_LABEL: &str = "<Source Code>";

/// Search roots for includes, as laid out in the host's virtual file system.
pub const DEFAULT_INCLUDE_PATHS: [&str; 2] = ["/sources/includes", "/sources/patterns"];

/// Logger configuration used when the host lets plwasm install a logger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub level_filter: LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { level_filter: LevelFilter::Info }
    }
}

/// Configuration of a [`crate::Session`].
/// Please use [`SessionConfigBuilder`] if you want to build it from code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub(crate) source_label: String,
    pub(crate) include_paths: Vec<PathBuf>,
    pub(crate) logger_config: LoggerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source_label: DEFAULT_SOURCE_LABEL.to_string(),
            include_paths: DEFAULT_INCLUDE_PATHS.iter().map(PathBuf::from).collect(),
            logger_config: LoggerConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn logger_config(&self) -> &LoggerConfig {
        &self.logger_config
    }
}

/// `SessionConfigBuilder` is a convenience builder to create a `SessionConfig` from code.
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self { config: Default::default() }
    }

    pub fn with_source_label(mut self, source_label: impl Into<String>) -> Self {
        self.config.source_label = source_label.into();
        self
    }

    pub fn with_include_paths<I, P>(mut self, include_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.include_paths = include_paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_logger_config(mut self, logger_config: LoggerConfig) -> Self {
        self.config.logger_config = logger_config;
        self
    }

    /// Retrieves the configuration built
    pub fn get(self) -> SessionConfig {
        self.config
    }
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SessionConfigReader;

impl SessionConfigReader {
    /// Read a JSON configuration file. Missing fields keep their defaults.
    pub fn read_json(path: impl AsRef<Path>) -> Result<SessionConfig> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("read {:?}", path))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse session config {:?}", path))
    }

    pub fn from_json_str(json: &str) -> Result<SessionConfig> {
        serde_json::from_str(json).context("parse session config")
    }
}
