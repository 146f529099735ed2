//! Layered application configuration: defaults, an optional YAML file, then
//! `DATASCOPE__*` environment overrides.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use data_scope::DataScopeConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;

/// Environment prefix; nested keys are separated by a double underscore,
/// e.g. `DATASCOPE__DATA_SCOPE__DATABASE__URL`.
pub const ENV_PREFIX: &str = "DATASCOPE__";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub data_scope: DataScopeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Fails if `path` is given but missing, or if any layer does not
    /// deserialize into [`AppConfig`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            ensure!(path.is_file(), "config file {} not found", path.display());
            figment = figment.merge(Yaml::file(path));
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn extract(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .context("invalid scope-inspector configuration")
    }
}
