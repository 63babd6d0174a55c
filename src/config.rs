use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::error::GraderError;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredLabel {
    pub key: String,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    pub log_level: String,
    pub checks: ChecksConfig,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            checks: ChecksConfig::default(),
        }
    }
}

/// Rule toggles, bound once when the registry is built and never re-read during
/// a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    pub ignore_container_cpu_limit: bool,
    pub required_labels: Vec<RequiredLabel>,
}

impl GraderConfig {
    /// The config file is optional; environment variables prefixed with
    /// `GRADER_` override it.
    pub fn load(path: &str) -> Result<Self, GraderError> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("GRADER_").split("__"))
            .extract()
            .map_err(|e| GraderError::Config(Box::new(e)))
    }
}
