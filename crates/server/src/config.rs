//! Service configuration

use anyhow::Result;
use scoring_lib::catalog::DEFAULT_MODEL;
use serde::Deserialize;

/// Service configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding model and preprocessing artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Model used when a request names none
    #[serde(default = "default_model")]
    pub default_model: String,
}

fn default_port() -> u16 {
    5000
}

fn default_model_dir() -> String {
    "model".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            model_dir: default_model_dir(),
            default_model: default_model(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from `JOBGUARD_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("JOBGUARD"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.model_dir, "model");
        assert_eq!(config.default_model, "Random_Forest");
    }

    #[test]
    fn test_partial_source_fills_defaults() {
        let config: ServiceConfig = config::Config::builder()
            .set_override("model_dir", "/srv/models")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.model_dir, "/srv/models");
        assert_eq!(config.port, 5000);
        assert_eq!(config.default_model, "Random_Forest");
    }
}
