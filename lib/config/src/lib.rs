pub mod env_overrides;
pub mod log;
pub mod telemetry;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::{
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    log::LoggingConfig,
    telemetry::TelemetryConfig,
};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Reported as the `service.name` resource of every exported span.
    ///
    /// Can also be set via the `SERVICE_NAME` environment variable.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default)]
    pub log: LoggingConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_service_name() -> String {
    "gql-gateway".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log: LoggingConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), GatewayConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(GatewayConfigError::ValidationError(
                "'service_name' must not be empty".to_string(),
            ));
        }

        let sampling = self.telemetry.collect.sampling;
        if !(0.0..=1.0).contains(&sampling) {
            return Err(GatewayConfigError::ValidationError(format!(
                "'telemetry.collect.sampling' must be between 0 and 1, got {}",
                sampling
            )));
        }

        if let Some(collector) = &self.telemetry.collector {
            if collector.endpoint.trim().is_empty() {
                return Err(GatewayConfigError::ValidationError(
                    "'telemetry.collector.endpoint' must not be empty".to_string(),
                ));
            }
            if collector.port == 0 {
                return Err(GatewayConfigError::ValidationError(
                    "'telemetry.collector.port' must be between 1 and 65535".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "gateway.config.yaml",
    "gateway.config.yml",
    "gateway.config.json",
];

/// Loads the configuration from `override_config_path`, or from one of the default file
/// names in the working directory, then applies environment variable overrides.
pub fn load_config(
    override_config_path: Option<String>,
) -> Result<GatewayConfig, GatewayConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<std::path::PathBuf>()
            .map_err(GatewayConfigError::ConfigPathParseError)?;
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    build_config(config, env_overrides)
}

pub fn parse_yaml_config(
    config_raw: &str,
    env_overrides: EnvVarOverrides,
) -> Result<GatewayConfig, GatewayConfigError> {
    let config = Config::builder().add_source(File::from_str(config_raw, FileFormat::Yaml));

    build_config(config, env_overrides)
}

fn build_config(
    config: config::ConfigBuilder<config::builder::DefaultState>,
    env_overrides: EnvVarOverrides,
) -> Result<GatewayConfig, GatewayConfigError> {
    let config = env_overrides.apply_overrides(config)?;
    let gateway_config = config.build()?.try_deserialize::<GatewayConfig>()?;
    gateway_config.validate()?;

    Ok(gateway_config)
}
