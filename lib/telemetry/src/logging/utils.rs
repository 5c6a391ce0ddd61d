use gql_gateway_config::log::LoggingConfig;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;

pub type DynLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// The explicit `filter` directive when configured, the log level otherwise.
pub fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.env_filter_str()).map_err(|e| {
        TelemetryError::InvalidLogFilter(format!("'{}': {}", config.env_filter_str(), e))
    })
}
