use config::{builder::BuilderState, ConfigBuilder, ConfigError};
use envconfig::Envconfig;
use tracing::debug;

use crate::{
    log::{LogFormat, LogLevel},
    telemetry::OtlpProtocol,
};

#[derive(Envconfig, Default)]
pub struct EnvVarOverrides {
    #[envconfig(from = "SERVICE_NAME")]
    pub service_name: Option<String>,

    // Logger overrides
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    #[envconfig(from = "LOG_FILTER")]
    pub log_filter: Option<String>,
    #[envconfig(from = "LOG_ADD_SOURCE")]
    pub log_add_source: Option<bool>,
    #[envconfig(from = "LOG_SERVICE_NAME")]
    pub log_service_name: Option<String>,
    #[envconfig(from = "LOG_ENABLE_TRACE")]
    pub log_enable_trace: Option<bool>,

    // Trace export overrides
    #[envconfig(from = "COLLECTOR_ENDPOINT")]
    pub collector_endpoint: Option<String>,
    #[envconfig(from = "COLLECTOR_PORT")]
    pub collector_port: Option<u64>,
    #[envconfig(from = "COLLECTOR_PROTOCOL")]
    pub collector_protocol: Option<OtlpProtocol>,
    #[envconfig(from = "TRACING_SAMPLING")]
    pub tracing_sampling: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
}

impl EnvVarOverrides {
    pub fn apply_overrides<T: BuilderState>(
        mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if let Some(service_name) = self.service_name.take() {
            debug!("[config-override] 'service_name' = {}", service_name);
            config = config.set_override("service_name", service_name)?;
        }

        if let Some(log_level) = self.log_level.take() {
            debug!("[config-override] 'log.level' = {:?}", log_level);
            config = config.set_override("log.level", log_level.as_str())?;
        }
        if let Some(log_format) = self.log_format.take() {
            debug!("[config-override] 'log.format' = {:?}", log_format);
            config = config.set_override("log.format", log_format.as_str())?;
        }
        if let Some(log_filter) = self.log_filter.take() {
            debug!("[config-override] 'log.filter' = {:?}", log_filter);
            config = config.set_override("log.filter", log_filter)?;
        }
        if let Some(add_source) = self.log_add_source.take() {
            debug!("[config-override] 'log.add_source' = {}", add_source);
            config = config.set_override("log.add_source", add_source)?;
        }
        if let Some(service_name) = self.log_service_name.take() {
            debug!("[config-override] 'log.service_name' = {}", service_name);
            config = config.set_override("log.service_name", service_name)?;
        }
        if let Some(enable_trace) = self.log_enable_trace.take() {
            debug!("[config-override] 'log.enable_trace' = {}", enable_trace);
            config = config.set_override("log.enable_trace", enable_trace)?;
        }

        if let Some(endpoint) = self.collector_endpoint.take() {
            debug!("[config-override] 'telemetry.collector.endpoint' = {}", endpoint);
            config = config.set_override("telemetry.collector.endpoint", endpoint)?;
        }
        if let Some(port) = self.collector_port.take() {
            debug!("[config-override] 'telemetry.collector.port' = {}", port);
            config = config.set_override("telemetry.collector.port", port)?;
        }
        if let Some(protocol) = self.collector_protocol.take() {
            debug!("[config-override] 'telemetry.collector.protocol' = {:?}", protocol);
            config = config.set_override("telemetry.collector.protocol", protocol.as_str())?;
        }
        if let Some(sampling) = self.tracing_sampling.take() {
            debug!("[config-override] 'telemetry.collect.sampling' = {}", sampling);
            config = config.set_override("telemetry.collect.sampling", sampling)?;
        }

        Ok(config)
    }
}
