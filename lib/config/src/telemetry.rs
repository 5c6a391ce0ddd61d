use std::{collections::HashMap, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub collect: TracingCollectConfig,
    /// Where spans are exported to. Trace export is disabled when missing.
    #[serde(default)]
    pub collector: Option<CollectorConfig>,
}

impl TelemetryConfig {
    pub fn is_tracing_enabled(&self) -> bool {
        self.collector.is_some()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TracingCollectConfig {
    #[serde(default = "default_max_events_per_span")]
    pub max_events_per_span: u32,
    #[serde(default = "default_max_attributes_per_span")]
    pub max_attributes_per_span: u32,
    #[serde(default = "default_max_attributes_per_event")]
    pub max_attributes_per_event: u32,
    /// Ratio of traces to keep, between 0 and 1.
    ///
    /// Can also be set via the `TRACING_SAMPLING` environment variable.
    #[serde(default = "default_sampling")]
    pub sampling: f64,
    /// Follow the sampling decision of an incoming parent span when there is one.
    #[serde(default = "default_parent_based_sampler")]
    pub parent_based_sampler: bool,
}

fn default_max_events_per_span() -> u32 {
    128
}
fn default_max_attributes_per_span() -> u32 {
    128
}
fn default_max_attributes_per_event() -> u32 {
    16
}
fn default_sampling() -> f64 {
    1.0
}
fn default_parent_based_sampler() -> bool {
    false
}

impl Default for TracingCollectConfig {
    fn default() -> Self {
        Self {
            max_events_per_span: default_max_events_per_span(),
            max_attributes_per_span: default_max_attributes_per_span(),
            max_attributes_per_event: default_max_attributes_per_event(),
            sampling: default_sampling(),
            parent_based_sampler: default_parent_based_sampler(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    /// Host name or IP address of the OTLP collector.
    ///
    /// Can also be set via the `COLLECTOR_ENDPOINT` environment variable.
    pub endpoint: String,
    /// Can also be set via the `COLLECTOR_PORT` environment variable.
    pub port: u16,
    /// Can also be set via the `COLLECTOR_PROTOCOL` environment variable.
    #[serde(default)]
    pub protocol: OtlpProtocol,
    /// Sent as gRPC metadata or HTTP headers with every export.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub batch_processor: BatchProcessorConfig,
}

impl CollectorConfig {
    /// The URL the exporter connects to.
    pub fn url(&self) -> String {
        let base = if self.endpoint.contains("://") {
            format!("{}:{}", self.endpoint, self.port)
        } else {
            format!("http://{}:{}", self.endpoint, self.port)
        };

        match self.protocol {
            OtlpProtocol::Grpc => base,
            OtlpProtocol::Http => format!("{}/v1/traces", base),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OtlpProtocol {
    #[default]
    Grpc,
    Http,
}

impl OtlpProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtlpProtocol::Grpc => "grpc",
            OtlpProtocol::Http => "http",
        }
    }
}

impl FromStr for OtlpProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grpc" => Ok(OtlpProtocol::Grpc),
            "http" => Ok(OtlpProtocol::Http),
            _ => Err(format!("Invalid OTLP protocol: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BatchProcessorConfig {
    #[serde(default = "default_batch_max_export_batch_size")]
    pub max_export_batch_size: u32,
    #[serde(default = "default_batch_max_queue_size")]
    pub max_queue_size: u32,
    #[serde(
        default = "default_batch_max_export_timeout",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    pub max_export_timeout: Duration,
    #[serde(
        default = "default_batch_scheduled_delay",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    pub scheduled_delay: Duration,
}

impl Default for BatchProcessorConfig {
    fn default() -> Self {
        Self {
            max_export_batch_size: default_batch_max_export_batch_size(),
            max_export_timeout: default_batch_max_export_timeout(),
            max_queue_size: default_batch_max_queue_size(),
            scheduled_delay: default_batch_scheduled_delay(),
        }
    }
}

fn default_batch_max_export_batch_size() -> u32 {
    512
}

fn default_batch_max_queue_size() -> u32 {
    2048
}

fn default_batch_max_export_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_batch_scheduled_delay() -> Duration {
    Duration::from_secs(5)
}
