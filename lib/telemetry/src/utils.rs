use std::{collections::HashMap, str::FromStr};
use tonic::metadata::{MetadataKey, MetadataMap};

use crate::error::TelemetryError;

/// Turns the configured collector headers into gRPC metadata.
pub(crate) fn build_metadata(
    headers: &HashMap<String, String>,
) -> Result<MetadataMap, TelemetryError> {
    let metadata = MetadataMap::with_capacity(headers.len());

    headers
        .iter()
        .try_fold(metadata, |mut acc, (header_name, header_value)| {
            let key = MetadataKey::from_str(&header_name.to_ascii_lowercase()).map_err(|e| {
                TelemetryError::SpanExporterSetup(format!(
                    "invalid metadata key '{}': {}",
                    header_name, e
                ))
            })?;
            let value = header_value.parse().map_err(|e| {
                TelemetryError::SpanExporterSetup(format!(
                    "invalid metadata value for key '{}': {}",
                    header_name, e
                ))
            })?;
            acc.insert(key, value);
            Ok(acc)
        })
}
