// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Framework-side configuration surfaces.
//!
//! The framework owns two form surfaces of its own, independent of any
//! connector: generic connection options and per-direction job options.
//! Their schemas feed the framework metadata registered at start-up, and
//! stored values decode back into the typed structs below at submit time.

use std::collections::BTreeMap;

use datalift_spi::forms::{Form, FormInput, FormSchema, FormValues, materialize};
use datalift_spi::job::JobDirection;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::FrameworkMetadata;

/// Generic throttling options shared by all connections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottlingConfig {
    /// Upper bound on concurrent connections opened against the external
    /// system, unlimited when absent.
    pub max_connections: Option<i64>,
}

/// The framework part of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfiguration {
    /// Throttling options.
    #[serde(default)]
    pub throttling: ThrottlingConfig,
}

impl ConnectionConfiguration {
    /// Form schema of this surface.
    pub fn schema() -> FormSchema {
        FormSchema::new(vec![Form::new(
            "throttling",
            vec![FormInput::integer("max_connections")],
        )])
    }

    /// Decode stored form values into a typed configuration.
    pub fn from_values(values: &FormValues) -> Result<Self> {
        let object = materialize(&Self::schema(), values)?;
        Ok(serde_json::from_value(object)?)
    }
}

/// Where an import lands and how it is laid out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the imported data is written to.
    pub output_directory: Option<String>,
    /// Storage format name, engine-defined default when absent.
    pub output_format: Option<String>,
}

/// The framework part of an import job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportJobConfiguration {
    /// Output options.
    #[serde(default)]
    pub output: OutputConfig,
}

impl ImportJobConfiguration {
    /// Form schema of this surface.
    pub fn schema() -> FormSchema {
        FormSchema::new(vec![Form::new(
            "output",
            vec![
                FormInput::string("output_directory", 255),
                FormInput::string("output_format", 25),
            ],
        )])
    }
}

/// Where an export reads from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory the exported data is read from.
    pub input_directory: Option<String>,
}

/// The framework part of an export job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJobConfiguration {
    /// Input options.
    #[serde(default)]
    pub input: InputConfig,
}

impl ExportJobConfiguration {
    /// Form schema of this surface.
    pub fn schema() -> FormSchema {
        FormSchema::new(vec![Form::new(
            "input",
            vec![FormInput::string("input_directory", 255)],
        )])
    }
}

/// The framework job configuration for one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameworkJobConfig {
    /// Import options.
    Import(ImportJobConfiguration),
    /// Export options.
    Export(ExportJobConfiguration),
}

impl FrameworkJobConfig {
    /// Form schema of the framework job surface for `direction`.
    pub fn schema(direction: JobDirection) -> FormSchema {
        match direction {
            JobDirection::Import => ImportJobConfiguration::schema(),
            JobDirection::Export => ExportJobConfiguration::schema(),
        }
    }

    /// Decode stored form values into the typed configuration for
    /// `direction`.
    pub fn from_values(direction: JobDirection, values: &FormValues) -> Result<Self> {
        let object = materialize(&Self::schema(direction), values)?;
        Ok(match direction {
            JobDirection::Import => FrameworkJobConfig::Import(serde_json::from_value(object)?),
            JobDirection::Export => FrameworkJobConfig::Export(serde_json::from_value(object)?),
        })
    }
}

/// Build the framework metadata registered with the repository at start-up.
pub fn framework_metadata() -> FrameworkMetadata {
    let job_schemas: BTreeMap<_, _> = JobDirection::ALL
        .into_iter()
        .map(|direction| (direction, FrameworkJobConfig::schema(direction)))
        .collect();
    FrameworkMetadata::new(ConnectionConfiguration::schema(), job_schemas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_configuration_decodes() {
        let mut values = FormValues::new();
        values.insert("throttling.max_connections".into(), json!(8));

        let config = ConnectionConfiguration::from_values(&values).unwrap();
        assert_eq!(config.throttling.max_connections, Some(8));
    }

    #[test]
    fn test_connection_configuration_defaults_when_empty() {
        let config = ConnectionConfiguration::from_values(&FormValues::new()).unwrap();
        assert_eq!(config.throttling.max_connections, None);
    }

    #[test]
    fn test_import_job_configuration_decodes() {
        let mut values = FormValues::new();
        values.insert("output.output_directory".into(), json!("/data/in"));

        let config = FrameworkJobConfig::from_values(JobDirection::Import, &values).unwrap();
        let FrameworkJobConfig::Import(import) = config else {
            panic!("expected import configuration");
        };
        assert_eq!(import.output.output_directory.as_deref(), Some("/data/in"));
        assert_eq!(import.output.output_format, None);
    }

    #[test]
    fn test_export_job_configuration_decodes() {
        let mut values = FormValues::new();
        values.insert("input.input_directory".into(), json!("/data/out"));

        let config = FrameworkJobConfig::from_values(JobDirection::Export, &values).unwrap();
        let FrameworkJobConfig::Export(export) = config else {
            panic!("expected export configuration");
        };
        assert_eq!(export.input.input_directory.as_deref(), Some("/data/out"));
    }

    #[test]
    fn test_framework_metadata_covers_both_directions() {
        let metadata = framework_metadata();
        assert!(metadata.id.is_none());
        assert!(metadata.job_schema(JobDirection::Import).is_some());
        assert!(metadata.job_schema(JobDirection::Export).is_some());
        assert!(!metadata.connection_schema.forms.is_empty());
    }
}
