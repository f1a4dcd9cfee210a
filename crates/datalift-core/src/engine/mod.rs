// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Engine abstractions.
//!
//! Two orthogonal engine families cooperate on every submission:
//!
//! - the [`ExecutionEngine`] shapes the request — it decides how the
//!   transfer is laid out on the remote side;
//! - the [`SubmissionEngine`] carries the shaped request to the cluster and
//!   answers status questions about it afterwards.
//!
//! The pairing is configured by name and checked for compatibility at
//! start-up: a submission engine only accepts execution engine kinds it
//! knows how to ship.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use datalift_spi::callbacks::Callbacks;
use datalift_spi::connector::Connector;
use datalift_spi::context::MutableContext;
use datalift_spi::job::JobDirection;

use crate::configuration::{ConnectionConfiguration, FrameworkJobConfig};
use crate::model::Submission;

mod execution;
mod mock;
mod submission;

pub use execution::ExecutionEngine;
pub use mock::{MockExecutionEngine, MockSubmissionEngine};
pub use submission::SubmissionEngine;

/// Artifact identifiers every submission stages on the remote execution
/// environment, independent of engine and connector.
pub mod artifacts {
    /// The connector SPI contract bundle.
    pub const SPI: &str = concat!("datalift-spi-", env!("CARGO_PKG_VERSION"));

    /// The core manager bundle.
    pub const CORE: &str = concat!("datalift-core-", env!("CARGO_PKG_VERSION"));

    /// The JSON codec used for configuration payloads.
    pub const JSON_CODEC: &str = concat!("datalift-codec-json-", env!("CARGO_PKG_VERSION"));
}

/// Errors from engine operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The remote cluster rejected the request outright.
    #[error("Remote cluster rejected the request: {0}")]
    Rejected(String),

    /// The engine could not reach the cluster.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The external id is not known to the cluster.
    #[error("Unknown external id: {0}")]
    UnknownExternalId(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Everything one submission attempt hands to the engines.
///
/// Created by the execution engine, filled in by the coordinator, consumed
/// by the submission engine. Lives only for the duration of one submit
/// call; the [`summary`](Self::summary) is the only part that outlives it,
/// as the persisted submission record.
pub struct SubmissionRequest {
    /// The submission record this attempt will persist.
    pub summary: Submission,
    /// Transfer direction.
    pub direction: JobDirection,
    /// Name of the job, for display on the remote side.
    pub job_name: String,
    /// Id of the job.
    pub job_id: i64,
    /// The connector moving the data.
    pub connector: Arc<dyn Connector>,
    /// Materialized connector-side connection configuration.
    pub connector_connection: Value,
    /// Materialized connector-side job configuration.
    pub connector_job: Value,
    /// Typed framework-side connection configuration.
    pub framework_connection: ConnectionConfiguration,
    /// Typed framework-side job configuration; set by the coordinator
    /// before the engines see the request.
    pub framework_job: Option<FrameworkJobConfig>,
    /// Callbacks selected for the job's direction.
    pub callbacks: Callbacks,
    /// Per-attempt context shared between the initializer, the execution
    /// engine, and the destroyer.
    pub connector_context: MutableContext,
    /// Artifacts the remote execution environment must stage.
    pub artifacts: Vec<String>,
    /// Where an import writes its data. Unset for exports.
    pub output_directory: Option<String>,
    /// Scratch space for the execution engine's own layout decisions.
    pub engine_payload: Value,
}

impl SubmissionRequest {
    /// Create a request seeded with the job coordinates; the coordinator
    /// attaches configurations, callbacks, and artifacts afterwards.
    pub fn new(
        direction: JobDirection,
        job_name: impl Into<String>,
        job_id: i64,
        summary: Submission,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            summary,
            direction,
            job_name: job_name.into(),
            job_id,
            connector,
            connector_connection: Value::Null,
            connector_job: Value::Null,
            framework_connection: ConnectionConfiguration::default(),
            framework_job: None,
            callbacks: Callbacks::new(),
            connector_context: MutableContext::new(),
            artifacts: Vec::new(),
            output_directory: None,
            engine_payload: Value::Null,
        }
    }

    /// Record an artifact, skipping duplicates.
    pub fn add_artifact(&mut self, artifact: impl Into<String>) {
        let artifact = artifact.into();
        if !self.artifacts.contains(&artifact) {
            self.artifacts.push(artifact);
        }
    }

    /// Record several artifacts, skipping duplicates.
    pub fn add_artifacts<I>(&mut self, artifacts: I)
    where
        I: IntoIterator<Item = String>,
    {
        for artifact in artifacts {
            self.add_artifact(artifact);
        }
    }
}
