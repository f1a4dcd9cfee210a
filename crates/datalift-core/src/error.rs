// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for the submission manager.
//!
//! Every error surfaced to a caller carries a stable code through
//! [`Error::error_code`]. The numbered codes form the manager's public
//! error taxonomy; the remaining codes tag errors bubbling up from the
//! configuration, repository, engine, and form layers.

use datalift_spi::callbacks::CallbackError;
use datalift_spi::forms::FormError;
use datalift_spi::job::JobDirection;
use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::repository::RepositoryError;

/// Errors from manager operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The configured submission engine name is not in the registry.
    #[error("Submission engine '{0}' is not registered")]
    SubmissionEngineUnavailable(String),

    /// The job already has a submission occupying the cluster.
    #[error("Job {0} already has a running submission")]
    SubmissionAlreadyRunning(i64),

    /// Stop was requested but nothing is running for the job.
    #[error("Job {0} has no running submission")]
    SubmissionNotRunning(i64),

    /// No job with the given id exists.
    #[error("Unknown job id {0}")]
    UnknownJob(i64),

    /// The connector does not support the requested transfer direction.
    #[error("Connector '{connector}' does not support {direction} jobs")]
    UnsupportedDirection {
        /// Connector name.
        connector: String,
        /// The unsupported direction.
        direction: JobDirection,
    },

    /// The connector supplies no factory for a required callback.
    #[error("Connector '{connector}' supplies no {role}")]
    CallbackUnavailable {
        /// Connector name.
        connector: String,
        /// `"initializer"` or `"destroyer"`.
        role: &'static str,
    },

    /// The configured execution engine name is not in the registry.
    #[error("Execution engine '{0}' is not registered")]
    ExecutionEngineUnavailable(String),

    /// The submission engine does not accept the execution engine's kind.
    #[error("Submission engine '{submission}' does not accept execution engine '{execution}'")]
    IncompatibleEngines {
        /// Submission engine name.
        submission: String,
        /// Execution engine kind.
        execution: String,
    },

    /// No connection with the given id exists.
    #[error("Unknown connection id {0}")]
    UnknownConnection(i64),

    /// No connector with the given name is registered.
    #[error("Unknown connector '{0}'")]
    UnknownConnector(String),

    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Engine operation failed.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Stored form values failed structural materialization.
    #[error("Form error: {0}")]
    Forms(#[from] FormError),

    /// A connector callback failed.
    #[error("Callback error: {0}")]
    Callback(#[from] CallbackError),

    /// A materialized configuration object failed to decode.
    #[error("Configuration decode error: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable code identifying the error class.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SubmissionEngineUnavailable(_) => "DATALIFT_0001",
            Self::SubmissionAlreadyRunning(_) => "DATALIFT_0002",
            Self::SubmissionNotRunning(_) => "DATALIFT_0003",
            Self::UnknownJob(_) => "DATALIFT_0004",
            Self::UnsupportedDirection { .. } => "DATALIFT_0005",
            Self::CallbackUnavailable { .. } => "DATALIFT_0006",
            Self::ExecutionEngineUnavailable(_) => "DATALIFT_0007",
            Self::IncompatibleEngines { .. } => "DATALIFT_0008",
            Self::UnknownConnection(_) => "DATALIFT_CONNECTION",
            Self::UnknownConnector(_) => "DATALIFT_CONNECTOR",
            Self::Config(_) => "DATALIFT_CONFIG",
            Self::Repository(_) => "DATALIFT_REPOSITORY",
            Self::Engine(_) => "DATALIFT_ENGINE",
            Self::Forms(_) => "DATALIFT_FORMS",
            Self::Callback(_) => "DATALIFT_CALLBACK",
            Self::ConfigDecode(_) => "DATALIFT_DECODE",
            Self::Other(_) => "DATALIFT_INTERNAL",
        }
    }
}

/// Result type using the manager [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
