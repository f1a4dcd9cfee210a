// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The submission manager.
//!
//! This module provides [`SubmissionManager`], the long-lived coordinator
//! that accepts transfer jobs, hands them to the configured engine pair,
//! and tracks their lifecycle until a terminal state. It is built for
//! embedding into a server process:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use datalift_core::config::Config;
//! use datalift_core::manager::SubmissionManager;
//! use datalift_core::repository::MemoryRepository;
//!
//! #[tokio::main]
//! async fn main() -> datalift_core::Result<()> {
//!     let manager = SubmissionManager::builder()
//!         .repository(Arc::new(MemoryRepository::new()))
//!         .connectors(connectors)
//!         .engines(engines)
//!         .config(Config::from_env()?)
//!         .build()?
//!         .start()
//!         .await?;
//!
//!     let summary = manager.submit(17).await?;
//!     println!("submitted as {:?}", summary.external_id);
//!
//!     manager.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! Start-up resolves both engines from the registry, verifies that the
//! submission engine accepts the execution engine's kind, registers the
//! framework metadata with the repository, and spawns the two background
//! workers. Shutdown reverses that: workers are signalled and joined first,
//! engines destroyed last, so a worker never observes a destroyed engine.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use datalift_spi::forms::materialize;
use datalift_spi::job::JobDirection;

use crate::config::{Config, EXECUTION_ENGINE_PREFIX, SUBMISSION_ENGINE_PREFIX};
use crate::configuration::{
    ConnectionConfiguration, FrameworkJobConfig, framework_metadata,
};
use crate::engine::{
    ExecutionEngine, SubmissionEngine, SubmissionRequest, artifacts,
};
use crate::error::{Error, Result};
use crate::model::{FrameworkMetadata, Submission, SubmissionStatus};
use crate::purge_worker::{PurgeWorker, PurgeWorkerConfig};
use crate::registry::{ConnectorRegistry, EngineRegistry};
use crate::repository::Repository;
use crate::update_worker::{UpdateWorker, UpdateWorkerConfig};

/// Builder for a [`SubmissionManager`].
#[derive(Default)]
pub struct SubmissionManagerBuilder {
    repository: Option<Arc<dyn Repository>>,
    connectors: Option<ConnectorRegistry>,
    engines: Option<EngineRegistry>,
    config: Option<Config>,
}

impl SubmissionManagerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the repository (required).
    pub fn repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Set the connector registry (required).
    pub fn connectors(mut self, connectors: ConnectorRegistry) -> Self {
        self.connectors = Some(connectors);
        self
    }

    /// Set the engine registry (required).
    pub fn engines(mut self, engines: EngineRegistry) -> Self {
        self.engines = Some(engines);
        self
    }

    /// Set the manager configuration (required).
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the builder into a startable configuration.
    pub fn build(self) -> Result<SubmissionManagerConfig> {
        let repository = self
            .repository
            .ok_or_else(|| Error::Other("repository is required".to_string()))?;
        let connectors = self
            .connectors
            .ok_or_else(|| Error::Other("connector registry is required".to_string()))?;
        let engines = self
            .engines
            .ok_or_else(|| Error::Other("engine registry is required".to_string()))?;
        let config = self
            .config
            .ok_or_else(|| Error::Other("config is required".to_string()))?;

        Ok(SubmissionManagerConfig {
            repository,
            connectors,
            engines,
            config,
        })
    }
}

/// A validated manager configuration, ready to start.
pub struct SubmissionManagerConfig {
    repository: Arc<dyn Repository>,
    connectors: ConnectorRegistry,
    engines: EngineRegistry,
    config: Config,
}

impl std::fmt::Debug for SubmissionManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionManagerConfig")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SubmissionManagerConfig {
    /// Start the manager: register framework metadata, resolve and
    /// initialize the engine pair, and spawn the background workers.
    ///
    /// Engine resolution and compatibility failures are fatal and are not
    /// retried.
    pub async fn start(self) -> Result<SubmissionManager> {
        let framework = self
            .repository
            .register_framework(&framework_metadata())
            .await?;

        let submission_engine = self
            .engines
            .submission_engine(&self.config.submission_engine)
            .ok_or_else(|| {
                Error::SubmissionEngineUnavailable(self.config.submission_engine.clone())
            })?;

        let execution_engine = self
            .engines
            .execution_engine(&self.config.execution_engine)
            .ok_or_else(|| {
                Error::ExecutionEngineUnavailable(self.config.execution_engine.clone())
            })?;

        if !submission_engine.accepts(execution_engine.kind()) {
            return Err(Error::IncompatibleEngines {
                submission: submission_engine.name().to_string(),
                execution: execution_engine.kind().to_string(),
            });
        }

        submission_engine
            .initialize(&self.config.engine_options, SUBMISSION_ENGINE_PREFIX)
            .await?;
        execution_engine
            .initialize(&self.config.engine_options, EXECUTION_ENGINE_PREFIX)
            .await?;

        let inner = Arc::new(ManagerInner {
            repository: self.repository,
            connectors: self.connectors,
            submission_engine,
            execution_engine,
            framework,
            submit_lock: Mutex::new(()),
        });

        let update_worker = UpdateWorker::new(
            inner.clone(),
            UpdateWorkerConfig {
                poll_interval: self.config.update_interval,
            },
        );
        let update_shutdown = update_worker.shutdown_handle();
        let update_handle = tokio::spawn(async move {
            update_worker.run().await;
        });

        let purge_worker = PurgeWorker::new(
            inner.repository.clone(),
            PurgeWorkerConfig {
                threshold: self.config.purge_threshold,
                poll_interval: self.config.purge_interval,
            },
        );
        let purge_shutdown = purge_worker.shutdown_handle();
        let purge_handle = tokio::spawn(async move {
            purge_worker.run().await;
        });

        info!(
            submission_engine = inner.submission_engine.name(),
            execution_engine = inner.execution_engine.kind(),
            "Submission manager started"
        );

        Ok(SubmissionManager {
            inner,
            update_shutdown,
            purge_shutdown,
            update_handle,
            purge_handle,
        })
    }
}

/// A running submission manager.
///
/// The manager's surface to the embedding server is `submit`, `stop`, and
/// `status`, plus [`shutdown`](Self::shutdown) for graceful termination.
pub struct SubmissionManager {
    inner: Arc<ManagerInner>,
    update_shutdown: Arc<Notify>,
    purge_shutdown: Arc<Notify>,
    update_handle: JoinHandle<()>,
    purge_handle: JoinHandle<()>,
}

impl std::fmt::Debug for SubmissionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionManager").finish_non_exhaustive()
    }
}

impl SubmissionManager {
    /// Create a new builder for configuring a manager.
    pub fn builder() -> SubmissionManagerBuilder {
        SubmissionManagerBuilder::new()
    }

    /// The framework metadata as registered with the repository.
    pub fn framework(&self) -> &FrameworkMetadata {
        &self.inner.framework
    }

    /// Submit the job with the given id for remote execution.
    ///
    /// Returns the persisted submission summary. At most one running
    /// submission may exist per job; a second submit while one is running
    /// fails without touching the engine.
    pub async fn submit(&self, job_id: i64) -> Result<Submission> {
        self.inner.submit(job_id).await
    }

    /// Ask the cluster to stop the job's running submission.
    ///
    /// Stopping is advisory: the returned record reflects the remote state
    /// after the stop request, which may still be running.
    pub async fn stop(&self, job_id: i64) -> Result<Submission> {
        self.inner.stop(job_id).await
    }

    /// The latest submission for the job, refreshed from the cluster.
    ///
    /// When the job was never submitted, a transient record with status
    /// `NEVER_EXECUTED` is returned and nothing is persisted.
    pub async fn status(&self, job_id: i64) -> Result<Submission> {
        self.inner.status(job_id).await
    }

    /// Whether both background workers are still alive.
    pub fn is_running(&self) -> bool {
        !self.update_handle.is_finished() && !self.purge_handle.is_finished()
    }

    /// Gracefully shut the manager down.
    ///
    /// Signals both workers, waits for them to finish, then destroys the
    /// engines. Engine destruction failures are logged, not returned; by
    /// that point the manager is already torn down.
    pub async fn shutdown(self) -> Result<()> {
        info!("Submission manager shutting down");

        self.update_shutdown.notify_one();
        self.purge_shutdown.notify_one();

        if let Err(e) = self.update_handle.await {
            error!(error = %e, "Update worker task panicked");
        }
        if let Err(e) = self.purge_handle.await {
            error!(error = %e, "Purge worker task panicked");
        }

        if let Err(e) = self.inner.submission_engine.destroy().await {
            error!(error = %e, "Failed to destroy submission engine");
        }
        if let Err(e) = self.inner.execution_engine.destroy().await {
            error!(error = %e, "Failed to destroy execution engine");
        }

        info!("Submission manager shutdown complete");
        Ok(())
    }
}

/// State shared between interactive operations and the background workers.
pub(crate) struct ManagerInner {
    pub(crate) repository: Arc<dyn Repository>,
    connectors: ConnectorRegistry,
    submission_engine: Arc<dyn SubmissionEngine>,
    execution_engine: Arc<dyn ExecutionEngine>,
    framework: FrameworkMetadata,
    /// Guards the last-submission check, the engine hand-off, and the
    /// summary persist as one region. Sole guarantor of the one-running-
    /// submission-per-job invariant.
    submit_lock: Mutex<()>,
}

impl ManagerInner {
    async fn submit(&self, job_id: i64) -> Result<Submission> {
        let job = self
            .repository
            .find_job(job_id)
            .await?
            .ok_or(Error::UnknownJob(job_id))?;
        let connection = self
            .repository
            .find_connection(job.connection_id)
            .await?
            .ok_or(Error::UnknownConnection(job.connection_id))?;
        let connector = self
            .connectors
            .get(&job.connector)
            .ok_or_else(|| Error::UnknownConnector(job.connector.clone()))?;

        // Materialize the four configuration objects from stored form
        // values: connector side as structured JSON, framework side typed.
        let connector_connection =
            materialize(&connector.connection_schema(), &connection.connector_part)?;
        let connector_job_schema =
            connector
                .job_schema(job.direction)
                .ok_or_else(|| Error::UnsupportedDirection {
                    connector: job.connector.clone(),
                    direction: job.direction,
                })?;
        let connector_job = materialize(&connector_job_schema, &job.connector_part)?;
        let framework_connection =
            ConnectionConfiguration::from_values(&connection.framework_part)?;
        let framework_job = FrameworkJobConfig::from_values(job.direction, &job.framework_part)?;

        let summary = Submission::new(job_id);
        let mut request =
            self.execution_engine
                .create_submission_request(&job, summary, connector.clone());
        request.connector_connection = connector_connection;
        request.connector_job = connector_job;
        request.framework_connection = framework_connection;
        request.framework_job = Some(framework_job);

        request.add_artifact(artifacts::SPI);
        request.add_artifact(artifacts::CORE);
        request.add_artifact(artifacts::JSON_CODEC);
        request.add_artifact(self.execution_engine.artifact());
        request.add_artifact(connector.artifact());

        request.callbacks = match job.direction {
            JobDirection::Import => connector.importer(),
            JobDirection::Export => connector.exporter(),
        }
        .ok_or_else(|| Error::UnsupportedDirection {
            connector: job.connector.clone(),
            direction: job.direction,
        })?;
        debug!(job_id, direction = %job.direction, "Selected connector callbacks");

        // Initialize the connector side of the submission.
        let initializer =
            request
                .callbacks
                .initializer()
                .ok_or_else(|| Error::CallbackUnavailable {
                    connector: job.connector.clone(),
                    role: "initializer",
                })?;
        initializer
            .initialize(
                &mut request.connector_context,
                &request.connector_connection,
                &request.connector_job,
            )
            .await?;
        let reported = initializer.artifacts(
            &request.connector_context,
            &request.connector_connection,
            &request.connector_job,
        );
        request.add_artifacts(reported);

        match job.direction {
            JobDirection::Import => {
                if let Some(FrameworkJobConfig::Import(import)) = &request.framework_job {
                    request.output_directory = import.output.output_directory.clone();
                }
                self.execution_engine
                    .prepare_import_submission(&mut request)
                    .await?;
            }
            JobDirection::Export => {
                // TODO: wire export preparation once the export pipeline lands.
            }
        }

        let _guard = self.submit_lock.lock().await;

        let last = self.repository.find_last_submission_for_job(job_id).await?;
        if last.is_some_and(|s| s.status.is_running()) {
            return Err(Error::SubmissionAlreadyRunning(job_id));
        }

        let submit_result = self.submission_engine.submit(&mut request).await;
        let accepted = match &submit_result {
            Ok(accepted) => *accepted,
            Err(_) => false,
        };
        if !accepted {
            // Cleanup runs for rejections and failed hand-offs alike, so
            // whatever the initializer staged is torn down symmetrically.
            self.destroy_submission(&request).await?;
            request.summary.status = SubmissionStatus::FailureOnSubmit;
        }

        let mut summary = request.summary;
        self.repository.create_submission(&mut summary).await?;

        match submit_result {
            Ok(true) => {
                info!(
                    job_id,
                    external_id = ?summary.external_id,
                    status = %summary.status,
                    "Submission created"
                );
            }
            Ok(false) => {
                warn!(job_id, "Submission rejected before reaching the cluster");
            }
            Err(e) => {
                warn!(job_id, error = %e, "Submission hand-off failed");
                return Err(e.into());
            }
        }

        Ok(summary)
    }

    /// Run the connector destroyer for a submission that never made it
    /// onto the cluster. Destroyer failures are logged; the submission is
    /// persisted as failed either way.
    async fn destroy_submission(&self, request: &SubmissionRequest) -> Result<()> {
        let destroyer =
            request
                .callbacks
                .destroyer()
                .ok_or_else(|| Error::CallbackUnavailable {
                    connector: request.connector.name().to_string(),
                    role: "destroyer",
                })?;
        if let Err(e) = destroyer.run(&request.connector_context).await {
            warn!(job_id = request.job_id, error = %e, "Connector destroyer failed");
        }
        Ok(())
    }

    async fn stop(&self, job_id: i64) -> Result<Submission> {
        let mut submission = self
            .repository
            .find_last_submission_for_job(job_id)
            .await?
            .filter(|s| s.status.is_running())
            .ok_or(Error::SubmissionNotRunning(job_id))?;

        if let Some(external_id) = submission.external_id.clone() {
            self.submission_engine.stop(&external_id).await?;
        }

        // Stop is advisory; re-read the remote state before reporting back.
        self.refresh(&mut submission).await?;
        info!(job_id, status = %submission.status, "Stop requested");
        Ok(submission)
    }

    async fn status(&self, job_id: i64) -> Result<Submission> {
        match self.repository.find_last_submission_for_job(job_id).await? {
            Some(mut submission) => {
                self.refresh(&mut submission).await?;
                Ok(submission)
            }
            None => Ok(Submission::never_executed(job_id)),
        }
    }

    /// Refresh one submission from the cluster and persist the result.
    ///
    /// Shared between interactive `status`/`stop` and the update worker.
    /// Terminal submissions are final and are left untouched, as are
    /// records with no external id (there is nothing to poll).
    pub(crate) async fn refresh(&self, submission: &mut Submission) -> Result<()> {
        if submission.status.is_terminal() {
            return Ok(());
        }
        let Some(external_id) = submission.external_id.clone() else {
            return Ok(());
        };

        let status = self.submission_engine.status(&external_id).await?;
        let external_link = self.submission_engine.external_link(&external_id).await?;

        if status.is_running() {
            submission.progress = self.submission_engine.progress(&external_id).await?;
            submission.counters = None;
        } else {
            submission.progress = -1.0;
            submission.counters = self.submission_engine.stats(&external_id).await?;
        }

        submission.status = status;
        submission.external_link = external_link;
        submission.last_updated = Utc::now();

        self.repository.update_submission(submission).await?;
        Ok(())
    }
}
