// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Background worker that purges old submissions from the repository.
//!
//! Each cycle the worker computes the retention cutoff and asks the
//! repository to delete every submission created before it. What exactly
//! gets cascaded is repository-defined; the worker only supplies the
//! cutoff.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::repository::Repository;

/// Configuration for the purge worker.
#[derive(Debug, Clone)]
pub(crate) struct PurgeWorkerConfig {
    /// Submissions older than this are removed.
    pub threshold: Duration,
    /// How often to run a purge cycle.
    pub poll_interval: Duration,
}

impl Default for PurgeWorkerConfig {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(24 * 3600),     // 24 hours
            poll_interval: Duration::from_secs(24 * 3600), // 24 hours
        }
    }
}

/// Background worker that removes aged-out submission records.
pub(crate) struct PurgeWorker {
    repository: Arc<dyn Repository>,
    config: PurgeWorkerConfig,
    shutdown: Arc<Notify>,
}

impl PurgeWorker {
    /// Create a new purge worker.
    pub(crate) fn new(repository: Arc<dyn Repository>, config: PurgeWorkerConfig) -> Self {
        Self {
            repository,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Get a handle that can be used to signal shutdown.
    pub(crate) fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Run the purge worker loop.
    ///
    /// Each iteration purges, then sleeps for the poll interval. The loop
    /// exits when the shutdown signal arrives.
    pub(crate) async fn run(&self) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            threshold_secs = self.config.threshold.as_secs(),
            "Purge worker started"
        );

        loop {
            if let Err(e) = self.purge_old_submissions().await {
                error!(error = %e, "Failed to purge old submissions");
            }

            tokio::select! {
                biased;

                _ = self.shutdown.notified() => {
                    info!("Purge worker received shutdown signal");
                    break;
                }

                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!("Purge worker stopped");
    }

    /// Delete all submissions older than the configured threshold.
    async fn purge_old_submissions(&self) -> Result<()> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.config.threshold)
                .map_err(|e| Error::Other(format!("Invalid purge threshold: {e}")))?;

        let purged = self.repository.purge_submissions(cutoff).await?;

        if purged > 0 {
            info!(purged, cutoff = %cutoff, "Purge cycle completed");
        } else {
            debug!("Purge cycle completed, no old submissions found");
        }

        Ok(())
    }
}
