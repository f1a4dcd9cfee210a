// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Background worker that refreshes unfinished submissions.
//!
//! Each cycle the worker asks the repository for every submission whose
//! status is not terminal and refreshes it through the manager's shared
//! refresh primitive. A refresh failure on one submission is logged and
//! does not abort the cycle; terminal submissions are never polled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::manager::ManagerInner;
use crate::repository::Repository;

/// Configuration for the update worker.
#[derive(Debug, Clone)]
pub(crate) struct UpdateWorkerConfig {
    /// How often to poll unfinished submissions.
    pub poll_interval: Duration,
}

impl Default for UpdateWorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// Background worker that polls the cluster for submission state.
pub(crate) struct UpdateWorker {
    inner: Arc<ManagerInner>,
    config: UpdateWorkerConfig,
    shutdown: Arc<Notify>,
}

impl UpdateWorker {
    /// Create a new update worker.
    pub(crate) fn new(inner: Arc<ManagerInner>, config: UpdateWorkerConfig) -> Self {
        Self {
            inner,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Get a handle that can be used to signal shutdown.
    pub(crate) fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Run the update worker loop.
    ///
    /// Each iteration refreshes all unfinished submissions, then sleeps for
    /// the poll interval. The loop exits when the shutdown signal arrives.
    pub(crate) async fn run(&self) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "Update worker started"
        );

        loop {
            if let Err(e) = self.update_unfinished().await {
                error!(error = %e, "Failed to update unfinished submissions");
            }

            tokio::select! {
                biased;

                _ = self.shutdown.notified() => {
                    info!("Update worker received shutdown signal");
                    break;
                }

                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!("Update worker stopped");
    }

    /// Refresh every submission the repository still considers unfinished.
    async fn update_unfinished(&self) -> Result<()> {
        let unfinished = self.inner.repository.find_unfinished_submissions().await?;

        if unfinished.is_empty() {
            debug!("No unfinished submissions to refresh");
            return Ok(());
        }

        debug!(count = unfinished.len(), "Refreshing unfinished submissions");

        for mut submission in unfinished {
            if let Err(e) = self.inner.refresh(&mut submission).await {
                warn!(
                    job_id = submission.job_id,
                    submission_id = ?submission.id,
                    error = %e,
                    "Failed to refresh submission"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = UpdateWorkerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(300));
    }
}
