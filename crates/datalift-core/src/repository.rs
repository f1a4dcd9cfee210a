// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Repository abstraction and the in-memory backend.
//!
//! The manager owns no storage of its own; all durable state goes through
//! the [`Repository`] trait. Database-backed implementations live outside
//! this crate. [`MemoryRepository`] is the in-process backend used by tests
//! and by embedders that do not need durability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{Connection, FrameworkMetadata, Job, Submission};

/// Errors from repository operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepositoryError {
    /// The backing store rejected or lost the operation.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// An update referenced a record that does not exist.
    #[error("No such submission: {0}")]
    NoSuchSubmission(i64),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Durable storage consumed by the submission manager.
///
/// Implementations must make each operation atomic; the manager layers its
/// own serialization on top where cross-operation atomicity is needed.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Persist the framework metadata, assigning a persistence id on first
    /// registration. Returns the registered value, which replaces the
    /// caller's in-memory copy.
    async fn register_framework(
        &self,
        framework: &FrameworkMetadata,
    ) -> Result<FrameworkMetadata>;

    /// Look up a job by id.
    async fn find_job(&self, job_id: i64) -> Result<Option<Job>>;

    /// Look up a connection by id.
    async fn find_connection(&self, connection_id: i64) -> Result<Option<Connection>>;

    /// The most recently created submission for a job, if any.
    async fn find_last_submission_for_job(&self, job_id: i64) -> Result<Option<Submission>>;

    /// All submissions whose status is not terminal.
    async fn find_unfinished_submissions(&self) -> Result<Vec<Submission>>;

    /// Create a submission row, assigning its persistence id.
    async fn create_submission(&self, submission: &mut Submission) -> Result<()>;

    /// Overwrite an existing submission row.
    async fn update_submission(&self, submission: &Submission) -> Result<()>;

    /// Delete all submissions created before `before`. Returns how many
    /// rows were removed.
    async fn purge_submissions(&self, before: DateTime<Utc>) -> Result<u64>;
}

#[derive(Default)]
struct MemoryState {
    framework: Option<FrameworkMetadata>,
    jobs: HashMap<i64, Job>,
    connections: HashMap<i64, Connection>,
    submissions: Vec<Submission>,
    next_submission_id: i64,
}

/// In-memory [`Repository`] backend.
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                next_submission_id: 1,
                ..MemoryState::default()
            }),
        }
    }

    /// Seed a job definition.
    pub async fn add_job(&self, job: Job) {
        self.state.write().await.jobs.insert(job.id, job);
    }

    /// Seed a connection definition.
    pub async fn add_connection(&self, connection: Connection) {
        self.state
            .write()
            .await
            .connections
            .insert(connection.id, connection);
    }

    /// Number of stored submissions, across all jobs.
    pub async fn submission_count(&self) -> usize {
        self.state.read().await.submissions.len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn register_framework(
        &self,
        framework: &FrameworkMetadata,
    ) -> Result<FrameworkMetadata> {
        let mut state = self.state.write().await;
        if let Some(registered) = &state.framework {
            return Ok(registered.clone());
        }
        let mut registered = framework.clone();
        registered.id = Some(1);
        state.framework = Some(registered.clone());
        Ok(registered)
    }

    async fn find_job(&self, job_id: i64) -> Result<Option<Job>> {
        Ok(self.state.read().await.jobs.get(&job_id).cloned())
    }

    async fn find_connection(&self, connection_id: i64) -> Result<Option<Connection>> {
        Ok(self
            .state
            .read()
            .await
            .connections
            .get(&connection_id)
            .cloned())
    }

    async fn find_last_submission_for_job(&self, job_id: i64) -> Result<Option<Submission>> {
        let state = self.state.read().await;
        Ok(state
            .submissions
            .iter()
            .filter(|s| s.job_id == job_id)
            .max_by_key(|s| (s.created, s.id))
            .cloned())
    }

    async fn find_unfinished_submissions(&self) -> Result<Vec<Submission>> {
        let state = self.state.read().await;
        Ok(state
            .submissions
            .iter()
            .filter(|s| !s.status.is_terminal())
            .cloned()
            .collect())
    }

    async fn create_submission(&self, submission: &mut Submission) -> Result<()> {
        let mut state = self.state.write().await;
        submission.id = Some(state.next_submission_id);
        state.next_submission_id += 1;
        state.submissions.push(submission.clone());
        Ok(())
    }

    async fn update_submission(&self, submission: &Submission) -> Result<()> {
        let id = submission
            .id
            .ok_or(RepositoryError::NoSuchSubmission(-1))?;
        let mut state = self.state.write().await;
        let stored = state
            .submissions
            .iter_mut()
            .find(|s| s.id == Some(id))
            .ok_or(RepositoryError::NoSuchSubmission(id))?;
        *stored = submission.clone();
        Ok(())
    }

    async fn purge_submissions(&self, before: DateTime<Utc>) -> Result<u64> {
        let mut state = self.state.write().await;
        let initial = state.submissions.len();
        state.submissions.retain(|s| s.created >= before);
        Ok((initial - state.submissions.len()) as u64)
    }
}
