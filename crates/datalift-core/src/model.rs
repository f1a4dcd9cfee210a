// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Persisted model types.
//!
//! Everything the repository stores on the manager's behalf lives here:
//! the framework metadata registered at start-up, user-supplied connections
//! and jobs, and the submission records that track each attempt to run a
//! job on the remote cluster.

use chrono::{DateTime, Utc};
use datalift_spi::forms::{FormSchema, FormValues};
use datalift_spi::job::JobDirection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle state of a submission.
///
/// The submission engine owns every transition except one: a hand-off that
/// never reaches the cluster is marked [`FailureOnSubmit`](Self::FailureOnSubmit)
/// locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// No submission exists for the job. Transient; never persisted.
    NeverExecuted,
    /// Accepted by the cluster, not yet running.
    Booting,
    /// Running on the cluster.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with a failure.
    Failed,
    /// The hand-off to the cluster failed; the job never ran.
    FailureOnSubmit,
    /// The engine could not determine the remote state.
    Unknown,
}

impl SubmissionStatus {
    /// Whether the submission occupies the cluster right now.
    ///
    /// At most one running submission may exist per job.
    pub fn is_running(self) -> bool {
        matches!(self, SubmissionStatus::Booting | SubmissionStatus::Running)
    }

    /// Whether the state is final. Terminal submissions are never polled
    /// again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionStatus::Succeeded
                | SubmissionStatus::Failed
                | SubmissionStatus::FailureOnSubmit
        )
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionStatus::NeverExecuted => "NEVER_EXECUTED",
            SubmissionStatus::Booting => "BOOTING",
            SubmissionStatus::Running => "RUNNING",
            SubmissionStatus::Succeeded => "SUCCEEDED",
            SubmissionStatus::Failed => "FAILED",
            SubmissionStatus::FailureOnSubmit => "FAILURE_ON_SUBMIT",
            SubmissionStatus::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Named groups of named integer counters reported by the cluster for a
/// finished submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    groups: BTreeMap<String, BTreeMap<String, i64>>,
}

impl Counters {
    /// Create an empty counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one counter, creating its group as needed.
    pub fn set(&mut self, group: &str, counter: &str, value: i64) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(counter.to_string(), value);
    }

    /// Read one counter.
    pub fn get(&self, group: &str, counter: &str) -> Option<i64> {
        self.groups.get(group)?.get(counter).copied()
    }

    /// Whether no counters are present.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over groups and their counters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, i64>)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// The framework's own form surfaces, registered once with the repository.
///
/// After registration the repository-assigned value (carrying a persistence
/// id) replaces the boot-time value and is treated as read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkMetadata {
    /// Persistence id assigned by the repository, absent before
    /// registration.
    pub id: Option<i64>,
    /// Schema of the framework part of every connection.
    pub connection_schema: FormSchema,
    /// Schema of the framework part of a job, per direction.
    pub job_schemas: BTreeMap<JobDirection, FormSchema>,
}

impl FrameworkMetadata {
    /// Create unregistered metadata from its schemas.
    pub fn new(
        connection_schema: FormSchema,
        job_schemas: BTreeMap<JobDirection, FormSchema>,
    ) -> Self {
        Self {
            id: None,
            connection_schema,
            job_schemas,
        }
    }

    /// The framework job schema for `direction`.
    pub fn job_schema(&self, direction: JobDirection) -> Option<&FormSchema> {
        self.job_schemas.get(&direction)
    }
}

/// A named, user-supplied connection to an external system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Persistence id.
    pub id: i64,
    /// User-chosen name.
    pub name: String,
    /// Name of the connector this connection belongs to.
    pub connector: String,
    /// Values for the framework part of the connection surface.
    pub framework_part: FormValues,
    /// Values for the connector part of the connection surface.
    pub connector_part: FormValues,
}

/// A named, user-supplied transfer job definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Persistence id.
    pub id: i64,
    /// User-chosen name.
    pub name: String,
    /// Transfer direction.
    pub direction: JobDirection,
    /// Name of the connector that moves the data.
    pub connector: String,
    /// Connection the job runs against.
    pub connection_id: i64,
    /// Values for the framework part of the job surface.
    pub framework_part: FormValues,
    /// Values for the connector part of the job surface.
    pub connector_part: FormValues,
}

/// One attempt to run a job on the remote cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Persistence id, assigned when the record is created.
    pub id: Option<i64>,
    /// The job this attempt belongs to.
    pub job_id: i64,
    /// Current lifecycle state.
    pub status: SubmissionStatus,
    /// When the attempt was created.
    pub created: DateTime<Utc>,
    /// When the record was last refreshed.
    pub last_updated: DateTime<Utc>,
    /// Fraction of work done in [0, 1], or -1.0 when unknown. Only
    /// meaningful while the submission is running.
    pub progress: f64,
    /// Counters reported by the cluster; absent while running.
    pub counters: Option<Counters>,
    /// Handle assigned by the submission engine once the cluster accepted
    /// the job.
    pub external_id: Option<String>,
    /// Link into the cluster's own UI for this job.
    pub external_link: Option<String>,
}

impl Submission {
    /// A fresh attempt for `job_id`, not yet handed to any engine.
    pub fn new(job_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            job_id,
            status: SubmissionStatus::Unknown,
            created: now,
            last_updated: now,
            progress: -1.0,
            counters: None,
            external_id: None,
            external_link: None,
        }
    }

    /// The transient record returned when a job has never been submitted.
    /// Never persisted.
    pub fn never_executed(job_id: i64) -> Self {
        Self {
            status: SubmissionStatus::NeverExecuted,
            ..Self::new(job_id)
        }
    }
}
