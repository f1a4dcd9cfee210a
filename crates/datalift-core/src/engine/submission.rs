// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Submission engine trait definition.

use async_trait::async_trait;

use datalift_spi::context::Context;

use super::{Result, SubmissionRequest};
use crate::model::{Counters, SubmissionStatus};

/// The backend that carries prepared requests to the remote cluster and
/// answers status questions afterwards.
///
/// Engines are resolved by name at start-up, initialized once before any
/// submission passes through, and destroyed once after the background
/// workers have stopped. All remote identifiers handed back by
/// [`submit`](Self::submit) are opaque to the manager.
#[async_trait]
pub trait SubmissionEngine: Send + Sync {
    /// Engine name, for logs and compatibility errors.
    fn name(&self) -> &'static str;

    /// Initialize the engine with its configuration subtree. `prefix`
    /// scopes the engine's keys within `ctx`.
    async fn initialize(&self, ctx: &Context, prefix: &str) -> Result<()>;

    /// Release engine resources. Called exactly once, after the workers
    /// have stopped.
    async fn destroy(&self) -> Result<()>;

    /// Whether this engine can ship requests shaped by an execution engine
    /// of the given kind.
    fn accepts(&self, execution_engine_kind: &str) -> bool;

    /// Hand a prepared request to the cluster.
    ///
    /// Returns `Ok(true)` when the cluster accepted the job; the engine
    /// must then have attached the external id (and its initial status) to
    /// the request's summary. `Ok(false)` means a locally detectable
    /// rejection. Errors mean the hand-off itself failed.
    async fn submit(&self, request: &mut SubmissionRequest) -> Result<bool>;

    /// Ask the cluster to cancel a job. Advisory; the job may keep running.
    async fn stop(&self, external_id: &str) -> Result<()>;

    /// Current remote status of a job.
    async fn status(&self, external_id: &str) -> Result<SubmissionStatus>;

    /// Fraction of work done in [0, 1], or -1.0 when the cluster does not
    /// report progress. Only meaningful while the job is running.
    async fn progress(&self, external_id: &str) -> Result<f64>;

    /// Counters for a finished job, when the cluster kept any.
    async fn stats(&self, external_id: &str) -> Result<Option<Counters>>;

    /// Link into the cluster's own UI for the job.
    async fn external_link(&self, external_id: &str) -> Result<Option<String>>;
}
