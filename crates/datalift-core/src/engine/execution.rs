// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Execution engine trait definition.

use async_trait::async_trait;
use std::sync::Arc;

use datalift_spi::connector::Connector;
use datalift_spi::context::Context;

use super::{Result, SubmissionRequest};
use crate::model::{Job, Submission};

/// The backend that shapes a submission request for the remote side.
///
/// An execution engine owns the layout of the transfer on the cluster: how
/// the work is split, which roles run where, what the request payload looks
/// like. It never talks to the cluster itself; the submission engine does
/// that with the request the execution engine prepared.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Kind tag checked against [`SubmissionEngine::accepts`].
    ///
    /// [`SubmissionEngine::accepts`]: super::SubmissionEngine::accepts
    fn kind(&self) -> &'static str;

    /// Artifact identifier the remote execution environment must stage to
    /// run jobs shaped by this engine.
    fn artifact(&self) -> String {
        format!("datalift-engine-{}", self.kind())
    }

    /// Initialize the engine with its configuration subtree. `prefix`
    /// scopes the engine's keys within `ctx`.
    async fn initialize(&self, ctx: &Context, prefix: &str) -> Result<()>;

    /// Release engine resources. Called exactly once, after the workers
    /// have stopped.
    async fn destroy(&self) -> Result<()>;

    /// Create the request for one attempt at `job`, seeded with the job
    /// coordinates. The coordinator fills in configurations, callbacks,
    /// and artifacts before either prepare hook runs.
    fn create_submission_request(
        &self,
        job: &Job,
        summary: Submission,
        connector: Arc<dyn Connector>,
    ) -> SubmissionRequest;

    /// Lay out an import on the remote side. The request's output
    /// directory is set before this is called.
    async fn prepare_import_submission(&self, request: &mut SubmissionRequest) -> Result<()>;

    /// Lay out an export on the remote side.
    async fn prepare_export_submission(&self, request: &mut SubmissionRequest) -> Result<()>;
}
