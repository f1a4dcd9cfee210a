// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Mock engines for testing.
//!
//! [`MockSubmissionEngine`] keeps its "cluster" in a map and lets tests
//! script the remote lifecycle of each submission. [`MockExecutionEngine`]
//! records the layout it would have produced in the request payload.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use datalift_spi::connector::Connector;
use datalift_spi::context::Context;

use super::{ExecutionEngine, Result, SubmissionEngine, SubmissionRequest};
use crate::model::{Counters, Job, Submission, SubmissionStatus};

#[derive(Debug, Clone)]
struct RemoteJob {
    status: SubmissionStatus,
    progress: f64,
    counters: Option<Counters>,
    link: String,
}

/// Mock submission engine for testing.
pub struct MockSubmissionEngine {
    jobs: Arc<Mutex<HashMap<String, RemoteJob>>>,
    last_artifacts: Mutex<Vec<String>>,
    /// If true, `submit` reports a local rejection (`Ok(false)`).
    pub reject_submissions: bool,
    /// If true, `submit` fails with a transport error.
    pub error_on_submit: bool,
    /// Execution engine kinds this mock accepts.
    pub accepted_kinds: Vec<&'static str>,
    initialized: AtomicBool,
    destroyed: AtomicBool,
    submit_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl Default for MockSubmissionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSubmissionEngine {
    /// Create a mock engine that accepts everything it is asked to ship.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            last_artifacts: Mutex::new(Vec::new()),
            reject_submissions: false,
            error_on_submit: false,
            accepted_kinds: vec!["mock"],
            initialized: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            submit_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock engine whose submits are rejected locally.
    pub fn rejecting() -> Self {
        Self {
            reject_submissions: true,
            ..Self::new()
        }
    }

    /// Create a mock engine whose submits fail with a transport error.
    pub fn erroring() -> Self {
        Self {
            error_on_submit: true,
            ..Self::new()
        }
    }

    /// Create a mock engine that accepts no execution engine kind.
    pub fn accepting_nothing() -> Self {
        Self {
            accepted_kinds: Vec::new(),
            ..Self::new()
        }
    }

    /// Script the remote state of a submission.
    pub async fn advance(&self, external_id: &str, status: SubmissionStatus, progress: f64) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(external_id) {
            job.status = status;
            job.progress = progress;
        }
    }

    /// Script a finished submission with its counters.
    pub async fn finish(
        &self,
        external_id: &str,
        status: SubmissionStatus,
        counters: Option<Counters>,
    ) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(external_id) {
            job.status = status;
            job.progress = -1.0;
            job.counters = counters;
        }
    }

    /// Whether `initialize` has run.
    pub fn initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Whether `destroy` has run.
    pub fn destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// How many times `submit` was invoked.
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// How many times `stop` was invoked.
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// The artifacts declared on the most recently submitted request.
    pub async fn last_artifacts(&self) -> Vec<String> {
        self.last_artifacts.lock().await.clone()
    }
}

#[async_trait]
impl SubmissionEngine for MockSubmissionEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn initialize(&self, _ctx: &Context, _prefix: &str) -> Result<()> {
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn accepts(&self, execution_engine_kind: &str) -> bool {
        self.accepted_kinds.contains(&execution_engine_kind)
    }

    async fn submit(&self, request: &mut SubmissionRequest) -> Result<bool> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_artifacts.lock().await = request.artifacts.clone();

        if self.error_on_submit {
            return Err(super::EngineError::Transport(
                "mock cluster unreachable".to_string(),
            ));
        }
        if self.reject_submissions {
            return Ok(false);
        }

        let external_id = Uuid::new_v4().to_string();
        let link = format!("http://cluster.mock/jobs/{external_id}");

        request.summary.external_id = Some(external_id.clone());
        request.summary.status = SubmissionStatus::Booting;

        self.jobs.lock().await.insert(
            external_id,
            RemoteJob {
                status: SubmissionStatus::Booting,
                progress: -1.0,
                counters: None,
                link,
            },
        );

        Ok(true)
    }

    async fn stop(&self, external_id: &str) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(external_id) {
            job.status = SubmissionStatus::Failed;
            job.progress = -1.0;
        }
        Ok(())
    }

    async fn status(&self, external_id: &str) -> Result<SubmissionStatus> {
        let jobs = self.jobs.lock().await;
        Ok(jobs
            .get(external_id)
            .map(|j| j.status)
            .unwrap_or(SubmissionStatus::Unknown))
    }

    async fn progress(&self, external_id: &str) -> Result<f64> {
        let jobs = self.jobs.lock().await;
        Ok(jobs.get(external_id).map(|j| j.progress).unwrap_or(-1.0))
    }

    async fn stats(&self, external_id: &str) -> Result<Option<Counters>> {
        let jobs = self.jobs.lock().await;
        Ok(jobs.get(external_id).and_then(|j| j.counters.clone()))
    }

    async fn external_link(&self, external_id: &str) -> Result<Option<String>> {
        let jobs = self.jobs.lock().await;
        Ok(jobs.get(external_id).map(|j| j.link.clone()))
    }
}

/// Mock execution engine for testing.
pub struct MockExecutionEngine {
    initialized: AtomicBool,
    destroyed: AtomicBool,
    prepared_imports: AtomicUsize,
    prepared_exports: AtomicUsize,
}

impl Default for MockExecutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutionEngine {
    /// Create a mock execution engine.
    pub fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            prepared_imports: AtomicUsize::new(0),
            prepared_exports: AtomicUsize::new(0),
        }
    }

    /// Whether `initialize` has run.
    pub fn initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Whether `destroy` has run.
    pub fn destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// How many import requests were prepared.
    pub fn prepared_imports(&self) -> usize {
        self.prepared_imports.load(Ordering::SeqCst)
    }

    /// How many export requests were prepared.
    pub fn prepared_exports(&self) -> usize {
        self.prepared_exports.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionEngine for MockExecutionEngine {
    fn kind(&self) -> &'static str {
        "mock"
    }

    async fn initialize(&self, _ctx: &Context, _prefix: &str) -> Result<()> {
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn create_submission_request(
        &self,
        job: &Job,
        summary: Submission,
        connector: Arc<dyn Connector>,
    ) -> SubmissionRequest {
        SubmissionRequest::new(job.direction, &job.name, job.id, summary, connector)
    }

    async fn prepare_import_submission(&self, request: &mut SubmissionRequest) -> Result<()> {
        self.prepared_imports.fetch_add(1, Ordering::SeqCst);
        request.engine_payload = json!({
            "layout": "import",
            "output_directory": request.output_directory,
        });
        Ok(())
    }

    async fn prepare_export_submission(&self, request: &mut SubmissionRequest) -> Result<()> {
        self.prepared_exports.fetch_add(1, Ordering::SeqCst);
        request.engine_payload = json!({ "layout": "export" });
        Ok(())
    }
}
