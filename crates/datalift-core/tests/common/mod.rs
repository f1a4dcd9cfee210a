// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for datalift-core integration tests.
//!
//! Provides a scripted connector with recording callbacks, seed helpers for
//! jobs and connections, and a TestContext that wires a manager to mock
//! engines over an in-memory repository.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use datalift_core::config::Config;
use datalift_core::engine::{MockExecutionEngine, MockSubmissionEngine};
use datalift_core::manager::SubmissionManager;
use datalift_core::model::{Connection, Job};
use datalift_core::registry::{ConnectorRegistry, EngineRegistry};
use datalift_core::repository::MemoryRepository;
use datalift_spi::callbacks::{Callbacks, Destroyer, Initializer};
use datalift_spi::connector::Connector;
use datalift_spi::context::MutableContext;
use datalift_spi::forms::{Form, FormInput, FormSchema, FormValues};
use datalift_spi::job::JobDirection;

/// Records how often the scripted connector's callbacks ran.
#[derive(Default)]
pub struct CallbackLog {
    pub initializer_runs: AtomicUsize,
    pub destroyer_runs: AtomicUsize,
}

impl CallbackLog {
    pub fn initializer_runs(&self) -> usize {
        self.initializer_runs.load(Ordering::SeqCst)
    }

    pub fn destroyer_runs(&self) -> usize {
        self.destroyer_runs.load(Ordering::SeqCst)
    }
}

struct RecordingInitializer {
    log: Arc<CallbackLog>,
}

#[async_trait]
impl Initializer for RecordingInitializer {
    async fn initialize(
        &self,
        ctx: &mut MutableContext,
        connection: &Value,
        _job: &Value,
    ) -> datalift_spi::callbacks::Result<()> {
        self.log.initializer_runs.fetch_add(1, Ordering::SeqCst);
        if let Some(host) = connection["link"]["host"].as_str() {
            ctx.set("staging.host", host);
        }
        Ok(())
    }

    fn artifacts(&self, _ctx: &MutableContext, _connection: &Value, _job: &Value) -> Vec<String> {
        vec!["scripted-driver-1.2".to_string()]
    }
}

struct RecordingDestroyer {
    log: Arc<CallbackLog>,
}

#[async_trait]
impl Destroyer for RecordingDestroyer {
    async fn run(&self, _ctx: &MutableContext) -> datalift_spi::callbacks::Result<()> {
        self.log.destroyer_runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A connector whose callbacks record their invocations.
///
/// Supports imports only; export jobs exercise the unsupported-direction
/// path. The initializer and destroyer can be withheld to exercise the
/// missing-callback paths.
pub struct ScriptedConnector {
    log: Arc<CallbackLog>,
    with_initializer: bool,
    with_destroyer: bool,
}

impl ScriptedConnector {
    pub fn new(log: Arc<CallbackLog>) -> Self {
        Self {
            log,
            with_initializer: true,
            with_destroyer: true,
        }
    }

    pub fn without_initializer(log: Arc<CallbackLog>) -> Self {
        Self {
            with_initializer: false,
            ..Self::new(log)
        }
    }

    pub fn without_destroyer(log: Arc<CallbackLog>) -> Self {
        Self {
            with_destroyer: false,
            ..Self::new(log)
        }
    }
}

impl Connector for ScriptedConnector {
    fn name(&self) -> &str {
        "scripted"
    }

    fn connection_schema(&self) -> FormSchema {
        FormSchema::new(vec![Form::new(
            "link",
            vec![
                FormInput::string("host", 255),
                FormInput::integer("port"),
            ],
        )])
    }

    fn job_schema(&self, direction: JobDirection) -> Option<FormSchema> {
        match direction {
            JobDirection::Import => Some(FormSchema::new(vec![Form::new(
                "source",
                vec![FormInput::string("table", 128)],
            )])),
            JobDirection::Export => None,
        }
    }

    fn importer(&self) -> Option<Callbacks> {
        let mut callbacks = Callbacks::new();
        if self.with_initializer {
            let log = self.log.clone();
            callbacks = callbacks
                .with_initializer(move || Box::new(RecordingInitializer { log: log.clone() }));
        }
        if self.with_destroyer {
            let log = self.log.clone();
            callbacks =
                callbacks.with_destroyer(move || Box::new(RecordingDestroyer { log: log.clone() }));
        }
        Some(callbacks)
    }

    fn exporter(&self) -> Option<Callbacks> {
        None
    }
}

/// Seed a connection for the scripted connector.
pub async fn seed_connection(repository: &MemoryRepository, connection_id: i64) {
    let mut framework_part = FormValues::new();
    framework_part.insert("throttling.max_connections".into(), json!(4));

    let mut connector_part = FormValues::new();
    connector_part.insert("link.host".into(), json!("db.internal"));
    connector_part.insert("link.port".into(), json!(5432));

    repository
        .add_connection(Connection {
            id: connection_id,
            name: format!("connection-{connection_id}"),
            connector: "scripted".to_string(),
            framework_part,
            connector_part,
        })
        .await;
}

/// Seed an import job for the scripted connector.
pub async fn seed_import_job(repository: &MemoryRepository, job_id: i64, connection_id: i64) {
    let mut framework_part = FormValues::new();
    framework_part.insert(
        "output.output_directory".into(),
        json!("/data/warehouse/events"),
    );

    let mut connector_part = FormValues::new();
    connector_part.insert("source.table".into(), json!("events"));

    repository
        .add_job(Job {
            id: job_id,
            name: format!("job-{job_id}"),
            direction: JobDirection::Import,
            connector: "scripted".to_string(),
            connection_id,
            framework_part,
            connector_part,
        })
        .await;
}

/// Seed an export job for the scripted connector.
pub async fn seed_export_job(repository: &MemoryRepository, job_id: i64, connection_id: i64) {
    repository
        .add_job(Job {
            id: job_id,
            name: format!("job-{job_id}"),
            direction: JobDirection::Export,
            connector: "scripted".to_string(),
            connection_id,
            framework_part: FormValues::new(),
            connector_part: FormValues::new(),
        })
        .await;
}

/// A manager wired to mock engines over an in-memory repository, with
/// handles kept for scripting and assertions.
pub struct TestContext {
    pub repository: Arc<MemoryRepository>,
    pub submission_engine: Arc<MockSubmissionEngine>,
    pub execution_engine: Arc<MockExecutionEngine>,
    pub log: Arc<CallbackLog>,
    pub manager: SubmissionManager,
}

impl TestContext {
    /// Start a manager with default test intervals and a happily accepting
    /// submission engine.
    pub async fn start() -> Self {
        Self::start_with(Arc::new(MockSubmissionEngine::new()), test_config()).await
    }

    /// Start a manager around the given submission engine.
    pub async fn start_with(submission_engine: Arc<MockSubmissionEngine>, config: Config) -> Self {
        Self::start_full(
            submission_engine,
            Arc::new(CallbackLog::default()),
            |log| Arc::new(ScriptedConnector::new(log)),
            config,
        )
        .await
    }

    /// Start a manager with full control over the connector construction.
    pub async fn start_full(
        submission_engine: Arc<MockSubmissionEngine>,
        log: Arc<CallbackLog>,
        make_connector: impl FnOnce(Arc<CallbackLog>) -> Arc<ScriptedConnector>,
        config: Config,
    ) -> Self {
        let repository = Arc::new(MemoryRepository::new());
        let execution_engine = Arc::new(MockExecutionEngine::new());

        let mut connectors = ConnectorRegistry::new();
        connectors.register(make_connector(log.clone()));

        let mut engines = EngineRegistry::new();
        let submission = submission_engine.clone();
        engines.register_submission_engine("mock", move || submission.clone());
        let execution = execution_engine.clone();
        engines.register_execution_engine("mock", move || execution.clone());

        let manager = SubmissionManager::builder()
            .repository(repository.clone())
            .connectors(connectors)
            .engines(engines)
            .config(config)
            .build()
            .expect("builder complete")
            .start()
            .await
            .expect("manager starts");

        Self {
            repository,
            submission_engine,
            execution_engine,
            log,
            manager,
        }
    }
}

/// Config pointing at the mock engines, with intervals long enough that
/// workers stay quiet unless a test shortens them.
pub fn test_config() -> Config {
    Config::new("mock", "mock")
        .with_update_interval(Duration::from_secs(3600))
        .with_purge_interval(Duration::from_secs(3600))
}
