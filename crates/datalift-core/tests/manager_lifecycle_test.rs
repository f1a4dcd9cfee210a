// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tests for manager start-up and shutdown: engine resolution, the
//! compatibility check, framework metadata registration, and worker
//! lifetimes.

mod common;

use std::sync::Arc;

use common::{CallbackLog, ScriptedConnector, TestContext, test_config};
use datalift_core::configuration::framework_metadata;
use datalift_core::engine::{MockExecutionEngine, MockSubmissionEngine};
use datalift_core::manager::SubmissionManager;
use datalift_core::registry::{ConnectorRegistry, EngineRegistry};
use datalift_core::repository::MemoryRepository;

fn registries(
    submission_engine: Arc<MockSubmissionEngine>,
    execution_engine: Arc<MockExecutionEngine>,
) -> (ConnectorRegistry, EngineRegistry) {
    let mut connectors = ConnectorRegistry::new();
    connectors.register(Arc::new(ScriptedConnector::new(Arc::new(
        CallbackLog::default(),
    ))));

    let mut engines = EngineRegistry::new();
    let submission = submission_engine.clone();
    engines.register_submission_engine("mock", move || submission.clone());
    let execution = execution_engine.clone();
    engines.register_execution_engine("mock", move || execution.clone());

    (connectors, engines)
}

#[tokio::test]
async fn test_start_initializes_engines_and_spawns_workers() {
    let ctx = TestContext::start().await;

    assert!(ctx.submission_engine.initialized());
    assert!(ctx.execution_engine.initialized());
    assert!(!ctx.submission_engine.destroyed());
    assert!(ctx.manager.is_running());

    ctx.manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_destroys_engines_after_workers() {
    let ctx = TestContext::start().await;
    let submission_engine = ctx.submission_engine.clone();
    let execution_engine = ctx.execution_engine.clone();

    ctx.manager.shutdown().await.unwrap();

    assert!(submission_engine.destroyed());
    assert!(execution_engine.destroyed());
}

#[tokio::test]
async fn test_framework_metadata_registered_on_start() {
    let ctx = TestContext::start().await;

    let registered = ctx.manager.framework();
    let boot = framework_metadata();

    assert_eq!(registered.id, Some(1));
    assert_eq!(registered.connection_schema, boot.connection_schema);
    assert_eq!(registered.job_schemas, boot.job_schemas);

    ctx.manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_submission_engine_fails_start() {
    let submission_engine = Arc::new(MockSubmissionEngine::new());
    let execution_engine = Arc::new(MockExecutionEngine::new());
    let (connectors, engines) = registries(submission_engine.clone(), execution_engine);

    let mut config = test_config();
    config.submission_engine = "spark".to_string();

    let err = SubmissionManager::builder()
        .repository(Arc::new(MemoryRepository::new()))
        .connectors(connectors)
        .engines(engines)
        .config(config)
        .build()
        .unwrap()
        .start()
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "DATALIFT_0001");
    assert!(!submission_engine.initialized());
}

#[tokio::test]
async fn test_unknown_execution_engine_fails_start() {
    let submission_engine = Arc::new(MockSubmissionEngine::new());
    let execution_engine = Arc::new(MockExecutionEngine::new());
    let (connectors, engines) = registries(submission_engine, execution_engine.clone());

    let mut config = test_config();
    config.execution_engine = "spark".to_string();

    let err = SubmissionManager::builder()
        .repository(Arc::new(MemoryRepository::new()))
        .connectors(connectors)
        .engines(engines)
        .config(config)
        .build()
        .unwrap()
        .start()
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "DATALIFT_0007");
    assert!(!execution_engine.initialized());
}

#[tokio::test]
async fn test_incompatible_engine_pair_fails_start() {
    let submission_engine = Arc::new(MockSubmissionEngine::accepting_nothing());
    let execution_engine = Arc::new(MockExecutionEngine::new());
    let (connectors, engines) = registries(submission_engine.clone(), execution_engine.clone());

    let err = SubmissionManager::builder()
        .repository(Arc::new(MemoryRepository::new()))
        .connectors(connectors)
        .engines(engines)
        .config(test_config())
        .build()
        .unwrap()
        .start()
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "DATALIFT_0008");
    // The pair is checked before either engine is initialized.
    assert!(!submission_engine.initialized());
    assert!(!execution_engine.initialized());
}
