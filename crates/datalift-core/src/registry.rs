// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Engine and connector registries.
//!
//! Engines and connectors are wired in at build time: embedders register
//! named factories (engines) and named instances (connectors) before the
//! manager starts, and configuration selects among them by name. There is
//! no dynamic loading; an unknown name is a start-up error.

use std::collections::HashMap;
use std::sync::Arc;

use datalift_spi::connector::Connector;

use crate::engine::{ExecutionEngine, SubmissionEngine};

type SubmissionEngineFactory = Box<dyn Fn() -> Arc<dyn SubmissionEngine> + Send + Sync>;
type ExecutionEngineFactory = Box<dyn Fn() -> Arc<dyn ExecutionEngine> + Send + Sync>;

/// Name-to-factory tables for both engine families.
#[derive(Default)]
pub struct EngineRegistry {
    submission: HashMap<String, SubmissionEngineFactory>,
    execution: HashMap<String, ExecutionEngineFactory>,
}

impl EngineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a submission engine factory under `name`, replacing any
    /// previous registration.
    pub fn register_submission_engine<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn SubmissionEngine> + Send + Sync + 'static,
    {
        self.submission.insert(name.into(), Box::new(factory));
    }

    /// Register an execution engine factory under `name`, replacing any
    /// previous registration.
    pub fn register_execution_engine<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn ExecutionEngine> + Send + Sync + 'static,
    {
        self.execution.insert(name.into(), Box::new(factory));
    }

    /// Instantiate the submission engine registered under `name`.
    pub fn submission_engine(&self, name: &str) -> Option<Arc<dyn SubmissionEngine>> {
        self.submission.get(name).map(|factory| factory())
    }

    /// Instantiate the execution engine registered under `name`.
    pub fn execution_engine(&self, name: &str) -> Option<Arc<dyn ExecutionEngine>> {
        self.execution.get(name).map(|factory| factory())
    }
}

/// Registered connectors, keyed by connector name.
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under its own name, replacing any previous
    /// registration.
    pub fn register(&mut self, connector: Arc<dyn Connector>) {
        self.connectors
            .insert(connector.name().to_string(), connector);
    }

    /// Look up a connector by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.get(name).cloned()
    }

    /// Names of all registered connectors.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.connectors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockExecutionEngine, MockSubmissionEngine};
    use datalift_spi::callbacks::Callbacks;
    use datalift_spi::forms::FormSchema;
    use datalift_spi::job::JobDirection;

    #[test]
    fn test_engine_resolution_by_name() {
        let mut registry = EngineRegistry::new();
        registry.register_submission_engine("mock", || Arc::new(MockSubmissionEngine::new()));
        registry.register_execution_engine("mock", || Arc::new(MockExecutionEngine::new()));

        assert!(registry.submission_engine("mock").is_some());
        assert!(registry.execution_engine("mock").is_some());
        assert!(registry.submission_engine("spark").is_none());
        assert!(registry.execution_engine("spark").is_none());
    }

    #[test]
    fn test_factory_can_share_one_instance() {
        let shared = Arc::new(MockSubmissionEngine::new());
        let mut registry = EngineRegistry::new();
        let handle = shared.clone();
        registry.register_submission_engine("mock", move || handle.clone());

        let resolved = registry.submission_engine("mock").unwrap();
        assert_eq!(Arc::strong_count(&shared), 3);
        drop(resolved);
    }

    struct NamedConnector(&'static str);

    impl Connector for NamedConnector {
        fn name(&self) -> &str {
            self.0
        }

        fn connection_schema(&self) -> FormSchema {
            FormSchema::default()
        }

        fn job_schema(&self, _direction: JobDirection) -> Option<FormSchema> {
            None
        }

        fn importer(&self) -> Option<Callbacks> {
            None
        }

        fn exporter(&self) -> Option<Callbacks> {
            None
        }
    }

    #[test]
    fn test_connector_registry_keyed_by_name() {
        let mut registry = ConnectorRegistry::new();
        registry.register(Arc::new(NamedConnector("jdbc")));
        registry.register(Arc::new(NamedConnector("files")));

        assert!(registry.get("jdbc").is_some());
        assert!(registry.get("files").is_some());
        assert!(registry.get("kafka").is_none());
        assert_eq!(registry.names().count(), 2);
    }
}
