// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Connector-supplied submission lifecycle callbacks.
//!
//! A connector hands the manager a [`Callbacks`] pair per transfer
//! direction. The initializer runs before a job is handed to the submission
//! engine; it may stage resources, write into the per-attempt context, and
//! report extra artifacts the remote side must ship. The destroyer runs when
//! the submission never made it onto the cluster, so that whatever the
//! initializer set up is torn down symmetrically.
//!
//! Callbacks are carried as factories rather than instances: one submission
//! attempt gets one fresh initializer and, if needed, one fresh destroyer.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::context::MutableContext;

/// Errors raised by connector callbacks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CallbackError {
    /// The callback could not complete its work.
    #[error("Callback failed: {0}")]
    Failed(String),

    /// I/O against staged resources failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration payload could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for callback operations.
pub type Result<T> = std::result::Result<T, CallbackError>;

/// Runs on the connector's behalf before a submission is handed over.
#[async_trait]
pub trait Initializer: Send + Sync {
    /// Prepare the connector side of the submission.
    ///
    /// `connection` and `job` are the materialized connector-side
    /// configuration objects for this attempt.
    async fn initialize(
        &self,
        ctx: &mut MutableContext,
        connection: &Value,
        job: &Value,
    ) -> Result<()>;

    /// Extra artifacts the remote execution environment must stage for this
    /// attempt. Called after [`initialize`](Self::initialize).
    fn artifacts(&self, ctx: &MutableContext, connection: &Value, job: &Value) -> Vec<String> {
        let _ = (ctx, connection, job);
        Vec::new()
    }
}

/// Runs when a submission failed to reach the cluster.
#[async_trait]
pub trait Destroyer: Send + Sync {
    /// Tear down whatever the initializer staged for this attempt.
    async fn run(&self, ctx: &MutableContext) -> Result<()>;
}

type InitializerFactory = Arc<dyn Fn() -> Box<dyn Initializer> + Send + Sync>;
type DestroyerFactory = Arc<dyn Fn() -> Box<dyn Destroyer> + Send + Sync>;

/// The callback pair a connector supplies for one transfer direction.
///
/// Either factory may be absent; the manager treats a missing factory as a
/// fatal per-submission error.
#[derive(Clone, Default)]
pub struct Callbacks {
    initializer: Option<InitializerFactory>,
    destroyer: Option<DestroyerFactory>,
}

impl Callbacks {
    /// Create an empty callback set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an initializer factory.
    pub fn with_initializer<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Initializer> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(factory));
        self
    }

    /// Attach a destroyer factory.
    pub fn with_destroyer<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Destroyer> + Send + Sync + 'static,
    {
        self.destroyer = Some(Arc::new(factory));
        self
    }

    /// Instantiate a fresh initializer, if one is supplied.
    pub fn initializer(&self) -> Option<Box<dyn Initializer>> {
        self.initializer.as_ref().map(|f| f())
    }

    /// Instantiate a fresh destroyer, if one is supplied.
    pub fn destroyer(&self) -> Option<Box<dyn Destroyer>> {
        self.destroyer.as_ref().map(|f| f())
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("initializer", &self.initializer.is_some())
            .field("destroyer", &self.destroyer.is_some())
            .finish()
    }
}
