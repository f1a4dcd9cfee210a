// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Datalift SPI - Connector Contracts
//!
//! This crate defines everything a connector author needs to plug a data
//! source or sink into the Datalift transfer service:
//!
//! - [`connector::Connector`]: the driver contract. A connector names itself,
//!   describes its user-facing configuration as form schemas, and supplies
//!   per-direction lifecycle callbacks.
//! - [`forms`]: form schemas and the structural materialization of stored
//!   form values into configuration objects.
//! - [`callbacks`]: the [`callbacks::Initializer`] / [`callbacks::Destroyer`]
//!   pair that runs on the connector's behalf around a submission attempt.
//! - [`context`]: string key/value contexts handed to engines and callbacks.
//! - [`job`]: the transfer direction (import or export).
//!
//! The crate is deliberately small and dependency-light; it is compiled into
//! every connector as well as into the core manager.

#![deny(missing_docs)]

/// String key/value configuration contexts.
pub mod context;

/// Form schemas, stored form values, and structural materialization.
pub mod forms;

/// Transfer direction of a job.
pub mod job;

/// Connector-supplied submission lifecycle callbacks.
pub mod callbacks;

/// The connector driver contract.
pub mod connector;

pub use callbacks::{Callbacks, Destroyer, Initializer};
pub use connector::Connector;
pub use context::{Context, MutableContext};
pub use forms::{Form, FormError, FormInput, FormSchema, FormValues, InputKind};
pub use job::JobDirection;
