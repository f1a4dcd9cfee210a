// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Datalift Core - Job Submission Management
//!
//! This crate provides the submission manager for the Datalift transfer
//! service: a long-lived component that accepts import/export job
//! definitions, hands them to a pluggable execution backend for remote
//! execution on a cluster, and tracks their lifecycle by polling the
//! backend and persisting state in a repository.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Embedding Server                           │
//! │                  (submit / stop / status calls)                  │
//! └──────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                  SubmissionManager (this crate)                  │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌────────────┐  │
//! │  │ Submission │  │ Execution  │  │   Update   │  │   Purge    │  │
//! │  │   Engine   │  │   Engine   │  │   Worker   │  │   Worker   │  │
//! │  └────────────┘  └────────────┘  └────────────┘  └────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//!        │ ship                │ shape               │ poll / prune
//!        ▼                     ▼                     ▼
//! ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐
//! │ Remote cluster │  │   Connectors   │  │       Repository       │
//! └────────────────┘  └────────────────┘  └────────────────────────┘
//! ```
//!
//! Two orthogonal engine families are resolved by name from configuration
//! and paired at start-up: the execution engine shapes each submission
//! request, the submission engine carries it to the cluster and answers
//! status questions afterwards. The pairing is compatibility-checked; an
//! incompatible pair fails start-up.
//!
//! # Submission Status State Machine
//!
//! ```text
//!                      submit
//!                        │
//!            rejected ───┼─── accepted
//!                │       │       │
//!                ▼       │       ▼
//!     ┌───────────────┐  │  ┌─────────┐
//!     │FAILURE_ON_    │  │  │ BOOTING │
//!     │SUBMIT         │  │  └────┬────┘
//!     └───────────────┘  │       │
//!                        │       ▼
//!                        │  ┌─────────┐
//!                        │  │ RUNNING │────────────┐
//!                        │  └────┬────┘            │
//!                        │       │                 │
//!                        │   complete           fail/stop
//!                        │       │                 │
//!                        │       ▼                 ▼
//!                        │ ┌───────────┐      ┌────────┐
//!                        │ │ SUCCEEDED │      │ FAILED │
//!                        │ └───────────┘      └────────┘
//! ```
//!
//! `NEVER_EXECUTED` is transient (returned for jobs with no submission,
//! never persisted) and `UNKNOWN` covers remote states the engine cannot
//! classify. Every transition except the rejected edge is dictated by the
//! submission engine's reported status.
//!
//! # Modules
//!
//! - [`config`]: Manager configuration from environment variables
//! - [`configuration`]: The framework's own form surfaces
//! - [`engine`]: Engine SPIs, the submission request, and mock engines
//! - [`error`]: Error types with the stable error-code taxonomy
//! - [`manager`]: The submission manager itself
//! - [`model`]: Persisted model types
//! - [`registry`]: Build-time engine and connector registries
//! - [`repository`]: The repository trait and the in-memory backend

#![deny(missing_docs)]

/// Manager configuration loaded from environment variables.
pub mod config;

/// The framework's own configuration surfaces.
pub mod configuration;

/// Engine SPIs, the submission request, and mock engines.
pub mod engine;

/// Error types for manager operations.
pub mod error;

/// The submission manager: lifecycle and the submit/stop/status surface.
pub mod manager;

/// Persisted model types.
pub mod model;

/// Build-time engine and connector registries.
pub mod registry;

/// Repository abstraction and the in-memory backend.
pub mod repository;

mod purge_worker;
mod update_worker;

pub use config::Config;
pub use error::{Error, Result};
pub use manager::SubmissionManager;
