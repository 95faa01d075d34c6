//! Cloud Operation SDK
//!
//! Long-running operation support for cloud provider plugins. Nearly every
//! mutating call of the cloud API returns an *operation*: a server-side job
//! that is tracked by id and eventually becomes done with either a response
//! payload or an error. This crate follows those operations on behalf of
//! resource handlers.
//!
//! # Overview
//!
//! - **[`Operation`]**: a handle over an operation snapshot, with `poll`,
//!   `cancel`, `wait` and typed decoding of the metadata/response payloads
//! - **[`Operations`]**: batch wait/cancel that aggregates per-operation errors
//! - **[`Context`]**: cancellation and deadlines for every blocking call
//! - **[`OperationClient`]**: the injected RPC capability, with a tonic
//!   implementation ([`GrpcOperationClient`]) and a scripted one
//!   ([`testing::MockOperationClient`])
//! - **[`OperationRunner`]**: call, wait, decode and report as a host diagnostic
//! - **Configuration** and **logging** helpers for the provider process
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use cloud_operation_sdk::{ClientConfig, Context, GrpcOperationClient, OperationRunner};
//!
//! let config = ClientConfig::from_value(provider_block)?.with_env_overrides()?;
//! let client = Arc::new(GrpcOperationClient::connect(&config)?);
//! let runner = OperationRunner::from_config(client, &config);
//!
//! let ctx = Context::new();
//! let cluster: Cluster = runner
//!     .run_for_response(&ctx, "create cluster", clusters.create(request))
//!     .await?;
//! ```
//!
//! # Waiting semantics
//!
//! - `NotFound` right after creation is retried up to
//!   [`MAX_NOT_FOUND_RETRIES`] consecutive times
//! - the service may set the next poll delay through the
//!   [`POLL_INTERVAL_METADATA_KEY`] response header
//! - a poll failure ([`OperationError::Poll`]) is a different error kind from
//!   the operation's own failure ([`OperationError::Failed`])
//! - cancellation of the [`Context`] always wins, also over errors collected
//!   by a batch

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod client;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod operation;
pub mod runner;
pub mod testing;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

// Re-export main types at crate root
pub use batch::Operations;
pub use client::{GrpcOperationClient, OperationClient};
pub use config::ClientConfig;
pub use context::Context;
pub use diagnostics::{has_errors, Diagnostic, DiagnosticSeverity};
pub use error::{BatchError, ConfigError, ContextError, DecodeError, OperationError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use operation::{
    Operation, DEFAULT_POLL_INTERVAL, MAX_NOT_FOUND_RETRIES, POLL_INTERVAL_METADATA_KEY,
};
pub use runner::OperationRunner;

// Re-export async_trait for implementing OperationClient
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use prost;
pub use prost_types;
pub use serde_json;
pub use tonic;
pub use tracing;
