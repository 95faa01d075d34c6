//! Testing utilities for code that drives operations.
//!
//! [`MockOperationClient`] replays scripted replies instead of talking to the
//! operation service, and records every call with its (tokio) timestamp so
//! poll cadence can be asserted under `#[tokio::test(start_paused = true)]`.
//!
//! # Example
//!
//! ```ignore
//! use cloud_operation_sdk::testing::{fixtures, MockOperationClient, MockReply};
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_create_cluster() {
//!     let mock = Arc::new(MockOperationClient::new());
//!     mock.push_get(MockReply::operation(fixtures::pending("op1"))).await;
//!     mock.push_get(MockReply::operation(fixtures::succeeded("op1", &cluster))).await;
//!
//!     let runner = OperationRunner::new(mock.clone());
//!     // ...
//! }
//! ```

use std::collections::VecDeque;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tonic::metadata::{Ascii, MetadataValue};

use crate::client::OperationClient;
use crate::diagnostics::{has_errors, Diagnostic};
use crate::generated::{CancelOperationRequest, GetOperationRequest, Operation};
use crate::operation::POLL_INTERVAL_METADATA_KEY;

/// A scripted reply of [`MockOperationClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this operation snapshot.
    Operation {
        /// The snapshot.
        operation: Operation,
        /// Value of the poll interval response header, if any.
        poll_interval: Option<MetadataValue<Ascii>>,
    },
    /// Fail the call with this status.
    Error(tonic::Status),
    /// Never answer; the call only ends when the caller gives up.
    Hang,
}

impl MockReply {
    /// Reply with `operation` and no poll interval hint.
    pub fn operation(operation: Operation) -> Self {
        Self::Operation {
            operation,
            poll_interval: None,
        }
    }

    /// Attach a poll interval hint. Has no effect on non-operation replies.
    pub fn with_poll_interval(self, value: MetadataValue<Ascii>) -> Self {
        match self {
            Self::Operation { operation, .. } => Self::Operation {
                operation,
                poll_interval: Some(value),
            },
            other => other,
        }
    }

    async fn into_response(self) -> Result<tonic::Response<Operation>, tonic::Status> {
        match self {
            Self::Operation {
                operation,
                poll_interval,
            } => {
                let mut response = tonic::Response::new(operation);
                if let Some(value) = poll_interval {
                    response
                        .metadata_mut()
                        .insert(POLL_INTERVAL_METADATA_KEY, value);
                }
                Ok(response)
            }
            Self::Error(status) => Err(status),
            Self::Hang => std::future::pending().await,
        }
    }
}

/// A recorded call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// The operation id the call was made for.
    pub operation_id: String,
    /// When the call was made.
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MockState {
    get_replies: VecDeque<MockReply>,
    cancel_replies: VecDeque<MockReply>,
    get_calls: Vec<MockCall>,
    cancel_calls: Vec<MockCall>,
}

/// [`OperationClient`] that replays scripted replies in order.
///
/// A call with no scripted reply left fails with `Internal`.
#[derive(Debug, Default)]
pub struct MockOperationClient {
    state: Mutex<MockState>,
}

impl MockOperationClient {
    /// Create a client with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next `Get` call.
    pub async fn push_get(&self, reply: MockReply) {
        self.state.lock().await.get_replies.push_back(reply);
    }

    /// Queue a reply for the next `Cancel` call.
    pub async fn push_cancel(&self, reply: MockReply) {
        self.state.lock().await.cancel_replies.push_back(reply);
    }

    /// `Get` calls made so far.
    pub async fn get_calls(&self) -> Vec<MockCall> {
        self.state.lock().await.get_calls.clone()
    }

    /// `Cancel` calls made so far.
    pub async fn cancel_calls(&self) -> Vec<MockCall> {
        self.state.lock().await.cancel_calls.clone()
    }

    /// Number of scripted replies not consumed yet.
    pub async fn remaining(&self) -> usize {
        let state = self.state.lock().await;
        state.get_replies.len() + state.cancel_replies.len()
    }
}

fn unscripted(method: &str, id: &str) -> MockReply {
    MockReply::Error(tonic::Status::internal(format!(
        "no scripted {} reply for operation {}",
        method, id
    )))
}

#[async_trait::async_trait]
impl OperationClient for MockOperationClient {
    async fn get(
        &self,
        request: GetOperationRequest,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        let reply = {
            let mut state = self.state.lock().await;
            state.get_calls.push(MockCall {
                operation_id: request.operation_id.clone(),
                at: Instant::now(),
            });
            state
                .get_replies
                .pop_front()
                .unwrap_or_else(|| unscripted("Get", &request.operation_id))
        };
        reply.into_response().await
    }

    async fn cancel(
        &self,
        request: CancelOperationRequest,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        let reply = {
            let mut state = self.state.lock().await;
            state.cancel_calls.push(MockCall {
                operation_id: request.operation_id.clone(),
                at: Instant::now(),
            });
            state
                .cancel_replies
                .pop_front()
                .unwrap_or_else(|| unscripted("Cancel", &request.operation_id))
        };
        reply.into_response().await
    }
}

/// Error returned by [`check_diagnostics`].
#[derive(Debug)]
pub struct TestError {
    /// The error diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "diagnostics contain errors:")?;
        for diag in &self.diagnostics {
            write!(f, "  - {}", diag.summary)?;
            if let Some(detail) = &diag.detail {
                write!(f, ": {}", detail)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl std::error::Error for TestError {}

/// `Ok(())` unless `diagnostics` contains an error.
pub fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    if has_errors(&diagnostics) {
        Err(TestError {
            diagnostics: diagnostics
                .into_iter()
                .filter(Diagnostic::is_error)
                .collect(),
        })
    } else {
        Ok(())
    }
}

/// Builders for operation snapshots.
pub mod fixtures {
    use prost::{Message, Name};

    use crate::generated::operation::Result as OperationResult;
    use crate::generated::{Operation, Status};

    /// A small resource message used as an operation payload.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TestResource {
        /// Resource id.
        #[prost(string, tag = "1")]
        pub id: String,
        /// Resource name.
        #[prost(string, tag = "2")]
        pub name: String,
    }

    impl Name for TestResource {
        const NAME: &'static str = "TestResource";
        const PACKAGE: &'static str = "cloud.testing.v1";
    }

    impl TestResource {
        /// A resource whose id is derived from `name`.
        pub fn named(name: &str) -> Self {
            Self {
                id: format!("{}-id", name),
                name: name.to_string(),
            }
        }
    }

    /// Pack `message` into an `Any`.
    pub fn any<M: Message + Name>(message: &M) -> prost_types::Any {
        prost_types::Any {
            type_url: M::type_url(),
            value: message.encode_to_vec(),
        }
    }

    /// A running operation.
    pub fn pending(id: &str) -> Operation {
        Operation {
            id: id.to_string(),
            description: format!("test operation {}", id),
            created_by: "test-user".to_string(),
            created_at: Some(prost_types::Timestamp {
                seconds: 1_700_000_000,
                nanos: 0,
            }),
            ..Default::default()
        }
    }

    /// An operation that finished with `response`.
    pub fn succeeded<M: Message + Name>(id: &str, response: &M) -> Operation {
        Operation {
            done: true,
            result: Some(OperationResult::Response(any(response))),
            ..pending(id)
        }
    }

    /// An operation that finished with an error.
    pub fn failed(id: &str, code: tonic::Code, message: &str) -> Operation {
        Operation {
            done: true,
            result: Some(OperationResult::Error(Status {
                code: code as i32,
                message: message.to_string(),
                details: vec![],
            })),
            ..pending(id)
        }
    }
}
