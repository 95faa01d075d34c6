//! Error types for the operation SDK.

use std::fmt;

use thiserror::Error;

/// Why a [`Context`](crate::context::Context) stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context was cancelled by its owner.
    #[error("context canceled")]
    Cancelled,

    /// The context's deadline elapsed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Failure to decode an operation's `Any` payload into a concrete message.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not set.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// The payload carries a different message type than requested.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Type URL of the requested message.
        expected: String,
        /// Type URL carried by the payload.
        actual: String,
    },

    /// The payload type matches but its bytes do not decode.
    #[error("malformed payload: {0}")]
    Malformed(#[from] prost::DecodeError),
}

/// Errors produced while driving a long-running operation.
#[derive(Debug, Error)]
pub enum OperationError {
    /// A single `Get`/`Cancel` call or the call that started the operation failed.
    #[error("rpc error: {}", .0.message())]
    Rpc(tonic::Status),

    /// Polling gave up while waiting; the operation's own outcome is unknown.
    #[error("poll fail: operation {id}: {}", .source.message())]
    Poll {
        /// Operation being waited on.
        id: String,
        /// The last poll failure.
        #[source]
        source: tonic::Status,
    },

    /// The operation completed with an error.
    #[error("operation {id} failed: {message}")]
    Failed {
        /// Operation id.
        id: String,
        /// Status code reported by the service.
        code: tonic::Code,
        /// Status message reported by the service.
        message: String,
        /// Structured error details.
        details: Vec<prost_types::Any>,
    },

    /// The governing context was cancelled or timed out.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// A payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A result was requested from an operation that is still running.
    #[error("operation {0} is not done")]
    NotDone(String),

    /// One or more operations in a batch failed.
    #[error(transparent)]
    Batch(#[from] BatchError),
}

impl OperationError {
    /// Returns true if the error comes from the governing context.
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context(_))
    }

    /// Returns true if this is the operation's own terminal error.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns true if the failure is a polling/transport failure.
    pub fn is_poll(&self) -> bool {
        matches!(self, Self::Poll { .. })
    }

    /// The gRPC code most closely describing this error.
    pub fn code(&self) -> tonic::Code {
        match self {
            Self::Rpc(status) => status.code(),
            Self::Poll { source, .. } => source.code(),
            Self::Failed { code, .. } => *code,
            Self::Context(ContextError::Cancelled) => tonic::Code::Cancelled,
            Self::Context(ContextError::DeadlineExceeded) => tonic::Code::DeadlineExceeded,
            Self::Decode(_) => tonic::Code::Internal,
            Self::NotDone(_) => tonic::Code::FailedPrecondition,
            Self::Batch(_) => tonic::Code::Aborted,
        }
    }
}

impl From<tonic::Status> for OperationError {
    fn from(status: tonic::Status) -> Self {
        Self::Rpc(status)
    }
}

impl From<OperationError> for tonic::Status {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::Rpc(status) => status,
            OperationError::Failed { code, message, .. } => tonic::Status::new(code, message),
            other => tonic::Status::new(other.code(), other.to_string()),
        }
    }
}

/// A failed member of a batch, tagged with its operation id.
#[derive(Debug)]
pub struct BatchEntry {
    /// Operation id.
    pub id: String,
    /// What went wrong.
    pub error: OperationError,
}

/// Aggregate of the per-operation failures of a batch.
#[derive(Debug, Default)]
pub struct BatchError {
    /// Failures in the order the operations were visited.
    pub errors: Vec<BatchEntry>,
}

impl BatchError {
    pub(crate) fn push(&mut self, id: impl Into<String>, error: OperationError) {
        self.errors.push(BatchEntry {
            id: id.into(),
            error,
        });
    }

    /// Number of failed operations.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if no operation failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ids of the failed operations.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.id.as_str())
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            1 => write!(f, "1 error occurred:")?,
            n => write!(f, "{} errors occurred:", n)?,
        }
        for entry in &self.errors {
            write!(f, "\n\t* operation {}: {}", entry.id, entry.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

/// Errors loading or applying client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration is invalid.
    #[error("Configuration error: {0}")]
    Invalid(String),

    /// The configuration could not be deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The endpoint could not be turned into a gRPC channel.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(id: &str) -> OperationError {
        OperationError::Failed {
            id: id.to_string(),
            code: tonic::Code::FailedPrecondition,
            message: "disk is busy".to_string(),
            details: vec![],
        }
    }

    #[test]
    fn test_error_display() {
        let err = OperationError::Poll {
            id: "op1".to_string(),
            source: tonic::Status::unavailable("connection reset"),
        };
        assert_eq!(err.to_string(), "poll fail: operation op1: connection reset");

        assert_eq!(failed("op2").to_string(), "operation op2 failed: disk is busy");

        let err = OperationError::from(ContextError::Cancelled);
        assert_eq!(err.to_string(), "context canceled");
    }

    #[test]
    fn test_poll_and_failed_are_distinct_kinds() {
        let poll = OperationError::Poll {
            id: "op1".to_string(),
            source: tonic::Status::failed_precondition("disk is busy"),
        };
        let business = failed("op1");

        assert_eq!(poll.code(), business.code());
        assert!(poll.is_poll() && !poll.is_failed());
        assert!(business.is_failed() && !business.is_poll());
    }

    #[test]
    fn test_error_to_status() {
        let status: tonic::Status = failed("op1").into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);
        assert_eq!(status.message(), "disk is busy");

        let status: tonic::Status = OperationError::from(ContextError::DeadlineExceeded).into();
        assert_eq!(status.code(), tonic::Code::DeadlineExceeded);

        let status: tonic::Status = OperationError::NotDone("op1".to_string()).into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);

        let status: tonic::Status = OperationError::Rpc(tonic::Status::not_found("op1")).into();
        assert_eq!(status.code(), tonic::Code::NotFound);
    }

    #[test]
    fn test_batch_error_display() {
        let mut batch = BatchError::default();
        batch.push("op1", failed("op1"));
        batch.push(
            "op2",
            OperationError::Poll {
                id: "op2".to_string(),
                source: tonic::Status::internal("boom"),
            },
        );

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.ids().collect::<Vec<_>>(), vec!["op1", "op2"]);
        assert_eq!(
            batch.to_string(),
            "2 errors occurred:\n\t* operation op1: operation op1 failed: disk is busy\
             \n\t* operation op2: poll fail: operation op2: boom"
        );
    }
}
