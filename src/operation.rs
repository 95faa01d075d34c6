//! Long-running operation handle.
//!
//! Most mutating calls of the cloud API return an [`Operation`](proto::Operation)
//! instead of the final resource. [`Operation`] wraps that snapshot together
//! with the client used to refresh it, and knows how to wait for it to finish.
//!
//! # Waiting
//!
//! [`Operation::wait_interval`] polls until the operation is done:
//!
//! - A `NotFound` poll failure is tolerated up to [`MAX_NOT_FOUND_RETRIES`]
//!   consecutive times, since a freshly created operation may not be visible on
//!   every replica yet. Any other poll failure ends the wait with
//!   [`OperationError::Poll`].
//! - Between polls the delay announced by the service in the
//!   [`POLL_INTERVAL_METADATA_KEY`] response header (whole seconds) takes
//!   precedence over the caller's interval. A non-positive delay re-polls
//!   immediately.
//! - Sleeping goes through [`Context::sleep`], so cancellation ends the wait
//!   right away with [`OperationError::Context`].
//!
//! A finished operation yields `Ok(())` on success and
//! [`OperationError::Failed`] with the service-provided status otherwise.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use prost::{Message, Name};
use tonic::metadata::MetadataMap;
use tracing::{debug, instrument, trace};

use crate::client::OperationClient;
use crate::context::Context;
use crate::error::{DecodeError, OperationError};
use crate::generated as proto;
use crate::generated::operation::Result as OperationResult;

/// Poll interval used by [`Operation::wait`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Consecutive `NotFound` poll failures tolerated while waiting.
pub const MAX_NOT_FOUND_RETRIES: u32 = 3;

/// Response header carrying the service's suggested poll interval in seconds.
pub const POLL_INTERVAL_METADATA_KEY: &str = "x-operation-poll-interval";

/// A server-side asynchronous job and the client used to follow it.
pub struct Operation {
    client: Arc<dyn OperationClient>,
    proto: proto::Operation,
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.proto.id)
            .field("description", &self.proto.description)
            .field("done", &self.proto.done)
            .finish()
    }
}

impl Operation {
    /// Wrap an operation snapshot.
    pub fn new(client: Arc<dyn OperationClient>, proto: proto::Operation) -> Self {
        Self { client, proto }
    }

    /// Wrap the result of an API call that starts an operation.
    ///
    /// A failed call is returned as [`OperationError::Rpc`].
    pub fn wrap(
        client: Arc<dyn OperationClient>,
        result: Result<tonic::Response<proto::Operation>, tonic::Status>,
    ) -> Result<Self, OperationError> {
        let proto = result?.into_inner();
        debug!(operation_id = %proto.id, description = %proto.description, "Started operation");
        Ok(Self::new(client, proto))
    }

    /// Operation id.
    pub fn id(&self) -> &str {
        &self.proto.id
    }

    /// Human readable description set by the service.
    pub fn description(&self) -> &str {
        &self.proto.description
    }

    /// Who started the operation.
    pub fn created_by(&self) -> &str {
        &self.proto.created_by
    }

    /// When the operation was started.
    pub fn created_at(&self) -> Option<SystemTime> {
        self.proto
            .created_at
            .clone()
            .and_then(|ts| SystemTime::try_from(ts).ok())
    }

    /// When the operation last changed.
    pub fn modified_at(&self) -> Option<SystemTime> {
        self.proto
            .modified_at
            .clone()
            .and_then(|ts| SystemTime::try_from(ts).ok())
    }

    /// Whether the operation reached a terminal state.
    pub fn done(&self) -> bool {
        self.proto.done
    }

    /// Done and succeeded.
    pub fn ok(&self) -> bool {
        self.done() && self.error_status().is_none()
    }

    /// Done and failed.
    pub fn failed(&self) -> bool {
        self.done() && self.error_status().is_some()
    }

    /// The raw terminal error, if the operation failed.
    pub fn error_status(&self) -> Option<&proto::Status> {
        match &self.proto.result {
            Some(OperationResult::Error(status)) => Some(status),
            _ => None,
        }
    }

    /// The terminal business error, if the operation failed.
    pub fn error(&self) -> Option<OperationError> {
        self.error_status().map(|status| OperationError::Failed {
            id: self.proto.id.clone(),
            code: tonic::Code::from_i32(status.code),
            message: status.message.clone(),
            details: status.details.clone(),
        })
    }

    /// The undecoded metadata payload.
    pub fn raw_metadata(&self) -> Option<&prost_types::Any> {
        self.proto.metadata.as_ref()
    }

    /// The undecoded response payload.
    pub fn raw_response(&self) -> Option<&prost_types::Any> {
        match &self.proto.result {
            Some(OperationResult::Response(any)) => Some(any),
            _ => None,
        }
    }

    /// Decode the metadata payload as `T`.
    pub fn metadata<T>(&self) -> Result<T, DecodeError>
    where
        T: Message + Name + Default,
    {
        decode_any(self.raw_metadata(), "metadata")
    }

    /// Decode the response payload of a successfully finished operation as `T`.
    pub fn response<T>(&self) -> Result<T, OperationError>
    where
        T: Message + Name + Default,
    {
        if !self.done() {
            return Err(OperationError::NotDone(self.proto.id.clone()));
        }
        if let Some(err) = self.error() {
            return Err(err);
        }
        Ok(decode_any(self.raw_response(), "response")?)
    }

    /// The current snapshot.
    pub fn proto(&self) -> &proto::Operation {
        &self.proto
    }

    /// Consume the handle, returning the current snapshot.
    pub fn into_proto(self) -> proto::Operation {
        self.proto
    }

    /// Refresh the snapshot with a single `Get` call.
    ///
    /// RPC failures are returned as [`OperationError::Rpc`] without retrying.
    #[instrument(skip_all, fields(operation_id = %self.proto.id), name = "operation.poll")]
    pub async fn poll(&mut self, ctx: &Context) -> Result<(), OperationError> {
        self.poll_with_metadata(ctx).await.map(|_| ())
    }

    async fn poll_with_metadata(&mut self, ctx: &Context) -> Result<MetadataMap, OperationError> {
        let request = proto::GetOperationRequest {
            operation_id: self.proto.id.clone(),
        };
        let response = ctx.run(self.client.get(request)).await??;
        let (metadata, proto, _) = response.into_parts();
        trace!(operation_id = %proto.id, done = proto.done, "Polled operation");
        self.proto = proto;
        Ok(metadata)
    }

    /// Request cancellation with a single `Cancel` call.
    ///
    /// On success the snapshot is replaced by the service's post-cancel state;
    /// the operation is not necessarily done yet.
    #[instrument(skip_all, fields(operation_id = %self.proto.id), name = "operation.cancel")]
    pub async fn cancel(&mut self, ctx: &Context) -> Result<(), OperationError> {
        let request = proto::CancelOperationRequest {
            operation_id: self.proto.id.clone(),
        };
        let response = ctx.run(self.client.cancel(request)).await??;
        self.proto = response.into_inner();
        debug!(done = self.proto.done, "Requested operation cancel");
        Ok(())
    }

    /// Wait for the operation using [`DEFAULT_POLL_INTERVAL`].
    pub async fn wait(&mut self, ctx: &Context) -> Result<(), OperationError> {
        self.wait_interval(ctx, DEFAULT_POLL_INTERVAL).await
    }

    /// Wait for the operation, polling every `interval` unless the service
    /// suggests otherwise.
    #[instrument(skip_all, fields(operation_id = %self.proto.id), name = "operation.wait")]
    pub async fn wait_interval(
        &mut self,
        ctx: &Context,
        interval: Duration,
    ) -> Result<(), OperationError> {
        let mut not_found = 0;
        let mut state = if self.done() {
            WaitState::Done
        } else {
            WaitState::Polling
        };

        loop {
            state = match state {
                WaitState::Polling => match self.poll_with_metadata(ctx).await {
                    Ok(_) if self.done() => WaitState::Done,
                    Ok(metadata) => {
                        not_found = 0;
                        WaitState::WaitingInterval(next_poll_interval(&metadata, interval))
                    }
                    Err(OperationError::Rpc(status))
                        if status.code() == tonic::Code::NotFound
                            && not_found < MAX_NOT_FOUND_RETRIES =>
                    {
                        not_found += 1;
                        debug!(
                            attempt = not_found,
                            error = %status.message(),
                            "Operation not found yet, retrying"
                        );
                        WaitState::WaitingInterval(interval)
                    }
                    Err(OperationError::Rpc(status)) => {
                        return Err(OperationError::Poll {
                            id: self.proto.id.clone(),
                            source: status,
                        });
                    }
                    Err(err) => return Err(err),
                },
                WaitState::WaitingInterval(delay) => {
                    if !delay.is_zero() {
                        ctx.sleep(delay).await?;
                    }
                    WaitState::Polling
                }
                WaitState::Done => {
                    return match self.error() {
                        Some(err) => {
                            debug!(error = %err, "Operation failed");
                            Err(err)
                        }
                        None => {
                            debug!("Operation done");
                            Ok(())
                        }
                    };
                }
            };
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitState {
    Polling,
    WaitingInterval(Duration),
    Done,
}

/// Delay before the next poll: the service hint if present and numeric,
/// otherwise `default`. Non-positive hints mean no delay.
fn next_poll_interval(metadata: &MetadataMap, default: Duration) -> Duration {
    let hint = metadata
        .get(POLL_INTERVAL_METADATA_KEY)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok());

    match hint {
        Some(secs) if secs <= 0 => Duration::ZERO,
        Some(secs) => Duration::from_secs(secs as u64),
        None => default,
    }
}

fn decode_any<T>(any: Option<&prost_types::Any>, field: &'static str) -> Result<T, DecodeError>
where
    T: Message + Name + Default,
{
    let any = any.ok_or(DecodeError::Missing(field))?;
    // Only the message name after the last '/' identifies the type; the
    // domain part differs between servers and local prost builds.
    let actual = any.type_url.rsplit('/').next().unwrap_or_default();
    if actual != T::full_name() {
        return Err(DecodeError::TypeMismatch {
            expected: T::type_url(),
            actual: any.type_url.clone(),
        });
    }
    Ok(any.to_msg::<T>()?)
}
