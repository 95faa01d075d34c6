//! The operation service client that [`Operation`](crate::Operation) polls through.
//!
//! [`OperationClient`] is the seam: an [`Operation`](crate::Operation) holds an
//! `Arc<dyn OperationClient>` handed to it at construction and never reaches
//! for a global. [`GrpcOperationClient`] is the production implementation over
//! a tonic channel; [`MockOperationClient`](crate::testing::MockOperationClient)
//! is the scripted one used in tests.

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::generated::operation_service_client::OperationServiceClient;
use crate::generated::{CancelOperationRequest, GetOperationRequest, Operation};

/// Calls of the remote operation service.
///
/// Implementations must be safe to share between concurrently running
/// resource handlers. Responses are returned whole so that response metadata
/// (such as the poll interval hint) reaches the caller.
#[async_trait::async_trait]
pub trait OperationClient: Send + Sync + 'static {
    /// Fetch the current state of an operation.
    async fn get(
        &self,
        request: GetOperationRequest,
    ) -> Result<tonic::Response<Operation>, tonic::Status>;

    /// Request cancellation of an operation.
    async fn cancel(
        &self,
        request: CancelOperationRequest,
    ) -> Result<tonic::Response<Operation>, tonic::Status>;
}

/// [`OperationClient`] backed by the generated tonic client.
#[derive(Debug, Clone)]
pub struct GrpcOperationClient {
    inner: OperationServiceClient<Channel>,
}

impl GrpcOperationClient {
    /// Wrap an existing channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: OperationServiceClient::new(channel),
        }
    }

    /// Build a lazily connecting channel from configuration.
    ///
    /// No network traffic happens until the first call.
    pub fn connect(config: &ClientConfig) -> Result<Self, ConfigError> {
        let endpoint = Endpoint::from_shared(config.endpoint.clone())?
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs));

        debug!(endpoint = %config.endpoint, "Created operation service channel");
        Ok(Self::new(endpoint.connect_lazy()))
    }
}

#[async_trait::async_trait]
impl OperationClient for GrpcOperationClient {
    async fn get(
        &self,
        request: GetOperationRequest,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        let mut inner = self.inner.clone();
        inner.get(request).await
    }

    async fn cancel(
        &self,
        request: CancelOperationRequest,
    ) -> Result<tonic::Response<Operation>, tonic::Status> {
        let mut inner = self.inner.clone();
        inner.cancel(request).await
    }
}
