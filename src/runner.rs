//! The call-then-wait sequence shared by resource handlers.
//!
//! Every create, update and delete handler does the same thing: call the API,
//! wrap the returned operation, wait on it, maybe decode the response, and
//! report any failure to the host as a diagnostic. [`OperationRunner`] does
//! that once.
//!
//! ```ignore
//! let runner = OperationRunner::from_config(client, &config);
//! let cluster: Cluster = runner
//!     .run_for_response(&ctx, "create cluster", clusters.create(request))
//!     .await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use prost::{Message, Name};
use tracing::{info, instrument, warn};

use crate::batch::Operations;
use crate::client::OperationClient;
use crate::config::ClientConfig;
use crate::context::Context;
use crate::diagnostics::Diagnostic;
use crate::error::OperationError;
use crate::generated as proto;
use crate::operation::{Operation, DEFAULT_POLL_INTERVAL};

/// Runs API calls that return operations and waits on them.
#[derive(Clone)]
pub struct OperationRunner {
    client: Arc<dyn OperationClient>,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for OperationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRunner")
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OperationRunner {
    /// A runner with the default poll interval and no timeout.
    pub fn new(client: Arc<dyn OperationClient>) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }

    /// A runner using the poll interval and timeout from `config`.
    pub fn from_config(client: Arc<dyn OperationClient>, config: &ClientConfig) -> Self {
        Self {
            client,
            poll_interval: config.poll_interval(),
            timeout: config.operation_timeout(),
        }
    }

    /// Override the default poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bound how long a single wait may take.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The client operations are followed through.
    pub fn client(&self) -> Arc<dyn OperationClient> {
        Arc::clone(&self.client)
    }

    /// Wrap an operation snapshot obtained elsewhere.
    pub fn operation(&self, proto: proto::Operation) -> Operation {
        Operation::new(self.client(), proto)
    }

    fn wait_context(&self, ctx: &Context) -> Context {
        match self.timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx.child(),
        }
    }

    /// Make the API call `call` and wait for the operation it starts.
    ///
    /// `action` describes the call for diagnostics, e.g. `"create cluster"`.
    #[instrument(skip(self, ctx, call), name = "operation.run")]
    pub async fn run<F>(&self, ctx: &Context, action: &str, call: F) -> Result<Operation, Diagnostic>
    where
        F: Future<Output = Result<tonic::Response<proto::Operation>, tonic::Status>> + Send,
    {
        let result = ctx.run(call).await.map_err(|err| {
            Diagnostic::from_error(&format!("Error while requesting API to {}", action), &err)
        })?;
        let mut op = Operation::wrap(self.client(), result).map_err(|err| {
            warn!(error = %err, "API call failed");
            Diagnostic::from_error(&format!("Error while requesting API to {}", action), &err)
        })?;

        let wait_ctx = self.wait_context(ctx);
        if let Err(err) = op.wait_interval(&wait_ctx, self.poll_interval).await {
            warn!(operation_id = %op.id(), error = %err, "Operation did not succeed");
            return Err(Diagnostic::from_error(
                &format!("Error while waiting operation to {}", action),
                &err,
            )
            .with_detail(format!("operation id: {}", op.id())));
        }

        info!(operation_id = %op.id(), "Operation finished");
        Ok(op)
    }

    /// Like [`OperationRunner::run`], then decode the operation's response as `T`.
    pub async fn run_for_response<T, F>(
        &self,
        ctx: &Context,
        action: &str,
        call: F,
    ) -> Result<T, Diagnostic>
    where
        T: Message + Name + Default,
        F: Future<Output = Result<tonic::Response<proto::Operation>, tonic::Status>> + Send,
    {
        let op = self.run(ctx, action, call).await?;
        op.response::<T>().map_err(|err| {
            Diagnostic::from_error(&format!("Error while decoding response of {}", action), &err)
                .with_detail(format!("operation id: {}", op.id()))
        })
    }

    /// Wait for several already started operations.
    #[instrument(skip(self, ctx, operations), name = "operation.wait_all")]
    pub async fn wait_all(
        &self,
        ctx: &Context,
        action: &str,
        operations: &mut Operations,
    ) -> Result<(), Diagnostic> {
        let wait_ctx = self.wait_context(ctx);
        operations
            .wait_interval(&wait_ctx, self.poll_interval)
            .await
            .map_err(|err: OperationError| {
                Diagnostic::from_error(&format!("Error while waiting operations to {}", action), &err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockOperationClient, MockReply};

    fn runner(mock: &Arc<MockOperationClient>) -> OperationRunner {
        OperationRunner::new(mock.clone())
    }

    async fn started(id: &str) -> Result<tonic::Response<proto::Operation>, tonic::Status> {
        Ok(tonic::Response::new(fixtures::pending(id)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_for_response() {
        let mock = Arc::new(MockOperationClient::new());
        mock.push_get(MockReply::operation(fixtures::pending("op1")))
            .await;
        mock.push_get(MockReply::operation(fixtures::succeeded(
            "op1",
            &fixtures::TestResource::named("analytics"),
        )))
        .await;

        let resource: fixtures::TestResource = runner(&mock)
            .run_for_response(&Context::new(), "create cluster", started("op1"))
            .await
            .unwrap();

        assert_eq!(resource.name, "analytics");
        assert_eq!(resource.id, "analytics-id");
    }

    #[tokio::test]
    async fn test_request_failure_diagnostic() {
        let mock = Arc::new(MockOperationClient::new());
        let call = async {
            Err::<tonic::Response<proto::Operation>, _>(tonic::Status::invalid_argument(
                "name is too long",
            ))
        };

        let diag = runner(&mock)
            .run(&Context::new(), "create cluster", call)
            .await
            .unwrap_err();

        assert!(diag.is_error());
        assert_eq!(
            diag.summary,
            "Error while requesting API to create cluster: rpc error: name is too long"
        );
        assert!(mock.get_calls().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_failure_diagnostic() {
        let mock = Arc::new(MockOperationClient::new());
        mock.push_get(MockReply::operation(fixtures::failed(
            "op1",
            tonic::Code::FailedPrecondition,
            "cluster is stopped",
        )))
        .await;

        let diag = runner(&mock)
            .run(&Context::new(), "update cluster", started("op1"))
            .await
            .unwrap_err();

        assert_eq!(
            diag.summary,
            "Error while waiting operation to update cluster: operation op1 failed: cluster is stopped"
        );
        assert_eq!(diag.detail.as_deref(), Some("operation id: op1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let mock = Arc::new(MockOperationClient::new());
        for _ in 0..100 {
            mock.push_get(MockReply::operation(fixtures::pending("op1")))
                .await;
        }

        let diag = runner(&mock)
            .with_poll_interval(Duration::from_secs(10))
            .with_timeout(Duration::from_secs(35))
            .run(&Context::new(), "delete cluster", started("op1"))
            .await
            .unwrap_err();

        assert!(diag.summary.ends_with("context deadline exceeded"));
        assert_eq!(mock.get_calls().await.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_type_mismatch_diagnostic() {
        let mock = Arc::new(MockOperationClient::new());
        mock.push_get(MockReply::operation(fixtures::succeeded(
            "op1",
            &fixtures::TestResource::named("analytics"),
        )))
        .await;

        let diag = runner(&mock)
            .run_for_response::<proto::Status, _>(&Context::new(), "create cluster", started("op1"))
            .await
            .unwrap_err();

        assert!(diag
            .summary
            .starts_with("Error while decoding response of create cluster: decode error: type mismatch"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_all() {
        let mock = Arc::new(MockOperationClient::new());
        mock.push_get(MockReply::operation(fixtures::failed(
            "op1",
            tonic::Code::Internal,
            "disk failure",
        )))
        .await;
        mock.push_get(MockReply::operation(fixtures::succeeded(
            "op2",
            &fixtures::TestResource::named("b"),
        )))
        .await;

        let runner = runner(&mock);
        let mut ops: Operations = ["op1", "op2"]
            .into_iter()
            .map(|id| runner.operation(fixtures::pending(id)))
            .collect();

        let diag = runner
            .wait_all(&Context::new(), "create hosts", &mut ops)
            .await
            .unwrap_err();

        assert!(diag
            .summary
            .starts_with("Error while waiting operations to create hosts: 1 error occurred:"));
        assert!(diag.summary.contains("operation op1: operation op1 failed: disk failure"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_while_requesting() {
        let mock = Arc::new(MockOperationClient::new());
        let ctx = Context::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            canceller.cancel();
        });

        let call = std::future::pending::<Result<tonic::Response<proto::Operation>, tonic::Status>>();
        let diag = runner(&mock)
            .run(&ctx, "create cluster", call)
            .await
            .unwrap_err();

        assert!(diag.summary.starts_with("Error while requesting API to create cluster"));
        assert!(diag.summary.ends_with("context canceled"));
        assert!(mock.get_calls().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_timeout_waits_without_deadline() {
        let mock = Arc::new(MockOperationClient::new());
        mock.push_get(MockReply::operation(fixtures::pending("op1")))
            .await;
        mock.push_get(MockReply::operation(fixtures::succeeded(
            "op1",
            &fixtures::TestResource::named("analytics"),
        )))
        .await;

        let config = ClientConfig {
            operation_timeout_secs: Some(u64::MAX),
            ..ClientConfig::default()
        };
        let op = OperationRunner::from_config(mock.clone(), &config)
            .run(&Context::new(), "create cluster", started("op1"))
            .await
            .unwrap();

        assert!(op.ok());
        assert_eq!(mock.get_calls().await.len(), 2);
    }

    #[test]
    fn test_from_config() {
        let mock = Arc::new(MockOperationClient::new());
        let config = ClientConfig {
            poll_interval_secs: 3,
            operation_timeout_secs: Some(600),
            ..ClientConfig::default()
        };
        let runner = OperationRunner::from_config(mock, &config);

        assert_eq!(runner.poll_interval, Duration::from_secs(3));
        assert_eq!(runner.timeout, Some(Duration::from_secs(600)));
    }
}
