//! Waiting on and cancelling several operations at once.

use std::time::Duration;

use tracing::{debug, instrument};

use crate::context::Context;
use crate::error::{BatchError, OperationError};
use crate::operation::{Operation, DEFAULT_POLL_INTERVAL};

/// An ordered group of operations handled together.
///
/// Failures are collected per operation rather than stopping at the first
/// one. Cancellation of the governing context is the exception: as soon as
/// it is observed the context error is returned and whatever was collected so
/// far is dropped.
#[derive(Debug, Default)]
pub struct Operations(Vec<Operation>);

impl Operations {
    /// Group `operations`, preserving their order.
    pub fn new(operations: Vec<Operation>) -> Self {
        Self(operations)
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append an operation.
    pub fn push(&mut self, operation: Operation) {
        self.0.push(operation);
    }

    /// Iterate over the operations.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.0.iter()
    }

    /// Iterate mutably over the operations.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Operation> {
        self.0.iter_mut()
    }

    /// Ungroup.
    pub fn into_inner(self) -> Vec<Operation> {
        self.0
    }

    /// Wait for every operation using [`DEFAULT_POLL_INTERVAL`].
    pub async fn wait(&mut self, ctx: &Context) -> Result<(), OperationError> {
        self.wait_interval(ctx, DEFAULT_POLL_INTERVAL).await
    }

    /// Wait for every operation in order.
    #[instrument(skip_all, fields(operations = self.0.len()), name = "operations.wait")]
    pub async fn wait_interval(
        &mut self,
        ctx: &Context,
        interval: Duration,
    ) -> Result<(), OperationError> {
        let mut errors = BatchError::default();
        for op in &mut self.0 {
            if let Err(err) = op.wait_interval(ctx, interval).await {
                collect(ctx, &mut errors, op.id(), err)?;
            }
        }
        finish(errors)
    }

    /// Request cancellation of every operation in order.
    #[instrument(skip_all, fields(operations = self.0.len()), name = "operations.cancel")]
    pub async fn cancel(&mut self, ctx: &Context) -> Result<(), OperationError> {
        let mut errors = BatchError::default();
        for op in &mut self.0 {
            if let Err(err) = op.cancel(ctx).await {
                collect(ctx, &mut errors, op.id(), err)?;
            }
        }
        finish(errors)
    }
}

/// Record a per-operation failure, unless the context is done, in which case
/// the context error replaces everything collected.
fn collect(
    ctx: &Context,
    errors: &mut BatchError,
    id: &str,
    err: OperationError,
) -> Result<(), OperationError> {
    if let Some(ctx_err) = ctx.err() {
        debug!(discarded = errors.len(), "Context done, dropping batch errors");
        return Err(ctx_err.into());
    }
    if let OperationError::Context(ctx_err) = err {
        return Err(ctx_err.into());
    }
    debug!(operation_id = %id, error = %err, "Operation in batch failed");
    errors.push(id, err);
    Ok(())
}

fn finish(errors: BatchError) -> Result<(), OperationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

impl From<Vec<Operation>> for Operations {
    fn from(operations: Vec<Operation>) -> Self {
        Self(operations)
    }
}

impl FromIterator<Operation> for Operations {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Operations {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Operations {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
