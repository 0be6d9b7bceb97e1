//! Rejects invalid requests before they reach their handler.

use async_trait::async_trait;

use crate::cancellation::CancellationToken;
use crate::error::{MediatorError, Result};
use crate::pipeline::{Next, PipelineBehavior};
use crate::request::{Request, VoidRequest};
use crate::void::VoidCarrier;

/// A request that can check its own invariants before being handled.
pub trait Validate {
    /// Returns every violated rule, or `Ok(())` if the request is valid.
    fn validate(&self) -> std::result::Result<(), Vec<String>>;
}

impl<R: VoidRequest + Validate> Validate for VoidCarrier<R> {
    fn validate(&self) -> std::result::Result<(), Vec<String>> {
        self.inner().validate()
    }
}

/// Rejects invalid requests with [`MediatorError::Validation`] before the
/// rest of the pipeline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationBehavior;

#[async_trait]
impl<R: Request + Validate> PipelineBehavior<R> for ValidationBehavior {
    async fn handle(
        &self,
        request: &R,
        _cancel: &CancellationToken,
        next: Next<'_, R>,
    ) -> Result<R::Response> {
        if let Err(errors) = request.validate() {
            tracing::debug!(request = R::request_name(), ?errors, "request rejected");
            return Err(MediatorError::Validation {
                request_type: R::request_name(),
                errors,
            });
        }

        next.run().await
    }
}
