//! Pipeline behaviors and the continuation that chains them around a handler.
//!
//! Given behaviors `[B1, B2, .., Bn]` in registration order and a handler `H`,
//! running the pipeline executes
//!
//! ```text
//! B1 pre -> B2 pre -> .. -> Bn pre -> H -> Bn post -> .. -> B2 post -> B1 post
//! ```
//!
//! Each behavior receives a [`Next`] holding the behaviors after it. Calling
//! [`Next::run`] enters the next behavior, or the handler once the list is
//! exhausted. A behavior that returns without calling `run` short-circuits
//! everything inside it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cancellation::CancellationToken;
use crate::error::{MediatorError, Result};
use crate::handler::RequestHandler;
use crate::request::Request;

/// Middleware wrapped around the handler of a request type.
///
/// A behavior may inspect the request, run logic before and after the rest of
/// the pipeline, translate or swallow errors, or skip the handler entirely.
/// The pipeline imposes no policy of its own.
#[async_trait]
pub trait PipelineBehavior<R: Request>: Send + Sync + 'static {
    async fn handle(
        &self,
        request: &R,
        cancel: &CancellationToken,
        next: Next<'_, R>,
    ) -> Result<R::Response>;
}

/// The remainder of a pipeline, from the point of view of one behavior.
pub struct Next<'a, R: Request> {
    request: &'a R,
    cancel: &'a CancellationToken,
    behaviors: &'a [Arc<dyn PipelineBehavior<R>>],
    handler: &'a dyn RequestHandler<R>,
}

impl<'a, R: Request> Next<'a, R> {
    pub(crate) fn new(
        request: &'a R,
        cancel: &'a CancellationToken,
        behaviors: &'a [Arc<dyn PipelineBehavior<R>>],
        handler: &'a dyn RequestHandler<R>,
    ) -> Self {
        Self {
            request,
            cancel,
            behaviors,
            handler,
        }
    }

    /// Runs the rest of the pipeline.
    ///
    /// Returns [`MediatorError::Cancelled`] without entering the next link if
    /// the token has been cancelled.
    pub async fn run(self) -> Result<R::Response> {
        if self.cancel.is_cancelled() {
            tracing::debug!(
                request = R::request_name(),
                remaining = self.behaviors.len(),
                "pipeline cancelled"
            );
            return Err(MediatorError::Cancelled {
                operation: R::request_name(),
            });
        }

        match self.behaviors.split_first() {
            Some((behavior, rest)) => {
                let next = Next {
                    behaviors: rest,
                    ..self
                };
                behavior.handle(self.request, self.cancel, next).await
            }
            None => self
                .handler
                .handle(self.request, self.cancel)
                .await
                .map_err(MediatorError::Handler),
        }
    }
}

/// Runs `behaviors` around `handler` for one request.
pub(crate) async fn run<R: Request>(
    request: &R,
    cancel: &CancellationToken,
    behaviors: &[Arc<dyn PipelineBehavior<R>>],
    handler: &dyn RequestHandler<R>,
) -> Result<R::Response> {
    Next::new(request, cancel, behaviors, handler).run().await
}
