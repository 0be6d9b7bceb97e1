//! Adapter that runs void requests through the value-returning pipeline.
//!
//! A [`VoidRequest`] is wrapped in [`VoidCarrier`], which is a
//! `Request<Response = Unit>`. The carrier is public only so it can appear in
//! trait bounds; this module is private, so downstream crates can never name
//! it. Its [`Request::request_name`] is the inner request's name, which keeps
//! the wrapper out of errors, logs, and metric labels.

use std::marker::PhantomData;

use async_trait::async_trait;
use common::Unit;

use crate::cancellation::CancellationToken;
use crate::handler::{RequestHandler, VoidRequestHandler};
use crate::request::{Request, VoidRequest};

/// Carries a void request through the pipeline.
pub struct VoidCarrier<R>(R);

impl<R: VoidRequest> VoidCarrier<R> {
    pub(crate) fn new(request: R) -> Self {
        Self(request)
    }

    pub(crate) fn inner(&self) -> &R {
        &self.0
    }
}

impl<R: VoidRequest> Request for VoidCarrier<R> {
    type Response = Unit;

    fn request_name() -> &'static str {
        R::request_name()
    }
}

/// Handler registered for `VoidCarrier<R>`: unwraps, delegates, returns `Unit`.
pub(crate) struct VoidHandlerAdapter<R, H> {
    inner: H,
    _request: PhantomData<fn(R)>,
}

impl<R, H> VoidHandlerAdapter<R, H>
where
    R: VoidRequest,
    H: VoidRequestHandler<R>,
{
    pub(crate) fn new(inner: H) -> Self {
        Self {
            inner,
            _request: PhantomData,
        }
    }
}

#[async_trait]
impl<R, H> RequestHandler<VoidCarrier<R>> for VoidHandlerAdapter<R, H>
where
    R: VoidRequest,
    H: VoidRequestHandler<R>,
{
    async fn handle(
        &self,
        request: &VoidCarrier<R>,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Unit> {
        self.inner.handle(request.inner(), cancel).await?;
        Ok(Unit)
    }
}
