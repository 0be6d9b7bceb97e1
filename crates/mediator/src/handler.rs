//! Handler traits implemented by the host application.

use async_trait::async_trait;

use crate::cancellation::CancellationToken;
use crate::request::{Notification, Request, VoidRequest};

/// Handles one request type and produces its response.
///
/// Exactly one handler may be registered per request type.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync + 'static {
    async fn handle(&self, request: &R, cancel: &CancellationToken) -> anyhow::Result<R::Response>;
}

/// Handles one void request type.
#[async_trait]
pub trait VoidRequestHandler<R: VoidRequest>: Send + Sync + 'static {
    async fn handle(&self, request: &R, cancel: &CancellationToken) -> anyhow::Result<()>;
}

/// Reacts to one notification type.
///
/// Handlers of the same notification run concurrently and must not rely on
/// each other's ordering.
#[async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync + 'static {
    async fn handle(&self, notification: &N, cancel: &CancellationToken) -> anyhow::Result<()>;
}
