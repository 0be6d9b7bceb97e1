//! The mediator: typed `send`, void `fire`, and notification `publish`.

use std::any::Any;
use std::sync::Arc;

use common::Unit;

use crate::cancellation::CancellationToken;
use crate::config::MediatorConfig;
use crate::error::{MediatorError, Result};
use crate::pipeline;
use crate::publish;
use crate::registry::Registry;
use crate::request::{Notification, Request, VoidRequest};
use crate::void::VoidCarrier;

/// Dispatches requests and notifications through a frozen [`Registry`].
///
/// Cloning is cheap; all clones share the registry. The registry is never
/// mutated after construction, so concurrent dispatches need no locking.
#[derive(Clone)]
pub struct Mediator {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    config: MediatorConfig,
}

impl Mediator {
    /// Creates a mediator with default configuration.
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, MediatorConfig::default())
    }

    pub fn with_config(registry: Registry, config: MediatorConfig) -> Self {
        Self {
            inner: Arc::new(Inner { registry, config }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.inner.config
    }

    /// Sends a request to its handler through the request's pipeline.
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response> {
        self.send_with(request, &CancellationToken::new()).await
    }

    /// Sends a request, threading `cancel` through every behavior and the handler.
    ///
    /// Resolution failures ([`MediatorError::MissingHandler`],
    /// [`MediatorError::AmbiguousHandler`]) happen before any behavior runs.
    /// Everything raised inside the pipeline reaches the caller unchanged.
    #[tracing::instrument(skip_all, fields(request = R::request_name()))]
    pub async fn send_with<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response> {
        metrics::counter!("mediator_requests_total", "request" => R::request_name()).increment(1);

        let handler = self.inner.registry.handler_for::<R>().inspect_err(|e| {
            tracing::error!(error = %e, "request handler resolution failed");
        })?;
        let behaviors = self.inner.registry.behaviors_for::<R>();
        tracing::debug!(behaviors = behaviors.len(), "dispatching request");

        let result = pipeline::run(&request, cancel, behaviors, handler.as_ref()).await;
        if result.is_err() {
            metrics::counter!("mediator_request_failures_total", "request" => R::request_name())
                .increment(1);
        }
        result
    }

    /// Sends a void request. Behaviors registered with
    /// [`void_behavior`](crate::RegistryBuilder::void_behavior) wrap its handler.
    pub async fn fire<R: VoidRequest>(&self, request: R) -> Result<()> {
        self.fire_with(request, &CancellationToken::new()).await
    }

    pub async fn fire_with<R: VoidRequest>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let Unit = self.send_with(VoidCarrier::new(request), cancel).await?;
        Ok(())
    }

    /// Publishes a notification to every registered handler.
    ///
    /// Completes once all handlers have finished. With no handlers this is a no-op.
    pub async fn publish<N: Notification>(&self, notification: &N) -> Result<()> {
        self.publish_with(notification, &CancellationToken::new()).await
    }

    /// Publishes with a cancellation token.
    ///
    /// A token that is already cancelled stops the publish before any handler
    /// starts. Once handlers are running they are awaited to completion; they
    /// receive the token and may stop early on their own.
    #[tracing::instrument(skip_all, fields(notification = N::notification_name()))]
    pub async fn publish_with<N: Notification>(
        &self,
        notification: &N,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(MediatorError::Cancelled {
                operation: N::notification_name(),
            });
        }

        metrics::counter!(
            "mediator_notifications_published_total",
            "notification" => N::notification_name()
        )
        .increment(1);

        let handlers = self.inner.registry.notification_handlers_for::<N>();
        publish::fan_out(
            handlers,
            notification,
            cancel,
            self.inner.config.publish_strategy,
        )
        .await
    }

    /// Publishes a value whose type is only known at runtime.
    ///
    /// The value must be a notification type the registry knows about, either
    /// through a handler or through [`RegistryBuilder::notification`](crate::RegistryBuilder::notification).
    /// Anything else is rejected with [`MediatorError::NotANotification`].
    pub async fn publish_dyn(&self, notification: Box<dyn Any + Send + Sync>) -> Result<()> {
        self.publish_dyn_with(notification, &CancellationToken::new())
            .await
    }

    pub async fn publish_dyn_with(
        &self,
        notification: Box<dyn Any + Send + Sync>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let type_id = (*notification).type_id();
        let publish = self
            .inner
            .registry
            .erased_publisher(type_id)
            .ok_or(MediatorError::NotANotification { type_id })?;

        publish(self, notification.as_ref(), cancel).await
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("registry", &self.inner.registry)
            .field("config", &self.inner.config)
            .finish()
    }
}
