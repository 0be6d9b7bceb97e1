//! Registration table mapping message types to handlers and behaviors.
//!
//! The host application fills a [`RegistryBuilder`] at startup and freezes it
//! into a [`Registry`]. Entries are keyed by [`TypeId`] and stored type-erased;
//! every lookup downcasts with the caller's static type, so resolution is
//! checked at compile time and needs no runtime reflection.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::cancellation::CancellationToken;
use crate::dispatcher::Mediator;
use crate::error::{MediatorError, Result};
use crate::handler::{NotificationHandler, RequestHandler, VoidRequestHandler};
use crate::pipeline::PipelineBehavior;
use crate::request::{Notification, Request, VoidRequest};
use crate::void::{VoidCarrier, VoidHandlerAdapter};

type Erased = Box<dyn Any + Send + Sync>;

/// Publishes a type-erased notification whose concrete type is fixed by the entry.
pub(crate) type ErasedPublish = for<'a> fn(
    &'a Mediator,
    &'a (dyn Any + Send + Sync),
    &'a CancellationToken,
) -> BoxFuture<'a, Result<()>>;

/// A handler together with the type name it was registered under.
pub(crate) struct Registered<T: ?Sized> {
    pub(crate) name: &'static str,
    pub(crate) handler: Arc<T>,
}

struct RequestEntry {
    request_type: &'static str,
    /// One `Registered<dyn RequestHandler<R>>` per registration.
    handlers: Vec<Erased>,
    handler_names: Vec<&'static str>,
}

struct NotificationEntry {
    notification_type: &'static str,
    /// `Vec<Registered<dyn NotificationHandler<N>>>`.
    handlers: Erased,
    handler_count: usize,
    publish: ErasedPublish,
}

/// Immutable registration table consumed by the [`Mediator`].
pub struct Registry {
    requests: HashMap<TypeId, RequestEntry>,
    /// `Vec<Arc<dyn PipelineBehavior<R>>>` keyed by request type.
    behaviors: HashMap<TypeId, Erased>,
    notifications: HashMap<TypeId, NotificationEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolves the single handler registered for `R`.
    pub fn handler_for<R: Request>(&self) -> Result<Arc<dyn RequestHandler<R>>> {
        let entry = self
            .requests
            .get(&TypeId::of::<R>())
            .ok_or(MediatorError::MissingHandler {
                request_type: R::request_name(),
            })?;

        match entry.handlers.as_slice() {
            [] => Err(MediatorError::MissingHandler {
                request_type: R::request_name(),
            }),
            [single] => single
                .downcast_ref::<Registered<dyn RequestHandler<R>>>()
                .map(|registered| Arc::clone(&registered.handler))
                .ok_or(MediatorError::MissingHandler {
                    request_type: R::request_name(),
                }),
            _ => Err(MediatorError::AmbiguousHandler {
                request_type: R::request_name(),
                handlers: entry.handler_names.clone(),
            }),
        }
    }

    /// Returns the behaviors for `R` in registration order (possibly empty).
    pub fn behaviors_for<R: Request>(&self) -> &[Arc<dyn PipelineBehavior<R>>] {
        self.behaviors
            .get(&TypeId::of::<R>())
            .and_then(|erased| erased.downcast_ref::<Vec<Arc<dyn PipelineBehavior<R>>>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn notification_handlers_for<N: Notification>(
        &self,
    ) -> &[Registered<dyn NotificationHandler<N>>] {
        self.notifications
            .get(&TypeId::of::<N>())
            .and_then(|entry| {
                entry
                    .handlers
                    .downcast_ref::<Vec<Registered<dyn NotificationHandler<N>>>>()
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Type names of the handlers registered for `N`, in registration order.
    pub fn notification_handler_names<N: Notification>(&self) -> Vec<&'static str> {
        self.notification_handlers_for::<N>()
            .iter()
            .map(|registered| registered.name)
            .collect()
    }

    pub(crate) fn erased_publisher(&self, type_id: TypeId) -> Option<ErasedPublish> {
        self.notifications.get(&type_id).map(|entry| entry.publish)
    }

    pub fn has_handler<R: Request>(&self) -> bool {
        self.handler_for::<R>().is_ok()
    }

    pub fn has_void_handler<R: VoidRequest>(&self) -> bool {
        self.has_handler::<VoidCarrier<R>>()
    }

    /// Returns true if `N` has handlers or was declared as a notification.
    pub fn is_notification<N: Notification>(&self) -> bool {
        self.notifications.contains_key(&TypeId::of::<N>())
    }

    /// Number of request types with a handler.
    pub fn handler_count(&self) -> usize {
        self.requests.len()
    }

    /// Number of known notification types.
    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut requests: Vec<_> = self.requests.values().map(|e| e.request_type).collect();
        requests.sort_unstable();
        let mut notifications: Vec<_> = self
            .notifications
            .values()
            .map(|e| (e.notification_type, e.handler_count))
            .collect();
        notifications.sort_unstable();
        f.debug_struct("Registry")
            .field("requests", &requests)
            .field("notifications", &notifications)
            .finish()
    }
}

/// Collects registrations at startup.
///
/// Duplicate request handlers are recorded rather than overwritten, so that
/// [`build`](Self::build) can report them as [`MediatorError::AmbiguousHandler`].
#[derive(Default)]
pub struct RegistryBuilder {
    requests: HashMap<TypeId, RequestEntry>,
    behaviors: HashMap<TypeId, Erased>,
    notifications: HashMap<TypeId, NotificationEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for request type `R`.
    pub fn handler<R, H>(self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R>,
    {
        self.insert_handler::<R>(type_name::<H>(), Arc::new(handler))
    }

    /// Registers the handler for void request type `R`.
    pub fn void_handler<R, H>(self, handler: H) -> Self
    where
        R: VoidRequest,
        H: VoidRequestHandler<R>,
    {
        self.insert_handler::<VoidCarrier<R>>(
            type_name::<H>(),
            Arc::new(VoidHandlerAdapter::new(handler)),
        )
    }

    /// Appends a behavior to the pipeline of `R`.
    ///
    /// Behaviors run outermost-first in the order they are added.
    pub fn behavior<R, B>(mut self, behavior: B) -> Self
    where
        R: Request,
        B: PipelineBehavior<R>,
    {
        let behaviors = self
            .behaviors
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(Vec::<Arc<dyn PipelineBehavior<R>>>::new()));
        if let Some(behaviors) = behaviors.downcast_mut::<Vec<Arc<dyn PipelineBehavior<R>>>>() {
            behaviors.push(Arc::new(behavior));
        }
        self
    }

    /// Appends a behavior to the pipeline of void request `R`.
    ///
    /// Any behavior written generically over [`Request`] qualifies.
    pub fn void_behavior<R, B>(self, behavior: B) -> Self
    where
        R: VoidRequest,
        B: PipelineBehavior<VoidCarrier<R>>,
    {
        self.behavior::<VoidCarrier<R>, B>(behavior)
    }

    /// Adds a handler for notification type `N`.
    pub fn notification_handler<N, H>(mut self, handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N>,
    {
        let entry = self.notification_entry::<N>();
        if let Some(handlers) = entry
            .handlers
            .downcast_mut::<Vec<Registered<dyn NotificationHandler<N>>>>()
        {
            handlers.push(Registered {
                name: type_name::<H>(),
                handler: Arc::new(handler),
            });
            entry.handler_count += 1;
        }
        self
    }

    /// Declares `N` as a notification without adding handlers, so untyped
    /// publishes of `N` are accepted.
    pub fn notification<N: Notification>(mut self) -> Self {
        self.notification_entry::<N>();
        self
    }

    /// Freezes the table.
    ///
    /// Fails with [`MediatorError::AmbiguousHandler`] if any request type has
    /// more than one handler.
    pub fn build(self) -> Result<Registry> {
        let mut ambiguous: Vec<&RequestEntry> = self
            .requests
            .values()
            .filter(|entry| entry.handlers.len() > 1)
            .collect();
        ambiguous.sort_unstable_by_key(|entry| entry.request_type);

        if let Some(entry) = ambiguous.first() {
            return Err(MediatorError::AmbiguousHandler {
                request_type: entry.request_type,
                handlers: entry.handler_names.clone(),
            });
        }

        Ok(self.into_registry())
    }

    /// Freezes the table without rejecting ambiguous registrations; lookups
    /// for those request types fail at dispatch instead.
    pub(crate) fn into_registry(self) -> Registry {
        tracing::debug!(
            requests = self.requests.len(),
            notifications = self.notifications.len(),
            "registry built"
        );
        Registry {
            requests: self.requests,
            behaviors: self.behaviors,
            notifications: self.notifications,
        }
    }

    fn insert_handler<R: Request>(
        mut self,
        handler_name: &'static str,
        handler: Arc<dyn RequestHandler<R>>,
    ) -> Self {
        let entry = self
            .requests
            .entry(TypeId::of::<R>())
            .or_insert_with(|| RequestEntry {
                request_type: R::request_name(),
                handlers: Vec::new(),
                handler_names: Vec::new(),
            });
        entry.handlers.push(Box::new(Registered {
            name: handler_name,
            handler,
        }));
        entry.handler_names.push(handler_name);
        self
    }

    fn notification_entry<N: Notification>(&mut self) -> &mut NotificationEntry {
        self.notifications
            .entry(TypeId::of::<N>())
            .or_insert_with(|| NotificationEntry {
                notification_type: N::notification_name(),
                handlers: Box::new(Vec::<Registered<dyn NotificationHandler<N>>>::new()),
                handler_count: 0,
                publish: publish_erased::<N>,
            })
    }
}

fn publish_erased<'a, N: Notification>(
    mediator: &'a Mediator,
    notification: &'a (dyn Any + Send + Sync),
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        match notification.downcast_ref::<N>() {
            Some(notification) => mediator.publish_with(notification, cancel).await,
            None => Err(MediatorError::NotANotification {
                type_id: (*notification).type_id(),
            }),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CreateWidget;

    impl Request for CreateWidget {
        type Response = u64;
    }

    struct DeleteWidget;

    impl VoidRequest for DeleteWidget {}

    struct WidgetCreated;

    impl Notification for WidgetCreated {}

    struct WidgetArchived;

    impl Notification for WidgetArchived {}

    struct FixedId(u64);

    #[async_trait]
    impl RequestHandler<CreateWidget> for FixedId {
        async fn handle(
            &self,
            _request: &CreateWidget,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<u64> {
            Ok(self.0)
        }
    }

    struct Noop;

    #[async_trait]
    impl VoidRequestHandler<DeleteWidget> for Noop {
        async fn handle(
            &self,
            _request: &DeleteWidget,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl NotificationHandler<WidgetCreated> for Noop {
        async fn handle(
            &self,
            _notification: &WidgetCreated,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct PassThrough;

    #[async_trait]
    impl<R: Request> PipelineBehavior<R> for PassThrough {
        async fn handle(
            &self,
            _request: &R,
            _cancel: &CancellationToken,
            next: crate::pipeline::Next<'_, R>,
        ) -> Result<R::Response> {
            next.run().await
        }
    }

    #[tokio::test]
    async fn resolves_single_handler() {
        let registry = Registry::builder()
            .handler::<CreateWidget, _>(FixedId(7))
            .build()
            .unwrap();

        let handler = registry.handler_for::<CreateWidget>().unwrap();
        let id = handler
            .handle(&CreateWidget, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(id, 7);
        assert!(registry.has_handler::<CreateWidget>());
        assert_eq!(registry.handler_count(), 1);
    }

    #[test]
    fn missing_handler_names_request_type() {
        let registry = Registry::builder().build().unwrap();

        let err = registry.handler_for::<CreateWidget>().err().unwrap();
        assert!(matches!(
            err,
            MediatorError::MissingHandler { request_type } if request_type.ends_with("CreateWidget")
        ));
    }

    #[test]
    fn build_rejects_duplicate_handlers() {
        let err = Registry::builder()
            .handler::<CreateWidget, _>(FixedId(1))
            .handler::<CreateWidget, _>(FixedId(2))
            .build()
            .unwrap_err();

        match err {
            MediatorError::AmbiguousHandler {
                request_type,
                handlers,
            } => {
                assert!(request_type.ends_with("CreateWidget"));
                assert_eq!(handlers.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unchecked_registry_reports_ambiguity_on_lookup() {
        let registry = Registry::builder()
            .handler::<CreateWidget, _>(FixedId(1))
            .handler::<CreateWidget, _>(FixedId(2))
            .into_registry();

        assert!(matches!(
            registry.handler_for::<CreateWidget>().err().unwrap(),
            MediatorError::AmbiguousHandler { .. }
        ));
        assert!(!registry.has_handler::<CreateWidget>());
    }

    #[test]
    fn behaviors_keep_registration_order() {
        let registry = Registry::builder()
            .behavior::<CreateWidget, _>(PassThrough)
            .behavior::<CreateWidget, _>(PassThrough)
            .void_behavior::<DeleteWidget, _>(PassThrough)
            .build()
            .unwrap();

        assert_eq!(registry.behaviors_for::<CreateWidget>().len(), 2);
        assert_eq!(registry.behaviors_for::<VoidCarrier<DeleteWidget>>().len(), 1);
    }

    #[test]
    fn unregistered_request_has_no_behaviors() {
        let registry = Registry::builder().build().unwrap();
        assert!(registry.behaviors_for::<CreateWidget>().is_empty());
    }

    #[test]
    fn void_handlers_are_keyed_by_inner_request() {
        let registry = Registry::builder()
            .void_handler::<DeleteWidget, _>(Noop)
            .build()
            .unwrap();

        assert!(registry.has_void_handler::<DeleteWidget>());
        assert!(!registry.has_handler::<CreateWidget>());
    }

    #[test]
    fn notification_handlers_accumulate() {
        let registry = Registry::builder()
            .notification_handler::<WidgetCreated, _>(Noop)
            .notification_handler::<WidgetCreated, _>(Noop)
            .notification::<WidgetArchived>()
            .build()
            .unwrap();

        assert_eq!(
            registry.notification_handler_names::<WidgetCreated>().len(),
            2
        );
        assert!(
            registry
                .notification_handler_names::<WidgetArchived>()
                .is_empty()
        );
        assert!(registry.is_notification::<WidgetArchived>());
        assert_eq!(registry.notification_count(), 2);
    }
}
