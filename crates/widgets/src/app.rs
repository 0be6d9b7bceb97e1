//! Startup wiring and the unit-of-work boundary around each request.

use domain::{Aggregate, DomainEventDispatcher};
use mediator::{
    CancellationToken, LoggingBehavior, Mediator, MediatorConfig, Registry, RegistryBuilder,
    Request, ValidationBehavior, VoidRequest,
};

use crate::error::{Result, WidgetError};
use crate::handlers::{AuditLog, WidgetCommands, WidgetMetrics, WidgetQueries};
use crate::store::{UnitOfWork, WidgetStore};
use crate::widget::{
    CreateWidget, DeleteWidget, GetWidget, ListWidgets, RenameWidget, WidgetCreated,
    WidgetDeleted, WidgetRenamed,
};

/// Fills the registration table for the widget catalogue.
pub fn registry(store: &WidgetStore, audit: &AuditLog) -> RegistryBuilder {
    let commands = WidgetCommands::new(store.clone());
    let queries = WidgetQueries::new(store.clone());

    Registry::builder()
        // Commands
        .handler::<CreateWidget, _>(commands.clone())
        .behavior::<CreateWidget, _>(LoggingBehavior)
        .behavior::<CreateWidget, _>(ValidationBehavior)
        .void_handler::<RenameWidget, _>(commands.clone())
        .void_behavior::<RenameWidget, _>(LoggingBehavior)
        .void_behavior::<RenameWidget, _>(ValidationBehavior)
        .void_handler::<DeleteWidget, _>(commands)
        .void_behavior::<DeleteWidget, _>(LoggingBehavior)
        // Queries
        .handler::<GetWidget, _>(queries.clone())
        .behavior::<GetWidget, _>(LoggingBehavior)
        .handler::<ListWidgets, _>(queries)
        .behavior::<ListWidgets, _>(LoggingBehavior)
        // Events
        .notification_handler::<WidgetCreated, _>(audit.clone())
        .notification_handler::<WidgetCreated, _>(WidgetMetrics)
        .notification_handler::<WidgetRenamed, _>(audit.clone())
        .notification_handler::<WidgetDeleted, _>(audit.clone())
        .notification_handler::<WidgetDeleted, _>(WidgetMetrics)
}

/// The widget catalogue application.
///
/// Commands run as a unit of work: the request is sent through the mediator,
/// then the events of every widget it saved are published in save order.
/// A failed request discards only its own unpublished changes. Queries skip
/// the commit step.
#[derive(Clone)]
pub struct WidgetApp {
    mediator: Mediator,
    events: DomainEventDispatcher,
    store: WidgetStore,
    audit: AuditLog,
}

impl WidgetApp {
    /// Builds the registry and mediator around a fresh store.
    pub fn new(config: &MediatorConfig) -> Result<Self> {
        let store = WidgetStore::new();
        let audit = AuditLog::new();
        let registry = registry(&store, &audit).build()?;
        Ok(Self::from_parts(store, audit, registry, config))
    }

    /// Wraps a registry whose handlers were built around `store` and `audit`,
    /// typically [`registry`] extended with extra handlers.
    pub fn from_parts(
        store: WidgetStore,
        audit: AuditLog,
        registry: Registry,
        config: &MediatorConfig,
    ) -> Self {
        tracing::info!(
            handlers = registry.handler_count(),
            notifications = registry.notification_count(),
            publish_strategy = %config.publish_strategy,
            "widget catalogue wired"
        );

        let mediator = Mediator::with_config(registry, config.clone());
        Self {
            events: DomainEventDispatcher::new(mediator.clone()),
            mediator,
            store,
            audit,
        }
    }

    pub fn mediator(&self) -> &Mediator {
        &self.mediator
    }

    pub fn store(&self) -> &WidgetStore {
        &self.store
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Runs a command and publishes the events it produced.
    ///
    /// If publishing fails the command's changes stay saved and the error is
    /// [`WidgetError::EventsNotPublished`], which lists the saved widgets.
    pub async fn execute<R: Request>(&self, request: R) -> Result<R::Response> {
        self.execute_with(request, &CancellationToken::new()).await
    }

    pub async fn execute_with<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response> {
        let unit = UnitOfWork::begin();
        match unit.scope(self.mediator.send_with(request, cancel)).await {
            Ok(response) => {
                self.commit(unit, cancel).await?;
                Ok(response)
            }
            Err(err) => {
                self.discard(unit).await;
                Err(err.into())
            }
        }
    }

    /// Runs a void command and publishes the events it produced.
    pub async fn execute_void<R: VoidRequest>(&self, request: R) -> Result<()> {
        self.execute_void_with(request, &CancellationToken::new()).await
    }

    pub async fn execute_void_with<R: VoidRequest>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let unit = UnitOfWork::begin();
        match unit.scope(self.mediator.fire_with(request, cancel)).await {
            Ok(()) => {
                self.commit(unit, cancel).await?;
                Ok(())
            }
            Err(err) => {
                self.discard(unit).await;
                Err(err.into())
            }
        }
    }

    /// Runs a read-only request.
    pub async fn query<R: Request>(&self, request: R) -> Result<R::Response> {
        Ok(self.mediator.send(request).await?)
    }

    async fn commit(&self, unit: UnitOfWork, cancel: &CancellationToken) -> Result<usize> {
        let mut changed = self.store.take_changed_by(unit).await;
        let saved = changed.iter().map(|widget| widget.id()).collect();
        let mut aggregates: Vec<&mut dyn Aggregate> = changed
            .iter_mut()
            .map(|widget| widget as &mut dyn Aggregate)
            .collect();
        self.events
            .dispatch_all(&mut aggregates, cancel)
            .await
            .map_err(|source| WidgetError::EventsNotPublished { saved, source })
    }

    async fn discard(&self, unit: UnitOfWork) {
        let dropped = self.store.take_changed_by(unit).await;
        if !dropped.is_empty() {
            tracing::warn!(widgets = dropped.len(), "discarded unpublished widget changes");
        }
    }
}
