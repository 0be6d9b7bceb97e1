//! Request and notification handlers for the widget catalogue.

use std::sync::Arc;

use async_trait::async_trait;
use mediator::{
    CancellationToken, Notification, NotificationHandler, RequestHandler, VoidRequestHandler,
};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::store::WidgetStore;
use crate::widget::{
    CreateWidget, DeleteWidget, GetWidget, ListWidgets, RenameWidget, Widget, WidgetCreated,
    WidgetDeleted, WidgetId, WidgetRenamed, WidgetView,
};

/// Handles the state-changing widget requests.
#[derive(Clone)]
pub struct WidgetCommands {
    store: WidgetStore,
}

impl WidgetCommands {
    pub fn new(store: WidgetStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler<CreateWidget> for WidgetCommands {
    async fn handle(
        &self,
        request: &CreateWidget,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<WidgetId> {
        let widget = Widget::create(request.name.clone())?;
        let id = widget.id();
        self.store.save(widget).await;
        Ok(id)
    }
}

#[async_trait]
impl VoidRequestHandler<RenameWidget> for WidgetCommands {
    async fn handle(&self, request: &RenameWidget, _cancel: &CancellationToken) -> anyhow::Result<()> {
        let mut widget = self.store.load(request.id).await?;
        widget.rename(request.name.clone())?;
        self.store.save(widget).await;
        Ok(())
    }
}

#[async_trait]
impl VoidRequestHandler<DeleteWidget> for WidgetCommands {
    async fn handle(&self, request: &DeleteWidget, _cancel: &CancellationToken) -> anyhow::Result<()> {
        let mut widget = self.store.load(request.id).await?;
        widget.delete()?;
        self.store.save(widget).await;
        Ok(())
    }
}

/// Handles read-only widget queries.
#[derive(Clone)]
pub struct WidgetQueries {
    store: WidgetStore,
}

impl WidgetQueries {
    pub fn new(store: WidgetStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler<GetWidget> for WidgetQueries {
    async fn handle(
        &self,
        request: &GetWidget,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<Option<WidgetView>> {
        Ok(self
            .store
            .find_live(request.id)
            .await
            .as_ref()
            .map(WidgetView::from))
    }
}

#[async_trait]
impl RequestHandler<ListWidgets> for WidgetQueries {
    async fn handle(
        &self,
        _request: &ListWidgets,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<WidgetView>> {
        Ok(self
            .store
            .list_live()
            .await
            .iter()
            .map(WidgetView::from)
            .collect())
    }
}

/// One published widget event, as recorded by [`AuditLog`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub event_type: &'static str,
    pub payload: serde_json::Value,
}

/// Keeps every published widget event in publish order.
#[derive(Clone, Default)]
pub struct AuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }

    pub async fn event_types(&self) -> Vec<&'static str> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| entry.event_type)
            .collect()
    }

    async fn append<E: Notification + Serialize>(&self, event: &E) -> anyhow::Result<()> {
        let entry = AuditEntry {
            event_type: E::notification_name(),
            payload: serde_json::to_value(event)?,
        };
        self.entries.write().await.push(entry);
        Ok(())
    }
}

#[async_trait]
impl NotificationHandler<WidgetCreated> for AuditLog {
    async fn handle(&self, event: &WidgetCreated, _cancel: &CancellationToken) -> anyhow::Result<()> {
        self.append(event).await
    }
}

#[async_trait]
impl NotificationHandler<WidgetRenamed> for AuditLog {
    async fn handle(&self, event: &WidgetRenamed, _cancel: &CancellationToken) -> anyhow::Result<()> {
        self.append(event).await
    }
}

#[async_trait]
impl NotificationHandler<WidgetDeleted> for AuditLog {
    async fn handle(&self, event: &WidgetDeleted, _cancel: &CancellationToken) -> anyhow::Result<()> {
        self.append(event).await
    }
}

/// Counts catalogue changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidgetMetrics;

#[async_trait]
impl NotificationHandler<WidgetCreated> for WidgetMetrics {
    async fn handle(&self, _event: &WidgetCreated, _cancel: &CancellationToken) -> anyhow::Result<()> {
        metrics::counter!("widgets_created_total").increment(1);
        Ok(())
    }
}

#[async_trait]
impl NotificationHandler<WidgetDeleted> for WidgetMetrics {
    async fn handle(&self, _event: &WidgetDeleted, _cancel: &CancellationToken) -> anyhow::Result<()> {
        metrics::counter!("widgets_deleted_total").increment(1);
        Ok(())
    }
}
