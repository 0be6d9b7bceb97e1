//! In-memory widget storage with unit-of-work change tracking.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use domain::Aggregate;
use tokio::sync::{Mutex, RwLock};

use crate::error::{Result, WidgetError};
use crate::widget::{Widget, WidgetId};

tokio::task_local! {
    static CURRENT_UNIT: UnitOfWork;
}

/// Identifies one request's unit of work.
///
/// Saves made while a unit is in scope are queued under it, so concurrent
/// requests sharing a store only ever commit or discard their own changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitOfWork(u64);

impl UnitOfWork {
    pub fn begin() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Runs `work` with every save it makes attributed to this unit.
    ///
    /// The scope follows the future, not spawned tasks: a save from a task
    /// spawned inside `work` is queued without a unit.
    pub async fn scope<F: Future>(self, work: F) -> F::Output {
        CURRENT_UNIT.scope(self, work).await
    }

    fn current() -> Option<Self> {
        CURRENT_UNIT.try_with(|unit| *unit).ok()
    }
}

/// In-memory widget store.
///
/// Saved widgets are stored without their pending events. A widget that
/// carried events when saved is also queued as a change, tagged with the
/// unit of work in scope. The unit takes its own changes after the request
/// completes and publishes their events; taking is atomic, so every queued
/// change is taken at most once.
#[derive(Clone, Default)]
pub struct WidgetStore {
    widgets: Arc<RwLock<HashMap<WidgetId, Widget>>>,
    changed: Arc<Mutex<Vec<(Option<UnitOfWork>, Widget)>>>,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a widget, deleted or not.
    pub async fn load(&self, id: WidgetId) -> Result<Widget> {
        self.widgets
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(WidgetError::NotFound(id))
    }

    /// Loads a widget that has not been deleted.
    pub async fn find_live(&self, id: WidgetId) -> Option<Widget> {
        self.widgets
            .read()
            .await
            .get(&id)
            .filter(|widget| !widget.is_deleted())
            .cloned()
    }

    /// Returns live widgets ordered by creation time.
    pub async fn list_live(&self) -> Vec<Widget> {
        let mut widgets: Vec<Widget> = self
            .widgets
            .read()
            .await
            .values()
            .filter(|widget| !widget.is_deleted())
            .cloned()
            .collect();
        widgets.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.name().cmp(b.name()))
        });
        widgets
    }

    /// Persists the widget's state and queues its pending events.
    #[tracing::instrument(skip_all, fields(widget = %widget.id()))]
    pub async fn save(&self, widget: Widget) {
        let mut stored = widget.clone();
        stored.clear_pending_events();
        self.widgets.write().await.insert(widget.id(), stored);

        let pending = widget.pending_events().len();
        if pending > 0 {
            let unit = UnitOfWork::current();
            tracing::debug!(pending, ?unit, "queued widget changes");
            self.changed.lock().await.push((unit, widget));
        }
    }

    /// Removes and returns every queued change, whichever unit saved it.
    pub async fn take_changed(&self) -> Vec<Widget> {
        std::mem::take(&mut *self.changed.lock().await)
            .into_iter()
            .map(|(_, widget)| widget)
            .collect()
    }

    /// Removes and returns the changes saved under `unit`, in save order.
    ///
    /// Changes queued by other units stay queued.
    pub async fn take_changed_by(&self, unit: UnitOfWork) -> Vec<Widget> {
        let mut changed = self.changed.lock().await;
        let (mine, others): (Vec<_>, Vec<_>) = std::mem::take(&mut *changed)
            .into_iter()
            .partition(|(owner, _)| *owner == Some(unit));
        *changed = others;
        mine.into_iter().map(|(_, widget)| widget).collect()
    }

    /// Returns the number of stored widgets, including deleted ones.
    pub async fn len(&self) -> usize {
        self.widgets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.widgets.read().await.is_empty()
    }
}
