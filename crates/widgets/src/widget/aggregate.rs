//! The widget aggregate and its read model.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::{Aggregate, DomainEvent, DomainEvents};
use serde::{Deserialize, Serialize};

use super::{WidgetId, check_name};
use super::events::{WidgetCreated, WidgetDeleted, WidgetRenamed};
use crate::error::{Result, WidgetError};

/// Widget aggregate root.
///
/// Every state change records a matching event; the events are published
/// after the widget has been saved.
#[derive(Debug, Clone)]
pub struct Widget {
    id: WidgetId,
    name: String,
    created_at: DateTime<Utc>,
    deleted: bool,
    events: DomainEvents,
}

impl Widget {
    /// Creates a widget and records `WidgetCreated`.
    pub fn create(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_name(&name).map_err(WidgetError::InvalidName)?;

        let mut widget = Self {
            id: WidgetId::random(),
            name,
            created_at: Utc::now(),
            deleted: false,
            events: DomainEvents::new(),
        };
        widget.events.record(WidgetCreated {
            widget_id: widget.id,
            name: widget.name.clone(),
            created_at: widget.created_at,
        });
        Ok(widget)
    }

    /// Renames the widget. Renaming to the current name records nothing.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        self.ensure_live()?;
        let name = name.into();
        check_name(&name).map_err(WidgetError::InvalidName)?;

        if name == self.name {
            return Ok(());
        }

        let old_name = std::mem::replace(&mut self.name, name);
        self.events.record(WidgetRenamed {
            widget_id: self.id,
            old_name,
            new_name: self.name.clone(),
        });
        Ok(())
    }

    /// Marks the widget deleted and records `WidgetDeleted`.
    pub fn delete(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.deleted = true;
        self.events.record(WidgetDeleted {
            widget_id: self.id,
            deleted_at: Utc::now(),
        });
        Ok(())
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn ensure_live(&self) -> Result<()> {
        if self.deleted {
            Err(WidgetError::Deleted(self.id))
        } else {
            Ok(())
        }
    }
}

impl Aggregate for Widget {
    fn aggregate_type(&self) -> &'static str {
        "Widget"
    }

    fn pending_events(&self) -> Vec<Arc<dyn DomainEvent>> {
        self.events.pending().to_vec()
    }

    fn clear_pending_events(&mut self) {
        self.events.clear();
    }
}

/// Read-only projection of a live widget returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetView {
    pub id: WidgetId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Widget> for WidgetView {
    fn from(widget: &Widget) -> Self {
        Self {
            id: widget.id,
            name: widget.name.clone(),
            created_at: widget.created_at,
        }
    }
}
