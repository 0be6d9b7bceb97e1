//! Events raised by widgets.

use chrono::{DateTime, Utc};
use mediator::Notification;
use serde::{Deserialize, Serialize};

use super::WidgetId;

/// A widget was added to the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetCreated {
    pub widget_id: WidgetId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Notification for WidgetCreated {
    fn notification_name() -> &'static str {
        "WidgetCreated"
    }
}

/// A widget's name changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRenamed {
    pub widget_id: WidgetId,
    pub old_name: String,
    pub new_name: String,
}

impl Notification for WidgetRenamed {
    fn notification_name() -> &'static str {
        "WidgetRenamed"
    }
}

/// A widget was removed from the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetDeleted {
    pub widget_id: WidgetId,
    pub deleted_at: DateTime<Utc>,
}

impl Notification for WidgetDeleted {
    fn notification_name() -> &'static str {
        "WidgetDeleted"
    }
}
