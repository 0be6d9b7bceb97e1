//! Widget catalogue error types.

use mediator::MediatorError;
use thiserror::Error;

use crate::widget::WidgetId;

/// Errors raised by the widget catalogue.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// No widget exists with the given id.
    #[error("Widget not found: {0}")]
    NotFound(WidgetId),

    /// The widget was deleted and accepts no further changes.
    #[error("Widget {0} has been deleted")]
    Deleted(WidgetId),

    /// The name breaks a naming rule.
    #[error("Invalid widget name: {0}")]
    InvalidName(String),

    /// Dispatching a request failed.
    #[error(transparent)]
    Mediator(#[from] MediatorError),

    /// The request succeeded and its widgets were saved, but publishing
    /// their events failed. Events are not redelivered.
    #[error("Saved {} widget(s) but their events were not published: {source}", .saved.len())]
    EventsNotPublished {
        saved: Vec<WidgetId>,
        #[source]
        source: MediatorError,
    },
}

impl WidgetError {
    /// Returns the widget error a handler raised, if the failure came from one.
    pub fn handler_cause(&self) -> Option<&WidgetError> {
        match self {
            Self::Mediator(err) => err.handler_error().and_then(|e| e.downcast_ref()),
            _ => None,
        }
    }
}

/// Result type for widget operations.
pub type Result<T> = std::result::Result<T, WidgetError>;
