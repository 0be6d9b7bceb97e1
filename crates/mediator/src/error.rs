//! Dispatch error types.

use std::any::TypeId;

use thiserror::Error;

/// A single notification handler that failed during a publish.
#[derive(Debug)]
pub struct NotificationFailure {
    /// Type name of the failing handler.
    pub handler: &'static str,

    /// The error the handler returned, or a description of its panic.
    pub error: anyhow::Error,
}

impl std::fmt::Display for NotificationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.handler, self.error)
    }
}

fn join_failures(failures: &[NotificationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors surfaced by the mediator.
///
/// The mediator is a transparent pipe: handler failures are carried in
/// [`MediatorError::Handler`] without altering their message or source chain.
#[derive(Debug, Error)]
pub enum MediatorError {
    /// No handler is registered for the request type.
    #[error("No handler registered for request {request_type}")]
    MissingHandler { request_type: &'static str },

    /// More than one handler is registered for a request type that needs one.
    #[error(
        "Ambiguous handlers for request {request_type}: {} registered, expected exactly one",
        handlers.len()
    )]
    AmbiguousHandler {
        request_type: &'static str,
        handlers: Vec<&'static str>,
    },

    /// A handler or behavior failed.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),

    /// The request was rejected by a validation behavior before reaching its handler.
    #[error("Validation failed for request {request_type}: {}", errors.join("; "))]
    Validation {
        request_type: &'static str,
        errors: Vec<String>,
    },

    /// One or more handlers failed while publishing a notification.
    #[error(
        "{} handler(s) failed for notification {notification_type}: {}",
        failures.len(),
        join_failures(failures)
    )]
    NotificationFailed {
        notification_type: &'static str,
        failures: Vec<NotificationFailure>,
    },

    /// An untyped publish received a value that is not a known notification.
    #[error("Value of type {type_id:?} is not a registered notification")]
    NotANotification { type_id: TypeId },

    /// The operation observed a cancellation request.
    #[error("{operation} was cancelled")]
    Cancelled { operation: &'static str },
}

impl MediatorError {
    /// Returns the underlying handler error, if this is a handler failure.
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Handler(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the failures collected during a publish.
    pub fn notification_failures(&self) -> &[NotificationFailure] {
        match self {
            Self::NotificationFailed { failures, .. } => failures,
            _ => &[],
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type for mediator operations.
pub type Result<T> = std::result::Result<T, MediatorError>;
