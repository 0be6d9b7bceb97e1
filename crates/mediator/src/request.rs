//! Message traits: requests, void requests, and notifications.

/// An intent that produces exactly one response from exactly one handler.
///
/// Requests are plain data. The response type is fixed at the type level, so
/// [`Mediator::send`](crate::Mediator::send) is fully typed end to end.
pub trait Request: Send + Sync + 'static {
    /// The value the handler produces.
    type Response: Send + 'static;

    /// Name used in errors, logs, and metric labels.
    fn request_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// An intent that produces no meaningful response.
///
/// Void requests are dispatched with [`Mediator::fire`](crate::Mediator::fire)
/// and travel through the same pipeline as [`Request`]s.
pub trait VoidRequest: Send + Sync + 'static {
    fn request_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A fact that already happened. Zero or more handlers may react to it.
pub trait Notification: Send + Sync + 'static {
    fn notification_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}
