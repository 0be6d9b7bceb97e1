//! Domain events and the pending-event buffer.

use std::any::Any;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use mediator::{CancellationToken, Mediator, Notification};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain and are
/// published as notifications once the unit of work that raised them has
/// committed. Every [`Notification`] is a domain event; this trait only
/// exists so events of different types can share one pending list.
pub trait DomainEvent: Send + Sync + 'static {
    /// Returns the event type name.
    ///
    /// Used as a log field and metric label.
    fn event_type(&self) -> &'static str;

    /// Publishes this event through `mediator` under its concrete type.
    fn publish<'a>(
        &'a self,
        mediator: &'a Mediator,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, mediator::Result<()>>;

    /// Returns the event as `Any` so callers can recover the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl<N: Notification> DomainEvent for N {
    fn event_type(&self) -> &'static str {
        N::notification_name()
    }

    fn publish<'a>(
        &'a self,
        mediator: &'a Mediator,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, mediator::Result<()>> {
        Box::pin(mediator.publish_with(self, cancel))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn DomainEvent {
    /// Downcasts to the concrete event type.
    pub fn downcast_ref<E: DomainEvent>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

/// Ordered list of events an aggregate has raised but not yet dispatched.
///
/// Aggregates embed one of these and record into it from their command
/// methods. Reading is non-destructive; only [`take`](Self::take) and
/// [`clear`](Self::clear) empty it.
#[derive(Default, Clone)]
pub struct DomainEvents {
    pending: Vec<Arc<dyn DomainEvent>>,
}

impl DomainEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event after all previously recorded ones.
    pub fn record<E: DomainEvent>(&mut self, event: E) {
        self.pending.push(Arc::new(event));
    }

    /// Returns the pending events in recording order without removing them.
    pub fn pending(&self) -> &[Arc<dyn DomainEvent>] {
        &self.pending
    }

    /// Removes and returns every pending event, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<Arc<dyn DomainEvent>> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl std::fmt::Debug for DomainEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.pending.iter().map(|event| event.event_type()))
            .finish()
    }
}
