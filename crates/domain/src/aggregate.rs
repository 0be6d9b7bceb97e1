//! The aggregate contract consumed by the event dispatcher.

use std::sync::Arc;

use crate::event::DomainEvent;

/// Trait for aggregates that raise domain events.
///
/// An aggregate is a cluster of domain objects treated as a single unit of
/// consistency. While handling a command it records events into a private,
/// ordered list; once the surrounding unit of work has saved the aggregate,
/// the list is drained and each event is published exactly once.
///
/// Aggregates are single-writer: draining takes `&mut self`.
///
/// Most implementations embed a [`DomainEvents`](crate::DomainEvents) buffer
/// and forward to it:
///
/// ```
/// use std::sync::Arc;
/// use domain::{Aggregate, DomainEvent, DomainEvents};
///
/// #[derive(Default)]
/// struct Counter {
///     events: DomainEvents,
/// }
///
/// impl Aggregate for Counter {
///     fn pending_events(&self) -> Vec<Arc<dyn DomainEvent>> {
///         self.events.pending().to_vec()
///     }
///
///     fn clear_pending_events(&mut self) {
///         self.events.clear();
///     }
/// }
/// ```
pub trait Aggregate: Send {
    /// Returns the aggregate type name, used as a log field.
    fn aggregate_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns a snapshot of the pending events in the order they were raised.
    ///
    /// Must not modify the list.
    fn pending_events(&self) -> Vec<Arc<dyn DomainEvent>>;

    /// Empties the pending list.
    fn clear_pending_events(&mut self);

    /// Snapshots then clears the pending list.
    fn take_pending_events(&mut self) -> Vec<Arc<dyn DomainEvent>> {
        let events = self.pending_events();
        self.clear_pending_events();
        events
    }
}
