//! Domain-side plumbing for the dispatch runtime.
//!
//! This crate provides:
//! - `DomainEvent`, an object-safe view of any notification
//! - `DomainEvents`, the ordered pending-event buffer aggregates embed
//! - `Aggregate`, the contract for draining that buffer
//! - `DomainEventDispatcher`, which publishes drained events after a unit of work

pub mod aggregate;
pub mod dispatcher;
pub mod event;

pub use aggregate::Aggregate;
pub use dispatcher::DomainEventDispatcher;
pub use event::{DomainEvent, DomainEvents};
