//! Widget catalogue: a sample host for the mediator.
//!
//! Wires a [`mediator::Mediator`] with widget commands, queries and event
//! handlers, and publishes aggregate events through a
//! [`domain::DomainEventDispatcher`] once each command's unit of work
//! completes.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod store;
pub mod widget;

pub use app::{WidgetApp, registry};
pub use config::Config;
pub use error::{Result, WidgetError};
pub use handlers::{AuditEntry, AuditLog, WidgetCommands, WidgetMetrics, WidgetQueries};
pub use store::{UnitOfWork, WidgetStore};
pub use widget::{
    CreateWidget, DeleteWidget, GetWidget, ListWidgets, RenameWidget, Widget, WidgetCreated,
    WidgetDeleted, WidgetId, WidgetRenamed, WidgetView,
};
