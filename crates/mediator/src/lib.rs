//! In-process request dispatch.
//!
//! A [`Mediator`] routes each [`Request`] to its single registered
//! [`RequestHandler`], wrapped by any [`PipelineBehavior`]s registered for
//! that request type. [`VoidRequest`]s run through the same pipeline and
//! yield [`Unit`]. [`Notification`]s fan out concurrently to every
//! registered [`NotificationHandler`].
//!
//! ```no_run
//! use async_trait::async_trait;
//! use mediator::{CancellationToken, Mediator, Registry, Request, RequestHandler};
//!
//! struct Ping;
//!
//! impl Request for Ping {
//!     type Response = &'static str;
//! }
//!
//! struct PingHandler;
//!
//! #[async_trait]
//! impl RequestHandler<Ping> for PingHandler {
//!     async fn handle(&self, _: &Ping, _: &CancellationToken) -> anyhow::Result<&'static str> {
//!         Ok("pong")
//!     }
//! }
//!
//! # async fn run() -> mediator::Result<()> {
//! let registry = Registry::builder().handler::<Ping, _>(PingHandler).build()?;
//! let mediator = Mediator::new(registry);
//! assert_eq!(mediator.send(Ping).await?, "pong");
//! # Ok(())
//! # }
//! ```

pub mod behaviors;
pub mod cancellation;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod pipeline;
mod publish;
pub mod registry;
pub mod request;
mod void;

pub use behaviors::{LoggingBehavior, Validate, ValidationBehavior};
pub use cancellation::CancellationToken;
pub use common::Unit;
pub use config::{MediatorConfig, ParsePublishStrategyError, PublishStrategy};
pub use dispatcher::Mediator;
pub use error::{MediatorError, NotificationFailure, Result};
pub use handler::{NotificationHandler, RequestHandler, VoidRequestHandler};
pub use pipeline::{Next, PipelineBehavior};
pub use registry::{Registry, RegistryBuilder};
pub use request::{Notification, Request, VoidRequest};
