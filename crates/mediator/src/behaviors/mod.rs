//! Cross-cutting behaviors shipped with the mediator.
//!
//! Both are generic over every [`Request`](crate::Request), so they can be
//! registered for value-returning and void requests alike.

mod logging;
mod validation;

pub use logging::LoggingBehavior;
pub use validation::{Validate, ValidationBehavior};
