//! Leaf types shared by every crate in the workspace.
//!
//! [`Unit`] stands in for "no response" so fire-and-forget requests can
//! travel through the same dispatch machinery as value-returning ones.

mod unit;

pub use unit::Unit;
