//! Middleware for request processing.

pub mod logging;
pub mod trace_id;

pub use trace_id::trace_id;
