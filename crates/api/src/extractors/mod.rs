//! Request extractors.

pub mod caller;

pub use caller::CallerId;
