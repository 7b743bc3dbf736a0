//! Shared utilities and common types for the marketplace backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Geodesic distance computation
//! - Offset/limit pagination helpers
//! - Common validation logic

pub mod geo;
pub mod pagination;
pub mod validation;
