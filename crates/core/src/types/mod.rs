//! Core types for the catalog aggregator.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod page;

pub use id::*;
pub use page::PageRequest;
