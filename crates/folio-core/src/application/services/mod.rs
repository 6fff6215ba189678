//! Application services
//!
//! Services that orchestrate domain operations and provide the public API.

pub mod content_service;

pub use content_service::{Committed, ContentService};
