//! Application service layer
//!
//! This layer validates inbound edits, orchestrates the read-modify-write
//! cycle against the content store, and provides the public API for the
//! admin surface.

pub mod errors;
pub mod services;
pub mod validators;

pub use errors::{FieldError, ValidationErrors, ValidationReport};
