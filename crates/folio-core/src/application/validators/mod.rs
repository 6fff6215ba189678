//! Application validators
//!
//! Input validation for content edits.

pub mod project_validator;

pub use project_validator::ProjectValidator;
