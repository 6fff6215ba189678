//! Folio Core Library
//!
//! This crate provides the content backend of a portfolio site, including:
//! - Domain types (projects, portfolio sections)
//! - Project validation and sanitization
//! - Versioned document storage (GitHub contents API, in-memory)
//! - Optimistic read-modify-write coordination of content edits
//! - Local fallback reads when the store is unavailable
//! - Shared-password admin sessions

pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::application::services::{Committed, ContentService};
    pub use crate::application::validators::ProjectValidator;
    pub use crate::auth::{AdminAuth, SessionStatus, SessionToken};
    pub use crate::config::Config;
    pub use crate::domain::{PortfolioDocument, Project, ProjectInput, Section, SectionUpdate};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::storage::{ContentStoreClient, DocumentStore, MemoryStore, VersionTag};
}
