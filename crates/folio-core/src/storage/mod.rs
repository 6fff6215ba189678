//! Storage layer - versioned JSON documents
//!
//! Content lives in an external, versioned document store (a GitHub
//! repository in production). Every read returns the document's bytes with an
//! opaque version tag; every write must present the tag from the read it was
//! based on, and the store refuses the write if the tag is stale.
//!
//! # Architecture
//!
//! - `DocumentStore`: raw byte-level get/put against the external store
//! - `github`: the GitHub contents API implementation
//! - `memory`: in-process implementation for tests and offline use
//! - `client`: typed JSON fetch/write on top of a store, aware of configuration
//! - `local`: the bundled read-only copy used when the store is unavailable
//!
//! # Usage
//!
//! ```ignore
//! use folio_core::storage::{ContentStoreClient, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let client = ContentStoreClient::with_store(store);
//! let doc = client.fetch_document::<Vec<Project>>("data/projects.json").await?;
//! client.write_document("data/projects.json", &doc.value, &doc.version, "chore: touch").await?;
//! ```

pub mod client;
pub mod github;
pub mod local;
pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use client::ContentStoreClient;
pub use github::GitHubStore;
pub use local::LocalFallbackReader;
pub use memory::{CommitRecord, MemoryStore};

/// The two documents the site persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Projects,
    Portfolio,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Projects => "projects",
            DocumentKind::Portfolio => "portfolio",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque revision identifier issued by the store
///
/// Only ever compared for equality. A tag is valid for the next write of the
/// document it was read from, and changes whenever that document is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded document paired with the tag it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDocument<T> {
    pub value: T,
    pub version: VersionTag,
}

/// Undecoded document bytes and their tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub version: VersionTag,
}

/// External versioned document store
///
/// Implementations must serialize writes per path: a `put_document` whose
/// `expected` tag is not the current one fails with `Error::VersionConflict`
/// and leaves the stored document untouched.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the current bytes and tag of the document at `path`
    async fn get_document(&self, path: &str) -> Result<RawDocument>;

    /// Replace the document at `path` if its current tag equals `expected`
    ///
    /// `message` is recorded with the write for provenance and is not
    /// interpreted. Returns the tag of the new revision.
    async fn put_document(
        &self,
        path: &str,
        bytes: Vec<u8>,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}
