//! In-memory document store
//!
//! Behaves like the GitHub store for the purposes of the sync protocol: each
//! accepted write bumps a per-document revision and issues a fresh tag, and a
//! write against a stale tag is refused without touching the document.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

use super::{DocumentStore, RawDocument, VersionTag};

/// An accepted write, kept for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub path: String,
    pub message: String,
    pub version: VersionTag,
}

#[derive(Debug)]
struct StoredDocument {
    bytes: Vec<u8>,
    revision: u64,
    version: VersionTag,
}

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<String, StoredDocument>,
    commits: Vec<CommitRecord>,
}

/// Thread-safe in-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a document out of band, replacing any existing content
    pub fn seed(&self, path: &str, bytes: Vec<u8>) -> VersionTag {
        let mut inner = self.lock();
        let revision = inner.documents.get(path).map_or(1, |d| d.revision + 1);
        let version = tag_for(path, revision, &bytes);
        inner.documents.insert(
            path.to_string(),
            StoredDocument {
                bytes,
                revision,
                version: version.clone(),
            },
        );
        version
    }

    /// Every write accepted through `put_document`, oldest first
    pub fn commits(&self) -> Vec<CommitRecord> {
        self.lock().commits.clone()
    }

    /// Current bytes of a document, if present
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().documents.get(path).map(|d| d.bytes.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Documents are replaced in a single assignment; poisoning cannot tear one.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn tag_for(path: &str, revision: u64, bytes: &[u8]) -> VersionTag {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hasher.update(revision.to_be_bytes());
    hasher.update(bytes);
    let digest = hex::encode(hasher.finalize());
    VersionTag::new(&digest[..40])
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, path: &str) -> Result<RawDocument> {
        let inner = self.lock();
        let doc = inner
            .documents
            .get(path)
            .ok_or_else(|| Error::DocumentNotFound(path.to_string()))?;
        Ok(RawDocument {
            bytes: doc.bytes.clone(),
            version: doc.version.clone(),
        })
    }

    async fn put_document(
        &self,
        path: &str,
        bytes: Vec<u8>,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag> {
        let mut inner = self.lock();
        let doc = inner
            .documents
            .get_mut(path)
            .ok_or_else(|| Error::DocumentNotFound(path.to_string()))?;

        if &doc.version != expected {
            return Err(Error::VersionConflict {
                document: path.to_string(),
            });
        }

        doc.revision += 1;
        doc.version = tag_for(path, doc.revision, &bytes);
        doc.bytes = bytes;
        let version = doc.version.clone();

        inner.commits.push(CommitRecord {
            path: path.to_string(),
            message: message.to_string(),
            version: version.clone(),
        });
        Ok(version)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
