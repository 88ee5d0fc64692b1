use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::ImageFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobOp {
    Upload,
    Delete,
}

impl fmt::Display for BlobOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobOp::Upload => f.write_str("upload"),
            BlobOp::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobErrorKind {
    PermissionDenied,
    Canceled,
    Unknown,
}

/// Failure reported by a blob store, tagged with the operation that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to {op} image `{path}`: {message}")]
pub struct BlobError {
    pub op: BlobOp,
    pub kind: BlobErrorKind,
    pub path: String,
    pub message: String,
}

impl BlobError {
    pub fn new(op: BlobOp, kind: BlobErrorKind, path: &str, message: impl Into<String>) -> Self {
        Self {
            op,
            kind,
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn upload(kind: BlobErrorKind, path: &str, message: impl Into<String>) -> Self {
        Self::new(BlobOp::Upload, kind, path, message)
    }

    pub fn delete(kind: BlobErrorKind, path: &str, message: impl Into<String>) -> Self {
        Self::new(BlobOp::Delete, kind, path, message)
    }
}

/// Path-addressed object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `file` at `path` and return a durable, publicly fetchable URL.
    async fn upload(&self, file: &ImageFile, path: &str) -> Result<String, BlobError>;

    /// Remove the object at `path`. A missing object is not an error.
    async fn delete(&self, path: &str) -> Result<(), BlobError>;
}
