//! Storage clients: the blob store for images and the document store for
//! category records, with in-memory, Postgres and S3 backends.

pub mod blob;
pub mod document;
pub mod memory;
pub mod postgres;
pub mod s3;
pub mod subscription;

pub use blob::{BlobError, BlobErrorKind, BlobOp, BlobStore};
pub use document::{CategoryFilter, DocumentStore, StoreError};
pub use memory::{MemoryBlobStore, MemoryDocumentStore};
pub use postgres::PgDocumentStore;
pub use s3::{S3BlobStore, S3Config};
pub use subscription::Subscription;
