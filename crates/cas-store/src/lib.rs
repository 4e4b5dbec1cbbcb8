//! Content-addressed object storage.
//!
//! Every backend stores git loose objects: the zlib-deflated canonical form of
//! an [`Object`](cas_object::Object), keyed by the lowercase hex SHA-1 of the
//! uncompressed form. The addressing and idempotency contract is identical
//! across backends; only the mechanism differs.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`RedbObjectStore`] -- embedded ordered key-value engine (redb)
//! - [`SqliteObjectStore`] -- single-connection SQLite in WAL mode
//! - [`S3ObjectStore`] -- remote S3-compatible bucket (MinIO, AWS, ...)
//!
//! # Design Rules
//!
//! 1. Puts are idempotent: the same content yields the same id and one entry.
//! 2. Only compressed bytes are persisted, never the raw object.
//! 3. A missing key is `StoreError::NotFound` on `get` and `Ok(false)` on
//!    `exists`, never any other error.
//! 4. Engine failures are wrapped with context and the original cause.

pub mod error;
pub mod memory;
pub mod redb_store;
pub mod s3_store;
pub mod sqlite_store;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{BoxError, StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use redb_store::RedbObjectStore;
pub use s3_store::{S3Config, S3ObjectStore};
pub use sqlite_store::SqliteObjectStore;
pub use traits::ObjectStore;

#[cfg(test)]
pub(crate) mod contract;
