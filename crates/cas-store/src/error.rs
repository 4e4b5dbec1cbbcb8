use cas_object::{CodecError, ObjectId};

/// Boxed, thread-safe error used to carry a backend's originating cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// Stored bytes could not be decoded, or an object could not be encoded.
    #[error("malformed object: {0}")]
    Format(#[from] CodecError),

    /// The storage engine could not be opened or created.
    #[error("failed to open {backend} backend: {source}")]
    Init {
        backend: &'static str,
        #[source]
        source: BoxError,
    },

    /// A lower-level engine or network failure.
    #[error("{backend}: {context}: {source}")]
    Backend {
        backend: &'static str,
        context: String,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    pub fn init(backend: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Init {
            backend,
            source: source.into(),
        }
    }

    pub fn backend(
        backend: &'static str,
        context: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Backend {
            backend,
            context: context.into(),
            source: source.into(),
        }
    }

    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn backend_error_keeps_source() {
        let io = std::io::Error::other("disk on fire");
        let err = StoreError::backend("redb", "commit", io);
        assert_eq!(err.to_string(), "redb: commit: disk on fire");
        assert!(err.source().is_some());
        assert!(!err.is_not_found());
    }

    #[test]
    fn init_error_message() {
        let err = StoreError::init("sqlite", "unable to open database file");
        assert_eq!(
            err.to_string(),
            "failed to open sqlite backend: unable to open database file"
        );
    }

    #[test]
    fn not_found_is_detected() {
        let err = StoreError::NotFound(ObjectId::null());
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "object not found: 0000000000000000000000000000000000000000"
        );
    }
}
