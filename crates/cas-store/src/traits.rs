use cas_object::{Object, ObjectId};

use crate::error::StoreResult;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - `put` is idempotent: equal `(type, data)` always yields the same id and
///   leaves exactly one stored entry.
/// - Only the deflated canonical form is persisted.
/// - `get` on an absent id fails with `StoreError::NotFound`.
/// - `exists` on an absent id returns `Ok(false)`; it never fails for absence.
/// - Engine errors are propagated with their cause, never silently ignored.
///
/// Every call is blocking. Implementations are shared across benchmark worker
/// threads, hence `Send + Sync`.
pub trait ObjectStore: Send + Sync {
    /// Short display name of the backend (used in reports and logs).
    fn name(&self) -> &str;

    /// Encode and store an object, returning its content address.
    ///
    /// If the object already exists, nothing is written.
    fn put(&self, object: &Object) -> StoreResult<ObjectId>;

    /// Fetch and decode the object stored under `id`.
    ///
    /// The hash of the decoded object is not re-verified.
    fn get(&self, id: &ObjectId) -> StoreResult<Object>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Remove every stored object and return how many were removed.
    ///
    /// This is intended for reclaiming space after benchmark runs only.
    fn flush(&self) -> StoreResult<usize>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn put(&self, object: &Object) -> StoreResult<ObjectId> {
        (**self).put(object)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Object> {
        (**self).get(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        (**self).exists(id)
    }

    fn flush(&self) -> StoreResult<usize> {
        (**self).flush()
    }
}
