use std::collections::HashMap;

use cas_object::{codec, Object, ObjectId};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Objects go through the same codec as the
/// persistent backends, so the map holds compressed bytes keyed by id.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn put(&self, object: &Object) -> StoreResult<ObjectId> {
        let encoded = object.encode()?;
        let id = encoded.id;
        // Same id always means same content, so an existing entry is kept.
        self.objects.write().entry(id).or_insert(encoded.compressed);
        debug!(id = %id, "memory put");
        Ok(id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Object> {
        let map = self.objects.read();
        let compressed = map.get(id).ok_or(StoreError::NotFound(*id))?;
        Ok(codec::decode(compressed)?)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.objects.read().contains_key(id))
    }

    fn flush(&self) -> StoreResult<usize> {
        let mut map = self.objects.write();
        let removed = map.len();
        map.clear();
        Ok(removed)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
