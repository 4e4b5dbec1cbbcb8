use cas_object::{Object, ObjectId};
use cas_store::ObjectStore;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BenchError, BenchResult, Phase};
use crate::measure::{measure, measure_concurrent};
use crate::report::{BackendResult, SizeResult};

/// Calls per measured phase.
pub const ITERATIONS: usize = 100;

/// A payload size in the benchmark matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSize {
    pub label: String,
    pub bytes: usize,
}

impl PayloadSize {
    pub fn new(label: impl Into<String>, bytes: usize) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }

    /// Small (1 KiB), medium (100 KiB) and large (1 MiB).
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("small (1KB)", 1024),
            Self::new("medium (100KB)", 100 * 1024),
            Self::new("large (1MB)", 1024 * 1024),
        ]
    }
}

/// Shape of the benchmark matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Calls per phase, and objects pre-populated per size.
    pub iterations: usize,
    pub sizes: Vec<PayloadSize>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: ITERATIONS,
            sizes: PayloadSize::defaults(),
        }
    }
}

impl BenchConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_sizes(mut self, sizes: Vec<PayloadSize>) -> Self {
        self.sizes = sizes;
        self
    }
}

/// Run the default matrix against `store`.
pub fn run_backend<S: ObjectStore + ?Sized>(name: &str, store: &S) -> BackendResult {
    run_backend_with(&BenchConfig::default(), name, store)
}

/// Run `config`'s matrix against `store`.
///
/// Never fails: an aborted phase turns the whole result into an error entry.
pub fn run_backend_with<S: ObjectStore + ?Sized>(
    config: &BenchConfig,
    name: &str,
    store: &S,
) -> BackendResult {
    let mut sizes = Vec::with_capacity(config.sizes.len());
    for size in &config.sizes {
        match run_size(config.iterations, size, store) {
            Ok(result) => sizes.push(result),
            Err(err) => {
                warn!(backend = name, size = %size.label, error = %err, "benchmark aborted");
                return BackendResult::failed(name, err.to_string());
            }
        }
    }
    BackendResult::completed(name, sizes)
}

fn run_size<S: ObjectStore + ?Sized>(
    n: usize,
    size: &PayloadSize,
    store: &S,
) -> BenchResult<SizeResult> {
    info!(backend = store.name(), size = %size.label, iterations = n, "benchmarking size");

    let mut ids: Vec<ObjectId> = Vec::with_capacity(n);
    for _ in 0..n {
        let id = store
            .put(&random_blob(size.bytes))
            .map_err(|e| BenchError::from(e).during(Phase::Setup))?;
        ids.push(id);
    }

    let payload = random_blob(size.bytes);
    let put = measure(n, |_| store.put(&payload).map(drop)).map_err(|e| e.during(Phase::Put))?;
    let get = measure(n, |i| store.get(&ids[i % ids.len()]).map(drop))
        .map_err(|e| e.during(Phase::Get))?;
    let exists = measure(n, |i| store.exists(&ids[i % ids.len()]).map(drop))
        .map_err(|e| e.during(Phase::Exists))?;
    let concurrent_put = measure_concurrent(n, |_| store.put(&random_blob(size.bytes)).map(drop))
        .map_err(|e| e.during(Phase::ConcurrentPut))?;

    Ok(SizeResult {
        size_label: size.label.clone(),
        size_bytes: size.bytes,
        put,
        get,
        exists,
        concurrent_put,
    })
}

fn random_blob(len: usize) -> Object {
    let mut data = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut data);
    Object::blob(data)
}
