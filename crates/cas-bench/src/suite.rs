use std::path::{Path, PathBuf};

use cas_store::{
    ObjectStore, RedbObjectStore, S3Config, S3ObjectStore, SqliteObjectStore, StoreError,
    StoreResult,
};
use tracing::{info, warn};

use crate::matrix::{run_backend_with, BenchConfig};
use crate::report::{BackendResult, RunResult};

/// Runs the benchmark matrix against every configured backend, one at a time.
///
/// Local backends get a fresh temporary directory under `work_dir` that is
/// removed when their run ends. The S3 backend is included only when a
/// bucket is configured. Every store is flushed after its run.
#[derive(Clone, Debug)]
pub struct BenchSuite {
    config: BenchConfig,
    work_dir: PathBuf,
    s3: Option<S3Config>,
}

impl BenchSuite {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: BenchConfig::default(),
            work_dir: work_dir.into(),
            s3: None,
        }
    }

    pub fn with_config(mut self, config: BenchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_s3(mut self, s3: Option<S3Config>) -> Self {
        self.s3 = s3;
        self
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Names of the backends [`BenchSuite::run`] will visit, in order.
    pub fn backend_names(&self) -> Vec<&'static str> {
        let mut names = vec!["SQLite", "redb"];
        if self.s3.is_some() {
            names.push("S3");
        }
        names
    }

    /// Benchmark every backend. Blocks until the last one finishes.
    pub fn run(&self) -> RunResult {
        info!(
            backends = ?self.backend_names(),
            iterations = self.config.iterations,
            "starting benchmark run"
        );
        let mut backends = vec![
            self.run_local("SQLite", "sqlite", |dir| {
                SqliteObjectStore::open(dir.join("objects.db"))
            }),
            self.run_local("redb", "redb", |dir| {
                RedbObjectStore::open(dir.join("objects.redb"))
            }),
        ];
        if let Some(s3) = &self.s3 {
            backends.push(self.run_store("S3", || S3ObjectStore::connect(s3)));
        }
        let failed = backends.iter().filter(|b| b.is_failed()).count();
        info!(backends = backends.len(), failed, "benchmark run complete");
        RunResult::new(backends)
    }

    fn run_local<S, F>(&self, name: &str, backend: &'static str, open: F) -> BackendResult
    where
        S: ObjectStore,
        F: FnOnce(&Path) -> StoreResult<S>,
    {
        let dir = match tempfile::Builder::new()
            .prefix("cas-bench-")
            .tempdir_in(&self.work_dir)
        {
            Ok(dir) => dir,
            Err(err) => {
                let err = StoreError::init(backend, err);
                warn!(backend = name, error = %err, "skipping backend");
                return BackendResult::failed(name, err.to_string());
            }
        };
        self.run_store(name, || open(dir.path()))
    }

    fn run_store<S, F>(&self, name: &str, open: F) -> BackendResult
    where
        S: ObjectStore,
        F: FnOnce() -> StoreResult<S>,
    {
        let store = match open() {
            Ok(store) => store,
            Err(err) => {
                warn!(backend = name, error = %err, "skipping backend");
                return BackendResult::failed(name, err.to_string());
            }
        };

        info!(backend = name, "benchmarking backend");
        let result = run_backend_with(&self.config, name, &store);
        match store.flush() {
            Ok(removed) => info!(backend = name, removed, "cleaned up backend"),
            Err(err) => warn!(backend = name, error = %err, "failed to clean up backend"),
        }
        result
    }
}
