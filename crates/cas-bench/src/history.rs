use parking_lot::Mutex;

use crate::report::RunResult;

/// Completed benchmark runs, oldest first.
///
/// Lives for the process and is never persisted. A single lock covers both
/// appends and snapshots.
#[derive(Debug, Default)]
pub struct BenchHistory {
    runs: Mutex<Vec<RunResult>>,
}

impl BenchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, run: RunResult) {
        self.runs.lock().push(run);
    }

    /// Copy of every recorded run.
    pub fn snapshot(&self) -> Vec<RunResult> {
        self.runs.lock().clone()
    }

    pub fn latest(&self) -> Option<RunResult> {
        self.runs.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.runs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::BackendResult;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn record_and_snapshot() {
        let history = BenchHistory::new();
        assert!(history.is_empty());
        assert!(history.latest().is_none());

        history.record(RunResult::new(vec![BackendResult::failed("a", "x")]));
        history.record(RunResult::new(vec![]));

        let runs = history.snapshot();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].backends[0].name, "a");
        assert!(history.latest().unwrap().backends.is_empty());
    }

    #[test]
    fn snapshot_is_detached() {
        let history = BenchHistory::new();
        let before = history.snapshot();
        history.record(RunResult::new(vec![]));
        assert!(before.is_empty());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn concurrent_records_are_all_kept() {
        let history = Arc::new(BenchHistory::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let history = Arc::clone(&history);
                thread::spawn(move || {
                    for _ in 0..25 {
                        history.record(RunResult::new(vec![]));
                        let _ = history.snapshot();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(history.len(), 200);
    }
}
