use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use cas_store::{StoreError, StoreResult};
use crossbeam::channel;
use tracing::debug;

use crate::error::{BenchError, BenchResult};
use crate::stats::{percentile_stats, OperationResult};

/// Time `n` sequential calls of `op`, passing each call its iteration index.
///
/// The first error aborts the measurement; no statistics are produced for
/// an aborted run.
pub fn measure<F>(n: usize, mut op: F) -> BenchResult<OperationResult>
where
    F: FnMut(usize) -> StoreResult<()>,
{
    let mut latencies = Vec::with_capacity(n);
    for i in 0..n {
        let start = Instant::now();
        op(i)?;
        latencies.push(start.elapsed());
    }
    Ok(percentile_stats(n, latencies))
}

/// Time `n` calls of `op` spread over one worker per available CPU.
pub fn measure_concurrent<F>(n: usize, op: F) -> BenchResult<OperationResult>
where
    F: Fn(usize) -> StoreResult<()> + Sync,
{
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    measure_concurrent_with(workers, n, op)
}

/// Time `n` calls of `op` on `workers` threads.
///
/// Iteration indices go through a shared queue. Each worker writes the
/// latency of index `i` into slot `i` of a pre-sized arena; slots are never
/// shared, so the arena is a plain vector of atomics with no lock. A worker
/// that hits an error reports it once and stops taking work. After every
/// worker has finished, any reported error aborts the whole measurement and
/// the collected latencies are dropped.
pub fn measure_concurrent_with<F>(workers: usize, n: usize, op: F) -> BenchResult<OperationResult>
where
    F: Fn(usize) -> StoreResult<()> + Sync,
{
    if n == 0 {
        return Ok(OperationResult::default());
    }
    let workers = workers.clamp(1, n);

    let (job_tx, job_rx) = channel::bounded::<usize>(n);
    for i in 0..n {
        // Capacity is `n` and `job_rx` is alive, so this cannot block or fail.
        let _ = job_tx.send(i);
    }
    drop(job_tx);

    let (err_tx, err_rx) = channel::bounded::<StoreError>(workers);
    let arena: Vec<AtomicU64> = (0..n).map(|_| AtomicU64::new(0)).collect();

    let panicked = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let jobs = job_rx.clone();
                let errors = err_tx.clone();
                let arena = &arena;
                let op = &op;
                scope.spawn(move || {
                    for i in jobs.iter() {
                        let start = Instant::now();
                        if let Err(err) = op(i) {
                            let _ = errors.try_send(err);
                            return;
                        }
                        let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
                        arena[i].store(nanos, Ordering::Relaxed);
                    }
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(Result::is_err)
            .count()
    });
    drop(err_tx);

    if let Ok(err) = err_rx.try_recv() {
        return Err(err.into());
    }
    if panicked > 0 {
        return Err(BenchError::WorkerPanicked(panicked));
    }

    debug!(workers, n, "concurrent measurement complete");
    let latencies: Vec<Duration> = arena
        .into_iter()
        .map(|slot| Duration::from_nanos(slot.into_inner()))
        .collect();
    Ok(percentile_stats(n, latencies))
}
