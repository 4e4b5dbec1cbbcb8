use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Latency percentiles and throughput for one operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    #[serde(rename = "p50_us", with = "micros")]
    pub p50: Duration,
    #[serde(rename = "p99_us", with = "micros")]
    pub p99: Duration,
    pub ops_per_sec: f64,
}

/// Compute percentiles and throughput from a sample of latencies.
///
/// Percentiles are order statistics at zero-based indices `len*50/100` and
/// `len*99/100` of the sorted sample. Throughput is `n` over the summed
/// latencies, so for concurrent phases it reflects per-call cost rather
/// than wall-clock rate.
pub fn percentile_stats(n: usize, mut latencies: Vec<Duration>) -> OperationResult {
    if latencies.is_empty() {
        return OperationResult::default();
    }
    latencies.sort_unstable();

    let len = latencies.len();
    let p50 = latencies[len * 50 / 100];
    let p99 = latencies[len * 99 / 100];

    let total: Duration = latencies.iter().sum();
    let ops_per_sec = if total.is_zero() {
        0.0
    } else {
        n as f64 / total.as_secs_f64()
    };

    OperationResult {
        p50,
        p99,
        ops_per_sec,
    }
}

mod micros {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_micros)
    }
}
