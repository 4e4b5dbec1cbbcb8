use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::OperationResult;

/// Measurements for one payload size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeResult {
    pub size_label: String,
    pub size_bytes: usize,
    pub put: OperationResult,
    pub get: OperationResult,
    pub exists: OperationResult,
    pub concurrent_put: OperationResult,
}

/// Outcome of benchmarking one backend: a full matrix or an error, never both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendResult {
    pub name: String,
    #[serde(default)]
    pub sizes: Vec<SizeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendResult {
    pub fn completed(name: impl Into<String>, sizes: Vec<SizeResult>) -> Self {
        Self {
            name: name.into(),
            sizes,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sizes: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// One benchmark run across every configured backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub timestamp: DateTime<Utc>,
    pub backends: Vec<BackendResult>,
}

impl RunResult {
    /// A run stamped with the current time.
    pub fn new(backends: Vec<BackendResult>) -> Self {
        Self {
            timestamp: Utc::now(),
            backends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::time::Duration;

    fn op(us: u64) -> OperationResult {
        OperationResult {
            p50: Duration::from_micros(us),
            p99: Duration::from_micros(us * 2),
            ops_per_sec: 10.0,
        }
    }

    fn sample_run() -> RunResult {
        let size = SizeResult {
            size_label: "small (1KB)".into(),
            size_bytes: 1024,
            put: op(10),
            get: op(5),
            exists: op(1),
            concurrent_put: op(20),
        };
        RunResult {
            timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            backends: vec![
                BackendResult::completed("SQLite", vec![size]),
                BackendResult::failed("S3", "setup Put failed: s3: put object: timeout"),
            ],
        }
    }

    #[test]
    fn report_json_shape() {
        let value = serde_json::to_value(sample_run()).unwrap();
        assert_eq!(value["timestamp"], json!("2026-01-02T03:04:05Z"));

        let sqlite = &value["backends"][0];
        assert_eq!(sqlite["name"], json!("SQLite"));
        assert!(sqlite.get("error").is_none());
        let size = &sqlite["sizes"][0];
        assert_eq!(size["size_label"], json!("small (1KB)"));
        assert_eq!(size["size_bytes"], json!(1024));
        assert_eq!(size["put"]["p50_us"], json!(10));
        assert_eq!(size["concurrent_put"]["p99_us"], json!(40));

        let s3 = &value["backends"][1];
        assert_eq!(s3["sizes"], json!([]));
        assert_eq!(s3["error"], json!("setup Put failed: s3: put object: timeout"));
    }

    #[test]
    fn report_parses_back() {
        let run = sample_run();
        let json = serde_json::to_string(&run).unwrap();
        let parsed: RunResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, run);
    }

    #[test]
    fn failed_backends_are_flagged() {
        let run = sample_run();
        assert!(!run.backends[0].is_failed());
        assert!(run.backends[1].is_failed());
    }
}
