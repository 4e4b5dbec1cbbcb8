use std::fmt;

use cas_store::StoreError;

/// Stage of the benchmark matrix an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Pre-populating objects for Get/Exists.
    Setup,
    Put,
    Get,
    Exists,
    ConcurrentPut,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Put => "Put",
            Self::Get => "Get",
            Self::Exists => "Exists",
            Self::ConcurrentPut => "ConcurrentPut",
        }
    }

    fn failure_prefix(&self) -> String {
        match self {
            Self::Setup => "setup Put".to_string(),
            other => format!("{} benchmark", other.as_str()),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a measurement.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// The measured operation itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} benchmark worker(s) panicked")]
    WorkerPanicked(usize),

    /// A measurement failed during `phase`.
    #[error("{} failed: {}", .phase.failure_prefix(), .source)]
    Aborted {
        phase: Phase,
        #[source]
        source: Box<BenchError>,
    },
}

impl BenchError {
    /// Attach the phase the error happened in.
    pub fn during(self, phase: Phase) -> Self {
        Self::Aborted {
            phase,
            source: Box::new(self),
        }
    }

    /// The phase recorded by [`BenchError::during`], if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Aborted { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Result alias for harness operations.
pub type BenchResult<T> = Result<T, BenchError>;
