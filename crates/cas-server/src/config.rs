use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use cas_bench::{BenchConfig, BenchSuite, ITERATIONS};
use cas_store::S3Config;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server settings. Every field has a default, so a TOML file only needs
/// the keys it changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Parent directory for the temporary databases of each run.
    pub data_dir: PathBuf,
    /// Calls per benchmark phase.
    pub iterations: usize,
    /// Remote bucket to include in runs. Defaults to the `MINIO_*` environment.
    pub s3: Option<S3Config>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_dir: std::env::temp_dir(),
            iterations: ITERATIONS,
            s3: S3Config::from_env(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// The suite a benchmark request runs.
    pub fn suite(&self) -> BenchSuite {
        BenchSuite::new(&self.data_dir)
            .with_config(BenchConfig::default().with_iterations(self.iterations))
            .with_s3(self.s3.clone())
    }
}
