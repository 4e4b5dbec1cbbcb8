use std::future::Future;

use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use cas_object::{codec, Object, ObjectId};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::error::{BoxError, StoreError, StoreResult};
use crate::traits::ObjectStore;

const BACKEND: &str = "s3";
const CONTENT_TYPE: &str = "application/octet-stream";
const DEFAULT_REGION: &str = "us-east-1";

fn io_err<E: Into<BoxError>>(context: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::backend(BACKEND, context, e)
}

/// Connection settings for an S3-compatible bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    /// Host (and optional port) of the endpoint, with or without a scheme.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Scheme used when `endpoint` has none.
    #[serde(default = "default_use_ssl")]
    pub use_ssl: bool,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_use_ssl() -> bool {
    true
}

impl S3Config {
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            bucket: bucket.into(),
            region: default_region(),
            use_ssl: default_use_ssl(),
        }
    }

    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Read settings from the environment.
    ///
    /// Each setting has a `MINIO_*` name and a provider-neutral fallback:
    /// `MINIO_ENDPOINT`/`ENDPOINT`, `MINIO_ACCESS_KEY`/`ACCESS_KEY_ID`,
    /// `MINIO_SECRET_KEY`/`SECRET_ACCESS_KEY`, `MINIO_BUCKET`/`BUCKET`,
    /// `MINIO_REGION`/`REGION`. Returns `None` when no endpoint is set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let var = |primary: &str, fallback: &str| {
            lookup(primary)
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(fallback).filter(|v| !v.is_empty()))
        };
        let endpoint = var("MINIO_ENDPOINT", "ENDPOINT")?;
        Some(Self {
            endpoint,
            access_key: var("MINIO_ACCESS_KEY", "ACCESS_KEY_ID").unwrap_or_default(),
            secret_key: var("MINIO_SECRET_KEY", "SECRET_ACCESS_KEY").unwrap_or_default(),
            bucket: var("MINIO_BUCKET", "BUCKET").unwrap_or_else(|| "git-objects".to_string()),
            region: var("MINIO_REGION", "REGION").unwrap_or_else(default_region),
            use_ssl: default_use_ssl(),
        })
    }

    /// Endpoint as a URL. A scheme already present in `endpoint` wins.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            return self.endpoint.trim_end_matches('/').to_string();
        }
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{scheme}://{}", self.endpoint.trim_end_matches('/'))
    }
}

/// Object store backed by a remote S3-compatible bucket.
///
/// Object key = hex address, body = deflated object. Put checks for the key
/// before uploading to skip redundant transfers. There is no cross-caller
/// lock: two callers racing on identical content both upload, and the last
/// write wins with identical bytes.
///
/// The AWS SDK is async; the store owns a small tokio runtime and blocks on
/// it so the [`ObjectStore`] surface stays synchronous. Calls have no
/// deadline of their own.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    runtime: Runtime,
}

impl S3ObjectStore {
    /// Connect to the endpoint and create the bucket if it does not exist.
    ///
    /// Must not be called from inside an async context.
    pub fn connect(config: &S3Config) -> StoreResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("cas-s3")
            .enable_all()
            .build()
            .map_err(|e| StoreError::init(BACKEND, e))?;

        let client = runtime.block_on(build_client(config));
        let store = Self {
            client,
            bucket: config.bucket.clone(),
            runtime,
        };
        store
            .block_on(store.ensure_bucket(&config.region))
            .map_err(|e| StoreError::init(BACKEND, e))?;

        info!(
            endpoint = %config.endpoint_url(),
            bucket = %store.bucket,
            "connected s3 object store"
        );
        Ok(store)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    async fn ensure_bucket(&self, region: &str) -> Result<(), BoxError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => return Ok(()),
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false);
                if !missing {
                    return Err(err.into());
                }
            }
        }

        let mut request = self.client.create_bucket().bucket(&self.bucket);
        if region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }
        match request.send().await {
            Ok(_) => {
                info!(bucket = %self.bucket, "created bucket");
                Ok(())
            }
            Err(err)
                if err.as_service_error().is_some_and(|e| {
                    e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists()
                }) =>
            {
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Number of stored objects (lists the whole bucket).
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.list_keys()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn list_keys(&self) -> StoreResult<Vec<String>> {
        self.block_on(async {
            let mut keys = Vec::new();
            let mut token: Option<String> = None;
            loop {
                let page = self
                    .client
                    .list_objects_v2()
                    .bucket(&self.bucket)
                    .set_continuation_token(token.take())
                    .send()
                    .await
                    .map_err(io_err("list objects"))?;
                keys.extend(
                    page.contents()
                        .iter()
                        .filter_map(|obj| obj.key().map(str::to_string)),
                );
                match page.next_continuation_token() {
                    Some(next) if page.is_truncated().unwrap_or(false) => {
                        token = Some(next.to_string());
                    }
                    _ => break,
                }
            }
            Ok(keys)
        })
    }
}

async fn build_client(config: &S3Config) -> Client {
    let credentials = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "cas-static",
    );
    let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .endpoint_url(config.endpoint_url())
        .credentials_provider(credentials)
        .load()
        .await;
    // MinIO and most self-hosted endpoints only speak path-style addressing.
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .build();
    Client::from_conf(s3_config)
}

impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "S3"
    }

    fn put(&self, object: &Object) -> StoreResult<ObjectId> {
        let encoded = object.encode()?;
        if self.exists(&encoded.id)? {
            debug!(id = %encoded.id, inserted = false, "s3 put");
            return Ok(encoded.id);
        }

        self.block_on(
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(encoded.id.to_hex())
                .content_type(CONTENT_TYPE)
                .body(ByteStream::from(encoded.compressed))
                .send(),
        )
        .map_err(io_err("put object"))?;
        debug!(id = %encoded.id, inserted = true, "s3 put");
        Ok(encoded.id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Object> {
        let compressed = self.block_on(async {
            let output = match self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(id.to_hex())
                .send()
                .await
            {
                Ok(output) => output,
                Err(err)
                    if err
                        .as_service_error()
                        .is_some_and(|e| e.is_no_such_key()) =>
                {
                    return Err(StoreError::NotFound(*id));
                }
                Err(err) => return Err(io_err("get object")(err)),
            };
            let body = output
                .body
                .collect()
                .await
                .map_err(io_err("read object body"))?;
            Ok(body.into_bytes().to_vec())
        })?;
        Ok(codec::decode(&compressed)?)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let result = self.block_on(
            self.client
                .head_object()
                .bucket(&self.bucket)
                .key(id.to_hex())
                .send(),
        );
        match result {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(io_err("stat object")(err)),
        }
    }

    fn flush(&self) -> StoreResult<usize> {
        let keys = self.list_keys()?;
        self.block_on(async {
            for key in &keys {
                self.client
                    .delete_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(io_err("remove object"))?;
            }
            Ok::<_, StoreError>(())
        })?;
        info!(removed = keys.len(), bucket = %self.bucket, "flushed s3 object store");
        Ok(keys.len())
    }
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("bucket", &self.bucket)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_from_minio_variables() {
        let config = S3Config::from_lookup(lookup(&[
            ("MINIO_ENDPOINT", "localhost:9000"),
            ("MINIO_ACCESS_KEY", "minioadmin"),
            ("MINIO_SECRET_KEY", "secret"),
            ("MINIO_BUCKET", "objects"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "localhost:9000");
        assert_eq!(config.access_key, "minioadmin");
        assert_eq!(config.secret_key, "secret");
        assert_eq!(config.bucket, "objects");
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn config_falls_back_to_generic_variables() {
        let config = S3Config::from_lookup(lookup(&[
            ("ENDPOINT", "https://bucket.example.com"),
            ("ACCESS_KEY_ID", "ak"),
            ("SECRET_ACCESS_KEY", "sk"),
            ("BUCKET", "b"),
            ("REGION", "eu-west-1"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint_url(), "https://bucket.example.com");
        assert_eq!(config.access_key, "ak");
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn config_requires_endpoint() {
        assert!(S3Config::from_lookup(lookup(&[("MINIO_BUCKET", "b")])).is_none());
        assert!(S3Config::from_lookup(lookup(&[("MINIO_ENDPOINT", "")])).is_none());
    }

    #[test]
    fn endpoint_scheme_follows_ssl_flag() {
        let config = S3Config::new("localhost:9000/", "a", "s", "b");
        assert_eq!(config.endpoint_url(), "https://localhost:9000");
        assert_eq!(config.with_ssl(false).endpoint_url(), "http://localhost:9000");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let config = S3Config::new("http://minio:9000", "a", "s", "b");
        assert_eq!(config.endpoint_url(), "http://minio:9000");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: S3Config = serde_json::from_str(
            r#"{"endpoint":"minio:9000","access_key":"a","secret_key":"s","bucket":"b"}"#,
        )
        .unwrap();
        assert_eq!(config.region, "us-east-1");
        assert!(config.use_ssl);
    }

    // -----------------------------------------------------------------------
    // Live bucket (set MINIO_ENDPOINT to run)
    // -----------------------------------------------------------------------

    fn live_store() -> Option<S3ObjectStore> {
        let endpoint = std::env::var("MINIO_ENDPOINT").ok()?;
        let config = S3Config::new(endpoint, "minioadmin", "minioadmin", "test-git-objects")
            .with_ssl(false);
        Some(S3ObjectStore::connect(&config).unwrap())
    }

    #[test]
    fn live_contract() {
        let Some(store) = live_store() else {
            eprintln!("MINIO_ENDPOINT not set, skipping s3 tests");
            return;
        };
        let store = Arc::new(store);
        store.flush().unwrap();
        contract::known_vector(store.as_ref());
        contract::roundtrip_all_types(store.as_ref());
        contract::exists_after_put(store.as_ref());
        contract::get_missing_is_not_found(store.as_ref());

        store.flush().unwrap();
        contract::duplicate_put_is_idempotent(store.as_ref(), || store.len().unwrap());
        store.flush().unwrap();
        contract::concurrent_identical_puts(Arc::clone(&store), |s| s.len().unwrap());
        contract::flush_removes_everything(store.as_ref(), || store.len().unwrap());
        contract::concurrent_distinct_puts(store, |s| s.len().unwrap());
    }
}
