use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{StoreError, StoreResult};

// 1. KvStore Contract
/// KvStore
///
/// The abstract contract of the external key-value store. Values are JSON documents.
/// `list` makes no ordering promise; callers must not rely on a stable order.
///
/// Swapping the concrete implementation (S3 in production, the in-memory map for local
/// runs and tests) never affects the repository or handlers.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Prepares the backing store (e.g. provisions the MinIO bucket). No-op where not needed.
    async fn ensure_ready(&self);

    /// Fetches a value. A missing key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Writes a value, replacing any existing one (last write wins).
    async fn put(&self, key: &str, value: &Value) -> StoreResult<()>;

    /// Removes a key. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Lists at most `limit` keys.
    async fn list(&self, limit: usize) -> StoreResult<Vec<String>>;
}

/// StoreState
///
/// The concrete type used to share the store across the repository and the application state.
pub type StoreState = Arc<dyn KvStore>;

// 2. The Real Implementation (S3/MinIO)
/// S3KvStore
///
/// Stores one JSON object per key under `prefix` in a single bucket.
/// `force_path_style(true)` keeps it compatible with MinIO and other S3 gateways.
#[derive(Clone)]
pub struct S3KvStore {
    client: s3::Client,
    bucket_name: String,
    prefix: String,
}

impl S3KvStore {
    pub fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        prefix: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
            prefix: prefix.to_string(),
        }
    }

    fn object_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl KvStore for S3KvStore {
    async fn ensure_ready(&self) {
        // CreateBucket is idempotent for the bucket owner; an "already exists" error is expected.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!("create_bucket skipped: {}", e);
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(self.object_key(key))
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Ok(None);
                }
                return Err(StoreError::Backend {
                    message: e.to_string(),
                });
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend {
                message: e.to_string(),
            })?
            .into_bytes();

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn put(&self, key: &str, value: &Value) -> StoreResult<()> {
        let body = serde_json::to_vec(value)?;
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(self.object_key(key))
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StoreError::Backend {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(self.object_key(key))
            .send()
            .await
            .map_err(|e| StoreError::Backend {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn list(&self, limit: usize) -> StoreResult<Vec<String>> {
        let max_keys = i32::try_from(limit).unwrap_or(i32::MAX);
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .prefix(&self.prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("unable to list keys: {}", e),
            })?;

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| object.key())
            .filter_map(|key| key.strip_prefix(self.prefix.as_str()))
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect())
    }
}

// 3. The In-Memory Implementation (Local runs and tests)
/// MemoryKvStore
///
/// A process-local store backed by a `BTreeMap`, so listing is lexicographic.
/// The failure switches let tests exercise the repository's partial-failure policy.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<BTreeMap<String, Value>>,
    /// When true, every operation fails as if the store were unreachable.
    should_fail: bool,
    /// Keys whose individual `get` fails.
    failing_keys: HashSet<String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_failing_key(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.should_fail {
            return Err(StoreError::Unavailable {
                message: "simulated outage".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn ensure_ready(&self) {}

    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        self.check_available()?;
        if self.failing_keys.contains(key) {
            return Err(StoreError::Backend {
                message: format!("simulated read failure for {}", key),
            });
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &Value) -> StoreResult<()> {
        self.check_available()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.check_available()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, limit: usize) -> StoreResult<Vec<String>> {
        self.check_available()?;
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .take(limit)
            .cloned()
            .collect())
    }
}

/// connect
///
/// Builds the store selected by the configuration. `StoreBackend::Disabled` yields `None`,
/// which the repository reports as an unavailable store on every call.
pub async fn connect(config: &StoreConfig) -> Option<StoreState> {
    let store: StoreState = match config.backend {
        StoreBackend::Disabled => return None,
        StoreBackend::Memory => Arc::new(MemoryKvStore::new()),
        StoreBackend::S3 => Arc::new(S3KvStore::new(
            &config.s3_endpoint,
            &config.s3_region,
            &config.s3_key,
            &config.s3_secret,
            &config.s3_bucket,
            &config.s3_prefix,
        )),
    };
    store.ensure_ready().await;
    Some(store)
}
