//! In-memory object store for testing without S3

use async_trait::async_trait;
use mediashift_storage::traits::validate_key;
use mediashift_storage::{ObjectStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// One recorded `put_object` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecord {
    pub bucket: String,
    pub key: String,
}

#[derive(Default)]
struct StoreState {
    objects: HashMap<(String, String), Vec<u8>>,
    puts: Vec<PutRecord>,
    head_calls: usize,
    fail_puts: bool,
    remove_sources: bool,
    unreachable: bool,
}

/// Object store that keeps uploaded bytes in memory and records every call.
///
/// A put reads the source file like a real client would, so a missing source fails.
/// Putting an existing key overwrites it.
#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every put fail with `UploadFailed`.
    pub fn fail_puts(&self, fail: bool) {
        self.state.lock().unwrap().fail_puts = fail;
    }

    /// Delete the source file after a successful put, so a later local delete fails.
    pub fn remove_sources_after_put(&self, remove: bool) {
        self.state.lock().unwrap().remove_sources = remove;
    }

    /// Make `head_bucket` fail with `BucketUnreachable`.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    /// Calls to `put_object`, including failed ones.
    pub fn put_calls(&self) -> usize {
        self.state.lock().unwrap().puts.len()
    }

    pub fn puts(&self) -> Vec<PutRecord> {
        self.state.lock().unwrap().puts.clone()
    }

    pub fn head_calls(&self) -> usize {
        self.state.lock().unwrap().head_calls
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.object(bucket, key).is_some()
    }

    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, source: &Path) -> StorageResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            state.puts.push(PutRecord {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
            if state.fail_puts {
                return Err(StorageError::UploadFailed(
                    "injected upload failure".to_string(),
                ));
            }
        }

        validate_key(key)?;
        let data = tokio::fs::read(source)
            .await
            .map_err(|e| StorageError::SourceUnreadable(format!("{}: {}", source.display(), e)))?;

        let remove_source = {
            let mut state = self.state.lock().unwrap();
            state
                .objects
                .insert((bucket.to_string(), key.to_string()), data);
            state.remove_sources
        };
        if remove_source {
            tokio::fs::remove_file(source).await?;
        }
        Ok(())
    }

    async fn head_bucket(&self, bucket: &str) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        state.head_calls += 1;
        if state.unreachable {
            return Err(StorageError::BucketUnreachable(format!(
                "bucket '{}' not reachable",
                bucket
            )));
        }
        Ok(())
    }
}
