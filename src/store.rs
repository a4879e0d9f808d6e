//! Storage sinks for collected snapshots.

use std::path::Path as FsPath;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::ObjectStore;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::FeedError;
use crate::snapshot::RateSnapshot;

/// Receives finished snapshots. One upload per snapshot; a failed upload is
/// reported as-is and the caller decides whether to re-run.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Writes the snapshot and returns the stored object path.
    async fn put_snapshot(&self, snapshot: &RateSnapshot) -> Result<String, FeedError>;
}

/// Object-store backed sink. The backend is a bucket in production and an
/// in-memory or local-directory store in tests and development.
pub struct BucketStore {
    inner: Arc<dyn ObjectStore>,
    prefix: String,
}

impl BucketStore {
    pub fn new(inner: Arc<dyn ObjectStore>, prefix: &str) -> Self {
        BucketStore {
            inner,
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    /// GCS sink authenticated by a service-account key file.
    pub fn gcs(bucket: &str, credentials: &FsPath, prefix: &str) -> Result<Self, FeedError> {
        if !credentials.exists() {
            return Err(FeedError::Auth(format!(
                "service account key not found at {}; point storage.credentials at a valid key file",
                credentials.display()
            )));
        }

        let store = GoogleCloudStorageBuilder::new()
            .with_bucket_name(bucket)
            .with_service_account_path(credentials.to_string_lossy())
            .build()
            .map_err(|e| FeedError::Auth(e.to_string()))?;

        debug!("Using GCS bucket {}", bucket);
        Ok(Self::new(Arc::new(store), prefix))
    }

    /// Local-directory sink, for development and for setups where a separate
    /// transfer job ships the files to the bucket.
    pub fn local(dir: &FsPath, prefix: &str) -> Result<Self, FeedError> {
        std::fs::create_dir_all(dir).map_err(|e| {
            FeedError::Config(format!("could not create {}: {}", dir.display(), e))
        })?;
        let store = LocalFileSystem::new_with_prefix(dir)
            .map_err(|e| FeedError::Config(e.to_string()))?;

        debug!("Using local storage directory {}", dir.display());
        Ok(Self::new(Arc::new(store), prefix))
    }

    /// Picks the sink from config: a bucket (config or `GCS_BUCKET_ID`) wins
    /// over `local_dir`.
    pub fn from_config(config: &StorageConfig) -> Result<Self, FeedError> {
        if let Some(bucket) = config.resolve_bucket() {
            return Self::gcs(&bucket, &config.credentials_path(), &config.prefix);
        }
        if let Some(dir) = &config.local_dir {
            return Self::local(FsPath::new(dir), &config.prefix);
        }
        Err(FeedError::Config(
            "no storage target: set storage.bucket (or GCS_BUCKET_ID) or storage.local_dir".into(),
        ))
    }
}

#[async_trait]
impl SnapshotStore for BucketStore {
    async fn put_snapshot(&self, snapshot: &RateSnapshot) -> Result<String, FeedError> {
        let name = snapshot.object_name(&self.prefix);
        let payload = snapshot.to_csv()?;
        let location = Path::from(name.as_str());

        debug!(rows = snapshot.rates.len(), "Uploading {}", name);
        self.inner
            .put(&location, payload.into())
            .await
            .map_err(|source| FeedError::Upload {
                path: name.clone(),
                source,
            })?;

        info!("Uploaded snapshot for {} -> {}", snapshot.date, name);
        Ok(name)
    }
}
