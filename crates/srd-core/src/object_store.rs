//! Object-store discovery backend
//!
//! Reads records from one bucket of an [`ObjectStore`]. Keys follow
//! [`ConfigLayout`]; listings are paginated and followed until the store
//! reports no continuation.
//!
//! Two stores ship with the crate:
//! - [`InMemoryObjectStore`]: buckets held in memory, configurable page size
//! - [`LocalObjectStore`]: each bucket is a sub-directory of a root directory

use crate::discovery::{discover_with, ConfigLocator, EnvironmentDiscovery};
use crate::error::{DiscoveryResult, NotFoundError, StoreError};
use crate::layout::ConfigLayout;
use crate::record::ConfigRecord;
use parking_lot::RwLock;
use srd_model::{Environment, RegionId};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default maximum keys per listing page
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// One page of a key listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Keys in lexical order
    pub keys: Vec<String>,
    /// Token for the next page, `None` on the last page
    pub continuation: Option<String>,
}

/// Object storage capability
#[cfg_attr(test, mockall::automock)]
pub trait ObjectStore: Send + Sync {
    /// Whether `bucket` exists
    fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError>;

    /// List keys starting with `prefix`, resuming after `continuation`
    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, StoreError>;

    /// Object contents, `None` if the key does not exist
    fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        (**self).bucket_exists(bucket)
    }

    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, StoreError> {
        (**self).list_objects(bucket, prefix, continuation)
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get_object(bucket, key)
    }
}

/// Discovery over one bucket of an [`ObjectStore`]
#[derive(Debug)]
pub struct ObjectStoreDiscovery<S> {
    store: S,
    bucket: String,
    layout: ConfigLayout,
}

impl<S: ObjectStore> ObjectStoreDiscovery<S> {
    /// Create a backend reading `bucket` from `store`
    ///
    /// # Errors
    /// [`NotFoundError::Bucket`] if the bucket does not exist.
    pub fn new(store: S, bucket: impl Into<String>) -> DiscoveryResult<Self> {
        let bucket = bucket.into();
        if !store.bucket_exists(&bucket)? {
            return Err(NotFoundError::Bucket(bucket).into());
        }
        let layout = ConfigLayout::current()?;
        tracing::info!(%bucket, version = layout.version(), "object store discovery ready");
        Ok(Self {
            store,
            bucket,
            layout,
        })
    }

    /// Bucket name
    #[inline]
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn list_all(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut continuation = None;
        loop {
            let page = self
                .store
                .list_objects(&self.bucket, prefix, continuation.clone())?;
            keys.extend(page.keys);
            match page.continuation {
                Some(next) if continuation.as_ref() == Some(&next) => {
                    return Err(StoreError::backend(
                        &self.bucket,
                        format!("listing did not advance past token '{next}'"),
                    ));
                }
                Some(next) => continuation = Some(next),
                None => return Ok(keys),
            }
        }
    }
}

impl<S: ObjectStore> ConfigLocator for ObjectStoreDiscovery<S> {
    fn locate_environment_config(&self) -> DiscoveryResult<ConfigRecord> {
        let key = self.layout.environment_key();
        match self.store.get_object(&self.bucket, &key)? {
            Some(bytes) => Ok(ConfigRecord::from_envelope(&bytes)?),
            None => Err(NotFoundError::EnvironmentConfig(format!("{}/{key}", self.bucket)).into()),
        }
    }

    fn locate_landing_zone_configs(&self) -> DiscoveryResult<BTreeMap<RegionId, ConfigRecord>> {
        let prefix = self.layout.landing_zones_prefix();
        let mut records = BTreeMap::new();

        for key in self.list_all(&prefix)? {
            let Some(region) = self.layout.match_landing_zone_key(&key) else {
                tracing::debug!(bucket = %self.bucket, %key, "skipping key that names no landing zone");
                continue;
            };
            match self.store.get_object(&self.bucket, &key)? {
                Some(bytes) => {
                    records.insert(region, ConfigRecord::from_envelope(&bytes)?);
                }
                None => tracing::debug!(bucket = %self.bucket, %key, "listed key vanished before fetch"),
            }
        }
        Ok(records)
    }
}

impl<S: ObjectStore> EnvironmentDiscovery for ObjectStoreDiscovery<S> {
    fn discover_environment(&self) -> DiscoveryResult<Environment> {
        discover_with(self)
    }
}

/// First page of already positioned, sorted `keys`
///
/// The continuation token is the last key returned.
fn paginate<'a>(keys: impl Iterator<Item = &'a str>, page_size: usize) -> ObjectPage {
    let mut keys = keys
        .map(str::to_string)
        .take(page_size.saturating_add(1))
        .collect::<Vec<_>>();
    let continuation = if keys.len() > page_size {
        keys.truncate(page_size);
        keys.last().cloned()
    } else {
        None
    };
    ObjectPage { keys, continuation }
}

fn start_bound<'a>(prefix: &'a str, continuation: Option<&'a str>) -> Bound<&'a str> {
    match continuation {
        Some(token) if token >= prefix => Bound::Excluded(token),
        _ => Bound::Included(prefix),
    }
}

/// In-memory object store
///
/// Objects can be added or removed while discoveries hold the store through
/// an [`Arc`].
#[derive(Debug)]
pub struct InMemoryObjectStore {
    buckets: RwLock<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
    page_size: usize,
}

impl InMemoryObjectStore {
    /// Create an empty store with [`DEFAULT_PAGE_SIZE`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an empty store returning at most `page_size` keys per listing
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            buckets: RwLock::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Create `bucket` if absent
    pub fn create_bucket(&self, bucket: &str) {
        self.buckets.write().entry(bucket.to_string()).or_default();
    }

    /// Store an object, creating the bucket if needed
    pub fn put_object(&self, bucket: &str, key: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.buckets
            .write()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.into(), contents.into());
    }

    /// Remove an object, returning whether it existed
    pub fn delete_object(&self, bucket: &str, key: &str) -> bool {
        self.buckets
            .write()
            .get_mut(bucket)
            .is_some_and(|objects| objects.remove(key).is_some())
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        Ok(self.buckets.read().contains_key(bucket))
    }

    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, StoreError> {
        let buckets = self.buckets.read();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::backend(bucket, "no such bucket"))?;
        let start = start_bound(prefix, continuation.as_deref());
        let keys = objects
            .range::<str, _>((start, Bound::Unbounded))
            .map(|(key, _)| key.as_str())
            .take_while(|key| key.starts_with(prefix));
        Ok(paginate(keys, self.page_size))
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let buckets = self.buckets.read();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::backend(bucket, "no such bucket"))?;
        Ok(objects.get(key).cloned())
    }
}

/// Object store over a local directory
///
/// A bucket is a sub-directory of the root; an object key is the
/// `/`-joined path of a regular file relative to its bucket.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    page_size: usize,
}

impl LocalObjectStore {
    /// Create a store over `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Return at most `page_size` keys per listing
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StoreError> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(StoreError::backend(bucket, "invalid bucket name"));
        }
        Ok(self.root.join(bucket))
    }

    fn collect_keys(dir: &Path, prefix: &str, keys: &mut Vec<String>) -> Result<(), StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StoreError::io_error(dir, e)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io_error(dir, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let file_type = entry.file_type().map_err(|e| StoreError::io_error(entry.path(), e))?;
            let key = format!("{prefix}{name}");
            if file_type.is_dir() {
                Self::collect_keys(&entry.path(), &format!("{key}/"), keys)?;
            } else if file_type.is_file() {
                keys.push(key);
            }
        }
        Ok(())
    }
}

impl ObjectStore for LocalObjectStore {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        Ok(self.bucket_dir(bucket)?.is_dir())
    }

    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, StoreError> {
        let dir = self.bucket_dir(bucket)?;
        let mut keys = Vec::new();
        Self::collect_keys(&dir, "", &mut keys)?;
        keys.sort();

        let listed = match start_bound(prefix, continuation.as_deref()) {
            Bound::Excluded(token) => keys.partition_point(|k| k.as_str() <= token),
            _ => keys.partition_point(|k| k.as_str() < prefix),
        };
        let page = keys[listed..]
            .iter()
            .map(String::as_str)
            .take_while(|key| key.starts_with(prefix));
        Ok(paginate(page, self.page_size))
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if key.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
            return Ok(None);
        }
        let path = key.split('/').fold(self.bucket_dir(bucket)?, |p, s| p.join(s));
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if path.is_dir() => {
                tracing::debug!(path = %path.display(), error = %e, "key names a directory");
                Ok(None)
            }
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }
}
