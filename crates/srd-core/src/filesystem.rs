//! Filesystem discovery backend
//!
//! Reads records from a local directory tree laid out per
//! [`ConfigLayout`]. The root directory is checked when the backend is
//! created, not on first use.

use crate::discovery::{discover_with, ConfigLocator, EnvironmentDiscovery};
use crate::error::{DiscoveryResult, NotFoundError, StoreError};
use crate::layout::ConfigLayout;
use crate::record::ConfigRecord;
use srd_model::{Environment, RegionId};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Discovery over a local directory tree
#[derive(Debug, Clone)]
pub struct FilesystemDiscovery {
    root: PathBuf,
    layout: ConfigLayout,
}

impl FilesystemDiscovery {
    /// Create a backend rooted at `root`
    ///
    /// # Errors
    /// [`NotFoundError::RootDirectory`] if `root` is not an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> DiscoveryResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(NotFoundError::RootDirectory(root).into());
        }
        let layout = ConfigLayout::current()?;
        tracing::info!(root = %root.display(), version = layout.version(), "filesystem discovery ready");
        Ok(Self { root, layout })
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_record(path: &Path) -> DiscoveryResult<ConfigRecord> {
        let bytes = fs::read(path).map_err(|e| StoreError::io_error(path, e))?;
        Ok(ConfigRecord::from_envelope(&bytes)?)
    }
}

impl ConfigLocator for FilesystemDiscovery {
    fn locate_environment_config(&self) -> DiscoveryResult<ConfigRecord> {
        let path = self.layout.path_of(&self.root, &self.layout.environment_key());
        if !path.is_file() {
            return Err(NotFoundError::EnvironmentConfig(path.display().to_string()).into());
        }
        Self::read_record(&path)
    }

    fn locate_landing_zone_configs(&self) -> DiscoveryResult<BTreeMap<RegionId, ConfigRecord>> {
        let prefix = self.layout.landing_zones_prefix();
        let dir = self.layout.path_of(&self.root, prefix.trim_end_matches('/'));

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "no landing zone directory");
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(StoreError::io_error(&dir, e).into()),
        };

        let mut records = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io_error(&dir, e))?;
            let path = entry.path();

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::debug!(path = %path.display(), "skipping entry with non UTF-8 name");
                continue;
            };
            let Some(region) = self
                .layout
                .match_landing_zone_key(&format!("{prefix}{name}/config.json"))
            else {
                tracing::debug!(path = %path.display(), "skipping entry that names no region");
                continue;
            };

            let config = path.join("config.json");
            if !path.is_dir() || !config.is_file() {
                tracing::debug!(path = %path.display(), "skipping region entry without config.json");
                continue;
            }
            records.insert(region, Self::read_record(&config)?);
        }
        Ok(records)
    }
}

impl EnvironmentDiscovery for FilesystemDiscovery {
    fn discover_environment(&self) -> DiscoveryResult<Environment> {
        discover_with(self)
    }
}
