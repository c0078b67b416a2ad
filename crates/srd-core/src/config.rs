//! Discovery configuration
//!
//! A TOML document naming the storage source and the cache TTL:
//!
//! ```toml
//! cache_ttl_secs = 300
//!
//! [source]
//! kind = "object_store"
//! root = "/var/lib/srd"
//! bucket = "env-config"
//! ```

use crate::cache::CachedDiscovery;
use crate::discovery::EnvironmentDiscovery;
use crate::error::{ConfigError, DiscoveryResult};
use crate::filesystem::FilesystemDiscovery;
use crate::object_store::{LocalObjectStore, ObjectStoreDiscovery};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default cache time-to-live in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

/// Where configuration records are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Directory tree rooted at `root`
    Filesystem { root: PathBuf },
    /// Local object store; `root` holds one directory per bucket
    ObjectStore { root: PathBuf, bucket: String },
}

impl SourceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Filesystem { root } | Self::ObjectStore { root, .. } if root.as_os_str().is_empty() => {
                Err(ConfigError::InvalidSource("root must not be empty".into()))
            }
            Self::ObjectStore { bucket, .. } if bucket.trim().is_empty() => {
                Err(ConfigError::InvalidSource("bucket must not be empty".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    pub source: SourceConfig,
}

impl DiscoveryConfig {
    /// Filesystem source at `root` with the default TTL
    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            source: SourceConfig::Filesystem { root: root.into() },
        }
    }

    /// Read and parse a TOML config file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`DiscoveryConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded discovery config");
        Ok(config)
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed TOML or unknown keys,
    /// [`ConfigError::InvalidSource`] on an empty root or bucket.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.source.validate()?;
        Ok(config)
    }

    /// Cache time-to-live
    #[inline]
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Backend named by the source, without caching
    ///
    /// # Errors
    /// [`NotFoundError`](crate::NotFoundError) when the root directory or
    /// bucket does not exist.
    pub fn open_backend(&self) -> DiscoveryResult<Box<dyn EnvironmentDiscovery>> {
        Ok(match &self.source {
            SourceConfig::Filesystem { root } => Box::new(FilesystemDiscovery::new(root)?),
            SourceConfig::ObjectStore { root, bucket } => {
                Box::new(ObjectStoreDiscovery::new(LocalObjectStore::new(root), bucket.as_str())?)
            }
        })
    }

    /// Backend wrapped in a [`CachedDiscovery`] with the configured TTL
    ///
    /// # Errors
    /// As [`DiscoveryConfig::open_backend`].
    pub fn open_discovery(&self) -> DiscoveryResult<CachedDiscovery<Box<dyn EnvironmentDiscovery>>> {
        Ok(CachedDiscovery::new(self.open_backend()?, self.cache_ttl()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use srd_test_utils::FixtureTree;
    use std::io::Write;

    #[test]
    fn ttl_defaults_when_omitted() {
        let config = DiscoveryConfig::from_toml_str(
            r#"
            [source]
            kind = "filesystem"
            root = "/etc/srd"
            "#,
        )
        .unwrap();
        assert_eq!(config, DiscoveryConfig::filesystem("/etc/srd"));
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn object_store_source() {
        let config = DiscoveryConfig::from_toml_str(
            r#"
            cache_ttl_secs = 30
            [source]
            kind = "object_store"
            root = "/var/lib/srd"
            bucket = "env-config"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(
            config.source,
            SourceConfig::ObjectStore {
                root: PathBuf::from("/var/lib/srd"),
                bucket: "env-config".into(),
            }
        );
    }

    #[test]
    fn rejects_unknown_kind_and_keys() {
        let unknown_kind = "[source]\nkind = \"ftp\"\nroot = \"/srv\"\n";
        assert!(matches!(
            DiscoveryConfig::from_toml_str(unknown_kind),
            Err(ConfigError::Parse(_))
        ));

        let unknown_key = "ttl = 5\n[source]\nkind = \"filesystem\"\nroot = \"/srv\"\n";
        assert!(matches!(
            DiscoveryConfig::from_toml_str(unknown_key),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_empty_bucket() {
        let text = "[source]\nkind = \"object_store\"\nroot = \"/srv\"\nbucket = \"\"\n";
        assert!(matches!(
            DiscoveryConfig::from_toml_str(text),
            Err(ConfigError::InvalidSource(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DiscoveryConfig::load(dir.path().join("srd.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_reads_named_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nkind = \"object_store\"\nroot = \"/srv\"\nbucket = \"b\"").unwrap();

        let config = DiscoveryConfig::load(file.path()).unwrap();
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert!(matches!(config.source, SourceConfig::ObjectStore { ref bucket, .. } if bucket == "b"));
    }

    #[test]
    fn load_and_open_filesystem_source() {
        let tree = FixtureTree::standard();
        let text = format!(
            "cache_ttl_secs = 60\n[source]\nkind = \"filesystem\"\nroot = {:?}\n",
            tree.root().display().to_string()
        );
        tree.put("srd.toml", &text);

        let config = DiscoveryConfig::load(tree.root().join("srd.toml")).unwrap();
        let discovery = config.open_discovery().unwrap();
        assert_eq!(discovery.ttl(), Duration::from_secs(60));
        assert_eq!(discovery.discover_environment().unwrap().landing_zones.len(), 2);
    }

    #[test]
    fn open_fails_eagerly_on_missing_bucket() {
        let tree = FixtureTree::new();
        let config = DiscoveryConfig {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            source: SourceConfig::ObjectStore {
                root: tree.root().to_path_buf(),
                bucket: "absent".into(),
            },
        };
        let err = config.open_discovery().err().unwrap();
        assert!(err.is_not_found());
    }
}
