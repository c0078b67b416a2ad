//! Storage naming convention
//!
//! Both backends share one layout under their root container:
//!
//! ```text
//! v<MAJOR>/environment/config.json
//! v<MAJOR>/landingzones/<region>/config.json
//! ```
//!
//! Keys use `/` separators on every backend; the filesystem backend maps
//! them onto paths.

use crate::schemas::MAJOR_VERSION;
use regex::Regex;
use srd_model::RegionId;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

/// Naming convention for one major version
#[derive(Debug, Clone)]
pub struct ConfigLayout {
    version: String,
    landing_zone_key: Regex,
}

impl ConfigLayout {
    /// Layout for `major_version`
    ///
    /// # Errors
    /// Returns [`regex::Error`] if the key pattern fails to compile.
    pub fn new(major_version: u32) -> Result<Self, regex::Error> {
        let version = format!("v{major_version}");
        let landing_zone_key = Regex::new(&format!(
            r"^{}/landingzones/([a-z0-9-]+)/{}$",
            regex::escape(&version),
            regex::escape(CONFIG_FILE)
        ))?;
        Ok(Self {
            version,
            landing_zone_key,
        })
    }

    /// Layout for the major version this build reads
    pub fn current() -> Result<Self, regex::Error> {
        Self::new(MAJOR_VERSION)
    }

    /// Version segment, e.g. `v0`
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Key of the Environment record
    #[must_use]
    pub fn environment_key(&self) -> String {
        format!("{}/environment/{CONFIG_FILE}", self.version)
    }

    /// Key prefix of the Landing Zone subtree, with trailing `/`
    #[must_use]
    pub fn landing_zones_prefix(&self) -> String {
        format!("{}/landingzones/", self.version)
    }

    /// Key of the Landing Zone record for `region`
    #[must_use]
    pub fn landing_zone_key(&self, region: RegionId) -> String {
        format!("{}{region}/{CONFIG_FILE}", self.landing_zones_prefix())
    }

    /// Region of a Landing Zone key
    ///
    /// `None` unless the key is exactly a Landing Zone record key and its
    /// region segment names a recognized region.
    #[must_use]
    pub fn match_landing_zone_key(&self, key: &str) -> Option<RegionId> {
        let segment = self.landing_zone_key.captures(key)?.get(1)?.as_str();
        match segment.parse::<RegionId>() {
            Ok(region) => Some(region),
            Err(_) => {
                tracing::debug!(key, segment, "skipping entry with unrecognized region");
                None
            }
        }
    }

    /// Filesystem path of `key` below `root`
    #[must_use]
    pub fn path_of(&self, root: &Path, key: &str) -> PathBuf {
        key.split('/').fold(root.to_path_buf(), |path, segment| path.join(segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ConfigLayout {
        ConfigLayout::current().unwrap()
    }

    #[test]
    fn keys_follow_convention() {
        let layout = layout();
        assert_eq!(layout.environment_key(), "v0/environment/config.json");
        assert_eq!(layout.landing_zones_prefix(), "v0/landingzones/");
        assert_eq!(
            layout.landing_zone_key(RegionId::US_WEST_1),
            "v0/landingzones/us-west-1/config.json"
        );
    }

    #[test]
    fn matches_only_exact_landing_zone_keys() {
        let layout = layout();
        assert_eq!(
            layout.match_landing_zone_key("v0/landingzones/us-east-1/config.json"),
            Some(RegionId::US_EAST_1)
        );
        for key in [
            "v0/landingzones/not-a-region/config.json",
            "v0/landingzones/us-east-1/config.json.bak",
            "v0/landingzones/us-east-1/other.json",
            "v0/landingzones/us-east-1/nested/config.json",
            "v0/landingzones/config.json",
            "v1/landingzones/us-east-1/config.json",
            "prefix/v0/landingzones/us-east-1/config.json",
            "v0/landingzones/US-EAST-1/config.json",
        ] {
            assert_eq!(layout.match_landing_zone_key(key), None, "{key}");
        }
    }

    #[test]
    fn other_major_version() {
        let layout = ConfigLayout::new(3).unwrap();
        assert_eq!(
            layout.match_landing_zone_key("v3/landingzones/eu-west-1/config.json"),
            Some(RegionId::EU_WEST_1)
        );
        assert_eq!(layout.version(), "v3");
    }

    #[test]
    fn key_to_path() {
        let path = layout().path_of(Path::new("/etc/srd"), "v0/environment/config.json");
        assert_eq!(path, Path::new("/etc/srd/v0/environment/config.json"));
    }
}
