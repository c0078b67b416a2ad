//! The top-level Environment
//!
//! Global Support Resources are exposed as fields; Regional Support
//! Resources are reached through [`Environment::landing_zone`].

use crate::arn::Arn;
use crate::error::{field_path, ValidationError};
use crate::landing_zone::LandingZone;
use crate::metadata::Metadata;
use crate::region::RegionId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// All Support Resources of one Environment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub application_instance_profile_name: Option<String>,
    pub metadata: Metadata,
    pub workspace_manager_role_arn: Arn,
    pub user_role_arn: Arn,
    pub notebook_role_arn: Arn,
    /// May be empty when no Landing Zones are configured
    pub landing_zones: BTreeMap<RegionId, LandingZone>,
}

impl Environment {
    /// Landing Zone for `region`, if one is configured
    #[inline]
    #[must_use]
    pub fn landing_zone(&self, region: RegionId) -> Option<&LandingZone> {
        self.landing_zones.get(&region)
    }

    /// Regions that have a Landing Zone
    #[must_use]
    pub fn supported_regions(&self) -> BTreeSet<RegionId> {
        self.landing_zones.keys().copied().collect()
    }

    /// Validate metadata and every Landing Zone
    pub fn validate(&self, prefix: &str) -> Result<(), ValidationError> {
        let prefix = field_path(prefix, "environment");
        self.metadata.validate(&prefix)?;
        for landing_zone in self.landing_zones.values() {
            landing_zone.validate(&prefix)?;
        }
        Ok(())
    }
}
