//! Metadata attached to an Environment and to each Landing Zone

use crate::error::{field_path, require_text, ValidationError};
use crate::region::RegionId;
use serde::Serialize;
use std::collections::BTreeMap;

/// Descriptive metadata shared by [`Environment`](crate::Environment) and
/// [`LandingZone`](crate::LandingZone)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Tenant the environment belongs to
    pub tenant_alias: String,
    /// Owning organization
    pub organization_id: String,
    /// Environment alias within the tenant
    pub environment_alias: String,
    /// Cloud account hosting the resources
    pub account_id: String,
    /// Region the record describes
    pub region: RegionId,
    /// Schema generation the record set conforms to
    pub major_version: String,
    /// Free-form tags
    pub tags: BTreeMap<String, String>,
}

impl Metadata {
    /// Check that every required text field is non-empty
    ///
    /// `prefix` names the owner (e.g. `environment`) and is prepended to the
    /// reported field path.
    pub fn validate(&self, prefix: &str) -> Result<(), ValidationError> {
        let prefix = field_path(prefix, "metadata");
        require_text(&self.tenant_alias, &prefix, "tenantAlias")?;
        require_text(&self.organization_id, &prefix, "organizationId")?;
        require_text(&self.environment_alias, &prefix, "environmentAlias")?;
        require_text(&self.account_id, &prefix, "accountId")?;
        require_text(&self.major_version, &prefix, "majorVersion")?;
        Ok(())
    }
}
