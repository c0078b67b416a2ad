//! Discovery contracts and the shared discovery pipeline
//!
//! Backends implement [`ConfigLocator`]: they only find and fetch stored
//! records. [`discover_with`] runs the rest of the pipeline (decode, resolve
//! against the reader schemas, assemble) for any locator.

use crate::assemble::assemble_environment;
use crate::error::{DecodeError, DiscoveryResult};
use crate::models::{decode_record, EnvironmentRecord, LandingZoneRecord};
use crate::record::ConfigRecord;
use crate::schemas::ReaderSchemas;
use srd_model::{Environment, RegionId};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Locates stored configuration records
#[cfg_attr(test, mockall::automock)]
pub trait ConfigLocator: Send + Sync {
    /// Fetch and decode the Environment envelope
    ///
    /// # Errors
    /// [`NotFoundError::EnvironmentConfig`](crate::NotFoundError::EnvironmentConfig)
    /// when the record does not exist.
    fn locate_environment_config(&self) -> DiscoveryResult<ConfigRecord>;

    /// Fetch and decode every Landing Zone envelope, keyed by region
    ///
    /// Extraneous entries are skipped; a missing subtree yields an empty map.
    fn locate_landing_zone_configs(&self) -> DiscoveryResult<BTreeMap<RegionId, ConfigRecord>>;
}

/// Anything that can discover an [`Environment`] now
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentDiscovery: Send + Sync {
    /// Run a full discovery
    fn discover_environment(&self) -> DiscoveryResult<Environment>;
}

impl<D: EnvironmentDiscovery + ?Sized> EnvironmentDiscovery for Box<D> {
    fn discover_environment(&self) -> DiscoveryResult<Environment> {
        (**self).discover_environment()
    }
}

impl<D: EnvironmentDiscovery + ?Sized> EnvironmentDiscovery for Arc<D> {
    fn discover_environment(&self) -> DiscoveryResult<Environment> {
        (**self).discover_environment()
    }
}

/// Discover an [`Environment`] through `locator`
///
/// Records are fetched, decoded and assembled strictly in sequence; the
/// first failure aborts the call.
pub fn discover_with<L: ConfigLocator + ?Sized>(locator: &L) -> DiscoveryResult<Environment> {
    let schemas = ReaderSchemas::load().map_err(DecodeError::ReaderSchema)?;

    let record = locator.locate_environment_config()?;
    let environment: EnvironmentRecord = decode_record(schemas.environment(), &record)?;

    let mut landing_zones = BTreeMap::new();
    for (region, record) in locator.locate_landing_zone_configs()? {
        let landing_zone: LandingZoneRecord = decode_record(schemas.landing_zone(), &record)
            .inspect_err(|e| tracing::debug!(%region, error = %e, "landing zone record failed to decode"))?;
        landing_zones.insert(region, landing_zone);
    }

    let environment = assemble_environment(environment, landing_zones)?;
    tracing::info!(
        environment = %environment.metadata.environment_alias,
        landing_zones = environment.landing_zones.len(),
        "discovered environment"
    );
    Ok(environment)
}
