//! SRD Core - Support Resource Discovery
//!
//! Finds the versioned configuration records of one Environment in a storage
//! backend, resolves each against the reader schemas of this build, and
//! assembles them into an [`srd_model::Environment`].
//!
//! # Pipeline
//!
//! 1. A backend ([`FilesystemDiscovery`], [`ObjectStoreDiscovery`]) locates
//!    envelopes under `v<MAJOR>/environment/config.json` and
//!    `v<MAJOR>/landingzones/<region>/config.json`
//! 2. [`ConfigRecord`] unwraps the envelope into writer schema and payload
//! 3. [`ReaderSchemas`] resolve the payload into the reader's shape
//! 4. [`assemble_environment`] validates and builds the domain model
//!
//! [`CachedDiscovery`] puts a TTL cache in front of any backend.
//!
//! # Example
//!
//! ```no_run
//! use srd_core::{DiscoveryConfig, EnvironmentDiscovery};
//!
//! let config = DiscoveryConfig::load("/etc/srd/srd.toml")?;
//! let discovery = config.open_discovery()?;
//! let environment = discovery.discover_environment()?;
//! println!("{} landing zones", environment.landing_zones.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod assemble;
mod cache;
mod config;
mod discovery;
mod error;
mod filesystem;
mod layout;
mod models;
mod object_store;
mod record;
mod schemas;

pub use assemble::{assemble_environment, assemble_landing_zone};
pub use cache::{CachedDiscovery, CachedEnvironment, Clock, ManualClock, SystemClock};
pub use config::{DiscoveryConfig, SourceConfig, DEFAULT_CACHE_TTL_SECS};
pub use discovery::{discover_with, ConfigLocator, EnvironmentDiscovery};
pub use error::{
    ConfigError, DecodeError, DiscoveryError, DiscoveryResult, NotFoundError, StoreError,
};
pub use filesystem::FilesystemDiscovery;
pub use layout::ConfigLayout;
pub use models::{EnvironmentRecord, LandingZoneRecord, MetadataRecord};
pub use object_store::{
    InMemoryObjectStore, LocalObjectStore, ObjectPage, ObjectStore, ObjectStoreDiscovery,
    DEFAULT_PAGE_SIZE,
};
pub use record::ConfigRecord;
pub use schemas::{
    version_prefix, ReaderSchemas, ENVIRONMENT_SCHEMA, LANDING_ZONE_SCHEMA, MAJOR_VERSION,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
