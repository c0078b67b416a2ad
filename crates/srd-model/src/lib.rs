//! SRD Domain Model
//!
//! Immutable value types describing the Support Resources of one
//! Environment and its per-region Landing Zones.
//!
//! # Core Types
//!
//! - [`Environment`]: Global Support Resources plus a map of Landing Zones
//! - [`LandingZone`]: Regional Support Resources for a single region
//! - [`Metadata`]: Descriptive metadata attached to both
//! - [`Arn`], [`RegionId`]: Validated identifiers
//!
//! Entities are built once (by the discovery assembler or by struct
//! literals in tests) and validated with the `validate` predicates.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod arn;
mod environment;
mod error;
mod landing_zone;
mod metadata;
mod region;

pub use arn::{Arn, ArnError};
pub use environment::Environment;
pub use error::ValidationError;
pub use landing_zone::{KmsKey, LandingZone, NotebookLifecycleConfiguration, StorageBucket};
pub use metadata::Metadata;
pub use region::{RegionError, RegionId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
