//! Region identifiers
//!
//! [`RegionId`] is a validated identifier from a fixed table of known
//! deployment regions. Construction from arbitrary text goes through
//! [`FromStr`], which rejects anything outside the table.

use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

const KNOWN_REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-east-2",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ap-southeast-5",
    "ap-southeast-6",
    "ap-southeast-7",
    "aws-cn-global",
    "aws-global",
    "aws-iso-b-global",
    "aws-iso-e-global",
    "aws-iso-f-global",
    "aws-iso-global",
    "aws-us-gov-global",
    "ca-central-1",
    "ca-west-1",
    "cn-north-1",
    "cn-northwest-1",
    "eu-central-1",
    "eu-central-2",
    "eu-isoe-west-1",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "il-central-1",
    "me-central-1",
    "me-south-1",
    "mx-central-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-gov-east-1",
    "us-gov-west-1",
    "us-iso-east-1",
    "us-iso-west-1",
    "us-isob-east-1",
    "us-isof-east-1",
    "us-isof-south-1",
    "us-west-1",
    "us-west-2",
];

/// Validated region identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(&'static str);

impl RegionId {
    /// `us-east-1`
    pub const US_EAST_1: Self = Self("us-east-1");
    /// `us-east-2`
    pub const US_EAST_2: Self = Self("us-east-2");
    /// `us-west-1`
    pub const US_WEST_1: Self = Self("us-west-1");
    /// `us-west-2`
    pub const US_WEST_2: Self = Self("us-west-2");
    /// `eu-central-1`
    pub const EU_CENTRAL_1: Self = Self("eu-central-1");
    /// `eu-west-1`
    pub const EU_WEST_1: Self = Self("eu-west-1");
    /// Global pseudo-region
    pub const AWS_GLOBAL: Self = Self("aws-global");

    /// Region name as text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Every recognized region, in lexical order
    pub fn all() -> impl Iterator<Item = RegionId> {
        KNOWN_REGIONS.iter().copied().map(RegionId)
    }

    /// Check whether text names a recognized region
    #[inline]
    #[must_use]
    pub fn is_known(name: &str) -> bool {
        KNOWN_REGIONS.binary_search(&name).is_ok()
    }
}

impl Display for RegionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for RegionId {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KNOWN_REGIONS
            .binary_search(&s)
            .map(|idx| Self(KNOWN_REGIONS[idx]))
            .map_err(|_| RegionError::Unrecognized(s.to_string()))
    }
}

impl AsRef<str> for RegionId {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl Serialize for RegionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Errors in region parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    /// Not a recognized region identifier
    #[error("unrecognized region: '{0}'")]
    Unrecognized(String),
}
