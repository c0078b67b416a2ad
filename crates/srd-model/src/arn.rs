//! Amazon Resource Names
//!
//! Provides [`Arn`] for structured addressing of Support Resources.

use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Structured resource identifier
///
/// Canonical text form: `arn:<partition>:<service>:<region>:<account-id>:<resource>`.
/// Region and account may be empty (global resources such as S3 buckets or
/// IAM roles); the resource part may itself contain `:` and `/`.
///
/// # Examples
/// - `arn:aws:s3:::my-bucket`
/// - `arn:aws:kms:us-east-1:111111111111:key/538feabb-eba0-4696-b485-caddc2bb5344`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Arn {
    partition: String,
    service: String,
    region: String,
    account_id: String,
    resource: String,
}

impl Arn {
    /// Partition (`aws`, `aws-cn`, `aws-us-gov`, ...)
    #[inline]
    #[must_use]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Service namespace (`iam`, `s3`, `kms`, ...)
    #[inline]
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region component, `None` for global resources
    #[inline]
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        non_empty(&self.region)
    }

    /// Account component, `None` when omitted
    #[inline]
    #[must_use]
    pub fn account_id(&self) -> Option<&str> {
        non_empty(&self.account_id)
    }

    /// Resource component (everything after the fifth `:`)
    #[inline]
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl Display for Arn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(6, ':');

        if parts.next() != Some("arn") {
            return Err(ArnError::MissingPrefix(s.to_string()));
        }

        let mut component = |name: &'static str| {
            parts.next().ok_or_else(|| ArnError::MissingComponent {
                arn: s.to_string(),
                component: name,
            })
        };

        let partition = component("partition")?;
        let service = component("service")?;
        let region = component("region")?;
        let account_id = component("account")?;
        let resource = component("resource")?;

        for (name, value) in [
            ("partition", partition),
            ("service", service),
            ("resource", resource),
        ] {
            if value.is_empty() {
                return Err(ArnError::EmptyComponent {
                    arn: s.to_string(),
                    component: name,
                });
            }
        }

        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            resource: resource.to_string(),
        })
    }
}

impl Serialize for Arn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Errors in ARN parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArnError {
    /// Text does not start with `arn:`
    #[error("'{0}' is not an ARN: missing 'arn:' prefix")]
    MissingPrefix(String),

    /// Fewer than six `:`-separated components
    #[error("ARN '{arn}' is missing its {component} component")]
    MissingComponent {
        arn: String,
        component: &'static str,
    },

    /// Mandatory component present but empty
    #[error("ARN '{arn}' has an empty {component} component")]
    EmptyComponent {
        arn: String,
        component: &'static str,
    },
}
