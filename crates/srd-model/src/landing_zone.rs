//! Regional Support Resources
//!
//! A [`LandingZone`] groups the Support Resources provisioned in one region:
//! a storage bucket, an encryption key and the notebook lifecycle
//! configurations, plus optional application networking.

use crate::arn::Arn;
use crate::error::{field_path, require_text, ValidationError};
use crate::metadata::Metadata;
use serde::Serialize;
use uuid::Uuid;

/// Object storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StorageBucket {
    pub arn: Arn,
    pub name: String,
}

impl StorageBucket {
    /// Check that the bucket name is non-empty
    pub fn validate(&self, prefix: &str) -> Result<(), ValidationError> {
        require_text(&self.name, &field_path(prefix, "storageBucket"), "name")
    }
}

/// Encryption key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct KmsKey {
    pub arn: Arn,
    pub id: Uuid,
}

/// Notebook instance lifecycle configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NotebookLifecycleConfiguration {
    pub arn: Arn,
    pub name: String,
}

impl NotebookLifecycleConfiguration {
    /// Check that the configuration name is non-empty
    pub fn validate(&self, prefix: &str) -> Result<(), ValidationError> {
        require_text(
            &self.name,
            &field_path(prefix, "notebookLifecycleConfiguration"),
            "name",
        )
    }
}

/// Regional Support Resources for one region
///
/// The application VPC fields are absent for records written before the
/// schema generation that introduced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingZone {
    pub application_vpc_id: Option<String>,
    pub application_vpc_private_subnet_id: Option<String>,
    pub metadata: Metadata,
    pub storage_bucket: StorageBucket,
    pub kms_key: KmsKey,
    /// Order matches the order in the source record
    pub lifecycle_configurations: Vec<NotebookLifecycleConfiguration>,
}

impl LandingZone {
    /// Validate against the current schema generation
    ///
    /// Stricter than discovery: the lifecycle configuration list must be
    /// non-empty, which older generations did not require.
    pub fn validate(&self, prefix: &str) -> Result<(), ValidationError> {
        let prefix = field_path(prefix, "landingZone");
        self.metadata.validate(&prefix)?;
        self.storage_bucket.validate(&prefix)?;

        if self.lifecycle_configurations.is_empty() {
            return Err(ValidationError::EmptyList {
                field: field_path(&prefix, "notebookLifecycleConfigurations"),
            });
        }
        for config in &self.lifecycle_configurations {
            config.validate(&prefix)?;
        }
        Ok(())
    }

    /// Lookup a lifecycle configuration by name
    #[must_use]
    pub fn lifecycle_configuration(&self, name: &str) -> Option<&NotebookLifecycleConfiguration> {
        self.lifecycle_configurations.iter().find(|c| c.name == name)
    }
}
