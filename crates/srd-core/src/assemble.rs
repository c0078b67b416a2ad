//! Model Assembler
//!
//! Maps decoded records into the domain model. Assembly is all-or-nothing:
//! the first failure aborts and no partial [`Environment`] is produced.

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::{EnvironmentRecord, LandingZoneRecord, MetadataRecord};
use srd_model::{
    Arn, Environment, KmsKey, LandingZone, Metadata, NotebookLifecycleConfiguration, RegionId,
    StorageBucket, ValidationError,
};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

const ENVIRONMENT_PREFIX: &str = "environment";

/// Assemble an [`Environment`] from its record and its Landing Zone records
///
/// # Errors
/// - [`DiscoveryError::Validation`] for empty metadata fields, an
///   unrecognized region or an empty bucket or lifecycle name
/// - [`DiscoveryError::CountMismatch`] when lifecycle ARN and name lists
///   differ in length
/// - [`DiscoveryError::Identifier`] for ARN or UUID text that does not parse
pub fn assemble_environment(
    record: EnvironmentRecord,
    landing_zones: BTreeMap<RegionId, LandingZoneRecord>,
) -> DiscoveryResult<Environment> {
    let metadata = assemble_metadata(record.metadata, ENVIRONMENT_PREFIX)?;

    let workspace_manager_role_arn =
        parse_arn("environment.roleArnTerraWorkspaceManager", &record.role_arn_terra_workspace_manager)?;
    let user_role_arn = parse_arn("environment.roleArnTerraUser", &record.role_arn_terra_user)?;
    let notebook_role_arn = parse_arn("environment.roleArnTerraNotebook", &record.role_arn_terra_notebook)?;

    let landing_zones = landing_zones
        .into_iter()
        .map(|(region, record)| Ok((region, assemble_landing_zone(region, record)?)))
        .collect::<DiscoveryResult<BTreeMap<_, _>>>()?;

    Ok(Environment {
        application_instance_profile_name: record.app_instance_profile_name,
        metadata,
        workspace_manager_role_arn,
        user_role_arn,
        notebook_role_arn,
        landing_zones,
    })
}

/// Assemble the Landing Zone stored under `region`
pub fn assemble_landing_zone(
    region: RegionId,
    record: LandingZoneRecord,
) -> DiscoveryResult<LandingZone> {
    let prefix = format!("{ENVIRONMENT_PREFIX}.landingZones.{region}");
    let metadata = assemble_metadata(record.metadata, &prefix)?;
    if metadata.region != region {
        tracing::warn!(
            %region,
            metadata_region = %metadata.region,
            "landing zone metadata names a different region than its storage key"
        );
    }

    let arns = record.notebook_lifecycle_configuration_arns;
    let names = record.notebook_lifecycle_configuration_names;
    if arns.len() != names.len() {
        return Err(DiscoveryError::CountMismatch {
            region,
            arns: arns.len(),
            names: names.len(),
        });
    }

    let lifecycle_configurations = arns
        .iter()
        .zip(names)
        .enumerate()
        .map(|(i, (arn, name))| {
            let config = NotebookLifecycleConfiguration {
                arn: parse_arn(&format!("{prefix}.notebookLifecycleConfigurationArns[{i}]"), arn)?,
                name,
            };
            config.validate(&prefix)?;
            Ok(config)
        })
        .collect::<DiscoveryResult<Vec<_>>>()?;

    let storage_bucket = StorageBucket {
        arn: parse_arn(&format!("{prefix}.bucketArn"), &record.bucket_arn)?,
        name: record.bucket_id,
    };
    storage_bucket.validate(&prefix)?;

    let kms_key = KmsKey {
        arn: parse_arn(&format!("{prefix}.kmsKeyArn"), &record.kms_key_arn)?,
        id: Uuid::parse_str(&record.kms_key_id).map_err(|e| {
            DiscoveryError::identifier(format!("{prefix}.kmsKeyId"), &record.kms_key_id, e)
        })?,
    };

    Ok(LandingZone {
        application_vpc_id: record.app_framework_vpc_id,
        application_vpc_private_subnet_id: record.app_framework_private_subnet_id,
        metadata,
        storage_bucket,
        kms_key,
        lifecycle_configurations,
    })
}

fn assemble_metadata(record: MetadataRecord, prefix: &str) -> DiscoveryResult<Metadata> {
    let region = RegionId::from_str(&record.region).map_err(|_| {
        ValidationError::UnrecognizedRegion {
            field: format!("{prefix}.metadata.region"),
            value: record.region.clone(),
        }
    })?;

    let metadata = Metadata {
        tenant_alias: record.tenant_alias,
        organization_id: record.organization_id,
        environment_alias: record.environment_alias,
        account_id: record.account_id,
        region,
        major_version: record.major_version,
        tags: record.tags,
    };
    metadata.validate(prefix)?;
    Ok(metadata)
}

fn parse_arn(field: &str, value: &str) -> DiscoveryResult<Arn> {
    Arn::from_str(value).map_err(|e| DiscoveryError::identifier(field, value, e))
}
