//! Decoded record models
//!
//! Reader-shaped records as plain data, before assembly into the domain
//! model. Field names follow the reader schemas in `schemas/`.

use crate::error::DiscoveryResult;
use crate::record::ConfigRecord;
use serde::Deserialize;
use srd_schema::RecordDecoder;
use std::collections::BTreeMap;

/// Metadata sub-record shared by both record kinds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub tenant_alias: String,
    pub organization_id: String,
    pub environment_alias: String,
    pub account_id: String,
    pub region: String,
    pub major_version: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Environment record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRecord {
    pub metadata: MetadataRecord,
    pub app_instance_profile_name: Option<String>,
    pub role_arn_terra_workspace_manager: String,
    pub role_arn_terra_user: String,
    pub role_arn_terra_notebook: String,
}

/// Landing Zone record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingZoneRecord {
    pub metadata: MetadataRecord,
    pub app_framework_vpc_id: Option<String>,
    pub app_framework_private_subnet_id: Option<String>,
    pub bucket_arn: String,
    pub bucket_id: String,
    pub kms_key_arn: String,
    pub kms_key_id: String,
    #[serde(default)]
    pub notebook_lifecycle_configuration_arns: Vec<String>,
    #[serde(default)]
    pub notebook_lifecycle_configuration_names: Vec<String>,
}

/// Decode a stored record into its reader-shaped model
pub(crate) fn decode_record<T: serde::de::DeserializeOwned>(
    decoder: &RecordDecoder,
    record: &ConfigRecord,
) -> DiscoveryResult<T> {
    Ok(decoder.decode_into(record.writer_schema(), record.payload())?)
}
