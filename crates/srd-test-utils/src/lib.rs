//! Testing utilities for SRD workspace
//!
//! Shared fixtures: writer schemas of several generations, payload and
//! envelope builders, on-disk fixture trees and the domain objects those
//! fixtures are expected to discover.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use srd_model::{
    Arn, Environment, KmsKey, LandingZone, Metadata, NotebookLifecycleConfiguration, RegionId,
    StorageBucket,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::TempDir;
use uuid::Uuid;

pub const ACCOUNT_ID: &str = "111111111111";
pub const KMS_KEY_ID: &str = "538feabb-eba0-4696-b485-caddc2bb5344";
pub const STANDARD_LIFECYCLE: &[&str] = &["default-lifecycle", "gpu-lifecycle"];

/// Current Environment schema
pub const ENVIRONMENT_SCHEMA: &str = include_str!("../../srd-core/schemas/v0/environment.avsc");

/// Current Landing Zone schema
pub const LANDING_ZONE_SCHEMA: &str = include_str!("../../srd-core/schemas/v0/landing_zone.avsc");

/// Landing Zone schema from before application networking and lifecycle
/// configurations were recorded
pub const LANDING_ZONE_SCHEMA_LEGACY: &str = r#"{
  "type": "record",
  "name": "LandingZoneModel",
  "namespace": "bio.terra.aws.resource.discovery.avro",
  "fields": [
    {"name": "metadata", "type": {
      "type": "record", "name": "LandingZoneMetadataModel",
      "fields": [
        {"name": "tenantAlias", "type": "string"},
        {"name": "organizationId", "type": "string"},
        {"name": "environmentAlias", "type": "string"},
        {"name": "accountId", "type": "string"},
        {"name": "region", "type": "string"},
        {"name": "majorVersion", "type": "string"}
      ]
    }},
    {"name": "bucketArn", "type": "string"},
    {"name": "bucketId", "type": "string"},
    {"name": "kmsKeyArn", "type": "string"},
    {"name": "kmsKeyId", "type": "string"}
  ]
}"#;

/// Landing Zone schema written by a producer newer than this build
pub const LANDING_ZONE_SCHEMA_NEXT: &str = r#"{
  "type": "record",
  "name": "LandingZoneModel",
  "namespace": "bio.terra.aws.resource.discovery.avro.next",
  "fields": [
    {"name": "metadata", "type": {
      "type": "record", "name": "LandingZoneMetadataModel",
      "fields": [
        {"name": "tenantAlias", "type": "string"},
        {"name": "organizationId", "type": "string"},
        {"name": "environmentAlias", "type": "string"},
        {"name": "accountId", "type": "string"},
        {"name": "region", "type": "string"},
        {"name": "majorVersion", "type": "string"},
        {"name": "tags", "type": {"type": "map", "values": "string"}},
        {"name": "costCenter", "type": ["null", "string"], "default": null}
      ]
    }},
    {"name": "appFrameworkVpcId", "type": ["null", "string"], "default": null},
    {"name": "appFrameworkPrivateSubnetId", "type": ["null", "string"], "default": null},
    {"name": "appSecurityGroupIds", "type": {"type": "array", "items": "string"}, "default": []},
    {"name": "bucketArn", "type": "string"},
    {"name": "bucketId", "type": "string"},
    {"name": "kmsKeyArn", "type": "string"},
    {"name": "kmsKeyId", "type": "string"},
    {"name": "notebookLifecycleConfigurationArns", "type": {"type": "array", "items": "string"}},
    {"name": "notebookLifecycleConfigurationNames", "type": {"type": "array", "items": "string"}}
  ]
}"#;

/// Base64 envelope around a writer schema and payload
pub fn envelope(schema: &str, payload: &str) -> String {
    json!({
        "schema": STANDARD.encode(schema),
        "payload": STANDARD.encode(payload),
    })
    .to_string()
}

pub fn metadata_payload(region: &str) -> Value {
    json!({
        "tenantAlias": "tenant",
        "organizationId": "org-0001",
        "environmentAlias": "devel",
        "accountId": ACCOUNT_ID,
        "region": region,
        "majorVersion": "v0",
        "tags": {"Version": "v0"},
    })
}

pub fn role_arn(role: &str) -> String {
    format!("arn:aws:iam::{ACCOUNT_ID}:role/{role}")
}

pub fn bucket_name(region: &str) -> String {
    format!("devel-{region}-workspace")
}

pub fn kms_key_arn(region: &str) -> String {
    format!("arn:aws:kms:{region}:{ACCOUNT_ID}:key/{KMS_KEY_ID}")
}

pub fn lifecycle_arn(region: &str, name: &str) -> String {
    format!("arn:aws:sagemaker:{region}:{ACCOUNT_ID}:notebook-instance-lifecycle-config/{name}")
}

/// Environment datum in the current schema
pub fn environment_payload() -> Value {
    json!({
        "metadata": metadata_payload("us-east-1"),
        "appInstanceProfileName": {"string": "devel-app-profile"},
        "roleArnTerraWorkspaceManager": role_arn("workspace-manager"),
        "roleArnTerraUser": role_arn("user"),
        "roleArnTerraNotebook": role_arn("notebook"),
    })
}

/// Landing Zone datum in the current schema
pub fn landing_zone_payload(region: &str, lifecycle: &[&str]) -> Value {
    landing_zone_payload_with(
        region,
        lifecycle.iter().map(|n| lifecycle_arn(region, n)).collect(),
        lifecycle.iter().map(|n| (*n).to_string()).collect(),
    )
}

/// Landing Zone datum with explicit lifecycle ARN and name lists
pub fn landing_zone_payload_with(region: &str, arns: Vec<String>, names: Vec<String>) -> Value {
    json!({
        "metadata": metadata_payload(region),
        "appFrameworkVpcId": {"string": format!("vpc-{region}")},
        "appFrameworkPrivateSubnetId": {"string": format!("subnet-{region}")},
        "bucketArn": format!("arn:aws:s3:::{}", bucket_name(region)),
        "bucketId": bucket_name(region),
        "kmsKeyArn": kms_key_arn(region),
        "kmsKeyId": KMS_KEY_ID,
        "notebookLifecycleConfigurationArns": arns,
        "notebookLifecycleConfigurationNames": names,
    })
}

/// Landing Zone datum in [`LANDING_ZONE_SCHEMA_LEGACY`]
pub fn legacy_landing_zone_payload(region: &str) -> Value {
    let mut metadata = metadata_payload(region);
    if let Some(fields) = metadata.as_object_mut() {
        fields.remove("tags");
    }
    json!({
        "metadata": metadata,
        "bucketArn": format!("arn:aws:s3:::{}", bucket_name(region)),
        "bucketId": bucket_name(region),
        "kmsKeyArn": kms_key_arn(region),
        "kmsKeyId": KMS_KEY_ID,
    })
}

/// Landing Zone datum in [`LANDING_ZONE_SCHEMA_NEXT`]
pub fn next_landing_zone_payload(region: &str, lifecycle: &[&str]) -> Value {
    let mut payload = landing_zone_payload(region, lifecycle);
    payload["metadata"]["costCenter"] = json!({"string": "cc-42"});
    payload["appSecurityGroupIds"] = json!(["sg-0001", "sg-0002"]);
    payload
}

fn metadata(region: RegionId) -> Metadata {
    Metadata {
        tenant_alias: "tenant".into(),
        organization_id: "org-0001".into(),
        environment_alias: "devel".into(),
        account_id: ACCOUNT_ID.into(),
        region,
        major_version: "v0".into(),
        tags: BTreeMap::from([("Version".into(), "v0".into())]),
    }
}

fn arn(text: &str) -> Arn {
    Arn::from_str(text).unwrap()
}

/// Landing Zone the current-schema fixture for `region` assembles into
pub fn expected_landing_zone(region: RegionId, lifecycle: &[&str]) -> LandingZone {
    let name = region.as_str();
    LandingZone {
        application_vpc_id: Some(format!("vpc-{name}")),
        application_vpc_private_subnet_id: Some(format!("subnet-{name}")),
        metadata: metadata(region),
        storage_bucket: StorageBucket {
            arn: arn(&format!("arn:aws:s3:::{}", bucket_name(name))),
            name: bucket_name(name),
        },
        kms_key: KmsKey {
            arn: arn(&kms_key_arn(name)),
            id: Uuid::from_str(KMS_KEY_ID).unwrap(),
        },
        lifecycle_configurations: lifecycle
            .iter()
            .map(|n| NotebookLifecycleConfiguration {
                arn: arn(&lifecycle_arn(name, n)),
                name: (*n).to_string(),
            })
            .collect(),
    }
}

/// Environment the standard fixture assembles into, with Landing Zones for `regions`
pub fn expected_environment(regions: &[RegionId]) -> Environment {
    Environment {
        application_instance_profile_name: Some("devel-app-profile".into()),
        metadata: metadata(RegionId::US_EAST_1),
        workspace_manager_role_arn: arn(&role_arn("workspace-manager")),
        user_role_arn: arn(&role_arn("user")),
        notebook_role_arn: arn(&role_arn("notebook")),
        landing_zones: regions
            .iter()
            .map(|&r| (r, expected_landing_zone(r, STANDARD_LIFECYCLE)))
            .collect(),
    }
}

/// Temporary storage tree laid out like a discovery root
///
/// With [`FixtureTree::with_bucket`] the records live in a sub-directory
/// named after the bucket, the shape a local object store expects.
pub struct FixtureTree {
    dir: TempDir,
    base: PathBuf,
}

impl FixtureTree {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let base = dir.path().to_path_buf();
        Self { dir, base }
    }

    pub fn with_bucket(bucket: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join(bucket);
        fs::create_dir_all(&base).unwrap();
        Self { dir, base }
    }

    /// Environment plus us-east-1 and us-west-1 Landing Zones
    pub fn standard() -> Self {
        Self::new().populate_standard()
    }

    /// [`FixtureTree::standard`] inside a bucket directory
    pub fn standard_in_bucket(bucket: &str) -> Self {
        Self::with_bucket(bucket).populate_standard()
    }

    fn populate_standard(self) -> Self {
        self.put_environment(&environment_payload());
        for region in ["us-east-1", "us-west-1"] {
            self.put_landing_zone(region, LANDING_ZONE_SCHEMA, &landing_zone_payload(region, STANDARD_LIFECYCLE));
        }
        self
    }

    /// Temporary directory holding the tree
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Directory keys are relative to
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Write `contents` at `key` (`/`-separated, relative to [`FixtureTree::base`])
    pub fn put(&self, key: &str, contents: &str) -> &Self {
        let path = key.split('/').fold(self.base.clone(), |p, s| p.join(s));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }

    /// Create an empty directory at `key`
    pub fn mkdir(&self, key: &str) -> &Self {
        let path = key.split('/').fold(self.base.clone(), |p, s| p.join(s));
        fs::create_dir_all(path).unwrap();
        self
    }

    /// Remove the entry at `key`
    pub fn remove(&self, key: &str) -> &Self {
        let path = key.split('/').fold(self.base.clone(), |p, s| p.join(s));
        if path.is_dir() {
            fs::remove_dir_all(path).unwrap();
        } else {
            fs::remove_file(path).unwrap();
        }
        self
    }

    pub fn put_environment(&self, payload: &Value) -> &Self {
        self.put(
            "v0/environment/config.json",
            &envelope(ENVIRONMENT_SCHEMA, &payload.to_string()),
        )
    }

    pub fn put_landing_zone(&self, region: &str, schema: &str, payload: &Value) -> &Self {
        self.put(
            &format!("v0/landingzones/{region}/config.json"),
            &envelope(schema, &payload.to_string()),
        )
    }

    /// Entries a landing-zone listing must skip
    pub fn put_extraneous_entries(&self) -> &Self {
        let stray = envelope(LANDING_ZONE_SCHEMA, &landing_zone_payload("us-east-2", STANDARD_LIFECYCLE).to_string());
        self.put("v0/landingzones/not-a-region/config.json", &stray)
            .put("v0/landingzones/README.md", "landing zones live here")
            .put("v0/landingzones/us-east-2/settings.json", &stray)
            .put("v0/landingzones/eu-west-1/nested/config.json", &stray)
            .put("v1/landingzones/eu-central-1/config.json", &stray)
            .mkdir("v0/landingzones/us-west-2")
    }

    /// Every file below [`FixtureTree::base`] as `(key, contents)`, sorted by key
    pub fn objects(&self) -> Vec<(String, Vec<u8>)> {
        let mut objects = Vec::new();
        collect_files(&self.base, "", &mut objects);
        objects.sort();
        objects
    }
}

impl Default for FixtureTree {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_files(dir: &Path, prefix: &str, out: &mut Vec<(String, Vec<u8>)>) {
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        let key = format!("{prefix}{name}");
        if entry.file_type().unwrap().is_dir() {
            collect_files(&entry.path(), &format!("{key}/"), out);
        } else {
            out.push((key, fs::read(entry.path()).unwrap()));
        }
    }
}
