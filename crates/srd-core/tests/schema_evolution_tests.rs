//! Records written by older and newer schema generations

use pretty_assertions::assert_eq;
use srd_core::{DiscoveryError, EnvironmentDiscovery, FilesystemDiscovery};
use srd_model::RegionId;
use srd_test_utils::{
    envelope, environment_payload, expected_environment, expected_landing_zone,
    landing_zone_payload, legacy_landing_zone_payload, next_landing_zone_payload, FixtureTree,
    LANDING_ZONE_SCHEMA_LEGACY, LANDING_ZONE_SCHEMA_NEXT, STANDARD_LIFECYCLE,
};
use std::collections::BTreeMap;

/// Schemas as the producer's code generator emits them: a different
/// namespace and no field defaults
const PRODUCER_ENVIRONMENT_SCHEMA: &str = r#"{
  "type": "record", "name": "EnvironmentModel",
  "namespace": "bio.terra.aws.resource.discovery.model",
  "fields": [
    {"name": "metadata", "type": {
      "type": "record", "name": "EnvironmentMetadataModel",
      "fields": [
        {"name": "tenantAlias", "type": "string"},
        {"name": "organizationId", "type": "string"},
        {"name": "environmentAlias", "type": "string"},
        {"name": "accountId", "type": "string"},
        {"name": "region", "type": "string"},
        {"name": "majorVersion", "type": "string"},
        {"name": "tags", "type": {"type": "map", "values": "string"}}
      ]
    }},
    {"name": "appInstanceProfileName", "type": ["null", "string"]},
    {"name": "roleArnTerraWorkspaceManager", "type": "string"},
    {"name": "roleArnTerraUser", "type": "string"},
    {"name": "roleArnTerraNotebook", "type": "string"}
  ]
}"#;

const PRODUCER_LANDING_ZONE_SCHEMA: &str = r#"{
  "type": "record", "name": "LandingZoneModel",
  "namespace": "bio.terra.aws.resource.discovery.model",
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
        {"name": "tags", "type": {"type": "map", "values": "string"}}
      ]
    }},
    {"name": "appFrameworkVpcId", "type": ["null", "string"]},
    {"name": "appFrameworkPrivateSubnetId", "type": ["null", "string"]},
    {"name": "bucketArn", "type": "string"},
    {"name": "bucketId", "type": "string"},
    {"name": "kmsKeyArn", "type": "string"},
    {"name": "kmsKeyId", "type": "string"},
    {"name": "notebookLifecycleConfigurationArns", "type": {"type": "array", "items": "string"}},
    {"name": "notebookLifecycleConfigurationNames", "type": {"type": "array", "items": "string"}}
  ]
}"#;

fn discover(tree: &FixtureTree) -> Result<srd_model::Environment, DiscoveryError> {
    FilesystemDiscovery::new(tree.root())?.discover_environment()
}

#[test]
fn producer_generated_schemas_resolve() {
    let tree = FixtureTree::new();
    tree.put(
        "v0/environment/config.json",
        &envelope(PRODUCER_ENVIRONMENT_SCHEMA, &environment_payload().to_string()),
    );
    for region in ["us-east-1", "us-west-1"] {
        tree.put_landing_zone(
            region,
            PRODUCER_LANDING_ZONE_SCHEMA,
            &landing_zone_payload(region, STANDARD_LIFECYCLE),
        );
    }

    let env = discover(&tree).unwrap();
    assert_eq!(env, expected_environment(&[RegionId::US_EAST_1, RegionId::US_WEST_1]));
}

#[test]
fn older_writer_fills_reader_defaults() {
    let tree = FixtureTree::standard();
    tree.put_landing_zone("us-west-1", LANDING_ZONE_SCHEMA_LEGACY, &legacy_landing_zone_payload("us-west-1"));

    let env = discover(&tree).unwrap();

    let mut expected = expected_landing_zone(RegionId::US_WEST_1, &[]);
    expected.application_vpc_id = None;
    expected.application_vpc_private_subnet_id = None;
    expected.metadata.tags = BTreeMap::new();
    assert_eq!(env.landing_zone(RegionId::US_WEST_1), Some(&expected));
    assert_eq!(
        env.landing_zone(RegionId::US_EAST_1),
        Some(&expected_landing_zone(RegionId::US_EAST_1, STANDARD_LIFECYCLE))
    );
}

#[test]
fn newer_writer_fields_are_ignored() {
    let tree = FixtureTree::standard();
    for region in ["us-east-1", "us-west-1"] {
        tree.put_landing_zone(
            region,
            LANDING_ZONE_SCHEMA_NEXT,
            &next_landing_zone_payload(region, STANDARD_LIFECYCLE),
        );
    }

    let env = discover(&tree).unwrap();
    assert_eq!(env, expected_environment(&[RegionId::US_EAST_1, RegionId::US_WEST_1]));
}

#[test]
fn writer_missing_required_field_fails_resolution() {
    let tree = FixtureTree::standard();
    let writer = r#"{
        "type": "record", "name": "LandingZoneModel", "namespace": "bio.terra.aws.resource.discovery.avro",
        "fields": [{"name": "bucketId", "type": "string"}]
    }"#;
    tree.put_landing_zone("us-west-1", writer, &serde_json::json!({"bucketId": "b"}));

    let err = discover(&tree).unwrap_err();
    assert!(err.is_schema_resolution(), "{err}");
    assert!(err.to_string().contains("$.metadata"), "{err}");
}

#[test]
fn writer_with_incompatible_type_fails_resolution() {
    let tree = FixtureTree::standard();
    let schema = LANDING_ZONE_SCHEMA_NEXT.replace(
        r#"{"name": "bucketId", "type": "string"}"#,
        r#"{"name": "bucketId", "type": "boolean"}"#,
    );
    assert_ne!(schema, LANDING_ZONE_SCHEMA_NEXT);
    let mut payload = next_landing_zone_payload("us-west-1", STANDARD_LIFECYCLE);
    payload["bucketId"] = true.into();
    tree.put_landing_zone("us-west-1", &schema, &payload);

    let err = discover(&tree).unwrap_err();
    assert!(err.is_schema_resolution(), "{err}");
}
