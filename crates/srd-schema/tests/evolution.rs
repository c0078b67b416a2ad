//! Schema evolution across writer and reader versions

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use srd_schema::{decode_json, encode_json, DecoderError, RecordDecoder, ResolutionError, Schema};

const METADATA_V1: &str = r#"{
    "type": "record", "name": "Metadata", "namespace": "srd.v0",
    "fields": [
        {"name": "tenantAlias", "type": "string"},
        {"name": "region", "type": "string"},
        {"name": "majorVersion", "type": "long"},
        {"name": "owner", "type": ["null", "string"], "default": null},
        {"name": "tier", "type": {
            "type": "enum", "name": "Tier", "symbols": ["STANDARD", "GOLD"], "default": "STANDARD"
        }, "default": "STANDARD"},
        {"name": "tags", "type": {"type": "map", "values": "string"}, "default": {}}
    ]
}"#;

/// Older writer: no owner, no tags, int version
const METADATA_V0: &str = r#"{
    "type": "record", "name": "Metadata", "namespace": "srd.v0",
    "fields": [
        {"name": "tenantAlias", "type": "string"},
        {"name": "region", "type": "string"},
        {"name": "majorVersion", "type": "int"},
        {"name": "tier", "type": {"type": "enum", "name": "Tier", "symbols": ["STANDARD", "GOLD"]}}
    ]
}"#;

/// Newer writer: an extra field and an extra enum symbol
const METADATA_V2: &str = r#"{
    "type": "record", "name": "Metadata", "namespace": "srd.v2",
    "fields": [
        {"name": "tenantAlias", "type": "string"},
        {"name": "region", "type": "string"},
        {"name": "majorVersion", "type": "long"},
        {"name": "costCenter", "type": "string"},
        {"name": "owner", "type": ["null", "string"]},
        {"name": "tier", "type": {
            "type": "enum", "name": "Tier", "symbols": ["STANDARD", "GOLD", "PLATINUM"]
        }},
        {"name": "tags", "type": {"type": "map", "values": "string"}}
    ]
}"#;

fn decoder() -> RecordDecoder {
    RecordDecoder::from_schema_text(METADATA_V1).unwrap()
}

#[test]
fn backward_compatible_older_writer() {
    let payload = r#"{"tenantAlias": "devel", "region": "us-east-1", "majorVersion": 0, "tier": "GOLD"}"#;
    let datum = decoder().decode(METADATA_V0, payload).unwrap();

    assert_eq!(
        datum.to_plain_json(),
        json!({
            "tenantAlias": "devel",
            "region": "us-east-1",
            "majorVersion": 0,
            "owner": null,
            "tier": "GOLD",
            "tags": {}
        })
    );
}

#[test]
fn forward_compatible_newer_writer() {
    let payload = r#"{
        "tenantAlias": "devel", "region": "us-west-1", "majorVersion": 0,
        "costCenter": "cc-42", "owner": {"string": "ops"}, "tier": "PLATINUM",
        "tags": {"Version": "v0"}
    }"#;
    let datum = decoder().decode(METADATA_V2, payload).unwrap();

    assert!(datum.field("costCenter").is_none());
    assert_eq!(
        datum.to_plain_json(),
        json!({
            "tenantAlias": "devel",
            "region": "us-west-1",
            "majorVersion": 0,
            "owner": "ops",
            "tier": "STANDARD",
            "tags": {"Version": "v0"}
        })
    );
}

#[test]
fn required_field_without_default_fails() {
    let writer = r#"{"type": "record", "name": "Metadata", "fields": [
        {"name": "tenantAlias", "type": "string"}
    ]}"#;
    let err = decoder().decode(writer, r#"{"tenantAlias": "devel"}"#).unwrap_err();

    match err {
        DecoderError::Resolution(ResolutionError::MissingField { path, .. }) => {
            assert_eq!(path, "$.region");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn incompatible_field_type_fails() {
    let writer = r#"{"type": "record", "name": "Metadata", "fields": [
        {"name": "tenantAlias", "type": "string"},
        {"name": "region", "type": "string"},
        {"name": "majorVersion", "type": "string"},
        {"name": "tier", "type": {"type": "enum", "name": "Tier", "symbols": ["GOLD"]}}
    ]}"#;
    let payload = r#"{"tenantAlias": "a", "region": "b", "majorVersion": "zero", "tier": "GOLD"}"#;
    let err = decoder().decode(writer, payload).unwrap_err();
    assert!(matches!(
        err,
        DecoderError::Resolution(ResolutionError::Incompatible { ref path, .. }) if path == "$.majorVersion"
    ));
}

#[test]
fn payload_not_matching_writer_fails() {
    let err = decoder()
        .decode(METADATA_V0, r#"{"tenantAlias": "devel"}"#)
        .unwrap_err();
    assert!(matches!(err, DecoderError::Payload(_)));
}

fn metadata_payload() -> impl Strategy<Value = serde_json::Value> {
    (
        "[a-z]{1,12}",
        "[a-z]{2}-[a-z]{4,9}-[1-4]",
        any::<i64>(),
        proptest::option::of("[a-zA-Z ]{0,16}"),
        prop_oneof![Just("STANDARD"), Just("GOLD")],
        proptest::collection::btree_map("[A-Za-z]{1,8}", "[a-z0-9]{0,8}", 0..4),
    )
        .prop_map(|(tenant, region, version, owner, tier, tags)| {
            json!({
                "tenantAlias": tenant,
                "region": region,
                "majorVersion": version,
                "owner": owner.map_or(serde_json::Value::Null, |o| json!({"string": o})),
                "tier": tier,
                "tags": tags,
            })
        })
}

proptest! {
    #[test]
    fn same_schema_round_trip(payload in metadata_payload()) {
        let schema = Schema::parse_str(METADATA_V1).unwrap();
        let datum = decode_json(&schema, &payload).unwrap();

        let resolved = decoder().decode_with(&schema, &payload.to_string()).unwrap();
        prop_assert_eq!(&resolved, &datum);
        prop_assert_eq!(encode_json(&schema, &resolved).unwrap(), payload);
    }
}
