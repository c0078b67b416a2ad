use pretty_assertions::assert_eq;
use proptest::prelude::*;
use srd_core::{
    CachedDiscovery, DiscoveryConfig, DiscoveryError, EnvironmentDiscovery, FilesystemDiscovery,
    InMemoryObjectStore, LocalObjectStore, ManualClock, ObjectStoreDiscovery,
};
use srd_model::RegionId;
use srd_test_utils::{
    expected_environment, landing_zone_payload, landing_zone_payload_with, lifecycle_arn,
    FixtureTree, LANDING_ZONE_SCHEMA, STANDARD_LIFECYCLE,
};
use std::sync::Arc;
use std::time::Duration;

const BUCKET: &str = "env-config";

fn in_memory(tree: &FixtureTree) -> ObjectStoreDiscovery<InMemoryObjectStore> {
    in_memory_paged(tree, srd_core::DEFAULT_PAGE_SIZE)
}

fn in_memory_paged(tree: &FixtureTree, page_size: usize) -> ObjectStoreDiscovery<InMemoryObjectStore> {
    let store = InMemoryObjectStore::with_page_size(page_size);
    store.create_bucket(BUCKET);
    for (key, contents) in tree.objects() {
        store.put_object(BUCKET, key, contents);
    }
    ObjectStoreDiscovery::new(store, BUCKET).unwrap()
}

fn standard_regions() -> Vec<RegionId> {
    vec![RegionId::US_EAST_1, RegionId::US_WEST_1]
}

#[test]
fn filesystem_end_to_end() {
    let tree = FixtureTree::standard();
    let env = FilesystemDiscovery::new(tree.root())
        .unwrap()
        .discover_environment()
        .unwrap();
    assert_eq!(env, expected_environment(&standard_regions()));
    env.validate("environment").unwrap();
}

#[test]
fn local_object_store_end_to_end() {
    let tree = FixtureTree::standard_in_bucket(BUCKET);
    let backend = ObjectStoreDiscovery::new(LocalObjectStore::new(tree.root()), BUCKET).unwrap();
    assert_eq!(
        backend.discover_environment().unwrap(),
        expected_environment(&standard_regions())
    );
}

#[test]
fn in_memory_store_matches_filesystem() {
    let tree = FixtureTree::standard();
    let from_store = in_memory(&tree).discover_environment().unwrap();
    let from_disk = FilesystemDiscovery::new(tree.root())
        .unwrap()
        .discover_environment()
        .unwrap();
    assert_eq!(from_store, from_disk);
}

#[test]
fn region_filtering_skips_extraneous_entries() {
    let tree = FixtureTree::standard();
    tree.put_extraneous_entries();
    let expected = expected_environment(&standard_regions());

    let from_disk = FilesystemDiscovery::new(tree.root())
        .unwrap()
        .discover_environment()
        .unwrap();
    assert_eq!(from_disk, expected);
    assert_eq!(in_memory(&tree).discover_environment().unwrap(), expected);
}

#[test]
fn listing_follows_every_page() {
    let tree = FixtureTree::standard();
    tree.put_extraneous_entries();
    for region in ["eu-central-1", "eu-west-1", "us-east-2"] {
        tree.put_landing_zone(region, LANDING_ZONE_SCHEMA, &landing_zone_payload(region, STANDARD_LIFECYCLE));
    }

    let env = in_memory_paged(&tree, 1).discover_environment().unwrap();
    let regions: Vec<_> = env.landing_zones.keys().copied().collect();
    assert_eq!(
        regions,
        vec![
            RegionId::EU_CENTRAL_1,
            RegionId::EU_WEST_1,
            RegionId::US_EAST_1,
            RegionId::US_EAST_2,
            RegionId::US_WEST_1,
        ]
    );
}

#[test]
fn landing_zone_in_recent_region_is_discovered() {
    let tree = FixtureTree::standard();
    tree.put_landing_zone("mx-central-1", LANDING_ZONE_SCHEMA, &landing_zone_payload("mx-central-1", STANDARD_LIFECYCLE));

    let env = FilesystemDiscovery::new(tree.root())
        .unwrap()
        .discover_environment()
        .unwrap();
    let region: RegionId = "mx-central-1".parse().unwrap();
    assert_eq!(env.landing_zones.len(), 3);
    assert_eq!(env.landing_zone(region).map(|lz| lz.metadata.region), Some(region));
}

#[test]
fn lifecycle_mismatch_fails_without_partial_result() {
    let tree = FixtureTree::standard();
    tree.put_landing_zone(
        "us-east-1",
        LANDING_ZONE_SCHEMA,
        &landing_zone_payload_with(
            "us-east-1",
            vec![lifecycle_arn("us-east-1", "a"), lifecycle_arn("us-east-1", "b")],
            vec!["a".into()],
        ),
    );

    for result in [
        FilesystemDiscovery::new(tree.root()).unwrap().discover_environment(),
        in_memory(&tree).discover_environment(),
    ] {
        match result {
            Err(DiscoveryError::CountMismatch { region, arns, names }) => {
                assert_eq!((region, arns, names), (RegionId::US_EAST_1, 2, 1));
            }
            other => panic!("expected count mismatch, got {other:?}"),
        }
    }
}

#[test]
fn missing_environment_config_on_both_backends() {
    let tree = FixtureTree::standard();
    tree.remove("v0/environment/config.json");

    let fs_err = FilesystemDiscovery::new(tree.root())
        .unwrap()
        .discover_environment()
        .unwrap_err();
    assert!(fs_err.is_not_found());

    let store_err = in_memory(&tree).discover_environment().unwrap_err();
    assert!(store_err.is_not_found());
}

#[test]
fn missing_bucket_fails_at_construction() {
    let tree = FixtureTree::standard_in_bucket(BUCKET);
    let err = ObjectStoreDiscovery::new(LocalObjectStore::new(tree.root()), "other-bucket").unwrap_err();
    assert!(err.is_not_found());

    let err = ObjectStoreDiscovery::new(InMemoryObjectStore::new(), BUCKET).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn no_landing_zones_is_an_empty_map() {
    let tree = FixtureTree::standard();
    tree.remove("v0/landingzones");

    let env = FilesystemDiscovery::new(tree.root())
        .unwrap()
        .discover_environment()
        .unwrap();
    assert_eq!(env, expected_environment(&[]));
    assert_eq!(in_memory(&tree).discover_environment().unwrap(), expected_environment(&[]));
}

#[test]
fn unrecognized_metadata_region_is_validation_error() {
    let tree = FixtureTree::standard();
    let mut payload = landing_zone_payload("us-west-1", STANDARD_LIFECYCLE);
    payload["metadata"]["region"] = "mars-north-1".into();
    tree.put_landing_zone("us-west-1", LANDING_ZONE_SCHEMA, &payload);

    let err = FilesystemDiscovery::new(tree.root())
        .unwrap()
        .discover_environment()
        .unwrap_err();
    assert!(err.is_validation(), "{err}");
}

#[test]
fn malformed_envelope_is_decode_error() {
    let tree = FixtureTree::standard();
    tree.put("v0/landingzones/us-west-1/config.json", "{\"schema\": \"not base64!\"}");

    let err = FilesystemDiscovery::new(tree.root())
        .unwrap()
        .discover_environment()
        .unwrap_err();
    assert!(err.is_decode(), "{err}");
}

#[test]
fn cached_backend_sees_new_landing_zone_after_expiry() {
    let tree = FixtureTree::standard();
    let clock = Arc::new(ManualClock::new());
    let ttl = Duration::from_secs(60);
    let cached = CachedDiscovery::with_clock(
        FilesystemDiscovery::new(tree.root()).unwrap(),
        ttl,
        Arc::clone(&clock),
    );

    let first = cached.get_or_discover().unwrap();
    assert_eq!(first.environment.landing_zones.len(), 2);

    tree.put_landing_zone("eu-west-1", LANDING_ZONE_SCHEMA, &landing_zone_payload("eu-west-1", STANDARD_LIFECYCLE));
    clock.advance(ttl / 2);
    assert_eq!(cached.get_or_discover().unwrap().environment.landing_zones.len(), 2);

    clock.advance(ttl / 2);
    let refreshed = cached.get_or_discover().unwrap();
    assert_eq!(refreshed.environment.landing_zones.len(), 3);
    assert!(refreshed.environment.landing_zone(RegionId::EU_WEST_1).is_some());
}

#[test]
fn config_file_opens_cached_object_store() {
    let tree = FixtureTree::standard_in_bucket(BUCKET);
    let config_path = tree.root().join("srd.toml");
    std::fs::write(
        &config_path,
        format!(
            "cache_ttl_secs = 120\n[source]\nkind = \"object_store\"\nroot = {:?}\nbucket = \"{BUCKET}\"\n",
            tree.root().display().to_string()
        ),
    )
    .unwrap();

    let discovery = DiscoveryConfig::load(&config_path).unwrap().open_discovery().unwrap();
    assert_eq!(discovery.ttl(), Duration::from_secs(120));
    assert_eq!(
        discovery.discover_environment().unwrap(),
        expected_environment(&standard_regions())
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn lifecycle_lists_pair_only_when_counts_match(arn_count in 0usize..4, name_count in 0usize..4) {
        let tree = FixtureTree::standard();
        tree.put_landing_zone(
            "us-west-1",
            LANDING_ZONE_SCHEMA,
            &landing_zone_payload_with(
                "us-west-1",
                (0..arn_count).map(|i| lifecycle_arn("us-west-1", &format!("lc-{i}"))).collect(),
                (0..name_count).map(|i| format!("lc-{i}")).collect(),
            ),
        );

        let result = in_memory(&tree).discover_environment();
        if arn_count == name_count {
            let env = result.unwrap();
            let zone = env.landing_zone(RegionId::US_WEST_1).unwrap();
            prop_assert_eq!(zone.lifecycle_configurations.len(), arn_count);
            for (i, lc) in zone.lifecycle_configurations.iter().enumerate() {
                prop_assert_eq!(&lc.name, &format!("lc-{i}"));
            }
        } else {
            prop_assert!(result.unwrap_err().is_count_mismatch());
        }
    }
}
