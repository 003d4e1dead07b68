mod common;

use common::{build_recording, memory_file};
use nixmodel::entities::EntityWithFeatures;
use nixmodel::{
    EntityKind, EntityWithMetadata, LinkType, NamedEntity, Section, Severity, Validate,
    ValidationOptions, validate_store,
};

#[test]
fn test_valid_recording_has_no_findings() {
    let mut file = memory_file("valid.nix");
    build_recording(&mut file);

    let result = file.validate().unwrap();
    assert!(result.is_empty(), "unexpected findings: {result:?}");
    assert!(result.is_ok());
}

#[test]
fn test_findings_follow_traversal_order() {
    let mut file = memory_file("order.nix");
    let recording = build_recording(&mut file);
    let store = file.store_mut().unwrap();

    // container-level problem: broken shape on an array
    store
        .data_array_mut(&recording.voltage)
        .unwrap()
        .set_data(vec![1.0, 2.0, 3.0], vec![4]);
    // section-level problem: property without values (a warning)
    store
        .create_property(&recording.subject, "age", "int", Vec::new())
        .unwrap();

    let result = file.validate().unwrap();
    let kinds: Vec<EntityKind> = result.findings().iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![EntityKind::DataArray, EntityKind::Property]);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.warning_count(), 1);
    assert_eq!(
        result.findings()[0].message,
        "data does not match its shape!"
    );
    assert_eq!(result.findings()[1].message, "values are not set!");
}

#[test]
fn test_dangling_references_are_warnings() {
    let mut file = memory_file("warnings.nix");
    let recording = build_recording(&mut file);
    let store = file.store_mut().unwrap();

    let gone = store.create_section("gone", "odml").unwrap();
    store
        .container_mut(&recording.container)
        .unwrap()
        .set_metadata(&gone);
    store.remove_section(&gone);
    store.remove_source_from(&recording.container, &recording.cell);

    let result = file.validate().unwrap();
    assert!(!result.has_errors());
    assert_eq!(result.warning_count(), 2);
    assert!(result.findings().iter().all(|f| f.severity == Severity::Warning));

    let messages: Vec<&str> = result.warnings().iter().map(|f| f.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["metadata section does not exist!", "some sources do not exist!"]
    );
}

#[test]
fn test_removed_feature_target_is_reported_once() {
    let mut file = memory_file("features.nix");
    let recording = build_recording(&mut file);
    let store = file.store_mut().unwrap();

    let stale = store.create_data_array(&recording.container, "stale", "t").unwrap();
    let feature = store
        .positional_tag_mut(&recording.tag)
        .unwrap()
        .create_feature(&stale, LinkType::Untagged);
    store.remove_data_array(&recording.container, &stale);

    let result = file.validate().unwrap();
    assert_eq!(result.len(), 1);
    let finding = &result.findings()[0];
    assert_eq!(finding.id, feature);
    assert_eq!(finding.kind, EntityKind::Feature);
    assert_eq!(finding.message, "data array does not exist!");
}

#[test]
fn test_section_depth_and_filter() {
    let mut file = memory_file("sections.nix");
    let recording = build_recording(&mut file);
    let store = file.store_mut().unwrap();
    let deep = store
        .create_child_section(&recording.subject, "strain", "odml.strain")
        .unwrap();
    store
        .create_property(&deep, "name", "string", Vec::new())
        .unwrap();
    store.section_mut(&deep).unwrap().set_mapping(Some("no uri here"));

    let all = file.validate().unwrap();
    assert_eq!(all.findings_for(&deep).count(), 1);
    assert_eq!(all.len(), 2);

    let shallow = ValidationOptions::new().with_section_depth(Some(1));
    assert!(file.validate_with(&shallow).unwrap().is_empty());

    let filtered =
        ValidationOptions::new().with_section_filter(|s: &Section| s.name() != "strain");
    assert!(file.validate_with(&filtered).unwrap().is_empty());
}

#[test]
fn test_entities_validate_individually() {
    let mut file = memory_file("single.nix");
    let recording = build_recording(&mut file);
    let store = file.store_mut().unwrap();
    store
        .data_array_mut(&recording.voltage)
        .unwrap()
        .set_unit(Some("furlongs"));

    let store = file.store().unwrap();
    let array = store.data_array(&recording.voltage).unwrap();
    let result = array.validate(store);
    assert_eq!(result.warning_count(), 1);
    assert_eq!(
        result.warnings()[0].message,
        "unit is not SI or composite of SI units."
    );

    // the same finding shows up in the full walk
    let full = validate_store(store, &ValidationOptions::default());
    assert_eq!(full, result);
}
