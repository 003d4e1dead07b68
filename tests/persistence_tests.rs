mod common;

use std::fs;

use common::{data_path, write_recording};
use nixmodel::{
    EntityWithSources, File, FileMode, Identified, Implementation, ModelError, NamedEntity,
    Value,
};
use tempfile::TempDir;

#[test]
fn test_json_round_trip_preserves_the_graph() {
    let temp_dir = TempDir::new().unwrap();
    let path = data_path(temp_dir.path(), "recording.nix");
    let recording = write_recording(&path);

    let file = File::open(&path, FileMode::ReadOnly).unwrap();
    let store = file.store().unwrap();

    assert_eq!(file.container_count().unwrap(), 1);
    assert_eq!(file.section_count().unwrap(), 1);

    let voltage = store.data_array(&recording.voltage).unwrap();
    assert_eq!(voltage.name(), "voltage");
    assert_eq!(voltage.data().len(), 100);
    assert_eq!(voltage.unit(), Some("mV"));
    assert_eq!(voltage.sources(), vec![recording.cell.clone()]);
    assert_eq!(
        voltage.dimension_at(1).unwrap().as_sampled().unwrap().sampling_interval(),
        Some(0.001)
    );

    let tag = store.positional_tag(&recording.tag).unwrap();
    assert_eq!(tag.references(), vec![recording.voltage.clone()]);

    let names: Vec<&str> = store
        .property_by_name(&recording.subject, "species")
        .into_iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(names, vec!["species"]);

    assert!(file.validate().unwrap().is_empty());
}

#[test]
fn test_read_only_rejects_mutation() {
    let temp_dir = TempDir::new().unwrap();
    let path = data_path(temp_dir.path(), "frozen.nix");
    write_recording(&path);
    let before = fs::read_to_string(&path).unwrap();

    let mut file = File::open(&path, FileMode::ReadOnly).unwrap();
    assert!(matches!(
        file.create_container("another", "recording"),
        Err(ModelError::ReadOnly { .. })
    ));
    assert!(matches!(file.set_version("2.0"), Err(ModelError::ReadOnly { .. })));
    file.close().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_read_only_requires_an_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = data_path(temp_dir.path(), "absent.nix");
    assert!(matches!(
        File::open(&path, FileMode::ReadOnly),
        Err(ModelError::FileNotFound { .. })
    ));
    assert!(!path.exists());
}

#[test]
fn test_read_write_keeps_and_overwrite_discards() {
    let temp_dir = TempDir::new().unwrap();
    let path = data_path(temp_dir.path(), "edit.nix");
    write_recording(&path);

    let mut file = File::open(&path, FileMode::ReadWrite).unwrap();
    file.create_container("second", "recording").unwrap();
    file.close().unwrap();

    let file = File::open(&path, FileMode::ReadOnly).unwrap();
    assert_eq!(file.container_count().unwrap(), 2);
    drop(file);

    let mut file = File::open(&path, FileMode::Overwrite).unwrap();
    assert_eq!(file.container_count().unwrap(), 0);
    file.close().unwrap();

    let file = File::open(&path, FileMode::ReadOnly).unwrap();
    assert_eq!(file.container_count().unwrap(), 0);
    assert_eq!(file.section_count().unwrap(), 0);
}

#[test]
fn test_closed_file_rejects_access() {
    let temp_dir = TempDir::new().unwrap();
    let path = data_path(temp_dir.path(), "closed.nix");

    let mut file = File::open_with(&path, FileMode::ReadWrite, Implementation::Json).unwrap();
    assert!(file.is_open());
    assert!(path.exists());
    file.close().unwrap();
    file.close().unwrap();

    assert!(!file.is_open());
    assert!(matches!(file.store(), Err(ModelError::FileClosed)));
    assert!(matches!(file.validate(), Err(ModelError::FileClosed)));
    assert!(file.create_section("late", "odml").is_err());
    // the header stays readable and is clean once closed
    assert!(file.header().validate().is_empty());
}

#[test]
fn test_header_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let path = data_path(temp_dir.path(), "header.nix");

    let mut file = File::open(&path, FileMode::Overwrite).unwrap();
    let id = file.id().clone();
    let created = file.header().created_at();
    file.set_version("1.2.0").unwrap();
    file.close().unwrap();

    let file = File::open(&path, FileMode::ReadOnly).unwrap();
    assert_eq!(file.id(), &id);
    assert_eq!(file.header().version(), "1.2.0");
    assert_eq!(file.header().format(), "nix");
    assert_eq!(file.header().created_at(), created);
    assert!(file.header().is_open());
}

#[test]
fn test_missing_creation_date_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = data_path(temp_dir.path(), "undated.nix");

    let mut file = File::open(&path, FileMode::Overwrite).unwrap();
    file.force_created_at(None).unwrap();
    let result = file.validate().unwrap();
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.errors()[0].message, "date is not set!");
}

#[test]
fn test_non_finite_numbers_survive_a_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = data_path(temp_dir.path(), "odd.nix");
    let recording = write_recording(&path);

    let mut file = File::open(&path, FileMode::ReadWrite).unwrap();
    let store = file.store_mut().unwrap();
    let array = store.data_array_mut(&recording.voltage).unwrap();
    array.set_data_1d(vec![f64::NAN, 1.0, f64::NEG_INFINITY]);
    array.set_expansion_origin(Some(f64::INFINITY));
    let dimension = array.dimensions()[0].id().clone();
    array
        .dimension_mut(&dimension)
        .and_then(|d| d.as_sampled_mut())
        .unwrap()
        .set_offset(Some(f64::INFINITY));
    store
        .create_property(&recording.subject, "weight", "double", vec![Value::from(f64::NAN)])
        .unwrap();
    let before = file.validate().unwrap();
    file.close().unwrap();

    let file = File::open(&path, FileMode::ReadOnly).unwrap();
    let store = file.store().unwrap();
    let array = store.data_array(&recording.voltage).unwrap();
    assert!(array.data()[0].is_nan());
    assert_eq!(array.data()[1..], [1.0, f64::NEG_INFINITY]);
    assert_eq!(array.expansion_origin(), Some(f64::INFINITY));
    assert_eq!(
        array.dimension_at(1).unwrap().as_sampled().unwrap().offset(),
        Some(f64::INFINITY)
    );
    let weight = store.property_by_name(&recording.subject, "weight").unwrap();
    assert!(weight.values()[0].as_f64().unwrap().is_nan());

    let after = file.validate().unwrap();
    assert_eq!(after.warning_count(), before.warning_count());
    assert!(
        after
            .warnings()
            .iter()
            .any(|f| f.message == "offset is not a finite number!")
    );
}
