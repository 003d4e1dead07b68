#![allow(dead_code)]

use std::path::{Path, PathBuf};

use nixmodel::{
    EntityId, EntityWithSources, File, FileMode, Implementation, LinkType, Value,
};
use nixmodel::entities::EntityWithFeatures;

/// Ids of the entities created by [`build_recording`]
pub struct Recording {
    pub container: EntityId,
    pub voltage: EntityId,
    pub times: EntityId,
    pub tag: EntityId,
    pub cell: EntityId,
    pub section: EntityId,
    pub subject: EntityId,
}

/// A small but complete, valid graph: one container with a sampled signal, an
/// event tag pointing at it, a source tree and a two-level section tree.
pub fn build_recording(file: &mut File) -> Recording {
    let container = file.create_container("session", "recording").unwrap();
    let section = file.create_section("recording", "odml.recording").unwrap();

    let store = file.store_mut().unwrap();
    let subject = store
        .create_child_section(&section, "subject", "odml.subject")
        .unwrap();
    store
        .create_property(&subject, "species", "string", vec![Value::from("Mus musculus")])
        .unwrap();
    store
        .create_property(&section, "duration", "double", vec![Value::from(2.5)])
        .unwrap();

    let cell = store.create_source(&container, "cell", "neuron").unwrap();
    store.create_child_source(&cell, "soma", "compartment").unwrap();

    let voltage = store.create_data_array(&container, "voltage", "signal").unwrap();
    let times = store.create_data_array(&container, "times", "event.times").unwrap();
    {
        let array = store.data_array_mut(&voltage).unwrap();
        array.set_data_1d((0..100).map(|i| i as f64 * 0.1).collect());
        array.set_unit(Some("mV"));
        array.append_sampled_dimension(0.001);
        array.add_source(&cell);
    }
    {
        let array = store.data_array_mut(&times).unwrap();
        array.set_data_1d(vec![0.01, 0.05, 0.09]);
        array.append_range_dimension(vec![0.01, 0.05, 0.09]);
    }

    let tag = store
        .create_positional_tag(&container, "spikes", "event", &times)
        .unwrap();
    {
        let tag_mut = store.positional_tag_mut(&tag).unwrap();
        tag_mut.add_reference(&voltage);
        tag_mut.create_feature(&times, LinkType::Indexed);
    }

    Recording {
        container,
        voltage,
        times,
        tag,
        cell,
        section,
        subject,
    }
}

/// Create (overwrite) a JSON-backed file at `path` holding a valid recording.
pub fn write_recording(path: &Path) -> Recording {
    let mut file = File::open_with(path, FileMode::Overwrite, Implementation::Json).unwrap();
    let recording = build_recording(&mut file);
    file.close().unwrap();
    recording
}

/// An in-memory file; nothing reaches the disk.
pub fn memory_file(name: &str) -> File {
    File::open_with(name, FileMode::Overwrite, Implementation::Memory).unwrap()
}

pub fn data_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}
