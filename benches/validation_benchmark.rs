use divan::Bencher;
use nixmodel::{
    EntityId, EntityWithSources, JsonBackend, Backend, File, FileMode, Implementation, Store,
    ValidationOptions, Value, validate_store,
};

fn main() {
    divan::main();
}

/// A store with `containers` containers, each holding a few arrays, a source
/// chain and one tag, plus a section tree of matching size.
fn build_store(containers: usize) -> Store {
    let mut store = Store::new(EntityId::generate());
    let mut parent_section = store.create_section("root", "odml").unwrap();

    for i in 0..containers {
        let container = store
            .create_container(&format!("block-{i}"), "recording")
            .unwrap();
        let mut source = store.create_source(&container, "cell", "neuron").unwrap();
        for depth in 0..3 {
            source = store
                .create_child_source(&source, &format!("part-{depth}"), "compartment")
                .unwrap();
        }

        let mut arrays = Vec::new();
        for j in 0..4 {
            let array = store
                .create_data_array(&container, &format!("signal-{j}"), "signal")
                .unwrap();
            let array_mut = store.data_array_mut(&array).unwrap();
            array_mut.set_data(vec![0.5; 256], vec![16, 16]);
            array_mut.set_unit(Some("mV"));
            array_mut.append_sampled_dimension(0.001);
            array_mut.append_range_dimension((0..16).map(f64::from).collect());
            array_mut.add_source(&source);
            arrays.push(array);
        }

        let tag = store
            .create_positional_tag(&container, "event", "stimulus", &arrays[0])
            .unwrap();
        store
            .positional_tag_mut(&tag)
            .unwrap()
            .set_references(arrays.iter().skip(1));

        let section = store
            .create_child_section(&parent_section, &format!("meta-{i}"), "odml")
            .unwrap();
        store
            .create_property(&section, "gain", "double", vec![Value::from(2.0)])
            .unwrap();
        parent_section = section;
    }
    store
}

#[divan::bench(args = [1, 10, 100])]
fn validate_graph(bencher: Bencher, containers: usize) {
    let store = build_store(containers);
    let options = ValidationOptions::default();

    bencher.bench_local(move || validate_store(&store, &options));
}

#[divan::bench]
fn validate_graph_shallow_sections(bencher: Bencher) {
    let store = build_store(100);
    let options = ValidationOptions::new().with_section_depth(Some(2));

    bencher.bench_local(move || validate_store(&store, &options));
}

#[divan::bench]
fn json_flush(bencher: Bencher) {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("bench.nix");
    let file = File::open_with(&path, FileMode::Overwrite, Implementation::Memory).unwrap();
    let store = build_store(10);
    let mut backend = JsonBackend::new(&path);

    bencher.bench_local(move || {
        backend
            .flush(file.header(), &store)
            .expect("Flush failed")
    });
}
