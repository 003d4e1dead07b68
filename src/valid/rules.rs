//! Per-entity rule sets
//!
//! Every rule set only looks at the entity's own fields. The store is consulted
//! solely to check whether the entity's weak references still resolve.

use std::sync::LazyLock;

use regex::Regex;

use super::Validate;
use super::condition::{Condition, could, evaluate, must, should};
use super::result::ValidationResult;
use crate::associations::{EntityWithMetadata, EntityWithSources};
use crate::entities::{
    Container, DataArray, Dimension, EntityKind, Feature, NamedEntity, PositionalTag, Property,
    RangeDimension, RegionTag, SampledDimension, Section, SetDimension, Source,
};
use crate::id::{EntityId, Identified};
use crate::store::Store;
use crate::units;

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$").expect("valid regex"));

fn is_uri(value: &str) -> bool {
    URI_RE.is_match(value)
}

fn resolves_to_array(store: &Store, id: Option<&EntityId>) -> bool {
    id.is_some_and(|id| store.get::<DataArray>(id).is_some())
}

/// Name, type and timestamps
pub(crate) fn base_rules<'a, T: NamedEntity + 'a>() -> Vec<Condition<'a, T>> {
    vec![
        must(|e: &T| !e.name().trim().is_empty(), "name is not set!"),
        must(|e: &T| !e.entity_type().trim().is_empty(), "type is not set!"),
        must(
            |e: &T| e.created_at() <= e.updated_at(),
            "date of creation is later than date of last update!",
        ),
    ]
}

fn metadata_rules<'a, T: EntityWithMetadata + 'a>(store: &'a Store) -> Vec<Condition<'a, T>> {
    let mut rules = base_rules();
    rules.push(could(
        |e: &T| e.has_metadata(),
        vec![should(
            move |e: &T| e.metadata(store).is_some(),
            "metadata section does not exist!",
        )],
    ));
    rules
}

fn source_rules<'a, T: EntityWithSources + 'a>(store: &'a Store) -> Vec<Condition<'a, T>> {
    let mut rules = metadata_rules(store);
    rules.push(could(
        |e: &T| e.source_count() > 0,
        vec![should(
            move |e: &T| e.dangling_sources(store).is_empty(),
            "some sources do not exist!",
        )],
    ));
    rules
}

impl Validate for Container {
    fn validate(&self, store: &Store) -> ValidationResult {
        evaluate(self.id(), EntityKind::Container, self, &metadata_rules(store))
    }
}

impl Validate for Source {
    fn validate(&self, store: &Store) -> ValidationResult {
        evaluate(self.id(), EntityKind::Source, self, &metadata_rules(store))
    }
}

impl Validate for DataArray {
    fn validate(&self, store: &Store) -> ValidationResult {
        let mut rules = source_rules(store);
        rules.extend([
            could(
                |a: &DataArray| a.has_data(),
                vec![must(
                    |a: &DataArray| a.shape_len() == Some(a.data().len()),
                    "data does not match its shape!",
                )],
            ),
            could(
                |a: &DataArray| a.dimension_count() > 0,
                vec![must(
                    |a: &DataArray| !a.has_data() || a.dimension_count() == a.rank(),
                    "data dimensionality does not match number of defined dimensions!",
                )],
            ),
            could(
                |a: &DataArray| a.unit().is_some(),
                vec![should(
                    |a: &DataArray| a.unit().is_some_and(units::is_valid_unit),
                    "unit is not SI or composite of SI units.",
                )],
            ),
            could(
                |a: &DataArray| a.expansion_origin().is_some(),
                vec![should(
                    |a: &DataArray| a.unit().is_some(),
                    "expansion origin is set but no unit is given!",
                )],
            ),
        ]);
        evaluate(self.id(), EntityKind::DataArray, self, &rules)
    }
}

impl Validate for SetDimension {
    fn validate(&self, _store: &Store) -> ValidationResult {
        let rules = [could(
            |d: &SetDimension| !d.labels().is_empty(),
            vec![should(
                |d: &SetDimension| d.labels().iter().all(|l| !l.trim().is_empty()),
                "some labels are empty!",
            )],
        )];
        evaluate(self.id(), EntityKind::SetDimension, self, &rules)
    }
}

impl Validate for SampledDimension {
    fn validate(&self, _store: &Store) -> ValidationResult {
        let rules = [
            must(
                |d: &SampledDimension| d.sampling_interval().is_some_and(|i| i > 0.0),
                "sampling interval is not set or not greater than 0!",
            ),
            could(
                |d: &SampledDimension| d.unit().is_some(),
                vec![should(
                    |d: &SampledDimension| d.unit().is_some_and(units::is_si_unit),
                    "unit is not an atomic SI unit.",
                )],
            ),
            could(
                |d: &SampledDimension| d.offset().is_some(),
                vec![should(
                    |d: &SampledDimension| d.offset().is_some_and(f64::is_finite),
                    "offset is not a finite number!",
                )],
            ),
        ];
        evaluate(self.id(), EntityKind::SampledDimension, self, &rules)
    }
}

impl Validate for RangeDimension {
    fn validate(&self, _store: &Store) -> ValidationResult {
        let rules = [
            must(|d: &RangeDimension| !d.ticks().is_empty(), "ticks are not set!"),
            could(
                |d: &RangeDimension| !d.ticks().is_empty(),
                vec![must(
                    |d: &RangeDimension| d.ticks().windows(2).all(|w| w[0] <= w[1]),
                    "ticks are not sorted!",
                )],
            ),
            could(
                |d: &RangeDimension| d.unit().is_some(),
                vec![should(
                    |d: &RangeDimension| d.unit().is_some_and(units::is_si_unit),
                    "unit is not an atomic SI unit.",
                )],
            ),
        ];
        evaluate(self.id(), EntityKind::RangeDimension, self, &rules)
    }
}

impl Validate for Dimension {
    fn validate(&self, store: &Store) -> ValidationResult {
        match self {
            Dimension::Set(d) => d.validate(store),
            Dimension::Sampled(d) => d.validate(store),
            Dimension::Range(d) => d.validate(store),
        }
    }
}

impl Validate for PositionalTag {
    fn validate(&self, store: &Store) -> ValidationResult {
        let mut rules = source_rules(store);
        rules.extend([
            must(|t: &PositionalTag| t.position().is_some(), "position is not set!"),
            could(
                |t: &PositionalTag| t.position().is_some(),
                vec![should(
                    move |t: &PositionalTag| resolves_to_array(store, t.position()),
                    "position does not exist!",
                )],
            ),
            should(
                |t: &PositionalTag| t.reference_count() > 0,
                "no data arrays are referenced!",
            ),
            could(
                |t: &PositionalTag| t.reference_count() > 0,
                vec![should(
                    move |t: &PositionalTag| {
                        t.reference_refs()
                            .iter()
                            .all(|id| store.get::<DataArray>(id).is_some())
                    },
                    "some referenced data arrays do not exist!",
                )],
            ),
            could(
                |t: &PositionalTag| t.extent().is_some(),
                vec![
                    should(
                        move |t: &PositionalTag| resolves_to_array(store, t.extent()),
                        "extent does not exist!",
                    ),
                    must(
                        move |t: &PositionalTag| {
                            let position = t.position().and_then(|id| store.data_array(id));
                            let extent = t.extent().and_then(|id| store.data_array(id));
                            match (position, extent) {
                                (Some(p), Some(e)) => p.data().len() == e.data().len(),
                                _ => true,
                            }
                        },
                        "number of entries in position and extent do not match!",
                    ),
                ],
            ),
            could(
                |t: &PositionalTag| !t.units().is_empty(),
                vec![should(
                    |t: &PositionalTag| t.units().iter().all(|u| units::is_si_unit(u)),
                    "some units are not atomic SI units.",
                )],
            ),
        ]);
        evaluate(self.id(), EntityKind::PositionalTag, self, &rules)
    }
}

impl Validate for RegionTag {
    fn validate(&self, store: &Store) -> ValidationResult {
        let mut rules = source_rules(store);
        rules.extend([
            must(|t: &RegionTag| t.positions().is_some(), "positions are not set!"),
            could(
                |t: &RegionTag| t.positions().is_some(),
                vec![should(
                    move |t: &RegionTag| resolves_to_array(store, t.positions()),
                    "positions do not exist!",
                )],
            ),
            could(
                |t: &RegionTag| t.extents().is_some(),
                vec![
                    should(
                        move |t: &RegionTag| resolves_to_array(store, t.extents()),
                        "extents do not exist!",
                    ),
                    must(
                        move |t: &RegionTag| {
                            let positions = t.positions().and_then(|id| store.data_array(id));
                            let extents = t.extents().and_then(|id| store.data_array(id));
                            match (positions, extents) {
                                (Some(p), Some(e)) => p.shape() == e.shape(),
                                _ => true,
                            }
                        },
                        "positions and extents do not have the same shape!",
                    ),
                ],
            ),
        ]);
        evaluate(self.id(), EntityKind::RegionTag, self, &rules)
    }
}

impl Validate for Feature {
    fn validate(&self, store: &Store) -> ValidationResult {
        let rules = [
            must(|f: &Feature| f.target().is_some(), "data array is not set!"),
            could(
                |f: &Feature| f.target().is_some(),
                vec![should(
                    move |f: &Feature| resolves_to_array(store, f.target()),
                    "data array does not exist!",
                )],
            ),
        ];
        evaluate(self.id(), EntityKind::Feature, self, &rules)
    }
}

impl Validate for Section {
    fn validate(&self, store: &Store) -> ValidationResult {
        let mut rules = base_rules();
        rules.extend([
            could(
                |s: &Section| s.link().is_some(),
                vec![
                    must(
                        |s: &Section| s.link() != Some(s.id()),
                        "section is linked to itself!",
                    ),
                    should(
                        move |s: &Section| s.linked_section(store).is_some(),
                        "linked section does not exist!",
                    ),
                ],
            ),
            could(
                |s: &Section| s.repository().is_some(),
                vec![should(
                    |s: &Section| s.repository().is_some_and(is_uri),
                    "repository is not a valid URI!",
                )],
            ),
            could(
                |s: &Section| s.mapping().is_some(),
                vec![should(
                    |s: &Section| s.mapping().is_some_and(is_uri),
                    "mapping is not a valid URI!",
                )],
            ),
        ]);
        evaluate(self.id(), EntityKind::Section, self, &rules)
    }
}

impl Validate for Property {
    fn validate(&self, _store: &Store) -> ValidationResult {
        let mut rules = base_rules();
        rules.extend([
            should(|p: &Property| p.value_count() > 0, "values are not set!"),
            could(
                |p: &Property| p.value_count() > 0,
                vec![must(
                    |p: &Property| p.value_type().is_some(),
                    "values do not all have the same type!",
                )],
            ),
            could(
                |p: &Property| p.unit().is_some(),
                vec![
                    should(
                        |p: &Property| p.values().iter().all(|v| v.is_numeric()),
                        "unit is set but values are not numeric!",
                    ),
                    should(
                        |p: &Property| p.unit().is_some_and(units::is_valid_unit),
                        "unit is not SI or composite of SI units.",
                    ),
                ],
            ),
        ]);
        evaluate(self.id(), EntityKind::Property, self, &rules)
    }
}
