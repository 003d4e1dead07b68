//! Full-graph validation
//!
//! Walks everything owned by a file in a fixed order and concatenates the
//! per-entity results:
//!
//! 1. every container, followed by its arrays (each followed by its dimensions),
//!    its region tags and positional tags (each followed by its features) and its
//!    source tree
//! 2. every section returned by the section search, each followed by its properties
//!
//! Entities are validated at most once per walk, even when the ownership indexes
//! have been corrupted into a cycle.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use super::Validate;
use super::result::ValidationResult;
use crate::associations::EntityWithSources;
use crate::entities::{Container, EntityWithFeatures, NamedEntity, Section, Source};
use crate::id::{EntityId, Identified};
use crate::store::Store;

type SectionFilter = Arc<dyn Fn(&Section) -> bool + Send + Sync>;

/// Knobs for one traversal
#[derive(Clone, Default)]
pub struct ValidationOptions {
    /// Depth limit below a container's root sources; `None` is unbounded
    pub source_depth: Option<usize>,
    /// Depth limit below the top-level sections; `None` is unbounded
    pub section_depth: Option<usize>,
    /// Restricts which sections (and their properties) are validated
    pub section_filter: Option<SectionFilter>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_depth(mut self, depth: Option<usize>) -> Self {
        self.source_depth = depth;
        self
    }

    pub fn with_section_depth(mut self, depth: Option<usize>) -> Self {
        self.section_depth = depth;
        self
    }

    pub fn with_section_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Section) -> bool + Send + Sync + 'static,
    {
        self.section_filter = Some(Arc::new(filter));
        self
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("source_depth", &self.source_depth)
            .field("section_depth", &self.section_depth)
            .field("section_filter", &self.section_filter.is_some())
            .finish()
    }
}

struct Traversal<'s> {
    store: &'s Store,
    visited: HashSet<EntityId>,
    result: ValidationResult,
}

impl<'s> Traversal<'s> {
    fn new(store: &'s Store) -> Self {
        Self {
            store,
            visited: HashSet::new(),
            result: ValidationResult::new(),
        }
    }

    /// Validate `entity` unless it has been seen already. Returns whether it was new.
    fn visit<T: Validate + Identified>(&mut self, entity: &T) -> bool {
        if !self.visited.insert(entity.id().clone()) {
            debug!("skipping {} (already visited)", entity.id());
            return false;
        }
        self.result.append(entity.validate(self.store));
        true
    }

    fn report_dangling<T: EntityWithSources>(&self, entity: &T) {
        let dangling = entity.dangling_sources(self.store);
        if !dangling.is_empty() {
            warn!(
                "'{}' ({}) references {} missing source(s)",
                entity.name(),
                entity.id(),
                dangling.len()
            );
        }
    }

    fn container(&mut self, container: &Container, options: &ValidationOptions) {
        if !self.visit(container) {
            return;
        }
        let store = self.store;
        let id = container.id();
        debug!("validating container '{}'", container.name());

        for array in store.data_arrays(id) {
            if self.visit(array) {
                self.report_dangling(array);
                for dimension in array.dimensions() {
                    self.visit(dimension);
                }
            }
        }
        for tag in store.region_tags(id) {
            if self.visit(tag) {
                self.report_dangling(tag);
                for feature in tag.features() {
                    self.visit(feature);
                }
            }
        }
        for tag in store.positional_tags(id) {
            if self.visit(tag) {
                self.report_dangling(tag);
                for feature in tag.features() {
                    self.visit(feature);
                }
            }
        }

        let roots = store.root_ids::<Source>(id);
        let sources: Vec<&Source> = store.walk(&roots, |_| true, options.source_depth, false);
        for source in sources {
            self.visit(source);
        }
    }

    fn sections(&mut self, options: &ValidationOptions) {
        let store = self.store;
        let filter = options.section_filter.as_deref();
        let sections = store.find_sections(
            |section| filter.is_none_or(|accept| accept(section)),
            options.section_depth,
        );
        for section in sections {
            if self.visit(section) {
                for property in store.properties(section.id()) {
                    self.visit(property);
                }
            }
        }
    }
}

/// Validate every container and section of `store`.
///
/// Only the entities owned by the store are covered; the file header is validated
/// separately by the file that owns the store.
pub fn validate_store(store: &Store, options: &ValidationOptions) -> ValidationResult {
    let mut traversal = Traversal::new(store);
    for container in store.containers() {
        traversal.container(container, options);
    }
    traversal.sections(options);
    debug!(
        "validated {} entities, {} finding(s)",
        traversal.visited.len(),
        traversal.result.len()
    );
    traversal.result
}
