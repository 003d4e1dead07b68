use serde::{Deserialize, Serialize};

use super::EntityBase;
use crate::associations::with_metadata;
use crate::entities::Container;
use crate::error::Result;
use crate::id::EntityId;
use crate::store::Store;

/// Provenance of data, organised as a tree below a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    base: EntityBase,
    metadata: Option<EntityId>,
}

named_entity!(Source);
with_metadata!(Source);

impl Source {
    pub(crate) fn new(name: &str, entity_type: &str) -> Result<Self> {
        Ok(Self {
            base: EntityBase::new(name, entity_type)?,
            metadata: None,
        })
    }
}

impl Store {
    /// Create a root source of `container`
    pub fn create_source(&mut self, container: &str, name: &str, entity_type: &str) -> Result<EntityId> {
        self.require::<Container>(container)?;
        self.insert(container, Source::new(name, entity_type)?)
    }

    /// Create a source below another source
    pub fn create_child_source(&mut self, parent: &str, name: &str, entity_type: &str) -> Result<EntityId> {
        self.require::<Source>(parent)?;
        self.insert(parent, Source::new(name, entity_type)?)
    }

    /// Sources owned directly by `parent` (a container or a source)
    pub fn sources_of(&self, parent: &str) -> Vec<&Source> {
        self.children::<Source>(parent)
    }

    pub fn source_count_of(&self, parent: &str) -> usize {
        self.child_count::<Source>(parent)
    }

    pub fn source(&self, id: &str) -> Option<&Source> {
        self.get::<Source>(id)
    }

    pub fn source_mut(&mut self, id: &str) -> Option<&mut Source> {
        self.get_mut::<Source>(id)
    }

    /// Delete a source owned by `parent` together with its subtree
    pub fn remove_source_from(&mut self, parent: &str, id: &str) -> bool {
        self.remove::<Source>(parent, id)
    }

    /// Sources of a container's tree, depth-first.
    ///
    /// The container's root sources sit at depth 0. `filter` selects which sources
    /// are returned; descendants of a rejected source are still searched.
    pub fn find_sources<F>(&self, container: &str, filter: F, max_depth: Option<usize>) -> Result<Vec<&Source>>
    where
        F: Fn(&Source) -> bool,
    {
        self.require::<Container>(container)?;
        let roots = self.root_ids::<Source>(container);
        Ok(self.walk(&roots, filter, max_depth, false))
    }
}
