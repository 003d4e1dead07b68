//! Positional and region annotations of arrays

use serde::{Deserialize, Serialize};

use super::feature::with_features;
use super::{EntityBase, Feature, NamedEntity};
use crate::associations::{RefSet, with_metadata, with_sources};
use crate::entities::{Container, DataArray};
use crate::error::Result;
use crate::id::{EntityId, Identified};
use crate::store::Store;

/// Marks a point (and optionally an extent) in the arrays it references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionalTag {
    base: EntityBase,
    metadata: Option<EntityId>,
    sources: RefSet,
    references: RefSet,
    position: Option<EntityId>,
    extent: Option<EntityId>,
    #[serde(default)]
    units: Vec<String>,
    #[serde(default)]
    features: Vec<Feature>,
}

/// Marks a set of regions given by a positions array and an extents array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTag {
    base: EntityBase,
    metadata: Option<EntityId>,
    sources: RefSet,
    positions: Option<EntityId>,
    extents: Option<EntityId>,
    #[serde(default)]
    features: Vec<Feature>,
}

named_entity!(PositionalTag);
with_metadata!(PositionalTag);
with_sources!(PositionalTag);
with_features!(PositionalTag);

named_entity!(RegionTag);
with_metadata!(RegionTag);
with_sources!(RegionTag);
with_features!(RegionTag);

impl PositionalTag {
    pub(crate) fn new(name: &str, entity_type: &str, position: &EntityId) -> Result<Self> {
        Ok(Self {
            base: EntityBase::new(name, entity_type)?,
            metadata: None,
            sources: RefSet::new(),
            references: RefSet::new(),
            position: Some(position.clone()),
            extent: None,
            units: Vec::new(),
            features: Vec::new(),
        })
    }

    pub fn position(&self) -> Option<&EntityId> {
        self.position.as_ref()
    }

    pub fn set_position<T: Identified + ?Sized>(&mut self, array: &T) {
        self.position = Some(array.id().clone());
        self.touch();
    }

    pub fn extent(&self) -> Option<&EntityId> {
        self.extent.as_ref()
    }

    pub fn set_extent<T: Identified + ?Sized>(&mut self, array: &T) {
        self.extent = Some(array.id().clone());
        self.touch();
    }

    pub fn remove_extent(&mut self) -> bool {
        let removed = self.extent.take().is_some();
        if removed {
            self.touch();
        }
        removed
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn set_units<S: AsRef<str>>(&mut self, units: &[S]) {
        self.units = units.iter().map(|u| u.as_ref().to_string()).collect();
        self.touch();
    }

    pub fn reference_refs(&self) -> &RefSet {
        &self.references
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn has_reference(&self, id: &str) -> bool {
        self.references.contains(id)
    }

    /// Idempotent
    pub fn add_reference<T: Identified + ?Sized>(&mut self, array: &T) {
        if self.references.insert(array.id().clone()) {
            self.touch();
        }
    }

    pub fn remove_reference(&mut self, id: &str) -> bool {
        let removed = self.references.remove(id);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_references<'a, T, I>(&mut self, arrays: I)
    where
        T: Identified + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        self.references
            .replace(arrays.into_iter().map(|a| a.id().clone()));
        self.touch();
    }

    pub fn references(&self) -> Vec<EntityId> {
        self.references.ids().to_vec()
    }

    /// Resolve a referenced array; `None` when not referenced or dangling.
    pub fn get_reference<'s>(&self, store: &'s Store, id: &str) -> Option<&'s DataArray> {
        if !self.has_reference(id) {
            return None;
        }
        store.get::<DataArray>(id)
    }
}

impl RegionTag {
    pub(crate) fn new(name: &str, entity_type: &str, positions: &EntityId) -> Result<Self> {
        Ok(Self {
            base: EntityBase::new(name, entity_type)?,
            metadata: None,
            sources: RefSet::new(),
            positions: Some(positions.clone()),
            extents: None,
            features: Vec::new(),
        })
    }

    pub fn positions(&self) -> Option<&EntityId> {
        self.positions.as_ref()
    }

    pub fn set_positions<T: Identified + ?Sized>(&mut self, array: &T) {
        self.positions = Some(array.id().clone());
        self.touch();
    }

    pub fn extents(&self) -> Option<&EntityId> {
        self.extents.as_ref()
    }

    pub fn set_extents<T: Identified + ?Sized>(&mut self, array: &T) {
        self.extents = Some(array.id().clone());
        self.touch();
    }

    pub fn remove_extents(&mut self) -> bool {
        let removed = self.extents.take().is_some();
        if removed {
            self.touch();
        }
        removed
    }
}

impl Store {
    pub fn create_positional_tag(
        &mut self,
        container: &str,
        name: &str,
        entity_type: &str,
        position: &EntityId,
    ) -> Result<EntityId> {
        self.require::<Container>(container)?;
        self.insert(container, PositionalTag::new(name, entity_type, position)?)
    }

    pub fn positional_tags(&self, container: &str) -> Vec<&PositionalTag> {
        self.children::<PositionalTag>(container)
    }

    pub fn positional_tag(&self, id: &str) -> Option<&PositionalTag> {
        self.get::<PositionalTag>(id)
    }

    pub fn positional_tag_mut(&mut self, id: &str) -> Option<&mut PositionalTag> {
        self.get_mut::<PositionalTag>(id)
    }

    pub fn remove_positional_tag(&mut self, container: &str, id: &str) -> bool {
        self.remove::<PositionalTag>(container, id)
    }

    pub fn create_region_tag(
        &mut self,
        container: &str,
        name: &str,
        entity_type: &str,
        positions: &EntityId,
    ) -> Result<EntityId> {
        self.require::<Container>(container)?;
        self.insert(container, RegionTag::new(name, entity_type, positions)?)
    }

    pub fn region_tags(&self, container: &str) -> Vec<&RegionTag> {
        self.children::<RegionTag>(container)
    }

    pub fn region_tag(&self, id: &str) -> Option<&RegionTag> {
        self.get::<RegionTag>(id)
    }

    pub fn region_tag_mut(&mut self, id: &str) -> Option<&mut RegionTag> {
        self.get_mut::<RegionTag>(id)
    }

    pub fn remove_region_tag(&mut self, container: &str, id: &str) -> bool {
        self.remove::<RegionTag>(container, id)
    }
}
