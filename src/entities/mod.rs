//! The entity graph
//!
//! Concrete entities are plain structs stored by id in the [`Store`](crate::store::Store)
//! arena. Shared capabilities are expressed as traits:
//!
//! - [`NamedEntity`]: id, type, name, definition and timestamps
//! - [`EntityWithMetadata`](crate::associations::EntityWithMetadata): weak link to a section
//! - [`EntityWithSources`](crate::associations::EntityWithSources): ordered weak links to sources

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::id::{EntityId, Identified};

/// Implement [`Identified`] and [`NamedEntity`] for a struct with a `base` field.
macro_rules! named_entity {
    ($ty:ty) => {
        impl $crate::id::Identified for $ty {
            fn id(&self) -> &$crate::id::EntityId {
                &self.base.id
            }
        }

        impl $crate::entities::NamedEntity for $ty {
            fn base(&self) -> &$crate::entities::EntityBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::entities::EntityBase {
                &mut self.base
            }
        }
    };
}

pub mod container;
pub mod data_array;
pub mod dimension;
pub mod feature;
pub mod property;
pub mod section;
pub mod source;
pub mod tag;

pub use container::Container;
pub use data_array::DataArray;
pub use dimension::{Dimension, RangeDimension, SampledDimension, SetDimension};
pub use feature::{EntityWithFeatures, Feature};
pub use property::Property;
pub use section::Section;
pub use source::Source;
pub use tag::{PositionalTag, RegionTag};

/// Every kind of entity that can appear in a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    File,
    Container,
    DataArray,
    SetDimension,
    SampledDimension,
    RangeDimension,
    PositionalTag,
    RegionTag,
    Feature,
    Source,
    Section,
    Property,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::File => "File",
            EntityKind::Container => "Container",
            EntityKind::DataArray => "DataArray",
            EntityKind::SetDimension => "SetDimension",
            EntityKind::SampledDimension => "SampledDimension",
            EntityKind::RangeDimension => "RangeDimension",
            EntityKind::PositionalTag => "PositionalTag",
            EntityKind::RegionTag => "RegionTag",
            EntityKind::Feature => "Feature",
            EntityKind::Source => "Source",
            EntityKind::Section => "Section",
            EntityKind::Property => "Property",
        };
        f.write_str(name)
    }
}

/// Fields shared by all named entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityBase {
    id: EntityId,
    #[serde(rename = "type")]
    entity_type: String,
    name: String,
    definition: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EntityBase {
    /// Assign a fresh id and stamp both timestamps.
    ///
    /// Fails with [`ModelError::EmptyField`] when `name` or `entity_type` is empty.
    pub(crate) fn new(name: &str, entity_type: &str) -> Result<Self> {
        require_non_empty("name", name)?;
        require_non_empty("type", entity_type)?;
        let now = Utc::now();
        Ok(Self {
            id: EntityId::generate(),
            entity_type: entity_type.to_string(),
            name: name.to_string(),
            definition: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ModelError::EmptyField { field });
    }
    Ok(())
}

/// Identity, naming and timestamps
pub trait NamedEntity: Identified {
    fn base(&self) -> &EntityBase;
    fn base_mut(&mut self) -> &mut EntityBase;

    fn name(&self) -> &str {
        &self.base().name
    }

    fn entity_type(&self) -> &str {
        &self.base().entity_type
    }

    fn definition(&self) -> Option<&str> {
        self.base().definition.as_deref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.base().created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.base().updated_at
    }

    fn set_name(&mut self, name: &str) -> Result<()> {
        require_non_empty("name", name)?;
        let base = self.base_mut();
        base.name = name.to_string();
        base.touch();
        Ok(())
    }

    fn set_type(&mut self, entity_type: &str) -> Result<()> {
        require_non_empty("type", entity_type)?;
        let base = self.base_mut();
        base.entity_type = entity_type.to_string();
        base.touch();
        Ok(())
    }

    fn set_definition(&mut self, definition: Option<&str>) {
        let base = self.base_mut();
        base.definition = definition.map(str::to_string);
        base.touch();
    }

    /// Overwrite the creation time, e.g. when importing from another file
    fn force_created_at(&mut self, created_at: DateTime<Utc>) {
        self.base_mut().created_at = created_at;
    }

    /// Stamp `updated_at` with the current time
    fn touch(&mut self) {
        self.base_mut().touch();
    }
}
