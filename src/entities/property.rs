use serde::{Deserialize, Serialize};

use super::{EntityBase, NamedEntity, Section};
use crate::error::Result;
use crate::id::EntityId;
use crate::store::Store;
use crate::value::{Value, ValueType};

/// Typed key/value leaf of a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    base: EntityBase,
    mapping: Option<String>,
    unit: Option<String>,
    #[serde(default)]
    values: Vec<Value>,
}

named_entity!(Property);

impl Property {
    pub(crate) fn new(name: &str, entity_type: &str, values: Vec<Value>) -> Result<Self> {
        Ok(Self {
            base: EntityBase::new(name, entity_type)?,
            mapping: None,
            unit: None,
            values,
        })
    }

    pub fn mapping(&self) -> Option<&str> {
        self.mapping.as_deref()
    }

    pub fn set_mapping(&mut self, mapping: Option<&str>) {
        self.mapping = mapping.map(str::to_string);
        self.base.touch();
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn set_unit(&mut self, unit: Option<&str>) {
        self.unit = unit.map(str::to_string);
        self.base.touch();
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn set_values(&mut self, values: Vec<Value>) {
        self.values = values;
        self.base.touch();
    }

    pub fn push_value(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
        self.base.touch();
    }

    pub fn clear_values(&mut self) {
        self.values.clear();
        self.base.touch();
    }

    /// Type shared by all values; `None` when empty or mixed
    pub fn value_type(&self) -> Option<ValueType> {
        let first = self.values.first()?.value_type();
        self.values
            .iter()
            .all(|v| v.value_type() == first)
            .then_some(first)
    }
}

impl Store {
    pub fn create_property(
        &mut self,
        section: &str,
        name: &str,
        entity_type: &str,
        values: Vec<Value>,
    ) -> Result<EntityId> {
        self.require::<Section>(section)?;
        self.insert(section, Property::new(name, entity_type, values)?)
    }

    pub fn properties(&self, section: &str) -> Vec<&Property> {
        self.children::<Property>(section)
    }

    pub fn property_count(&self, section: &str) -> usize {
        self.child_count::<Property>(section)
    }

    pub fn property(&self, id: &str) -> Option<&Property> {
        self.get::<Property>(id)
    }

    pub fn property_mut(&mut self, id: &str) -> Option<&mut Property> {
        self.get_mut::<Property>(id)
    }

    pub fn property_by_name(&self, section: &str, name: &str) -> Option<&Property> {
        self.properties(section).into_iter().find(|p| p.name() == name)
    }

    pub fn remove_property(&mut self, section: &str, id: &str) -> bool {
        self.remove::<Property>(section, id)
    }
}
