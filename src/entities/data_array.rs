use serde::{Deserialize, Serialize};

use super::dimension::{RangeDimension, SampledDimension, SetDimension};
use super::{Dimension, EntityBase, NamedEntity};
use crate::associations::{RefSet, with_metadata, with_sources};
use crate::entities::Container;
use crate::error::Result;
use crate::id::{EntityId, Identified};
use crate::store::Store;

/// N-dimensional value buffer with ordered axis descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    base: EntityBase,
    metadata: Option<EntityId>,
    sources: RefSet,
    label: Option<String>,
    unit: Option<String>,
    #[serde(default, with = "crate::float::option")]
    expansion_origin: Option<f64>,
    #[serde(default, with = "crate::float::vec")]
    data: Vec<f64>,
    #[serde(default)]
    shape: Vec<usize>,
    #[serde(default)]
    dimensions: Vec<Dimension>,
}

named_entity!(DataArray);
with_metadata!(DataArray);
with_sources!(DataArray);

impl DataArray {
    pub(crate) fn new(name: &str, entity_type: &str) -> Result<Self> {
        Ok(Self {
            base: EntityBase::new(name, entity_type)?,
            metadata: None,
            sources: RefSet::new(),
            label: None,
            unit: None,
            expansion_origin: None,
            data: Vec::new(),
            shape: Vec::new(),
            dimensions: Vec::new(),
        })
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<&str>) {
        self.label = label.map(str::to_string);
        self.touch();
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn set_unit(&mut self, unit: Option<&str>) {
        self.unit = unit.map(str::to_string);
        self.touch();
    }

    pub fn expansion_origin(&self) -> Option<f64> {
        self.expansion_origin
    }

    pub fn set_expansion_origin(&mut self, origin: Option<f64>) {
        self.expansion_origin = origin;
        self.touch();
    }

    /// Flat, row-major value buffer
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty() || !self.shape.is_empty()
    }

    /// Number of elements the shape describes; `None` when that overflows `usize`
    pub fn shape_len(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
    }

    /// Number of axes of the stored data
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Store a buffer and its extents. Consistency between the two is a
    /// validation concern, not a precondition.
    pub fn set_data(&mut self, data: Vec<f64>, shape: Vec<usize>) {
        self.data = data;
        self.shape = shape;
        self.touch();
    }

    /// Store a one-dimensional buffer
    pub fn set_data_1d(&mut self, data: Vec<f64>) {
        let len = data.len();
        self.set_data(data, vec![len]);
    }

    pub fn clear_data(&mut self) {
        self.data.clear();
        self.shape.clear();
        self.touch();
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id().as_str() == id)
    }

    /// Mutable access to a dimension; stamps the array as modified
    pub fn dimension_mut(&mut self, id: &str) -> Option<&mut Dimension> {
        self.touch();
        self.dimensions.iter_mut().find(|d| d.id().as_str() == id)
    }

    /// Dimension at 1-based `index`
    pub fn dimension_at(&self, index: usize) -> Option<&Dimension> {
        index
            .checked_sub(1)
            .and_then(|position| self.dimensions.get(position))
    }

    pub fn append_set_dimension(&mut self) -> EntityId {
        let dim = SetDimension::new(self.dimensions.len() + 1);
        self.push_dimension(Dimension::Set(dim))
    }

    pub fn append_sampled_dimension(&mut self, sampling_interval: f64) -> EntityId {
        let dim = SampledDimension::new(self.dimensions.len() + 1, sampling_interval);
        self.push_dimension(Dimension::Sampled(dim))
    }

    pub fn append_range_dimension(&mut self, ticks: Vec<f64>) -> EntityId {
        let dim = RangeDimension::new(self.dimensions.len() + 1, ticks);
        self.push_dimension(Dimension::Range(dim))
    }

    fn push_dimension(&mut self, dimension: Dimension) -> EntityId {
        let id = dimension.id().clone();
        self.dimensions.push(dimension);
        self.touch();
        id
    }

    /// Remove a dimension and renumber the ones after it.
    pub fn remove_dimension(&mut self, id: &str) -> bool {
        let Some(position) = self.dimensions.iter().position(|d| d.id().as_str() == id) else {
            return false;
        };
        self.dimensions.remove(position);
        for (offset, dim) in self.dimensions.iter_mut().enumerate() {
            dim.set_index(offset + 1);
        }
        self.touch();
        true
    }
}

impl Store {
    pub fn create_data_array(
        &mut self,
        container: &str,
        name: &str,
        entity_type: &str,
    ) -> Result<EntityId> {
        self.require::<Container>(container)?;
        self.insert(container, DataArray::new(name, entity_type)?)
    }

    pub fn data_arrays(&self, container: &str) -> Vec<&DataArray> {
        self.children::<DataArray>(container)
    }

    pub fn data_array_count(&self, container: &str) -> usize {
        self.child_count::<DataArray>(container)
    }

    pub fn has_data_array(&self, container: &str, id: &str) -> bool {
        self.owns::<DataArray>(container, id)
    }

    pub fn data_array(&self, id: &str) -> Option<&DataArray> {
        self.get::<DataArray>(id)
    }

    pub fn data_array_mut(&mut self, id: &str) -> Option<&mut DataArray> {
        self.get_mut::<DataArray>(id)
    }

    pub fn remove_data_array(&mut self, container: &str, id: &str) -> bool {
        self.remove::<DataArray>(container, id)
    }
}
