//! Axis descriptors of a [`DataArray`](super::DataArray)
//!
//! A dimension is one of three encodings:
//!
//! - [`SetDimension`]: categorical axis with optional labels
//! - [`SampledDimension`]: regularly sampled axis (`offset + index * interval`)
//! - [`RangeDimension`]: irregular axis given by explicit, ascending ticks

use serde::{Deserialize, Serialize};

use crate::entities::EntityKind;
use crate::id::{EntityId, Identified};
use crate::value::DimensionKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDimension {
    id: EntityId,
    index: usize,
    labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledDimension {
    id: EntityId,
    index: usize,
    label: Option<String>,
    unit: Option<String>,
    #[serde(default, with = "crate::float::option")]
    offset: Option<f64>,
    #[serde(default, with = "crate::float::option")]
    sampling_interval: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeDimension {
    id: EntityId,
    index: usize,
    label: Option<String>,
    unit: Option<String>,
    #[serde(default, with = "crate::float::vec")]
    ticks: Vec<f64>,
}

/// One axis of an array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dimension_type")]
pub enum Dimension {
    Set(SetDimension),
    Sampled(SampledDimension),
    Range(RangeDimension),
}

impl SetDimension {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            id: EntityId::generate(),
            index,
            labels: Vec::new(),
        }
    }

    /// 1-based position within the owning array
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }
}

impl SampledDimension {
    pub(crate) fn new(index: usize, sampling_interval: f64) -> Self {
        Self {
            id: EntityId::generate(),
            index,
            label: None,
            unit: None,
            offset: None,
            sampling_interval: Some(sampling_interval),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<&str>) {
        self.label = label.map(str::to_string);
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn set_unit(&mut self, unit: Option<&str>) {
        self.unit = unit.map(str::to_string);
    }

    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Option<f64>) {
        self.offset = offset;
    }

    pub fn sampling_interval(&self) -> Option<f64> {
        self.sampling_interval
    }

    pub fn set_sampling_interval(&mut self, interval: f64) {
        self.sampling_interval = Some(interval);
    }

    /// Position of sample `index` along this axis
    pub fn position_at(&self, index: usize) -> Option<f64> {
        let interval = self.sampling_interval?;
        Some(self.offset.unwrap_or(0.0) + index as f64 * interval)
    }

    /// Index of the sample nearest to `position`, `None` before the offset
    pub fn index_of(&self, position: f64) -> Option<usize> {
        let interval = self.sampling_interval.filter(|i| *i > 0.0)?;
        let relative = position - self.offset.unwrap_or(0.0);
        if relative < 0.0 {
            return None;
        }
        Some((relative / interval).round() as usize)
    }
}

impl RangeDimension {
    pub(crate) fn new(index: usize, ticks: Vec<f64>) -> Self {
        Self {
            id: EntityId::generate(),
            index,
            label: None,
            unit: None,
            ticks,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<&str>) {
        self.label = label.map(str::to_string);
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn set_unit(&mut self, unit: Option<&str>) {
        self.unit = unit.map(str::to_string);
    }

    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }

    pub fn set_ticks(&mut self, ticks: Vec<f64>) {
        self.ticks = ticks;
    }

    /// Index of the first tick at or after `position`
    pub fn index_of(&self, position: f64) -> Option<usize> {
        self.ticks.iter().position(|tick| *tick >= position)
    }
}

impl Identified for SetDimension {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Identified for SampledDimension {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Identified for RangeDimension {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Identified for Dimension {
    fn id(&self) -> &EntityId {
        match self {
            Dimension::Set(d) => d.id(),
            Dimension::Sampled(d) => d.id(),
            Dimension::Range(d) => d.id(),
        }
    }
}

impl Dimension {
    pub fn dimension_type(&self) -> DimensionKind {
        match self {
            Dimension::Set(_) => DimensionKind::Set,
            Dimension::Sampled(_) => DimensionKind::Sampled,
            Dimension::Range(_) => DimensionKind::Range,
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Dimension::Set(_) => EntityKind::SetDimension,
            Dimension::Sampled(_) => EntityKind::SampledDimension,
            Dimension::Range(_) => EntityKind::RangeDimension,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Dimension::Set(d) => d.index,
            Dimension::Sampled(d) => d.index,
            Dimension::Range(d) => d.index,
        }
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        match self {
            Dimension::Set(d) => d.index = index,
            Dimension::Sampled(d) => d.index = index,
            Dimension::Range(d) => d.index = index,
        }
    }

    pub fn as_set(&self) -> Option<&SetDimension> {
        match self {
            Dimension::Set(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_sampled(&self) -> Option<&SampledDimension> {
        match self {
            Dimension::Sampled(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeDimension> {
        match self {
            Dimension::Range(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut SetDimension> {
        match self {
            Dimension::Set(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_sampled_mut(&mut self) -> Option<&mut SampledDimension> {
        match self {
            Dimension::Sampled(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_range_mut(&mut self) -> Option<&mut RangeDimension> {
        match self {
            Dimension::Range(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampled_positions() {
        let mut dim = SampledDimension::new(1, 0.5);
        dim.set_offset(Some(10.0));
        assert_eq!(dim.position_at(4), Some(12.0));
        assert_eq!(dim.index_of(11.0), Some(2));
        assert_eq!(dim.index_of(9.0), None);

        dim.set_sampling_interval(0.0);
        assert_eq!(dim.index_of(11.0), None);
    }

    #[test]
    fn test_range_index_of() {
        let dim = RangeDimension::new(1, vec![0.0, 1.5, 4.0]);
        assert_eq!(dim.index_of(1.0), Some(1));
        assert_eq!(dim.index_of(4.0), Some(2));
        assert_eq!(dim.index_of(5.0), None);
    }

    #[test]
    fn test_dimension_dispatch() {
        let dim = Dimension::Range(RangeDimension::new(2, vec![1.0]));
        assert_eq!(dim.dimension_type(), DimensionKind::Range);
        assert_eq!(dim.entity_kind(), EntityKind::RangeDimension);
        assert_eq!(dim.index(), 2);
        assert!(dim.as_range().is_some());
        assert!(dim.as_sampled().is_none());
    }

    #[test]
    fn test_dimension_serde_tag() {
        let dim = Dimension::Set(SetDimension::new(1));
        let json = serde_json::to_value(&dim).unwrap();
        assert_eq!(json["dimension_type"], "Set");
    }
}
