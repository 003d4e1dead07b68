use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::NamedEntity;
use crate::id::{EntityId, Identified};
use crate::value::LinkType;

/// Weak link from a tag to an array, qualified by how the array relates to the tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    id: EntityId,
    link_type: LinkType,
    target: Option<EntityId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Feature {
    pub(crate) fn new(target: &EntityId, link_type: LinkType) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            link_type,
            target: Some(target.clone()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    pub fn set_link_type(&mut self, link_type: LinkType) {
        self.link_type = link_type;
        self.updated_at = Utc::now();
    }

    pub fn target(&self) -> Option<&EntityId> {
        self.target.as_ref()
    }

    pub fn set_target<T: Identified + ?Sized>(&mut self, target: &T) {
        self.target = Some(target.id().clone());
        self.updated_at = Utc::now();
    }

    pub fn clear_target(&mut self) {
        self.target = None;
        self.updated_at = Utc::now();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Identified for Feature {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// A tag owning an ordered list of features; edits stamp the tag
pub trait EntityWithFeatures: NamedEntity {
    fn feature_list(&self) -> &[Feature];
    fn feature_list_mut(&mut self) -> &mut Vec<Feature>;

    fn features(&self) -> &[Feature] {
        self.feature_list()
    }

    fn feature_count(&self) -> usize {
        self.feature_list().len()
    }

    fn has_feature(&self, id: &str) -> bool {
        self.feature(id).is_some()
    }

    fn feature(&self, id: &str) -> Option<&Feature> {
        self.feature_list().iter().find(|f| f.id().as_str() == id)
    }

    fn feature_mut(&mut self, id: &str) -> Option<&mut Feature> {
        self.touch();
        self.feature_list_mut()
            .iter_mut()
            .find(|f| f.id().as_str() == id)
    }

    /// Link `target` with the given link type and return the new feature's id.
    fn create_feature<T: Identified + ?Sized>(&mut self, target: &T, link_type: LinkType) -> EntityId {
        let feature = Feature::new(target.id(), link_type);
        let id = feature.id().clone();
        self.feature_list_mut().push(feature);
        self.touch();
        id
    }

    fn remove_feature(&mut self, id: &str) -> bool {
        let features = self.feature_list_mut();
        let before = features.len();
        features.retain(|f| f.id().as_str() != id);
        let removed = features.len() != before;
        if removed {
            self.touch();
        }
        removed
    }
}

macro_rules! with_features {
    ($ty:ty) => {
        impl $crate::entities::EntityWithFeatures for $ty {
            fn feature_list(&self) -> &[$crate::entities::Feature] {
                &self.features
            }

            fn feature_list_mut(&mut self) -> &mut Vec<$crate::entities::Feature> {
                &mut self.features
            }
        }
    };
}

pub(crate) use with_features;
