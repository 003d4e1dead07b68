use serde::{Deserialize, Serialize};

use super::{EntityBase, NamedEntity};
use crate::associations::with_metadata;
use crate::error::Result;
use crate::id::EntityId;
use crate::store::Store;

/// Top-level grouping of arrays, tags and a source tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    base: EntityBase,
    metadata: Option<EntityId>,
}

named_entity!(Container);
with_metadata!(Container);

impl Container {
    pub(crate) fn new(name: &str, entity_type: &str) -> Result<Self> {
        Ok(Self {
            base: EntityBase::new(name, entity_type)?,
            metadata: None,
        })
    }
}

impl Store {
    pub fn create_container(&mut self, name: &str, entity_type: &str) -> Result<EntityId> {
        let root = self.root_id().clone();
        self.insert(&root, Container::new(name, entity_type)?)
    }

    pub fn containers(&self) -> Vec<&Container> {
        self.children::<Container>(self.root_id())
    }

    pub fn container_count(&self) -> usize {
        self.child_count::<Container>(self.root_id())
    }

    pub fn has_container(&self, id: &str) -> bool {
        self.owns::<Container>(self.root_id(), id)
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.get::<Container>(id)
    }

    pub fn container_mut(&mut self, id: &str) -> Option<&mut Container> {
        self.get_mut::<Container>(id)
    }

    /// Delete a container together with everything it owns
    pub fn remove_container(&mut self, id: &str) -> bool {
        let root = self.root_id().clone();
        self.remove::<Container>(&root, id)
    }

    /// Name lookup among the top-level containers
    pub fn container_by_name(&self, name: &str) -> Option<&Container> {
        self.containers().into_iter().find(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use crate::associations::EntityWithMetadata;
    use crate::entities::NamedEntity;
    use crate::id::{EntityId, Identified};
    use crate::store::Store;

    #[test]
    fn test_container_lifecycle() {
        let mut store = Store::new(EntityId::generate());
        let first = store.create_container("session_1", "recording").unwrap();
        let second = store.create_container("session_2", "recording").unwrap();

        assert_eq!(store.container_count(), 2);
        assert!(store.has_container(&first));
        assert_eq!(
            store.container_by_name("session_2").map(|c| c.id().clone()),
            Some(second.clone())
        );

        assert!(store.remove_container(&first));
        assert!(!store.remove_container(&first));
        assert_eq!(store.container_count(), 1);
    }

    #[test]
    fn test_container_requires_name() {
        let mut store = Store::new(EntityId::generate());
        assert!(store.create_container("", "recording").is_err());
        assert!(store.create_container("session", "").is_err());
        assert_eq!(store.container_count(), 0);
    }

    #[test]
    fn test_container_metadata_link() {
        let mut store = Store::new(EntityId::generate());
        let container = store.create_container("session", "recording").unwrap();
        let section = store.create_section("recording", "odml.recording").unwrap();

        store
            .container_mut(&container)
            .unwrap()
            .set_metadata(&section);
        let resolved = store.container(&container).unwrap().metadata(&store);
        assert_eq!(resolved.map(|s| s.name()), Some("recording"));

        let root = store.root_id().clone();
        store.remove::<crate::entities::Section>(&root, &section);
        let container = store.container(&container).unwrap();
        assert!(container.has_metadata());
        assert!(container.metadata(&store).is_none());
    }
}
