//! Weak references between entities
//!
//! Ownership lives in the [`Store`] arena. Everything else (an entity's sources,
//! its metadata section, a tag's referenced arrays) is a weak reference: an id that
//! is resolved through the store on demand and may fail to resolve once the target
//! has been removed. Removing a target never touches the references that point at it.

use serde::{Deserialize, Serialize};

use crate::entities::{NamedEntity, Section, Source};
use crate::id::{EntityId, Identified};
use crate::store::Store;

/// An ordered set of weak references.
///
/// Insertion order is preserved and an id is stored at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefSet {
    ids: Vec<EntityId>,
}

impl RefSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing.as_str() == id)
    }

    /// Append `id` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, id: EntityId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Returns whether an entry was removed
    pub fn remove(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|existing| existing.as_str() == id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the whole set, keeping the order of `ids` and dropping duplicates.
    pub fn replace<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = EntityId>,
    {
        let mut replacement = RefSet::new();
        for id in ids {
            replacement.insert(id);
        }
        *self = replacement;
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<EntityId> for RefSet {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        let mut set = RefSet::new();
        set.replace(iter);
        set
    }
}

/// An entity that may point at a metadata [`Section`]
pub trait EntityWithMetadata: NamedEntity {
    fn metadata_ref(&self) -> Option<&EntityId>;
    fn metadata_ref_mut(&mut self) -> &mut Option<EntityId>;

    fn has_metadata(&self) -> bool {
        self.metadata_ref().is_some()
    }

    fn set_metadata<S: Identified + ?Sized>(&mut self, section: &S) {
        *self.metadata_ref_mut() = Some(section.id().clone());
        self.touch();
    }

    /// Drop the link. Returns whether a link was set.
    fn remove_metadata(&mut self) -> bool {
        let removed = self.metadata_ref_mut().take().is_some();
        if removed {
            self.touch();
        }
        removed
    }

    /// Resolve the link; `None` when unset or dangling.
    fn metadata<'s>(&self, store: &'s Store) -> Option<&'s Section> {
        self.metadata_ref().and_then(|id| store.get::<Section>(id))
    }
}

/// An entity associated with an ordered set of [`Source`]s
pub trait EntityWithSources: EntityWithMetadata {
    fn source_refs(&self) -> &RefSet;
    fn source_refs_mut(&mut self) -> &mut RefSet;

    fn source_count(&self) -> usize {
        self.source_refs().len()
    }

    fn has_source(&self, id: &str) -> bool {
        self.source_refs().contains(id)
    }

    /// Associate a source; adding one that is already present is a no-op.
    fn add_source<S: Identified + ?Sized>(&mut self, source: &S) {
        if self.source_refs_mut().insert(source.id().clone()) {
            self.touch();
        }
    }

    /// Forget a source. The source itself is not deleted.
    fn remove_source(&mut self, id: &str) -> bool {
        let removed = self.source_refs_mut().remove(id);
        if removed {
            self.touch();
        }
        removed
    }

    /// Replace all associated sources with `sources`, in that order.
    fn set_sources<'a, S, I>(&mut self, sources: I)
    where
        S: Identified + ?Sized + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        let ids: Vec<EntityId> = sources.into_iter().map(|s| s.id().clone()).collect();
        self.source_refs_mut().replace(ids);
        self.touch();
    }

    /// Snapshot of the associated source ids
    fn sources(&self) -> Vec<EntityId> {
        self.source_refs().ids().to_vec()
    }

    /// Resolve an associated source; `None` when not associated or dangling.
    fn get_source<'s>(&self, store: &'s Store, id: &str) -> Option<&'s Source> {
        if !self.has_source(id) {
            return None;
        }
        store.get::<Source>(id)
    }

    /// Ids of associated sources that no longer resolve
    fn dangling_sources(&self, store: &Store) -> Vec<EntityId> {
        self.source_refs()
            .iter()
            .filter(|id| store.get::<Source>(id).is_none())
            .cloned()
            .collect()
    }
}

/// Implement [`EntityWithMetadata`] for a struct with a `metadata` field.
macro_rules! with_metadata {
    ($ty:ty) => {
        impl $crate::associations::EntityWithMetadata for $ty {
            fn metadata_ref(&self) -> Option<&$crate::id::EntityId> {
                self.metadata.as_ref()
            }

            fn metadata_ref_mut(&mut self) -> &mut Option<$crate::id::EntityId> {
                &mut self.metadata
            }
        }
    };
}

/// Implement [`EntityWithSources`] for a struct with a `sources` field.
macro_rules! with_sources {
    ($ty:ty) => {
        impl $crate::associations::EntityWithSources for $ty {
            fn source_refs(&self) -> &$crate::associations::RefSet {
                &self.sources
            }

            fn source_refs_mut(&mut self) -> &mut $crate::associations::RefSet {
                &mut self.sources
            }
        }
    };
}

pub(crate) use {with_metadata, with_sources};
