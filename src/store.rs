//! Entity arena
//!
//! All entities of one file live in a flat table keyed by id. Ownership is kept in
//! two indexes: each entity's parent id, and each parent's ordered list of child
//! ids. Those edges always form a tree rooted at the file id because entities are
//! only ever inserted under an existing parent with a freshly generated id.
//!
//! Typed factories and accessors for each entity kind live next to the entity
//! (`impl Store` blocks in [`crate::entities`]); this module provides the generic
//! machinery they share.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::entities::{
    Container, DataArray, EntityKind, NamedEntity, PositionalTag, Property, RegionTag, Section,
    Source,
};
use crate::error::{ModelError, Result};
use crate::id::{EntityId, Identified};

/// One stored entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    Container(Container),
    DataArray(DataArray),
    PositionalTag(PositionalTag),
    RegionTag(RegionTag),
    Source(Source),
    Section(Section),
    Property(Property),
}

impl Node {
    pub fn kind(&self) -> EntityKind {
        match self {
            Node::Container(_) => EntityKind::Container,
            Node::DataArray(_) => EntityKind::DataArray,
            Node::PositionalTag(_) => EntityKind::PositionalTag,
            Node::RegionTag(_) => EntityKind::RegionTag,
            Node::Source(_) => EntityKind::Source,
            Node::Section(_) => EntityKind::Section,
            Node::Property(_) => EntityKind::Property,
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            Node::Container(e) => e.id(),
            Node::DataArray(e) => e.id(),
            Node::PositionalTag(e) => e.id(),
            Node::RegionTag(e) => e.id(),
            Node::Source(e) => e.id(),
            Node::Section(e) => e.id(),
            Node::Property(e) => e.id(),
        }
    }
}

/// An entity type that can be stored in the arena
pub trait StoredEntity: NamedEntity + Sized {
    const KIND: EntityKind;

    fn from_node(node: &Node) -> Option<&Self>;
    fn from_node_mut(node: &mut Node) -> Option<&mut Self>;
    fn into_node(self) -> Node;
}

macro_rules! stored_entity {
    ($ty:ident) => {
        impl StoredEntity for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn from_node(node: &Node) -> Option<&Self> {
                match node {
                    Node::$ty(entity) => Some(entity),
                    _ => None,
                }
            }

            fn from_node_mut(node: &mut Node) -> Option<&mut Self> {
                match node {
                    Node::$ty(entity) => Some(entity),
                    _ => None,
                }
            }

            fn into_node(self) -> Node {
                Node::$ty(self)
            }
        }
    };
}

stored_entity!(Container);
stored_entity!(DataArray);
stored_entity!(PositionalTag);
stored_entity!(RegionTag);
stored_entity!(Source);
stored_entity!(Section);
stored_entity!(Property);

/// Flat entity table with ownership indexes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    root: EntityId,
    nodes: BTreeMap<EntityId, Node>,
    parents: BTreeMap<EntityId, EntityId>,
    children: BTreeMap<EntityId, Vec<EntityId>>,
}

impl Store {
    /// An empty arena whose top-level entities are owned by `root`
    pub fn new(root: EntityId) -> Self {
        Self {
            root,
            nodes: BTreeMap::new(),
            parents: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    /// Id of the file that owns the top-level containers and sections
    pub fn root_id(&self) -> &EntityId {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn kind_of(&self, id: &str) -> Option<EntityKind> {
        self.nodes.get(id).map(Node::kind)
    }

    /// Resolve `id` to a `T`; `None` when missing or of another kind.
    pub fn get<T: StoredEntity>(&self, id: &str) -> Option<&T> {
        self.nodes.get(id).and_then(T::from_node)
    }

    pub fn get_mut<T: StoredEntity>(&mut self, id: &str) -> Option<&mut T> {
        self.nodes.get_mut(id).and_then(T::from_node_mut)
    }

    pub(crate) fn require<T: StoredEntity>(&self, id: &str) -> Result<&T> {
        self.get::<T>(id)
            .ok_or_else(|| ModelError::not_found(T::KIND, id))
    }

    pub(crate) fn require_mut<T: StoredEntity>(&mut self, id: &str) -> Result<&mut T> {
        self.get_mut::<T>(id)
            .ok_or_else(|| ModelError::not_found(T::KIND, id))
    }

    pub fn parent_of(&self, id: &str) -> Option<&EntityId> {
        self.parents.get(id)
    }

    /// Ordered ids of everything `parent` owns
    pub fn child_ids(&self, parent: &str) -> &[EntityId] {
        self.children
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Owned children of `parent` that are of kind `T`, in creation order
    pub fn children<T: StoredEntity>(&self, parent: &str) -> Vec<&T> {
        self.child_ids(parent)
            .iter()
            .filter_map(|id| self.get::<T>(id))
            .collect()
    }

    pub fn child_count<T: StoredEntity>(&self, parent: &str) -> usize {
        self.child_ids(parent)
            .iter()
            .filter(|id| self.get::<T>(id).is_some())
            .count()
    }

    /// Ids of the `T`s owned directly by `parent`
    pub(crate) fn root_ids<T: StoredEntity>(&self, parent: &str) -> Vec<EntityId> {
        self.child_ids(parent)
            .iter()
            .filter(|id| self.get::<T>(id).is_some())
            .cloned()
            .collect()
    }

    /// Is `id` a `T` owned directly by `parent`?
    pub fn owns<T: StoredEntity>(&self, parent: &str, id: &str) -> bool {
        self.get::<T>(id).is_some()
            && self.parents.get(id).map(EntityId::as_str) == Some(parent)
    }

    /// Insert `entity` as the last child of `parent`.
    pub(crate) fn insert<T: StoredEntity>(&mut self, parent: &str, entity: T) -> Result<EntityId> {
        if parent != self.root.as_str() && !self.contains(parent) {
            return Err(ModelError::not_found(EntityKind::File, parent));
        }
        let id = entity.id().clone();
        debug!("create {} '{}' ({}) under {}", T::KIND, entity.name(), id, parent);
        self.nodes.insert(id.clone(), entity.into_node());
        self.parents.insert(id.clone(), EntityId::from(parent));
        self.children
            .entry(EntityId::from(parent))
            .or_default()
            .push(id.clone());
        Ok(id)
    }

    /// Detach the `T` with `id` from `parent` and delete its owned subtree.
    ///
    /// Returns `false` when `parent` does not own such an entity. Weak references
    /// held by other entities are left untouched.
    pub(crate) fn remove<T: StoredEntity>(&mut self, parent: &str, id: &str) -> bool {
        if !self.owns::<T>(parent, id) {
            return false;
        }
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|child| child.as_str() != id);
        }

        let mut pending = vec![EntityId::from(id)];
        let mut removed = 0usize;
        while let Some(next) = pending.pop() {
            if let Some(children) = self.children.remove(next.as_str()) {
                pending.extend(children);
            }
            self.parents.remove(next.as_str());
            if self.nodes.remove(next.as_str()).is_some() {
                removed += 1;
            }
        }
        debug!("removed {} {} and {} owned entities", T::KIND, id, removed - 1);
        true
    }

    /// Depth-first, pre-order walk over the `T` descendants reachable from `roots`.
    ///
    /// `roots` sit at depth 0 and `max_depth` bounds the depth of collected and
    /// visited entities (`None` is unbounded). With `prune == false` the filter only
    /// selects which entities are returned and the walk always continues into their
    /// children; with `prune == true` a rejected entity hides its whole subtree.
    /// Each entity is visited at most once even if the indexes were corrupted.
    pub(crate) fn walk<'s, T, F>(
        &'s self,
        roots: &[EntityId],
        filter: F,
        max_depth: Option<usize>,
        prune: bool,
    ) -> Vec<&'s T>
    where
        T: StoredEntity,
        F: Fn(&T) -> bool,
    {
        let mut results = Vec::new();
        let mut visited: HashSet<&'s str> = HashSet::new();
        let mut stack: Vec<(&'s EntityId, usize)> = roots
            .iter()
            .filter_map(|id| self.nodes.get_key_value(id.as_str()).map(|(key, _)| key))
            .rev()
            .map(|id| (id, 0))
            .collect();

        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id.as_str()) {
                continue;
            }
            let Some(entity) = self.get::<T>(id) else {
                continue;
            };
            let accepted = filter(entity);
            if accepted {
                results.push(entity);
            }
            if prune && !accepted {
                continue;
            }
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            for child in self.child_ids(id).iter().rev() {
                if self.get::<T>(child).is_some() {
                    stack.push((child, depth + 1));
                }
            }
        }
        results
    }

    /// Append `child` to `parent`'s child list without any checks.
    #[cfg(test)]
    pub(crate) fn link_unchecked(&mut self, parent: &str, child: &str) {
        self.children
            .entry(EntityId::from(parent))
            .or_default()
            .push(EntityId::from(child));
    }
}
