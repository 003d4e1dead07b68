use serde::{Deserialize, Serialize};

use super::EntityBase;
use crate::error::Result;
use crate::id::{EntityId, Identified};
use crate::store::Store;

/// Node of a metadata tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    base: EntityBase,
    link: Option<EntityId>,
    repository: Option<String>,
    mapping: Option<String>,
}

named_entity!(Section);

impl Section {
    pub(crate) fn new(name: &str, entity_type: &str) -> Result<Self> {
        Ok(Self {
            base: EntityBase::new(name, entity_type)?,
            link: None,
            repository: None,
            mapping: None,
        })
    }

    /// Section this one inherits from, if any
    pub fn link(&self) -> Option<&EntityId> {
        self.link.as_ref()
    }

    pub fn set_link<S: Identified + ?Sized>(&mut self, section: &S) {
        self.link = Some(section.id().clone());
        self.base.touch();
    }

    pub fn remove_link(&mut self) -> bool {
        let removed = self.link.take().is_some();
        if removed {
            self.base.touch();
        }
        removed
    }

    /// Resolve the link; `None` when unset or dangling.
    pub fn linked_section<'s>(&self, store: &'s Store) -> Option<&'s Section> {
        self.link.as_ref().and_then(|id| store.get::<Section>(id))
    }

    /// URI of the terminology this section follows
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    pub fn set_repository(&mut self, repository: Option<&str>) {
        self.repository = repository.map(str::to_string);
        self.base.touch();
    }

    pub fn mapping(&self) -> Option<&str> {
        self.mapping.as_deref()
    }

    pub fn set_mapping(&mut self, mapping: Option<&str>) {
        self.mapping = mapping.map(str::to_string);
        self.base.touch();
    }
}

impl Store {
    /// Create a top-level section owned by the file
    pub fn create_section(&mut self, name: &str, entity_type: &str) -> Result<EntityId> {
        let root = self.root_id().clone();
        self.insert(&root, Section::new(name, entity_type)?)
    }

    pub fn create_child_section(&mut self, parent: &str, name: &str, entity_type: &str) -> Result<EntityId> {
        self.require::<Section>(parent)?;
        self.insert(parent, Section::new(name, entity_type)?)
    }

    /// Top-level sections, in creation order
    pub fn sections(&self) -> Vec<&Section> {
        self.children::<Section>(self.root_id())
    }

    pub fn section_count(&self) -> usize {
        self.child_count::<Section>(self.root_id())
    }

    pub fn child_sections(&self, parent: &str) -> Vec<&Section> {
        self.children::<Section>(parent)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.get::<Section>(id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.get_mut::<Section>(id)
    }

    pub fn remove_section(&mut self, id: &str) -> bool {
        let root = self.root_id().clone();
        self.remove::<Section>(&root, id)
    }

    pub fn remove_child_section(&mut self, parent: &str, id: &str) -> bool {
        self.remove::<Section>(parent, id)
    }

    /// Sections of every metadata tree, depth-first from the top-level sections.
    ///
    /// Top-level sections are at depth 0 and `max_depth` of `None` is unbounded.
    /// `filter` only decides which sections are returned: the search continues
    /// below sections it rejects.
    pub fn find_sections<F>(&self, filter: F, max_depth: Option<usize>) -> Vec<&Section>
    where
        F: Fn(&Section) -> bool,
    {
        let roots = self.root_ids::<Section>(self.root_id());
        self.walk(&roots, filter, max_depth, false)
    }

    /// Like [`find_sections`](Self::find_sections), but a rejected section hides
    /// its whole subtree.
    pub fn find_sections_pruned<F>(&self, filter: F, max_depth: Option<usize>) -> Vec<&Section>
    where
        F: Fn(&Section) -> bool,
    {
        let roots = self.root_ids::<Section>(self.root_id());
        self.walk(&roots, filter, max_depth, true)
    }

    /// Search the tree below `section`, which itself sits at depth 0
    pub fn find_sections_from<F>(&self, section: &str, filter: F, max_depth: Option<usize>) -> Result<Vec<&Section>>
    where
        F: Fn(&Section) -> bool,
    {
        let start = self.require::<Section>(section)?.id().clone();
        Ok(self.walk(&[start], filter, max_depth, false))
    }
}

#[cfg(test)]
mod tests {
    use crate::entities::{NamedEntity, Section};
    use crate::id::{EntityId, Identified};
    use crate::store::Store;

    // recording
    // ├── hardware
    // │   └── amplifier
    // └── subject
    // protocol
    fn tree() -> (Store, EntityId) {
        let mut store = Store::new(EntityId::generate());
        let recording = store.create_section("recording", "odml.recording").unwrap();
        let hardware = store.create_child_section(&recording, "hardware", "odml.setup").unwrap();
        store.create_child_section(&hardware, "amplifier", "odml.device").unwrap();
        store.create_child_section(&recording, "subject", "odml.subject").unwrap();
        store.create_section("protocol", "odml.protocol").unwrap();
        (store, recording)
    }

    fn names(found: Vec<&Section>) -> Vec<&str> {
        found.into_iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_find_sections_depth_bounds() {
        let (store, _) = tree();
        assert_eq!(names(store.find_sections(|_| true, Some(0))), vec!["recording", "protocol"]);
        assert_eq!(
            names(store.find_sections(|_| true, Some(1))),
            vec!["recording", "hardware", "subject", "protocol"]
        );
        assert_eq!(store.find_sections(|_| true, None).len(), 5);
    }

    #[test]
    fn test_filter_includes_versus_prunes() {
        let (store, _) = tree();
        let is_device = |s: &Section| s.entity_type() == "odml.device";

        assert_eq!(names(store.find_sections(is_device, None)), vec!["amplifier"]);
        assert!(store.find_sections_pruned(is_device, None).is_empty());

        let not_setup = |s: &Section| s.entity_type() != "odml.setup";
        assert_eq!(
            names(store.find_sections_pruned(not_setup, None)),
            vec!["recording", "subject", "protocol"]
        );
    }

    #[test]
    fn test_find_sections_from_subtree() {
        let (store, recording) = tree();
        let found = store.find_sections_from(&recording, |_| true, Some(1)).unwrap();
        assert_eq!(names(found), vec!["recording", "hardware", "subject"]);
        assert!(store.find_sections_from("missing", |_| true, None).is_err());
    }

    #[test]
    fn test_link_and_dangling_link() {
        let (mut store, recording) = tree();
        let template = store.create_section("template", "odml.recording").unwrap();
        store.section_mut(&recording).unwrap().set_link(&template);
        assert_eq!(
            store.section(&recording).unwrap().linked_section(&store).map(|s| s.name()),
            Some("template")
        );

        assert!(store.remove_section(&template));
        let section = store.section(&recording).unwrap();
        assert_eq!(section.link(), Some(&template));
        assert!(section.linked_section(&store).is_none());
    }

    #[test]
    fn test_remove_child_section_is_scoped() {
        let (mut store, recording) = tree();
        let hardware = store.child_sections(&recording)[0].id().clone();
        assert!(!store.remove_section(&hardware));
        assert!(store.remove_child_section(&recording, &hardware));
        assert_eq!(store.find_sections(|_| true, None).len(), 3);
    }
}
