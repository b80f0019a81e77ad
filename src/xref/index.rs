//! Reference index: entity type → entity id → ordered reference records.
//!
//! Both map levels are insertion ordered, so iteration follows traversal
//! order and never depends on hashing.

use indexmap::IndexMap;

use super::types::{EntityType, ReferenceRecord};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceIndex {
    by_type: IndexMap<EntityType, IndexMap<u32, Vec<ReferenceRecord>>>,
    len: usize,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the bucket of its target, creating the bucket on first use
    pub fn add(&mut self, record: ReferenceRecord) {
        self.by_type
            .entry(record.target.kind)
            .or_default()
            .entry(record.target.id)
            .or_default()
            .push(record);
        self.len += 1;
    }

    /// Types with at least one reference, in `EntityType::ALL` order
    pub fn referenced_types(&self) -> Vec<EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(|t| self.by_type.contains_key(t))
            .collect()
    }

    /// Ids of `kind` with at least one reference, in first-seen order
    pub fn referenced_ids(&self, kind: EntityType) -> Vec<u32> {
        self.by_type
            .get(&kind)
            .map(|ids| ids.keys().copied().collect())
            .unwrap_or_default()
    }

    /// References to `(kind, id)`; empty when none were recorded
    pub fn references(&self, kind: EntityType, id: u32) -> &[ReferenceRecord] {
        self.by_type
            .get(&kind)
            .and_then(|ids| ids.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every record, grouped by type then id
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceRecord> {
        self.by_type.values().flat_map(|ids| ids.values().flatten())
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xref::types::{EntityRef, RefKind, SourceLocation};

    fn record(kind: EntityType, id: u32, source_id: u32) -> ReferenceRecord {
        ReferenceRecord {
            target: EntityRef::new(kind, id),
            source: SourceLocation {
                source_type: EntityType::Skill,
                source_id,
                event: None,
            },
            kind: RefKind::Label("name"),
            sequence: 0,
        }
    }

    #[test]
    fn test_ids_keep_first_seen_order() {
        let mut index = ReferenceIndex::new();
        index.add(record(EntityType::Variable, 9, 1));
        index.add(record(EntityType::Variable, 2, 1));
        index.add(record(EntityType::Variable, 9, 2));

        assert_eq!(index.referenced_ids(EntityType::Variable), vec![9, 2]);
        let refs = index.references(EntityType::Variable, 9);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].source.source_id, 1);
        assert_eq!(refs[1].source.source_id, 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_types_follow_menu_order() {
        let mut index = ReferenceIndex::new();
        index.add(record(EntityType::Map, 1, 1));
        index.add(record(EntityType::Switch, 1, 1));

        assert_eq!(
            index.referenced_types(),
            vec![EntityType::Switch, EntityType::Map]
        );
    }

    #[test]
    fn test_absent_bucket_is_empty() {
        let index = ReferenceIndex::new();
        assert!(index.references(EntityType::Actor, 1).is_empty());
        assert!(index.referenced_ids(EntityType::Actor).is_empty());
        assert!(index.is_empty());
    }
}
