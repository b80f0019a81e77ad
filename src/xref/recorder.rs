//! Traversal context and the single place references are recorded.
//!
//! A `Recorder` carries the current source entity, the current event
//! position and the current command opcode while the walkers descend. It is
//! an ordinary value owned by one build pass, so walkers can be run against
//! a fresh recorder per entity in tests.

use tracing::debug;

use super::index::ReferenceIndex;
use super::scanner::{display_markers, formula_markers};
use super::types::{EntityRef, EntityType, EventContext, RefKind, ReferenceRecord, SourceLocation};

pub struct Recorder<'a> {
    index: &'a mut ReferenceIndex,
    source: Option<(EntityType, u32)>,
    event: Option<EventContext>,
    command: Option<u16>,
}

impl<'a> Recorder<'a> {
    pub fn new(index: &'a mut ReferenceIndex) -> Self {
        Self {
            index,
            source: None,
            event: None,
            command: None,
        }
    }

    /// Make `(kind, id)` the source of every record until the next call
    pub fn set_source(&mut self, kind: EntityType, id: u32) {
        self.source = Some((kind, id));
        self.event = None;
        self.command = None;
    }

    /// Run `f` inside an event scope; the event context is cleared afterwards
    pub fn in_event<F>(&mut self, event: EventContext, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.event = Some(event);
        f(self);
        self.event = None;
        self.command = None;
    }

    /// Current event context, if inside an event scope
    pub fn event(&self) -> Option<&EventContext> {
        self.event.as_ref()
    }

    pub fn event_mut(&mut self) -> Option<&mut EventContext> {
        self.event.as_mut()
    }

    /// Point the context at command `line` with opcode `code`
    pub fn set_command(&mut self, line: u32, code: u16) {
        self.event.get_or_insert_with(EventContext::default).line = line;
        self.command = Some(code);
    }

    pub fn clear_command(&mut self) {
        self.command = None;
    }

    /// Record `(target, id)` with the current opcode as kind and sequence 0
    pub fn save(&mut self, target: EntityType, id: i64) {
        let kind = self.default_kind();
        self.save_as(target, id, kind, 0);
    }

    /// Record `(target, id)` with an explicit kind and sequence.
    /// Non-positive ids are empty slots and are dropped.
    pub fn save_as(&mut self, target: EntityType, id: i64, kind: RefKind, sequence: u32) {
        let Some((source_type, source_id)) = self.source else {
            debug!(%target, id, "reference outside any source entity dropped");
            return;
        };
        let id = match u32::try_from(id) {
            Ok(id) if id > 0 => id,
            _ => {
                debug!(%target, id, %source_type, source_id, "non-positive id skipped");
                return;
            }
        };

        self.index.add(ReferenceRecord {
            target: EntityRef::new(target, id),
            source: SourceLocation {
                source_type,
                source_id,
                event: self.event.clone(),
            },
            kind,
            sequence,
        });
    }

    /// Record every `\v[n]` marker in `text` as a variable reference.
    /// `kind` defaults to the current opcode.
    pub fn scan_text(&mut self, text: &str, kind: Option<RefKind>) {
        let kind = kind.unwrap_or_else(|| self.default_kind());
        self.save_markers(display_markers(text), kind);
    }

    /// Record every bare `v[n]` marker in a damage formula
    pub fn scan_formula(&mut self, formula: &str, kind: RefKind) {
        self.save_markers(formula_markers(formula), kind);
    }

    /// Sequence is the marker's position in the field, unreadable ids included
    fn save_markers(&mut self, markers: Vec<Option<u32>>, kind: RefKind) {
        for (seq, id) in markers.into_iter().enumerate() {
            match id {
                Some(id) => self.save_as(EntityType::Variable, i64::from(id), kind, seq as u32),
                None => debug!(seq, "variable marker id out of range skipped"),
            }
        }
    }

    fn default_kind(&self) -> RefKind {
        match self.command {
            Some(code) => RefKind::Command(code),
            None => RefKind::Label("unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_text_assigns_sequences() {
        let mut index = ReferenceIndex::new();
        let mut rec = Recorder::new(&mut index);
        rec.set_source(EntityType::Actor, 1);
        rec.scan_text(r"\v[1] and \v[2] and \v[1]", Some(RefKind::Label("profile")));

        let refs = index.references(EntityType::Variable, 1);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].sequence, 0);
        assert_eq!(refs[1].sequence, 2);
        assert_eq!(refs[0].kind, RefKind::Label("profile"));
        assert_eq!(index.references(EntityType::Variable, 2)[0].sequence, 1);
    }

    #[test]
    fn test_unreadable_marker_keeps_later_sequences() {
        let mut index = ReferenceIndex::new();
        let mut rec = Recorder::new(&mut index);
        rec.set_source(EntityType::Skill, 4);
        rec.scan_text(r"\v[99999999999] \v[2]", Some(RefKind::Label("description")));
        rec.scan_formula("v[99999999999] * v[3]", RefKind::Label("damage"));

        assert_eq!(index.len(), 2);
        assert_eq!(index.references(EntityType::Variable, 2)[0].sequence, 1);
        assert_eq!(index.references(EntityType::Variable, 3)[0].sequence, 1);
    }

    #[test]
    fn test_zero_ids_are_dropped() {
        let mut index = ReferenceIndex::new();
        let mut rec = Recorder::new(&mut index);
        rec.set_source(EntityType::Class, 3);
        rec.save_as(EntityType::Skill, 0, RefKind::Label("learnings"), 0);
        rec.save_as(EntityType::Skill, -1, RefKind::Label("learnings"), 1);
        assert!(index.is_empty());
    }

    #[test]
    fn test_event_scope_is_cleared() {
        let mut index = ReferenceIndex::new();
        let mut rec = Recorder::new(&mut index);
        rec.set_source(EntityType::CommonEvent, 2);
        rec.in_event(
            EventContext {
                page: 1,
                ..Default::default()
            },
            |rec| {
                rec.set_command(4, 121);
                rec.save(EntityType::Switch, 5);
            },
        );
        assert!(rec.event().is_none());
        rec.save_as(EntityType::Switch, 6, RefKind::Label("conditions"), 0);

        let inside = &index.references(EntityType::Switch, 5)[0];
        assert_eq!(inside.kind, RefKind::Command(121));
        let event = inside.source.event.as_ref().unwrap();
        assert_eq!((event.page, event.line), (1, 4));
        assert!(index.references(EntityType::Switch, 6)[0].source.event.is_none());
    }
}
