//! Build-once reference index over a project, and the read API on top of it.

use tracing::{debug, info};

use super::entities::*;
use super::index::ReferenceIndex;
use super::opcodes::command_name;
use super::recorder::Recorder;
use super::types::{EntityType, RefKind, ReferenceRecord};
use crate::data::{Database, MapSource};
use crate::error::Result;
use crate::ui::{Phase, Ui};

/// Tables in walk order; maps last since they need the side-load
pub const WALK_ORDER: [EntityType; 11] = [
    EntityType::Actor,
    EntityType::Class,
    EntityType::Skill,
    EntityType::Item,
    EntityType::Weapon,
    EntityType::Armor,
    EntityType::Enemy,
    EntityType::Troop,
    EntityType::State,
    EntityType::CommonEvent,
    EntityType::Map,
];

/// Walk every table of `db` into a fresh index.
/// The first map that fails to load aborts the walk.
pub fn build_index<M: MapSource>(
    db: &Database,
    maps: &M,
    ui: &mut impl Ui,
) -> Result<ReferenceIndex> {
    let mut index = ReferenceIndex::new();
    let mut rec = Recorder::new(&mut index);
    let total = WALK_ORDER.len() as u64;

    for (step, table) in WALK_ORDER.into_iter().enumerate() {
        ui.set_progress(step as u64, total, table.plural());
        debug!(%table, "walking table");

        match table {
            EntityType::Actor => {
                for actor in db.actors.iter().flatten() {
                    walk_actor(&mut rec, actor, &db.classes);
                }
            }
            EntityType::Class => db.classes.iter().flatten().for_each(|r| walk_class(&mut rec, r)),
            EntityType::Skill => db.skills.iter().flatten().for_each(|r| walk_skill(&mut rec, r)),
            EntityType::Item => db.items.iter().flatten().for_each(|r| walk_item(&mut rec, r)),
            EntityType::Weapon => db.weapons.iter().flatten().for_each(|r| walk_weapon(&mut rec, r)),
            EntityType::Armor => db.armors.iter().flatten().for_each(|r| walk_armor(&mut rec, r)),
            EntityType::Enemy => db.enemies.iter().flatten().for_each(|r| walk_enemy(&mut rec, r)),
            EntityType::Troop => db.troops.iter().flatten().for_each(|r| walk_troop(&mut rec, r)),
            EntityType::State => db.states.iter().flatten().for_each(|r| walk_state(&mut rec, r)),
            EntityType::CommonEvent => db
                .common_events
                .iter()
                .flatten()
                .for_each(|r| walk_common_event(&mut rec, r)),
            EntityType::Map => {
                for map_info in db.map_infos.iter().flatten() {
                    let map = maps.load_map(map_info.id)?;
                    walk_map(&mut rec, map_info, &map);
                }
            }
            _ => {}
        }
    }

    ui.set_progress(total, total, "Done");
    Ok(index)
}

/// Owns a project's database and its reference index.
///
/// Queries read whatever the last successful build produced; before the
/// first build they see an empty index.
pub struct XrefManager<M> {
    db: Database,
    maps: M,
    index: ReferenceIndex,
    loaded: bool,
}

impl<M: MapSource> XrefManager<M> {
    pub fn new(db: Database, maps: M) -> Self {
        Self {
            db,
            maps,
            index: ReferenceIndex::new(),
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Build the index unless a previous build already completed
    pub fn ensure_built(&mut self, ui: &mut impl Ui) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        self.rebuild(ui)
    }

    /// Build a new index and replace the current one. On failure the
    /// previous index and `loaded` flag are left untouched.
    pub fn rebuild(&mut self, ui: &mut impl Ui) -> Result<()> {
        ui.set_phase(Phase::Indexing);
        ui.log("Building list of cross references...");

        let index = build_index(&self.db, &self.maps, ui)?;

        info!(records = index.len(), "cross reference index built");
        ui.log(format!(
            "Indexed {} references across {} entity types",
            index.len(),
            index.referenced_types().len()
        ));

        self.index = index;
        self.loaded = true;
        Ok(())
    }
}

impl<M> XrefManager<M> {
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    /// Entity types with at least one reference
    pub fn referenced_types(&self) -> Vec<EntityType> {
        self.index.referenced_types()
    }

    /// Referenced ids of `kind`, in first-seen order
    pub fn referenced_ids(&self, kind: EntityType) -> Vec<u32> {
        self.index.referenced_ids(kind)
    }

    pub fn references(&self, kind: EntityType, id: u32) -> &[ReferenceRecord] {
        self.index.references(kind, id)
    }

    /// Name of `(kind, id)` from its table, empty if the slot is absent
    pub fn display_name(&self, kind: EntityType, id: u32) -> String {
        self.db.name(kind, id).unwrap_or_default().to_string()
    }

    /// `0007: Potion`
    pub fn entry_label(&self, kind: EntityType, id: u32) -> String {
        format!("{:04}: {}", id, self.display_name(kind, id))
    }

    /// One line describing where and why `record` was found, e.g.
    /// `Map 3: Town     EV005: Door     1:12     Show Text`
    pub fn describe(&self, record: &ReferenceRecord) -> String {
        let source = &record.source;
        let mut text = format!(
            "{} {}: {}",
            source.source_type.title(),
            source.source_id,
            self.display_name(source.source_type, source.source_id)
        );

        if let Some(event) = &source.event {
            text.push_str("     ");
            if let Some(event_id) = event.event_id {
                text.push_str(&format!(
                    "EV{:03}: {}",
                    event_id,
                    event.event_name.as_deref().unwrap_or_default()
                ));
            }
            text.push_str(&format!("     {}:{}", event.page, event.line));
        }

        text.push_str("     ");
        text.push_str(&kind_label(record.kind));
        text
    }
}

/// Field label, or the command name for opcode kinds
pub fn kind_label(kind: RefKind) -> String {
    match kind {
        RefKind::Label(label) => label.to_string(),
        RefKind::Command(code) => command_name(code).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Map, MapInfo, Skill};
    use crate::ui::SilentUi;
    use crate::xref::types::{EntityRef, EventContext, SourceLocation};
    use std::collections::HashMap;

    fn database() -> Database {
        let mut db = Database::default();
        db.system.variables = vec![None, Some("Gold".to_string())];
        db.skills = vec![
            None,
            Some(Skill {
                id: 1,
                name: "Heal".to_string(),
                description: r"Restores \v[1]".to_string(),
                ..Default::default()
            }),
        ];
        db.map_infos = vec![
            None,
            Some(MapInfo {
                id: 1,
                name: "Field".to_string(),
            }),
        ];
        db
    }

    fn maps() -> HashMap<u32, Map> {
        HashMap::from([(1, Map::default())])
    }

    #[test]
    fn test_ensure_built_is_idempotent() {
        let mut manager = XrefManager::new(database(), maps());
        assert!(!manager.is_loaded());
        assert!(manager.referenced_types().is_empty());

        manager.ensure_built(&mut SilentUi::new()).unwrap();
        let first = manager.index().clone();
        manager.ensure_built(&mut SilentUi::new()).unwrap();

        assert!(manager.is_loaded());
        assert_eq!(manager.index(), &first);
        assert_eq!(manager.references(EntityType::Variable, 1).len(), 1);
    }

    #[test]
    fn test_failed_build_stays_unloaded() {
        let mut manager = XrefManager::new(database(), HashMap::<u32, Map>::new());
        assert!(manager.ensure_built(&mut SilentUi::new()).is_err());
        assert!(!manager.is_loaded());
        assert!(manager.index().is_empty());
    }

    #[test]
    fn test_display_names() {
        let manager = XrefManager::new(database(), maps());
        assert_eq!(manager.display_name(EntityType::Variable, 1), "Gold");
        assert_eq!(manager.display_name(EntityType::Skill, 1), "Heal");
        assert_eq!(manager.display_name(EntityType::Skill, 5), "");
        assert_eq!(manager.entry_label(EntityType::Skill, 1), "0001: Heal");
    }

    #[test]
    fn test_describe() {
        let manager = XrefManager::new(database(), maps());
        let record = ReferenceRecord {
            target: EntityRef::new(EntityType::Variable, 1),
            source: SourceLocation {
                source_type: EntityType::Map,
                source_id: 1,
                event: Some(EventContext {
                    event_id: Some(5),
                    event_name: Some("Door".to_string()),
                    page: 1,
                    line: 12,
                }),
            },
            kind: RefKind::Command(401),
            sequence: 0,
        };
        assert_eq!(
            manager.describe(&record),
            "Map 1: Field     EV005: Door     1:12     Show Text"
        );

        let plain = ReferenceRecord {
            source: SourceLocation {
                source_type: EntityType::Skill,
                source_id: 1,
                event: None,
            },
            kind: RefKind::Label("description"),
            ..record
        };
        assert_eq!(manager.describe(&plain), "Skill 1: Heal     description");
    }
}
