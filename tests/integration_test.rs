//! End-to-end tests over a small project written to disk: load the data
//! directory, build the index, query it and export it to SQLite.

use once_cell::sync::Lazy;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use rpg_xref::data::{Database, DirMapSource};
use rpg_xref::ui::SilentUi;
use rpg_xref::writer::export_references;
use rpg_xref::xref::RefKind;
use rpg_xref::{EntityType, XrefManager};

// =============================================================================
// Fixture project
// =============================================================================

static PROJECT: Lazy<TempDir> = Lazy::new(|| {
    let dir = TempDir::new().expect("create temp project");
    write_project(&dir.path().join("data"));
    dir
});

fn write_json(dir: &Path, file: &str, value: Value) {
    fs::write(dir.join(file), serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn write_project(data: &Path) {
    fs::create_dir_all(data).unwrap();

    write_json(
        data,
        "System.json",
        json!({
            "switches": ["", "Door Open", "Boss Beaten"],
            "variables": ["", "Gold", "Keys", "Steps", "Bonus", "A", "B", "C", "D", "E", "Limit"]
        }),
    );
    write_json(
        data,
        "Actors.json",
        json!([null, {
            "id": 1, "name": "Harold", "nickname": "", "profile": "",
            "classId": 1, "equips": [1, 7, 0, 0, 0], "traits": []
        }]),
    );
    write_json(
        data,
        "Classes.json",
        json!([null, {
            "id": 1, "name": "Duelist",
            "learnings": [{ "level": 1, "skillId": 2 }],
            "traits": [{ "code": 55, "dataId": 1, "value": 1 }]
        }]),
    );
    write_json(
        data,
        "Skills.json",
        json!([null,
            { "id": 1, "name": "Attack", "description": "", "damage": { "formula": "a.atk * 4" } },
            {
                "id": 2, "name": "Heal", "description": "Heals \\v[4] HP",
                "message1": "", "message2": "",
                "damage": { "formula": "a.atk - v[4]" }, "animationId": 0, "effects": []
            }
        ]),
    );
    write_json(
        data,
        "Items.json",
        json!([null, { "id": 1, "name": "Potion", "description": "", "effects": [] }]),
    );
    write_json(
        data,
        "Weapons.json",
        json!([null,
            { "id": 1, "name": "Sword", "description": "", "traits": [] },
            null, null, null, null, null,
            { "id": 7, "name": "Dagger", "description": "", "traits": [] }
        ]),
    );
    write_json(
        data,
        "Armors.json",
        json!([null,
            null, null, null, null, null, null,
            { "id": 7, "name": "Buckler", "description": "", "traits": [] }
        ]),
    );
    write_json(data, "Enemies.json", json!([null]));
    write_json(data, "Troops.json", json!([null]));
    write_json(data, "States.json", json!([null]));
    write_json(data, "Animations.json", json!([null]));
    write_json(data, "CommonEvents.json", json!([null]));
    write_json(
        data,
        "MapInfos.json",
        json!([null, { "id": 1, "name": "Town", "parentId": 0, "order": 1 }]),
    );
    write_json(data, "Map001.json", town_map());
}

fn town_map() -> Value {
    json!({
        "displayName": "Town",
        "encounterList": [],
        "events": [null, null, null, null, null, {
            "id": 5,
            "name": "Door",
            "x": 3, "y": 4,
            "pages": [{
                "conditions": {},
                "list": [
                    { "code": 122, "indent": 0, "parameters": [5, 8, 0, 0, 10] },
                    { "code": 111, "indent": 0, "parameters": [1, 3, 1, 9, 0] },
                    { "code": 0, "indent": 1, "parameters": [] },
                    { "code": 0, "indent": 0, "parameters": [] }
                ]
            }]
        }]
    })
}

fn data_dir() -> PathBuf {
    PROJECT.path().join("data")
}

fn built_manager() -> XrefManager<DirMapSource> {
    let db = Database::load(&data_dir()).expect("load fixture database");
    let mut manager = XrefManager::new(db, DirMapSource::new(data_dir()));
    manager.ensure_built(&mut SilentUi::new()).expect("build index");
    manager
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_skill_text_and_formula_references() {
    let manager = built_manager();

    let refs = manager.references(EntityType::Variable, 4);
    assert_eq!(refs.len(), 2);
    assert!(refs
        .iter()
        .all(|r| r.source.source_type == EntityType::Skill && r.source.source_id == 2));
    assert_eq!(refs[0].kind, RefKind::Label("description"));
    assert_eq!(refs[1].kind, RefKind::Label("damage"));
    assert!(refs.iter().all(|r| r.source.event.is_none()));
}

#[test]
fn test_dual_wield_slot_recorded_as_weapon_and_armor() {
    let manager = built_manager();

    let weapon = manager.references(EntityType::Weapon, 7);
    let armor = manager.references(EntityType::Armor, 7);
    assert_eq!(weapon.len(), 1);
    assert_eq!(armor.len(), 1);
    assert_eq!(weapon[0].source.source_type, EntityType::Actor);
    assert_eq!(weapon[0].sequence, 1);
    assert_eq!(armor[0].sequence, 1);

    // slot 0 is always a weapon
    assert_eq!(manager.references(EntityType::Weapon, 1).len(), 1);
    assert!(manager.references(EntityType::Armor, 1).is_empty());
}

#[test]
fn test_map_event_commands_carry_context() {
    let manager = built_manager();

    for id in 5..=8 {
        let refs = manager.references(EntityType::Variable, id);
        assert_eq!(refs.len(), 1, "variable {id}");
        assert_eq!(refs[0].kind, RefKind::Command(122));
    }

    let branch = manager.references(EntityType::Variable, 3);
    assert_eq!(branch.len(), 1);
    assert_eq!(branch[0].kind, RefKind::Command(111));
    assert_eq!(manager.references(EntityType::Variable, 9).len(), 1);

    let event = branch[0].source.event.as_ref().unwrap();
    assert_eq!(event.event_id, Some(5));
    assert_eq!(event.event_name.as_deref(), Some("Door"));
    assert_eq!((event.page, event.line), (1, 2));

    assert_eq!(
        manager.describe(&branch[0]),
        "Map 1: Town     EV005: Door     1:2     Conditional Branch"
    );
    // operand type 0 is a constant, not a variable id
    assert!(manager.references(EntityType::Variable, 10).is_empty());
}

#[test]
fn test_referenced_types_and_ids() {
    let manager = built_manager();

    let types = manager.referenced_types();
    assert_eq!(
        types,
        vec![
            EntityType::Variable,
            EntityType::Class,
            EntityType::Skill,
            EntityType::Weapon,
            EntityType::Armor,
        ]
    );
    assert!(manager.referenced_ids(EntityType::Variable).contains(&4));
    assert!(manager.referenced_ids(EntityType::Switch).is_empty());
    assert!(manager.references(EntityType::Item, 1).is_empty());
    assert_eq!(manager.entry_label(EntityType::Variable, 4), "0004: Bonus");
}

#[test]
fn test_ensure_built_twice_keeps_index() {
    let mut manager = built_manager();
    let before = manager.index().clone();

    manager.ensure_built(&mut SilentUi::new()).unwrap();
    assert_eq!(manager.index(), &before);

    manager.rebuild(&mut SilentUi::new()).unwrap();
    assert_eq!(manager.index(), &before);
}

#[test]
fn test_malformed_map_fails_build() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    write_project(&data);
    fs::write(data.join("Map001.json"), "{ \"events\": [").unwrap();

    let db = Database::load(&data).unwrap();
    let mut manager = XrefManager::new(db, DirMapSource::new(&data));
    let err = manager.ensure_built(&mut SilentUi::new()).unwrap_err();

    assert!(err.to_string().contains("001"));
    assert!(!manager.is_loaded());
    assert!(manager.referenced_types().is_empty());
}

#[test]
fn test_missing_table_fails_load() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    write_project(&data);
    fs::remove_file(data.join("Skills.json")).unwrap();

    let err = Database::load(&data).unwrap_err();
    assert!(err.to_string().contains("Skills.json"));
}

// =============================================================================
// SQLite export
// =============================================================================

#[test]
fn test_export_round_trip() {
    let manager = built_manager();
    let out = TempDir::new().unwrap();
    let db_path = out.path().join("refs.db");

    let total = export_references(
        &manager,
        &db_path,
        &[EntityType::Variable, EntityType::Weapon],
        &mut SilentUi::new(),
    )
    .unwrap();

    let conn = Connection::open(&db_path).unwrap();
    let rows: u64 = conn
        .query_row("SELECT COUNT(*) FROM refs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, total);
    assert_eq!(
        total as usize,
        manager.index().len()
            - manager.references(EntityType::Class, 1).len()
            - manager.references(EntityType::Skill, 2).len()
            - manager.references(EntityType::Armor, 7).len()
    );

    let (source, kind_label, event_name, line): (String, String, Option<String>, Option<u32>) = conn
        .query_row(
            "SELECT source_type, kind_label, event_name, line FROM refs
             WHERE target_type = 'variable' AND target_id = 3",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(source, "map");
    assert_eq!(kind_label, "Conditional Branch");
    assert_eq!(event_name.as_deref(), Some("Door"));
    assert_eq!(line, Some(2));

    let target_name: String = conn
        .query_row(
            "SELECT target_name FROM refs WHERE target_type = 'weapon' AND target_id = 7",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(target_name, "Dagger");
}
