use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::*;
use crate::error::{Result, XrefError};
use crate::xref::EntityType;

/// All database tables of one project, already parsed
#[derive(Debug, Clone, Default)]
pub struct Database {
    pub system: System,
    pub actors: Table<Actor>,
    pub classes: Table<Class>,
    pub skills: Table<Skill>,
    pub items: Table<Item>,
    pub weapons: Table<Weapon>,
    pub armors: Table<Armor>,
    pub enemies: Table<Enemy>,
    pub troops: Table<Troop>,
    pub states: Table<State>,
    pub animations: Table<Animation>,
    pub common_events: Table<CommonEvent>,
    pub map_infos: Table<MapInfo>,
}

impl Database {
    /// Load every table file from a project's `data` directory
    pub fn load(data_dir: &Path) -> Result<Self> {
        debug!(dir = %data_dir.display(), "loading database");

        Ok(Self {
            system: read_json(&data_dir.join("System.json"))?,
            actors: read_json(&data_dir.join("Actors.json"))?,
            classes: read_json(&data_dir.join("Classes.json"))?,
            skills: read_json(&data_dir.join("Skills.json"))?,
            items: read_json(&data_dir.join("Items.json"))?,
            weapons: read_json(&data_dir.join("Weapons.json"))?,
            armors: read_json(&data_dir.join("Armors.json"))?,
            enemies: read_json(&data_dir.join("Enemies.json"))?,
            troops: read_json(&data_dir.join("Troops.json"))?,
            states: read_json(&data_dir.join("States.json"))?,
            animations: read_json(&data_dir.join("Animations.json"))?,
            common_events: read_json(&data_dir.join("CommonEvents.json"))?,
            map_infos: read_json(&data_dir.join("MapInfos.json"))?,
        })
    }

    /// Number of slots in the table for `kind`, sentinel included
    pub fn table_len(&self, kind: EntityType) -> usize {
        match kind {
            EntityType::Switch => self.system.switches.len(),
            EntityType::Variable => self.system.variables.len(),
            EntityType::Actor => self.actors.len(),
            EntityType::Class => self.classes.len(),
            EntityType::Skill => self.skills.len(),
            EntityType::Item => self.items.len(),
            EntityType::Weapon => self.weapons.len(),
            EntityType::Armor => self.armors.len(),
            EntityType::Enemy => self.enemies.len(),
            EntityType::Troop => self.troops.len(),
            EntityType::State => self.states.len(),
            EntityType::Animation => self.animations.len(),
            EntityType::CommonEvent => self.common_events.len(),
            EntityType::Map => self.map_infos.len(),
        }
    }

    /// Name of the entity in slot `id`, `None` when the slot is empty or out of range
    pub fn name(&self, kind: EntityType, id: u32) -> Option<&str> {
        let i = id as usize;
        match kind {
            EntityType::Switch => slot(&self.system.switches, i).map(String::as_str),
            EntityType::Variable => slot(&self.system.variables, i).map(String::as_str),
            EntityType::Actor => slot(&self.actors, i).map(|r| r.name.as_str()),
            EntityType::Class => slot(&self.classes, i).map(|r| r.name.as_str()),
            EntityType::Skill => slot(&self.skills, i).map(|r| r.name.as_str()),
            EntityType::Item => slot(&self.items, i).map(|r| r.name.as_str()),
            EntityType::Weapon => slot(&self.weapons, i).map(|r| r.name.as_str()),
            EntityType::Armor => slot(&self.armors, i).map(|r| r.name.as_str()),
            EntityType::Enemy => slot(&self.enemies, i).map(|r| r.name.as_str()),
            EntityType::Troop => slot(&self.troops, i).map(|r| r.name.as_str()),
            EntityType::State => slot(&self.states, i).map(|r| r.name.as_str()),
            EntityType::Animation => slot(&self.animations, i).map(|r| r.name.as_str()),
            EntityType::CommonEvent => slot(&self.common_events, i).map(|r| r.name.as_str()),
            EntityType::Map => slot(&self.map_infos, i).map(|r| r.name.as_str()),
        }
    }
}

fn slot<T>(table: &[Option<T>], index: usize) -> Option<&T> {
    table.get(index).and_then(Option::as_ref)
}

/// Read and deserialize one JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| XrefError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|source| XrefError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Side-load of per-map data, keyed by map id
pub trait MapSource {
    fn load_map(&self, map_id: u32) -> Result<Map>;
}

/// Reads `MapNNN.json` files from a project's `data` directory
pub struct DirMapSource {
    data_dir: PathBuf,
}

impl DirMapSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the file holding map `map_id`
    pub fn map_path(&self, map_id: u32) -> PathBuf {
        self.data_dir.join(map_file_name(map_id))
    }
}

impl MapSource for DirMapSource {
    fn load_map(&self, map_id: u32) -> Result<Map> {
        read_json(&self.map_path(map_id)).map_err(|e| XrefError::map_load(map_id, e))
    }
}

impl MapSource for HashMap<u32, Map> {
    fn load_map(&self, map_id: u32) -> Result<Map> {
        self.get(&map_id)
            .cloned()
            .ok_or_else(|| XrefError::map_load(map_id, XrefError::MapNotFound(map_id)))
    }
}

/// `Map007.json` for map 7
pub fn map_file_name(map_id: u32) -> String {
    format!("Map{:03}.json", map_id)
}
