//! Row shapes for the project's database tables and map files.
//!
//! Only the fields the cross-reference walk reads are modelled; everything
//! else in the JSON is ignored. Every table is 1-based with a `null` at
//! index 0, and deleted rows may also be `null`.

use serde::Deserialize;
use serde_json::Value;

/// A database table: `None` for the sentinel slot and for gaps
pub type Table<T> = Vec<Option<T>>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trait {
    pub code: i64,
    pub data_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Effect {
    pub code: i64,
    pub data_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Damage {
    pub formula: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Actor {
    pub id: u32,
    pub name: String,
    pub nickname: String,
    pub profile: String,
    pub class_id: i64,
    pub equips: Vec<i64>,
    pub traits: Vec<Trait>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Learning {
    pub level: i64,
    pub skill_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Class {
    pub id: u32,
    pub name: String,
    pub learnings: Vec<Learning>,
    pub traits: Vec<Trait>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Skill {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub message1: String,
    pub message2: String,
    pub damage: Damage,
    pub animation_id: i64,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub damage: Damage,
    pub animation_id: i64,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Weapon {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub animation_id: i64,
    pub traits: Vec<Trait>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Armor {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub traits: Vec<Trait>,
}

/// Drop entry; `kind` is 0 (none), 1 item, 2 weapon, 3 armor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropItem {
    pub kind: i64,
    pub data_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnemyAction {
    pub skill_id: i64,
    pub condition_type: i64,
    /// HP/MP ratios are fractional, so this stays a float
    pub condition_param1: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Enemy {
    pub id: u32,
    pub name: String,
    pub drop_items: Vec<DropItem>,
    pub actions: Vec<EnemyAction>,
    pub traits: Vec<Trait>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TroopMember {
    pub enemy_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TroopConditions {
    pub actor_valid: bool,
    pub actor_id: i64,
    pub switch_valid: bool,
    pub switch_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TroopPage {
    pub conditions: TroopConditions,
    pub list: Vec<Option<Command>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Troop {
    pub id: u32,
    pub name: String,
    pub members: Vec<TroopMember>,
    pub pages: Vec<TroopPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct State {
    pub id: u32,
    pub name: String,
    pub message1: String,
    pub message2: String,
    pub message3: String,
    pub message4: String,
    pub traits: Vec<Trait>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Animation {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommonEvent {
    pub id: u32,
    pub name: String,
    /// 0 = none, 1 = autorun, 2 = parallel; both of the latter gate on `switch_id`
    pub trigger: i64,
    pub switch_id: i64,
    pub list: Vec<Option<Command>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MapInfo {
    pub id: u32,
    pub name: String,
}

/// The parts of `System.json` that name switches and variables
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct System {
    pub switches: Vec<Option<String>>,
    pub variables: Vec<Option<String>>,
}

/// One event command: opcode plus opaque positional parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Command {
    pub code: u16,
    pub indent: i64,
    pub parameters: Vec<Value>,
}

impl Command {
    pub fn new(code: u16, parameters: Vec<Value>) -> Self {
        Self {
            code,
            indent: 0,
            parameters,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConditions {
    pub actor_valid: bool,
    pub actor_id: i64,
    pub item_valid: bool,
    pub item_id: i64,
    pub switch1_valid: bool,
    pub switch1_id: i64,
    pub switch2_valid: bool,
    pub switch2_id: i64,
    pub variable_valid: bool,
    pub variable_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventPage {
    pub conditions: PageConditions,
    pub list: Vec<Option<Command>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MapEvent {
    pub id: u32,
    pub name: String,
    pub pages: Vec<EventPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Encounter {
    pub troop_id: i64,
}

/// Per-map extended data from `MapNNN.json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Map {
    pub display_name: String,
    pub encounter_list: Vec<Encounter>,
    pub events: Vec<Option<MapEvent>>,
}
