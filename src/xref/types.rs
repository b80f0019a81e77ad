//! Reference record types shared by the walkers, the index and the queries.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Category of a referenceable database object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    Switch,
    Variable,
    Actor,
    Class,
    Skill,
    Item,
    Weapon,
    Armor,
    Enemy,
    Troop,
    State,
    Animation,
    CommonEvent,
    Map,
}

impl EntityType {
    /// Every entity type, in menu order
    pub const ALL: [EntityType; 14] = [
        EntityType::Switch,
        EntityType::Variable,
        EntityType::Actor,
        EntityType::Class,
        EntityType::Skill,
        EntityType::Item,
        EntityType::Weapon,
        EntityType::Armor,
        EntityType::Enemy,
        EntityType::Troop,
        EntityType::State,
        EntityType::Animation,
        EntityType::CommonEvent,
        EntityType::Map,
    ];

    /// Stable camelCase key, also accepted by `FromStr`
    pub fn key(self) -> &'static str {
        match self {
            EntityType::Switch => "switch",
            EntityType::Variable => "variable",
            EntityType::Actor => "actor",
            EntityType::Class => "class",
            EntityType::Skill => "skill",
            EntityType::Item => "item",
            EntityType::Weapon => "weapon",
            EntityType::Armor => "armor",
            EntityType::Enemy => "enemy",
            EntityType::Troop => "troop",
            EntityType::State => "state",
            EntityType::Animation => "animation",
            EntityType::CommonEvent => "commonEvent",
            EntityType::Map => "map",
        }
    }

    /// Human label for a single entity of this type
    pub fn title(self) -> &'static str {
        match self {
            EntityType::Switch => "Switch",
            EntityType::Variable => "Variable",
            EntityType::Actor => "Actor",
            EntityType::Class => "Class",
            EntityType::Skill => "Skill",
            EntityType::Item => "Item",
            EntityType::Weapon => "Weapon",
            EntityType::Armor => "Armor",
            EntityType::Enemy => "Enemy",
            EntityType::Troop => "Troop",
            EntityType::State => "State",
            EntityType::Animation => "Animation",
            EntityType::CommonEvent => "Common Event",
            EntityType::Map => "Map",
        }
    }

    /// Human label for the whole table
    pub fn plural(self) -> &'static str {
        match self {
            EntityType::Switch => "Switches",
            EntityType::Variable => "Variables",
            EntityType::Actor => "Actors",
            EntityType::Class => "Classes",
            EntityType::Skill => "Skills",
            EntityType::Item => "Items",
            EntityType::Weapon => "Weapons",
            EntityType::Armor => "Armors",
            EntityType::Enemy => "Enemies",
            EntityType::Troop => "Troops",
            EntityType::State => "States",
            EntityType::Animation => "Animations",
            EntityType::CommonEvent => "Common Events",
            EntityType::Map => "Maps",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .iter()
            .copied()
            .find(|t| t.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown entity type: {}", s))
    }
}

/// A referenceable object: `(type, id)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub kind: EntityType,
    pub id: u32,
}

impl EntityRef {
    pub const fn new(kind: EntityType, id: u32) -> Self {
        Self { kind, id }
    }
}

/// Position inside an event-command list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    /// Map event id; troop pages and common events have none
    pub event_id: Option<u32>,
    pub event_name: Option<String>,
    /// 1-based page number, 0 while scanning the event itself
    pub page: u32,
    /// 1-based command line, 0 outside the command list
    pub line: u32,
}

/// Where a usage was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub source_type: EntityType,
    pub source_id: u32,
    pub event: Option<EventContext>,
}

/// Why a reference was recorded: a field label or the event command opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RefKind {
    Label(&'static str),
    Command(u16),
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Label(label) => f.write_str(label),
            RefKind::Command(code) => write!(f, "{}", code),
        }
    }
}

/// One discovered usage of `target` at `source`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRecord {
    pub target: EntityRef,
    pub source: SourceLocation,
    pub kind: RefKind,
    pub sequence: u32,
}
