//! Event command dispatch table.
//!
//! Each entry knows which positional parameters of its command are entity
//! ids, and under which guard values. Opcodes without an entry produce no
//! references. Parameter positions are 0-based.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::trace;

use super::recorder::Recorder;
use super::types::{EntityType, RefKind};

use EntityType::*;

/// Interprets one command's parameters
pub type Handler = fn(&mut Recorder, &[Value]);

/// Dispatch table entry
pub struct CommandSpec {
    pub code: u16,
    pub name: &'static str,
    pub handler: Handler,
}

/// Maps a selector parameter value to the entity type it picks
pub type Selector = &'static [(i64, EntityType)];

pub const ITEM_KINDS: Selector = &[(0, Item), (1, Weapon), (2, Armor)];
/// Enemy drop kinds; 0 means no drop
pub const DROP_KINDS: Selector = &[(1, Item), (2, Weapon), (3, Armor)];
pub const ACTOR_OR_VARIABLE: Selector = &[(0, Actor), (1, Variable)];
pub const ACTOR_CONDITIONS: Selector =
    &[(2, Class), (3, Skill), (4, Weapon), (5, Armor), (6, State)];
pub const GAME_DATA: Selector = &[(0, Item), (1, Weapon), (2, Armor), (3, Actor)];

pub fn select(selector: Selector, value: i64) -> Option<EntityType> {
    selector
        .iter()
        .find(|(key, _)| *key == value)
        .map(|(_, kind)| *kind)
}

/// Move-route commands that turn a switch on or off
const ROUTE_SWITCH_ON: i64 = 27;
const ROUTE_SWITCH_OFF: i64 = 28;

pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec { code: 401, name: "Show Text", handler: scan_first_text },
    CommandSpec { code: 102, name: "Show Choices", handler: show_choices },
    CommandSpec { code: 103, name: "Input Number", handler: first_variable },
    CommandSpec { code: 104, name: "Select Item", handler: first_variable },
    CommandSpec { code: 405, name: "Show Scrolling Text", handler: scan_first_text },
    CommandSpec { code: 111, name: "Conditional Branch", handler: conditional_branch },
    CommandSpec { code: 117, name: "Common Event", handler: common_event },
    CommandSpec { code: 121, name: "Control Switches", handler: control_switches },
    CommandSpec { code: 122, name: "Control Variables", handler: control_variables },
    CommandSpec { code: 125, name: "Change Gold", handler: change_gold },
    CommandSpec { code: 126, name: "Change Items", handler: change_items },
    CommandSpec { code: 127, name: "Change Weapons", handler: change_weapons },
    CommandSpec { code: 128, name: "Change Armors", handler: change_armors },
    CommandSpec { code: 129, name: "Change Party Member", handler: first_actor },
    CommandSpec { code: 201, name: "Transfer Player", handler: transfer_player },
    CommandSpec { code: 202, name: "Set Vehicle Location", handler: set_vehicle_location },
    CommandSpec { code: 203, name: "Set Event Location", handler: set_event_location },
    CommandSpec { code: 505, name: "Set Movement Route", handler: movement_route },
    CommandSpec { code: 212, name: "Show Animation", handler: second_animation },
    CommandSpec { code: 231, name: "Show Picture", handler: picture_position },
    CommandSpec { code: 232, name: "Move Picture", handler: picture_position },
    CommandSpec { code: 285, name: "Get Location Info", handler: get_location_info },
    CommandSpec { code: 301, name: "Battle Processing", handler: battle_processing },
    CommandSpec { code: 302, name: "Shop Processing", handler: shop_goods },
    CommandSpec { code: 605, name: "Shop Processing", handler: shop_goods },
    CommandSpec { code: 303, name: "Name Input Processing", handler: first_actor },
    CommandSpec { code: 311, name: "Change HP", handler: actor_value_operand },
    CommandSpec { code: 312, name: "Change MP", handler: actor_value_operand },
    CommandSpec { code: 326, name: "Change TP", handler: actor_value_operand },
    CommandSpec { code: 313, name: "Change State", handler: change_state },
    CommandSpec { code: 314, name: "Recover All", handler: actor_target },
    CommandSpec { code: 315, name: "Change EXP", handler: actor_value_operand },
    CommandSpec { code: 316, name: "Change Level", handler: actor_value_operand },
    CommandSpec { code: 317, name: "Change Parameter", handler: change_parameter },
    CommandSpec { code: 318, name: "Change Skill", handler: change_skill },
    CommandSpec { code: 319, name: "Change Equipment", handler: change_equipment },
    CommandSpec { code: 320, name: "Change Name", handler: change_name },
    CommandSpec { code: 321, name: "Change Class", handler: change_class },
    CommandSpec { code: 322, name: "Change Actor Images", handler: first_actor },
    CommandSpec { code: 324, name: "Change Nickname", handler: change_nickname },
    CommandSpec { code: 325, name: "Change Profile", handler: change_profile },
    CommandSpec { code: 331, name: "Change Enemy HP", handler: enemy_value_operand },
    CommandSpec { code: 332, name: "Change Enemy MP", handler: enemy_value_operand },
    CommandSpec { code: 342, name: "Change Enemy TP", handler: enemy_value_operand },
    CommandSpec { code: 333, name: "Change Enemy State", handler: change_enemy_state },
    CommandSpec { code: 336, name: "Enemy Transform", handler: enemy_transform },
    CommandSpec { code: 337, name: "Show Battle Animation", handler: second_animation },
    CommandSpec { code: 339, name: "Force Action", handler: force_action },
];

static BY_CODE: Lazy<HashMap<u16, &'static CommandSpec>> =
    Lazy::new(|| COMMANDS.iter().map(|spec| (spec.code, spec)).collect());

/// Get the dispatch entry for an opcode
pub fn get_command(code: u16) -> Option<&'static CommandSpec> {
    BY_CODE.get(&code).copied()
}

/// Human label for an opcode; unknown opcodes render as their number
pub fn command_name(code: u16) -> Cow<'static, str> {
    match get_command(code) {
        Some(spec) => Cow::Borrowed(spec.name),
        None => Cow::Owned(code.to_string()),
    }
}

/// Run the handler for `code`, if there is one
pub fn dispatch(rec: &mut Recorder, code: u16, params: &[Value]) {
    match get_command(code) {
        Some(spec) => (spec.handler)(rec, params),
        None => trace!(code, "no handler for opcode"),
    }
}

// =============================================================================
// Parameter access
// =============================================================================

fn int(params: &[Value], index: usize) -> i64 {
    params.get(index).and_then(as_int).unwrap_or(0)
}

fn as_int(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

fn text(params: &[Value], index: usize) -> &str {
    params.get(index).and_then(Value::as_str).unwrap_or("")
}

fn save_selected(rec: &mut Recorder, selector: Selector, selector_value: i64, id: i64) {
    if let Some(kind) = select(selector, selector_value) {
        rec.save(kind, id);
    }
}

/// Variable at `var_index` when the operand flag at `flag_index` is non-zero
fn variable_operand(rec: &mut Recorder, p: &[Value], flag_index: usize, var_index: usize) {
    if int(p, flag_index) != 0 {
        rec.save(Variable, int(p, var_index));
    }
}

// =============================================================================
// Message
// =============================================================================

fn scan_first_text(rec: &mut Recorder, p: &[Value]) {
    rec.scan_text(text(p, 0), None);
}

fn show_choices(rec: &mut Recorder, p: &[Value]) {
    let Some(choices) = p.first().and_then(Value::as_array) else {
        return;
    };
    for choice in choices {
        if let Some(choice) = choice.as_str() {
            rec.scan_text(choice, None);
        }
    }
}

fn first_variable(rec: &mut Recorder, p: &[Value]) {
    rec.save(Variable, int(p, 0));
}

// =============================================================================
// Flow control and game progression
// =============================================================================

fn conditional_branch(rec: &mut Recorder, p: &[Value]) {
    match int(p, 0) {
        0 => rec.save(Switch, int(p, 1)),
        1 => {
            rec.save(Variable, int(p, 1));
            variable_operand(rec, p, 2, 3);
        }
        4 => {
            rec.save(Actor, int(p, 1));
            match int(p, 2) {
                // compare actor name
                1 => rec.scan_text(text(p, 3), None),
                other => save_selected(rec, ACTOR_CONDITIONS, other, int(p, 3)),
            }
        }
        5 => {
            // enemy is affected by state
            if int(p, 2) == 1 {
                rec.save(State, int(p, 3));
            }
        }
        8 => rec.save(Item, int(p, 1)),
        9 => rec.save(Weapon, int(p, 1)),
        10 => rec.save(Armor, int(p, 1)),
        _ => {}
    }
}

/// Only parameter 0 names an entity; the command has no other operands.
fn common_event(rec: &mut Recorder, p: &[Value]) {
    rec.save(CommonEvent, int(p, 0));
}

fn control_switches(rec: &mut Recorder, p: &[Value]) {
    for id in int(p, 0)..=int(p, 1) {
        rec.save(Switch, id);
    }
}

fn control_variables(rec: &mut Recorder, p: &[Value]) {
    match int(p, 3) {
        1 => rec.save(Variable, int(p, 4)),
        3 => save_selected(rec, GAME_DATA, int(p, 4), int(p, 5)),
        _ => {}
    }
    for id in int(p, 0)..=int(p, 1) {
        rec.save(Variable, id);
    }
}

// =============================================================================
// Party
// =============================================================================

fn change_gold(rec: &mut Recorder, p: &[Value]) {
    variable_operand(rec, p, 1, 2);
}

fn change_items(rec: &mut Recorder, p: &[Value]) {
    rec.save(Item, int(p, 0));
    variable_operand(rec, p, 2, 3);
}

fn change_weapons(rec: &mut Recorder, p: &[Value]) {
    rec.save(Weapon, int(p, 0));
    variable_operand(rec, p, 2, 3);
}

fn change_armors(rec: &mut Recorder, p: &[Value]) {
    rec.save(Armor, int(p, 0));
    variable_operand(rec, p, 2, 3);
}

fn first_actor(rec: &mut Recorder, p: &[Value]) {
    rec.save(Actor, int(p, 0));
}

// =============================================================================
// Movement and pictures
// =============================================================================

fn transfer_player(rec: &mut Recorder, p: &[Value]) {
    if int(p, 0) != 0 {
        rec.save(Variable, int(p, 1));
        rec.save(Variable, int(p, 2));
        rec.save(Variable, int(p, 3));
    }
}

fn set_vehicle_location(rec: &mut Recorder, p: &[Value]) {
    if int(p, 1) != 0 {
        rec.save(Variable, int(p, 2));
        rec.save(Variable, int(p, 3));
        rec.save(Variable, int(p, 4));
    }
}

fn set_event_location(rec: &mut Recorder, p: &[Value]) {
    if int(p, 1) == 1 {
        rec.save(Variable, int(p, 2));
        rec.save(Variable, int(p, 3));
    }
}

/// Route lines carry one move command as `{code, parameters}`
fn movement_route(rec: &mut Recorder, p: &[Value]) {
    let Some(step) = p.first() else {
        return;
    };
    let code = step.get("code").and_then(as_int).unwrap_or(0);
    if code == ROUTE_SWITCH_ON || code == ROUTE_SWITCH_OFF {
        let switch_id = step
            .get("parameters")
            .and_then(Value::as_array)
            .map(|params| int(params, 0))
            .unwrap_or(0);
        rec.save(Switch, switch_id);
    }
}

fn second_animation(rec: &mut Recorder, p: &[Value]) {
    rec.save(Animation, int(p, 1));
}

fn picture_position(rec: &mut Recorder, p: &[Value]) {
    if int(p, 3) != 0 {
        rec.save(Variable, int(p, 4));
        rec.save(Variable, int(p, 5));
    }
}

fn get_location_info(rec: &mut Recorder, p: &[Value]) {
    rec.save(Variable, int(p, 0));
    if int(p, 2) != 0 {
        rec.save(Variable, int(p, 3));
        rec.save(Variable, int(p, 4));
    }
}

// =============================================================================
// Scene control
// =============================================================================

fn battle_processing(rec: &mut Recorder, p: &[Value]) {
    match int(p, 0) {
        0 => rec.save(Troop, int(p, 1)),
        1 => rec.save(Variable, int(p, 1)),
        _ => {}
    }
}

fn shop_goods(rec: &mut Recorder, p: &[Value]) {
    save_selected(rec, ITEM_KINDS, int(p, 0), int(p, 1));
}

// =============================================================================
// Actor
// =============================================================================

/// Fixed actor or actor-id-in-variable, selected by parameter 0
fn actor_target(rec: &mut Recorder, p: &[Value]) {
    save_selected(rec, ACTOR_OR_VARIABLE, int(p, 0), int(p, 1));
}

fn actor_value_operand(rec: &mut Recorder, p: &[Value]) {
    actor_target(rec, p);
    variable_operand(rec, p, 3, 4);
}

fn change_state(rec: &mut Recorder, p: &[Value]) {
    actor_target(rec, p);
    rec.save(State, int(p, 3));
}

fn change_parameter(rec: &mut Recorder, p: &[Value]) {
    actor_target(rec, p);
    variable_operand(rec, p, 4, 5);
}

fn change_skill(rec: &mut Recorder, p: &[Value]) {
    rec.save(Skill, int(p, 3));
    actor_target(rec, p);
}

/// Equip type 2 holds a shield or, with dual wield, a second weapon. Dual
/// wield can be gained or lost at runtime, so that slot is recorded as both.
fn change_equipment(rec: &mut Recorder, p: &[Value]) {
    rec.save(Actor, int(p, 0));
    let equip_type = int(p, 1);
    if equip_type < 3 {
        rec.save(Weapon, int(p, 2));
    }
    if equip_type > 1 {
        rec.save(Armor, int(p, 2));
    }
}

fn change_name(rec: &mut Recorder, p: &[Value]) {
    rec.save(Actor, int(p, 0));
    rec.scan_text(text(p, 1), Some(RefKind::Label("name")));
}

fn change_class(rec: &mut Recorder, p: &[Value]) {
    rec.save(Actor, int(p, 0));
    rec.save(Class, int(p, 1));
}

fn change_nickname(rec: &mut Recorder, p: &[Value]) {
    rec.save(Actor, int(p, 0));
    rec.scan_text(text(p, 1), Some(RefKind::Label("nickname")));
}

fn change_profile(rec: &mut Recorder, p: &[Value]) {
    rec.save(Actor, int(p, 0));
    rec.scan_text(text(p, 1), Some(RefKind::Label("profile")));
}

// =============================================================================
// Battle
// =============================================================================

fn enemy_value_operand(rec: &mut Recorder, p: &[Value]) {
    variable_operand(rec, p, 2, 3);
}

fn change_enemy_state(rec: &mut Recorder, p: &[Value]) {
    rec.save(State, int(p, 2));
}

fn enemy_transform(rec: &mut Recorder, p: &[Value]) {
    rec.save(Enemy, int(p, 1));
}

fn force_action(rec: &mut Recorder, p: &[Value]) {
    rec.save(Skill, int(p, 2));
    // subject 0 is an enemy, otherwise an actor
    if int(p, 0) != 0 {
        rec.save(Actor, int(p, 1));
    }
}
