//! Per-table walkers.
//!
//! Each walker makes its row the current source, scans the row's display
//! text, records its structural relations and descends into any event
//! commands it owns.

use super::opcodes::{select, DROP_KINDS};
use super::recorder::Recorder;
use super::types::{EntityType, EventContext, RefKind};
use super::walker::walk_commands;
use crate::data::*;

const TRAIT_STATE_RATE: i64 = 13;
const TRAIT_STATE_RESIST: i64 = 14;
const TRAIT_ATTACK_STATE: i64 = 32;
const TRAIT_SKILL_ADD: i64 = 43;
const TRAIT_SKILL_SEAL: i64 = 44;
const TRAIT_SLOT_TYPE: i64 = 55;
/// `dataId` of the slot-type trait that turns slot 1 into a weapon slot
const SLOT_TYPE_DUAL_WIELD: i64 = 1;

const EFFECT_ADD_STATE: i64 = 21;
const EFFECT_REMOVE_STATE: i64 = 22;
const EFFECT_LEARN_SKILL: i64 = 43;
const EFFECT_COMMON_EVENT: i64 = 44;

const ACTION_CONDITION_STATE: i64 = 4;
const ACTION_CONDITION_SWITCH: i64 = 6;

const NAME: RefKind = RefKind::Label("name");
const DESCRIPTION: RefKind = RefKind::Label("description");
const CONDITIONS: RefKind = RefKind::Label("conditions");

pub fn scan_traits(rec: &mut Recorder, traits: &[Trait]) {
    for (index, t) in traits.iter().enumerate() {
        let target = match t.code {
            TRAIT_STATE_RATE | TRAIT_STATE_RESIST | TRAIT_ATTACK_STATE => EntityType::State,
            TRAIT_SKILL_ADD | TRAIT_SKILL_SEAL => EntityType::Skill,
            _ => continue,
        };
        rec.save_as(target, t.data_id, RefKind::Label("trait"), index as u32);
    }
}

pub fn scan_effects(rec: &mut Recorder, effects: &[Effect]) {
    for (index, effect) in effects.iter().enumerate() {
        let target = match effect.code {
            EFFECT_ADD_STATE | EFFECT_REMOVE_STATE => EntityType::State,
            EFFECT_LEARN_SKILL => EntityType::Skill,
            EFFECT_COMMON_EVENT => EntityType::CommonEvent,
            _ => continue,
        };
        rec.save_as(target, effect.data_id, RefKind::Label("effect"), index as u32);
    }
}

fn is_dual_wield(t: &Trait) -> bool {
    t.code == TRAIT_SLOT_TYPE && t.data_id == SLOT_TYPE_DUAL_WIELD
}

fn animation(rec: &mut Recorder, animation_id: i64) {
    if animation_id != 0 {
        rec.save_as(EntityType::Animation, animation_id, RefKind::Label("animation"), 0);
    }
}

/// Actor row. `classes` resolves the class half of the dual-wield check.
pub fn walk_actor(rec: &mut Recorder, actor: &Actor, classes: &Table<Class>) {
    rec.set_source(EntityType::Actor, actor.id);

    rec.scan_text(&actor.name, Some(NAME));
    rec.scan_text(&actor.nickname, Some(RefKind::Label("nickname")));
    rec.scan_text(&actor.profile, Some(RefKind::Label("profile")));

    rec.save_as(EntityType::Class, actor.class_id, RefKind::Label("class"), 0);

    let class_traits = usize::try_from(actor.class_id)
        .ok()
        .and_then(|i| classes.get(i))
        .and_then(Option::as_ref)
        .map(|class| class.traits.as_slice())
        .unwrap_or(&[]);
    let dual_wield = actor.traits.iter().chain(class_traits).any(is_dual_wield);

    let equip = RefKind::Label("equip");
    for (slot, &item_id) in actor.equips.iter().enumerate() {
        if item_id == 0 {
            continue;
        }
        let seq = slot as u32;
        match slot {
            0 => rec.save_as(EntityType::Weapon, item_id, equip, seq),
            // A dual-wield actor holds a weapon here today, but a class change
            // can take the trait away, so the id is reported as both.
            1 if dual_wield => {
                rec.save_as(EntityType::Weapon, item_id, equip, seq);
                rec.save_as(EntityType::Armor, item_id, equip, seq);
            }
            _ => rec.save_as(EntityType::Armor, item_id, equip, seq),
        }
    }

    scan_traits(rec, &actor.traits);
}

pub fn walk_class(rec: &mut Recorder, class: &Class) {
    rec.set_source(EntityType::Class, class.id);

    rec.scan_text(&class.name, Some(NAME));

    for (index, learning) in class.learnings.iter().enumerate() {
        if learning.skill_id != 0 {
            rec.save_as(
                EntityType::Skill,
                learning.skill_id,
                RefKind::Label("learnings"),
                index as u32,
            );
        }
    }

    scan_traits(rec, &class.traits);
}

pub fn walk_skill(rec: &mut Recorder, skill: &Skill) {
    rec.set_source(EntityType::Skill, skill.id);

    rec.scan_text(&skill.name, Some(NAME));
    rec.scan_text(&skill.description, Some(DESCRIPTION));
    rec.scan_text(&skill.message1, Some(RefKind::Label("message1")));
    rec.scan_text(&skill.message2, Some(RefKind::Label("message2")));
    rec.scan_formula(&skill.damage.formula, RefKind::Label("damage"));

    animation(rec, skill.animation_id);
    scan_effects(rec, &skill.effects);
}

pub fn walk_item(rec: &mut Recorder, item: &Item) {
    rec.set_source(EntityType::Item, item.id);

    rec.scan_text(&item.name, Some(NAME));
    rec.scan_text(&item.description, Some(DESCRIPTION));
    rec.scan_formula(&item.damage.formula, RefKind::Label("damage"));

    animation(rec, item.animation_id);
    scan_effects(rec, &item.effects);
}

pub fn walk_weapon(rec: &mut Recorder, weapon: &Weapon) {
    rec.set_source(EntityType::Weapon, weapon.id);

    rec.scan_text(&weapon.name, Some(NAME));
    rec.scan_text(&weapon.description, Some(DESCRIPTION));

    animation(rec, weapon.animation_id);
    scan_traits(rec, &weapon.traits);
}

pub fn walk_armor(rec: &mut Recorder, armor: &Armor) {
    rec.set_source(EntityType::Armor, armor.id);

    rec.scan_text(&armor.name, Some(NAME));
    rec.scan_text(&armor.description, Some(DESCRIPTION));

    scan_traits(rec, &armor.traits);
}

pub fn walk_enemy(rec: &mut Recorder, enemy: &Enemy) {
    rec.set_source(EntityType::Enemy, enemy.id);

    rec.scan_text(&enemy.name, Some(NAME));

    for (index, drop) in enemy.drop_items.iter().enumerate() {
        if let Some(kind) = select(DROP_KINDS, drop.kind) {
            rec.save_as(kind, drop.data_id, RefKind::Label("dropItem"), index as u32);
        }
    }

    let pattern = RefKind::Label("actionPattern");
    for (index, action) in enemy.actions.iter().enumerate() {
        let seq = index as u32;
        rec.save_as(EntityType::Skill, action.skill_id, pattern, seq);
        let param = action.condition_param1 as i64;
        match action.condition_type {
            ACTION_CONDITION_STATE => rec.save_as(EntityType::State, param, pattern, seq),
            ACTION_CONDITION_SWITCH => rec.save_as(EntityType::Switch, param, pattern, seq),
            _ => {}
        }
    }

    scan_traits(rec, &enemy.traits);
}

pub fn walk_troop(rec: &mut Recorder, troop: &Troop) {
    rec.set_source(EntityType::Troop, troop.id);

    rec.scan_text(&troop.name, Some(NAME));

    for (index, member) in troop.members.iter().enumerate() {
        rec.save_as(EntityType::Enemy, member.enemy_id, RefKind::Label("members"), index as u32);
    }

    for (index, page) in troop.pages.iter().enumerate() {
        let page_no = index as u32 + 1;
        let context = EventContext {
            page: page_no,
            ..Default::default()
        };
        rec.in_event(context, |rec| {
            let cond = &page.conditions;
            if cond.actor_valid {
                rec.save_as(EntityType::Actor, cond.actor_id, CONDITIONS, page_no);
            }
            if cond.switch_valid {
                rec.save_as(EntityType::Switch, cond.switch_id, CONDITIONS, page_no);
            }
            walk_commands(rec, &page.list);
        });
    }
}

pub fn walk_state(rec: &mut Recorder, state: &State) {
    rec.set_source(EntityType::State, state.id);

    rec.scan_text(&state.name, Some(NAME));
    rec.scan_text(&state.message1, Some(RefKind::Label("message1")));
    rec.scan_text(&state.message2, Some(RefKind::Label("message2")));
    rec.scan_text(&state.message3, Some(RefKind::Label("message3")));
    rec.scan_text(&state.message4, Some(RefKind::Label("message4")));

    scan_traits(rec, &state.traits);
}

/// A common event is a single page of commands
pub fn walk_common_event(rec: &mut Recorder, event: &CommonEvent) {
    rec.set_source(EntityType::CommonEvent, event.id);

    let context = EventContext {
        page: 1,
        ..Default::default()
    };
    rec.in_event(context, |rec| {
        if event.trigger != 0 {
            rec.save_as(EntityType::Switch, event.switch_id, CONDITIONS, 0);
        }
        walk_commands(rec, &event.list);
    });
}

/// Map row from `MapInfos.json` together with its side-loaded map file
pub fn walk_map(rec: &mut Recorder, info: &MapInfo, map: &Map) {
    rec.set_source(EntityType::Map, info.id);

    rec.scan_text(&info.name, Some(NAME));
    rec.scan_text(&map.display_name, Some(RefKind::Label("displayName")));

    for (index, encounter) in map.encounter_list.iter().enumerate() {
        rec.save_as(
            EntityType::Troop,
            encounter.troop_id,
            RefKind::Label("encounters"),
            index as u32,
        );
    }

    for event in map.events.iter().flatten() {
        if !event.pages.is_empty() {
            walk_map_event(rec, event);
        }
    }
}

fn walk_map_event(rec: &mut Recorder, event: &MapEvent) {
    let context = EventContext {
        event_id: Some(event.id),
        event_name: Some(event.name.clone()),
        page: 0,
        line: 0,
    };
    rec.in_event(context, |rec| {
        rec.scan_text(&event.name, Some(NAME));

        for (index, page) in event.pages.iter().enumerate() {
            let page_no = index as u32 + 1;
            if let Some(ctx) = rec.event_mut() {
                ctx.page = page_no;
                ctx.line = 0;
            }

            let cond = &page.conditions;
            if cond.actor_valid {
                rec.save_as(EntityType::Actor, cond.actor_id, CONDITIONS, page_no);
            }
            if cond.item_valid {
                rec.save_as(EntityType::Item, cond.item_id, CONDITIONS, page_no);
            }
            if cond.switch1_valid {
                rec.save_as(EntityType::Switch, cond.switch1_id, CONDITIONS, page_no);
            }
            if cond.switch2_valid {
                rec.save_as(EntityType::Switch, cond.switch2_id, CONDITIONS, page_no);
            }
            if cond.variable_valid {
                rec.save_as(EntityType::Variable, cond.variable_id, CONDITIONS, page_no);
            }

            walk_commands(rec, &page.list);
        }
    });
}
