//! Creature behavior state machine
//!
//! A blob is re-evaluated whenever it finishes a move or a pause. It either
//! commits to a special interaction (claiming the decoration up front) or
//! picks a new wander target. Dwell states are left only by their timer.
//!
//! ```text
//! Wandering ──► JumpingTo(i) ──► Dwelling(i) ──► JumpingOff(i) ──► Wandering
//!     ▲  │                                                            │
//!     │  └── collision ──► separate ──┐                               │
//!     └───────────────────────────────┴───────────────────────────────┘
//! ```

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::creature::{Behavior, CreatureId, Easing, Interaction, Motion, MotionPurpose};
use super::decoration::DecorationId;
use super::geometry::{find_safe_position, is_occupied};
use super::schedule::TimerEvent;
use super::state::{GardenEvent, SimulationState};
use crate::consts::*;
use crate::roll_between;

/// Decide what a blob does next
///
/// Interactions are tried in configured order; each needs its own roll to
/// succeed and a free decoration within reach. Otherwise the blob wanders.
pub fn choose_next_action(state: &mut SimulationState, id: CreatureId) {
    let Some(idx) = state.creature_index(id) else {
        return;
    };
    if state.creatures[idx].behavior != Behavior::Wandering {
        return;
    }
    clear_plans(state, idx);

    for i in 0..state.config.interactions.len() {
        let rule = state.config.interactions[i];
        if state.rng().random::<f32>() >= rule.chance {
            continue;
        }
        let from = state.creatures[idx].pos;
        let Some(deco) = state
            .decorations
            .nearest_free(rule.interaction.decoration(), from, INTERACTION_SEARCH_RADIUS)
            .map(|d| d.id)
        else {
            continue;
        };
        if state.decorations.claim(deco, id) {
            start_jump_on(state, idx, deco, rule.interaction);
            return;
        }
    }

    start_wander(state, idx);
}

/// Drop any in-flight move and pending resume
fn clear_plans(state: &mut SimulationState, idx: usize) {
    let creature = &mut state.creatures[idx];
    creature.motion = None;
    if let Some(timer) = creature.resume_timer.take() {
        state.scheduler.cancel(timer);
    }
}

/// Re-evaluate this blob after `delay_ms`, replacing any pending resume
pub(crate) fn schedule_resume(state: &mut SimulationState, idx: usize, delay_ms: u64) {
    let id = state.creatures[idx].id;
    if let Some(timer) = state.creatures[idx].resume_timer.take() {
        state.scheduler.cancel(timer);
    }
    let timer = state.scheduler.after(delay_ms, TimerEvent::Resume(id));
    state.creatures[idx].resume_timer = Some(timer);
}

/// Stroll to a fresh safe spot
pub(crate) fn start_wander(state: &mut SimulationState, idx: usize) {
    let id = state.creatures[idx].id;
    let others = state.other_positions(Some(id));
    let field = state.config.playfield;
    let target = find_safe_position(&field, &others, SAFE_POSITION_ATTEMPTS, state.rng());
    let target = field.clamp_to_bounds(target);

    let creature = &mut state.creatures[idx];
    let distance = creature.pos.distance(target);
    let duration = (distance / creature.speed * WANDER_DURATION_FACTOR).max(WANDER_MIN_DURATION_MS);

    creature.behavior = Behavior::Wandering;
    creature.target = target;
    creature.motion = Some(Motion::new(
        creature.pos,
        target,
        duration as u64,
        Easing::SineInOut,
        MotionPurpose::Wander,
    ));
}

/// First half of the hop onto a claimed decoration
fn start_jump_on(
    state: &mut SimulationState,
    idx: usize,
    deco: DecorationId,
    interaction: Interaction,
) {
    let Some(deco_pos) = state.decorations.get(deco).map(|d| d.pos) else {
        let id = state.creatures[idx].id;
        state.decorations.release(deco, id);
        start_wander(state, idx);
        return;
    };

    let creature = &mut state.creatures[idx];
    let apex = (creature.pos + deco_pos) * 0.5 - Vec2::new(0.0, JUMP_ON_HEIGHT);
    creature.behavior = Behavior::JumpingTo(interaction);
    creature.target = deco_pos + interaction.perch_offset();
    creature.motion = Some(Motion::new(
        creature.pos,
        apex,
        JUMP_ON_PHASE_MS,
        Easing::QuadOut,
        MotionPurpose::JumpUp(deco),
    ));

    log::debug!("{} is {}", creature.name, creature.behavior.as_str());
}

/// Advance the state machine after a motion reaches its end
pub(crate) fn on_motion_complete(state: &mut SimulationState, idx: usize, purpose: MotionPurpose) {
    match purpose {
        MotionPurpose::Wander => {
            let pause = roll_between(state.rng(), WANDER_PAUSE_MS);
            schedule_resume(state, idx, pause);
        }
        MotionPurpose::Separate => schedule_resume(state, idx, SETTLE_DELAY_MS),
        MotionPurpose::JumpUp(deco) => {
            let perch = perch_position(state, idx, deco);
            let creature = &mut state.creatures[idx];
            creature.target = perch;
            creature.motion = Some(Motion::new(
                creature.pos,
                perch,
                JUMP_ON_PHASE_MS,
                Easing::QuadIn,
                MotionPurpose::JumpLand(deco),
            ));
        }
        MotionPurpose::JumpLand(deco) => enter_dwell(state, idx, deco),
        MotionPurpose::LeapOff(landing) => {
            let creature = &mut state.creatures[idx];
            creature.motion = Some(Motion::new(
                creature.pos,
                landing,
                JUMP_OFF_PHASE_MS,
                Easing::QuadIn,
                MotionPurpose::Touchdown,
            ));
        }
        MotionPurpose::Touchdown => {
            state.creatures[idx].behavior = Behavior::Wandering;
            schedule_resume(state, idx, SETTLE_DELAY_MS);
        }
    }
}

fn perch_position(state: &SimulationState, idx: usize, deco: DecorationId) -> Vec2 {
    let creature = &state.creatures[idx];
    let offset = match creature.behavior {
        Behavior::JumpingTo(i) | Behavior::Dwelling(i) => i.perch_offset(),
        _ => Vec2::ZERO,
    };
    state
        .decorations
        .get(deco)
        .map(|d| d.pos + offset)
        .unwrap_or(creature.target)
}

/// Land on the decoration and start the dwell timer
fn enter_dwell(state: &mut SimulationState, idx: usize, deco: DecorationId) {
    let Behavior::JumpingTo(interaction) = state.creatures[idx].behavior else {
        return;
    };
    let id = state.creatures[idx].id;
    let perch = perch_position(state, idx, deco);
    let timer = state.scheduler.after(DWELL_MS, TimerEvent::DwellEnd(id));

    let creature = &mut state.creatures[idx];
    creature.behavior = Behavior::Dwelling(interaction);
    creature.anchor = Some(deco);
    creature.pos = perch;
    creature.target = perch;
    creature.motion = None;
    creature.dwell_timer = Some(timer);

    log::info!("{} started {}", creature.name, creature.behavior.as_str());
    state.emit(GardenEvent::InteractionStarted {
        creature: id,
        decoration: deco,
        interaction,
    });
}

/// Dwell timer expired: release the decoration and hop back down
pub fn end_dwell(state: &mut SimulationState, id: CreatureId) {
    let Some(idx) = state.creature_index(id) else {
        return;
    };
    let Behavior::Dwelling(interaction) = state.creatures[idx].behavior else {
        return;
    };
    let bonus = state
        .config
        .rule_for(interaction)
        .map(|r| r.jump_off_bonus)
        .unwrap_or(0.0);

    if let Some(timer) = state.creatures[idx].dwell_timer.take() {
        state.scheduler.cancel(timer);
    }
    let anchor = state.creatures[idx].anchor.take();
    let pos = state.creatures[idx].pos;
    let deco_pos = anchor
        .and_then(|d| state.decorations.get(d))
        .map(|d| d.pos)
        .unwrap_or(pos);
    if let Some(deco) = anchor {
        state.decorations.release(deco, id);
    }

    let landing = landing_spot(state, id, deco_pos);
    let creature = &mut state.creatures[idx];
    creature.behavior = Behavior::JumpingOff(interaction);
    creature.adjust_happiness(bonus);
    creature.target = landing;
    let apex = (creature.pos + landing) * 0.5 - Vec2::new(0.0, JUMP_OFF_HEIGHT);
    creature.motion = Some(Motion::new(
        creature.pos,
        apex,
        JUMP_OFF_PHASE_MS,
        Easing::QuadOut,
        MotionPurpose::LeapOff(landing),
    ));

    log::debug!("{} is {}", creature.name, creature.behavior.as_str());
    state.emit(GardenEvent::InteractionEnded {
        creature: id,
        interaction,
        happiness_gain: bonus,
    });
}

/// A spot a hop away from the decoration, or any safe spot if that's crowded
fn landing_spot(state: &mut SimulationState, id: CreatureId, deco_pos: Vec2) -> Vec2 {
    let others = state.other_positions(Some(id));
    let field = state.config.playfield;
    let angle = state.rng().random::<f32>() * TAU;
    let preferred = field.clamp_to_bounds(deco_pos + Vec2::from_angle(angle) * LANDING_DISTANCE);
    if !is_occupied(preferred, &others, OCCUPIED_DISTANCE) {
        return preferred;
    }
    find_safe_position(&field, &others, SAFE_POSITION_ATTEMPTS, state.rng())
}

/// First wandering blob (other than `idx`) closer than the collision distance
pub(crate) fn colliding_partner(state: &SimulationState, idx: usize) -> Option<usize> {
    let me = &state.creatures[idx];
    state.creatures.iter().enumerate().position(|(j, other)| {
        j != idx
            && other.behavior == Behavior::Wandering
            && other.pos.distance(me.pos) < COLLISION_DISTANCE
    })
}

/// Push two blobs apart so they stand at least the separation distance apart
///
/// Both in-flight moves are cancelled first; each blob then resumes on its own
/// shortly after its push finishes.
pub(crate) fn separate(state: &mut SimulationState, a: usize, b: usize) {
    clear_plans(state, a);
    clear_plans(state, b);

    let pa = state.creatures[a].pos;
    let pb = state.creatures[b].pos;
    let away = pa - pb;
    let distance = away.length();

    let (new_a, new_b) = if distance <= f32::EPSILON {
        let dir = Vec2::from_angle(state.rng().random::<f32>() * TAU);
        (pa + dir * COINCIDENT_PUSH, pb - dir * COINCIDENT_PUSH)
    } else {
        let dir = away / distance;
        let push = (SEPARATION_DISTANCE - distance) / 2.0;
        (pa + dir * push, pb - dir * push)
    };

    let field = state.config.playfield;
    for (idx, to) in [(a, field.clamp_to_bounds(new_a)), (b, field.clamp_to_bounds(new_b))] {
        let creature = &mut state.creatures[idx];
        let duration =
            (creature.pos.distance(to) * SEPARATE_DURATION_FACTOR).max(SEPARATE_MIN_DURATION_MS);
        creature.target = to;
        creature.motion = Some(Motion::new(
            creature.pos,
            to,
            duration as u64,
            Easing::QuadOut,
            MotionPurpose::Separate,
        ));
    }
}

/// Keep a blob attached to a decoration that was dragged by `delta`
///
/// Dwelling occupants move with it; a blob mid-hop onto it retargets.
pub(crate) fn follow_decoration(state: &mut SimulationState, deco: DecorationId, delta: Vec2) {
    let Some(occupant) = state.decorations.occupant(deco) else {
        return;
    };
    let Some(creature) = state.creature_mut(occupant) else {
        return;
    };

    match creature.behavior {
        Behavior::Dwelling(_) if creature.anchor == Some(deco) => {
            creature.pos += delta;
            creature.target += delta;
        }
        Behavior::JumpingTo(_) => {
            creature.target += delta;
            if let Some(motion) = creature.motion.as_mut() {
                if motion.purpose == MotionPurpose::JumpLand(deco) {
                    motion.to += delta;
                }
            }
        }
        _ => {}
    }
}

/// Every dwelling blob holds its decoration's claim, and nobody else does
pub fn occupancy_consistent(state: &SimulationState) -> bool {
    state.creatures.iter().all(|c| match (c.behavior, c.anchor) {
        (Behavior::Dwelling(_), Some(deco)) => state.decorations.occupant(deco) == Some(c.id),
        (Behavior::Dwelling(_), None) => false,
        (_, Some(_)) => false,
        _ => true,
    })
}
