//! Fixed timestep simulation tick
//!
//! Frame time is accumulated and consumed in fixed steps. Each step fires the
//! timers that came due, moves every blob, then lets hungry blobs eat.

use rand::Rng;

use super::actions::spawn_creature;
use super::behavior::{
    choose_next_action, colliding_partner, end_dwell, on_motion_complete, schedule_resume,
    separate,
};
use super::creature::{Behavior, MotionPurpose, Rarity, passive_coins};
use super::economy::CoinDrop;
use super::schedule::{TimerEvent, TimerId};
use super::state::{GardenEvent, SimulationState};
use crate::consts::*;
use crate::roll_between;

/// Chance per income tick that a very happy legendary blob celebrates
const LEGENDARY_JOY_CHANCE: f32 = 0.3;
const LEGENDARY_JOY_HAPPINESS: f32 = 90.0;

/// Feed a frame's worth of time into the simulation
///
/// Frame deltas are capped so a backgrounded tab doesn't replay minutes of
/// steps in one go. Leftover time carries over to the next call.
pub fn advance(state: &mut SimulationState, frame_ms: u64) {
    state.accumulator_ms += frame_ms.min(MAX_FRAME_MS);
    while state.accumulator_ms >= SIM_STEP_MS {
        step(state);
        state.accumulator_ms -= SIM_STEP_MS;
    }
}

/// Run the simulation for `duration_ms` of logical time, uncapped
pub fn run_for(state: &mut SimulationState, duration_ms: u64) {
    let mut remaining = duration_ms;
    while remaining > 0 {
        let chunk = remaining.min(MAX_FRAME_MS);
        advance(state, chunk);
        remaining -= chunk;
    }
}

/// Advance the simulation by one fixed step
pub fn step(state: &mut SimulationState) {
    let until = state.now_ms() + SIM_STEP_MS;
    state.scheduler.advance_to(until);

    while let Some((timer, event)) = state.scheduler.pop_due() {
        handle_timer(state, timer, event);
    }

    move_creatures(state, SIM_STEP_MS);
    eat_food(state);
    state.normalize_order();
}

fn handle_timer(state: &mut SimulationState, timer: TimerId, event: TimerEvent) {
    match event {
        TimerEvent::HappinessTick => happiness_tick(state),
        TimerEvent::IncomeTick => income_tick(state),
        TimerEvent::Autosave => {
            log::debug!("Autosave due");
            state.save_requested = true;
        }
        TimerEvent::SpawnCreature => {
            spawn_creature(state);
        }
        TimerEvent::CoinDrop => {
            drop_coin(state);
            let delay = roll_between(state.rng(), COIN_DROP_DELAY_MS);
            state.scheduler.after(delay, TimerEvent::CoinDrop);
        }
        TimerEvent::HabitatEvaluation => {
            if state.creatures.len() < HABITAT_MAX_POPULATION
                && state.decorations.len() >= HABITAT_MIN_DECORATIONS
            {
                log::debug!("The garden looks inviting");
                spawn_creature(state);
            }
            let delay = roll_between(state.rng(), HABITAT_EVAL_DELAY_MS);
            state.scheduler.after(delay, TimerEvent::HabitatEvaluation);
        }
        TimerEvent::Resume(id) => {
            let Some(creature) = state.creature_mut(id) else {
                return;
            };
            if creature.resume_timer != Some(timer) {
                return;
            }
            creature.resume_timer = None;
            choose_next_action(state, id);
        }
        TimerEvent::DwellEnd(id) => end_dwell(state, id),
    }
}

/// Decay every blob, then reward the ones near a favourite decoration
pub fn happiness_tick(state: &mut SimulationState) {
    let now = state.epoch_ms();
    for idx in 0..state.creatures.len() {
        state.creatures[idx].decay(now);

        let (kind, gain) = state.creatures[idx].personality.preference();
        let pos = state.creatures[idx].pos;
        let nearby = state
            .decorations
            .within(pos, PREFERENCE_RADIUS)
            .filter(|d| d.kind == kind)
            .count();
        if nearby > 0 {
            state.creatures[idx].adjust_happiness(gain * nearby as f32);
        }

        record_encounter(state, idx);
    }
}

/// Add a blob to the collection (or refresh its max happiness)
fn record_encounter(state: &mut SimulationState, idx: usize) {
    let now = state.epoch_ms();
    if !state.collection.add(&state.creatures[idx], now) {
        return;
    }
    let creature = &state.creatures[idx];
    let key = creature.collection_key();
    let name = creature.name.clone();
    let rarity = creature.rarity();
    log::info!("New blob collected: {} ({})", key, rarity.as_str());
    state.emit(GardenEvent::Collected { key, name, rarity });
    state.save_requested = true;
}

/// Pay out passive income and book it against each blob's record
pub fn income_tick(state: &mut SimulationState) {
    let seconds = INCOME_TICK_MS / 1_000;
    for idx in 0..state.creatures.len() {
        let creature = &state.creatures[idx];
        let id = creature.id;
        let key = creature.collection_key();
        let coins = passive_coins(creature.happiness, creature.rarity());
        let joyful = creature.rarity() == Rarity::Legendary
            && creature.happiness > LEGENDARY_JOY_HAPPINESS;

        if coins > 0 {
            state.ledger.credit(coins);
            state.emit(GardenEvent::CoinsEarned {
                creature: id,
                amount: coins,
            });
            if joyful && state.rng().random::<f32>() < LEGENDARY_JOY_CHANCE {
                state.emit(GardenEvent::LegendaryJoy { creature: id });
            }
        }
        state.collection.record_income(&key, seconds, coins);
    }
    state.save_requested = true;
}

fn drop_coin(state: &mut SimulationState) {
    let field = state.config.playfield;
    let range = state.config.coin_drop_value;
    let pos = field.random_ground_position(state.rng());
    let value = roll_between(state.rng(), range);
    let id = state.next_entity_id();
    state.coin_drops.push(CoinDrop {
        id,
        pos,
        value,
        collected: false,
    });
    log::debug!("Coin worth {} dropped", value);
    state.emit(GardenEvent::CoinDropped { id, pos, value });
}

/// Step every in-flight motion; wandering blobs that bump into each other separate
fn move_creatures(state: &mut SimulationState, dt_ms: u64) {
    for idx in 0..state.creatures.len() {
        let Some(mut motion) = state.creatures[idx].motion else {
            continue;
        };
        let (pos, done) = motion.advance(dt_ms);
        state.creatures[idx].pos = pos;
        state.creatures[idx].motion = Some(motion);

        if motion.purpose == MotionPurpose::Wander {
            if let Some(other) = colliding_partner(state, idx) {
                separate(state, idx, other);
                continue;
            }
        }

        if done {
            state.creatures[idx].motion = None;
            on_motion_complete(state, idx, motion.purpose);
        }
    }
}

/// Any blob within reach of food eats it, except mid-hop
fn eat_food(state: &mut SimulationState) {
    for fi in 0..state.food.len() {
        if state.food[fi].eaten {
            continue;
        }
        let food_pos = state.food[fi].pos;
        let eater = state.creatures.iter().position(|c| {
            matches!(c.behavior, Behavior::Wandering | Behavior::Dwelling(_))
                && c.pos.distance(food_pos) < FOOD_CAPTURE_RADIUS
        });
        if let Some(idx) = eater {
            state.food[fi].eaten = true;
            let food = state.food[fi].id;
            feed_creature(state, idx, food);
        }
    }
    state.food.retain(|f| !f.eaten);
}

fn feed_creature(state: &mut SimulationState, idx: usize, food: u32) {
    let now = state.epoch_ms();
    let bonus = state.config.feed_bonus_coins;

    let creature = &mut state.creatures[idx];
    creature.feed(now);
    let id = creature.id;
    // Dwelling blobs snack in place; their dwell timer still decides when they leave
    let dwelling = creature.behavior.is_dwelling();
    if !dwelling {
        creature.motion = None;
        creature.target = creature.pos;
    }
    log::debug!("{} ate a bug (happiness {:.0})", creature.name, creature.happiness);

    state.ledger.credit(bonus);
    state.emit(GardenEvent::FoodEaten { creature: id, food });
    record_encounter(state, idx);

    if !dwelling {
        let pause = roll_between(state.rng(), MEAL_PAUSE_MS);
        schedule_resume(state, idx, pause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Edition, GardenConfig, InteractionRule};
    use crate::sim::actions::{place_decoration, place_feed, spawn_creature};
    use crate::sim::behavior::occupancy_consistent;
    use crate::sim::creature::{Creature, CreatureId, Easing, Interaction, Motion, Species};
    use crate::sim::decoration::{Decoration, DecorationId, DecorationKind};
    use crate::sim::economy::FoodItem;
    use glam::Vec2;

    fn garden(seed: u64) -> SimulationState {
        SimulationState::new(GardenConfig::from_edition(Edition::Garden), seed, 1_700_000_000_000)
    }

    fn add_blob(state: &mut SimulationState, pos: Vec2) -> CreatureId {
        let id = state.next_entity_id();
        let species = Species::new("Sky Blob", Rarity::Common, 0x87ceeb);
        let now = state.epoch_ms();
        let blob = Creature::spawn(id, species, format!("Blob{}", id), pos, now, state.rng());
        state.creatures.push(blob);
        id
    }

    /// A blob that has hopped onto a rock and is now asleep on it
    fn sleeping_blob(state: &mut SimulationState) -> (CreatureId, DecorationId) {
        state.config.interactions = vec![InteractionRule::new(Interaction::Sleep, 1.0, 0.0)];
        let rock = state.next_entity_id();
        state.decorations.insert(Decoration {
            id: rock,
            kind: DecorationKind::Rock,
            pos: Vec2::new(60.0, 0.0),
            cost: 15,
        });
        let id = add_blob(state, Vec2::ZERO);
        choose_next_action(state, id);

        for _ in 0..100 {
            if state.creature(id).unwrap().behavior.is_dwelling() {
                break;
            }
            step(state);
        }
        assert_eq!(
            state.creature(id).unwrap().behavior,
            Behavior::Dwelling(Interaction::Sleep)
        );
        (id, rock)
    }

    #[test]
    fn test_advance_accumulates_partial_steps() {
        let mut state = garden(1);
        advance(&mut state, 10);
        assert_eq!(state.now_ms(), 0);
        advance(&mut state, 10);
        assert_eq!(state.now_ms(), SIM_STEP_MS);
        // Huge frame deltas are capped
        advance(&mut state, 60_000);
        let steps = MAX_FRAME_MS / SIM_STEP_MS;
        assert_eq!(state.now_ms(), SIM_STEP_MS * (1 + steps));
        assert_eq!(state.accumulator_ms, MAX_FRAME_MS % SIM_STEP_MS);
    }

    #[test]
    fn test_first_spawn_after_six_seconds() {
        let mut state = garden(2);
        run_for(&mut state, FIRST_SPAWN_DELAY_MS - SIM_STEP_MS);
        assert!(state.creatures.is_empty());
        run_for(&mut state, SIM_STEP_MS);
        assert_eq!(state.creatures.len(), 1);
    }

    #[test]
    fn test_passive_income_legendary() {
        let mut state = garden(3);
        let id = state.next_entity_id();
        let mut blob = Creature::spawn(
            id,
            Species::new("Rainbow Blob", Rarity::Legendary, 0xffb6c1),
            "Twinkle".into(),
            Vec2::ZERO,
            state.epoch_ms(),
            state.rng(),
        );
        blob.happiness = 95.0;
        state.creatures.push(blob);
        state.collection.add(&state.creatures[0], 0);

        income_tick(&mut state);
        assert_eq!(state.coins(), 106);
        let rec = state.collection.get("Rainbow Blob_Twinkle").unwrap();
        assert_eq!(rec.total_coins_generated, 6);
        assert_eq!(rec.total_time_spent, 5);
        assert!(state.save_requested);
    }

    #[test]
    fn test_happiness_tick_decays_and_collects() {
        let mut state = garden(4);
        let id = spawn_creature(&mut state).unwrap();
        let before = state.creature(id).unwrap().happiness;
        state.drain_events();

        happiness_tick(&mut state);
        let after = state.creature(id).unwrap().happiness;
        assert!((before - after - DECAY_BASE).abs() < 1e-4);
        assert_eq!(state.collection.len(), 1);
        assert!(matches!(
            state.drain_events().as_slice(),
            [GardenEvent::Collected { .. }]
        ));

        happiness_tick(&mut state);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_preferred_decoration_offsets_decay() {
        let mut state = garden(5);
        let id = spawn_creature(&mut state).unwrap();
        let (kind, gain) = state.creature(id).unwrap().personality.preference();
        let pos = state.creature(id).unwrap().pos;
        let deco_id = state.next_entity_id();
        state.decorations.insert(Decoration {
            id: deco_id,
            kind,
            pos: pos + Vec2::new(20.0, 0.0),
            cost: 0,
        });
        state.creature_mut(id).unwrap().happiness = 50.0;

        happiness_tick(&mut state);
        let h = state.creature(id).unwrap().happiness;
        assert!((h - (50.0 - DECAY_BASE + gain)).abs() < 1e-4);
    }

    #[test]
    fn test_food_is_eaten_within_reach() {
        let mut state = garden(6);
        let id = spawn_creature(&mut state).unwrap();
        state.creature_mut(id).unwrap().happiness = 30.0;
        let pos = state.creature(id).unwrap().pos;
        let food = state.next_entity_id();
        state.food.push(FoodItem {
            id: food,
            pos: pos + Vec2::new(10.0, 0.0),
            eaten: false,
        });

        step(&mut state);
        assert!(state.food.is_empty());
        let blob = state.creature(id).unwrap();
        assert!((blob.happiness - 55.0).abs() < 1e-4);
        assert!(blob.motion.is_none());
        assert!(blob.resume_timer.is_some());
        assert_eq!(state.coins(), 103);
        assert!(state.collection.contains(&blob.collection_key()));
    }

    #[test]
    fn test_dwelling_blob_eats_without_leaving() {
        let mut state = garden(10);
        let (id, rock) = sleeping_blob(&mut state);
        assert!(state.now_ms() < HAPPINESS_TICK_MS);
        state.creature_mut(id).unwrap().happiness = 30.0;
        let pos = state.creature(id).unwrap().pos;
        let food = state.next_entity_id();
        state.food.push(FoodItem {
            id: food,
            pos: pos + Vec2::new(5.0, 0.0),
            eaten: false,
        });

        step(&mut state);
        assert!(state.food.is_empty());
        assert_eq!(state.coins(), 103);
        let blob = state.creature(id).unwrap();
        assert!((blob.happiness - 55.0).abs() < 1e-4);
        assert_eq!(blob.behavior, Behavior::Dwelling(Interaction::Sleep));
        assert_eq!(blob.anchor, Some(rock));
        assert!(blob.dwell_timer.is_some());
        assert!(blob.resume_timer.is_none());
        assert!(occupancy_consistent(&state));
    }

    #[test]
    fn test_dwell_ends_on_its_timer() {
        let mut state = garden(11);
        let (id, rock) = sleeping_blob(&mut state);
        let landed = state.now_ms();

        while state.creature(id).unwrap().behavior.is_dwelling() {
            assert!(state.now_ms() - landed <= DWELL_MS);
            step(&mut state);
        }
        assert_eq!(state.now_ms() - landed, DWELL_MS);
        let blob = state.creature(id).unwrap();
        assert_eq!(blob.behavior, Behavior::JumpingOff(Interaction::Sleep));
        assert_eq!(blob.anchor, None);
        assert!(!state.decorations.is_occupied(rock));
    }

    #[test]
    fn test_wandering_blobs_bump_and_separate() {
        let mut state = garden(12);
        let still = add_blob(&mut state, Vec2::ZERO);
        let mover = add_blob(&mut state, Vec2::new(200.0, 0.0));
        state.creature_mut(mover).unwrap().motion = Some(Motion::new(
            Vec2::new(200.0, 0.0),
            Vec2::ZERO,
            2_000,
            Easing::SineInOut,
            MotionPurpose::Wander,
        ));

        for _ in 0..100 {
            let purpose = state.creature(mover).unwrap().motion.map(|m| m.purpose);
            if purpose != Some(MotionPurpose::Wander) {
                break;
            }
            step(&mut state);
        }

        // The in-flight wander was cancelled in favour of a push apart
        for id in [still, mover] {
            let blob = state.creature(id).unwrap();
            assert_eq!(blob.motion.map(|m| m.purpose), Some(MotionPurpose::Separate));
            assert!(blob.resume_timer.is_none());
        }
        let a = state.creature(still).unwrap().pos;
        let b = state.creature(mover).unwrap().pos;
        assert!(a.distance(b) < COLLISION_DISTANCE);

        run_for(&mut state, SEPARATE_MIN_DURATION_MS as u64 + 100);
        let a = state.creature(still).unwrap().pos;
        let b = state.creature(mover).unwrap().pos;
        assert!((a.distance(b) - SEPARATION_DISTANCE).abs() < 1e-2);
        assert!(state.creature(still).unwrap().resume_timer.is_some());
    }

    #[test]
    fn test_coin_drops_arrive_on_schedule() {
        let mut state = garden(7);
        run_for(&mut state, COIN_DROP_DELAY_MS.1);
        assert!(!state.coin_drops.is_empty());
        for coin in &state.coin_drops {
            assert!((5..=15).contains(&coin.value));
        }
    }

    #[test]
    fn test_long_run_keeps_invariants() {
        let mut state = garden(8);
        for kind in [DecorationKind::Rock, DecorationKind::Stump, DecorationKind::BouncePad] {
            place_decoration(&mut state, kind);
        }
        place_feed(&mut state);

        for _ in 0..(10 * 60 * 1_000 / MAX_FRAME_MS) {
            advance(&mut state, MAX_FRAME_MS);
            assert!(occupancy_consistent(&state));
            for blob in &state.creatures {
                assert!((0.0..=100.0).contains(&blob.happiness));
            }
        }
        assert!(!state.creatures.is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut a = garden(99_999);
        let mut b = garden(99_999);
        for state in [&mut a, &mut b] {
            place_decoration(state, DecorationKind::Rock);
            place_decoration(state, DecorationKind::Stump);
            run_for(state, 3 * 60 * 1_000);
        }

        assert_eq!(a.coins(), b.coins());
        assert_eq!(a.creatures.len(), b.creatures.len());
        for (x, y) in a.creatures.iter().zip(&b.creatures) {
            assert_eq!(x.name, y.name);
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.happiness, y.happiness);
            assert_eq!(x.behavior, y.behavior);
        }
        assert_eq!(a.collection, b.collection);
    }
}
