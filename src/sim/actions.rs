//! Player actions and creature arrival
//!
//! Purchases silently do nothing when the balance is short; every other
//! boundary (no blobs, unknown ids) is a no-op as well.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::behavior::{choose_next_action, follow_decoration};
use super::creature::{Creature, CreatureId, Rarity, choose_species};
use super::decoration::{Decoration, DecorationId, DecorationKind};
use super::economy::{FoodItem, collect_coin_at};
use super::geometry::find_safe_position;
use super::schedule::TimerEvent;
use super::state::{GardenEvent, SimulationState};
use crate::consts::*;
use crate::roll_between;

/// Fallback when the name pool is empty
const DEFAULT_NAME: &str = "Blob";

/// What a click on the garden hit
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Picked up a coin worth this much
    Coin(u64),
    /// Squished these blobs
    Squished(Vec<CreatureId>),
    Nothing,
}

/// A new blob wanders into the garden
///
/// Rolls rarity, species, name and personality, places it away from the
/// others, greets it if it has visited before, and sets it moving.
pub fn spawn_creature(state: &mut SimulationState) -> Option<CreatureId> {
    let rarity = Rarity::roll(state.rng());
    let species = {
        let table = state.config.species.clone();
        match choose_species(&table, rarity, state.rng()) {
            Some(s) => s.clone(),
            None => {
                log::warn!("No species configured, skipping spawn");
                return None;
            }
        }
    };
    let name = {
        let names = state.config.names.clone();
        names
            .choose(state.rng())
            .cloned()
            .unwrap_or_else(|| DEFAULT_NAME.to_string())
    };

    let others = state.other_positions(None);
    let field = state.config.playfield;
    let pos = find_safe_position(&field, &others, SAFE_POSITION_ATTEMPTS, state.rng());

    let id = state.next_entity_id();
    let now = state.epoch_ms();
    let mut creature = Creature::spawn(id, species, name, pos, now, state.rng());

    if let Some(bonus) = state.collection.welcome_back(&mut creature) {
        log::info!(
            "{} is back! (visit #{}, +{} happiness)",
            creature.name,
            creature.total_visits,
            bonus
        );
        state.emit(GardenEvent::ReturningFriend {
            id,
            name: creature.name.clone(),
            visits: creature.total_visits,
            bonus,
        });
        state.save_requested = true;
    }

    match creature.rarity() {
        Rarity::Legendary => log::info!("A legendary {} appeared!", creature.species.name),
        Rarity::Rare => log::info!("A rare {} appeared!", creature.species.name),
        _ => log::info!(
            "{} the {} ({}) arrived",
            creature.name,
            creature.species.name,
            creature.personality.as_str()
        ),
    }
    state.emit(GardenEvent::CreatureSpawned {
        id,
        name: creature.name.clone(),
        species: creature.species.name.clone(),
        rarity: creature.rarity(),
    });

    state.creatures.push(creature);
    choose_next_action(state, id);
    Some(id)
}

/// Buy a bug and drop it somewhere on the grass
pub fn place_feed(state: &mut SimulationState) -> Option<u32> {
    if !state.ledger.spend(state.config.feed_cost) {
        return None;
    }
    let field = state.config.playfield;
    let pos = field.random_ground_position(state.rng());
    let id = state.next_entity_id();
    state.food.push(FoodItem {
        id,
        pos,
        eaten: false,
    });
    log::debug!("Food placed at ({:.0}, {:.0})", pos.x, pos.y);
    state.emit(GardenEvent::FoodPlaced { id, pos });
    Some(id)
}

/// Chance that a new decoration draws in a visitor, by population
pub fn attraction_chance(population: usize) -> f32 {
    match population {
        0 => 0.8,
        1 | 2 => 0.6,
        _ => 0.4,
    }
}

/// Buy a decoration and place it at a random ground position
///
/// May attract a new blob a few seconds later.
pub fn place_decoration(state: &mut SimulationState, kind: DecorationKind) -> Option<DecorationId> {
    let Some(cost) = state.config.cost_of(kind) else {
        log::warn!("{} is not sold in this garden", kind.as_str());
        return None;
    };
    if !state.ledger.spend(cost) {
        return None;
    }

    let field = state.config.playfield;
    let pos = field.random_ground_position(state.rng());
    let id = state.next_entity_id();
    state.decorations.insert(Decoration { id, kind, pos, cost });
    log::info!("Placed {} for {} coins", kind.as_str(), cost);
    state.emit(GardenEvent::DecorationPlaced { id, kind, pos });

    let chance = attraction_chance(state.creatures.len());
    if state.rng().random::<f32>() < chance {
        let delay = roll_between(state.rng(), ATTRACT_SPAWN_DELAY_MS);
        state.scheduler.after(delay, TimerEvent::SpawnCreature);
        log::debug!("A blob noticed the {} (arriving in {} ms)", kind.as_str(), delay);
    }
    Some(id)
}

/// Handle a click at `pos`
///
/// Coins take precedence; otherwise every interactive blob under the cursor
/// gets squished.
pub fn click(state: &mut SimulationState, pos: Vec2) -> ClickOutcome {
    if let Some(coin) = collect_coin_at(&mut state.coin_drops, pos, COIN_CLICK_RADIUS) {
        state.ledger.credit(coin.value);
        state.emit(GardenEvent::CoinCollected {
            id: coin.id,
            value: coin.value,
        });
        return ClickOutcome::Coin(coin.value);
    }

    let squished: Vec<CreatureId> = state
        .creatures
        .iter()
        .filter(|c| c.is_interactive() && c.pos.distance(pos) < CREATURE_CLICK_RADIUS)
        .map(|c| c.id)
        .collect();
    if squished.is_empty() {
        return ClickOutcome::Nothing;
    }
    for &creature in &squished {
        state.emit(GardenEvent::Squished { creature });
    }
    ClickOutcome::Squished(squished)
}

/// Drag a decoration to `pos` (clamped); its occupant moves along
pub fn drag_decoration(state: &mut SimulationState, id: DecorationId, pos: Vec2) -> Option<Vec2> {
    let pos = state.config.playfield.clamp_to_bounds(pos);
    let delta = state.decorations.move_to(id, pos)?;
    follow_decoration(state, id, delta);
    Some(pos)
}

/// Drag an uneaten food item to `pos` (clamped)
pub fn drag_food(state: &mut SimulationState, id: u32, pos: Vec2) -> Option<Vec2> {
    let pos = state.config.playfield.clamp_to_bounds(pos);
    let food = state.food.iter_mut().find(|f| f.id == id && !f.eaten)?;
    food.pos = pos;
    Some(pos)
}

/// Adopt a blob that is already in the collection
pub fn adopt(state: &mut SimulationState, id: CreatureId) -> bool {
    let Some(key) = state.creature(id).map(|c| c.collection_key()) else {
        return false;
    };
    let now = state.epoch_ms();
    if !state.collection.adopt(&key, now) {
        return false;
    }
    log::info!("Adopted {}", key);
    state.emit(GardenEvent::Adopted { key });
    state.save_requested = true;
    true
}

/// Forget every collected blob
pub fn reset_collection(state: &mut SimulationState) {
    state.collection.clear();
    log::info!("Collection reset");
    state.emit(GardenEvent::CollectionReset);
}
