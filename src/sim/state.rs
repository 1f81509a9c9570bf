//! Simulation state and notification events
//!
//! Everything the garden simulation mutates lives in [`SimulationState`].
//! It is owned by a single controller; there are no globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collection::Collection;
use super::creature::{Creature, CreatureId, Interaction, Rarity};
use super::decoration::{DecorationId, DecorationKind, DecorationRegistry};
use super::economy::{CoinDrop, FoodItem, Ledger};
use super::schedule::{Scheduler, TimerEvent};
use crate::config::GardenConfig;
use crate::consts::*;
use crate::roll_between;

/// Something the presentation layer may want to show or play a sound for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GardenEvent {
    CreatureSpawned {
        id: CreatureId,
        name: String,
        species: String,
        rarity: Rarity,
    },
    ReturningFriend {
        id: CreatureId,
        name: String,
        visits: u32,
        bonus: f32,
    },
    Collected {
        key: String,
        name: String,
        rarity: Rarity,
    },
    Adopted {
        key: String,
    },
    CollectionReset,
    DecorationPlaced {
        id: DecorationId,
        kind: DecorationKind,
        pos: Vec2,
    },
    FoodPlaced {
        id: u32,
        pos: Vec2,
    },
    FoodEaten {
        creature: CreatureId,
        food: u32,
    },
    CoinDropped {
        id: u32,
        pos: Vec2,
        value: u64,
    },
    CoinCollected {
        id: u32,
        value: u64,
    },
    /// Floating "+N" over a blob after an income tick
    CoinsEarned {
        creature: CreatureId,
        amount: u64,
    },
    LegendaryJoy {
        creature: CreatureId,
    },
    InteractionStarted {
        creature: CreatureId,
        decoration: DecorationId,
        interaction: Interaction,
    },
    InteractionEnded {
        creature: CreatureId,
        interaction: Interaction,
        happiness_gain: f32,
    },
    Squished {
        creature: CreatureId,
    },
}

/// Complete mutable state of one garden session
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub config: GardenConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Wall-clock ms corresponding to logical time 0
    pub epoch_origin_ms: u64,
    pub ledger: Ledger,
    /// Sorted by id (ids are allocated increasing, blobs are never removed)
    pub creatures: Vec<Creature>,
    pub decorations: DecorationRegistry,
    pub food: Vec<FoodItem>,
    pub coin_drops: Vec<CoinDrop>,
    pub collection: Collection,
    pub scheduler: Scheduler,
    /// Pending notifications, drained by the controller
    pub events: Vec<GardenEvent>,
    /// Set by autosave/income ticks; the controller persists and clears it
    pub save_requested: bool,
    /// Leftover ms not yet consumed by a fixed step
    pub(crate) accumulator_ms: u64,
    next_id: u32,
}

impl SimulationState {
    /// Start a fresh session
    ///
    /// Arms the repeating ticks and the first spawn, coin drop and habitat
    /// evaluation timers.
    pub fn new(config: GardenConfig, seed: u64, epoch_origin_ms: u64) -> Self {
        let mut state = Self {
            ledger: Ledger::new(config.starting_coins),
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            epoch_origin_ms,
            creatures: Vec::new(),
            decorations: DecorationRegistry::new(),
            food: Vec::new(),
            coin_drops: Vec::new(),
            collection: Collection::new(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            save_requested: false,
            accumulator_ms: 0,
            next_id: 1,
        };

        state.scheduler.every(HAPPINESS_TICK_MS, TimerEvent::HappinessTick);
        state.scheduler.every(INCOME_TICK_MS, TimerEvent::IncomeTick);
        state.scheduler.every(AUTOSAVE_MS, TimerEvent::Autosave);
        state.scheduler.after(FIRST_SPAWN_DELAY_MS, TimerEvent::SpawnCreature);

        let coin_delay = roll_between(&mut state.rng, COIN_DROP_DELAY_MS);
        state.scheduler.after(coin_delay, TimerEvent::CoinDrop);
        let habitat_delay = roll_between(&mut state.rng, HABITAT_EVAL_DELAY_MS);
        state.scheduler.after(habitat_delay, TimerEvent::HabitatEvaluation);

        state
    }

    /// Logical session time in ms
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    /// Wall-clock time in ms (for timestamps that outlive the session)
    pub fn epoch_ms(&self) -> u64 {
        self.epoch_origin_ms + self.now_ms()
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Allocate a new entity ID (shared by all entity kinds)
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.id == id)
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.creatures.iter_mut().find(|c| c.id == id)
    }

    pub(crate) fn creature_index(&self, id: CreatureId) -> Option<usize> {
        self.creatures.iter().position(|c| c.id == id)
    }

    /// Positions of every blob except `exclude`
    pub fn other_positions(&self, exclude: Option<CreatureId>) -> Vec<Vec2> {
        self.creatures
            .iter()
            .filter(|c| Some(c.id) != exclude)
            .map(|c| c.pos)
            .collect()
    }

    pub fn coins(&self) -> u64 {
        self.ledger.balance()
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GardenEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GardenEvent) {
        self.events.push(event);
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.creatures.sort_by_key(|c| c.id);
        self.food.sort_by_key(|f| f.id);
        self.coin_drops.sort_by_key(|c| c.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_arms_timers() {
        let state = SimulationState::new(GardenConfig::default(), 1, 1_000_000);
        assert_eq!(state.coins(), 100);
        assert_eq!(state.now_ms(), 0);
        assert_eq!(state.epoch_ms(), 1_000_000);
        // happiness, income, autosave, first spawn, coin drop, habitat
        assert_eq!(state.scheduler.len(), 6);
        assert!(state.creatures.is_empty());
    }

    #[test]
    fn test_events_serialize_camel_case() {
        let event = GardenEvent::InteractionEnded {
            creature: 3,
            interaction: Interaction::Dance,
            happiness_gain: 20.0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "interactionEnded");
        assert_eq!(json["happinessGain"], 20.0);
        assert_eq!(json["interaction"], "dance");
        assert!(json.get("happiness_gain").is_none());
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = SimulationState::new(GardenConfig::default(), 1, 0);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }
}
