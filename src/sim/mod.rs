//! Deterministic simulation module
//!
//! All garden logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, logical milliseconds
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No storage, rendering or platform dependencies

pub mod actions;
pub mod behavior;
pub mod collection;
pub mod creature;
pub mod decoration;
pub mod economy;
pub mod geometry;
pub mod schedule;
pub mod state;
pub mod tick;

pub use actions::{
    ClickOutcome, adopt, click, drag_decoration, drag_food, place_decoration, place_feed,
    reset_collection, spawn_creature,
};
pub use behavior::{choose_next_action, occupancy_consistent};
pub use collection::{Collection, CollectionRecord};
pub use creature::{Behavior, Creature, CreatureId, Interaction, Personality, Rarity, Species};
pub use decoration::{Decoration, DecorationId, DecorationKind};
pub use economy::{CoinDrop, FoodItem, Ledger};
pub use geometry::{BoundaryPolicy, Playfield};
pub use state::{GardenEvent, SimulationState};
pub use tick::{advance, run_for, step};
