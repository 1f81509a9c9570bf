//! Blob Garden - a cozy idle game about collecting blobs
//!
//! Core modules:
//! - `sim`: Deterministic simulation (behavior state machine, happiness, economy)
//! - `persistence`: Key/value storage, JSON snapshots, offline progress
//! - `config`: Edition presets and tunable variation points
//! - `garden`: Controller owning the simulation and its store
//! - `web`: Browser bindings (wasm32 only)

pub mod config;
pub mod error;
pub mod garden;
pub mod persistence;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{Edition, GardenConfig};
pub use error::StorageError;
pub use garden::Garden;

/// Game configuration constants
///
/// All durations are logical milliseconds; distances are world units (pixels at 1x zoom).
pub mod consts {
    /// Fixed simulation step (50 Hz is plenty for blobs)
    pub const SIM_STEP_MS: u64 = 20;
    /// Largest frame delta accepted from the browser loop (tab switches, hitches)
    pub const MAX_FRAME_MS: u64 = 250;

    /// Repeating intervals
    pub const HAPPINESS_TICK_MS: u64 = 1_000;
    pub const INCOME_TICK_MS: u64 = 5_000;
    pub const AUTOSAVE_MS: u64 = 30_000;

    /// One-shot timers
    pub const FIRST_SPAWN_DELAY_MS: u64 = 6_000;
    pub const COIN_DROP_DELAY_MS: (u64, u64) = (15_000, 30_000);
    pub const HABITAT_EVAL_DELAY_MS: (u64, u64) = (60_000, 120_000);
    pub const ATTRACT_SPAWN_DELAY_MS: (u64, u64) = (3_000, 12_000);
    pub const WANDER_PAUSE_MS: (u64, u64) = (2_000, 5_000);
    pub const MEAL_PAUSE_MS: (u64, u64) = (8_000, 15_000);
    pub const SETTLE_DELAY_MS: u64 = 1_000;
    pub const DWELL_MS: u64 = 20_000;

    /// Habitat evaluation: spawn only while population is small and the garden is decorated
    pub const HABITAT_MAX_POPULATION: usize = 5;
    pub const HABITAT_MIN_DECORATIONS: usize = 3;

    /// Placement and collision distances
    pub const OCCUPIED_DISTANCE: f32 = 60.0;
    pub const SAFE_POSITION_ATTEMPTS: u32 = 20;
    pub const FARTHEST_POSITION_TRIALS: u32 = 10;
    pub const COLLISION_DISTANCE: f32 = 45.0;
    pub const SEPARATION_DISTANCE: f32 = 55.0;
    /// Push distance when two blobs sit exactly on top of each other
    pub const COINCIDENT_PUSH: f32 = 60.0;

    /// Interaction radii
    pub const INTERACTION_SEARCH_RADIUS: f32 = 150.0;
    pub const PREFERENCE_RADIUS: f32 = 80.0;
    pub const FOOD_CAPTURE_RADIUS: f32 = 40.0;
    pub const COIN_CLICK_RADIUS: f32 = 40.0;
    pub const CREATURE_CLICK_RADIUS: f32 = 30.0;
    /// Distance from the decoration a blob lands at when jumping off
    pub const LANDING_DISTANCE: f32 = 80.0;

    /// Jump animation timing (two phases each way)
    pub const JUMP_ON_PHASE_MS: u64 = 400;
    pub const JUMP_OFF_PHASE_MS: u64 = 500;
    pub const JUMP_ON_HEIGHT: f32 = 30.0;
    pub const JUMP_OFF_HEIGHT: f32 = 40.0;

    /// Wandering travel time: max(MIN, distance / speed * FACTOR)
    pub const WANDER_MIN_DURATION_MS: f32 = 2_000.0;
    pub const WANDER_DURATION_FACTOR: f32 = 50.0;
    /// Separation travel time: max(MIN, distance * FACTOR)
    pub const SEPARATE_MIN_DURATION_MS: f32 = 500.0;
    pub const SEPARATE_DURATION_FACTOR: f32 = 10.0;

    /// Happiness model
    pub const MAX_HAPPINESS: f32 = 100.0;
    pub const FEED_HAPPINESS: f32 = 25.0;
    pub const DECAY_BASE: f32 = 0.3;
    pub const DECAY_HUNGRY: f32 = 0.5;
    pub const DECAY_STARVING: f32 = 0.8;
    pub const HUNGRY_AFTER_MS: u64 = 60 * 60 * 1_000;
    pub const STARVING_AFTER_MS: u64 = 3 * 60 * 60 * 1_000;
    pub const RETURNING_BONUS_PER_VISIT: f32 = 2.0;
    pub const RETURNING_BONUS_CAP: f32 = 20.0;

    /// Offline progress
    pub const OFFLINE_THRESHOLD_MS: u64 = 5 * 60 * 1_000;
    pub const OFFLINE_CAP_HOURS: f64 = 24.0;
    pub const LOW_HAPPINESS: f32 = 25.0;
}

/// Uniform integer sample in an inclusive `(min, max)` range
#[inline]
pub fn roll_between<R: rand::Rng + ?Sized>(rng: &mut R, range: (u64, u64)) -> u64 {
    rng.random_range(range.0..=range.1)
}
