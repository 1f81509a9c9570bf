//! The garden controller
//!
//! Owns the simulation and the durable store. This is the only layer that
//! touches storage, and the only place storage errors are swallowed: a bad
//! read means an empty collection, a failed write means the save is skipped.

use glam::Vec2;

use crate::config::GardenConfig;
use crate::persistence::offline::{OfflineReport, check_offline_progress};
use crate::persistence::snapshot::{
    GameSnapshot, clear_saves, load_collection, load_snapshot, save_collection, save_snapshot,
};
use crate::persistence::store::KeyValueStore;
use crate::sim::actions::{self, ClickOutcome};
use crate::sim::creature::CreatureId;
use crate::sim::decoration::{DecorationId, DecorationKind};
use crate::sim::economy::Ledger;
use crate::sim::state::{GardenEvent, SimulationState};
use crate::sim::tick;

/// A running garden session
pub struct Garden<S: KeyValueStore> {
    state: SimulationState,
    store: S,
    offline_report: Option<OfflineReport>,
}

impl<S: KeyValueStore> Garden<S> {
    /// Open a session at wall-clock `now_epoch_ms`
    ///
    /// Remembers `config` for the next session, restores the collection and
    /// coin balance, and credits anything earned while the player was away.
    pub fn open(config: GardenConfig, mut store: S, seed: u64, now_epoch_ms: u64) -> Self {
        config.save(&mut store);
        let mut state = SimulationState::new(config, seed, now_epoch_ms);

        match load_collection(&store) {
            Ok(collection) => {
                log::info!("Loaded collection ({} blobs)", collection.len());
                state.collection = collection;
            }
            Err(err) => log::warn!("Could not load collection, starting empty: {}", err),
        }

        let snapshot = match load_snapshot(&store) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("Could not read saved game state: {}", err);
                None
            }
        };

        let mut offline_report = None;
        if let Some(snapshot) = snapshot {
            state.ledger = Ledger::new(snapshot.coins);
            if let Some(report) = check_offline_progress(&snapshot, now_epoch_ms, state.rng()) {
                log::info!(
                    "Welcome back! {:.1}h away, earned {} coins",
                    report.offline_hours,
                    report.coins_earned
                );
                state.ledger.credit(report.coins_earned);
                offline_report = Some(report);
            }
        }

        let mut garden = Self {
            state,
            store,
            offline_report,
        };
        garden.save();
        garden
    }

    /// Advance by one frame's worth of time, saving if the simulation asked to
    pub fn advance(&mut self, frame_ms: u64) {
        tick::advance(&mut self.state, frame_ms);
        if self.state.save_requested {
            self.save();
        }
    }

    /// Run for a stretch of logical time (headless play, tests)
    pub fn run_for(&mut self, duration_ms: u64) {
        tick::run_for(&mut self.state, duration_ms);
        if self.state.save_requested {
            self.save();
        }
    }

    /// Persist the collection and a snapshot; failures are logged and skipped
    pub fn save(&mut self) {
        self.state.save_requested = false;
        if let Err(err) = save_collection(&mut self.store, &self.state.collection) {
            log::warn!("Failed to save collection: {}", err);
        }
        let snapshot = GameSnapshot::capture(&self.state);
        match save_snapshot(&mut self.store, &snapshot) {
            Ok(()) => log::debug!("Game saved ({} coins)", snapshot.coins),
            Err(err) => log::warn!("Failed to save game state: {}", err),
        }
    }

    pub fn spawn(&mut self) -> Option<CreatureId> {
        actions::spawn_creature(&mut self.state)
    }

    pub fn feed(&mut self) -> Option<u32> {
        actions::place_feed(&mut self.state)
    }

    pub fn place_decoration(&mut self, kind: DecorationKind) -> Option<DecorationId> {
        actions::place_decoration(&mut self.state, kind)
    }

    pub fn click(&mut self, pos: Vec2) -> ClickOutcome {
        actions::click(&mut self.state, pos)
    }

    pub fn drag_decoration(&mut self, id: DecorationId, pos: Vec2) -> Option<Vec2> {
        actions::drag_decoration(&mut self.state, id, pos)
    }

    pub fn drag_food(&mut self, id: u32, pos: Vec2) -> Option<Vec2> {
        actions::drag_food(&mut self.state, id, pos)
    }

    pub fn adopt(&mut self, id: CreatureId) -> bool {
        let adopted = actions::adopt(&mut self.state, id);
        if adopted {
            self.save();
        }
        adopted
    }

    /// Forget every collected blob, in memory and in storage
    pub fn reset_collection(&mut self) {
        actions::reset_collection(&mut self.state);
        if let Err(err) = clear_saves(&mut self.store) {
            log::warn!("Failed to clear saved collection: {}", err);
        }
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GardenEvent> {
        self.state.drain_events()
    }

    /// The "while you were away" summary, if there is one to show
    pub fn offline_report(&self) -> Option<&OfflineReport> {
        self.offline_report.as_ref()
    }

    pub fn take_offline_report(&mut self) -> Option<OfflineReport> {
        self.offline_report.take()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn coins(&self) -> u64 {
        self.state.coins()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
