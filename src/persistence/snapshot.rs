//! JSON save formats
//!
//! Two keys: the collection map and a game-state snapshot used to work out
//! what happened while the player was away.

use serde::{Deserialize, Serialize};

use super::store::{KeyValueStore, load_json, save_json};
use super::{COLLECTION_KEY, GAME_STATE_KEY};
use crate::error::StorageError;
use crate::sim::collection::Collection;
use crate::sim::creature::{Personality, Rarity};
use crate::sim::state::SimulationState;

/// A blob as it was at the last save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBlob {
    pub id: u32,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_happiness")]
    pub happiness: f32,
    /// Older saves may lack this
    #[serde(default)]
    pub personality: Option<Personality>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub last_fed: u64,
    #[serde(default)]
    pub first_visit: u64,
    #[serde(default)]
    pub total_visits: u32,
}

fn default_name() -> String {
    "Unknown Blob".to_string()
}

fn default_happiness() -> f32 {
    50.0
}

/// Everything offline progress needs from the last session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Wall-clock ms of the save
    pub last_save_time: u64,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub blobs: Vec<SavedBlob>,
}

impl GameSnapshot {
    /// Capture the current session
    pub fn capture(state: &SimulationState) -> Self {
        Self {
            last_save_time: state.epoch_ms(),
            coins: state.coins(),
            blobs: state
                .creatures
                .iter()
                .map(|c| SavedBlob {
                    id: c.id,
                    name: c.name.clone(),
                    happiness: c.happiness,
                    personality: Some(c.personality),
                    rarity: Some(c.rarity()),
                    last_fed: c.last_fed,
                    first_visit: c.first_visit,
                    total_visits: c.total_visits,
                })
                .collect(),
        }
    }
}

pub fn load_collection<S: KeyValueStore + ?Sized>(store: &S) -> Result<Collection, StorageError> {
    Ok(load_json(store, COLLECTION_KEY)?.unwrap_or_default())
}

pub fn save_collection<S: KeyValueStore + ?Sized>(
    store: &mut S,
    collection: &Collection,
) -> Result<(), StorageError> {
    save_json(store, COLLECTION_KEY, collection)
}

pub fn load_snapshot<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Option<GameSnapshot>, StorageError> {
    load_json(store, GAME_STATE_KEY)
}

pub fn save_snapshot<S: KeyValueStore + ?Sized>(
    store: &mut S,
    snapshot: &GameSnapshot,
) -> Result<(), StorageError> {
    save_json(store, GAME_STATE_KEY, snapshot)
}

/// Drop both persisted records
pub fn clear_saves<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StorageError> {
    store.remove(COLLECTION_KEY)?;
    store.remove(GAME_STATE_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GardenConfig;
    use crate::persistence::store::MemoryStore;
    use crate::sim::actions::spawn_creature;
    use crate::sim::tick::{happiness_tick, income_tick};

    #[test]
    fn test_collection_round_trip() {
        let mut state = SimulationState::new(GardenConfig::default(), 12, 0);
        for _ in 0..4 {
            spawn_creature(&mut state);
        }
        for c in state.creatures.iter_mut() {
            c.happiness = 95.0;
        }
        happiness_tick(&mut state);
        income_tick(&mut state);
        let key = state.creatures[0].collection_key();
        assert!(state.collection.adopt(&key, 77));

        let mut store = MemoryStore::new();
        save_collection(&mut store, &state.collection).unwrap();
        let loaded = load_collection(&store).unwrap();

        assert_eq!(loaded.len(), state.collection.len());
        for (key, rec) in state.collection.iter() {
            let back = loaded.get(key).unwrap();
            assert_eq!(back.total_visits, rec.total_visits);
            assert_eq!(back.max_happiness, rec.max_happiness);
            assert_eq!(back.total_coins_generated, rec.total_coins_generated);
        }
        assert_eq!(loaded, state.collection);
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(load_collection(&store).unwrap().is_empty());
        assert!(load_snapshot(&store).unwrap().is_none());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut state = SimulationState::new(GardenConfig::default(), 3, 5_000);
        spawn_creature(&mut state);
        let snap = GameSnapshot::capture(&state);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["lastSaveTime"], 5_000);
        assert_eq!(json["coins"], 100);
        let blob = &json["blobs"][0];
        let fields = [
            "id",
            "name",
            "happiness",
            "personality",
            "rarity",
            "lastFed",
            "firstVisit",
            "totalVisits",
        ];
        for field in fields {
            assert!(!blob[field].is_null(), "missing {}", field);
        }
    }

    #[test]
    fn test_sparse_snapshot_uses_defaults() {
        let snap: GameSnapshot =
            serde_json::from_str(r#"{"lastSaveTime": 10, "blobs": [{"id": 1}]}"#).unwrap();
        assert_eq!(snap.coins, 0);
        assert_eq!(snap.blobs[0].name, "Unknown Blob");
        assert_eq!(snap.blobs[0].happiness, 50.0);
        assert_eq!(snap.blobs[0].personality, None);
    }

    #[test]
    fn test_clear_saves() {
        let mut store = MemoryStore::new();
        save_collection(&mut store, &Collection::new()).unwrap();
        let snapshot = GameSnapshot {
            last_save_time: 1,
            coins: 2,
            blobs: vec![],
        };
        save_snapshot(&mut store, &snapshot).unwrap();
        assert_eq!(store.len(), 2);
        clear_saves(&mut store).unwrap();
        assert!(store.is_empty());
    }
}
