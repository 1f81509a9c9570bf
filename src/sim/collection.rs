//! The blob collection: every blob the player has ever met
//!
//! Records are keyed by `"<species>_<name>"`. Two blobs of the same species
//! that roll the same name share one record and count as the same friend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::creature::{Creature, Personality, Rarity};
use crate::consts::{RETURNING_BONUS_CAP, RETURNING_BONUS_PER_VISIT};

/// Persistent stats for one collected blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub species: String,
    pub rarity: Rarity,
    pub personality: Personality,
    /// Wall-clock ms of the first encounter
    pub first_collected: u64,
    pub total_visits: u32,
    pub max_happiness: f32,
    /// Seconds spent in the garden while the game was open
    pub total_time_spent: u64,
    pub total_coins_generated: u64,
    pub is_adopted: bool,
    pub adoption_date: Option<u64>,
}

/// All collected blobs, in stable key order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    records: BTreeMap<String, CollectionRecord>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CollectionRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CollectionRecord)> {
        self.records.iter()
    }

    /// Record an encounter with `creature`
    ///
    /// The first encounter creates the record and returns true; later ones
    /// only raise the running maximum happiness.
    pub fn add(&mut self, creature: &Creature, now_epoch_ms: u64) -> bool {
        let key = creature.collection_key();
        if let Some(record) = self.records.get_mut(&key) {
            record.max_happiness = record.max_happiness.max(creature.happiness);
            return false;
        }

        self.records.insert(
            key,
            CollectionRecord {
                name: creature.name.clone(),
                species: creature.species.name.clone(),
                rarity: creature.rarity(),
                personality: creature.personality,
                first_collected: now_epoch_ms,
                total_visits: creature.total_visits.max(1),
                max_happiness: creature.happiness,
                total_time_spent: 0,
                total_coins_generated: 0,
                is_adopted: false,
                adoption_date: None,
            },
        );
        true
    }

    /// Welcome back a blob we've met before
    ///
    /// If its key is known, the visit counter goes up, the blob is flagged as a
    /// returning friend and gains `min(20, previous_visits * 2)` happiness.
    /// Returns the bonus applied.
    pub fn welcome_back(&mut self, creature: &mut Creature) -> Option<f32> {
        let record = self.records.get_mut(&creature.collection_key())?;
        let bonus = returning_friend_bonus(record.total_visits);
        record.total_visits += 1;

        creature.is_returning_friend = true;
        creature.total_visits = record.total_visits;
        creature.adjust_happiness(bonus);
        Some(bonus)
    }

    /// Book a passive-income tick against a blob's record (if collected)
    pub fn record_income(&mut self, key: &str, seconds: u64, coins: u64) {
        if let Some(record) = self.records.get_mut(key) {
            record.total_time_spent += seconds;
            record.total_coins_generated += coins;
        }
    }

    /// Mark a collected blob as adopted; false if unknown or already adopted
    pub fn adopt(&mut self, key: &str, now_epoch_ms: u64) -> bool {
        match self.records.get_mut(key) {
            Some(record) if !record.is_adopted => {
                record.is_adopted = true;
                record.adoption_date = Some(now_epoch_ms);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Happiness bonus for a friend that has visited `previous_visits` times before
pub fn returning_friend_bonus(previous_visits: u32) -> f32 {
    (previous_visits as f32 * RETURNING_BONUS_PER_VISIT).min(RETURNING_BONUS_CAP)
}
