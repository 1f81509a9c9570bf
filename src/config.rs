//! Garden configuration and edition presets
//!
//! Persisted separately from game saves, under its own storage key.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::persistence::store::{KeyValueStore, load_json, save_json};
use crate::sim::creature::{Interaction, Rarity, Species};
use crate::sim::decoration::DecorationKind;
use crate::sim::geometry::Playfield;

/// Which flavor of the game to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Edition {
    /// Rectangular garden with bounce pads and all three interactions
    #[default]
    Garden,
    /// Isometric diamond platform with plants; blobs only sleep
    Classic,
}

impl Edition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Edition::Garden => "Garden",
            Edition::Classic => "Classic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "garden" => Some(Edition::Garden),
            "classic" | "iso" | "isometric" => Some(Edition::Classic),
            _ => None,
        }
    }
}

/// A decoration offered in the shop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub kind: DecorationKind,
    pub cost: u64,
}

impl CatalogEntry {
    pub fn new(kind: DecorationKind, cost: u64) -> Self {
        Self { kind, cost }
    }
}

/// An enabled special interaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub interaction: Interaction,
    /// Probability per decision that the blob goes looking for the decoration
    pub chance: f32,
    /// Happiness gained when the dwell ends
    pub jump_off_bonus: f32,
}

impl InteractionRule {
    pub fn new(interaction: Interaction, chance: f32, jump_off_bonus: f32) -> Self {
        Self {
            interaction,
            chance,
            jump_off_bonus,
        }
    }
}

/// Edition variation points plus economy tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenConfig {
    pub edition: Edition,
    pub playfield: Playfield,
    /// Shop entries, in display order
    pub catalog: Vec<CatalogEntry>,
    /// Enabled interactions, tried in this order
    pub interactions: Vec<InteractionRule>,
    pub species: Vec<Species>,
    pub names: Vec<String>,

    // === Economy ===
    pub starting_coins: u64,
    pub feed_cost: u64,
    /// Paid out when a blob eats
    pub feed_bonus_coins: u64,
    /// Inclusive range for coin drop values
    pub coin_drop_value: (u64, u64),
}

const NAME_POOL: [&str; 16] = [
    "Blobby", "Squish", "Gooey", "Bouncy", "Wiggly", "Squishy", "Jelly", "Pudding", "Sparkle",
    "Glimmer", "Wobble", "Bubble", "Shimmer", "Ripple", "Twinkle", "Giggle",
];

impl Default for GardenConfig {
    fn default() -> Self {
        Self::from_edition(Edition::Garden)
    }
}

impl GardenConfig {
    /// Build the preset for an edition
    pub fn from_edition(edition: Edition) -> Self {
        match edition {
            Edition::Garden => Self {
                edition,
                playfield: Playfield::rectangle(Vec2::new(800.0, 600.0)),
                catalog: vec![
                    CatalogEntry::new(DecorationKind::BouncePad, 25),
                    CatalogEntry::new(DecorationKind::Rock, 15),
                    CatalogEntry::new(DecorationKind::Water, 20),
                    CatalogEntry::new(DecorationKind::Mushroom, 30),
                    CatalogEntry::new(DecorationKind::Stump, 35),
                ],
                interactions: vec![
                    InteractionRule::new(Interaction::Sleep, 0.2, 0.0),
                    InteractionRule::new(Interaction::Dance, 0.15, 20.0),
                    InteractionRule::new(Interaction::Bounce, 0.18, 20.0),
                ],
                species: vec![
                    Species::new("Lavender Blob", Rarity::Common, 0xc8a2c8),
                    Species::new("Sky Blob", Rarity::Common, 0x87ceeb),
                    Species::new("Rose Blob", Rarity::Uncommon, 0xffb6c1),
                    Species::new("Violet Blob", Rarity::Uncommon, 0xdda0dd),
                    Species::new("Peach Blob", Rarity::Rare, 0xffdab9),
                    Species::new("Rainbow Blob", Rarity::Legendary, 0xffb6c1),
                ],
                names: NAME_POOL.iter().map(|s| s.to_string()).collect(),
                starting_coins: 100,
                feed_cost: 10,
                feed_bonus_coins: 3,
                coin_drop_value: (5, 15),
            },
            Edition::Classic => Self {
                edition,
                playfield: Playfield::diamond(Vec2::new(400.0, 350.0), Vec2::new(750.0, 400.0)),
                catalog: vec![
                    CatalogEntry::new(DecorationKind::Plant, 25),
                    CatalogEntry::new(DecorationKind::Rock, 15),
                    CatalogEntry::new(DecorationKind::Water, 20),
                    CatalogEntry::new(DecorationKind::Mushroom, 30),
                    CatalogEntry::new(DecorationKind::Stump, 35),
                ],
                interactions: vec![InteractionRule::new(Interaction::Sleep, 0.2, 0.0)],
                species: vec![
                    Species::new("Green Blob", Rarity::Common, 0x4caf50),
                    Species::new("Blue Blob", Rarity::Common, 0x2196f3),
                    Species::new("Pink Blob", Rarity::Uncommon, 0xe91e63),
                    Species::new("Purple Blob", Rarity::Uncommon, 0x9c27b0),
                    Species::new("Orange Blob", Rarity::Rare, 0xff9800),
                    Species::new("Rainbow Blob", Rarity::Legendary, 0xff6b6b),
                ],
                names: NAME_POOL[..8].iter().map(|s| s.to_string()).collect(),
                starting_coins: 100,
                feed_cost: 10,
                feed_bonus_coins: 3,
                coin_drop_value: (5, 15),
            },
        }
    }

    /// Price of a decoration, or None if this edition doesn't sell it
    pub fn cost_of(&self, kind: DecorationKind) -> Option<u64> {
        self.catalog.iter().find(|e| e.kind == kind).map(|e| e.cost)
    }

    /// Rule for an interaction, or None if it is disabled
    pub fn rule_for(&self, interaction: Interaction) -> Option<&InteractionRule> {
        self.interactions.iter().find(|r| r.interaction == interaction)
    }

    /// Storage key
    pub const STORAGE_KEY: &'static str = "blobGardenConfig";

    /// Load the config from the store, falling back to `fallback` on any failure
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, fallback: Edition) -> Self {
        match load_json::<Self, S>(store, Self::STORAGE_KEY) {
            Ok(Some(config)) => {
                log::info!("Loaded {} config from storage", config.edition.as_str());
                config
            }
            Ok(None) => {
                log::info!("Using default {} config", fallback.as_str());
                Self::from_edition(fallback)
            }
            Err(err) => {
                log::warn!("Stored config unreadable ({}), using defaults", err);
                Self::from_edition(fallback)
            }
        }
    }

    /// Save the config to the store; failures are logged
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        match save_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::debug!("Config saved"),
            Err(err) => log::warn!("Failed to save config: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::store::MemoryStore;
    use crate::sim::geometry::BoundaryPolicy;

    #[test]
    fn test_edition_names() {
        for edition in [Edition::Garden, Edition::Classic] {
            assert_eq!(Edition::from_str(edition.as_str()), Some(edition));
        }
        assert_eq!(Edition::from_str("bogus"), None);
    }

    #[test]
    fn test_presets_differ_at_variation_points() {
        let garden = GardenConfig::from_edition(Edition::Garden);
        let classic = GardenConfig::from_edition(Edition::Classic);

        assert_eq!(garden.playfield.policy, BoundaryPolicy::Rectangle);
        assert_eq!(classic.playfield.policy, BoundaryPolicy::Diamond);

        assert_eq!(garden.cost_of(DecorationKind::BouncePad), Some(25));
        assert_eq!(garden.cost_of(DecorationKind::Plant), None);
        assert_eq!(classic.cost_of(DecorationKind::Plant), Some(25));
        assert_eq!(classic.cost_of(DecorationKind::Stump), Some(35));

        assert_eq!(garden.interactions.len(), 3);
        assert!(classic.rule_for(Interaction::Sleep).is_some());
        assert!(classic.rule_for(Interaction::Dance).is_none());

        assert_eq!(garden.names.len(), 16);
        assert_eq!(classic.names.len(), 8);
    }

    #[test]
    fn test_every_rarity_has_a_species() {
        for edition in [Edition::Garden, Edition::Classic] {
            let config = GardenConfig::from_edition(edition);
            for rarity in Rarity::ALL {
                assert!(config.species.iter().any(|s| s.rarity == rarity));
            }
        }
    }

    #[test]
    fn test_load_save() {
        let mut store = MemoryStore::new();
        assert_eq!(GardenConfig::load(&store, Edition::Classic).edition, Edition::Classic);

        let mut config = GardenConfig::from_edition(Edition::Garden);
        config.starting_coins = 250;
        config.save(&mut store);
        let loaded = GardenConfig::load(&store, Edition::Classic);
        assert_eq!(loaded, config);

        store.set(GardenConfig::STORAGE_KEY, "garbage").unwrap();
        assert_eq!(GardenConfig::load(&store, Edition::Garden), GardenConfig::default());
    }
}
