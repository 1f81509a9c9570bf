//! Browser bindings
//!
//! The page owns rendering, audio and input. Each animation frame it calls
//! `advance`, reads the scene as JSON and plays whatever events came out.

use glam::Vec2;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::{Edition, GardenConfig};
use crate::error::StorageError;
use crate::garden::Garden;
use crate::persistence::store::{KeyValueStore, LocalStorage, MemoryStore};
use crate::sim::actions::ClickOutcome;
use crate::sim::decoration::{Decoration, DecorationKind};
use crate::sim::economy::{CoinDrop, FoodItem};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Blob Garden starting...");
}

/// Storage that degrades to memory when LocalStorage is blocked
enum BrowserStore {
    Local(LocalStorage),
    Memory(MemoryStore),
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            BrowserStore::Local(s) => s.get(key),
            BrowserStore::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            BrowserStore::Local(s) => s.set(key, value),
            BrowserStore::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match self {
            BrowserStore::Local(s) => s.remove(key),
            BrowserStore::Memory(s) => s.remove(key),
        }
    }
}

#[derive(Serialize)]
struct CreatureView<'a> {
    id: u32,
    name: &'a str,
    species: &'a str,
    color: u32,
    x: f32,
    y: f32,
    scale: f32,
    happiness: f32,
    behavior: &'static str,
    interactive: bool,
    returning: bool,
}

#[derive(Serialize)]
struct SceneView<'a> {
    coins: u64,
    creatures: Vec<CreatureView<'a>>,
    decorations: Vec<&'a Decoration>,
    food: &'a [FoodItem],
    coins_on_ground: &'a [CoinDrop],
}

/// JS-facing handle to a garden session
#[wasm_bindgen]
pub struct GardenHandle {
    garden: Garden<BrowserStore>,
}

#[wasm_bindgen]
impl GardenHandle {
    /// Open the garden; `edition` is used only when no config has been saved
    #[wasm_bindgen(constructor)]
    pub fn new(edition: &str) -> GardenHandle {
        let store = match LocalStorage::open() {
            Ok(local) => BrowserStore::Local(local),
            Err(err) => {
                log::warn!("{}; progress will not be saved", err);
                BrowserStore::Memory(MemoryStore::new())
            }
        };
        let fallback = Edition::from_str(edition).unwrap_or_default();
        let config = GardenConfig::load(&store, fallback);
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        let now = js_sys::Date::now() as u64;

        GardenHandle {
            garden: Garden::open(config, store, seed, now),
        }
    }

    pub fn advance(&mut self, frame_ms: f64) {
        self.garden.advance(frame_ms.max(0.0) as u64);
    }

    pub fn feed(&mut self) -> bool {
        self.garden.feed().is_some()
    }

    #[wasm_bindgen(js_name = placeDecoration)]
    pub fn place_decoration(&mut self, kind: &str) -> bool {
        match DecorationKind::from_str(kind) {
            Some(kind) => self.garden.place_decoration(kind).is_some(),
            None => {
                log::warn!("Unknown decoration: {}", kind);
                false
            }
        }
    }

    /// Returns the coin value picked up, or 0
    pub fn click(&mut self, x: f32, y: f32) -> f64 {
        match self.garden.click(Vec2::new(x, y)) {
            ClickOutcome::Coin(value) => value as f64,
            _ => 0.0,
        }
    }

    #[wasm_bindgen(js_name = dragDecoration)]
    pub fn drag_decoration(&mut self, id: u32, x: f32, y: f32) -> bool {
        self.garden.drag_decoration(id, Vec2::new(x, y)).is_some()
    }

    #[wasm_bindgen(js_name = dragFood)]
    pub fn drag_food(&mut self, id: u32, x: f32, y: f32) -> bool {
        self.garden.drag_food(id, Vec2::new(x, y)).is_some()
    }

    pub fn adopt(&mut self, id: u32) -> bool {
        self.garden.adopt(id)
    }

    #[wasm_bindgen(js_name = resetCollection)]
    pub fn reset_collection(&mut self) {
        self.garden.reset_collection();
    }

    pub fn save(&mut self) {
        self.garden.save();
    }

    pub fn coins(&self) -> f64 {
        self.garden.coins() as f64
    }

    /// Pending notifications as a JSON array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> String {
        let events = self.garden.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    /// Current scene for the renderer as JSON
    #[wasm_bindgen(js_name = sceneJson)]
    pub fn scene_json(&self) -> String {
        let state = self.garden.state();
        let view = SceneView {
            coins: state.coins(),
            creatures: state
                .creatures
                .iter()
                .map(|c| CreatureView {
                    id: c.id,
                    name: &c.name,
                    species: &c.species.name,
                    color: c.species.color,
                    x: c.pos.x,
                    y: c.pos.y,
                    scale: c.scale,
                    happiness: c.happiness,
                    behavior: c.behavior.as_str(),
                    interactive: c.is_interactive(),
                    returning: c.is_returning_friend,
                })
                .collect(),
            decorations: state.decorations.iter().collect(),
            food: &state.food,
            coins_on_ground: &state.coin_drops,
        };
        serde_json::to_string(&view).unwrap_or_else(|_| "{}".to_string())
    }

    /// The collection map as JSON
    #[wasm_bindgen(js_name = collectionJson)]
    pub fn collection_json(&self) -> String {
        serde_json::to_string(&self.garden.state().collection).unwrap_or_else(|_| "{}".to_string())
    }

    /// The "while you were away" report (once), or undefined
    #[wasm_bindgen(js_name = takeOfflineReport)]
    pub fn take_offline_report(&mut self) -> Option<String> {
        let report = self.garden.take_offline_report()?;
        serde_json::to_string(&report).ok()
    }
}
