//! Save/load persistence
//!
//! Features:
//! - Pluggable key/value store (LocalStorage in the browser, in-memory elsewhere)
//! - JSON collection map and game-state snapshot
//! - Offline progress reconstruction from the last snapshot

pub mod offline;
pub mod snapshot;
pub mod store;

pub use offline::{OfflineReport, calculate_offline_progress, check_offline_progress};
pub use snapshot::{GameSnapshot, SavedBlob};
pub use store::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use store::LocalStorage;

/// Storage key for the collection map
pub const COLLECTION_KEY: &str = "blobGardenCollection";
/// Storage key for the game-state snapshot
pub const GAME_STATE_KEY: &str = "blobGardenGameState";
