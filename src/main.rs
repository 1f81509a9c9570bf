//! Blob Garden entry point
//!
//! The browser build is driven from JavaScript through `blob_garden::web`.
//! Natively this runs a headless session and prints what happened.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use blob_garden::persistence::MemoryStore;
    use blob_garden::sim::{ClickOutcome, DecorationKind};
    use blob_garden::{Edition, Garden, GardenConfig};

    env_logger::init();

    let edition = std::env::args()
        .nth(1)
        .and_then(|s| Edition::from_str(&s))
        .unwrap_or_default();
    let minutes: u64 = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    log::info!("Blob Garden ({}) headless run, {} minutes", edition.as_str(), minutes);

    let config = GardenConfig::from_edition(edition);
    let shop: Vec<DecorationKind> = config.catalog.iter().map(|e| e.kind).collect();
    let mut garden = Garden::open(config, MemoryStore::new(), 42, 0);

    // Spend the starting coins on a few decorations and a snack
    for kind in shop.iter().take(3) {
        garden.place_decoration(*kind);
    }
    garden.feed();

    let mut coins_picked = 0;
    for _ in 0..minutes * 60 {
        garden.run_for(1_000);

        // Pick up any coins lying around
        let drops: Vec<_> = garden.state().coin_drops.iter().map(|c| c.pos).collect();
        for pos in drops {
            if let ClickOutcome::Coin(value) = garden.click(pos) {
                coins_picked += value;
            }
        }
        garden.drain_events();
    }

    let state = garden.state();
    println!("\n=== {} minutes in the {} garden ===", minutes, edition.as_str());
    println!("Coins: {} ({} picked up by hand)", state.coins(), coins_picked);
    println!("Decorations: {}", state.decorations.len());
    println!("Blobs:");
    for blob in &state.creatures {
        println!(
            "  {:<10} {:<14} {:<9} {:<8} happiness {:>5.1}  {}",
            blob.name,
            blob.species.name,
            blob.rarity().as_str(),
            blob.personality.as_str(),
            blob.happiness,
            blob.behavior.as_str()
        );
    }
    println!("Collection: {} entries", state.collection.len());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is blob_garden::web::start, this is just to satisfy the compiler
}
