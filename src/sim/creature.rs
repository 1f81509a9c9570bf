//! Creatures ("blobs") and their happiness model

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::decoration::{DecorationId, DecorationKind};
use super::schedule::TimerId;
use crate::consts::*;

/// Stable per-session creature identifier
pub type CreatureId = u32;

/// Spawn tier; rarer blobs earn more
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Legendary,
    ];

    /// Roll a rarity: 60% common, 25% uncommon, 12% rare, 3% legendary
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_roll(rng.random::<f32>())
    }

    /// Map a uniform sample in [0, 1) onto a tier
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.60 {
            Rarity::Common
        } else if roll < 0.85 {
            Rarity::Uncommon
        } else if roll < 0.97 {
            Rarity::Rare
        } else {
            Rarity::Legendary
        }
    }

    /// Passive income multiplier
    pub fn coin_multiplier(&self) -> f32 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.2,
            Rarity::Rare => 1.5,
            Rarity::Legendary => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        }
    }
}

/// Temperament; decides favourite decorations and how fast a blob gets lonely offline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Sleepy,
    Playful,
    Shy,
    Curious,
    Social,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Sleepy,
        Personality::Playful,
        Personality::Shy,
        Personality::Curious,
        Personality::Social,
    ];

    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Decoration this personality enjoys standing near, and the per-tick gain
    pub fn preference(&self) -> (DecorationKind, f32) {
        match self {
            Personality::Sleepy => (DecorationKind::Rock, 0.10),
            Personality::Playful => (DecorationKind::BouncePad, 0.15),
            Personality::Shy => (DecorationKind::Mushroom, 0.12),
            Personality::Curious => (DecorationKind::Water, 0.10),
            Personality::Social => (DecorationKind::Stump, 0.12),
        }
    }

    /// Happiness lost per hour while the player is away
    pub fn offline_decay_per_hour(&self) -> f64 {
        match self {
            Personality::Sleepy => 2.0,
            Personality::Playful => 4.0,
            Personality::Shy => 3.0,
            Personality::Curious => 3.5,
            Personality::Social => 4.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Sleepy => "sleepy",
            Personality::Playful => "playful",
            Personality::Shy => "shy",
            Personality::Curious => "curious",
            Personality::Social => "social",
        }
    }
}

/// A kind of blob that can show up in the garden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    /// Display name, also the first half of the collection key
    pub name: String,
    pub rarity: Rarity,
    /// 0xRRGGBB tint for the renderer
    pub color: u32,
}

impl Species {
    pub fn new(name: &str, rarity: Rarity, color: u32) -> Self {
        Self {
            name: name.to_string(),
            rarity,
            color,
        }
    }
}

/// Pick a species for a freshly rolled rarity
///
/// Falls back to the whole table when no species has that rarity.
pub fn choose_species<'a, R: Rng + ?Sized>(
    species: &'a [Species],
    rarity: Rarity,
    rng: &mut R,
) -> Option<&'a Species> {
    let matching: Vec<&Species> = species.iter().filter(|s| s.rarity == rarity).collect();
    match matching.choose(rng) {
        Some(s) => Some(*s),
        None => species.choose(rng),
    }
}

/// Special interaction a blob can have with a decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    /// Sleep on a rock
    Sleep,
    /// Dance on a stump
    Dance,
    /// Bounce on a bounce pad
    Bounce,
}

impl Interaction {
    /// Decoration this interaction attaches to
    pub fn decoration(&self) -> DecorationKind {
        match self {
            Interaction::Sleep => DecorationKind::Rock,
            Interaction::Dance => DecorationKind::Stump,
            Interaction::Bounce => DecorationKind::BouncePad,
        }
    }

    /// Where the blob sits relative to the decoration while dwelling
    pub fn perch_offset(&self) -> Vec2 {
        match self {
            Interaction::Sleep => Vec2::new(0.0, -15.0),
            Interaction::Dance => Vec2::new(0.0, -20.0),
            Interaction::Bounce => Vec2::new(0.0, -10.0),
        }
    }
}

/// What a creature is doing right now
///
/// Exactly one of: `wandering`, `jumping_to_<deco>`, the dwell state
/// (`sleeping`/`dancing`/`bouncing`), or `jumping_off_<deco>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Wandering,
    JumpingTo(Interaction),
    Dwelling(Interaction),
    JumpingOff(Interaction),
}

impl Behavior {
    /// Dwell states are not re-evaluated; their timer governs the exit
    pub fn is_dwelling(&self) -> bool {
        matches!(self, Behavior::Dwelling(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Wandering => "wandering",
            Behavior::JumpingTo(Interaction::Sleep) => "jumping_to_rock",
            Behavior::JumpingTo(Interaction::Dance) => "jumping_to_stump",
            Behavior::JumpingTo(Interaction::Bounce) => "jumping_to_bouncepad",
            Behavior::Dwelling(Interaction::Sleep) => "sleeping",
            Behavior::Dwelling(Interaction::Dance) => "dancing",
            Behavior::Dwelling(Interaction::Bounce) => "bouncing",
            Behavior::JumpingOff(Interaction::Sleep) => "jumping_off_rock",
            Behavior::JumpingOff(Interaction::Dance) => "jumping_off_stump",
            Behavior::JumpingOff(Interaction::Bounce) => "jumping_off_bouncepad",
        }
    }
}

/// Why a creature is currently in motion; decides what happens on arrival
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionPurpose {
    /// Ordinary stroll toward a safe target
    Wander,
    /// Being pushed apart from a neighbour
    Separate,
    /// First half of a jump onto a decoration
    JumpUp(DecorationId),
    /// Second half, landing on the decoration
    JumpLand(DecorationId),
    /// First half of a jump off, toward the apex
    LeapOff(Vec2),
    /// Second half, landing on the ground
    Touchdown,
}

/// Interpolation curve for a motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    SineInOut,
    QuadOut,
    QuadIn,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadIn => t * t,
        }
    }
}

/// An in-flight move, advanced by the fixed step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub from: Vec2,
    pub to: Vec2,
    pub elapsed_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
    pub purpose: MotionPurpose,
}

impl Motion {
    pub fn new(
        from: Vec2,
        to: Vec2,
        duration_ms: u64,
        easing: Easing,
        purpose: MotionPurpose,
    ) -> Self {
        Self {
            from,
            to,
            elapsed_ms: 0,
            duration_ms: duration_ms.max(1),
            easing,
            purpose,
        }
    }

    /// Advance by `dt_ms`; returns the new position and whether the move finished
    pub fn advance(&mut self, dt_ms: u64) -> (Vec2, bool) {
        self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms);
        let t = self.elapsed_ms as f32 / self.duration_ms as f32;
        let done = self.elapsed_ms >= self.duration_ms;
        let pos = if done {
            self.to
        } else {
            self.from.lerp(self.to, self.easing.apply(t))
        };
        (pos, done)
    }
}

/// A blob living in the garden
#[derive(Debug, Clone)]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    pub species: Species,
    pub personality: Personality,
    pub pos: Vec2,
    pub target: Vec2,
    /// Travel speed factor (0.8 - 1.2)
    pub speed: f32,
    /// 0 - 100
    pub happiness: f32,
    /// Wall-clock ms of the last meal
    pub last_fed: u64,
    /// Wall-clock ms this blob first showed up
    pub first_visit: u64,
    pub total_visits: u32,
    pub is_returning_friend: bool,
    pub behavior: Behavior,
    /// Visual size; no effect on the simulation
    pub scale: f32,
    /// Decoration this blob is dwelling on (set exactly while dwelling)
    pub anchor: Option<DecorationId>,
    pub motion: Option<Motion>,
    /// Pending "decide what to do next" timer
    pub resume_timer: Option<TimerId>,
    /// Pending dwell-expiry timer
    pub dwell_timer: Option<TimerId>,
}

impl Creature {
    /// Roll a new blob of `species` standing at `pos`
    pub fn spawn<R: Rng + ?Sized>(
        id: CreatureId,
        species: Species,
        name: String,
        pos: Vec2,
        now_epoch_ms: u64,
        rng: &mut R,
    ) -> Self {
        Self {
            id,
            name,
            species,
            personality: Personality::roll(rng),
            pos,
            target: pos,
            speed: rng.random_range(0.8..1.2),
            happiness: rng.random_range(20.0..50.0),
            last_fed: now_epoch_ms,
            first_visit: now_epoch_ms,
            total_visits: 1,
            is_returning_friend: false,
            behavior: Behavior::Wandering,
            scale: rng.random_range(0.8..1.2),
            anchor: None,
            motion: None,
            resume_timer: None,
            dwell_timer: None,
        }
    }

    /// Collection identity: species name + blob name
    pub fn collection_key(&self) -> String {
        format!("{}_{}", self.species.name, self.name)
    }

    pub fn rarity(&self) -> Rarity {
        self.species.rarity
    }

    /// Dwelling blobs let clicks fall through to their decoration
    pub fn is_interactive(&self) -> bool {
        !self.behavior.is_dwelling()
    }

    /// Add (or remove, if negative) happiness, keeping it within 0..=100
    pub fn adjust_happiness(&mut self, delta: f32) {
        self.happiness = (self.happiness + delta).clamp(0.0, MAX_HAPPINESS);
    }

    /// Per-tick decay; hungrier blobs lose happiness faster
    pub fn decay_rate(&self, now_epoch_ms: u64) -> f32 {
        let hungry_for = now_epoch_ms.saturating_sub(self.last_fed);
        if hungry_for > STARVING_AFTER_MS {
            DECAY_STARVING
        } else if hungry_for > HUNGRY_AFTER_MS {
            DECAY_HUNGRY
        } else {
            DECAY_BASE
        }
    }

    /// Apply one happiness tick of decay
    pub fn decay(&mut self, now_epoch_ms: u64) {
        let rate = self.decay_rate(now_epoch_ms);
        self.adjust_happiness(-rate);
    }

    /// Eat a food item
    pub fn feed(&mut self, now_epoch_ms: u64) {
        self.adjust_happiness(FEED_HAPPINESS);
        self.last_fed = now_epoch_ms;
    }
}

/// Coins a blob generates per income tick, before the rarity multiplier
pub fn base_coins(happiness: f32) -> u64 {
    if happiness > 90.0 {
        3
    } else if happiness > 70.0 {
        2
    } else if happiness > 40.0 {
        1
    } else {
        0
    }
}

/// Coins per income tick after the rarity multiplier (rounded up)
pub fn passive_coins(happiness: f32, rarity: Rarity) -> u64 {
    let base = base_coins(happiness);
    if base == 0 {
        return 0;
    }
    (base as f32 * rarity.coin_multiplier()).ceil() as u64
}
