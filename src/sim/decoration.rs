//! Placed decorations and who is sitting on them

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::creature::CreatureId;

/// Stable per-session decoration identifier
pub type DecorationId = u32;

/// Decoration types across editions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecorationKind {
    Rock,
    Water,
    Mushroom,
    Stump,
    BouncePad,
    Plant,
}

impl DecorationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecorationKind::Rock => "rock",
            DecorationKind::Water => "water",
            DecorationKind::Mushroom => "mushroom",
            DecorationKind::Stump => "stump",
            DecorationKind::BouncePad => "bouncePad",
            DecorationKind::Plant => "plant",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rock" => Some(DecorationKind::Rock),
            "water" => Some(DecorationKind::Water),
            "mushroom" => Some(DecorationKind::Mushroom),
            "stump" => Some(DecorationKind::Stump),
            "bouncepad" | "bounce_pad" | "pad" => Some(DecorationKind::BouncePad),
            "plant" => Some(DecorationKind::Plant),
            _ => None,
        }
    }
}

/// A purchased decoration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub id: DecorationId,
    pub kind: DecorationKind,
    pub pos: Vec2,
    /// Price paid at placement
    pub cost: u64,
}

/// All placed decorations plus an explicit occupancy map
///
/// A decoration is claimed when a blob commits to jumping onto it and
/// released when the blob starts jumping off, so two blobs never share one.
#[derive(Debug, Clone, Default)]
pub struct DecorationRegistry {
    /// Sorted by id (ids are allocated increasing)
    decorations: Vec<Decoration>,
    occupants: BTreeMap<DecorationId, CreatureId>,
}

impl DecorationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, decoration: Decoration) {
        self.decorations.push(decoration);
        self.decorations.sort_by_key(|d| d.id);
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    pub fn get(&self, id: DecorationId) -> Option<&Decoration> {
        self.decorations.iter().find(|d| d.id == id)
    }

    /// Move a decoration; returns the displacement so anchored blobs can follow
    pub fn move_to(&mut self, id: DecorationId, pos: Vec2) -> Option<Vec2> {
        let deco = self.decorations.iter_mut().find(|d| d.id == id)?;
        let delta = pos - deco.pos;
        deco.pos = pos;
        Some(delta)
    }

    /// Nearest unclaimed decoration of `kind` strictly within `max_distance`
    pub fn nearest_free(
        &self,
        kind: DecorationKind,
        from: Vec2,
        max_distance: f32,
    ) -> Option<&Decoration> {
        self.decorations
            .iter()
            .filter(|d| d.kind == kind && !self.occupants.contains_key(&d.id))
            .map(|d| (d, d.pos.distance(from)))
            .filter(|(_, dist)| *dist < max_distance)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(d, _)| d)
    }

    /// Decorations of any kind within `radius` of `pos`
    pub fn within(&self, pos: Vec2, radius: f32) -> impl Iterator<Item = &Decoration> {
        self.decorations
            .iter()
            .filter(move |d| d.pos.distance(pos) < radius)
    }

    pub fn occupant(&self, id: DecorationId) -> Option<CreatureId> {
        self.occupants.get(&id).copied()
    }

    pub fn is_occupied(&self, id: DecorationId) -> bool {
        self.occupants.contains_key(&id)
    }

    /// Reserve a decoration for `creature`; fails if someone else holds it
    pub fn claim(&mut self, id: DecorationId, creature: CreatureId) -> bool {
        match self.occupants.get(&id) {
            Some(holder) => *holder == creature,
            None => {
                self.occupants.insert(id, creature);
                true
            }
        }
    }

    /// Give a decoration back; only the holder can release it
    pub fn release(&mut self, id: DecorationId, creature: CreatureId) {
        if self.occupants.get(&id) == Some(&creature) {
            self.occupants.remove(&id);
        }
    }
}
