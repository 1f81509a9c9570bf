//! Playfield geometry and placement
//!
//! Where blobs may stand, how to pull a stray point back onto the grass, and
//! how to find a spot that isn't already taken by another blob.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{FARTHEST_POSITION_TRIALS, OCCUPIED_DISTANCE};

/// Shape of the walkable region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Axis-aligned rectangle, clamped per axis
    Rectangle,
    /// Isometric diamond, clamped by scaling back toward the center
    Diamond,
}

/// Diamond clamps land slightly inside the edge so blobs don't sit on the rim
const DIAMOND_CLAMP_INSET: f32 = 0.9;
/// Rejection sampling budget for the diamond before falling back to center
const DIAMOND_SAMPLE_ATTEMPTS: u32 = 50;

/// The walkable part of the background
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub policy: BoundaryPolicy,
    pub center: Vec2,
    /// Full extent of the region positions are clamped into
    pub bounds_size: Vec2,
    /// Extent of the (smaller) region random ground positions are drawn from
    pub spawn_size: Vec2,
}

impl Playfield {
    /// Rectangular garden sized from the background image
    pub fn rectangle(background: Vec2) -> Self {
        Self {
            policy: BoundaryPolicy::Rectangle,
            center: Vec2::ZERO,
            bounds_size: background * 0.95,
            spawn_size: background * 0.4 * 0.8,
        }
    }

    /// Diamond platform around `center`
    pub fn diamond(center: Vec2, size: Vec2) -> Self {
        Self {
            policy: BoundaryPolicy::Diamond,
            center,
            bounds_size: size,
            spawn_size: size * 0.9,
        }
    }

    fn half_bounds(&self) -> Vec2 {
        self.bounds_size * 0.5
    }

    /// Sample a point uniformly from the spawn region (always succeeds)
    pub fn random_ground_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let sample = |rng: &mut R| {
            let jitter = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5);
            self.center + jitter * self.spawn_size
        };

        match self.policy {
            BoundaryPolicy::Rectangle => sample(rng),
            BoundaryPolicy::Diamond => {
                for _ in 0..DIAMOND_SAMPLE_ATTEMPTS {
                    let p = sample(rng);
                    if self.is_within_bounds(p) {
                        return p;
                    }
                }
                self.center
            }
        }
    }

    /// Whether `p` lies on the walkable region
    pub fn is_within_bounds(&self, p: Vec2) -> bool {
        let d = (p - self.center).abs();
        let half = self.half_bounds();
        match self.policy {
            BoundaryPolicy::Rectangle => d.x <= half.x && d.y <= half.y,
            BoundaryPolicy::Diamond => d.x / half.x + d.y / half.y <= 1.0,
        }
    }

    /// Project an out-of-bounds point back onto the walkable region
    pub fn clamp_to_bounds(&self, p: Vec2) -> Vec2 {
        if self.is_within_bounds(p) {
            return p;
        }
        let half = self.half_bounds();
        match self.policy {
            BoundaryPolicy::Rectangle => p.clamp(self.center - half, self.center + half),
            BoundaryPolicy::Diamond => {
                let d = p - self.center;
                let extent = d.x.abs() / half.x + d.y.abs() / half.y;
                let scale = (1.0 / extent).min(1.0);
                self.center + d * scale * DIAMOND_CLAMP_INSET
            }
        }
    }
}

/// True if any of `others` stands within `min_distance` of `p`
pub fn is_occupied(p: Vec2, others: &[Vec2], min_distance: f32) -> bool {
    others.iter().any(|o| o.distance(p) < min_distance)
}

/// Find a ground position away from `others`
///
/// Resamples up to `max_attempts` times; if every sample is crowded, falls
/// back to [`find_farthest_position`]. Always returns a point.
pub fn find_safe_position<R: Rng + ?Sized>(
    field: &Playfield,
    others: &[Vec2],
    max_attempts: u32,
    rng: &mut R,
) -> Vec2 {
    for _ in 0..max_attempts {
        let p = field.random_ground_position(rng);
        if !is_occupied(p, others, OCCUPIED_DISTANCE) {
            return p;
        }
    }
    find_farthest_position(field, others, rng)
}

/// Greedy best-of-N: the sample whose nearest neighbour is farthest away
pub fn find_farthest_position<R: Rng + ?Sized>(
    field: &Playfield,
    others: &[Vec2],
    rng: &mut R,
) -> Vec2 {
    let mut best = field.random_ground_position(rng);
    let mut best_clearance = 0.0_f32;

    for _ in 0..FARTHEST_POSITION_TRIALS {
        let candidate = field.random_ground_position(rng);
        let clearance = others
            .iter()
            .map(|o| o.distance(candidate))
            .fold(f32::INFINITY, f32::min);
        if clearance > best_clearance {
            best_clearance = clearance;
            best = candidate;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SAFE_POSITION_ATTEMPTS;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn garden_field() -> Playfield {
        Playfield::rectangle(Vec2::new(800.0, 600.0))
    }

    fn classic_field() -> Playfield {
        Playfield::diamond(Vec2::new(400.0, 350.0), Vec2::new(750.0, 400.0))
    }

    #[test]
    fn test_rectangle_bounds() {
        let field = garden_field();
        assert!(field.is_within_bounds(Vec2::ZERO));
        assert!(field.is_within_bounds(Vec2::new(380.0, 285.0)));
        assert!(!field.is_within_bounds(Vec2::new(381.0, 0.0)));

        let clamped = field.clamp_to_bounds(Vec2::new(1000.0, -1000.0));
        assert_eq!(clamped, Vec2::new(380.0, -285.0));
    }

    #[test]
    fn test_diamond_bounds() {
        let field = classic_field();
        assert!(field.is_within_bounds(Vec2::new(400.0, 350.0)));
        // Corner of the bounding box is outside the diamond
        assert!(!field.is_within_bounds(Vec2::new(770.0, 545.0)));

        let clamped = field.clamp_to_bounds(Vec2::new(1200.0, 350.0));
        assert!(field.is_within_bounds(clamped));
        // Scaled back along the ray from center, with the inset
        assert!((clamped.y - 350.0).abs() < 1e-3);
        assert!((clamped.x - (400.0 + 375.0 * 0.9)).abs() < 1e-2);
    }

    #[test]
    fn test_random_ground_positions_stay_in_spawn_region() {
        let mut rng = Pcg32::seed_from_u64(7);
        for field in [garden_field(), classic_field()] {
            for _ in 0..500 {
                let p = field.random_ground_position(&mut rng);
                let d = (p - field.center).abs();
                assert!(d.x <= field.spawn_size.x * 0.5 + 1e-3);
                assert!(d.y <= field.spawn_size.y * 0.5 + 1e-3);
                assert!(field.is_within_bounds(p));
            }
        }
    }

    #[test]
    fn test_is_occupied() {
        let others = [Vec2::new(0.0, 0.0), Vec2::new(200.0, 0.0)];
        assert!(is_occupied(Vec2::new(30.0, 0.0), &others, 60.0));
        assert!(!is_occupied(Vec2::new(100.0, 0.0), &others, 60.0));
        assert!(!is_occupied(Vec2::new(100.0, 0.0), &[], 60.0));
    }

    #[test]
    fn test_find_safe_position_avoids_neighbours() {
        let field = garden_field();
        let mut rng = Pcg32::seed_from_u64(42);
        let others = [Vec2::new(0.0, 0.0), Vec2::new(-80.0, 40.0)];
        for _ in 0..50 {
            let p = find_safe_position(&field, &others, SAFE_POSITION_ATTEMPTS, &mut rng);
            assert!(!is_occupied(p, &others, OCCUPIED_DISTANCE));
        }
    }

    #[test]
    fn test_find_safe_position_is_deterministic() {
        let field = garden_field();
        let others = [Vec2::new(10.0, 10.0)];
        let a = find_safe_position(&field, &others, 20, &mut Pcg32::seed_from_u64(5));
        let b = find_safe_position(&field, &others, 20, &mut Pcg32::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_find_safe_position_falls_back_when_crowded() {
        // Tiny spawn region completely covered by one blob
        let mut field = garden_field();
        field.spawn_size = Vec2::new(10.0, 10.0);
        let others = [Vec2::ZERO];
        let mut rng = Pcg32::seed_from_u64(3);
        let p = find_safe_position(&field, &others, SAFE_POSITION_ATTEMPTS, &mut rng);
        // Still returns a point on the ground
        assert!(field.is_within_bounds(p));
        assert!(p.distance(Vec2::ZERO) < OCCUPIED_DISTANCE);
    }

    proptest! {
        #[test]
        fn clamp_always_lands_in_bounds(x in -5000.0f32..5000.0, y in -5000.0f32..5000.0) {
            for field in [garden_field(), classic_field()] {
                let clamped = field.clamp_to_bounds(Vec2::new(x, y));
                prop_assert!(field.is_within_bounds(clamped));
            }
        }

        #[test]
        fn clamp_is_identity_inside(x in -300.0f32..300.0, y in -200.0f32..200.0) {
            let field = garden_field();
            let p = Vec2::new(x, y);
            prop_assert_eq!(field.clamp_to_bounds(p), p);
        }
    }
}
