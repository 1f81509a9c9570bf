//! Offline progress
//!
//! When the player comes back after a while, replay what their blobs did in
//! the meantime: happiness drains at a per-personality hourly rate, happy blobs
//! keep earning at an hourly rate, and the player gets a short report.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use super::snapshot::{GameSnapshot, SavedBlob};
use crate::consts::{LOW_HAPPINESS, OFFLINE_CAP_HOURS, OFFLINE_THRESHOLD_MS};
use crate::sim::creature::Personality;

const MS_PER_HOUR: f64 = 60.0 * 60.0 * 1_000.0;
/// Saved happiness needed to earn anything while away
const EARNING_HAPPINESS: f64 = 40.0;
/// Saved happiness needed to get a flavor event
const EVENT_HAPPINESS: f64 = 70.0;
/// Used when a save doesn't know the blob's personality
const FALLBACK_DECAY_PER_HOUR: f64 = 3.0;

/// What happened while the player was away
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineReport {
    pub coins_earned: u64,
    pub events: Vec<String>,
    pub warnings: Vec<String>,
    /// Simulated hours (capped), rounded to one decimal
    pub offline_hours: f64,
}

impl OfflineReport {
    /// Worth interrupting the player for
    pub fn is_noteworthy(&self) -> bool {
        self.coins_earned > 0 || !self.events.is_empty()
    }
}

/// Coins per hour for an average happiness over the absence
pub fn hourly_coin_rate(average_happiness: f64) -> u64 {
    if average_happiness >= 90.0 {
        4
    } else if average_happiness >= 70.0 {
        2
    } else if average_happiness >= 40.0 {
        1
    } else {
        0
    }
}

fn decay_per_hour(personality: Option<Personality>) -> f64 {
    personality
        .map(|p| p.offline_decay_per_hour())
        .unwrap_or(FALLBACK_DECAY_PER_HOUR)
}

/// Happiness after `hours` away
pub fn reconstructed_happiness(blob: &SavedBlob, hours: f64) -> f64 {
    (blob.happiness as f64 - decay_per_hour(blob.personality) * hours).max(0.0)
}

fn flavor_lines(personality: Personality) -> [&'static str; 3] {
    match personality {
        Personality::Sleepy => [
            "slept peacefully on the rock!",
            "had sweet dreams in the garden!",
            "rested comfortably and feels refreshed!",
        ],
        Personality::Playful => [
            "bounced happily on the bounce pad!",
            "played joyfully around the garden!",
            "had fun exploring every corner!",
        ],
        Personality::Shy => [
            "found comfort near the glowing mushroom!",
            "quietly enjoyed the peaceful garden!",
            "felt safe and content in their favorite spot!",
        ],
        Personality::Curious => [
            "splashed playfully in the water!",
            "discovered something interesting!",
            "explored the garden with wonder!",
        ],
        Personality::Social => [
            "gathered with friends near the stump!",
            "enjoyed socializing with other blobs!",
            "made new friends in the garden!",
        ],
    }
}

fn positive_event<R: Rng + ?Sized>(blob: &SavedBlob, rng: &mut R) -> String {
    let lines = flavor_lines(blob.personality.unwrap_or(Personality::Curious));
    let line = lines.choose(rng).copied().unwrap_or(lines[0]);
    format!("{} {}", blob.name, line)
}

/// Replay `offline_ms` of absence over the blobs in `snapshot`
pub fn calculate_offline_progress<R: Rng + ?Sized>(
    snapshot: &GameSnapshot,
    offline_ms: u64,
    rng: &mut R,
) -> OfflineReport {
    let hours = (offline_ms as f64 / MS_PER_HOUR).min(OFFLINE_CAP_HOURS);
    let mut report = OfflineReport {
        coins_earned: 0,
        events: Vec::new(),
        warnings: Vec::new(),
        offline_hours: (hours * 10.0).round() / 10.0,
    };

    for blob in &snapshot.blobs {
        let saved = blob.happiness as f64;
        let now = reconstructed_happiness(blob, hours);

        if saved >= EARNING_HAPPINESS {
            let average = (saved + now) / 2.0;
            report.coins_earned += (hourly_coin_rate(average) as f64 * hours).floor() as u64;

            if saved >= EVENT_HAPPINESS {
                report.events.push(positive_event(blob, rng));
            }
        }

        if now < LOW_HAPPINESS as f64 {
            report
                .warnings
                .push(format!("{} became unhappy and needs attention!", blob.name));
        }
    }

    report
}

/// Report on the absence since the snapshot, if it was long and eventful enough
pub fn check_offline_progress<R: Rng + ?Sized>(
    snapshot: &GameSnapshot,
    now_epoch_ms: u64,
    rng: &mut R,
) -> Option<OfflineReport> {
    let offline_ms = now_epoch_ms.saturating_sub(snapshot.last_save_time);
    if offline_ms <= OFFLINE_THRESHOLD_MS {
        return None;
    }
    let report = calculate_offline_progress(snapshot, offline_ms, rng);
    report.is_noteworthy().then_some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const HOUR_MS: u64 = 60 * 60 * 1_000;

    fn saved(name: &str, happiness: f32, personality: Personality) -> SavedBlob {
        SavedBlob {
            id: 1,
            name: name.to_string(),
            happiness,
            personality: Some(personality),
            rarity: None,
            last_fed: 0,
            first_visit: 0,
            total_visits: 1,
        }
    }

    fn snapshot(blobs: Vec<SavedBlob>) -> GameSnapshot {
        GameSnapshot {
            last_save_time: 0,
            coins: 0,
            blobs,
        }
    }

    #[test]
    fn test_curious_blob_three_hours() {
        let blob = saved("Ripple", 80.0, Personality::Curious);
        assert!((reconstructed_happiness(&blob, 3.0) - 69.5).abs() < 1e-9);

        let mut rng = Pcg32::seed_from_u64(1);
        let report = calculate_offline_progress(&snapshot(vec![blob]), 3 * HOUR_MS, &mut rng);
        // avg(80, 69.5) = 74.75 -> 2/hr for 3 hours
        assert_eq!(report.coins_earned, 6);
        assert_eq!(report.offline_hours, 3.0);
        assert_eq!(report.events.len(), 1);
        assert!(report.events[0].starts_with("Ripple "));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_capped_at_a_day() {
        let blob = saved("Giggle", 100.0, Personality::Sleepy);
        let mut rng = Pcg32::seed_from_u64(2);
        let report = calculate_offline_progress(&snapshot(vec![blob]), 72 * HOUR_MS, &mut rng);
        assert_eq!(report.offline_hours, 24.0);
        // 100 -> 52 over 24h, average 76 -> 2/hr
        assert_eq!(report.coins_earned, 48);
    }

    #[test]
    fn test_unhappy_blobs_earn_nothing_and_warn() {
        let blob = saved("Wobble", 30.0, Personality::Social);
        let mut rng = Pcg32::seed_from_u64(3);
        let report = calculate_offline_progress(&snapshot(vec![blob]), 2 * HOUR_MS, &mut rng);
        assert_eq!(report.coins_earned, 0);
        assert!(report.events.is_empty());
        assert_eq!(report.warnings, vec!["Wobble became unhappy and needs attention!".to_string()]);
        assert!(!report.is_noteworthy());
    }

    #[test]
    fn test_hours_rounded_to_one_decimal() {
        let mut rng = Pcg32::seed_from_u64(4);
        let report = calculate_offline_progress(&snapshot(vec![]), HOUR_MS + HOUR_MS / 7, &mut rng);
        assert_eq!(report.offline_hours, 1.1);
    }

    #[test]
    fn test_unknown_personality_uses_fallback_rate() {
        let mut blob = saved("Jelly", 60.0, Personality::Sleepy);
        blob.personality = None;
        assert!((reconstructed_happiness(&blob, 2.0) - 54.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_absence_is_ignored() {
        let snap = snapshot(vec![saved("Bubble", 95.0, Personality::Playful)]);
        let mut rng = Pcg32::seed_from_u64(5);
        assert!(check_offline_progress(&snap, OFFLINE_THRESHOLD_MS, &mut rng).is_none());
        let report = check_offline_progress(&snap, 2 * HOUR_MS, &mut rng).unwrap();
        assert!(report.coins_earned > 0);
    }

    #[test]
    fn test_coin_rate_tiers() {
        assert_eq!(hourly_coin_rate(90.0), 4);
        assert_eq!(hourly_coin_rate(89.9), 2);
        assert_eq!(hourly_coin_rate(70.0), 2);
        assert_eq!(hourly_coin_rate(40.0), 1);
        assert_eq!(hourly_coin_rate(39.9), 0);
    }
}
