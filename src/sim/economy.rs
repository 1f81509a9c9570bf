//! Currency ledger, coin drops and food

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The player's coin balance
///
/// Never negative: a purchase the balance can't cover is simply not made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ledger {
    balance: u64,
}

impl Ledger {
    pub fn new(balance: u64) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Whether `amount` could be spent right now
    pub fn can_afford(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    /// Debit `amount`; returns false (and changes nothing) if funds are short
    pub fn spend(&mut self, amount: u64) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.balance -= amount;
        true
    }

    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }
}

/// A coin lying on the grass, waiting to be clicked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDrop {
    pub id: u32,
    pub pos: Vec2,
    pub value: u64,
    pub collected: bool,
}

/// A bug the player put down for the blobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: u32,
    pub pos: Vec2,
    pub eaten: bool,
}

/// Pick up the newest uncollected coin within `radius` of `click`
///
/// The coin is removed from `drops` and returned so its value can be credited.
pub fn collect_coin_at(drops: &mut Vec<CoinDrop>, click: Vec2, radius: f32) -> Option<CoinDrop> {
    let index = drops
        .iter()
        .rposition(|c| !c.collected && c.pos.distance(click) < radius)?;
    let mut coin = drops.remove(index);
    coin.collected = true;
    Some(coin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_spend_and_credit() {
        let mut ledger = Ledger::new(100);
        assert!(ledger.spend(35));
        assert_eq!(ledger.balance(), 65);
        assert!(!ledger.spend(66));
        assert_eq!(ledger.balance(), 65);
        ledger.credit(5);
        assert_eq!(ledger.balance(), 70);
        assert!(ledger.spend(70));
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_collect_coin_at() {
        let mut drops: Vec<CoinDrop> = [(1, 0.0, 5), (2, 10.0, 9), (3, 500.0, 15)]
            .into_iter()
            .map(|(id, x, value)| CoinDrop {
                id,
                pos: Vec2::new(x, 0.0),
                value,
                collected: false,
            })
            .collect();

        // Both 1 and 2 are in range; the newest wins
        let coin = collect_coin_at(&mut drops, Vec2::new(5.0, 0.0), 40.0).unwrap();
        assert_eq!(coin.id, 2);
        assert!(coin.collected);
        assert_eq!(drops.len(), 2);

        assert!(collect_coin_at(&mut drops, Vec2::new(250.0, 0.0), 40.0).is_none());
        assert_eq!(drops.len(), 2);
    }

    proptest! {
        #[test]
        fn ledger_tracks_successful_ops(
            start in 0u64..500,
            ops in proptest::collection::vec((any::<bool>(), 0u64..80), 0..50)
        ) {
            let mut ledger = Ledger::new(start);
            let mut expected = start as i64;
            for (is_spend, amount) in ops {
                if is_spend {
                    let ok = ledger.spend(amount);
                    prop_assert_eq!(ok, expected >= amount as i64);
                    if ok {
                        expected -= amount as i64;
                    }
                } else {
                    ledger.credit(amount);
                    expected += amount as i64;
                }
                prop_assert!(expected >= 0);
                prop_assert_eq!(ledger.balance() as i64, expected);
            }
        }
    }
}
