//! The per-session bet ledger: open wagers keyed by bet type, plus the
//! come-point stakes that come/don't-come bets convert into.
//!
//! Both tables are ordered maps so every iteration (resolution, snapshots,
//! narrative) is ascending and reproducible.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::bets::BetType;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetLedger {
    bets: BTreeMap<BetType, u64>,
    come_points: BTreeMap<u8, u64>,
}

impl BetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new bet. At most one bet per type may be open at a time.
    pub fn open(&mut self, bet_type: BetType, amount: u64) -> Result<()> {
        if amount < super::MIN_BET_AMOUNT {
            return Err(Error::InvalidBet("bet amount must be positive".to_string()));
        }
        if self.bets.contains_key(&bet_type) {
            return Err(Error::DuplicateBet(bet_type.label().to_string()));
        }
        self.bets.insert(bet_type, amount);
        Ok(())
    }

    pub fn stake(&self, bet_type: BetType) -> Option<u64> {
        self.bets.get(&bet_type).copied()
    }

    pub fn contains(&self, bet_type: BetType) -> bool {
        self.bets.contains_key(&bet_type)
    }

    /// Remove a bet, returning its stake
    pub fn remove(&mut self, bet_type: BetType) -> Option<u64> {
        self.bets.remove(&bet_type)
    }

    /// Open bets in ascending bet-type order
    pub fn bets(&self) -> impl Iterator<Item = (BetType, u64)> + '_ {
        self.bets.iter().map(|(&bet, &amount)| (bet, amount))
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty() && self.come_points.is_empty()
    }

    /// Add to the stake riding on a come point (established or topped up)
    pub fn add_come_point(&mut self, point: u8, amount: u64) {
        *self.come_points.entry(point).or_insert(0) += amount;
    }

    pub fn come_point(&self, point: u8) -> Option<u64> {
        self.come_points.get(&point).copied()
    }

    /// Clear one come point, returning its stake
    pub fn take_come_point(&mut self, point: u8) -> Option<u64> {
        self.come_points.remove(&point)
    }

    /// Open come points in ascending point order
    pub fn come_points(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.come_points.iter().map(|(&point, &amount)| (point, amount))
    }

    /// Every chip currently committed to the table
    pub fn total_committed(&self) -> u64 {
        self.bets.values().sum::<u64>() + self.come_points.values().sum::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_duplicate() {
        let mut ledger = BetLedger::new();
        ledger.open(BetType::Field, 100).unwrap();
        assert_eq!(ledger.stake(BetType::Field), Some(100));

        let err = ledger.open(BetType::Field, 50).unwrap_err();
        assert_eq!(err.to_string(), "already have bet on Field");
        // rejected open leaves the original stake untouched
        assert_eq!(ledger.stake(BetType::Field), Some(100));

        assert!(ledger.open(BetType::Hard6, 0).is_err());
    }

    #[test]
    fn test_committed_total() {
        let mut ledger = BetLedger::new();
        ledger.open(BetType::PassLine, 500).unwrap();
        ledger.open(BetType::Hard8, 200).unwrap();
        ledger.add_come_point(6, 300);
        ledger.add_come_point(6, 100);
        assert_eq!(ledger.total_committed(), 1_100);
        assert_eq!(ledger.come_point(6), Some(400));

        assert_eq!(ledger.remove(BetType::Hard8), Some(200));
        assert_eq!(ledger.take_come_point(6), Some(400));
        assert_eq!(ledger.total_committed(), 500);
    }

    #[test]
    fn test_iteration_order_ascending() {
        let mut ledger = BetLedger::new();
        ledger.add_come_point(9, 10);
        ledger.add_come_point(4, 10);
        ledger.add_come_point(6, 10);
        let points: Vec<u8> = ledger.come_points().map(|(p, _)| p).collect();
        assert_eq!(points, vec![4, 6, 9]);
    }
}
