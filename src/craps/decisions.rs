//! Keep/take-down decision registry.
//!
//! When a persistent bet (place or hardway) wins, the winnings are paid
//! immediately but the stake stays on the table until the player chooses to
//! keep it up or take it down. Entries live here between the winning roll
//! and that choice; force-settling the session discards them with no
//! further effect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::bets::BetType;
use super::ledger::BetLedger;

/// Player's answer to a winning persistent bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Leave the stake on the table for future rolls
    Keep,
    /// Remove the stake from the table and return it to the player
    TakeDown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingDecisions {
    pending: BTreeMap<BetType, u64>,
}

impl PendingDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, bet_type: BetType, winnings: u64) {
        self.pending.insert(bet_type, winnings);
    }

    pub fn extend(&mut self, wins: BTreeMap<BetType, u64>) {
        self.pending.extend(wins);
    }

    pub fn winnings(&self, bet_type: BetType) -> Option<u64> {
        self.pending.get(&bet_type).copied()
    }

    /// Consume the entry for a decided bet
    pub fn take(&mut self, bet_type: BetType) -> Result<u64> {
        self.pending
            .remove(&bet_type)
            .ok_or_else(|| Error::NoPendingDecision(bet_type.label().to_string()))
    }

    /// Drop entries whose underlying bet has left the ledger (lost to a
    /// later roll before the player decided). The winnings were already
    /// paid; only the stale decision goes away.
    pub fn prune_resolved(&mut self, ledger: &BetLedger) {
        self.pending.retain(|&bet_type, _| ledger.contains(bet_type));
    }

    /// Discard everything; used when the session is force-settled
    pub fn discard_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BetType, u64)> + '_ {
        self.pending.iter().map(|(&bet, &winnings)| (bet, winnings))
    }

    pub fn bet_types(&self) -> Vec<BetType> {
        self.pending.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_take() {
        let mut pending = PendingDecisions::new();
        pending.record(BetType::Place8, 350);
        assert_eq!(pending.winnings(BetType::Place8), Some(350));

        assert_eq!(pending.take(BetType::Place8).unwrap(), 350);
        // second decision on the same bet is rejected
        let err = pending.take(BetType::Place8).unwrap_err();
        assert_eq!(err.to_string(), "no such pending decision: Place 8");
    }

    #[test]
    fn test_unknown_decision_rejected() {
        let mut pending = PendingDecisions::new();
        assert!(pending.take(BetType::Hard4).is_err());
    }

    #[test]
    fn test_prune_resolved() {
        let mut ledger = BetLedger::new();
        ledger.open(BetType::Place6, 120).unwrap();

        let mut pending = PendingDecisions::new();
        pending.record(BetType::Place6, 140);
        pending.record(BetType::Hard8, 900);

        // hard 8 has left the ledger; its pending entry goes stale
        pending.prune_resolved(&ledger);
        assert_eq!(pending.bet_types(), vec![BetType::Place6]);
    }
}
