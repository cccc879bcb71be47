//! Economic ledger collaborator contract and an in-memory implementation.
//!
//! The real chip economy (balances, XP, win/loss records, persistence)
//! lives outside the engine; sessions only need to read a balance when a
//! bet is placed and apply one signed profit delta when they settle.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::craps::PlayerId;
use crate::error::{Error, Result};

/// Wallet contract the engine settles against.
///
/// Implementations must support safe concurrent increments across many
/// sessions; the engine guarantees it applies each session's profit delta
/// at most once.
#[async_trait]
pub trait EconomicLedger: Send + Sync {
    /// Current balance for a player
    async fn balance(&self, player: PlayerId) -> Result<u64>;

    /// Apply a signed profit delta and return the new balance
    async fn apply_profit(&self, player: PlayerId, delta: i64) -> Result<u64>;
}

/// Simple concurrent wallet for tests and demos
#[derive(Default)]
pub struct InMemoryLedger {
    accounts: RwLock<HashMap<PlayerId, u64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a player's account, creating it if needed
    pub fn credit(&self, player: PlayerId, amount: u64) {
        *self.accounts.write().entry(player).or_insert(0) += amount;
    }
}

#[async_trait]
impl EconomicLedger for InMemoryLedger {
    async fn balance(&self, player: PlayerId) -> Result<u64> {
        Ok(self.accounts.read().get(&player).copied().unwrap_or(0))
    }

    async fn apply_profit(&self, player: PlayerId, delta: i64) -> Result<u64> {
        let mut accounts = self.accounts.write();
        let balance = accounts.entry(player).or_insert(0);
        let updated = if delta >= 0 {
            balance.checked_add(delta as u64)
        } else {
            balance.checked_sub(delta.unsigned_abs())
        }
        .ok_or_else(|| {
            Error::Ledger(format!(
                "profit delta {delta} would overflow balance {balance} for player {player}"
            ))
        })?;
        *balance = updated;
        Ok(updated)
    }
}
