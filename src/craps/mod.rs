//! Craps table primitives: dice, bets, the per-session ledger, payout
//! ratios, and the roll resolver.
//!
//! Everything in this module is deterministic state-machine logic with no
//! I/O; sessions (`crate::session`) own the state and drive it, the
//! resolver mutates it one roll at a time.

pub mod bets;
pub mod decisions;
pub mod dice;
pub mod ledger;
pub mod payouts;
pub mod resolution;

pub use bets::{BetType, TablePhase};
pub use dice::{DiceRoll, DiceRoller, RandomRoller, ScriptedRoller};
pub use ledger::BetLedger;
pub use payouts::Payout;
pub use resolution::{resolve_roll, BetOutcome, RollOutcome};

/// Player identifier - chat platforms key users by numeric snowflake
pub type PlayerId = u64;

/// Smallest stake the table accepts
pub const MIN_BET_AMOUNT: u64 = 1;

/// Totals that establish a point from the come-out roll
pub const POINT_NUMBERS: [u8; 6] = [4, 5, 6, 8, 9, 10];
