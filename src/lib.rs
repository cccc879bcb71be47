//! ChatCraps - a multi-phase craps wagering engine for chat-platform
//! casinos.
//!
//! The engine runs one session per player and owns everything between a
//! placed wager and a settled profit:
//! - craps: dice, bet types, the bet ledger, payout ratios, and the
//!   roll resolver
//! - session: per-player session state, the inactivity/hard-timeout
//!   lifecycle, and the manager that serializes actions and supervises
//!   watchdog timers
//! - economy: the wallet collaborator contract the engine settles against
//! - presentation: renderable snapshots and the "state changed,
//!   please re-render" channel contract
//!
//! Chat-platform rendering, button wiring, and the persistent user economy
//! are external collaborators behind the `presentation` and `economy`
//! traits.

pub mod craps;
pub mod economy;
pub mod error;
pub mod presentation;
pub mod session;
pub mod utils;

// Re-export commonly used types for easy access
pub use craps::decisions::Decision;
pub use craps::{
    resolve_roll, BetLedger, BetOutcome, BetType, DiceRoll, DiceRoller, PlayerId, RandomRoller,
    RollOutcome, ScriptedRoller, TablePhase,
};
pub use economy::{EconomicLedger, InMemoryLedger};
pub use error::{Error, Result};
pub use presentation::{
    AvailableActions, BroadcastChannel, NullChannel, PresentationChannel, TableSnapshot,
    TableUpdate, UpdateReason,
};
pub use session::lifecycle::{LifecycleConfig, LifecycleState};
pub use session::{CrapsSession, DecisionOutcome, SessionManager};
