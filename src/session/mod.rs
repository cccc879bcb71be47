//! Per-player craps sessions.
//!
//! A [`CrapsSession`] owns every piece of mutable table state for one
//! player: phase, bet ledger, pending decisions, cumulative profit, and the
//! lifecycle clocks. Methods here are synchronous state transitions; the
//! async coordination (registry, per-session locking, watchdogs, ledger
//! settlement) lives in [`manager`].

pub mod lifecycle;
pub mod manager;

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::craps::decisions::{Decision, PendingDecisions};
use crate::craps::{
    resolve_roll, BetLedger, BetType, DiceRoll, DiceRoller, PlayerId, RollOutcome, TablePhase,
    MIN_BET_AMOUNT,
};
use crate::error::{Error, Result};
use crate::presentation::{AvailableActions, BetLine, TableSnapshot};
use crate::utils::format_chips;

use lifecycle::LifecycleState;

pub use manager::SessionManager;

/// Result of a keep/take-down decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub bet_type: BetType,
    pub decision: Decision,
    /// Winnings that were already paid when the bet won
    pub winnings: u64,
    /// Stake handed back on take-down; informational, since the stake was
    /// never deducted from the balance
    pub returned_stake: Option<u64>,
    pub line: String,
}

/// One player's live craps table
pub struct CrapsSession {
    player: PlayerId,
    session_id: Uuid,
    phase: TablePhase,
    ledger: BetLedger,
    pending: PendingDecisions,
    session_profit: i64,
    last_action: Instant,
    timed_out_at: Option<Instant>,
    lifecycle: LifecycleState,
    rolling: bool,
    game_over: bool,
    settled: bool,
    created_at: DateTime<Utc>,
    last_roll: Option<DiceRoll>,
    narrative: Vec<String>,
    roller: Box<dyn DiceRoller>,
}

impl CrapsSession {
    /// Start a new session; a pass line wager is required to open the table
    pub fn new(player: PlayerId, pass_line_wager: u64, roller: Box<dyn DiceRoller>) -> Result<Self> {
        let mut ledger = BetLedger::new();
        ledger.open(BetType::PassLine, pass_line_wager)?;
        Ok(Self {
            player,
            session_id: Uuid::new_v4(),
            phase: TablePhase::ComeOut,
            ledger,
            pending: PendingDecisions::new(),
            session_profit: 0,
            last_action: Instant::now(),
            timed_out_at: None,
            lifecycle: LifecycleState::Active,
            rolling: false,
            game_over: false,
            settled: false,
            created_at: Utc::now(),
            last_roll: None,
            narrative: vec!["Game started. Waiting to roll.".to_string()],
            roller,
        })
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> TablePhase {
        self.phase
    }

    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    pub fn session_profit(&self) -> i64 {
        self.session_profit
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn last_action(&self) -> Instant {
        self.last_action
    }

    pub fn timed_out_at(&self) -> Option<Instant> {
        self.timed_out_at
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Open an additional bet. `balance` is the player's wallet balance at
    /// placement time; everything already staked counts against it.
    pub fn place_bet(&mut self, bet_type: BetType, amount: u64, balance: u64) -> Result<()> {
        self.ensure_actionable()?;
        if self.ledger.contains(bet_type) {
            return Err(Error::DuplicateBet(bet_type.label().to_string()));
        }
        if !bet_type.is_valid_for_phase(&self.phase) {
            return Err(Error::InvalidBet(format!(
                "{} bets are allowed {}",
                bet_type.label(),
                bet_type.placement_rule()
            )));
        }
        if amount < MIN_BET_AMOUNT {
            return Err(Error::InvalidBet("bet amount must be positive".to_string()));
        }
        let uncommitted = balance.saturating_sub(self.ledger.total_committed());
        if amount > uncommitted {
            return Err(Error::InsufficientChips { required: amount, available: uncommitted });
        }
        self.ledger.open(bet_type, amount)?;
        self.narrative = vec![format!(
            "Added {} bet ({}).",
            bet_type.label(),
            format_chips(amount as i64)
        )];
        self.touch();
        Ok(())
    }

    /// Roll the dice and resolve every open wager
    pub fn roll(&mut self) -> Result<RollOutcome> {
        self.ensure_actionable()?;
        if self.rolling {
            return Err(Error::RollInProgress);
        }
        self.rolling = true;
        let roll = self.roller.roll();
        let mut outcome = resolve_roll(&mut self.ledger, &mut self.phase, roll);
        self.rolling = false;

        self.session_profit += outcome.profit;
        self.pending.extend(outcome.pending.clone());
        // a bet lost before its decision leaves a stale entry behind
        self.pending.prune_resolved(&self.ledger);
        self.last_roll = Some(roll);

        if outcome.seven_out {
            self.game_over = true;
            self.pending.discard_all();
            outcome.lines.push(format!(
                "Seven out! Game over. Total {}: {}.",
                if self.session_profit >= 0 { "Profit" } else { "Loss" },
                format_chips(self.session_profit.abs())
            ));
        }
        self.narrative = outcome.lines.clone();
        self.touch();
        Ok(outcome)
    }

    /// Answer a pending keep/take-down decision
    pub fn decide(&mut self, bet_type: BetType, decision: Decision) -> Result<DecisionOutcome> {
        self.ensure_actionable()?;
        let winnings = self.pending.take(bet_type)?;
        let returned_stake = match decision {
            Decision::Keep => None,
            Decision::TakeDown => self.ledger.remove(bet_type),
        };
        let line = match decision {
            Decision::Keep => format!(
                "You won {} and kept your bet on {}.",
                format_chips(winnings as i64),
                bet_type.label()
            ),
            Decision::TakeDown => format!(
                "You won {} and took down your bet on {} (stake {} returned).",
                format_chips(winnings as i64),
                bet_type.label(),
                format_chips(returned_stake.unwrap_or(0) as i64)
            ),
        };
        self.narrative = vec![line.clone()];
        self.touch();
        Ok(DecisionOutcome { bet_type, decision, winnings, returned_stake, line })
    }

    /// Bring a timed-out session back to life
    pub fn resume(&mut self) -> Result<()> {
        if self.game_over {
            return Err(Error::SessionOver);
        }
        if self.lifecycle != LifecycleState::TimedOut {
            return Err(Error::SessionActive);
        }
        self.lifecycle = LifecycleState::Active;
        self.timed_out_at = None;
        self.last_action = Instant::now();
        self.narrative = vec!["Game resumed. You may roll.".to_string()];
        Ok(())
    }

    /// Refresh the inactivity clock; no-op once suspended or over
    fn touch(&mut self) {
        if self.lifecycle == LifecycleState::Active && !self.game_over {
            self.last_action = Instant::now();
        }
    }

    fn ensure_actionable(&self) -> Result<()> {
        if self.game_over {
            return Err(Error::SessionOver);
        }
        match self.lifecycle {
            LifecycleState::Active => Ok(()),
            LifecycleState::TimedOut => Err(Error::SessionTimedOut),
            LifecycleState::AutoClosed => Err(Error::SessionOver),
        }
    }

    pub(crate) fn mark_timed_out(&mut self, now: Instant) {
        self.lifecycle = LifecycleState::TimedOut;
        self.timed_out_at = Some(now);
        self.narrative =
            vec!["Game timed out due to inactivity. Press Resume to continue.".to_string()];
    }

    pub(crate) fn mark_auto_closed(&mut self) {
        self.lifecycle = LifecycleState::AutoClosed;
        self.game_over = true;
        self.pending.discard_all();
        self.narrative = vec!["Game auto-closed after extended inactivity.".to_string()];
    }

    pub(crate) fn mark_settled(&mut self) {
        self.settled = true;
    }

    /// Renderable view of the table as it stands
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            session_id: self.session_id,
            player: self.player,
            phase: self.phase,
            point: self.phase.point(),
            bets: self
                .ledger
                .bets()
                .map(|(bet_type, amount)| BetLine {
                    bet_type,
                    label: bet_type.label().to_string(),
                    amount,
                })
                .collect(),
            come_points: self.ledger.come_points().collect(),
            pending_decisions: self.pending.iter().collect(),
            last_roll: self.last_roll.map(|roll| roll.display()),
            narrative: self.narrative.clone(),
            session_profit: self.session_profit,
            lifecycle: self.lifecycle,
            game_over: self.game_over,
            created_at: self.created_at,
            actions: self.available_actions(),
        }
    }

    /// The set of actions currently legal for the player
    pub fn available_actions(&self) -> AvailableActions {
        let active = !self.game_over && self.lifecycle == LifecycleState::Active;
        AvailableActions {
            can_roll: active && !self.rolling,
            can_resume: !self.game_over && self.lifecycle == LifecycleState::TimedOut,
            placeable: if active {
                BetType::ALL
                    .iter()
                    .copied()
                    .filter(|bet| bet.is_valid_for_phase(&self.phase) && !self.ledger.contains(*bet))
                    .collect()
            } else {
                Vec::new()
            },
            decidable: if active { self.pending.bet_types() } else { Vec::new() },
        }
    }
}
