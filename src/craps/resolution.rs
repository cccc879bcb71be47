//! Roll resolution - the heart of the table.
//!
//! `resolve_roll` evaluates every open wager against one roll of the dice,
//! mutates the ledger and phase accordingly, and reports what happened as
//! ordered narrative lines plus a per-bet audit trail. All payout math is
//! computed against the table as it stood before the roll; consumed bets,
//! cleared come points, and come conversions are applied in a single pass
//! at the end, so no bet's consumption can affect another bet's evaluation
//! of the same roll.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::format_chips;

use super::bets::{BetType, TablePhase, HARD_BETS, PLACE_BETS};
use super::dice::DiceRoll;
use super::ledger::BetLedger;
use super::payouts::{field_payout, payout_for};

/// One bet's outcome for a single roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BetOutcome {
    Won {
        bet_type: BetType,
        stake: u64,
        winnings: u64,
    },
    /// Winnings paid now; the stake stays up pending a keep/take-down call
    WonPending {
        bet_type: BetType,
        stake: u64,
        winnings: u64,
    },
    Lost {
        bet_type: BetType,
        stake: u64,
    },
    Push {
        bet_type: BetType,
        stake: u64,
    },
    ComePointEstablished {
        point: u8,
        amount: u64,
    },
    ComePointWon {
        point: u8,
        amount: u64,
    },
    ComePointLost {
        point: u8,
        amount: u64,
    },
}

impl BetOutcome {
    /// Signed chip movement this outcome contributes to the roll's net
    pub fn profit_delta(&self) -> i64 {
        match self {
            BetOutcome::Won { winnings, .. } | BetOutcome::WonPending { winnings, .. } => {
                *winnings as i64
            }
            BetOutcome::ComePointWon { amount, .. } => *amount as i64,
            BetOutcome::Lost { stake, .. } => -(*stake as i64),
            BetOutcome::ComePointLost { amount, .. } => -(*amount as i64),
            BetOutcome::Push { .. } | BetOutcome::ComePointEstablished { .. } => 0,
        }
    }
}

/// Everything one roll did to the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollOutcome {
    pub roll: DiceRoll,
    /// Ordered narrative lines, ready for direct display
    pub lines: Vec<String>,
    /// Per-bet audit trail in resolution order
    pub outcomes: Vec<BetOutcome>,
    /// Net chip movement for the roll, applied once to session profit
    pub profit: i64,
    /// Persistent-bet wins awaiting a keep/take-down decision
    pub pending: BTreeMap<BetType, u64>,
    pub point_established: Option<u8>,
    pub point_hit: Option<u8>,
    /// Seven rolled while a point was on: the session is over
    pub seven_out: bool,
}

/// Resolve one roll against the table.
///
/// Resolution order (it only matters for the narrative; every bet type's
/// payout is independent): field, hardways, pass/don't-pass, place bets,
/// come, don't-come, then come points already on the table, ascending.
pub fn resolve_roll(ledger: &mut BetLedger, phase: &mut TablePhase, roll: DiceRoll) -> RollOutcome {
    let total = roll.total();
    let mut lines = Vec::new();
    let mut outcomes = Vec::new();
    let mut pending = BTreeMap::new();
    let mut profit = 0i64;
    let mut consumed: Vec<BetType> = Vec::new();
    let mut cleared_points: Vec<u8> = Vec::new();
    let mut established: Vec<(u8, u64)> = Vec::new();

    // Field: one-shot, settled on every roll.
    if let Some(stake) = ledger.stake(BetType::Field) {
        match field_payout(total) {
            Some(payout) => {
                let winnings = payout.winnings(stake);
                profit += winnings as i64;
                lines.push(format!("Field bet wins {}.", format_chips(winnings as i64)));
                outcomes.push(BetOutcome::Won { bet_type: BetType::Field, stake, winnings });
            }
            None => {
                profit -= stake as i64;
                lines.push("Field bet loses.".to_string());
                outcomes.push(BetOutcome::Lost { bet_type: BetType::Field, stake });
            }
        }
        consumed.push(BetType::Field);
    }

    // Hardways ride in both phases: doubles win, sevens and easy ways lose.
    for (bet_type, number) in HARD_BETS {
        let Some(stake) = ledger.stake(bet_type) else {
            continue;
        };
        if roll.is_hard() && total == number {
            let winnings = payout_for(bet_type).winnings(stake);
            profit += winnings as i64;
            lines.push(format!("Hard {number} hits!"));
            outcomes.push(BetOutcome::WonPending { bet_type, stake, winnings });
            pending.insert(bet_type, winnings);
        } else if total == 7 || (total == number && !roll.is_hard()) {
            profit -= stake as i64;
            lines.push(format!("Hard {number} loses."));
            outcomes.push(BetOutcome::Lost { bet_type, stake });
            consumed.push(bet_type);
        }
    }

    match *phase {
        TablePhase::ComeOut => {
            if let Some(stake) = ledger.stake(BetType::PassLine) {
                match total {
                    7 | 11 => {
                        profit += stake as i64;
                        lines.push(format!("Pass Line wins {}.", format_chips(stake as i64)));
                        outcomes.push(BetOutcome::Won {
                            bet_type: BetType::PassLine,
                            stake,
                            winnings: stake,
                        });
                        consumed.push(BetType::PassLine);
                    }
                    2 | 3 | 12 => {
                        profit -= stake as i64;
                        lines.push("Pass Line loses (Craps).".to_string());
                        outcomes.push(BetOutcome::Lost { bet_type: BetType::PassLine, stake });
                        consumed.push(BetType::PassLine);
                    }
                    _ => {} // point established, bet rides
                }
            }
            if let Some(stake) = ledger.stake(BetType::DontPass) {
                match total {
                    2 | 3 => {
                        profit += stake as i64;
                        lines.push(format!("Don't Pass wins {}.", format_chips(stake as i64)));
                        outcomes.push(BetOutcome::Won {
                            bet_type: BetType::DontPass,
                            stake,
                            winnings: stake,
                        });
                        consumed.push(BetType::DontPass);
                    }
                    7 | 11 => {
                        profit -= stake as i64;
                        lines.push("Don't Pass loses.".to_string());
                        outcomes.push(BetOutcome::Lost { bet_type: BetType::DontPass, stake });
                        consumed.push(BetType::DontPass);
                    }
                    12 => {
                        lines.push("Don't Pass pushes (Bar 12).".to_string());
                        outcomes.push(BetOutcome::Push { bet_type: BetType::DontPass, stake });
                        consumed.push(BetType::DontPass);
                    }
                    _ => {}
                }
            }
        }
        TablePhase::Point(point) => {
            if let Some(stake) = ledger.stake(BetType::PassLine) {
                if total == point {
                    profit += stake as i64;
                    lines.push(format!(
                        "Point of {point} hit! Pass Line wins {}.",
                        format_chips(stake as i64)
                    ));
                    outcomes.push(BetOutcome::Won {
                        bet_type: BetType::PassLine,
                        stake,
                        winnings: stake,
                    });
                    consumed.push(BetType::PassLine);
                } else if total == 7 {
                    profit -= stake as i64;
                    lines.push("Seven out! Pass Line loses.".to_string());
                    outcomes.push(BetOutcome::Lost { bet_type: BetType::PassLine, stake });
                    consumed.push(BetType::PassLine);
                }
            }
            if let Some(stake) = ledger.stake(BetType::DontPass) {
                if total == 7 {
                    profit += stake as i64;
                    lines.push(format!(
                        "Seven out! Don't Pass wins {}.",
                        format_chips(stake as i64)
                    ));
                    outcomes.push(BetOutcome::Won {
                        bet_type: BetType::DontPass,
                        stake,
                        winnings: stake,
                    });
                    consumed.push(BetType::DontPass);
                } else if total == point {
                    profit -= stake as i64;
                    lines.push(format!("Point of {point} hit! Don't Pass loses."));
                    outcomes.push(BetOutcome::Lost { bet_type: BetType::DontPass, stake });
                    consumed.push(BetType::DontPass);
                }
            }

            // Place bets work only while a point is on.
            for (bet_type, number) in PLACE_BETS {
                let Some(stake) = ledger.stake(bet_type) else {
                    continue;
                };
                if total == number {
                    let winnings = payout_for(bet_type).winnings(stake);
                    profit += winnings as i64;
                    lines.push(format!("Place bet on {number} wins!"));
                    outcomes.push(BetOutcome::WonPending { bet_type, stake, winnings });
                    pending.insert(bet_type, winnings);
                } else if total == 7 {
                    profit -= stake as i64;
                    lines.push(format!("Place bet on {number} loses (Seven out)."));
                    outcomes.push(BetOutcome::Lost { bet_type, stake });
                    consumed.push(bet_type);
                }
            }
        }
    }

    // Come: one-shot; a point number converts the stake into a come point.
    if let Some(stake) = ledger.stake(BetType::Come) {
        match total {
            7 | 11 => {
                profit += stake as i64;
                lines.push(format!("Come bet wins {}.", format_chips(stake as i64)));
                outcomes.push(BetOutcome::Won { bet_type: BetType::Come, stake, winnings: stake });
            }
            2 | 3 | 12 => {
                profit -= stake as i64;
                lines.push("Come bet loses.".to_string());
                outcomes.push(BetOutcome::Lost { bet_type: BetType::Come, stake });
            }
            _ => {
                established.push((total, stake));
                lines.push(format!("Come point is now {total}."));
                outcomes.push(BetOutcome::ComePointEstablished { point: total, amount: stake });
            }
        }
        consumed.push(BetType::Come);
    }

    // Don't Come: mirrors come, pushes on 12; its point is tracked in the
    // same come-point table and resolves identically.
    if let Some(stake) = ledger.stake(BetType::DontCome) {
        match total {
            2 | 3 => {
                profit += stake as i64;
                lines.push(format!("Don't Come bet wins {}.", format_chips(stake as i64)));
                outcomes.push(BetOutcome::Won {
                    bet_type: BetType::DontCome,
                    stake,
                    winnings: stake,
                });
            }
            7 | 11 => {
                profit -= stake as i64;
                lines.push("Don't Come bet loses.".to_string());
                outcomes.push(BetOutcome::Lost { bet_type: BetType::DontCome, stake });
            }
            12 => {
                lines.push("Don't Come bet pushes.".to_string());
                outcomes.push(BetOutcome::Push { bet_type: BetType::DontCome, stake });
            }
            _ => {
                established.push((total, stake));
                lines.push(format!("Don't Come point established on {total}."));
                outcomes.push(BetOutcome::ComePointEstablished { point: total, amount: stake });
            }
        }
        consumed.push(BetType::DontCome);
    }

    // Come points that were on the table before this roll, ascending. The
    // conversions collected above are applied after, so a come bet cannot
    // also win as a come point on the roll that established it.
    let open_points: Vec<(u8, u64)> = ledger.come_points().collect();
    for (point, amount) in open_points {
        if total == point {
            profit += amount as i64;
            lines.push(format!(
                "Come point {point} hit! You win {}.",
                format_chips(amount as i64)
            ));
            outcomes.push(BetOutcome::ComePointWon { point, amount });
            cleared_points.push(point);
        } else if total == 7 {
            profit -= amount as i64;
            lines.push(format!("Come point {point} loses (Seven out)."));
            outcomes.push(BetOutcome::ComePointLost { point, amount });
            cleared_points.push(point);
        }
    }

    // Phase transition, after all bets were judged against the old phase.
    let mut point_established = None;
    let mut point_hit = None;
    let mut seven_out = false;
    match *phase {
        TablePhase::ComeOut => {
            if matches!(total, 4 | 5 | 6 | 8 | 9 | 10) {
                *phase = TablePhase::Point(total);
                point_established = Some(total);
                lines.push(format!("Point is now {total}."));
            }
        }
        TablePhase::Point(point) => {
            if total == point {
                *phase = TablePhase::ComeOut;
                point_hit = Some(point);
                lines.push(format!("Point {point} hit! New come-out roll."));
            } else if total == 7 {
                seven_out = true;
            }
        }
    }

    // Single mutation pass: consumed bets out, resolved points cleared,
    // fresh conversions in.
    for bet_type in consumed {
        ledger.remove(bet_type);
    }
    for point in cleared_points {
        ledger.take_come_point(point);
    }
    for (point, amount) in established {
        ledger.add_come_point(point, amount);
    }

    RollOutcome {
        roll,
        lines,
        outcomes,
        profit,
        pending,
        point_established,
        point_hit,
        seven_out,
    }
}
