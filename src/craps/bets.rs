//! Bet types, phase gating, and wire parsing.
//!
//! The table offers two families of wagers: one-shot bets consumed by the
//! next qualifying roll, and persistent bets that stay staked until they
//! win, lose, or are taken down.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Game phase. The active point only exists while the table is in the
/// point phase, so it lives inside the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TablePhase {
    /// Come-out roll - establishing the point
    ComeOut,
    /// Point phase - trying to make the point
    Point(u8),
}

impl TablePhase {
    pub fn point(&self) -> Option<u8> {
        match self {
            TablePhase::ComeOut => None,
            TablePhase::Point(point) => Some(*point),
        }
    }

    pub fn is_come_out(&self) -> bool {
        matches!(self, TablePhase::ComeOut)
    }
}

/// All bet types the table offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    // Line bets
    PassLine,
    DontPass,

    // Come bets
    Come,
    DontCome,

    // Field bet
    Field,

    // Place bets
    Place4,
    Place5,
    Place6,
    Place8,
    Place9,
    Place10,

    // Hardways
    Hard4,
    Hard6,
    Hard8,
    Hard10,
}

/// Hardway bets paired with the total they ride on, in resolution order
pub const HARD_BETS: [(BetType, u8); 4] = [
    (BetType::Hard4, 4),
    (BetType::Hard6, 6),
    (BetType::Hard8, 8),
    (BetType::Hard10, 10),
];

/// Place bets paired with their number, in resolution order
pub const PLACE_BETS: [(BetType, u8); 6] = [
    (BetType::Place4, 4),
    (BetType::Place5, 5),
    (BetType::Place6, 6),
    (BetType::Place8, 8),
    (BetType::Place9, 9),
    (BetType::Place10, 10),
];

impl BetType {
    pub const ALL: [BetType; 15] = [
        BetType::PassLine,
        BetType::DontPass,
        BetType::Come,
        BetType::DontCome,
        BetType::Field,
        BetType::Place4,
        BetType::Place5,
        BetType::Place6,
        BetType::Place8,
        BetType::Place9,
        BetType::Place10,
        BetType::Hard4,
        BetType::Hard6,
        BetType::Hard8,
        BetType::Hard10,
    ];

    /// One-shot bets are fully consumed (win, lose, or push) by the next
    /// qualifying roll; the rest stay staked until resolved or taken down.
    pub fn is_one_shot(&self) -> bool {
        matches!(
            self,
            BetType::PassLine | BetType::DontPass | BetType::Come | BetType::DontCome | BetType::Field
        )
    }

    pub fn is_persistent(&self) -> bool {
        !self.is_one_shot()
    }

    pub fn place_number(&self) -> Option<u8> {
        PLACE_BETS
            .iter()
            .find(|(bet, _)| bet == self)
            .map(|&(_, number)| number)
    }

    pub fn hard_number(&self) -> Option<u8> {
        HARD_BETS
            .iter()
            .find(|(bet, _)| bet == self)
            .map(|&(_, number)| number)
    }

    /// Check if this bet type may be opened in the given phase
    pub fn is_valid_for_phase(&self, phase: &TablePhase) -> bool {
        match (self, phase) {
            // Pass/Don't Pass bets can only be opened on the come-out
            (BetType::PassLine | BetType::DontPass, TablePhase::ComeOut) => true,

            // Come/Don't Come and place bets need an established point
            (BetType::Come | BetType::DontCome, TablePhase::Point(_)) => true,
            (
                BetType::Place4
                | BetType::Place5
                | BetType::Place6
                | BetType::Place8
                | BetType::Place9
                | BetType::Place10,
                TablePhase::Point(_),
            ) => true,

            // Field and hardways can be opened in either phase
            (BetType::Field, _) => true,
            (BetType::Hard4 | BetType::Hard6 | BetType::Hard8 | BetType::Hard10, _) => true,

            _ => false,
        }
    }

    /// Rejection reason for a bet opened in the wrong phase
    pub fn placement_rule(&self) -> &'static str {
        match self {
            BetType::PassLine | BetType::DontPass => "only on the come-out roll",
            _ => "only after a point is established",
        }
    }

    /// Wire identifier used by surfaces ("pass_line", "place_6", ...)
    pub fn wire_name(&self) -> &'static str {
        match self {
            BetType::PassLine => "pass_line",
            BetType::DontPass => "dont_pass",
            BetType::Come => "come",
            BetType::DontCome => "dont_come",
            BetType::Field => "field",
            BetType::Place4 => "place_4",
            BetType::Place5 => "place_5",
            BetType::Place6 => "place_6",
            BetType::Place8 => "place_8",
            BetType::Place9 => "place_9",
            BetType::Place10 => "place_10",
            BetType::Hard4 => "hard_4",
            BetType::Hard6 => "hard_6",
            BetType::Hard8 => "hard_8",
            BetType::Hard10 => "hard_10",
        }
    }

    /// Display name shown to players
    pub fn label(&self) -> &'static str {
        match self {
            BetType::PassLine => "Pass Line",
            BetType::DontPass => "Don't Pass",
            BetType::Come => "Come",
            BetType::DontCome => "Don't Come",
            BetType::Field => "Field",
            BetType::Place4 => "Place 4",
            BetType::Place5 => "Place 5",
            BetType::Place6 => "Place 6",
            BetType::Place8 => "Place 8",
            BetType::Place9 => "Place 9",
            BetType::Place10 => "Place 10",
            BetType::Hard4 => "Hard 4",
            BetType::Hard6 => "Hard 6",
            BetType::Hard8 => "Hard 8",
            BetType::Hard10 => "Hard 10",
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BetType::ALL
            .iter()
            .find(|bet| bet.wire_name() == s)
            .copied()
            .ok_or_else(|| Error::InvalidBet(format!("unknown bet type: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_gating() {
        // Pass line bets only on come-out
        assert!(BetType::PassLine.is_valid_for_phase(&TablePhase::ComeOut));
        assert!(!BetType::PassLine.is_valid_for_phase(&TablePhase::Point(6)));
        assert!(BetType::DontPass.is_valid_for_phase(&TablePhase::ComeOut));
        assert!(!BetType::DontPass.is_valid_for_phase(&TablePhase::Point(4)));

        // Come and place bets only after the point
        assert!(!BetType::Come.is_valid_for_phase(&TablePhase::ComeOut));
        assert!(BetType::Come.is_valid_for_phase(&TablePhase::Point(8)));
        assert!(!BetType::Place6.is_valid_for_phase(&TablePhase::ComeOut));
        assert!(BetType::Place6.is_valid_for_phase(&TablePhase::Point(9)));

        // Field and hardways anytime
        assert!(BetType::Field.is_valid_for_phase(&TablePhase::ComeOut));
        assert!(BetType::Field.is_valid_for_phase(&TablePhase::Point(5)));
        assert!(BetType::Hard8.is_valid_for_phase(&TablePhase::ComeOut));
        assert!(BetType::Hard8.is_valid_for_phase(&TablePhase::Point(10)));
    }

    #[test]
    fn test_bet_families() {
        assert!(BetType::Field.is_one_shot());
        assert!(BetType::Come.is_one_shot());
        assert!(BetType::Place8.is_persistent());
        assert!(BetType::Hard4.is_persistent());
        assert_eq!(BetType::Place9.place_number(), Some(9));
        assert_eq!(BetType::Hard10.hard_number(), Some(10));
        assert_eq!(BetType::Field.place_number(), None);
    }

    #[test]
    fn test_wire_round_trip() {
        for bet in BetType::ALL {
            assert_eq!(bet.wire_name().parse::<BetType>().unwrap(), bet);
        }
        assert!("big_6".parse::<BetType>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(BetType::DontPass.label(), "Don't Pass");
        assert_eq!(BetType::Place6.to_string(), "Place 6");
        assert_eq!(BetType::Hard10.label(), "Hard 10");
    }

    #[test]
    fn test_phase_point() {
        assert_eq!(TablePhase::ComeOut.point(), None);
        assert_eq!(TablePhase::Point(9).point(), Some(9));
        assert!(TablePhase::ComeOut.is_come_out());
        assert!(!TablePhase::Point(4).is_come_out());
    }
}
