//! Payout ratios and win-amount calculation.
//!
//! Win amounts are `stake * ratio` rounded UP to the next whole chip: the
//! house grants the fractional chip on odd stakes against fractional ratios
//! like the 7:6 place six.

use serde::{Deserialize, Serialize};

use super::bets::BetType;

/// A payout ratio expressed as a fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub numerator: u32,
    pub denominator: u32,
}

impl Payout {
    pub const EVEN: Self = Self { numerator: 1, denominator: 1 };

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self { numerator, denominator }
    }

    /// Win amount for a stake, rounded up to the nearest whole chip
    pub fn winnings(&self, stake: u64) -> u64 {
        let numerator = stake.saturating_mul(self.numerator as u64);
        let denominator = self.denominator as u64;
        numerator.div_ceil(denominator)
    }
}

/// Flat payout ratio for a bet type.
///
/// The field bet's 2 and 12 premiums depend on the roll total and are
/// looked up through [`field_payout`] instead.
pub fn payout_for(bet_type: BetType) -> Payout {
    match bet_type {
        BetType::PassLine | BetType::DontPass | BetType::Come | BetType::DontCome => Payout::EVEN,
        BetType::Field => Payout::EVEN,
        BetType::Place4 | BetType::Place10 => Payout::new(9, 5),
        BetType::Place5 | BetType::Place9 => Payout::new(7, 5),
        BetType::Place6 | BetType::Place8 => Payout::new(7, 6),
        BetType::Hard4 | BetType::Hard10 => Payout::new(7, 1),
        BetType::Hard6 | BetType::Hard8 => Payout::new(9, 1),
    }
}

/// Field payout for a roll total; `None` means the field loses
pub fn field_payout(total: u8) -> Option<Payout> {
    match total {
        2 => Some(Payout::new(2, 1)),
        12 => Some(Payout::new(3, 1)),
        3 | 4 | 9 | 10 | 11 => Some(Payout::EVEN),
        _ => None,
    }
}
