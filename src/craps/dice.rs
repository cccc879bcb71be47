//! Dice primitives and roll generation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dice roll result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub die1: u8,
    pub die2: u8,
}

impl DiceRoll {
    pub fn new(die1: u8, die2: u8) -> Result<Self> {
        if !(1..=6).contains(&die1) || !(1..=6).contains(&die2) {
            return Err(Error::InvalidRoll(format!(
                "dice must show 1-6, got {die1} and {die2}"
            )));
        }
        Ok(Self { die1, die2 })
    }

    pub fn total(&self) -> u8 {
        self.die1 + self.die2
    }

    /// Both dice showing the same face (the "hard way")
    pub fn is_hard(&self) -> bool {
        self.die1 == self.die2
    }

    pub fn is_craps(&self) -> bool {
        matches!(self.total(), 2 | 3 | 12)
    }

    pub fn is_natural(&self) -> bool {
        matches!(self.total(), 7 | 11)
    }

    /// Display string for snapshots: "3 + 4 (Total: 7)"
    pub fn display(&self) -> String {
        format!("{} + {} (Total: {})", self.die1, self.die2, self.total())
    }
}

/// Source of dice rolls for a session.
///
/// Production sessions use [`RandomRoller`]; tests and replayable demos
/// swap in [`ScriptedRoller`] or a seeded [`RandomRoller`].
pub trait DiceRoller: Send {
    fn roll(&mut self) -> DiceRoll;
}

/// Uniform per-face roller backed by ChaCha8
pub struct RandomRoller {
    rng: ChaCha8Rng,
}

impl RandomRoller {
    pub fn new() -> Self {
        Self { rng: ChaCha8Rng::from_entropy() }
    }

    /// Deterministic roller for reproducible sessions
    pub fn seeded(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl Default for RandomRoller {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceRoller for RandomRoller {
    fn roll(&mut self) -> DiceRoll {
        DiceRoll {
            die1: self.rng.gen_range(1..=6),
            die2: self.rng.gen_range(1..=6),
        }
    }
}

/// Replays a fixed sequence of rolls, cycling when exhausted
pub struct ScriptedRoller {
    rolls: Vec<DiceRoll>,
    next: usize,
}

impl ScriptedRoller {
    pub fn new(rolls: &[(u8, u8)]) -> Result<Self> {
        if rolls.is_empty() {
            return Err(Error::InvalidRoll("script must contain at least one roll".to_string()));
        }
        let rolls = rolls
            .iter()
            .map(|&(d1, d2)| DiceRoll::new(d1, d2))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rolls, next: 0 })
    }
}

impl DiceRoller for ScriptedRoller {
    fn roll(&mut self) -> DiceRoll {
        let roll = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dice_roll() {
        let roll = DiceRoll::new(3, 4).unwrap();
        assert_eq!(roll.total(), 7);
        assert!(!roll.is_hard());
        assert!(roll.is_natural());
        assert_eq!(roll.display(), "3 + 4 (Total: 7)");

        let hard = DiceRoll::new(3, 3).unwrap();
        assert!(hard.is_hard());
        assert!(!hard.is_natural());

        assert!(DiceRoll::new(0, 4).is_err());
        assert!(DiceRoll::new(3, 7).is_err());
    }

    #[test]
    fn test_random_roller_in_range() {
        let mut roller = RandomRoller::new();
        for _ in 0..1000 {
            let roll = roller.roll();
            assert!((1..=6).contains(&roll.die1));
            assert!((1..=6).contains(&roll.die2));
        }
    }

    #[test]
    fn test_seeded_roller_reproducible() {
        let mut a = RandomRoller::seeded(42);
        let mut b = RandomRoller::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn test_scripted_roller_cycles() {
        let mut roller = ScriptedRoller::new(&[(1, 2), (3, 3)]).unwrap();
        assert_eq!(roller.roll(), DiceRoll::new(1, 2).unwrap());
        assert_eq!(roller.roll(), DiceRoll::new(3, 3).unwrap());
        assert_eq!(roller.roll(), DiceRoll::new(1, 2).unwrap());
        assert!(ScriptedRoller::new(&[]).is_err());
        assert!(ScriptedRoller::new(&[(0, 9)]).is_err());
    }
}
