//! Wager parsing and chip formatting shared across the engine.
//!
//! Surfaces collect wagers as free text ("500", "5k", "half", "25%"), so the
//! parser is deliberately forgiving about separators and currency dressing.

use crate::error::{Error, Result};

/// Parse a wager string against the player's current balance.
///
/// Accepts plain integers, `k`/`m` suffixes, `half`, `all`/`allin`/`max`,
/// and percentages of the balance. Commas, underscores, backticks and a
/// leading `$` are stripped before parsing. The result is always positive.
pub fn parse_wager(input: &str, balance: u64) -> Result<u64> {
    let cleaned = input
        .trim()
        .to_lowercase()
        .replace([',', '_'], "");
    let cleaned = cleaned.trim_matches(|c| c == '`' || c == '$').to_string();

    if cleaned.is_empty() {
        return Err(Error::InvalidWager("empty wager".to_string()));
    }

    let amount = match cleaned.as_str() {
        "all" | "allin" | "max" => balance,
        "half" => balance / 2,
        s if s.ends_with('%') => {
            let percent: f64 = s
                .trim_end_matches('%')
                .parse()
                .map_err(|_| Error::InvalidWager(format!("invalid percentage: {input}")))?;
            if !(0.0..=100.0).contains(&percent) {
                return Err(Error::InvalidWager(
                    "percentage must be between 0 and 100".to_string(),
                ));
            }
            (balance as f64 * percent / 100.0) as u64
        }
        s => {
            let (digits, multiplier) = if let Some(stripped) = s.strip_suffix('k') {
                (stripped, 1_000)
            } else if let Some(stripped) = s.strip_suffix('m') {
                (stripped, 1_000_000)
            } else {
                (s, 1)
            };
            let value: u64 = digits
                .parse()
                .map_err(|_| Error::InvalidWager(format!("invalid wager amount: {input}")))?;
            value
                .checked_mul(multiplier)
                .ok_or_else(|| Error::InvalidWager(format!("wager too large: {input}")))?
        }
    };

    if amount == 0 {
        return Err(Error::InvalidWager("wager must be positive".to_string()));
    }
    Ok(amount)
}

/// Format a chip amount with thousands separators ("1,234,500")
pub fn format_chips(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Compact chip amount for dense table layouts ("1.5k", "2m")
pub fn format_chips_short(amount: u64) -> String {
    if amount >= 1_000_000 {
        if amount % 1_000_000 == 0 {
            format!("{}m", amount / 1_000_000)
        } else {
            format!("{:.1}m", amount as f64 / 1_000_000.0)
        }
    } else if amount >= 1_000 {
        if amount % 1_000 == 0 {
            format!("{}k", amount / 1_000)
        } else {
            format!("{:.1}k", amount as f64 / 1_000.0)
        }
    } else {
        amount.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_suffixed() {
        assert_eq!(parse_wager("500", 10_000).unwrap(), 500);
        assert_eq!(parse_wager("5k", 10_000).unwrap(), 5_000);
        assert_eq!(parse_wager("2m", 10_000).unwrap(), 2_000_000);
        assert_eq!(parse_wager("1,500", 10_000).unwrap(), 1_500);
        assert_eq!(parse_wager("`$500`", 10_000).unwrap(), 500);
    }

    #[test]
    fn test_parse_balance_relative() {
        assert_eq!(parse_wager("all", 7_500).unwrap(), 7_500);
        assert_eq!(parse_wager("allin", 7_500).unwrap(), 7_500);
        assert_eq!(parse_wager("max", 7_500).unwrap(), 7_500);
        assert_eq!(parse_wager("half", 7_500).unwrap(), 3_750);
        assert_eq!(parse_wager("25%", 10_000).unwrap(), 2_500);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_wager("", 1_000).is_err());
        assert!(parse_wager("abc", 1_000).is_err());
        assert!(parse_wager("150%", 1_000).is_err());
        assert!(parse_wager("0", 1_000).is_err());
        // half of 1 chip rounds to zero
        assert!(parse_wager("half", 1).is_err());
    }

    #[test]
    fn test_format_chips() {
        assert_eq!(format_chips(0), "0");
        assert_eq!(format_chips(999), "999");
        assert_eq!(format_chips(1_500), "1,500");
        assert_eq!(format_chips(1_234_500), "1,234,500");
        assert_eq!(format_chips(-42_000), "-42,000");
    }

    #[test]
    fn test_format_chips_short() {
        assert_eq!(format_chips_short(950), "950");
        assert_eq!(format_chips_short(1_000), "1k");
        assert_eq!(format_chips_short(1_500), "1.5k");
        assert_eq!(format_chips_short(2_000_000), "2m");
        assert_eq!(format_chips_short(2_500_000), "2.5m");
    }
}
