//! Amount conversion helpers
//!
//! Amounts cross the public API as native-unit `U256`. These helpers convert
//! between that and the decimal strings a user types or reads.

use crate::shared::error::SwapError;
use crate::shared::types::Amount;
use ethers::utils::{format_units, parse_units};

/// Parse a user-entered decimal string into native units.
///
/// Empty input parses as zero so an empty field short-circuits quoting.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<Amount, SwapError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Ok(Amount::zero());
    }
    if trimmed.starts_with('-') {
        return Err(SwapError::validation(format!("Amount cannot be negative: {}", trimmed)));
    }
    let parsed = parse_units(trimmed, decimals as u32)?;
    Ok(parsed.into())
}

/// Format native units as a decimal string without trailing zeros.
pub fn format_amount(amount: Amount, decimals: u8) -> Result<String, SwapError> {
    let formatted = format_units(amount, decimals as u32)?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    Ok(trimmed.to_string())
}

/// Lossy conversion for display-only ratios.
pub fn amount_to_f64(amount: Amount, decimals: u8) -> f64 {
    format_units(amount, decimals as u32)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Convert a percentage such as `0.5` into basis points.
pub fn percent_to_bps(percent: f64) -> Result<u32, SwapError> {
    if !percent.is_finite() || percent < 0.0 || percent >= 100.0 {
        return Err(SwapError::validation(format!(
            "Slippage must be in [0, 100): {}",
            percent
        )));
    }
    Ok((percent * 100.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("1.0", 18).unwrap(),
            Amount::from(1_000_000_000_000_000_000u64)
        );
        assert_eq!(parse_amount("0.5", 6).unwrap(), Amount::from(500_000u64));
        assert_eq!(parse_amount("", 18).unwrap(), Amount::zero());
        assert_eq!(parse_amount("  ", 18).unwrap(), Amount::zero());
        assert!(parse_amount("-1", 18).is_err());
        assert!(parse_amount("abc", 18).is_err());
    }

    #[test]
    fn test_format_amount() {
        let amount = Amount::from(1_970_100_000_000_000_000u64);
        assert_eq!(format_amount(amount, 18).unwrap(), "1.9701");
        assert_eq!(format_amount(Amount::from(2_000_000u64), 6).unwrap(), "2");
        assert_eq!(format_amount(Amount::zero(), 18).unwrap(), "0");
    }

    #[test]
    fn test_percent_to_bps() {
        assert_eq!(percent_to_bps(0.5).unwrap(), 50);
        assert_eq!(percent_to_bps(0.1).unwrap(), 10);
        assert_eq!(percent_to_bps(3.0).unwrap(), 300);
        assert_eq!(percent_to_bps(0.0).unwrap(), 0);
        assert!(percent_to_bps(100.0).is_err());
        assert!(percent_to_bps(-0.5).is_err());
    }

    #[test]
    fn test_amount_to_f64() {
        let amount = Amount::from(1_500_000_000_000_000_000u64);
        assert!((amount_to_f64(amount, 18) - 1.5).abs() < 1e-12);
    }
}
