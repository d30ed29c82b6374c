//! Exact conversions between wei and decimal ether strings.

use alloy_primitives::U256;
use thiserror::Error;

/// Number of fractional digits in one ether.
pub const ETHER_DECIMALS: usize = 18;

/// Wei in one ether.
pub const WEI_PER_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Errors produced when parsing a decimal ether amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    /// The input string was empty.
    #[error("empty ether amount")]
    Empty,

    /// The input contained something other than digits and a single dot.
    #[error("invalid ether amount: {0}")]
    InvalidDigit(String),

    /// More fractional digits than wei can represent.
    #[error("too many decimals: {0} > 18")]
    TooManyDecimals(usize),

    /// The amount does not fit in 256 bits of wei.
    #[error("ether amount overflows U256")]
    Overflow,
}

/// Converts a whole number of ether to wei.
pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * WEI_PER_ETHER
}

/// Formats a wei amount as a decimal ether string.
///
/// The result is exact: trailing fractional zeros are dropped and whole
/// amounts carry no decimal point, so `20 ether` renders as `20` and one wei
/// as `0.000000000000000001`.
pub fn format_ether(wei: U256) -> String {
    let whole = wei / WEI_PER_ETHER;
    let frac = (wei % WEI_PER_ETHER).to::<u64>();
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0width$}", width = ETHER_DECIMALS);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Parses a decimal ether string (such as `1.5`) into wei.
pub fn parse_ether(input: &str) -> Result<U256, UnitsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = input.split_once('.').unwrap_or((input, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::InvalidDigit(input.to_string()));
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(UnitsError::InvalidDigit(input.to_string()));
    }
    if frac.len() > ETHER_DECIMALS {
        return Err(UnitsError::TooManyDecimals(frac.len()));
    }

    let whole = parse_digits(whole)?;
    let scale = U256::from(10u64).pow(U256::from(ETHER_DECIMALS - frac.len()));
    let frac = parse_digits(frac)? * scale;

    whole.checked_mul(WEI_PER_ETHER).and_then(|w| w.checked_add(frac)).ok_or(UnitsError::Overflow)
}

fn parse_digits(digits: &str) -> Result<U256, UnitsError> {
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| UnitsError::Overflow)
}
