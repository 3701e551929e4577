//! Decoding of hex quantities as returned by Ethereum nodes.
//!
//! Accepts an optional `0x`/`0X` prefix and any mix of upper and lower case
//! digits. Signs, whitespace and empty values are rejected.

use alloy_primitives::U256;

use crate::error::HexError;

fn digits(value: &str) -> Result<&str, HexError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if digits.is_empty() {
        return Err(HexError::Empty(value.to_string()));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexError::InvalidDigit(value.to_string()));
    }
    Ok(digits)
}

/// Parse a block height.
pub fn parse_u64(value: &str) -> Result<u64, HexError> {
    let digits = digits(value)?;
    u64::from_str_radix(digits, 16).map_err(|_| HexError::Overflow(value.to_string()))
}

/// Parse a difficulty without truncating it to a machine word.
pub fn parse_u256(value: &str) -> Result<U256, HexError> {
    let digits = digits(value)?;
    U256::from_str_radix(digits, 16).map_err(|_| HexError::Overflow(value.to_string()))
}
