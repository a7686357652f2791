//! Fixed-Point Price Module
//!
//! All prices are unsigned integers scaled by [`UNIT`] = 10^18, meaning
//! "units of the quote asset per unit of the base asset" to 18 decimal digits.
//! All arithmetic MUST go through this module.
//!
//! ## Design Principles
//! 1. Integer only: division truncates toward zero
//! 2. No wrapping: any result that does not fit [`Price`] is an error
//! 3. Exact intermediates: `x * UNIT` is computed at 256-bit width
//!
//! ## Usage
//! ```rust
//! use price_oracle::money::{normalize, precise_div, UNIT};
//!
//! // Feed "2" with 0 decimals -> 2 * 10^18
//! assert_eq!(normalize(2, 0).unwrap(), 2 * UNIT);
//!
//! // 2.0 / 4.0 = 0.5
//! assert_eq!(precise_div(2 * UNIT, 4 * UNIT).unwrap(), UNIT / 2);
//! ```

use num_bigint::BigUint;
use rust_decimal::Decimal;
use thiserror::Error;

/// Fixed-point price scaled by [`UNIT`]
pub type Price = u128;

/// Number of fractional digits carried by a [`Price`]
pub const PRICE_DECIMALS: u32 = 18;

/// 10^18
pub const UNIT: Price = 1_000_000_000_000_000_000;

/// Width of the intermediate product in bits
const INTERMEDIATE_BITS: u64 = 256;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Arithmetic
// ============================================================================

/// `floor(x * UNIT / y)`.
///
/// # Errors
/// * `Overflow` - the product exceeds 256 bits or the quotient exceeds `Price`
/// * `DivisionByZero` - `y == 0`
pub fn precise_div(x: Price, y: Price) -> Result<Price, MoneyError> {
    mul_div(&BigUint::from(x), &BigUint::from(UNIT), &BigUint::from(y))
}

/// Fixed-point reciprocal: `UNIT * UNIT / p`.
///
/// 10^36 fits in `u128`, so the only failure is `p == 0`.
pub fn reciprocal(p: Price) -> Result<Price, MoneyError> {
    (UNIT * UNIT).checked_div(p).ok_or(MoneyError::DivisionByZero)
}

/// Normalize a raw price carrying `decimals` fractional digits to 18-decimal
/// scale: `floor(raw * UNIT / 10^decimals)`.
///
/// The result may be zero when `decimals` is large relative to `raw`.
pub fn normalize(raw: Price, decimals: u8) -> Result<Price, MoneyError> {
    let divisor = BigUint::from(10u32).pow(decimals as u32);
    mul_div(&BigUint::from(raw), &BigUint::from(UNIT), &divisor)
}

fn mul_div(x: &BigUint, m: &BigUint, y: &BigUint) -> Result<Price, MoneyError> {
    if y.bits() == 0 {
        return Err(MoneyError::DivisionByZero);
    }
    let product = x * m;
    if product.bits() > INTERMEDIATE_BITS {
        return Err(MoneyError::Overflow);
    }
    Price::try_from(&(product / y)).map_err(|_| MoneyError::Overflow)
}

// ============================================================================
// Format / Parse
// ============================================================================

/// Render a price as a decimal string with all 18 fractional digits.
///
/// # Example
/// ```rust
/// use price_oracle::money::format_price;
/// assert_eq!(format_price(500_000_000_000_000_000), "0.500000000000000000");
/// ```
pub fn format_price(p: Price) -> String {
    // Decimal holds 96 bits of mantissa; larger prices fall back to integer split.
    match i128::try_from(p)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, PRICE_DECIMALS).ok())
    {
        Some(d) => format!("{:.prec$}", d, prec = PRICE_DECIMALS as usize),
        None => format!(
            "{}.{:0width$}",
            p / UNIT,
            p % UNIT,
            width = PRICE_DECIMALS as usize
        ),
    }
}

/// Parse a raw non-negative integer (as sent by feeders) from its string form.
pub fn parse_raw(s: &str) -> Result<Price, MoneyError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "expected decimal digits, got: {}",
            s
        )));
    }
    s.parse::<Price>().map_err(|_| MoneyError::Overflow)
}
