//! Fixed-point amount and price arithmetic (spec.md §4.1, §4.4).
//!
//! All monetary quantities are unsigned 64-bit integers. Every multiplication that
//! can overflow `u128` is rejected with `InvalidAmount`/`InvalidFee` before the
//! division runs, so the same rejection is reached on every validating node
//! regardless of native word size.

use crate::error::DexTxError;

/// Denominator of the fixed-point price ratio: `price_raw / PRICE_SCALE`.
pub const PRICE_SCALE: u64 = 100_000_000;

/// Denominator of the fixed-point fee ratio.
pub const FEE_RATIO_SCALE: u64 = 100_000_000;

/// `coin_amount = floor(asset_amount * price_raw / PRICE_SCALE)`.
///
/// This is the amount a buyer locks (or a settlement derives) for `asset_amount` of
/// asset at `price_raw`. Floor, not ceiling, per the consensus rounding-mode
/// resolution in SPEC_FULL.md.
pub fn calc_coin_amount(asset_amount: u64, price_raw: u64) -> Result<u64, DexTxError> {
    checked_mul_div_floor(asset_amount, price_raw, PRICE_SCALE)
        .ok_or_else(|| DexTxError::InvalidAmount("coin amount overflow".into()))
}

/// `fee = floor(amount * fee_ratio / FEE_RATIO_SCALE)`.
pub fn calc_order_fee(amount: u64, fee_ratio: u64) -> Result<u64, DexTxError> {
    checked_mul_div_floor(amount, fee_ratio, FEE_RATIO_SCALE)
        .ok_or_else(|| DexTxError::InvalidFee("fee calculation overflow".into()))
}

/// `floor(a * b / d)`, detecting overflow of the `a * b` product before dividing.
/// `d` must be nonzero.
pub fn checked_mul_div_floor(a: u64, b: u64, d: u64) -> Option<u64> {
    debug_assert!(d != 0);
    let product = (a as u128).checked_mul(b as u128)?;
    u64::try_from(product / d as u128).ok()
}
