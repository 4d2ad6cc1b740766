//! Consensus parameters for the DEX transaction family.
//!
//! These are not node preferences: every validating node on a given chain must load
//! the same `ConsensusParams` at a given height or it will diverge from the rest of
//! the network. `from_env` (mirroring the `envy`-based loader the teacher workspace
//! uses for its layer-1 client config) exists so a non-production network — a
//! devnet or testnet staging a parameter change — can run against a different table
//! without a recompile; production nodes use `ConsensusParams::default()`.

use std::collections::HashMap;

use dex_types::{RegId, PRICE_SCALE, FEE_RATIO_SCALE};
use serde::{Deserialize, Serialize};

/// Per-symbol amount/price bounds (spec.md §4.1 `CheckOrderAmountRange` /
/// `CheckOrderPriceRange`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolLimits {
    pub min_amount: u64,
    pub max_amount: u64,
    pub min_price: u64,
    pub max_price: u64,
}

impl Default for SymbolLimits {
    fn default() -> Self {
        Self {
            min_amount: 1,
            max_amount: 1_000_000_000 * PRICE_SCALE,
            min_price: 1,
            max_price: 1_000_000 * PRICE_SCALE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Denominator of the fixed-point price ratio, re-exported for callers that only
    /// depend on `dex-config`.
    pub price_scale: u64,
    /// Denominator of the fixed-point fee ratio.
    pub fee_ratio_scale: u64,
    /// Width, in blocks, of the default valid-height acceptance window.
    pub valid_height_window: u32,
    /// Maximum byte length of an order or settle memo.
    pub max_memo_len: usize,
    /// Per-symbol amount/price bounds; symbols absent from the table fall back to
    /// `default_symbol_limits`.
    pub symbol_limits: HashMap<String, SymbolLimits>,
    pub default_symbol_limits: SymbolLimits,
    /// The reserved dex's designated settler account (spec.md §4.6): only this
    /// account may submit a `Settle`/`SettleEx` transaction against the reserved
    /// dex. `None` means no settler has been designated, so every reserved-dex
    /// settle is rejected rather than left open to any payer.
    pub reserved_dex_settler: Option<RegId>,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            price_scale: PRICE_SCALE,
            fee_ratio_scale: FEE_RATIO_SCALE,
            valid_height_window: 1_000,
            max_memo_len: dex_types::order::MAX_MEMO_LEN,
            symbol_limits: HashMap::new(),
            default_symbol_limits: SymbolLimits::default(),
            reserved_dex_settler: None,
        }
    }
}

impl ConsensusParams {
    pub fn limits_for(&self, symbol: &str) -> SymbolLimits {
        self.symbol_limits
            .get(symbol)
            .copied()
            .unwrap_or(self.default_symbol_limits)
    }

    /// Loads overrides from `DEX_*` environment variables via `envy`, falling back to
    /// `Default` for anything unset. Per-symbol overrides are not expressible through
    /// flat env vars and are left to `default_symbol_limits`/direct construction.
    pub fn from_env() -> Result<Self, envy::Error> {
        #[derive(Deserialize)]
        struct EnvOverrides {
            valid_height_window: Option<u32>,
            max_memo_len: Option<usize>,
        }

        let overrides: EnvOverrides = envy::prefixed("DEX_").from_env()?;
        let mut params = Self::default();
        if let Some(w) = overrides.valid_height_window {
            params.valid_height_window = w;
        }
        if let Some(m) = overrides.max_memo_len {
            params.max_memo_len = m;
        }
        Ok(params)
    }
}
