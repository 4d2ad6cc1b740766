//! Identifier primitives of the DEX transaction family.

use serde::{Deserialize, Serialize};
use std::fmt;

basic_type!(
    /// Identifier of a DEX operator namespace. `DEX_RESERVED_ID` is the system default.
    DexId,
    u64
);

/// The reserved, system-operated default DEX. Orders and settlements on this id do
/// not require an operator signature and settle through the system fee pool.
pub const DEX_RESERVED_ID: DexId = DexId(0);

impl DexId {
    pub fn is_reserved(&self) -> bool {
        *self == DEX_RESERVED_ID
    }
}

/// A compact account identifier registered on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct RegId {
    pub height: u32,
    pub index: u16,
}

impl fmt::Display for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.height, self.index)
    }
}

/// Id of a transaction, and by extension the id of any order it created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TxId(pub [u8; 32]);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A registered token symbol, e.g. `USD`, `BTC`. Non-empty, bounded-length, validated
/// against the asset registry (out of scope here; see `dex-core::context::AccountStore`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TokenSymbol(String);

/// Maximum byte length of a registered token symbol, matching typical on-chain asset
/// registries (e.g. `WUSD`, `WICC`).
pub const MAX_SYMBOL_LEN: usize = 8;

impl TokenSymbol {
    pub fn new(symbol: impl Into<String>) -> Result<Self, crate::error::DexTxError> {
        let symbol = symbol.into();
        if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN || !symbol.is_ascii() {
            return Err(crate::error::DexTxError::InvalidSymbol(format!(
                "symbol {symbol:?} is empty, too long or non-ascii"
            )));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
