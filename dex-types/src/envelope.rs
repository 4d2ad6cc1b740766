//! Common transaction header, shared by every concrete tx kind (spec.md §6).

use serde::{Deserialize, Serialize};

use crate::ids::{RegId, TokenSymbol};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEnvelope {
    pub version: u64,
    /// Discriminates the concrete tx kind on the wire and in the digest; see the
    /// `tx_type` module in `dex_types::tx` for the per-kind byte values.
    pub tx_type: u8,
    pub valid_height: u32,
    pub payer_uid: RegId,
    pub fee_symbol: TokenSymbol,
    pub fee_amount: u64,
}
