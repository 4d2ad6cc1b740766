//! DEX operator registry record (spec.md §2 component 5).

use serde::{Deserialize, Serialize};

use crate::ids::{DexId, RegId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexOperator {
    pub dex_id: DexId,
    pub owner_regid: RegId,
    pub fee_receiver_regid: RegId,
    pub maker_fee_ratio: u64,
    pub taker_fee_ratio: u64,
    pub allow_public_order: bool,
    pub max_fee_ratio: u64,
    pub enabled: bool,
}

impl DexOperator {
    /// The default ratio for a side that did not submit `HAS_FEE_RATIO`, selected by
    /// whether that side is the deal's taker (spec.md §4.3).
    pub fn default_fee_ratio(&self, is_taker: bool) -> u64 {
        if is_taker {
            self.taker_fee_ratio
        } else {
            self.maker_fee_ratio
        }
    }
}
