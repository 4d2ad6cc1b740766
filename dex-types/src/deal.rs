//! Settle-transaction deal items (spec.md §4.6, §6).

use serde::{Deserialize, Serialize};

use crate::ids::TxId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexDealItem {
    pub buy_order_id: TxId,
    pub sell_order_id: TxId,
    pub deal_price: u64,
    pub deal_coin_amount: u64,
    pub deal_asset_amount: u64,
}
