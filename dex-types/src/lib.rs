//! Wire types and the consensus error surface for the DEX order/cancel/settle
//! transaction family. See `SPEC_FULL.md` at the workspace root.

#[macro_use]
mod macros;

pub mod amount;
pub mod codec;
pub mod deal;
pub mod envelope;
pub mod error;
pub mod ids;
pub mod operator;
pub mod order;
pub mod tx;
pub mod validators;

pub use amount::{calc_coin_amount, calc_order_fee, FEE_RATIO_SCALE, PRICE_SCALE};
pub use deal::DexDealItem;
pub use envelope::TxEnvelope;
pub use error::{DexTxError, DexTxResult};
pub use ids::{DexId, RegId, TokenSymbol, TxId, DEX_RESERVED_ID};
pub use operator::DexOperator;
pub use order::{
    ExtendedOrderFields, OperatorSignaturePair, OrderDetail, OrderOpt, OrderSide, OrderTx,
    OrderType, Signature,
};
pub use tx::{
    CancelOrderTxMsg, DexTx, OrderTxKind, OrderTxMsg, SettleExTxMsg, SettleTxMsg,
};
