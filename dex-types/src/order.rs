//! The order-transaction family's data model (spec.md §3).

use serde::{Deserialize, Serialize};

use crate::ids::{DexId, RegId, TokenSymbol, TxId, DEX_RESERVED_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order-level options bitfield: `IS_PUBLIC`, `HAS_FEE_RATIO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderOpt(pub u8);

impl OrderOpt {
    pub const IS_PUBLIC: u8 = 0b01;
    pub const HAS_FEE_RATIO: u8 = 0b10;

    pub fn new(is_public: bool, has_fee_ratio: bool) -> Self {
        let mut bits = 0;
        if is_public {
            bits |= Self::IS_PUBLIC;
        }
        if has_fee_ratio {
            bits |= Self::HAS_FEE_RATIO;
        }
        Self(bits)
    }

    pub fn is_public(&self) -> bool {
        self.0 & Self::IS_PUBLIC != 0
    }

    pub fn has_fee_ratio(&self) -> bool {
        self.0 & Self::HAS_FEE_RATIO != 0
    }
}

/// Maximum byte length of an order memo.
pub const MAX_MEMO_LEN: usize = 256;

/// The payer's signature over `ComputeSignatureHash`. Verification is out of scope
/// (external collaborator, see `dex-core::context::Verifier`); this crate only
/// carries the opaque bytes across the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

/// `(operator regid, operator signature)`, carried by extended order variants when
/// the order is issued on behalf of a non-default dex. Excluded from the signing
/// digest (only the `RegId` is hashed), per spec.md §4.7.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSignaturePair {
    pub regid: RegId,
    pub signature: Signature,
}

/// Fields shared by all extended order variants, beyond the basic fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedOrderFields {
    pub order_opt: OrderOpt,
    pub dex_id: DexId,
    pub match_fee_ratio: u64,
    pub memo: Vec<u8>,
    pub operator_signature_pair: Option<OperatorSignaturePair>,
}

impl ExtendedOrderFields {
    /// The basic-variant equivalent: public, default dex, no operator-set fee ratio,
    /// no memo, no operator co-signature.
    pub fn basic() -> Self {
        Self {
            order_opt: OrderOpt::new(true, false),
            dex_id: DEX_RESERVED_ID,
            match_fee_ratio: 0,
            memo: Vec::new(),
            operator_signature_pair: None,
        }
    }
}

/// The concrete order transaction kinds (spec.md §6 wire table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderTx {
    BuyLimit {
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        asset_amount: u64,
        price: u64,
    },
    BuyLimitEx {
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        asset_amount: u64,
        price: u64,
        ext: ExtendedOrderFields,
    },
    SellLimit {
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        asset_amount: u64,
        price: u64,
    },
    SellLimitEx {
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        asset_amount: u64,
        price: u64,
        ext: ExtendedOrderFields,
    },
    BuyMarket {
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        coin_amount: u64,
    },
    BuyMarketEx {
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        coin_amount: u64,
        ext: ExtendedOrderFields,
    },
    SellMarket {
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        asset_amount: u64,
    },
    SellMarketEx {
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        asset_amount: u64,
        ext: ExtendedOrderFields,
    },
}

impl OrderTx {
    pub fn order_type(&self) -> OrderType {
        match self {
            OrderTx::BuyLimit { .. }
            | OrderTx::BuyLimitEx { .. }
            | OrderTx::SellLimit { .. }
            | OrderTx::SellLimitEx { .. } => OrderType::Limit,
            _ => OrderType::Market,
        }
    }

    pub fn order_side(&self) -> OrderSide {
        match self {
            OrderTx::BuyLimit { .. }
            | OrderTx::BuyLimitEx { .. }
            | OrderTx::BuyMarket { .. }
            | OrderTx::BuyMarketEx { .. } => OrderSide::Buy,
            _ => OrderSide::Sell,
        }
    }

    pub fn coin_symbol(&self) -> &TokenSymbol {
        match self {
            OrderTx::BuyLimit { coin_symbol, .. }
            | OrderTx::BuyLimitEx { coin_symbol, .. }
            | OrderTx::SellLimit { coin_symbol, .. }
            | OrderTx::SellLimitEx { coin_symbol, .. }
            | OrderTx::BuyMarket { coin_symbol, .. }
            | OrderTx::BuyMarketEx { coin_symbol, .. }
            | OrderTx::SellMarket { coin_symbol, .. }
            | OrderTx::SellMarketEx { coin_symbol, .. } => coin_symbol,
        }
    }

    pub fn asset_symbol(&self) -> &TokenSymbol {
        match self {
            OrderTx::BuyLimit { asset_symbol, .. }
            | OrderTx::BuyLimitEx { asset_symbol, .. }
            | OrderTx::SellLimit { asset_symbol, .. }
            | OrderTx::SellLimitEx { asset_symbol, .. }
            | OrderTx::BuyMarket { asset_symbol, .. }
            | OrderTx::BuyMarketEx { asset_symbol, .. }
            | OrderTx::SellMarket { asset_symbol, .. }
            | OrderTx::SellMarketEx { asset_symbol, .. } => asset_symbol,
        }
    }

    /// `coin_amount` field as carried on the wire (0 for every variant but
    /// `BuyMarket(Ex)`, where it is the submitted amount).
    pub fn coin_amount(&self) -> u64 {
        match self {
            OrderTx::BuyMarket { coin_amount, .. } | OrderTx::BuyMarketEx { coin_amount, .. } => {
                *coin_amount
            }
            _ => 0,
        }
    }

    /// `asset_amount` field as carried on the wire (0 for `BuyMarket(Ex)`).
    pub fn asset_amount(&self) -> u64 {
        match self {
            OrderTx::BuyLimit { asset_amount, .. }
            | OrderTx::BuyLimitEx { asset_amount, .. }
            | OrderTx::SellLimit { asset_amount, .. }
            | OrderTx::SellLimitEx { asset_amount, .. }
            | OrderTx::SellMarket { asset_amount, .. }
            | OrderTx::SellMarketEx { asset_amount, .. } => *asset_amount,
            _ => 0,
        }
    }

    pub fn price(&self) -> u64 {
        match self {
            OrderTx::BuyLimit { price, .. }
            | OrderTx::BuyLimitEx { price, .. }
            | OrderTx::SellLimit { price, .. }
            | OrderTx::SellLimitEx { price, .. } => *price,
            _ => 0,
        }
    }

    pub fn ext(&self) -> Option<&ExtendedOrderFields> {
        match self {
            OrderTx::BuyLimitEx { ext, .. }
            | OrderTx::SellLimitEx { ext, .. }
            | OrderTx::BuyMarketEx { ext, .. }
            | OrderTx::SellMarketEx { ext, .. } => Some(ext),
            _ => None,
        }
    }

    pub fn dex_id(&self) -> DexId {
        self.ext().map(|e| e.dex_id).unwrap_or(DEX_RESERVED_ID)
    }

    pub fn order_opt(&self) -> OrderOpt {
        self.ext()
            .map(|e| e.order_opt)
            .unwrap_or_else(|| OrderOpt::new(true, false))
    }

    pub fn match_fee_ratio(&self) -> u64 {
        self.ext().map(|e| e.match_fee_ratio).unwrap_or(0)
    }

    pub fn memo(&self) -> &[u8] {
        self.ext().map(|e| e.memo.as_slice()).unwrap_or(&[])
    }

    pub fn operator_signature_pair(&self) -> Option<&OperatorSignaturePair> {
        self.ext().and_then(|e| e.operator_signature_pair.as_ref())
    }

    pub fn is_extended(&self) -> bool {
        self.ext().is_some()
    }
}

/// The persistent representation of an open order (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order_id: TxId,
    pub owner_regid: RegId,
    pub order_type: OrderType,
    pub order_side: OrderSide,
    pub coin_symbol: TokenSymbol,
    pub asset_symbol: TokenSymbol,
    pub price: u64,
    pub order_opt: OrderOpt,
    pub dex_id: DexId,
    /// Fee-ratio policy denormalized at order-submission time (spec.md §4.3 step 1).
    pub match_fee_ratio: u64,
    pub residual_coin_amount: u64,
    pub residual_asset_amount: u64,
    pub generated_height: u32,
}

impl OrderDetail {
    /// An `OrderDetail` exists in the order-book store iff it has strictly positive
    /// residuals (spec.md §3 invariants).
    pub fn has_positive_residual(&self) -> bool {
        self.residual_coin_amount > 0 || self.residual_asset_amount > 0
    }
}
