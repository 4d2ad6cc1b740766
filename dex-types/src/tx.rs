//! Concrete transaction messages: envelope + kind-specific fields + payer signature,
//! and their wire encode/decode and signing-digest byte sequences (spec.md §6, §4.7).

use crate::codec::{
    read_bytes, read_fixed32, read_str, read_varint, write_bytes, write_fixed32, write_str,
    write_varint,
};
use crate::deal::DexDealItem;
use crate::envelope::TxEnvelope;
use crate::error::DexTxError;
use crate::ids::{DexId, RegId, TokenSymbol, TxId, DEX_RESERVED_ID};
use crate::order::{ExtendedOrderFields, OperatorSignaturePair, OrderOpt, OrderTx, Signature};

fn write_regid(out: &mut Vec<u8>, regid: &RegId) {
    write_varint(out, regid.height as u64);
    out.extend_from_slice(&regid.index.to_be_bytes());
}

fn read_regid(bytes: &[u8], cursor: &mut usize) -> Result<RegId, DexTxError> {
    let height = read_varint(bytes, cursor)? as u32;
    let idx_bytes = bytes
        .get(*cursor..*cursor + 2)
        .ok_or_else(|| DexTxError::InvalidAmount("regid index truncated".into()))?;
    let index = u16::from_be_bytes([idx_bytes[0], idx_bytes[1]]);
    *cursor += 2;
    Ok(RegId { height, index })
}

/// Per-kind `tx_type` byte: the common-prefix discriminator hashed into the
/// digest and written to the wire immediately after `version` (spec.md §6).
pub mod tx_type {
    pub const BUY_LIMIT: u8 = 1;
    pub const BUY_LIMIT_EX: u8 = 2;
    pub const SELL_LIMIT: u8 = 3;
    pub const SELL_LIMIT_EX: u8 = 4;
    pub const BUY_MARKET: u8 = 5;
    pub const BUY_MARKET_EX: u8 = 6;
    pub const SELL_MARKET: u8 = 7;
    pub const SELL_MARKET_EX: u8 = 8;
    pub const CANCEL_ORDER: u8 = 9;
    pub const SETTLE: u8 = 10;
    pub const SETTLE_EX: u8 = 11;
}

fn write_envelope(out: &mut Vec<u8>, env: &TxEnvelope) {
    write_varint(out, env.version);
    out.push(env.tx_type);
    write_varint(out, env.valid_height as u64);
    write_regid(out, &env.payer_uid);
    write_str(out, env.fee_symbol.as_str());
    write_varint(out, env.fee_amount);
}

fn read_envelope(bytes: &[u8], cursor: &mut usize) -> Result<TxEnvelope, DexTxError> {
    let version = read_varint(bytes, cursor)?;
    let tx_type = *bytes
        .get(*cursor)
        .ok_or_else(|| DexTxError::InvalidOrderOpt("tx_type truncated".into()))?;
    *cursor += 1;
    let valid_height = read_varint(bytes, cursor)? as u32;
    let payer_uid = read_regid(bytes, cursor)?;
    let fee_symbol = TokenSymbol::new(read_str(bytes, cursor)?)?;
    let fee_amount = read_varint(bytes, cursor)?;
    Ok(TxEnvelope {
        version,
        tx_type,
        valid_height,
        payer_uid,
        fee_symbol,
        fee_amount,
    })
}

fn check_tx_type(envelope: &TxEnvelope, expected: u8) -> Result<(), DexTxError> {
    if envelope.tx_type != expected {
        return Err(DexTxError::InvalidOrderOpt(format!(
            "tx_type {} does not match expected {expected}",
            envelope.tx_type
        )));
    }
    Ok(())
}

fn write_operator_regid(out: &mut Vec<u8>, regid: Option<&RegId>) {
    match regid {
        Some(r) => {
            out.push(1);
            write_regid(out, r);
        }
        None => out.push(0),
    }
}

fn write_symbols(out: &mut Vec<u8>, coin: &TokenSymbol, asset: &TokenSymbol) {
    write_str(out, coin.as_str());
    write_str(out, asset.as_str());
}

fn read_symbols(bytes: &[u8], cursor: &mut usize) -> Result<(TokenSymbol, TokenSymbol), DexTxError> {
    let coin = TokenSymbol::new(read_str(bytes, cursor)?)?;
    let asset = TokenSymbol::new(read_str(bytes, cursor)?)?;
    Ok((coin, asset))
}

/// Digest-only ext fields: `order_opt, dex_id, match_fee_ratio, memo`. The operator
/// regid is hashed separately via `write_operator_regid`, and the operator
/// signature itself is never hashed (spec.md §4.7(ii)).
fn write_ext(out: &mut Vec<u8>, ext: &ExtendedOrderFields) {
    out.push(ext.order_opt.0);
    write_varint(out, *ext.dex_id);
    write_varint(out, ext.match_fee_ratio);
    write_bytes(out, &ext.memo);
}

fn read_ext(bytes: &[u8], cursor: &mut usize) -> Result<ExtendedOrderFields, DexTxError> {
    let order_opt = OrderOpt(
        *bytes
            .get(*cursor)
            .ok_or_else(|| DexTxError::InvalidOrderOpt("order_opt truncated".into()))?,
    );
    *cursor += 1;
    let dex_id = DexId(read_varint(bytes, cursor)?);
    let match_fee_ratio = read_varint(bytes, cursor)?;
    let memo = read_bytes(bytes, cursor)?;
    Ok(ExtendedOrderFields {
        order_opt,
        dex_id,
        match_fee_ratio,
        memo,
        operator_signature_pair: None,
    })
}

fn read_operator_regid(bytes: &[u8], cursor: &mut usize) -> Result<Option<RegId>, DexTxError> {
    let present = *bytes
        .get(*cursor)
        .ok_or_else(|| DexTxError::OperatorAuthFailed("operator regid tag truncated".into()))?;
    *cursor += 1;
    if present == 1 {
        Ok(Some(read_regid(bytes, cursor)?))
    } else {
        Ok(None)
    }
}

/// `read_ext` followed by the standalone operator-regid field that sits right
/// after it in both the digest and the wire form. The signature, present only
/// on the wire, is filled in afterwards by `finish_ext_operator_sig`.
fn read_ext_with_operator_regid(
    bytes: &[u8],
    cursor: &mut usize,
) -> Result<ExtendedOrderFields, DexTxError> {
    let mut ext = read_ext(bytes, cursor)?;
    if let Some(regid) = read_operator_regid(bytes, cursor)? {
        ext.operator_signature_pair = Some(OperatorSignaturePair {
            regid,
            signature: Signature(Vec::new()),
        });
    }
    Ok(ext)
}

/// An order transaction message: envelope + order payload + payer signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTxMsg {
    pub envelope: TxEnvelope,
    pub order: OrderTx,
    pub signature: Signature,
}

impl OrderTxMsg {
    /// The canonical byte sequence hashed to produce `ComputeSignatureHash`
    /// (spec.md §4.7). The operator signature is excluded; only the operator
    /// `RegId` is hashed, so the operator can co-sign the same digest as the payer.
    pub fn digest_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_envelope(&mut out, &self.envelope);
        let o = &self.order;
        write_symbols(&mut out, o.coin_symbol(), o.asset_symbol());
        match o {
            OrderTx::BuyLimit { asset_amount, price, .. }
            | OrderTx::SellLimit { asset_amount, price, .. } => {
                write_varint(&mut out, *asset_amount);
                write_varint(&mut out, *price);
            }
            OrderTx::BuyLimitEx { asset_amount, price, ext, .. }
            | OrderTx::SellLimitEx { asset_amount, price, ext, .. } => {
                write_varint(&mut out, *asset_amount);
                write_varint(&mut out, *price);
                write_ext(&mut out, ext);
                write_operator_regid(
                    &mut out,
                    ext.operator_signature_pair.as_ref().map(|p| &p.regid),
                );
            }
            OrderTx::BuyMarket { coin_amount, .. } => {
                write_varint(&mut out, *coin_amount);
            }
            OrderTx::BuyMarketEx { coin_amount, ext, .. } => {
                write_varint(&mut out, *coin_amount);
                write_ext(&mut out, ext);
                write_operator_regid(
                    &mut out,
                    ext.operator_signature_pair.as_ref().map(|p| &p.regid),
                );
            }
            OrderTx::SellMarket { asset_amount, .. } => {
                write_varint(&mut out, *asset_amount);
            }
            OrderTx::SellMarketEx { asset_amount, ext, .. } => {
                write_varint(&mut out, *asset_amount);
                write_ext(&mut out, ext);
                write_operator_regid(
                    &mut out,
                    ext.operator_signature_pair.as_ref().map(|p| &p.regid),
                );
            }
        }
        out
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.digest_bytes();
        // the extended variants' digest already includes ext+operator regid; the
        // wire form additionally carries the operator signature bytes themselves.
        if let Some(ext) = self.order.ext() {
            if let Some(pair) = &ext.operator_signature_pair {
                write_bytes(&mut out, &pair.signature.0);
            }
        }
        write_bytes(&mut out, &self.signature.0);
        out
    }

    pub fn decode(kind: OrderTxKind, bytes: &[u8]) -> Result<Self, DexTxError> {
        let mut cursor = 0;
        let envelope = read_envelope(bytes, &mut cursor)?;
        check_tx_type(&envelope, kind.tx_type())?;
        let (coin_symbol, asset_symbol) = read_symbols(bytes, &mut cursor)?;
        let order = match kind {
            OrderTxKind::BuyLimit => {
                let asset_amount = read_varint(bytes, &mut cursor)?;
                let price = read_varint(bytes, &mut cursor)?;
                OrderTx::BuyLimit {
                    coin_symbol,
                    asset_symbol,
                    asset_amount,
                    price,
                }
            }
            OrderTxKind::BuyLimitEx => {
                let asset_amount = read_varint(bytes, &mut cursor)?;
                let price = read_varint(bytes, &mut cursor)?;
                let mut ext = read_ext_with_operator_regid(bytes, &mut cursor)?;
                finish_ext_operator_sig(bytes, &mut cursor, &mut ext)?;
                OrderTx::BuyLimitEx {
                    coin_symbol,
                    asset_symbol,
                    asset_amount,
                    price,
                    ext,
                }
            }
            OrderTxKind::SellLimit => {
                let asset_amount = read_varint(bytes, &mut cursor)?;
                let price = read_varint(bytes, &mut cursor)?;
                OrderTx::SellLimit {
                    coin_symbol,
                    asset_symbol,
                    asset_amount,
                    price,
                }
            }
            OrderTxKind::SellLimitEx => {
                let asset_amount = read_varint(bytes, &mut cursor)?;
                let price = read_varint(bytes, &mut cursor)?;
                let mut ext = read_ext_with_operator_regid(bytes, &mut cursor)?;
                finish_ext_operator_sig(bytes, &mut cursor, &mut ext)?;
                OrderTx::SellLimitEx {
                    coin_symbol,
                    asset_symbol,
                    asset_amount,
                    price,
                    ext,
                }
            }
            OrderTxKind::BuyMarket => {
                let coin_amount = read_varint(bytes, &mut cursor)?;
                OrderTx::BuyMarket {
                    coin_symbol,
                    asset_symbol,
                    coin_amount,
                }
            }
            OrderTxKind::BuyMarketEx => {
                let coin_amount = read_varint(bytes, &mut cursor)?;
                let mut ext = read_ext_with_operator_regid(bytes, &mut cursor)?;
                finish_ext_operator_sig(bytes, &mut cursor, &mut ext)?;
                OrderTx::BuyMarketEx {
                    coin_symbol,
                    asset_symbol,
                    coin_amount,
                    ext,
                }
            }
            OrderTxKind::SellMarket => {
                let asset_amount = read_varint(bytes, &mut cursor)?;
                OrderTx::SellMarket {
                    coin_symbol,
                    asset_symbol,
                    asset_amount,
                }
            }
            OrderTxKind::SellMarketEx => {
                let asset_amount = read_varint(bytes, &mut cursor)?;
                let mut ext = read_ext_with_operator_regid(bytes, &mut cursor)?;
                finish_ext_operator_sig(bytes, &mut cursor, &mut ext)?;
                OrderTx::SellMarketEx {
                    coin_symbol,
                    asset_symbol,
                    asset_amount,
                    ext,
                }
            }
        };
        let signature = Signature(read_bytes(bytes, &mut cursor)?);
        Ok(Self {
            envelope,
            order,
            signature,
        })
    }
}

/// `read_ext_with_operator_regid` leaves `operator_signature_pair.signature` empty
/// (the digest omits it); the wire form carries the real bytes right after, only
/// when a pair is present, matching `encode`'s placement.
fn finish_ext_operator_sig(
    bytes: &[u8],
    cursor: &mut usize,
    ext: &mut ExtendedOrderFields,
) -> Result<(), DexTxError> {
    if let Some(pair) = ext.operator_signature_pair.as_mut() {
        pair.signature = Signature(read_bytes(bytes, cursor)?);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTxKind {
    BuyLimit,
    BuyLimitEx,
    SellLimit,
    SellLimitEx,
    BuyMarket,
    BuyMarketEx,
    SellMarket,
    SellMarketEx,
}

impl OrderTxKind {
    pub fn of(order: &OrderTx) -> Self {
        match order {
            OrderTx::BuyLimit { .. } => Self::BuyLimit,
            OrderTx::BuyLimitEx { .. } => Self::BuyLimitEx,
            OrderTx::SellLimit { .. } => Self::SellLimit,
            OrderTx::SellLimitEx { .. } => Self::SellLimitEx,
            OrderTx::BuyMarket { .. } => Self::BuyMarket,
            OrderTx::BuyMarketEx { .. } => Self::BuyMarketEx,
            OrderTx::SellMarket { .. } => Self::SellMarket,
            OrderTx::SellMarketEx { .. } => Self::SellMarketEx,
        }
    }

    pub fn tx_type(self) -> u8 {
        match self {
            Self::BuyLimit => tx_type::BUY_LIMIT,
            Self::BuyLimitEx => tx_type::BUY_LIMIT_EX,
            Self::SellLimit => tx_type::SELL_LIMIT,
            Self::SellLimitEx => tx_type::SELL_LIMIT_EX,
            Self::BuyMarket => tx_type::BUY_MARKET,
            Self::BuyMarketEx => tx_type::BUY_MARKET_EX,
            Self::SellMarket => tx_type::SELL_MARKET,
            Self::SellMarketEx => tx_type::SELL_MARKET_EX,
        }
    }
}

/// Cancel-order transaction (spec.md §4.5, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrderTxMsg {
    pub envelope: TxEnvelope,
    pub order_id: TxId,
    pub signature: Signature,
}

impl CancelOrderTxMsg {
    pub fn digest_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_envelope(&mut out, &self.envelope);
        write_fixed32(&mut out, &self.order_id.0);
        out
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.digest_bytes();
        write_bytes(&mut out, &self.signature.0);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DexTxError> {
        let mut cursor = 0;
        let envelope = read_envelope(bytes, &mut cursor)?;
        check_tx_type(&envelope, tx_type::CANCEL_ORDER)?;
        let order_id = TxId(read_fixed32(bytes, &mut cursor)?);
        let signature = Signature(read_bytes(bytes, &mut cursor)?);
        Ok(Self {
            envelope,
            order_id,
            signature,
        })
    }
}

fn write_deal_item(out: &mut Vec<u8>, item: &DexDealItem) {
    write_fixed32(out, &item.buy_order_id.0);
    write_fixed32(out, &item.sell_order_id.0);
    write_varint(out, item.deal_price);
    write_varint(out, item.deal_coin_amount);
    write_varint(out, item.deal_asset_amount);
}

fn read_deal_item(bytes: &[u8], cursor: &mut usize) -> Result<DexDealItem, DexTxError> {
    let buy_order_id = TxId(read_fixed32(bytes, cursor)?);
    let sell_order_id = TxId(read_fixed32(bytes, cursor)?);
    let deal_price = read_varint(bytes, cursor)?;
    let deal_coin_amount = read_varint(bytes, cursor)?;
    let deal_asset_amount = read_varint(bytes, cursor)?;
    Ok(DexDealItem {
        buy_order_id,
        sell_order_id,
        deal_price,
        deal_coin_amount,
        deal_asset_amount,
    })
}

fn write_deal_items(out: &mut Vec<u8>, items: &[DexDealItem]) {
    write_varint(out, items.len() as u64);
    for item in items {
        write_deal_item(out, item);
    }
}

fn read_deal_items(bytes: &[u8], cursor: &mut usize) -> Result<Vec<DexDealItem>, DexTxError> {
    let len = read_varint(bytes, cursor)? as usize;
    (0..len).map(|_| read_deal_item(bytes, cursor)).collect()
}

/// Settle transaction on the reserved dex (spec.md §4.6, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleTxMsg {
    pub envelope: TxEnvelope,
    pub deal_items: Vec<DexDealItem>,
    pub signature: Signature,
}

impl SettleTxMsg {
    pub fn dex_id(&self) -> DexId {
        DEX_RESERVED_ID
    }

    pub fn digest_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_envelope(&mut out, &self.envelope);
        write_deal_items(&mut out, &self.deal_items);
        out
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.digest_bytes();
        write_bytes(&mut out, &self.signature.0);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DexTxError> {
        let mut cursor = 0;
        let envelope = read_envelope(bytes, &mut cursor)?;
        check_tx_type(&envelope, tx_type::SETTLE)?;
        let deal_items = read_deal_items(bytes, &mut cursor)?;
        let signature = Signature(read_bytes(bytes, &mut cursor)?);
        Ok(Self {
            envelope,
            deal_items,
            signature,
        })
    }
}

/// Settle transaction on an arbitrary dex, with memo (spec.md §4.6, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleExTxMsg {
    pub envelope: TxEnvelope,
    pub dex_id: DexId,
    pub deal_items: Vec<DexDealItem>,
    pub memo: Vec<u8>,
    pub signature: Signature,
}

impl SettleExTxMsg {
    pub fn digest_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_envelope(&mut out, &self.envelope);
        write_varint(&mut out, *self.dex_id);
        write_deal_items(&mut out, &self.deal_items);
        write_bytes(&mut out, &self.memo);
        out
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.digest_bytes();
        write_bytes(&mut out, &self.signature.0);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DexTxError> {
        let mut cursor = 0;
        let envelope = read_envelope(bytes, &mut cursor)?;
        check_tx_type(&envelope, tx_type::SETTLE_EX)?;
        let dex_id = DexId(read_varint(bytes, &mut cursor)?);
        let deal_items = read_deal_items(bytes, &mut cursor)?;
        let memo = read_bytes(bytes, &mut cursor)?;
        let signature = Signature(read_bytes(bytes, &mut cursor)?);
        Ok(Self {
            envelope,
            dex_id,
            deal_items,
            memo,
            signature,
        })
    }
}

/// The full DEX transaction family (tagged variant, per the Design Notes
/// "Polymorphism over tx kinds" resolution in spec.md §9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DexTx {
    Order(OrderTxMsg),
    Cancel(CancelOrderTxMsg),
    Settle(SettleTxMsg),
    SettleEx(SettleExTxMsg),
}
