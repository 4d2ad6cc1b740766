//! The individual checks composed by `process_order::process_order` (spec.md §4.2).

use dex_types::{DexTxError, DexTxResult, OrderOpt, OrderSide, OrderTx, OrderType, TokenSymbol};

use crate::context::ExecContext;

/// §4.2 step 1, valid-height portion: `valid_height` must not have already elapsed
/// relative to `current_height`, and must not be further out than the consensus
/// window allows.
pub fn check_valid_height(ctx: &ExecContext, valid_height: u32) -> DexTxResult<()> {
    if valid_height < ctx.current_height {
        return Err(DexTxError::PayerAuthFailed(format!(
            "valid_height {valid_height} already elapsed at height {}",
            ctx.current_height
        )));
    }
    if valid_height - ctx.current_height > ctx.params.valid_height_window {
        return Err(DexTxError::PayerAuthFailed(format!(
            "valid_height {valid_height} exceeds window from height {}",
            ctx.current_height
        )));
    }
    Ok(())
}

/// §4.2 step 1, signature portion.
pub fn check_payer_signature(
    ctx: &ExecContext,
    payer: dex_types::RegId,
    digest: &[u8],
    signature: &dex_types::Signature,
) -> DexTxResult<()> {
    if !ctx.verifier.verify(payer, digest, signature) {
        return Err(DexTxError::PayerAuthFailed(
            "payer signature does not verify".into(),
        ));
    }
    Ok(())
}

/// §4.2 step 1, fee portion: the fee symbol must be registered and the fee amount
/// must fall within the per-symbol amount range.
pub fn check_fee(ctx: &ExecContext, fee_symbol: &TokenSymbol, fee_amount: u64) -> DexTxResult<()> {
    if !ctx.assets.is_registered(fee_symbol) {
        return Err(DexTxError::InvalidSymbol(format!(
            "fee symbol {fee_symbol} is not registered"
        )));
    }
    let limits = ctx.params.limits_for(fee_symbol.as_str());
    if fee_amount < limits.min_amount || fee_amount > limits.max_amount {
        return Err(DexTxError::InvalidAmount(format!(
            "fee amount {fee_amount} out of range [{}, {}]",
            limits.min_amount, limits.max_amount
        )));
    }
    Ok(())
}

/// §4.2 step 2: both symbols registered, pair permitted, coin != asset.
pub fn check_order_symbols(
    ctx: &ExecContext,
    coin_symbol: &TokenSymbol,
    asset_symbol: &TokenSymbol,
) -> DexTxResult<()> {
    if coin_symbol == asset_symbol {
        return Err(DexTxError::InvalidSymbol(
            "coin_symbol and asset_symbol must differ".into(),
        ));
    }
    if !ctx.assets.is_registered(coin_symbol) {
        return Err(DexTxError::InvalidSymbol(format!(
            "coin symbol {coin_symbol} is not registered"
        )));
    }
    if !ctx.assets.is_registered(asset_symbol) {
        return Err(DexTxError::InvalidSymbol(format!(
            "asset symbol {asset_symbol} is not registered"
        )));
    }
    if !ctx
        .assets
        .is_trading_pair_permitted(coin_symbol, asset_symbol)
    {
        return Err(DexTxError::InvalidSymbol(format!(
            "trading pair ({coin_symbol}, {asset_symbol}) is not permitted"
        )));
    }
    Ok(())
}

/// §4.2 step 3: field validation by side x type (spec.md §3 invariants).
pub fn check_order_fields(order: &OrderTx) -> DexTxResult<()> {
    let price = order.price();
    let coin_amount = order.coin_amount();
    let asset_amount = order.asset_amount();

    match (order.order_type(), order.order_side()) {
        (OrderType::Limit, _) => {
            if price == 0 {
                return Err(DexTxError::InvalidPrice("limit order price must be > 0".into()));
            }
            if asset_amount == 0 {
                return Err(DexTxError::InvalidAmount(
                    "limit order asset_amount must be > 0".into(),
                ));
            }
        }
        (OrderType::Market, OrderSide::Buy) => {
            if price != 0 {
                return Err(DexTxError::InvalidPrice("buy market order price must be 0".into()));
            }
            if coin_amount == 0 {
                return Err(DexTxError::InvalidAmount(
                    "buy market order coin_amount must be > 0".into(),
                ));
            }
            if asset_amount != 0 {
                return Err(DexTxError::InvalidAmount(
                    "buy market order asset_amount must be 0".into(),
                ));
            }
        }
        (OrderType::Market, OrderSide::Sell) => {
            if price != 0 {
                return Err(DexTxError::InvalidPrice("sell market order price must be 0".into()));
            }
            if asset_amount == 0 {
                return Err(DexTxError::InvalidAmount(
                    "sell market order asset_amount must be > 0".into(),
                ));
            }
            if coin_amount != 0 {
                return Err(DexTxError::InvalidAmount(
                    "sell market order coin_amount must be 0".into(),
                ));
            }
        }
    }

    let opt: OrderOpt = order.order_opt();
    let has_fee_ratio = opt.has_fee_ratio();
    let match_fee_ratio = order.match_fee_ratio();
    if has_fee_ratio == (match_fee_ratio == 0) {
        return Err(DexTxError::InvalidOrderOpt(
            "match_fee_ratio must be nonzero iff HAS_FEE_RATIO is set".into(),
        ));
    }

    if let Some(ext) = order.ext() {
        use dex_types::validators::{fee_ratio_validator, memo_len_validator};
        use validator::Validate;

        memo_len_validator(&ext.memo).map_err(|e| DexTxError::InvalidOrderOpt(e.to_string()))?;
        if has_fee_ratio {
            fee_ratio_validator(&ext.match_fee_ratio)
                .map_err(|e| DexTxError::InvalidFee(e.to_string()))?;
        }
        if order.order_type() == OrderType::Limit {
            use dex_types::validators::ExtendedLimitOrderFields;
            ExtendedLimitOrderFields {
                memo: ext.memo.clone(),
                match_fee_ratio: ext.match_fee_ratio,
                price: order.price(),
            }
            .validate()
            .map_err(|e| DexTxError::InvalidOrderOpt(e.to_string()))?;
        }
    }

    Ok(())
}

/// §4.4 range checks on amounts and, for limit orders, price.
pub fn check_order_ranges(ctx: &ExecContext, order: &OrderTx) -> DexTxResult<()> {
    let asset_limits = ctx.params.limits_for(order.asset_symbol().as_str());
    let coin_limits = ctx.params.limits_for(order.coin_symbol().as_str());

    let check_amount = |amount: u64, limits: &dex_config::SymbolLimits, label: &str| {
        if amount != 0 && (amount < limits.min_amount || amount > limits.max_amount) {
            return Err(DexTxError::InvalidAmount(format!(
                "{label} amount {amount} out of range [{}, {}]",
                limits.min_amount, limits.max_amount
            )));
        }
        Ok(())
    };
    check_amount(order.asset_amount(), &asset_limits, "asset")?;
    check_amount(order.coin_amount(), &coin_limits, "coin")?;

    if order.order_type() == OrderType::Limit {
        let price = order.price();
        if price < asset_limits.min_price || price > asset_limits.max_price {
            return Err(DexTxError::InvalidPrice(format!(
                "price {price} out of range [{}, {}]",
                asset_limits.min_price, asset_limits.max_price
            )));
        }
    }
    Ok(())
}

/// §4.2 step 5: operator existence/enablement/public-flag permission, and
/// per-order fee-ratio bound.
pub fn check_order_operator(ctx: &ExecContext, order: &OrderTx) -> DexTxResult<()> {
    let dex_id = order.dex_id();
    if dex_id.is_reserved() {
        return Ok(());
    }
    let operator = ctx
        .operators
        .get(dex_id)
        .ok_or_else(|| DexTxError::OperatorNotFound(format!("dex_id {dex_id} not found")))?;
    if !operator.enabled {
        return Err(DexTxError::OperatorDisabled(format!("dex_id {dex_id} is disabled")));
    }
    if order.order_opt().is_public() && !operator.allow_public_order {
        return Err(DexTxError::OperatorAuthFailed(
            "operator does not allow public orders".into(),
        ));
    }
    if order.order_opt().has_fee_ratio() {
        let ratio = order.match_fee_ratio();
        if ratio > operator.max_fee_ratio {
            return Err(DexTxError::InvalidFee(format!(
                "match_fee_ratio {ratio} exceeds operator max {}",
                operator.max_fee_ratio
            )));
        }
    }
    Ok(())
}

/// §4.2 step 6: optional operator co-signature. Returns the resolved operator
/// (`None` for the reserved dex) so the caller does not look it up twice.
pub fn check_operator_signature(
    ctx: &ExecContext,
    order: &OrderTx,
    digest: &[u8],
) -> DexTxResult<()> {
    let dex_id = order.dex_id();
    let pair = order.operator_signature_pair();

    if dex_id.is_reserved() {
        if pair.is_some() {
            return Err(DexTxError::OperatorAuthFailed(
                "operator signature forbidden on the reserved dex".into(),
            ));
        }
        return Ok(());
    }

    let operator = ctx
        .operators
        .get(dex_id)
        .ok_or_else(|| DexTxError::OperatorNotFound(format!("dex_id {dex_id} not found")))?;

    let requires_signature = !order.order_opt().is_public();

    match pair {
        Some(p) => {
            if p.regid != operator.owner_regid {
                return Err(DexTxError::OperatorAuthFailed(
                    "operator signature regid does not match operator owner".into(),
                ));
            }
            if !ctx.verifier.verify(p.regid, digest, &p.signature) {
                return Err(DexTxError::OperatorAuthFailed(
                    "operator signature does not verify".into(),
                ));
            }
        }
        None if requires_signature => {
            return Err(DexTxError::OperatorAuthFailed(
                "private order on a non-reserved dex requires an operator signature".into(),
            ));
        }
        None => {}
    }
    Ok(())
}
