//! `ProcessOrder`: the shared check+apply pipeline for all eight order-tx kinds
//! (spec.md §4.2).

use dex_types::{
    calc_coin_amount, DexTxError, DexTxResult, OrderDetail, OrderSide, OrderTx, OrderTxMsg, TxId,
};
use tracing::instrument;

use crate::context::ExecContext;
use crate::order_checks::{
    check_fee, check_operator_signature, check_order_fields, check_order_operator,
    check_order_ranges, check_order_symbols, check_payer_signature, check_valid_height,
};

/// Runs every check in spec.md §4.2 order, then applies the freeze and persists the
/// resulting `OrderDetail`. `order_id` is the id assigned to this order (the
/// transaction's own hash; computed by the caller, hashing being out of scope here).
#[instrument(skip(ctx, msg), fields(order_id = %order_id))]
pub fn process_order(ctx: &mut ExecContext, msg: &OrderTxMsg, order_id: TxId) -> DexTxResult<()> {
    let digest = msg.digest_bytes();

    check_valid_height(ctx, msg.envelope.valid_height)?;
    check_payer_signature(ctx, msg.envelope.payer_uid, &digest, &msg.signature)?;
    check_fee(ctx, &msg.envelope.fee_symbol, msg.envelope.fee_amount)?;

    check_order_symbols(ctx, msg.order.coin_symbol(), msg.order.asset_symbol())?;
    check_order_fields(&msg.order)?;
    check_order_ranges(ctx, &msg.order)?;
    check_order_operator(ctx, &msg.order)?;
    check_operator_signature(ctx, &msg.order, &digest)?;

    if ctx
        .accounts
        .free_balance(msg.envelope.payer_uid, &msg.envelope.fee_symbol)
        < msg.envelope.fee_amount
    {
        return Err(DexTxError::InsufficientBalance(format!(
            "payer cannot afford fee of {} {}",
            msg.envelope.fee_amount, msg.envelope.fee_symbol
        )));
    }

    let detail = build_order_detail(&msg.order, order_id, msg.envelope.payer_uid, ctx.current_height)?;
    let (freeze_symbol, freeze_amount) = freeze_requirement(&detail);

    if ctx.accounts.free_balance(msg.envelope.payer_uid, freeze_symbol) < freeze_amount {
        return Err(DexTxError::InsufficientBalance(format!(
            "payer cannot afford to freeze {freeze_amount} {freeze_symbol}"
        )));
    }

    ctx.accounts
        .debit_free(msg.envelope.payer_uid, &msg.envelope.fee_symbol, msg.envelope.fee_amount)?;
    ctx.accounts
        .debit_free(msg.envelope.payer_uid, freeze_symbol, freeze_amount)?;
    ctx.accounts
        .credit_frozen(msg.envelope.payer_uid, freeze_symbol, freeze_amount);

    tracing::debug!(symbol = %freeze_symbol, amount = freeze_amount, "order frozen");
    ctx.order_book.put(detail);
    Ok(())
}

/// Residual tracking at submission time (spec.md §3): a limit order's residuals are
/// fully determined by its own fields; a market order's bounding side is known
/// (the budget or the amount offered) and the other residual starts at zero since
/// the matching engine, not this subsystem, discovers how much it actually fills.
fn build_order_detail(
    order: &OrderTx,
    order_id: TxId,
    owner_regid: dex_types::RegId,
    generated_height: u32,
) -> DexTxResult<OrderDetail> {
    use dex_types::OrderType::*;

    let (residual_coin_amount, residual_asset_amount) = match (order.order_type(), order.order_side()) {
        (Limit, _) => {
            let coin_amount = calc_coin_amount(order.asset_amount(), order.price())?;
            (coin_amount, order.asset_amount())
        }
        (Market, OrderSide::Buy) => (order.coin_amount(), 0),
        (Market, OrderSide::Sell) => (0, order.asset_amount()),
    };

    Ok(OrderDetail {
        order_id,
        owner_regid,
        order_type: order.order_type(),
        order_side: order.order_side(),
        coin_symbol: order.coin_symbol().clone(),
        asset_symbol: order.asset_symbol().clone(),
        price: order.price(),
        order_opt: order.order_opt(),
        dex_id: order.dex_id(),
        match_fee_ratio: order.match_fee_ratio(),
        residual_coin_amount,
        residual_asset_amount,
        generated_height,
    })
}

/// A buy order freezes coin (what it pays); a sell order freezes asset (what it
/// gives up).
fn freeze_requirement(detail: &OrderDetail) -> (&dex_types::TokenSymbol, u64) {
    match detail.order_side {
        OrderSide::Buy => (&detail.coin_symbol, detail.residual_coin_amount),
        OrderSide::Sell => (&detail.asset_symbol, detail.residual_asset_amount),
    }
}
