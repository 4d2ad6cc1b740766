//! Cancel-order transaction execution (spec.md §4.5).

use dex_types::{CancelOrderTxMsg, DexTxError, DexTxResult, OrderSide};
use tracing::instrument;

use crate::context::ExecContext;
use crate::order_checks::{check_fee, check_payer_signature, check_valid_height};

#[instrument(skip(ctx, msg), fields(order_id = %msg.order_id))]
pub fn process_cancel(ctx: &mut ExecContext, msg: &CancelOrderTxMsg) -> DexTxResult<()> {
    let digest = msg.digest_bytes();

    check_valid_height(ctx, msg.envelope.valid_height)?;
    check_payer_signature(ctx, msg.envelope.payer_uid, &digest, &msg.signature)?;
    check_fee(ctx, &msg.envelope.fee_symbol, msg.envelope.fee_amount)?;

    let order = ctx
        .order_book
        .get(&msg.order_id)
        .ok_or_else(|| DexTxError::OrderNotFound(format!("order {} not found", msg.order_id)))?;

    let authorized = if order.dex_id.is_reserved() {
        order.owner_regid == msg.envelope.payer_uid
    } else {
        let operator = ctx.operators.get(order.dex_id).ok_or_else(|| {
            DexTxError::OperatorNotFound(format!("dex_id {} not found", order.dex_id))
        })?;
        order.owner_regid == msg.envelope.payer_uid || operator.owner_regid == msg.envelope.payer_uid
    };
    if !authorized {
        return Err(DexTxError::PayerAuthFailed(
            "payer is neither the order owner nor the order's operator owner".into(),
        ));
    }

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

    let (unfreeze_symbol, unfreeze_amount) = match order.order_side {
        OrderSide::Buy => (order.coin_symbol.clone(), order.residual_coin_amount),
        OrderSide::Sell => (order.asset_symbol.clone(), order.residual_asset_amount),
    };

    ctx.accounts
        .debit_free(msg.envelope.payer_uid, &msg.envelope.fee_symbol, msg.envelope.fee_amount)?;
    ctx.accounts
        .debit_frozen(order.owner_regid, &unfreeze_symbol, unfreeze_amount)?;
    ctx.accounts
        .credit_free(order.owner_regid, &unfreeze_symbol, unfreeze_amount);
    ctx.order_book.erase(&msg.order_id);

    tracing::debug!(symbol = %unfreeze_symbol, amount = unfreeze_amount, "order cancelled, residual unfrozen");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::TestEnv;
    use dex_types::{OrderDetail, OrderType, RegId, Signature, TokenSymbol, TxEnvelope, TxId};

    fn envelope(payer: RegId) -> TxEnvelope {
        TxEnvelope {
            version: 1,
            tx_type: dex_types::tx::tx_type::CANCEL_ORDER,
            valid_height: 10,
            payer_uid: payer,
            fee_symbol: TokenSymbol::new("USD").unwrap(),
            fee_amount: 1,
        }
    }

    #[test]
    fn owner_cancel_unfreezes_residual() {
        let mut env = TestEnv::new();
        let owner = RegId { height: 1, index: 0 };
        env.register_symbol("USD");
        env.register_symbol("BTC");
        env.credit(owner, "USD", 10);

        let order_id = TxId([5u8; 32]);
        env.put_order(OrderDetail {
            order_id,
            owner_regid: owner,
            order_type: OrderType::Limit,
            order_side: OrderSide::Buy,
            coin_symbol: TokenSymbol::new("USD").unwrap(),
            asset_symbol: TokenSymbol::new("BTC").unwrap(),
            price: 10,
            order_opt: dex_types::OrderOpt::new(true, false),
            dex_id: dex_types::DEX_RESERVED_ID,
            match_fee_ratio: 0,
            residual_coin_amount: 500,
            residual_asset_amount: 50,
            generated_height: 1,
        });
        // simulate the frozen balance order submission would have created
        {
            let mut ctx = env.context(0);
            ctx.accounts.credit_frozen(owner, &TokenSymbol::new("USD").unwrap(), 500);
        }

        let msg = CancelOrderTxMsg {
            envelope: envelope(owner),
            order_id,
            signature: Signature(vec![0xAAu8]),
        };
        let mut ctx = env.context(0);
        process_cancel(&mut ctx, &msg).unwrap();

        assert_eq!(env.order_book_get(&order_id), None);
        assert_eq!(env.account_frozen(owner, "USD"), 0);
        assert_eq!(env.account_free(owner, "USD"), 10 - 1 + 500);
    }

    #[test]
    fn non_owner_non_operator_cannot_cancel() {
        let mut env = TestEnv::new();
        let owner = RegId { height: 1, index: 0 };
        let stranger = RegId { height: 2, index: 0 };
        env.register_symbol("USD");
        env.register_symbol("BTC");
        env.credit(stranger, "USD", 10);

        let order_id = TxId([6u8; 32]);
        env.put_order(OrderDetail {
            order_id,
            owner_regid: owner,
            order_type: OrderType::Limit,
            order_side: OrderSide::Sell,
            coin_symbol: TokenSymbol::new("USD").unwrap(),
            asset_symbol: TokenSymbol::new("BTC").unwrap(),
            price: 10,
            order_opt: dex_types::OrderOpt::new(true, false),
            dex_id: dex_types::DEX_RESERVED_ID,
            match_fee_ratio: 0,
            residual_coin_amount: 0,
            residual_asset_amount: 50,
            generated_height: 1,
        });

        let msg = CancelOrderTxMsg {
            envelope: envelope(stranger),
            order_id,
            signature: Signature(vec![0xAAu8]),
        };
        let mut ctx = env.context(0);
        let err = process_cancel(&mut ctx, &msg).unwrap_err();
        assert!(matches!(err, DexTxError::PayerAuthFailed(_)));
    }
}
