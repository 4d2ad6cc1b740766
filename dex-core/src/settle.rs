//! Settle transaction execution (spec.md §4.6): applies a batch of deals against
//! previously-placed orders, one at a time, in the order the batch lists them.

use dex_types::{
    calc_coin_amount, calc_order_fee, DexDealItem, DexId, DexTxError, DexTxResult, OrderDetail,
    OrderSide, OrderType, RegId, Signature, TokenSymbol,
};
use tracing::instrument;

use crate::context::ExecContext;
use crate::fee::{resolve_fee_ratio, taker_side};

/// The settle-specific envelope fields, common to `SettleTxMsg` and `SettleExTxMsg`
/// (spec.md §6). `SettleTxMsg` always settles on the reserved dex and carries no
/// memo; `SettleExTxMsg` names an arbitrary dex and a memo the caller ignores here.
pub struct SettleRequest<'a> {
    pub dex_id: DexId,
    pub payer_uid: RegId,
    pub valid_height: u32,
    pub fee_symbol: &'a TokenSymbol,
    pub fee_amount: u64,
    pub deal_items: &'a [DexDealItem],
    pub digest: &'a [u8],
    pub signature: &'a Signature,
}

#[instrument(skip(ctx, req), fields(dex_id = %req.dex_id, deals = req.deal_items.len()))]
pub fn process_settle(ctx: &mut ExecContext, req: &SettleRequest) -> DexTxResult<()> {
    crate::order_checks::check_valid_height(ctx, req.valid_height)?;
    crate::order_checks::check_payer_signature(ctx, req.payer_uid, req.digest, req.signature)?;
    crate::order_checks::check_fee(ctx, req.fee_symbol, req.fee_amount)?;

    if req.dex_id.is_reserved() {
        match ctx.params.reserved_dex_settler {
            Some(settler) if settler == req.payer_uid => {}
            _ => {
                return Err(DexTxError::OperatorAuthFailed(
                    "only the designated settler account may submit a settle on the reserved dex"
                        .into(),
                ));
            }
        }
    } else {
        let operator = ctx
            .operators
            .get(req.dex_id)
            .ok_or_else(|| DexTxError::OperatorNotFound(format!("dex_id {} not found", req.dex_id)))?;
        if operator.owner_regid != req.payer_uid {
            return Err(DexTxError::OperatorAuthFailed(
                "only the dex operator's owner may submit a settle on its dex".into(),
            ));
        }
    }

    if ctx.accounts.free_balance(req.payer_uid, req.fee_symbol) < req.fee_amount {
        return Err(DexTxError::InsufficientBalance(format!(
            "payer cannot afford fee of {} {}",
            req.fee_amount, req.fee_symbol
        )));
    }
    ctx.accounts
        .debit_free(req.payer_uid, req.fee_symbol, req.fee_amount)?;

    for item in req.deal_items {
        apply_deal(ctx, req.dex_id, req.payer_uid, item)?;
    }
    Ok(())
}

fn apply_deal(ctx: &mut ExecContext, dex_id: DexId, settler: RegId, item: &DexDealItem) -> DexTxResult<()> {
    let mut buy = ctx.order_book.get(&item.buy_order_id).ok_or_else(|| {
        DexTxError::OrderNotFound(format!("buy order {} not found", item.buy_order_id))
    })?;
    let mut sell = ctx.order_book.get(&item.sell_order_id).ok_or_else(|| {
        DexTxError::OrderNotFound(format!("sell order {} not found", item.sell_order_id))
    })?;

    if buy.order_side != OrderSide::Buy {
        return Err(DexTxError::OrderSideMismatch(format!(
            "order {} is not a buy order",
            item.buy_order_id
        )));
    }
    if sell.order_side != OrderSide::Sell {
        return Err(DexTxError::OrderSideMismatch(format!(
            "order {} is not a sell order",
            item.sell_order_id
        )));
    }
    if buy.coin_symbol != sell.coin_symbol || buy.asset_symbol != sell.asset_symbol {
        return Err(DexTxError::OrderPairMismatch(format!(
            "orders {} / {} do not share a trading pair",
            item.buy_order_id, item.sell_order_id
        )));
    }
    if buy.dex_id != dex_id || sell.dex_id != dex_id {
        return Err(DexTxError::OrderDexMismatch(format!(
            "orders {} / {} are not both on dex {dex_id}",
            item.buy_order_id, item.sell_order_id
        )));
    }

    let expected_coin = calc_coin_amount(item.deal_asset_amount, item.deal_price)?;
    if expected_coin != item.deal_coin_amount {
        return Err(DexTxError::DealAmountInconsistent(format!(
            "deal_coin_amount {} does not match floor(deal_asset_amount * deal_price / scale) = {expected_coin}",
            item.deal_coin_amount
        )));
    }

    if buy.order_type == OrderType::Limit && item.deal_price > buy.price {
        return Err(DexTxError::DealPriceOutOfBound(format!(
            "deal_price {} exceeds buy order's limit {}",
            item.deal_price, buy.price
        )));
    }
    if sell.order_type == OrderType::Limit && item.deal_price < sell.price {
        return Err(DexTxError::DealPriceOutOfBound(format!(
            "deal_price {} is below sell order's limit {}",
            item.deal_price, sell.price
        )));
    }

    if item.deal_coin_amount > buy.residual_coin_amount {
        return Err(DexTxError::DealResidualExceeded(format!(
            "deal_coin_amount {} exceeds buy order residual {}",
            item.deal_coin_amount, buy.residual_coin_amount
        )));
    }
    if buy.order_type == OrderType::Limit && item.deal_asset_amount > buy.residual_asset_amount {
        return Err(DexTxError::DealResidualExceeded(format!(
            "deal_asset_amount {} exceeds buy order residual {}",
            item.deal_asset_amount, buy.residual_asset_amount
        )));
    }
    if item.deal_asset_amount > sell.residual_asset_amount {
        return Err(DexTxError::DealResidualExceeded(format!(
            "deal_asset_amount {} exceeds sell order residual {}",
            item.deal_asset_amount, sell.residual_asset_amount
        )));
    }

    let operator = if dex_id.is_reserved() {
        None
    } else {
        ctx.operators.get(dex_id)
    };
    // On the reserved dex there is no registered operator to pay; the designated
    // settler collects the fee instead. `process_settle` has already checked
    // `settler` against `ConsensusParams::reserved_dex_settler`.
    let fee_receiver = operator.as_ref().map(|o| o.fee_receiver_regid).unwrap_or(settler);

    let buyer_is_taker = taker_side(&buy, &sell) == OrderSide::Buy;
    let buyer_fee_ratio = resolve_fee_ratio(&buy, operator.as_ref(), buyer_is_taker);
    let seller_fee_ratio = resolve_fee_ratio(&sell, operator.as_ref(), !buyer_is_taker);
    let buyer_fee = calc_order_fee(item.deal_asset_amount, buyer_fee_ratio)?;
    let seller_fee = calc_order_fee(item.deal_coin_amount, seller_fee_ratio)?;

    ctx.accounts
        .debit_frozen(buy.owner_regid, &buy.coin_symbol, item.deal_coin_amount)?;
    ctx.accounts
        .credit_free(sell.owner_regid, &sell.coin_symbol, item.deal_coin_amount - seller_fee);
    ctx.accounts
        .debit_frozen(sell.owner_regid, &sell.asset_symbol, item.deal_asset_amount)?;
    ctx.accounts
        .credit_free(buy.owner_regid, &buy.asset_symbol, item.deal_asset_amount - buyer_fee);

    ctx.accounts.credit_free(fee_receiver, &sell.coin_symbol, seller_fee);
    ctx.accounts.credit_free(fee_receiver, &buy.asset_symbol, buyer_fee);

    tracing::debug!(
        buy_order = %item.buy_order_id,
        sell_order = %item.sell_order_id,
        price = item.deal_price,
        coin = item.deal_coin_amount,
        asset = item.deal_asset_amount,
        "deal settled"
    );

    update_residual(&mut buy, item.deal_coin_amount, item.deal_asset_amount);
    update_residual_sell(&mut sell, item.deal_asset_amount);

    settle_order_book(ctx, buy);
    settle_order_book(ctx, sell);
    Ok(())
}

fn update_residual(buy: &mut OrderDetail, deal_coin_amount: u64, deal_asset_amount: u64) {
    buy.residual_coin_amount -= deal_coin_amount;
    if buy.order_type == OrderType::Limit {
        buy.residual_asset_amount -= deal_asset_amount;
    }
}

fn update_residual_sell(sell: &mut OrderDetail, deal_asset_amount: u64) {
    sell.residual_asset_amount -= deal_asset_amount;
    if sell.order_type == OrderType::Limit {
        sell.residual_coin_amount = sell
            .residual_coin_amount
            .saturating_sub(calc_coin_amount(deal_asset_amount, sell.price).unwrap_or(0));
    }
}

fn settle_order_book(ctx: &mut ExecContext, order: OrderDetail) {
    if order.has_positive_residual() {
        ctx.order_book.put(order);
    } else {
        ctx.order_book.erase(&order.order_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::TestEnv;
    use dex_types::{DexOperator, OrderOpt, TxId, DEX_RESERVED_ID, PRICE_SCALE};

    fn make_order(
        order_id: TxId,
        owner: RegId,
        side: OrderSide,
        order_type: OrderType,
        price: u64,
        residual_coin: u64,
        residual_asset: u64,
        height: u32,
    ) -> OrderDetail {
        OrderDetail {
            order_id,
            owner_regid: owner,
            order_type,
            order_side: side,
            coin_symbol: TokenSymbol::new("USD").unwrap(),
            asset_symbol: TokenSymbol::new("BTC").unwrap(),
            price,
            order_opt: OrderOpt::new(true, false),
            dex_id: DEX_RESERVED_ID,
            match_fee_ratio: 0,
            residual_coin_amount: residual_coin,
            residual_asset_amount: residual_asset,
            generated_height: height,
        }
    }

    #[test]
    fn settle_matches_buy_and_sell_limit_orders_fully() {
        let mut env = TestEnv::new();
        env.register_symbol("USD");
        env.register_symbol("BTC");
        let buyer = RegId { height: 1, index: 0 };
        let seller = RegId { height: 2, index: 0 };
        let settler = RegId { height: 3, index: 0 };
        env.credit(settler, "USD", 100);
        env.set_reserved_dex_settler(settler);

        let price = 100 * PRICE_SCALE;
        let coin_amount = calc_coin_amount(10, price).unwrap();
        let buy_id = TxId([1u8; 32]);
        let sell_id = TxId([2u8; 32]);
        env.put_order(make_order(buy_id, buyer, OrderSide::Buy, OrderType::Limit, price, coin_amount, 10, 5));
        env.put_order(make_order(sell_id, seller, OrderSide::Sell, OrderType::Limit, price, coin_amount, 10, 1));
        {
            let mut ctx = env.context(0);
            ctx.accounts.credit_frozen(buyer, &TokenSymbol::new("USD").unwrap(), coin_amount);
            ctx.accounts.credit_frozen(seller, &TokenSymbol::new("BTC").unwrap(), 10);
        }

        let item = DexDealItem {
            buy_order_id: buy_id,
            sell_order_id: sell_id,
            deal_price: price,
            deal_coin_amount: coin_amount,
            deal_asset_amount: 10,
        };
        let req = SettleRequest {
            dex_id: DEX_RESERVED_ID,
            payer_uid: settler,
            valid_height: 10,
            fee_symbol: &TokenSymbol::new("USD").unwrap(),
            fee_amount: 1,
            deal_items: &[item],
            digest: b"unused",
            signature: &Signature(vec![0x01]),
        };
        let mut ctx = env.context(0);
        process_settle(&mut ctx, &req).unwrap();

        assert_eq!(env.order_book_get(&buy_id), None);
        assert_eq!(env.order_book_get(&sell_id), None);
        assert_eq!(env.account_free(seller, "USD"), coin_amount);
        assert_eq!(env.account_free(buyer, "BTC"), 10);
        assert_eq!(env.account_frozen(buyer, "USD"), 0);
        assert_eq!(env.account_frozen(seller, "BTC"), 0);
    }

    #[test]
    fn settle_rejects_price_above_buy_limit() {
        let mut env = TestEnv::new();
        env.register_symbol("USD");
        env.register_symbol("BTC");
        let buyer = RegId { height: 1, index: 0 };
        let seller = RegId { height: 2, index: 0 };
        let settler = RegId { height: 3, index: 0 };
        env.credit(settler, "USD", 100);
        env.set_reserved_dex_settler(settler);

        let buy_price = 100 * PRICE_SCALE;
        let deal_price = 200 * PRICE_SCALE;
        let coin_amount = calc_coin_amount(10, buy_price).unwrap();
        let deal_coin_amount = calc_coin_amount(10, deal_price).unwrap();
        let buy_id = TxId([3u8; 32]);
        let sell_id = TxId([4u8; 32]);
        env.put_order(make_order(buy_id, buyer, OrderSide::Buy, OrderType::Limit, buy_price, coin_amount, 10, 5));
        env.put_order(make_order(sell_id, seller, OrderSide::Sell, OrderType::Limit, 10, deal_coin_amount, 10, 1));

        let item = DexDealItem {
            buy_order_id: buy_id,
            sell_order_id: sell_id,
            deal_price,
            deal_coin_amount,
            deal_asset_amount: 10,
        };
        let req = SettleRequest {
            dex_id: DEX_RESERVED_ID,
            payer_uid: settler,
            valid_height: 10,
            fee_symbol: &TokenSymbol::new("USD").unwrap(),
            fee_amount: 1,
            deal_items: &[item],
            digest: b"unused",
            signature: &Signature(vec![0x01]),
        };
        let mut ctx = env.context(0);
        let err = process_settle(&mut ctx, &req).unwrap_err();
        assert!(matches!(err, DexTxError::DealPriceOutOfBound(_)));
    }

    #[test]
    fn non_default_dex_settle_requires_operator_owner() {
        let mut env = TestEnv::new();
        env.register_symbol("USD");
        env.register_symbol("BTC");
        let operator_owner = RegId { height: 9, index: 0 };
        let stranger = RegId { height: 10, index: 0 };
        env.register_operator(DexOperator {
            dex_id: DexId(1),
            owner_regid: operator_owner,
            fee_receiver_regid: operator_owner,
            maker_fee_ratio: 0,
            taker_fee_ratio: 0,
            allow_public_order: true,
            max_fee_ratio: 1_000_000,
            enabled: true,
        });
        env.credit(stranger, "USD", 100);

        let req = SettleRequest {
            dex_id: DexId(1),
            payer_uid: stranger,
            valid_height: 10,
            fee_symbol: &TokenSymbol::new("USD").unwrap(),
            fee_amount: 1,
            deal_items: &[],
            digest: b"unused",
            signature: &Signature(vec![0x01]),
        };
        let mut ctx = env.context(0);
        let err = process_settle(&mut ctx, &req).unwrap_err();
        assert!(matches!(err, DexTxError::OperatorAuthFailed(_)));
    }

    #[test]
    fn reserved_dex_settle_rejects_non_designated_settler() {
        let mut env = TestEnv::new();
        env.register_symbol("USD");
        env.register_symbol("BTC");
        let designated = RegId { height: 3, index: 0 };
        let stranger = RegId { height: 4, index: 0 };
        env.credit(stranger, "USD", 100);
        env.set_reserved_dex_settler(designated);

        let req = SettleRequest {
            dex_id: DEX_RESERVED_ID,
            payer_uid: stranger,
            valid_height: 10,
            fee_symbol: &TokenSymbol::new("USD").unwrap(),
            fee_amount: 1,
            deal_items: &[],
            digest: b"unused",
            signature: &Signature(vec![0x01]),
        };
        let mut ctx = env.context(0);
        let err = process_settle(&mut ctx, &req).unwrap_err();
        assert!(matches!(err, DexTxError::OperatorAuthFailed(_)));
    }

    #[test]
    fn reserved_dex_settle_rejects_when_no_settler_designated() {
        let mut env = TestEnv::new();
        env.register_symbol("USD");
        env.register_symbol("BTC");
        let payer = RegId { height: 3, index: 0 };
        env.credit(payer, "USD", 100);

        let req = SettleRequest {
            dex_id: DEX_RESERVED_ID,
            payer_uid: payer,
            valid_height: 10,
            fee_symbol: &TokenSymbol::new("USD").unwrap(),
            fee_amount: 1,
            deal_items: &[],
            digest: b"unused",
            signature: &Signature(vec![0x01]),
        };
        let mut ctx = env.context(0);
        let err = process_settle(&mut ctx, &req).unwrap_err();
        assert!(matches!(err, DexTxError::OperatorAuthFailed(_)));
    }
}
