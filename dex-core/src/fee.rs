//! Maker/taker determination and fee-ratio resolution (spec.md §4.3).

use dex_types::{DexOperator, OrderDetail, OrderSide};

/// The taker is the order with the larger `generated_height` (it arrived later and
/// crossed the book); a tie is broken in favour of the sell side.
pub fn taker_side(buy: &OrderDetail, sell: &OrderDetail) -> OrderSide {
    if buy.generated_height > sell.generated_height {
        OrderSide::Buy
    } else {
        OrderSide::Sell
    }
}

/// Resolves the fee ratio applied to one side of a deal: the order's own
/// `match_fee_ratio` takes precedence when `HAS_FEE_RATIO` is set, otherwise the
/// operator's maker/taker default applies.
pub fn resolve_fee_ratio(order: &OrderDetail, operator: Option<&DexOperator>, is_taker: bool) -> u64 {
    if order.order_opt.has_fee_ratio() {
        return order.match_fee_ratio;
    }
    match operator {
        Some(op) => op.default_fee_ratio(is_taker),
        None => 0,
    }
}
