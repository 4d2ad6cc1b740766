//! Context traits standing in for the out-of-scope persistent stores and
//! cryptographic primitives (spec.md §1 "Out of scope"; Design Notes "Shared store
//! handles" in spec.md §9). Every check/execute entry point takes an `ExecContext`
//! explicitly — there is no hidden global state.

use dex_config::ConsensusParams;
use dex_types::{DexId, DexOperator, OrderDetail, RegId, Signature, TokenSymbol, TxId};

/// Read/write access to account balances. `debit_*` fails with
/// `DexTxError::InsufficientBalance` when the requested amount exceeds what is
/// available; `credit_*` never fails (crediting cannot overflow a real account
/// store's balance representation, and if it could, that is not this subsystem's
/// concern to model).
pub trait AccountStore {
    fn free_balance(&self, owner: RegId, symbol: &TokenSymbol) -> u64;
    fn frozen_balance(&self, owner: RegId, symbol: &TokenSymbol) -> u64;

    fn debit_free(
        &mut self,
        owner: RegId,
        symbol: &TokenSymbol,
        amount: u64,
    ) -> Result<(), dex_types::DexTxError>;
    fn credit_free(&mut self, owner: RegId, symbol: &TokenSymbol, amount: u64);

    fn debit_frozen(
        &mut self,
        owner: RegId,
        symbol: &TokenSymbol,
        amount: u64,
    ) -> Result<(), dex_types::DexTxError>;
    fn credit_frozen(&mut self, owner: RegId, symbol: &TokenSymbol, amount: u64);
}

/// The persistent order-book index, keyed by order id (spec.md §2 component 4).
pub trait OrderBookStore {
    fn get(&self, order_id: &TxId) -> Option<OrderDetail>;
    fn put(&mut self, order: OrderDetail);
    fn erase(&mut self, order_id: &TxId);
}

/// Lookup of a `DexOperator` by `DexId` (spec.md §2 component 5).
pub trait OperatorRegistry {
    fn get(&self, dex_id: DexId) -> Option<DexOperator>;
}

/// Asset/trading-pair registry (spec.md §4.2 step 2 `CheckOrderSymbols`).
pub trait AssetRegistry {
    fn is_registered(&self, symbol: &TokenSymbol) -> bool;
    fn is_trading_pair_permitted(&self, coin_symbol: &TokenSymbol, asset_symbol: &TokenSymbol)
        -> bool;
}

/// Signature verification (spec.md §1 "Out of scope": cryptographic primitives).
pub trait Verifier {
    fn verify(&self, signer: RegId, digest: &[u8], signature: &Signature) -> bool;
}

/// The scoped view threaded through one transaction's validation and execution
/// (spec.md §5 "cache-wrapper transaction"). The caller is responsible for the
/// all-or-nothing commit/discard semantics around this one call: a failing
/// `check`/`execute` must leave the underlying stores exactly as the caller's own
/// rollback mechanism requires, which is why every mutation in this crate happens
/// only after every check for that step has already passed.
pub struct ExecContext<'a> {
    pub accounts: &'a mut dyn AccountStore,
    pub order_book: &'a mut dyn OrderBookStore,
    pub operators: &'a dyn OperatorRegistry,
    pub assets: &'a dyn AssetRegistry,
    pub verifier: &'a dyn Verifier,
    pub params: &'a ConsensusParams,
    pub current_height: u32,
}
