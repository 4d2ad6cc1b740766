//! In-memory doubles for the `ExecContext` traits, used only by this crate's own
//! unit tests. A real node backs these traits with its account/order-book/operator
//! stores and its own signature scheme.

use std::collections::{HashMap, HashSet};

use dex_config::ConsensusParams;
use dex_types::{DexId, DexOperator, DexTxError, OrderDetail, RegId, Signature, TokenSymbol, TxId};

use crate::context::{AccountStore, AssetRegistry, ExecContext, OperatorRegistry, OrderBookStore, Verifier};

#[derive(Default)]
struct Balances {
    free: HashMap<String, u64>,
    frozen: HashMap<String, u64>,
}

#[derive(Default)]
struct AccountsDouble {
    balances: HashMap<RegId, Balances>,
}

impl AccountStore for AccountsDouble {
    fn free_balance(&self, owner: RegId, symbol: &TokenSymbol) -> u64 {
        self.balances
            .get(&owner)
            .and_then(|b| b.free.get(symbol.as_str()))
            .copied()
            .unwrap_or(0)
    }

    fn frozen_balance(&self, owner: RegId, symbol: &TokenSymbol) -> u64 {
        self.balances
            .get(&owner)
            .and_then(|b| b.frozen.get(symbol.as_str()))
            .copied()
            .unwrap_or(0)
    }

    fn debit_free(&mut self, owner: RegId, symbol: &TokenSymbol, amount: u64) -> Result<(), DexTxError> {
        let entry = self.balances.entry(owner).or_default();
        let balance = entry.free.entry(symbol.as_str().to_string()).or_insert(0);
        if *balance < amount {
            return Err(DexTxError::InsufficientBalance(format!(
                "free balance {balance} < {amount} {symbol}"
            )));
        }
        *balance -= amount;
        Ok(())
    }

    fn credit_free(&mut self, owner: RegId, symbol: &TokenSymbol, amount: u64) {
        *self
            .balances
            .entry(owner)
            .or_default()
            .free
            .entry(symbol.as_str().to_string())
            .or_insert(0) += amount;
    }

    fn debit_frozen(&mut self, owner: RegId, symbol: &TokenSymbol, amount: u64) -> Result<(), DexTxError> {
        let entry = self.balances.entry(owner).or_default();
        let balance = entry.frozen.entry(symbol.as_str().to_string()).or_insert(0);
        if *balance < amount {
            return Err(DexTxError::InsufficientBalance(format!(
                "frozen balance {balance} < {amount} {symbol}"
            )));
        }
        *balance -= amount;
        Ok(())
    }

    fn credit_frozen(&mut self, owner: RegId, symbol: &TokenSymbol, amount: u64) {
        *self
            .balances
            .entry(owner)
            .or_default()
            .frozen
            .entry(symbol.as_str().to_string())
            .or_insert(0) += amount;
    }
}

#[derive(Default)]
struct OrderBookDouble {
    orders: HashMap<TxId, OrderDetail>,
}

impl OrderBookStore for OrderBookDouble {
    fn get(&self, order_id: &TxId) -> Option<OrderDetail> {
        self.orders.get(order_id).cloned()
    }

    fn put(&mut self, order: OrderDetail) {
        self.orders.insert(order.order_id, order);
    }

    fn erase(&mut self, order_id: &TxId) {
        self.orders.remove(order_id);
    }
}

#[derive(Default)]
struct OperatorsDouble {
    operators: HashMap<DexId, DexOperator>,
}

impl OperatorRegistry for OperatorsDouble {
    fn get(&self, dex_id: DexId) -> Option<DexOperator> {
        self.operators.get(&dex_id).cloned()
    }
}

#[derive(Default)]
struct AssetsDouble {
    registered_symbols: HashSet<String>,
    permitted_pairs: HashSet<(String, String)>,
}

impl AssetRegistry for AssetsDouble {
    fn is_registered(&self, symbol: &TokenSymbol) -> bool {
        self.registered_symbols.contains(symbol.as_str())
    }

    fn is_trading_pair_permitted(&self, coin_symbol: &TokenSymbol, asset_symbol: &TokenSymbol) -> bool {
        self.permitted_pairs
            .contains(&(coin_symbol.as_str().to_string(), asset_symbol.as_str().to_string()))
    }
}

/// Any non-empty signature verifies; these tests exercise balance/order-book logic,
/// not a real signature scheme.
struct PermissiveVerifier;

impl Verifier for PermissiveVerifier {
    fn verify(&self, _signer: RegId, _digest: &[u8], signature: &Signature) -> bool {
        !signature.0.is_empty()
    }
}

pub struct TestEnv {
    accounts: AccountsDouble,
    order_book: OrderBookDouble,
    operators: OperatorsDouble,
    assets: AssetsDouble,
    verifier: PermissiveVerifier,
    params: ConsensusParams,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            accounts: AccountsDouble::default(),
            order_book: OrderBookDouble::default(),
            operators: OperatorsDouble::default(),
            assets: AssetsDouble::default(),
            verifier: PermissiveVerifier,
            params: ConsensusParams::default(),
        }
    }

    pub fn register_symbol(&mut self, symbol: &str) {
        self.assets.registered_symbols.insert(symbol.to_string());
    }

    pub fn permit_pair(&mut self, coin: &str, asset: &str) {
        self.assets
            .permitted_pairs
            .insert((coin.to_string(), asset.to_string()));
    }

    pub fn register_operator(&mut self, operator: DexOperator) {
        self.operators.operators.insert(operator.dex_id, operator);
    }

    pub fn set_reserved_dex_settler(&mut self, settler: RegId) {
        self.params.reserved_dex_settler = Some(settler);
    }

    pub fn credit(&mut self, owner: RegId, symbol: &str, amount: u64) {
        *self
            .accounts
            .balances
            .entry(owner)
            .or_default()
            .free
            .entry(symbol.to_string())
            .or_insert(0) += amount;
    }

    pub fn account_free(&self, owner: RegId, symbol: &str) -> u64 {
        self.accounts
            .balances
            .get(&owner)
            .and_then(|b| b.free.get(symbol))
            .copied()
            .unwrap_or(0)
    }

    pub fn account_frozen(&self, owner: RegId, symbol: &str) -> u64 {
        self.accounts
            .balances
            .get(&owner)
            .and_then(|b| b.frozen.get(symbol))
            .copied()
            .unwrap_or(0)
    }

    pub fn put_order(&mut self, order: OrderDetail) {
        self.order_book.orders.insert(order.order_id, order);
    }

    pub fn order_book_get(&self, order_id: &TxId) -> Option<OrderDetail> {
        self.order_book.orders.get(order_id).cloned()
    }

    pub fn context(&mut self, current_height: u32) -> ExecContext<'_> {
        ExecContext {
            accounts: &mut self.accounts,
            order_book: &mut self.order_book,
            operators: &self.operators,
            assets: &self.assets,
            verifier: &self.verifier,
            params: &self.params,
            current_height,
        }
    }
}
