//! Validation and execution for the DEX order/cancel/settle transaction family.
//!
//! Every entry point takes an explicit [`context::ExecContext`] rather than reaching
//! into global state, so a caller (a node's block executor, or a test) controls
//! exactly which account/order-book/operator/asset backing stores and which
//! signature verifier a given check/execute call runs against.

pub mod cancel;
pub mod context;
pub mod fee;
pub mod order_checks;
pub mod process_order;
pub mod settle;

#[cfg(test)]
mod testkit;

pub use cancel::process_cancel;
pub use process_order::process_order;
pub use settle::{process_settle, SettleRequest};
