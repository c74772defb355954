//! Transaction records produced by the matcher.
//!
//! A [`Transaction`] is the immutable record of one fill between a buy-side
//! and a sell-side order. Settlement happens elsewhere; expiries are carried
//! for audit only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, BlockHeight, OrderId, TokenId, TransactionId};

/// One executed fill.
///
/// Amounts are whole units: they are rounded once, when the record is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Deterministic identifier (pair symbol + fill sequence).
    pub id: TransactionId,
    /// Position of this fill in the engine's execution order.
    pub sequence: u64,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub buyer: Address,
    pub seller: Address,
    /// Token paid by the buyer (the buy order's source token).
    pub source_token: TokenId,
    /// Token received by the buyer (the buy order's target token).
    pub target_token: TokenId,
    pub source_amount: Decimal,
    pub target_amount: Decimal,
    pub buy_expiry: Option<BlockHeight>,
    pub sell_expiry: Option<BlockHeight>,
}

impl Transaction {
    /// Returns `true` if `order_id` is either party.
    #[must_use]
    pub fn involves(&self, order_id: &OrderId) -> bool {
        self.buy_order_id == *order_id || self.sell_order_id == *order_id
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tx[{}] #{} {} {} -> {} {}",
            self.id.short(),
            self.sequence,
            self.source_amount,
            self.source_token,
            self.target_amount,
            self.target_token,
        )
    }
}
