//! Builds [`Transaction`] records from matched order pairs.

use rust_decimal::{Decimal, RoundingStrategy};
use swapbook_types::{Order, TokenPair, Transaction, TransactionId, constants};

/// Issues transactions for one pair, numbering fills in execution order.
#[derive(Debug, Clone)]
pub struct TransactionFactory {
    symbol: String,
    next_sequence: u64,
}

impl TransactionFactory {
    #[must_use]
    pub fn new(pair: &TokenPair) -> Self {
        Self {
            symbol: pair.symbol(),
            next_sequence: 0,
        }
    }

    /// Record a fill. Ids, address, tokens and amounts come from `buy`;
    /// `sell` contributes its id, address and expiry. Amounts are rounded
    /// to whole units here and nowhere else.
    pub fn make(&mut self, buy: &Order, sell: &Order) -> Transaction {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Transaction {
            id: TransactionId::deterministic(&self.symbol, sequence),
            sequence,
            buy_order_id: buy.id,
            sell_order_id: sell.id,
            buyer: buy.address.clone(),
            seller: sell.address.clone(),
            source_token: buy.source_token.clone(),
            target_token: buy.target_token.clone(),
            source_amount: round_amount(buy.source_amount),
            target_amount: round_amount(buy.target_amount),
            buy_expiry: buy.expiry,
            sell_expiry: sell.expiry,
        }
    }

    /// Number of transactions issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next_sequence
    }
}

/// Round half away from zero to whole token units.
#[must_use]
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        constants::TRANSACTION_AMOUNT_SCALE,
        RoundingStrategy::MidpointAwayFromZero,
    )
}
