//! Order types for the SwapBook matching kernel.
//!
//! An order offers `source_amount` of `source_token` in exchange for
//! `target_amount` of `target_token`. The two amounts are the only fields
//! that change after creation: the matcher decrements them as fills occur.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Address, BlockHeight, OrderId, Result, SwapbookError, TokenId, TokenPair, constants,
};

/// Which side of a pair's book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum BookSide {
    Bid,
    Ask,
}

impl std::fmt::Display for BookSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bid => write!(f, "BID"),
            Self::Ask => write!(f, "ASK"),
        }
    }
}

/// A resting swap instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Owner of the order.
    pub address: Address,
    pub source_token: TokenId,
    pub target_token: TokenId,
    /// Remaining amount of `source_token` on offer.
    pub source_amount: Decimal,
    /// Remaining amount of `target_token` wanted in return.
    pub target_amount: Decimal,
    pub timestamp: DateTime<Utc>,
    /// Last block height at which the order is live. `None` or zero never expires.
    #[serde(default)]
    pub expiry: Option<BlockHeight>,
}

impl Order {
    /// Which side of `pair`'s book this order belongs to, if any.
    #[must_use]
    pub fn side_for(&self, pair: &TokenPair) -> Option<BookSide> {
        if self.source_token == pair.source && self.target_token == pair.target {
            Some(BookSide::Bid)
        } else if self.source_token == pair.target && self.target_token == pair.source {
            Some(BookSide::Ask)
        } else {
            None
        }
    }

    /// Compare `source_amount / target_amount` against `other`'s, without
    /// dividing. Both orders must be non-zero.
    #[must_use]
    pub fn compare_bid_rate(&self, other: &Order) -> Ordering {
        compare_ratios(
            (self.source_amount, self.target_amount),
            (other.source_amount, other.target_amount),
        )
    }

    /// `true` when this order, read as a bid, offers at least the rate `ask`
    /// requires: `self.source / self.target >= ask.target / ask.source`.
    /// Orders that are not non-zero never cross.
    #[must_use]
    pub fn crosses_ask(&self, ask: &Order) -> bool {
        if !self.is_non_zero() || !ask.is_non_zero() {
            return false;
        }
        compare_ratios(
            (self.source_amount, self.target_amount),
            (ask.target_amount, ask.source_amount),
        ) != Ordering::Less
    }

    /// Rate required when read as an ask: `target_amount / source_amount`.
    #[must_use]
    pub fn ask_rate(&self) -> Option<Decimal> {
        self.target_amount.checked_div(self.source_amount)
    }

    /// Both remaining amounts are strictly positive.
    #[must_use]
    pub fn is_non_zero(&self) -> bool {
        self.source_amount > Decimal::ZERO && self.target_amount > Decimal::ZERO
    }

    /// `true` once `height` has moved past the order's expiry.
    #[must_use]
    pub fn is_expired_at(&self, height: BlockHeight) -> bool {
        match self.expiry {
            Some(expiry) if expiry != constants::NON_EXPIRING => expiry < height,
            _ => false,
        }
    }

    /// Structural checks a caller can run before handing an order to the pool.
    pub fn validate(&self) -> Result<()> {
        if self.source_token == self.target_token {
            return Err(SwapbookError::InvalidOrder {
                reason: format!("order {} swaps {} for itself", self.id, self.source_token),
            });
        }
        if !self.is_non_zero() {
            return Err(SwapbookError::InvalidOrder {
                reason: format!(
                    "order {} has non-positive amounts {}/{}",
                    self.id, self.source_amount, self.target_amount
                ),
            });
        }
        Ok(())
    }
}

/// Compare `a.0 / a.1` with `b.0 / b.1` for strictly positive amounts.
///
/// Cross-multiplies so that a quotient too large for `Decimal` still
/// orders correctly. A product that overflows is larger than any product
/// that fits; if both overflow the quotients decide.
#[must_use]
pub fn compare_ratios(a: (Decimal, Decimal), b: (Decimal, Decimal)) -> Ordering {
    let lhs = a.0.checked_mul(b.1);
    let rhs = b.0.checked_mul(a.1);
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, None) => match (a.0.checked_div(a.1), b.0.checked_div(b.1)) {
            (Some(qa), Some(qb)) => qa.cmp(&qb),
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy(
        source_token: &str,
        target_token: &str,
        source_amount: Decimal,
        target_amount: Decimal,
    ) -> Self {
        Self {
            id: OrderId::new(),
            address: Address::new(format!("0x{}", OrderId::new().0.simple())),
            source_token: TokenId::new(source_token),
            target_token: TokenId::new(target_token),
            source_amount,
            target_amount,
            timestamp: Utc::now(),
            expiry: None,
        }
    }

    /// A bid on `pair`: offers `pair.source` for `pair.target`.
    pub fn dummy_bid(pair: &TokenPair, source_amount: i64, target_amount: i64) -> Self {
        Self::dummy(
            pair.source.as_str(),
            pair.target.as_str(),
            Decimal::from(source_amount),
            Decimal::from(target_amount),
        )
    }

    /// An ask on `pair`: offers `pair.target` for `pair.source`.
    pub fn dummy_ask(pair: &TokenPair, source_amount: i64, target_amount: i64) -> Self {
        Self::dummy(
            pair.target.as_str(),
            pair.source.as_str(),
            Decimal::from(source_amount),
            Decimal::from(target_amount),
        )
    }

    #[must_use]
    pub fn expiring_at(mut self, height: u64) -> Self {
        self.expiry = Some(BlockHeight(height));
        self
    }

    #[must_use]
    pub fn placed_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
