//! The two-sided book for a single token pair.
//!
//! - **Bids**: orders offering `pair.source` for `pair.target`
//! - **Asks**: orders offering `pair.target` for `pair.source`
//!
//! Both sides are [`OrderQueue`]s ranked by the same comparator. Orders for
//! any other pair, and orders without strictly positive amounts, are left
//! out at classification time.

use swapbook_types::{BookSide, Order, TokenPair};

use crate::comparator::PriceTimePriority;
use crate::priority_queue::Comparator;
use crate::queue::OrderQueue;

/// Bids and asks for one pair.
#[derive(Debug, Clone)]
pub struct OrderBook<C = PriceTimePriority> {
    pair: TokenPair,
    pub(crate) bids: OrderQueue<C>,
    pub(crate) asks: OrderQueue<C>,
}

/// Owned copy of both sides in rank order, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookSnapshot {
    pub bids: Vec<Order>,
    pub asks: Vec<Order>,
}

impl<C: Comparator<Order> + Clone> OrderBook<C> {
    /// Create an empty book for `pair`.
    #[must_use]
    pub fn new(pair: TokenPair, cmp: C) -> Self {
        Self {
            pair,
            bids: OrderQueue::new(BookSide::Bid, cmp.clone()),
            asks: OrderQueue::new(BookSide::Ask, cmp),
        }
    }

    /// Seed a book from an order pool, keeping only orders for `pair`.
    #[must_use]
    pub fn classify<I>(pair: TokenPair, orders: I, cmp: C) -> Self
    where
        I: IntoIterator<Item = Order>,
    {
        let mut book = Self::new(pair, cmp);
        let mut skipped = 0usize;
        for order in orders {
            if !book.insert(order) {
                skipped += 1;
            }
        }
        tracing::debug!(
            pair = %book.pair,
            bids = book.bids.len(),
            asks = book.asks.len(),
            skipped,
            "Order pool classified"
        );
        book
    }
}

impl<C: Comparator<Order>> OrderBook<C> {
    /// Place `order` on its side. Returns `false` if it does not belong here.
    pub fn insert(&mut self, order: Order) -> bool {
        let Some(side) = order.side_for(&self.pair) else {
            tracing::debug!(
                pair = %self.pair,
                order = %order.id,
                source = %order.source_token,
                target = %order.target_token,
                "Order skipped: not for this pair"
            );
            return false;
        };
        if !order.is_non_zero() {
            tracing::debug!(
                pair = %self.pair,
                order = %order.id,
                source_amount = %order.source_amount,
                target_amount = %order.target_amount,
                "Order skipped: non-positive amount"
            );
            return false;
        }
        match side {
            BookSide::Bid => self.bids.push(order),
            BookSide::Ask => self.asks.push(order),
        }
        true
    }

    #[must_use]
    pub fn pair(&self) -> &TokenPair {
        &self.pair
    }

    #[must_use]
    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    #[must_use]
    pub fn ask_count(&self) -> usize {
        self.asks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Both sides cloned in rank order. No expiry check is applied.
    #[must_use]
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            bids: self.bids.sorted().into_iter().cloned().collect(),
            asks: self.asks.sorted().into_iter().cloned().collect(),
        }
    }
}
