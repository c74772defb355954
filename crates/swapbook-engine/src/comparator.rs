//! Order ranking strategies.
//!
//! The default is price-time priority: the higher `source_amount /
//! target_amount` ranks first, and among exactly equal rates the older
//! order wins. The same formula ranks both sides of the book: for an ask,
//! a higher source-per-target ratio is a cheaper required rate.

use std::cmp::Ordering;

use swapbook_types::Order;

use crate::priority_queue::Comparator;

/// Default price-time priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceTimePriority;

impl Comparator<Order> for PriceTimePriority {
    fn compare(&self, a: &Order, b: &Order) -> Ordering {
        compare_rate_and_time(a, b)
    }
}

/// Rank by `source_amount / target_amount` descending, then by timestamp
/// ascending. Rates are compared by cross-multiplication, so both orders
/// must be non-zero, which every resident order is.
#[must_use]
pub fn compare_rate_and_time(a: &Order, b: &Order) -> Ordering {
    b.compare_bid_rate(a).then_with(|| compare_time(a, b))
}

/// Older order first.
#[must_use]
pub fn compare_time(a: &Order, b: &Order) -> Ordering {
    a.timestamp.cmp(&b.timestamp)
}
