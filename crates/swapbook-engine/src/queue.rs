//! One side of the book: a [`PriorityQueue`] of orders with lazy expiry.
//!
//! Expired orders are never swept eagerly. Each [`peek`](OrderQueue::peek)
//! and [`pop`](OrderQueue::pop) asks the height source for the current
//! height first and discards expired orders from the top until a live order
//! surfaces or the queue is empty. The height is re-read before every retry.

use swapbook_types::{BlockHeight, BookSide, Order, Result};

use crate::comparator::PriceTimePriority;
use crate::height::BlockHeightSource;
use crate::priority_queue::{Comparator, PriorityQueue};

/// Orders for one side of a pair, ranked by `C`.
#[derive(Debug, Clone)]
pub struct OrderQueue<C = PriceTimePriority> {
    side: BookSide,
    heap: PriorityQueue<Order, C>,
}

impl<C: Comparator<Order>> OrderQueue<C> {
    #[must_use]
    pub fn new(side: BookSide, cmp: C) -> Self {
        Self {
            side,
            heap: PriorityQueue::new(cmp),
        }
    }

    /// Queue an order. Never checks expiry.
    pub fn push(&mut self, order: Order) {
        self.heap.push(order);
    }

    /// The best live order, evicting expired ones on the way.
    pub async fn peek<H>(&mut self, heights: &H) -> Result<Option<&Order>>
    where
        H: BlockHeightSource + ?Sized,
    {
        loop {
            let height = heights.current_height().await?;
            let expired = self
                .heap
                .peek()
                .is_some_and(|top| top.is_expired_at(height));
            if !expired {
                break;
            }
            self.evict(height);
        }
        Ok(self.heap.peek())
    }

    /// Remove and return the best live order, evicting expired ones on the way.
    pub async fn pop<H>(&mut self, heights: &H) -> Result<Option<Order>>
    where
        H: BlockHeightSource + ?Sized,
    {
        loop {
            let height = heights.current_height().await?;
            match self.heap.pop() {
                Some(order) if order.is_expired_at(height) => {
                    tracing::trace!(
                        side = %self.side,
                        order = %order.id,
                        expiry = ?order.expiry,
                        height = height.0,
                        "Expired order evicted on pop"
                    );
                }
                popped => return Ok(popped),
            }
        }
    }

    fn evict(&mut self, height: BlockHeight) {
        if let Some(order) = self.heap.pop() {
            tracing::trace!(
                side = %self.side,
                order = %order.id,
                expiry = ?order.expiry,
                height = height.0,
                "Expired order evicted on peek"
            );
        }
    }

    /// Resident order count, expired-but-unobserved orders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Resident orders in rank order, without any expiry check.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Order> {
        self.heap.sorted()
    }
}

impl<C: Comparator<Order>> Extend<Order> for OrderQueue<C> {
    fn extend<I: IntoIterator<Item = Order>>(&mut self, iter: I) {
        self.heap.extend(iter);
    }
}
