//! Binary heap ordered by an injected comparator.
//!
//! The heap lives in a `Vec`: the parent of index `i` is `(i - 1) / 2`, its
//! children are `2i + 1` and `2i + 2`. A comparator returning
//! [`Ordering::Less`] for `(a, b)` means `a` ranks ahead of `b`; the root
//! always ranks at least as high as every other element.

use std::cmp::Ordering;

/// Ranking strategy for a [`PriorityQueue`].
///
/// `Less` ranks first. Any `Fn(&T, &T) -> Ordering` is a comparator, so a
/// closure can be passed wherever a strategy struct is expected.
pub trait Comparator<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

#[inline]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

#[inline]
fn left(i: usize) -> usize {
    2 * i + 1
}

#[inline]
fn right(i: usize) -> usize {
    2 * i + 2
}

/// A max-priority heap of owned items.
///
/// Items are moved in by [`push`](Self::push) and moved back out by
/// [`pop`](Self::pop); nothing outside the queue holds a reference to a
/// resident item.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T, C> {
    items: Vec<T>,
    cmp: C,
}

impl<T, C: Comparator<T>> PriorityQueue<T, C> {
    /// Create an empty queue ranked by `cmp`.
    #[must_use]
    pub fn new(cmp: C) -> Self {
        Self {
            items: Vec::new(),
            cmp,
        }
    }

    /// Create an empty queue with room for `capacity` items.
    #[must_use]
    pub fn with_capacity(capacity: usize, cmp: C) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            cmp,
        }
    }

    /// Add an item. O(log n).
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Remove and return the top-ranked item, or `None` if empty. O(log n).
    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let top = self.items.pop();
        self.sift_down(0);
        top
    }

    /// The top-ranked item without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in heap layout order (not rank order).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// References to every item in rank order. O(n log n); meant for
    /// diagnostics, not the hot path.
    #[must_use]
    pub fn sorted(&self) -> Vec<&T> {
        let mut refs: Vec<&T> = self.items.iter().collect();
        refs.sort_by(|a, b| self.cmp.compare(a, b));
        refs
    }

    /// Consume the queue, returning items in heap layout order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// `true` if the item at `i` ranks strictly ahead of the item at `j`.
    fn outranks(&self, i: usize, j: usize) -> bool {
        self.cmp.compare(&self.items[i], &self.items[j]) == Ordering::Less
    }

    fn sift_up(&mut self, mut node: usize) {
        while node > 0 && self.outranks(node, parent(node)) {
            self.items.swap(node, parent(node));
            node = parent(node);
        }
    }

    fn sift_down(&mut self, mut node: usize) {
        let len = self.items.len();
        loop {
            let mut best = node;
            if left(node) < len && self.outranks(left(node), best) {
                best = left(node);
            }
            if right(node) < len && self.outranks(right(node), best) {
                best = right(node);
            }
            if best == node {
                return;
            }
            self.items.swap(node, best);
            node = best;
        }
    }
}

impl<T, C: Comparator<T>> Extend<T> for PriorityQueue<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn max_first(a: &i64, b: &i64) -> Ordering {
        b.cmp(a)
    }

    fn drain<C: Comparator<i64>>(mut queue: PriorityQueue<i64, C>) -> Vec<i64> {
        let mut out = Vec::new();
        while let Some(v) = queue.pop() {
            out.push(v);
        }
        out
    }

    #[test]
    fn empty_queue() {
        let mut queue: PriorityQueue<i64, _> = PriorityQueue::new(max_first);
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.peek(), None);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn pops_in_rank_order() {
        let mut queue: PriorityQueue<i64, _> = PriorityQueue::new(max_first);
        queue.extend([5, 1, 9, 3, 7, 9, 2]);
        assert_eq!(queue.len(), 7);
        assert_eq!(queue.peek(), Some(&9));
        assert_eq!(drain(queue), vec![9, 9, 7, 5, 3, 2, 1]);
    }

    #[test]
    fn closure_comparator_reverses_rank() {
        let mut queue: PriorityQueue<i64, _> = PriorityQueue::new(|a: &i64, b: &i64| a.cmp(b));
        queue.extend([4, 8, 1]);
        assert_eq!(drain(queue), vec![1, 4, 8]);
    }

    #[test]
    fn single_element_push_pop() {
        let mut queue: PriorityQueue<i64, _> = PriorityQueue::new(max_first);
        queue.push(42);
        assert_eq!(queue.peek(), Some(&42));
        assert_eq!(queue.pop(), Some(42));
        assert!(queue.is_empty());
    }

    #[test]
    fn sorted_does_not_disturb_heap() {
        let mut queue: PriorityQueue<i64, _> = PriorityQueue::new(max_first);
        queue.extend([3, 10, 6]);
        let sorted: Vec<i64> = queue.sorted().into_iter().copied().collect();
        assert_eq!(sorted, vec![10, 6, 3]);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek(), Some(&10));

        let mut raw = queue.into_vec();
        raw.sort_unstable();
        assert_eq!(raw, vec![3, 6, 10]);
    }

    #[test]
    fn top_outranks_every_element_after_random_ops() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut queue: PriorityQueue<i64, _> = PriorityQueue::with_capacity(256, max_first);
        let mut mirror: Vec<i64> = Vec::new();

        for _ in 0..2_000 {
            if mirror.is_empty() || rng.gen_bool(0.6) {
                let v = rng.gen_range(-1_000..1_000);
                queue.push(v);
                mirror.push(v);
            } else {
                let popped = queue.pop().unwrap();
                let max = *mirror.iter().max().unwrap();
                assert_eq!(popped, max);
                let pos = mirror.iter().position(|v| *v == max).unwrap();
                mirror.swap_remove(pos);
            }

            assert_eq!(queue.len(), mirror.len());
            if let Some(top) = queue.peek() {
                assert!(queue.iter().all(|v| max_first(top, v) != Ordering::Greater));
            }
        }
    }
}
