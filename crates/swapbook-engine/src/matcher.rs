//! Continuous matcher for one token pair.
//!
//! [`OrderMatchingEngine::match_orders`] is the only operation that mutates
//! the book. It repeatedly takes the best ask and runs it against the best
//! bids while they cross:
//!
//! ```text
//! crosses(ask, bid) := bid.source / bid.target >= ask.target / ask.source
//! ```
//!
//! ## Fills
//!
//! - **Bid absorbed** (`bid.target <= ask.source`): the bid trades at the
//!   ask's rate. Its source amount is repriced to `bid.target * ask_rate`,
//!   the ask loses that much target and `bid.target` source, and the bid is
//!   spent.
//! - **Ask absorbed** (otherwise): the bid loses the ask's full amounts and
//!   goes back on the book if anything is left; the ask is spent.
//!
//! Rates are compared by cross-multiplication, never by dividing. Every
//! pop reads a fresh height, so a popped bid is checked against the ask
//! again before it fills; one that no longer crosses goes straight back.
//!
//! An ask that stops crossing with amount left over goes back on the book.
//! A remainder that is zero or negative is never re-queued.

use rust_decimal::Decimal;
use swapbook_types::{
    Order, PairConfig, Result, SwapbookError, TokenPair, Transaction, constants,
};

use crate::comparator::PriceTimePriority;
use crate::determinism::compute_transaction_root;
use crate::height::BlockHeightSource;
use crate::orderbook::{BookSnapshot, OrderBook};
use crate::priority_queue::Comparator;
use crate::transaction::TransactionFactory;

/// `true` when `bid` offers at least the rate `ask` requires. Either side
/// missing, or either side not non-zero, means no cross.
#[must_use]
pub fn crosses(ask: Option<&Order>, bid: Option<&Order>) -> bool {
    match (ask, bid) {
        (Some(ask), Some(bid)) => bid.crosses_ask(ask),
        _ => false,
    }
}

/// Matching engine for exactly one pair.
///
/// Owns both sides of the book; partially filled orders stay inside it
/// between calls to [`match_orders`](Self::match_orders).
#[derive(Debug)]
pub struct OrderMatchingEngine<H, C = PriceTimePriority> {
    book: OrderBook<C>,
    heights: H,
    factory: TransactionFactory,
}

impl<H: BlockHeightSource> OrderMatchingEngine<H> {
    /// Build an engine ranked by [`PriceTimePriority`].
    pub fn new<I>(pair: TokenPair, orders: I, heights: H) -> Self
    where
        I: IntoIterator<Item = Order>,
    {
        Self::with_comparator(pair, orders, heights, PriceTimePriority)
    }

    /// Build an engine for the pair described by `config`.
    pub fn from_config<I>(config: &PairConfig, orders: I, heights: H) -> Result<Self>
    where
        I: IntoIterator<Item = Order>,
    {
        config.validate()?;
        Ok(Self::new(config.pair(), orders, heights))
    }
}

impl<H, C> OrderMatchingEngine<H, C>
where
    H: BlockHeightSource,
    C: Comparator<Order> + Clone,
{
    /// Build an engine with a custom ranking strategy.
    pub fn with_comparator<I>(pair: TokenPair, orders: I, heights: H, cmp: C) -> Self
    where
        I: IntoIterator<Item = Order>,
    {
        let factory = TransactionFactory::new(&pair);
        Self {
            book: OrderBook::classify(pair, orders, cmp),
            heights,
            factory,
        }
    }

    /// Execute every cross the book currently allows.
    ///
    /// Returns transactions in execution order. A height source failure
    /// aborts the call; the book keeps whatever state the completed steps
    /// left it in.
    pub async fn match_orders(&mut self) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();

        while self.top_of_book_crosses().await? {
            let Some(mut ask) = self.book.asks.pop(&self.heights).await? else {
                break;
            };

            while ask.is_non_zero() && self.crosses_best_bid(&ask).await? {
                let Some(mut bid) = self.book.bids.pop(&self.heights).await? else {
                    break;
                };
                if !bid.is_non_zero() {
                    tracing::debug!(order = %bid.id, "Dropping spent bid");
                    continue;
                }
                // The pop re-reads the height and may have evicted the bid
                // that was peeked, surfacing one that does not cross.
                if !bid.crosses_ask(&ask) {
                    tracing::debug!(
                        ask = %ask.id,
                        bid = %bid.id,
                        "Popped bid no longer crosses, returning it to the book"
                    );
                    self.book.bids.push(bid);
                    break;
                }

                if bid.target_amount <= ask.source_amount {
                    match self.absorb_bid(&mut ask, &mut bid) {
                        Ok(tx) => transactions.push(tx),
                        Err(err) => {
                            self.book.bids.push(bid);
                            self.book.asks.push(ask);
                            return Err(err);
                        }
                    }
                } else {
                    transactions.push(self.absorb_ask(&mut ask, &mut bid));
                    if bid.is_non_zero() {
                        self.book.bids.push(bid);
                    }
                }
            }

            if ask.is_non_zero() {
                self.book.asks.push(ask);
            }
        }

        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            pair = %self.book.pair(),
            fills = transactions.len(),
            bids = self.book.bid_count(),
            asks = self.book.ask_count(),
            transaction_root = %hex::encode(compute_transaction_root(&transactions)),
            "Matching complete"
        );

        Ok(transactions)
    }

    /// The bid is filled completely at the ask's rate. Neither order is
    /// touched when the repriced amount cannot be computed.
    fn absorb_bid(&mut self, ask: &mut Order, bid: &mut Order) -> Result<Transaction> {
        let repriced = repriced_source(ask, bid)?;

        bid.source_amount = repriced;
        ask.target_amount -= repriced;
        ask.source_amount -= bid.target_amount;

        let tx = self.factory.make(bid, ask);
        log_fill(&tx);
        Ok(tx)
    }

    /// The ask is filled completely; the bid keeps whatever is left.
    fn absorb_ask(&mut self, ask: &mut Order, bid: &mut Order) -> Transaction {
        let tx = self.factory.make(ask, bid);
        log_fill(&tx);

        bid.source_amount -= ask.target_amount;
        bid.target_amount -= ask.source_amount;
        ask.source_amount = Decimal::ZERO;
        tx
    }

    async fn top_of_book_crosses(&mut self) -> Result<bool> {
        let ask = self.book.asks.peek(&self.heights).await?;
        let bid = self.book.bids.peek(&self.heights).await?;
        Ok(crosses(ask, bid))
    }

    async fn crosses_best_bid(&mut self, ask: &Order) -> Result<bool> {
        let bid = self.book.bids.peek(&self.heights).await?;
        Ok(crosses(Some(ask), bid))
    }
}

impl<H, C: Comparator<Order>> OrderMatchingEngine<H, C> {
    #[must_use]
    pub fn pair(&self) -> &TokenPair {
        self.book.pair()
    }

    /// Resident bids, including expired ones not yet observed.
    #[must_use]
    pub fn bid_count(&self) -> usize {
        self.book.bid_count()
    }

    /// Resident asks, including expired ones not yet observed.
    #[must_use]
    pub fn ask_count(&self) -> usize {
        self.book.ask_count()
    }

    /// Copy of both sides in rank order.
    #[must_use]
    pub fn snapshot(&self) -> BookSnapshot {
        self.book.snapshot()
    }

    /// Transactions issued over the engine's lifetime.
    #[must_use]
    pub fn fills_issued(&self) -> u64 {
        self.factory.issued()
    }
}

/// `bid.target * ask_rate`: what a fully absorbed bid pays at the ask's
/// rate. When the rate itself does not fit in a `Decimal` the amount is
/// taken as the bid's share of the ask, which never exceeds `ask.target`.
fn repriced_source(ask: &Order, bid: &Order) -> Result<Decimal> {
    ask.ask_rate()
        .and_then(|rate| bid.target_amount.checked_mul(rate))
        .or_else(|| {
            bid.target_amount
                .checked_div(ask.source_amount)
                .and_then(|share| share.checked_mul(ask.target_amount))
        })
        .ok_or_else(|| {
            SwapbookError::Internal(format!(
                "cannot price bid {} against ask {}: {}/{} at {}/{}",
                bid.id,
                ask.id,
                bid.source_amount,
                bid.target_amount,
                ask.target_amount,
                ask.source_amount,
            ))
        })
}

fn log_fill(tx: &Transaction) {
    tracing::debug!(
        tx = %tx.id.short(),
        seq = tx.sequence,
        buy_order = %tx.buy_order_id,
        sell_order = %tx.sell_order_id,
        source_amount = %tx.source_amount,
        target_amount = %tx.target_amount,
        "Orders matched"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use chrono::{Duration, Utc};
    use swapbook_types::BlockHeight;

    use super::*;
    use crate::height::{FixedHeight, height_fn};

    fn pair() -> TokenPair {
        TokenPair::new("CatToken", "DogToken")
    }

    fn engine(orders: Vec<Order>) -> OrderMatchingEngine<FixedHeight> {
        OrderMatchingEngine::new(pair(), orders, FixedHeight::new(1))
    }

    #[test]
    fn crossing_condition() {
        let pair = pair();
        let ask = Order::dummy_ask(&pair, 200, 100); // requires 0.5
        let good = Order::dummy_bid(&pair, 50, 50); // offers 1.0
        let exact = Order::dummy_bid(&pair, 25, 50); // offers 0.5
        let poor = Order::dummy_bid(&pair, 20, 50); // offers 0.4

        assert!(crosses(Some(&ask), Some(&good)));
        assert!(crosses(Some(&ask), Some(&exact)));
        assert!(!crosses(Some(&ask), Some(&poor)));
        assert!(!crosses(None, Some(&good)));
        assert!(!crosses(Some(&ask), None));
    }

    #[tokio::test]
    async fn full_match_empties_book() {
        let pair = pair();
        let ask = Order::dummy_ask(&pair, 100, 100);
        let bid = Order::dummy_bid(&pair, 100, 100);
        let (ask_id, bid_id) = (ask.id, bid.id);

        let mut engine = engine(vec![ask, bid]);
        let txs = engine.match_orders().await.unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].buy_order_id, bid_id);
        assert_eq!(txs[0].sell_order_id, ask_id);
        assert_eq!(txs[0].source_amount, Decimal::from(100));
        assert_eq!(txs[0].target_amount, Decimal::from(100));
        assert_eq!(engine.bid_count(), 0);
        assert_eq!(engine.ask_count(), 0);
    }

    #[tokio::test]
    async fn bid_absorbed_at_ask_rate_and_ask_requeued() {
        let pair = pair();
        let ask = Order::dummy_ask(&pair, 200, 100);
        let bid = Order::dummy_bid(&pair, 50, 50);
        let ask_id = ask.id;

        let mut engine = engine(vec![ask, bid]);
        let txs = engine.match_orders().await.unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].source_amount, Decimal::from(25));
        assert_eq!(txs[0].target_amount, Decimal::from(50));

        let snap = engine.snapshot();
        assert!(snap.bids.is_empty());
        assert_eq!(snap.asks.len(), 1);
        assert_eq!(snap.asks[0].id, ask_id);
        assert_eq!(snap.asks[0].source_amount, Decimal::from(150));
        assert_eq!(snap.asks[0].target_amount, Decimal::from(75));
    }

    #[tokio::test]
    async fn ask_absorbed_and_bid_requeued() {
        let pair = pair();
        // Ask offers 40 DogToken for 40 CatToken; bid offers 200 CatToken for 100 DogToken.
        let ask = Order::dummy_ask(&pair, 40, 40);
        let bid = Order::dummy_bid(&pair, 200, 100);
        let (ask_id, bid_id) = (ask.id, bid.id);

        let mut engine = engine(vec![ask, bid]);
        let txs = engine.match_orders().await.unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].buy_order_id, ask_id);
        assert_eq!(txs[0].sell_order_id, bid_id);
        assert_eq!(txs[0].source_amount, Decimal::from(40));
        assert_eq!(txs[0].target_amount, Decimal::from(40));
        assert_eq!(txs[0].source_token, pair.target);

        let snap = engine.snapshot();
        assert!(snap.asks.is_empty());
        assert_eq!(snap.bids.len(), 1);
        assert_eq!(snap.bids[0].source_amount, Decimal::from(160));
        assert_eq!(snap.bids[0].target_amount, Decimal::from(60));
    }

    #[tokio::test]
    async fn one_ask_sweeps_several_bids_in_priority_order() {
        let pair = pair();
        let now = Utc::now();
        let ask = Order::dummy_ask(&pair, 100, 100);
        let best = Order::dummy_bid(&pair, 60, 30).placed_at(now);
        let older = Order::dummy_bid(&pair, 30, 30).placed_at(now - Duration::seconds(2));
        let newer = Order::dummy_bid(&pair, 30, 30).placed_at(now);
        let ids = [best.id, older.id, newer.id];

        let mut engine = engine(vec![newer, ask, older, best]);
        let txs = engine.match_orders().await.unwrap();

        let buyers: Vec<_> = txs.iter().map(|t| t.buy_order_id).collect();
        assert_eq!(buyers, ids);
        let seqs: Vec<u64> = txs.iter().map(|t| t.sequence).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(engine.ask_count(), 1);
        assert_eq!(engine.snapshot().asks[0].source_amount, Decimal::from(10));
    }

    #[tokio::test]
    async fn no_cross_is_a_noop() {
        let pair = pair();
        let ask = Order::dummy_ask(&pair, 50, 100); // requires 2.0
        let bid = Order::dummy_bid(&pair, 100, 100); // offers 1.0
        let mut engine = engine(vec![ask, bid]);
        let before = engine.snapshot();

        let txs = engine.match_orders().await.unwrap();
        assert!(txs.is_empty());
        assert_eq!(engine.snapshot(), before);

        let again = engine.match_orders().await.unwrap();
        assert!(again.is_empty());
        assert_eq!(engine.snapshot(), before);
    }

    #[tokio::test]
    async fn expired_bid_never_trades() {
        let pair = pair();
        let ask = Order::dummy_ask(&pair, 100, 100);
        let stale = Order::dummy_bid(&pair, 500, 100).expiring_at(10);
        let live = Order::dummy_bid(&pair, 100, 100);
        let (stale_id, live_id) = (stale.id, live.id);

        let orders = vec![ask, stale, live];
        let mut engine = OrderMatchingEngine::new(pair, orders, FixedHeight::new(11));
        let txs = engine.match_orders().await.unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].buy_order_id, live_id);
        assert!(txs.iter().all(|t| !t.involves(&stale_id)));
        assert_eq!(engine.bid_count(), 0);
    }

    #[tokio::test]
    async fn height_failure_aborts_match() {
        let pair = pair();
        let heights = height_fn(|| async {
            Err::<BlockHeight, _>(SwapbookError::HeightSourceFailed {
                reason: "rpc down".into(),
            })
        });
        let orders = vec![Order::dummy_ask(&pair, 1, 1), Order::dummy_bid(&pair, 1, 1)];
        let mut engine = OrderMatchingEngine::new(pair, orders, heights);

        let err = engine.match_orders().await.unwrap_err();
        assert!(matches!(err, SwapbookError::HeightSourceFailed { .. }));
        assert_eq!(engine.bid_count(), 1);
        assert_eq!(engine.ask_count(), 1);
    }

    #[tokio::test]
    async fn custom_comparator_changes_priority() {
        let pair = pair();
        let now = Utc::now();
        let ask = Order::dummy_ask(&pair, 10, 10);
        // Newest-first policy: the younger bid wins despite the worse rate.
        let rich_old = Order::dummy_bid(&pair, 100, 10).placed_at(now - Duration::seconds(9));
        let plain_new = Order::dummy_bid(&pair, 10, 10).placed_at(now);
        let plain_id = plain_new.id;

        let newest_first = |a: &Order, b: &Order| b.timestamp.cmp(&a.timestamp);
        let mut engine = OrderMatchingEngine::with_comparator(
            pair,
            vec![ask, rich_old, plain_new],
            FixedHeight::new(1),
            newest_first,
        );
        let txs = engine.match_orders().await.unwrap();
        assert_eq!(txs[0].buy_order_id, plain_id);
    }

    #[tokio::test]
    async fn from_config_rejects_bad_pair() {
        let config = PairConfig {
            source_token: "DAI".into(),
            target_token: "DAI".into(),
        };
        let err = OrderMatchingEngine::from_config(&config, Vec::new(), FixedHeight::new(0))
            .unwrap_err();
        assert!(matches!(err, SwapbookError::Configuration(_)));

        let config = PairConfig::cat_dog();
        let engine =
            OrderMatchingEngine::from_config(&config, Vec::new(), FixedHeight::new(0)).unwrap();
        assert_eq!(engine.pair(), &pair());
        assert_eq!(engine.fills_issued(), 0);
    }
    /// Reports `before` for the first `switch_after` queries, `after` from then on.
    fn height_step(
        switch_after: u64,
        before: u64,
        after: u64,
    ) -> impl BlockHeightSource {
        let calls = Arc::new(AtomicU64::new(0));
        height_fn(move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let height = if n < switch_after { before } else { after };
            async move { Ok(BlockHeight(height)) }
        })
    }

    #[tokio::test]
    async fn bid_surfacing_after_mid_match_expiry_is_rechecked() {
        let pair = pair();
        let now = Utc::now();
        let ask = Order::dummy_ask(&pair, 100, 100);
        let best = Order::dummy_bid(&pair, 100, 100)
            .expiring_at(3)
            .placed_at(now - Duration::seconds(1));
        let poor = Order::dummy_bid(&pair, 50, 100).placed_at(now); // offers 0.5
        let (ask_id, poor_id) = (ask.id, poor.id);

        // Four reads at height 3 cover both peeks, the ask pop and the bid
        // peek; the bid pop sees height 4 and evicts `best`.
        let mut engine =
            OrderMatchingEngine::new(pair, vec![ask, best, poor], height_step(4, 3, 4));
        let txs = engine.match_orders().await.unwrap();

        assert!(txs.is_empty(), "non-crossing bid must not fill: {txs:?}");
        let snap = engine.snapshot();
        assert_eq!(snap.bids.len(), 1);
        assert_eq!(snap.bids[0].id, poor_id);
        assert_eq!(snap.bids[0].source_amount, Decimal::from(50));
        assert_eq!(snap.bids[0].target_amount, Decimal::from(100));
        assert_eq!(snap.asks.len(), 1);
        assert_eq!(snap.asks[0].id, ask_id);
        assert_eq!(snap.asks[0].source_amount, Decimal::from(100));
    }

    #[tokio::test]
    async fn bid_rate_beyond_decimal_range_still_fills() {
        let pair = pair();
        let ask = Order::dummy_ask(&pair, 10, 10);
        let mut bid = Order::dummy_bid(&pair, 1, 1);
        bid.source_amount = Decimal::MAX;
        bid.target_amount = Decimal::new(5, 1);
        let bid_id = bid.id;

        let mut engine = engine(vec![ask, bid]);
        let txs = engine.match_orders().await.unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].buy_order_id, bid_id);
        // Pays the ask's rate of 1, not its own.
        assert_eq!(txs[0].source_amount, Decimal::ONE);
        assert_eq!(txs[0].target_amount, Decimal::ONE);
        let snap = engine.snapshot();
        assert_eq!(snap.asks[0].source_amount, Decimal::new(95, 1));
        assert_eq!(snap.asks[0].target_amount, Decimal::new(95, 1));
    }

    #[test]
    fn repricing_falls_back_to_share_of_ask() {
        let pair = pair();
        let mut ask = Order::dummy_ask(&pair, 1, 1);
        ask.source_amount = Decimal::new(1, 1);
        ask.target_amount = Decimal::MAX;
        assert_eq!(ask.ask_rate(), None);
        let mut bid = Order::dummy_bid(&pair, 1, 1);
        bid.target_amount = Decimal::new(5, 2);

        let repriced = repriced_source(&ask, &bid).unwrap();
        assert!(repriced > Decimal::ZERO);
        assert!(repriced <= ask.target_amount);
    }

    #[test]
    fn repricing_reports_unrepresentable_amount() {
        let pair = pair();
        let mut ask = Order::dummy_ask(&pair, 1, 1);
        ask.source_amount = Decimal::new(1, 1);
        ask.target_amount = Decimal::MAX;
        let bid = Order::dummy_bid(&pair, 10, 10);

        let err = repriced_source(&ask, &bid).unwrap_err();
        assert!(matches!(err, SwapbookError::Internal(_)));
        assert!(err.to_string().starts_with("SB_ERR_900"));
    }

    #[test]
    fn repricing_uses_ask_rate() {
        let pair = pair();
        let ask = Order::dummy_ask(&pair, 200, 100);
        let bid = Order::dummy_bid(&pair, 50, 50);
        assert_eq!(repriced_source(&ask, &bid).unwrap(), Decimal::from(25));
    }
}
