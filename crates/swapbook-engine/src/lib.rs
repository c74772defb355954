//! # swapbook-engine
//!
//! **Continuous order matching for a single token pair.**
//!
//! The engine keeps two priority queues, bids and asks, ranked by a
//! pluggable comparator (rate, then age, by default). Each call to
//! [`OrderMatchingEngine::match_orders`] executes every cross the book
//! allows and returns the resulting [`Transaction`](swapbook_types::Transaction)s.
//!
//! - **Lazy expiry**: orders past their block height are discarded when
//!   they reach the top of a queue, using an injected [`BlockHeightSource`]
//! - **Partial fills**: unfilled remainders go back on the book
//! - **Deterministic output**: same pool and heights give the same
//!   transactions and the same [`compute_transaction_root`]

pub mod comparator;
pub mod determinism;
pub mod height;
pub mod matcher;
pub mod orderbook;
pub mod priority_queue;
pub mod queue;
pub mod transaction;

pub use comparator::PriceTimePriority;
pub use determinism::{
    compute_transaction_root, ensure_transaction_root, verify_transaction_root,
};
pub use height::{BlockHeightSource, FixedHeight, FnHeightSource, WatchHeight, height_fn};
pub use matcher::{OrderMatchingEngine, crosses};
pub use orderbook::{BookSnapshot, OrderBook};
pub use priority_queue::{Comparator, PriorityQueue};
pub use queue::OrderQueue;
pub use transaction::{TransactionFactory, round_amount};
