//! # swapbook-types
//!
//! Shared types, errors, and configuration for the **SwapBook** matching kernel.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`TransactionId`], [`Address`], [`TokenId`], [`BlockHeight`], [`TokenPair`]
//! - **Order model**: [`Order`], [`BookSide`]
//! - **Transaction model**: [`Transaction`]
//! - **Configuration**: [`PairConfig`]
//! - **Errors**: [`SwapbookError`] with `SB_ERR_` prefix codes
//! - **Constants**: sentinels and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use swapbook_types::{Order, Transaction, TokenPair, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use transaction::*;

// Constants are accessed via `swapbook_types::constants::FOO`
// (not re-exported to avoid name collisions).
