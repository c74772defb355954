//! System-wide constants for the SwapBook matching kernel.

use crate::BlockHeight;

/// Expiry value that marks an order as never expiring.
pub const NON_EXPIRING: BlockHeight = BlockHeight(0);

/// Decimal places kept on transaction amounts (whole token units).
pub const TRANSACTION_AMOUNT_SCALE: u32 = 0;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SwapBook";
