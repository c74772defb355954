//! Determinism checks for replayed matching runs.
//!
//! Two engines fed the same order pool and the same heights must emit the
//! same transactions in the same order. The `transaction_root` is a single
//! SHA-256 digest over that output so runs can be compared cheaply.

use sha2::{Digest, Sha256};
use swapbook_types::{BlockHeight, Result, SwapbookError, Transaction};

/// Compute the transaction root over `transactions`, in order.
///
/// Covers ids, sequence numbers, order ids, addresses, tokens, amounts
/// and expiries. Amounts are hashed in normalized form so `25` and `25.0`
/// agree.
#[must_use]
pub fn compute_transaction_root(transactions: &[Transaction]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"swapbook:transaction_root:v1:");
    hasher.update((transactions.len() as u64).to_le_bytes());

    for tx in transactions {
        hasher.update(tx.id.0.as_bytes());
        hasher.update(tx.sequence.to_le_bytes());
        hasher.update(tx.buy_order_id.0.as_bytes());
        hasher.update(tx.sell_order_id.0.as_bytes());
        update_str(&mut hasher, tx.buyer.as_str());
        update_str(&mut hasher, tx.seller.as_str());
        update_str(&mut hasher, tx.source_token.as_str());
        update_str(&mut hasher, tx.target_token.as_str());
        update_str(&mut hasher, &tx.source_amount.normalize().to_string());
        update_str(&mut hasher, &tx.target_amount.normalize().to_string());
        update_expiry(&mut hasher, tx.buy_expiry);
        update_expiry(&mut hasher, tx.sell_expiry);
    }

    let digest = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&digest);
    root
}

/// Recompute the root and compare it with `expected_root`.
#[must_use]
pub fn verify_transaction_root(transactions: &[Transaction], expected_root: &[u8; 32]) -> bool {
    compute_transaction_root(transactions) == *expected_root
}

/// Like [`verify_transaction_root`], but reports a mismatch as
/// `DeterminismViolation` carrying both roots in hex.
pub fn ensure_transaction_root(
    transactions: &[Transaction],
    expected_root: &[u8; 32],
) -> Result<()> {
    let actual = compute_transaction_root(transactions);
    if actual == *expected_root {
        return Ok(());
    }
    Err(SwapbookError::DeterminismViolation {
        expected: hex::encode(expected_root),
        actual: hex::encode(actual),
    })
}

// Length prefix keeps ("ab","c") and ("a","bc") apart.
fn update_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn update_expiry(hasher: &mut Sha256, expiry: Option<BlockHeight>) {
    match expiry {
        Some(height) => {
            hasher.update([1u8]);
            hasher.update(height.0.to_le_bytes());
        }
        None => hasher.update([0u8]),
    }
}
