//! Transaction id allocation
//!
//! Ids are drawn randomly and checked against the live-transaction ledger
//! until an unused one turns up. The check-then-use window is not atomic:
//! two concurrent allocations can both clear the existence check with the
//! same candidate before either commits it. The ledger keeps the unique
//! constraint; this allocator only guarantees the id was free at the moment
//! of its check.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::lookups::TransactionLedger;

/// Allocates collision-free transaction ids against a ledger
pub struct TransactionIdAllocator {
    ledger: Arc<dyn TransactionLedger>,
}

impl TransactionIdAllocator {
    /// Create an allocator over a ledger
    pub fn new(ledger: Arc<dyn TransactionLedger>) -> Self {
        Self { ledger }
    }

    /// Allocate an id that was not live at the moment of its check
    ///
    /// Regenerates without a retry bound while the ledger reports the
    /// candidate live.
    pub async fn allocate(&self, correlation_id: &str) -> Result<i32> {
        loop {
            let candidate = draw_candidate(&mut rand::thread_rng());
            if !self
                .ledger
                .transaction_id_exists(candidate, correlation_id)
                .await?
            {
                debug!("Allocated transaction id {}", candidate);
                return Ok(candidate);
            }
            debug!("Transaction id {} already live, regenerating", candidate);
        }
    }
}

/// Draw one candidate id: a random upper bound in `[1, i32::MAX]`, then a
/// candidate in `[1, bound)`. The degenerate bound 1 yields candidate 1.
fn draw_candidate(rng: &mut impl Rng) -> i32 {
    let upper = rng.gen_range(1..=i32::MAX);
    rng.gen_range(1..upper.max(2))
}

// ============================================================================
// Tests
// ============================================================================
