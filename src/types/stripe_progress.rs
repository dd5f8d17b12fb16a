//! The read-only progress snapshot describing the stripe currently being
//! accumulated by the writer.

use serde::{Deserialize, Serialize};

/// Live metrics for the open stripe, produced fresh by the writer before each
/// policy query. Policies only ever borrow it.
///
/// `stripe_row_count` and `stripe_size_estimate` are non-decreasing within a
/// stripe and start again from zero at the next stripe.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StripeProgress {
    /// Zero-based index of the stripe being accumulated.
    pub stripe_index: u64,
    /// Rows appended to the current stripe so far.
    pub stripe_row_count: u64,
    /// Estimated encoded size of the current stripe, in bytes.
    pub stripe_size_estimate: u64,
    /// Writer-wide memory in use, in bytes.
    pub total_memory_usage: u64,
}

impl StripeProgress {
    /// A snapshot carrying only a row count, for row-driven policies.
    pub fn with_rows(stripe_row_count: u64) -> Self {
        Self {
            stripe_row_count,
            ..Self::default()
        }
    }

    /// A snapshot carrying only a size estimate, for size-driven policies.
    pub fn with_size(stripe_size_estimate: u64) -> Self {
        Self {
            stripe_size_estimate,
            ..Self::default()
        }
    }
}
