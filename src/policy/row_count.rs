// In: src/policy/row_count.rs

//! Closes a stripe once it holds a fixed number of rows.

use crate::context::WriterContext;
use crate::error::StripeflowError;
use crate::types::{FlushDecision, StripeProgress};

use super::FlushPolicy;

#[derive(Debug, Clone)]
pub struct RowCountFlushPolicy {
    row_count_threshold: u64,
}

impl RowCountFlushPolicy {
    pub fn new(row_count_threshold: u64) -> Result<Self, StripeflowError> {
        if row_count_threshold == 0 {
            return Err(StripeflowError::zero_threshold("row_count_threshold"));
        }
        Ok(Self {
            row_count_threshold,
        })
    }

    pub fn row_count_threshold(&self) -> u64 {
        self.row_count_threshold
    }
}

impl FlushPolicy for RowCountFlushPolicy {
    fn name(&self) -> &'static str {
        "row_count"
    }

    fn should_flush(&mut self, progress: &StripeProgress) -> bool {
        progress.stripe_row_count >= self.row_count_threshold
    }

    fn should_flush_dictionary(
        &mut self,
        _flush_stripe: bool,
        _over_memory_budget: bool,
        _progress: &StripeProgress,
        _context: &dyn WriterContext,
    ) -> FlushDecision {
        FlushDecision::Skip
    }

    fn on_close(&mut self) {}
}
