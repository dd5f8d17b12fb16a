// In: src/policy/rows_per_stripe.rs

//! A schedule-driven policy: stripe `n` is closed once it holds
//! `rows_per_stripe[n]` rows.
//!
//! The entry is looked up by the writer's own `progress.stripe_index`, so the
//! policy holds no cursor and `should_flush` is a pure function of its input.
//! The writer advancing its stripe index is what walks the schedule.

use serde::{Deserialize, Serialize};

use crate::context::WriterContext;
use crate::error::StripeflowError;
use crate::log_metric;
use crate::types::{FlushDecision, StripeProgress};

use super::FlushPolicy;

/// What to do for stripe indices past the end of the schedule.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleExhaustion {
    /// **Default:** keep using the final scheduled row count for every later stripe.
    #[default]
    RepeatLast,
    /// Stop flushing; the remaining rows land in one final stripe at close.
    NeverFlush,
}

#[derive(Debug, Clone)]
pub struct RowsPerStripeFlushPolicy {
    rows_per_stripe: Vec<u64>,
    on_exhausted: ScheduleExhaustion,
}

impl RowsPerStripeFlushPolicy {
    /// Builds the policy, repeating the last entry once the schedule runs out.
    pub fn new(rows_per_stripe: Vec<u64>) -> Result<Self, StripeflowError> {
        Self::with_exhaustion(rows_per_stripe, ScheduleExhaustion::default())
    }

    pub fn with_exhaustion(
        rows_per_stripe: Vec<u64>,
        on_exhausted: ScheduleExhaustion,
    ) -> Result<Self, StripeflowError> {
        if rows_per_stripe.is_empty() {
            return Err(StripeflowError::EmptySchedule);
        }
        if let Some(index) = rows_per_stripe.iter().position(|&rows| rows == 0) {
            return Err(StripeflowError::ZeroScheduleEntry { index });
        }
        Ok(Self {
            rows_per_stripe,
            on_exhausted,
        })
    }

    /// The row target for the given stripe, or `None` if that stripe never flushes.
    pub fn target_for_stripe(&self, stripe_index: u64) -> Option<u64> {
        let scheduled = usize::try_from(stripe_index)
            .ok()
            .and_then(|index| self.rows_per_stripe.get(index));
        match scheduled {
            Some(&rows) => Some(rows),
            None => match self.on_exhausted {
                ScheduleExhaustion::RepeatLast => self.rows_per_stripe.last().copied(),
                ScheduleExhaustion::NeverFlush => None,
            },
        }
    }

    /// Whether the given stripe lies past the end of the schedule.
    pub fn is_exhausted_at(&self, stripe_index: u64) -> bool {
        stripe_index >= self.rows_per_stripe.len() as u64
    }
}

impl FlushPolicy for RowsPerStripeFlushPolicy {
    fn name(&self) -> &'static str {
        "rows_per_stripe"
    }

    fn should_flush(&mut self, progress: &StripeProgress) -> bool {
        let Some(target) = self.target_for_stripe(progress.stripe_index) else {
            return false;
        };
        let flush = progress.stripe_row_count >= target;
        if flush {
            log_metric!(
                "event"="should_flush",
                "policy"="rows_per_stripe",
                "stripe"=&progress.stripe_index,
                "target"=&target,
                "rows"=&progress.stripe_row_count
            );
        }
        flush
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
