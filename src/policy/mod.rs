//! This module defines the flush-decision contract shared by every strategy and
//! the four concrete strategies a writer can choose from at construction time.
//!
//! A writer drives a policy from its per-batch control loop:
//!
//!   1. After appending a batch, it calls `should_flush` with a fresh
//!      `StripeProgress` snapshot.
//!   2. Whether or not the stripe is closing, it may call
//!      `should_flush_dictionary` to learn what to do with dictionary-encoded
//!      columns (commit, re-evaluate, abandon, or nothing).
//!   3. Once the writer is fully closed, it calls `on_close` exactly once.
//!
//! Policies never perform a flush and never touch writer state; they only
//! answer. The `controller` module wraps a policy with the per-stripe state
//! machine that enforces the one-shot flush contract.

use crate::context::WriterContext;
use crate::types::{FlushDecision, StripeProgress};

//==================================================================================
// 1. Module Declarations
//==================================================================================
mod predicate;
mod row_count;
mod rows_per_stripe;
mod stripe_size;


//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use self::predicate::PredicateFlushPolicy;
pub use self::row_count::RowCountFlushPolicy;
pub use self::rows_per_stripe::{RowsPerStripeFlushPolicy, ScheduleExhaustion};
pub use self::stripe_size::{StripeSizeFlushPolicy, DEFAULT_DICTIONARY_ASSESSMENT_FRACTION};

//==================================================================================
// 3. The Contract
//==================================================================================

/// **CONTRACT:** The trait every flush strategy implements.
///
/// All methods are synchronous, non-blocking and infallible. The writer
/// guarantees exclusive, sequential access, hence `&mut self` and no locking.
pub trait FlushPolicy {
    /// A short, stable name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Should the current stripe be closed now?
    ///
    /// May keep returning `true` on every call past the policy's threshold.
    /// Honoring only the first `true` per stripe is the caller's job.
    fn should_flush(&mut self, progress: &StripeProgress) -> bool;

    /// What should happen to dictionary-encoded columns?
    ///
    /// `flush_stripe` tells the policy whether the stripe is being closed;
    /// `false` means a mid-stripe re-assessment. Must return `Skip` once the
    /// policy has been closed.
    fn should_flush_dictionary(
        &mut self,
        flush_stripe: bool,
        over_memory_budget: bool,
        progress: &StripeProgress,
        context: &dyn WriterContext,
    ) -> FlushDecision;

    /// Lifecycle hook, called once after the writer has closed.
    ///
    /// Must be safe on a policy that never flushed and must never panic.
    fn on_close(&mut self);
}

impl<P: FlushPolicy + ?Sized> FlushPolicy for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn should_flush(&mut self, progress: &StripeProgress) -> bool {
        (**self).should_flush(progress)
    }

    fn should_flush_dictionary(
        &mut self,
        flush_stripe: bool,
        over_memory_budget: bool,
        progress: &StripeProgress,
        context: &dyn WriterContext,
    ) -> FlushDecision {
        (**self).should_flush_dictionary(flush_stripe, over_memory_budget, progress, context)
    }

    fn on_close(&mut self) {
        (**self).on_close()
    }
}
