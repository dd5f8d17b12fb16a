// In: src/policy/predicate.rs

//! Hands flush timing entirely to caller-supplied code.

use std::fmt;

use crate::context::WriterContext;
use crate::types::{FlushDecision, StripeProgress};

use super::FlushPolicy;

/// Flushes whenever the wrapped predicate returns `true`.
///
/// The predicate runs on the writer's hot path, once per `should_flush` call.
/// It may have side effects (counting calls, polling a flag), but it must be
/// cheap and must not block. Its result is never cached.
pub struct PredicateFlushPolicy {
    predicate: Box<dyn FnMut() -> bool>,
}

impl PredicateFlushPolicy {
    pub fn new<F>(predicate: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl fmt::Debug for PredicateFlushPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFlushPolicy").finish_non_exhaustive()
    }
}

impl FlushPolicy for PredicateFlushPolicy {
    fn name(&self) -> &'static str {
        "predicate"
    }

    fn should_flush(&mut self, _progress: &StripeProgress) -> bool {
        (self.predicate)()
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
