// In: src/policy/stripe_size.rs

//! The default, size-driven flush policy.
//!
//! A stripe is closed once its estimated size reaches `stripe_size_threshold`.
//! Dictionary viability is checked earlier than that, at the assessment
//! checkpoint (a fraction of the stripe threshold), so a writer learns that a
//! dictionary stopped paying off before the stripe is already full.

use crate::context::WriterContext;
use crate::error::StripeflowError;
use crate::log_metric;
use crate::types::{FlushDecision, StripeProgress};

use super::FlushPolicy;

/// Fraction of the stripe threshold at which dictionaries are first re-assessed.
pub const DEFAULT_DICTIONARY_ASSESSMENT_FRACTION: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct StripeSizeFlushPolicy {
    stripe_size_threshold: u64,
    dictionary_size_threshold: u64,
    /// Derived at construction; always in `1..=stripe_size_threshold`.
    dictionary_assessment_threshold: u64,
    closed: bool,
}

impl StripeSizeFlushPolicy {
    /// Builds the policy with the default assessment fraction.
    pub fn new(
        stripe_size_threshold: u64,
        dictionary_size_threshold: u64,
    ) -> Result<Self, StripeflowError> {
        Self::with_assessment_fraction(
            stripe_size_threshold,
            dictionary_size_threshold,
            DEFAULT_DICTIONARY_ASSESSMENT_FRACTION,
        )
    }

    /// Builds the policy with an explicit assessment fraction in `(0, 1]`.
    pub fn with_assessment_fraction(
        stripe_size_threshold: u64,
        dictionary_size_threshold: u64,
        assessment_fraction: f64,
    ) -> Result<Self, StripeflowError> {
        if stripe_size_threshold == 0 {
            return Err(StripeflowError::zero_threshold("stripe_size_threshold"));
        }
        if dictionary_size_threshold == 0 {
            return Err(StripeflowError::zero_threshold("dictionary_size_threshold"));
        }
        if !assessment_fraction.is_finite()
            || assessment_fraction <= 0.0
            || assessment_fraction > 1.0
        {
            return Err(StripeflowError::InvalidAssessmentFraction(assessment_fraction));
        }

        // Floor, but never below one byte so a tiny stripe threshold still
        // yields a meaningful checkpoint.
        let scaled = (stripe_size_threshold as f64 * assessment_fraction) as u64;
        let dictionary_assessment_threshold = scaled.clamp(1, stripe_size_threshold);

        log::debug!(
            "stripe_size policy: stripe threshold {} B, dictionary threshold {} B, assessment checkpoint {} B",
            stripe_size_threshold,
            dictionary_size_threshold,
            dictionary_assessment_threshold
        );

        Ok(Self {
            stripe_size_threshold,
            dictionary_size_threshold,
            dictionary_assessment_threshold,
            closed: false,
        })
    }

    pub fn stripe_size_threshold(&self) -> u64 {
        self.stripe_size_threshold
    }

    pub fn dictionary_size_threshold(&self) -> u64 {
        self.dictionary_size_threshold
    }

    /// The stripe size at which mid-stripe dictionary re-assessment begins.
    pub fn dictionary_assessment_threshold(&self) -> u64 {
        self.dictionary_assessment_threshold
    }

    /// Dictionary assessment against an explicit dictionary memory figure.
    ///
    /// The trait method reads the same figure from the writer context and
    /// delegates here.
    pub fn should_flush_dictionary_with_usage(
        &self,
        flush_stripe: bool,
        over_memory_budget: bool,
        progress: &StripeProgress,
        dictionary_memory_usage: u64,
    ) -> FlushDecision {
        if self.closed {
            return FlushDecision::Skip;
        }

        // A closing stripe always commits whatever dictionary state exists.
        let decision = if flush_stripe {
            FlushDecision::FlushDictionary
        } else if over_memory_budget {
            // Global backpressure outranks the dictionary's own budget.
            FlushDecision::AbandonDictionary
        } else if dictionary_memory_usage >= self.dictionary_size_threshold {
            FlushDecision::AbandonDictionary
        } else if progress.stripe_size_estimate >= self.dictionary_assessment_threshold {
            FlushDecision::EvaluateDictionary
        } else {
            FlushDecision::Skip
        };

        log_metric!(
            "event"="should_flush_dictionary",
            "policy"="stripe_size",
            "stripe"=&progress.stripe_index,
            "size"=&progress.stripe_size_estimate,
            "dictionary_bytes"=&dictionary_memory_usage,
            "over_budget"=&over_memory_budget,
            "decision"=&decision
        );
        decision
    }
}

impl FlushPolicy for StripeSizeFlushPolicy {
    fn name(&self) -> &'static str {
        "stripe_size"
    }

    fn should_flush(&mut self, progress: &StripeProgress) -> bool {
        progress.stripe_size_estimate >= self.stripe_size_threshold
    }

    fn should_flush_dictionary(
        &mut self,
        flush_stripe: bool,
        over_memory_budget: bool,
        progress: &StripeProgress,
        context: &dyn WriterContext,
    ) -> FlushDecision {
        self.should_flush_dictionary_with_usage(
            flush_stripe,
            over_memory_budget,
            progress,
            context.dictionary_memory_usage(),
        )
    }

    fn on_close(&mut self) {
        self.closed = true;
    }
}
