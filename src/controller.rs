// In: src/controller.rs

//! The stateful facade a writer's control loop talks to.
//!
//! A raw `FlushPolicy` is allowed to keep answering `true` once its threshold
//! is crossed, and it has no notion of stripe boundaries or of the writer's
//! lifecycle. `StripeFlushController` owns the policy and adds the per-stripe
//! state machine:
//!
//!   Accumulating --(should_flush == true)--> DecidingDictionary --> Closed
//!        ^                                                            |
//!        `-------------------------- begin_stripe() -----------------'
//!
//! Mid-stripe dictionary decisions (`EvaluateDictionary`, `Skip`,
//! `AbandonDictionary`) never leave `Accumulating`. Once a stripe's flush has
//! been decided, the policy is not consulted about that stripe again.

use crate::context::WriterContext;
use crate::error::StripeflowError;
use crate::log_metric;
use crate::policy::FlushPolicy;
use crate::types::{FlushDecision, StripeProgress};

/// Where the current stripe is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeState {
    /// Batches are being appended; the policy is consulted after each one.
    Accumulating,
    /// The policy asked for a flush; the dictionary decision is pending.
    DecidingDictionary,
    /// The flush has been decided. Waiting for the writer to start the next stripe.
    Closed,
}

/// The combined answer for one appended batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushVerdict {
    pub flush_stripe: bool,
    pub dictionary: FlushDecision,
}

pub struct StripeFlushController<P: FlushPolicy> {
    policy: P,
    state: StripeState,
    stripe_index: u64,
    stripes_flushed: u64,
    /// Queries whose `progress.stripe_index` disagreed with `stripe_index`.
    stripe_index_mismatches: u64,
    /// False once the policy abandoned dictionary encoding for the rest of the file.
    dictionary_active: bool,
    closed: bool,
}

impl<P: FlushPolicy> StripeFlushController<P> {
    /// Wraps a policy for a writer whose columns start out dictionary encoded.
    pub fn new(policy: P) -> Self {
        Self::with_dictionary_encoding(policy, true)
    }

    /// Wraps a policy, stating whether the writer uses dictionary encoding at all.
    pub fn with_dictionary_encoding(policy: P, dictionary_encoding: bool) -> Self {
        log::debug!(
            "flush controller created (policy '{}', dictionary encoding {})",
            policy.name(),
            dictionary_encoding
        );
        Self {
            policy,
            state: StripeState::Accumulating,
            stripe_index: 0,
            stripes_flushed: 0,
            stripe_index_mismatches: 0,
            dictionary_active: dictionary_encoding,
            closed: false,
        }
    }

    pub fn state(&self) -> StripeState {
        self.state
    }

    pub fn stripe_index(&self) -> u64 {
        self.stripe_index
    }

    pub fn stripes_flushed(&self) -> u64 {
        self.stripes_flushed
    }

    /// How many flush checks arrived with a stripe index other than the controller's.
    pub fn stripe_index_mismatches(&self) -> u64 {
        self.stripe_index_mismatches
    }

    pub fn dictionary_active(&self) -> bool {
        self.dictionary_active
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Asks the policy whether the current stripe should be closed.
    ///
    /// Only the first `true` per stripe is reported; afterwards this returns
    /// `false` without consulting the policy until `begin_stripe`.
    pub fn check_flush(&mut self, progress: &StripeProgress) -> bool {
        if self.closed || self.state != StripeState::Accumulating {
            return false;
        }
        if progress.stripe_index != self.stripe_index {
            self.stripe_index_mismatches += 1;
            log::warn!(
                "flush check for stripe {} while the controller is on stripe {}",
                progress.stripe_index,
                self.stripe_index
            );
        }
        if !self.policy.should_flush(progress) {
            return false;
        }

        self.state = StripeState::DecidingDictionary;
        log_metric!(
            "event"="flush_decided",
            "policy"=self.policy.name(),
            "stripe"=&self.stripe_index,
            "rows"=&progress.stripe_row_count,
            "size"=&progress.stripe_size_estimate
        );
        true
    }

    /// Asks the policy what to do with dictionary-encoded columns.
    ///
    /// If the stripe's flush has just been decided this commits it and moves
    /// the stripe to `Closed`. Otherwise it is a mid-stripe re-assessment.
    pub fn decide_dictionary(
        &mut self,
        progress: &StripeProgress,
        context: &dyn WriterContext,
    ) -> FlushDecision {
        if self.closed || self.state == StripeState::Closed {
            return FlushDecision::Skip;
        }

        let flush_stripe = self.state == StripeState::DecidingDictionary;
        let decision = if self.dictionary_active {
            self.policy.should_flush_dictionary(
                flush_stripe,
                context.over_memory_budget(),
                progress,
                context,
            )
        } else {
            FlushDecision::Skip
        };

        if decision == FlushDecision::AbandonDictionary {
            log::info!(
                "stripe {}: abandoning dictionary encoding for the rest of the file",
                self.stripe_index
            );
            self.dictionary_active = false;
        }

        if flush_stripe {
            self.state = StripeState::Closed;
            self.stripes_flushed += 1;
            log::info!(
                "stripe {} closed at {} rows / {} bytes (dictionary: {})",
                self.stripe_index,
                progress.stripe_row_count,
                progress.stripe_size_estimate,
                decision
            );
        } else if decision.requires_action() {
            log::debug!("stripe {}: dictionary decision {}", self.stripe_index, decision);
        }
        decision
    }

    /// Runs both queries for one appended batch.
    pub fn evaluate(
        &mut self,
        progress: &StripeProgress,
        context: &dyn WriterContext,
    ) -> FlushVerdict {
        let flush_stripe = self.check_flush(progress);
        let dictionary = self.decide_dictionary(progress, context);
        FlushVerdict {
            flush_stripe,
            dictionary,
        }
    }

    /// Starts the next stripe once the writer has physically flushed the last one.
    pub fn begin_stripe(&mut self) -> Result<(), StripeflowError> {
        if self.closed {
            return Err(StripeflowError::InvalidTransition(
                "cannot begin a stripe after the writer has closed".to_string(),
            ));
        }
        match self.state {
            StripeState::Closed => {
                self.state = StripeState::Accumulating;
                self.stripe_index += 1;
                log::debug!("stripe {} accumulating", self.stripe_index);
                Ok(())
            }
            other => Err(StripeflowError::InvalidTransition(format!(
                "cannot begin stripe {} while stripe {} is {:?}",
                self.stripe_index + 1,
                self.stripe_index,
                other
            ))),
        }
    }

    /// Runs the policy's close hook. Only the first call has any effect.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.policy.on_close();
        log::info!(
            "flush controller closed (policy '{}', {} stripes flushed)",
            self.policy.name(),
            self.stripes_flushed
        );
    }
}

impl<P: FlushPolicy> Drop for StripeFlushController<P> {
    fn drop(&mut self) {
        // A writer torn down without an explicit close still owes the hook.
        self.close();
    }
}
