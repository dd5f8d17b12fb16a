use std::cell::Cell;
use std::rc::Rc;

use crate::context::{WriterContext, WriterMemoryUsage};
use crate::controller::{FlushVerdict, StripeFlushController, StripeState};
use crate::error::StripeflowError;
use crate::policy::{
    FlushPolicy, PredicateFlushPolicy, RowCountFlushPolicy, RowsPerStripeFlushPolicy,
    StripeSizeFlushPolicy,
};
use crate::types::{FlushDecision, StripeProgress};

// Test Helpers
/// Wraps a policy and counts every call the controller makes into it.
struct SpyPolicy<P> {
    inner: P,
    flush_queries: Rc<Cell<u32>>,
    close_calls: Rc<Cell<u32>>,
}

impl<P: FlushPolicy> FlushPolicy for SpyPolicy<P> {
    fn name(&self) -> &'static str {
        "spy"
    }

    fn should_flush(&mut self, progress: &StripeProgress) -> bool {
        self.flush_queries.set(self.flush_queries.get() + 1);
        self.inner.should_flush(progress)
    }

    fn should_flush_dictionary(
        &mut self,
        flush_stripe: bool,
        over_memory_budget: bool,
        progress: &StripeProgress,
        context: &dyn WriterContext,
    ) -> FlushDecision {
        self.inner
            .should_flush_dictionary(flush_stripe, over_memory_budget, progress, context)
    }

    fn on_close(&mut self) {
        self.close_calls.set(self.close_calls.get() + 1);
        self.inner.on_close();
    }
}

fn spy<P: FlushPolicy>(inner: P) -> (SpyPolicy<P>, Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let flush_queries = Rc::new(Cell::new(0));
    let close_calls = Rc::new(Cell::new(0));
    (
        SpyPolicy {
            inner,
            flush_queries: Rc::clone(&flush_queries),
            close_calls: Rc::clone(&close_calls),
        },
        flush_queries,
        close_calls,
    )
}

fn sized(index: u64, size: u64) -> StripeProgress {
    StripeProgress {
        stripe_index: index,
        stripe_size_estimate: size,
        ..StripeProgress::default()
    }
}

fn rows(index: u64, count: u64) -> StripeProgress {
    StripeProgress {
        stripe_index: index,
        stripe_row_count: count,
        ..StripeProgress::default()
    }
}

//==============================================================================
// 1. State Machine
//==============================================================================

#[test]
fn test_first_true_is_honored_once_per_stripe() {
    let (policy, queries, _) = spy(RowCountFlushPolicy::new(10).unwrap());
    let mut controller = StripeFlushController::new(policy);

    assert!(!controller.check_flush(&rows(0, 9)));
    assert!(controller.check_flush(&rows(0, 10)));
    assert_eq!(controller.state(), StripeState::DecidingDictionary);

    // The policy would still say yes; the controller does not even ask.
    assert!(!controller.check_flush(&rows(0, 11)));
    assert_eq!(queries.get(), 2);
}

#[test]
fn test_full_stripe_cycle() {
    let policy = StripeSizeFlushPolicy::new(1_000, 100).unwrap();
    let mut controller = StripeFlushController::new(policy);
    let context = WriterMemoryUsage::new(10, 0);

    let verdict = controller.evaluate(&sized(0, 100), &context);
    assert_eq!(
        verdict,
        FlushVerdict {
            flush_stripe: false,
            dictionary: FlushDecision::Skip
        }
    );
    assert_eq!(controller.state(), StripeState::Accumulating);

    // Past the checkpoint: re-assess, but keep accumulating.
    let verdict = controller.evaluate(&sized(0, 600), &context);
    assert!(!verdict.flush_stripe);
    assert_eq!(verdict.dictionary, FlushDecision::EvaluateDictionary);
    assert_eq!(controller.state(), StripeState::Accumulating);

    let verdict = controller.evaluate(&sized(0, 1_000), &context);
    assert!(verdict.flush_stripe);
    assert_eq!(verdict.dictionary, FlushDecision::FlushDictionary);
    assert_eq!(controller.state(), StripeState::Closed);
    assert_eq!(controller.stripes_flushed(), 1);

    // A decided stripe is not reconsidered.
    let verdict = controller.evaluate(&sized(0, 5_000), &context);
    assert!(!verdict.flush_stripe);
    assert_eq!(verdict.dictionary, FlushDecision::Skip);

    controller.begin_stripe().unwrap();
    assert_eq!(controller.state(), StripeState::Accumulating);
    assert_eq!(controller.stripe_index(), 1);
}

#[test]
fn test_begin_stripe_requires_a_closed_stripe() {
    let mut controller = StripeFlushController::new(RowCountFlushPolicy::new(1).unwrap());
    assert!(matches!(
        controller.begin_stripe(),
        Err(StripeflowError::InvalidTransition(_))
    ));

    assert!(controller.check_flush(&rows(0, 1)));
    assert!(matches!(
        controller.begin_stripe(),
        Err(StripeflowError::InvalidTransition(_))
    ));

    controller.decide_dictionary(&rows(0, 1), &WriterMemoryUsage::default());
    assert!(controller.begin_stripe().is_ok());
}

#[test]
fn test_schedule_follows_stripe_index_through_the_controller() {
    let policy = RowsPerStripeFlushPolicy::new(vec![100, 200, 50]).unwrap();
    let mut controller = StripeFlushController::new(policy);
    let context = WriterMemoryUsage::default();
    let mut flushed_at = Vec::new();

    for stripe in 0..3u64 {
        for count in 1..=1_000u64 {
            // The controller answers each stripe boundary once.
            let first = controller.evaluate(&rows(stripe, count), &context);
            let again = controller.evaluate(&rows(stripe, count), &context);
            assert!(!again.flush_stripe);
            if first.flush_stripe {
                flushed_at.push(count);
                break;
            }
        }
        controller.begin_stripe().unwrap();
    }

    assert_eq!(flushed_at, vec![100, 200, 50]);
    assert_eq!(controller.stripe_index(), 3);
    assert!(controller.policy().is_exhausted_at(controller.stripe_index()));
}

#[test]
fn test_stripe_index_drift_is_reported_but_not_fatal() {
    let policy = RowsPerStripeFlushPolicy::new(vec![100, 200, 50]).unwrap();
    let mut controller = StripeFlushController::new(policy);
    let context = WriterMemoryUsage::default();

    assert!(controller.evaluate(&rows(0, 100), &context).flush_stripe);
    controller.begin_stripe().unwrap();
    assert_eq!(controller.stripe_index_mismatches(), 0);

    // The writer forgot to advance its own index: the policy still sees stripe 0.
    assert!(controller.check_flush(&rows(0, 100)));
    assert_eq!(controller.stripe_index_mismatches(), 1);
    controller.decide_dictionary(&rows(0, 100), &context);
    controller.begin_stripe().unwrap();

    // In-step queries are not counted.
    assert!(!controller.check_flush(&rows(2, 10)));
    assert_eq!(controller.stripe_index_mismatches(), 1);
}

//==============================================================================
// 2. Dictionary Handling
//==============================================================================

#[test]
fn test_memory_pressure_abandons_dictionary_for_the_rest_of_the_file() {
    let policy = StripeSizeFlushPolicy::new(1_000, 100).unwrap();
    let mut controller = StripeFlushController::new(policy);

    let pressured = WriterMemoryUsage::new(1, 900).with_memory_budget(800);
    let verdict = controller.evaluate(&sized(0, 10), &pressured);
    assert_eq!(verdict.dictionary, FlushDecision::AbandonDictionary);
    assert!(!controller.dictionary_active());

    // Once abandoned, even a closing stripe has nothing to commit.
    let calm = WriterMemoryUsage::new(1, 10);
    let verdict = controller.evaluate(&sized(0, 1_000), &calm);
    assert!(verdict.flush_stripe);
    assert_eq!(verdict.dictionary, FlushDecision::Skip);
    assert_eq!(controller.state(), StripeState::Closed);
}

#[test]
fn test_writer_without_dictionaries_never_gets_dictionary_work() {
    let policy = StripeSizeFlushPolicy::new(1_000, 100).unwrap();
    let mut controller = StripeFlushController::with_dictionary_encoding(policy, false);
    let context = WriterMemoryUsage::new(u64::MAX, 0);

    assert_eq!(
        controller.evaluate(&sized(0, 999), &context).dictionary,
        FlushDecision::Skip
    );
    let verdict = controller.evaluate(&sized(0, 1_000), &context);
    assert!(verdict.flush_stripe);
    assert_eq!(verdict.dictionary, FlushDecision::Skip);
}

//==============================================================================
// 3. Lifecycle
//==============================================================================

#[test]
fn test_close_runs_the_hook_exactly_once() {
    let (policy, _, closes) = spy(PredicateFlushPolicy::new(|| true));
    {
        let mut controller = StripeFlushController::new(policy);
        controller.close();
        controller.close();
        assert!(controller.is_closed());
    }
    // Dropping an already-closed controller does not call the hook again.
    assert_eq!(closes.get(), 1);
}

#[test]
fn test_drop_closes_an_unclosed_controller() {
    let (policy, _, closes) = spy(RowCountFlushPolicy::new(5).unwrap());
    {
        let mut controller = StripeFlushController::new(policy);
        controller.check_flush(&rows(0, 1));
    }
    assert_eq!(closes.get(), 1);
}

#[test]
fn test_queries_after_close_are_inert() {
    let (policy, queries, _) = spy(StripeSizeFlushPolicy::new(10, 10).unwrap());
    let mut controller = StripeFlushController::new(policy);
    controller.close();

    let context = WriterMemoryUsage::new(u64::MAX, u64::MAX).with_memory_budget(0);
    let verdict = controller.evaluate(&sized(0, u64::MAX), &context);
    assert_eq!(
        verdict,
        FlushVerdict {
            flush_stripe: false,
            dictionary: FlushDecision::Skip
        }
    );
    assert_eq!(queries.get(), 0);
    assert!(controller.begin_stripe().is_err());
}

#[test]
fn test_boxed_policies_drive_the_controller() {
    let policy: Box<dyn FlushPolicy> = Box::new(RowCountFlushPolicy::new(3).unwrap());
    let mut controller = StripeFlushController::new(policy);
    assert_eq!(controller.policy().name(), "row_count");
    assert!(controller.check_flush(&rows(0, 3)));
}
