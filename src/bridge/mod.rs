// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` connects Arrow-based writers to the pure, Arrow-agnostic decision
// engine. Policies and the controller only understand `StripeProgress` and
// `WriterContext`; the bridge derives both from the `RecordBatch`es a writer
// appends.
//
// Data Flow (per appended batch):
//
//   1. [Writer]                 -> appends a `RecordBatch` to its open stripe
//         |
//         `-> calls `ArrowStripeTracker::append(&batch)`
//
//   2. [ArrowStripeTracker]     -> accumulates rows, bytes and dictionary memory
//         |
//         `-> `progress()` yields a `StripeProgress` snapshot
//         `-> the tracker itself is the `WriterContext`
//
//   3. [StripeFlushController]  -> `evaluate(&progress, &tracker)` -> `FlushVerdict`
//
//   4. [Writer]                 -> acts on the verdict; after a physical flush it
//                                  calls `tracker.reset_stripe()` and
//                                  `controller.begin_stripe()`
//
// ====================================================================================
pub(crate) mod arrow_impl;

pub use arrow_impl::ArrowStripeTracker;
