// In: src/bridge/arrow_impl.rs

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::record_batch::RecordBatch;

use crate::context::WriterContext;
use crate::types::StripeProgress;

/// STRIPE ACCOUNTING
/// Tracks what a writer has buffered for its open stripe, from Arrow batches.
///
/// The size estimate is the in-memory footprint Arrow reports for each batch
/// (`get_array_memory_size`), which over-estimates the encoded size and is
/// therefore a conservative flush trigger. For dictionary-typed columns the
/// tracker also records the memory held by the dictionary values. Batches that
/// share one values array (the same `Arc`) are counted once; every distinct
/// values array is added to the column's total, so a column whose batches each
/// carry their own dictionary is summed across the stripe. When a producer
/// re-emits a grown copy of the same dictionary this over-counts, which errs
/// towards abandoning early.
#[derive(Debug, Clone, Default)]
pub struct ArrowStripeTracker {
    stripe_index: u64,
    stripe_rows: u64,
    stripe_bytes: u64,
    /// Dictionary accounting per column index; default for plain columns.
    dictionaries: Vec<ColumnDictionary>,
    memory_budget: Option<u64>,
}

#[derive(Debug, Clone, Default)]
struct ColumnDictionary {
    /// The values array most recently seen for this column.
    last_values: Option<ArrayRef>,
    bytes: u64,
}

impl ColumnDictionary {
    fn observe(&mut self, values: &ArrayRef) {
        let seen = self
            .last_values
            .as_ref()
            .map_or(false, |last| Arc::ptr_eq(last, values));
        if !seen {
            self.bytes += values.get_array_memory_size() as u64;
            self.last_values = Some(Arc::clone(values));
        }
    }
}

impl ArrowStripeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports memory pressure once the buffered stripe reaches `budget` bytes.
    pub fn with_memory_budget(mut self, budget: u64) -> Self {
        self.memory_budget = Some(budget);
        self
    }

    /// Accounts for one appended batch.
    pub fn append(&mut self, batch: &RecordBatch) {
        self.stripe_rows += batch.num_rows() as u64;
        self.stripe_bytes += batch.get_array_memory_size() as u64;

        if self.dictionaries.len() < batch.num_columns() {
            self.dictionaries
                .resize_with(batch.num_columns(), ColumnDictionary::default);
        }
        for (col_idx, column) in batch.columns().iter().enumerate() {
            if let Some(dictionary) = column.as_any_dictionary_opt() {
                self.dictionaries[col_idx].observe(dictionary.values());
            }
        }
    }

    /// The snapshot a policy is queried with.
    pub fn progress(&self) -> StripeProgress {
        StripeProgress {
            stripe_index: self.stripe_index,
            stripe_row_count: self.stripe_rows,
            stripe_size_estimate: self.stripe_bytes,
            total_memory_usage: self.stripe_bytes,
        }
    }

    /// Starts accounting for the next stripe after the writer flushed this one.
    pub fn reset_stripe(&mut self) {
        self.stripe_index += 1;
        self.stripe_rows = 0;
        self.stripe_bytes = 0;
        self.dictionaries
            .iter_mut()
            .for_each(|column| *column = ColumnDictionary::default());
    }
}

impl WriterContext for ArrowStripeTracker {
    fn dictionary_memory_usage(&self) -> u64 {
        self.dictionaries.iter().map(|column| column.bytes).sum()
    }

    fn over_memory_budget(&self) -> bool {
        self.memory_budget
            .map_or(false, |budget| self.stripe_bytes >= budget)
    }
}
