// In: src/context.rs

//! The writer-side view a flush policy may consult while deciding.
//!
//! The writer owns all of this state and mutates it between queries. Policies
//! receive it as `&dyn WriterContext` and only ever read from it.

/// Read-only queries a policy can make against the live writer.
pub trait WriterContext {
    /// Memory currently held by dictionary encoders, in bytes.
    fn dictionary_memory_usage(&self) -> u64;

    /// Whether the writer as a whole has exceeded its memory budget.
    ///
    /// Writers without a budget never report pressure.
    fn over_memory_budget(&self) -> bool {
        false
    }
}

/// A plain snapshot of writer memory counters.
///
/// This is the simplest `WriterContext`: the writer fills it in before a query.
/// Useful for writers that already keep their own accounting, and in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterMemoryUsage {
    /// Bytes held by dictionary encoders.
    pub dictionary_bytes: u64,
    /// Bytes held by the writer overall, dictionaries included.
    pub total_bytes: u64,
    /// The writer-wide memory budget, if any.
    pub memory_budget: Option<u64>,
}

impl WriterMemoryUsage {
    /// Constructs a snapshot with no memory budget.
    pub fn new(dictionary_bytes: u64, total_bytes: u64) -> Self {
        Self {
            dictionary_bytes,
            total_bytes,
            memory_budget: None,
        }
    }

    /// Attaches a memory budget to the snapshot.
    pub fn with_memory_budget(mut self, budget: u64) -> Self {
        self.memory_budget = Some(budget);
        self
    }
}

impl WriterContext for WriterMemoryUsage {
    fn dictionary_memory_usage(&self) -> u64 {
        self.dictionary_bytes
    }

    fn over_memory_budget(&self) -> bool {
        self.memory_budget
            .map_or(false, |budget| self.total_bytes >= budget)
    }
}
