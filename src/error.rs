// In: src/error.rs

//! This module defines the single, unified error type for the stripeflow library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Only construction and lifecycle plumbing can fail. The decision operations
//! themselves (`should_flush`, `should_flush_dictionary`, `on_close`) are total
//! and never return this type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StripeflowError {
    // =========================================================================
    // === Configuration Errors (rejected at policy construction)
    // =========================================================================
    #[error("Invalid threshold '{name}': {reason}")]
    InvalidThreshold { name: &'static str, reason: String },

    #[error("Row schedule must contain at least one entry")]
    EmptySchedule,

    #[error("Row schedule entry {index} is zero; every stripe must hold at least one row")]
    ZeroScheduleEntry { index: usize },

    #[error("Dictionary assessment fraction must be finite and in (0, 1], got {0}")]
    InvalidAssessmentFraction(f64),

    // =========================================================================
    // === Lifecycle Errors
    // =========================================================================
    #[error("Invalid stripe state transition: {0}")]
    InvalidTransition(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the I/O subsystem (e.g., opening a log file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading a policy config.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl StripeflowError {
    /// Shorthand for the zero-threshold rejection shared by every policy.
    pub(crate) fn zero_threshold(name: &'static str) -> Self {
        StripeflowError::InvalidThreshold {
            name,
            reason: "must be greater than zero".to_string(),
        }
    }
}
