//! This module defines the core, strongly-typed values exchanged between the
//! writer's control loop and the flush policies.
//!
//! It currently includes the `StripeProgress` snapshot the writer produces before
//! every query, and the `FlushDecision` enum returned by dictionary assessment.

pub mod flush_decision;
pub mod stripe_progress;

// Re-export the main type(s) for easier access.
pub use flush_decision::FlushDecision;
pub use stripe_progress::StripeProgress;
