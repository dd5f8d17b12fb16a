//! This file is the root of the `stripeflow` Rust crate.
//!
//! `stripeflow` decides when a columnar file writer closes its current stripe
//! and what happens to dictionary-encoded columns along the way. It never
//! writes bytes itself: the writer's control loop asks, a policy answers.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`policy`, `controller`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the types a writer needs to drive a policy.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod bridge;
pub mod config;
pub mod context;
pub mod controller;
pub mod policy;
pub mod types;

mod error;
mod observability; // `log_metric!` is exported at the crate root

#[cfg(test)]
mod controller_tests;

// `log_metric!` expands to `$crate::__log::...` so callers need no `log` dependency.
#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use bridge::ArrowStripeTracker;
pub use config::FlushPolicyConfig;
pub use context::{WriterContext, WriterMemoryUsage};
pub use controller::{FlushVerdict, StripeFlushController, StripeState};
pub use error::StripeflowError;
pub use observability::init_logging;
pub use policy::{
    FlushPolicy, PredicateFlushPolicy, RowCountFlushPolicy, RowsPerStripeFlushPolicy,
    ScheduleExhaustion, StripeSizeFlushPolicy,
};
pub use types::{FlushDecision, StripeProgress};
