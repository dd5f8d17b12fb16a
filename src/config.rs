// In: src/config.rs

//! The single source of truth for flush-policy configuration.
//!
//! This module defines the unified `FlushPolicyConfig` enum, which is designed to
//! be created once at the writer's setup boundary (e.g., from a JSON options
//! blob) and turned into a concrete policy with `build()`. Validation happens
//! here, before any data is written, so a writer never starts with a policy
//! that would make ambiguous decisions.
//!
//! The predicate policy carries a closure and has no serialized form; writers
//! construct it directly with `PredicateFlushPolicy::new`.

use serde::{Deserialize, Serialize};

use crate::error::StripeflowError;
use crate::policy::{
    FlushPolicy, RowCountFlushPolicy, RowsPerStripeFlushPolicy, ScheduleExhaustion,
    StripeSizeFlushPolicy, DEFAULT_DICTIONARY_ASSESSMENT_FRACTION,
};

//==================================================================================
// I. The Unified FlushPolicyConfig
//==================================================================================

/// Selects and parameterizes one of the serializable flush strategies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FlushPolicyConfig {
    /// **Default:** close stripes by estimated size, assess dictionaries early.
    StripeSize {
        /// Stripe size estimate, in bytes, at which the stripe is closed.
        #[serde(default = "default_stripe_size_threshold")]
        stripe_size_threshold: u64,
        /// Dictionary memory, in bytes, beyond which dictionaries are abandoned.
        #[serde(default = "default_dictionary_size_threshold")]
        dictionary_size_threshold: u64,
        /// Fraction of `stripe_size_threshold` at which dictionaries are re-assessed.
        #[serde(default = "default_dictionary_assessment_fraction")]
        dictionary_assessment_fraction: f64,
    },

    /// Close stripe `n` at `rows_per_stripe[n]` rows.
    RowsPerStripe {
        rows_per_stripe: Vec<u64>,
        /// What happens once the schedule runs out.
        #[serde(default)]
        on_exhausted: ScheduleExhaustion,
    },

    /// Close every stripe at a fixed row count.
    RowCount { row_count_threshold: u64 },
}

// Implement `Default` manually because every variant is a struct variant.
impl Default for FlushPolicyConfig {
    fn default() -> Self {
        FlushPolicyConfig::StripeSize {
            stripe_size_threshold: default_stripe_size_threshold(),
            dictionary_size_threshold: default_dictionary_size_threshold(),
            dictionary_assessment_fraction: default_dictionary_assessment_fraction(),
        }
    }
}

impl FlushPolicyConfig {
    /// Parses a config from JSON, e.g. `{"policy": "row_count", "row_count_threshold": 10000}`.
    pub fn from_json(json: &str) -> Result<Self, StripeflowError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StripeflowError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Checks the config without keeping the policy.
    pub fn validate(&self) -> Result<(), StripeflowError> {
        self.build().map(|_| ())
    }

    /// Builds the configured policy, rejecting malformed settings.
    pub fn build(&self) -> Result<Box<dyn FlushPolicy>, StripeflowError> {
        let policy: Box<dyn FlushPolicy> = match self {
            FlushPolicyConfig::StripeSize {
                stripe_size_threshold,
                dictionary_size_threshold,
                dictionary_assessment_fraction,
            } => Box::new(StripeSizeFlushPolicy::with_assessment_fraction(
                *stripe_size_threshold,
                *dictionary_size_threshold,
                *dictionary_assessment_fraction,
            )?),
            FlushPolicyConfig::RowsPerStripe {
                rows_per_stripe,
                on_exhausted,
            } => Box::new(RowsPerStripeFlushPolicy::with_exhaustion(
                rows_per_stripe.clone(),
                *on_exhausted,
            )?),
            FlushPolicyConfig::RowCount {
                row_count_threshold,
            } => Box::new(RowCountFlushPolicy::new(*row_count_threshold)?),
        };
        log::info!("built flush policy '{}'", policy.name());
        Ok(policy)
    }
}

/// Helper for `serde` to provide a default for `stripe_size_threshold` (64 MiB).
fn default_stripe_size_threshold() -> u64 {
    64 * 1024 * 1024
}

/// Helper for `serde` to provide a default for `dictionary_size_threshold` (16 MiB).
fn default_dictionary_size_threshold() -> u64 {
    16 * 1024 * 1024
}

fn default_dictionary_assessment_fraction() -> f64 {
    DEFAULT_DICTIONARY_ASSESSMENT_FRACTION
}
