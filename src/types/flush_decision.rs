//! The outcome of a dictionary-encoding assessment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the writer should do with its dictionary-encoded columns.
///
/// Only `FlushDictionary` is tied to a stripe flush; the other outcomes can be
/// returned mid-stripe.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FlushDecision {
    /// No action.
    #[default]
    Skip,
    /// Re-run the writer's dictionary cost/benefit estimate without committing.
    EvaluateDictionary,
    /// Commit the current dictionary encoding with the stripe.
    FlushDictionary,
    /// Convert dictionary-encoded columns away from dictionary encoding.
    AbandonDictionary,
}

impl FlushDecision {
    /// Returns `true` if the decision asks the writer to do anything at all.
    pub fn requires_action(&self) -> bool {
        !matches!(self, Self::Skip)
    }
}

/// Provides the canonical string representation for a `FlushDecision`.
impl fmt::Display for FlushDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Skip => "SKIP",
            Self::EvaluateDictionary => "EVALUATE_DICTIONARY",
            Self::FlushDictionary => "FLUSH_DICTIONARY",
            Self::AbandonDictionary => "ABANDON_DICTIONARY",
        };
        f.write_str(name)
    }
}
