//! Nilability verdicts and query answers.

use serde::{Deserialize, Serialize};

/// A decided boolean nilability together with the reason it was fixed.
///
/// `true` means values at the site may legitimately be nil; `false` means
/// they are guaranteed present. The explanation is surfaced verbatim in
/// diagnostics (e.g. "assigned from a nil literal", "fresh allocation").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExplainedBool {
    pub value: bool,
    pub explanation: String,
}

impl ExplainedBool {
    pub fn new(value: bool, explanation: impl Into<String>) -> Self {
        Self {
            value,
            explanation: explanation.into(),
        }
    }
}

impl std::fmt::Display for ExplainedBool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.value {
            write!(f, "nilable ({})", self.explanation)
        } else {
            write!(f, "nonnil ({})", self.explanation)
        }
    }
}

/// Composite shallow/deep nilability answer for one entity.
///
/// The set bits report whether each half was actually determined; consumers
/// must not read a verdict whose set bit is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NilabilityVal {
    pub is_nilable: bool,
    pub is_deep_nilable: bool,
    pub is_nilable_set: bool,
    pub is_deep_nilable_set: bool,
}
