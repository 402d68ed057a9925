//! Trigger assertions.

use serde::{Deserialize, Serialize};

use crate::pos::Pos;

/// Diagnostic metadata attached to one implication edge.
///
/// When the constraint generator asserts "if site `u` is nilable then site
/// `v` is nilable", the producer side explains where a possibly-nil value is
/// produced and the consumer side where it is consumed; the error reporter
/// stitches these into the chain shown to the user. The inference core never
/// inspects the contents, it only stores and ships them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerAssertion {
    pub producer_repr: String,
    pub consumer_repr: String,
    #[serde(default)]
    pub pos: Option<Pos>,
}

impl TriggerAssertion {
    pub fn new(producer_repr: impl Into<String>, consumer_repr: impl Into<String>) -> Self {
        Self {
            producer_repr: producer_repr.into(),
            consumer_repr: consumer_repr.into(),
            pos: None,
        }
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.pos = Some(pos);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_includes_position() {
        let bare = TriggerAssertion::new("returned as result 0", "passed as param 0");
        let placed = bare.clone().at(Pos::new("a.go", 3, 1));
        assert_ne!(bare, placed);
        assert_eq!(placed.pos.as_ref().unwrap().line, 3);
    }
}
