//! Edge sets of the implication graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use nilscope_annotation::{PrimitiveSite, TriggerAssertion};

/// Neighbors of an undetermined site, each edge tagged with the trigger
/// assertions that justify it.
///
/// A single `(u, v)` pair may be asserted several times over a pass with
/// distinct triggers (different expressions inducing the same implication);
/// all of them are kept so the error reporter can cite each one. Re-inserting
/// an identical `(neighbor, trigger)` pair is a no-op.
///
/// Ordered containers are deliberate: edge sets end up inside the encoded
/// package fact, and the host driver compares encoded bytes to decide cache
/// validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSet {
    edges: BTreeMap<PrimitiveSite, BTreeSet<TriggerAssertion>>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edge to `neighbor` justified by `trigger`.
    pub fn add(&mut self, neighbor: PrimitiveSite, trigger: TriggerAssertion) {
        self.edges.entry(neighbor).or_default().insert(trigger);
    }

    pub fn contains(&self, neighbor: &PrimitiveSite) -> bool {
        self.edges.contains_key(neighbor)
    }

    /// Triggers recorded for the edge to `neighbor`, if any.
    pub fn triggers(&self, neighbor: &PrimitiveSite) -> Option<&BTreeSet<TriggerAssertion>> {
        self.edges.get(neighbor)
    }

    /// Number of neighbors (not of triggers).
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn sites(&self) -> impl Iterator<Item = &PrimitiveSite> {
        self.edges.keys()
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&PrimitiveSite, &BTreeSet<TriggerAssertion>)> {
        self.edges.iter()
    }

    /// Edges present in `self` but not in `other`, at `(neighbor, trigger)`
    /// granularity. Used to compute the incremental slice of an export.
    pub fn difference(&self, other: &EdgeSet) -> EdgeSet {
        let mut out = EdgeSet::new();
        for (neighbor, triggers) in &self.edges {
            match other.edges.get(neighbor) {
                None => {
                    for trigger in triggers {
                        out.add(neighbor.clone(), trigger.clone());
                    }
                }
                Some(known) => {
                    for trigger in triggers.difference(known) {
                        out.add(neighbor.clone(), trigger.clone());
                    }
                }
            }
        }
        out
    }

    /// Union `other` into `self`.
    pub fn merge(&mut self, other: &EdgeSet) {
        for (neighbor, triggers) in &other.edges {
            for trigger in triggers {
                self.add(neighbor.clone(), trigger.clone());
            }
        }
    }
}
