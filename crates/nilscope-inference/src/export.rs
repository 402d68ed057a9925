//! Export minimization.
//!
//! At the end of a pass the map publishes the smallest slice of itself that
//! keeps downstream inference sound: every exported site, plus every private
//! undetermined site lying on an implication path between two exported sites.
//! Entries already known upstream are reduced to their delta before emission.

use std::collections::{BTreeMap, BTreeSet};

use nilscope_annotation::PrimitiveSite;

use crate::inferred_map::{ImplicationEdges, InferredMap, InferredVal};

#[derive(Clone, Copy)]
enum Direction {
    /// Following `implicates` away from an exported site.
    Forward,
    /// Following `implicants` back toward an exported site.
    Backward,
}

impl InferredMap {
    /// Emit the per-package fact: the convex minimal site subset, diffed
    /// against the upstream snapshot. Returns `None` when nothing new would
    /// be published. The result is a fresh map, never the live one.
    pub fn export(&self) -> Option<InferredMap> {
        if self.mapping.is_empty() {
            return None;
        }

        let selected = self.choose_sites_to_export();
        let mut exported = BTreeMap::new();
        for (site, val) in &self.mapping {
            if !selected.contains(site) {
                continue;
            }
            match self.upstream_mapping.get(site) {
                Some(upstream_val) => {
                    if let Some(diff) = inferred_val_diff(val, upstream_val) {
                        exported.insert(site.clone(), diff);
                    }
                }
                None => {
                    exported.insert(site.clone(), val.clone());
                }
            }
        }

        if exported.is_empty() {
            return None;
        }
        Some(InferredMap {
            upstream_mapping: BTreeMap::new(),
            mapping: exported,
        })
    }

    /// Sites that are both reachable from and reach an exported site.
    ///
    /// Reachability is reflexive, so every exported site is included
    /// unconditionally; that makes the returned set convex (no semantically
    /// meaningful implication chain is forgotten) yet minimal (no private
    /// site survives without a witnessed export-to-export path through it).
    ///
    /// Two monotone markings meet in the middle: a private undetermined site
    /// first visited in one direction gets that direction's flag and its
    /// neighbors enqueued; a later visit from the other direction upgrades it
    /// to exported. Flags only grow and flagged sites are never re-expanded,
    /// so this is O(V + E) over the undetermined sub-graph. Determined sites
    /// carry no edges and stop traversal.
    pub(crate) fn choose_sites_to_export(&self) -> BTreeSet<PrimitiveSite> {
        let mut to_export: BTreeSet<PrimitiveSite> = BTreeSet::new();
        let mut reachable_from_exported: BTreeSet<PrimitiveSite> = BTreeSet::new();
        let mut reaches_exported: BTreeSet<PrimitiveSite> = BTreeSet::new();
        let mut worklist: Vec<(PrimitiveSite, Direction)> = Vec::new();

        for (site, val) in &self.mapping {
            if !site.exported {
                continue;
            }
            to_export.insert(site.clone());

            if let InferredVal::Undetermined(edges) = val {
                for implicant in edges.implicants.sites() {
                    worklist.push((implicant.clone(), Direction::Backward));
                }
                for implicate in edges.implicates.sites() {
                    worklist.push((implicate.clone(), Direction::Forward));
                }
            }
        }

        while let Some((site, dir)) = worklist.pop() {
            let Some(InferredVal::Undetermined(edges)) = self.mapping.get(&site) else {
                continue;
            };
            if site.exported || to_export.contains(&site) {
                continue;
            }

            match dir {
                Direction::Forward => {
                    if reachable_from_exported.contains(&site) {
                        continue;
                    }
                    if reaches_exported.contains(&site) {
                        to_export.insert(site.clone());
                    } else {
                        reachable_from_exported.insert(site.clone());
                    }
                    for implicate in edges.implicates.sites() {
                        worklist.push((implicate.clone(), Direction::Forward));
                    }
                }
                Direction::Backward => {
                    if reaches_exported.contains(&site) {
                        continue;
                    }
                    if reachable_from_exported.contains(&site) {
                        to_export.insert(site.clone());
                    } else {
                        reaches_exported.insert(site.clone());
                    }
                    for implicant in edges.implicants.sites() {
                        worklist.push((implicant.clone(), Direction::Backward));
                    }
                }
            }
        }

        to_export
    }
}

/// The part of `local` not already present in `upstream`.
///
/// A determined verdict over a previously undetermined entry (or a changed
/// verdict) is emitted whole; matching determined verdicts and unchanged
/// graphs emit nothing; two undetermined entries reduce to the edge-set
/// difference at `(neighbor, trigger)` granularity.
pub(crate) fn inferred_val_diff(
    local: &InferredVal,
    upstream: &InferredVal,
) -> Option<InferredVal> {
    match (local, upstream) {
        (InferredVal::Determined(l), InferredVal::Determined(u)) => {
            if l == u {
                None
            } else {
                Some(InferredVal::Determined(l.clone()))
            }
        }
        (InferredVal::Determined(l), InferredVal::Undetermined(_)) => {
            Some(InferredVal::Determined(l.clone()))
        }
        (InferredVal::Undetermined(l), InferredVal::Undetermined(u)) => {
            let implicants = l.implicants.difference(&u.implicants);
            let implicates = l.implicates.difference(&u.implicates);
            if implicants.is_empty() && implicates.is_empty() {
                None
            } else {
                Some(InferredVal::Undetermined(ImplicationEdges {
                    implicants,
                    implicates,
                }))
            }
        }
        (InferredVal::Undetermined(_), InferredVal::Determined(_)) => {
            // The snapshot already has a verdict; a local undetermined entry
            // adds nothing a downstream package could use.
            tracing::debug!("local undetermined entry shadowed by a determined upstream verdict");
            None
        }
    }
}
