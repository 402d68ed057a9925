//! The per-package inference state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use nilscope_annotation::{
    AnnotationKey, ExplainedBool, FieldDecl, FuncDecl, NilabilityVal, PrimitiveSite,
    TriggerAssertion, TypeDecl, VarDecl,
};

use crate::edge_set::EdgeSet;

/// Bumped whenever the encoded layout of [`InferredMap`] changes. Decoding a
/// payload with a different version fails, which invalidates cached facts
/// across incompatible builds.
pub const FACT_FORMAT_VERSION: u32 = 2;

/// In- and out-edges of an undetermined site in the implication graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplicationEdges {
    /// Sites `u` with a recorded `u => this` edge.
    pub implicants: EdgeSet,
    /// Sites `v` with a recorded `this => v` edge.
    pub implicates: EdgeSet,
}

/// What inference knows about one annotation site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InferredVal {
    /// A concrete verdict together with the explanation that fixed it.
    Determined(ExplainedBool),
    /// No verdict yet; the site participates in the implication graph.
    Undetermined(ImplicationEdges),
}

/// Fact transport failures. These abort fact routing for the affected
/// package; nothing else in a pass does.
#[derive(Debug, thiserror::Error)]
pub enum FactCodecError {
    #[error("failed to encode package fact: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode package fact: {0}")]
    Decode(#[source] bincode::Error),
    #[error("unsupported fact format version {found} (this build expects {expected})")]
    Version { found: u32, expected: u32 },
}

/// State accumulated by multi-package nilability inference.
///
/// `mapping` holds everything known so far: determined verdicts and the
/// implication graph over undetermined sites. The set of undetermined entries
/// is closed under following implicant and implicate edges. `upstream_mapping`
/// is a stable snapshot of what was imported from upstream packages; the
/// mutation API only ever touches `mapping`, and export diffs the two so a
/// package re-exports none of the facts it merely inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferredMap {
    pub(crate) upstream_mapping: BTreeMap<PrimitiveSite, InferredVal>,
    pub(crate) mapping: BTreeMap<PrimitiveSite, InferredVal>,
}

impl InferredMap {
    /// An empty map, for a package with no upstream facts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fresh map from the decoded facts of every direct dependency.
    pub fn from_upstream<'a>(payloads: impl IntoIterator<Item = &'a InferredMap>) -> Self {
        let mut map = Self::new();
        for payload in payloads {
            map.import_upstream(payload);
        }
        map
    }

    /// The value stored for `site`, if any.
    pub fn load(&self, site: &PrimitiveSite) -> Option<&InferredVal> {
        self.mapping.get(site)
    }

    /// Number of annotation sites currently stored.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Visit each (site, value) pair once; stops early when `f` returns false.
    pub fn range(&self, mut f: impl FnMut(&PrimitiveSite, &InferredVal) -> bool) {
        for (site, value) in &self.mapping {
            if !f(site, value) {
                return;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PrimitiveSite, &InferredVal)> {
        self.mapping.iter()
    }

    /// Fix the verdict for `site`. Replaces any prior entry; the last writer
    /// wins when a pass determines the same site twice.
    pub fn store_determined(&mut self, site: PrimitiveSite, value: ExplainedBool) {
        self.mapping.insert(site, InferredVal::Determined(value));
    }

    /// Record the implication `from => to`, justified by `assertion`, in both
    /// directions of the graph. Missing endpoints are created as undetermined
    /// entries, which keeps the undetermined sub-graph closed under edge
    /// traversal.
    ///
    /// Asserting an implication on an already-determined endpoint is a caller
    /// error: the determined verdict is authoritative, so the edge is dropped
    /// with a warning and `false` is returned. Neither endpoint is touched in
    /// that case.
    pub fn store_implication(
        &mut self,
        from: PrimitiveSite,
        to: PrimitiveSite,
        assertion: TriggerAssertion,
    ) -> bool {
        for site in [&from, &to] {
            if let Some(InferredVal::Determined(val)) = self.mapping.get(site) {
                tracing::warn!(
                    site = %site,
                    verdict = %val,
                    "dropping implication edge on a determined site"
                );
                return false;
            }
        }

        for site in [&from, &to] {
            self.mapping
                .entry(site.clone())
                .or_insert_with(|| InferredVal::Undetermined(ImplicationEdges::default()));
        }

        if let Some(InferredVal::Undetermined(edges)) = self.mapping.get_mut(&from) {
            edges.implicates.add(to.clone(), assertion.clone());
        }
        if let Some(InferredVal::Undetermined(edges)) = self.mapping.get_mut(&to) {
            edges.implicants.add(from, assertion);
        }
        true
    }

    /// Merge a decoded upstream fact into this map and refresh the upstream
    /// snapshot. Must run before the pass records any local fact: seeding
    /// resets the snapshot to the merged state, so facts stored earlier would
    /// be treated as inherited and never exported.
    ///
    /// Merge rules when several payloads mention the same site: edge sets
    /// union; a determined verdict beats an undetermined entry; between two
    /// conflicting determined verdicts the first import wins. Exported facts
    /// are minimal and may name a neighbor without carrying its entry, so
    /// missing endpoints are materialized here with their symmetric
    /// back-edges.
    pub fn import_upstream(&mut self, payload: &InferredMap) {
        for (site, val) in &payload.mapping {
            match val {
                InferredVal::Determined(explained) => self.import_determined(site, explained),
                InferredVal::Undetermined(edges) => {
                    self.ensure_undetermined(site);
                    for (neighbor, triggers) in edges.implicates.iter() {
                        for trigger in triggers {
                            self.import_edge(site, neighbor, trigger);
                        }
                    }
                    for (neighbor, triggers) in edges.implicants.iter() {
                        for trigger in triggers {
                            self.import_edge(neighbor, site, trigger);
                        }
                    }
                }
            }
        }
        self.upstream_mapping = self.mapping.clone();
    }

    fn import_determined(&mut self, site: &PrimitiveSite, explained: &ExplainedBool) {
        match self.mapping.get(site) {
            Some(InferredVal::Determined(existing)) if existing != explained => {
                tracing::warn!(
                    site = %site,
                    kept = %existing,
                    dropped = %explained,
                    "conflicting determined verdicts across upstream facts"
                );
            }
            Some(InferredVal::Determined(_)) => {}
            _ => {
                self.mapping
                    .insert(site.clone(), InferredVal::Determined(explained.clone()));
            }
        }
    }

    /// Create an undetermined entry for `site` unless one (or a determined
    /// verdict) already exists.
    fn ensure_undetermined(&mut self, site: &PrimitiveSite) {
        self.mapping
            .entry(site.clone())
            .or_insert_with(|| InferredVal::Undetermined(ImplicationEdges::default()));
    }

    fn import_edge(&mut self, from: &PrimitiveSite, to: &PrimitiveSite, trigger: &TriggerAssertion) {
        for site in [from, to] {
            if let Some(InferredVal::Determined(_)) = self.mapping.get(site) {
                tracing::debug!(site = %site, "skipping upstream edge onto a determined site");
                return;
            }
        }
        self.ensure_undetermined(from);
        self.ensure_undetermined(to);
        if let Some(InferredVal::Undetermined(edges)) = self.mapping.get_mut(from) {
            edges.implicates.add(to.clone(), trigger.clone());
        }
        if let Some(InferredVal::Undetermined(edges)) = self.mapping.get_mut(to) {
            edges.implicants.add(from.clone(), trigger.clone());
        }
    }

    /// Encode the live mapping for inter-package transport. The upstream
    /// snapshot is a local concept and never leaves the pass.
    pub fn encode(&self) -> Result<Vec<u8>, FactCodecError> {
        bincode::serialize(&(FACT_FORMAT_VERSION, &self.mapping)).map_err(FactCodecError::Encode)
    }

    /// Decode a payload produced by [`encode`](Self::encode). The upstream
    /// snapshot starts empty; the receiving driver decides whether to adopt
    /// the decoded entries as upstream via [`import_upstream`](Self::import_upstream).
    pub fn decode(bytes: &[u8]) -> Result<Self, FactCodecError> {
        let (version, mapping): (u32, BTreeMap<PrimitiveSite, InferredVal>) =
            bincode::deserialize(bytes).map_err(FactCodecError::Decode)?;
        if version != FACT_FORMAT_VERSION {
            return Err(FactCodecError::Version {
                found: version,
                expected: FACT_FORMAT_VERSION,
            });
        }
        Ok(Self {
            upstream_mapping: BTreeMap::new(),
            mapping,
        })
    }

    // ── Annotation facade ──────────────────────────────────────

    /// Shallow/deep verdict for a struct field.
    pub fn check_field_ann(&self, field: &FieldDecl) -> Option<NilabilityVal> {
        self.check_annotation_key(&AnnotationKey::Field(field.clone()))
    }

    /// Shallow/deep verdict for the `index`-th parameter of a function.
    pub fn check_func_param_ann(&self, func: &FuncDecl, index: u32) -> Option<NilabilityVal> {
        self.check_annotation_key(&AnnotationKey::Param {
            func: func.clone(),
            index,
        })
    }

    /// Shallow/deep verdict for the `index`-th return of a function.
    pub fn check_func_ret_ann(&self, func: &FuncDecl, index: u32) -> Option<NilabilityVal> {
        self.check_annotation_key(&AnnotationKey::Return {
            func: func.clone(),
            index,
        })
    }

    /// Shallow/deep verdict for a method receiver.
    pub fn check_func_recv_ann(&self, func: &FuncDecl) -> Option<NilabilityVal> {
        self.check_annotation_key(&AnnotationKey::Receiver(func.clone()))
    }

    /// Shallow/deep verdict for a named type.
    pub fn check_type_ann(&self, ty: &TypeDecl) -> Option<NilabilityVal> {
        self.check_annotation_key(&AnnotationKey::TypeName(ty.clone()))
    }

    /// Shallow/deep verdict for a global variable.
    pub fn check_global_var_ann(&self, var: &VarDecl) -> Option<NilabilityVal> {
        self.check_annotation_key(&AnnotationKey::GlobalVar(var.clone()))
    }

    /// A verdict exists only when both the shallow and the deep site resolve
    /// to determined entries. Undetermined sites never answer at query time;
    /// solving them is the solver pass's job.
    fn check_annotation_key(&self, key: &AnnotationKey) -> Option<NilabilityVal> {
        let shallow = self.mapping.get(&PrimitiveSite::new(key, false))?;
        let deep = self.mapping.get(&PrimitiveSite::new(key, true))?;

        let (InferredVal::Determined(shallow), InferredVal::Determined(deep)) = (shallow, deep)
        else {
            return None;
        };

        Some(NilabilityVal {
            is_nilable: shallow.value,
            is_deep_nilable: deep.value,
            is_nilable_set: true,
            is_deep_nilable_set: true,
        })
    }
}

impl std::fmt::Display for InferredMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (site, val) in &self.mapping {
            match val {
                InferredVal::Determined(explained) => write!(f, "{site}: {explained}, ")?,
                InferredVal::Undetermined(edges) => {
                    write!(f, "{site}: [")?;
                    for implicant in edges.implicants.sites() {
                        write!(f, "{implicant}-> ")?;
                    }
                    write!(f, "&& ")?;
                    for implicate in edges.implicates.sites() {
                        write!(f, "->{implicate} ")?;
                    }
                    write!(f, "], ")?;
                }
            }
        }
        write!(f, "}}")
    }
}
