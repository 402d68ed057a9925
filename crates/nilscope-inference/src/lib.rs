//! nilscope inference - cross-package nilability inference state
//!
//! An [`InferredMap`] accumulates what a package pass learns about its
//! annotation sites: determined verdicts with provenance, plus an implication
//! graph over still-undetermined sites ("if `u` is nilable then `v` is
//! nilable"). At the end of a pass the map exports a minimal convex slice of
//! itself as a binary fact for downstream packages; at the start of a pass it
//! is seeded from the facts of its dependencies. Solving the implication
//! graph is a separate pass that consumes the final state.

pub mod edge_set;
pub mod export;
pub mod inferred_map;

pub use edge_set::EdgeSet;
pub use inferred_map::{FactCodecError, ImplicationEdges, InferredMap, InferredVal};
