//! nilscope annotation - shared annotation-site model
//!
//! Every analysis pass talks about program locations through the types in
//! this crate: typed annotation keys over declarations, the flattened
//! `PrimitiveSite` identity used as a map key and on the wire, trigger
//! assertions justifying implication edges, and the composite nilability
//! answer returned to query consumers.

pub mod keys;
pub mod pos;
pub mod site;
pub mod trigger;
pub mod val;

pub use keys::{AnnotationKey, FieldDecl, FuncDecl, TypeDecl, VarDecl};
pub use pos::Pos;
pub use site::PrimitiveSite;
pub use trigger::TriggerAssertion;
pub use val::{ExplainedBool, NilabilityVal};
