//! End-to-end scenarios over the inference core, exercised the way the
//! driver would: mutate, export, encode, decode, seed downstream.

use nilscope_annotation::{
    AnnotationKey, ExplainedBool, FuncDecl, PrimitiveSite, TriggerAssertion, TypeDecl,
};
use nilscope_inference::{InferredMap, InferredVal};

fn func(name: &str, exported: bool) -> FuncDecl {
    FuncDecl {
        pkg_path: "example.com/srv".into(),
        name: name.into(),
        is_exported: exported,
        pos: None,
    }
}

fn type_site(name: &str, exported: bool) -> PrimitiveSite {
    PrimitiveSite::new(
        &AnnotationKey::TypeName(TypeDecl {
            pkg_path: "example.com/srv".into(),
            name: name.into(),
            is_exported: exported,
            pos: None,
        }),
        false,
    )
}

fn trigger(label: &str) -> TriggerAssertion {
    TriggerAssertion::new(label, "consumed downstream")
}

/// Trivial determination: both halves stored, query answers with all four
/// bits.
#[test]
fn test_determined_entity_answers_query() {
    let mut map = InferredMap::new();
    let handle = func("Handle", true);
    let key = |deep| {
        PrimitiveSite::new(
            &AnnotationKey::Param {
                func: handle.clone(),
                index: 0,
            },
            deep,
        )
    };
    map.store_determined(key(false), ExplainedBool::new(true, "nil literal"));
    map.store_determined(key(true), ExplainedBool::new(false, "typed array"));

    let val = map.check_func_param_ann(&handle, 0).expect("both halves set");
    assert!(val.is_nilable);
    assert!(!val.is_deep_nilable);
    assert!(val.is_nilable_set);
    assert!(val.is_deep_nilable_set);

    // A different index of the same function resolves nothing.
    assert!(map.check_func_param_ann(&handle, 1).is_none());
}

/// A chain connecting no exported site produces no fact at all.
#[test]
fn test_private_chain_stays_home() {
    let mut map = InferredMap::new();
    map.store_implication(type_site("p1", false), type_site("p2", false), trigger("t"));
    map.store_implication(type_site("p2", false), type_site("p3", false), trigger("t"));
    assert!(map.export().is_none());
}

/// A private chain between two exported endpoints travels whole, and the
/// downstream package can walk it after decode.
#[test]
fn test_convex_chain_survives_transport() {
    let mut map = InferredMap::new();
    map.store_implication(type_site("E1", true), type_site("p1", false), trigger("a"));
    map.store_implication(type_site("p1", false), type_site("p2", false), trigger("b"));
    map.store_implication(type_site("p2", false), type_site("E2", true), trigger("c"));

    let fact = map.export().expect("chain should export");
    let bytes = fact.encode().expect("encode");
    let downstream = InferredMap::from_upstream([&InferredMap::decode(&bytes).expect("decode")]);

    // Walk E1 -> p1 -> p2 -> E2 in the seeded downstream map.
    let mut cur = type_site("E1", true);
    for expected in [
        type_site("p1", false),
        type_site("p2", false),
        type_site("E2", true),
    ] {
        let Some(InferredVal::Undetermined(edges)) = downstream.load(&cur) else {
            panic!("{cur} should be undetermined downstream");
        };
        assert!(edges.implicates.contains(&expected), "missing {cur} => {expected}");
        cur = expected;
    }
}

/// One-sided reachability: the private successor is carried inside the
/// exported site's entry, and seeding re-creates its symmetric stub entry.
#[test]
fn test_one_sided_edge_reconstructed_downstream() {
    let mut map = InferredMap::new();
    map.store_implication(type_site("E1", true), type_site("p1", false), trigger("t"));

    let fact = map.export().expect("E1 should export");
    assert_eq!(fact.len(), 1, "p1 must not be an entry of the fact");

    let bytes = fact.encode().expect("encode");
    let downstream = InferredMap::from_upstream([&InferredMap::decode(&bytes).expect("decode")]);

    let Some(InferredVal::Undetermined(stub)) = downstream.load(&type_site("p1", false)) else {
        panic!("p1 should have a stub entry downstream");
    };
    assert!(stub.implicants.contains(&type_site("E1", true)));
    assert!(stub.implicates.is_empty());
}

/// Inherited upstream facts are never re-exported; only the local delta is.
#[test]
fn test_export_is_incremental_over_upstream() {
    let mut upstream = InferredMap::new();
    upstream.store_determined(type_site("A", true), ExplainedBool::new(true, "nil literal"));
    let payload = InferredMap::decode(&upstream.encode().expect("encode")).expect("decode");

    let mut map = InferredMap::from_upstream([&payload]);
    map.store_implication(type_site("B", true), type_site("C", true), trigger("t1"));

    let fact = map.export().expect("local edge should export");
    assert!(fact.load(&type_site("A", true)).is_none());
    assert_eq!(fact.len(), 2);

    // And with no local mutation at all, nothing is emitted.
    let untouched = InferredMap::from_upstream([&payload]);
    assert!(untouched.export().is_none());
}

/// Distinct triggers on the same edge accumulate and survive transport.
#[test]
fn test_edge_trigger_multiplicity_round_trips() {
    let mut map = InferredMap::new();
    let (u, v) = (type_site("U", true), type_site("V", true));
    map.store_implication(u.clone(), v.clone(), trigger("t1"));
    map.store_implication(u.clone(), v.clone(), trigger("t2"));
    map.store_implication(u.clone(), v.clone(), trigger("t1"));

    let decoded = InferredMap::decode(&map.encode().expect("encode")).expect("decode");
    let Some(InferredVal::Undetermined(edges)) = decoded.load(&u) else {
        panic!("U should be undetermined");
    };
    let triggers = edges.implicates.triggers(&v).expect("edge U => V");
    assert_eq!(triggers.len(), 2);
    assert!(triggers.contains(&trigger("t1")));
    assert!(triggers.contains(&trigger("t2")));
}

/// Facts from several upstream packages merge into one seeded map.
#[test]
fn test_multi_upstream_seeding() {
    let mut from_a = InferredMap::new();
    from_a.store_determined(type_site("A", true), ExplainedBool::new(false, "fresh allocation"));

    let mut from_b = InferredMap::new();
    from_b.store_implication(type_site("B", true), type_site("C", true), trigger("t"));

    let map = InferredMap::from_upstream([&from_a, &from_b]);
    assert_eq!(map.len(), 3);
    assert!(matches!(
        map.load(&type_site("A", true)),
        Some(InferredVal::Determined(_))
    ));
    assert!(map.export().is_none(), "seeding alone must not create exports");
}
