use triplecast::error::TriplecastError;
use triplecast::source::Source;
use triplecast::strategy::StrategyKind;
use triplecast::term::{Iri, Term};
use triplecast::value::Value;

fn note(ns: &str, name: &str) -> Iri {
    Iri::new(format!("{ns}/{name}")).unwrap()
}

#[test]
fn children_persist_into_the_final_parent() {
    let ns = "https://parents.example/final";
    let root = Source::new();
    let middle = Source::child(&root).unwrap();
    let leaf =
        Source::child_with_subject(&middle, Iri::new(format!("{ns}/leaf")).unwrap()).unwrap();
    assert_eq!(leaf.strategy_kind(), StrategyKind::Parent);

    let subject = leaf.rdf_subject();
    assert_eq!(subject, Term::Iri(Iri::new(format!("{ns}/leaf")).unwrap()));
    leaf.set_value(None, note(ns, "says"), [Value::from("hello")])
        .unwrap();
    leaf.persist().unwrap();

    // The statements land in the chain root, not the direct parent.
    assert_eq!(
        root.get_values(Some(&subject), note(ns, "says")).unwrap(),
        vec![Value::from("hello")]
    );
    assert!(
        middle
            .get_values(Some(&subject), note(ns, "says"))
            .unwrap()
            .is_empty(),
        "the middle of the chain only relays"
    );
}

#[test]
fn persisting_twice_erases_before_writing() {
    let ns = "https://parents.example/erase";
    let root = Source::new();
    let leaf = Source::child(&root).unwrap();
    let subject = leaf.rdf_subject();

    leaf.set_value(None, note(ns, "status"), [Value::from("draft")])
        .unwrap();
    leaf.persist().unwrap();
    leaf.set_value(None, note(ns, "status"), [Value::from("published")])
        .unwrap();
    leaf.persist().unwrap();

    assert_eq!(
        root.get_values(Some(&subject), note(ns, "status")).unwrap(),
        vec![Value::from("published")],
        "stale projected statements must be erased on re-persist"
    );
}

#[test]
fn ancestors_walk_to_the_chain_root() {
    let root = Source::new();
    let middle = Source::child(&root).unwrap();
    let leaf = Source::child(&middle).unwrap();

    let ancestors = leaf.ancestors().unwrap();
    assert_eq!(ancestors.len(), 2);
    assert!(ancestors[0].same(&middle));
    assert!(ancestors[1].same(&root));
    assert!(leaf.final_parent().unwrap().same(&root));
    assert!(leaf.parent().unwrap().same(&middle));
}

#[test]
fn repository_sources_have_no_parent() {
    let solo = Source::new();
    assert_eq!(solo.strategy_kind(), StrategyKind::Repository);
    assert!(solo.parent().is_none());
    let err = solo.final_parent().unwrap_err();
    assert!(matches!(err, TriplecastError::NilParent(_)), "got {err:?}");
    let err = solo.ancestors().unwrap_err();
    assert!(matches!(err, TriplecastError::NilParent(_)), "got {err:?}");
}

#[test]
fn self_parented_sources_root_their_own_chain() {
    let ns = "https://parents.example/self";
    let root = Source::new();
    let chain = Source::child(&root).unwrap();
    chain.set_parent(&chain).unwrap();

    assert!(chain.final_parent().unwrap().same(&chain));
    let ancestors = chain.ancestors().unwrap();
    assert_eq!(ancestors.len(), 1);
    assert!(ancestors[0].same(&chain));

    // Persisting into itself is a no-op on content and marks it persisted.
    let before = {
        chain
            .set_value(None, note(ns, "kind"), [Value::from("root")])
            .unwrap();
        chain.statements()
    };
    chain.persist().unwrap();
    assert_eq!(chain.statements(), before);
    assert!(chain.persisted());
}

#[test]
fn parent_cycles_terminate_at_the_back_reference() {
    let root = Source::new();
    let a = Source::child(&root).unwrap();
    let b = Source::child(&a).unwrap();
    a.set_parent(&b).unwrap();

    // a -> b -> a: walking from a stops at b, the node that loops back.
    assert!(a.final_parent().unwrap().same(&b));
    assert!(b.final_parent().unwrap().same(&a));
    let ancestors = a.ancestors().unwrap();
    assert_eq!(ancestors.len(), 2, "each chain node appears once");
    a.persist().unwrap();
    b.persist().unwrap();
}

#[test]
fn frozen_parents_reject_children_and_writes() {
    let ns = "https://parents.example/frozen";
    let root = Source::new();
    let leaf = Source::child(&root).unwrap();
    leaf.set_value(None, note(ns, "says"), [Value::from("late")])
        .unwrap();
    root.freeze();

    let err = Source::child(&root).unwrap_err();
    assert!(matches!(err, TriplecastError::UnmutableParent(_)), "got {err:?}");
    let err = leaf.persist().unwrap_err();
    assert!(matches!(err, TriplecastError::UnmutableParent(_)), "got {err:?}");

    let other = Source::new();
    other.freeze();
    let err = leaf.set_parent(&other).unwrap_err();
    assert!(matches!(err, TriplecastError::UnmutableParent(_)), "got {err:?}");
}

#[test]
fn strategy_kinds_never_change() {
    let repository_backed = Source::new();
    let parent = Source::new();
    let projected = Source::child(&parent).unwrap();

    let err = repository_backed.set_parent(&parent).unwrap_err();
    assert!(matches!(err, TriplecastError::StrategyMismatch(_)), "got {err:?}");
    let err = projected.set_repository("anywhere").unwrap_err();
    assert!(matches!(err, TriplecastError::StrategyMismatch(_)), "got {err:?}");

    // Rebinding the target inside the kind is allowed.
    let other_parent = Source::new();
    projected.set_parent(&other_parent).unwrap();
    assert!(projected.parent().unwrap().same(&other_parent));
    repository_backed.set_repository("somewhere-else").unwrap();
}

#[test]
fn persisted_requires_the_whole_chain() {
    let ns = "https://parents.example/chain-flags";
    let root = Source::new();
    let leaf = Source::child(&root).unwrap();
    leaf.set_value(None, note(ns, "says"), [Value::from("x")])
        .unwrap();
    assert!(!leaf.persisted());

    leaf.persist().unwrap();
    assert!(
        !leaf.persisted(),
        "projection into an unpersisted parent is not durable yet"
    );

    root.persist().unwrap();
    assert!(root.persisted());
    assert!(leaf.persisted(), "now the whole chain has landed");
}

#[test]
fn destroy_removes_the_projection_and_the_parents_references() {
    let ns = "https://parents.example/destroy";
    let root = Source::new();
    let leaf = Source::child(&root).unwrap();
    let leaf_subject = leaf.rdf_subject();
    leaf.set_value(None, note(ns, "says"), [Value::from("bye")])
        .unwrap();
    leaf.persist().unwrap();

    // The root also points at the leaf through a relation of its own.
    root.set_value(None, note(ns, "child"), [Value::from(leaf_subject.clone())])
        .unwrap();

    leaf.destroy().unwrap();
    assert!(leaf.destroyed());
    assert!(leaf.is_empty(), "destroy empties the owned graph");
    assert!(
        root.get_values(Some(&leaf_subject), note(ns, "says"))
            .unwrap()
            .is_empty(),
        "projected statements are gone"
    );
    assert!(
        root.get_values(None, note(ns, "child")).unwrap().is_empty(),
        "the parent no longer references the destroyed child"
    );
}
