use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use triplecast::repository;
use triplecast::schema::{SchemaRegistry, SourceSchema};
use triplecast::source::Source;
use triplecast::term::{Iri, Literal, Term};
use triplecast::value::Value;

fn person_registry(ns: &str, repository_name: &str) -> Arc<SchemaRegistry> {
    let registry = Arc::new(SchemaRegistry::new());
    let person = SourceSchema::build("Person")
        .rdf_type(Iri::new(format!("{ns}/Person")).unwrap())
        .base_uri(format!("{ns}/people"))
        .repository(repository_name)
        .finish();
    person
        .declare("name", Iri::new(format!("{ns}/name")).unwrap())
        .unwrap();
    person
        .declare("note", Iri::new(format!("{ns}/note")).unwrap())
        .unwrap();
    registry.register(person);
    registry
}

#[test]
fn a_failing_validator_blocks_save() {
    let ns = "https://hooks.example/blocked";
    let store = repository::add("hooks_failing_validator");
    let registry = person_registry(ns, "hooks_failing_validator");

    let alice = registry.create_with_subject("Person", "alice").unwrap();
    alice.set_validator(|source| {
        source.get("name").map(|v| !v.is_empty()).unwrap_or(false)
    });

    assert!(!alice.save().unwrap());
    assert!(store.is_empty(), "a rejected save writes nothing");
    assert!(!alice.persisted());

    alice.set("name", [Value::from("Alice")]).unwrap();
    assert!(alice.save().unwrap());
    assert_eq!(store.len(), alice.statement_count());
    assert!(alice.persisted());
}

#[test]
fn persist_ignores_the_validator() {
    let ns = "https://hooks.example/unchecked";
    let store = repository::add("hooks_persist_unchecked");
    let registry = person_registry(ns, "hooks_persist_unchecked");

    let alice = registry.create_with_subject("Person", "alice").unwrap();
    alice.set_validator(|_| false);
    alice.set("name", [Value::from("Alice")]).unwrap();

    assert!(alice.persist().unwrap());
    assert_eq!(store.len(), alice.statement_count());
    assert!(alice.persisted());

    // A later rejected save leaves the persisted state alone.
    assert!(!alice.save().unwrap());
    assert!(alice.persisted());
}

#[test]
fn hooks_mutate_before_the_write() {
    let ns = "https://hooks.example/stamp";
    let store = repository::add("hooks_stamp_before_write");
    let registry = person_registry(ns, "hooks_stamp_before_write");

    let alice = registry.create_with_subject("Person", "alice").unwrap();
    alice.set("name", [Value::from("Alice")]).unwrap();
    alice.on_persist(|source| {
        source.set("note", [Value::from("stamped")]).unwrap();
    });

    alice.persist().unwrap();
    let note = Iri::new(format!("{ns}/note")).unwrap();
    let stored = store.matching(Some(&alice.rdf_subject()), Some(&note), None);
    assert_eq!(stored.len(), 1, "what the hook writes is what lands");
    assert_eq!(stored[0].object(), &Term::Literal(Literal::new("stamped")));
}

#[test]
fn hooks_run_even_when_the_save_is_rejected() {
    let ns = "https://hooks.example/counted";
    repository::add("hooks_counted_rejection");
    let registry = person_registry(ns, "hooks_counted_rejection");

    let alice = registry.create_with_subject("Person", "alice").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    alice.on_persist(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    alice.set_validator(|_| false);

    assert!(!alice.save().unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 1, "hooks precede the validity check");

    alice.persist().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn hooks_fire_for_parent_projection_too() {
    let ns = "https://hooks.example/projected";
    let root = Source::new();
    let child = Source::child(&root).unwrap();
    let note = Iri::new(format!("{ns}/note")).unwrap();
    let marker = note.clone();
    child.on_persist(move |source| {
        source
            .set_value(None, marker.clone(), [Value::from("projected")])
            .unwrap();
    });

    child.persist().unwrap();
    let stored = {
        let subject = child.rdf_subject();
        root.statements()
            .into_iter()
            .filter(|s| s.subject() == &subject && s.predicate() == &note)
            .count()
    };
    assert_eq!(stored, 1, "the hook's statement reaches the parent graph");
}

#[test]
fn validators_without_an_installation_accept() {
    let source = Source::new();
    assert!(source.is_valid());
    source.set_validator(|_| true);
    assert!(source.is_valid());
}
