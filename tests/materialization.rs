use std::sync::Arc;

use triplecast::graph::Graph;
use triplecast::materialize::Materializer;
use triplecast::repository;
use triplecast::schema::{PropertyOptions, SchemaRegistry, SourceSchema, TargetType};
use triplecast::term::{Iri, Literal, Statement, Term};
use triplecast::value::Value;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

fn iri(ns: &str, name: &str) -> Iri {
    Iri::new(format!("{ns}/{name}")).unwrap()
}

/// Person (name, knows -> Person) with Employee refining it.
fn people_registry(ns: &str) -> Arc<SchemaRegistry> {
    let registry = Arc::new(SchemaRegistry::new());
    let person = SourceSchema::build("Person")
        .rdf_type(iri(ns, "Person"))
        .finish();
    person.declare("name", iri(ns, "name")).unwrap();
    person
        .declare_with(
            "knows",
            iri(ns, "knows"),
            PropertyOptions {
                target: Some(TargetType::Named("Person".to_string())),
                ..PropertyOptions::default()
            },
        )
        .unwrap();
    let employee = SourceSchema::build("Employee")
        .rdf_type(iri(ns, "Employee"))
        .parent(&person)
        .finish();
    employee.declare("badge", iri(ns, "badge")).unwrap();
    registry.register(Arc::clone(&person));
    registry.register(employee);
    registry
}

fn typed_subject(graph: &mut Graph, ns: &str, name: &str, type_name: &str) -> Term {
    let subject = Term::Iri(iri(ns, name));
    graph.insert(Statement::new(
        subject.clone(),
        Iri::new_unchecked(RDF_TYPE),
        iri(ns, type_name),
    ));
    subject
}

#[test]
fn subjects_materialize_under_their_most_specific_schema() {
    let ns = "https://materialize.example/specific";
    let registry = people_registry(ns);
    let mut graph = Graph::new();
    let anna = typed_subject(&mut graph, ns, "anna", "Person");
    // Bert is both a Person and an Employee; the deeper type wins.
    let bert = typed_subject(&mut graph, ns, "bert", "Person");
    graph.insert(Statement::new(
        bert.clone(),
        Iri::new_unchecked(RDF_TYPE),
        iri(ns, "Employee"),
    ));
    graph.insert(Statement::new(anna.clone(), iri(ns, "name"), Literal::new("Anna")));
    graph.insert(Statement::new(bert.clone(), iri(ns, "badge"), Literal::new("B-7")));

    let materializer = Materializer::new(registry);
    let anna_source = materializer.materialize(&graph, &anna).unwrap();
    let bert_source = materializer.materialize(&graph, &bert).unwrap();

    assert_eq!(anna_source.schema().name(), "Person");
    assert_eq!(bert_source.schema().name(), "Employee");
    assert_eq!(anna_source.get("name").unwrap(), vec![Value::from("Anna")]);
    assert_eq!(bert_source.get("badge").unwrap(), vec![Value::from("B-7")]);
    // Inherited declarations stay visible on the refined type.
    assert!(bert_source.get("name").unwrap().is_empty());
}

#[test]
fn untyped_subjects_fall_back_to_the_generic_source() {
    let ns = "https://materialize.example/fallback";
    let registry = people_registry(ns);
    let mut graph = Graph::new();
    let thing = Term::Iri(iri(ns, "mystery"));
    graph.insert(Statement::new(
        thing.clone(),
        iri(ns, "note"),
        Literal::new("untyped"),
    ));
    let source = Materializer::new(registry).materialize(&graph, &thing).unwrap();
    assert!(source.schema().is_base());
    assert_eq!(
        source.get_values(None, iri(ns, "note")).unwrap(),
        vec![Value::from("untyped")]
    );
}

#[test]
fn repeated_casts_return_the_same_instance() {
    let ns = "https://materialize.example/memo";
    let registry = people_registry(ns);
    let mut graph = Graph::new();
    let anna = typed_subject(&mut graph, ns, "anna", "Person");
    let bert = typed_subject(&mut graph, ns, "bert", "Person");
    graph.insert(Statement::new(anna.clone(), iri(ns, "knows"), bert.clone()));

    let source = Materializer::new(registry).materialize(&graph, &anna).unwrap();
    let first = source.get("knows").unwrap();
    let second = source.get("knows").unwrap();
    let first = first[0].as_node().unwrap();
    let second = second[0].as_node().unwrap();
    assert!(
        first.same(second),
        "casting the same term twice must yield the same instance"
    );
}

#[test]
fn cyclic_references_close_on_the_same_instances() {
    let ns = "https://materialize.example/cycle";
    let registry = people_registry(ns);
    let mut graph = Graph::new();
    let anna = typed_subject(&mut graph, ns, "anna", "Person");
    let bert = typed_subject(&mut graph, ns, "bert", "Person");
    graph.insert(Statement::new(anna.clone(), iri(ns, "knows"), bert.clone()));
    graph.insert(Statement::new(bert.clone(), iri(ns, "knows"), anna.clone()));

    let source = Materializer::new(registry).materialize(&graph, &anna).unwrap();
    let friends = source.get("knows").unwrap();
    let bert_source = friends[0].as_node().unwrap();
    let back = bert_source.get("knows").unwrap();
    let round_tripped = back[0].as_node().unwrap();
    assert!(
        round_tripped.same(&source),
        "the cycle must come back to the entry instance"
    );
}

#[test]
fn materialize_all_shares_one_family() {
    let ns = "https://materialize.example/family";
    let registry = people_registry(ns);
    let mut graph = Graph::new();
    let anna = typed_subject(&mut graph, ns, "anna", "Person");
    let bert = typed_subject(&mut graph, ns, "bert", "Person");
    graph.insert(Statement::new(anna.clone(), iri(ns, "knows"), bert.clone()));

    let sources = Materializer::new(registry).materialize_all(&graph).unwrap();
    assert_eq!(sources.len(), 2);
    let anna_source = sources
        .iter()
        .find(|s| s.rdf_subject() == anna)
        .expect("anna materialized");
    let bert_source = sources
        .iter()
        .find(|s| s.rdf_subject() == bert)
        .expect("bert materialized");
    let cast = anna_source.get("knows").unwrap();
    assert!(
        cast[0].as_node().unwrap().same(bert_source),
        "cross references resolve within the shared family"
    );
}

#[test]
fn typed_children_arrive_materialized_and_parent_projected() {
    let ns = "https://materialize.example/children";
    let registry = people_registry(ns);
    let mut graph = Graph::new();
    let anna = typed_subject(&mut graph, ns, "anna", "Person");
    let bert = typed_subject(&mut graph, ns, "bert", "Person");
    graph.insert(Statement::new(anna.clone(), iri(ns, "knows"), bert.clone()));
    graph.insert(Statement::new(bert.clone(), iri(ns, "name"), Literal::new("Bert")));

    let source = Materializer::new(registry).materialize(&graph, &anna).unwrap();
    let friends = source.get("knows").unwrap();
    let bert_source = friends[0].as_node().unwrap();
    assert_eq!(bert_source.schema().name(), "Person", "declared target type");
    assert_eq!(bert_source.get("name").unwrap(), vec![Value::from("Bert")]);
    assert!(
        bert_source.parent().expect("projected child").same(&source),
        "children project onto the source that referenced them"
    );
}

#[test]
fn stale_casts_are_dropped_after_a_rewrite() {
    let ns = "https://materialize.example/stale";
    let registry = people_registry(ns);
    let anna = registry.create("Person").unwrap();
    let bert = registry.create("Person").unwrap();
    let carol = registry.create("Person").unwrap();
    bert.set("name", [Value::from("Bert")]).unwrap();
    carol.set("name", [Value::from("Carol")]).unwrap();

    anna.set("knows", [Value::from(bert.clone())]).unwrap();
    let cast = anna.get("knows").unwrap();
    let first = cast[0].as_node().unwrap().clone();
    assert_eq!(first.get("name").unwrap(), vec![Value::from("Bert")]);

    // Relinking swaps the value the cast follows.
    anna.set("knows", [Value::from(carol.clone())]).unwrap();
    let cast = anna.get("knows").unwrap();
    let second = cast[0].as_node().unwrap();
    assert!(!second.same(&first));
    assert_eq!(second.get("name").unwrap(), vec![Value::from("Carol")]);

    // Relinking back must rebuild rather than hand out the stale memo.
    anna.set("knows", [Value::from(bert.clone())]).unwrap();
    let cast = anna.get("knows").unwrap();
    let third = cast[0].as_node().unwrap();
    assert!(!third.same(&first), "the invalidated instance is gone");
    assert_eq!(third.get("name").unwrap(), vec![Value::from("Bert")]);
}

#[test]
fn fresh_instances_recover_references_from_a_shared_repository() {
    let ns = "https://materialize.example/shared";
    let repository_name = "materialize_shared_references";
    repository::add(repository_name);
    let registry = people_registry(ns);

    let anna = registry.create("Person").unwrap();
    anna.set_subject(Iri::new(format!("{ns}/people/anna")).unwrap())
        .unwrap();
    anna.set_repository(repository_name).unwrap();
    let bert = registry.create("Person").unwrap();
    bert.set_subject(Iri::new(format!("{ns}/people/bert")).unwrap())
        .unwrap();
    bert.set("name", [Value::from("Bert")]).unwrap();
    anna.set("knows", [Value::from(bert.clone())]).unwrap();
    anna.persist().unwrap();

    // Later edits to the live handle never reached the repository.
    bert.set("name", [Value::from("Bertrand")]).unwrap();

    let fresh = Materializer::new(registry)
        .from_repository(repository_name, &anna.rdf_subject())
        .unwrap();
    assert!(!fresh.same(&anna), "a new instance, not the old handle");
    let knows = fresh.get("knows").unwrap();
    let friend = knows[0].as_node().unwrap();
    assert_eq!(friend.rdf_subject(), bert.rdf_subject());
    assert_eq!(
        friend.get("name").unwrap(),
        vec![Value::from("Bert")],
        "the repository holds what was captured at persist time"
    );
}

#[test]
fn from_repository_round_trips() {
    let ns = "https://materialize.example/roundtrip";
    let store = repository::add("materialize_round_trip");
    let registry = people_registry(ns);
    let seeded = {
        let mut graph = Graph::new();
        let anna = typed_subject(&mut graph, ns, "anna", "Person");
        graph.insert(Statement::new(anna.clone(), iri(ns, "name"), Literal::new("Anna")));
        (graph, anna)
    };
    store.insert_all(seeded.0).unwrap();

    let materializer = Materializer::new(registry);
    let anna = materializer
        .from_repository("materialize_round_trip", &seeded.1)
        .unwrap();
    assert_eq!(anna.get("name").unwrap(), vec![Value::from("Anna")]);

    anna.set("name", [Value::from("Annika")]).unwrap();
    anna.persist().unwrap();
    let name = iri(ns, "name");
    let stored = store.matching(Some(&seeded.1), Some(&name), None);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].object(), &Term::Literal(Literal::new("Annika")));
}
