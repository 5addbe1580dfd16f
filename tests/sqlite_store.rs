use rusqlite::Connection;
use triplecast::error::TriplecastError;
use triplecast::graph::Graph;
use triplecast::persist::GraphStore;
use triplecast::repository::{self, Repository};
use triplecast::term::{BlankNode, Iri, Literal, Statement, Term};
use triplecast::vocab::xsd;

fn iri(name: &str) -> Iri {
    Iri::new(format!("https://store.example/{name}")).unwrap()
}

/// One statement of every term shape the store has to round-trip.
fn mixed_graph() -> Graph {
    let mut graph = Graph::new();
    let alice = Term::Iri(iri("alice"));
    graph.insert(Statement::new(alice.clone(), iri("knows"), iri("bob")));
    graph.insert(Statement::new(
        alice.clone(),
        iri("age"),
        Literal::new_typed("39", xsd::INTEGER.clone()),
    ));
    graph.insert(Statement::new(
        alice.clone(),
        iri("greeting"),
        Literal::new_lang("hej", "SV"),
    ));
    graph.insert(Statement::new(
        Term::Blank(BlankNode::new("draft")),
        iri("about"),
        alice,
    ));
    graph
}

#[test]
fn statements_survive_a_round_trip() {
    let connection = Connection::open_in_memory().unwrap();
    let mut store = GraphStore::new(&connection).unwrap();
    let graph = mixed_graph();
    let repository = Repository::with_graph(graph.clone());

    let written = store
        .save_repository("sqlite_round_trip", &repository)
        .unwrap();
    assert_eq!(written, graph.len());

    let loaded = store.load_repository("sqlite_round_trip").unwrap().unwrap();
    assert_eq!(loaded.snapshot(), graph);
    assert!(loaded.is_mutable());
}

#[test]
fn loading_an_unknown_name_finds_nothing() {
    let connection = Connection::open_in_memory().unwrap();
    let mut store = GraphStore::new(&connection).unwrap();
    assert!(store.load_repository("sqlite_missing").unwrap().is_none());
}

#[test]
fn saving_again_replaces_earlier_statements() {
    let connection = Connection::open_in_memory().unwrap();
    let mut store = GraphStore::new(&connection).unwrap();
    store
        .save_repository("sqlite_replace", &Repository::with_graph(mixed_graph()))
        .unwrap();

    let mut slim = Graph::new();
    slim.insert(Statement::new(
        iri("carol"),
        iri("age"),
        Literal::new_typed("7", xsd::INTEGER.clone()),
    ));
    store
        .save_repository("sqlite_replace", &Repository::with_graph(slim.clone()))
        .unwrap();

    let loaded = store.load_repository("sqlite_replace").unwrap().unwrap();
    assert_eq!(loaded.snapshot(), slim, "the earlier rows are gone");
}

#[test]
fn the_mutability_flag_survives() {
    let connection = Connection::open_in_memory().unwrap();
    let mut store = GraphStore::new(&connection).unwrap();
    store
        .save_repository("sqlite_frozen", &Repository::read_only(mixed_graph()))
        .unwrap();

    let loaded = store.load_repository("sqlite_frozen").unwrap().unwrap();
    assert!(!loaded.is_mutable());
    let err = loaded
        .insert(Statement::new(iri("x"), iri("y"), iri("z")))
        .unwrap_err();
    assert!(matches!(err, TriplecastError::UnmutableSource(_)));
}

#[test]
fn restore_reregisters_every_stored_repository() {
    let connection = Connection::open_in_memory().unwrap();
    let mut store = GraphStore::new(&connection).unwrap();
    let graph = mixed_graph();
    store
        .save_repository("sqlite_restore_b", &Repository::with_graph(graph.clone()))
        .unwrap();
    // A repository with no statements still keeps its name row.
    store
        .save_repository("sqlite_restore_a", &Repository::with_graph(Graph::new()))
        .unwrap();

    let restored = store.restore_repositories().unwrap();
    assert_eq!(
        restored,
        vec!["sqlite_restore_a".to_string(), "sqlite_restore_b".to_string()]
    );
    assert!(repository::contains("sqlite_restore_a"));
    assert!(repository::contains("sqlite_restore_b"));
    assert_eq!(repository::get("sqlite_restore_a").unwrap().len(), 0);
    assert_eq!(repository::get("sqlite_restore_b").unwrap().snapshot(), graph);
}

#[test]
fn save_registered_covers_the_registry() {
    let connection = Connection::open_in_memory().unwrap();
    let mut store = GraphStore::new(&connection).unwrap();
    let graph = mixed_graph();
    repository::register(
        "sqlite_registered",
        Repository::with_graph(graph.clone()).into(),
    );

    let saved = store.save_registered().unwrap();
    assert!(saved >= 1, "at least this repository was written");

    let loaded = store.load_repository("sqlite_registered").unwrap().unwrap();
    assert_eq!(loaded.snapshot(), graph);
}
