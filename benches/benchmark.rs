use criterion::{black_box, criterion_group, criterion_main, Criterion};

use std::sync::Arc;

use triplecast::graph::Graph;
use triplecast::materialize::Materializer;
use triplecast::repository;
use triplecast::schema::{PropertyOptions, SchemaRegistry, SourceSchema, TargetType};
use triplecast::term::{Iri, Literal, Statement, Term};
use triplecast::value::Value;

const NS: &str = "https://bench.example";
const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

fn iri(name: &str) -> Iri {
    Iri::new(format!("{NS}/{name}")).unwrap()
}

fn people_registry() -> Arc<SchemaRegistry> {
    let registry = Arc::new(SchemaRegistry::new());
    let person = SourceSchema::build("Person")
        .rdf_type(iri("Person"))
        .base_uri(format!("{NS}/people"))
        .repository("bench")
        .finish();
    person.declare("name", iri("name")).unwrap();
    person
        .declare_with(
            "knows",
            iri("knows"),
            PropertyOptions {
                target: Some(TargetType::Named("Person".to_string())),
                ..PropertyOptions::default()
            },
        )
        .unwrap();
    registry.register(person);
    registry
}

/// A hub that knows `fans` typed children, each carrying a name.
fn star_graph(fans: usize) -> (Graph, Term) {
    let mut graph = Graph::new();
    let hub = Term::Iri(iri("people/hub"));
    let rdf_type = Iri::new_unchecked(RDF_TYPE);
    graph.insert(Statement::new(hub.clone(), rdf_type.clone(), iri("Person")));
    graph.insert(Statement::new(hub.clone(), iri("name"), Literal::new("Hub")));
    for n in 0..fans {
        let fan = Term::Iri(iri(&format!("people/fan{n}")));
        graph.insert(Statement::new(fan.clone(), rdf_type.clone(), iri("Person")));
        graph.insert(Statement::new(
            fan.clone(),
            iri("name"),
            Literal::new(format!("Fan {n}")),
        ));
        graph.insert(Statement::new(hub.clone(), iri("knows"), fan));
    }
    (graph, hub)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let registry = people_registry();
    let materializer = Materializer::new(Arc::clone(&registry));

    for (label, fans) in [("materialize 10", 10), ("materialize 100", 100), ("materialize 1k", 1000)] {
        let (graph, hub) = star_graph(fans);
        println!("star {} -> {} statements", fans, graph.len());
        c.bench_function(label, |b| {
            b.iter(|| black_box(materializer.materialize(&graph, &hub).unwrap()))
        });
    }

    repository::add("bench");
    let alice = registry.create_with_subject("Person", "alice").unwrap();
    for n in 0..100 {
        alice
            .set_value(None, iri(&format!("p{n}")), [Value::from(n as i64)])
            .unwrap();
    }
    println!("alice -> {} statements", alice.statement_count());
    c.bench_function("persist 100", |b| b.iter(|| alice.persist().unwrap()));

    let (graph, hub) = star_graph(100);
    let hub_source = materializer.materialize(&graph, &hub).unwrap();
    c.bench_function("attributes 100", |b| {
        b.iter(|| black_box(hub_source.attributes().unwrap()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
