//! Triplecast – typed mutable sources whose state lives in RDF-style
//! statement graphs.
//!
//! Triplecast centers on the *source* concept: an object whose properties
//! are subject–predicate–object statements rather than fields, where:
//! * A [`term::Term`] is an IRI, a blank node, or a literal; any term may
//!   occupy any statement position.
//! * A [`term::Statement`] couples a subject, predicate and object.
//! * A [`graph::Graph`] is an owned, ordered statement set with wildcard
//!   matching over any combination of positions.
//! * A [`schema::SourceSchema`] names a source type and declares its
//!   properties: name-to-predicate bindings with per-property casting and
//!   cardinality behavior, inherited through a parent chain.
//! * A [`source::Source`] is a cheap-clone handle over shared state: a
//!   subject term, an owned graph of assertions, a schema, and a
//!   persistence strategy.
//!
//! Handles also carry a family *arena* keyed by subject term, so casting
//! the same resource twice yields the same instance and cyclic graphs
//! materialize without recursing forever.
//!
//! ## Modules
//! * [`term`] / [`vocab`] – Terms, statements, and well-known RDF and XSD
//!   vocabulary IRIs.
//! * [`graph`] – The owned statement set and its matching operations.
//! * [`value`] – Mapping between typed literals and native scalars
//!   (strings, integers, decimals, dates) on property reads and writes.
//! * [`schema`] – Source type descriptors, property declarations and the
//!   schema registry.
//! * [`source`] – The source itself: identity, property access, raw
//!   statement editing, hooks, and the JSON attributes view.
//! * [`relation`] – A property accessor bound to one subject and one
//!   declared property.
//! * [`strategy`] – Repository and parent persistence strategies:
//!   `persist`, `save`, `reload`, `destroy`, and ancestor resolution.
//! * [`repository`] – In-memory statement stores and the process-wide
//!   registry binding them to names.
//! * [`materialize`] – Building typed sources back out of graphs, most
//!   specific registered schema first.
//! * [`persist`] – SQLite storage and restoration for named repositories.
//! * [`error`] – The crate-wide error and result types.
//!
//! ## Identity
//! A source without an assigned subject mints a fresh blank node on first
//! use and can be renamed later; [`source::Source::set_subject`] rewrites
//! every owned statement onto the new term. Once a proper IRI is assigned
//! the identity is final and further assignment is refused.
//!
//! ## Persistence
//! Each source carries one of two strategies fixed at construction:
//! repository-backed sources erase and rewrite their statements in a named
//! [`repository::Repository`], while parent-projected sources write into
//! the graph of their final ancestor. The [`persist::GraphStore`] makes
//! registered repositories durable in SQLite.
//!
//! ## Quick Start
//! ```
//! use std::sync::Arc;
//! use triplecast::schema::{SchemaRegistry, SourceSchema};
//! use triplecast::term::Iri;
//! use triplecast::value::Value;
//!
//! let registry = Arc::new(SchemaRegistry::new());
//! let person = SourceSchema::build("Person")
//!     .rdf_type(Iri::new("https://example.org/Person").unwrap())
//!     .base_uri("https://example.org/people")
//!     .finish();
//! person.declare("name", Iri::new("https://example.org/name").unwrap()).unwrap();
//! registry.register(person);
//!
//! let alice = registry.create_with_subject("Person", "alice").unwrap();
//! alice.set("name", [Value::from("Alice")]).unwrap();
//! assert_eq!(alice.get("name").unwrap(), vec![Value::from("Alice")]);
//! ```
//!
//! ## Status & Roadmap
//! The statement model and persistence strategies are settled; the
//! attributes view and materialization heuristics are still evolving.
//! Expect additions around named graph support and bulk loading while the
//! public surface is being refined.

pub mod error;
pub mod term;
pub mod vocab;
pub mod graph;
pub mod value;
pub mod schema;
pub mod source;
pub mod relation;
pub mod strategy;
pub mod repository;
pub mod materialize;
pub mod persist;
