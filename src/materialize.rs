//! Turning graphs back into typed sources. The materializer walks a graph
//! from a subject, picks the most specific registered schema for it, and
//! recursively builds child sources for declared, typed properties. The
//! arena is the memo: one entry per subject term, so cyclic graphs
//! terminate and re-encountered subjects come back as the same instance.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, Mutex};

use seahash::SeaHasher;
use tracing::debug;

use crate::error::Result;
use crate::graph::Graph;
use crate::repository;
use crate::schema::{SchemaRegistry, SourceSchema};
use crate::source::{Source, SourceInner, SourceRef};
use crate::strategy::Strategy;
use crate::term::{Iri, Term};
use crate::vocab::rdf;

pub type TermHasher = BuildHasherDefault<SeaHasher>;

/// The family arena. It owns the only strong references tying related
/// sources together; inner sources never point at each other except through
/// child-to-parent strategy links, so dropping every handle of a family
/// frees it even when the underlying graph is cyclic.
pub(crate) struct SourceArena {
    entries: Mutex<HashMap<Term, SourceRef, TermHasher>>,
}

impl SourceArena {
    pub(crate) fn new() -> Arc<SourceArena> {
        Arc::new(SourceArena {
            entries: Mutex::new(HashMap::default()),
        })
    }

    pub(crate) fn get(&self, term: &Term) -> Option<SourceRef> {
        self.entries.lock().unwrap().get(term).map(Arc::clone)
    }

    pub(crate) fn insert(&self, term: Term, inner: SourceRef) {
        self.entries.lock().unwrap().insert(term, inner);
    }

    pub(crate) fn remove(&self, term: &Term) {
        self.entries.lock().unwrap().remove(term);
    }

    /// Moves `inner`'s entry from `old` to `new`. The old slot is left
    /// alone when another source occupies it.
    pub(crate) fn rekey(&self, old: &Term, new: Term, inner: &SourceRef) {
        let mut entries = self.entries.lock().unwrap();
        if entries
            .get(old)
            .is_some_and(|existing| Arc::ptr_eq(existing, inner))
        {
            entries.remove(old);
        }
        entries.insert(new, Arc::clone(inner));
    }
}

/// Builds (or fetches from the arena) the source for `term`, described by
/// `graph`. With no schema hint the subject's `rdf:type` statements pick
/// the most specific registered schema, falling back to the generic base.
/// Declared cast properties with a target type recurse eagerly; the arena
/// entry is written before recursion so cycles close on the same instance.
pub(crate) fn build_source(
    graph: &Graph,
    term: &Term,
    hint: Option<Arc<SourceSchema>>,
    registry: Option<Arc<SchemaRegistry>>,
    parent: Option<SourceRef>,
    arena: &Arc<SourceArena>,
) -> Result<SourceRef> {
    if let Some(existing) = arena.get(term) {
        return Ok(existing);
    }
    let schema = match hint {
        Some(schema) => schema,
        None => {
            let types: Vec<Iri> = graph
                .matching(Some(term), Some(&rdf::TYPE), None)
                .into_iter()
                .filter_map(|s| s.object().as_iri().cloned())
                .collect();
            registry
                .as_ref()
                .and_then(|r| r.schema_for_types(&types))
                .unwrap_or_else(SourceSchema::base)
        }
    };
    let strategy = match parent {
        Some(parent_ref) => Strategy::for_parent(parent_ref),
        None => Strategy::for_schema(&schema),
    };
    let inner: SourceRef = Arc::new(Mutex::new(SourceInner {
        subject: Some(term.clone()),
        graph: graph.bounded_description(term),
        schema: Arc::clone(&schema),
        registry: registry.clone(),
        strategy,
        mutable: true,
        destroyed: false,
        hooks: Vec::new(),
        validator: None,
    }));
    arena.insert(term.clone(), Arc::clone(&inner));
    debug!(subject = %term, schema = schema.name(), "materialized source");
    for statement in graph.matching(Some(term), None, None) {
        if !statement.object().is_resource() {
            continue;
        }
        if let Some(config) = schema.property_for_predicate(statement.predicate()) {
            if config.cast() {
                if let Some(target) = config.target() {
                    let child_schema = target.resolve(registry.as_ref())?;
                    build_source(
                        graph,
                        statement.object(),
                        Some(child_schema),
                        registry.clone(),
                        Some(Arc::clone(&inner)),
                        arena,
                    )?;
                }
            }
        }
    }
    Ok(inner)
}

/// Materializes typed sources out of plain graphs, one shared arena per
/// pass.
pub struct Materializer {
    registry: Arc<SchemaRegistry>,
}

impl Materializer {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Builds the source for one subject. Children reached through typed
    /// declarations are materialized into the same family, parent-projected
    /// onto the source that referenced them.
    pub fn materialize(&self, graph: &Graph, subject: &Term) -> Result<Source> {
        let arena = SourceArena::new();
        let inner = build_source(
            graph,
            subject,
            None,
            Some(Arc::clone(&self.registry)),
            None,
            &arena,
        )?;
        Ok(Source::from_ref(inner, arena))
    }

    /// Materializes every subject in the graph into one shared family, so
    /// cross references resolve to the same instances.
    pub fn materialize_all(&self, graph: &Graph) -> Result<Vec<Source>> {
        let arena = SourceArena::new();
        let mut sources = Vec::new();
        for subject in graph.subjects() {
            let inner = build_source(
                graph,
                &subject,
                None,
                Some(Arc::clone(&self.registry)),
                None,
                &arena,
            )?;
            sources.push(Source::from_ref(inner, Arc::clone(&arena)));
        }
        Ok(sources)
    }

    /// Materializes a subject straight out of a registered repository and
    /// points the result back at it, so a later persist round-trips.
    pub fn from_repository(&self, name: &str, subject: &Term) -> Result<Source> {
        let snapshot = repository::get(name)?.snapshot();
        let source = self.materialize(&snapshot, subject)?;
        source.set_repository(name)?;
        Ok(source)
    }
}
