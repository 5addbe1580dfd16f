//! Mutable typed sources. A `Source` is a cheap-clone handle onto shared
//! state: a subject term, an owned statement graph holding every property
//! assertion, a schema, and a persistence strategy. Handles also carry the
//! family arena (see `materialize`), which keeps cast and materialized
//! relatives reachable and instance-stable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{Result, TriplecastError};
use crate::graph::Graph;
use crate::materialize::{self, SourceArena};
use crate::schema::{PropertyConfig, SchemaRegistry, SourceSchema, TargetType};
use crate::strategy::Strategy;
use crate::term::{BlankNode, Iri, Statement, Term};
use crate::value::Value;
use crate::vocab::rdf;

pub(crate) type SourceRef = Arc<Mutex<SourceInner>>;

pub(crate) type PersistHook = dyn Fn(&Source) + Send + Sync;
pub(crate) type Validator = dyn Fn(&Source) -> bool + Send + Sync;

/// Anything acceptable as a subject assignment: strings resolve against the
/// schema's base URI, terms are taken as they are.
pub enum SubjectArg {
    Str(String),
    Term(Term),
}

impl From<&str> for SubjectArg {
    fn from(s: &str) -> Self {
        SubjectArg::Str(s.to_string())
    }
}

impl From<String> for SubjectArg {
    fn from(s: String) -> Self {
        SubjectArg::Str(s)
    }
}

impl From<Iri> for SubjectArg {
    fn from(iri: Iri) -> Self {
        SubjectArg::Term(Term::Iri(iri))
    }
}

impl From<BlankNode> for SubjectArg {
    fn from(node: BlankNode) -> Self {
        SubjectArg::Term(Term::Blank(node))
    }
}

impl From<Term> for SubjectArg {
    fn from(term: Term) -> Self {
        SubjectArg::Term(term)
    }
}

impl From<&Term> for SubjectArg {
    fn from(term: &Term) -> Self {
        SubjectArg::Term(term.clone())
    }
}

/// Addresses a property either by its registered name or by a raw predicate
/// IRI. Raw predicates work without a declaration; declared entries still
/// contribute their casting and cardinality options when the predicate is
/// registered.
pub enum PropertyKey {
    Name(String),
    Predicate(Iri),
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::Name(name)
    }
}

impl From<Iri> for PropertyKey {
    fn from(predicate: Iri) -> Self {
        PropertyKey::Predicate(predicate)
    }
}

pub(crate) struct SourceInner {
    pub(crate) subject: Option<Term>,
    pub(crate) graph: Graph,
    pub(crate) schema: Arc<SourceSchema>,
    pub(crate) registry: Option<Arc<SchemaRegistry>>,
    pub(crate) strategy: Strategy,
    pub(crate) mutable: bool,
    pub(crate) destroyed: bool,
    pub(crate) hooks: Vec<Arc<PersistHook>>,
    pub(crate) validator: Option<Arc<Validator>>,
}

#[derive(Clone)]
pub struct Source {
    pub(crate) inner: SourceRef,
    pub(crate) arena: Arc<SourceArena>,
}

impl Source {
    /// An untyped source with no subject yet; the first identity access
    /// mints a fresh blank node.
    pub fn new() -> Source {
        Source::with_parts(None, SourceSchema::base(), None)
    }

    pub fn with_subject(subject: impl Into<SubjectArg>) -> Result<Source> {
        let source = Source::new();
        source.set_subject(subject)?;
        Ok(source)
    }

    /// An untyped source projected onto `parent`. The parent must be
    /// mutable, since persisting the child writes into its graph.
    pub fn child(parent: &Source) -> Result<Source> {
        if !parent.is_mutable() {
            return Err(TriplecastError::UnmutableParent(
                parent.rdf_subject().to_string(),
            ));
        }
        let registry = parent.inner.lock().unwrap().registry.clone();
        let inner = Arc::new(Mutex::new(SourceInner {
            subject: None,
            graph: Graph::new(),
            schema: SourceSchema::base(),
            registry,
            strategy: Strategy::for_parent(Arc::clone(&parent.inner)),
            mutable: true,
            destroyed: false,
            hooks: Vec::new(),
            validator: None,
        }));
        Ok(Source {
            inner,
            arena: Arc::clone(&parent.arena),
        })
    }

    pub fn child_with_subject(parent: &Source, subject: impl Into<SubjectArg>) -> Result<Source> {
        let source = Source::child(parent)?;
        source.set_subject(subject)?;
        Ok(source)
    }

    pub(crate) fn with_parts(
        subject: Option<Term>,
        schema: Arc<SourceSchema>,
        registry: Option<Arc<SchemaRegistry>>,
    ) -> Source {
        let strategy = Strategy::for_schema(&schema);
        let inner = Arc::new(Mutex::new(SourceInner {
            subject: subject.clone(),
            graph: Graph::new(),
            schema,
            registry,
            strategy,
            mutable: true,
            destroyed: false,
            hooks: Vec::new(),
            validator: None,
        }));
        let arena = SourceArena::new();
        if let Some(term) = subject {
            arena.insert(term, Arc::clone(&inner));
        }
        Source { inner, arena }
    }

    pub(crate) fn from_ref(inner: SourceRef, arena: Arc<SourceArena>) -> Source {
        Source { inner, arena }
    }

    /// True when both handles point at the same underlying source.
    pub fn same(&self, other: &Source) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ---- identity ----

    /// The source's subject term, minting a fresh blank node if none has
    /// been assigned yet.
    pub fn rdf_subject(&self) -> Term {
        let minted = {
            let mut inner = self.inner.lock().unwrap();
            match &inner.subject {
                Some(term) => return term.clone(),
                None => {
                    let fresh = Term::Blank(BlankNode::fresh());
                    inner.subject = Some(fresh.clone());
                    fresh
                }
            }
        };
        self.arena.insert(minted.clone(), Arc::clone(&self.inner));
        minted
    }

    /// The subject as currently assigned, without minting one.
    pub fn subject(&self) -> Option<Term> {
        self.inner.lock().unwrap().subject.clone()
    }

    /// True while the subject is unset or a blank node.
    pub fn is_node(&self) -> bool {
        match self.inner.lock().unwrap().subject {
            None | Some(Term::Blank(_)) => true,
            Some(_) => false,
        }
    }

    /// Assigns or rebinds the subject. Allowed while the current subject is
    /// unset, a blank node, or the null relative IRI; a source that already
    /// carries a non-null IRI refuses. Every owned statement mentioning the
    /// old term (subject or object position) is rewritten to the new one,
    /// and ancestors' graphs are rewritten alongside so links held by
    /// parents stay current.
    pub fn set_subject(&self, subject: impl Into<SubjectArg>) -> Result<()> {
        let resolved: Term = match subject.into() {
            SubjectArg::Str(s) => {
                let schema = Arc::clone(&self.inner.lock().unwrap().schema);
                Term::Iri(schema.resolve_id(&s)?)
            }
            SubjectArg::Term(Term::Literal(literal)) => {
                return Err(TriplecastError::Value(format!(
                    "a literal cannot be a subject: {}",
                    literal
                )));
            }
            SubjectArg::Term(term) => term,
        };
        let old = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.mutable {
                return Err(TriplecastError::UnmutableSource(
                    inner
                        .subject
                        .as_ref()
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                ));
            }
            let rebindable = match &inner.subject {
                None => true,
                Some(Term::Blank(_)) => true,
                Some(Term::Iri(iri)) => iri.is_null(),
                Some(Term::Literal(_)) => false,
            };
            if !rebindable {
                return Err(TriplecastError::SubjectAlreadyAssigned(
                    inner
                        .subject
                        .as_ref()
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                ));
            }
            let old = inner.subject.clone();
            inner.subject = Some(resolved.clone());
            if let Some(old_term) = &old {
                let rewritten = inner.graph.rewrite_term(old_term, &resolved);
                debug!(old = %old_term, new = %resolved, rewritten, "rebound subject");
            }
            old
        };
        match old {
            Some(old_term) => {
                self.arena.rekey(&old_term, resolved.clone(), &self.inner);
                for ancestor in self.chain_refs() {
                    if !Arc::ptr_eq(&ancestor, &self.inner) {
                        ancestor
                            .lock()
                            .unwrap()
                            .graph
                            .rewrite_term(&old_term, &resolved);
                    }
                }
            }
            None => self.arena.insert(resolved, Arc::clone(&self.inner)),
        }
        Ok(())
    }

    // ---- schema ----

    pub fn schema(&self) -> Arc<SourceSchema> {
        Arc::clone(&self.inner.lock().unwrap().schema)
    }

    /// The subject's `rdf:type` IRIs as asserted in the owned graph.
    pub fn rdf_types(&self) -> Vec<Iri> {
        let inner = self.inner.lock().unwrap();
        let subject = match &inner.subject {
            Some(term) => term.clone(),
            None => return Vec::new(),
        };
        inner
            .graph
            .matching(Some(&subject), Some(&rdf::TYPE), None)
            .into_iter()
            .filter_map(|s| s.object().as_iri().cloned())
            .collect()
    }

    // ---- properties ----

    /// Reads a declared property in native mode: typed literals become
    /// native scalars, resource objects cast into child sources when the
    /// declaration says so.
    pub fn get(&self, name: &str) -> Result<Vec<Value>> {
        let config = self.config_for(name)?;
        let subject = self.rdf_subject();
        self.values_for(&subject, config.predicate(), Some(&config), false)
    }

    /// Reads a declared property preserving literal terms: language and
    /// datatype tags survive, and resource objects stay raw terms.
    pub fn get_literals(&self, name: &str) -> Result<Vec<Value>> {
        let config = self.config_for(name)?;
        let subject = self.rdf_subject();
        self.values_for(&subject, config.predicate(), Some(&config), true)
    }

    /// Replaces a declared property's values wholesale.
    pub fn set(&self, name: &str, values: impl IntoIterator<Item = Value>) -> Result<()> {
        let config = self.config_for(name)?;
        let subject = self.rdf_subject();
        self.write_property(
            &subject,
            config.predicate(),
            config.multivalue(),
            values.into_iter().collect(),
        )
    }

    /// Reads by name or raw predicate, optionally about an explicit subject
    /// in this source's graph.
    pub fn get_values(
        &self,
        subject: Option<&Term>,
        property: impl Into<PropertyKey>,
    ) -> Result<Vec<Value>> {
        let (predicate, config) = self.resolve_property_key(property.into())?;
        let subject = match subject {
            Some(term) => term.clone(),
            None => self.rdf_subject(),
        };
        self.values_for(&subject, &predicate, config.as_ref(), false)
    }

    /// Writes by name or raw predicate, optionally about an explicit
    /// subject in this source's graph.
    pub fn set_value(
        &self,
        subject: Option<&Term>,
        property: impl Into<PropertyKey>,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<()> {
        let (predicate, config) = self.resolve_property_key(property.into())?;
        let multivalue = config.as_ref().is_none_or(|c| c.multivalue());
        let subject = match subject {
            Some(term) => term.clone(),
            None => self.rdf_subject(),
        };
        self.write_property(&subject, &predicate, multivalue, values.into_iter().collect())
    }

    pub(crate) fn config_for(&self, name: &str) -> Result<Arc<PropertyConfig>> {
        let schema = Arc::clone(&self.inner.lock().unwrap().schema);
        schema
            .property(name)
            .ok_or_else(|| TriplecastError::UnknownProperty(name.to_string()))
    }

    pub(crate) fn count_values(&self, subject: &Term, predicate: &Iri) -> usize {
        self.inner
            .lock()
            .unwrap()
            .graph
            .matching(Some(subject), Some(predicate), None)
            .len()
    }

    fn resolve_property_key(
        &self,
        key: PropertyKey,
    ) -> Result<(Iri, Option<Arc<PropertyConfig>>)> {
        let schema = Arc::clone(&self.inner.lock().unwrap().schema);
        match key {
            PropertyKey::Name(name) => {
                let config = schema
                    .property(&name)
                    .ok_or(TriplecastError::UnknownProperty(name))?;
                Ok((config.predicate().clone(), Some(config)))
            }
            PropertyKey::Predicate(predicate) => {
                let config = schema.property_for_predicate(&predicate);
                Ok((predicate, config))
            }
        }
    }

    pub(crate) fn values_for(
        &self,
        subject: &Term,
        predicate: &Iri,
        config: Option<&Arc<PropertyConfig>>,
        literal_mode: bool,
    ) -> Result<Vec<Value>> {
        let objects: Vec<Term> = {
            let inner = self.inner.lock().unwrap();
            inner
                .graph
                .matching(Some(subject), Some(predicate), None)
                .into_iter()
                .map(|s| s.object().clone())
                .collect()
        };
        let mut values = Vec::with_capacity(objects.len());
        for object in objects {
            match object {
                Term::Literal(literal) => {
                    if literal_mode {
                        values.push(Value::Literal(literal));
                    } else {
                        values.push(Value::from_literal(&literal));
                    }
                }
                resource => {
                    let cast = config.is_none_or(|c| c.cast());
                    if literal_mode || !cast {
                        values.push(Value::Term(resource));
                    } else {
                        let target = config.and_then(|c| c.target());
                        values.push(Value::Node(self.cast_child(&resource, target)?));
                    }
                }
            }
        }
        Ok(values)
    }

    /// Replaces `(subject, predicate, *)`. The input is snapshotted before
    /// the erase, so values derived from a live read of the same property
    /// survive the rewrite. Assigned child sources are captured by value:
    /// their statements are copied into this graph alongside the link.
    pub(crate) fn write_property(
        &self,
        subject: &Term,
        predicate: &Iri,
        multivalue: bool,
        mut values: Vec<Value>,
    ) -> Result<()> {
        if !multivalue && values.len() > 1 {
            values.truncate(1);
        }
        let mut terms: Vec<Term> = Vec::with_capacity(values.len());
        let mut captured = Graph::new();
        for value in &values {
            let term = value.to_term();
            if let Value::Node(child) = value {
                if !self.same(child) {
                    captured.extend(child.inner.lock().unwrap().graph.clone());
                }
            }
            terms.push(term);
        }
        let old_objects: Vec<Term> = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.mutable {
                return Err(TriplecastError::UnmutableSource(subject.to_string()));
            }
            let old = inner
                .graph
                .matching(Some(subject), Some(predicate), None)
                .into_iter()
                .map(|s| s.object().clone())
                .collect();
            inner.graph.remove_matching(Some(subject), Some(predicate), None);
            for term in &terms {
                inner
                    .graph
                    .insert(Statement::new(subject.clone(), predicate.clone(), term.clone()));
            }
            inner.graph.extend(captured);
            old
        };
        self.invalidate_casts(subject, old_objects.iter().chain(terms.iter()));
        Ok(())
    }

    /// Adds one value without touching the others. On single-valued entries
    /// this replaces instead.
    pub(crate) fn append_value(
        &self,
        subject: &Term,
        predicate: &Iri,
        multivalue: bool,
        value: Value,
    ) -> Result<()> {
        if !multivalue {
            return self.write_property(subject, predicate, false, vec![value]);
        }
        let term = value.to_term();
        let mut captured = Graph::new();
        if let Value::Node(child) = &value {
            if !self.same(child) {
                captured.extend(child.inner.lock().unwrap().graph.clone());
            }
        }
        {
            let mut inner = self.inner.lock().unwrap();
            if !inner.mutable {
                return Err(TriplecastError::UnmutableSource(subject.to_string()));
            }
            inner
                .graph
                .insert(Statement::new(subject.clone(), predicate.clone(), term.clone()));
            inner.graph.extend(captured);
        }
        self.invalidate_casts(subject, std::iter::once(&term));
        Ok(())
    }

    pub(crate) fn remove_value(
        &self,
        subject: &Term,
        predicate: &Iri,
        value: &Value,
    ) -> Result<bool> {
        let term = value.to_term();
        let removed = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.mutable {
                return Err(TriplecastError::UnmutableSource(subject.to_string()));
            }
            inner
                .graph
                .remove(&Statement::new(subject.clone(), predicate.clone(), term.clone()))
        };
        self.invalidate_casts(subject, std::iter::once(&term));
        Ok(removed)
    }

    pub(crate) fn clear_property(&self, subject: &Term, predicate: &Iri) -> Result<usize> {
        let old_objects: Vec<Term> = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.mutable {
                return Err(TriplecastError::UnmutableSource(subject.to_string()));
            }
            let old = inner
                .graph
                .matching(Some(subject), Some(predicate), None)
                .into_iter()
                .map(|s| s.object().clone())
                .collect();
            inner.graph.remove_matching(Some(subject), Some(predicate), None);
            old
        };
        let removed = old_objects.len();
        self.invalidate_casts(subject, old_objects.iter());
        Ok(removed)
    }

    /// Drops arena entries for object terms whose cast may now be stale.
    fn invalidate_casts<'a>(&self, own_subject: &Term, terms: impl Iterator<Item = &'a Term>) {
        for term in terms {
            if term.is_resource() && term != own_subject {
                self.arena.remove(term);
            }
        }
    }

    /// Casts a resource term into a child source materialized from this
    /// source's own graph, reusing the family arena for instance stability.
    pub(crate) fn cast_child(&self, term: &Term, target: Option<&TargetType>) -> Result<Source> {
        if let Some(existing) = self.arena.get(term) {
            return Ok(Source::from_ref(existing, Arc::clone(&self.arena)));
        }
        let (graph, registry) = {
            let inner = self.inner.lock().unwrap();
            (inner.graph.clone(), inner.registry.clone())
        };
        let hint = match target {
            Some(t) => Some(t.resolve(registry.as_ref())?),
            None => None,
        };
        let child = materialize::build_source(
            &graph,
            term,
            hint,
            registry,
            Some(Arc::clone(&self.inner)),
            &self.arena,
        )?;
        Ok(Source::from_ref(child, Arc::clone(&self.arena)))
    }

    // ---- raw statements ----

    pub fn insert(&self, statement: Statement) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.mutable {
            return Err(TriplecastError::UnmutableSource(
                inner
                    .subject
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            ));
        }
        Ok(inner.graph.insert(statement))
    }

    pub fn delete(&self, statement: &Statement) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.mutable {
            return Err(TriplecastError::UnmutableSource(
                inner
                    .subject
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            ));
        }
        Ok(inner.graph.remove(statement))
    }

    /// Empties the owned graph without touching any backing store.
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.mutable {
            return Err(TriplecastError::UnmutableSource(
                inner
                    .subject
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            ));
        }
        inner.graph.clear();
        Ok(())
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.inner.lock().unwrap().graph.statements()
    }

    pub fn statement_count(&self) -> usize {
        self.inner.lock().unwrap().graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().graph.is_empty()
    }

    // ---- mutability ----

    /// Marks the source immutable: property writes, direct insertion, and
    /// use as a persistence target are rejected from here on.
    pub fn freeze(&self) {
        self.inner.lock().unwrap().mutable = false;
    }

    pub fn is_mutable(&self) -> bool {
        self.inner.lock().unwrap().mutable
    }

    // ---- hooks and validation ----

    /// Registers a hook run at the start of every persist, before anything
    /// is written. Hooks may mutate the source; what they write is what gets
    /// persisted.
    pub fn on_persist(&self, hook: impl Fn(&Source) + Send + Sync + 'static) {
        self.inner.lock().unwrap().hooks.push(Arc::new(hook));
    }

    pub fn set_validator(&self, validator: impl Fn(&Source) -> bool + Send + Sync + 'static) {
        self.inner.lock().unwrap().validator = Some(Arc::new(validator));
    }

    /// True when no validator is installed or the installed one accepts.
    pub fn is_valid(&self) -> bool {
        let validator = self.inner.lock().unwrap().validator.clone();
        validator.is_none_or(|v| (*v)(self))
    }

    // ---- attributes view ----

    /// A read-only JSON view of the subject's statements: declared
    /// properties keyed by name, everything else keyed by raw predicate
    /// IRI, plus an `id` entry for the subject itself. Resource objects
    /// nest recursively; a subject met twice renders as its term string, so
    /// cyclic graphs produce finite output.
    pub fn attributes(&self) -> Result<serde_json::Value> {
        let mut seen = BTreeSet::new();
        self.attributes_bounded(&mut seen)
    }

    fn attributes_bounded(&self, seen: &mut BTreeSet<Term>) -> Result<serde_json::Value> {
        let subject = self.rdf_subject();
        seen.insert(subject.clone());
        let (statements, schema) = {
            let inner = self.inner.lock().unwrap();
            (
                inner.graph.matching(Some(&subject), None, None),
                Arc::clone(&inner.schema),
            )
        };
        let mut grouped: BTreeMap<Iri, Vec<Term>> = BTreeMap::new();
        for statement in statements {
            let (_, predicate, object) = statement.into_parts();
            grouped.entry(predicate).or_default().push(object);
        }
        let mut map = serde_json::Map::new();
        for (predicate, objects) in grouped {
            let config = schema.property_for_predicate(&predicate);
            let key = config
                .as_ref()
                .map(|c| c.name().to_string())
                .unwrap_or_else(|| predicate.as_str().to_string());
            let mut rendered = Vec::with_capacity(objects.len());
            for object in objects {
                match &object {
                    Term::Literal(literal) => rendered.push(Value::from_literal(literal).to_json()),
                    resource => {
                        let cast = config.as_ref().is_none_or(|c| c.cast());
                        if !cast || seen.contains(resource) {
                            rendered.push(serde_json::Value::String(term_id(resource)));
                        } else {
                            let child = self
                                .cast_child(resource, config.as_ref().and_then(|c| c.target()))?;
                            rendered.push(child.attributes_bounded(seen)?);
                        }
                    }
                }
            }
            map.insert(key, serde_json::Value::Array(rendered));
        }
        map.insert("id".to_string(), serde_json::Value::String(term_id(&subject)));
        Ok(serde_json::Value::Object(map))
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::new()
    }
}

/// Subject equality. Two handles onto the same source are always equal;
/// otherwise both must have subjects and the subjects must match.
impl PartialEq for Source {
    fn eq(&self, other: &Source) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let mine = self.inner.lock().unwrap().subject.clone();
        let theirs = other.inner.lock().unwrap().subject.clone();
        matches!((mine, theirs), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("Source")
            .field("subject", &inner.subject)
            .field("schema", &inner.schema.name())
            .field("statements", &inner.graph.len())
            .finish()
    }
}

impl serde::Serialize for Source {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match self.attributes() {
            Ok(json) => json.serialize(serializer),
            Err(e) => Err(<S::Error as serde::ser::Error>::custom(e.to_string())),
        }
    }
}

fn term_id(term: &Term) -> String {
    match term {
        Term::Iri(iri) => iri.as_str().to_string(),
        other => other.to_string(),
    }
}

impl SchemaRegistry {
    /// Constructs a source of a registered type: the type's `rdf:type`
    /// statements are stamped into the graph under a freshly minted subject,
    /// and the schema's configured repository becomes the persistence
    /// target.
    pub fn create(self: &Arc<Self>, type_name: &str) -> Result<Source> {
        let schema = self.get(type_name).ok_or_else(|| {
            TriplecastError::InvalidDeclaration(format!(
                "source type '{}' is not registered",
                type_name
            ))
        })?;
        let source = Source::with_parts(None, Arc::clone(&schema), Some(Arc::clone(self)));
        let subject = source.rdf_subject();
        {
            let mut inner = source.inner.lock().unwrap();
            for iri in schema.all_types() {
                inner
                    .graph
                    .insert(Statement::new(subject.clone(), rdf::TYPE.clone(), Term::Iri(iri)));
            }
        }
        Ok(source)
    }

    /// Typed construction with an identity up front. Short identifiers
    /// resolve against the type's base URI; the already-stamped type
    /// statements are rewritten onto the assigned subject.
    pub fn create_with_subject(
        self: &Arc<Self>,
        type_name: &str,
        subject: impl Into<SubjectArg>,
    ) -> Result<Source> {
        let source = self.create(type_name)?;
        source.set_subject(subject)?;
        Ok(source)
    }
}
