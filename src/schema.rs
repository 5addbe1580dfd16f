//! Source type descriptors and their property declarations. A schema maps
//! property names to predicates with per-property casting and cardinality
//! behavior; schemas inherit declarations through a parent chain and are
//! collected in a registry that also serves type matching during
//! materialization.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, LazyLock, Mutex};

use bimap::BiMap;
use seahash::SeaHasher;

use crate::error::{Result, TriplecastError};
use crate::term::Iri;

pub type SchemaHasher = BuildHasherDefault<SeaHasher>;

/// Where a cast property points: a schema in hand, or a schema name resolved
/// lazily at use time so mutually referential types can be declared.
#[derive(Clone)]
pub enum TargetType {
    Schema(Arc<SourceSchema>),
    Named(String),
}

impl TargetType {
    pub(crate) fn resolve(&self, registry: Option<&Arc<SchemaRegistry>>) -> Result<Arc<SourceSchema>> {
        match self {
            TargetType::Schema(schema) => Ok(Arc::clone(schema)),
            TargetType::Named(name) => registry
                .and_then(|r| r.get(name))
                .ok_or_else(|| {
                    TriplecastError::InvalidDeclaration(format!(
                        "target type '{}' is not registered",
                        name
                    ))
                }),
        }
    }
}

impl fmt::Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Schema(schema) => write!(f, "Schema({})", schema.name()),
            TargetType::Named(name) => write!(f, "Named({})", name),
        }
    }
}

/// One property declaration.
pub struct PropertyConfig {
    name: String,
    predicate: Iri,
    target: Option<TargetType>,
    cast: bool,
    multivalue: bool,
}

impl PropertyConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> &Iri {
        &self.predicate
    }

    pub fn target(&self) -> Option<&TargetType> {
        self.target.as_ref()
    }

    pub fn cast(&self) -> bool {
        self.cast
    }

    pub fn multivalue(&self) -> bool {
        self.multivalue
    }
}

impl fmt::Debug for PropertyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyConfig")
            .field("name", &self.name)
            .field("predicate", &self.predicate)
            .field("target", &self.target)
            .field("cast", &self.cast)
            .field("multivalue", &self.multivalue)
            .finish()
    }
}

/// Declaration options. Defaults: no target, cast on, multivalued.
pub struct PropertyOptions {
    pub target: Option<TargetType>,
    pub cast: bool,
    pub multivalue: bool,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self {
            target: None,
            cast: true,
            multivalue: true,
        }
    }
}

#[derive(Default)]
struct PropertyTable {
    by_name: HashMap<String, Arc<PropertyConfig>, SchemaHasher>,
    predicates: BiMap<String, Iri>,
}

static BASE: LazyLock<Arc<SourceSchema>> = LazyLock::new(|| {
    Arc::new(SourceSchema {
        name: "Source".to_string(),
        types: Vec::new(),
        base_uri: None,
        repository: None,
        parent: None,
        is_base: true,
        properties: Mutex::new(PropertyTable::default()),
    })
});

/// A named source type: its `rdf:type` IRIs, an optional base URI for
/// resolving short identifiers, an optional configured repository, an
/// optional parent whose declarations it inherits, and its own append-only
/// property table.
pub struct SourceSchema {
    name: String,
    types: Vec<Iri>,
    base_uri: Option<String>,
    repository: Option<String>,
    parent: Option<Arc<SourceSchema>>,
    is_base: bool,
    properties: Mutex<PropertyTable>,
}

impl SourceSchema {
    /// The distinguished abstract base every untyped source carries.
    /// Declaring properties on it is an error.
    pub fn base() -> Arc<SourceSchema> {
        Arc::clone(&BASE)
    }

    pub fn build(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            types: Vec::new(),
            base_uri: None,
            repository: None,
            parent: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type IRIs declared on this schema alone.
    pub fn types(&self) -> &[Iri] {
        &self.types
    }

    /// Own and inherited type IRIs, deduplicated.
    pub fn all_types(&self) -> Vec<Iri> {
        let mut types = match &self.parent {
            Some(parent) => parent.all_types(),
            None => Vec::new(),
        };
        for iri in &self.types {
            if !types.contains(iri) {
                types.push(iri.clone());
            }
        }
        types
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    pub fn parent(&self) -> Option<Arc<SourceSchema>> {
        self.parent.as_ref().map(Arc::clone)
    }

    pub fn is_base(&self) -> bool {
        self.is_base
    }

    /// Number of ancestors above this schema.
    pub fn depth(&self) -> usize {
        match &self.parent {
            Some(parent) => parent.depth() + 1,
            None => 0,
        }
    }

    /// Declares a property with default options.
    pub fn declare(&self, name: impl Into<String>, predicate: Iri) -> Result<()> {
        self.declare_with(name, predicate, PropertyOptions::default())
    }

    /// Declares a property. Entries are append-only: a name may be
    /// redeclared (the newer entry wins) but never removed. When two names
    /// share a predicate, reverse lookup favors the latest declaration.
    pub fn declare_with(
        &self,
        name: impl Into<String>,
        predicate: Iri,
        options: PropertyOptions,
    ) -> Result<()> {
        if self.is_base {
            return Err(TriplecastError::InvalidDeclaration(
                "properties cannot be declared on the base schema".to_string(),
            ));
        }
        let name = name.into();
        let mut table = self.properties.lock().unwrap();
        table.predicates.insert(name.clone(), predicate.clone());
        table.by_name.insert(
            name.clone(),
            Arc::new(PropertyConfig {
                name,
                predicate,
                target: options.target,
                cast: options.cast,
                multivalue: options.multivalue,
            }),
        );
        Ok(())
    }

    /// Looks up a property by name, walking the parent chain. Own entries
    /// shadow inherited ones.
    pub fn property(&self, name: &str) -> Option<Arc<PropertyConfig>> {
        if let Some(config) = self.properties.lock().unwrap().by_name.get(name) {
            return Some(Arc::clone(config));
        }
        self.parent.as_ref().and_then(|p| p.property(name))
    }

    /// Reverse lookup by predicate, serving materialization and the
    /// attributes view.
    pub fn property_for_predicate(&self, predicate: &Iri) -> Option<Arc<PropertyConfig>> {
        {
            let table = self.properties.lock().unwrap();
            if let Some(name) = table.predicates.get_by_right(predicate) {
                if let Some(config) = table.by_name.get(name) {
                    return Some(Arc::clone(config));
                }
            }
        }
        self.parent
            .as_ref()
            .and_then(|p| p.property_for_predicate(predicate))
    }

    /// Every visible property, inherited entries included, sorted by name.
    pub fn properties(&self) -> Vec<Arc<PropertyConfig>> {
        let mut merged: HashMap<String, Arc<PropertyConfig>, SchemaHasher> = HashMap::default();
        self.collect_properties(&mut merged);
        let mut all: Vec<Arc<PropertyConfig>> = merged.into_values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    fn collect_properties(&self, into: &mut HashMap<String, Arc<PropertyConfig>, SchemaHasher>) {
        if let Some(parent) = &self.parent {
            parent.collect_properties(into);
        }
        for (name, config) in self.properties.lock().unwrap().by_name.iter() {
            into.insert(name.clone(), Arc::clone(config));
        }
    }

    pub fn property_count(&self) -> usize {
        self.properties().len()
    }

    /// Resolves a short identifier against the schema's base URI. Absolute
    /// IRIs (and the null relative IRI) pass through unchanged.
    pub fn resolve_id(&self, id: &str) -> Result<Iri> {
        match Iri::new(id) {
            Ok(iri) => Ok(iri),
            Err(invalid) => match &self.base_uri {
                Some(base) => {
                    if base.ends_with('/') || base.ends_with('#') {
                        Iri::new(format!("{}{}", base, id))
                    } else {
                        Iri::new(format!("{}/{}", base, id))
                    }
                }
                None => Err(invalid),
            },
        }
    }
}

impl fmt::Debug for SourceSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSchema")
            .field("name", &self.name)
            .field("types", &self.types)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .finish()
    }
}

pub struct SchemaBuilder {
    name: String,
    types: Vec<Iri>,
    base_uri: Option<String>,
    repository: Option<String>,
    parent: Option<Arc<SourceSchema>>,
}

impl SchemaBuilder {
    pub fn rdf_type(mut self, iri: Iri) -> Self {
        self.types.push(iri);
        self
    }

    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    /// Names the repository this type persists into by default.
    pub fn repository(mut self, name: impl Into<String>) -> Self {
        self.repository = Some(name.into());
        self
    }

    pub fn parent(mut self, parent: &Arc<SourceSchema>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn finish(self) -> Arc<SourceSchema> {
        Arc::new(SourceSchema {
            name: self.name,
            types: self.types,
            base_uri: self.base_uri,
            repository: self.repository,
            parent: self.parent,
            is_base: false,
            properties: Mutex::new(PropertyTable::default()),
        })
    }
}

/// A name-keyed collection of schemas. Named target types resolve against
/// it, and the materializer asks it for the most specific type matching a
/// subject's `rdf:type` terms.
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: Mutex<HashMap<String, Arc<SourceSchema>, SchemaHasher>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, schema: Arc<SourceSchema>) {
        self.schemas
            .lock()
            .unwrap()
            .insert(schema.name().to_string(), schema);
    }

    pub fn get(&self, name: &str) -> Option<Arc<SourceSchema>> {
        self.schemas.lock().unwrap().get(name).map(Arc::clone)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.lock().unwrap().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.schemas.lock().unwrap().clear();
    }

    /// Picks the most specific registered schema whose own declared type
    /// IRIs intersect the given set. Inherited types do not match: a
    /// subject typed only with a parent's IRI materializes as the parent.
    /// Specificity is inheritance depth, then declared property count, then
    /// name, so selection is deterministic.
    pub fn schema_for_types(&self, types: &[Iri]) -> Option<Arc<SourceSchema>> {
        let mut candidates: Vec<Arc<SourceSchema>> = self
            .schemas
            .lock()
            .unwrap()
            .values()
            .filter(|schema| schema.types().iter().any(|t| types.contains(t)))
            .map(Arc::clone)
            .collect();
        candidates.sort_by(|a, b| {
            a.depth()
                .cmp(&b.depth())
                .then(a.property_count().cmp(&b.property_count()))
                .then(b.name().cmp(a.name()))
        });
        candidates.pop()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaRegistry({:?})", self.names())
    }
}
