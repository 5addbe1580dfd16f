//! Shared repositories and the process-wide registry binding them to names.
//! Sources hold repository *names* and resolve them here on every
//! persistence operation, so re-registering a name redirects everything
//! already pointing at it. The registry is not meant for uncoordinated
//! concurrent mutation; callers sequence access themselves.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, LazyLock, Mutex};

use seahash::SeaHasher;
use tracing::debug;

use crate::error::{Result, TriplecastError};
use crate::graph::Graph;
use crate::term::{Iri, Statement, Term};

pub type RepositoryHasher = BuildHasherDefault<SeaHasher>;

/// A statement store shared by any number of sources. A read-only
/// repository rejects every erase and insert.
#[derive(Debug)]
pub struct Repository {
    graph: Mutex<Graph>,
    mutable: bool,
}

impl Repository {
    pub fn new() -> Self {
        Self {
            graph: Mutex::new(Graph::new()),
            mutable: true,
        }
    }

    /// A mutable repository seeded with existing content.
    pub fn with_graph(graph: Graph) -> Self {
        Self {
            graph: Mutex::new(graph),
            mutable: true,
        }
    }

    /// A repository that can be read but never written.
    pub fn read_only(graph: Graph) -> Self {
        Self {
            graph: Mutex::new(graph),
            mutable: false,
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn len(&self) -> usize {
        self.graph.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.lock().unwrap().is_empty()
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.graph.lock().unwrap().contains(statement)
    }

    pub fn insert(&self, statement: Statement) -> Result<bool> {
        if !self.mutable {
            return Err(TriplecastError::UnmutableSource(
                "read-only repository".to_string(),
            ));
        }
        Ok(self.graph.lock().unwrap().insert(statement))
    }

    /// Inserts every statement, returning how many were new.
    pub fn insert_all(&self, statements: impl IntoIterator<Item = Statement>) -> Result<usize> {
        if !self.mutable {
            return Err(TriplecastError::UnmutableSource(
                "read-only repository".to_string(),
            ));
        }
        let mut graph = self.graph.lock().unwrap();
        let mut added = 0;
        for statement in statements {
            if graph.insert(statement) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Removes every statement with the given subject, returning how many
    /// went away. Statements merely mentioning the term as object stay.
    pub fn remove_subject(&self, subject: &Term) -> Result<usize> {
        if !self.mutable {
            return Err(TriplecastError::UnmutableSource(
                "read-only repository".to_string(),
            ));
        }
        Ok(self
            .graph
            .lock()
            .unwrap()
            .remove_matching(Some(subject), None, None))
    }

    pub fn subject_statements(&self, subject: &Term) -> Vec<Statement> {
        self.graph
            .lock()
            .unwrap()
            .matching(Some(subject), None, None)
    }

    pub fn bounded_description(&self, subject: &Term) -> Graph {
        self.graph.lock().unwrap().bounded_description(subject)
    }

    pub fn matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Statement> {
        self.graph.lock().unwrap().matching(subject, predicate, object)
    }

    /// A point-in-time copy of the whole store.
    pub fn snapshot(&self) -> Graph {
        self.graph.lock().unwrap().clone()
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: LazyLock<Mutex<HashMap<String, Arc<Repository>, RepositoryHasher>>> =
    LazyLock::new(|| Mutex::new(HashMap::default()));

/// Binds a repository to a name, replacing any previous binding.
pub fn register(name: impl Into<String>, repository: Arc<Repository>) {
    let name = name.into();
    debug!(repository = %name, "registered repository");
    REGISTRY.lock().unwrap().insert(name, repository);
}

/// Creates a fresh mutable repository, registers it, and hands it back.
pub fn add(name: impl Into<String>) -> Arc<Repository> {
    let repository = Arc::new(Repository::new());
    register(name, Arc::clone(&repository));
    repository
}

pub fn get(name: &str) -> Result<Arc<Repository>> {
    REGISTRY
        .lock()
        .unwrap()
        .get(name)
        .map(Arc::clone)
        .ok_or_else(|| TriplecastError::RepositoryNotFound(name.to_string()))
}

pub fn contains(name: &str) -> bool {
    REGISTRY.lock().unwrap().contains_key(name)
}

pub fn names() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.lock().unwrap().keys().cloned().collect();
    names.sort();
    names
}

/// Unbinds every name. Repositories stay alive for sources still holding
/// them through a resolved operation, but later resolutions fail.
pub fn clear() {
    REGISTRY.lock().unwrap().clear();
}
