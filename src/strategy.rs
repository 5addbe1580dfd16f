//! Persistence strategies. Every source carries exactly one: either it
//! writes to a named (or private scratch) repository, or it projects onto a
//! parent source's graph. The kind is fixed for the source's lifetime; only
//! the target inside the kind may be rebound. This module also owns the
//! ancestor walk that resolves a parent chain to its root.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{Result, TriplecastError};
use crate::repository::{self, Repository};
use crate::schema::SourceSchema;
use crate::source::{Source, SourceInner, SourceRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    Repository,
    Parent,
}

pub(crate) enum Strategy {
    Repository {
        /// Registry name, resolved fresh on every operation so rebinding a
        /// name redirects existing sources. `None` falls back to a private
        /// scratch repository created on first use.
        name: Option<String>,
        scratch: Option<Arc<Repository>>,
        persisted: bool,
    },
    Parent {
        parent: Option<SourceRef>,
        persisted: bool,
    },
}

impl Strategy {
    pub(crate) fn for_schema(schema: &SourceSchema) -> Strategy {
        Strategy::Repository {
            name: schema.repository().map(str::to_string),
            scratch: None,
            persisted: false,
        }
    }

    pub(crate) fn for_parent(parent: SourceRef) -> Strategy {
        Strategy::Parent {
            parent: Some(parent),
            persisted: false,
        }
    }

    pub(crate) fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Repository { .. } => StrategyKind::Repository,
            Strategy::Parent { .. } => StrategyKind::Parent,
        }
    }

    pub(crate) fn set_persisted(&mut self, value: bool) {
        match self {
            Strategy::Repository { persisted, .. } => *persisted = value,
            Strategy::Parent { persisted, .. } => *persisted = value,
        }
    }

    pub(crate) fn parent_ref(&self) -> Option<SourceRef> {
        match self {
            Strategy::Parent { parent, .. } => parent.clone(),
            Strategy::Repository { .. } => None,
        }
    }
}

enum RepositoryTarget {
    Named(String),
    Scratch(Arc<Repository>),
}

fn parent_of(inner: &SourceRef) -> Option<SourceRef> {
    inner.lock().unwrap().strategy.parent_ref()
}

impl Source {
    pub fn strategy_kind(&self) -> StrategyKind {
        self.inner.lock().unwrap().strategy.kind()
    }

    /// Persists without validation: hooks run, then the backing store is
    /// erased of this subject's statements and the full owned graph is
    /// written.
    pub fn persist(&self) -> Result<bool> {
        self.persist_inner(false)
    }

    /// Validating persist. A failing validator returns `Ok(false)` and
    /// writes nothing.
    pub fn save(&self) -> Result<bool> {
        self.persist_inner(true)
    }

    fn persist_inner(&self, validating: bool) -> Result<bool> {
        let hooks = self.inner.lock().unwrap().hooks.clone();
        for hook in hooks {
            (*hook)(self);
        }
        if validating && !self.is_valid() {
            debug!(subject = ?self.subject(), "save rejected by validator");
            return Ok(false);
        }
        let subject = self.rdf_subject();
        match self.strategy_kind() {
            StrategyKind::Repository => {
                let repository = self.repository_target()?;
                let graph = self.inner.lock().unwrap().graph.clone();
                repository.remove_subject(&subject)?;
                let written = repository.insert_all(graph)?;
                self.inner.lock().unwrap().strategy.set_persisted(true);
                debug!(subject = %subject, statements = written, "persisted to repository");
            }
            StrategyKind::Parent => {
                let final_parent = self.final_parent_ref()?;
                let graph = self.inner.lock().unwrap().graph.clone();
                if Arc::ptr_eq(&final_parent, &self.inner) {
                    // self-parented chain root: its own graph is the store
                    let mut inner = self.inner.lock().unwrap();
                    inner.graph.remove_matching(Some(&subject), None, None);
                    inner.graph.extend(graph);
                    inner.strategy.set_persisted(true);
                } else {
                    let written = graph.len();
                    {
                        let mut parent_inner = final_parent.lock().unwrap();
                        if !parent_inner.mutable {
                            return Err(TriplecastError::UnmutableParent(
                                subject_label(&parent_inner),
                            ));
                        }
                        parent_inner.graph.remove_matching(Some(&subject), None, None);
                        parent_inner.graph.extend(graph);
                    }
                    self.inner.lock().unwrap().strategy.set_persisted(true);
                    debug!(subject = %subject, statements = written, "persisted to final parent");
                }
            }
        }
        Ok(true)
    }

    /// Replaces the owned graph with the subject's bounded description from
    /// the backing store, discarding unsaved local state.
    pub fn reload(&self) -> Result<bool> {
        let subject = self.rdf_subject();
        let description = match self.strategy_kind() {
            StrategyKind::Repository => {
                let repository = self.repository_target()?;
                repository.bounded_description(&subject)
            }
            StrategyKind::Parent => {
                let final_parent = self.final_parent_ref()?;
                if Arc::ptr_eq(&final_parent, &self.inner) {
                    self.inner.lock().unwrap().graph.bounded_description(&subject)
                } else {
                    final_parent
                        .lock()
                        .unwrap()
                        .graph
                        .bounded_description(&subject)
                }
            }
        };
        let loaded = description.len();
        {
            let mut inner = self.inner.lock().unwrap();
            inner.graph = description;
            if loaded > 0 {
                inner.strategy.set_persisted(true);
            }
        }
        debug!(subject = %subject, statements = loaded, "reloaded");
        Ok(true)
    }

    /// Empties the owned graph and removes this subject's statements from
    /// the backing store. Parent-projected sources additionally have the
    /// direct parent drop the child from its own relation values. Unrelated
    /// subjects' statements are untouched even where this subject appears
    /// as their object.
    pub fn destroy(&self) -> Result<bool> {
        let subject = self.rdf_subject();
        match self.strategy_kind() {
            StrategyKind::Repository => {
                let repository = self.repository_target()?;
                let removed = repository.remove_subject(&subject)?;
                debug!(subject = %subject, statements = removed, "destroyed from repository");
            }
            StrategyKind::Parent => {
                if let Ok(final_parent) = self.final_parent_ref() {
                    if !Arc::ptr_eq(&final_parent, &self.inner) {
                        let mut parent_inner = final_parent.lock().unwrap();
                        if !parent_inner.mutable {
                            return Err(TriplecastError::UnmutableParent(
                                subject_label(&parent_inner),
                            ));
                        }
                        parent_inner.graph.remove_matching(Some(&subject), None, None);
                    }
                }
                let direct = self.inner.lock().unwrap().strategy.parent_ref();
                if let Some(direct) = direct {
                    if !Arc::ptr_eq(&direct, &self.inner) {
                        let mut parent_inner = direct.lock().unwrap();
                        if !parent_inner.mutable {
                            return Err(TriplecastError::UnmutableParent(
                                subject_label(&parent_inner),
                            ));
                        }
                        parent_inner.graph.remove_matching(Some(&subject), None, None);
                        parent_inner.graph.remove_matching(None, None, Some(&subject));
                    }
                }
                debug!(subject = %subject, "destroyed from parent");
            }
        }
        {
            let mut inner = self.inner.lock().unwrap();
            inner.graph.clear();
            inner.strategy.set_persisted(false);
            inner.destroyed = true;
        }
        self.arena.remove(&subject);
        Ok(true)
    }

    /// Whether the source counts as persisted. Repository-backed sources
    /// read their local flag; parent-projected sources are persisted only
    /// while their own flag and the whole resolved chain's flags hold. The
    /// chain is walked live on every call.
    pub fn persisted(&self) -> bool {
        let (local, parent) = {
            let inner = self.inner.lock().unwrap();
            match &inner.strategy {
                Strategy::Repository { persisted, .. } => return *persisted,
                Strategy::Parent { persisted, parent } => (*persisted, parent.clone()),
            }
        };
        if !local {
            return false;
        }
        let Some(first) = parent else {
            return false;
        };
        let mut visited: Vec<*const Mutex<SourceInner>> = vec![Arc::as_ptr(&self.inner)];
        let mut current = first;
        loop {
            if visited.contains(&Arc::as_ptr(&current)) {
                // cycle: every node on the way carried its flag
                return true;
            }
            visited.push(Arc::as_ptr(&current));
            let (flag, next) = {
                let inner = current.lock().unwrap();
                match &inner.strategy {
                    Strategy::Repository { persisted, .. } => (*persisted, None),
                    Strategy::Parent { persisted, parent } => (*persisted, parent.clone()),
                }
            };
            if !flag {
                return false;
            }
            match next {
                Some(next_ref) => current = next_ref,
                None => return true,
            }
        }
    }

    pub fn destroyed(&self) -> bool {
        self.inner.lock().unwrap().destroyed
    }

    /// Rebinds the parent target. The candidate must be mutable, and the
    /// source must already be parent-projected.
    pub fn set_parent(&self, parent: &Source) -> Result<()> {
        if !parent.is_mutable() {
            return Err(TriplecastError::UnmutableParent(
                parent.rdf_subject().to_string(),
            ));
        }
        let mut inner = self.inner.lock().unwrap();
        match &mut inner.strategy {
            Strategy::Parent { parent: slot, .. } => {
                *slot = Some(Arc::clone(&parent.inner));
                Ok(())
            }
            Strategy::Repository { .. } => Err(TriplecastError::StrategyMismatch(
                "repository-backed source cannot be given a parent".to_string(),
            )),
        }
    }

    /// Rebinds the repository target by name. The name is resolved on each
    /// persistence operation, never cached.
    pub fn set_repository(&self, name: impl Into<String>) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        match &mut inner.strategy {
            Strategy::Repository { name: slot, .. } => {
                *slot = Some(name.into());
                Ok(())
            }
            Strategy::Parent { .. } => Err(TriplecastError::StrategyMismatch(
                "parent-projected source cannot be pointed at a repository".to_string(),
            )),
        }
    }

    pub fn parent(&self) -> Option<Source> {
        parent_of(&self.inner).map(|inner| Source::from_ref(inner, Arc::clone(&self.arena)))
    }

    /// The root of the parent chain. A self-parented source roots its own
    /// chain; a chain that loops back terminates at the node holding the
    /// back reference.
    pub fn final_parent(&self) -> Result<Source> {
        self.final_parent_ref()
            .map(|inner| Source::from_ref(inner, Arc::clone(&self.arena)))
    }

    /// Every ancestor from the direct parent up to the chain root. Fails
    /// with `NilParent` when no parent is configured.
    pub fn ancestors(&self) -> Result<Vec<Source>> {
        let chain = self.chain_refs();
        if chain.is_empty() {
            return Err(TriplecastError::NilParent(
                self.subject().map(|t| t.to_string()).unwrap_or_default(),
            ));
        }
        Ok(chain
            .into_iter()
            .map(|inner| Source::from_ref(inner, Arc::clone(&self.arena)))
            .collect())
    }

    fn final_parent_ref(&self) -> Result<SourceRef> {
        let direct = parent_of(&self.inner).ok_or_else(|| {
            TriplecastError::NilParent(
                self.subject().map(|t| t.to_string()).unwrap_or_default(),
            )
        })?;
        let mut visited: Vec<*const Mutex<SourceInner>> =
            vec![Arc::as_ptr(&self.inner), Arc::as_ptr(&direct)];
        let mut current = direct;
        loop {
            match parent_of(&current) {
                None => return Ok(current),
                Some(next) => {
                    if visited.contains(&Arc::as_ptr(&next)) {
                        return Ok(current);
                    }
                    visited.push(Arc::as_ptr(&next));
                    current = next;
                }
            }
        }
    }

    /// The live parent chain, direct parent first, stopping before any
    /// repetition.
    pub(crate) fn chain_refs(&self) -> Vec<SourceRef> {
        let mut chain = Vec::new();
        let mut visited: Vec<*const Mutex<SourceInner>> = Vec::new();
        let mut current = match parent_of(&self.inner) {
            Some(parent) => parent,
            None => return chain,
        };
        loop {
            if visited.contains(&Arc::as_ptr(&current)) {
                break;
            }
            visited.push(Arc::as_ptr(&current));
            chain.push(Arc::clone(&current));
            match parent_of(&current) {
                Some(next) => current = next,
                None => break,
            }
        }
        chain
    }

    fn repository_target(&self) -> Result<Arc<Repository>> {
        let target = {
            let mut inner = self.inner.lock().unwrap();
            match &mut inner.strategy {
                Strategy::Repository {
                    name: Some(name), ..
                } => RepositoryTarget::Named(name.clone()),
                Strategy::Repository {
                    name: None,
                    scratch,
                    ..
                } => RepositoryTarget::Scratch(Arc::clone(
                    scratch.get_or_insert_with(|| Arc::new(Repository::new())),
                )),
                Strategy::Parent { .. } => {
                    return Err(TriplecastError::StrategyMismatch(
                        "parent-projected source has no repository".to_string(),
                    ));
                }
            }
        };
        match target {
            RepositoryTarget::Named(name) => repository::get(&name),
            RepositoryTarget::Scratch(repo) => Ok(repo),
        }
    }
}

fn subject_label(inner: &SourceInner) -> String {
    inner
        .subject
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_default()
}
