//! An in-memory statement set with wildcard pattern matching. Backed by a
//! `BTreeSet`, so insertion deduplicates and enumeration is deterministic.

use std::collections::BTreeSet;
use std::fmt;

use crate::term::{Iri, Statement, Term};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    statements: BTreeSet<Statement>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a statement, returning `true` if it was not already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    /// Removes a statement, returning `true` if it was present.
    pub fn remove(&mut self, statement: &Statement) -> bool {
        self.statements.remove(statement)
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    /// Returns every statement matching the pattern, where `None` is a
    /// wildcard position.
    pub fn matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Statement> {
        self.statements
            .iter()
            .filter(|s| subject.is_none_or(|subj| s.subject() == subj))
            .filter(|s| predicate.is_none_or(|pred| s.predicate() == pred))
            .filter(|s| object.is_none_or(|obj| s.object() == obj))
            .cloned()
            .collect()
    }

    /// Removes every statement matching the pattern and returns how many
    /// were removed.
    pub fn remove_matching(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> usize {
        let doomed = self.matching(subject, predicate, object);
        for statement in &doomed {
            self.statements.remove(statement);
        }
        doomed.len()
    }

    /// Replaces `old` with `new` in every subject and object position,
    /// leaving statements that do not mention `old` untouched. Returns the
    /// number of statements rewritten.
    pub fn rewrite_term(&mut self, old: &Term, new: &Term) -> usize {
        let affected: Vec<Statement> = self
            .statements
            .iter()
            .filter(|s| s.subject() == old || s.object() == old)
            .cloned()
            .collect();
        for statement in &affected {
            self.statements.remove(statement);
            let (subject, predicate, object) = statement.clone().into_parts();
            let subject = if subject == *old { new.clone() } else { subject };
            let object = if object == *old { new.clone() } else { object };
            self.statements.insert(Statement::new(subject, predicate, object));
        }
        affected.len()
    }

    /// The distinct subject terms present in the graph.
    pub fn subjects(&self) -> BTreeSet<Term> {
        self.statements.iter().map(|s| s.subject().clone()).collect()
    }

    /// The statements describing `start`: its own statements plus,
    /// transitively, those of every resource reachable through object
    /// positions. Cycle-safe.
    pub fn bounded_description(&self, start: &Term) -> Graph {
        let mut seen: BTreeSet<Term> = BTreeSet::new();
        let mut queue = vec![start.clone()];
        let mut description = Graph::new();
        while let Some(term) = queue.pop() {
            if !seen.insert(term.clone()) {
                continue;
            }
            for statement in self.matching(Some(&term), None, None) {
                if statement.object().is_resource() && !seen.contains(statement.object()) {
                    queue.push(statement.object().clone());
                }
                description.insert(statement);
            }
        }
        description
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn clear(&mut self) {
        self.statements.clear();
    }
}

impl Extend<Statement> for Graph {
    fn extend<I: IntoIterator<Item = Statement>>(&mut self, iter: I) {
        self.statements.extend(iter);
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Statement;
    type IntoIter = std::collections::btree_set::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Statement;
    type IntoIter = std::collections::btree_set::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
