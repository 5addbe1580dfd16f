//! SQLite persistence for named repositories. One database file holds any
//! number of repositories; saving a name erases its stored rows and writes
//! the current graph in full, so the database always mirrors the last save.
//! Statements are prepared once per connection and reused.

use std::sync::Arc;

use rusqlite::{params, Connection, Error as SqlError, Statement as SqlStatement};
use tracing::debug;

use crate::error::{Result, TriplecastError};
use crate::graph::Graph;
use crate::repository::{self, Repository};
use crate::term::{BlankNode, Iri, Literal, Statement, Term};

// Kind tags stored alongside each term column.
const KIND_IRI: i64 = 0;
const KIND_BLANK: i64 = 1;
const KIND_LITERAL: i64 = 2;

fn term_columns(term: &Term) -> (String, i64, String, String) {
    match term {
        Term::Iri(iri) => (iri.as_str().to_owned(), KIND_IRI, String::new(), String::new()),
        Term::Blank(blank) => (blank.id().to_owned(), KIND_BLANK, String::new(), String::new()),
        Term::Literal(literal) => (
            literal.lexical().to_owned(),
            KIND_LITERAL,
            literal.language().unwrap_or("").to_owned(),
            literal.datatype().as_str().to_owned(),
        ),
    }
}

fn term_from_columns(text: String, kind: i64, language: String, datatype: String) -> Result<Term> {
    match kind {
        KIND_IRI => Ok(Term::Iri(Iri::new_unchecked(text))),
        KIND_BLANK => Ok(Term::Blank(BlankNode::new(text))),
        KIND_LITERAL => {
            if language.is_empty() {
                Ok(Term::Literal(Literal::new_typed(text, Iri::new_unchecked(datatype))))
            } else {
                Ok(Term::Literal(Literal::new_lang(text, language)))
            }
        }
        other => Err(TriplecastError::Persistence(format!(
            "unknown term kind {} in stored statement",
            other
        ))),
    }
}

// ------------- Persistence -------------
pub struct GraphStore<'db> {
    pub db: &'db Connection,
    // Adders
    pub add_repository: SqlStatement<'db>,
    pub add_statement: SqlStatement<'db>,
    // Erasers
    pub delete_repository: SqlStatement<'db>,
    pub delete_statements: SqlStatement<'db>,
    // Readers
    pub get_repository: SqlStatement<'db>,
    pub get_statements: SqlStatement<'db>,
    pub all_repositories: SqlStatement<'db>,
}
impl<'db> GraphStore<'db> {
    pub fn new<'connection>(connection: &'connection Connection) -> Result<GraphStore<'connection>> {
        // The "STRICT" keyword introduced in 3.37.0 breaks JDBC connections, which makes
        // debugging using an external tool like DBeaver impossible
        connection.execute_batch(
            "
            create table if not exists Repository (
                Repository text not null,
                Mutable integer not null,
                constraint unique_and_referenceable_Repository primary key (
                    Repository
                )
            );-- STRICT;
            create table if not exists RepositoryStatement (
                Repository text not null,
                Subject text not null,
                SubjectKind integer not null,
                SubjectLanguage text not null,
                SubjectDatatype text not null,
                Predicate text not null,
                Object text not null,
                ObjectKind integer not null,
                ObjectLanguage text not null,
                ObjectDatatype text not null,
                constraint Statement_in_Repository foreign key (
                    Repository
                ) references Repository(Repository),
                constraint unique_RepositoryStatement unique (
                    Repository,
                    Subject,
                    SubjectKind,
                    SubjectLanguage,
                    SubjectDatatype,
                    Predicate,
                    Object,
                    ObjectKind,
                    ObjectLanguage,
                    ObjectDatatype
                )
            );-- STRICT;
            ",
        )?;
        Ok(GraphStore {
            db: connection,
            add_repository: connection.prepare(
                "
                insert into Repository (
                    Repository,
                    Mutable
                ) values (?, ?)
            ",
            )?,
            add_statement: connection.prepare(
                "
                insert or ignore into RepositoryStatement (
                    Repository,
                    Subject,
                    SubjectKind,
                    SubjectLanguage,
                    SubjectDatatype,
                    Predicate,
                    Object,
                    ObjectKind,
                    ObjectLanguage,
                    ObjectDatatype
                ) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            )?,
            delete_repository: connection.prepare(
                "
                delete from Repository
                    where Repository = ?
            ",
            )?,
            delete_statements: connection.prepare(
                "
                delete from RepositoryStatement
                    where Repository = ?
            ",
            )?,
            get_repository: connection.prepare(
                "
                select Mutable
                    from Repository
                    where Repository = ?
            ",
            )?,
            get_statements: connection.prepare(
                "
                select Subject,
                        SubjectKind,
                        SubjectLanguage,
                        SubjectDatatype,
                        Predicate,
                        Object,
                        ObjectKind,
                        ObjectLanguage,
                        ObjectDatatype
                    from RepositoryStatement
                    where Repository = ?
            ",
            )?,
            all_repositories: connection.prepare(
                "
                select Repository, Mutable
                    from Repository
            ",
            )?,
        })
    }

    /// Erase the stored rows for `name` and write the repository's current
    /// graph in full. Returns the number of statements written.
    pub fn save_repository(&mut self, name: &str, repository: &Repository) -> Result<usize> {
        let snapshot = repository.snapshot();
        self.delete_statements.execute(params![name])?;
        self.delete_repository.execute(params![name])?;
        self.add_repository
            .execute(params![name, repository.is_mutable()])?;
        let mut stored = 0;
        for statement in snapshot.iter() {
            let (subject, subject_kind, subject_language, subject_datatype) =
                term_columns(statement.subject());
            let (object, object_kind, object_language, object_datatype) =
                term_columns(statement.object());
            self.add_statement.execute(params![
                name,
                subject,
                subject_kind,
                subject_language,
                subject_datatype,
                statement.predicate().as_str(),
                object,
                object_kind,
                object_language,
                object_datatype,
            ])?;
            stored += 1;
        }
        debug!(repository = name, statements = stored, "saved repository");
        Ok(stored)
    }

    /// Load a stored repository without touching the registry. `Ok(None)`
    /// means no repository by that name has been saved.
    pub fn load_repository(&mut self, name: &str) -> Result<Option<Arc<Repository>>> {
        let mutable = match self
            .get_repository
            .query_row::<bool, _, _>(params![name], |row| row.get(0))
        {
            Ok(mutable) => mutable,
            Err(SqlError::QueryReturnedNoRows) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let graph = self.read_statements(name)?;
        let loaded = graph.len();
        let repository = if mutable {
            Arc::new(Repository::with_graph(graph))
        } else {
            Arc::new(Repository::read_only(graph))
        };
        debug!(repository = name, statements = loaded, "loaded repository");
        Ok(Some(repository))
    }

    /// Load every stored repository and register each under its stored name.
    /// Returns the restored names in sorted order.
    pub fn restore_repositories(&mut self) -> Result<Vec<String>> {
        let mut stored = Vec::new();
        {
            let mut rows = self.all_repositories.query([])?;
            while let Some(row) = rows.next()? {
                stored.push((row.get::<_, String>(0)?, row.get::<_, bool>(1)?));
            }
        }
        let mut restored = Vec::new();
        for (name, mutable) in stored {
            let graph = self.read_statements(&name)?;
            let repository = if mutable {
                Arc::new(Repository::with_graph(graph))
            } else {
                Arc::new(Repository::read_only(graph))
            };
            repository::register(name.as_str(), repository);
            restored.push(name);
        }
        restored.sort();
        debug!(
            repositories = restored.len(),
            "restored registered repositories"
        );
        Ok(restored)
    }

    /// Save every currently registered repository. Returns how many were
    /// written.
    pub fn save_registered(&mut self) -> Result<usize> {
        let mut saved = 0;
        for name in repository::names() {
            let repository = repository::get(&name)?;
            self.save_repository(&name, &repository)?;
            saved += 1;
        }
        Ok(saved)
    }

    fn read_statements(&mut self, name: &str) -> Result<Graph> {
        let mut graph = Graph::new();
        let mut rows = self.get_statements.query(params![name])?;
        while let Some(row) = rows.next()? {
            let subject =
                term_from_columns(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)?;
            let predicate = Iri::new_unchecked(row.get::<_, String>(4)?);
            let object =
                term_from_columns(row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?)?;
            graph.insert(Statement::new(subject, predicate, object));
        }
        Ok(graph)
    }
}
