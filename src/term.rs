//! RDF-style terms: IRIs, blank nodes, literals, and the statements built
//! from them. Everything here is plain data with structural equality and a
//! total order, so statements can live in ordered sets.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, TriplecastError};
use crate::vocab::{rdf, xsd};

lazy_static! {
    // Absolute IRI: an RFC 3986 scheme followed by non-whitespace.
    static ref ABSOLUTE_IRI: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S*$").unwrap();
}

/// Fresh blank node labels come from a process-wide counter.
static BLANK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A validated IRI. The empty string is the null relative IRI, which is a
/// legal, distinct identity that sources may still be rebound away from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(String);

impl Iri {
    /// Parses an IRI, accepting any absolute IRI or the empty string.
    pub fn new(iri: impl Into<String>) -> Result<Self> {
        let iri = iri.into();
        if iri.is_empty() || ABSOLUTE_IRI.is_match(&iri) {
            Ok(Self(iri))
        } else {
            Err(TriplecastError::InvalidUri(iri))
        }
    }

    /// Wraps a string known to be a valid IRI, skipping validation.
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the null relative IRI (the empty string).
    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// A blank node, identified by its label only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankNode {
    id: String,
}

impl BlankNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Mints a blank node with a label never handed out before in this
    /// process.
    pub fn fresh() -> Self {
        Self {
            id: format!("b{}", BLANK_COUNTER.fetch_add(1, Ordering::Relaxed)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id)
    }
}

/// A literal term: lexical form plus datatype, with an optional language tag
/// for `rdf:langString`. Equality is structural, so `"1"^^xsd:integer` and
/// `"01"^^xsd:integer` are distinct terms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lexical: String,
    language: Option<String>,
    datatype: Iri,
}

impl Literal {
    /// A plain string literal typed `xsd:string`.
    pub fn new(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: None,
            datatype: xsd::STRING.clone(),
        }
    }

    pub fn new_typed(lexical: impl Into<String>, datatype: Iri) -> Self {
        Self {
            lexical: lexical.into(),
            language: None,
            datatype,
        }
    }

    /// A language-tagged string. Tags compare case-insensitively, so they
    /// are stored lowercased.
    pub fn new_lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: Some(language.into().to_lowercase()),
            datatype: rdf::LANG_STRING.clone(),
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn datatype(&self) -> &Iri {
        &self.datatype
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.lexical.replace('\\', "\\\\").replace('"', "\\\""))?;
        if let Some(language) = &self.language {
            write!(f, "@{}", language)
        } else if self.datatype != *xsd::STRING {
            write!(f, "^^{}", self.datatype)
        } else {
            Ok(())
        }
    }
}

/// Any term that can occupy a statement position. The model is generalized:
/// no position restricts which variants it accepts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(Iri),
    Blank(BlankNode),
    Literal(Literal),
}

impl Term {
    /// True for terms that can denote a described resource.
    pub fn is_resource(&self) -> bool {
        matches!(self, Term::Iri(_) | Term::Blank(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<BlankNode> for Term {
    fn from(node: BlankNode) -> Self {
        Term::Blank(node)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<&Iri> for Term {
    fn from(iri: &Iri) -> Self {
        Term::Iri(iri.clone())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => iri.fmt(f),
            Term::Blank(node) => node.fmt(f),
            Term::Literal(literal) => literal.fmt(f),
        }
    }
}

/// One subject-predicate-object statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Statement {
    subject: Term,
    predicate: Iri,
    object: Term,
}

impl Statement {
    pub fn new(subject: impl Into<Term>, predicate: Iri, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    pub fn subject(&self) -> &Term {
        &self.subject
    }

    pub fn predicate(&self) -> &Iri {
        &self.predicate
    }

    pub fn object(&self) -> &Term {
        &self.object
    }

    pub fn into_parts(self) -> (Term, Iri, Term) {
        (self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
