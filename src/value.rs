//! Property-facing values. Reads map typed literals to native scalars and
//! writes map natives back to canonical literals; terms that do not fit the
//! native universe pass through untouched.

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, TriplecastError};
use crate::source::Source;
use crate::term::{BlankNode, Iri, Literal, Term};
use crate::vocab::xsd;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One value of a property. `Literal` carries terms whose datatype has no
/// native mapping (or whose lexical form does not parse under it), `Term`
/// carries uncast resource terms, and `Node` carries cast child sources.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(BigDecimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Literal(Literal),
    Term(Term),
    Node(Source),
}

impl Value {
    /// The term this value denotes. Natives canonicalize into xsd-typed
    /// literals; a node contributes its subject, minting one if needed.
    pub fn to_term(&self) -> Term {
        match self {
            Value::String(s) => Literal::new(s.clone()).into(),
            Value::Boolean(b) => Literal::new_typed(b.to_string(), xsd::BOOLEAN.clone()).into(),
            Value::Integer(i) => Literal::new_typed(i.to_string(), xsd::INTEGER.clone()).into(),
            Value::Float(f) => Literal::new_typed(f.to_string(), xsd::DOUBLE.clone()).into(),
            Value::Decimal(d) => Literal::new_typed(d.to_string(), xsd::DECIMAL.clone()).into(),
            Value::Date(d) => {
                Literal::new_typed(d.format(DATE_FORMAT).to_string(), xsd::DATE.clone()).into()
            }
            Value::DateTime(dt) => Literal::new_typed(
                dt.format(DATE_TIME_FORMAT).to_string(),
                xsd::DATE_TIME.clone(),
            )
            .into(),
            Value::Literal(l) => l.clone().into(),
            Value::Term(t) => t.clone(),
            Value::Node(s) => s.rdf_subject(),
        }
    }

    /// Maps a literal to its native scalar. Language-tagged strings and
    /// unmapped or malformed literals are preserved as `Value::Literal`.
    pub fn from_literal(literal: &Literal) -> Value {
        if literal.language().is_some() {
            return Value::Literal(literal.clone());
        }
        let lexical = literal.lexical();
        let datatype = literal.datatype();
        if *datatype == *xsd::STRING {
            Value::String(lexical.to_string())
        } else if *datatype == *xsd::BOOLEAN {
            match lexical {
                "true" | "1" => Value::Boolean(true),
                "false" | "0" => Value::Boolean(false),
                _ => Value::Literal(literal.clone()),
            }
        } else if *datatype == *xsd::INTEGER || *datatype == *xsd::INT || *datatype == *xsd::LONG {
            match lexical.parse::<i64>() {
                Ok(i) => Value::Integer(i),
                Err(_) => Value::Literal(literal.clone()),
            }
        } else if *datatype == *xsd::DECIMAL {
            match lexical.parse::<BigDecimal>() {
                Ok(d) => Value::Decimal(d),
                Err(_) => Value::Literal(literal.clone()),
            }
        } else if *datatype == *xsd::DOUBLE || *datatype == *xsd::FLOAT {
            match lexical.parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => Value::Literal(literal.clone()),
            }
        } else if *datatype == *xsd::DATE {
            match NaiveDate::parse_from_str(lexical, DATE_FORMAT) {
                Ok(d) => Value::Date(d),
                Err(_) => Value::Literal(literal.clone()),
            }
        } else if *datatype == *xsd::DATE_TIME {
            match NaiveDateTime::parse_from_str(lexical, DATE_TIME_FORMAT) {
                Ok(dt) => Value::DateTime(dt),
                Err(_) => Value::Literal(literal.clone()),
            }
        } else {
            Value::Literal(literal.clone())
        }
    }

    /// JSON rendering for the attributes view. Nodes render as their subject
    /// term string; nesting them is the view's business.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
            Value::Date(d) => serde_json::Value::String(d.format(DATE_FORMAT).to_string()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format(DATE_TIME_FORMAT).to_string())
            }
            Value::Literal(l) => serde_json::Value::String(l.lexical().to_string()),
            Value::Term(t) => serde_json::Value::String(t.to_string()),
            Value::Node(s) => serde_json::Value::String(s.rdf_subject().to_string()),
        }
    }

    pub fn as_node(&self) -> Option<&Source> {
        match self {
            Value::Node(source) => Some(source),
            _ => None,
        }
    }
}

impl TryFrom<&serde_json::Value> for Value {
    type Error = TriplecastError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(TriplecastError::Value(format!(
                        "number out of range: {}",
                        n
                    )))
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Null => {
                Err(TriplecastError::Value("null is not a value".into()))
            }
            serde_json::Value::Array(_) => {
                Err(TriplecastError::Value("array is not a single value".into()))
            }
            serde_json::Value::Object(_) => {
                Err(TriplecastError::Value("object is not a value".into()))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Literal> for Value {
    fn from(l: Literal) -> Self {
        Value::Literal(l)
    }
}

impl From<Term> for Value {
    fn from(t: Term) -> Self {
        Value::Term(t)
    }
}

impl From<Iri> for Value {
    fn from(iri: Iri) -> Self {
        Value::Term(Term::Iri(iri))
    }
}

impl From<BlankNode> for Value {
    fn from(node: BlankNode) -> Self {
        Value::Term(Term::Blank(node))
    }
}

impl From<Source> for Value {
    fn from(source: Source) -> Self {
        Value::Node(source)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMAT)),
            Value::Literal(l) => write!(f, "{}", l),
            Value::Term(t) => write!(f, "{}", t),
            Value::Node(s) => write!(f, "{}", s.rdf_subject()),
        }
    }
}
