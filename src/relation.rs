//! Bound property accessors. A `Relation` pins down a source, a declared
//! property, and the subject the statements are about, then offers the full
//! read/write surface over that one slot.

use std::sync::Arc;

use crate::error::Result;
use crate::schema::PropertyConfig;
use crate::source::Source;
use crate::term::{Iri, Term};
use crate::value::Value;

pub struct Relation {
    source: Source,
    config: Arc<PropertyConfig>,
    subject: Term,
}

impl Source {
    /// Binds a declared property of this source for repeated access.
    pub fn relation(&self, name: &str) -> Result<Relation> {
        let config = self.config_for(name)?;
        let subject = self.rdf_subject();
        Ok(Relation {
            source: self.clone(),
            config,
            subject,
        })
    }

    /// Binds a declared property about an explicit subject within this
    /// source's graph.
    pub fn relation_about(&self, subject: &Term, name: &str) -> Result<Relation> {
        let config = self.config_for(name)?;
        Ok(Relation {
            source: self.clone(),
            config,
            subject: subject.clone(),
        })
    }
}

impl Relation {
    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn predicate(&self) -> &Iri {
        self.config.predicate()
    }

    pub fn subject(&self) -> &Term {
        &self.subject
    }

    /// Native-mode values, cast per the declaration.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.source
            .values_for(&self.subject, self.config.predicate(), Some(&self.config), false)
    }

    /// Raw terms: literals keep their tags, resources stay uncast.
    pub fn literal_values(&self) -> Result<Vec<Value>> {
        self.source
            .values_for(&self.subject, self.config.predicate(), Some(&self.config), true)
    }

    /// Replaces the whole value set.
    pub fn set(&self, values: impl IntoIterator<Item = Value>) -> Result<()> {
        self.source.write_property(
            &self.subject,
            self.config.predicate(),
            self.config.multivalue(),
            values.into_iter().collect(),
        )
    }

    /// Adds one value; on a single-valued property this replaces instead.
    pub fn push(&self, value: Value) -> Result<()> {
        self.source.append_value(
            &self.subject,
            self.config.predicate(),
            self.config.multivalue(),
            value,
        )
    }

    /// Removes the statement carrying this value, if present.
    pub fn remove_value(&self, value: &Value) -> Result<bool> {
        self.source
            .remove_value(&self.subject, self.config.predicate(), value)
    }

    /// Drops every value, returning how many statements went away.
    pub fn clear(&self) -> Result<usize> {
        self.source
            .clear_property(&self.subject, self.config.predicate())
    }

    pub fn first(&self) -> Result<Option<Value>> {
        Ok(self.values()?.into_iter().next())
    }

    pub fn len(&self) -> usize {
        self.source
            .count_values(&self.subject, self.config.predicate())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
