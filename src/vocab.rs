//! Well-known vocabulary terms used by the mapping layer.

use std::sync::LazyLock;

use crate::term::Iri;

/// RDF vocabulary (`rdf:`).
pub mod rdf {
    use super::*;

    pub const NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// `rdf:type`
    pub static TYPE: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}type", NAMESPACE)));

    /// `rdf:langString`
    pub static LANG_STRING: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}langString", NAMESPACE)));
}

/// XML Schema datatypes (`xsd:`).
pub mod xsd {
    use super::*;

    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

    /// `xsd:string`
    pub static STRING: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}string", NAMESPACE)));

    /// `xsd:boolean`
    pub static BOOLEAN: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}boolean", NAMESPACE)));

    /// `xsd:integer`
    pub static INTEGER: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}integer", NAMESPACE)));

    /// `xsd:int`
    pub static INT: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}int", NAMESPACE)));

    /// `xsd:long`
    pub static LONG: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}long", NAMESPACE)));

    /// `xsd:decimal`
    pub static DECIMAL: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}decimal", NAMESPACE)));

    /// `xsd:double`
    pub static DOUBLE: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}double", NAMESPACE)));

    /// `xsd:float`
    pub static FLOAT: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}float", NAMESPACE)));

    /// `xsd:date`
    pub static DATE: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}date", NAMESPACE)));

    /// `xsd:dateTime`
    pub static DATE_TIME: LazyLock<Iri> =
        LazyLock::new(|| Iri::new_unchecked(format!("{}dateTime", NAMESPACE)));
}
