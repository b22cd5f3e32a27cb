use std::fmt;

use rosr_types::Uri;
use serde::{Deserialize, Serialize};

/// An RDF literal value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

/// An RDF term: IRI, blank node or literal.
///
/// IRIs are kept as strings so that graphs can carry terms from any
/// vocabulary without parsing them; conversion to [`Uri`] happens where the
/// model needs an addressable entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Term::Blank(id.into())
    }

    /// A plain (untyped, untagged) literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal {
            value: value.into(),
            datatype: None,
            language: None,
        })
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        })
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// The IRI string, if this term is an IRI.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// The lexical value, if this term is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Term::Literal(lit) => Some(&lit.value),
            _ => None,
        }
    }

    /// The IRI parsed as a [`Uri`]; `None` for non-IRIs or unparseable IRIs.
    pub fn to_uri(&self) -> Option<Uri> {
        self.as_iri().and_then(|iri| Uri::parse(iri).ok())
    }
}

impl From<&Uri> for Term {
    fn from(uri: &Uri) -> Self {
        Term::Iri(uri.as_str().to_string())
    }
}

impl From<Uri> for Term {
    fn from(uri: Uri) -> Self {
        Term::from(&uri)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(id) => write!(f, "_:{id}"),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", lit.value)?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A single statement. Predicates are always IRIs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}
