use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::term::{Term, Triple};
use crate::vocab::rdf;

/// A set of triples.
///
/// Backed by a `BTreeSet`, so iteration order (and therefore serialized
/// output) is deterministic. Pattern lookups scan the set; graphs here are
/// manifest-sized, not dataset-sized.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Add a statement. Returns `false` if it was already present.
    pub fn insert(&mut self, subject: Term, predicate: &str, object: Term) -> bool {
        self.triples.insert(Triple::new(subject, predicate, object))
    }

    pub fn insert_triple(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    pub fn contains(&self, subject: &Term, predicate: &str, object: &Term) -> bool {
        self.triples
            .iter()
            .any(|t| &t.subject == subject && t.predicate == predicate && &t.object == object)
    }

    /// Remove every triple matching the pattern (`None` is a wildcard).
    /// Returns the number of triples removed.
    pub fn remove_matching(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&str>,
        object: Option<&Term>,
    ) -> usize {
        let before = self.triples.len();
        self.triples.retain(|t| {
            !(subject.map_or(true, |s| &t.subject == s)
                && predicate.map_or(true, |p| t.predicate == p)
                && object.map_or(true, |o| &t.object == o))
        });
        before - self.triples.len()
    }

    /// Remove every triple whose subject or object is `term`.
    pub fn remove_mentions(&mut self, term: &Term) -> usize {
        let before = self.triples.len();
        self.triples
            .retain(|t| &t.subject != term && &t.object != term);
        before - self.triples.len()
    }

    /// Objects of `subject predicate ?o`.
    pub fn objects<'a>(
        &'a self,
        subject: &'a Term,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// First object of `subject predicate ?o`, if any.
    pub fn object(&self, subject: &Term, predicate: &str) -> Option<&Term> {
        self.triples
            .iter()
            .find(|t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Subjects of `?s predicate object`.
    pub fn subjects<'a>(
        &'a self,
        predicate: &'a str,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.predicate == predicate && &t.object == object)
            .map(|t| &t.subject)
    }

    /// Returns `true` if `subject rdf:type class` is asserted.
    pub fn has_type(&self, subject: &Term, class: &str) -> bool {
        self.contains(subject, rdf::TYPE, &Term::iri(class))
    }

    /// Subjects typed with `class`, deduplicated and in order.
    pub fn instances_of(&self, class: &str) -> Vec<&Term> {
        let class = Term::iri(class);
        let found: BTreeSet<&Term> = self
            .triples
            .iter()
            .filter(|t| t.predicate == rdf::TYPE && t.object == class)
            .map(|t| &t.subject)
            .collect();
        found.into_iter().collect()
    }

    /// All triples with the given subject.
    pub fn about<'a>(&'a self, subject: &'a Term) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| &t.subject == subject)
    }

    /// Add every triple of `other`.
    pub fn extend(&mut self, other: &Graph) {
        self.triples.extend(other.triples.iter().cloned());
    }

    /// A copy of this graph with every IRI (subject, predicate, object and
    /// literal datatype excluded) passed through `f`.
    pub fn map_iris(&self, f: impl Fn(&str) -> String) -> Graph {
        let map_term = |term: &Term| match term {
            Term::Iri(iri) => Term::Iri(f(iri)),
            other => other.clone(),
        };
        Graph {
            triples: self
                .triples
                .iter()
                .map(|t| Triple::new(map_term(&t.subject), t.predicate.clone(), map_term(&t.object)))
                .collect(),
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}
