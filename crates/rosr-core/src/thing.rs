//! Entity model.
//!
//! Every addressable node shares a [`Thing`] record (identity, creator,
//! creation time). Aggregated members of a research object are one
//! [`AggregatedResource`] type whose [`ResourceKind`] carries the
//! variant-specific fields.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rosr_content::PhysicalStats;
use rosr_graph::vocab::{dcterms, xsd};
use rosr_graph::{Graph, Term};
use rosr_types::Uri;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Thing {
    pub uri: Uri,
    pub creator: Option<Uri>,
    pub created: Option<DateTime<Utc>>,
}

impl Thing {
    pub fn new(uri: Uri, creator: Option<Uri>, created: Option<DateTime<Utc>>) -> Self {
        Self {
            uri,
            creator,
            created,
        }
    }

    pub fn term(&self) -> Term {
        Term::from(&self.uri)
    }

    /// Write creator and creation time, replacing earlier values.
    pub(crate) fn save(&self, graph: &mut Graph) {
        let subject = self.term();
        if let Some(creator) = &self.creator {
            graph.remove_matching(Some(&subject), Some(dcterms::CREATOR), None);
            graph.insert(subject.clone(), dcterms::CREATOR, Term::from(creator));
        }
        if let Some(created) = &self.created {
            graph.remove_matching(Some(&subject), Some(dcterms::CREATED), None);
            graph.insert(subject, dcterms::CREATED, date_term(created));
        }
    }

    pub(crate) fn extract(graph: &Graph, uri: Uri) -> Self {
        let subject = Term::from(&uri);
        let creator = graph
            .object(&subject, dcterms::CREATOR)
            .and_then(Term::to_uri);
        let created = graph
            .object(&subject, dcterms::CREATED)
            .and_then(parse_date);
        Self::new(uri, creator, created)
    }
}

pub(crate) fn date_term(at: &DateTime<Utc>) -> Term {
    Term::typed(at.to_rfc3339(), xsd::DATE_TIME)
}

pub(crate) fn parse_date(term: &Term) -> Option<DateTime<Utc>> {
    let value = term.as_literal()?;
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Folder-specific fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderInfo {
    /// Named graph holding the folder's entries.
    pub resource_map: Uri,
    pub root: bool,
}

/// Annotation-specific fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationInfo {
    pub body: Uri,
    pub targets: BTreeSet<Uri>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    /// A plain resource. `stats` is filled when the bytes were written
    /// through this handle; otherwise ask the research object.
    Resource { stats: Option<PhysicalStats> },
    Folder(FolderInfo),
    Annotation(AnnotationInfo),
    /// The system-managed evolution information body.
    EvoInfo,
}

/// A member of a research object's aggregation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatedResource {
    pub thing: Thing,
    /// The research object aggregating this resource.
    pub aggregation: Uri,
    /// The membership record, once one exists.
    pub proxy: Option<Uri>,
    pub kind: ResourceKind,
}

impl AggregatedResource {
    pub fn uri(&self) -> &Uri {
        &self.thing.uri
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ResourceKind::Folder(_))
    }

    pub fn is_annotation(&self) -> bool {
        matches!(self.kind, ResourceKind::Annotation(_))
    }

    pub fn is_evo_info(&self) -> bool {
        matches!(self.kind, ResourceKind::EvoInfo)
    }

    /// Plain resources and the evolution information body; the things
    /// that can have bytes in the content store.
    pub fn is_resource(&self) -> bool {
        matches!(self.kind, ResourceKind::Resource { .. } | ResourceKind::EvoInfo)
    }

    pub fn as_folder(&self) -> Option<&FolderInfo> {
        match &self.kind {
            ResourceKind::Folder(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationInfo> {
        match &self.kind {
            ResourceKind::Annotation(info) => Some(info),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    #[test]
    fn save_then_extract() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let thing = Thing::new(uri("http://ex/ro/a"), Some(uri("http://ex/users/jo")), Some(at));
        let mut g = Graph::new();
        thing.save(&mut g);
        assert_eq!(Thing::extract(&g, uri("http://ex/ro/a")), thing);
    }

    #[test]
    fn save_replaces_previous_values() {
        let mut g = Graph::new();
        Thing::new(uri("http://ex/a"), Some(uri("http://ex/u1")), None).save(&mut g);
        Thing::new(uri("http://ex/a"), Some(uri("http://ex/u2")), None).save(&mut g);
        assert_eq!(g.len(), 1);
        assert_eq!(Thing::extract(&g, uri("http://ex/a")).creator, Some(uri("http://ex/u2")));
    }

    #[test]
    fn extract_missing_fields_is_empty() {
        let thing = Thing::extract(&Graph::new(), uri("http://ex/a"));
        assert!(thing.creator.is_none());
        assert!(thing.created.is_none());
    }

    #[test]
    fn kind_predicates() {
        let r = AggregatedResource {
            thing: Thing::new(uri("http://ex/ro/f/"), None, None),
            aggregation: uri("http://ex/ro/"),
            proxy: None,
            kind: ResourceKind::Folder(FolderInfo {
                resource_map: uri("http://ex/ro/f/.folder.rdf"),
                root: false,
            }),
        };
        assert!(r.is_folder());
        assert!(!r.is_resource());
        assert!(r.as_annotation().is_none());
        assert_eq!(r.as_folder().unwrap().resource_map.as_str(), "http://ex/ro/f/.folder.rdf");
    }
}
