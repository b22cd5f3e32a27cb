//! Evolution strategies.
//!
//! Snapshots and archives record the same facts with different terms: the
//! type of the copy, the link to its live origin and back, when it was made
//! and by whom. [`EvoBuilder`] names the terms; the provided methods write
//! and read the facts.

use chrono::{DateTime, Utc};
use rosr_graph::vocab::{foaf, rdf, roevo};
use rosr_graph::{Graph, Term};
use rosr_types::{EvoType, Uri, UserMetadata};

use crate::thing::{date_term, parse_date};

/// Terms a copy strategy uses to link a copy with its live origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyTerms {
    pub copy_of: &'static str,
    pub has_copy: &'static str,
    pub at_time: &'static str,
    pub by: &'static str,
}

const EVO_CLASSES: [&str; 3] = [roevo::LIVE_RO, roevo::SNAPSHOT_RO, roevo::ARCHIVED_RO];

pub trait EvoBuilder: Send + Sync {
    fn evo_type(&self) -> EvoType;

    /// Class asserted on research objects of this evolution type.
    fn rdf_type(&self) -> &'static str;

    /// Copy-link terms; `None` for strategies that do not produce copies.
    fn copy_terms(&self) -> Option<CopyTerms>;

    /// Assert the evolution class, replacing any other one.
    fn save_type(&self, graph: &mut Graph, ro: &Uri) {
        let subject = Term::from(ro);
        for class in EVO_CLASSES {
            graph.remove_matching(Some(&subject), Some(rdf::TYPE), Some(&Term::iri(class)));
        }
        graph.insert(subject, rdf::TYPE, Term::iri(self.rdf_type()));
    }

    /// `copy` is a copy of `live`.
    fn save_copy_of(&self, graph: &mut Graph, copy: &Uri, live: &Uri) {
        if let Some(terms) = self.copy_terms() {
            graph.insert(Term::from(copy), terms.copy_of, Term::from(live));
            graph.insert(Term::from(live), rdf::TYPE, Term::iri(roevo::LIVE_RO));
        }
    }

    /// `live` has `copy` among its copies.
    fn save_has_copy(&self, graph: &mut Graph, live: &Uri, copy: &Uri) {
        if let Some(terms) = self.copy_terms() {
            graph.insert(Term::from(live), terms.has_copy, Term::from(copy));
            graph.insert(Term::from(copy), rdf::TYPE, Term::iri(self.rdf_type()));
        }
    }

    fn save_copy_time(&self, graph: &mut Graph, copy: &Uri, at: &DateTime<Utc>) {
        if let Some(terms) = self.copy_terms() {
            let subject = Term::from(copy);
            graph.remove_matching(Some(&subject), Some(terms.at_time), None);
            graph.insert(subject, terms.at_time, date_term(at));
        }
    }

    /// Record the copy author once; later calls keep the first author.
    fn save_copy_author(&self, graph: &mut Graph, copy: &Uri, author: &UserMetadata) {
        if let Some(terms) = self.copy_terms() {
            let subject = Term::from(copy);
            if graph.object(&subject, terms.by).is_some() {
                return;
            }
            let agent = Term::from(&author.uri);
            graph.insert(subject, terms.by, agent.clone());
            graph.insert(agent.clone(), rdf::TYPE, Term::iri(foaf::AGENT));
            graph.remove_matching(Some(&agent), Some(foaf::NAME), None);
            graph.insert(agent, foaf::NAME, Term::literal(author.name.clone()));
        }
    }

    /// Forget everything recorded about `copy` on the live side.
    fn remove_copy(&self, graph: &mut Graph, live: &Uri, copy: &Uri) {
        if let Some(terms) = self.copy_terms() {
            let copy_term = Term::from(copy);
            graph.remove_matching(Some(&Term::from(live)), Some(terms.has_copy), Some(&copy_term));
            graph.remove_matching(Some(&copy_term), None, None);
        }
    }

    fn extract_copy_of(&self, graph: &Graph, copy: &Uri) -> Option<Uri> {
        let terms = self.copy_terms()?;
        graph.object(&Term::from(copy), terms.copy_of)?.to_uri()
    }

    fn extract_copies(&self, graph: &Graph, live: &Uri) -> Vec<Uri> {
        let Some(terms) = self.copy_terms() else {
            return Vec::new();
        };
        graph
            .objects(&Term::from(live), terms.has_copy)
            .filter_map(Term::to_uri)
            .collect()
    }

    fn extract_copy_time(&self, graph: &Graph, copy: &Uri) -> Option<DateTime<Utc>> {
        let terms = self.copy_terms()?;
        graph.object(&Term::from(copy), terms.at_time).and_then(parse_date)
    }

    /// Copy author URI and recorded name.
    fn extract_copy_author(&self, graph: &Graph, copy: &Uri) -> Option<(Uri, Option<String>)> {
        let terms = self.copy_terms()?;
        let agent = graph.object(&Term::from(copy), terms.by)?;
        let name = graph
            .object(agent, foaf::NAME)
            .and_then(Term::as_literal)
            .map(str::to_string);
        Some((agent.to_uri()?, name))
    }
}

/// Strategy for live research objects: type only, no copy links.
pub struct LiveBuilder;

pub struct SnapshotBuilder;

pub struct ArchiveBuilder;

impl EvoBuilder for LiveBuilder {
    fn evo_type(&self) -> EvoType {
        EvoType::Live
    }

    fn rdf_type(&self) -> &'static str {
        roevo::LIVE_RO
    }

    fn copy_terms(&self) -> Option<CopyTerms> {
        None
    }
}

impl EvoBuilder for SnapshotBuilder {
    fn evo_type(&self) -> EvoType {
        EvoType::Snapshot
    }

    fn rdf_type(&self) -> &'static str {
        roevo::SNAPSHOT_RO
    }

    fn copy_terms(&self) -> Option<CopyTerms> {
        Some(CopyTerms {
            copy_of: roevo::IS_SNAPSHOT_OF,
            has_copy: roevo::HAS_SNAPSHOT,
            at_time: roevo::SNAPSHOTED_AT_TIME,
            by: roevo::SNAPSHOTED_BY,
        })
    }
}

impl EvoBuilder for ArchiveBuilder {
    fn evo_type(&self) -> EvoType {
        EvoType::Archived
    }

    fn rdf_type(&self) -> &'static str {
        roevo::ARCHIVED_RO
    }

    fn copy_terms(&self) -> Option<CopyTerms> {
        Some(CopyTerms {
            copy_of: roevo::IS_ARCHIVE_OF,
            has_copy: roevo::HAS_ARCHIVE,
            at_time: roevo::ARCHIVED_AT_TIME,
            by: roevo::ARCHIVED_BY,
        })
    }
}

/// The strategy for an evolution type.
pub fn for_type(evo_type: EvoType) -> &'static dyn EvoBuilder {
    match evo_type {
        EvoType::Live => &LiveBuilder,
        EvoType::Snapshot => &SnapshotBuilder,
        EvoType::Archived => &ArchiveBuilder,
    }
}

/// The evolution type asserted on `ro` in `graph`, if any.
pub fn extract_evo_type(graph: &Graph, ro: &Uri) -> Option<EvoType> {
    let subject = Term::from(ro);
    [EvoType::Archived, EvoType::Snapshot, EvoType::Live]
        .into_iter()
        .find(|t| graph.has_type(&subject, for_type(*t).rdf_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rosr_types::Role;

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    fn author() -> UserMetadata {
        UserMetadata::new("jo", "Jo Smith", Role::Authenticated, uri("http://ex/users/jo"))
    }

    #[test]
    fn save_type_replaces_previous_class() {
        let mut g = Graph::new();
        let ro = uri("http://ex/ro1/");
        LiveBuilder.save_type(&mut g, &ro);
        assert_eq!(extract_evo_type(&g, &ro), Some(EvoType::Live));
        SnapshotBuilder.save_type(&mut g, &ro);
        assert_eq!(extract_evo_type(&g, &ro), Some(EvoType::Snapshot));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn snapshot_facts_roundtrip() {
        let mut g = Graph::new();
        let live = uri("http://ex/ro1/");
        let copy = uri("http://ex/ro2/");
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let s = for_type(EvoType::Snapshot);
        s.save_copy_of(&mut g, &copy, &live);
        s.save_copy_time(&mut g, &copy, &at);
        s.save_copy_author(&mut g, &copy, &author());

        assert!(g.contains(&Term::from(&copy), roevo::IS_SNAPSHOT_OF, &Term::from(&live)));
        assert_eq!(s.extract_copy_of(&g, &copy), Some(live));
        assert_eq!(s.extract_copy_time(&g, &copy), Some(at));
        assert_eq!(
            s.extract_copy_author(&g, &copy),
            Some((author().uri, Some("Jo Smith".to_string())))
        );
        assert!(ArchiveBuilder.extract_copy_of(&g, &copy).is_none(), "archive terms differ");
    }

    #[test]
    fn first_author_wins() {
        let mut g = Graph::new();
        let copy = uri("http://ex/ro2/");
        ArchiveBuilder.save_copy_author(&mut g, &copy, &author());
        let other = UserMetadata::new("al", "Al", Role::Admin, uri("http://ex/users/al"));
        ArchiveBuilder.save_copy_author(&mut g, &copy, &other);
        assert_eq!(ArchiveBuilder.extract_copy_author(&g, &copy).unwrap().0, author().uri);
    }

    #[test]
    fn has_copy_and_remove() {
        let mut g = Graph::new();
        let live = uri("http://ex/ro1/");
        let s1 = uri("http://ex/s1/");
        let s2 = uri("http://ex/s2/");
        SnapshotBuilder.save_has_copy(&mut g, &live, &s1);
        SnapshotBuilder.save_has_copy(&mut g, &live, &s2);
        assert_eq!(SnapshotBuilder.extract_copies(&g, &live).len(), 2);
        SnapshotBuilder.remove_copy(&mut g, &live, &s1);
        assert_eq!(SnapshotBuilder.extract_copies(&g, &live), vec![s2]);
    }

    #[test]
    fn live_strategy_records_no_links() {
        let mut g = Graph::new();
        let live = uri("http://ex/ro1/");
        LiveBuilder.save_copy_of(&mut g, &live, &live);
        LiveBuilder.save_has_copy(&mut g, &live, &live);
        assert!(g.is_empty());
        assert!(LiveBuilder.extract_copies(&g, &live).is_empty());
    }
}
