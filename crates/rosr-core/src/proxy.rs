//! Membership records: proxies in a research object, entries in a folder.

use rosr_graph::vocab::{ore, rdf, ro};
use rosr_graph::{Graph, Term};
use rosr_types::Uri;

/// States that `proxy_for` is aggregated by `proxy_in`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proxy {
    pub uri: Uri,
    pub proxy_for: Uri,
    pub proxy_in: Uri,
}

impl Proxy {
    pub(crate) fn save(&self, graph: &mut Graph) {
        let subject = Term::from(&self.uri);
        graph.insert(subject.clone(), rdf::TYPE, Term::iri(ore::PROXY));
        graph.insert(subject.clone(), ore::PROXY_FOR, Term::from(&self.proxy_for));
        graph.insert(subject, ore::PROXY_IN, Term::from(&self.proxy_in));
    }

    /// Every proxy in `graph` whose `proxyIn` is `aggregation`.
    pub(crate) fn extract_all(graph: &Graph, aggregation: &Uri) -> Vec<Proxy> {
        let aggregation_term = Term::from(aggregation);
        graph
            .subjects(ore::PROXY_IN, &aggregation_term)
            .filter_map(|subject| {
                let uri = subject.to_uri()?;
                let proxy_for = graph.object(subject, ore::PROXY_FOR)?.to_uri()?;
                Some(Proxy {
                    uri,
                    proxy_for,
                    proxy_in: aggregation.clone(),
                })
            })
            .collect()
    }
}

/// A named membership record inside a folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderEntry {
    pub uri: Uri,
    pub proxy_for: Uri,
    pub proxy_in: Uri,
    pub name: String,
}

impl FolderEntry {
    /// The display name used when none is given: the last path segment of
    /// the target, or its host when the path is empty.
    pub fn default_name(target: &Uri) -> String {
        target
            .last_segment()
            .or_else(|| target.host())
            .unwrap_or(target.as_str())
            .to_string()
    }

    pub(crate) fn save(&self, graph: &mut Graph) {
        let subject = Term::from(&self.uri);
        graph.insert(subject.clone(), rdf::TYPE, Term::iri(ro::FOLDER_ENTRY));
        graph.insert(subject.clone(), rdf::TYPE, Term::iri(ore::PROXY));
        graph.insert(subject.clone(), ore::PROXY_FOR, Term::from(&self.proxy_for));
        graph.insert(subject.clone(), ore::PROXY_IN, Term::from(&self.proxy_in));
        graph.remove_matching(Some(&subject), Some(ro::ENTRY_NAME), None);
        graph.insert(subject, ro::ENTRY_NAME, Term::literal(self.name.clone()));
    }

    pub(crate) fn remove(&self, graph: &mut Graph) {
        graph.remove_matching(Some(&Term::from(&self.uri)), None, None);
    }

    /// Every entry in `graph` belonging to `folder`.
    pub(crate) fn extract_all(graph: &Graph, folder: &Uri) -> Vec<FolderEntry> {
        let folder_term = Term::from(folder);
        graph
            .subjects(ore::PROXY_IN, &folder_term)
            .filter(|subject| graph.has_type(subject, ro::FOLDER_ENTRY))
            .filter_map(|subject| {
                let uri = subject.to_uri()?;
                let proxy_for = graph.object(subject, ore::PROXY_FOR)?.to_uri()?;
                let name = graph
                    .object(subject, ro::ENTRY_NAME)
                    .and_then(Term::as_literal)
                    .map(str::to_string)
                    .unwrap_or_else(|| FolderEntry::default_name(&proxy_for));
                Some(FolderEntry {
                    uri,
                    proxy_for,
                    proxy_in: folder.clone(),
                    name,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    #[test]
    fn proxy_roundtrip_through_graph() {
        let proxy = Proxy {
            uri: uri("http://ex/ro/.ro/proxies/1"),
            proxy_for: uri("http://ex/ro/a.txt"),
            proxy_in: uri("http://ex/ro/"),
        };
        let mut g = Graph::new();
        proxy.save(&mut g);
        assert_eq!(Proxy::extract_all(&g, &uri("http://ex/ro/")), vec![proxy]);
        assert!(Proxy::extract_all(&g, &uri("http://ex/other/")).is_empty());
    }

    #[test]
    fn entry_roundtrip_and_remove() {
        let entry = FolderEntry {
            uri: uri("http://ex/ro/f/entries/1"),
            proxy_for: uri("http://ex/ro/a.txt"),
            proxy_in: uri("http://ex/ro/f/"),
            name: "renamed.txt".into(),
        };
        let mut g = Graph::new();
        entry.save(&mut g);
        assert_eq!(FolderEntry::extract_all(&g, &uri("http://ex/ro/f/")), vec![entry.clone()]);
        entry.remove(&mut g);
        assert!(g.is_empty());
    }

    #[test]
    fn default_names() {
        assert_eq!(FolderEntry::default_name(&uri("http://ex/ro/dir/a.txt")), "a.txt");
        assert_eq!(FolderEntry::default_name(&uri("http://ex/ro/dir/")), "dir");
        assert_eq!(FolderEntry::default_name(&uri("http://example.org/")), "example.org");
    }
}
