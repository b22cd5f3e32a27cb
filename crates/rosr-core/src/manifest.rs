//! Manifest graph layout: how a research object and its aggregated
//! resources, proxies and annotations are written to, and read back from,
//! the manifest named graph.

use std::collections::{BTreeMap, BTreeSet};

use rosr_graph::vocab::{ao, ore, rdf, ro};
use rosr_graph::{Graph, Term};
use rosr_types::Uri;
use tracing::warn;

use crate::proxy::Proxy;
use crate::resource_map::ResourceMap;
use crate::thing::{AggregatedResource, AnnotationInfo, FolderInfo, ResourceKind, Thing};

/// Assert the research object itself and its manifest.
pub(crate) fn save_research_object(graph: &mut Graph, ro_thing: &Thing, manifest: &Uri) {
    let subject = ro_thing.term();
    let manifest_term = Term::from(manifest);
    graph.insert(subject.clone(), rdf::TYPE, Term::iri(ro::RESEARCH_OBJECT));
    graph.insert(subject.clone(), rdf::TYPE, Term::iri(ore::AGGREGATION));
    graph.insert(subject.clone(), ore::IS_DESCRIBED_BY, manifest_term.clone());
    graph.insert(manifest_term.clone(), rdf::TYPE, Term::iri(ro::MANIFEST));
    graph.insert(manifest_term.clone(), rdf::TYPE, Term::iri(ore::RESOURCE_MAP));
    graph.insert(manifest_term, ore::DESCRIBES, subject);
    ro_thing.save(graph);
}

/// Add (or refresh) an aggregated resource and its variant-specific facts.
pub(crate) fn save_resource(graph: &mut Graph, resource: &AggregatedResource) {
    let subject = resource.thing.term();
    let ro_term = Term::from(&resource.aggregation);
    graph.insert(ro_term.clone(), ore::AGGREGATES, subject.clone());
    graph.insert(subject.clone(), ore::IS_AGGREGATED_BY, ro_term.clone());
    graph.insert(subject.clone(), rdf::TYPE, Term::iri(ore::AGGREGATED_RESOURCE));
    resource.thing.save(graph);

    match &resource.kind {
        ResourceKind::Resource { .. } | ResourceKind::EvoInfo => {
            graph.insert(subject, rdf::TYPE, Term::iri(ro::RESOURCE));
        }
        ResourceKind::Folder(info) => {
            graph.insert(subject.clone(), rdf::TYPE, Term::iri(ro::RESOURCE));
            graph.insert(subject.clone(), rdf::TYPE, Term::iri(ro::FOLDER));
            graph.insert(subject.clone(), rdf::TYPE, Term::iri(ore::AGGREGATION));
            graph.remove_matching(Some(&subject), Some(ore::IS_DESCRIBED_BY), None);
            graph.insert(subject.clone(), ore::IS_DESCRIBED_BY, Term::from(&info.resource_map));
            if info.root {
                graph.remove_matching(Some(&ro_term), Some(ro::ROOT_FOLDER), None);
                graph.insert(ro_term, ro::ROOT_FOLDER, subject);
            } else {
                graph.remove_matching(Some(&ro_term), Some(ro::ROOT_FOLDER), Some(&subject));
            }
        }
        ResourceKind::Annotation(info) => {
            graph.insert(subject.clone(), rdf::TYPE, Term::iri(ro::AGGREGATED_ANNOTATION));
            graph.insert(subject.clone(), rdf::TYPE, Term::iri(ao::ANNOTATION));
            graph.remove_matching(Some(&subject), Some(ao::BODY), None);
            graph.remove_matching(Some(&subject), Some(ao::ANNOTATES_RESOURCE), None);
            graph.insert(subject.clone(), ao::BODY, Term::from(&info.body));
            for target in &info.targets {
                graph.insert(subject.clone(), ao::ANNOTATES_RESOURCE, Term::from(target));
            }
        }
    }
}

/// Remove an aggregated resource: its membership, its own statements and
/// a root-folder pointer to it.
pub(crate) fn remove_resource(graph: &mut Graph, aggregation: &Uri, resource: &Uri) {
    let subject = Term::from(resource);
    let ro_term = Term::from(aggregation);
    graph.remove_matching(Some(&ro_term), Some(ore::AGGREGATES), Some(&subject));
    graph.remove_matching(Some(&ro_term), Some(ro::ROOT_FOLDER), Some(&subject));
    graph.remove_matching(Some(&subject), None, None);
}

pub(crate) fn save_proxy(graph: &mut Graph, proxy: &Proxy) {
    proxy.save(graph);
}

pub(crate) fn remove_proxy(graph: &mut Graph, proxy: &Uri) {
    graph.remove_matching(Some(&Term::from(proxy)), None, None);
}

/// Every aggregated resource of `aggregation`, keyed by URI.
pub(crate) fn extract_aggregated(graph: &Graph, aggregation: &Uri) -> BTreeMap<Uri, AggregatedResource> {
    let ro_term = Term::from(aggregation);
    let evo_info = ResourceMap::evo_info(aggregation).ok().map(|m| m.uri().clone());
    let proxies: BTreeMap<Uri, Uri> = Proxy::extract_all(graph, aggregation)
        .into_iter()
        .map(|p| (p.proxy_for, p.uri))
        .collect();

    let mut resources = BTreeMap::new();
    for object in graph.objects(&ro_term, ore::AGGREGATES) {
        let Some(uri) = object.to_uri() else {
            warn!(ro = %aggregation, term = %object, "skipping non-IRI aggregated resource");
            continue;
        };
        let subject = Term::from(&uri);
        let kind = if evo_info.as_ref() == Some(&uri) {
            ResourceKind::EvoInfo
        } else if graph.has_type(&subject, ro::FOLDER) {
            let resource_map = match graph.object(&subject, ore::IS_DESCRIBED_BY).and_then(Term::to_uri) {
                Some(map) => map,
                None => match ResourceMap::folder(aggregation, &uri) {
                    Ok(map) => map.uri().clone(),
                    Err(e) => {
                        warn!(ro = %aggregation, folder = %uri, error = %e, "skipping folder without a resource map");
                        continue;
                    }
                },
            };
            ResourceKind::Folder(FolderInfo {
                resource_map,
                root: graph.contains(&ro_term, ro::ROOT_FOLDER, &subject),
            })
        } else if graph.has_type(&subject, ro::AGGREGATED_ANNOTATION)
            || graph.has_type(&subject, ao::ANNOTATION)
        {
            let Some(body) = graph.object(&subject, ao::BODY).and_then(Term::to_uri) else {
                warn!(ro = %aggregation, annotation = %uri, "skipping annotation without a body");
                continue;
            };
            let targets: BTreeSet<Uri> = graph
                .objects(&subject, ao::ANNOTATES_RESOURCE)
                .filter_map(Term::to_uri)
                .collect();
            ResourceKind::Annotation(AnnotationInfo { body, targets })
        } else {
            ResourceKind::Resource { stats: None }
        };
        let resource = AggregatedResource {
            thing: Thing::extract(graph, uri.clone()),
            aggregation: aggregation.clone(),
            proxy: proxies.get(&uri).cloned(),
            kind,
        };
        resources.insert(uri, resource);
    }
    resources
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    fn ro_uri() -> Uri {
        uri("http://ex/ro1/")
    }

    fn resource(path: &str, kind: ResourceKind) -> AggregatedResource {
        AggregatedResource {
            thing: Thing::new(ro_uri().resolve(path).unwrap(), Some(uri("http://ex/u")), Some(Utc::now())),
            aggregation: ro_uri(),
            proxy: None,
            kind,
        }
    }

    fn populated() -> Graph {
        let mut g = Graph::new();
        save_research_object(
            &mut g,
            &Thing::new(ro_uri(), None, None),
            &uri("http://ex/ro1/.ro/manifest.rdf"),
        );
        let data = resource("data.txt", ResourceKind::Resource { stats: None });
        save_resource(&mut g, &data);
        save_proxy(
            &mut g,
            &Proxy {
                uri: uri("http://ex/ro1/.ro/proxies/p1"),
                proxy_for: data.uri().clone(),
                proxy_in: ro_uri(),
            },
        );
        save_resource(
            &mut g,
            &resource(
                "dir/",
                ResourceKind::Folder(FolderInfo {
                    resource_map: uri("http://ex/ro1/dir/.folder.rdf"),
                    root: true,
                }),
            ),
        );
        save_resource(
            &mut g,
            &resource(
                ".ro/annotations/a1",
                ResourceKind::Annotation(AnnotationInfo {
                    body: uri("http://ex/ro1/body.nt"),
                    targets: [ro_uri(), uri("http://ex/ro1/data.txt")].into_iter().collect(),
                }),
            ),
        );
        save_resource(&mut g, &resource(".ro/evo_info.ttl", ResourceKind::EvoInfo));
        g
    }

    #[test]
    fn extract_recovers_every_kind() {
        let g = populated();
        let all = extract_aggregated(&g, &ro_uri());
        assert_eq!(all.len(), 4);

        let data = &all[&uri("http://ex/ro1/data.txt")];
        assert!(matches!(data.kind, ResourceKind::Resource { .. }));
        assert_eq!(data.proxy, Some(uri("http://ex/ro1/.ro/proxies/p1")));
        assert_eq!(data.thing.creator, Some(uri("http://ex/u")));

        let folder = all[&uri("http://ex/ro1/dir/")].as_folder().unwrap();
        assert!(folder.root);
        assert_eq!(folder.resource_map, uri("http://ex/ro1/dir/.folder.rdf"));

        let ann = all[&uri("http://ex/ro1/.ro/annotations/a1")].as_annotation().unwrap();
        assert_eq!(ann.body, uri("http://ex/ro1/body.nt"));
        assert_eq!(ann.targets.len(), 2);

        assert!(all[&uri("http://ex/ro1/.ro/evo_info.ttl")].is_evo_info());
    }

    #[test]
    fn resave_annotation_replaces_body_and_targets() {
        let mut g = populated();
        save_resource(
            &mut g,
            &resource(
                ".ro/annotations/a1",
                ResourceKind::Annotation(AnnotationInfo {
                    body: uri("http://elsewhere/body"),
                    targets: [ro_uri()].into_iter().collect(),
                }),
            ),
        );
        let all = extract_aggregated(&g, &ro_uri());
        let ann = all[&uri("http://ex/ro1/.ro/annotations/a1")].as_annotation().unwrap();
        assert_eq!(ann.body, uri("http://elsewhere/body"));
        assert_eq!(ann.targets.len(), 1);
    }

    #[test]
    fn remove_resource_and_proxy() {
        let mut g = populated();
        remove_resource(&mut g, &ro_uri(), &uri("http://ex/ro1/dir/"));
        remove_proxy(&mut g, &uri("http://ex/ro1/.ro/proxies/p1"));
        let all = extract_aggregated(&g, &ro_uri());
        assert_eq!(all.len(), 3);
        assert!(all[&uri("http://ex/ro1/data.txt")].proxy.is_none());
        assert!(!g.contains(&Term::from(&ro_uri()), ro::ROOT_FOLDER, &Term::iri("http://ex/ro1/dir/")));
    }
}
