//! Copying a live research object into a snapshot or archive, and copying
//! single members between research objects.

use std::collections::BTreeMap;

use chrono::Utc;
use rosr_types::{EvoType, Uri};
use tracing::{debug, info};

use crate::error::{RoError, RoResult};
use crate::evo::builder::for_type;
use crate::notify::RoEvent;
use crate::proxy::FolderEntry;
use crate::research_object::ResearchObject;
use crate::resource_map::ResourceMap;
use crate::thing::{AggregatedResource, AnnotationInfo, ResourceKind, Thing};

impl<'a> ResearchObject<'a> {
    /// Copy this research object to `target` as a SNAPSHOT or ARCHIVED
    /// research object.
    ///
    /// Every aggregated resource, folder and annotation is copied with
    /// references inside this object re-based onto `target`. The copy
    /// records what it is a copy of, when and by whom; this object gains a
    /// link to the copy.
    pub fn copy(&mut self, target: &Uri, evo_type: EvoType) -> RoResult<ResearchObject<'a>> {
        let strategy = for_type(evo_type);
        if strategy.copy_terms().is_none() {
            return Err(RoError::BadRequest(format!(
                "research objects cannot be copied as {evo_type}"
            )));
        }
        let source_type = self.evo_type()?;
        if source_type.is_immutable() {
            return Err(RoError::Forbidden(format!(
                "research object {} is {source_type}; only LIVE research objects can be copied",
                self.uri
            )));
        }
        let target = target.with_trailing_slash();
        if target.is_within(&self.uri) || self.uri.is_within(&target) {
            return Err(RoError::Conflict(format!(
                "{target} overlaps research object {}",
                self.uri
            )));
        }
        if ResourceMap::manifest(&target)?.exists(self.builder)? {
            return Err(RoError::Conflict(format!("research object {target} already exists")));
        }

        let builder = self.builder;
        let now = Utc::now();
        let thing = Thing {
            uri: target.clone(),
            ..self.thing()?.clone()
        };
        let members: Vec<AggregatedResource> = self.aggregated()?.values().cloned().collect();
        let entries = self.all_folder_entries()?.clone();

        let copy = self.write_op(|source| {
            let mut copy = ResearchObject::create_internal(builder, thing, evo_type)?;
            let author = builder.user();
            let stamp = |g: &mut rosr_graph::Graph| {
                strategy.save_copy_of(g, &target, &source.uri);
                strategy.save_copy_time(g, &target, &now);
                strategy.save_copy_author(g, &target, author);
            };
            copy.manifest.update(builder, stamp)?;
            copy.manifest.serialize(builder)?;
            copy.evo_map.update(builder, stamp)?;
            copy.evo_map.serialize(builder)?;

            source.evo_map.update(builder, |g| {
                strategy.save_has_copy(g, &source.uri, &target);
                strategy.save_copy_time(g, &target, &now);
            })?;
            source.evo_map.serialize(builder)?;
            source.evo.take();

            copy.copy_members(source, &members, &entries)?;
            Ok(copy)
        })?;

        info!(ro = %self.uri, copy = %copy.uri, evo_type = %evo_type, "copied research object");
        builder.publish(RoEvent::Created { ro: copy.uri.clone() });
        self.publish_update(self.evo_map.uri());
        Ok(copy)
    }

    /// Re-create `members` of `source` in this object: resources first, so
    /// that folders and annotations can refer to them.
    fn copy_members(
        &mut self,
        source: &ResearchObject<'_>,
        members: &[AggregatedResource],
        entries: &BTreeMap<Uri, BTreeMap<Uri, FolderEntry>>,
    ) -> RoResult<()> {
        for resource in members.iter().filter(|r| r.is_resource() && !r.is_evo_info()) {
            self.copy_resource_internal(source, resource)?;
        }
        for folder in members.iter().filter(|r| r.is_folder()) {
            let root = folder.as_folder().is_some_and(|f| f.root);
            let folder_entries = entries.get(folder.uri()).cloned().unwrap_or_default();
            self.copy_folder_internal(&source.uri, folder, &folder_entries, root)?;
        }
        for annotation in members.iter().filter(|r| r.is_annotation()) {
            if !source.is_evo_annotation(annotation) {
                self.copy_annotation_internal(&source.uri, annotation)?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Copying single members from another research object
    // -----------------------------------------------------------------------

    /// Copy an aggregated resource of `source` into this object. Internal
    /// bytes and any body graph come along; external resources stay where
    /// they are.
    pub fn copy_resource(
        &mut self,
        source: &ResearchObject<'_>,
        resource: &Uri,
    ) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        let original = source
            .aggregated_resource(resource)?
            .filter(|r| r.is_resource() && !r.is_evo_info())
            .cloned()
            .ok_or_else(|| RoError::NotFound(format!("resource {resource} in {}", source.uri)))?;
        let uri = self.rebased(&source.uri, resource);
        self.ensure_not_reserved(&uri)?;
        self.ensure_unused(&uri)?;
        let copied = self.write_op(|ro| ro.copy_resource_internal(source, &original))?;
        self.publish_update(copied.uri());
        Ok(copied)
    }

    /// Copy a folder of `source` into this object. Entry targets are taken
    /// relative to `source` and resolved against this object, where they
    /// must already be aggregated.
    pub fn copy_folder(&mut self, source: &ResearchObject<'_>, folder: &Uri) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        let original = source
            .aggregated_resource(folder)?
            .filter(|r| r.is_folder())
            .cloned()
            .ok_or_else(|| RoError::NotFound(format!("folder {folder} in {}", source.uri)))?;
        let uri = self.rebased(&source.uri, folder);
        self.ensure_unused(&uri)?;
        let entries = source.all_folder_entries()?.get(folder).cloned().unwrap_or_default();
        for entry in entries.values() {
            let target = self.rebased(&source.uri, &entry.proxy_for);
            if self.aggregated_resource(&target)?.is_none() {
                return Err(RoError::BadRequest(format!(
                    "folder entry target {target} is not aggregated by {}",
                    self.uri
                )));
            }
        }
        let root = original.as_folder().is_some_and(|f| f.root) && self.root_folder()?.is_none();
        let copied = self.write_op(|ro| ro.copy_folder_internal(&source.uri, &original, &entries, root))?;
        self.publish_update(copied.uri());
        Ok(copied)
    }

    /// Copy an annotation of `source` into this object. Its targets, and its
    /// body when that lies inside this object, must already be aggregated.
    pub fn copy_annotation(
        &mut self,
        source: &ResearchObject<'_>,
        annotation: &Uri,
    ) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        let original = source
            .aggregated_resource(annotation)?
            .filter(|r| r.is_annotation())
            .cloned()
            .ok_or_else(|| RoError::NotFound(format!("annotation {annotation} in {}", source.uri)))?;
        if source.is_evo_annotation(&original) {
            return Err(RoError::Forbidden(format!(
                "annotation {annotation} is managed by the system"
            )));
        }
        let uri = self.rebased(&source.uri, annotation);
        self.ensure_not_reserved(&uri)?;
        self.ensure_unused(&uri)?;
        if let Some(info) = original.as_annotation() {
            let body = self.rebased(&source.uri, &info.body);
            if body.is_within(&self.uri) && self.aggregated_resource(&body)?.is_none() {
                return Err(RoError::BadRequest(format!(
                    "annotation body {body} is not aggregated by {}",
                    self.uri
                )));
            }
            for target in &info.targets {
                let target = self.rebased(&source.uri, target);
                if !self.is_uri_used(&target)? {
                    return Err(RoError::BadRequest(format!(
                        "Annotation target {target} is not part of the research object"
                    )));
                }
            }
        }
        let copied = self.write_op(|ro| ro.copy_annotation_internal(&source.uri, &original))?;
        self.publish_update(copied.uri());
        Ok(copied)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// `uri` moved from `source` into this object; URIs outside `source`
    /// are unchanged.
    fn rebased(&self, source: &Uri, uri: &Uri) -> Uri {
        uri.rebase(source, &self.uri)
    }

    fn rebased_thing(&self, source: &Uri, thing: &Thing) -> Thing {
        Thing {
            uri: self.rebased(source, &thing.uri),
            ..thing.clone()
        }
    }

    /// No precondition checks.
    fn copy_resource_internal(
        &mut self,
        source: &ResearchObject<'_>,
        resource: &AggregatedResource,
    ) -> RoResult<AggregatedResource> {
        let thing = self.rebased_thing(&source.uri, &resource.thing);
        let copied = if source.is_internal(resource.uri())? {
            let path = source.content_path(resource.uri())?;
            let bytes = self.builder.content().get_file(&source.uri, &path)?;
            let stats = self.builder.content().get_file_info(&source.uri, &path)?;
            self.aggregate_internal(thing, Some((&bytes, &stats.mime_type)))?
        } else {
            self.aggregate_internal(thing, None)?
        };
        if let Some(graph) = self.builder.graphs().read_graph(resource.uri())? {
            let graph = graph.map_iris(|iri| match Uri::parse(iri) {
                Ok(uri) => self.rebased(&source.uri, &uri).as_str().to_string(),
                Err(_) => iri.to_string(),
            });
            self.builder.graphs().write_graph(copied.uri(), &graph)?;
        }
        debug!(ro = %self.uri, resource = %copied.uri(), "copied resource");
        Ok(copied)
    }

    /// No precondition checks.
    fn copy_folder_internal(
        &mut self,
        source: &Uri,
        folder: &AggregatedResource,
        entries: &BTreeMap<Uri, FolderEntry>,
        root: bool,
    ) -> RoResult<AggregatedResource> {
        let thing = self.rebased_thing(source, &folder.thing);
        let entries: Vec<(Uri, String)> = entries
            .values()
            .map(|e| (self.rebased(source, &e.proxy_for), e.name.clone()))
            .collect();
        self.create_folder_internal(thing, entries, root)
    }

    /// No precondition checks; the body graph is not touched.
    fn copy_annotation_internal(
        &mut self,
        source: &Uri,
        annotation: &AggregatedResource,
    ) -> RoResult<AggregatedResource> {
        let info = annotation
            .as_annotation()
            .ok_or_else(|| RoError::BadRequest(format!("{} is not an annotation", annotation.uri())))?;
        let kind = ResourceKind::Annotation(AnnotationInfo {
            body: self.rebased(source, &info.body),
            targets: info.targets.iter().map(|t| self.rebased(source, t)).collect(),
        });
        let copied = self.add_member(AggregatedResource {
            thing: self.rebased_thing(source, &annotation.thing),
            aggregation: self.uri.clone(),
            proxy: None,
            kind,
        })?;
        debug!(ro = %self.uri, annotation = %copied.uri(), "copied annotation");
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rosr_content::FsContentStore;
    use rosr_graph::vocab::{rdf, ro, roevo};
    use rosr_graph::{ntriples, DirGraphStore, Term};

    use crate::builder::Builder;
    use crate::notify::RecordingSink;
    use crate::testing::{builder, recording_builder, uri, user};

    fn ro1() -> Uri {
        uri("http://ex/ro1/")
    }

    fn ro2() -> Uri {
        uri("http://ex/ro2/")
    }

    const BODY: &str = "<http://ex/ro1/a.txt> <http://purl.org/dc/terms/title> \"A\" .\n";

    /// ro1 with an internal and an external resource, a folder listing
    /// both, and an annotation with an N-Triples body.
    fn populated(b: &Builder) -> ResearchObject<'_> {
        let mut ro = ResearchObject::create(b, &ro1()).unwrap();
        ro.aggregate("a.txt", b"alpha", "text/plain").unwrap();
        ro.aggregate_external(&uri("http://elsewhere.org/ext")).unwrap();
        let description = format!(
            "<dir/> <{t}> <{f}> .\n<dir/> <{agg}> <a.txt> .\n<dir/> <{agg}> <http://elsewhere.org/ext> .\n\
             _:e <{t}> <{fe}> .\n_:e <{pf}> <a.txt> .\n_:e <{name}> \"first\" .\n",
            t = rdf::TYPE,
            f = ro::FOLDER,
            fe = ro::FOLDER_ENTRY,
            agg = rosr_graph::vocab::ore::AGGREGATES,
            pf = rosr_graph::vocab::ore::PROXY_FOR,
            name = ro::ENTRY_NAME,
        );
        ro.aggregate_folder("dir", &description).unwrap();
        ro.annotate_with_body("body.nt", BODY.as_bytes(), ntriples::MEDIA_TYPE, &["a.txt"], Some("ann"))
            .unwrap();
        ro
    }

    fn folder_layout(ro: &ResearchObject<'_>) -> Vec<(String, String)> {
        let mut layout: Vec<(String, String)> = ro
            .all_folder_entries()
            .unwrap()
            .iter()
            .flat_map(move |(folder, entries)| {
                entries.values().map(move |e| {
                    let target = ro.uri().relativize(&e.proxy_for).unwrap_or(e.proxy_for.to_string());
                    (format!("{}{}", ro.uri().relativize(folder).unwrap(), e.name), target)
                })
            })
            .collect();
        layout.sort();
        layout
    }

    // -----------------------------------------------------------------------
    // Evolution links
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_links_both_ways() {
        let b = builder();
        let mut live = ResearchObject::create(&b, &ro1()).unwrap();
        let snapshot = live.copy(&ro2(), EvoType::Snapshot).unwrap();

        let manifest = b.graphs().read_graph(snapshot.manifest_uri()).unwrap().unwrap();
        assert!(manifest.has_type(&Term::from(&ro2()), roevo::SNAPSHOT_RO));
        assert!(manifest.contains(&Term::from(&ro2()), roevo::IS_SNAPSHOT_OF, &Term::from(&ro1())));
        assert_eq!(snapshot.evo_type().unwrap(), EvoType::Snapshot);

        let origin = snapshot.immutable_evo_info().unwrap().unwrap();
        assert_eq!(origin.live, ro1());
        assert_eq!(origin.copied_by, Some(user().uri));
        assert_eq!(origin.copied_by_name.as_deref(), Some("Jo Smith"));
        assert!(origin.copied_at.is_some());

        let copies = &live.live_evo_info().unwrap().unwrap().copies;
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].uri, ro2());
        assert_eq!(copies[0].evo_type, EvoType::Snapshot);

        let reread = ResearchObject::get(&b, &ro1()).unwrap().unwrap();
        assert_eq!(reread.live_evo_info().unwrap().unwrap().snapshots().count(), 1);
    }

    #[test]
    fn copy_keeps_original_authorship() {
        let b = builder();
        let mut live = ResearchObject::create(&b, &ro1()).unwrap();
        let created = live.created().unwrap();
        let archive = live.copy(&ro2(), EvoType::Archived).unwrap();
        assert_eq!(archive.created().unwrap(), created);
        assert_eq!(archive.creator().unwrap(), Some(&user().uri));
        assert_eq!(archive.evo_type().unwrap(), EvoType::Archived);
    }

    #[test]
    fn live_accumulates_copies_but_copies_are_frozen() {
        let b = builder();
        let mut live = ResearchObject::create(&b, &ro1()).unwrap();
        let mut s1 = live.copy(&uri("http://ex/s1/"), EvoType::Snapshot).unwrap();
        live.copy(&uri("http://ex/s2/"), EvoType::Snapshot).unwrap();
        live.copy(&uri("http://ex/a1/"), EvoType::Archived).unwrap();

        let info = live.live_evo_info().unwrap().unwrap();
        assert_eq!(info.snapshots().count(), 2);
        assert_eq!(info.archives().count(), 1);
        let times: Vec<_> = info.copies.iter().map(|c| c.copied_at).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);

        assert!(matches!(s1.copy(&uri("http://ex/s3/"), EvoType::Snapshot), Err(RoError::Forbidden(_))));
        assert!(matches!(s1.aggregate("x.txt", b"x", "text/plain"), Err(RoError::Forbidden(_))));
        assert!(matches!(s1.annotate("http://e/b", &["."], None), Err(RoError::Forbidden(_))));
        assert!(matches!(
            s1.aggregate_folder("dir", ""),
            Err(RoError::Forbidden(_))
        ));
    }

    #[test]
    fn copy_preconditions() {
        let b = builder();
        let mut live = ResearchObject::create(&b, &ro1()).unwrap();
        ResearchObject::create(&b, &ro2()).unwrap();
        assert!(matches!(live.copy(&ro2(), EvoType::Snapshot), Err(RoError::Conflict(_))));
        assert!(matches!(live.copy(&ro1(), EvoType::Snapshot), Err(RoError::Conflict(_))));
        assert!(matches!(
            live.copy(&uri("http://ex/ro1/inner/"), EvoType::Snapshot),
            Err(RoError::Conflict(_))
        ));
        assert!(matches!(
            live.copy(&uri("http://ex/ro3/"), EvoType::Live),
            Err(RoError::BadRequest(_))
        ));
        assert!(live.live_evo_info().unwrap().unwrap().copies.is_empty());
    }

    #[test]
    fn copy_publishes_events() {
        let sink = Arc::new(RecordingSink::new());
        let b = recording_builder(sink.clone());
        let mut live = ResearchObject::create(&b, &ro1()).unwrap();
        live.copy(&ro2(), EvoType::Snapshot).unwrap();
        let events = sink.events();
        assert!(events.contains(&RoEvent::Created { ro: ro2() }));
        assert!(events.contains(&RoEvent::Updated {
            ro: ro1(),
            resource: uri("http://ex/ro1/.ro/evo_info.ttl"),
        }));
    }

    // -----------------------------------------------------------------------
    // Topology
    // -----------------------------------------------------------------------

    #[test]
    fn copy_preserves_topology() {
        let b = builder();
        let mut live = populated(&b);
        let copy = live.copy(&ro2(), EvoType::Snapshot).unwrap();

        assert_eq!(folder_layout(&copy), folder_layout(&live));
        assert_eq!(
            folder_layout(&copy),
            vec![
                ("dir/ext".to_string(), "http://elsewhere.org/ext".to_string()),
                ("dir/first".to_string(), "a.txt".to_string()),
            ]
        );

        let a2 = uri("http://ex/ro2/a.txt");
        assert_eq!(copy.resource_content(&a2).unwrap(), b"alpha");
        assert!(copy.is_uri_used(&uri("http://elsewhere.org/ext")).unwrap());
        assert!(!copy.is_internal(&uri("http://elsewhere.org/ext")).unwrap());

        let ann = copy
            .aggregated_resource(&uri("http://ex/ro2/.ro/annotations/ann"))
            .unwrap()
            .unwrap()
            .as_annotation()
            .unwrap()
            .clone();
        assert_eq!(ann.body, uri("http://ex/ro2/body.nt"));
        assert_eq!(ann.targets.iter().collect::<Vec<_>>(), vec![&a2]);
        assert_eq!(copy.annotations().unwrap().len(), 2, "copied plus its own evolution annotation");

        let description = copy.description().unwrap();
        assert!(description.contains(
            &Term::from(&a2),
            "http://purl.org/dc/terms/title",
            &Term::literal("A"),
        ));

        for entries in copy.all_folder_entries().unwrap().values() {
            for entry in entries.values() {
                assert!(copy.aggregated().unwrap().contains_key(&entry.proxy_for));
            }
        }
    }

    #[test]
    fn copy_survives_reload() {
        let b = builder();
        let mut live = populated(&b);
        live.copy(&ro2(), EvoType::Archived).unwrap();
        let reread = ResearchObject::get(&b, &ro2()).unwrap().unwrap();
        assert_eq!(reread.evo_type().unwrap(), EvoType::Archived);
        assert_eq!(reread.immutable_evo_info().unwrap().unwrap().live, ro1());
        assert_eq!(folder_layout(&reread), folder_layout(&live));
    }

    // -----------------------------------------------------------------------
    // Single members
    // -----------------------------------------------------------------------

    #[test]
    fn members_copy_one_by_one() {
        let b = builder();
        let source = populated(&b);
        let mut target = ResearchObject::create(&b, &ro2()).unwrap();
        let ann = uri("http://ex/ro1/.ro/annotations/ann");
        let dir = uri("http://ex/ro1/dir/");

        assert!(matches!(target.copy_annotation(&source, &ann), Err(RoError::BadRequest(_))));
        assert!(matches!(target.copy_folder(&source, &dir), Err(RoError::BadRequest(_))));
        assert_eq!(target.aggregated().unwrap().len(), 2, "evolution info body and its annotation");

        let a2 = target.copy_resource(&source, &uri("http://ex/ro1/a.txt")).unwrap();
        assert_eq!(a2.uri(), &uri("http://ex/ro2/a.txt"));
        assert_eq!(target.resource_content(a2.uri()).unwrap(), b"alpha");
        let ext = target.copy_resource(&source, &uri("http://elsewhere.org/ext")).unwrap();
        assert_eq!(ext.uri(), &uri("http://elsewhere.org/ext"));
        assert!(!target.is_internal(ext.uri()).unwrap());
        target.copy_resource(&source, &uri("http://ex/ro1/body.nt")).unwrap();

        let folder = target.copy_folder(&source, &dir).unwrap();
        assert_eq!(folder.uri(), &uri("http://ex/ro2/dir/"));
        assert_eq!(folder_layout(&target), folder_layout(&source));

        let copied = target.copy_annotation(&source, &ann).unwrap();
        assert_eq!(copied.uri(), &uri("http://ex/ro2/.ro/annotations/ann"));
        assert_eq!(copied.as_annotation().unwrap().body, uri("http://ex/ro2/body.nt"));
        assert!(target.description().unwrap().contains(
            &Term::from(a2.uri()),
            "http://purl.org/dc/terms/title",
            &Term::literal("A"),
        ));

        let reread = ResearchObject::get(&b, &ro2()).unwrap().unwrap();
        assert_eq!(folder_layout(&reread), folder_layout(&source));
        assert_eq!(reread.annotations_about(a2.uri()).unwrap().len(), 1);
        assert_eq!(source.aggregated().unwrap().len(), reread.aggregated().unwrap().len());
    }

    #[test]
    fn member_copy_preconditions() {
        let b = builder();
        let source = populated(&b);
        let mut target = ResearchObject::create(&b, &ro2()).unwrap();
        let a1 = uri("http://ex/ro1/a.txt");
        target.copy_resource(&source, &a1).unwrap();

        assert!(matches!(target.copy_resource(&source, &a1), Err(RoError::Conflict(_))));
        assert!(matches!(
            target.copy_resource(&source, &uri("http://ex/ro1/missing.txt")),
            Err(RoError::NotFound(_))
        ));
        assert!(matches!(
            target.copy_resource(&source, &uri("http://ex/ro1/dir/")),
            Err(RoError::NotFound(_))
        ));
        assert!(matches!(
            target.copy_resource(&source, source.evo_info_uri()),
            Err(RoError::NotFound(_))
        ));
        assert!(matches!(target.copy_folder(&source, &a1), Err(RoError::NotFound(_))));

        let evo_annotation = source
            .annotations()
            .unwrap()
            .into_iter()
            .find(|a| source.is_evo_annotation(a))
            .unwrap()
            .uri()
            .clone();
        assert!(matches!(
            target.copy_annotation(&source, &evo_annotation),
            Err(RoError::Forbidden(_))
        ));

        let mut frozen = target.copy(&uri("http://ex/s/"), EvoType::Snapshot).unwrap();
        assert!(matches!(
            frozen.copy_resource(&source, &uri("http://elsewhere.org/ext")),
            Err(RoError::Forbidden(_))
        ));
    }

    #[test]
    fn copied_folder_does_not_steal_the_root() {
        let b = builder();
        let mut source = populated(&b);
        let dir = uri("http://ex/ro1/dir/");
        source.set_root_folder(&dir).unwrap();
        let mut target = ResearchObject::create(&b, &ro2()).unwrap();
        target.copy_resource(&source, &uri("http://ex/ro1/a.txt")).unwrap();
        target.copy_resource(&source, &uri("http://elsewhere.org/ext")).unwrap();
        let copied = target.copy_folder(&source, &dir).unwrap();
        assert!(copied.as_folder().unwrap().root);

        let other = format!("<other/> <{}> <{}> .\n", rdf::TYPE, ro::FOLDER);
        source.aggregate_folder("other", &other).unwrap();
        source.set_root_folder(&uri("http://ex/ro1/other/")).unwrap();
        let second = target.copy_folder(&source, &uri("http://ex/ro1/other/")).unwrap();
        assert!(!second.as_folder().unwrap().root);
        assert_eq!(target.root_folder().unwrap().unwrap().uri(), copied.uri());
    }

    // -----------------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------------

    #[test]
    fn deleting_copy_unlinks_it_from_live() {
        let b = builder();
        let mut live = populated(&b);
        let copy = live.copy(&ro2(), EvoType::Snapshot).unwrap();
        let copied: Vec<Uri> = copy.aggregated().unwrap().keys().cloned().collect();
        copy.delete().unwrap();

        assert!(ResearchObject::get(&b, &ro2()).unwrap().is_none());
        let live = ResearchObject::get(&b, &ro1()).unwrap().unwrap();
        assert!(live.live_evo_info().unwrap().unwrap().copies.is_empty());
        for uri in copied.iter().filter(|u| u.is_within(&ro2())) {
            assert!(!live.is_uri_used(uri).unwrap());
        }
        assert_eq!(live.resource_content(&uri("http://ex/ro1/a.txt")).unwrap(), b"alpha");
        assert_eq!(folder_layout(&live).len(), 2);
    }

    #[test]
    fn deleting_populated_object_is_total() {
        let b = builder();
        let live = populated(&b);
        live.delete().unwrap();
        assert!(b.graphs().graph_names().unwrap().is_empty());
        assert!(b.content().list_files(&ro1()).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // File-backed stores
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_on_disk_stores() {
        let graphs_dir = tempfile::tempdir().unwrap();
        let content_dir = tempfile::tempdir().unwrap();
        let open = || {
            Builder::new(
                user(),
                Arc::new(DirGraphStore::open(graphs_dir.path()).unwrap()),
                Arc::new(FsContentStore::open(content_dir.path()).unwrap()),
            )
        };

        {
            let b = open();
            let mut live = populated(&b);
            live.copy(&ro2(), EvoType::Snapshot).unwrap();
        }

        let b = open();
        let live = ResearchObject::get(&b, &ro1()).unwrap().unwrap();
        let snapshot = ResearchObject::get(&b, &ro2()).unwrap().unwrap();
        assert_eq!(snapshot.evo_type().unwrap(), EvoType::Snapshot);
        assert_eq!(folder_layout(&snapshot), folder_layout(&live));
        assert_eq!(snapshot.resource_content(&uri("http://ex/ro2/a.txt")).unwrap(), b"alpha");
        assert_eq!(ResearchObject::list(&b, None).unwrap(), vec![ro1(), ro2()]);
    }
}
