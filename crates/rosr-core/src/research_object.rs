//! The root aggregate.
//!
//! A [`ResearchObject`] is a handle on one research object: its URI, the
//! [`Builder`] it was obtained through, and lazily filled caches of what its
//! manifest and folder resource maps say. Every mutating operation writes the
//! content store first, then the metadata store, then re-serializes the
//! affected resource maps, and finally updates the caches it has already
//! filled. Caches are never refreshed behind the caller's back.
//!
//! Folder and annotation operations live in [`crate::folder`] and
//! [`crate::annotation`]; copying lives in [`crate::evo`].

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rosr_content::stats::clean_path;
use rosr_content::PhysicalStats;
use rosr_graph::vocab::ro as ro_vocab;
use rosr_graph::{Graph, Term, TxMode};
use rosr_types::{EvoType, Uri};
use tracing::{debug, info, warn};

use crate::builder::Builder;
use crate::error::{RoError, RoResult};
use crate::evo::builder::{extract_evo_type, for_type};
use crate::evo::info::{EvoInfo, ImmutableEvoInfo, LiveEvoInfo};
use crate::manifest;
use crate::notify::RoEvent;
use crate::proxy::{FolderEntry, Proxy};
use crate::resource_map::{ResourceMap, FOLDER_MAP_NAME};
use crate::thing::{AggregatedResource, AnnotationInfo, ResourceKind, Thing};

/// Load `cell` on first use.
pub(crate) fn cached<'c, T>(
    cell: &'c OnceCell<T>,
    load: impl FnOnce() -> RoResult<T>,
) -> RoResult<&'c T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = load()?;
    Ok(cell.get_or_init(|| value))
}

/// Resources, folders and annotations to populate a new research object
/// with. Relative references resolve against the new object.
#[derive(Clone, Debug, Default)]
pub struct RoSeed {
    pub resources: Vec<SeedResource>,
    pub folders: Vec<SeedFolder>,
    pub annotations: Vec<SeedAnnotation>,
}

#[derive(Clone, Debug)]
pub enum SeedResource {
    Internal {
        path: String,
        content: Vec<u8>,
        mime_type: String,
    },
    External(Uri),
}

/// A folder and its N-Triples description.
#[derive(Clone, Debug)]
pub struct SeedFolder {
    pub path: String,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct SeedAnnotation {
    pub id: Option<String>,
    pub body: String,
    pub targets: Vec<String>,
}

pub struct ResearchObject<'a> {
    pub(crate) builder: &'a Builder,
    pub(crate) uri: Uri,
    pub(crate) manifest: ResourceMap,
    pub(crate) evo_map: ResourceMap,

    pub(crate) thing: OnceCell<Thing>,
    pub(crate) evo_type: OnceCell<EvoType>,
    pub(crate) evo: OnceCell<EvoInfo>,
    pub(crate) aggregated: OnceCell<BTreeMap<Uri, AggregatedResource>>,
    /// Folder URI to its entries, keyed by entry URI.
    pub(crate) folder_entries: OnceCell<BTreeMap<Uri, BTreeMap<Uri, FolderEntry>>>,

    // Derived from the caches above; dropped whenever those change.
    pub(crate) proxies: OnceCell<BTreeMap<Uri, Proxy>>,
    pub(crate) annotations_by_target: OnceCell<BTreeMap<Uri, BTreeSet<Uri>>>,
    pub(crate) annotations_by_body: OnceCell<BTreeMap<Uri, BTreeSet<Uri>>>,
    pub(crate) entries_by_resource: OnceCell<BTreeMap<Uri, BTreeSet<Uri>>>,
}

impl<'a> ResearchObject<'a> {
    /// A handle without any store access.
    pub(crate) fn handle(builder: &'a Builder, uri: &Uri) -> RoResult<Self> {
        let uri = uri.with_trailing_slash();
        Ok(Self {
            builder,
            manifest: ResourceMap::manifest(&uri)?,
            evo_map: ResourceMap::evo_info(&uri)?,
            uri,
            thing: OnceCell::new(),
            evo_type: OnceCell::new(),
            evo: OnceCell::new(),
            aggregated: OnceCell::new(),
            folder_entries: OnceCell::new(),
            proxies: OnceCell::new(),
            annotations_by_target: OnceCell::new(),
            annotations_by_body: OnceCell::new(),
            entries_by_resource: OnceCell::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Create an empty LIVE research object at `uri`.
    ///
    /// Fails with [`RoError::Conflict`] if a manifest already exists there.
    pub fn create(builder: &'a Builder, uri: &Uri) -> RoResult<Self> {
        let thing = builder.build_thing(uri.with_trailing_slash());
        let ro = Self::create_internal(builder, thing, EvoType::Live)?;
        info!(ro = %ro.uri, "created research object");
        builder.publish(RoEvent::Created { ro: ro.uri.clone() });
        Ok(ro)
    }

    /// Create the manifest, the evolution information body and its reserved
    /// annotation. The creator and creation time come from `thing`.
    pub(crate) fn create_internal(
        builder: &'a Builder,
        thing: Thing,
        evo_type: EvoType,
    ) -> RoResult<Self> {
        let mut ro = Self::handle(builder, &thing.uri)?;
        let thing = Thing {
            uri: ro.uri.clone(),
            ..thing
        };
        ro.write_op(|ro| {
            if ro.manifest.exists(ro.builder)? {
                return Err(RoError::Conflict(format!(
                    "research object {} already exists",
                    ro.uri
                )));
            }
            let strategy = for_type(evo_type);
            ro.manifest.update(ro.builder, |g| {
                manifest::save_research_object(g, &thing, ro.manifest.uri());
                strategy.save_type(g, &ro.uri);
            })?;
            ro.manifest.serialize(ro.builder)?;
            ro.evo_map.update(ro.builder, |g| strategy.save_type(g, &ro.uri))?;
            ro.evo_map.serialize(ro.builder)?;

            let evo_uri = ro.evo_map.uri().clone();
            ro.add_member(AggregatedResource {
                thing: Thing::new(evo_uri.clone(), thing.creator.clone(), thing.created),
                aggregation: ro.uri.clone(),
                proxy: None,
                kind: ResourceKind::EvoInfo,
            })?;
            let annotation = ro.builder.build_annotation_uri(&ro.uri, None)?;
            ro.add_member(AggregatedResource {
                thing: Thing::new(annotation, thing.creator.clone(), thing.created),
                aggregation: ro.uri.clone(),
                proxy: None,
                kind: ResourceKind::Annotation(AnnotationInfo {
                    body: evo_uri,
                    targets: BTreeSet::from([ro.uri.clone()]),
                }),
            })?;
            Ok(())
        })?;
        ro.thing = OnceCell::from(thing);
        ro.evo_type = OnceCell::from(evo_type);
        Ok(ro)
    }

    /// Create a research object and populate it from `seed`.
    ///
    /// Resources and folders must be valid; annotations that fail are
    /// logged and skipped.
    pub fn create_with(builder: &'a Builder, uri: &Uri, seed: &RoSeed) -> RoResult<Self> {
        let mut ro = Self::create(builder, uri)?;
        for resource in &seed.resources {
            match resource {
                SeedResource::Internal {
                    path,
                    content,
                    mime_type,
                } => {
                    ro.aggregate(path, content, mime_type)?;
                }
                SeedResource::External(uri) => {
                    ro.aggregate_external(uri)?;
                }
            }
        }
        for folder in &seed.folders {
            ro.aggregate_folder(&folder.path, &folder.description)?;
        }
        for annotation in &seed.annotations {
            let targets: Vec<&str> = annotation.targets.iter().map(String::as_str).collect();
            if let Err(e) = ro.annotate(&annotation.body, &targets, annotation.id.as_deref()) {
                warn!(ro = %ro.uri, body = %annotation.body, error = %e, "skipping invalid annotation");
            }
        }
        Ok(ro)
    }

    /// The research object at `uri`, or `None` if it has no manifest.
    pub fn get(builder: &'a Builder, uri: &Uri) -> RoResult<Option<Self>> {
        let ro = Self::handle(builder, uri)?;
        let exists = builder.transaction(TxMode::Read, || ro.manifest.exists(builder))?;
        Ok(exists.then_some(ro))
    }

    /// URIs of every stored research object, optionally only those created
    /// by `creator`.
    pub fn list(builder: &Builder, creator: Option<&Uri>) -> RoResult<Vec<Uri>> {
        builder.transaction(TxMode::Read, || {
            let mut found = BTreeSet::new();
            for name in builder.graphs().graph_names()? {
                let Some(graph) = builder.graphs().read_graph(&name)? else {
                    continue;
                };
                for subject in graph.instances_of(ro_vocab::RESEARCH_OBJECT) {
                    let Some(uri) = subject.to_uri() else {
                        continue;
                    };
                    if ResourceMap::manifest(&uri)?.uri() != &name {
                        continue;
                    }
                    let thing = Thing::extract(&graph, uri);
                    if creator.map_or(true, |c| thing.creator.as_ref() == Some(c)) {
                        found.insert(thing.uri);
                    }
                }
            }
            Ok(found.into_iter().collect())
        })
    }

    /// Delete every aggregated resource, the manifest and the content
    /// container.
    ///
    /// Individual member deletions that fail are logged and skipped. A
    /// snapshot or archive also disappears from its live origin's evolution
    /// information.
    pub fn delete(mut self) -> RoResult<()> {
        let origin = match self.evo_info() {
            Ok(EvoInfo::Immutable(info)) => Some(info.clone()),
            Ok(EvoInfo::Live(_)) => None,
            Err(e) => {
                warn!(ro = %self.uri, error = %e, "deleting research object without evolution information");
                None
            }
        };

        self.write_op(|ro| {
            let members: Vec<AggregatedResource> = ro.aggregated()?.values().cloned().collect();
            let (annotations, rest): (Vec<_>, Vec<_>) =
                members.into_iter().partition(AggregatedResource::is_annotation);
            let (folders, resources): (Vec<_>, Vec<_>) =
                rest.into_iter().partition(AggregatedResource::is_folder);
            for member in annotations.iter().chain(&resources).chain(&folders) {
                if let Err(e) = ro.delete_member(member.uri()) {
                    warn!(ro = %ro.uri, resource = %member.uri(), error = %e, "failed to delete aggregated resource");
                }
            }
            ro.manifest.delete(ro.builder)?;
            ro.builder.graphs().delete_graph(ro.evo_map.uri())?;
            ro.builder.content().delete_container(&ro.uri)?;
            Ok(())
        })?;

        if let Some(origin) = origin {
            if let Err(e) = self.unlink_from_live(&origin) {
                warn!(ro = %self.uri, live = %origin.live, error = %e, "failed to unlink copy from live research object");
            }
        }
        self.builder.remove_index(&self.uri);
        info!(ro = %self.uri, "deleted research object");
        self.builder.publish(RoEvent::Deleted { ro: self.uri.clone() });
        Ok(())
    }

    fn unlink_from_live(&self, origin: &ImmutableEvoInfo) -> RoResult<()> {
        let map = ResourceMap::evo_info(&origin.live)?;
        if !map.exists(self.builder)? {
            return Ok(());
        }
        let strategy = for_type(origin.evo_type);
        self.builder.transaction(TxMode::Write, || {
            map.update(self.builder, |g| strategy.remove_copy(g, &origin.live, &self.uri))?;
            map.serialize(self.builder)
        })?;
        self.builder.publish(RoEvent::Updated {
            ro: origin.live.clone(),
            resource: map.uri().clone(),
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Identity and evolution
    // -----------------------------------------------------------------------

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn builder(&self) -> &'a Builder {
        self.builder
    }

    pub fn manifest_uri(&self) -> &Uri {
        self.manifest.uri()
    }

    pub fn evo_info_uri(&self) -> &Uri {
        self.evo_map.uri()
    }

    pub fn thing(&self) -> RoResult<&Thing> {
        cached(&self.thing, || {
            let graph = self.manifest.load(self.builder)?;
            Ok(Thing::extract(&graph, self.uri.clone()))
        })
    }

    pub fn creator(&self) -> RoResult<Option<&Uri>> {
        Ok(self.thing()?.creator.as_ref())
    }

    pub fn created(&self) -> RoResult<Option<DateTime<Utc>>> {
        Ok(self.thing()?.created)
    }

    /// Evolution class asserted in the manifest; LIVE if none is.
    pub fn evo_type(&self) -> RoResult<EvoType> {
        cached(&self.evo_type, || {
            let graph = self.manifest.load(self.builder)?;
            Ok(extract_evo_type(&graph, &self.uri).unwrap_or_default())
        })
        .copied()
    }

    pub fn evo_info(&self) -> RoResult<&EvoInfo> {
        cached(&self.evo, || {
            let evo_graph = self.evo_map.load(self.builder)?;
            let manifest = self.manifest.load(self.builder)?;
            EvoInfo::extract(&evo_graph, &manifest, &self.uri).ok_or_else(|| {
                RoError::NotFound(format!("live origin of research object {}", self.uri))
            })
        })
    }

    pub fn live_evo_info(&self) -> RoResult<Option<&LiveEvoInfo>> {
        Ok(self.evo_info()?.as_live())
    }

    pub fn immutable_evo_info(&self) -> RoResult<Option<&ImmutableEvoInfo>> {
        Ok(self.evo_info()?.as_immutable())
    }

    pub(crate) fn ensure_mutable(&self) -> RoResult<()> {
        let evo_type = self.evo_type()?;
        if evo_type.is_immutable() {
            return Err(RoError::Forbidden(format!(
                "research object {} is {evo_type} and cannot change",
                self.uri
            )));
        }
        Ok(())
    }

    /// Manifest, evolution information body and folder resource maps are
    /// maintained by the system only.
    pub(crate) fn is_reserved(&self, uri: &Uri) -> bool {
        uri == self.manifest.uri()
            || uri == self.evo_map.uri()
            || uri.last_segment() == Some(FOLDER_MAP_NAME)
    }

    pub(crate) fn ensure_not_reserved(&self, uri: &Uri) -> RoResult<()> {
        if self.is_reserved(uri) {
            return Err(RoError::Forbidden(format!("{uri} is managed by the system")));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Aggregation views
    // -----------------------------------------------------------------------

    /// Every aggregated resource, folder and annotation.
    pub fn aggregated(&self) -> RoResult<&BTreeMap<Uri, AggregatedResource>> {
        cached(&self.aggregated, || {
            let graph = self.manifest.load(self.builder)?;
            let all = manifest::extract_aggregated(&graph, &self.uri);
            debug!(ro = %self.uri, count = all.len(), "loaded aggregated resources");
            Ok(all)
        })
    }

    pub fn aggregated_resource(&self, uri: &Uri) -> RoResult<Option<&AggregatedResource>> {
        Ok(self.aggregated()?.get(uri))
    }

    /// Plain resources, including the evolution information body.
    pub fn resources(&self) -> RoResult<Vec<&AggregatedResource>> {
        Ok(self.aggregated()?.values().filter(|r| r.is_resource()).collect())
    }

    pub fn folders(&self) -> RoResult<Vec<&AggregatedResource>> {
        Ok(self.aggregated()?.values().filter(|r| r.is_folder()).collect())
    }

    pub fn annotations(&self) -> RoResult<Vec<&AggregatedResource>> {
        Ok(self.aggregated()?.values().filter(|r| r.is_annotation()).collect())
    }

    /// Proxies keyed by proxy URI.
    pub fn proxies(&self) -> RoResult<&BTreeMap<Uri, Proxy>> {
        cached(&self.proxies, || {
            Ok(self
                .aggregated()?
                .values()
                .filter_map(|r| {
                    let uri = r.proxy.clone()?;
                    Some((
                        uri.clone(),
                        Proxy {
                            uri,
                            proxy_for: r.uri().clone(),
                            proxy_in: self.uri.clone(),
                        },
                    ))
                })
                .collect())
        })
    }

    /// Returns `true` if `uri` names this object, its manifest, or any
    /// aggregated resource, proxy, folder entry or folder resource map.
    pub fn is_uri_used(&self, uri: &Uri) -> RoResult<bool> {
        if uri == &self.uri || uri == self.manifest.uri() {
            return Ok(true);
        }
        let aggregated = self.aggregated()?;
        if aggregated.contains_key(uri) || self.proxies()?.contains_key(uri) {
            return Ok(true);
        }
        if aggregated
            .values()
            .filter_map(AggregatedResource::as_folder)
            .any(|f| &f.resource_map == uri)
        {
            return Ok(true);
        }
        Ok(self
            .all_folder_entries()?
            .values()
            .any(|entries| entries.contains_key(uri)))
    }

    pub(crate) fn ensure_unused(&self, uri: &Uri) -> RoResult<()> {
        if self.is_uri_used(uri)? {
            return Err(RoError::Conflict(format!(
                "{uri} is already used in research object {}",
                self.uri
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// Store `content` at `path` inside this object and aggregate it.
    pub fn aggregate(
        &mut self,
        path: &str,
        content: &[u8],
        mime_type: &str,
    ) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        let path = clean_path(path)?;
        let uri = self.uri.resolve(&path)?;
        self.ensure_not_reserved(&uri)?;
        self.ensure_unused(&uri)?;
        let thing = self.builder.build_thing(uri);
        let resource = self.write_op(|ro| ro.aggregate_internal(thing, Some((content, mime_type))))?;
        self.publish_update(resource.uri());
        Ok(resource)
    }

    /// Aggregate a resource whose bytes live elsewhere.
    pub fn aggregate_external(&mut self, uri: &Uri) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        self.ensure_not_reserved(uri)?;
        self.ensure_unused(uri)?;
        let thing = self.builder.build_thing(uri.clone());
        let resource = self.write_op(|ro| ro.aggregate_internal(thing, None))?;
        self.publish_update(resource.uri());
        Ok(resource)
    }

    /// Write content (if any), then aggregate. No precondition checks.
    pub(crate) fn aggregate_internal(
        &mut self,
        thing: Thing,
        content: Option<(&[u8], &str)>,
    ) -> RoResult<AggregatedResource> {
        let stats = match content {
            Some((bytes, mime_type)) => {
                let path = self.content_path(&thing.uri)?;
                Some(self.builder.content().put_file(&self.uri, &path, bytes, mime_type)?)
            }
            None => None,
        };
        self.add_member(AggregatedResource {
            thing,
            aggregation: self.uri.clone(),
            proxy: None,
            kind: ResourceKind::Resource { stats },
        })
    }

    /// Replace the bytes of an aggregated resource.
    pub fn update_resource(
        &mut self,
        uri: &Uri,
        content: &[u8],
        mime_type: &str,
    ) -> RoResult<PhysicalStats> {
        self.ensure_mutable()?;
        self.ensure_not_reserved(uri)?;
        match self.aggregated_resource(uri)? {
            Some(r) if r.is_resource() => {}
            _ => return Err(RoError::NotFound(format!("resource {uri} is not aggregated"))),
        }
        let path = self.content_path(uri)?;
        let is_body = self.annotations_by_body()?.contains_key(uri);
        let stats = self.write_op(|ro| {
            let stats = ro.builder.content().put_file(&ro.uri, &path, content, mime_type)?;
            if is_body {
                ro.store_body_graph(uri, content, mime_type)?;
            }
            Ok(stats)
        })?;
        self.refresh_stats(uri, stats.clone());
        debug!(ro = %self.uri, resource = %uri, size = stats.size, "updated resource content");
        self.publish_update(uri);
        Ok(stats)
    }

    /// De-aggregate a resource, folder or annotation.
    ///
    /// Removes stored content, the proxy, the manifest entry and every
    /// folder entry pointing at it.
    pub fn delete_resource(&mut self, uri: &Uri) -> RoResult<()> {
        self.ensure_mutable()?;
        self.ensure_not_reserved(uri)?;
        if self.aggregated_resource(uri)?.is_none() {
            return Err(RoError::NotFound(format!("resource {uri} is not aggregated")));
        }
        self.write_op(|ro| ro.delete_member(uri))?;
        self.publish_update(uri);
        Ok(())
    }

    /// De-aggregate the resource a proxy stands for.
    pub fn delete_proxy(&mut self, proxy: &Uri) -> RoResult<()> {
        let target = self
            .proxies()?
            .get(proxy)
            .map(|p| p.proxy_for.clone())
            .ok_or_else(|| RoError::NotFound(format!("proxy {proxy}")))?;
        self.delete_resource(&target)
    }

    /// Dispatch deletion on the member's kind. No precondition checks.
    pub(crate) fn delete_member(&mut self, uri: &Uri) -> RoResult<()> {
        let resource = self
            .aggregated_resource(uri)?
            .cloned()
            .ok_or_else(|| RoError::NotFound(format!("resource {uri} is not aggregated")))?;
        match &resource.kind {
            ResourceKind::Folder(_) => self.delete_folder_internal(&resource),
            ResourceKind::Annotation(_) => self.delete_annotation_internal(&resource),
            ResourceKind::Resource { .. } | ResourceKind::EvoInfo => {
                if let Ok(path) = self.content_path(uri) {
                    self.builder.content().delete_file(&self.uri, &path)?;
                    self.builder.graphs().delete_graph(uri)?;
                }
                self.remove_entries_for(uri)?;
                self.remove_member(uri)
            }
        }
    }

    pub fn resource_content(&self, uri: &Uri) -> RoResult<Vec<u8>> {
        let path = self.content_path(uri)?;
        Ok(self.builder.content().get_file(&self.uri, &path)?)
    }

    /// Physical statistics of an internal resource; `None` for external
    /// ones.
    pub fn resource_stats(&self, uri: &Uri) -> RoResult<Option<PhysicalStats>> {
        if !self.is_internal(uri)? {
            return Ok(None);
        }
        let path = self.content_path(uri)?;
        Ok(Some(self.builder.content().get_file_info(&self.uri, &path)?))
    }

    /// Returns `true` if the content store holds bytes for `uri`.
    pub fn is_internal(&self, uri: &Uri) -> RoResult<bool> {
        match self.content_path(uri) {
            Ok(path) => Ok(self.builder.content().file_exists(&self.uri, &path)?),
            Err(_) => Ok(false),
        }
    }

    /// What an exporter would include: every internal aggregated resource
    /// and every resource map.
    pub fn serializables(&self) -> RoResult<BTreeSet<Uri>> {
        let mut uris = BTreeSet::from([self.manifest.uri().clone()]);
        for resource in self.aggregated()?.values() {
            if let Some(folder) = resource.as_folder() {
                uris.insert(folder.resource_map.clone());
            } else if self.is_internal(resource.uri())? {
                uris.insert(resource.uri().clone());
            }
        }
        Ok(uris)
    }

    // -----------------------------------------------------------------------
    // Description and search index
    // -----------------------------------------------------------------------

    /// Manifest statements about this object plus every annotation body
    /// stored as a graph.
    pub fn description(&self) -> RoResult<Graph> {
        let manifest = self.manifest.load(self.builder)?;
        let subject = Term::from(&self.uri);
        let mut description: Graph = manifest.about(&subject).cloned().collect();
        let bodies: BTreeSet<&Uri> = self
            .aggregated()?
            .values()
            .filter_map(AggregatedResource::as_annotation)
            .map(|a| &a.body)
            .collect();
        for body in bodies {
            if let Some(graph) = self.builder.graphs().read_graph(body)? {
                description.extend(&graph);
            }
        }
        Ok(description)
    }

    pub fn update_index(&self) -> RoResult<()> {
        let description = self.description()?;
        self.builder.index_object(&self.uri, &description);
        Ok(())
    }

    pub fn delete_index(&self) {
        self.builder.remove_index(&self.uri);
    }

    // -----------------------------------------------------------------------
    // Internals shared with folders, annotations and copies
    // -----------------------------------------------------------------------

    /// Run `op` in a write transaction. On failure every cache is dropped,
    /// since the stores may no longer match them.
    pub(crate) fn write_op<T>(&mut self, op: impl FnOnce(&mut Self) -> RoResult<T>) -> RoResult<T> {
        let builder = self.builder;
        let result = builder.transaction(TxMode::Write, || op(self));
        if result.is_err() {
            self.reset_caches();
        }
        result
    }

    pub(crate) fn reset_caches(&mut self) {
        self.thing.take();
        self.evo_type.take();
        self.evo.take();
        self.aggregated.take();
        self.folder_entries.take();
        self.reset_indices();
    }

    pub(crate) fn reset_indices(&mut self) {
        self.proxies.take();
        self.annotations_by_target.take();
        self.annotations_by_body.take();
        self.entries_by_resource.take();
    }

    /// Replace the cached statistics of a loaded resource.
    pub(crate) fn refresh_stats(&mut self, uri: &Uri, stats: PhysicalStats) {
        if let Some(ResourceKind::Resource { stats: slot }) = self
            .aggregated
            .get_mut()
            .and_then(|all| all.get_mut(uri))
            .map(|r| &mut r.kind)
        {
            *slot = Some(stats);
        }
    }

    /// Content-store path of a URI inside this object.
    pub(crate) fn content_path(&self, uri: &Uri) -> RoResult<String> {
        let relative = self
            .uri
            .relativize(uri)
            .ok_or_else(|| RoError::BadRequest(format!("{uri} is outside research object {}", self.uri)))?;
        Ok(clean_path(&relative)?)
    }

    /// Give `resource` a proxy, write both to the manifest and cache them.
    pub(crate) fn add_member(&mut self, mut resource: AggregatedResource) -> RoResult<AggregatedResource> {
        let proxy = self.builder.build_proxy(&self.uri, resource.uri())?;
        resource.proxy = Some(proxy.uri.clone());
        self.manifest.update(self.builder, |g| {
            manifest::save_resource(g, &resource);
            manifest::save_proxy(g, &proxy);
        })?;
        self.manifest.serialize(self.builder)?;
        if let Some(all) = self.aggregated.get_mut() {
            all.insert(resource.uri().clone(), resource.clone());
        }
        self.reset_indices();
        debug!(ro = %self.uri, resource = %resource.uri(), proxy = %proxy.uri, "aggregated resource");
        Ok(resource)
    }

    /// Rewrite the manifest facts of an already aggregated member.
    pub(crate) fn save_member(&mut self, resource: AggregatedResource) -> RoResult<()> {
        self.manifest
            .update(self.builder, |g| manifest::save_resource(g, &resource))?;
        self.manifest.serialize(self.builder)?;
        if let Some(all) = self.aggregated.get_mut() {
            all.insert(resource.uri().clone(), resource);
        }
        self.reset_indices();
        Ok(())
    }

    /// Drop a member and its proxy from the manifest and the caches.
    pub(crate) fn remove_member(&mut self, uri: &Uri) -> RoResult<()> {
        let proxy = self
            .aggregated_resource(uri)?
            .and_then(|r| r.proxy.clone());
        self.manifest.update(self.builder, |g| {
            manifest::remove_resource(g, &self.uri, uri);
            if let Some(proxy) = &proxy {
                manifest::remove_proxy(g, proxy);
            }
        })?;
        self.manifest.serialize(self.builder)?;
        if let Some(all) = self.aggregated.get_mut() {
            all.remove(uri);
        }
        if let Some(entries) = self.folder_entries.get_mut() {
            entries.remove(uri);
        }
        self.reset_indices();
        debug!(ro = %self.uri, resource = %uri, "de-aggregated resource");
        Ok(())
    }

    pub(crate) fn publish_update(&self, resource: &Uri) {
        self.builder.publish(RoEvent::Updated {
            ro: self.uri.clone(),
            resource: resource.clone(),
        });
    }
}

impl std::fmt::Debug for ResearchObject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchObject")
            .field("uri", &self.uri)
            .field("loaded", &self.aggregated.get().map(BTreeMap::len))
            .finish()
    }
}
