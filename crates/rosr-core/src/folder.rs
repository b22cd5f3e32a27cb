//! Folders: named, nested views over resources a research object already
//! aggregates.
//!
//! A folder is an aggregated resource of its research object and an
//! aggregation of its own folder entries. Its membership lives in a separate
//! resource map (`<folder>/.folder.rdf`), not in the manifest.

use std::collections::{BTreeMap, BTreeSet};

use rosr_graph::vocab::{ore, rdf, ro};
use rosr_graph::{ntriples, Graph, Term};
use rosr_types::Uri;
use tracing::debug;

use crate::builder::Builder;
use crate::error::{RoError, RoResult};
use crate::proxy::FolderEntry;
use crate::research_object::{cached, ResearchObject};
use crate::resource_map::{ResourceMap, FOLDER_MAP_NAME};
use crate::thing::{AggregatedResource, FolderInfo, ResourceKind, Thing};

fn bad_request(message: impl Into<String>) -> RoError {
    RoError::BadRequest(message.into())
}

/// Validate a folder description against what the research object
/// aggregates and return each member with its entry name.
///
/// The description must hold exactly one `ro:Folder` whose `ore:aggregates`
/// values are aggregated resources. Optional `ro:FolderEntry` individuals
/// name members of that set. Nothing is written.
pub fn assemble(
    description: &Graph,
    aggregated: &BTreeMap<Uri, AggregatedResource>,
) -> RoResult<Vec<(Uri, String)>> {
    let folders = description.instances_of(ro::FOLDER);
    let [folder] = folders.as_slice() else {
        return Err(bad_request("The entity body must define exactly one ro:Folder."));
    };

    let mut members: BTreeMap<Uri, Option<String>> = BTreeMap::new();
    for object in description.objects(folder, ore::AGGREGATES) {
        let Some(uri) = object.to_uri() else {
            return Err(bad_request("Aggregated resources cannot be blank nodes."));
        };
        if !aggregated.contains_key(&uri) {
            return Err(bad_request(format!(
                "Resource {uri} is not aggregated by the research object"
            )));
        }
        members.insert(uri, None);
    }

    for entry in description.instances_of(ro::FOLDER_ENTRY) {
        let Some(proxy_for) = description.object(entry, ore::PROXY_FOR) else {
            return Err(bad_request("Folder entries must have the ore:proxyFor property."));
        };
        let Some(target) = proxy_for.to_uri() else {
            return Err(bad_request("Folder entry ore:proxyFor must be a URI resource."));
        };
        let Some(name) = members.get_mut(&target) else {
            return Err(bad_request(
                "Found a folder entry for a resource that is not aggregated by the folder",
            ));
        };
        if let Some(value) = description.object(entry, ro::ENTRY_NAME) {
            let literal = value
                .as_literal()
                .ok_or_else(|| bad_request("Folder entry ro name must be a literal"))?;
            *name = Some(literal.to_string());
        }
    }

    let mut names = BTreeSet::new();
    let mut entries = Vec::with_capacity(members.len());
    for (target, name) in members {
        let name = name.unwrap_or_else(|| FolderEntry::default_name(&target));
        if !names.insert(name.clone()) {
            return Err(bad_request(format!("Duplicate folder entry name {name}")));
        }
        entries.push((target, name));
    }
    Ok(entries)
}

/// Validate a description of a single folder entry: its target and, if
/// given, its name.
pub fn assemble_entry(description: &Graph) -> RoResult<(Uri, Option<String>)> {
    let individuals = description.instances_of(ro::FOLDER_ENTRY);
    let entry = match individuals.as_slice() {
        [] => return Err(bad_request("The entity body does not define any ro:FolderEntry.")),
        [entry] => *entry,
        _ => return Err(bad_request("The entity body must define exactly one ro:FolderEntry.")),
    };
    let target = description
        .object(entry, ore::PROXY_FOR)
        .ok_or_else(|| bad_request("ore:proxyFor is missing."))?
        .to_uri()
        .ok_or_else(|| bad_request("The ore:proxyFor object is not an URI resource."))?;
    let name = match description.object(entry, ro::ENTRY_NAME) {
        Some(value) => Some(
            value
                .as_literal()
                .ok_or_else(|| bad_request("Folder entry ro name must be a literal"))?
                .to_string(),
        ),
        None => None,
    };
    Ok((target, name))
}

/// Statements a folder resource map makes about the map and the folder.
fn save_folder_header(graph: &mut Graph, ro_uri: &Uri, folder: &Uri, map: &Uri) {
    let folder_term = Term::from(folder);
    let map_term = Term::from(map);
    graph.insert(map_term.clone(), rdf::TYPE, Term::iri(ore::RESOURCE_MAP));
    graph.insert(map_term.clone(), ore::DESCRIBES, folder_term.clone());
    graph.insert(folder_term.clone(), rdf::TYPE, Term::iri(ro::FOLDER));
    graph.insert(folder_term.clone(), rdf::TYPE, Term::iri(ore::AGGREGATION));
    graph.insert(folder_term.clone(), ore::IS_DESCRIBED_BY, map_term);
    graph.insert(folder_term, ore::IS_AGGREGATED_BY, Term::from(ro_uri));
}

fn save_entry(graph: &mut Graph, entry: &FolderEntry) {
    entry.save(graph);
    graph.insert(
        Term::from(&entry.proxy_in),
        ore::AGGREGATES,
        Term::from(&entry.proxy_for),
    );
}

impl<'a> ResearchObject<'a> {
    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Entries of every folder, keyed by folder URI, then by entry URI.
    pub fn all_folder_entries(&self) -> RoResult<&BTreeMap<Uri, BTreeMap<Uri, FolderEntry>>> {
        cached(&self.folder_entries, || {
            let mut all = BTreeMap::new();
            for folder in self.aggregated()?.values() {
                let Some(info) = folder.as_folder() else {
                    continue;
                };
                let graph = self
                    .builder
                    .graphs()
                    .read_graph(&info.resource_map)?
                    .unwrap_or_default();
                let entries: BTreeMap<Uri, FolderEntry> = FolderEntry::extract_all(&graph, folder.uri())
                    .into_iter()
                    .map(|e| (e.uri.clone(), e))
                    .collect();
                debug!(ro = %self.uri, folder = %folder.uri(), count = entries.len(), "loaded folder entries");
                all.insert(folder.uri().clone(), entries);
            }
            Ok(all)
        })
    }

    pub fn folder_entries(&self, folder: &Uri) -> RoResult<Vec<&FolderEntry>> {
        self.folder_info(folder)?;
        Ok(self
            .all_folder_entries()?
            .get(folder)
            .map(|entries| entries.values().collect())
            .unwrap_or_default())
    }

    /// Resource URI to the URIs of folder entries pointing at it.
    pub fn entries_by_resource(&self) -> RoResult<&BTreeMap<Uri, BTreeSet<Uri>>> {
        cached(&self.entries_by_resource, || {
            let mut index: BTreeMap<Uri, BTreeSet<Uri>> = BTreeMap::new();
            for entry in self.all_folder_entries()?.values().flat_map(BTreeMap::values) {
                index
                    .entry(entry.proxy_for.clone())
                    .or_default()
                    .insert(entry.uri.clone());
            }
            Ok(index)
        })
    }

    pub fn root_folder(&self) -> RoResult<Option<&AggregatedResource>> {
        Ok(self
            .aggregated()?
            .values()
            .find(|r| r.as_folder().is_some_and(|f| f.root)))
    }

    fn folder_info(&self, folder: &Uri) -> RoResult<FolderInfo> {
        self.aggregated_resource(folder)?
            .and_then(AggregatedResource::as_folder)
            .cloned()
            .ok_or_else(|| RoError::NotFound(format!("folder {folder}")))
    }

    /// The folder holding entry `entry`, and the entry itself.
    fn find_entry(&self, entry: &Uri) -> RoResult<Option<(Uri, FolderEntry)>> {
        Ok(self
            .all_folder_entries()?
            .iter()
            .find_map(|(folder, entries)| Some((folder.clone(), entries.get(entry)?.clone()))))
    }

    // -----------------------------------------------------------------------
    // Folder lifecycle
    // -----------------------------------------------------------------------

    /// Create a folder at `path` from an N-Triples description whose
    /// relative IRIs resolve against this research object.
    pub fn aggregate_folder(&mut self, path: &str, description: &str) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        let uri = self.folder_uri(path)?;
        self.ensure_unused(&uri)?;
        let graph = ntriples::parse(description, Some(&self.uri))?;
        let entries = assemble(&graph, self.aggregated()?)?;
        let thing = self.builder.build_thing(uri);
        let folder = self.write_op(|ro| ro.create_folder_internal(thing, entries, false))?;
        self.publish_update(folder.uri());
        Ok(folder)
    }

    /// Write the folder resource map with `entries`, then aggregate the
    /// folder. No precondition checks.
    pub(crate) fn create_folder_internal(
        &mut self,
        thing: Thing,
        entries: Vec<(Uri, String)>,
        root: bool,
    ) -> RoResult<AggregatedResource> {
        let folder_uri = thing.uri.clone();
        let map = ResourceMap::folder(&self.uri, &folder_uri)?;
        let built = entries
            .into_iter()
            .map(|(target, name)| self.builder.build_folder_entry(&folder_uri, &target, Some(name)))
            .collect::<RoResult<Vec<_>>>()?;
        map.update(self.builder, |g| {
            save_folder_header(g, &self.uri, &folder_uri, map.uri());
            for entry in &built {
                save_entry(g, entry);
            }
        })?;
        map.serialize(self.builder)?;

        let folder = self.add_member(AggregatedResource {
            thing,
            aggregation: self.uri.clone(),
            proxy: None,
            kind: ResourceKind::Folder(FolderInfo {
                resource_map: map.uri().clone(),
                root,
            }),
        })?;
        if root {
            self.mark_root(&folder_uri);
        }
        if let Some(all) = self.folder_entries.get_mut() {
            all.insert(
                folder_uri.clone(),
                built.into_iter().map(|e| (e.uri.clone(), e)).collect(),
            );
        }
        self.reset_indices();
        debug!(ro = %self.uri, folder = %folder_uri, "created folder");
        Ok(folder)
    }

    /// Delete a folder, its entries and its resource map. The resources it
    /// listed stay aggregated.
    pub fn delete_folder(&mut self, folder: &Uri) -> RoResult<()> {
        self.ensure_mutable()?;
        let resource = self
            .aggregated_resource(folder)?
            .filter(|r| r.is_folder())
            .cloned()
            .ok_or_else(|| RoError::NotFound(format!("folder {folder}")))?;
        self.write_op(|ro| ro.delete_folder_internal(&resource))?;
        self.publish_update(folder);
        Ok(())
    }

    pub(crate) fn delete_folder_internal(&mut self, folder: &AggregatedResource) -> RoResult<()> {
        let uri = folder.uri();
        let entries: Vec<FolderEntry> = self
            .all_folder_entries()?
            .get(uri)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default();
        for entry in &entries {
            self.remove_folder_entry(uri, entry)?;
        }
        if let Some(info) = folder.as_folder() {
            ResourceMap::existing(&self.uri, &info.resource_map)?.delete(self.builder)?;
        }
        self.remove_entries_for(uri)?;
        self.remove_member(uri)?;
        debug!(ro = %self.uri, folder = %uri, entries = entries.len(), "deleted folder");
        Ok(())
    }

    /// Make `folder` the root folder; any previous root stops being one.
    pub fn set_root_folder(&mut self, folder: &Uri) -> RoResult<()> {
        self.ensure_mutable()?;
        let mut resource = self
            .aggregated_resource(folder)?
            .filter(|r| r.is_folder())
            .cloned()
            .ok_or_else(|| RoError::NotFound(format!("folder {folder}")))?;
        if let ResourceKind::Folder(info) = &mut resource.kind {
            info.root = true;
        }
        self.write_op(|ro| ro.save_member(resource))?;
        self.mark_root(folder);
        self.publish_update(folder);
        Ok(())
    }

    fn mark_root(&mut self, folder: &Uri) {
        if let Some(all) = self.aggregated.get_mut() {
            for resource in all.values_mut() {
                if let ResourceKind::Folder(info) = &mut resource.kind {
                    info.root = &resource.thing.uri == folder;
                }
            }
        }
    }

    /// The research object aggregating `folder`, found through the folder's
    /// resource map.
    pub fn locate_folder(builder: &'a Builder, folder: &Uri) -> RoResult<Option<Self>> {
        let folder = folder.with_trailing_slash();
        let map = folder.resolve(FOLDER_MAP_NAME)?;
        let Some(graph) = builder.graphs().read_graph(&map)? else {
            return Ok(None);
        };
        match graph
            .object(&Term::from(&folder), ore::IS_AGGREGATED_BY)
            .and_then(Term::to_uri)
        {
            Some(ro) => Self::get(builder, &ro),
            None => Ok(None),
        }
    }

    fn folder_uri(&self, path: &str) -> RoResult<Uri> {
        let path = rosr_content::stats::clean_path(path.trim_end_matches('/'))?;
        Ok(self.uri.resolve(&format!("{path}/"))?)
    }

    // -----------------------------------------------------------------------
    // Folder entries
    // -----------------------------------------------------------------------

    /// Add `resource` to `folder`, named `name` or after its last path
    /// segment.
    ///
    /// Fails with [`RoError::Conflict`] if the folder already has an entry
    /// for the resource or one with the same name.
    pub fn add_folder_entry(
        &mut self,
        folder: &Uri,
        resource: &Uri,
        name: Option<&str>,
    ) -> RoResult<FolderEntry> {
        self.ensure_mutable()?;
        let info = self.folder_info(folder)?;
        if self.aggregated_resource(resource)?.is_none() {
            return Err(bad_request(format!(
                "Resource {resource} is not aggregated by the research object"
            )));
        }
        let name = name.map_or_else(|| FolderEntry::default_name(resource), str::to_string);
        for existing in self.folder_entries(folder)? {
            if &existing.proxy_for == resource {
                return Err(RoError::Conflict(format!(
                    "folder {folder} already has an entry for {resource}"
                )));
            }
            if existing.name == name {
                return Err(RoError::Conflict(format!(
                    "folder {folder} already has an entry named {name}"
                )));
            }
        }
        let entry = self.builder.build_folder_entry(folder, resource, Some(name))?;
        self.write_op(|ro| ro.save_folder_entry(&info.resource_map, entry.clone()))?;
        self.publish_update(&entry.uri);
        Ok(entry)
    }

    /// Add the entry described by an N-Triples document whose relative
    /// IRIs resolve against the folder.
    pub fn create_folder_entry(&mut self, folder: &Uri, description: &str) -> RoResult<FolderEntry> {
        let graph = ntriples::parse(description, Some(&folder.with_trailing_slash()))?;
        let (target, name) = assemble_entry(&graph)?;
        self.add_folder_entry(folder, &target, name.as_deref())
    }

    pub fn delete_folder_entry(&mut self, entry: &Uri) -> RoResult<()> {
        self.ensure_mutable()?;
        let (folder, found) = self
            .find_entry(entry)?
            .ok_or_else(|| RoError::NotFound(format!("folder entry {entry}")))?;
        self.write_op(|ro| ro.remove_folder_entry(&folder, &found))?;
        self.publish_update(entry);
        Ok(())
    }

    fn save_folder_entry(&mut self, map: &Uri, entry: FolderEntry) -> RoResult<()> {
        let map = ResourceMap::existing(&self.uri, map)?;
        map.update(self.builder, |g| save_entry(g, &entry))?;
        map.serialize(self.builder)?;
        debug!(ro = %self.uri, folder = %entry.proxy_in, entry = %entry.uri, "added folder entry");
        if let Some(all) = self.folder_entries.get_mut() {
            all.entry(entry.proxy_in.clone())
                .or_default()
                .insert(entry.uri.clone(), entry);
        }
        self.reset_indices();
        Ok(())
    }

    fn remove_folder_entry(&mut self, folder: &Uri, entry: &FolderEntry) -> RoResult<()> {
        let info = self.folder_info(folder)?;
        let map = ResourceMap::existing(&self.uri, &info.resource_map)?;
        map.update(self.builder, |g| {
            entry.remove(g);
            let still_listed = FolderEntry::extract_all(g, folder)
                .iter()
                .any(|e| e.proxy_for == entry.proxy_for);
            if !still_listed {
                g.remove_matching(
                    Some(&Term::from(folder)),
                    Some(ore::AGGREGATES),
                    Some(&Term::from(&entry.proxy_for)),
                );
            }
        })?;
        map.serialize(self.builder)?;
        debug!(ro = %self.uri, folder = %folder, entry = %entry.uri, "removed folder entry");
        if let Some(entries) = self.folder_entries.get_mut().and_then(|all| all.get_mut(folder)) {
            entries.remove(&entry.uri);
        }
        self.reset_indices();
        Ok(())
    }

    /// Remove every folder entry pointing at `resource`.
    pub(crate) fn remove_entries_for(&mut self, resource: &Uri) -> RoResult<()> {
        let entry_uris: Vec<Uri> = self
            .entries_by_resource()?
            .get(resource)
            .map(|uris| uris.iter().cloned().collect())
            .unwrap_or_default();
        for uri in entry_uris {
            if let Some((folder, entry)) = self.find_entry(&uri)? {
                self.remove_folder_entry(&folder, &entry)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{builder, uri};
    use proptest::prelude::*;

    fn ro1() -> Uri {
        uri("http://ex/ro1/")
    }

    /// N-Triples folder description listing `members` (relative to the
    /// research object) with optional entry names.
    fn description(members: &[(&str, Option<&str>)]) -> String {
        let folder = Term::iri("http://ex/ro1/dir/");
        let mut g = Graph::new();
        g.insert(folder.clone(), rdf::TYPE, Term::iri(ro::FOLDER));
        for (i, (path, name)) in members.iter().enumerate() {
            let target = Term::from(&ro1().resolve(path).unwrap());
            g.insert(folder.clone(), ore::AGGREGATES, target.clone());
            if let Some(name) = name {
                let entry = Term::blank(format!("e{i}"));
                g.insert(entry.clone(), rdf::TYPE, Term::iri(ro::FOLDER_ENTRY));
                g.insert(entry.clone(), ore::PROXY_FOR, target);
                g.insert(entry, ro::ENTRY_NAME, Term::literal(*name));
            }
        }
        ntriples::write(&g, None)
    }

    fn with_resources<'b>(b: &'b Builder, paths: &[&str]) -> ResearchObject<'b> {
        let mut ro = ResearchObject::create(b, &ro1()).unwrap();
        for path in paths {
            ro.aggregate(path, path.as_bytes(), "text/plain").unwrap();
        }
        ro
    }

    fn names(ro: &ResearchObject<'_>, folder: &Uri) -> BTreeMap<Uri, String> {
        ro.folder_entries(folder)
            .unwrap()
            .into_iter()
            .map(|e| (e.proxy_for.clone(), e.name.clone()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Description validation
    // -----------------------------------------------------------------------

    #[test]
    fn two_folders_are_rejected() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt"]);
        let mut text = description(&[("a.txt", None)]);
        text.push_str(&format!(
            "<http://ex/ro1/other/> <{}> <{}> .\n",
            rdf::TYPE,
            ro::FOLDER
        ));
        let err = ro.aggregate_folder("dir", &text).unwrap_err();
        match err {
            RoError::BadRequest(message) => assert!(message.contains("exactly one ro:Folder")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!ro.is_uri_used(&uri("http://ex/ro1/dir/")).unwrap(), "nothing written");
    }

    #[test]
    fn unaggregated_member_is_rejected() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt"]);
        let err = ro
            .aggregate_folder("dir", &description(&[("missing.txt", None)]))
            .unwrap_err();
        assert!(matches!(err, RoError::BadRequest(ref m) if m.contains("not aggregated")));
    }

    #[test]
    fn blank_member_is_rejected() {
        let mut g = Graph::new();
        let folder = Term::iri("http://ex/ro1/dir/");
        g.insert(folder.clone(), rdf::TYPE, Term::iri(ro::FOLDER));
        g.insert(folder, ore::AGGREGATES, Term::blank("x"));
        let err = assemble(&g, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, RoError::BadRequest(ref m) if m.contains("blank nodes")));
    }

    #[test]
    fn entry_outside_folder_is_rejected() {
        let b = builder();
        let ro = with_resources(&b, &["a.txt", "b.txt"]);
        let mut g = ntriples::parse(&description(&[("a.txt", None)]), None).unwrap();
        let entry = Term::blank("stray");
        g.insert(entry.clone(), rdf::TYPE, Term::iri(ro::FOLDER_ENTRY));
        g.insert(entry, ore::PROXY_FOR, Term::iri("http://ex/ro1/b.txt"));
        let err = assemble(&g, ro.aggregated().unwrap()).unwrap_err();
        assert!(matches!(err, RoError::BadRequest(ref m) if m.contains("not aggregated by the folder")));
    }

    #[test]
    fn entry_without_target_is_rejected() {
        let b = builder();
        let ro = with_resources(&b, &["a.txt"]);
        let mut g = ntriples::parse(&description(&[("a.txt", None)]), None).unwrap();
        g.insert(Term::blank("e"), rdf::TYPE, Term::iri(ro::FOLDER_ENTRY));
        let err = assemble(&g, ro.aggregated().unwrap()).unwrap_err();
        assert!(matches!(err, RoError::BadRequest(ref m) if m.contains("ore:proxyFor")));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let b = builder();
        let ro = with_resources(&b, &["a.txt", "x/a.txt"]);
        let g = ntriples::parse(&description(&[("a.txt", None), ("x/a.txt", None)]), None).unwrap();
        let err = assemble(&g, ro.aggregated().unwrap()).unwrap_err();
        assert!(matches!(err, RoError::BadRequest(ref m) if m.contains("Duplicate")));
    }

    // -----------------------------------------------------------------------
    // Folder lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn folder_roundtrip_through_resource_map() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt", "b.txt"]);
        let folder = ro
            .aggregate_folder("dir", &description(&[("a.txt", Some("first")), ("b.txt", None)]))
            .unwrap();
        let folder_uri = uri("http://ex/ro1/dir/");
        assert_eq!(folder.uri(), &folder_uri);
        let expected = BTreeMap::from([
            (uri("http://ex/ro1/a.txt"), "first".to_string()),
            (uri("http://ex/ro1/b.txt"), "b.txt".to_string()),
        ]);
        assert_eq!(names(&ro, &folder_uri), expected);

        let reread = ResearchObject::get(&b, &ro1()).unwrap().unwrap();
        assert_eq!(names(&reread, &folder_uri), expected);

        let text = String::from_utf8(b.content().get_file(&ro1(), "dir/.folder.rdf").unwrap()).unwrap();
        let parsed = ntriples::parse(&text, Some(&ro1())).unwrap();
        let from_file: BTreeMap<Uri, String> = FolderEntry::extract_all(&parsed, &folder_uri)
            .into_iter()
            .map(|e| (e.proxy_for, e.name))
            .collect();
        assert_eq!(from_file, expected);
    }

    #[test]
    fn folder_uris_are_used() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt"]);
        ro.aggregate_folder("dir/", &description(&[("a.txt", None)])).unwrap();
        let folder = uri("http://ex/ro1/dir/");
        assert!(ro.is_uri_used(&folder).unwrap());
        assert!(ro.is_uri_used(&uri("http://ex/ro1/dir/.folder.rdf")).unwrap());
        let entry = ro.folder_entries(&folder).unwrap()[0].uri.clone();
        assert!(ro.is_uri_used(&entry).unwrap());
        assert!(matches!(
            ro.aggregate_folder("dir", &description(&[("a.txt", None)])),
            Err(RoError::Conflict(_))
        ));
    }

    #[test]
    fn entries_point_at_aggregated_resources() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt", "b.txt"]);
        ro.aggregate_folder("dir", &description(&[("a.txt", None), ("b.txt", None)]))
            .unwrap();
        let aggregated = ro.aggregated().unwrap();
        for entries in ro.all_folder_entries().unwrap().values() {
            for entry in entries.values() {
                assert!(aggregated.contains_key(&entry.proxy_for));
            }
        }
    }

    #[test]
    fn deleting_resource_removes_its_entries() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt", "b.txt"]);
        let folder = uri("http://ex/ro1/dir/");
        ro.aggregate_folder("dir", &description(&[("a.txt", None), ("b.txt", None)]))
            .unwrap();
        ro.delete_resource(&uri("http://ex/ro1/a.txt")).unwrap();
        assert_eq!(ro.folder_entries(&folder).unwrap().len(), 1);
        assert!(!ro.entries_by_resource().unwrap().contains_key(&uri("http://ex/ro1/a.txt")));

        let reread = ResearchObject::get(&b, &ro1()).unwrap().unwrap();
        assert_eq!(reread.folder_entries(&folder).unwrap().len(), 1);
    }

    #[test]
    fn delete_folder_keeps_resources() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt"]);
        let folder = uri("http://ex/ro1/dir/");
        ro.aggregate_folder("dir", &description(&[("a.txt", None)])).unwrap();
        let entry = ro.folder_entries(&folder).unwrap()[0].uri.clone();
        ro.delete_folder(&folder).unwrap();

        assert!(!ro.is_uri_used(&folder).unwrap());
        assert!(!ro.is_uri_used(&entry).unwrap());
        assert!(!ro.is_uri_used(&uri("http://ex/ro1/dir/.folder.rdf")).unwrap());
        assert!(!b.graphs().graph_exists(&uri("http://ex/ro1/dir/.folder.rdf")).unwrap());
        assert!(ro.is_uri_used(&uri("http://ex/ro1/a.txt")).unwrap());
        assert!(matches!(ro.delete_folder(&folder), Err(RoError::NotFound(_))));
    }

    #[test]
    fn single_root_folder() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt"]);
        let one = ro.aggregate_folder("one", &description(&[])).unwrap().uri().clone();
        let two = ro.aggregate_folder("two", &description(&[])).unwrap().uri().clone();
        ro.set_root_folder(&one).unwrap();
        ro.set_root_folder(&two).unwrap();
        assert_eq!(ro.root_folder().unwrap().unwrap().uri(), &two);

        let reread = ResearchObject::get(&b, &ro1()).unwrap().unwrap();
        assert_eq!(reread.root_folder().unwrap().unwrap().uri(), &two);
        assert_eq!(reread.folders().unwrap().iter().filter(|f| f.as_folder().unwrap().root).count(), 1);
    }

    #[test]
    fn locate_folder_finds_owner() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt"]);
        ro.aggregate_folder("dir", &description(&[("a.txt", None)])).unwrap();
        let found = ResearchObject::locate_folder(&b, &uri("http://ex/ro1/dir")).unwrap().unwrap();
        assert_eq!(found.uri(), &ro1());
        assert!(ResearchObject::locate_folder(&b, &uri("http://ex/ro1/nope/")).unwrap().is_none());
    }

    // -----------------------------------------------------------------------
    // Folder entries
    // -----------------------------------------------------------------------

    #[test]
    fn add_entry_conflicts() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt", "b.txt", "c.txt"]);
        let folder = uri("http://ex/ro1/dir/");
        ro.aggregate_folder("dir", &description(&[("a.txt", None)])).unwrap();

        let a = uri("http://ex/ro1/a.txt");
        assert!(matches!(ro.add_folder_entry(&folder, &a, Some("new")), Err(RoError::Conflict(_))));
        let b_uri = uri("http://ex/ro1/b.txt");
        assert!(matches!(
            ro.add_folder_entry(&folder, &b_uri, Some("a.txt")),
            Err(RoError::Conflict(_))
        ));
        let entry = ro.add_folder_entry(&folder, &b_uri, None).unwrap();
        assert_eq!(entry.name, "b.txt");
        assert_eq!(ro.folder_entries(&folder).unwrap().len(), 2);

        assert!(matches!(
            ro.add_folder_entry(&folder, &uri("http://ex/ro1/zzz"), None),
            Err(RoError::BadRequest(_))
        ));
        assert!(matches!(
            ro.add_folder_entry(&uri("http://ex/ro1/nofolder/"), &b_uri, None),
            Err(RoError::NotFound(_))
        ));
    }

    #[test]
    fn create_and_delete_entry_from_description() {
        let b = builder();
        let mut ro = with_resources(&b, &["a.txt"]);
        let folder = uri("http://ex/ro1/dir/");
        ro.aggregate_folder("dir", &description(&[])).unwrap();
        let text = format!(
            "_:e <{}> <{}> .\n_:e <{}> <../a.txt> .\n_:e <{}> \"alpha\" .\n",
            rdf::TYPE,
            ro::FOLDER_ENTRY,
            ore::PROXY_FOR,
            ro::ENTRY_NAME
        );
        let entry = ro.create_folder_entry(&folder, &text).unwrap();
        assert_eq!(entry.proxy_for, uri("http://ex/ro1/a.txt"));
        assert_eq!(entry.name, "alpha");

        ro.delete_folder_entry(&entry.uri).unwrap();
        assert!(ro.folder_entries(&folder).unwrap().is_empty());
        assert!(matches!(ro.delete_folder_entry(&entry.uri), Err(RoError::NotFound(_))));

        let err = ro.create_folder_entry(&folder, "").unwrap_err();
        assert!(matches!(err, RoError::BadRequest(ref m) if m.contains("does not define")));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn assembled_names_survive_the_resource_map(
            named in prop::collection::btree_map("[a-z]{1,6}", prop::option::of("[A-Z]{1,6}"), 1..5)
        ) {
            let b = builder();
            let paths: Vec<String> = named.keys().map(|p| format!("{p}.txt")).collect();
            let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();
            let mut ro = with_resources(&b, &path_refs);
            let members: Vec<(&str, Option<&str>)> = paths
                .iter()
                .zip(named.values())
                .map(|(p, n)| (p.as_str(), n.as_deref()))
                .collect();
            // Explicit names are upper case and defaults end in .txt, so
            // they never collide; two explicit names may.
            let explicit: Vec<&str> = members.iter().filter_map(|(_, n)| *n).collect();
            let unique = explicit.iter().collect::<BTreeSet<_>>().len() == explicit.len();
            let result = ro.aggregate_folder("dir", &description(&members));
            prop_assert_eq!(result.is_ok(), unique);
            if unique {
                let reread = ResearchObject::get(&b, &ro1()).unwrap().unwrap();
                let folder = uri("http://ex/ro1/dir/");
                prop_assert_eq!(names(&reread, &folder), names(&ro, &folder));
                prop_assert_eq!(names(&ro, &folder).len(), members.len());
            }
        }
    }
}
