//! Named graphs that describe part of a research object and are mirrored
//! into its content.
//!
//! The manifest, each folder's resource map and the evolution information
//! body share the same mechanics: edit the named graph in the metadata
//! store, then serialize it as N-Triples into the content store at a path
//! relative to the research object, with IRIs written relative to the
//! research object base.

use rosr_graph::{ntriples, Graph};
use rosr_types::Uri;
use tracing::debug;

use crate::builder::Builder;
use crate::error::{RoError, RoResult};

/// Path of the manifest, relative to the research object.
pub const MANIFEST_PATH: &str = ".ro/manifest.rdf";
/// Path of the evolution information body, relative to the research object.
pub const EVO_INFO_PATH: &str = ".ro/evo_info.ttl";
/// Name of a folder's resource map, relative to the folder.
pub const FOLDER_MAP_NAME: &str = ".folder.rdf";

/// Handle on one mirrored named graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceMap {
    uri: Uri,
    base: Uri,
    path: String,
}

impl ResourceMap {
    fn at(base: &Uri, uri: Uri) -> RoResult<Self> {
        let path = base.relativize(&uri).filter(|p| !p.is_empty()).ok_or_else(|| {
            RoError::BadRequest(format!("{uri} is not inside research object {base}"))
        })?;
        Ok(Self {
            uri,
            base: base.clone(),
            path,
        })
    }

    /// The manifest of the research object at `ro`.
    pub fn manifest(ro: &Uri) -> RoResult<Self> {
        let base = ro.with_trailing_slash();
        let uri = base.resolve(MANIFEST_PATH)?;
        Self::at(&base, uri)
    }

    /// The evolution information body of the research object at `ro`.
    pub fn evo_info(ro: &Uri) -> RoResult<Self> {
        let base = ro.with_trailing_slash();
        let uri = base.resolve(EVO_INFO_PATH)?;
        Self::at(&base, uri)
    }

    /// The resource map of `folder`, which must live inside `ro`.
    pub fn folder(ro: &Uri, folder: &Uri) -> RoResult<Self> {
        let base = ro.with_trailing_slash();
        let uri = folder.with_trailing_slash().resolve(FOLDER_MAP_NAME)?;
        Self::at(&base, uri)
    }

    /// Any existing resource map URI inside `ro`.
    pub fn existing(ro: &Uri, uri: &Uri) -> RoResult<Self> {
        Self::at(&ro.with_trailing_slash(), uri.clone())
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Path in the content store, relative to the research object.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn exists(&self, builder: &Builder) -> RoResult<bool> {
        Ok(builder.graphs().graph_exists(&self.uri)?)
    }

    /// The stored graph, or an empty one.
    pub fn load(&self, builder: &Builder) -> RoResult<Graph> {
        Ok(builder.graphs().read_graph(&self.uri)?.unwrap_or_default())
    }

    /// Apply `edit` to the stored graph and write it back.
    pub fn update(&self, builder: &Builder, edit: impl FnOnce(&mut Graph)) -> RoResult<()> {
        let mut graph = self.load(builder)?;
        edit(&mut graph);
        builder.graphs().write_graph(&self.uri, &graph)?;
        debug!(graph = %self.uri, triples = graph.len(), "updated resource map");
        Ok(())
    }

    /// Mirror the stored graph into the content store.
    pub fn serialize(&self, builder: &Builder) -> RoResult<()> {
        let graph = self.load(builder)?;
        let base = Some(&self.base);
        let text = ntriples::write(&graph, base);
        builder
            .content()
            .put_file(&self.base, &self.path, text.as_bytes(), ntriples::media_type(base))?;
        debug!(graph = %self.uri, path = %self.path, "serialized resource map");
        Ok(())
    }

    /// Drop the named graph and its mirrored copy.
    pub fn delete(&self, builder: &Builder) -> RoResult<()> {
        builder.graphs().delete_graph(&self.uri)?;
        builder.content().delete_file(&self.base, &self.path)?;
        debug!(graph = %self.uri, "deleted resource map");
        Ok(())
    }
}
