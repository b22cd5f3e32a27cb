//! Research object model for the research object storage.
//!
//! A research object aggregates resources (internal files or external
//! URIs), folders over those resources, and annotations relating RDF
//! bodies to them. Its structure is recorded in a manifest graph; its
//! bytes live in a content store. LIVE research objects can be copied into
//! immutable SNAPSHOT and ARCHIVED research objects.
//!
//! # Modules
//!
//! - [`builder`] -- [`Builder`]: stores, user, events and entity construction
//! - [`research_object`] -- Lifecycle and aggregation of [`ResearchObject`]
//! - [`folder`] -- Folders, folder entries and folder resource maps
//! - [`annotation`] -- Annotations and their bodies
//! - [`evo`] -- Evolution types, copy metadata and copying
//! - [`resource_map`] -- Graphs backed by a serialized RDF file
//! - [`notify`] -- Event and search index hooks
//!
//! # Design Rules
//!
//! 1. Every mutation runs inside a write transaction when the store offers one.
//! 2. SNAPSHOT and ARCHIVED research objects reject every mutation.
//! 3. The manifest and the evolution annotation can't be changed through
//!    the aggregation API.
//! 4. A failed mutation drops all cached views of the research object.

pub mod annotation;
pub mod builder;
pub mod error;
pub mod evo;
pub mod folder;
pub mod notify;
pub mod proxy;
pub mod research_object;
pub mod resource_map;
pub mod thing;

pub(crate) mod manifest;

#[cfg(test)]
mod testing;

pub use builder::Builder;
pub use error::{ErrorKind, RoError, RoResult};
pub use evo::{EvoCopy, EvoInfo, ImmutableEvoInfo, LiveEvoInfo};
pub use folder::{assemble, assemble_entry};
pub use notify::{EventSink, NoopSink, RecordingSink, RoEvent, SearchIndex, SinkError};
pub use proxy::{FolderEntry, Proxy};
pub use research_object::{ResearchObject, RoSeed, SeedAnnotation, SeedFolder, SeedResource};
pub use resource_map::{ResourceMap, EVO_INFO_PATH, FOLDER_MAP_NAME, MANIFEST_PATH};
pub use thing::{AggregatedResource, AnnotationInfo, FolderInfo, ResourceKind, Thing};

// Re-export key types
pub use rosr_types::{EvoType, Role, Uri, UserMetadata};
