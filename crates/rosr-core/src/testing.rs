//! Fixtures shared by the unit tests of this crate.

use std::sync::Arc;

use rosr_content::InMemoryContentStore;
use rosr_graph::InMemoryGraphStore;
use rosr_types::{Role, Uri, UserMetadata};

use crate::builder::Builder;
use crate::notify::RecordingSink;

pub(crate) fn uri(s: &str) -> Uri {
    Uri::parse(s).unwrap()
}

pub(crate) fn user() -> UserMetadata {
    UserMetadata::new("jo", "Jo Smith", Role::Authenticated, uri("http://ex/users/jo"))
}

/// A builder over fresh in-memory stores.
pub(crate) fn builder() -> Builder {
    Builder::new(
        user(),
        Arc::new(InMemoryGraphStore::new()),
        Arc::new(InMemoryContentStore::new()),
    )
}

/// Like [`builder`], with events and index updates going to `sink`.
pub(crate) fn recording_builder(sink: Arc<RecordingSink>) -> Builder {
    builder().with_events(sink.clone()).with_index(sink)
}
