//! The context shared by every entity: acting user, store handles,
//! transaction mode, and the best-effort collaborators.

use std::sync::Arc;

use chrono::Utc;
use rosr_content::ContentStore;
use rosr_graph::{Graph, GraphSession, GraphStore, TxMode};
use rosr_types::{Uri, UserMetadata};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{RoError, RoResult};
use crate::notify::{EventSink, NoopSink, RoEvent, SearchIndex};
use crate::proxy::{FolderEntry, Proxy};
use crate::thing::Thing;

/// Path of proxies, relative to the research object.
const PROXIES_PATH: &str = ".ro/proxies/";
/// Path of annotations, relative to the research object.
const ANNOTATIONS_PATH: &str = ".ro/annotations/";

/// Construction point for entities and owner of the store handles.
///
/// `build_*` functions only allocate identifiers and fill in the acting
/// user; they never touch a store. Each builder has its own
/// [`GraphSession`], so its transactions are invisible to other builders
/// sharing the same store.
pub struct Builder {
    user: UserMetadata,
    graphs: GraphSession,
    content: Arc<dyn ContentStore>,
    events: Arc<dyn EventSink>,
    index: Arc<dyn SearchIndex>,
    use_transactions: bool,
}

impl Builder {
    pub fn new(
        user: UserMetadata,
        graphs: Arc<dyn GraphStore>,
        content: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            user,
            graphs: GraphSession::new(graphs),
            content,
            events: Arc::new(NoopSink),
            index: Arc::new(NoopSink),
            use_transactions: true,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.index = index;
        self
    }

    pub fn with_transactions(mut self, use_transactions: bool) -> Self {
        self.use_transactions = use_transactions;
        self
    }

    pub fn user(&self) -> &UserMetadata {
        &self.user
    }

    pub fn graphs(&self) -> &GraphSession {
        &self.graphs
    }

    pub fn content(&self) -> &dyn ContentStore {
        self.content.as_ref()
    }

    pub fn uses_transactions(&self) -> bool {
        self.use_transactions
    }

    // ---- Transactions ----

    /// Open a transaction if enabled, supported, and this builder has none
    /// open yet.
    ///
    /// Returns whether this call started one; pass the flag to exactly one
    /// of [`commit_transaction`](Self::commit_transaction) or
    /// [`abort_transaction`](Self::abort_transaction), then to
    /// [`end_transaction`](Self::end_transaction).
    pub fn begin_transaction(&self, mode: TxMode) -> RoResult<bool> {
        let started = self.use_transactions
            && self.graphs.supports_transactions()
            && !self.graphs.is_in_transaction();
        if started {
            self.graphs.begin(mode)?;
        }
        Ok(started)
    }

    pub fn commit_transaction(&self, started: bool) -> RoResult<()> {
        if started {
            self.graphs.commit()?;
        }
        Ok(())
    }

    pub fn abort_transaction(&self, started: bool) -> RoResult<()> {
        if started {
            self.graphs.abort()?;
        }
        Ok(())
    }

    pub fn end_transaction(&self, started: bool) -> RoResult<()> {
        if started {
            self.graphs.end()?;
        }
        Ok(())
    }

    /// Run `op` in a transaction of `mode`: commit on success, abort on
    /// failure. Nested calls on the same builder join the open transaction.
    pub fn transaction<T>(&self, mode: TxMode, op: impl FnOnce() -> RoResult<T>) -> RoResult<T> {
        let started = self.begin_transaction(mode)?;
        let result = op();
        let finished = match &result {
            Ok(_) => self.commit_transaction(started),
            Err(_) => self.abort_transaction(started),
        };
        let ended = self.end_transaction(started);
        match (result, finished, ended) {
            (Ok(value), Ok(()), Ok(())) => Ok(value),
            (Ok(_), Err(e), _) | (Ok(_), Ok(()), Err(e)) => Err(e),
            (Err(e), finished, ended) => {
                if let Err(tx_err) = finished.and(ended) {
                    warn!(error = %tx_err, "failed to close aborted transaction");
                }
                Err(e)
            }
        }
    }

    // ---- Entity construction ----

    /// A thing created now by the acting user.
    pub fn build_thing(&self, uri: Uri) -> Thing {
        Thing::new(uri, Some(self.user.uri.clone()), Some(Utc::now()))
    }

    pub fn build_proxy(&self, aggregation: &Uri, proxy_for: &Uri) -> RoResult<Proxy> {
        let uri = aggregation
            .with_trailing_slash()
            .resolve(&format!("{PROXIES_PATH}{}", Uuid::new_v4()))?;
        Ok(Proxy {
            uri,
            proxy_for: proxy_for.clone(),
            proxy_in: aggregation.clone(),
        })
    }

    pub fn build_folder_entry(
        &self,
        folder: &Uri,
        proxy_for: &Uri,
        name: Option<String>,
    ) -> RoResult<FolderEntry> {
        let uri = folder
            .with_trailing_slash()
            .resolve(&format!("entries/{}", Uuid::new_v4()))?;
        Ok(FolderEntry {
            uri,
            proxy_for: proxy_for.clone(),
            proxy_in: folder.clone(),
            name: name.unwrap_or_else(|| FolderEntry::default_name(proxy_for)),
        })
    }

    /// URI for a new annotation, from a caller-chosen id or a fresh UUID.
    pub fn build_annotation_uri(&self, ro: &Uri, id: Option<&str>) -> RoResult<Uri> {
        let id = match id {
            Some(id) if id.is_empty() || id.contains('/') => {
                return Err(RoError::BadRequest(format!("invalid annotation id {id:?}")));
            }
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        Ok(ro
            .with_trailing_slash()
            .resolve(&format!("{ANNOTATIONS_PATH}{id}"))?)
    }

    // ---- Best-effort collaborators ----

    pub(crate) fn publish(&self, event: RoEvent) {
        match self.events.publish(&event) {
            Ok(()) => debug!(ro = %event.ro(), ?event, "published event"),
            Err(e) => warn!(ro = %event.ro(), error = %e, "failed to publish event"),
        }
    }

    pub(crate) fn index_object(&self, ro: &Uri, description: &Graph) {
        if let Err(e) = self.index.index_object(ro, description) {
            warn!(ro = %ro, error = %e, "failed to update search index");
        }
    }

    pub(crate) fn remove_index(&self, ro: &Uri) {
        if let Err(e) = self.index.remove_index(ro) {
            warn!(ro = %ro, error = %e, "failed to remove search index entry");
        }
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("user", &self.user.login)
            .field("use_transactions", &self.use_transactions)
            .finish()
    }
}
