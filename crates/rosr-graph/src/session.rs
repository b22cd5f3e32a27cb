//! [`GraphSession`]: one context's handle on a shared [`GraphStore`].
//!
//! A session owns at most one open transaction and routes every call
//! through it. Sessions over the same store never see each other's
//! uncommitted writes.

use std::sync::{Arc, Mutex, MutexGuard};

use rosr_types::Uri;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::traits::{GraphStore, TxId, TxMode};

pub struct GraphSession {
    store: Arc<dyn GraphStore>,
    tx: Mutex<Option<TxId>>,
}

impl GraphSession {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            tx: Mutex::new(None),
        }
    }

    /// The shared store, outside this session's transaction.
    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// The transaction this session has open, if any.
    pub fn current(&self) -> GraphResult<Option<TxId>> {
        Ok(*self.slot()?)
    }

    fn slot(&self) -> GraphResult<MutexGuard<'_, Option<TxId>>> {
        self.tx.lock().map_err(|_| GraphError::LockPoisoned)
    }

    fn open(&self) -> GraphResult<TxId> {
        self.current()?.ok_or(GraphError::NoTransaction)
    }

    // ---- Data ----

    pub fn read_graph(&self, name: &Uri) -> GraphResult<Option<Graph>> {
        self.store.read_graph(self.current()?, name)
    }

    pub fn write_graph(&self, name: &Uri, graph: &Graph) -> GraphResult<()> {
        self.store.write_graph(self.current()?, name, graph)
    }

    pub fn delete_graph(&self, name: &Uri) -> GraphResult<bool> {
        self.store.delete_graph(self.current()?, name)
    }

    pub fn graph_exists(&self, name: &Uri) -> GraphResult<bool> {
        self.store.graph_exists(self.current()?, name)
    }

    pub fn graph_names(&self) -> GraphResult<Vec<Uri>> {
        self.store.graph_names(self.current()?)
    }

    // ---- Transactions ----

    pub fn supports_transactions(&self) -> bool {
        self.store.supports_transactions()
    }

    /// Returns `true` while this session has a transaction open.
    pub fn is_in_transaction(&self) -> bool {
        matches!(self.current(), Ok(Some(_)))
    }

    /// Open this session's transaction. Fails with
    /// [`GraphError::TransactionActive`] if it already has one, or if the
    /// store refuses because of another session's transaction.
    pub fn begin(&self, mode: TxMode) -> GraphResult<()> {
        let mut slot = self.slot()?;
        if slot.is_some() {
            return Err(GraphError::TransactionActive);
        }
        let tx = self.store.begin(mode)?;
        debug!(tx = %tx, ?mode, "session transaction opened");
        *slot = Some(tx);
        Ok(())
    }

    pub fn commit(&self) -> GraphResult<()> {
        self.store.commit(self.open()?)
    }

    pub fn abort(&self) -> GraphResult<()> {
        self.store.abort(self.open()?)
    }

    /// Close this session's transaction; the session is free to open
    /// another one even if the store fails to close it.
    pub fn end(&self) -> GraphResult<()> {
        let tx = self.slot()?.take().ok_or(GraphError::NoTransaction)?;
        self.store.end(tx)
    }
}

impl std::fmt::Debug for GraphSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSession")
            .field("tx", &self.current().ok().flatten())
            .finish()
    }
}
