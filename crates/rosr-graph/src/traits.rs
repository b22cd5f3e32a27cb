//! The [`GraphStore`] trait defining the metadata store interface.
//!
//! Any backend (in-memory, directory, triple store) implements this trait to
//! hold the named graphs that describe research objects.

use rosr_types::Uri;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

/// Mode of a metadata store transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxMode {
    Read,
    Write,
}

/// Identifies an open transaction of a [`GraphStore`].
///
/// Handed out by [`GraphStore::begin`] and passed to every call that runs
/// inside the transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(pub u64);

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}

/// Storage backend for named graphs.
///
/// Implementations must be thread-safe (`Send + Sync`). Graphs are read and
/// written whole; callers edit the returned [`Graph`] and write it back.
///
/// Every data operation takes the transaction it runs in. `None` reads the
/// committed state and writes straight to it. Each context that wants its
/// own transaction holds its own [`TxId`]; see
/// [`GraphSession`](crate::GraphSession).
///
/// Transactions are optional. A backend that supports them overrides
/// [`supports_transactions`](GraphStore::supports_transactions) and the
/// `begin`/`commit`/`abort`/`end` family; the defaults report
/// [`GraphError::Unsupported`].
pub trait GraphStore: Send + Sync {
    /// Read a named graph.
    ///
    /// Returns `Ok(None)` if the graph does not exist.
    fn read_graph(&self, tx: Option<TxId>, name: &Uri) -> GraphResult<Option<Graph>>;

    /// Create or replace a named graph.
    fn write_graph(&self, tx: Option<TxId>, name: &Uri, graph: &Graph) -> GraphResult<()>;

    /// Delete a named graph.
    ///
    /// Returns `Ok(true)` if the graph existed, `Ok(false)` otherwise.
    fn delete_graph(&self, tx: Option<TxId>, name: &Uri) -> GraphResult<bool>;

    /// Returns `true` if the named graph exists.
    fn graph_exists(&self, tx: Option<TxId>, name: &Uri) -> GraphResult<bool> {
        Ok(self.read_graph(tx, name)?.is_some())
    }

    /// Names of all stored graphs, sorted.
    fn graph_names(&self, tx: Option<TxId>) -> GraphResult<Vec<Uri>>;

    fn supports_transactions(&self) -> bool {
        false
    }

    /// Returns `true` while `tx` is open.
    fn is_in_transaction(&self, _tx: TxId) -> bool {
        false
    }

    /// Open a transaction. Read transactions may run side by side; a write
    /// transaction excludes every other transaction.
    fn begin(&self, _mode: TxMode) -> GraphResult<TxId> {
        Err(GraphError::Unsupported("transactions"))
    }

    /// Make the writes of `tx` visible.
    fn commit(&self, _tx: TxId) -> GraphResult<()> {
        Err(GraphError::Unsupported("transactions"))
    }

    /// Discard the writes of `tx`.
    fn abort(&self, _tx: TxId) -> GraphResult<()> {
        Err(GraphError::Unsupported("transactions"))
    }

    /// Close `tx`. Uncommitted writes are discarded.
    fn end(&self, _tx: TxId) -> GraphResult<()> {
        Err(GraphError::Unsupported("transactions"))
    }
}
