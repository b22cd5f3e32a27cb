use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock};

use rosr_types::Uri;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::traits::{GraphStore, TxId, TxMode};

/// Pending writes of an open transaction. `None` marks a deletion.
struct TxState {
    mode: TxMode,
    overlay: HashMap<Uri, Option<Graph>>,
}

/// In-memory, HashMap-based graph store with many-readers/single-writer
/// transactions.
///
/// Intended for tests and embedding. Reads inside a transaction see its
/// pending writes; nobody else does until commit applies them to the shared
/// map in one step. A `begin` that would break the discipline, and a write
/// outside any transaction while a write transaction is open, fail with
/// [`GraphError::TransactionActive`] rather than wait.
pub struct InMemoryGraphStore {
    graphs: RwLock<HashMap<Uri, Graph>>,
    txs: Mutex<HashMap<TxId, TxState>>,
    next_tx: AtomicU64,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            graphs: RwLock::new(HashMap::new()),
            txs: Mutex::new(HashMap::new()),
            next_tx: AtomicU64::new(1),
        }
    }

    /// Number of committed graphs.
    pub fn len(&self) -> usize {
        self.graphs.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of open transactions.
    pub fn open_transactions(&self) -> usize {
        self.txs.lock().map(|txs| txs.len()).unwrap_or(0)
    }

    fn txs(&self) -> GraphResult<MutexGuard<'_, HashMap<TxId, TxState>>> {
        self.txs.lock().map_err(|_| GraphError::LockPoisoned)
    }

    /// Stage a write or deletion in `tx`, or apply it directly when `tx` is
    /// `None` and no write transaction is open.
    fn stage(&self, tx: Option<TxId>, name: &Uri, pending: Option<Graph>) -> GraphResult<()> {
        let mut txs = self.txs()?;
        match tx {
            Some(id) => {
                let state = txs.get_mut(&id).ok_or(GraphError::NoTransaction)?;
                if state.mode == TxMode::Read {
                    return Err(GraphError::ReadOnlyTransaction);
                }
                state.overlay.insert(name.clone(), pending);
            }
            None => {
                if txs.values().any(|state| state.mode == TxMode::Write) {
                    return Err(GraphError::TransactionActive);
                }
                let mut graphs = self.graphs.write().map_err(|_| GraphError::LockPoisoned)?;
                match pending {
                    Some(graph) => graphs.insert(name.clone(), graph),
                    None => graphs.remove(name),
                };
            }
        }
        Ok(())
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore for InMemoryGraphStore {
    fn read_graph(&self, tx: Option<TxId>, name: &Uri) -> GraphResult<Option<Graph>> {
        if let Some(id) = tx {
            let txs = self.txs()?;
            let state = txs.get(&id).ok_or(GraphError::NoTransaction)?;
            if let Some(pending) = state.overlay.get(name) {
                return Ok(pending.clone());
            }
        }
        let graphs = self.graphs.read().map_err(|_| GraphError::LockPoisoned)?;
        Ok(graphs.get(name).cloned())
    }

    fn write_graph(&self, tx: Option<TxId>, name: &Uri, graph: &Graph) -> GraphResult<()> {
        self.stage(tx, name, Some(graph.clone()))
    }

    fn delete_graph(&self, tx: Option<TxId>, name: &Uri) -> GraphResult<bool> {
        let existed = self.graph_exists(tx, name)?;
        self.stage(tx, name, None)?;
        Ok(existed)
    }

    fn graph_names(&self, tx: Option<TxId>) -> GraphResult<Vec<Uri>> {
        let mut names: BTreeSet<Uri> = self
            .graphs
            .read()
            .map_err(|_| GraphError::LockPoisoned)?
            .keys()
            .cloned()
            .collect();
        if let Some(id) = tx {
            let txs = self.txs()?;
            let state = txs.get(&id).ok_or(GraphError::NoTransaction)?;
            for (name, pending) in &state.overlay {
                match pending {
                    Some(_) => names.insert(name.clone()),
                    None => names.remove(name),
                };
            }
        }
        Ok(names.into_iter().collect())
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    fn is_in_transaction(&self, tx: TxId) -> bool {
        self.txs.lock().map(|txs| txs.contains_key(&tx)).unwrap_or(false)
    }

    fn begin(&self, mode: TxMode) -> GraphResult<TxId> {
        let mut txs = self.txs()?;
        let blocked = match mode {
            TxMode::Read => txs.values().any(|state| state.mode == TxMode::Write),
            TxMode::Write => !txs.is_empty(),
        };
        if blocked {
            return Err(GraphError::TransactionActive);
        }
        let id = TxId(self.next_tx.fetch_add(1, Ordering::Relaxed));
        debug!(?mode, tx = %id, "begin graph transaction");
        txs.insert(
            id,
            TxState {
                mode,
                overlay: HashMap::new(),
            },
        );
        Ok(id)
    }

    fn commit(&self, tx: TxId) -> GraphResult<()> {
        let mut txs = self.txs()?;
        let state = txs.get_mut(&tx).ok_or(GraphError::NoTransaction)?;
        let mut graphs = self.graphs.write().map_err(|_| GraphError::LockPoisoned)?;
        let applied = state.overlay.len();
        for (name, pending) in state.overlay.drain() {
            match pending {
                Some(graph) => {
                    graphs.insert(name, graph);
                }
                None => {
                    graphs.remove(&name);
                }
            }
        }
        debug!(tx = %tx, applied, "committed graph transaction");
        Ok(())
    }

    fn abort(&self, tx: TxId) -> GraphResult<()> {
        let mut txs = self.txs()?;
        let state = txs.get_mut(&tx).ok_or(GraphError::NoTransaction)?;
        debug!(tx = %tx, discarded = state.overlay.len(), "aborted graph transaction");
        state.overlay.clear();
        Ok(())
    }

    fn end(&self, tx: TxId) -> GraphResult<()> {
        let mut txs = self.txs()?;
        let state = txs.remove(&tx).ok_or(GraphError::NoTransaction)?;
        if !state.overlay.is_empty() {
            debug!(
                tx = %tx,
                discarded = state.overlay.len(),
                "ended graph transaction with uncommitted writes"
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGraphStore")
            .field("graph_count", &self.len())
            .field("open_transactions", &self.open_transactions())
            .finish()
    }
}
