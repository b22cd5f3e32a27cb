use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use rosr_types::Uri;
use tracing::{debug, warn};

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::ntriples;
use crate::traits::{GraphStore, TxId};

const EXTENSION: &str = "nt";
const HEADER_PREFIX: &str = "# graph ";

/// Directory-backed graph store: one N-Triples file per named graph.
///
/// Files are named by the BLAKE3 hash of the graph name and start with a
/// `# graph <name>` comment line, which is how names are recovered when
/// listing. Writes go to a sibling temporary file and are renamed into place.
/// Transactions are not supported; every call acts on the files directly.
pub struct DirGraphStore {
    root: PathBuf,
    lock: RwLock<()>,
}

impl DirGraphStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> GraphResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened directory graph store");
        Ok(Self {
            root,
            lock: RwLock::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &Uri) -> PathBuf {
        let digest = blake3::hash(name.as_str().as_bytes());
        self.root
            .join(format!("{}.{EXTENSION}", hex::encode(digest.as_bytes())))
    }
}

fn header_name(text: &str) -> Option<&str> {
    text.lines().next()?.strip_prefix(HEADER_PREFIX)
}

impl GraphStore for DirGraphStore {
    fn read_graph(&self, _tx: Option<TxId>, name: &Uri) -> GraphResult<Option<Graph>> {
        let _guard = self.lock.read().map_err(|_| GraphError::LockPoisoned)?;
        let path = self.path_for(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // Stored with absolute IRIs, so no base is needed.
        ntriples::parse(&text, None).map(Some)
    }

    fn write_graph(&self, _tx: Option<TxId>, name: &Uri, graph: &Graph) -> GraphResult<()> {
        let _guard = self.lock.write().map_err(|_| GraphError::LockPoisoned)?;
        let path = self.path_for(name);
        let mut text = format!("{HEADER_PREFIX}{name}\n");
        text.push_str(&ntriples::write(graph, None));

        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, &path)?;
        debug!(graph = %name, triples = graph.len(), "wrote graph");
        Ok(())
    }

    fn delete_graph(&self, _tx: Option<TxId>, name: &Uri) -> GraphResult<bool> {
        let _guard = self.lock.write().map_err(|_| GraphError::LockPoisoned)?;
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => {
                debug!(graph = %name, "deleted graph");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn graph_exists(&self, _tx: Option<TxId>, name: &Uri) -> GraphResult<bool> {
        let _guard = self.lock.read().map_err(|_| GraphError::LockPoisoned)?;
        Ok(self.path_for(name).is_file())
    }

    fn graph_names(&self, _tx: Option<TxId>) -> GraphResult<Vec<Uri>> {
        let _guard = self.lock.read().map_err(|_| GraphError::LockPoisoned)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let text = fs::read_to_string(&path)?;
            match header_name(&text).map(Uri::parse) {
                Some(Ok(name)) => names.push(name),
                _ => warn!(path = %path.display(), "graph file without a valid name header"),
            }
        }
        names.sort();
        Ok(names)
    }
}

impl std::fmt::Debug for DirGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirGraphStore")
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;
    use crate::traits::TxMode;
    use crate::vocab::{ore, rdf, ro};

    fn name(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    fn manifest() -> Graph {
        let mut g = Graph::new();
        let r = Term::iri("http://ex/ro/");
        g.insert(r.clone(), rdf::TYPE, Term::iri(ro::RESEARCH_OBJECT));
        g.insert(r, ore::AGGREGATES, Term::iri("http://ex/ro/a.txt"));
        g.insert(Term::iri("http://ex/ro/a.txt"), "http://ex/label", Term::literal("line\nbreak"));
        g
    }

    #[test]
    fn write_then_read_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let n = name("http://ex/ro/.ro/manifest.rdf");
        {
            let store = DirGraphStore::open(dir.path()).unwrap();
            store.write_graph(None, &n, &manifest()).unwrap();
        }
        let store = DirGraphStore::open(dir.path()).unwrap();
        assert_eq!(store.read_graph(None, &n).unwrap(), Some(manifest()));
        assert!(store.graph_exists(None, &n).unwrap());
    }

    #[test]
    fn missing_graph_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirGraphStore::open(dir.path()).unwrap();
        assert!(store.read_graph(None, &name("http://ex/nope")).unwrap().is_none());
        assert!(!store.delete_graph(None, &name("http://ex/nope")).unwrap());
    }

    #[test]
    fn names_come_from_headers() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirGraphStore::open(dir.path()).unwrap();
        store.write_graph(None, &name("http://ex/b"), &Graph::new()).unwrap();
        store.write_graph(None, &name("http://ex/a"), &manifest()).unwrap();
        fs::write(dir.path().join("junk.txt"), "ignored").unwrap();
        assert_eq!(
            store.graph_names(None).unwrap(),
            vec![name("http://ex/a"), name("http://ex/b")]
        );
        assert!(store.delete_graph(None, &name("http://ex/a")).unwrap());
        assert_eq!(store.graph_names(None).unwrap(), vec![name("http://ex/b")]);
    }

    #[test]
    fn transactions_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirGraphStore::open(dir.path()).unwrap();
        assert!(!store.supports_transactions());
        assert!(matches!(store.begin(TxMode::Write), Err(GraphError::Unsupported(_))));
    }
}
