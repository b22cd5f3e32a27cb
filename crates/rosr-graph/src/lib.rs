//! Named-graph metadata store for research objects.
//!
//! The aggregation, annotation and folder structure of every research
//! object lives in named graphs: one manifest per research object, one
//! resource map per folder, one graph for the evolution information and one
//! per annotation body that is itself RDF.
//!
//! # Modules
//!
//! - [`term`] -- RDF terms and triples
//! - [`graph`] -- An in-memory set of triples with pattern lookups
//! - [`ntriples`] -- N-Triples reader/writer with base-relative IRIs
//! - [`vocab`] -- ORE, RO, AO, ROEVO, DCTERMS, FOAF and RDF terms
//! - [`traits`] -- The [`GraphStore`] trait, including transactions
//! - [`memory`] -- [`InMemoryGraphStore`] (transactional)
//! - [`session`] -- [`GraphSession`], one context's transaction over a shared store
//! - [`dir`] -- [`DirGraphStore`], one file per named graph
//!
//! # Design Rules
//!
//! 1. A graph is read, edited in memory, and written back whole.
//! 2. Lookups of missing graphs return `Ok(None)`, never an error.
//! 3. Transactions are optional; callers check `supports_transactions()`.
//! 4. Transactions are identified by [`TxId`] and owned by one session; a
//!    write transaction is the only transaction open on a store.

pub mod dir;
pub mod error;
pub mod graph;
pub mod memory;
pub mod ntriples;
pub mod session;
pub mod term;
pub mod traits;
pub mod vocab;

pub use dir::DirGraphStore;
pub use error::{GraphError, GraphResult};
pub use graph::Graph;
pub use memory::InMemoryGraphStore;
pub use session::GraphSession;
pub use term::{Literal, Term, Triple};
pub use traits::{GraphStore, TxId, TxMode};
