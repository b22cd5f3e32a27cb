//! Event sink and search index seams.
//!
//! Both are best-effort collaborators: the [`Builder`](crate::Builder) logs
//! their failures and never hands them back to the caller.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rosr_graph::Graph;
use rosr_types::Uri;

/// Error type returned by sinks; its contents are only logged.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// A change to a research object or one of its components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoEvent {
    Created { ro: Uri },
    Updated { ro: Uri, resource: Uri },
    Deleted { ro: Uri },
}

impl RoEvent {
    /// The research object the event is about.
    pub fn ro(&self) -> &Uri {
        match self {
            RoEvent::Created { ro } | RoEvent::Updated { ro, .. } | RoEvent::Deleted { ro } => ro,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn publish(&self, event: &RoEvent) -> Result<(), SinkError>;
}

pub trait SearchIndex: Send + Sync {
    fn index_object(&self, ro: &Uri, description: &Graph) -> Result<(), SinkError>;
    fn remove_index(&self, ro: &Uri) -> Result<(), SinkError>;
}

/// Discards everything.
pub struct NoopSink;

impl EventSink for NoopSink {
    fn publish(&self, _event: &RoEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

impl SearchIndex for NoopSink {
    fn index_object(&self, _ro: &Uri, _description: &Graph) -> Result<(), SinkError> {
        Ok(())
    }

    fn remove_index(&self, _ro: &Uri) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps published events and indexed descriptions in memory.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RoEvent>>,
    index: Mutex<BTreeMap<Uri, Graph>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RoEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn indexed(&self, ro: &Uri) -> Option<Graph> {
        self.index.lock().ok().and_then(|i| i.get(ro).cloned())
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: &RoEvent) -> Result<(), SinkError> {
        self.events
            .lock()
            .map_err(|_| "event log poisoned")?
            .push(event.clone());
        Ok(())
    }
}

impl SearchIndex for RecordingSink {
    fn index_object(&self, ro: &Uri, description: &Graph) -> Result<(), SinkError> {
        self.index
            .lock()
            .map_err(|_| "index poisoned")?
            .insert(ro.clone(), description.clone());
        Ok(())
    }

    fn remove_index(&self, ro: &Uri) -> Result<(), SinkError> {
        self.index.lock().map_err(|_| "index poisoned")?.remove(ro);
        Ok(())
    }
}
