//! Process-wide graph handle.
//!
//! Readers take an `Arc` snapshot and keep using it for the whole call; a
//! reload builds a new [`GraphStore`] off to the side and replaces the pointer,
//! so no reader ever sees a half-built index.

use std::sync::{Arc, PoisonError, RwLock};

use super::store::GraphStore;

/// Shared, swappable reference to the current [`GraphStore`].
#[derive(Debug)]
pub struct SharedGraph {
    current: RwLock<Arc<GraphStore>>,
}

impl SharedGraph {
    pub fn new(store: GraphStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    /// Snapshot of the current graph.
    pub fn load(&self) -> Arc<GraphStore> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the current graph, returning the previous one.
    pub fn swap(&self, store: GraphStore) -> Arc<GraphStore> {
        let next = Arc::new(store);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(
            nodes = next.node_count(),
            edges = next.edge_count(),
            "swapping in reloaded curriculum graph"
        );
        std::mem::replace(&mut *guard, next)
    }
}
