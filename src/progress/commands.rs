//! Progress-update flows expressed as ledger operations.
//!
//! The engine never touches storage; it tells the persistence collaborator
//! which events to append and which to remove. "Go back" is a removal, so a
//! history is not guaranteed to be monotonic.

use serde::Serialize;

use crate::curriculum::NodeId;
use crate::graph::store::GraphStore;
use crate::navigator::SequenceNavigator;

use super::{ProgressAction, ProgressEvent};

/// A learner-facing progress action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressCommand {
    /// Mark a unit complete and start whatever follows it.
    Complete(NodeId),
    /// Undo the step into this unit: drop its start, reopen the previous unit.
    GoBack(NodeId),
    /// Begin a subject at the given unit.
    StartSubject(NodeId),
}

/// One mutation for the event store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerOp {
    Append {
        node_id: NodeId,
        action: ProgressAction,
    },
    Remove {
        event_id: String,
    },
}

impl LedgerOp {
    fn append(node_id: &NodeId, action: ProgressAction) -> Self {
        LedgerOp::Append {
            node_id: node_id.clone(),
            action,
        }
    }
}

impl ProgressCommand {
    /// Resolve this command against the current history.
    ///
    /// Commands naming an unknown unit resolve to no operations.
    pub fn resolve(&self, graph: &GraphStore, events: &[ProgressEvent]) -> Vec<LedgerOp> {
        let nav = SequenceNavigator::new(graph);
        match self {
            ProgressCommand::Complete(id) => {
                if !graph.contains(id.as_str()) {
                    tracing::warn!(node = %id, "complete: unknown unit");
                    return Vec::new();
                }
                let mut ops = vec![LedgerOp::append(id, ProgressAction::Completed)];
                if let Some(next) = nav.next(id.as_str()) {
                    ops.push(LedgerOp::append(&next.id, ProgressAction::Started));
                }
                ops
            }
            ProgressCommand::GoBack(id) => {
                if !graph.contains(id.as_str()) {
                    tracing::warn!(node = %id, "go back: unknown unit");
                    return Vec::new();
                }
                let mut ops = Vec::new();
                if let Some(event_id) = latest_event_id(events, id, ProgressAction::Started) {
                    ops.push(LedgerOp::Remove { event_id });
                }
                if let Some(prev) = nav.previous(id.as_str()) {
                    if let Some(event_id) = latest_event_id(events, &prev.id, ProgressAction::Completed) {
                        ops.push(LedgerOp::Remove { event_id });
                        ops.push(LedgerOp::append(&prev.id, ProgressAction::Started));
                    }
                }
                ops
            }
            ProgressCommand::StartSubject(id) => {
                if !graph.contains(id.as_str()) {
                    tracing::warn!(node = %id, "start subject: unknown unit");
                    return Vec::new();
                }
                vec![LedgerOp::append(id, ProgressAction::Started)]
            }
        }
    }
}

/// Storage id of the most recent matching event that has one.
fn latest_event_id(events: &[ProgressEvent], node: &NodeId, action: ProgressAction) -> Option<String> {
    events
        .iter()
        .filter(|e| e.node_id == *node && e.action == action && e.id.is_some())
        .max_by_key(|e| e.created_at)
        .and_then(|e| e.id.clone())
}
