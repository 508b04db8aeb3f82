//! Learner progress: the append-only event model and the reductions over it.
//!
//! - [`ledger`]: derives per-subject state (completed set, current unit,
//!   completion percentage) from an event history
//! - [`commands`]: turns "mark complete", "go back" and "start subject"
//!   actions into ledger operations
//! - [`history`]: an in-memory event list that applies those operations

pub mod commands;
pub mod history;
pub mod ledger;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::curriculum::NodeId;

pub use commands::{LedgerOp, ProgressCommand};
pub use history::ProgressLog;
pub use ledger::{ProgressLedger, SubjectProgressSummary};

/// What happened to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressAction {
    Started,
    Completed,
}

/// A timestamped record that a student started or completed a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Storage id, needed only to remove the event in a correction flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub node_id: NodeId,
    pub action: ProgressAction,
    pub created_at: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(node_id: impl Into<NodeId>, action: ProgressAction, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            node_id: node_id.into(),
            action,
            created_at,
        }
    }

    pub fn started(node_id: impl Into<NodeId>, created_at: DateTime<Utc>) -> Self {
        Self::new(node_id, ProgressAction::Started, created_at)
    }

    pub fn completed(node_id: impl Into<NodeId>, created_at: DateTime<Utc>) -> Self {
        Self::new(node_id, ProgressAction::Completed, created_at)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
