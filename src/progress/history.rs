//! In-memory event list that applies [`LedgerOp`]s.
//!
//! Stands in for the persistence collaborator in tools and tests. Appended
//! events get sequential ids so later corrections can remove them.

use chrono::{DateTime, Utc};

use super::{LedgerOp, ProgressEvent};

#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    events: Vec<ProgressEvent>,
    next_id: u64,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing history. Events without an id are kept but cannot be removed.
    pub fn from_events(events: Vec<ProgressEvent>) -> Self {
        let next_id = events.len() as u64;
        Self { events, next_id }
    }

    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ProgressEvent> {
        self.events
    }

    /// Apply operations in order, stamping appends with `at`.
    ///
    /// Returns how many operations took effect; removals of unknown ids are skipped.
    pub fn apply(&mut self, ops: &[LedgerOp], at: DateTime<Utc>) -> usize {
        let mut applied = 0;
        for op in ops {
            match op {
                LedgerOp::Append { node_id, action } => {
                    let id = self.allocate_id();
                    self.events.push(ProgressEvent {
                        id: Some(id),
                        node_id: node_id.clone(),
                        action: *action,
                        created_at: at,
                    });
                    applied += 1;
                }
                LedgerOp::Remove { event_id } => {
                    let before = self.events.len();
                    self.events.retain(|e| e.id.as_deref() != Some(event_id.as_str()));
                    if self.events.len() < before {
                        applied += 1;
                    } else {
                        tracing::debug!(event_id, "remove: no such event");
                    }
                }
            }
        }
        applied
    }

    fn allocate_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let candidate = format!("evt-{}", self.next_id);
            if !self.events.iter().any(|e| e.id.as_deref() == Some(candidate.as_str())) {
                return candidate;
            }
        }
    }
}
