//! Derived learner state.
//!
//! Every function here is a pure reduction over a caller-supplied event slice;
//! nothing is cached or persisted. Events that reference unknown nodes are
//! skipped.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::curriculum::{NodeId, Subject};
use crate::graph::store::GraphStore;
use crate::navigator::SequenceNavigator;

use super::{ProgressAction, ProgressEvent};

/// Per-subject snapshot, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectProgressSummary {
    pub subject: Subject,
    pub completed_count: usize,
    pub total_count: usize,
    /// Completed share of the subject's units, rounded to a whole percent.
    pub completion_percent: u8,
    /// The unit to work on next, `None` if the subject has not been started.
    pub current_node: Option<NodeId>,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Reductions from an event history to per-subject state.
#[derive(Debug, Clone, Copy)]
pub struct ProgressLedger<'g> {
    graph: &'g GraphStore,
}

impl<'g> ProgressLedger<'g> {
    pub fn new(graph: &'g GraphStore) -> Self {
        Self { graph }
    }

    /// Nodes of `subject` with at least one `COMPLETED` event.
    ///
    /// Presence, not recency, decides membership.
    pub fn completed_nodes(&self, events: &[ProgressEvent], subject: Subject) -> BTreeSet<NodeId> {
        self.in_subject(events, subject)
            .filter(|e| e.action == ProgressAction::Completed)
            .map(|e| e.node_id.clone())
            .collect()
    }

    /// The unit the learner should work on in `subject`.
    ///
    /// The most recent completion wins: its successor, or the completed unit
    /// itself when it ends the path. Without completions, the most recently
    /// started unit. `None` when the subject has no events.
    pub fn current_node(&self, events: &[ProgressEvent], subject: Subject) -> Option<NodeId> {
        if let Some(done) = self.latest(events, subject, ProgressAction::Completed) {
            let next = SequenceNavigator::new(self.graph).next(done.node_id.as_str());
            return Some(next.map_or_else(|| done.node_id.clone(), |n| n.id.clone()));
        }
        self.latest(events, subject, ProgressAction::Started)
            .map(|e| e.node_id.clone())
    }

    /// Started units with no completion, in order of first appearance.
    pub fn in_progress_nodes(&self, events: &[ProgressEvent], subject: Subject) -> Vec<NodeId> {
        let completed = self.completed_nodes(events, subject);
        let mut seen = HashSet::new();
        self.in_subject(events, subject)
            .filter(|e| e.action == ProgressAction::Started)
            .filter(|e| !completed.contains(&e.node_id))
            .filter(|e| seen.insert(e.node_id.as_str()))
            .map(|e| e.node_id.clone())
            .collect()
    }

    /// Most recent event of the given kind in `subject`. Later list position breaks timestamp ties.
    pub fn latest<'e>(
        &self,
        events: &'e [ProgressEvent],
        subject: Subject,
        action: ProgressAction,
    ) -> Option<&'e ProgressEvent> {
        self.in_subject(events, subject)
            .filter(|e| e.action == action)
            .max_by_key(|e| e.created_at)
    }

    pub fn subject_summary(&self, events: &[ProgressEvent], subject: Subject) -> SubjectProgressSummary {
        let completed_count = self.completed_nodes(events, subject).len();
        let total_count = self.graph.subject_node_count(subject);
        SubjectProgressSummary {
            subject,
            completed_count,
            total_count,
            completion_percent: percent(completed_count, total_count),
            current_node: self.current_node(events, subject),
            last_activity: self.in_subject(events, subject).map(|e| e.created_at).max(),
        }
    }

    /// Summaries for every learning subject in the graph.
    pub fn summary(&self, events: &[ProgressEvent]) -> BTreeMap<Subject, SubjectProgressSummary> {
        self.graph
            .subjects()
            .into_iter()
            .map(|subject| (subject, self.subject_summary(events, subject)))
            .collect()
    }

    fn in_subject<'e>(
        &self,
        events: &'e [ProgressEvent],
        subject: Subject,
    ) -> impl Iterator<Item = &'e ProgressEvent> + use<'e, 'g> {
        let graph = self.graph;
        events.iter().filter(move |e| {
            graph
                .node(e.node_id.as_str())
                .is_some_and(|n| n.subject == subject)
        })
    }
}

fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round().min(100.0) as u8
}
