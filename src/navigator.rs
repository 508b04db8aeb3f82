//! Immediate successor / predecessor along a learner's path.
//!
//! `sequential` edges are preferred; when a unit has none, the navigator
//! crosses into the neighbouring course over a `foundational` edge. Among
//! several qualifying edges the first in the store's tie-break order wins.
//! Both directions are pure functions of the [`GraphStore`].

use std::collections::HashSet;

use crate::curriculum::{Node, NodeId, Relationship};
use crate::graph::store::GraphStore;

/// Which relationship a navigation step followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Within the same course.
    Sequential,
    /// Fallback across courses.
    Foundational,
}

/// A single navigation step.
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub node: &'a Node,
    pub kind: StepKind,
}

/// Next/previous queries over a borrowed graph.
#[derive(Debug, Clone, Copy)]
pub struct SequenceNavigator<'g> {
    graph: &'g GraphStore,
}

impl<'g> SequenceNavigator<'g> {
    pub fn new(graph: &'g GraphStore) -> Self {
        Self { graph }
    }

    /// The unit after `id`, or `None` if `id` is unknown or terminal.
    pub fn next(&self, id: &str) -> Option<&'g Node> {
        self.next_step(id).map(|s| s.node)
    }

    /// The unit before `id`, or `None` if `id` is unknown or a course entry with no prerequisite.
    pub fn previous(&self, id: &str) -> Option<&'g Node> {
        self.previous_step(id).map(|s| s.node)
    }

    /// Like [`next`](Self::next), also reporting which category was followed.
    pub fn next_step(&self, id: &str) -> Option<Step<'g>> {
        if let Some(node) = self.graph.successors(id, Relationship::Sequential).next() {
            return Some(Step {
                node,
                kind: StepKind::Sequential,
            });
        }
        self.graph
            .successors(id, Relationship::Foundational)
            .next()
            .map(|node| Step {
                node,
                kind: StepKind::Foundational,
            })
    }

    /// Like [`previous`](Self::previous), also reporting which category was followed.
    pub fn previous_step(&self, id: &str) -> Option<Step<'g>> {
        if let Some(node) = self.graph.predecessors(id, Relationship::Sequential).next() {
            return Some(Step {
                node,
                kind: StepKind::Sequential,
            });
        }
        self.graph
            .predecessors(id, Relationship::Foundational)
            .next()
            .map(|node| Step {
                node,
                kind: StepKind::Foundational,
            })
    }

    /// Walk backwards from `id` while staying in its subject.
    ///
    /// Returns the trail earliest-first, ending with `id` itself; empty if `id`
    /// is unknown. Stops early on a revisit.
    pub fn trail_to(&self, id: &str) -> Vec<NodeId> {
        let Some(start) = self.graph.node(id) else {
            return Vec::new();
        };
        let mut seen: HashSet<&str> = HashSet::new();
        let mut trail = vec![start.id.clone()];
        seen.insert(start.id.as_str());

        let mut current = start;
        while let Some(prev) = self.previous(current.id.as_str()) {
            if prev.subject != start.subject || !seen.insert(prev.id.as_str()) {
                break;
            }
            trail.push(prev.id.clone());
            current = prev;
        }
        trail.reverse();
        trail
    }
}
