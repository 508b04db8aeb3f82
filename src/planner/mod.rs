//! Prerequisite closures and ordered paths through the curriculum DAG.
//!
//! Traversals follow `sequential` and `foundational` edges only. The dataset
//! is expected to be acyclic, but every walk carries its own guard so a cycle
//! ends the affected branch instead of the process; the branch is then
//! treated as unreachable. Depth is capped by [`PlannerConfig::max_depth`].

pub mod assembler;
pub mod strategy;

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::Direction;

use crate::config::PlannerConfig;
use crate::curriculum::{NodeId, Relationship, Subject};
use crate::graph::store::GraphStore;

pub use assembler::{LearningPlan, PlanAssembler, PlanDiagnostics, PlanSource, SubjectContribution};
pub use strategy::{LongestRoute, RouteStrategy, ShortestRoute};

/// Graph search over a borrowed [`GraphStore`].
#[derive(Debug)]
pub struct PathPlanner<'g> {
    graph: &'g GraphStore,
    max_depth: usize,
    strategy: Box<dyn RouteStrategy>,
}

impl<'g> PathPlanner<'g> {
    pub fn new(graph: &'g GraphStore, config: &PlannerConfig) -> Self {
        Self {
            graph,
            max_depth: config.max_depth.max(1),
            strategy: strategy::from_kind(config.route_strategy),
        }
    }

    /// Replace the route selection policy.
    pub fn with_strategy(mut self, strategy: Box<dyn RouteStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> &dyn RouteStrategy {
        self.strategy.as_ref()
    }

    // -----------------------------------------------------------------------
    // Prerequisite closure
    // -----------------------------------------------------------------------

    /// Every unit that must come before `id`, earliest first.
    ///
    /// Never contains `id` itself or a duplicate. Empty for unknown ids. Only
    /// ancestors within `max_depth` hops over their shortest route are kept.
    pub fn prerequisites_of(&self, id: &str) -> Vec<NodeId> {
        let Some(root) = self.graph.position(id) else {
            return Vec::new();
        };
        let closure = self.ancestors_within_cap(root);

        // Post-order over the closure so dependencies come first.
        let mut visited = HashSet::from([root]);
        let mut order = Vec::with_capacity(closure.len());
        let mut stack = vec![(root, self.backward(root).into_iter())];
        while let Some((_, parents)) = stack.last_mut() {
            match parents.next() {
                Some(parent) => {
                    if closure.contains(&parent) && visited.insert(parent) {
                        stack.push((parent, self.backward(parent).into_iter()));
                    }
                }
                None => {
                    if let Some((done, _)) = stack.pop() {
                        if done != root {
                            order.push(done);
                        }
                    }
                }
            }
        }
        order
            .into_iter()
            .map(|p| self.graph.node_at(p).id.clone())
            .collect()
    }

    /// Ancestors of `root` reachable in at most `max_depth` hops.
    ///
    /// Breadth-first, so each node is expanded at its shallowest depth.
    fn ancestors_within_cap(&self, root: usize) -> HashSet<usize> {
        let mut depth_of = HashMap::from([(root, 0usize)]);
        let mut queue = VecDeque::from([root]);
        while let Some(position) = queue.pop_front() {
            let depth = depth_of.get(&position).copied().unwrap_or_default();
            if depth >= self.max_depth {
                tracing::trace!(node = %self.graph.node_at(position).id, depth, "prerequisite walk hit depth cap");
                continue;
            }
            for parent in self.backward(position) {
                if let Entry::Vacant(slot) = depth_of.entry(parent) {
                    slot.insert(depth + 1);
                    queue.push_back(parent);
                }
            }
        }
        depth_of.remove(&root);
        depth_of.into_keys().collect()
    }

    /// Parents in search order: sequential edges, then foundational.
    fn backward(&self, position: usize) -> Vec<usize> {
        Relationship::ORDERING
            .iter()
            .flat_map(|&r| self.graph.neighbours(position, r, Direction::Incoming))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Point-to-point paths
    // -----------------------------------------------------------------------

    /// First route from `start` to `end` (both inclusive) in edge order.
    ///
    /// `[start]` when the two are equal; empty when either is unknown or `end`
    /// is unreachable. No shortest-path guarantee.
    pub fn path_between(&self, start: &str, end: &str) -> Vec<NodeId> {
        let (Some(source), Some(target)) = (self.graph.position(start), self.graph.position(end))
        else {
            return Vec::new();
        };
        if source == target {
            return vec![self.graph.node_at(source).id.clone()];
        }

        // Branch-local: nodes on the current route. Global: nodes proven not to
        // reach the target. A frame that had a child cut by the depth cap proves
        // nothing, and neither do its ancestors on the stack.
        let mut on_route = HashSet::from([source]);
        let mut exhausted: HashSet<usize> = HashSet::new();
        let mut stack = vec![(source, self.forward(source).into_iter(), false)];

        loop {
            let depth = stack.len();
            let Some((_, children, pruned)) = stack.last_mut() else {
                break;
            };
            match children.next() {
                Some(child) if child == target => {
                    return stack
                        .iter()
                        .map(|(p, _, _)| *p)
                        .chain(std::iter::once(target))
                        .map(|p| self.graph.node_at(p).id.clone())
                        .collect();
                }
                Some(child) => {
                    if on_route.contains(&child) {
                        tracing::trace!(node = %self.graph.node_at(child).id, "cycle guard: skipping revisit");
                        continue;
                    }
                    if exhausted.contains(&child) {
                        continue;
                    }
                    if depth >= self.max_depth {
                        *pruned = true;
                        continue;
                    }
                    on_route.insert(child);
                    stack.push((child, self.forward(child).into_iter(), false));
                }
                None => {
                    if let Some((done, _, pruned)) = stack.pop() {
                        on_route.remove(&done);
                        if pruned {
                            if let Some(parent) = stack.last_mut() {
                                parent.2 = true;
                            }
                        } else {
                            exhausted.insert(done);
                        }
                    }
                }
            }
        }
        Vec::new()
    }

    /// Children in search order: sequential edges, then foundational.
    fn forward(&self, position: usize) -> Vec<usize> {
        Relationship::ORDERING
            .iter()
            .flat_map(|&r| self.graph.neighbours(position, r, Direction::Outgoing))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Multi-start stitching
    // -----------------------------------------------------------------------

    /// Route from several start points toward one goal, restricted to `subject`
    /// and stripped of completed units.
    ///
    /// Each start is searched independently; the strategy picks the canonical
    /// route. Empty when there are no starts or nothing reaches the goal.
    pub fn comprehensive_subject_path(
        &self,
        subject: Subject,
        start_ids: &[NodeId],
        end_id: &str,
        completed: &BTreeSet<NodeId>,
    ) -> Vec<NodeId> {
        let routes: Vec<Vec<NodeId>> = start_ids
            .iter()
            .map(|start| self.path_between(start.as_str(), end_id))
            .collect();

        let Some(route) = self.strategy.select(&routes) else {
            tracing::debug!(
                subject = %subject,
                goal = end_id,
                starts = start_ids.len(),
                "planning gap: goal unreachable from every start"
            );
            return Vec::new();
        };

        let mut seen = HashSet::new();
        route
            .iter()
            .filter(|id| {
                self.graph
                    .node(id.as_str())
                    .is_some_and(|n| n.subject == subject)
            })
            .filter(|id| !completed.contains(*id))
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }
}
