//! Cross-subject learning plan assembly.
//!
//! For every subject the assembler derives start points from the learner's
//! history, routes them toward the subject's goal with the [`PathPlanner`],
//! and falls back to the first few open units of the subject when no route
//! exists. Subject paths are concatenated in stable subject order,
//! deduplicated, and cut to the configured plan size.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::config::PlannerConfig;
use crate::curriculum::{NodeId, Subject};
use crate::error::PlanError;
use crate::graph::store::GraphStore;
use crate::progress::{ProgressAction, ProgressEvent, ProgressLedger};

use super::PathPlanner;
use super::strategy::RouteStrategy;

/// How a subject's units were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Routed toward an explicit goal.
    Goal,
    /// First open units from the subject's beginning.
    Fallback,
}

/// What one subject put into the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectContribution {
    pub subject: Subject,
    pub source: PlanSource,
    pub goal: Option<NodeId>,
    pub start_ids: Vec<NodeId>,
    /// Units proposed before global dedup and the size cap.
    pub proposed: usize,
    /// Units that made it into the final plan.
    pub retained: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanDiagnostics {
    /// Units proposed across all subjects.
    pub considered: usize,
    pub duplicates_removed: usize,
    /// Units dropped from the tail by the size cap.
    pub truncated: usize,
    pub retained: usize,
    pub subjects: Vec<SubjectContribution>,
}

/// The ordered unit list for a one-year plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningPlan {
    pub unit_ids: Vec<NodeId>,
    pub diagnostics: PlanDiagnostics,
}

/// Builds [`LearningPlan`]s from goals and a progress history.
#[derive(Debug)]
pub struct PlanAssembler<'g> {
    graph: &'g GraphStore,
    planner: PathPlanner<'g>,
    ledger: ProgressLedger<'g>,
    max_plan_units: usize,
    fallback_units: usize,
}

impl<'g> PlanAssembler<'g> {
    pub fn new(graph: &'g GraphStore, config: &PlannerConfig) -> Self {
        Self {
            graph,
            planner: PathPlanner::new(graph, config),
            ledger: ProgressLedger::new(graph),
            max_plan_units: config.max_plan_units,
            fallback_units: config.fallback_units,
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn RouteStrategy>) -> Self {
        self.planner = self.planner.with_strategy(strategy);
        self
    }

    /// Where planning starts in `subject`.
    ///
    /// Units in progress if any; otherwise the unit after the latest
    /// completion; otherwise the subject's `START`-linked entry units,
    /// or its first unit when it has none.
    pub fn start_ids(&self, events: &[ProgressEvent], subject: Subject) -> Vec<NodeId> {
        let in_progress = self.ledger.in_progress_nodes(events, subject);
        if !in_progress.is_empty() {
            return in_progress;
        }
        if self
            .ledger
            .latest(events, subject, ProgressAction::Completed)
            .is_some()
        {
            if let Some(current) = self.ledger.current_node(events, subject) {
                return vec![current];
            }
        }
        let entries: Vec<NodeId> = self
            .graph
            .entry_nodes(subject)
            .into_iter()
            .map(|n| n.id.clone())
            .collect();
        if !entries.is_empty() {
            return entries;
        }
        self.graph
            .first_node(subject)
            .map(|n| vec![n.id.clone()])
            .unwrap_or_default()
    }

    /// The first `fallback_units` units of the subject in natural order, skipping completed ones.
    pub fn fallback_path(&self, subject: Subject, completed: &BTreeSet<NodeId>) -> Vec<NodeId> {
        self.graph
            .nodes_by_subject(subject)
            .into_iter()
            .filter(|n| !completed.contains(&n.id))
            .take(self.fallback_units)
            .map(|n| n.id.clone())
            .collect()
    }

    /// Assemble the plan. `goals` maps subjects to externally chosen end units.
    pub fn assemble(
        &self,
        goals: &BTreeMap<Subject, NodeId>,
        events: &[ProgressEvent],
    ) -> LearningPlan {
        let mut proposed: Vec<NodeId> = Vec::new();
        let mut contributions = Vec::new();

        for subject in self.graph.subjects() {
            let completed = self.ledger.completed_nodes(events, subject);
            let start_ids = self.start_ids(events, subject);
            let goal = goals.get(&subject).filter(|g| {
                let known = self.graph.contains(g.as_str());
                if !known {
                    tracing::warn!(subject = %subject, goal = %g, "ignoring unknown goal unit");
                }
                known
            });

            let routed = match goal {
                Some(goal) if !start_ids.is_empty() => self.planner.comprehensive_subject_path(
                    subject,
                    &start_ids,
                    goal.as_str(),
                    &completed,
                ),
                _ => Vec::new(),
            };

            let (source, units) = if routed.is_empty() {
                tracing::debug!(
                    subject = %subject,
                    has_goal = goal.is_some(),
                    "no goal-directed path; using first units of the subject"
                );
                (PlanSource::Fallback, self.fallback_path(subject, &completed))
            } else {
                (PlanSource::Goal, routed)
            };

            contributions.push(SubjectContribution {
                subject,
                source,
                goal: goal.cloned(),
                start_ids,
                proposed: units.len(),
                retained: 0,
            });
            proposed.extend(units);
        }

        let considered = proposed.len();
        let mut seen = HashSet::new();
        let mut unit_ids: Vec<NodeId> = proposed
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        let duplicates_removed = considered - unit_ids.len();
        let truncated = unit_ids.len().saturating_sub(self.max_plan_units);
        unit_ids.truncate(self.max_plan_units);
        if truncated > 0 {
            tracing::debug!(truncated, cap = self.max_plan_units, "plan truncated to size cap");
        }

        for contribution in &mut contributions {
            contribution.retained = unit_ids
                .iter()
                .filter(|id| {
                    self.graph
                        .node(id.as_str())
                        .is_some_and(|n| n.subject == contribution.subject)
                })
                .count();
        }

        tracing::info!(
            units = unit_ids.len(),
            considered,
            subjects = contributions.len(),
            strategy = self.planner.strategy().name(),
            "learning plan assembled"
        );

        LearningPlan {
            diagnostics: PlanDiagnostics {
                considered,
                duplicates_removed,
                truncated,
                retained: unit_ids.len(),
                subjects: contributions,
            },
            unit_ids,
        }
    }

    /// Keep only ids of real units in the graph, first occurrence wins.
    ///
    /// Used to vet unit lists produced outside the engine. The `START` and
    /// `END` sentinels are never units.
    pub fn sanitize_unit_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<NodeId>, PlanError> {
        let mut seen = HashSet::new();
        let valid: Vec<NodeId> = ids
            .iter()
            .filter_map(|id| self.graph.node(id.as_ref()))
            .filter(|n| !n.id.is_sentinel())
            .filter(|n| seen.insert(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect();
        if valid.is_empty() {
            return Err(PlanError::NoValidUnits { supplied: ids.len() });
        }
        if valid.len() < ids.len() {
            tracing::debug!(supplied = ids.len(), kept = valid.len(), "dropped unknown or repeated unit ids");
        }
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphOptions;
    use crate::curriculum::dataset::CurriculumDataset;
    use chrono::{DateTime, TimeZone, Utc};

    /// math: m1→m2→m3 entered from START, plus disconnected x1→x2.
    /// science: s1..s7 chain with no START link.
    fn store() -> GraphStore {
        let mut ds = CurriculumDataset::default();
        ds.push_node("START", "system", "", 0)
            .push_node("m1", "math", "/math/a", 1)
            .push_node("m2", "math", "/math/a", 2)
            .push_node("m3", "math", "/math/a", 3)
            .push_node("x1", "math", "/math/x", 1)
            .push_node("x2", "math", "/math/x", 2)
            .push_edge("START", "m1", "system")
            .push_edge("m1", "m2", "sequential")
            .push_edge("m2", "m3", "sequential")
            .push_edge("x1", "x2", "sequential");
        for i in 1..=7 {
            ds.push_node(&format!("s{i}"), "science", "/sci", i);
            if i > 1 {
                ds.push_edge(&format!("s{}", i - 1), &format!("s{i}"), "sequential");
            }
        }
        GraphStore::from_dataset(&ds, &GraphOptions::default()).unwrap()
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, minute, 0).unwrap()
    }

    fn goals(pairs: &[(Subject, &str)]) -> BTreeMap<Subject, NodeId> {
        pairs.iter().map(|(s, id)| (*s, NodeId::from(*id))).collect()
    }

    fn ids(v: &[NodeId]) -> Vec<&str> {
        v.iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn start_ids_follow_progress_precedence() {
        let g = store();
        let asm = PlanAssembler::new(&g, &PlannerConfig::default());

        assert_eq!(ids(&asm.start_ids(&[], Subject::Math)), vec!["m1"]);
        assert_eq!(ids(&asm.start_ids(&[], Subject::Science)), vec!["s1"]);

        let done = [ProgressEvent::completed("m1", at(0))];
        assert_eq!(ids(&asm.start_ids(&done, Subject::Math)), vec!["m2"]);

        let mixed = [
            ProgressEvent::completed("m1", at(0)),
            ProgressEvent::started("x1", at(1)),
        ];
        assert_eq!(ids(&asm.start_ids(&mixed, Subject::Math)), vec!["x1"]);
    }

    #[test]
    fn goal_directed_subject_and_fallback_subject() {
        let g = store();
        let asm = PlanAssembler::new(&g, &PlannerConfig::default());
        let plan = asm.assemble(&goals(&[(Subject::Math, "m3")]), &[]);

        assert_eq!(ids(&plan.unit_ids), vec!["m1", "m2", "m3", "s1", "s2", "s3", "s4", "s5"]);
        let math = &plan.diagnostics.subjects[0];
        assert_eq!(math.subject, Subject::Math);
        assert_eq!(math.source, PlanSource::Goal);
        let science = &plan.diagnostics.subjects[1];
        assert_eq!(science.source, PlanSource::Fallback);
        assert_eq!(science.proposed, 5);
    }

    #[test]
    fn unreachable_goal_falls_back() {
        let g = store();
        let asm = PlanAssembler::new(&g, &PlannerConfig::default());
        let events = [ProgressEvent::completed("m1", at(0))];
        let plan = asm.assemble(&goals(&[(Subject::Math, "x2")]), &events);

        let math = &plan.diagnostics.subjects[0];
        assert_eq!(math.source, PlanSource::Fallback);
        assert_eq!(ids(&plan.unit_ids)[..4], ["m2", "m3", "x1", "x2"]);
    }

    #[test]
    fn unknown_goal_is_ignored() {
        let g = store();
        let asm = PlanAssembler::new(&g, &PlannerConfig::default());
        let plan = asm.assemble(&goals(&[(Subject::Math, "ghost")]), &[]);
        assert_eq!(plan.diagnostics.subjects[0].goal, None);
        assert_eq!(plan.diagnostics.subjects[0].source, PlanSource::Fallback);
    }

    #[test]
    fn completed_units_never_planned() {
        let g = store();
        let asm = PlanAssembler::new(&g, &PlannerConfig::default());
        let events = [
            ProgressEvent::completed("m1", at(0)),
            ProgressEvent::completed("s1", at(1)),
        ];
        let plan = asm.assemble(&goals(&[(Subject::Math, "m3")]), &events);
        assert!(!plan.unit_ids.contains(&NodeId::from("m1")));
        assert!(!plan.unit_ids.contains(&NodeId::from("s1")));
        assert_eq!(ids(&plan.unit_ids)[..2], ["m2", "m3"]);
    }

    #[test]
    fn size_cap_drops_the_tail() {
        let g = store();
        let config = PlannerConfig {
            max_plan_units: 4,
            ..Default::default()
        };
        let asm = PlanAssembler::new(&g, &config);
        let plan = asm.assemble(&goals(&[(Subject::Math, "m3")]), &[]);

        assert_eq!(ids(&plan.unit_ids), vec!["m1", "m2", "m3", "s1"]);
        assert_eq!(plan.diagnostics.considered, 8);
        assert_eq!(plan.diagnostics.truncated, 4);
        assert_eq!(plan.diagnostics.retained, 4);
        assert_eq!(plan.diagnostics.subjects[1].retained, 1);
    }

    #[test]
    fn sanitize_keeps_known_ids_in_order() {
        let g = store();
        let asm = PlanAssembler::new(&g, &PlannerConfig::default());
        let kept = asm.sanitize_unit_ids(&["m2", "ghost", "m1", "m2"]).unwrap();
        assert_eq!(ids(&kept), vec!["m2", "m1"]);

        let err = asm.sanitize_unit_ids(&["ghost"]).unwrap_err();
        assert!(matches!(err, PlanError::NoValidUnits { supplied: 1 }));
    }

    #[test]
    fn sanitize_drops_sentinels() {
        let g = store();
        let asm = PlanAssembler::new(&g, &PlannerConfig::default());
        let kept = asm.sanitize_unit_ids(&["START", "m1"]).unwrap();
        assert_eq!(ids(&kept), vec!["m1"]);
        assert!(asm.sanitize_unit_ids(&["START"]).is_err());
    }

    /// Always takes the first non-empty route.
    #[derive(Debug)]
    struct FirstRoute;

    impl RouteStrategy for FirstRoute {
        fn name(&self) -> &'static str {
            "first"
        }

        fn select<'r>(&self, routes: &'r [Vec<NodeId>]) -> Option<&'r [NodeId]> {
            routes.iter().find(|r| !r.is_empty()).map(Vec::as_slice)
        }
    }

    #[test]
    fn injected_strategy_drives_goal_routes() {
        let g = store();
        let events = [
            ProgressEvent::started("m2", at(0)),
            ProgressEvent::started("m1", at(1)),
        ];
        let goal = goals(&[(Subject::Math, "m3")]);

        let longest = PlanAssembler::new(&g, &PlannerConfig::default()).assemble(&goal, &events);
        assert_eq!(ids(&longest.unit_ids)[..3], ["m1", "m2", "m3"]);

        let first = PlanAssembler::new(&g, &PlannerConfig::default())
            .with_strategy(Box::new(FirstRoute))
            .assemble(&goal, &events);
        assert_eq!(ids(&first.unit_ids)[..2], ["m2", "m3"]);
        assert_eq!(first.diagnostics.subjects[0].source, PlanSource::Goal);
    }
}
