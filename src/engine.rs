//! Engine facade: top-level API for the curriculum graph engine.
//!
//! The `CurriculumEngine` owns the configuration and the shared graph handle.
//! Each call takes a snapshot of the current graph, so a concurrent
//! [`reload`](CurriculumEngine::reload) never changes the graph under a call
//! already in flight.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::curriculum::dataset::CurriculumDataset;
use crate::curriculum::{Course, Node, NodeId, Subject, SubjectInfo};
use crate::error::{ConfigError, CurriculumResult};
use crate::graph::{GraphStats, GraphStore, SharedGraph};
use crate::navigator::SequenceNavigator;
use crate::planner::{LearningPlan, PathPlanner, PlanAssembler};
use crate::progress::{
    LedgerOp, ProgressCommand, ProgressEvent, ProgressLedger, ProgressLog, SubjectProgressSummary,
};

/// The curriculum graph engine.
#[derive(Debug)]
pub struct CurriculumEngine {
    config: EngineConfig,
    graph: SharedGraph,
}

impl CurriculumEngine {
    /// Load the configured dataset and build the engine.
    pub fn new(config: EngineConfig) -> CurriculumResult<Self> {
        config.validate()?;
        let path = config.dataset_path.clone().ok_or(ConfigError::NoDataset)?;
        tracing::info!(dataset = %path.display(), "initializing curriculum engine");
        let store = GraphStore::from_path(&path, &config.graph)?;
        Ok(Self {
            config,
            graph: SharedGraph::new(store),
        })
    }

    /// Build an engine around an in-memory dataset.
    pub fn from_dataset(dataset: &CurriculumDataset, config: EngineConfig) -> CurriculumResult<Self> {
        config.validate()?;
        let store = GraphStore::from_dataset(dataset, &config.graph)?;
        Ok(Self {
            config,
            graph: SharedGraph::new(store),
        })
    }

    /// Rebuild the graph from the configured dataset and swap it in.
    ///
    /// On failure the current graph stays in place.
    pub fn reload(&self) -> CurriculumResult<()> {
        let path = self
            .config
            .dataset_path
            .as_ref()
            .ok_or(ConfigError::NoDataset)?;
        let store = GraphStore::from_path(path, &self.config.graph)?;
        self.graph.swap(store);
        Ok(())
    }

    /// Swap in a graph built from an in-memory dataset.
    pub fn reload_from(&self, dataset: &CurriculumDataset) -> CurriculumResult<()> {
        let store = GraphStore::from_dataset(dataset, &self.config.graph)?;
        self.graph.swap(store);
        Ok(())
    }

    /// Snapshot of the current graph.
    pub fn graph(&self) -> Arc<GraphStore> {
        self.graph.load()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn info(&self) -> GraphStats {
        self.graph().stats()
    }

    // -----------------------------------------------------------------------
    // Lookups and navigation
    // -----------------------------------------------------------------------

    pub fn node(&self, id: &str) -> Option<Node> {
        self.graph().node(id).cloned()
    }

    pub fn subjects(&self) -> Vec<SubjectInfo> {
        self.graph().subject_info()
    }

    pub fn courses(&self, subject: Subject) -> Vec<Course> {
        self.graph().courses(subject)
    }

    pub fn next(&self, id: &str) -> Option<Node> {
        let graph = self.graph();
        SequenceNavigator::new(&graph).next(id).cloned()
    }

    pub fn previous(&self, id: &str) -> Option<Node> {
        let graph = self.graph();
        SequenceNavigator::new(&graph).previous(id).cloned()
    }

    /// Units leading up to `id` within its subject, earliest first.
    pub fn trail_to(&self, id: &str) -> Vec<NodeId> {
        let graph = self.graph();
        SequenceNavigator::new(&graph).trail_to(id)
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    pub fn prerequisites(&self, id: &str) -> Vec<NodeId> {
        let graph = self.graph();
        PathPlanner::new(&graph, &self.config.planner).prerequisites_of(id)
    }

    pub fn path_between(&self, start: &str, end: &str) -> Vec<NodeId> {
        let graph = self.graph();
        PathPlanner::new(&graph, &self.config.planner).path_between(start, end)
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    pub fn progress_summary(&self, events: &[ProgressEvent]) -> BTreeMap<Subject, SubjectProgressSummary> {
        let graph = self.graph();
        ProgressLedger::new(&graph).summary(events)
    }

    /// Ledger operations that carry out a progress action.
    pub fn resolve_command(&self, command: &ProgressCommand, events: &[ProgressEvent]) -> Vec<LedgerOp> {
        command.resolve(&self.graph(), events)
    }

    /// Resolve `command` against `log` and apply the result. Returns the number of ops applied.
    pub fn record(&self, command: &ProgressCommand, log: &mut ProgressLog) -> usize {
        let ops = self.resolve_command(command, log.events());
        log.apply(&ops, chrono::Utc::now())
    }

    // -----------------------------------------------------------------------
    // Plans
    // -----------------------------------------------------------------------

    pub fn plan(&self, goals: &BTreeMap<Subject, NodeId>, events: &[ProgressEvent]) -> LearningPlan {
        let graph = self.graph();
        PlanAssembler::new(&graph, &self.config.planner).assemble(goals, events)
    }

    /// Vet an externally produced unit list against the current graph.
    pub fn sanitize_unit_ids<S: AsRef<str>>(&self, ids: &[S]) -> CurriculumResult<Vec<NodeId>> {
        let graph = self.graph();
        Ok(PlanAssembler::new(&graph, &self.config.planner).sanitize_unit_ids(ids)?)
    }
}
