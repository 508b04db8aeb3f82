//! End-to-end integration tests for the curriculum graph engine.
//!
//! These tests load a small on-disk dataset and exercise navigation,
//! progress derivation, path planning and plan assembly together, the
//! way a web layer or AI orchestration step would call them.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};

use curriculum_graph::config::{EngineConfig, PlannerConfig};
use curriculum_graph::curriculum::dataset::CurriculumDataset;
use curriculum_graph::curriculum::{NodeId, Relationship, Subject};
use curriculum_graph::engine::CurriculumEngine;
use curriculum_graph::error::{CurriculumError, PlanError};
use curriculum_graph::navigator::SequenceNavigator;
use curriculum_graph::planner::{PathPlanner, PlanAssembler, PlanSource};
use curriculum_graph::progress::{ProgressCommand, ProgressEvent, ProgressLedger, ProgressLog};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/curriculum.json")
}

fn test_engine() -> CurriculumEngine {
    CurriculumEngine::new(EngineConfig {
        dataset_path: Some(fixture_path()),
        ..Default::default()
    })
    .unwrap()
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 8, minute, 0).unwrap()
}

fn ids(raw: &[&str]) -> Vec<NodeId> {
    raw.iter().map(|s| NodeId::from(*s)).collect()
}

#[test]
fn fixture_loads_with_expected_shape() {
    let engine = test_engine();
    let stats = engine.info();
    assert_eq!(stats.nodes, 14);
    assert_eq!(stats.edges, 11);
    assert_eq!(stats.subjects, 4);
    assert_eq!(stats.courses, 6);
    assert!(stats.acyclic);

    let subjects: Vec<_> = engine.subjects().into_iter().map(|s| s.subject).collect();
    assert_eq!(
        subjects,
        vec![Subject::Ela, Subject::Humanities, Subject::Math, Subject::Science]
    );
}

#[test]
fn courses_follow_grade_ladder() {
    let engine = test_engine();
    let ela: Vec<_> = engine
        .courses(Subject::Ela)
        .into_iter()
        .map(|c| c.path)
        .collect();
    assert_eq!(ela, vec!["/ela/kindergarten", "/ela/grade-2"]);
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[test]
fn sequential_next_and_previous_are_symmetric() {
    let graph = test_engine().graph();
    let nav = SequenceNavigator::new(&graph);
    for edge in graph.edges().iter().filter(|e| e.relationship == Relationship::Sequential) {
        let next = nav.next(edge.from.as_str()).unwrap();
        assert_eq!(next.id, edge.to);
        assert_eq!(nav.previous(next.id.as_str()).unwrap().id, edge.from);
    }
}

#[test]
fn foundational_fallback_crosses_courses() {
    let engine = test_engine();
    let next = engine.next("ela-k-u2").unwrap();
    assert_eq!(next.id.as_str(), "ela-g2-u1");
    assert_ne!(next.course_path, "/ela/kindergarten");
    assert_eq!(engine.previous("ela-g2-u1").unwrap().id.as_str(), "ela-k-u2");

    assert!(engine.next("ela-g2-u2").is_none());
    assert!(engine.previous("ela-k-u1").is_none());
}

#[test]
fn unknown_ids_are_not_errors() {
    let engine = test_engine();
    assert!(engine.node("ghost").is_none());
    assert!(engine.next("ghost").is_none());
    assert!(engine.prerequisites("ghost").is_empty());
    assert!(engine.path_between("ghost", "math-g1-u1").is_empty());
}

#[test]
fn trail_stays_within_subject() {
    let engine = test_engine();
    assert_eq!(
        engine.trail_to("ela-g2-u2"),
        ids(&["ela-k-u1", "ela-k-u2", "ela-g2-u1", "ela-g2-u2"])
    );
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

#[test]
fn prerequisites_are_ordered_and_unique() {
    let engine = test_engine();
    let prereqs = engine.prerequisites("ela-g2-u2");
    assert_eq!(prereqs, ids(&["ela-k-u1", "ela-k-u2", "ela-g2-u1"]));

    let graph = engine.graph();
    for node in graph.nodes() {
        let prereqs = engine.prerequisites(node.id.as_str());
        assert!(!prereqs.contains(&node.id));
        let unique: HashSet<_> = prereqs.iter().collect();
        assert_eq!(unique.len(), prereqs.len());
    }
}

#[test]
fn path_between_edge_cases() {
    let engine = test_engine();
    assert_eq!(engine.path_between("math-g1-u2", "math-g1-u2"), ids(&["math-g1-u2"]));
    assert!(engine.path_between("math-g1-u3", "math-g1-u1").is_empty());
    assert_eq!(
        engine.path_between("ela-k-u1", "ela-g2-u2"),
        ids(&["ela-k-u1", "ela-k-u2", "ela-g2-u1", "ela-g2-u2"])
    );
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_no_progress() {
    let engine = test_engine();
    let summary = engine.progress_summary(&[]);
    let math = &summary[&Subject::Math];
    assert_eq!(math.current_node, None);
    assert_eq!(math.completed_count, 0);
    assert_eq!(math.total_count, 3);

    let graph = engine.graph();
    let assembler = PlanAssembler::new(&graph, &PlannerConfig::default());
    assert_eq!(assembler.start_ids(&[], Subject::Math), ids(&["math-g1-u1"]));
}

#[test]
fn scenario_b_one_completion() {
    let engine = test_engine();
    let events = vec![
        ProgressEvent::started("math-g1-u1", at(0)),
        ProgressEvent::completed("math-g1-u1", at(5)),
    ];
    let graph = engine.graph();
    let ledger = ProgressLedger::new(&graph);
    assert_eq!(
        ledger.completed_nodes(&events, Subject::Math),
        BTreeSet::from([NodeId::from("math-g1-u1")])
    );

    let summary = engine.progress_summary(&events);
    let math = &summary[&Subject::Math];
    assert_eq!(math.current_node, Some(NodeId::from("math-g1-u2")));
    assert_eq!(math.completion_percent, 33);
    assert_eq!(math.last_activity, Some(at(5)));
}

#[test]
fn scenario_c_comprehensive_path() {
    let engine = test_engine();
    let graph = engine.graph();
    let planner = PathPlanner::new(&graph, &PlannerConfig::default());
    let start = ids(&["math-g1-u1"]);

    let full = planner.comprehensive_subject_path(Subject::Math, &start, "math-g1-u3", &BTreeSet::new());
    assert_eq!(full, ids(&["math-g1-u1", "math-g1-u2", "math-g1-u3"]));

    let completed = BTreeSet::from([NodeId::from("math-g1-u1")]);
    let rest = planner.comprehensive_subject_path(Subject::Math, &start, "math-g1-u3", &completed);
    assert_eq!(rest, ids(&["math-g1-u2", "math-g1-u3"]));
    assert!(rest.iter().all(|id| !completed.contains(id)));
}

#[test]
fn scenario_d_unreachable_goal_falls_back() {
    let engine = test_engine();
    let graph = engine.graph();
    let planner = PathPlanner::new(&graph, &PlannerConfig::default());
    let path = planner.comprehensive_subject_path(
        Subject::Science,
        &ids(&["sci-g3-u1"]),
        "sci-lab-u2",
        &BTreeSet::new(),
    );
    assert!(path.is_empty());

    let goals = BTreeMap::from([(Subject::Science, NodeId::from("sci-lab-u2"))]);
    let plan = engine.plan(&goals, &[]);
    let science = plan
        .diagnostics
        .subjects
        .iter()
        .find(|c| c.subject == Subject::Science)
        .unwrap();
    assert_eq!(science.source, PlanSource::Fallback);
    assert_eq!(science.proposed, 4);
    assert!(plan.unit_ids.contains(&NodeId::from("sci-lab-u1")));
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[test]
fn plan_spans_subjects_in_stable_order() {
    let engine = test_engine();
    let goals = BTreeMap::from([
        (Subject::Math, NodeId::from("math-g1-u3")),
        (Subject::Ela, NodeId::from("ela-g2-u2")),
    ]);
    let events = vec![ProgressEvent::completed("math-g1-u1", at(1))];
    let plan = engine.plan(&goals, &events);

    assert_eq!(
        plan.unit_ids,
        ids(&[
            "ela-k-u1",
            "ela-k-u2",
            "ela-g2-u1",
            "ela-g2-u2",
            "hum-g4-u1",
            "math-g1-u2",
            "math-g1-u3",
            "sci-g3-u1",
            "sci-g3-u2",
            "sci-lab-u1",
            "sci-lab-u2",
        ])
    );
    assert_eq!(plan.diagnostics.duplicates_removed, 0);
    assert_eq!(plan.diagnostics.truncated, 0);
    assert!(!plan.unit_ids.contains(&NodeId::from("math-g1-u1")));
}

#[test]
fn plan_is_cut_to_configured_size() {
    let engine = CurriculumEngine::new(EngineConfig {
        dataset_path: Some(fixture_path()),
        planner: PlannerConfig {
            max_plan_units: 5,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    let goals = BTreeMap::from([(Subject::Ela, NodeId::from("ela-g2-u2"))]);
    let plan = engine.plan(&goals, &[]);

    assert_eq!(plan.unit_ids.len(), 5);
    assert_eq!(plan.unit_ids[4].as_str(), "hum-g4-u1");
    assert_eq!(plan.diagnostics.retained, 5);
    assert!(plan.diagnostics.truncated > 0);
}

#[test]
fn sanitize_keeps_known_units_once() {
    let engine = test_engine();
    let kept = engine
        .sanitize_unit_ids(&["math-g1-u2", "ghost", "math-g1-u2", "math-g1-u1"])
        .unwrap();
    assert_eq!(kept, ids(&["math-g1-u2", "math-g1-u1"]));

    let err = engine.sanitize_unit_ids(&["ghost"]).unwrap_err();
    assert!(matches!(
        err,
        CurriculumError::Plan(PlanError::NoValidUnits { supplied: 1 })
    ));
}

// ---------------------------------------------------------------------------
// Progress flows
// ---------------------------------------------------------------------------

#[test]
fn complete_then_go_back_restores_position() {
    let engine = test_engine();
    let mut log = ProgressLog::new();

    engine.record(&ProgressCommand::StartSubject(NodeId::from("math-g1-u1")), &mut log);
    engine.record(&ProgressCommand::Complete(NodeId::from("math-g1-u1")), &mut log);
    let summary = engine.progress_summary(log.events());
    assert_eq!(summary[&Subject::Math].current_node, Some(NodeId::from("math-g1-u2")));
    assert_eq!(summary[&Subject::Math].completed_count, 1);

    engine.record(&ProgressCommand::GoBack(NodeId::from("math-g1-u2")), &mut log);
    let summary = engine.progress_summary(log.events());
    assert_eq!(summary[&Subject::Math].current_node, Some(NodeId::from("math-g1-u1")));
    assert_eq!(summary[&Subject::Math].completed_count, 0);
}

#[test]
fn summary_is_idempotent() {
    let engine = test_engine();
    let events = vec![
        ProgressEvent::started("ela-k-u1", at(0)),
        ProgressEvent::completed("ela-k-u1", at(1)),
        ProgressEvent::started("ghost", at(2)),
        ProgressEvent::started("sci-g3-u1", at(3)),
    ];
    assert_eq!(engine.progress_summary(&events), engine.progress_summary(&events));

    let summary = engine.progress_summary(&events);
    assert_eq!(summary[&Subject::Ela].current_node, Some(NodeId::from("ela-k-u2")));
    assert_eq!(summary[&Subject::Science].current_node, Some(NodeId::from("sci-g3-u1")));
    assert_eq!(summary[&Subject::Humanities].current_node, None);
}

// ---------------------------------------------------------------------------
// Configuration and reload
// ---------------------------------------------------------------------------

#[test]
fn config_file_resolves_relative_dataset() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::copy(fixture_path(), dir.path().join("network.json")).unwrap();
    let config_path = dir.path().join("curgraph.toml");
    std::fs::write(
        &config_path,
        "dataset_path = \"network.json\"\n\n[planner]\nroute_strategy = \"shortest\"\n",
    )
    .unwrap();

    let config = EngineConfig::from_path(&config_path).unwrap();
    let engine = CurriculumEngine::new(config).unwrap();
    assert_eq!(engine.info().nodes, 14);
}

#[test]
fn reload_swaps_whole_graph() {
    let engine = test_engine();
    let before = engine.graph();

    let json = std::fs::read_to_string(fixture_path()).unwrap();
    let mut dataset = CurriculumDataset::from_json(&json).unwrap();
    dataset.metadata = None;
    dataset
        .push_node("math-g1-u4", "math", "/math/grade-1", 4)
        .push_edge("math-g1-u3", "math-g1-u4", "sequential");

    engine.reload_from(&dataset).unwrap();
    assert_eq!(before.node_count(), 14);
    assert_eq!(engine.info().nodes, 15);
    assert_eq!(engine.next("math-g1-u3").unwrap().id.as_str(), "math-g1-u4");
}
