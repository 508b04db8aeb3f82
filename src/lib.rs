// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # curriculum-graph
//!
//! A curriculum graph engine: a directed graph of learning units across
//! subjects, with sequence navigation, prerequisite closure, path planning,
//! progress tracking and multi-subject learning plans.
//!
//! ## Architecture
//!
//! - **Domain model** (`curriculum`): Nodes, edges, subjects, relationships and the JSON dataset
//! - **Graph store** (`graph`): Indexed adjacency per relationship, hot-swappable snapshots
//! - **Navigation** (`navigator`): Next/previous unit with sequential-first tie rules
//! - **Planning** (`planner`): Prerequisite closure, backtracking DFS, plan assembly
//! - **Progress** (`progress`): Event ledger summaries and correction commands
//! - **Facade** (`engine`): `CurriculumEngine` wiring config, graph and services
//!
//! ## Library usage
//!
//! ```no_run
//! use curriculum_graph::config::EngineConfig;
//! use curriculum_graph::engine::CurriculumEngine;
//!
//! let config = EngineConfig::from_path(std::path::Path::new("curgraph.toml")).unwrap();
//! let engine = CurriculumEngine::new(config).unwrap();
//! if let Some(next) = engine.next("math-g1-u1") {
//!     println!("next unit: {}", next.unit_title);
//! }
//! ```

pub mod config;
pub mod curriculum;
pub mod engine;
pub mod error;
pub mod graph;
pub mod navigator;
pub mod planner;
pub mod progress;
