//! Rich diagnostic error types for the curriculum graph engine.
//!
//! Only dataset integrity and configuration problems are errors. Lookups that
//! miss, goals that cannot be reached and cyclic anomalies are ordinary
//! outcomes (`Option` / empty `Vec`) and never surface here.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the curriculum graph engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum CurriculumError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Plan(#[from] PlanError),
}

// ---------------------------------------------------------------------------
// Dataset errors
// ---------------------------------------------------------------------------

/// Integrity failures detected while building a [`GraphStore`](crate::graph::store::GraphStore).
///
/// All of these are fatal: the engine refuses to run on a partially indexed graph.
#[derive(Debug, Error, Diagnostic)]
pub enum DatasetError {
    #[error("failed to read curriculum dataset: {path}")]
    #[diagnostic(
        code(curriculum::dataset::io),
        help("Check that the dataset file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse curriculum dataset: {message}")]
    #[diagnostic(
        code(curriculum::dataset::parse),
        help(
            "The dataset must be a JSON document with a `nodes` array and an \
             `edges` array. Check the file for syntax errors or missing fields."
        )
    )]
    Parse { message: String },

    #[error("node with an empty id at position {position}")]
    #[diagnostic(
        code(curriculum::dataset::empty_id),
        help("Every node needs a non-empty `id`.")
    )]
    EmptyNodeId { position: usize },

    #[error("duplicate node id: {id}")]
    #[diagnostic(
        code(curriculum::dataset::duplicate_node),
        help("Node ids must be unique across the whole dataset. Remove or rename the duplicate.")
    )]
    DuplicateNode { id: String },

    #[error("edge {from} -> {to} references unknown node {missing}")]
    #[diagnostic(
        code(curriculum::dataset::dangling_edge),
        help(
            "Every edge endpoint must be declared in `nodes`. \
             Add the missing node or drop the edge."
        )
    )]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("node {id} has unknown subject \"{subject}\"")]
    #[diagnostic(
        code(curriculum::dataset::unknown_subject),
        help("Valid subjects are: math, ela, science, humanities, system.")
    )]
    UnknownSubject { id: String, subject: String },

    #[error("edge {from} -> {to} has unknown relationship type \"{relationship}\"")]
    #[diagnostic(
        code(curriculum::dataset::unknown_relationship),
        help("Valid relationship types are: sequential, foundational, system.")
    )]
    UnknownRelationship {
        from: String,
        to: String,
        relationship: String,
    },

    #[error("system edge {from} -> {to} does not start at the START sentinel")]
    #[diagnostic(
        code(curriculum::dataset::misplaced_system_edge),
        help(
            "`system` edges mark each subject's entry units and must originate \
             from the reserved START node."
        )
    )]
    MisplacedSystemEdge { from: String, to: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read engine config: {path}")]
    #[diagnostic(
        code(curriculum::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse engine config: {path}")]
    #[diagnostic(
        code(curriculum::config::parse),
        help("Check the TOML syntax in the config file. {message}")
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(curriculum::config::invalid),
        help("Check the EngineConfig fields. {message}")
    )]
    Invalid { message: String },

    #[error("no curriculum dataset configured")]
    #[diagnostic(
        code(curriculum::config::no_dataset),
        help("Set `dataset_path` in the config file or pass `--dataset <FILE>`.")
    )]
    NoDataset,
}

// ---------------------------------------------------------------------------
// Plan errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PlanError {
    #[error("none of the {supplied} supplied unit ids exist in the curriculum")]
    #[diagnostic(
        code(curriculum::plan::no_valid_units),
        help(
            "The unit list was produced outside the engine (for example by a \
             goal-selection step) and referenced only unknown nodes. \
             Regenerate it against the current dataset."
        )
    )]
    NoValidUnits { supplied: usize },
}

/// Convenience alias for functions returning curriculum engine results.
pub type CurriculumResult<T> = std::result::Result<T, CurriculumError>;
