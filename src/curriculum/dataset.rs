//! Serde model of the curriculum dataset document.
//!
//! The document is owned by an external loader; this module only parses it.
//! Subjects and relationship types stay as strings here and are validated into
//! closed enums by [`GraphStore::from_dataset`](crate::graph::store::GraphStore::from_dataset).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Node record as it appears in the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub unit_title: String,
    #[serde(default)]
    pub unit_number: u32,
    #[serde(default)]
    pub course_title: String,
    #[serde(default)]
    pub course_path: String,
    #[serde(default)]
    pub grade_level: String,
    pub subject: String,
}

/// Edge record as it appears in the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEdge {
    pub from: String,
    pub to: String,
    pub relationship_type: String,
    #[serde(default)]
    pub description: String,
}

/// Optional totals published alongside the data, used for a completeness check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub total_nodes: Option<usize>,
    pub total_edges: Option<usize>,
}

/// The whole `{nodes, edges}` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurriculumDataset {
    #[serde(default)]
    pub metadata: Option<DatasetMetadata>,
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

impl CurriculumDataset {
    /// Parse a dataset from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(json).map_err(|e| DatasetError::Parse {
            message: e.to_string(),
        })
    }

    /// Read and parse a dataset file.
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Convenience for building synthetic datasets in tests and tools.
    pub fn push_node(
        &mut self,
        id: &str,
        subject: &str,
        course_path: &str,
        unit_number: u32,
    ) -> &mut Self {
        self.nodes.push(RawNode {
            id: id.to_string(),
            unit_title: format!("Unit {unit_number}"),
            unit_number,
            course_title: course_path.to_string(),
            course_path: course_path.to_string(),
            grade_level: String::new(),
            subject: subject.to_string(),
        });
        self
    }

    pub fn push_edge(&mut self, from: &str, to: &str, relationship_type: &str) -> &mut Self {
        self.edges.push(RawEdge {
            from: from.to_string(),
            to: to.to_string(),
            relationship_type: relationship_type.to_string(),
            description: String::new(),
        });
        self
    }
}
