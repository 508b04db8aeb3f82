//! Curriculum data model: units (nodes), relationships (edges) and the closed
//! enumerations for subjects and relationship categories.
//!
//! Raw dataset documents are parsed in [`dataset`] and validated into these
//! types when a [`GraphStore`](crate::graph::store::GraphStore) is built.

pub mod dataset;

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Id of the sentinel node every subject's entry units hang off.
pub const START_NODE: &str = "START";
/// Id of the sentinel terminal node.
pub const END_NODE: &str = "END";

/// Identity of a curriculum unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the reserved `START` / `END` sentinels.
    pub fn is_sentinel(&self) -> bool {
        self.0 == START_NODE || self.0 == END_NODE
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// Subject a unit belongs to.
///
/// Variant order is the stable subject order used for plans and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Ela,
    Humanities,
    Math,
    Science,
    /// Reserved for the `START` / `END` sentinels.
    System,
}

impl Subject {
    /// All learnable subjects, in stable order.
    pub const LEARNING: [Subject; 4] = [
        Subject::Ela,
        Subject::Humanities,
        Subject::Math,
        Subject::Science,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Ela => "ela",
            Subject::Humanities => "humanities",
            Subject::Math => "math",
            Subject::Science => "science",
            Subject::System => "system",
        }
    }

    /// Human-facing name used by dashboards.
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Ela => "English Language Arts",
            Subject::Humanities => "History & Social Studies",
            Subject::Math => "Mathematics",
            Subject::Science => "Science",
            Subject::System => "System",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Subject::Ela => "Reading comprehension, vocabulary, and language skills",
            Subject::Humanities => "History, government, civics, and social studies",
            Subject::Math => "Number sense, algebra, geometry, and mathematical reasoning",
            Subject::Science => "Biology, chemistry, physics, and earth science concepts",
            Subject::System => "Curriculum sentinels",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    /// Case-insensitive; datasets mix `ELA` and `ela`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ela" => Ok(Subject::Ela),
            "humanities" => Ok(Subject::Humanities),
            "math" => Ok(Subject::Math),
            "science" => Ok(Subject::Science),
            "system" => Ok(Subject::System),
            _ => Err(s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Relationship
// ---------------------------------------------------------------------------

/// Category of a directed curriculum edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    /// Orders two units within the same course.
    Sequential,
    /// Cross-course prerequisite, typically the end of one course to the start of the next.
    Foundational,
    /// Links `START` to a subject's canonical entry units.
    System,
}

impl Relationship {
    pub const ALL: [Relationship; 3] = [
        Relationship::Sequential,
        Relationship::Foundational,
        Relationship::System,
    ];

    /// Relationships that express learning order (everything but `system`).
    pub const ORDERING: [Relationship; 2] = [Relationship::Sequential, Relationship::Foundational];

    pub(crate) fn slot(self) -> usize {
        match self {
            Relationship::Sequential => 0,
            Relationship::Foundational => 1,
            Relationship::System => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::Sequential => "sequential",
            Relationship::Foundational => "foundational",
            Relationship::System => "system",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Relationship::Sequential),
            "foundational" => Ok(Relationship::Foundational),
            "system" => Ok(Relationship::System),
            _ => Err(s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Nodes, edges, courses
// ---------------------------------------------------------------------------

/// One teachable curriculum unit. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub unit_title: String,
    /// Sequence number of the unit within its course.
    pub unit_number: u32,
    pub course_title: String,
    /// Groups nodes into a course.
    pub course_path: String,
    pub grade_level: String,
    pub subject: Subject,
}

/// A directed `from -> to` relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub relationship: Relationship,
    pub description: String,
}

/// An ordered group of units sharing a course path.
#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub path: String,
    pub title: String,
    pub grade_level: String,
    /// Units sorted by unit number.
    pub units: Vec<NodeId>,
}

/// Overview of one subject as presented to dashboards and goal selection.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectInfo {
    pub subject: Subject,
    pub name: &'static str,
    pub description: &'static str,
    /// First unit of each course, in course order.
    pub starting_nodes: Vec<NodeId>,
}

/// Rough grade ladder used to order courses; unknown grades sort lexically after it.
pub const GRADE_ORDER: [&str; 14] = [
    "K-1", "2", "3", "4", "5", "6", "6-8", "7", "8", "9", "9-12", "10", "11", "12",
];

/// Compare two grade-level labels along [`GRADE_ORDER`].
pub fn compare_grades(a: &str, b: &str) -> std::cmp::Ordering {
    let rank = |g: &str| GRADE_ORDER.iter().position(|x| *x == g);
    match (rank(a), rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn subject_parses_case_insensitively() {
        assert_eq!("ELA".parse::<Subject>().unwrap(), Subject::Ela);
        assert_eq!(" math ".parse::<Subject>().unwrap(), Subject::Math);
        assert!("art".parse::<Subject>().is_err());
    }

    #[test]
    fn learning_subjects_are_in_stable_order() {
        let mut sorted = Subject::LEARNING;
        sorted.sort();
        assert_eq!(sorted, Subject::LEARNING);
        assert!(!Subject::LEARNING.contains(&Subject::System));
    }

    #[test]
    fn relationship_round_trips_through_display() {
        for rel in Relationship::ALL {
            assert_eq!(rel.to_string().parse::<Relationship>().unwrap(), rel);
        }
    }

    #[test]
    fn grade_ladder_ordering() {
        assert_eq!(compare_grades("K-1", "12"), Ordering::Less);
        assert_eq!(compare_grades("9-12", "10"), Ordering::Less);
        assert_eq!(compare_grades("college", "12"), Ordering::Greater);
        assert_eq!(compare_grades("AP", "college"), Ordering::Less);
    }

    #[test]
    fn sentinel_ids() {
        assert!(NodeId::from(START_NODE).is_sentinel());
        assert!(NodeId::from(END_NODE).is_sentinel());
        assert!(!NodeId::from("m1").is_sentinel());
    }
}
