//! Immutable, fully indexed curriculum graph.
//!
//! Built once from a [`CurriculumDataset`]; every lookup afterwards is a hash
//! lookup or a slice walk. Adjacency lists are kept per node and per
//! [`Relationship`] in both directions, so no query ever scans the edge list.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::config::{GraphOptions, TieBreak};
use crate::curriculum::dataset::CurriculumDataset;
use crate::curriculum::{
    Course, Edge, Node, NodeId, Relationship, START_NODE, Subject, SubjectInfo, compare_grades,
};
use crate::error::DatasetError;

type Adjacency = [Vec<usize>; 3];

/// The loaded curriculum: nodes, edges and their indices.
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// NodeId → position in `nodes`.
    index: HashMap<NodeId, usize>,
    /// (from, to) node positions per edge.
    endpoints: Vec<(usize, usize)>,
    /// Per node, per relationship slot: outgoing edge positions.
    outgoing: Vec<Adjacency>,
    /// Per node, per relationship slot: incoming edge positions.
    incoming: Vec<Adjacency>,
    /// Node positions per subject, sorted by (course path, unit number, id).
    by_subject: BTreeMap<Subject, Vec<usize>>,
    /// Node involved in a cycle over ordering edges, if one was found at load time.
    cycle_witness: Option<NodeId>,
    tie_break: TieBreak,
}

impl GraphStore {
    /// Validate and index a dataset.
    ///
    /// Fails on the first integrity problem: empty or duplicate node ids,
    /// unknown subjects or relationship types, edges pointing at undeclared
    /// nodes, and `system` edges that do not leave `START`.
    pub fn from_dataset(
        dataset: &CurriculumDataset,
        options: &GraphOptions,
    ) -> Result<Self, DatasetError> {
        let mut nodes = Vec::with_capacity(dataset.nodes.len());
        let mut index = HashMap::with_capacity(dataset.nodes.len());

        for (position, raw) in dataset.nodes.iter().enumerate() {
            if raw.id.trim().is_empty() {
                return Err(DatasetError::EmptyNodeId { position });
            }
            let subject: Subject =
                raw.subject
                    .parse()
                    .map_err(|subject| DatasetError::UnknownSubject {
                        id: raw.id.clone(),
                        subject,
                    })?;
            let id = NodeId::new(raw.id.clone());
            if index.insert(id.clone(), nodes.len()).is_some() {
                return Err(DatasetError::DuplicateNode { id: raw.id.clone() });
            }
            nodes.push(Node {
                id,
                unit_title: raw.unit_title.clone(),
                unit_number: raw.unit_number,
                course_title: raw.course_title.clone(),
                course_path: raw.course_path.clone(),
                grade_level: raw.grade_level.clone(),
                subject,
            });
        }

        let mut edges = Vec::with_capacity(dataset.edges.len());
        let mut endpoints = Vec::with_capacity(dataset.edges.len());
        let mut outgoing: Vec<Adjacency> = vec![Adjacency::default(); nodes.len()];
        let mut incoming: Vec<Adjacency> = vec![Adjacency::default(); nodes.len()];

        for raw in &dataset.edges {
            let relationship: Relationship = raw.relationship_type.parse().map_err(|relationship| {
                DatasetError::UnknownRelationship {
                    from: raw.from.clone(),
                    to: raw.to.clone(),
                    relationship,
                }
            })?;
            let lookup = |id: &str| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| DatasetError::DanglingEdge {
                        from: raw.from.clone(),
                        to: raw.to.clone(),
                        missing: id.to_string(),
                    })
            };
            let from = lookup(&raw.from)?;
            let to = lookup(&raw.to)?;
            if relationship == Relationship::System && raw.from != START_NODE {
                return Err(DatasetError::MisplacedSystemEdge {
                    from: raw.from.clone(),
                    to: raw.to.clone(),
                });
            }

            let position = edges.len();
            outgoing[from][relationship.slot()].push(position);
            incoming[to][relationship.slot()].push(position);
            endpoints.push((from, to));
            edges.push(Edge {
                from: nodes[from].id.clone(),
                to: nodes[to].id.clone(),
                relationship,
                description: raw.description.clone(),
            });
        }

        if options.tie_break == TieBreak::Lexicographic {
            for lists in &mut outgoing {
                for list in lists.iter_mut() {
                    list.sort_by(|a, b| nodes[endpoints[*a].1].id.cmp(&nodes[endpoints[*b].1].id));
                }
            }
            for lists in &mut incoming {
                for list in lists.iter_mut() {
                    list.sort_by(|a, b| nodes[endpoints[*a].0].id.cmp(&nodes[endpoints[*b].0].id));
                }
            }
        }

        let mut by_subject: BTreeMap<Subject, Vec<usize>> = BTreeMap::new();
        for (position, node) in nodes.iter().enumerate() {
            by_subject.entry(node.subject).or_default().push(position);
        }
        for positions in by_subject.values_mut() {
            positions.sort_by(|a, b| {
                let (x, y) = (&nodes[*a], &nodes[*b]);
                x.course_path
                    .cmp(&y.course_path)
                    .then(x.unit_number.cmp(&y.unit_number))
                    .then_with(|| x.id.cmp(&y.id))
            });
        }

        let cycle_witness = find_cycle(&nodes, &edges, &endpoints);

        let store = Self {
            nodes,
            edges,
            index,
            endpoints,
            outgoing,
            incoming,
            by_subject,
            cycle_witness,
            tie_break: options.tie_break,
        };

        if let Some(ref node) = store.cycle_witness {
            tracing::warn!(
                node = %node,
                "curriculum graph contains a cycle; traversals will treat it as unreachable"
            );
        }
        if let Some(ref meta) = dataset.metadata {
            check_totals(meta.total_nodes, store.node_count(), "nodes");
            check_totals(meta.total_edges, store.edge_count(), "edges");
        }
        tracing::info!(
            nodes = store.node_count(),
            edges = store.edge_count(),
            subjects = store.subjects().len(),
            "curriculum graph loaded"
        );

        Ok(store)
    }

    /// Read, parse and index a dataset file.
    pub fn from_path(path: &Path, options: &GraphOptions) -> Result<Self, DatasetError> {
        let dataset = CurriculumDataset::from_path(path)?;
        Self::from_dataset(&dataset, options)
    }

    // -----------------------------------------------------------------------
    // Node lookups
    // -----------------------------------------------------------------------

    /// Look up a node. Absence is a normal outcome (e.g. stale ids).
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// `true` unless a cycle over sequential/foundational edges was detected at load.
    pub fn is_acyclic(&self) -> bool {
        self.cycle_witness.is_none()
    }

    /// Nodes of a subject in natural order: course path, then unit number.
    pub fn nodes_by_subject(&self, subject: Subject) -> Vec<&Node> {
        self.subject_positions(subject)
            .iter()
            .map(|&i| &self.nodes[i])
            .collect()
    }

    pub fn subject_node_count(&self, subject: Subject) -> usize {
        self.subject_positions(subject).len()
    }

    /// Learning subjects present in the dataset, in stable order (sentinels excluded).
    pub fn subjects(&self) -> Vec<Subject> {
        Subject::LEARNING
            .into_iter()
            .filter(|s| self.by_subject.contains_key(s))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Adjacency
    // -----------------------------------------------------------------------

    /// Outgoing edges of `id` in the given category, in tie-break order.
    pub fn edges_from<'a>(
        &'a self,
        id: &str,
        relationship: Relationship,
    ) -> impl Iterator<Item = &'a Edge> + use<'a> {
        let list = self.adjacency_of(id, relationship, Direction::Outgoing);
        list.iter().map(move |&e| &self.edges[e])
    }

    /// Incoming edges of `id` in the given category, in tie-break order.
    pub fn edges_to<'a>(
        &'a self,
        id: &str,
        relationship: Relationship,
    ) -> impl Iterator<Item = &'a Edge> + use<'a> {
        let list = self.adjacency_of(id, relationship, Direction::Incoming);
        list.iter().map(move |&e| &self.edges[e])
    }

    /// Targets of `id`'s outgoing edges in the given category.
    pub fn successors<'a>(
        &'a self,
        id: &str,
        relationship: Relationship,
    ) -> impl Iterator<Item = &'a Node> + use<'a> {
        let list = self.adjacency_of(id, relationship, Direction::Outgoing);
        list.iter().map(move |&e| &self.nodes[self.endpoints[e].1])
    }

    /// Sources of `id`'s incoming edges in the given category.
    pub fn predecessors<'a>(
        &'a self,
        id: &str,
        relationship: Relationship,
    ) -> impl Iterator<Item = &'a Node> + use<'a> {
        let list = self.adjacency_of(id, relationship, Direction::Incoming);
        list.iter().map(move |&e| &self.nodes[self.endpoints[e].0])
    }

    // -----------------------------------------------------------------------
    // Courses and subjects
    // -----------------------------------------------------------------------

    /// Subject entry units: targets of `system` edges from `START` within the subject.
    pub fn entry_nodes(&self, subject: Subject) -> Vec<&Node> {
        self.successors(START_NODE, Relationship::System)
            .filter(|n| n.subject == subject)
            .collect()
    }

    /// Where a learner new to the subject begins.
    pub fn first_node(&self, subject: Subject) -> Option<&Node> {
        self.entry_nodes(subject)
            .into_iter()
            .next()
            .or_else(|| self.nodes_by_subject(subject).into_iter().next())
    }

    /// Courses of a subject ordered along the grade ladder, units by unit number.
    pub fn courses(&self, subject: Subject) -> Vec<Course> {
        let mut groups: BTreeMap<&str, Vec<&Node>> = BTreeMap::new();
        for node in self.nodes_by_subject(subject) {
            groups.entry(node.course_path.as_str()).or_default().push(node);
        }

        let mut courses: Vec<Course> = groups
            .into_iter()
            .filter_map(|(path, units)| {
                let first = units.first()?;
                Some(Course {
                    path: path.to_string(),
                    title: first.course_title.clone(),
                    grade_level: first.grade_level.clone(),
                    units: units.iter().map(|n| n.id.clone()).collect(),
                })
            })
            .collect();
        courses.sort_by(|a, b| compare_grades(&a.grade_level, &b.grade_level));
        courses
    }

    pub fn subject_info(&self) -> Vec<SubjectInfo> {
        self.subjects()
            .into_iter()
            .map(|subject| SubjectInfo {
                subject,
                name: subject.display_name(),
                description: subject.description(),
                starting_nodes: self
                    .courses(subject)
                    .into_iter()
                    .filter_map(|c| c.units.into_iter().next())
                    .collect(),
            })
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let subjects = self.subjects();
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            courses: subjects.iter().map(|s| self.courses(*s).len()).sum(),
            subjects: subjects.len(),
            acyclic: self.is_acyclic(),
        }
    }

    // -----------------------------------------------------------------------
    // Position-based access for the traversal layer
    // -----------------------------------------------------------------------

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn node_at(&self, position: usize) -> &Node {
        &self.nodes[position]
    }

    /// Neighbour positions of a node along one category, in tie-break order.
    pub(crate) fn neighbours(
        &self,
        position: usize,
        relationship: Relationship,
        direction: Direction,
    ) -> impl Iterator<Item = usize> + '_ {
        let lists = match direction {
            Direction::Outgoing => &self.outgoing[position],
            Direction::Incoming => &self.incoming[position],
        };
        lists[relationship.slot()].iter().map(move |&e| {
            let (from, to) = self.endpoints[e];
            if direction == Direction::Outgoing { to } else { from }
        })
    }

    fn adjacency_of(&self, id: &str, relationship: Relationship, direction: Direction) -> &[usize] {
        let Some(position) = self.position(id) else {
            return &[];
        };
        let lists = match direction {
            Direction::Outgoing => &self.outgoing[position],
            Direction::Incoming => &self.incoming[position],
        };
        &lists[relationship.slot()]
    }

    fn subject_positions(&self, subject: Subject) -> &[usize] {
        self.by_subject
            .get(&subject)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStore")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("tie_break", &self.tie_break)
            .finish()
    }
}

/// Summary counts of a loaded graph.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub subjects: usize,
    pub courses: usize,
    pub acyclic: bool,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nodes: {}, Edges: {}, Subjects: {}, Courses: {}, Acyclic: {}",
            self.nodes, self.edges, self.subjects, self.courses, self.acyclic
        )
    }
}

/// Cycle detection over ordering edges. Returns a node on a cycle, if any.
fn find_cycle(nodes: &[Node], edges: &[Edge], endpoints: &[(usize, usize)]) -> Option<NodeId> {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    for position in 0..nodes.len() {
        graph.add_node(position);
    }
    for (edge, &(from, to)) in edges.iter().zip(endpoints) {
        if edge.relationship != Relationship::System {
            graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
        }
    }
    toposort(&graph, None)
        .err()
        .map(|cycle| nodes[graph[cycle.node_id()]].id.clone())
}

fn check_totals(declared: Option<usize>, loaded: usize, what: &str) {
    if let Some(declared) = declared {
        if declared != loaded {
            tracing::warn!(declared, loaded, what, "dataset metadata totals disagree with loaded data");
        }
    }
}
