//! Curriculum graph: the immutable indexed store and its shared handle.
//!
//! - **[`GraphStore`](store::GraphStore)**: nodes, edges and per-category
//!   adjacency in both directions, built once and never mutated
//! - **[`SharedGraph`](shared::SharedGraph)**: reader handle that swaps in a
//!   freshly built store when the dataset is reloaded

pub mod shared;
pub mod store;

pub use shared::SharedGraph;
pub use store::{GraphStats, GraphStore};
