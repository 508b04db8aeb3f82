//! Route selection policies for multi-start planning.
//!
//! When several start points reach the same goal, a [`RouteStrategy`] picks
//! the canonical route. The DFS core never looks at the policy.

use std::fmt;

use crate::config::RouteStrategyKind;
use crate::curriculum::NodeId;

/// Chooses one route among the non-empty candidates, in start-point order.
pub trait RouteStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn select<'r>(&self, routes: &'r [Vec<NodeId>]) -> Option<&'r [NodeId]>;
}

/// The longest route is assumed to cover the most prerequisite ground.
/// Ties keep the earliest start point.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestRoute;

impl RouteStrategy for LongestRoute {
    fn name(&self) -> &'static str {
        "longest"
    }

    fn select<'r>(&self, routes: &'r [Vec<NodeId>]) -> Option<&'r [NodeId]> {
        let mut best: Option<&Vec<NodeId>> = None;
        for route in routes.iter().filter(|r| !r.is_empty()) {
            if best.is_none_or(|b| route.len() > b.len()) {
                best = Some(route);
            }
        }
        best.map(Vec::as_slice)
    }
}

/// The shortest non-empty route. Ties keep the earliest start point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestRoute;

impl RouteStrategy for ShortestRoute {
    fn name(&self) -> &'static str {
        "shortest"
    }

    fn select<'r>(&self, routes: &'r [Vec<NodeId>]) -> Option<&'r [NodeId]> {
        let mut best: Option<&Vec<NodeId>> = None;
        for route in routes.iter().filter(|r| !r.is_empty()) {
            if best.is_none_or(|b| route.len() < b.len()) {
                best = Some(route);
            }
        }
        best.map(Vec::as_slice)
    }
}

/// Instantiate the configured built-in strategy.
pub fn from_kind(kind: RouteStrategyKind) -> Box<dyn RouteStrategy> {
    match kind {
        RouteStrategyKind::Longest => Box::new(LongestRoute),
        RouteStrategyKind::Shortest => Box::new(ShortestRoute),
    }
}
