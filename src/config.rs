//! Engine configuration, loadable from TOML.
//!
//! Every field has a default so a config file only needs to name what it changes:
//!
//! ```toml
//! dataset_path = "curriculum_prerequisite_network.json"
//!
//! [graph]
//! tie_break = "lexicographic"
//!
//! [planner]
//! max_plan_units = 40
//! route_strategy = "shortest"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How competing edges of the same category are ordered.
///
/// Decides which candidate `next`, `previous` and path search try first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Edge declaration order in the dataset.
    #[default]
    DatasetOrder,
    /// Ascending by neighbour node id.
    Lexicographic,
}

/// Which route wins when several start points reach the same goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategyKind {
    /// The longest route covers the most prerequisite ground.
    #[default]
    Longest,
    /// The shortest non-empty route.
    Shortest,
}

/// Options applied while building the graph indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    pub tie_break: TieBreak,
}

/// Path planning and plan assembly limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Hard cap on the number of units in an assembled plan.
    pub max_plan_units: usize,
    /// Units emitted per subject when no goal-directed path can be derived.
    pub fallback_units: usize,
    /// Upper bound on traversal depth, guarding against pathological input.
    pub max_depth: usize,
    pub route_strategy: RouteStrategyKind,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_plan_units: 50,
            fallback_units: 5,
            max_depth: 4096,
            route_strategy: RouteStrategyKind::Longest,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dataset to load at startup.
    pub dataset_path: Option<PathBuf>,
    pub graph: GraphOptions,
    pub planner: PlannerConfig,
}

impl EngineConfig {
    /// Parse a config from TOML text. `origin` is only used in error messages.
    pub fn from_toml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Relative dataset paths resolve against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml(&content, &path.display().to_string())?;
        if let (Some(dataset), Some(parent)) = (config.dataset_path.as_ref(), path.parent()) {
            if dataset.is_relative() {
                config.dataset_path = Some(parent.join(dataset));
            }
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            message: format!("config is not representable as TOML: {e}"),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.planner.max_plan_units == 0 {
            return Err(ConfigError::Invalid {
                message: "planner.max_plan_units must be > 0".into(),
            });
        }
        if self.planner.max_depth == 0 {
            return Err(ConfigError::Invalid {
                message: "planner.max_depth must be > 0".into(),
            });
        }
        Ok(())
    }
}
