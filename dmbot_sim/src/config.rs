// Data-driven simulation configuration.
//
// All tunable parameters live in `SimConfig`, loaded from JSON at startup.
// Every field has a default, so a config file only needs the values it
// changes (`{}` is a valid config).
//
// - `map`: per-map behavior (`MapConfig`), copied into each `MapEntity` at
//   construction.
// - `entity_kinds`: entity type names bound to the generic record
//   constructor when a `Factory` is built with `Factory::from_config`.
//   Types needing custom construction are registered in code instead.
//
// See also: `factory.rs` which consumes `entity_kinds`, `map.rs` which owns a
// `MapConfig`, `pathfinding.rs` for the search budget.
//
// **Critical constraint: determinism.** Config values feed directly into
// movement decisions. Two drivers with different configs will diverge.

use crate::pathfinding::DEFAULT_MAX_SEARCH_NODES;
use serde::{Deserialize, Serialize};

/// Movement and pathfinding parameters for one map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Upper bound on cells A* may expand before giving up. The grid is
    /// unbounded, so an unreachable goal would otherwise search forever.
    pub max_search_nodes: usize,
    /// When a queued step runs into a newly blocked cell, plan a fresh path
    /// to the same goal instead of dropping the queue.
    pub repath_on_collision: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            max_search_nodes: DEFAULT_MAX_SEARCH_NODES,
            repath_on_collision: true,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub map: MapConfig,
    pub entity_kinds: Vec<String>,
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
