// Error type shared by every fallible operation in the crate.
//
// Lookup misses (`Factory::get`, `Factory::clone_prototype`,
// `Entity::get_component`) are not errors: they return `Option`. A failed
// pathfinding search is not an error either: it is an empty path or
// `MoveOutcome::Unreachable`. What remains here are the conditions a caller
// has to handle explicitly.
//
// See also: `map.rs` for `MapCollision` (placement is all-or-nothing),
// `registry.rs` for `UnknownType` / `UnknownComponent`, `types.rs` for the
// coordinate parse and division errors.

use crate::types::{Coordinate, Uid};
use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Error)]
pub enum SimError {
    /// Placement would put an entity on a coordinate that is already blocked.
    /// The map is left exactly as it was before the call.
    #[error("coordinate {coordinate} is blocked")]
    MapCollision { coordinate: Coordinate },

    #[error("no entity constructor registered for type '{type_name}'")]
    UnknownType { type_name: String },

    #[error("no component restorer registered for type '{type_name}'")]
    UnknownComponent { type_name: String },

    #[error("cannot parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// A footprint or step would leave the `i32` grid.
    #[error("{anchor} offset by {offset} is off the grid")]
    OffGrid {
        anchor: Coordinate,
        offset: Coordinate,
    },

    #[error("coordinate divided by zero")]
    DivisionByZero,

    /// A serialized record does not match the shape its type expects.
    #[error("invalid record for '{type_name}': {source}")]
    InvalidRecord {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("prototype '{id}' is already registered")]
    DuplicatePrototype { id: String },

    #[error("entity {uid} is not live")]
    UnknownEntity { uid: Uid },

    #[error("entity {uid} is not placed on this map")]
    NotOnMap { uid: Uid },

    #[error("entity {uid} is already placed on this map")]
    AlreadyOnMap { uid: Uid },

    /// Entities stand on at most one map at a time.
    #[error("entity {uid} is placed on map {map}")]
    OnOtherMap { uid: Uid, map: Uid },
}

pub type Result<T> = std::result::Result<T, SimError>;
