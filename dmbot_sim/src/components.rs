// Built-in map components.
//
// - `CoordinateComponent`:      the anchor an entity was placed at.
// - `MultiCoordinateComponent`: the absolute footprint an entity occupies,
//   in shape order, tagged with the map it lies on. Written by the map on
//   every placement; callers read it, they never edit it.
// - `MapPhysicsComponent`:      blocking / opacity / invisibility / layer.
//   Absent means "passable, transparent, visible, main layer".
// - `ShapeComponent`:           the ASCII footprint pattern (see `shape.rs`).
// - `MapItemsComponent`:        declarative list of prototype references a
//   map hydrates into live entities once (see `MapEntity::setup_items`).
//
// Prototype files spell them like this:
//
//   "MapPhysicsComponent": { "blocks_movement": true, "layer": 1 }
//   "ShapeComponent":      { "shape": "xx\nxx" }
//   "MapItemsComponent":   { "items": [ { "entity_type": "Item",
//                                         "entity_id": "crate",
//                                         "coordinates": ["0 0", "0 1"] } ] }
//
// See also: `component.rs` for the contract and the `component!` macro,
// `map.rs` for how placement reads and writes these.

use crate::shape::Shape;
use crate::types::{Coordinate, Layer, Uid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Position components
// ---------------------------------------------------------------------------

/// The anchor coordinate of a placed entity.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CoordinateComponent {
    pub coordinate: Coordinate,
    #[serde(skip)]
    owner: Option<Uid>,
}

crate::component!(CoordinateComponent, "CoordinateComponent");

impl CoordinateComponent {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            owner: None,
        }
    }
}

/// Every coordinate a placed entity occupies.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MultiCoordinateComponent {
    coordinates: Vec<Coordinate>,
    /// Uid of the map the footprint belongs to.
    #[serde(default)]
    map_uid: Option<Uid>,
    #[serde(skip)]
    owner: Option<Uid>,
}

crate::component!(MultiCoordinateComponent, "MultiCoordinateComponent");

impl MultiCoordinateComponent {
    pub fn new(coordinates: Vec<Coordinate>, map_uid: Option<Uid>) -> Self {
        Self {
            coordinates,
            map_uid,
            owner: None,
        }
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn map_uid(&self) -> Option<Uid> {
        self.map_uid
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.coordinates.contains(&coordinate)
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.coordinates.first().copied()
    }
}

// ---------------------------------------------------------------------------
// Physics
// ---------------------------------------------------------------------------

/// How an entity interacts with the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapPhysicsComponent {
    /// 0 is visible to everyone; higher values need better senses.
    pub invisibility_level: i32,
    /// Blocks line of sight.
    pub opaque: bool,
    /// Makes occupied coordinates impassable to placement and pathfinding.
    pub blocks_movement: bool,
    pub layer: Layer,
    #[serde(skip)]
    owner: Option<Uid>,
}

crate::component!(MapPhysicsComponent, "MapPhysicsComponent");

impl Default for MapPhysicsComponent {
    fn default() -> Self {
        Self {
            invisibility_level: 0,
            opaque: false,
            blocks_movement: false,
            layer: Layer::Main,
            owner: None,
        }
    }
}

impl MapPhysicsComponent {
    /// Solid, opaque object (walls, closed doors).
    pub fn blocking(layer: Layer) -> Self {
        Self {
            opaque: true,
            blocks_movement: true,
            layer,
            ..Self::default()
        }
    }

    /// Object others can walk over or through.
    pub fn passable(layer: Layer) -> Self {
        Self {
            layer,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Footprint pattern of an entity.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShapeComponent {
    pub shape: Shape,
    #[serde(skip)]
    owner: Option<Uid>,
}

crate::component!(ShapeComponent, "ShapeComponent");

impl ShapeComponent {
    pub fn new(pattern: &str) -> Self {
        Self {
            shape: Shape::parse(pattern),
            owner: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Map items
// ---------------------------------------------------------------------------

/// A reference to a prototype that should exist on a map, not yet a live
/// entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapItem {
    pub entity_type: String,
    pub entity_id: String,
    /// Exact footprint of the hydrated entity. The first entry is its anchor.
    pub coordinates: Vec<Coordinate>,
}

/// Prototype references attached to a map, hydrated once.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapItemsComponent {
    #[serde(default)]
    pub items: Vec<MapItem>,
    /// Uids hydrated from `items`. `MapEntity::restore` re-points them at the
    /// uids the restored entities end up with.
    #[serde(default)]
    pub objects: Vec<Uid>,
    #[serde(skip)]
    owner: Option<Uid>,
}

crate::component!(MapItemsComponent, "MapItemsComponent");

impl MapItemsComponent {
    pub fn new(items: Vec<MapItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Rewrite `objects` through `remap`, dropping uids with no entry.
    pub fn remap_objects(&mut self, remap: &BTreeMap<Uid, Uid>) {
        self.objects = self
            .objects
            .iter()
            .filter_map(|old| remap.get(old).copied())
            .collect();
    }
}
