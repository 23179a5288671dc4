// dmbot_sim: headless spatial entity/component simulation core.
//
// This crate holds the data model and spatial engine behind the game-master
// bot: entities built from data-driven prototypes, a component contract with
// string-keyed serialization, and a layered grid map that places, removes,
// teleports and path-moves entities. Chat commands, the web dashboard,
// persistence and rendering live elsewhere and talk to this crate only through
// the registry, the factory and dumped records.
//
// Module overview:
// - `types.rs`:       Coordinate, Uid, Layer.
// - `shape.rs`:       ASCII footprint patterns.
// - `error.rs`:       SimError, the crate-wide error enum.
// - `component.rs`:   Component trait, `component!` macro, record helpers.
// - `components.rs`:  Built-in map components (coordinates, physics, shape, map items).
// - `entity.rs`:      Entity: id + uid + components, deep clone, dump/restore.
// - `registry.rs`:    TypeRegistry: type name → constructor / restorer.
// - `factory.rs`:     Factory: uid allocation, live entities, prototypes.
// - `config.rs`:      SimConfig + MapConfig: tunable parameters.
// - `pathfinding.rs`: A* over the unbounded 8-connected grid.
// - `event.rs`:       MapEvent / StepResult emitted by `MapEntity::do_step`.
// - `map.rs`:         MapEntity: layered index, collision, movement queues.
//
// The core is advanced by an external driver, one `do_step` at a time. It
// spawns no threads and performs no I/O.
//
// **Critical constraint: determinism.** Given the same prototypes and the
// same sequence of calls, the map ends in the same state. No randomness, no
// system time; every iterated collection is a `BTreeMap` / `BTreeSet`.

pub mod component;
pub mod components;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod map;
pub mod pathfinding;
pub mod registry;
pub mod shape;
pub mod types;

pub use error::{Result, SimError};
