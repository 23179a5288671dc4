// Entity factory: uid allocation, live-entity ownership, prototype cloning.
//
// The `Factory` is the single owner of every live entity. Everything else
// (map layer indices, move queues, item lists) refers to entities by `Uid`
// and borrows the factory to reach them. It is an explicit value passed to
// whoever needs it, not ambient global state; `&mut Factory` is what
// serializes mutation.
//
// ## Uids
//
// `next_uid` starts at 1 and only grows. An entity entering the factory
// keeps its own uid if it has one that is not already live (so restored
// saves keep their identities); otherwise it gets a fresh one. Accepting a
// foreign uid advances `next_uid` past it, so the counter never hands out a
// uid that is in use. Foreign uids above `MAX_FOREIGN_UID` are replaced, which
// keeps the counter far from `u64::MAX` and every uid exact as a JSON number.
//
// Maps draw from the same counter through `reserve_uid`. A reserved uid is
// never live, but `insert` treats it as taken, so a footprint's `map_uid`
// always names exactly one map.
//
// ## Prototypes
//
// Prototypes are canonical entities keyed by their designer `id`, loaded once
// from static definitions. `clone_prototype` deep-copies one (components
// included, owner handles re-pointed), gives the copy a fresh uid, and makes
// it live. Prototypes themselves never have a uid.
//
// Live entities are never dropped automatically: removal is the caller's
// decision (`remove`).
//
// See also: `registry.rs` for type-name dispatch, `entity.rs` for deep copy,
// `map.rs` which places live entities.
//
// **Critical constraint: determinism.** Uids are sequential and the live and
// prototype tables are `BTreeMap`s, so iteration order is reproducible.

use crate::component::{Record, from_record};
use crate::config::SimConfig;
use crate::entity::Entity;
use crate::error::{Result, SimError};
use crate::registry::TypeRegistry;
use crate::types::Uid;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Largest uid `insert` keeps from outside data (2^53, the largest integer a
/// JSON consumer is guaranteed to read back exactly).
pub const MAX_FOREIGN_UID: u64 = 1 << 53;

/// Owner of all live entities and prototypes.
#[derive(Debug)]
pub struct Factory {
    registry: TypeRegistry,
    next_uid: u64,
    live: BTreeMap<Uid, Entity>,
    /// Uids handed to maps.
    reserved: BTreeSet<Uid>,
    prototypes: BTreeMap<String, Entity>,
}

/// The part of a prototype record needed before construction.
#[derive(Deserialize)]
struct PrototypeHeader {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new(TypeRegistry::with_builtins())
    }
}

impl Factory {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            next_uid: 1,
            live: BTreeMap::new(),
            reserved: BTreeSet::new(),
            prototypes: BTreeMap::new(),
        }
    }

    /// Built-in components plus every `entity_kinds` entry bound to the
    /// generic constructor.
    pub fn from_config(config: &SimConfig) -> Self {
        let mut registry = TypeRegistry::with_builtins();
        for kind in &config.entity_kinds {
            registry.register_kind(kind);
        }
        Self::new(registry)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    /// Hand out the next uid. Never returns the same value twice.
    pub fn allocate_uid(&mut self) -> Uid {
        let uid = Uid(self.next_uid);
        self.next_uid += 1;
        uid
    }

    /// Allocate a uid for something that is not a live entity (a map). It is
    /// never handed to an entity afterwards.
    pub fn reserve_uid(&mut self) -> Uid {
        let uid = self.allocate_uid();
        self.reserved.insert(uid);
        uid
    }

    pub fn is_reserved(&self, uid: Uid) -> bool {
        self.reserved.contains(&uid)
    }

    /// Construct an entity through the registry and make it live.
    pub fn create_entity(&mut self, type_name: &str, data: &Record) -> Result<Uid> {
        let entity = self.registry.construct(type_name, data)?;
        Ok(self.insert(entity))
    }

    /// Make an entity live, assigning a uid if it has none, its uid is
    /// already taken (live or reserved), or it is above `MAX_FOREIGN_UID`.
    pub fn insert(&mut self, mut entity: Entity) -> Uid {
        let uid = match entity.uid() {
            Some(uid) if uid.0 > MAX_FOREIGN_UID => {
                warn!(%uid, "foreign uid out of range, replaced");
                self.allocate_uid()
            }
            Some(uid) if !self.live.contains_key(&uid) && !self.is_reserved(uid) => {
                self.next_uid = self.next_uid.max(uid.0 + 1);
                uid
            }
            _ => self.allocate_uid(),
        };
        entity.set_uid(Some(uid));
        self.live.insert(uid, entity);
        uid
    }

    pub fn get(&self, uid: Uid) -> Option<&Entity> {
        self.live.get(&uid)
    }

    pub fn get_mut(&mut self, uid: Uid) -> Option<&mut Entity> {
        self.live.get_mut(&uid)
    }

    /// Release a live entity. The caller is responsible for taking it off any
    /// map first.
    pub fn remove(&mut self, uid: Uid) -> Option<Entity> {
        self.live.remove(&uid)
    }

    pub fn contains(&self, uid: Uid) -> bool {
        self.live.contains_key(&uid)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live(&self) -> impl Iterator<Item = (Uid, &Entity)> {
        self.live.iter().map(|(uid, entity)| (*uid, entity))
    }

    /// Store a canonical instance under `id`. Prototype ids are unique.
    pub fn register_prototype(&mut self, id: &str, mut entity: Entity) -> Result<()> {
        if self.prototypes.contains_key(id) {
            return Err(SimError::DuplicatePrototype { id: id.to_owned() });
        }
        entity.set_uid(None);
        self.prototypes.insert(id.to_owned(), entity);
        Ok(())
    }

    pub fn prototype(&self, id: &str) -> Option<&Entity> {
        self.prototypes.get(id)
    }

    pub fn prototype_count(&self) -> usize {
        self.prototypes.len()
    }

    /// Deep-copy a prototype into a new live entity.
    pub fn clone_prototype(&mut self, id: &str) -> Option<Uid> {
        let mut copy = self.prototypes.get(id)?.clone();
        let uid = self.allocate_uid();
        copy.set_uid(Some(uid));
        self.live.insert(uid, copy);
        Some(uid)
    }

    /// Like `clone_prototype`, but only if the prototype is of type `kind`.
    pub fn clone_prototype_of(&mut self, kind: &str, id: &str) -> Option<Uid> {
        if self.prototypes.get(id)?.kind() != kind {
            return None;
        }
        self.clone_prototype(id)
    }

    /// Load a JSON array of entity records as prototypes. Returns how many
    /// were registered.
    ///
    /// ```json
    /// [ { "id": "wall", "type": "Item",
    ///     "components": { "MapPhysicsComponent": { "blocks_movement": true } } } ]
    /// ```
    pub fn load_prototypes(&mut self, json: &str) -> Result<usize> {
        let records: Vec<Record> =
            serde_json::from_str(json).map_err(|source| SimError::InvalidRecord {
                type_name: "prototype list".to_owned(),
                source,
            })?;
        for record in &records {
            let header: PrototypeHeader = from_record("Prototype", record)?;
            let entity = self.registry.construct(&header.kind, record)?;
            self.register_prototype(&header.id, entity)?;
            debug!(id = %header.id, kind = %header.kind, "prototype loaded");
        }
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::components::{CoordinateComponent, MapPhysicsComponent, ShapeComponent};
    use crate::types::{Coordinate, Layer};

    const PROTOTYPES: &str = r#"[
        {"id": "wall", "type": "Item",
         "components": {"MapPhysicsComponent": {"blocks_movement": true}}},
        {"id": "table", "type": "Item",
         "components": {"ShapeComponent": {"shape": "xx"}}},
        {"id": "goblin", "type": "Mob", "components": {}}
    ]"#;

    fn factory() -> Factory {
        let config = SimConfig {
            entity_kinds: vec!["Item".into(), "Mob".into()],
            ..SimConfig::default()
        };
        Factory::from_config(&config)
    }

    #[test]
    fn uids_are_distinct_and_increasing() {
        let mut factory = factory();
        let uids: Vec<Uid> = (0..50)
            .map(|_| factory.create_entity("Item", &Record::new()).unwrap())
            .collect();
        for pair in uids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(factory.live_count(), 50);
    }

    #[test]
    fn create_unknown_type_fails() {
        let mut factory = factory();
        let err = factory.create_entity("Dragon", &Record::new()).unwrap_err();
        assert!(matches!(err, SimError::UnknownType { .. }));
        assert_eq!(factory.live_count(), 0);
    }

    #[test]
    fn get_by_uid_miss_is_none() {
        let factory = factory();
        assert!(factory.get(Uid(999)).is_none());
    }

    #[test]
    fn record_uid_is_kept_when_free() {
        let mut factory = factory();
        let data: Record = serde_json::from_str(r#"{"uid": 40}"#).unwrap();
        let uid = factory.create_entity("Item", &data).unwrap();
        assert_eq!(uid, Uid(40));
        // The counter moved past the accepted uid.
        let next = factory.create_entity("Item", &Record::new()).unwrap();
        assert!(next > Uid(40));
    }

    #[test]
    fn colliding_record_uid_is_reassigned() {
        let mut factory = factory();
        let data: Record = serde_json::from_str(r#"{"uid": 1}"#).unwrap();
        let first = factory.create_entity("Item", &data).unwrap();
        let second = factory.create_entity("Item", &data).unwrap();
        assert_eq!(first, Uid(1));
        assert_ne!(second, first);
        assert_eq!(factory.get(second).unwrap().uid(), Some(second));
    }

    #[test]
    fn out_of_range_record_uid_is_replaced() {
        let mut factory = factory();
        let data: Record = serde_json::from_str(r#"{"uid": 18446744073709551615}"#).unwrap();
        let uid = factory.create_entity("Item", &data).unwrap();
        assert_eq!(uid, Uid(1));
        assert_eq!(factory.get(uid).unwrap().uid(), Some(uid));

        let limit: Record =
            serde_json::from_str(&format!(r#"{{"uid": {MAX_FOREIGN_UID}}}"#)).unwrap();
        assert_eq!(
            factory.create_entity("Item", &limit).unwrap(),
            Uid(MAX_FOREIGN_UID)
        );
        let next = factory.create_entity("Item", &Record::new()).unwrap();
        assert_eq!(next, Uid(MAX_FOREIGN_UID + 1));
    }

    #[test]
    fn reserved_uid_is_never_given_to_an_entity() {
        let mut factory = factory();
        let map_uid = factory.reserve_uid();
        assert!(factory.is_reserved(map_uid));
        assert!(!factory.contains(map_uid));

        let data: Record = serde_json::from_str(&format!(r#"{{"uid": {}}}"#, map_uid.0)).unwrap();
        let uid = factory.create_entity("Item", &data).unwrap();
        assert_ne!(uid, map_uid);
        assert!(!factory.contains(map_uid));
    }

    #[test]
    fn load_and_clone_prototypes() {
        let mut factory = factory();
        assert_eq!(factory.load_prototypes(PROTOTYPES).unwrap(), 3);
        assert_eq!(factory.prototype_count(), 3);
        assert_eq!(factory.live_count(), 0);
        assert!(factory.prototype("wall").unwrap().uid().is_none());

        let a = factory.clone_prototype("wall").unwrap();
        let b = factory.clone_prototype("wall").unwrap();
        assert_ne!(a, b);
        let wall = factory.get(a).unwrap();
        assert_eq!(wall.id(), "wall");
        assert_eq!(wall.kind(), "Item");
        let physics = wall.get::<MapPhysicsComponent>().unwrap();
        assert!(physics.blocks_movement);
        assert_eq!(physics.owner(), Some(a));
    }

    #[test]
    fn clone_is_independent_of_prototype() {
        let mut factory = factory();
        factory.load_prototypes(PROTOTYPES).unwrap();
        let uid = factory.clone_prototype("table").unwrap();
        let table = factory.get_mut(uid).unwrap();
        table.add_component(CoordinateComponent::new(Coordinate::new(1, 2)));
        table.get_mut::<ShapeComponent>().unwrap().shape = crate::shape::Shape::parse("x");

        let prototype = factory.prototype("table").unwrap();
        assert!(!prototype.has_component("CoordinateComponent"));
        assert_eq!(
            prototype.get::<ShapeComponent>().unwrap().shape.footprint().len(),
            2
        );
        assert_eq!(prototype.get::<ShapeComponent>().unwrap().owner(), None);
    }

    #[test]
    fn clone_unknown_prototype_is_none() {
        let mut factory = factory();
        assert!(factory.clone_prototype("nothing").is_none());
        assert_eq!(factory.live_count(), 0);
    }

    #[test]
    fn clone_prototype_of_checks_kind() {
        let mut factory = factory();
        factory.load_prototypes(PROTOTYPES).unwrap();
        assert!(factory.clone_prototype_of("Item", "goblin").is_none());
        assert!(factory.clone_prototype_of("Mob", "goblin").is_some());
    }

    #[test]
    fn duplicate_prototype_id_fails() {
        let mut factory = factory();
        factory.load_prototypes(PROTOTYPES).unwrap();
        let err = factory
            .register_prototype("wall", Entity::new("wall", "Item"))
            .unwrap_err();
        assert!(matches!(err, SimError::DuplicatePrototype { id } if id == "wall"));
    }

    #[test]
    fn prototype_with_unknown_type_fails() {
        let mut factory = factory();
        let err = factory
            .load_prototypes(r#"[{"id": "x", "type": "Dragon"}]"#)
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownType { .. }));
    }

    #[test]
    fn prototype_without_type_fails() {
        let mut factory = factory();
        let err = factory.load_prototypes(r#"[{"id": "x"}]"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidRecord { .. }));
    }

    #[test]
    fn remove_releases_entity() {
        let mut factory = factory();
        let uid = factory.insert(Entity::new("rock", "Item"));
        let rock = factory.remove(uid).unwrap();
        assert_eq!(rock.id(), "rock");
        assert!(!factory.contains(uid));
        // Uids are never reused.
        assert!(factory.insert(Entity::new("rock", "Item")) > uid);
    }

    #[test]
    fn insert_sets_component_owners() {
        let mut factory = factory();
        let mut entity = Entity::new("door", "Item");
        entity.add_component(MapPhysicsComponent::blocking(Layer::Main));
        let uid = factory.insert(entity);
        let physics = factory.get(uid).unwrap().get::<MapPhysicsComponent>().unwrap();
        assert_eq!(physics.owner(), Some(uid));
    }
}
