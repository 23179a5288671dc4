// The map: layered spatial index, collision, movement queues.
//
// A `MapEntity` places live entities (owned by the `Factory`, referenced
// here by `Uid`) onto an unbounded integer grid. State:
//
// - `layers`: one index per `Layer` (floor / main / ceiling), mapping each
//   occupied coordinate to the uids standing on it. Empty cells have no key.
// - `blocked`: per-coordinate count of blocking occupants. A coordinate is
//   impassable to placement and pathfinding iff its count is non-zero.
// - `placements`: what each placement did (layer, blocking flag, anchor,
//   footprint), so removal undoes exactly that even if the entity's physics
//   component changed in the meantime.
// - `move_queues`: per-entity planned path plus its goal.
//
// ## Placement
//
// `add_object` derives the footprint from the entity's `ShapeComponent`
// (single cell if absent or empty) and its layer / blocking flag from its
// `MapPhysicsComponent` (defaults if absent). Placement is all-or-nothing: if
// any footprint cell is blocked the call fails with `MapCollision` and nothing
// changes. On success the entity's `CoordinateComponent` (anchor) and
// `MultiCoordinateComponent` (footprint) are rewritten. The footprint
// component names the map, and an entity stands on one map at a time: a map
// refuses an entity whose footprint names another one (`OnOtherMap`).
// Footprints that would leave the `i32` grid fail with `OffGrid`.
//
// `teleport_object` lifts the entity off its footprint, translates that
// footprint to the target, and places it there. If that collides, the old
// placement is put back untouched and the error is returned. An entity never
// collides with itself.
//
// ## Movement
//
// `move_object` plans an A* path (see `pathfinding.rs`) from the anchor this
// map recorded (never from the shared components), where a candidate
// anchor is passable iff every cell of the mover's footprint translated there
// is free of *other* blockers. `do_step` advances every queued entity by one
// cell, in ascending uid order, and reports what happened as `MapEvent`s. A
// queued step into a cell that became blocked either re-plans toward the same
// goal or drops the queue, per `MapConfig::repath_on_collision`.
//
// See also: `factory.rs` which owns the entities placed here,
// `components.rs` for the components read and written, `event.rs` for step
// output, `config.rs` for `MapConfig`.
//
// **Critical constraint: determinism.** Every iterated collection is a
// `BTreeMap`; queues are advanced in uid order; radius queries scan in
// coordinate order. Given the same calls in the same order, two maps end in
// identical states.

use crate::component::{ComponentType, Record, from_record, to_record};
use crate::components::{
    CoordinateComponent, MapItemsComponent, MapPhysicsComponent, MultiCoordinateComponent,
    ShapeComponent,
};
use crate::config::MapConfig;
use crate::entity::Entity;
use crate::error::{Result, SimError};
use crate::event::{MapEvent, StepResult};
use crate::factory::Factory;
use crate::pathfinding::astar;
use crate::types::{Coordinate, Layer, Uid};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, warn};

/// Uids standing on each occupied coordinate of one layer.
pub type LayerIndex = BTreeMap<Coordinate, SmallVec<[Uid; 2]>>;

/// Type name a map is dumped under.
pub const MAP_TYPE_NAME: &str = "MapEntity";

/// A queued movement: the remaining cells to step through, and where they
/// lead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    pub goal: Coordinate,
    pub path: VecDeque<Coordinate>,
}

/// Result of asking an entity to walk somewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A path of `steps` cells was queued, replacing any earlier queue.
    Queued { steps: usize },
    /// The entity already stands at the target. Any earlier queue is dropped.
    AlreadyThere,
    /// No path within the search budget. Any earlier queue is left alone.
    Unreachable,
}

/// What one placement did to the indices.
#[derive(Clone, Debug)]
struct Placement {
    layer: Layer,
    blocks_movement: bool,
    anchor: Coordinate,
    /// Absolute, duplicate-free, in shape order.
    footprint: Vec<Coordinate>,
}

impl Placement {
    /// Whether this placement is the one blocking `cell`.
    fn blocks(&self, cell: Coordinate) -> bool {
        self.blocks_movement && self.footprint.contains(&cell)
    }
}

/// Wire shape of a dumped map.
#[derive(Deserialize)]
struct MapRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    components: BTreeMap<String, Record>,
    #[serde(default)]
    entities: BTreeMap<String, Vec<Record>>,
    #[serde(default)]
    move_queues: BTreeMap<String, MovePlan>,
}

/// The part of an entity record needed to pick its constructor.
#[derive(Deserialize)]
struct TypeHeader {
    #[serde(rename = "type")]
    kind: String,
}

/// Index position of a layer.
fn slot(layer: Layer) -> usize {
    usize::from(u8::from(layer))
}

/// Absolute footprint of `entity` anchored at `anchor`.
fn shape_footprint(entity: &Entity, anchor: Coordinate) -> Result<Vec<Coordinate>> {
    match entity.get::<ShapeComponent>() {
        Some(component) if !component.shape.is_empty() => component
            .shape
            .footprint()
            .iter()
            .map(|&offset| {
                anchor
                    .checked_add(offset)
                    .ok_or(SimError::OffGrid { anchor, offset })
            })
            .collect(),
        _ => Ok(vec![anchor]),
    }
}

/// `footprint` shifted so that `from` lands on `to`.
fn translate(
    footprint: &[Coordinate],
    from: Coordinate,
    to: Coordinate,
) -> Result<Vec<Coordinate>> {
    footprint
        .iter()
        .map(|&cell| {
            let offset = cell.checked_sub(from).ok_or(SimError::OffGrid {
                anchor: from,
                offset: cell,
            })?;
            to.checked_add(offset)
                .ok_or(SimError::OffGrid { anchor: to, offset })
        })
        .collect()
}

/// Layer and blocking flag, with the defaults for an entity without physics.
fn physics_of(entity: &Entity) -> (Layer, bool) {
    entity
        .get::<MapPhysicsComponent>()
        .map_or((Layer::Main, false), |p| (p.layer, p.blocks_movement))
}

#[derive(Clone, Debug)]
pub struct MapEntity {
    /// The map's own identity and components (e.g. `MapItemsComponent`).
    entity: Entity,
    config: MapConfig,
    layers: [LayerIndex; 3],
    blocked: BTreeMap<Coordinate, u32>,
    placements: BTreeMap<Uid, Placement>,
    move_queues: BTreeMap<Uid, MovePlan>,
}

impl MapEntity {
    /// An empty map with a fresh uid from `factory`.
    pub fn new(factory: &mut Factory, id: &str, config: MapConfig) -> Self {
        Self::with_entity(factory, Entity::new(id, MAP_TYPE_NAME), config)
    }

    /// Wrap an existing entity (typically a cloned map prototype carrying a
    /// `MapItemsComponent`) as an empty map.
    pub fn with_entity(factory: &mut Factory, mut entity: Entity, config: MapConfig) -> Self {
        entity.set_uid(Some(factory.reserve_uid()));
        Self {
            entity,
            config,
            layers: Default::default(),
            blocked: BTreeMap::new(),
            placements: BTreeMap::new(),
            move_queues: BTreeMap::new(),
        }
    }

    pub fn uid(&self) -> Uid {
        // Always set by the constructors.
        self.entity.uid().unwrap_or(Uid(0))
    }

    pub fn id(&self) -> &str {
        self.entity.id()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Place a live entity with its shape anchored at `anchor`.
    ///
    /// Fails with `OnOtherMap` if the entity's footprint component says it
    /// stands on a different map; take it off that map first.
    pub fn add_object(
        &mut self,
        factory: &mut Factory,
        uid: Uid,
        anchor: Coordinate,
    ) -> Result<()> {
        let entity = factory.get(uid).ok_or(SimError::UnknownEntity { uid })?;
        let footprint = shape_footprint(entity, anchor)?;
        self.place(factory, uid, anchor, footprint)
    }

    /// Take an entity off the map. Returns false if it was not on it.
    ///
    /// Also drops its move queue and its coordinate components.
    pub fn remove_object(&mut self, factory: &mut Factory, uid: Uid) -> bool {
        if self.unindex(uid).is_none() {
            return false;
        }
        self.move_queues.remove(&uid);
        let map_uid = self.uid();
        if let Some(entity) = factory.get_mut(uid) {
            let ours = entity
                .get::<MultiCoordinateComponent>()
                .is_none_or(|m| m.map_uid().is_none_or(|on| on == map_uid));
            if ours {
                entity.remove_component(CoordinateComponent::TYPE_NAME);
                entity.remove_component(MultiCoordinateComponent::TYPE_NAME);
            }
        }
        true
    }

    /// Move a placed entity to `target` in one jump. On error the entity
    /// stays exactly where it was.
    pub fn teleport_object(
        &mut self,
        factory: &mut Factory,
        uid: Uid,
        target: Coordinate,
    ) -> Result<()> {
        if !factory.contains(uid) {
            return Err(SimError::UnknownEntity { uid });
        }
        let old = self.unindex(uid).ok_or(SimError::NotOnMap { uid })?;
        let placed = translate(&old.footprint, old.anchor, target)
            .and_then(|footprint| self.place(factory, uid, target, footprint));
        if let Err(err) = placed {
            self.index(uid, old);
            return Err(err);
        }
        Ok(())
    }

    /// Put `uid` on `footprint` (anchor first), all-or-nothing.
    fn place(
        &mut self,
        factory: &mut Factory,
        uid: Uid,
        anchor: Coordinate,
        mut footprint: Vec<Coordinate>,
    ) -> Result<()> {
        let map_uid = self.uid();
        let entity = factory.get_mut(uid).ok_or(SimError::UnknownEntity { uid })?;
        if self.placements.contains_key(&uid) {
            return Err(SimError::AlreadyOnMap { uid });
        }
        let elsewhere = entity
            .get::<MultiCoordinateComponent>()
            .and_then(|m| m.map_uid())
            .filter(|&on| on != map_uid);
        if let Some(map) = elsewhere {
            return Err(SimError::OnOtherMap { uid, map });
        }
        let mut seen = BTreeSet::new();
        footprint.retain(|cell| seen.insert(*cell));
        if let Some(&coordinate) = footprint.iter().find(|cell| self.is_blocked(**cell)) {
            debug!(%uid, %coordinate, "placement rejected: coordinate blocked");
            return Err(SimError::MapCollision { coordinate });
        }

        let (layer, blocks_movement) = physics_of(entity);
        entity.add_component(CoordinateComponent::new(anchor));
        entity.add_component(MultiCoordinateComponent::new(
            footprint.clone(),
            Some(map_uid),
        ));
        self.index(
            uid,
            Placement {
                layer,
                blocks_movement,
                anchor,
                footprint,
            },
        );
        Ok(())
    }

    /// Record a placement in the layer, blocked and placement tables.
    fn index(&mut self, uid: Uid, placement: Placement) {
        let layer = &mut self.layers[slot(placement.layer)];
        for &cell in &placement.footprint {
            layer.entry(cell).or_default().push(uid);
            if placement.blocks_movement {
                *self.blocked.entry(cell).or_insert(0) += 1;
            }
        }
        self.placements.insert(uid, placement);
    }

    /// Undo `index`. Leaves components and move queues alone.
    fn unindex(&mut self, uid: Uid) -> Option<Placement> {
        let placement = self.placements.remove(&uid)?;
        let layer = &mut self.layers[slot(placement.layer)];
        for cell in &placement.footprint {
            if let Some(occupants) = layer.get_mut(cell) {
                occupants.retain(|occupant| *occupant != uid);
                if occupants.is_empty() {
                    layer.remove(cell);
                }
            }
            if !placement.blocks_movement {
                continue;
            }
            if let Some(count) = self.blocked.get_mut(cell) {
                *count -= 1;
                if *count == 0 {
                    self.blocked.remove(cell);
                }
            }
        }
        Some(placement)
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Plan a path for `uid` from its anchor on this map to `target` and
    /// queue it.
    pub fn move_object(
        &mut self,
        factory: &Factory,
        uid: Uid,
        target: Coordinate,
    ) -> Result<MoveOutcome> {
        if !factory.contains(uid) {
            return Err(SimError::UnknownEntity { uid });
        }
        let start = self.anchor_of(uid).ok_or(SimError::NotOnMap { uid })?;

        if start == target {
            self.move_queues.remove(&uid);
            return Ok(MoveOutcome::AlreadyThere);
        }
        let path = self.plan(uid, start, target);
        if path.is_empty() {
            debug!(%uid, %start, %target, "no path");
            return Ok(MoveOutcome::Unreachable);
        }
        let steps = path.len();
        self.move_queues.insert(
            uid,
            MovePlan {
                goal: target,
                path: path.into(),
            },
        );
        Ok(MoveOutcome::Queued { steps })
    }

    /// Drop a queued movement. Returns false if nothing was queued.
    pub fn cancel_move(&mut self, uid: Uid) -> bool {
        self.move_queues.remove(&uid).is_some()
    }

    /// Footprint-aware A* for a placed entity. Empty if not placed or no path.
    fn plan(&self, uid: Uid, start: Coordinate, goal: Coordinate) -> Vec<Coordinate> {
        let Some(placement) = self.placements.get(&uid) else {
            return Vec::new();
        };
        let Some(offsets) = placement
            .footprint
            .iter()
            .map(|&cell| cell.checked_sub(placement.anchor))
            .collect::<Option<Vec<Coordinate>>>()
        else {
            return Vec::new();
        };
        let passable = |anchor: Coordinate| {
            offsets.iter().all(|&offset| {
                let Some(cell) = anchor.checked_add(offset) else {
                    return false;
                };
                let count = self.blocked.get(&cell).copied().unwrap_or(0);
                count <= u32::from(placement.blocks(cell))
            })
        };
        astar(start, goal, passable, self.config.max_search_nodes)
    }

    /// Advance every queued entity by one cell.
    pub fn do_step(&mut self, factory: &mut Factory) -> StepResult {
        let mut result = StepResult::default();
        let queued: Vec<Uid> = self.move_queues.keys().copied().collect();
        for uid in queued {
            let Some(next) = self
                .move_queues
                .get(&uid)
                .and_then(|plan| plan.path.front().copied())
            else {
                self.move_queues.remove(&uid);
                continue;
            };
            if !factory.contains(uid) || !self.placements.contains_key(&uid) {
                warn!(%uid, "dropping move queue: entity no longer on map");
                self.move_queues.remove(&uid);
                continue;
            }

            match self.teleport_object(factory, uid, next) {
                Ok(()) => {
                    let finished = self.move_queues.get_mut(&uid).is_none_or(|plan| {
                        plan.path.pop_front();
                        plan.path.is_empty()
                    });
                    if finished {
                        self.move_queues.remove(&uid);
                        result.events.push(MapEvent::Arrived { uid, at: next });
                    } else {
                        result.events.push(MapEvent::Moved { uid, to: next });
                    }
                }
                Err(SimError::MapCollision { coordinate }) => {
                    debug!(%uid, %coordinate, "queued step blocked");
                    result.events.push(self.handle_collision(uid));
                }
                Err(err) => {
                    warn!(%uid, %err, "dropping move queue");
                    self.move_queues.remove(&uid);
                }
            }
        }
        result
    }

    /// The next queued cell of `uid` is blocked: re-plan or give up.
    fn handle_collision(&mut self, uid: Uid) -> MapEvent {
        let at = self
            .placements
            .get(&uid)
            .map_or(Coordinate::ORIGIN, |p| p.anchor);
        let goal = self.move_queues.get(&uid).map(|plan| plan.goal);
        if let Some(goal) = goal.filter(|_| self.config.repath_on_collision) {
            let path = self.plan(uid, at, goal);
            if !path.is_empty() {
                let steps = path.len();
                debug!(%uid, %goal, steps, "rerouted");
                self.move_queues.insert(
                    uid,
                    MovePlan {
                        goal,
                        path: path.into(),
                    },
                );
                return MapEvent::Rerouted { uid, steps };
            }
        }
        debug!(%uid, %at, "stalled, move queue dropped");
        self.move_queues.remove(&uid);
        MapEvent::Stalled { uid, at }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Every entity on any layer within Euclidean `radius` of `origin`.
    ///
    /// Scans each cell of the disk (x, then y, then floor/main/ceiling) and
    /// returns each uid once, in first-seen order. Cost grows with the area
    /// of the disk, not with the number of entities; a bucketed spatial index
    /// would be the next step if radii get large.
    pub fn entities_in_range(&self, origin: Coordinate, radius: f64) -> Vec<Uid> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let reach = radius.min(f64::from(i32::MAX)).floor() as i32;
        let radius_sq = radius * radius;
        let mut seen = BTreeSet::new();
        let mut found = Vec::new();
        for x in origin.x.saturating_sub(reach)..=origin.x.saturating_add(reach) {
            for y in origin.y.saturating_sub(reach)..=origin.y.saturating_add(reach) {
                let dx = f64::from(x) - f64::from(origin.x);
                let dy = f64::from(y) - f64::from(origin.y);
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }
                let cell = Coordinate::new(x, y);
                for layer in &self.layers {
                    for &uid in layer.get(&cell).into_iter().flatten() {
                        if seen.insert(uid) {
                            found.push(uid);
                        }
                    }
                }
            }
        }
        found
    }

    /// Uids at one coordinate, floor first.
    pub fn entities_at(&self, coordinate: Coordinate) -> Vec<Uid> {
        self.layers
            .iter()
            .filter_map(|layer| layer.get(&coordinate))
            .flatten()
            .copied()
            .collect()
    }

    pub fn layer(&self, layer: Layer) -> &LayerIndex {
        &self.layers[slot(layer)]
    }

    pub fn is_blocked(&self, coordinate: Coordinate) -> bool {
        self.blocked.contains_key(&coordinate)
    }

    /// Blocked coordinates in order.
    pub fn blocked_coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.blocked.keys().copied()
    }

    pub fn is_on_map(&self, uid: Uid) -> bool {
        self.placements.contains_key(&uid)
    }

    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    pub fn anchor_of(&self, uid: Uid) -> Option<Coordinate> {
        self.placements.get(&uid).map(|p| p.anchor)
    }

    pub fn footprint_of(&self, uid: Uid) -> Option<&[Coordinate]> {
        self.placements.get(&uid).map(|p| p.footprint.as_slice())
    }

    pub fn queued_path(&self, uid: Uid) -> Option<&MovePlan> {
        self.move_queues.get(&uid)
    }

    pub fn queued_count(&self) -> usize {
        self.move_queues.len()
    }

    // -----------------------------------------------------------------------
    // Hydration and persistence
    // -----------------------------------------------------------------------

    /// Turn the map's `MapItemsComponent` references into live, placed
    /// entities. One-shot: the reference list is cleared and the new uids are
    /// appended to `objects`. Returns how many were placed.
    pub fn setup_items(&mut self, factory: &mut Factory) -> usize {
        let Some(items) = self.entity.get_mut::<MapItemsComponent>() else {
            return 0;
        };
        let pending = std::mem::take(&mut items.items);
        let mut hydrated = Vec::new();
        for item in pending {
            let Some(&anchor) = item.coordinates.first() else {
                warn!(entity_id = %item.entity_id, "map item without coordinates skipped");
                continue;
            };
            let Some(uid) = factory.clone_prototype_of(&item.entity_type, &item.entity_id) else {
                warn!(
                    entity_type = %item.entity_type,
                    entity_id = %item.entity_id,
                    "unknown map item prototype skipped"
                );
                continue;
            };
            match self.place(factory, uid, anchor, item.coordinates) {
                Ok(()) => hydrated.push(uid),
                Err(err) => {
                    warn!(entity_id = %item.entity_id, %err, "map item not placed");
                    factory.remove(uid);
                }
            }
        }
        let placed = hydrated.len();
        if let Some(items) = self.entity.get_mut::<MapItemsComponent>() {
            items.objects.extend(hydrated);
        }
        placed
    }

    /// Serialize the map, its placed entities and its move queues.
    ///
    /// ```json
    /// { "id": "cellar", "type": "MapEntity", "uid": 1, "components": {..},
    ///   "entities": { "3 4": [ {entity record}, .. ] },
    ///   "move_queues": { "7": { "goal": "5 5", "path": ["4 4", "5 5"] } } }
    /// ```
    pub fn dump(&self, factory: &Factory) -> Result<Record> {
        let mut by_anchor: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for (&uid, placement) in &self.placements {
            let Some(entity) = factory.get(uid) else {
                warn!(%uid, "placed entity missing from factory, not dumped");
                continue;
            };
            by_anchor
                .entry(placement.anchor.to_string())
                .or_default()
                .push(entity.dump()?.into());
        }
        let mut queues = Record::new();
        for (uid, plan) in &self.move_queues {
            queues.insert(uid.to_string(), to_record("MovePlan", plan)?.into());
        }

        let mut record = self.entity.dump()?;
        record.insert("type".into(), MAP_TYPE_NAME.into());
        record.insert(
            "entities".into(),
            by_anchor
                .into_iter()
                .map(|(anchor, list)| (anchor, Value::Array(list)))
                .collect::<Record>()
                .into(),
        );
        record.insert("move_queues".into(), queues.into());
        Ok(record)
    }

    /// Rebuild a dumped map. Entities are constructed through the factory's
    /// registry, made live, and placed on their stored footprints. Queued
    /// paths follow their entities to the uids they end up with.
    ///
    /// On error every entity made live by this call is released again.
    pub fn restore(factory: &mut Factory, record: &Record, config: MapConfig) -> Result<Self> {
        let mut created = Vec::new();
        let restored = Self::restore_into(factory, record, config, &mut created);
        if restored.is_err() {
            for uid in created {
                factory.remove(uid);
            }
        }
        restored
    }

    fn restore_into(
        factory: &mut Factory,
        record: &Record,
        config: MapConfig,
        created: &mut Vec<Uid>,
    ) -> Result<Self> {
        let parsed: MapRecord = from_record(MAP_TYPE_NAME, record)?;

        // Make the entities live before the map takes a uid, so a stored
        // entity uid can never be shadowed by the map's own.
        let mut pending = Vec::new();
        let mut remap = BTreeMap::new();
        for (key, list) in &parsed.entities {
            let anchor: Coordinate = key.parse()?;
            for data in list {
                let header: TypeHeader = from_record("Entity", data)?;
                let mut entity = factory.registry().construct(&header.kind, data)?;
                // The stored footprint names the dumped map's uid; placement
                // rewrites it for this one.
                let stored = entity
                    .get::<MultiCoordinateComponent>()
                    .map(|m| m.coordinates().to_vec())
                    .filter(|coords| !coords.is_empty());
                entity.remove_component(MultiCoordinateComponent::TYPE_NAME);
                let footprint = match stored {
                    Some(coords) => coords,
                    None => shape_footprint(&entity, anchor)?,
                };
                let old_uid = entity.uid();
                let uid = factory.insert(entity);
                created.push(uid);
                if let Some(old_uid) = old_uid {
                    remap.insert(old_uid, uid);
                }
                pending.push((uid, anchor, footprint));
            }
        }

        let mut map = Self::new(factory, &parsed.id, config);
        for (name, data) in &parsed.components {
            let component = factory.registry().restore_component(name, data)?;
            map.entity.add_boxed(component);
        }
        for (uid, anchor, footprint) in pending {
            map.place(factory, uid, anchor, footprint)?;
        }
        if let Some(items) = map.entity.get_mut::<MapItemsComponent>() {
            items.remap_objects(&remap);
        }
        for (key, plan) in parsed.move_queues {
            let old_uid: Uid = key.parse()?;
            match remap.get(&old_uid) {
                Some(&uid) if map.is_on_map(uid) && !plan.path.is_empty() => {
                    map.move_queues.insert(uid, plan);
                }
                _ => warn!(uid = %old_uid, "move queue without a restored entity dropped"),
            }
        }
        debug!(
            id = %map.id(),
            placed = map.placed_count(),
            queued = map.queued_count(),
            "map restored"
        );
        Ok(map)
    }
}
