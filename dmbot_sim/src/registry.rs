// Type-name dispatch for data-driven construction.
//
// Prototype files and dumped maps name their entity and component types as
// strings. `TypeRegistry` maps those names to plain function pointers:
// - entity constructors: `fn(&TypeRegistry, &Record) -> Result<Entity>`
// - component restorers: `fn(&Record) -> Result<Box<dyn Component>>`
//
// Bindings are made once at startup. Re-binding a name replaces the old
// binding (last write wins). Resolving an unbound name is an `UnknownType` /
// `UnknownComponent` error, fatal to that one construction only.
//
// See also: `factory.rs` which owns a registry and is the normal entry
// point, `entity.rs` for `Entity::restore` (the generic constructor),
// `components.rs` for the built-ins registered by `with_builtins`.

use crate::component::{Component, ComponentType, Record, restore_boxed};
use crate::components::{
    CoordinateComponent, MapItemsComponent, MapPhysicsComponent, MultiCoordinateComponent,
    ShapeComponent,
};
use crate::entity::Entity;
use crate::error::{Result, SimError};
use std::collections::BTreeMap;
use tracing::debug;

pub type EntityConstructor = fn(&TypeRegistry, &Record) -> Result<Entity>;
pub type ComponentRestorer = fn(&Record) -> Result<Box<dyn Component>>;

/// Name → constructor tables for entities and components.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    entities: BTreeMap<String, EntityConstructor>,
    components: BTreeMap<String, ComponentRestorer>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in map component bound.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_component::<CoordinateComponent>();
        registry.register_component::<MultiCoordinateComponent>();
        registry.register_component::<MapPhysicsComponent>();
        registry.register_component::<ShapeComponent>();
        registry.register_component::<MapItemsComponent>();
        registry
    }

    /// Bind an entity type name to a constructor.
    pub fn register(&mut self, type_name: &str, constructor: EntityConstructor) {
        if self
            .entities
            .insert(type_name.to_owned(), constructor)
            .is_some()
        {
            debug!(type_name, "entity constructor rebound");
        }
    }

    /// Bind an entity type name to the generic record constructor.
    pub fn register_kind(&mut self, type_name: &str) {
        self.register(type_name, Entity::restore);
    }

    pub fn register_component<C: ComponentType>(&mut self) {
        self.register_component_fn(C::TYPE_NAME, restore_boxed::<C>);
    }

    pub fn register_component_fn(&mut self, type_name: &str, restorer: ComponentRestorer) {
        if self
            .components
            .insert(type_name.to_owned(), restorer)
            .is_some()
        {
            debug!(type_name, "component restorer rebound");
        }
    }

    pub fn resolve(&self, type_name: &str) -> Result<EntityConstructor> {
        self.entities
            .get(type_name)
            .copied()
            .ok_or_else(|| SimError::UnknownType {
                type_name: type_name.to_owned(),
            })
    }

    pub fn resolve_component(&self, type_name: &str) -> Result<ComponentRestorer> {
        self.components
            .get(type_name)
            .copied()
            .ok_or_else(|| SimError::UnknownComponent {
                type_name: type_name.to_owned(),
            })
    }

    /// Construct an entity of the named type. The entity's `kind` is set to
    /// `type_name` regardless of what the record says.
    pub fn construct(&self, type_name: &str, data: &Record) -> Result<Entity> {
        let constructor = self.resolve(type_name)?;
        let mut entity = constructor(self, data)?;
        entity.set_kind(type_name);
        Ok(entity)
    }

    pub fn restore_component(&self, type_name: &str, data: &Record) -> Result<Box<dyn Component>> {
        self.resolve_component(type_name)?(data)
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.entities.contains_key(type_name)
    }
}
