// Entities: an identity plus a bag of components keyed by type name.
//
// An `Entity` carries two identities:
// - `id`: designer-assigned, stable across prototype reloads, shared by all
//   clones of one prototype (e.g. `"oak_table"`).
// - `uid`: runtime-unique, assigned by the `Factory`. `None` until the entity
//   is registered (prototypes never get one).
//
// At most one component per type name is attached. Attaching a second
// replaces the first and hands the old one back detached (`owner == None`).
// Every attached component's owner handle equals the entity's uid; `set_uid`
// re-points all of them, which is what makes prototype clones independent of
// their source.
//
// Record form (`dump`/`restore`):
//   { "id": "...", "type": "...", "uid": 7, "components": { "<TypeName>": {..} } }
//
// See also: `component.rs` for the component contract, `factory.rs` which
// owns live entities and clones prototypes, `registry.rs` which resolves
// component type names during `restore`.

use crate::component::{Component, ComponentType, Record, from_record};
use crate::error::Result;
use crate::registry::TypeRegistry;
use crate::types::Uid;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A simulation object.
#[derive(Debug, Default)]
pub struct Entity {
    id: String,
    kind: String,
    uid: Option<Uid>,
    components: BTreeMap<&'static str, Box<dyn Component>>,
}

/// Wire shape of an entity record.
#[derive(Deserialize)]
struct EntityRecord {
    #[serde(default)]
    id: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    uid: Option<Uid>,
    #[serde(default)]
    components: BTreeMap<String, Record>,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The registered type name this entity was built from.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: &str) {
        kind.clone_into(&mut self.kind);
    }

    pub fn uid(&self) -> Option<Uid> {
        self.uid
    }

    /// Assign a uid and re-point every component's owner handle to it.
    pub fn set_uid(&mut self, uid: Option<Uid>) {
        self.uid = uid;
        for component in self.components.values_mut() {
            component.set_owner(uid);
        }
    }

    /// Attach a component, returning the detached one it replaced.
    pub fn add_component<C: Component>(&mut self, component: C) -> Option<Box<dyn Component>> {
        self.add_boxed(Box::new(component))
    }

    pub fn add_boxed(&mut self, mut component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        let name = component.type_name();
        let replaced = self.remove_component(name);
        component.set_owner(self.uid);
        self.components.insert(name, component);
        replaced
    }

    /// Detach and return a component. `None` if absent.
    pub fn remove_component(&mut self, type_name: &str) -> Option<Box<dyn Component>> {
        let mut component = self.components.remove(type_name)?;
        component.set_owner(None);
        Some(component)
    }

    pub fn get_component(&self, type_name: &str) -> Option<&dyn Component> {
        self.components.get(type_name).map(|c| c.as_ref())
    }

    pub fn has_component(&self, type_name: &str) -> bool {
        self.components.contains_key(type_name)
    }

    /// Typed lookup.
    pub fn get<C: ComponentType>(&self) -> Option<&C> {
        self.components
            .get(C::TYPE_NAME)
            .and_then(|c| c.as_any().downcast_ref())
    }

    pub fn get_mut<C: ComponentType>(&mut self) -> Option<&mut C> {
        self.components
            .get_mut(C::TYPE_NAME)
            .and_then(|c| c.as_any_mut().downcast_mut())
    }

    /// Typed detach.
    pub fn take<C: ComponentType>(&mut self) -> Option<C> {
        let component = self.remove_component(C::TYPE_NAME)?;
        component.into_any().downcast().ok().map(|c| *c)
    }

    pub fn component_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.components.keys().copied()
    }

    pub fn dump(&self) -> Result<Record> {
        let mut components = Record::new();
        for (name, component) in &self.components {
            components.insert((*name).to_owned(), component.dump()?.into());
        }
        let mut record = Record::new();
        record.insert("id".into(), self.id.clone().into());
        record.insert("type".into(), self.kind.clone().into());
        if let Some(uid) = self.uid {
            record.insert("uid".into(), uid.0.into());
        }
        record.insert("components".into(), components.into());
        Ok(record)
    }

    /// Generic record constructor: identity fields plus every component
    /// resolved through `registry`.
    pub fn restore(registry: &TypeRegistry, record: &Record) -> Result<Self> {
        let parsed: EntityRecord = from_record("Entity", record)?;
        let mut entity = Entity::new(parsed.id, parsed.kind);
        entity.uid = parsed.uid;
        for (name, data) in &parsed.components {
            entity.add_boxed(registry.restore_component(name, data)?);
        }
        Ok(entity)
    }
}

impl Clone for Entity {
    /// Deep copy. Components keep the source's owner handle until the copy
    /// is given its own uid via `set_uid`.
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            kind: self.kind.clone(),
            uid: self.uid,
            components: self
                .components
                .iter()
                .map(|(name, c)| (*name, c.clone_box()))
                .collect(),
        }
    }
}
