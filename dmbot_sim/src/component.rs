// The component contract.
//
// A component is a piece of data attached to exactly one `Entity`, looked up
// by its type name (e.g. `"MapPhysicsComponent"`). Every component can dump
// itself to a flat `Record` (a JSON object) and be restored from one; the
// `TypeRegistry` maps type names to restore functions so entity records can
// be rehydrated without knowing concrete types at compile time.
//
// The owner back-reference is a `Uid` handle, never a pointer: it is used for
// lookup only and has no say in the owner's lifetime. `Entity` keeps it in
// sync when components are attached, detached, or when the entity's uid
// changes.
//
// Concrete components are ordinary serde structs with an
// `owner: Option<Uid>` field marked `#[serde(skip)]`; the `component!` macro
// derives both traits from that.
//
// See also: `entity.rs` for attachment rules, `registry.rs` for restore
// dispatch, `components.rs` for the built-in map components.

use crate::error::{Result, SimError};
use crate::types::Uid;
use std::any::Any;
use std::fmt;

/// A flat key/value record: the serialized form of a component or entity.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Object-safe part of the component contract.
///
/// `Send` so a factory and its maps can be handed to a driver thread as a
/// unit; shared mutation still needs `&mut`.
pub trait Component: Any + Send + fmt::Debug {
    /// Registry key for this component type. One instance per name per entity.
    fn type_name(&self) -> &'static str;

    fn owner(&self) -> Option<Uid>;

    fn set_owner(&mut self, owner: Option<Uid>);

    fn dump(&self) -> Result<Record>;

    /// Structural copy. The copy keeps the owner handle; the entity that
    /// receives it re-points it.
    fn clone_box(&self) -> Box<dyn Component>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Statically-typed part of the contract: the type's name and its restorer.
pub trait ComponentType: Component + Sized {
    const TYPE_NAME: &'static str;

    fn restore(record: &Record) -> Result<Self>;
}

/// Restore a component and erase its type, for registry tables.
pub fn restore_boxed<C: ComponentType>(record: &Record) -> Result<Box<dyn Component>> {
    Ok(Box::new(C::restore(record)?))
}

/// Serialize any serde value into a `Record`. Values that do not serialize
/// to a JSON object are rejected.
pub fn to_record<T: serde::Serialize>(type_name: &str, value: &T) -> Result<Record> {
    let invalid = |source| SimError::InvalidRecord {
        type_name: type_name.to_owned(),
        source,
    };
    match serde_json::to_value(value).map_err(invalid)? {
        serde_json::Value::Object(record) => Ok(record),
        other => Err(invalid(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        )))),
    }
}

/// Deserialize a `Record` into a serde value.
pub fn from_record<T: serde::de::DeserializeOwned>(type_name: &str, record: &Record) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(record.clone())).map_err(|source| {
        SimError::InvalidRecord {
            type_name: type_name.to_owned(),
            source,
        }
    })
}

/// Implement `Component` and `ComponentType` for a serde struct that has an
/// `owner: Option<Uid>` field.
///
/// ```ignore
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// pub struct HealthComponent {
///     pub hp: i32,
///     #[serde(skip)]
///     owner: Option<Uid>,
/// }
/// dmbot_sim::component!(HealthComponent, "HealthComponent");
/// ```
#[macro_export]
macro_rules! component {
    ($ty:ident, $name:literal) => {
        impl $crate::component::Component for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn owner(&self) -> Option<$crate::types::Uid> {
                self.owner
            }

            fn set_owner(&mut self, owner: Option<$crate::types::Uid>) {
                self.owner = owner;
            }

            fn dump(&self) -> $crate::error::Result<$crate::component::Record> {
                $crate::component::to_record($name, self)
            }

            fn clone_box(&self) -> Box<dyn $crate::component::Component> {
                Box::new(self.clone())
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn ::std::any::Any> {
                self
            }
        }

        impl $crate::component::ComponentType for $ty {
            const TYPE_NAME: &'static str = $name;

            fn restore(
                record: &$crate::component::Record,
            ) -> $crate::error::Result<Self> {
                $crate::component::from_record($name, record)
            }
        }
    };
}
