//! Entity Component System (ECS) runtime.
//!
//! Entities are plain handles, components are stored per type in dense
//! storages, and every entity has a [`Signature`] with one bit per attached
//! component type. Each registered [`System`] declares the components it
//! needs and is handed, on every tick, all entities whose signature has them.
//! Those sets are kept up to date incrementally on every structural change.

pub use component::{Component, ComponentManager, ComponentStorage, ComponentType, IntoIter};
pub use entity::{Entity, EntityRecord, EntityRegistry};
pub use event::{
    ComponentAdded, ComponentRemoved, EntityCreated, EntityDestroyed, Event, EventBus,
    Subscription,
};
pub use report::SignatureReport;
pub use signature::Signature;
pub use system::{ComponentSet, DeltaTime, Scheduler, SignatureIndex, System, SystemId};
pub use world::World;

mod component;
mod entity;
mod event;
mod report;
mod signature;
mod system;
mod world;
