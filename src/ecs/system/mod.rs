//! Utilities for *systems* in ECS.

use std::any::{self, Any};
use std::time::Duration;

use crate::error::HookResult;

use super::{Entity, World};

pub use index::*;
pub use scheduler::*;
pub use set::ComponentSet;

mod index;
mod scheduler;
mod set;
mod tests;

/// Type which represents duration between two ticks.
pub type DeltaTime = Duration;

/// Objects of this trait represent *system* of ECS.
pub trait System: 'static {
    /// Component types which are required by this system.
    ///
    /// The system will be handed every entity which has all of them.
    ///
    type Required: ComponentSet;

    /// Human-readable name of the system, used in logs and reports.
    fn name(&self) -> &str {
        any::type_name::<Self>()
    }

    /// Called once before the first update.
    fn on_init(&mut self, _world: &mut World) -> HookResult {
        Ok(())
    }

    /// Called once per tick.
    ///
    /// `entities` is a copy of the entities which matched the system when
    /// this call began: attaching or detaching components here affects
    /// only the following ticks.
    ///
    fn on_update(&mut self, world: &mut World, entities: &[Entity], delta: DeltaTime) -> HookResult;

    /// Called once on shutdown, or when the system is unregistered.
    fn on_cleanup(&mut self, _world: &mut World) -> HookResult {
        Ok(())
    }
}

/// Object-safe form of [`System`] used for storing systems of different types.
pub(crate) trait AnySystem {
    fn name(&self) -> &str;

    fn init(&mut self, world: &mut World) -> HookResult;

    fn update(&mut self, world: &mut World, entities: &[Entity], delta: DeltaTime) -> HookResult;

    fn cleanup(&mut self, world: &mut World) -> HookResult;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S> AnySystem for S
where
    S: System,
{
    fn name(&self) -> &str {
        System::name(self)
    }

    fn init(&mut self, world: &mut World) -> HookResult {
        self.on_init(world)
    }

    fn update(&mut self, world: &mut World, entities: &[Entity], delta: DeltaTime) -> HookResult {
        self.on_update(world, entities, delta)
    }

    fn cleanup(&mut self, world: &mut World) -> HookResult {
        self.on_cleanup(world)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
