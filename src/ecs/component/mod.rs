//! Utilities for *components* in ECS.

use std::any::Any;

pub use manager::*;
pub use storage::*;

mod manager;
mod storage;

/// Objects of this trait represent *component* of ECS.
///
/// Components are opaque to the runtime: they are stored and handed back
/// as is, without ever being inspected.
///
pub trait Component: Any {}

impl<T> Component for T where T: Any {}

/// Unique identifier of the registered *component* type of ECS.
///
/// The identifier is the position of the component type's bit
/// in entity and system [signatures](super::Signature).
///
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentType(usize);

impl ComponentType {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Position of the bit of this component type.
    pub const fn index(self) -> usize {
        self.0
    }
}
