//! Utilities for error handling of the entity component runtime.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::ecs::{Entity, SystemId};

/// Result of any operation which can return an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Error that can happen on operations with entities, components or systems.
///
/// All variants describe programmer errors: operations fail fast
/// and leave the world exactly as it was before the call.
///
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("component type `{name}` was not registered")]
    UnregisteredComponentType { name: &'static str },

    #[error("entity {0:?} does not exist")]
    UnknownEntity(Entity),

    #[error("entity {entity:?} already has component `{name}`")]
    DuplicateComponent { entity: Entity, name: &'static str },

    #[error("entity {entity:?} has no component `{name}`")]
    ComponentNotFound { entity: Entity, name: &'static str },

    #[error("cannot register more than {capacity} component types")]
    CapacityExceeded { capacity: usize },

    #[error("system {0:?} is not registered")]
    UnknownSystem(SystemId),
}

/// Result of a single system hook.
pub type HookResult = std::result::Result<(), Box<dyn StdError + Send + Sync + 'static>>;

/// Lifecycle stage of the system in which a hook was invoked.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Init,
    Update,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Update => "update",
            Self::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Failure of one system hook.
///
/// Hooks are isolated from each other: a failing system is reported
/// with this error while the remaining systems still run.
///
#[derive(Debug, Error)]
#[error("system `{name}` failed on {stage}: {source}")]
pub struct HookError {
    pub system: SystemId,
    pub name: String,
    pub stage: Stage,
    #[source]
    pub source: Box<dyn StdError + Send + Sync + 'static>,
}

impl Error {
    /// Component type which caused this error, if any.
    pub fn component(&self) -> Option<&'static str> {
        match self {
            Self::UnregisteredComponentType { name }
            | Self::DuplicateComponent { name, .. }
            | Self::ComponentNotFound { name, .. } => Some(*name),
            _ => None,
        }
    }
}
