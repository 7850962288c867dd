//! Utilities for *entities* in ECS.

use slotmap::{new_key_type, SlotMap};

use crate::error::{Error, Result};

use super::{ComponentType, Signature};

new_key_type! {
    /// Unique identifier of the *entity* of ECS.
    ///
    /// Handles are versioned: once an entity is destroyed its handle never
    /// refers to any other entity, even if the underlying slot is recycled.
    ///
    pub struct Entity;
}

/// Data which is stored for each alive entity.
#[derive(Debug, Default, Clone)]
pub struct EntityRecord {
    signature: Signature,
}

impl EntityRecord {
    /// Set of component types currently attached to the entity.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Storage for all entities of ECS.
///
/// This is the only owner of entity signatures: they are changed only by
/// attaching or detaching components through the [`World`](super::World).
///
#[derive(Default)]
pub struct EntityRegistry {
    entities: SlotMap<Entity, EntityRecord>,
}

impl EntityRegistry {
    /// Creates an empty entity registry.
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
        }
    }

    /// Allocates new entity with an empty signature.
    pub fn create(&mut self) -> Entity {
        self.entities.insert(EntityRecord::default())
    }

    /// Removes the entity and returns its record.
    ///
    /// # Errors
    ///
    /// An error is returned if the entity does not exist.
    ///
    pub fn destroy(&mut self, entity: Entity) -> Result<EntityRecord> {
        self.entities
            .remove(entity)
            .ok_or(Error::UnknownEntity(entity))
    }

    /// Returns `true` if the entity is alive.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Retrieves the signature of the entity.
    pub fn signature(&self, entity: Entity) -> Result<&Signature> {
        self.entities
            .get(entity)
            .map(EntityRecord::signature)
            .ok_or(Error::UnknownEntity(entity))
    }

    /// Number of alive entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if there are no alive entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns iterator over all alive entities with their signatures.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &Signature)> {
        self.entities
            .iter()
            .map(|(entity, record)| (entity, record.signature()))
    }

    pub(crate) fn insert_component(
        &mut self,
        entity: Entity,
        component: ComponentType,
    ) -> Result<()> {
        let record = self
            .entities
            .get_mut(entity)
            .ok_or(Error::UnknownEntity(entity))?;
        record.signature.insert(component);
        Ok(())
    }

    pub(crate) fn remove_component(
        &mut self,
        entity: Entity,
        component: ComponentType,
    ) -> Result<()> {
        let record = self
            .entities
            .get_mut(entity)
            .ok_or(Error::UnknownEntity(entity))?;
        record.signature.remove(component);
        Ok(())
    }
}
