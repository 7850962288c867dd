//! Cached sets of entities which match signatures of registered systems.

use std::collections::BTreeSet;

use slotmap::{new_key_type, SlotMap};

use crate::error::{Error, Result};

use super::super::{
    ComponentAdded, ComponentRemoved, Entity, EntityCreated, EntityDestroyed, EntityRegistry,
    Signature,
};

new_key_type! {
    /// Unique identifier of the registered *system* of ECS.
    pub struct SystemId;
}

struct Registration {
    required: Signature,
    entities: BTreeSet<Entity>,
}

/// Index of entities which match required signatures of systems.
///
/// For every registered system the index keeps the set of alive entities
/// whose signature contains the required one. Sets are built once when
/// the system is registered and then kept up to date from events, looking
/// only at the entity the event is about.
///
/// Signatures themselves are read from the [`EntityRegistry`],
/// the index never keeps its own copy of them.
///
#[derive(Default)]
pub struct SignatureIndex {
    registrations: SlotMap<SystemId, Registration>,
}

impl SignatureIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            registrations: SlotMap::with_key(),
        }
    }

    /// Registers new system with its required signature.
    ///
    /// All alive entities are checked once to fill the initial set.
    ///
    pub fn register(&mut self, required: Signature, entities: &EntityRegistry) -> SystemId {
        let matching = entities
            .iter()
            .filter(|(_, signature)| signature.contains(&required))
            .map(|(entity, _)| entity)
            .collect();
        self.registrations.insert(Registration {
            required,
            entities: matching,
        })
    }

    /// Drops the system with its cached set.
    pub fn unregister(&mut self, system: SystemId) -> Result<()> {
        self.registrations
            .remove(system)
            .map(|_| ())
            .ok_or(Error::UnknownSystem(system))
    }

    /// Returns `true` if the system is registered.
    pub fn contains(&self, system: SystemId) -> bool {
        self.registrations.contains_key(system)
    }

    /// Required signature of the system.
    pub fn required(&self, system: SystemId) -> Result<&Signature> {
        self.registrations
            .get(system)
            .map(|registration| &registration.required)
            .ok_or(Error::UnknownSystem(system))
    }

    /// Entities which currently match the system, ordered by their handles.
    pub fn entities(&self, system: SystemId) -> Result<&BTreeSet<Entity>> {
        self.registrations
            .get(system)
            .map(|registration| &registration.entities)
            .ok_or(Error::UnknownSystem(system))
    }

    /// Copy of the entities which currently match the system.
    pub fn snapshot(&self, system: SystemId) -> Result<Vec<Entity>> {
        Ok(self.entities(system)?.iter().copied().collect())
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if there are no registered systems.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Scans all alive entities for those which match the signature.
    ///
    /// Unlike [`entities`](Self::entities) nothing is cached here.
    ///
    pub fn matching(required: &Signature, entities: &EntityRegistry) -> Vec<Entity> {
        entities
            .iter()
            .filter(|(_, signature)| signature.contains(required))
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Handles attachment of the component to the entity.
    pub fn component_added(&mut self, event: &ComponentAdded, entities: &EntityRegistry) {
        let after = match entities.signature(event.entity) {
            Ok(signature) => signature,
            Err(_) => return,
        };
        let before = after.without(event.component);
        self.transition(event.entity, Some(&before), Some(after));
    }

    /// Handles detachment of the component from the entity.
    pub fn component_removed(&mut self, event: &ComponentRemoved, entities: &EntityRegistry) {
        let after = match entities.signature(event.entity) {
            Ok(signature) => signature,
            Err(_) => return,
        };
        let before = after.with(event.component);
        self.transition(event.entity, Some(&before), Some(after));
    }

    /// Handles creation of the entity.
    ///
    /// New entities have no components, so they match
    /// only systems which require nothing.
    ///
    pub fn entity_created(&mut self, event: &EntityCreated, entities: &EntityRegistry) {
        if let Ok(signature) = entities.signature(event.entity) {
            self.transition(event.entity, None, Some(signature));
        }
    }

    /// Handles destruction of the entity.
    pub fn entity_destroyed(&mut self, event: &EntityDestroyed) {
        self.transition(event.entity, None, None);
    }

    fn transition(&mut self, entity: Entity, before: Option<&Signature>, after: Option<&Signature>) {
        for registration in self.registrations.values_mut() {
            let required = &registration.required;
            let was_matching = before.map_or(false, |before| before.contains(required));
            let is_matching = after.map_or(false, |after| after.contains(required));

            if is_matching && !was_matching {
                registration.entities.insert(entity);
            } else if !is_matching {
                registration.entities.remove(&entity);
            }
        }
    }
}
