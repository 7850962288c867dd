//! Utilities for managing component storages.

use std::any::{self, TypeId};
use std::collections::HashMap;

use crate::error::{Error, Result};

use super::{
    super::{ComponentAdded, ComponentRemoved, Entity, EntityRegistry},
    AnyStorage, Component, ComponentStorage, ComponentType,
};

/// Manager of all components of ECS.
///
/// Every registered component type gets its own bit and its own storage.
/// Attaching or detaching a component updates both the storage and
/// the signature of the entity, and yields the event describing the change.
///
pub struct ComponentManager {
    types: HashMap<TypeId, ComponentType>,
    names: HashMap<&'static str, ComponentType>,
    /// Storages indexed by the bit of their component type.
    storages: Vec<Box<dyn AnyStorage>>,
    capacity: usize,
}

impl ComponentManager {
    /// Creates new component manager which can hold up to `capacity` component types.
    pub fn new(capacity: usize) -> Self {
        Self {
            types: HashMap::new(),
            names: HashMap::new(),
            storages: Vec::new(),
            capacity,
        }
    }

    /// Registers component type `T` and creates an empty storage for it.
    ///
    /// Registering the same type again returns the existing identifier.
    ///
    /// # Errors
    ///
    /// An error is returned if all available bits are already taken.
    ///
    pub fn register<T>(&mut self) -> Result<ComponentType>
    where
        T: Component,
    {
        let type_id = TypeId::of::<T>();
        if let Some(&component) = self.types.get(&type_id) {
            return Ok(component);
        }
        if self.storages.len() >= self.capacity {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let component = ComponentType::from_index(self.storages.len());
        let name = any::type_name::<T>();
        self.storages.push(Box::new(ComponentStorage::<T>::new()));
        self.types.insert(type_id, component);
        self.names.insert(name, component);
        log::debug!("component `{}` registered with bit {}", name, component.index());
        Ok(component)
    }

    /// Retrieves identifier of component type `T`.
    pub fn component_type<T>(&self) -> Result<ComponentType>
    where
        T: Component,
    {
        self.types
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(Error::UnregisteredComponentType {
                name: any::type_name::<T>(),
            })
    }

    /// Retrieves identifier of the component type with given name.
    ///
    /// Names are full type paths as returned by [`std::any::type_name`].
    ///
    pub fn component_type_by_name(&self, name: &str) -> Option<ComponentType> {
        self.names.get(name).copied()
    }

    /// Name of the registered component type.
    pub fn name(&self, component: ComponentType) -> Option<&'static str> {
        self.storages
            .get(component.index())
            .map(|storage| storage.type_name())
    }

    /// Returns iterator over all registered component types with their names,
    /// in registration order.
    pub fn registered(&self) -> impl Iterator<Item = (ComponentType, &'static str)> + '_ {
        self.storages
            .iter()
            .enumerate()
            .map(|(index, storage)| (ComponentType::from_index(index), storage.type_name()))
    }

    /// Number of registered component types.
    pub fn len(&self) -> usize {
        self.storages.len()
    }

    /// Returns `true` if no component types were registered.
    pub fn is_empty(&self) -> bool {
        self.storages.is_empty()
    }

    /// Maximal number of component types.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Attaches component of type `T` to the entity.
    ///
    /// Returns the event which describes the change of the entity signature.
    ///
    /// # Errors
    ///
    /// An error is returned if `T` was not registered, the entity does not exist
    /// or already has component of type `T`. Nothing is changed in that case.
    ///
    pub fn attach<T>(
        &mut self,
        entities: &mut EntityRegistry,
        entity: Entity,
        component: T,
    ) -> Result<ComponentAdded>
    where
        T: Component,
    {
        let component_type = self.component_type::<T>()?;
        if !entities.contains(entity) {
            return Err(Error::UnknownEntity(entity));
        }
        let storage = self.storage_mut::<T>()?;
        if storage.attached(entity) {
            return Err(Error::DuplicateComponent {
                entity,
                name: any::type_name::<T>(),
            });
        }

        storage.insert(entity, component);
        entities.insert_component(entity, component_type)?;
        log::trace!("attached `{}` to {:?}", any::type_name::<T>(), entity);
        Ok(ComponentAdded {
            entity,
            component: component_type,
        })
    }

    /// Detaches component of type `T` from the entity.
    ///
    /// Returns the detached component and the event which describes
    /// the change of the entity signature.
    ///
    /// # Errors
    ///
    /// An error is returned if `T` was not registered, the entity does not exist
    /// or has no component of type `T`. Nothing is changed in that case.
    ///
    pub fn detach<T>(
        &mut self,
        entities: &mut EntityRegistry,
        entity: Entity,
    ) -> Result<(T, ComponentRemoved)>
    where
        T: Component,
    {
        let component_type = self.component_type::<T>()?;
        if !entities.contains(entity) {
            return Err(Error::UnknownEntity(entity));
        }
        let component = self
            .storage_mut::<T>()?
            .remove(entity)
            .ok_or(Error::ComponentNotFound {
                entity,
                name: any::type_name::<T>(),
            })?;

        entities.remove_component(entity, component_type)?;
        log::trace!("detached `{}` from {:?}", any::type_name::<T>(), entity);
        let event = ComponentRemoved {
            entity,
            component: component_type,
        };
        Ok((component, event))
    }

    /// Detaches component of given type from the entity, dropping its value.
    ///
    /// Used when the type of the component is known only by its identifier,
    /// e.g. while destroying the entity.
    ///
    pub fn detach_untyped(
        &mut self,
        entities: &mut EntityRegistry,
        entity: Entity,
        component: ComponentType,
    ) -> Result<ComponentRemoved> {
        if !entities.contains(entity) {
            return Err(Error::UnknownEntity(entity));
        }
        let storage = self
            .storages
            .get_mut(component.index())
            .ok_or(Error::UnregisteredComponentType { name: "<unknown>" })?;
        if !storage.remove_entity(entity) {
            return Err(Error::ComponentNotFound {
                entity,
                name: storage.type_name(),
            });
        }

        entities.remove_component(entity, component)?;
        log::trace!("detached `{}` from {:?}", storage.type_name(), entity);
        Ok(ComponentRemoved { entity, component })
    }

    /// Returns `true` if component of type `T` is attached to the entity.
    pub fn attached<T>(&self, entity: Entity) -> Result<bool>
    where
        T: Component,
    {
        Ok(self.storage::<T>()?.attached(entity))
    }

    /// Returns `true` if component of given type is attached to the entity.
    pub fn attached_untyped(&self, entity: Entity, component: ComponentType) -> bool {
        self.storages
            .get(component.index())
            .map(|storage| storage.attached(entity))
            .unwrap_or(false)
    }

    /// Number of components stored for given type.
    pub fn stored(&self, component: ComponentType) -> Option<usize> {
        self.storages
            .get(component.index())
            .map(|storage| storage.len())
    }

    /// Retrieves an immutable reference to component of type `T` attached to the entity.
    pub fn get<T>(&self, entity: Entity) -> Result<Option<&T>>
    where
        T: Component,
    {
        Ok(self.storage::<T>()?.get(entity))
    }

    /// Retrieves a mutable reference to component of type `T` attached to the entity.
    pub fn get_mut<T>(&mut self, entity: Entity) -> Result<Option<&mut T>>
    where
        T: Component,
    {
        Ok(self.storage_mut::<T>()?.get_mut(entity))
    }

    /// Retrieves storage of all components of type `T`.
    pub fn storage<T>(&self) -> Result<&ComponentStorage<T>>
    where
        T: Component,
    {
        let component = self.component_type::<T>()?;
        let boxed = &self.storages[component.index()];
        Ok(boxed.as_any().downcast_ref().expect("downcast error"))
    }

    // Not public: inserting into or removing from the storage directly
    // would leave entity signatures stale.
    pub(crate) fn storage_mut<T>(&mut self) -> Result<&mut ComponentStorage<T>>
    where
        T: Component,
    {
        let component = self.component_type::<T>()?;
        let boxed = &mut self.storages[component.index()];
        Ok(boxed.as_any_mut().downcast_mut().expect("downcast error"))
    }
}

impl Default for ComponentManager {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_COMPONENT_TYPES)
    }
}
