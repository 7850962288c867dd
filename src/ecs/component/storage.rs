//! Utilities for different types of storages for **components** of ECS.

use std::any::{self, Any};
use std::ops::{Index, IndexMut};

use slotmap::SecondaryMap;

use super::{super::Entity, Component};

/// Storage for statically typed components of ECS.
///
/// Components are kept in a dense array without holes; the entity of each
/// component is remembered in a parallel array, and a sparse map translates
/// an entity into the index of its component.
///
pub struct ComponentStorage<T>
where
    T: Component,
{
    /// Components are actually stored here.
    components: Vec<T>,
    entity_to_index: SecondaryMap<Entity, usize>,
    index_to_entity: Vec<Entity>,
}

impl<T> Default for ComponentStorage<T>
where
    T: Component,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ComponentStorage<T>
where
    T: Component,
{
    /// Creates an empty component storage.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            entity_to_index: SecondaryMap::new(),
            index_to_entity: Vec::new(),
        }
    }

    /// Inserts component and attaches it to the entity.
    ///
    /// # Panics
    ///
    /// Panics if component was already attached to the entity.
    ///
    pub fn insert(&mut self, entity: Entity, component: T) {
        assert!(
            !self.attached(entity),
            "component was already attached to the entity",
        );
        let index = self.components.len();
        self.components.push(component);
        self.index_to_entity.push(entity);
        self.entity_to_index.insert(entity, index);
    }

    /// Replaces component attached to the entity by value.
    ///
    /// Returns previously attached component, if any.
    /// The entity keeps its position in the storage.
    ///
    pub fn replace(&mut self, entity: Entity, component: T) -> Option<T> {
        match self.get_mut(entity) {
            Some(slot) => Some(std::mem::replace(slot, component)),
            None => {
                self.insert(entity, component);
                None
            }
        }
    }

    /// Removes component and detaches it from the entity.
    ///
    /// The last component is moved into the freed slot,
    /// so the order of remaining components is not preserved.
    ///
    /// Returns component that was attached to the entity.
    ///
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let index = self.entity_to_index.remove(entity)?;
        let component = self.components.swap_remove(index);
        self.index_to_entity.swap_remove(index);
        if let Some(&moved) = self.index_to_entity.get(index) {
            self.entity_to_index.insert(moved, index);
        }
        Some(component)
    }

    /// Returns `true` if component was already attached to the entity.
    pub fn attached(&self, entity: Entity) -> bool {
        self.entity_to_index.contains_key(entity)
    }

    /// Retrieves an immutable reference to component attached to the entity.
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let index = *self.entity_to_index.get(entity)?;
        self.components.get(index)
    }

    /// Retrieves a mutable reference to component attached to the entity.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let index = *self.entity_to_index.get(entity)?;
        self.components.get_mut(index)
    }

    /// Position of the component of the entity in the dense array.
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        self.entity_to_index.get(entity).copied()
    }

    /// Entity which owns the component at given position of the dense array.
    pub fn entity_at(&self, index: usize) -> Option<Entity> {
        self.index_to_entity.get(index).copied()
    }

    /// Number of stored components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if there are no stored components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns immutable iterator over all components with their entities.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.index_to_entity
            .iter()
            .copied()
            .zip(self.components.iter())
    }

    /// Returns mutable iterator over all components with their entities.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.index_to_entity
            .iter()
            .copied()
            .zip(self.components.iter_mut())
    }

    /// Returns iterator over all entities which have component of this type.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.index_to_entity.iter().copied()
    }

    /// Returns all components as a contiguous slice.
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Returns all components as a contiguous mutable slice.
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }
}

/// Owning iterator over components with their entities.
pub type IntoIter<T> = std::iter::Zip<std::vec::IntoIter<Entity>, std::vec::IntoIter<T>>;

impl<T> IntoIterator for ComponentStorage<T>
where
    T: Component,
{
    type Item = (Entity, T);
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.index_to_entity.into_iter().zip(self.components)
    }
}

impl<T> Index<Entity> for ComponentStorage<T>
where
    T: Component,
{
    type Output = T;

    fn index(&self, entity: Entity) -> &Self::Output {
        self.get(entity)
            .expect("there is no component attached to the entity")
    }
}

impl<T> IndexMut<Entity> for ComponentStorage<T>
where
    T: Component,
{
    fn index_mut(&mut self, entity: Entity) -> &mut Self::Output {
        self.get_mut(entity)
            .expect("there is no component attached to the entity")
    }
}

/// Type-erased view of a [`ComponentStorage`].
///
/// Lets the manager keep storages of different types side by side
/// and remove components of an entity without knowing their types.
///
pub(crate) trait AnyStorage {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn type_name(&self) -> &'static str;

    fn attached(&self, entity: Entity) -> bool;

    fn len(&self) -> usize;

    /// Drops component of the entity, returns `true` if there was one.
    fn remove_entity(&mut self, entity: Entity) -> bool;
}

impl<T> AnyStorage for ComponentStorage<T>
where
    T: Component,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn attached(&self, entity: Entity) -> bool {
        ComponentStorage::attached(self, entity)
    }

    fn len(&self) -> usize {
        ComponentStorage::len(self)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }
}
