//! Utilities for storage of ECS.

use std::collections::BTreeSet;

use crate::config::Config;
use crate::error::{Error, HookError, Result, Stage};

use super::system::{AnySystem, Scheduled};
use super::{
    Component, ComponentSet, ComponentAdded, ComponentManager, ComponentRemoved, ComponentStorage,
    ComponentType, DeltaTime, Entity, EntityCreated, EntityDestroyed, EntityRegistry, EventBus,
    Scheduler, Signature, SignatureIndex, SignatureReport, System, SystemId,
};

/// Storage for entities, components and systems of ECS.
///
/// This is the single entry point of the runtime. Every world owns its own
/// registries, so any number of worlds can live in one process.
///
/// Structural changes are reported through [`events_mut`](Self::events_mut).
/// The cached entity sets of systems are updated before any
/// external subscriber is notified.
///
pub struct World {
    config: Config,
    /// Storage for all entities.
    entities: EntityRegistry,
    /// Component types and their storages.
    components: ComponentManager,
    pub(crate) index: SignatureIndex,
    pub(crate) scheduler: Scheduler,
    events: EventBus,
}

impl World {
    /// Creates an empty world with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty world with given configuration.
    pub fn with_config(config: Config) -> Self {
        let components = ComponentManager::new(config.max_component_types());
        Self {
            config,
            entities: EntityRegistry::new(),
            components,
            index: SignatureIndex::new(),
            scheduler: Scheduler::new(),
            events: EventBus::new(),
        }
    }

    /// Configuration of this world.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates new entity without components.
    pub fn create(&mut self) -> Entity {
        let entity = self.entities.create();
        log::trace!("created {:?}", entity);

        let event = EntityCreated { entity };
        self.index.entity_created(&event, &self.entities);
        self.events.publish(&event);
        entity
    }

    /// Destroys the entity.
    ///
    /// Every component of the entity is detached first (each one emitting
    /// [`ComponentRemoved`]), then the entity leaves all system sets
    /// and [`EntityDestroyed`] is emitted.
    ///
    /// # Errors
    ///
    /// An error is returned if the entity does not exist.
    ///
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        let signature = self.entities.signature(entity)?.clone();
        for component in signature.iter() {
            let event = self
                .components
                .detach_untyped(&mut self.entities, entity, component)?;
            self.component_removed(event);
        }
        self.entities.destroy(entity)?;
        log::trace!("destroyed {:?}", entity);

        let event = EntityDestroyed { entity };
        self.index.entity_destroyed(&event);
        self.events.publish(&event);
        Ok(())
    }

    /// Returns `true` if the entity exists.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Signature of the entity.
    pub fn signature(&self, entity: Entity) -> Result<&Signature> {
        self.entities.signature(entity)
    }

    /// Returns iterator over all alive entities.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().map(|(entity, _)| entity)
    }

    /// Number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Registers component type `T`.
    ///
    /// Registering the same type twice returns the same identifier.
    ///
    pub fn register<T>(&mut self) -> Result<ComponentType>
    where
        T: Component,
    {
        self.components.register::<T>()
    }

    /// Identifier of the registered component type `T`.
    pub fn component_type<T>(&self) -> Result<ComponentType>
    where
        T: Component,
    {
        self.components.component_type::<T>()
    }

    /// All registered component types.
    pub fn components(&self) -> &ComponentManager {
        &self.components
    }

    /// Attaches component to the entity.
    ///
    /// # Errors
    ///
    /// An error is returned if `T` was not registered, the entity does not exist
    /// or it already has component of type `T`. The world is left unchanged then.
    ///
    pub fn attach<T>(&mut self, entity: Entity, component: T) -> Result<()>
    where
        T: Component,
    {
        let event = self
            .components
            .attach(&mut self.entities, entity, component)?;
        self.component_added(event);
        Ok(())
    }

    /// Attaches default value of component of type `T` to the entity.
    pub fn attach_default<T>(&mut self, entity: Entity) -> Result<()>
    where
        T: Component + Default,
    {
        self.attach(entity, T::default())
    }

    /// Detaches component of type `T` from the entity and returns it.
    ///
    /// # Errors
    ///
    /// An error is returned if `T` was not registered, the entity does not exist
    /// or it has no component of type `T`. The world is left unchanged then.
    ///
    pub fn detach<T>(&mut self, entity: Entity) -> Result<T>
    where
        T: Component,
    {
        let (component, event) = self.components.detach::<T>(&mut self.entities, entity)?;
        self.component_removed(event);
        Ok(component)
    }

    /// Replaces value of the component attached to the entity.
    ///
    /// Signature of the entity is not changed, so no events are emitted.
    ///
    pub fn replace<T>(&mut self, entity: Entity, component: T) -> Result<T>
    where
        T: Component,
    {
        let slot = self.get_mut::<T>(entity)?;
        Ok(std::mem::replace(slot, component))
    }

    /// Retrieves an immutable reference to component of type `T` of the entity.
    pub fn get<T>(&self, entity: Entity) -> Result<&T>
    where
        T: Component,
    {
        self.check_alive(entity)?;
        self.components
            .get::<T>(entity)?
            .ok_or_else(|| not_found::<T>(entity))
    }

    /// Retrieves a mutable reference to component of type `T` of the entity.
    pub fn get_mut<T>(&mut self, entity: Entity) -> Result<&mut T>
    where
        T: Component,
    {
        self.check_alive(entity)?;
        self.components
            .get_mut::<T>(entity)?
            .ok_or_else(|| not_found::<T>(entity))
    }

    /// Returns `true` if the entity has component of type `T`.
    pub fn has<T>(&self, entity: Entity) -> Result<bool>
    where
        T: Component,
    {
        self.check_alive(entity)?;
        self.components.attached::<T>(entity)
    }

    /// Storage of all components of type `T`.
    pub fn storage<T>(&self) -> Result<&ComponentStorage<T>>
    where
        T: Component,
    {
        self.components.storage::<T>()
    }

    /// Returns mutable iterator over all components of type `T` with their entities.
    pub fn iter_mut<T>(&mut self) -> Result<impl Iterator<Item = (Entity, &mut T)>>
    where
        T: Component,
    {
        Ok(self.components.storage_mut::<T>()?.iter_mut())
    }

    /// Registers the system.
    ///
    /// Required component types of the system must be registered already.
    /// The system will be executed after all previously registered systems.
    /// If the world was already initialized, init hook of the system
    /// is called right away.
    ///
    /// # Errors
    ///
    /// An error is returned if some required component type was not registered.
    ///
    pub fn register_system<S>(&mut self, system: S) -> Result<SystemId>
    where
        S: System,
    {
        let required = S::Required::signature(&self.components)?;
        log::debug!(
            "system `{}` registered with signature {}",
            System::name(&system),
            required,
        );
        let id = self.index.register(required, &self.entities);

        let mut system: Box<dyn AnySystem> = Box::new(system);
        let initialized = self.scheduler.is_initialized();
        if initialized {
            if let Err(error) = system.init(self) {
                log::error!("system `{}` failed on {}: {}", system.name(), Stage::Init, error);
            }
        }
        self.scheduler.push(Scheduled {
            id,
            system,
            initialized,
        });
        Ok(id)
    }

    /// Unregisters the system, calling its cleanup hook if it was initialized.
    ///
    /// If hooks of the world are running, the cleanup hook is called
    /// at the end of the current pass.
    ///
    /// # Errors
    ///
    /// An error is returned if the system is not registered.
    ///
    pub fn unregister_system(&mut self, system: SystemId) -> Result<()> {
        self.index.unregister(system)?;
        if let Some(mut removed) = self.scheduler.remove(system) {
            log::debug!("system `{}` unregistered", removed.system.name());
            if let Some(Err(error)) = removed.cleanup(self) {
                log::error!(
                    "system `{}` failed on {}: {}",
                    removed.system.name(),
                    Stage::Cleanup,
                    error,
                );
            }
        }
        Ok(())
    }

    /// Retrieves an immutable reference to the registered system of type `S`.
    ///
    /// Returns `None` when called from a hook: systems are moved out
    /// of the world while [`init`](Self::init), [`update`](Self::update)
    /// or [`cleanup`](Self::cleanup) is running.
    ///
    pub fn system<S>(&self, system: SystemId) -> Option<&S>
    where
        S: System,
    {
        self.scheduler.get(system)
    }

    /// Retrieves a mutable reference to the registered system of type `S`.
    ///
    /// Like [`system`](Self::system), returns `None` when called from a hook.
    ///
    pub fn system_mut<S>(&mut self, system: SystemId) -> Option<&mut S>
    where
        S: System,
    {
        self.scheduler.get_mut(system)
    }

    /// All registered systems in execution order.
    pub fn systems(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Entities which currently match the system.
    pub fn system_entities(&self, system: SystemId) -> Result<&BTreeSet<Entity>> {
        self.index.entities(system)
    }

    /// Required signature of the system.
    pub fn system_signature(&self, system: SystemId) -> Result<&Signature> {
        self.index.required(system)
    }

    /// Scans all entities for those which have every component of the signature.
    pub fn entities_matching(&self, required: &Signature) -> Vec<Entity> {
        SignatureIndex::matching(required, &self.entities)
    }

    /// Calls init hooks of all systems in order.
    ///
    /// Returns failures of the hooks; failed systems do not prevent
    /// the remaining ones from being initialized.
    ///
    pub fn init(&mut self) -> Vec<HookError> {
        log::debug!("initializing {} systems", self.scheduler.len());
        self.scheduler.set_initialized(true);
        Scheduler::run(self, Stage::Init, DeltaTime::ZERO)
    }

    /// Calls update hooks of all systems in order with the same `delta`.
    ///
    /// Returns failures of the hooks; failed systems do not prevent
    /// the remaining ones from being updated.
    ///
    pub fn update(&mut self, delta: DeltaTime) -> Vec<HookError> {
        Scheduler::run(self, Stage::Update, delta)
    }

    /// Calls cleanup hooks of all initialized systems in order, then unregisters
    /// all systems and removes all event subscribers.
    ///
    /// Systems registered by cleanup hooks are not initialized.
    ///
    pub fn cleanup(&mut self) -> Vec<HookError> {
        log::debug!("cleaning up {} systems", self.scheduler.len());
        self.scheduler.set_initialized(false);
        let failures = Scheduler::run(self, Stage::Cleanup, DeltaTime::ZERO);
        for scheduled in self.scheduler.take() {
            // Systems may have unregistered each other during the pass.
            let _ = self.index.unregister(scheduled.id);
        }
        self.events.clear();
        failures
    }

    /// Event bus through which structural changes of this world are reported.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Mutable event bus, used to subscribe to structural changes of this world.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Human-readable dump of component bits, entity signatures and system sets.
    pub fn signature_report(&self) -> SignatureReport<'_> {
        SignatureReport::new(&self.entities, &self.components, &self.index, &self.scheduler)
    }

    fn component_added(&mut self, event: ComponentAdded) {
        self.index.component_added(&event, &self.entities);
        self.events.publish(&event);
    }

    fn component_removed(&mut self, event: ComponentRemoved) {
        self.index.component_removed(&event, &self.entities);
        self.events.publish(&event);
    }

    fn check_alive(&self, entity: Entity) -> Result<()> {
        if self.entities.contains(entity) {
            Ok(())
        } else {
            Err(Error::UnknownEntity(entity))
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found<T>(entity: Entity) -> Error
where
    T: Component,
{
    Error::ComponentNotFound {
        entity,
        name: std::any::type_name::<T>(),
    }
}
