//! Ordered execution of *systems* in ECS.

use crate::error::{HookError, HookResult, Stage};

use super::{super::World, AnySystem, DeltaTime, System, SystemId};

pub(crate) struct Scheduled {
    pub id: SystemId,
    pub system: Box<dyn AnySystem>,
    /// Init hook was called and cleanup hook was not called yet.
    pub initialized: bool,
}

/// Storage for all systems of ECS.
///
/// Systems are executed in the order of their registration.
/// Every hook call is isolated: if a system fails, the failure is logged
/// and reported, and the next systems are still executed.
///
#[derive(Default)]
pub struct Scheduler {
    systems: Vec<Scheduled>,
    initialized: bool,
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            initialized: false,
        }
    }

    /// Returns `true` between init and cleanup of the world.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of scheduled systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if there are no scheduled systems.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Returns iterator over identifiers of systems in execution order.
    pub fn ids(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.systems.iter().map(|scheduled| scheduled.id)
    }

    /// Name of the system.
    pub fn name(&self, id: SystemId) -> Option<&str> {
        self.position(id)
            .map(|index| self.systems[index].system.name())
    }

    /// Retrieves an immutable reference to the system of type `S`.
    ///
    /// Systems are moved out of the scheduler while their hooks are running,
    /// so `None` is returned for every system during such a pass.
    ///
    pub fn get<S>(&self, id: SystemId) -> Option<&S>
    where
        S: System,
    {
        let index = self.position(id)?;
        self.systems[index].system.as_any().downcast_ref()
    }

    /// Retrieves a mutable reference to the system of type `S`.
    ///
    /// Like [`get`](Self::get), returns `None` while hooks are running.
    ///
    pub fn get_mut<S>(&mut self, id: SystemId) -> Option<&mut S>
    where
        S: System,
    {
        let index = self.position(id)?;
        self.systems[index].system.as_any_mut().downcast_mut()
    }

    pub(crate) fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    pub(crate) fn push(&mut self, scheduled: Scheduled) {
        self.systems.push(scheduled);
    }

    pub(crate) fn remove(&mut self, id: SystemId) -> Option<Scheduled> {
        let index = self.position(id)?;
        Some(self.systems.remove(index))
    }

    pub(crate) fn take(&mut self) -> Vec<Scheduled> {
        std::mem::take(&mut self.systems)
    }

    /// Puts systems back after a pass, in front of systems
    /// which were registered during that pass.
    pub(crate) fn restore(&mut self, mut systems: Vec<Scheduled>) {
        systems.append(&mut self.systems);
        self.systems = systems;
    }

    fn position(&self, id: SystemId) -> Option<usize> {
        self.systems.iter().position(|scheduled| scheduled.id == id)
    }

    /// Calls hooks of given stage for every system of the world in order.
    ///
    /// Systems are moved out of the world for the duration of the pass so
    /// that each of them can receive the world mutably. A system which was
    /// unregistered by a previous system of the same pass is skipped and
    /// then cleaned up, provided that it was initialized.
    ///
    /// Init hook is called only for systems which are not initialized yet,
    /// cleanup hook only for systems which are.
    ///
    pub(crate) fn run(world: &mut World, stage: Stage, delta: DeltaTime) -> Vec<HookError> {
        let mut systems = world.scheduler.take();
        let mut failures = Vec::new();

        for scheduled in systems.iter_mut() {
            if !world.index.contains(scheduled.id) {
                continue;
            }
            let result = match stage {
                Stage::Init if scheduled.initialized => continue,
                Stage::Init => {
                    scheduled.initialized = true;
                    scheduled.system.init(world)
                }
                Stage::Update => match world.index.snapshot(scheduled.id) {
                    Ok(entities) => scheduled.system.update(world, &entities, delta),
                    Err(error) => Err(error.into()),
                },
                Stage::Cleanup => match scheduled.cleanup(world) {
                    Some(result) => result,
                    None => continue,
                },
            };
            report(&mut failures, scheduled, stage, result);
        }

        let (kept, removed): (Vec<_>, Vec<_>) = systems
            .into_iter()
            .partition(|scheduled| world.index.contains(scheduled.id));
        world.scheduler.restore(kept);

        for mut scheduled in removed {
            if let Some(result) = scheduled.cleanup(world) {
                report(&mut failures, &scheduled, Stage::Cleanup, result);
            }
        }
        failures
    }
}

impl Scheduled {
    /// Calls cleanup hook if the system was initialized.
    pub(crate) fn cleanup(&mut self, world: &mut World) -> Option<HookResult> {
        if !self.initialized {
            return None;
        }
        self.initialized = false;
        Some(self.system.cleanup(world))
    }
}

fn report(failures: &mut Vec<HookError>, scheduled: &Scheduled, stage: Stage, result: HookResult) {
    if let Err(source) = result {
        let name = scheduled.system.name().to_string();
        log::error!("system `{}` failed on {}: {}", name, stage, source);
        failures.push(HookError {
            system: scheduled.id,
            name,
            stage,
            source,
        });
    }
}
