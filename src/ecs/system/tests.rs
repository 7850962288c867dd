#![cfg(test)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use super::{
    super::{
        ComponentManager, Entity, EntityCreated, EntityDestroyed, EntityRegistry, Signature, World,
    },
    *,
};
use crate::error::{Error, HookResult, Stage};

#[derive(Debug, Default)]
struct Position;

#[derive(Debug, Default)]
struct Velocity;

fn set(entities: &[Entity]) -> BTreeSet<Entity> {
    entities.iter().copied().collect()
}

#[test]
fn test_index_seeds_existing_entities() {
    let mut components = ComponentManager::new(8);
    let position = components.register::<Position>().unwrap();
    let velocity = components.register::<Velocity>().unwrap();
    let mut entities = EntityRegistry::new();

    let moving = entities.create();
    components.attach(&mut entities, moving, Position).unwrap();
    components.attach(&mut entities, moving, Velocity).unwrap();
    let standing = entities.create();
    components.attach(&mut entities, standing, Position).unwrap();
    let empty = entities.create();

    let mut index = SignatureIndex::new();
    let both = index.register([position, velocity].into_iter().collect(), &entities);
    let placed = index.register([position].into_iter().collect(), &entities);
    let any = index.register(Signature::new(), &entities);

    assert_eq!(index.entities(both).unwrap(), &set(&[moving]));
    assert_eq!(index.entities(placed).unwrap(), &set(&[moving, standing]));
    assert_eq!(index.entities(any).unwrap(), &set(&[moving, standing, empty]));
    assert_eq!(index.len(), 3);
}

#[test]
fn test_index_follows_events() {
    let mut components = ComponentManager::new(8);
    let position = components.register::<Position>().unwrap();
    let velocity = components.register::<Velocity>().unwrap();
    let mut entities = EntityRegistry::new();

    let mut index = SignatureIndex::new();
    let both = index.register([position, velocity].into_iter().collect(), &entities);
    let any = index.register(Signature::new(), &entities);

    let entity = entities.create();
    index.entity_created(&EntityCreated { entity }, &entities);
    assert!(index.entities(both).unwrap().is_empty());
    assert_eq!(index.entities(any).unwrap(), &set(&[entity]));

    let event = components.attach(&mut entities, entity, Position).unwrap();
    index.component_added(&event, &entities);
    assert!(index.entities(both).unwrap().is_empty());

    let event = components.attach(&mut entities, entity, Velocity).unwrap();
    index.component_added(&event, &entities);
    assert_eq!(index.snapshot(both).unwrap(), vec![entity]);

    let (_, event) = components.detach::<Position>(&mut entities, entity).unwrap();
    index.component_removed(&event, &entities);
    assert!(index.entities(both).unwrap().is_empty());
    assert_eq!(index.entities(any).unwrap(), &set(&[entity]));

    entities.destroy(entity).unwrap();
    index.entity_destroyed(&EntityDestroyed { entity });
    assert!(index.entities(any).unwrap().is_empty());
}

#[test]
fn test_index_unregister() {
    let entities = EntityRegistry::new();
    let mut index = SignatureIndex::new();
    let system = index.register(Signature::new(), &entities);

    assert!(index.contains(system));
    index.unregister(system).unwrap();
    assert!(!index.contains(system));
    assert_eq!(index.unregister(system), Err(Error::UnknownSystem(system)));
    assert_eq!(index.required(system), Err(Error::UnknownSystem(system)));
    assert!(index.is_empty());
}

/// Records calls of its hooks into the shared journal.
struct Recorder {
    label: &'static str,
    journal: Rc<RefCell<Vec<String>>>,
    fail_on: Option<Stage>,
}

impl Recorder {
    fn new(label: &'static str, journal: &Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            label,
            journal: Rc::clone(journal),
            fail_on: None,
        }
    }

    fn failing(mut self, stage: Stage) -> Self {
        self.fail_on = Some(stage);
        self
    }

    fn record(&self, stage: Stage) -> HookResult {
        self.journal
            .borrow_mut()
            .push(format!("{} {}", self.label, stage));
        if self.fail_on == Some(stage) {
            return Err(format!("{} refused to {}", self.label, stage).into());
        }
        Ok(())
    }
}

impl System for Recorder {
    type Required = ();

    fn name(&self) -> &str {
        self.label
    }

    fn on_init(&mut self, _world: &mut World) -> HookResult {
        self.record(Stage::Init)
    }

    fn on_update(&mut self, _world: &mut World, _entities: &[Entity], _delta: DeltaTime) -> HookResult {
        self.record(Stage::Update)
    }

    fn on_cleanup(&mut self, _world: &mut World) -> HookResult {
        self.record(Stage::Cleanup)
    }
}

fn journal() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}

#[test]
fn test_hooks_run_in_registration_order() {
    let journal = journal();
    let mut world = World::new();
    world.register_system(Recorder::new("first", &journal)).unwrap();
    world.register_system(Recorder::new("second", &journal)).unwrap();

    assert!(world.init().is_empty());
    assert!(world.update(DeltaTime::from_millis(16)).is_empty());
    assert!(world.cleanup().is_empty());

    assert_eq!(
        *journal.borrow(),
        vec![
            "first init",
            "second init",
            "first update",
            "second update",
            "first cleanup",
            "second cleanup",
        ],
    );
    assert!(world.systems().is_empty());
    assert!(!world.systems().is_initialized());
}

#[test]
fn test_failing_hook_does_not_stop_others() {
    let journal = journal();
    let mut world = World::new();
    let broken = world
        .register_system(Recorder::new("broken", &journal).failing(Stage::Update))
        .unwrap();
    world.register_system(Recorder::new("healthy", &journal)).unwrap();
    world.init();

    let failures = world.update(DeltaTime::ZERO);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].system, broken);
    assert_eq!(failures[0].name, "broken");
    assert_eq!(failures[0].stage, Stage::Update);
    assert_eq!(failures[0].source.to_string(), "broken refused to update");
    assert_eq!(journal.borrow().last().map(String::as_str), Some("healthy update"));

    // The failing system stays scheduled.
    assert_eq!(world.update(DeltaTime::ZERO).len(), 1);
    assert_eq!(world.systems().len(), 2);
}

#[test]
fn test_system_registered_after_init_is_initialized() {
    let journal = journal();
    let mut world = World::new();
    world.register_system(Recorder::new("early", &journal)).unwrap();
    world.init();
    world.register_system(Recorder::new("late", &journal)).unwrap();
    world.update(DeltaTime::ZERO);

    assert_eq!(
        *journal.borrow(),
        vec!["early init", "late init", "early update", "late update"],
    );
}

#[test]
fn test_unregister_calls_cleanup() {
    let journal = journal();
    let mut world = World::new();
    let idle = world.register_system(Recorder::new("idle", &journal)).unwrap();
    world.unregister_system(idle).unwrap();
    // Never initialized, so nothing to clean up.
    assert!(journal.borrow().is_empty());

    let running = world.register_system(Recorder::new("running", &journal)).unwrap();
    world.init();
    world.unregister_system(running).unwrap();
    assert_eq!(*journal.borrow(), vec!["running init", "running cleanup"]);

    assert_eq!(
        world.unregister_system(running),
        Err(Error::UnknownSystem(running)),
    );
    assert!(world.systems().is_empty());
}

#[test]
fn test_system_downcast() {
    let journal = journal();
    let mut world = World::new();
    let id = world.register_system(Recorder::new("recorder", &journal)).unwrap();

    assert_eq!(world.systems().name(id), Some("recorder"));
    assert!(world.system::<Recorder>(id).is_some());
    assert!(world.system::<Counter>(id).is_none());
    world.system_mut::<Recorder>(id).unwrap().fail_on = Some(Stage::Init);
    assert_eq!(world.init().len(), 1);
}

/// Counts entities it was handed and detaches their velocity.
#[derive(Default)]
struct Counter {
    seen: Vec<usize>,
}

impl System for Counter {
    type Required = (Position, Velocity);

    fn on_update(&mut self, world: &mut World, entities: &[Entity], _delta: DeltaTime) -> HookResult {
        self.seen.push(entities.len());
        for &entity in entities {
            world.detach::<Velocity>(entity)?;
            // Still present in the snapshot, already gone from the world.
            assert!(!world.has::<Velocity>(entity)?);
        }
        Ok(())
    }
}

#[test]
fn test_update_uses_snapshot() {
    let mut world = World::new();
    world.register::<Position>().unwrap();
    world.register::<Velocity>().unwrap();
    for _ in 0..3 {
        let entity = world.create();
        world.attach(entity, Position).unwrap();
        world.attach(entity, Velocity).unwrap();
    }

    let id = world.register_system(Counter::default()).unwrap();
    world.init();
    assert!(world.update(DeltaTime::ZERO).is_empty());
    assert!(world.system_entities(id).unwrap().is_empty());
    assert!(world.update(DeltaTime::ZERO).is_empty());

    assert_eq!(world.system::<Counter>(id).unwrap().seen, vec![3, 0]);
}

#[test]
fn test_register_requires_known_components() {
    let mut world = World::new();
    world.register::<Position>().unwrap();

    assert!(matches!(
        world.register_system(Counter::default()),
        Err(Error::UnregisteredComponentType { .. }),
    ));
    assert!(world.systems().is_empty());
}

/// Unregisters another system on its first update.
struct Remover {
    target: Option<SystemId>,
}

impl System for Remover {
    type Required = ();

    fn on_update(&mut self, world: &mut World, _entities: &[Entity], _delta: DeltaTime) -> HookResult {
        if let Some(target) = self.target.take() {
            world.unregister_system(target)?;
        }
        Ok(())
    }
}

#[test]
fn test_system_unregistered_during_update_is_skipped() {
    let journal = journal();
    let mut world = World::new();
    let remover = world.register_system(Remover { target: None }).unwrap();
    let victim = world.register_system(Recorder::new("victim", &journal)).unwrap();
    world.system_mut::<Remover>(remover).unwrap().target = Some(victim);
    world.init();

    assert!(world.update(DeltaTime::ZERO).is_empty());
    assert_eq!(*journal.borrow(), vec!["victim init", "victim cleanup"]);
    assert_eq!(world.systems().ids().collect::<Vec<_>>(), vec![remover]);
}

/// Unregisters its target from the hook of given stage.
struct Evictor {
    recorder: Recorder,
    stage: Stage,
    target: Option<SystemId>,
}

impl Evictor {
    fn hook(&mut self, world: &mut World, stage: Stage) -> HookResult {
        self.recorder.record(stage)?;
        if stage == self.stage {
            if let Some(target) = self.target.take() {
                world.unregister_system(target)?;
            }
        }
        Ok(())
    }
}

impl System for Evictor {
    type Required = ();

    fn name(&self) -> &str {
        self.recorder.label
    }

    fn on_init(&mut self, world: &mut World) -> HookResult {
        self.hook(world, Stage::Init)
    }

    fn on_update(&mut self, world: &mut World, _entities: &[Entity], _delta: DeltaTime) -> HookResult {
        self.hook(world, Stage::Update)
    }

    fn on_cleanup(&mut self, world: &mut World) -> HookResult {
        self.hook(world, Stage::Cleanup)
    }
}

fn evicting_world(stage: Stage, journal: &Rc<RefCell<Vec<String>>>) -> World {
    let mut world = World::new();
    let evictor = world
        .register_system(Evictor {
            recorder: Recorder::new("evictor", journal),
            stage,
            target: None,
        })
        .unwrap();
    let victim = world.register_system(Recorder::new("victim", journal)).unwrap();
    world.system_mut::<Evictor>(evictor).unwrap().target = Some(victim);
    world
}

#[test]
fn test_system_unregistered_during_init_is_never_cleaned_up() {
    let journal = journal();
    let mut world = evicting_world(Stage::Init, &journal);

    assert!(world.init().is_empty());
    assert_eq!(world.systems().len(), 1);
    assert!(world.cleanup().is_empty());
    assert_eq!(*journal.borrow(), vec!["evictor init", "evictor cleanup"]);
}

#[test]
fn test_system_unregistered_during_cleanup_is_cleaned_up() {
    let journal = journal();
    let mut world = evicting_world(Stage::Cleanup, &journal);

    assert!(world.init().is_empty());
    assert!(world.cleanup().is_empty());
    assert_eq!(
        *journal.borrow(),
        vec!["evictor init", "victim init", "evictor cleanup", "victim cleanup"],
    );
    assert!(world.systems().is_empty());
}

#[test]
fn test_repeated_init_calls_init_hooks_once() {
    let journal = journal();
    let mut world = World::new();
    world.register_system(Recorder::new("recorder", &journal)).unwrap();

    world.init();
    world.init();
    world.cleanup();
    world.cleanup();
    assert_eq!(*journal.borrow(), vec!["recorder init", "recorder cleanup"]);
}

/// Registers another system from its cleanup hook.
struct Spawner {
    recorder: Recorder,
}

impl System for Spawner {
    type Required = ();

    fn on_update(&mut self, _world: &mut World, _entities: &[Entity], _delta: DeltaTime) -> HookResult {
        Ok(())
    }

    fn on_cleanup(&mut self, world: &mut World) -> HookResult {
        self.recorder.record(Stage::Cleanup)?;
        world.register_system(Recorder::new("late", &self.recorder.journal))?;
        Ok(())
    }
}

#[test]
fn test_system_registered_during_cleanup_is_not_initialized() {
    let journal = journal();
    let mut world = World::new();
    world
        .register_system(Spawner {
            recorder: Recorder::new("spawner", &journal),
        })
        .unwrap();

    world.init();
    assert!(world.cleanup().is_empty());
    assert_eq!(*journal.borrow(), vec!["spawner cleanup"]);
    assert!(world.systems().is_empty());
}

/// Looks its peer up while its own hook is running.
struct Lookup {
    peer: SystemId,
    found: Option<bool>,
}

impl System for Lookup {
    type Required = ();

    fn on_update(&mut self, world: &mut World, _entities: &[Entity], _delta: DeltaTime) -> HookResult {
        self.found = Some(world.system::<Recorder>(self.peer).is_some());
        Ok(())
    }
}

#[test]
fn test_systems_are_unavailable_while_hooks_run() {
    let journal = journal();
    let mut world = World::new();
    let peer = world.register_system(Recorder::new("peer", &journal)).unwrap();
    let lookup = world
        .register_system(Lookup { peer, found: None })
        .unwrap();

    world.update(DeltaTime::ZERO);
    assert_eq!(world.system::<Lookup>(lookup).unwrap().found, Some(false));
    assert!(world.system::<Recorder>(peer).is_some());
}
