//! Headless host loop which drives the entity component runtime for a few ticks.

use std::error::Error;

use log::LevelFilter;

use atlas_ecs::config::Config;
use atlas_ecs::ecs::{ComponentAdded, DeltaTime, Entity, System};
use atlas_ecs::error::HookResult;
use atlas_ecs::World;

mod logger;

const APP_NAME: &str = env!("CARGO_CRATE_NAME", "library must be compiled by Cargo");
const APP_VERSION_STR: &str = env!("CARGO_PKG_VERSION", "library must be compiled by Cargo");

const TICKS: u32 = 5;
const TICK: DeltaTime = DeltaTime::from_millis(16);

/// Position, rotation and scale of the game object.
#[derive(Debug, Clone, Copy)]
struct Transform {
    position: [f32; 3],
    rotation: [f32; 3],
    scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

/// Handle of the mesh owned by the rendering backend.
#[derive(Debug, Clone, Copy)]
struct Mesh(u32);

/// Marks objects under the cursor.
#[derive(Debug, Default, Clone, Copy)]
struct Hover;

/// Spins every object around its vertical axis.
struct Spin {
    speed: f32,
}

impl System for Spin {
    type Required = (Transform,);

    fn on_update(&mut self, world: &mut World, entities: &[Entity], delta: DeltaTime) -> HookResult {
        for &entity in entities {
            let transform = world.get_mut::<Transform>(entity)?;
            transform.rotation[1] += self.speed * delta.as_secs_f32();
        }
        Ok(())
    }
}

/// Collects transforms of visible meshes, the way a renderer would.
#[derive(Default)]
struct Draw {
    frames: u32,
}

impl System for Draw {
    type Required = (Transform, Mesh);

    fn on_init(&mut self, _world: &mut World) -> HookResult {
        log::info!("draw system ready");
        Ok(())
    }

    fn on_update(&mut self, world: &mut World, entities: &[Entity], _delta: DeltaTime) -> HookResult {
        self.frames += 1;
        for &entity in entities {
            let Mesh(handle) = *world.get::<Mesh>(entity)?;
            let transform = world.get::<Transform>(entity)?;
            log::trace!(
                "frame {}: mesh {} at {:?} rotated {:?} scaled {:?}",
                self.frames,
                handle,
                transform.position,
                transform.rotation,
                transform.scale,
            );
        }
        Ok(())
    }

    fn on_cleanup(&mut self, _world: &mut World) -> HookResult {
        log::info!("draw system rendered {} frames", self.frames);
        Ok(())
    }
}

/// Moves the hover marker to the next mesh every tick.
struct Hovering {
    candidates: Vec<Entity>,
    current: usize,
}

impl System for Hovering {
    type Required = (Hover,);

    fn on_update(&mut self, world: &mut World, entities: &[Entity], _delta: DeltaTime) -> HookResult {
        for &entity in entities {
            world.detach::<Hover>(entity)?;
        }
        if self.candidates.is_empty() {
            return Ok(());
        }
        self.current = (self.current + 1) % self.candidates.len();
        world.attach_default::<Hover>(self.candidates[self.current])?;
        Ok(())
    }
}

/// Entry point of the demo host loop
fn main() -> Result<(), Box<dyn Error>> {
    let _handle = logger::init(LevelFilter::Debug)?;
    log::info!("logger initialized successfully");

    let version = APP_VERSION_STR.parse()?;
    let config = Config::new(APP_NAME.to_string(), version);
    let mut world = World::with_config(config);

    world.register::<Transform>()?;
    world.register::<Mesh>()?;
    world.register::<Hover>()?;

    world.events_mut().subscribe(|event: &ComponentAdded| {
        log::trace!("{:?} gained component bit {}", event.entity, event.component.index());
    });

    let mut meshes = Vec::new();
    for handle in 0..3 {
        let entity = world.create();
        world.attach(
            entity,
            Transform {
                position: [handle as f32, 0.0, 0.0],
                ..Transform::default()
            },
        )?;
        world.attach(entity, Mesh(handle))?;
        meshes.push(entity);
    }
    let marker = world.create();
    world.attach_default::<Transform>(marker)?;
    world.attach_default::<Hover>(meshes[0])?;

    world.register_system(Spin { speed: 1.5 })?;
    world.register_system(Draw::default())?;
    world.register_system(Hovering {
        candidates: meshes.clone(),
        current: 0,
    })?;

    for failure in world.init() {
        log::warn!("{}", failure);
    }
    for tick in 0..TICKS {
        for failure in world.update(TICK) {
            log::warn!("tick {}: {}", tick, failure);
        }
    }
    log::debug!("world state:\n{}", world.signature_report());

    world.destroy(marker)?;
    for failure in world.cleanup() {
        log::warn!("{}", failure);
    }
    log::info!("closing this application");
    Ok(())
}
