//! ECS обвязка физики: системы FixedUpdate + plugin
//!
//! Порядок кадра (chain, менять нельзя: на нём держится детерминизм):
//! 1. advance_platforms: kinematic платформы двигаются
//! 2. step_actors: все акторы шагают против замороженного `PlatformSet`
//! 3. sync_*_transforms: зеркалим состояние в Transform для рендера
//!
//! Акторы независимы друг от друга (платформы read-only весь шаг),
//! поэтому step_actors идёт через `par_iter_mut`.

use bevy::prelude::*;
use std::sync::Mutex;

use crate::components::{ActorPhase, ActorState, Controls};
use crate::logger::{log, log_level, LogLevel};
use crate::physics::config::PhysicsConfig;
use crate::physics::integrator::step;
use crate::physics::platforms::{PlatformId, PlatformSet};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformerPhysicsSet {
    AdvancePlatforms,
    StepActors,
    SyncTransforms,
}

/// Визуальный proxy платформы: Transform следует за платформой из `PlatformSet`
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct PlatformProxy(pub PlatformId);

/// Система: шаг kinematic платформ
pub fn advance_platforms(mut platforms: ResMut<PlatformSet>, time: Res<Time<Fixed>>) {
    platforms.advance(time.delta_secs());
}

/// Система: шаг всех акторов (integrate + resolve + commit)
///
/// Переходы grounded / airborne собираются во время параллельного прохода
/// и логируются после него, чтобы worker потоки не ходили в глобальный logger.
pub fn step_actors(
    mut actors: Query<(Entity, &mut ActorState, &Controls)>,
    platforms: Res<PlatformSet>,
    config: Res<PhysicsConfig>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();
    let platforms = platforms.as_slice();
    let config = &*config;
    let trace = log_level() <= LogLevel::Debug;
    let transitions: Mutex<Vec<(Entity, ActorPhase, Vec3)>> = Mutex::new(Vec::new());

    actors.par_iter_mut().for_each(|(entity, mut actor, controls)| {
        let was_grounded = actor.grounded;
        step(&mut actor, dt, controls, platforms, config);

        if trace && actor.grounded != was_grounded {
            if let Ok(mut list) = transitions.lock() {
                list.push((entity, actor.phase(), actor.position));
            }
        }
    });

    let mut transitions = transitions.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    transitions.sort_by_key(|(entity, _, _)| entity.index());
    for (entity, phase, position) in transitions {
        log(&format!("Actor {:?}: {:?} at {:?}", entity, phase, position));
    }
}

/// Система: ActorState.position → Transform.translation
pub fn sync_actor_transforms(mut actors: Query<(&ActorState, &mut Transform), Changed<ActorState>>) {
    for (actor, mut transform) in actors.iter_mut() {
        transform.translation = actor.position;
    }
}

/// Система: позиции платформ → Transform их proxy
pub fn sync_platform_transforms(
    platforms: Res<PlatformSet>,
    mut proxies: Query<(&PlatformProxy, &mut Transform)>,
) {
    for (proxy, mut transform) in proxies.iter_mut() {
        match platforms.get(proxy.0) {
            Some(platform) => transform.translation = platform.position,
            None => crate::logger::log_warning(&format!(
                "PlatformProxy: platform {:?} not found in PlatformSet",
                proxy.0
            )),
        }
    }
}

/// Plugin физики платформера
///
/// Регистрирует `PhysicsConfig` / `PlatformSet` (если хост не вставил свои)
/// и системы в FixedUpdate.
pub struct PlatformerPhysicsPlugin;

impl Plugin for PlatformerPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsConfig>()
            .init_resource::<PlatformSet>()
            .register_type::<ActorState>()
            .register_type::<Controls>()
            .register_type::<PlatformProxy>()
            .register_type::<PhysicsConfig>()
            .register_type::<PlatformSet>();

        app.configure_sets(
            FixedUpdate,
            (
                PlatformerPhysicsSet::AdvancePlatforms,
                PlatformerPhysicsSet::StepActors,
                PlatformerPhysicsSet::SyncTransforms,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                advance_platforms.in_set(PlatformerPhysicsSet::AdvancePlatforms),
                step_actors.in_set(PlatformerPhysicsSet::StepActors),
                (sync_actor_transforms, sync_platform_transforms).in_set(PlatformerPhysicsSet::SyncTransforms),
            ),
        );
    }
}

/// Spawn helper для актора
///
/// `None` при невалидном радиусе (см. `ActorState::new`).
pub fn spawn_actor(commands: &mut Commands, position: Vec3, radius: f32, config: &PhysicsConfig) -> Option<Entity> {
    let actor = ActorState::new(position, radius, config)?;
    let entity = commands
        .spawn((
            actor,
            Controls::default(),
            Transform::from_translation(position),
        ))
        .id();

    log(&format!("Spawned actor {:?} at {:?} (radius {})", entity, position, radius));
    Some(entity)
}
