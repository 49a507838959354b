//! Skyhop Simulation Core
//!
//! Ядро 3D платформера на Bevy 0.16 ECS (headless)
//!
//! - physics: интегратор актора, collision resolver, kinematic платформы
//! - asset: нормализация bounding box моделей (scale + center)
//! - level: JSON описание уровня → PlatformSet + акторы
//!
//! Рендер, input и камера живут в хосте: ядро читает `Controls`
//! и пишет `ActorState` / `Transform`.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

// Публичные модули
pub mod asset;
pub mod components;
pub mod geometry;
pub mod level;
pub mod logger;
pub mod physics;

// Re-export базовых типов для удобства
pub use asset::{normalize, AssetError, ModelAsset, Normalization};
pub use components::*;
pub use geometry::AxisAlignedBox;
pub use level::{load_level, LevelConfig, LevelError};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use physics::{
    step, CollisionPolicy, PhysicsConfig, Platform, PlatformId, PlatformKind, PlatformSet, PlatformerPhysicsPlugin,
    PlatformerPhysicsSet,
};

/// Частота симуляции по умолчанию
pub const DEFAULT_TICK_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz, хост может перезаписать resource своим
            .insert_resource(Time::<Fixed>::from_hz(DEFAULT_TICK_HZ))
            .register_type::<ModelAsset>()
            .add_plugins(PlatformerPhysicsPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время идёт вручную: каждый `app.update()` = ровно один fixed tick
/// (кроме самого первого, у него delta = 0). Wall clock не участвует,
/// поэтому прогон детерминирован.
pub fn create_headless_app(tick_hz: f64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, SimulationPlugin))
        // Поверх дефолтного tick из SimulationPlugin
        .insert_resource(Time::<Fixed>::from_hz(tick_hz))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / tick_hz)));

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Компоненты сериализуются через Debug, отсортированы по Entity index.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
