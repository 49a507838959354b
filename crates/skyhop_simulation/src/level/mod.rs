//! Описание уровня: платформы + точки спавна + (опционально) тюнинг физики
//!
//! Формат: JSON через serde. Читает файл / качает уровень хост, сюда
//! приходит уже строка. Платформы валидируются до попадания в `PlatformSet`,
//! чтобы resolver и интегратор могли считать инварианты выполненными.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::ActorState;
use crate::physics::{PhysicsConfig, PlatformProxy, PlatformSet};

pub const DEFAULT_ACTOR_RADIUS: f32 = 0.5;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("platform #{index}: {reason}")]
    InvalidPlatform { index: usize, reason: &'static str },

    #[error("spawn point #{index}: {reason}")]
    InvalidSpawn { index: usize, reason: &'static str },

    #[error("physics override: {reason}")]
    InvalidPhysics { reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlatformSpec {
    Static {
        position: [f32; 3],
        size: [f32; 3],
    },
    Kinematic {
        position: [f32; 3],
        size: [f32; 3],
        path_start: [f32; 3],
        path_end: [f32; 3],
        speed: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: [f32; 3],
    #[serde(default = "default_actor_radius")]
    pub radius: f32,
}

fn default_actor_radius() -> f32 {
    DEFAULT_ACTOR_RADIUS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub physics: Option<PhysicsConfig>,
    /// Порядок = порядок проверки коллизий
    pub platforms: Vec<PlatformSpec>,
    #[serde(default)]
    pub spawn_points: Vec<SpawnPoint>,
}

fn is_finite_vec(v: [f32; 3]) -> bool {
    v.iter().all(|c| c.is_finite())
}

fn validate_platform(spec: &PlatformSpec) -> Result<(), &'static str> {
    let (position, size) = match spec {
        PlatformSpec::Static { position, size } => (*position, *size),
        PlatformSpec::Kinematic { position, size, .. } => (*position, *size),
    };

    if !is_finite_vec(position) {
        return Err("position must be finite");
    }
    if !is_finite_vec(size) || size.iter().any(|c| *c <= 0.0) {
        return Err("size must be finite and > 0 on every axis");
    }

    if let PlatformSpec::Kinematic {
        path_start,
        path_end,
        speed,
        ..
    } = spec
    {
        if !is_finite_vec(*path_start) || !is_finite_vec(*path_end) {
            return Err("path endpoints must be finite");
        }
        if Vec3::from_array(*path_start).distance(Vec3::from_array(*path_end)) <= f32::EPSILON {
            return Err("kinematic path has zero length");
        }
        if !speed.is_finite() || *speed <= 0.0 {
            return Err("speed must be finite and > 0");
        }
    }

    Ok(())
}

impl LevelConfig {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: LevelConfig = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if let Some(physics) = &self.physics {
            physics.validate().map_err(|reason| LevelError::InvalidPhysics { reason })?;
        }

        for (index, spec) in self.platforms.iter().enumerate() {
            validate_platform(spec).map_err(|reason| LevelError::InvalidPlatform { index, reason })?;
        }

        for (index, spawn) in self.spawn_points.iter().enumerate() {
            if !is_finite_vec(spawn.position) {
                return Err(LevelError::InvalidSpawn {
                    index,
                    reason: "position must be finite",
                });
            }
            if !spawn.radius.is_finite() || spawn.radius <= 0.0 {
                return Err(LevelError::InvalidSpawn {
                    index,
                    reason: "radius must be finite and > 0",
                });
            }
        }

        Ok(())
    }

    pub fn physics_config(&self) -> PhysicsConfig {
        self.physics.clone().unwrap_or_default()
    }

    /// Платформы в порядке уровня
    pub fn build_platforms(&self) -> Result<PlatformSet, LevelError> {
        self.validate()?;

        let mut set = PlatformSet::new();
        for spec in &self.platforms {
            match *spec {
                PlatformSpec::Static { position, size } => {
                    set.insert_static(Vec3::from_array(position), Vec3::from_array(size));
                }
                PlatformSpec::Kinematic {
                    position,
                    size,
                    path_start,
                    path_end,
                    speed,
                } => {
                    set.insert_kinematic(
                        Vec3::from_array(position),
                        Vec3::from_array(size),
                        Vec3::from_array(path_start),
                        Vec3::from_array(path_end),
                        speed,
                    );
                }
            }
        }

        Ok(set)
    }

    /// Демо-уровень шаблона: пол, стопка платформ, лифт и паром
    pub fn demo() -> Self {
        Self {
            physics: None,
            platforms: vec![
                PlatformSpec::Static {
                    position: [0.0, -0.5, 0.0],
                    size: [30.0, 1.0, 30.0],
                },
                PlatformSpec::Static {
                    position: [4.0, 1.0, 0.0],
                    size: [4.0, 0.5, 4.0],
                },
                PlatformSpec::Static {
                    position: [4.0, 3.0, 0.0],
                    size: [2.0, 0.5, 2.0],
                },
                PlatformSpec::Kinematic {
                    position: [-4.0, 1.0, 0.0],
                    size: [2.0, 0.5, 2.0],
                    path_start: [-4.0, 1.0, 0.0],
                    path_end: [-4.0, 6.0, 0.0],
                    speed: 1.5,
                },
                PlatformSpec::Kinematic {
                    position: [0.0, 2.0, -6.0],
                    size: [3.0, 0.5, 3.0],
                    path_start: [-6.0, 2.0, -6.0],
                    path_end: [6.0, 2.0, -6.0],
                    speed: 2.0,
                },
            ],
            spawn_points: vec![SpawnPoint {
                position: [0.0, 5.0, 0.0],
                radius: DEFAULT_ACTOR_RADIUS,
            }],
        }
    }
}

/// Загружает уровень в ECS world
///
/// Заменяет `PhysicsConfig` и `PlatformSet` resources, спавнит proxy для
/// каждой платформы и актора на каждую точку спавна. Возвращает акторов
/// в порядке spawn points.
pub fn load_level(world: &mut World, level: &LevelConfig) -> Result<Vec<Entity>, LevelError> {
    let platforms = level.build_platforms()?;
    let config = level.physics_config();

    // Id платформ нового уровня снова с 0: старые proxy иначе прицепятся к ним
    let stale: Vec<Entity> = world
        .query_filtered::<Entity, With<PlatformProxy>>()
        .iter(world)
        .collect();
    for entity in stale {
        world.despawn(entity);
    }

    for platform in platforms.iter() {
        world.spawn((
            PlatformProxy(platform.id),
            Transform::from_translation(platform.position),
        ));
    }

    let mut actors = Vec::with_capacity(level.spawn_points.len());
    for (index, spawn) in level.spawn_points.iter().enumerate() {
        let position = Vec3::from_array(spawn.position);
        let actor = ActorState::new(position, spawn.radius, &config).ok_or(LevelError::InvalidSpawn {
            index,
            reason: "radius must be finite and > 0",
        })?;
        actors.push(world.spawn((actor, Transform::from_translation(position))).id());
    }

    crate::logger::log_info(&format!(
        "Level loaded: {} platforms ({} kinematic), {} actors",
        platforms.len(),
        platforms.iter().filter(|p| p.is_kinematic()).count(),
        actors.len()
    ));

    world.insert_resource(config);
    world.insert_resource(platforms);

    Ok(actors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PlatformId, PlatformKind};

    const LEVEL_JSON: &str = r#"{
        "physics": { "max_jumps": 1 },
        "platforms": [
            { "kind": "static", "position": [0, -0.5, 0], "size": [10, 1, 10] },
            { "kind": "kinematic", "position": [0, 2, 0], "size": [2, 0.5, 2],
              "path_start": [0, 2, 0], "path_end": [5, 2, 0], "speed": 1.5 }
        ],
        "spawn_points": [ { "position": [0, 3, 0] } ]
    }"#;

    #[test]
    fn test_parse_level_json() {
        let level = LevelConfig::from_json(LEVEL_JSON).unwrap();
        assert_eq!(level.platforms.len(), 2);
        assert_eq!(level.spawn_points[0].radius, DEFAULT_ACTOR_RADIUS);

        let config = level.physics_config();
        assert_eq!(config.max_jumps, 1);
        assert_eq!(config.gravity, PhysicsConfig::default().gravity);

        let set = level.build_platforms().unwrap();
        assert_eq!(set.len(), 2);
        assert!(matches!(set.as_slice()[0].kind, PlatformKind::Static));
        assert!(set.as_slice()[1].is_kinematic());
    }

    #[test]
    fn test_rejects_zero_size_platform() {
        let json = r#"{ "platforms": [ { "kind": "static", "position": [0, 0, 0], "size": [1, 0, 1] } ] }"#;
        match LevelConfig::from_json(json) {
            Err(LevelError::InvalidPlatform { index, .. }) => assert_eq!(index, 0),
            other => panic!("expected InvalidPlatform, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_length_path_and_speed() {
        let zero_path = r#"{ "platforms": [ { "kind": "kinematic", "position": [0, 0, 0], "size": [1, 1, 1],
            "path_start": [1, 1, 1], "path_end": [1, 1, 1], "speed": 1 } ] }"#;
        assert!(matches!(
            LevelConfig::from_json(zero_path),
            Err(LevelError::InvalidPlatform { index: 0, .. })
        ));

        let zero_speed = r#"{ "platforms": [ { "kind": "kinematic", "position": [0, 0, 0], "size": [1, 1, 1],
            "path_start": [0, 0, 0], "path_end": [1, 0, 0], "speed": 0 } ] }"#;
        assert!(matches!(
            LevelConfig::from_json(zero_speed),
            Err(LevelError::InvalidPlatform { index: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_spawn_radius() {
        let json = r#"{ "platforms": [], "spawn_points": [ { "position": [0, 1, 0], "radius": -1 } ] }"#;
        assert!(matches!(
            LevelConfig::from_json(json),
            Err(LevelError::InvalidSpawn { index: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_physics_override() {
        let overrides = [
            r#"{ "ground_friction": -0.5 }"#,
            r#"{ "coyote_time": -1.0 }"#,
            r#"{ "ground_friction": 0.99, "air_resistance": 0.9 }"#,
            r#"{ "air_resistance": 1.0 }"#,
            r#"{ "gravity": 0 }"#,
            r#"{ "jump_impulse": -1 }"#,
            r#"{ "terminal_velocity": 0 }"#,
            r#"{ "max_horizontal_speed": -2 }"#,
        ];

        for physics in overrides {
            let json = format!(r#"{{ "physics": {}, "platforms": [] }}"#, physics);
            assert!(
                matches!(LevelConfig::from_json(&json), Err(LevelError::InvalidPhysics { .. })),
                "override {} must be rejected",
                physics
            );
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(LevelConfig::from_json("{ not json"), Err(LevelError::Parse(_))));
    }

    #[test]
    fn test_demo_level_roundtrips_through_json() {
        let demo = LevelConfig::demo();
        let json = demo.to_json().unwrap();
        assert_eq!(LevelConfig::from_json(&json).unwrap(), demo);
    }

    #[test]
    fn test_load_level_into_world() {
        let mut world = World::new();
        let level = LevelConfig::from_json(LEVEL_JSON).unwrap();
        let actors = load_level(&mut world, &level).unwrap();

        assert_eq!(actors.len(), 1);
        assert_eq!(world.resource::<PlatformSet>().len(), 2);
        assert_eq!(world.resource::<PhysicsConfig>().max_jumps, 1);

        let actor = world.get::<ActorState>(actors[0]).unwrap();
        assert_eq!(actor.position, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(actor.jumps_remaining, 1);

        let proxies = world.query::<&PlatformProxy>().iter(&world).count();
        assert_eq!(proxies, 2);
    }

    #[test]
    fn test_reload_replaces_platform_proxies() {
        let mut world = World::new();
        load_level(&mut world, &LevelConfig::demo()).unwrap();
        assert_eq!(world.query::<&PlatformProxy>().iter(&world).count(), 5);

        let level = LevelConfig::from_json(LEVEL_JSON).unwrap();
        load_level(&mut world, &level).unwrap();

        let mut ids: Vec<_> = world.query::<&PlatformProxy>().iter(&world).map(|p| p.0).collect();
        ids.sort();
        assert_eq!(ids, vec![PlatformId(0), PlatformId(1)]);
    }
}
