//! Тюнинг физики платформера
//!
//! Один `PhysicsConfig` resource на мир. Значения по умолчанию подобраны
//! под прототип: 1 unit ≈ 1 m, персонаж-сфера радиусом 0.5.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Допуск для контакта "стоит на поверхности" (float drift после snap)
pub const CONTACT_EPSILON: f32 = 1e-3;

/// Политика против tunneling через тонкие платформы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Одна проверка за кадр: нижняя точка должна оказаться внутри
    /// `[min_y, max_y]` платформы. Быстрое падение / низкий FPS могут
    /// проскочить тонкую платформу (известный gap, сохранён для parity).
    #[default]
    Discrete,
    /// Landing засчитывается, если нижняя точка пересекла верхнюю грань
    /// за кадр, независимо от толщины платформы.
    Swept,
}

#[derive(Resource, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Ускорение свободного падения (m/s², положительное, тянет вниз)
    pub gravity: f32,
    /// Максимальная скорость падения (m/s)
    pub terminal_velocity: f32,
    /// velocity.y сразу после прыжка (m/s)
    pub jump_impulse: f32,
    /// Прыжков до приземления (2 = double jump)
    pub max_jumps: u32,
    /// Окно coyote time после схода с платформы (секунды)
    pub coyote_time: f32,
    /// Горизонтальное ускорение от input (m/s²)
    pub move_acceleration: f32,
    /// Лимит горизонтальной скорости (m/s)
    pub max_horizontal_speed: f32,
    /// Множитель velocity.xz за кадр на земле, < 1
    pub ground_friction: f32,
    /// Множитель velocity.xz за кадр в воздухе, ближе к 1
    pub air_resistance: f32,
    /// Неявная плоскость y = 0 бесконечной площади
    pub ground_plane: bool,
    /// Переносить актора вместе с kinematic платформой, на которой он стоит
    pub carry_on_kinematic: bool,
    pub collision_policy: CollisionPolicy,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 20.0,
            terminal_velocity: 50.0,
            jump_impulse: 8.0,
            max_jumps: 2,
            coyote_time: 0.1,
            move_acceleration: 40.0,
            max_horizontal_speed: 6.0,
            ground_friction: 0.85,
            air_resistance: 0.98,
            ground_plane: true,
            carry_on_kinematic: true,
            collision_policy: CollisionPolicy::Discrete,
        }
    }
}

impl PhysicsConfig {
    /// Частичный JSON поверх defaults (`{"max_jumps": 1}`)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Проверка тюнинга, на котором держатся инварианты интегратора
    ///
    /// Damping: `0 ≤ ground_friction < air_resistance < 1`, иначе скорость
    /// меняет знак или не затухает. Отрицательный `coyote_time` дал бы
    /// отрицательный coyote timer после landing.
    pub fn validate(&self) -> Result<(), &'static str> {
        let values = [
            self.gravity,
            self.terminal_velocity,
            self.jump_impulse,
            self.coyote_time,
            self.move_acceleration,
            self.max_horizontal_speed,
            self.ground_friction,
            self.air_resistance,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err("all physics values must be finite");
        }

        if self.gravity <= 0.0 {
            return Err("gravity must be > 0");
        }
        if self.terminal_velocity <= 0.0 {
            return Err("terminal_velocity must be > 0");
        }
        if self.jump_impulse <= 0.0 {
            return Err("jump_impulse must be > 0");
        }
        if self.coyote_time < 0.0 {
            return Err("coyote_time must be >= 0");
        }
        if self.move_acceleration < 0.0 {
            return Err("move_acceleration must be >= 0");
        }
        if self.max_horizontal_speed < 0.0 {
            return Err("max_horizontal_speed must be >= 0");
        }
        if !(self.ground_friction >= 0.0 && self.ground_friction < self.air_resistance && self.air_resistance < 1.0) {
            return Err("damping must satisfy 0 <= ground_friction < air_resistance < 1");
        }

        Ok(())
    }
}
