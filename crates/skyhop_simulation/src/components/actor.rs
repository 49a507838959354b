//! Актор платформера: ActorState + Controls

use bevy::prelude::*;

use crate::physics::{PhysicsConfig, PlatformId};

/// Поверхность, на которой стоит актор
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Support {
    /// Неявная плоскость y = 0
    Ground,
    Platform(PlatformId),
}

/// Grounded / Airborne (производное от `ActorState::grounded`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorPhase {
    Grounded,
    Airborne,
}

/// Kinematic состояние одного актора
///
/// Создаётся при spawn, меняется только `physics::step`, удаляется вместе
/// с entity. Коллизия: сфера радиуса `radius` с центром в `position`.
///
/// Инварианты: `radius > 0`, `jumps_remaining ≤ max_jumps`, `coyote_timer ≥ 0`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Controls, Transform)]
pub struct ActorState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    pub jumps_remaining: u32,
    /// Секунды, в течение которых прыжок ещё разрешён после схода с платформы
    pub coyote_timer: f32,
    pub radius: f32,
    pub support: Option<Support>,
}

impl ActorState {
    /// Актор в покое в `position`, в воздухе до первого landing
    ///
    /// `None` если радиус не положительный (нарушение контракта вызывающего:
    /// `step` считает радиус валидным и не проверяет его).
    pub fn new(position: Vec3, radius: f32, config: &PhysicsConfig) -> Option<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return None;
        }

        Some(Self {
            position,
            velocity: Vec3::ZERO,
            grounded: false,
            jumps_remaining: config.max_jumps,
            coyote_timer: 0.0,
            radius,
            support: None,
        })
    }

    pub fn phase(&self) -> ActorPhase {
        if self.grounded {
            ActorPhase::Grounded
        } else {
            ActorPhase::Airborne
        }
    }

    /// Нижняя точка сферы
    pub fn bottom(&self) -> f32 {
        self.position.y - self.radius
    }
}

/// Input snapshot одного кадра
///
/// Заполняется снаружи (клавиатура / touch / AI / replay). Ядро только читает.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub struct Controls {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump_requested: bool,
}

impl Controls {
    pub const IDLE: Self = Self {
        forward: false,
        back: false,
        left: false,
        right: false,
        jump_requested: false,
    };

    pub const JUMP: Self = Self {
        jump_requested: true,
        ..Self::IDLE
    };

    /// Сумма единичных вкладов: forward = −Z, back = +Z, left = −X, right = +X
    ///
    /// Не нормализуется: диагональ даёт длину √2, лимит скорости режет потом.
    pub fn wish_direction(&self) -> Vec3 {
        let mut wish = Vec3::ZERO;
        if self.forward {
            wish.z -= 1.0;
        }
        if self.back {
            wish.z += 1.0;
        }
        if self.left {
            wish.x -= 1.0;
        }
        if self.right {
            wish.x += 1.0;
        }
        wish
    }

    pub fn has_horizontal_input(&self) -> bool {
        self.wish_direction() != Vec3::ZERO
    }
}
