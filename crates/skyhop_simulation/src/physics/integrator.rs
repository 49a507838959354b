//! Интегратор актора: один вызов `step` на кадр
//!
//! Порядок внутри шага фиксирован:
//! 0. carry kinematic платформой (если актор на ней стоит)
//! 1. горизонтальное ускорение от input + лимит скорости
//! 2. гравитация и coyote timer (только в воздухе)
//! 3. прыжок
//! 4. explicit Euler: position += velocity · dt
//! 5. collision resolver
//! 6. damping горизонтальной скорости
//!
//! Одна проверка коллизий на кадр: при `CollisionPolicy::Discrete` быстрое
//! падение через тонкую платформу возможно (tunneling). Sub-stepping -
//! задача хоста: вызвать `step` несколько раз с меньшим dt.

use crate::components::{ActorState, Controls, Support};
use crate::geometry::clamp_horizontal;
use crate::physics::collision::resolve;
use crate::physics::config::PhysicsConfig;
use crate::physics::platforms::Platform;

/// Продвигает актора на `dt` секунд
///
/// Тотальная функция: ошибок нет, недоступный прыжок просто игнорируется.
/// `dt ≤ 0` (или NaN): пустой кадр, состояние не меняется.
pub fn step(actor: &mut ActorState, dt: f32, controls: &Controls, platforms: &[Platform], config: &PhysicsConfig) {
    if !(dt > 0.0) {
        return;
    }

    carry_with_platform(actor, platforms, config);

    // 1. Input → горизонтальная скорость
    let wish = controls.wish_direction();
    actor.velocity += wish * (config.move_acceleration * dt);
    actor.velocity = clamp_horizontal(actor.velocity, config.max_horizontal_speed);

    // 2. Гравитация + coyote
    if !actor.grounded {
        actor.velocity.y = (actor.velocity.y - config.gravity * dt).max(-config.terminal_velocity);
        tick_coyote(actor, dt, config);
    }

    // 3. Прыжок
    try_jump(actor, controls, config);

    // 4. Explicit Euler
    let previous_position = actor.position;
    actor.position += actor.velocity * dt;

    // 5. Коллизии
    *actor = resolve(*actor, previous_position, platforms, config);

    // 6. Damping
    let damping = if actor.grounded {
        config.ground_friction
    } else {
        config.air_resistance
    };
    actor.velocity.x *= damping;
    actor.velocity.z *= damping;
}

/// Переносит стоящего актора на смещение его kinematic платформы
fn carry_with_platform(actor: &mut ActorState, platforms: &[Platform], config: &PhysicsConfig) {
    if !config.carry_on_kinematic || !actor.grounded {
        return;
    }

    let Some(Support::Platform(id)) = actor.support else {
        return;
    };

    if let Some(platform) = platforms.iter().find(|p| p.id == id) {
        actor.position += platform.last_displacement;
    }
}

/// Coyote window в воздухе
///
/// Окно истекло, а прыжок с поверхности так и не потрачен (сошли с края) -
/// этот прыжок сгорает. Иначе его можно было бы "придержать" до середины
/// падения. Оставшиеся air jumps сохраняются.
fn tick_coyote(actor: &mut ActorState, dt: f32, config: &PhysicsConfig) {
    if actor.coyote_timer <= 0.0 {
        return;
    }

    actor.coyote_timer = (actor.coyote_timer - dt).max(0.0);
    if actor.coyote_timer == 0.0 && actor.jumps_remaining == config.max_jumps {
        actor.jumps_remaining = actor.jumps_remaining.saturating_sub(1);
    }
}

/// Прыжок: мгновенная правка velocity.y, не отдельное состояние
///
/// Разрешён на земле, в coyote window или как air jump (один прыжок в этом
/// полёте уже потрачен): и только пока `jumps_remaining > 0`.
fn try_jump(actor: &mut ActorState, controls: &Controls, config: &PhysicsConfig) {
    if !controls.jump_requested || actor.jumps_remaining == 0 {
        return;
    }

    let air_jump = actor.jumps_remaining < config.max_jumps;
    if !(actor.grounded || actor.coyote_timer > 0.0 || air_jump) {
        return;
    }

    actor.velocity.y = config.jump_impulse;
    actor.jumps_remaining -= 1;
    actor.coyote_timer = 0.0;
    actor.grounded = false;
    actor.support = None;
}
