//! Collision resolver: сфера актора против платформ
//!
//! Горизонталь: box vs box (сфера как квадрат 2r по X/Z), вертикаль -
//! нижняя точка сферы против `[min_y, max_y]` платформы. Стен нет:
//! боковое проникновение не разрешается.
//!
//! Tie-break: из всех платформ под актором выигрывает та, у которой верхняя
//! грань выше всех, но не выше позиции актора до шага. Наивное
//! "первое совпадение" роняет актора сквозь верхнюю платформу на нижнюю,
//! когда платформы стоят стопкой.
//!
//! `CollisionPolicy::Discrete` решает только, есть ли landing вообще: нижняя
//! точка должна оказаться внутри хотя бы одной опоры (или у земли). Какая
//! опора выигрывает, решает tie-break по всем пересечённым верхним граням,
//! так что тонкая верхняя платформа в стопке не теряется.

use bevy::prelude::*;

use crate::components::{ActorState, Support};
use crate::physics::config::{CollisionPolicy, PhysicsConfig, CONTACT_EPSILON};
use crate::physics::platforms::Platform;

/// Найденная опора: куда ставить актора
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub top: f32,
    pub support: Support,
}

/// Ищет поверхность, на которую актор приземляется в этом кадре
///
/// `previous_position`: центр актора до интеграции (после carry).
/// Платформы проверяются в порядке слайса; при равной высоте остаётся
/// первая. Плоскость земли (если включена) проверяется последней.
pub fn find_landing(
    actor: &ActorState,
    previous_position: Vec3,
    platforms: &[Platform],
    config: &PhysicsConfig,
) -> Option<Landing> {
    // Поднимаемся: приземления нет
    if actor.velocity.y > 0.0 {
        return None;
    }

    let bottom = actor.bottom();
    let previous_bottom = previous_position.y - actor.radius;
    let mut best: Option<Landing> = None;
    let mut caught = config.collision_policy == CollisionPolicy::Swept;

    for platform in platforms {
        let bounds = platform.bounds();
        if !bounds.overlaps_horizontal(actor.position, actor.radius) {
            continue;
        }

        let top = bounds.max().y;

        // Верх платформы выше актора до шага: мы под ней или сбоку
        if previous_bottom < top - CONTACT_EPSILON {
            continue;
        }
        // Ещё не долетели
        if bottom > top + CONTACT_EPSILON {
            continue;
        }
        // Тонкую платформу можно проскочить целиком за кадр: она сама актора
        // не ловит, но участвует в tie-break, если поймала другая опора
        if bottom >= bounds.min().y {
            caught = true;
        }

        if best.map_or(true, |b| top > b.top) {
            best = Some(Landing {
                top,
                support: Support::Platform(platform.id),
            });
        }
    }

    // Земля: полупространство y ≤ 0 бесконечной площади
    if config.ground_plane && bottom <= CONTACT_EPSILON {
        caught = true;
        if best.map_or(true, |b| 0.0 > b.top) {
            best = Some(Landing {
                top: 0.0,
                support: Support::Ground,
            });
        }
    }

    best.filter(|_| caught)
}

/// Разрешает tentative позицию актора после интеграции
///
/// Никогда не падает: без опоры актор просто становится airborne.
pub fn resolve(
    mut actor: ActorState,
    previous_position: Vec3,
    platforms: &[Platform],
    config: &PhysicsConfig,
) -> ActorState {
    match find_landing(&actor, previous_position, platforms, config) {
        Some(landing) => {
            actor.position.y = landing.top + actor.radius;
            actor.velocity.y = 0.0;
            actor.grounded = true;
            actor.jumps_remaining = config.max_jumps;
            actor.coyote_timer = config.coyote_time;
            actor.support = Some(landing.support);
        }
        None => {
            actor.grounded = false;
            actor.support = None;
        }
    }

    actor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PlatformSet;

    fn falling_actor(position: Vec3, velocity_y: f32) -> ActorState {
        let mut actor = ActorState::new(position, 0.5, &PhysicsConfig::default()).unwrap();
        actor.velocity.y = velocity_y;
        actor
    }

    fn no_ground() -> PhysicsConfig {
        PhysicsConfig {
            ground_plane: false,
            ..default()
        }
    }

    #[test]
    fn test_lands_on_platform_top() {
        let mut set = PlatformSet::new();
        let id = set.insert_static(Vec3::new(0.0, 1.0, 0.0), Vec3::new(4.0, 1.0, 4.0)); // top = 1.5

        let previous = Vec3::new(0.0, 2.2, 0.0);
        let actor = falling_actor(Vec3::new(0.0, 1.9, 0.0), -5.0); // bottom 1.4
        let config = no_ground();
        let resolved = resolve(actor, previous, set.as_slice(), &config);

        assert!(resolved.grounded);
        assert_eq!(resolved.position.y, 2.0);
        assert_eq!(resolved.velocity.y, 0.0);
        assert_eq!(resolved.jumps_remaining, config.max_jumps);
        assert_eq!(resolved.coyote_timer, config.coyote_time);
        assert_eq!(resolved.support, Some(Support::Platform(id)));
    }

    #[test]
    fn test_rising_actor_passes_through() {
        let mut set = PlatformSet::new();
        set.insert_static(Vec3::new(0.0, 1.0, 0.0), Vec3::new(4.0, 1.0, 4.0));

        let actor = falling_actor(Vec3::new(0.0, 1.9, 0.0), 3.0);
        let resolved = resolve(actor, Vec3::new(0.0, 1.7, 0.0), set.as_slice(), &no_ground());
        assert!(!resolved.grounded);
        assert_eq!(resolved.position.y, 1.9);
    }

    #[test]
    fn test_stacked_platforms_pick_highest_reachable() {
        // Нижняя широкая платформа первой в списке: наивный resolver выбрал бы её
        let mut set = PlatformSet::new();
        let _low = set.insert_static(Vec3::new(0.0, 0.5, 0.0), Vec3::new(6.0, 1.0, 6.0)); // top 1.0
        let high = set.insert_static(Vec3::new(0.0, 1.5, 0.0), Vec3::new(2.0, 1.0, 2.0)); // top 2.0

        // За кадр нижняя точка прошла сквозь обе верхние грани (Swept)
        let config = PhysicsConfig {
            ground_plane: false,
            collision_policy: CollisionPolicy::Swept,
            ..default()
        };
        let actor = falling_actor(Vec3::new(0.0, 1.2, 0.0), -20.0); // bottom 0.7
        let resolved = resolve(actor, Vec3::new(0.0, 2.8, 0.0), set.as_slice(), &config);

        assert_eq!(resolved.support, Some(Support::Platform(high)));
        assert_eq!(resolved.position.y, 2.5);
    }

    #[test]
    fn test_fast_fall_onto_thin_platform_stacked_over_thick_one() {
        // Верхняя тонкая [1.8, 2.0] над толстой [0, 1.7], default config
        let mut set = PlatformSet::new();
        let _thick = set.insert_static(Vec3::new(0.0, 0.85, 0.0), Vec3::new(4.0, 1.7, 4.0));
        let thin = set.insert_static(Vec3::new(0.0, 1.9, 0.0), Vec3::new(2.0, 0.2, 2.0));

        // Нижняя точка 2.1 → 1.5 за кадр: тонкую проскочили, толстая поймала
        let actor = falling_actor(Vec3::new(0.0, 2.0, 0.0), -36.0);
        let config = PhysicsConfig::default();
        let resolved = resolve(actor, Vec3::new(0.0, 2.6, 0.0), set.as_slice(), &config);

        assert!(resolved.grounded);
        assert_eq!(resolved.support, Some(Support::Platform(thin)));
        assert!((resolved.position.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_platform_above_previous_position_ignored() {
        // Актор под потолочной платформой не телепортируется наверх
        let mut set = PlatformSet::new();
        set.insert_static(Vec3::new(0.0, 3.0, 0.0), Vec3::new(4.0, 4.0, 4.0)); // [1, 5]

        let actor = falling_actor(Vec3::new(0.0, 1.6, 0.0), -1.0);
        let resolved = resolve(actor, Vec3::new(0.0, 1.7, 0.0), set.as_slice(), &no_ground());
        assert!(!resolved.grounded);
    }

    #[test]
    fn test_equal_height_tie_goes_to_first() {
        let mut set = PlatformSet::new();
        let first = set.insert_static(Vec3::new(-0.5, 0.5, 0.0), Vec3::new(2.0, 1.0, 2.0));
        let _second = set.insert_static(Vec3::new(0.5, 0.5, 0.0), Vec3::new(2.0, 1.0, 2.0));

        let actor = falling_actor(Vec3::new(0.0, 1.4, 0.0), -1.0);
        let resolved = resolve(actor, Vec3::new(0.0, 1.6, 0.0), set.as_slice(), &PhysicsConfig::default());
        assert_eq!(resolved.support, Some(Support::Platform(first)));
    }

    #[test]
    fn test_platform_at_ground_height_wins_over_ground() {
        let mut set = PlatformSet::new();
        let slab = set.insert_static(Vec3::new(0.0, -0.5, 0.0), Vec3::new(2.0, 1.0, 2.0)); // top 0

        let actor = falling_actor(Vec3::new(0.0, 0.4, 0.0), -2.0);
        let resolved = resolve(actor, Vec3::new(0.0, 0.6, 0.0), set.as_slice(), &PhysicsConfig::default());
        assert_eq!(resolved.support, Some(Support::Platform(slab)));
    }

    #[test]
    fn test_ground_plane_catches_everything_else() {
        let set = PlatformSet::new();
        let actor = falling_actor(Vec3::new(100.0, -3.0, -40.0), -30.0);
        let resolved = resolve(actor, Vec3::new(100.0, 0.7, -40.0), set.as_slice(), &PhysicsConfig::default());

        assert!(resolved.grounded);
        assert_eq!(resolved.support, Some(Support::Ground));
        assert_eq!(resolved.position.y, 0.5);
    }

    #[test]
    fn test_horizontal_miss_stays_airborne() {
        let mut set = PlatformSet::new();
        set.insert_static(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 2.0));

        // Центр в 1.6 от центра платформы по X: 1.6 − 0.5 > 1.0: мимо
        let actor = falling_actor(Vec3::new(1.6, 1.9, 0.0), -1.0);
        let resolved = resolve(actor, Vec3::new(1.6, 2.1, 0.0), set.as_slice(), &no_ground());
        assert!(!resolved.grounded);
        assert_eq!(resolved.support, None);
    }

    #[test]
    fn test_discrete_policy_can_tunnel_thin_platform() {
        let mut set = PlatformSet::new();
        set.insert_static(Vec3::new(0.0, 2.0, 0.0), Vec3::new(4.0, 0.1, 4.0)); // [1.95, 2.05]

        // За кадр нижняя точка прошла от 3.0 до 1.0
        let previous = Vec3::new(0.0, 3.5, 0.0);
        let actor = falling_actor(Vec3::new(0.0, 1.5, 0.0), -120.0);

        let discrete = resolve(actor, previous, set.as_slice(), &no_ground());
        assert!(!discrete.grounded, "discrete policy keeps the known tunneling gap");

        let swept = PhysicsConfig {
            collision_policy: CollisionPolicy::Swept,
            ..no_ground()
        };
        let resolved = resolve(actor, previous, set.as_slice(), &swept);
        assert!(resolved.grounded);
        assert!((resolved.position.y - 2.55).abs() < 1e-5);
    }
}
