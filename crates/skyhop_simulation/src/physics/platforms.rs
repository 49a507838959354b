//! Платформы уровня: static + kinematic (движутся по отрезку туда-обратно)
//!
//! Порядок в `PlatformSet` = порядок, заданный уровнем. Collision resolver
//! проходит платформы именно в нём (tie-break при равной высоте).

use bevy::prelude::*;

use crate::geometry::AxisAlignedBox;

/// Стабильный id платформы внутри одного `PlatformSet` (не переиспользуется)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct PlatformId(pub u32);

/// Направление движения по пути: к `path_end` или к `path_start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PathDirection {
    TowardEnd,
    TowardStart,
}

impl PathDirection {
    pub fn sign(&self) -> f32 {
        match self {
            PathDirection::TowardEnd => 1.0,
            PathDirection::TowardStart => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum PlatformKind {
    Static,
    /// Scripted движение по `[path_start, path_end]` со скоростью `speed` (m/s)
    Kinematic {
        path_start: Vec3,
        path_end: Vec3,
        speed: f32,
        direction: PathDirection,
        /// Пройденное расстояние от `path_start` (0..=длина пути)
        progress: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Platform {
    pub id: PlatformId,
    /// Центр
    pub position: Vec3,
    /// Полный размер по осям
    pub size: Vec3,
    pub kind: PlatformKind,
    /// Смещение за последний `advance` (для static всегда 0)
    pub last_displacement: Vec3,
}

impl Platform {
    pub fn bounds(&self) -> AxisAlignedBox {
        AxisAlignedBox::from_center_size(self.position, self.size)
    }

    /// Y верхней грани (на неё приземляется актор)
    pub fn top(&self) -> f32 {
        self.position.y + self.size.y.abs() * 0.5
    }

    pub fn is_kinematic(&self) -> bool {
        matches!(self.kind, PlatformKind::Kinematic { .. })
    }

    /// Сдвигает kinematic платформу на `speed · dt` вдоль пути
    ///
    /// Дойдя до конца (или перескочив его), платформа встаёт ровно в конечную
    /// точку и разворачивается. Остаток шага не переносится, так что
    /// последовательность позиций детерминирована для заданной серии dt.
    pub fn advance(&mut self, dt: f32) {
        if !(dt > 0.0) {
            self.last_displacement = Vec3::ZERO;
            return;
        }

        let PlatformKind::Kinematic {
            path_start,
            path_end,
            speed,
            direction,
            progress,
        } = &mut self.kind
        else {
            self.last_displacement = Vec3::ZERO;
            return;
        };

        let path = *path_end - *path_start;
        let length = path.length();
        if length <= f32::EPSILON {
            self.last_displacement = Vec3::ZERO;
            return;
        }

        let mut next = *progress + direction.sign() * *speed * dt;
        if next >= length {
            next = length;
            *direction = PathDirection::TowardStart;
        } else if next <= 0.0 {
            next = 0.0;
            *direction = PathDirection::TowardEnd;
        }
        *progress = next;

        let previous = self.position;
        self.position = *path_start + path * (next / length);
        self.last_displacement = self.position - previous;
    }
}

/// Упорядоченный набор платформ уровня (ECS resource)
///
/// Во время шага акторов читается только на чтение: все акторы кадра видят
/// одни и те же позиции платформ.
#[derive(Resource, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct PlatformSet {
    platforms: Vec<Platform>,
    next_id: u32,
}

impl PlatformSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> PlatformId {
        let id = PlatformId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert_static(&mut self, position: Vec3, size: Vec3) -> PlatformId {
        let id = self.allocate_id();
        self.platforms.push(Platform {
            id,
            position,
            size,
            kind: PlatformKind::Static,
            last_displacement: Vec3::ZERO,
        });
        id
    }

    /// Kinematic платформа; стартовая позиция проецируется на путь
    pub fn insert_kinematic(&mut self, position: Vec3, size: Vec3, path_start: Vec3, path_end: Vec3, speed: f32) -> PlatformId {
        let path = path_end - path_start;
        let length_squared = path.length_squared();
        let t = if length_squared > f32::EPSILON {
            ((position - path_start).dot(path) / length_squared).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let id = self.allocate_id();
        self.platforms.push(Platform {
            id,
            position: path_start + path * t,
            size,
            kind: PlatformKind::Kinematic {
                path_start,
                path_end,
                speed,
                direction: PathDirection::TowardEnd,
                progress: t * length_squared.sqrt(),
            },
            last_displacement: Vec3::ZERO,
        });
        id
    }

    /// Удаление между кадрами; id больше не выдаётся
    pub fn remove(&mut self, id: PlatformId) -> Option<Platform> {
        let index = self.platforms.iter().position(|p| p.id == id)?;
        Some(self.platforms.remove(index))
    }

    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn as_slice(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Шаг kinematic платформ (первая фаза кадра, до акторов)
    pub fn advance(&mut self, dt: f32) {
        for platform in &mut self.platforms {
            platform.advance(dt);
        }
    }
}
