//! Геометрия: AABB и мелкая векторная математика
//!
//! Vec3 берём из bevy (glam): value type, component-wise операции.
//! Все длины в метрах (1 unit ≈ 1 m), f32.

use bevy::prelude::*;

/// Extent ниже этого порога считается нулевым (точка / плоскость без объёма)
pub const DEGENERATE_EXTENT_EPSILON: f32 = 1e-6;

/// Axis-aligned bounding box
///
/// Инвариант: `min ≤ max` по каждой оси. Конструкторы сами упорядочивают углы,
/// поэтому невалидный box создать нельзя. Вырожденный box (нулевой extent)
/// допустим как значение, но распознаётся через `is_degenerate`.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AxisAlignedBox {
    min: Vec3,
    max: Vec3,
}

impl AxisAlignedBox {
    /// Box из двух произвольных углов (порядок компонент не важен)
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box по центру и полному размеру (size = max − min)
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Минимальный box, содержащий все точки. Один проход по вершинам.
    ///
    /// `None` для пустого набора.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;

        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Полный размер по осям (max − min)
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        self.extent().max_element()
    }

    pub fn is_degenerate(&self) -> bool {
        self.max_extent() <= DEGENERATE_EXTENT_EPSILON
    }

    /// Overlap с другим box (касание гранями считается overlap)
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Горизонтальный overlap с вертикальным столбом радиуса `radius` вокруг `point`
    ///
    /// Проверяются только X и Z: `[x − r, x + r] ∩ [min_x, max_x]`, то же для z.
    pub fn overlaps_horizontal(&self, point: Vec3, radius: f32) -> bool {
        intervals_overlap(point.x - radius, point.x + radius, self.min.x, self.max.x)
            && intervals_overlap(point.z - radius, point.z + radius, self.min.z, self.max.z)
    }
}

fn intervals_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_min <= b_max && b_min <= a_max
}

/// Ограничивает горизонтальную (XZ) длину вектора, сохраняя направление
///
/// Y не трогаем (вертикаль: зона гравитации и прыжков).
pub fn clamp_horizontal(v: Vec3, max_length: f32) -> Vec3 {
    let horizontal = Vec2::new(v.x, v.z);
    let length = horizontal.length();
    if length <= max_length || length <= f32::EPSILON {
        return v;
    }

    let scaled = horizontal * (max_length / length);
    Vec3::new(scaled.x, v.y, scaled.y)
}

pub fn horizontal_speed(v: Vec3) -> f32 {
    Vec2::new(v.x, v.z).length()
}
