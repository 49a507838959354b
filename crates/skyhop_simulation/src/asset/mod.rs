//! Нормализация загруженных 3D моделей
//!
//! Скачанные модели приходят в произвольном масштабе (сантиметры, дюймы,
//! "как экспортировал художник"). Downstream код считает 1 unit ≈ 1 m,
//! поэтому каждую модель один раз приводим к target size:
//! translate(center_offset) → scale(scale_factor).
//!
//! Загрузка и декод файлов: вне ядра: сюда приходят уже готовые вершины
//! или raw bounding box.

use bevy::math::DVec3;
use bevy::prelude::*;
use thiserror::Error;

use crate::geometry::{AxisAlignedBox, DEGENERATE_EXTENT_EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AssetError {
    /// Нулевой объём (точка или пустая геометрия): рендерить нельзя,
    /// вызывающий подставляет fallback ассет.
    #[error("degenerate asset bounds: max extent {max_extent} has no volume")]
    Degenerate { max_extent: f32 },

    #[error("target size must be finite and > 0, got {0}")]
    InvalidTargetSize(f32),

    #[error("asset has no vertices")]
    EmptyGeometry,
}

/// Результат нормализации: translate by `center_offset`, затем uniform scale
///
/// Хранится и применяется в f64: маленькая модель далеко от origin в f32
/// теряет центр на половине ulp координаты, а scale потом раздувает ошибку.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Normalization {
    pub scale_factor: f64,
    pub center_offset: DVec3,
}

impl Normalization {
    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        ((point.as_dvec3() + self.center_offset) * self.scale_factor).as_vec3()
    }

    pub fn apply_box(&self, bounds: &AxisAlignedBox) -> AxisAlignedBox {
        AxisAlignedBox::from_corners(self.apply_point(bounds.min()), self.apply_point(bounds.max()))
    }
}

/// Считает scale + offset, переводящие `raw_bounds` в box с центром в origin
/// и максимальным extent = `target_size`.
///
/// Чистая функция. Вырожденный box: ошибка, а не scale 0/∞.
pub fn normalize(raw_bounds: &AxisAlignedBox, target_size: f32) -> Result<Normalization, AssetError> {
    if !target_size.is_finite() || target_size <= 0.0 {
        return Err(AssetError::InvalidTargetSize(target_size));
    }

    // f32 → f64 точно, сумма и разность двух f32 в f64 тоже точные
    let min = raw_bounds.min().as_dvec3();
    let max = raw_bounds.max().as_dvec3();
    let max_extent = (max - min).max_element();
    if !(max_extent > DEGENERATE_EXTENT_EPSILON as f64) {
        return Err(AssetError::Degenerate {
            max_extent: max_extent as f32,
        });
    }

    Ok(Normalization {
        scale_factor: target_size as f64 / max_extent,
        center_offset: -(min + max) * 0.5,
    })
}

/// Загруженная и нормализованная модель
///
/// Создаётся один раз на load, дальше immutable. `Copy`: все placements
/// (клоны меша: забота рендера) читают одно и то же значение.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ModelAsset {
    raw_bounds: AxisAlignedBox,
    target_size: f32,
    normalization: Normalization,
}

impl ModelAsset {
    /// Из raw вершин: bounding box считается здесь один раз и кэшируется
    pub fn from_vertices<I>(vertices: I, target_size: f32) -> Result<Self, AssetError>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let raw_bounds = AxisAlignedBox::from_points(vertices).ok_or(AssetError::EmptyGeometry)?;
        Self::from_bounds(raw_bounds, target_size)
    }

    pub fn from_bounds(raw_bounds: AxisAlignedBox, target_size: f32) -> Result<Self, AssetError> {
        let normalization = normalize(&raw_bounds, target_size)?;
        Ok(Self {
            raw_bounds,
            target_size,
            normalization,
        })
    }

    pub fn raw_bounds(&self) -> AxisAlignedBox {
        self.raw_bounds
    }

    pub fn target_size(&self) -> f32 {
        self.target_size
    }

    pub fn scale_factor(&self) -> f32 {
        self.normalization.scale_factor as f32
    }

    pub fn center_offset(&self) -> Vec3 {
        self.normalization.center_offset.as_vec3()
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Bounds после нормализации (центр в origin)
    pub fn normalized_bounds(&self) -> AxisAlignedBox {
        self.normalization.apply_box(&self.raw_bounds)
    }

    /// Transform для одного instance с центром модели в `position`
    ///
    /// world = position + scale · (p + offset) = (position + scale · offset) + scale · p
    pub fn placement(&self, position: Vec3) -> Transform {
        let scale = self.normalization.scale_factor;
        let shift = (self.normalization.center_offset * scale).as_vec3();
        Transform {
            translation: position + shift,
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(scale as f32),
        }
    }

    /// Placement, при котором нижняя грань модели стоит на `floor_point.y`
    pub fn grounded_placement(&self, floor_point: Vec3) -> Transform {
        let half_height = self.normalized_bounds().extent().y * 0.5;
        self.placement(floor_point + Vec3::Y * half_height)
    }
}
