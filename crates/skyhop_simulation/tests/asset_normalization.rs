//! Property-based тесты нормализации ассетов

use bevy::prelude::*;
use proptest::prelude::*;
use skyhop_simulation::{normalize, AssetError, AxisAlignedBox, ModelAsset};

fn corner() -> impl Strategy<Value = Vec3> {
    (-1000.0f32..1000.0, -1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn far_corner() -> impl Strategy<Value = Vec3> {
    (-20000.0f32..20000.0, -20000.0f32..20000.0, -20000.0f32..20000.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn box_at(min: Vec3, major: f32, ry: f32, rz: f32) -> AxisAlignedBox {
    AxisAlignedBox::from_corners(min, min + Vec3::new(major, major * ry, major * rz))
}

/// Модели "обычного" размера около origin
fn moderate_box() -> impl Strategy<Value = AxisAlignedBox> {
    (corner(), 1.0f32..500.0, 0.0f32..1.0, 0.0f32..1.0).prop_map(|(min, major, ry, rz)| box_at(min, major, ry, rz))
}

/// Любой не вырожденный box, включая крошечные модели далеко от origin
fn solid_box() -> impl Strategy<Value = AxisAlignedBox> {
    prop_oneof![
        moderate_box(),
        (far_corner(), 0.01f32..1.0, 0.0f32..1.0, 0.0f32..1.0).prop_map(|(min, major, ry, rz)| box_at(min, major, ry, rz)),
    ]
}

proptest! {
    #[test]
    fn normalized_box_has_target_extent_and_centered(raw in solid_box(), target in 0.01f32..100.0) {
        let n = normalize(&raw, target).unwrap();
        let out = n.apply_box(&raw);

        let tolerance = 1e-4 * target;
        prop_assert!((out.max_extent() - target).abs() <= tolerance,
            "max extent {} vs target {}", out.max_extent(), target);
        prop_assert!(out.center().abs().max_element() <= tolerance,
            "center {:?} for raw {:?}", out.center(), raw);
    }

    #[test]
    fn normalization_preserves_proportions(raw in moderate_box(), target in 0.01f32..100.0) {
        let model = ModelAsset::from_bounds(raw, target).unwrap();
        let before = raw.extent() / raw.max_extent();
        let after = model.normalized_bounds().extent() / model.normalized_bounds().max_extent();
        prop_assert!((before - after).abs().max_element() < 1e-3);
    }

    #[test]
    fn point_box_is_always_degenerate(p in far_corner(), target in 0.01f32..100.0) {
        let point = AxisAlignedBox::from_corners(p, p);
        let degenerate = matches!(normalize(&point, target), Err(AssetError::Degenerate { .. }));
        prop_assert!(degenerate);
    }

    #[test]
    fn placement_puts_center_at_position(raw in moderate_box(), target in 0.1f32..10.0, position in corner()) {
        let model = ModelAsset::from_bounds(raw, target).unwrap();
        let placed = model.placement(position).transform_point(raw.center());
        let tolerance = 1e-3 * (raw.center().abs().max_element() * model.scale_factor()).max(position.abs().max_element()).max(1.0);
        prop_assert!((placed - position).abs().max_element() <= tolerance,
            "placed {:?} vs {:?}", placed, position);
    }
}
