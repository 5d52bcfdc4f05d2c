//! Property-based tests for bed3d
//!
//! These tests use proptest to generate random bed outlines and verify the
//! query and bounding-box invariants hold across a wide range of inputs.

mod common;

use bed3d::geometry::{Point2d, Point3d};
use bed3d::geometry_builder::grid_segments;
use bed3d::polygon_clipping::closest_point_on_ring;
use bed3d::{BedCatalog, BedConfig, BedContour, BedShape, classify};
use common::scripted_bed;
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

/// Convex bed: regular polygon with random centre, radius and vertex count
fn convex_bed_strategy() -> impl Strategy<Value = (Point2d, f64, BedShape)> {
    (-500.0f64..500.0, -500.0f64..500.0, 20.0f64..400.0, 3usize..48).prop_map(
        |(cx, cy, radius, segments)| {
            let center = Point2d::new(cx, cy);
            (center, radius, BedShape::circle(center, radius, segments))
        },
    )
}

/// Arbitrary polygon, possibly self-intersecting or degenerate
fn any_shape_strategy() -> impl Strategy<Value = BedShape> {
    prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), 0..12)
        .prop_map(|points| BedShape::from_xy(&points))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_interior_points_are_contained(
        (center, _radius, shape) in convex_bed_strategy(),
        t in 0.0f64..0.95,
        vertex in 0usize..48,
    ) {
        let (mut bed, _) = scripted_bed(BedConfig::new());
        bed.set_shape(&shape, 100.0, "", "", false);

        let v = shape.points()[vertex % shape.len()];
        let p = center + (v - center) * t;
        prop_assert!(bed.contains(&p), "Interior point {:?} not contained", p);
        prop_assert_eq!(bed.point_projection(&p), p);
    }

    #[test]
    fn prop_far_points_are_not_contained(
        (center, radius, shape) in convex_bed_strategy(),
        angle in 0.0f64..std::f64::consts::TAU,
        extra in 1.0f64..1000.0,
    ) {
        let config = BedConfig::new();
        let distance = radius + config.collision_margin() + extra;
        let (mut bed, _) = scripted_bed(config);
        bed.set_shape(&shape, 100.0, "", "", false);

        let p = Point2d::new(center.x + distance * angle.cos(), center.y + distance * angle.sin());
        prop_assert!(!bed.contains(&p), "Far point {:?} contained", p);

        // Projection lands on the collision outline
        let projected = bed.point_projection(&p);
        let on_outline = closest_point_on_ring(&projected, bed.collision_polygon()).unwrap();
        prop_assert!((projected - on_outline).norm() < 1e-6);
    }

    #[test]
    fn prop_extended_bbox_covers_bed(
        (_center, _radius, shape) in convex_bed_strategy(),
        height in 0.0f64..500.0,
    ) {
        let (mut bed, _) = scripted_bed(BedConfig::new());
        bed.set_shape(&shape, height, "", "", false);

        let bbox = bed.extended_bounding_box();
        for p in shape.points() {
            prop_assert!(bbox.contains(&Point3d::new(p.x, p.y, 0.0)));
        }
        prop_assert!(bbox.contains_box(&bed.axes().bounding_box()));
    }

    #[test]
    fn prop_build_volume_matches_input(
        (_center, _radius, shape) in convex_bed_strategy(),
        height in 0.0f64..500.0,
    ) {
        let (mut bed, _) = scripted_bed(BedConfig::new());
        bed.set_shape(&shape, height, "", "", false);

        let volume = bed.build_volume();
        prop_assert_eq!(volume.bed_shape(), &shape);
        prop_assert_eq!(volume.max_print_height(), height);
        prop_assert_eq!(volume.bounding_volume2d(), &shape.bounding_box());
    }

    #[test]
    fn prop_grid_stays_inside_outline(
        (_center, _radius, shape) in convex_bed_strategy(),
        spacing in 1.0f64..50.0,
    ) {
        let contour = BedContour::from_shape(&shape);
        for (a, b) in grid_segments(&contour, spacing) {
            for p in [a, b] {
                let boundary = closest_point_on_ring(&p, contour.outer()).unwrap();
                prop_assert!(
                    contour.contains(&p) || (p - boundary).norm() < 1e-6,
                    "Grid point {:?} outside outline",
                    p
                );
            }
        }
    }

    #[test]
    fn prop_classification_is_deterministic(shape in any_shape_strategy(), force in any::<bool>()) {
        let catalog = BedCatalog::builtin();
        prop_assert_eq!(classify(&shape, &catalog, force), classify(&shape, &catalog, force));
    }

    #[test]
    fn prop_set_shape_never_panics(shape in any_shape_strategy(), height in -10.0f64..500.0) {
        let (mut bed, _) = scripted_bed(BedConfig::new());
        bed.set_shape(&shape, height, "", "", false);
        prop_assert!(!bed.set_shape(&shape, height, "", "", false));
        let _ = bed.contains(&Point2d::origin());
        let _ = bed.point_projection(&Point2d::new(2000.0, 2000.0));
    }
}
