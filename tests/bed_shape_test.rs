//! Integration tests for applying bed shapes and querying the bed

mod common;

use approx::assert_relative_eq;
use bed3d::geometry::{Point2d, Point3d};
use bed3d::polygon_clipping::closest_point_on_ring;
use bed3d::{BedConfig, BedShape, BedState, BedType};
use common::{init_logging, resources_dir, scripted_bed};

fn square(size: f64) -> BedShape {
    BedShape::from_xy(&[(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)])
}

fn mk3() -> BedShape {
    BedShape::from_xy(&[(0.0, 0.0), (250.0, 0.0), (250.0, 210.0), (0.0, 210.0)])
}

#[test]
fn test_custom_square_bed() {
    init_logging();
    let (mut bed, _) = scripted_bed(BedConfig::new());

    assert!(bed.set_shape(&square(200.0), 200.0, "", "", false));

    assert_eq!(bed.state(), BedState::Shaped);
    assert_eq!(bed.bed_type(), BedType::Custom);
    assert!(bed.is_custom());
    assert!(!bed.geometry().fill.is_empty());
    assert!(!bed.geometry().grid.is_empty());
    assert!(!bed.geometry().contour.is_empty());
    assert!(bed.contains(&Point2d::new(100.0, 100.0)));
    assert!(!bed.contains(&Point2d::new(-50.0, 100.0)));

    let volume = bed.build_volume();
    assert_eq!(volume.max_print_height(), 200.0);
    assert_eq!(volume.bed_shape(), &square(200.0));
    assert_relative_eq!(volume.area(), 40_000.0);
    assert_eq!(volume.bounding_volume().max, Point3d::new(200.0, 200.0, 200.0));
}

#[test]
fn test_catalog_bed_is_system() {
    init_logging();
    let resources = resources_dir(&["mk3.svg", "mk3_bed.stl"]);
    let (mut bed, _) = scripted_bed(BedConfig::new().with_resources_dir(resources.path()));

    assert!(bed.set_shape(&mk3(), 210.0, "", "", false));

    assert_eq!(bed.get_type(), BedType::System);
    assert!(!bed.is_custom());
    let texture = resources.path().join("mk3.svg");
    let model = resources.path().join("mk3_bed.stl");
    assert_eq!(bed.texture_source(), texture.to_string_lossy());
    assert_eq!(bed.model_source(), model.to_string_lossy());
}

#[test]
fn test_force_custom_drops_catalog_assets() {
    init_logging();
    let resources = resources_dir(&["mk3.svg", "mk3_bed.stl"]);
    let (mut bed, script) = scripted_bed(BedConfig::new().with_resources_dir(resources.path()));

    assert!(bed.set_shape(&mk3(), 210.0, "", "", true));

    assert_eq!(bed.bed_type(), BedType::Custom);
    assert!(bed.texture_source().is_empty());
    assert!(bed.model_source().is_empty());
    assert!(script.borrow().requests.is_empty());
}

#[test]
fn test_degenerate_shape() {
    init_logging();
    let (mut bed, _) = scripted_bed(BedConfig::new());
    let point = BedShape::from_xy(&[(10.0, 10.0)]);

    assert!(bed.set_shape(&point, 100.0, "", "", false));

    assert_eq!(bed.bed_type(), BedType::Custom);
    assert_eq!(bed.build_volume().area(), 0.0);
    assert!(bed.collision_polygon().is_empty());
    assert!(bed.geometry().fill.is_empty());
    for p in [Point2d::new(10.0, 10.0), Point2d::new(0.0, 0.0), Point2d::new(1e6, -1e6)] {
        assert!(!bed.contains(&p));
        assert_eq!(bed.point_projection(&p), p);
    }

    // Applying the same degenerate shape again is not a change
    assert!(!bed.set_shape(&point, 100.0, "", "", false));
}

#[test]
fn test_non_finite_shape_is_degenerate() {
    init_logging();
    let (mut bed, _) = scripted_bed(BedConfig::new());
    let shape = BedShape::from_xy(&[(0.0, 0.0), (f64::INFINITY, 0.0), (1.0, 1.0), (0.0, 1.0)]);

    assert!(bed.set_shape(&shape, 100.0, "", "", false));

    assert_eq!(bed.bed_type(), BedType::Custom);
    assert_eq!(bed.build_volume().area(), 0.0);
    assert!(!bed.build_volume().bounding_volume().is_defined());
    assert!(bed.collision_polygon().is_empty());
    assert!(bed.geometry().fill.is_empty());
    assert!(bed.geometry().grid.is_empty());
    assert!(!bed.contains(&Point2d::new(0.5, 0.5)));

    let bbox = bed.extended_bounding_box();
    assert!(bbox.min.coords.iter().chain(bbox.max.coords.iter()).all(|v| v.is_finite()));

    // A NaN vertex or height follows the same path
    let shape = BedShape::from_xy(&[(0.0, 0.0), (10.0, f64::NAN), (10.0, 10.0)]);
    assert!(bed.set_shape(&shape, f64::INFINITY, "", "", false));
    assert!(bed.collision_polygon().is_empty());
    assert_eq!(bed.build_volume().max_print_height(), 0.0);
}

#[test]
fn test_huge_bed_skips_grid() {
    init_logging();
    let (mut bed, _) = scripted_bed(BedConfig::new());

    assert!(bed.set_shape(&square(1e9), 100.0, "", "", false));

    assert!(bed.geometry().grid.is_empty());
    assert!(!bed.geometry().fill.is_empty());
    assert!(!bed.geometry().contour.is_empty());
    assert!(bed.contains(&Point2d::new(5e8, 5e8)));
}

#[test]
fn test_degenerate_shape_releases_assets() {
    init_logging();
    let resources = resources_dir(&["mk3.svg", "mk3_bed.stl"]);
    let (mut bed, script) = scripted_bed(BedConfig::new().with_resources_dir(resources.path()));
    bed.set_shape(&mk3(), 210.0, "", "", false);
    assert_eq!(script.borrow().live_tickets(), 3);

    assert!(bed.set_shape(&BedShape::default(), 210.0, "", "", false));

    assert_eq!(script.borrow().live_tickets(), 0);
    assert!(bed.texture_source().is_empty());
}

#[test]
fn test_set_shape_is_idempotent() {
    let (mut bed, _) = scripted_bed(BedConfig::new());
    let shape = BedShape::from_xy(&[(0.0, 0.0), (120.0, 0.0), (160.0, 90.0), (-20.0, 110.0)]);

    assert!(bed.set_shape(&shape, 150.0, "", "", false));
    let geometry = bed.geometry().clone();
    let bbox = *bed.extended_bounding_box();

    assert!(!bed.set_shape(&shape, 150.0, "", "", false));
    assert_eq!(bed.geometry().fill.vertex_bytes(), geometry.fill.vertex_bytes());
    assert_eq!(bed.geometry().grid.vertex_bytes(), geometry.grid.vertex_bytes());
    assert_eq!(bed.geometry().contour.index_bytes(), geometry.contour.index_bytes());
    assert_eq!(bed.extended_bounding_box(), &bbox);
}

#[test]
fn test_height_only_change_reports_unchanged() {
    let (mut bed, _) = scripted_bed(BedConfig::new());
    assert!(bed.set_shape(&square(200.0), 100.0, "", "", false));
    let stem = bed.axes().stem_length();

    assert!(!bed.set_shape(&square(200.0), 300.0, "", "", false));

    assert_eq!(bed.build_volume().max_print_height(), 300.0);
    assert_eq!(bed.build_volume().bounding_volume().max.z, 300.0);
    assert!(bed.axes().stem_length() > stem);
    assert!(bed.extended_bounding_box().max.z >= bed.axes().total_length());
}

#[test]
fn test_reshape_replaces_geometry() {
    let (mut bed, _) = scripted_bed(BedConfig::new());
    bed.set_shape(&square(100.0), 100.0, "", "", false);
    let small = bed.geometry().clone();

    assert!(bed.set_shape(&square(300.0), 100.0, "", "", false));
    assert_ne!(bed.geometry(), &small);
    assert!(bed.contains(&Point2d::new(250.0, 250.0)));
}

#[test]
fn test_custom_texture_overrides_catalog() {
    let resources = resources_dir(&["mk3.svg", "mk3_bed.stl", "custom.png"]);
    let (mut bed, _) = scripted_bed(BedConfig::new().with_resources_dir(resources.path()));
    let custom = resources.path().join("custom.png");

    bed.set_shape(&mk3(), 210.0, custom.to_str().unwrap(), "", false);

    assert_eq!(bed.bed_type(), BedType::System);
    assert_eq!(bed.texture_source(), custom.to_string_lossy());
    assert!(bed.model_source().ends_with("mk3_bed.stl"));
}

#[test]
fn test_custom_assets_on_custom_bed() {
    let resources = resources_dir(&["plate.svg", "plate.stl"]);
    let (mut bed, _) = scripted_bed(BedConfig::new());
    let texture = resources.path().join("plate.svg");
    let model = resources.path().join("plate.stl");

    let changed = bed.set_shape(
        &square(200.0),
        200.0,
        texture.to_str().unwrap(),
        model.to_str().unwrap(),
        false,
    );

    assert!(changed);
    assert_eq!(bed.bed_type(), BedType::Custom);
    assert_eq!(bed.texture_source(), texture.to_string_lossy());
    assert_eq!(bed.model_source(), model.to_string_lossy());

    // Changing only the custom texture is a change
    assert!(bed.set_shape(&square(200.0), 200.0, "", model.to_str().unwrap(), false));
    assert!(bed.texture_source().is_empty());
}

#[test]
fn test_missing_catalog_assets_are_dropped() {
    init_logging();
    let resources = resources_dir(&[]);
    let (mut bed, script) = scripted_bed(BedConfig::new().with_resources_dir(resources.path()));

    bed.set_shape(&mk3(), 210.0, "", "", false);

    assert_eq!(bed.bed_type(), BedType::System);
    assert!(bed.texture_source().is_empty());
    assert!(bed.model_source().is_empty());
    assert!(script.borrow().requests.is_empty());
}

#[test]
fn test_point_projection() {
    let (mut bed, _) = scripted_bed(BedConfig::new().with_collision_margin(5.0));
    bed.set_shape(&square(100.0), 100.0, "", "", false);

    let inside = Point2d::new(50.0, 50.0);
    assert_eq!(bed.point_projection(&inside), inside);

    let projected = bed.point_projection(&Point2d::new(50.0, 200.0));
    assert_relative_eq!(projected.x, 50.0, epsilon = 0.1);
    assert_relative_eq!(projected.y, 105.0, epsilon = 0.1);

    // Interior points reach the boundary through the collision outline itself
    let interior = Point2d::new(50.0, 80.0);
    assert_eq!(bed.point_projection(&interior), interior);
    let boundary = closest_point_on_ring(&interior, bed.collision_polygon()).unwrap();
    assert_relative_eq!(boundary.x, 50.0, epsilon = 0.1);
    assert_relative_eq!(boundary.y, 105.0, epsilon = 0.1);
}

#[test]
fn test_collision_margin_zero_matches_outline() {
    let (mut bed, _) = scripted_bed(BedConfig::new().with_collision_margin(0.0));
    bed.set_shape(&square(100.0), 100.0, "", "", false);

    assert_eq!(bed.collision_polygon(), bed.contour().outer());
    assert!(!bed.contains(&Point2d::new(101.0, 50.0)));
}
