#![allow(dead_code)]

use acqxfer::ids::{EntityKind, SourceId};
use acqxfer::points::PointXY;
use acqxfer::source::{Rgba, Shape, ShapeGeometry};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Image coordinates: finite, either whole or with a fractional part.
pub fn arb_coord() -> BoxedStrategy<f64> {
    prop_oneof![
        (-4096i32..4096).prop_map(f64::from),
        -4096.0f64..4096.0,
    ]
    .boxed()
}

pub fn arb_point() -> BoxedStrategy<PointXY> {
    (arb_coord(), arb_coord())
        .prop_map(|(x, y)| PointXY::new(x, y))
        .boxed()
}

pub fn arb_points(max: usize) -> BoxedStrategy<Vec<PointXY>> {
    prop::collection::vec(arb_point(), 0..=max).boxed()
}

pub fn arb_rgba() -> BoxedStrategy<Rgba> {
    any::<[u8; 4]>()
        .prop_map(|[r, g, b, a]| Rgba::new(r, g, b, a))
        .boxed()
}

pub fn arb_entity_kind() -> BoxedStrategy<EntityKind> {
    prop::sample::select(vec![
        EntityKind::Image,
        EntityKind::Pixels,
        EntityKind::Channel,
        EntityKind::Instrument,
        EntityKind::LightSource,
        EntityKind::Detector,
        EntityKind::Objective,
        EntityKind::Filter,
        EntityKind::Dichroic,
        EntityKind::Roi,
        EntityKind::Shape,
    ])
    .boxed()
}

fn arb_marker() -> BoxedStrategy<Option<String>> {
    prop::option::of(prop::sample::select(vec!["Arrow".to_string()])).boxed()
}

/// Every geometry the interchange schema can carry (masks excluded).
pub fn arb_geometry() -> BoxedStrategy<ShapeGeometry> {
    prop_oneof![
        (arb_coord(), arb_coord()).prop_map(|(x, y)| ShapeGeometry::Point { x, y }),
        (
            arb_coord(),
            arb_coord(),
            arb_coord(),
            arb_coord(),
            arb_marker(),
            arb_marker()
        )
            .prop_map(|(x1, y1, x2, y2, marker_start, marker_end)| {
                ShapeGeometry::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    marker_start,
                    marker_end,
                }
            }),
        (arb_coord(), arb_coord(), 0.0f64..512.0, 0.0f64..512.0).prop_map(
            |(x, y, width, height)| ShapeGeometry::Rectangle {
                x,
                y,
                width,
                height,
            }
        ),
        (arb_coord(), arb_coord(), 0.0f64..256.0, 0.0f64..256.0).prop_map(
            |(x, y, radius_x, radius_y)| ShapeGeometry::Ellipse {
                x,
                y,
                radius_x,
                radius_y,
            }
        ),
        arb_points(8).prop_map(|points| ShapeGeometry::Polygon { points }),
        (arb_points(8), arb_marker(), arb_marker()).prop_map(
            |(points, marker_start, marker_end)| ShapeGeometry::Polyline {
                points,
                marker_start,
                marker_end,
            }
        ),
        (arb_coord(), arb_coord()).prop_map(|(x, y)| ShapeGeometry::Label { x, y }),
    ]
    .boxed()
}

/// A saved shape with display attributes.
pub fn arb_shape() -> BoxedStrategy<Shape> {
    (
        1u64..10_000,
        arb_geometry(),
        prop::option::of(arb_rgba()),
        prop::option::of(0.5f64..8.0),
        prop::option::of("[a-z ]{0,12}"),
        prop::option::of(0u32..16),
    )
        .prop_map(|(id, geometry, stroke, width, text, z)| {
            let mut shape = Shape::new(geometry).with_id(SourceId(id));
            shape.stroke_color = stroke;
            shape.stroke_width = width;
            shape.text = text;
            shape.the_z = z;
            shape
        })
        .boxed()
}
