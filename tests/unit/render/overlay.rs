use std::sync::Arc;

use super::*;
use crate::assets::decode::{PreparedImage, parse_svg};
use crate::foundation::core::Point;
use crate::scene::model::BoundingBox;

fn solid(w: u32, h: u32, px: [u8; 4]) -> PreparedGraphic {
    PreparedGraphic::Raster(PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(px.repeat((w * h) as usize)),
    })
}

fn at(x: f64, y: f64, w: Option<f64>, h: Option<f64>) -> OverlayElement {
    OverlayElement {
        image_url: Some("logo.png".to_string()),
        bounding_box: BoundingBox {
            x,
            y,
            width: w,
            height: h,
        },
        ..OverlayElement::default()
    }
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn transform_maps_source_onto_box() {
    let tr = overlay_transform(10.0, 20.0, 40.0, 30.0, 0.0, 4.0, 3.0);
    assert!(close(tr * Point::new(0.0, 0.0), Point::new(10.0, 20.0)));
    assert!(close(tr * Point::new(4.0, 3.0), Point::new(50.0, 50.0)));
}

#[test]
fn rotation_pivots_on_box_center() {
    let tr = overlay_transform(10.0, 20.0, 40.0, 30.0, 90.0, 4.0, 3.0);
    assert!(close(tr * Point::new(2.0, 1.5), Point::new(30.0, 35.0)));
    // Top-left corner swings around the center.
    assert!(close(tr * Point::new(0.0, 0.0), Point::new(45.0, 15.0)));
}

#[test]
fn draws_raster_overlay_in_its_box() {
    let size = Size::new(10, 10).unwrap();
    let mut canvas = FrameRGBA::transparent(size);
    let drawn = draw_overlay(
        &mut canvas,
        &at(2.0, 2.0, Some(4.0), Some(4.0)),
        &solid(2, 2, [255, 0, 0, 255]),
        size,
        Some(size),
    )
    .unwrap();
    assert!(drawn);
    let inside = canvas.pixel(4, 4).unwrap();
    assert!(inside[3] >= 250 && inside[0] >= 250);
    assert_eq!(canvas.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(canvas.pixel(8, 8).unwrap()[3], 0);
}

#[test]
fn open_box_falls_back_to_natural_size() {
    let size = Size::new(12, 12).unwrap();
    let mut canvas = FrameRGBA::transparent(size);
    draw_overlay(
        &mut canvas,
        &at(3.0, 3.0, None, None),
        &solid(4, 4, [0, 255, 0, 255]),
        size,
        Some(size),
    )
    .unwrap();
    assert!(canvas.pixel(4, 4).unwrap()[3] >= 250);
    assert_eq!(canvas.pixel(9, 9).unwrap()[3], 0);
}

#[test]
fn opacity_scales_alpha() {
    let size = Size::new(8, 8).unwrap();
    let mut canvas = FrameRGBA::transparent(size);
    let mut e = at(0.0, 0.0, Some(1.0), Some(1.0));
    e.opacity = Some(0.5);
    draw_overlay(&mut canvas, &e, &solid(2, 2, [0, 0, 255, 255]), size, Some(size)).unwrap();
    let a = canvas.pixel(4, 4).unwrap()[3];
    assert!((i32::from(a) - 128).abs() <= 3, "alpha {a}");
}

#[test]
fn svg_overlay_is_rasterized_at_draw_size() {
    let svg = parse_svg(
        br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4">
            <rect width="4" height="4" fill="#0000ff"/></svg>"##,
    )
    .unwrap();
    let size = Size::new(20, 20).unwrap();
    let mut canvas = FrameRGBA::transparent(size);
    draw_overlay(
        &mut canvas,
        &at(0.25, 0.25, Some(0.5), Some(0.5)),
        &PreparedGraphic::Svg(svg),
        size,
        Some(size),
    )
    .unwrap();
    let px = canvas.pixel(10, 10).unwrap();
    assert!(px[2] >= 250 && px[3] >= 250);
    assert_eq!(canvas.pixel(1, 1).unwrap()[3], 0);
}

#[test]
fn degenerate_box_draws_nothing() {
    let size = Size::new(8, 8).unwrap();
    let mut canvas = FrameRGBA::transparent(size);
    let drawn = draw_overlay(
        &mut canvas,
        &at(2.0, 2.0, Some(0.0), Some(4.0)),
        &solid(2, 2, [255; 4]),
        size,
        Some(size),
    )
    .unwrap();
    assert!(!drawn);
}
