use super::*;

fn bb(x: f64, y: f64, w: Option<f64>, h: Option<f64>) -> BoundingBox {
    BoundingBox {
        x,
        y,
        width: w,
        height: h,
    }
}

fn size(w: u32, h: u32) -> Size {
    Size {
        width: w,
        height: h,
    }
}

#[test]
fn classification_uses_max_abs_across_fields() {
    assert!(Geometry::classify(&bb(0.1, 0.2, Some(0.5), Some(0.3))).is_normalized());
    assert!(Geometry::classify(&bb(-0.9, 0.2, None, None)).is_normalized());
    assert!(Geometry::classify(&bb(0.1, 0.2, Some(1.04), None)).is_normalized());
    assert!(!Geometry::classify(&bb(0.1, 0.2, Some(1.06), None)).is_normalized());
    assert!(!Geometry::classify(&bb(120.0, 40.0, Some(300.0), Some(80.0))).is_normalized());
}

#[test]
fn threshold_band_reads_small_absolute_boxes_as_normalized() {
    // A 1x1 pixel box cannot be told apart from a full-container normalized box.
    let g = Geometry::classify(&bb(1.0, 1.0, Some(1.0), Some(1.0)));
    assert!(g.is_normalized());
    let r = g.resolve(size(200, 100), Some(size(2000, 1000)));
    assert_eq!(r.width, Some(200.0));
}

#[test]
fn normalized_scales_with_container_and_ignores_recorded_size() {
    let b = bb(0.25, 0.5, Some(0.5), Some(0.25));
    let a = resolve(&b, size(1000, 800), Some(size(10, 10)));
    let c = resolve(&b, size(1000, 800), None);
    let d = resolve(&b, size(2000, 1600), Some(size(4000, 3000)));
    assert_eq!(a, c);
    assert_eq!(a.left, 250.0);
    assert_eq!(a.top, 400.0);
    assert_eq!(a.width, Some(500.0));
    assert_eq!(a.height, Some(200.0));
    assert_eq!(d.left, 2.0 * a.left);
    assert_eq!(d.height.map(|h| h / 2.0), a.height);
}

#[test]
fn absolute_scales_by_container_over_recorded_per_axis() {
    let b = bb(100.0, 50.0, Some(200.0), Some(100.0));
    let r = resolve(&b, size(960, 1080), Some(size(1920, 1080)));
    assert_eq!(r.left, 50.0);
    assert_eq!(r.top, 50.0);
    assert_eq!(r.width, Some(100.0));
    assert_eq!(r.height, Some(100.0));

    // Same ratio, different absolute container: identical output relative to the ratio.
    let r2 = resolve(&b, size(1920, 2160), Some(size(3840, 2160)));
    assert_eq!(r, r2);
}

#[test]
fn missing_or_zero_recorded_size_means_scale_one() {
    let b = bb(100.0, 50.0, None, None);
    let r = resolve(&b, size(640, 360), None);
    assert_eq!((r.left, r.top), (100.0, 50.0));
    assert_eq!(r.width, None);

    let r = resolve(
        &b,
        size(640, 360),
        Some(Size {
            width: 0,
            height: 0,
        }),
    );
    assert_eq!((r.left, r.top), (100.0, 50.0));
}

#[test]
fn non_finite_fields_are_dropped() {
    let g = Geometry::classify(&bb(f64::NAN, 0.5, Some(f64::INFINITY), Some(0.5)));
    assert!(g.is_normalized());
    let r = g.resolve(size(100, 100), None);
    assert_eq!(r.left, 0.0);
    assert_eq!(r.width, None);
    assert_eq!(r.height, Some(50.0));
}

#[test]
fn font_size_rules() {
    let norm = Geometry::classify(&bb(0.1, 0.1, None, None));
    let abs = Geometry::classify(&bb(100.0, 100.0, None, None));
    let container = size(1000, 500);
    let recorded = Some(size(2000, 1000));

    assert_eq!(norm.resolve_font_size(0.05, container, recorded), 25.0);
    assert_eq!(abs.resolve_font_size(0.05, container, recorded), 25.0);
    assert_eq!(norm.resolve_font_size(32.0, container, recorded), 32.0);
    assert_eq!(abs.resolve_font_size(32.0, container, recorded), 16.0);
}

#[test]
fn center_treats_missing_dimensions_as_point() {
    let r = ResolvedBox {
        left: 10.0,
        top: 20.0,
        width: Some(100.0),
        height: None,
    };
    assert_eq!(r.center(), Point::new(60.0, 20.0));
    assert_eq!(r.size_or((7.0, 9.0)), (100.0, 9.0));
}
