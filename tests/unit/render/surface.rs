use super::*;

#[test]
fn from_parts_checks_length() {
    assert!(FrameRGBA::from_parts(2, 2, vec![0; 16], true).is_ok());
    assert!(FrameRGBA::from_parts(2, 2, vec![0; 15], true).is_err());
    assert!(FrameRGBA::from_parts(0, 2, vec![], true).is_err());
}

#[test]
fn png_encode_unpremultiplies() {
    let frame = FrameRGBA::from_parts(1, 1, vec![64, 0, 0, 128], true).unwrap();
    let png = frame.encode_png().unwrap();
    let back = image::load_from_memory(&png).unwrap().to_rgba8();
    let px = back.get_pixel(0, 0).0;
    assert_eq!(px[3], 128);
    assert!((i32::from(px[0]) - 128).abs() <= 1);
    assert_eq!(px[1], 0);
}

#[test]
fn pixel_bounds() {
    let frame = FrameRGBA::transparent(Size {
        width: 3,
        height: 2,
    });
    assert_eq!(frame.pixel(2, 1), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(3, 0), None);
    assert_eq!(frame.size().width, 3);
}

#[test]
fn pixmap_from_premul_bytes_rejects_mismatch() {
    assert!(pixmap_from_premul_bytes(&[0; 12], 2, 2).is_err());
    assert!(pixmap_from_premul_bytes(&[0; 16], 2, 2).is_ok());
    assert!(pixmap_from_premul_bytes(&[], 70_000, 0).is_err());
}

#[test]
fn rasterize_layer_fills_rect() {
    let px = rasterize_layer(4, 4, |ctx| {
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 255, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 2.0, 4.0));
        Ok(())
    })
    .unwrap();
    assert_eq!(px.len(), 64);
    assert_eq!(&px[0..4], &[0, 0, 255, 255]);
    assert_eq!(px[3 * 4 + 3], 0);
}
