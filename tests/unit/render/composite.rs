use super::*;

#[test]
fn over_opaque_replaces() {
    let mut dst = vec![10, 20, 30, 255];
    over_in_place(&mut dst, &[200, 100, 0, 255], 1.0).unwrap();
    assert_eq!(dst, vec![200, 100, 0, 255]);
}

#[test]
fn over_transparent_is_noop() {
    let mut dst = vec![10, 20, 30, 255];
    over_in_place(&mut dst, &[0, 0, 0, 0], 1.0).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
    over_in_place(&mut dst, &[255, 255, 255, 255], 0.0).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn over_half_opacity_blends() {
    let mut dst = vec![0, 0, 0, 255];
    over_in_place(&mut dst, &[255, 255, 255, 255], 0.5).unwrap();
    assert_eq!(dst[3], 255);
    assert!((i32::from(dst[0]) - 128).abs() <= 1);
}

#[test]
fn over_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
}

#[test]
fn over_placed_clips_at_edges() {
    let mut dst = vec![0u8; 3 * 3 * 4];
    let mut layer = PlacedLayer::transparent(-1, 1, 3, 3);
    for px in layer.data.chunks_exact_mut(4) {
        px.copy_from_slice(&[255, 0, 0, 255]);
    }
    over_placed(&mut dst, 3, 3, &layer, 1.0).unwrap();

    let at = |x: usize, y: usize| &dst[(y * 3 + x) * 4..(y * 3 + x) * 4 + 4];
    assert_eq!(at(0, 0), &[0, 0, 0, 0]);
    assert_eq!(at(0, 1), &[255, 0, 0, 255]);
    assert_eq!(at(1, 2), &[255, 0, 0, 255]);
    assert_eq!(at(2, 1), &[0, 0, 0, 0]);
}

#[test]
fn over_placed_fully_outside_is_noop() {
    let mut dst = vec![0u8; 2 * 2 * 4];
    let layer = PlacedLayer {
        x: 5,
        y: 5,
        width: 1,
        height: 1,
        data: vec![255; 4],
    };
    over_placed(&mut dst, 2, 2, &layer, 1.0).unwrap();
    assert!(dst.iter().all(|&b| b == 0));
}
