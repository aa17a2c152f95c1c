use super::*;

#[test]
fn glow_tiers_have_fixed_recipes() {
    assert_eq!(glow_recipe(GlowTier::Subtle).len(), 1);
    assert_eq!(glow_recipe(GlowTier::Medium).len(), 2);
    assert_eq!(glow_recipe(GlowTier::Strong).len(), 3);
    assert_eq!(glow_recipe(GlowTier::Neon)[0], pass(4.0, 1.0));
    let strong = glow_recipe(GlowTier::Strong);
    assert!(strong.windows(2).all(|w| w[0].blur_px < w[1].blur_px));
}

#[test]
fn outline_and_extrusion_scale_with_font() {
    assert_eq!(outline_width(12.0), 1.0);
    assert_eq!(outline_width(48.0), 2.0);
    assert_eq!(three_d_layers(48.0), [(2.0, 0.35), (4.0, 0.55)]);
}

#[test]
fn gradient_135_runs_top_left_to_bottom_right() {
    let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
    let paint = fill_paint(Some(FillStyle::Gradient), ColorDef::WHITE, rect);
    assert_eq!(paint.color_at(0.0, 0.0), [0x66, 0x7e, 0xea, 255]);
    assert_eq!(paint.color_at(100.0, 100.0), [0x76, 0x4b, 0xa2, 255]);
    let a = paint.color_at(100.0, 0.0);
    let b = paint.color_at(0.0, 100.0);
    assert_eq!((a[0], a[2], a[3]), (110, 198, 255));
    assert_eq!((a[0], a[2], a[3]), (b[0], b[2], b[3]));
}

#[test]
fn metallic_is_vertical() {
    let rect = Rect::new(10.0, 10.0, 110.0, 50.0);
    let paint = fill_paint(Some(FillStyle::Metallic), ColorDef::WHITE, rect);
    assert_eq!(paint.color_at(10.0, 10.0), [0xf5, 0xf5, 0xf5, 255]);
    assert_eq!(paint.color_at(90.0, 10.0), [0xf5, 0xf5, 0xf5, 255]);
    assert_eq!(paint.color_at(60.0, 50.0), [0x8a, 0x8a, 0x8a, 255]);
}

#[test]
fn rainbow_sweeps_hue_left_to_right() {
    let rect = Rect::new(0.0, 0.0, 60.0, 10.0);
    let paint = fill_paint(Some(FillStyle::GradientRainbow), ColorDef::WHITE, rect);
    assert_eq!(paint.color_at(0.0, 5.0), [255, 0, 0, 255]);
    assert_eq!(paint.color_at(20.0, 5.0), [0, 255, 0, 255]);
    assert_eq!(paint.color_at(60.0, 5.0), [255, 0, 0, 255]);
}

#[test]
fn plain_outline_and_3d_fill_with_text_color() {
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    let red = ColorDef::rgba(1.0, 0.0, 0.0, 1.0);
    for style in [None, Some(FillStyle::Outline), Some(FillStyle::ThreeD)] {
        assert_eq!(fill_paint(style, red, rect), FillPaint::Solid([255, 0, 0, 255]));
    }
}

#[test]
fn tint_premultiplies_and_scales_alpha() {
    let cov = [0u8, 255, 128];
    let out = tint_coverage(&cov, 3, (0, 0), &FillPaint::Solid([255, 0, 0, 255]), 1.0);
    assert_eq!(&out[0..4], &[0, 0, 0, 0]);
    assert_eq!(&out[4..8], &[255, 0, 0, 255]);
    assert_eq!(&out[8..12], &[128, 0, 0, 128]);

    let half = tint_coverage(&cov, 3, (0, 0), &FillPaint::Solid([255, 0, 0, 255]), 0.5);
    assert_eq!(half[7], 128);
    assert!(tint_coverage(&cov, 3, (0, 0), &FillPaint::Solid([255; 4]), 0.0)
        .iter()
        .all(|&b| b == 0));
}

#[test]
fn shift_moves_and_clips() {
    let cov = [1u8, 2, 3, 4];
    assert_eq!(shift_coverage(&cov, 2, 2, 1, 0), vec![0, 1, 0, 3]);
    assert_eq!(shift_coverage(&cov, 2, 2, 0, -1), vec![3, 4, 0, 0]);
    assert_eq!(shift_coverage(&cov, 2, 2, 5, 5), vec![0; 4]);
}

#[test]
fn shift_by_extreme_offsets_empties_the_mask() {
    let cov = [9u8; 6];
    assert_eq!(shift_coverage(&cov, 3, 2, i32::MIN, 0), vec![0; 6]);
    assert_eq!(shift_coverage(&cov, 3, 2, 0, i32::MAX), vec![0; 6]);
    assert_eq!(shift_coverage(&cov, 3, 2, -3, 0), vec![0; 6]);
    assert_eq!(shift_coverage(&cov, 3, 2, -2, 0), vec![9, 0, 0, 9, 0, 0]);
}

#[test]
fn oversized_outline_stroke_stays_in_bounds() {
    let cov = [0u8, 255, 0, 0];
    let ring = outline_coverage(&cov, 2, 2, 1.0e12);
    assert_eq!(ring, vec![255; 4]);
}

#[test]
fn outline_is_a_band_around_the_shape() {
    let (w, h) = (9u32, 9u32);
    let mut cov = vec![0u8; 81];
    for y in 2..7 {
        for x in 2..7 {
            cov[y * 9 + x] = 255;
        }
    }
    let ring = outline_coverage(&cov, w, h, 2.0);
    assert_eq!(ring[4 * 9 + 4], 0, "interior is hollow");
    assert_eq!(ring[2 * 9 + 2], 255, "edge is stroked");
    assert_eq!(ring[9 + 4], 255, "stroke grows outward");
    assert_eq!(ring[0], 0);
}
