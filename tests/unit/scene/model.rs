use serde_json::json;

use super::*;

#[test]
fn text_element_accepts_camel_case_aliases() {
    let el: TextElement = serde_json::from_value(json!({
        "text": "Hello",
        "boundingBox": {"x": 0.1, "y": 0.2},
        "fontSize": 0.05,
        "lineHeight": 1.5,
        "zIndex": 0,
        "anchor": "center",
        "fillStyle": "gradient-rainbow",
        "fontWeight": "bold"
    }))
    .unwrap();

    assert_eq!(el.bounding_box.x, 0.1);
    assert_eq!(el.bounding_box.width, None);
    assert_eq!(el.font_size, Some(0.05));
    assert_eq!(el.z_index, Some(0));
    assert_eq!(el.anchor, Anchor::Center);
    assert_eq!(el.fill_style, Some(FillStyle::GradientRainbow));
    assert_eq!(el.font_weight, FontWeight(700.0));
    assert_eq!(el.line_height_or_default(), 1.5);
}

#[test]
fn text_element_defaults() {
    let el: TextElement = serde_json::from_value(json!({"text": "x"})).unwrap();
    assert_eq!(el.font_size_or_default(), DEFAULT_FONT_SIZE);
    assert_eq!(el.line_height_or_default(), DEFAULT_LINE_HEIGHT);
    assert_eq!(el.opacity_or_default(), 1.0);
    assert_eq!(el.color, ColorDef::WHITE);
    assert_eq!(el.anchor, Anchor::TopLeft);
}

#[test]
fn fill_style_3d_and_glow_parse() {
    let el: TextElement =
        serde_json::from_value(json!({"fill_style": "3d", "glow": "neon"})).unwrap();
    assert_eq!(el.fill_style, Some(FillStyle::ThreeD));
    assert_eq!(el.glow, Some(GlowTier::Neon));
}

#[test]
fn overlay_image_ref_picks_first_non_empty_alias() {
    let el: OverlayElement = serde_json::from_value(json!({
        "image_url": "  ",
        "overlayUrl": "",
        "src": "https://cdn.example/chart.png",
        "image": "https://cdn.example/other.png"
    }))
    .unwrap();
    assert_eq!(el.image_ref(), Some("https://cdn.example/chart.png"));

    let empty = OverlayElement::default();
    assert_eq!(empty.image_ref(), None);
}

#[test]
fn frame_recorded_size_and_bake_default() {
    let f: Frame = serde_json::from_value(json!({
        "image_url": "base.png",
        "width": 1920,
        "height": 1080.0
    }))
    .unwrap();
    assert_eq!(f.base_image_ref(), Some("base.png"));
    assert_eq!(
        f.recorded_size(),
        Some(Size {
            width: 1920,
            height: 1080
        })
    );
    assert!(f.overlays_bakeable);

    let f: Frame = serde_json::from_value(json!({"base_image": " ", "width": 0})).unwrap();
    assert_eq!(f.base_image_ref(), None);
    assert_eq!(f.recorded_size(), None);
}

#[test]
fn storyboard_validate_rejects_duplicates() {
    let sb = Storyboard::from_json_slice(
        br#"{
            "user_id": "u1",
            "session_id": "s1",
            "scenes": [
                {"scene_number": 1, "frames": []},
                {"scene_number": 1, "frames": []}
            ]
        }"#,
    )
    .unwrap();
    assert!(sb.validate().is_err());

    let sb = Storyboard::from_json_slice(
        br#"{"userId": "u1", "sessionId": "s1", "scenes": [
            {"sceneNumber": 2, "model": "m", "images": [{"image_url": "a.png"}, {"image_url": "b.png"}]}
        ]}"#,
    )
    .unwrap();
    sb.validate().unwrap();
    assert_eq!(sb.image_count(), 2);
    assert_eq!(sb.scene(2).map(|s| s.frames.len()), Some(2));
}

#[test]
fn malformed_manifest_is_serde_error() {
    let err = Storyboard::from_json_slice(b"{").unwrap_err();
    assert!(matches!(err, StoryframeError::Serde(_)));
}
