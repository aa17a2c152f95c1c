use super::*;

fn text(z: Option<i64>) -> TextElement {
    TextElement {
        z_index: z,
        ..TextElement::default()
    }
}

fn overlay(z: Option<i64>) -> OverlayElement {
    OverlayElement {
        z_index: z,
        ..OverlayElement::default()
    }
}

fn order(items: &[LayeredItem<'_>]) -> Vec<(char, usize)> {
    items
        .iter()
        .map(|i| match i.item {
            DrawItem::Text { index, .. } => ('t', index),
            DrawItem::Overlay { index, .. } => ('o', index),
        })
        .collect()
}

#[test]
fn defaults_put_overlays_after_text() {
    let texts = vec![text(None), text(None)];
    let overlays = vec![overlay(None), overlay(None)];
    let items = layer(&texts, &overlays);
    assert_eq!(order(&items), vec![('t', 0), ('t', 1), ('o', 0), ('o', 1)]);
    assert_eq!(
        items.iter().map(|i| i.z).collect::<Vec<_>>(),
        vec![1, 2, 101, 102]
    );
}

#[test]
fn explicit_zero_is_not_missing() {
    let texts = vec![text(None)];
    let overlays = vec![overlay(Some(0))];
    let items = layer(&texts, &overlays);
    assert_eq!(order(&items), vec![('o', 0), ('t', 0)]);
    assert_eq!(items[0].z, 0);
}

#[test]
fn ties_keep_text_first_then_array_order() {
    let texts = vec![text(Some(5)), text(Some(5))];
    let overlays = vec![overlay(Some(5)), overlay(Some(1))];
    let items = layer(&texts, &overlays);
    assert_eq!(order(&items), vec![('o', 1), ('t', 0), ('t', 1), ('o', 0)]);
}

#[test]
fn overlay_can_sit_below_text_with_low_explicit_z() {
    let texts = vec![text(Some(50))];
    let overlays = vec![overlay(None), overlay(Some(10))];
    let items = layer(&texts, &overlays);
    assert_eq!(order(&items), vec![('o', 1), ('t', 0), ('o', 0)]);
}

#[test]
fn layering_is_deterministic() {
    let texts = vec![text(Some(3)), text(None), text(Some(0))];
    let overlays = vec![overlay(Some(2)), overlay(None)];
    let a = layer(&texts, &overlays);
    let b = layer(&texts, &overlays);
    assert_eq!(a, b);
    assert_eq!(
        order(&a),
        vec![('t', 2), ('t', 1), ('o', 0), ('t', 0), ('o', 1)]
    );
}

#[test]
fn empty_inputs() {
    assert!(layer(&[], &[]).is_empty());
}
