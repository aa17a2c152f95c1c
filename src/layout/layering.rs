use crate::scene::model::{OverlayElement, TextElement};

/// Default z offset that puts overlays above text when neither carries an explicit z-index.
pub const OVERLAY_Z_BASE: i64 = 100;

/// One entry of the merged draw list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawItem<'a> {
    /// Caption at `index` in the frame's text list.
    Text {
        /// Position in the source array.
        index: usize,
        /// The element.
        element: &'a TextElement,
    },
    /// Overlay at `index` in the frame's overlay list.
    Overlay {
        /// Position in the source array.
        index: usize,
        /// The element.
        element: &'a OverlayElement,
    },
}

/// A draw item with its effective z-index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayeredItem<'a> {
    /// Effective z-index.
    pub z: i64,
    /// What to draw.
    pub item: DrawItem<'a>,
}

/// Explicit z-index (including 0), else one past the array position.
pub fn text_z(element: &TextElement, index: usize) -> i64 {
    element.z_index.unwrap_or(index as i64 + 1)
}

/// Explicit z-index (including 0), else above all default-positioned text.
pub fn overlay_z(element: &OverlayElement, index: usize) -> i64 {
    element
        .z_index
        .unwrap_or(OVERLAY_Z_BASE + index as i64 + 1)
}

/// Merge captions and overlays into one list, ascending by effective z-index.
///
/// The sort is stable over a list built text-first, so ties keep text before overlays and each
/// group in its original order.
pub fn layer<'a>(texts: &'a [TextElement], overlays: &'a [OverlayElement]) -> Vec<LayeredItem<'a>> {
    let mut items = Vec::with_capacity(texts.len() + overlays.len());
    items.extend(texts.iter().enumerate().map(|(index, element)| LayeredItem {
        z: text_z(element, index),
        item: DrawItem::Text { index, element },
    }));
    items.extend(
        overlays
            .iter()
            .enumerate()
            .map(|(index, element)| LayeredItem {
                z: overlay_z(element, index),
                item: DrawItem::Overlay { index, element },
            }),
    );
    items.sort_by_key(|i| i.z);
    items
}

#[cfg(test)]
#[path = "../../tests/unit/layout/layering.rs"]
mod tests;
