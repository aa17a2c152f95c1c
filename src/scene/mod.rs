pub(crate) mod color;
pub(crate) mod model;
pub(crate) mod summary;

pub use color::ColorDef;
pub use model::{
    Anchor, BoundingBox, DEFAULT_FONT_SIZE, DEFAULT_LINE_HEIGHT, FillStyle, FontStyle, FontWeight,
    Frame, GlowTier, OverlayElement, Scene, Storyboard, TextAlign, TextElement, TextShadow,
};
pub use summary::truncate_words;
