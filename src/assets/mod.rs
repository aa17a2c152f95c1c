pub(crate) mod decode;
pub(crate) mod fonts;
pub(crate) mod loader;
pub(crate) mod svg_raster;

pub use decode::{
    PreparedGraphic, PreparedImage, PreparedSvg, decode_graphic, decode_image, looks_like_svg,
    parse_svg,
};
pub use fonts::{FontBook, ResolvedFont};
pub use loader::{
    BackgroundRemover, CACHE_BUST_PARAM, HttpBackgroundRemover, HttpImageLoader, ImageLoader,
    MemoryImageLoader, PassthroughBackgroundRemover, cache_bust, remove_background_or_original,
};
