pub(crate) mod geometry;
pub(crate) mod layering;

pub use geometry::{Geometry, NORMALIZED_THRESHOLD, ResolvedBox, resolve};
pub use layering::{DrawItem, LayeredItem, OVERLAY_Z_BASE, layer, overlay_z, text_z};
