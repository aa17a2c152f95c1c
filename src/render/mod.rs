pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod overlay;
pub(crate) mod paint;
pub(crate) mod surface;
pub(crate) mod text;

pub use compositor::{CompositeOptions, FrameCompositor};
pub use surface::FrameRGBA;
pub use text::{PlannedLine, TextPlan, plan_text};
