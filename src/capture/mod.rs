pub(crate) mod live;
pub(crate) mod resolver;
pub(crate) mod tiers;

pub use live::LivePresentation;
pub use resolver::{CaptureFailure, CaptureOutcome, CaptureResolver, first_success};
pub use tiers::{
    BaseReencodeTier, CaptureError, CaptureOptions, CaptureRequest, CaptureTier, CaptureTierKind,
    CompositeTier, LiveSnapshotTier,
};
