use std::future::Future;
use std::sync::Arc;

use crate::capture::live::LivePresentation;
use crate::capture::tiers::{
    BaseReencodeTier, CaptureError, CaptureRequest, CaptureTier, CaptureTierKind, CompositeTier,
    LiveSnapshotTier,
};
use crate::render::compositor::FrameCompositor;
use crate::render::surface::FrameRGBA;

/// Await `attempts` in order and stop at the first `Ok`.
///
/// Each future is only created once the previous one failed. On total failure the errors are
/// returned in attempt order.
pub async fn first_success<T, E, Fut>(
    attempts: impl IntoIterator<Item = Fut>,
) -> Result<(usize, T), Vec<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    let mut errors = Vec::new();
    for (i, attempt) in attempts.into_iter().enumerate() {
        match attempt.await {
            Ok(v) => return Ok((i, v)),
            Err(e) => errors.push(e),
        }
    }
    Err(errors)
}

/// A frame and the tier that produced it.
#[derive(Debug)]
pub struct CaptureOutcome {
    pub tier: CaptureTierKind,
    pub frame: FrameRGBA,
}

/// Every tier fell through.
#[derive(Debug)]
pub struct CaptureFailure {
    pub attempts: Vec<(CaptureTierKind, CaptureError)>,
}

impl std::fmt::Display for CaptureFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "all capture tiers failed")?;
        for (kind, err) in &self.attempts {
            write!(f, "; {}: {err}", kind.as_str())?;
        }
        Ok(())
    }
}

impl std::error::Error for CaptureFailure {}

/// Ordered capture tiers for one export run.
pub struct CaptureResolver {
    tiers: Vec<Box<dyn CaptureTier>>,
}

impl CaptureResolver {
    pub fn new(tiers: Vec<Box<dyn CaptureTier>>) -> Self {
        Self { tiers }
    }

    /// Composite, then base re-encode.
    pub fn offline(compositor: Arc<FrameCompositor>) -> Self {
        Self::new(vec![
            Box::new(CompositeTier::new(compositor.clone())),
            Box::new(BaseReencodeTier::new(compositor)),
        ])
    }

    /// Live snapshot, composite, then base re-encode.
    pub fn with_live(live: Arc<dyn LivePresentation>, compositor: Arc<FrameCompositor>) -> Self {
        Self::new(vec![
            Box::new(LiveSnapshotTier::new(live)),
            Box::new(CompositeTier::new(compositor.clone())),
            Box::new(BaseReencodeTier::new(compositor)),
        ])
    }

    /// Tier order.
    pub fn kinds(&self) -> Vec<CaptureTierKind> {
        self.tiers.iter().map(|t| t.kind()).collect()
    }

    /// Walk the tiers for one pair until one yields a frame.
    #[tracing::instrument(
        level = "debug",
        skip(self, request),
        fields(scene = request.scene_number, image = request.image_index)
    )]
    pub async fn capture(
        &self,
        request: &CaptureRequest<'_>,
    ) -> Result<CaptureOutcome, CaptureFailure> {
        let attempts = self.tiers.iter().map(|t| t.capture(request));
        match first_success(attempts).await {
            Ok((i, frame)) => {
                let tier = self.tiers[i].kind();
                for skipped in &self.tiers[..i] {
                    tracing::debug!(tier = skipped.kind().as_str(), "tier fell through");
                }
                tracing::debug!(tier = tier.as_str(), "captured");
                Ok(CaptureOutcome { tier, frame })
            }
            Err(errors) => {
                let attempts: Vec<_> = self.tiers.iter().map(|t| t.kind()).zip(errors).collect();
                for (kind, err) in &attempts {
                    tracing::debug!(tier = kind.as_str(), error = %err, "tier fell through");
                }
                Err(CaptureFailure { attempts })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/resolver.rs"]
mod tests;
