use std::collections::BTreeMap;
use std::time::Duration;

use crate::capture::resolver::CaptureResolver;
use crate::capture::tiers::{CaptureOptions, CaptureRequest, CaptureTierKind};
use crate::export::cache::{RenderedAsset, RenderedAssetCache};
use crate::export::package::{UploadPackage, build_package};
use crate::export::upload::{UploadAck, Uploader};
use crate::foundation::error::StoryframeResult;
use crate::scene::model::Storyboard;

/// Outcome of one render sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// (scene, image) pairs visited.
    pub attempted: usize,
    /// Pairs that landed in the cache.
    pub rendered: usize,
    /// Pairs where every tier failed, or the PNG encode did.
    pub failures: usize,
    /// Successful captures per tier.
    pub tier_counts: BTreeMap<CaptureTierKind, usize>,
}

impl SweepReport {
    /// Non-fatal summary for partial failures.
    pub fn warning(&self) -> Option<String> {
        (self.failures > 0 && self.rendered > 0)
            .then(|| format!("{} images could not be saved", self.failures))
    }
}

/// Result of a full render, package and upload run.
#[derive(Clone, Debug)]
pub struct ExportOutcome {
    pub report: SweepReport,
    pub ack: UploadAck,
    /// Binaries that were uploaded.
    pub uploaded: usize,
}

/// One export run and the binaries it has rendered so far.
///
/// At most one session should be active per storyboard; the cache is not shared.
pub struct ExportSession {
    resolver: CaptureResolver,
    cache: RenderedAssetCache,
    pacing: Duration,
    options: CaptureOptions,
}

impl ExportSession {
    pub fn new(resolver: CaptureResolver) -> Self {
        Self {
            resolver,
            cache: RenderedAssetCache::new(),
            pacing: Duration::ZERO,
            options: CaptureOptions::EXPORT,
        }
    }

    /// Pause between consecutive captures.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_capture_options(mut self, options: CaptureOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cache(&self) -> &RenderedAssetCache {
        &self.cache
    }

    /// Step 1: clear the cache, then capture every (scene, image) pair in document order.
    ///
    /// Per-pair failures are counted, never returned.
    #[tracing::instrument(level = "info", skip_all, fields(session = %storyboard.session_id))]
    pub async fn render_sweep(&mut self, storyboard: &Storyboard) -> SweepReport {
        self.cache.clear();
        let mut report = SweepReport::default();

        for scene in &storyboard.scenes {
            for (image_index, frame) in scene.frames.iter().enumerate() {
                if report.attempted > 0 && !self.pacing.is_zero() {
                    tokio::time::sleep(self.pacing).await;
                }
                report.attempted += 1;

                let request = CaptureRequest {
                    scene_number: scene.scene_number,
                    image_index,
                    frame,
                    options: self.options,
                };
                let outcome = match self.resolver.capture(&request).await {
                    Ok(o) => o,
                    Err(failure) => {
                        tracing::warn!(
                            scene = scene.scene_number,
                            image = image_index,
                            error = %failure,
                            "frame could not be captured"
                        );
                        report.failures += 1;
                        continue;
                    }
                };

                match outcome.frame.encode_png() {
                    Ok(png) => {
                        self.cache
                            .put(RenderedAsset::png(scene.scene_number, image_index, png));
                        report.rendered += 1;
                        *report.tier_counts.entry(outcome.tier).or_default() += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            scene = scene.scene_number,
                            image = image_index,
                            error = %e,
                            "captured frame could not be encoded"
                        );
                        report.failures += 1;
                    }
                }
            }
        }

        tracing::info!(
            attempted = report.attempted,
            rendered = report.rendered,
            failures = report.failures,
            "render sweep finished"
        );
        if let Some(w) = report.warning() {
            tracing::warn!("{w}");
        }
        report
    }

    /// Step 2: build the upload package from the cache.
    pub fn build_package(&self, storyboard: &Storyboard) -> StoryframeResult<UploadPackage> {
        build_package(storyboard, &self.cache)
    }

    /// Step 3: upload `package`. On success the included binaries leave the cache; on failure
    /// the cache is untouched so a retry can skip the sweep.
    #[tracing::instrument(level = "info", skip_all, fields(session = %package.session_id))]
    pub async fn upload(
        &mut self,
        package: &UploadPackage,
        uploader: &dyn Uploader,
    ) -> StoryframeResult<UploadAck> {
        let ack = uploader.upload(package).await?;
        for key in package.cache_keys() {
            self.cache.delete(key);
        }
        if !self.cache.is_empty() {
            tracing::debug!(left = self.cache.size(), "cache entries left after upload");
        }
        Ok(ack)
    }

    /// Steps 1 to 3 in sequence.
    pub async fn run(
        &mut self,
        storyboard: &Storyboard,
        uploader: &dyn Uploader,
    ) -> StoryframeResult<ExportOutcome> {
        storyboard.validate()?;
        let report = self.render_sweep(storyboard).await;
        let package = self.build_package(storyboard)?;
        let ack = self.upload(&package, uploader).await?;
        Ok(ExportOutcome {
            report,
            ack,
            uploaded: package.parts.len(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/session.rs"]
mod tests;
