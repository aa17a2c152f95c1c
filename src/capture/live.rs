use async_trait::async_trait;

use crate::foundation::error::StoryframeResult;
use crate::render::surface::FrameRGBA;

/// The surrounding UI's live view of the storyboard.
///
/// Only one (scene, image) pair is shown at a time. Callers must switch to the pair and let it
/// settle before taking a snapshot.
#[async_trait]
pub trait LivePresentation: Send + Sync {
    /// Pair currently on screen, if any.
    fn current(&self) -> Option<(u32, usize)>;

    /// Show `(scene_number, image_index)`.
    async fn switch_to(&self, scene_number: u32, image_index: usize) -> StoryframeResult<()>;

    /// Resolve once the last switch is fully visible.
    async fn settle(&self);

    /// Show or hide captions; returns the previous visibility.
    fn set_text_visible(&self, visible: bool) -> bool;

    /// Grab what is on screen. `None` when no live element is available.
    async fn snapshot(
        &self,
        scene_number: u32,
        image_index: usize,
    ) -> StoryframeResult<Option<FrameRGBA>>;
}

/// Restores caption visibility when dropped, whether or not the snapshot succeeded.
pub(crate) struct TextVisibilityGuard<'a> {
    live: &'a dyn LivePresentation,
    previous: bool,
}

impl<'a> TextVisibilityGuard<'a> {
    pub(crate) fn hide(live: &'a dyn LivePresentation) -> Self {
        let previous = live.set_text_visible(false);
        Self { live, previous }
    }
}

impl Drop for TextVisibilityGuard<'_> {
    fn drop(&mut self) {
        self.live.set_text_visible(self.previous);
    }
}
