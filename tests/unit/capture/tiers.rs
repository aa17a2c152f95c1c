use std::io::Cursor;
use std::sync::Mutex;

use super::*;
use crate::assets::fonts::FontBook;
use crate::assets::loader::MemoryImageLoader;
use crate::foundation::core::Size;
use crate::foundation::error::StoryframeResult;

#[derive(Default)]
struct FakeState {
    current: Option<(u32, usize)>,
    text_visible: bool,
    log: Vec<String>,
}

struct FakeLive {
    state: Mutex<FakeState>,
    snapshot_fails: bool,
    snapshot_empty: bool,
}

impl FakeLive {
    fn new(current: Option<(u32, usize)>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                current,
                text_visible: true,
                log: Vec::new(),
            }),
            snapshot_fails: false,
            snapshot_empty: false,
        }
    }

    fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    fn text_visible(&self) -> bool {
        self.state.lock().unwrap().text_visible
    }
}

#[async_trait]
impl LivePresentation for FakeLive {
    fn current(&self) -> Option<(u32, usize)> {
        self.state.lock().unwrap().current
    }

    async fn switch_to(&self, scene_number: u32, image_index: usize) -> StoryframeResult<()> {
        let mut s = self.state.lock().unwrap();
        s.current = Some((scene_number, image_index));
        s.log.push(format!("switch {scene_number}/{image_index}"));
        Ok(())
    }

    async fn settle(&self) {
        self.state.lock().unwrap().log.push("settle".to_string());
    }

    fn set_text_visible(&self, visible: bool) -> bool {
        let mut s = self.state.lock().unwrap();
        s.log.push(format!("text {visible}"));
        std::mem::replace(&mut s.text_visible, visible)
    }

    async fn snapshot(
        &self,
        scene_number: u32,
        image_index: usize,
    ) -> StoryframeResult<Option<FrameRGBA>> {
        let mut s = self.state.lock().unwrap();
        let visible = s.text_visible;
        s.log.push(format!("snapshot {scene_number}/{image_index} visible={visible}"));
        if self.snapshot_fails {
            return Err(StoryframeError::render("element detached"));
        }
        if self.snapshot_empty {
            return Ok(None);
        }
        Ok(Some(FrameRGBA::transparent(Size::new(4, 4)?)))
    }
}

fn request(frame: &Frame, options: CaptureOptions) -> CaptureRequest<'_> {
    CaptureRequest {
        scene_number: 2,
        image_index: 1,
        frame,
        options,
    }
}

#[tokio::test]
async fn live_switches_and_settles_before_snapshot() {
    let live = Arc::new(FakeLive::new(Some((1, 0))));
    let tier = LiveSnapshotTier::new(live.clone());
    let frame = Frame::new("base.png", None);

    let out = tier
        .capture(&request(&frame, CaptureOptions::EXPORT))
        .await
        .unwrap();
    assert_eq!(out.width, 4);
    assert_eq!(
        live.log(),
        vec![
            "switch 2/1",
            "settle",
            "text false",
            "snapshot 2/1 visible=false",
            "text true",
        ]
    );
    assert!(live.text_visible());
}

#[tokio::test]
async fn live_skips_switch_when_already_shown() {
    let live = Arc::new(FakeLive::new(Some((2, 1))));
    let tier = LiveSnapshotTier::new(live.clone());
    let frame = Frame::new("base.png", None);
    let opts = CaptureOptions {
        include_text: true,
        ..CaptureOptions::EXPORT
    };

    tier.capture(&request(&frame, opts)).await.unwrap();
    assert_eq!(live.log(), vec!["snapshot 2/1 visible=true"]);
}

#[tokio::test]
async fn live_restores_text_even_when_snapshot_fails() {
    let mut fake = FakeLive::new(Some((2, 1)));
    fake.snapshot_fails = true;
    let live = Arc::new(fake);
    let tier = LiveSnapshotTier::new(live.clone());
    let frame = Frame::new("base.png", None);

    let err = tier
        .capture(&request(&frame, CaptureOptions::EXPORT))
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::Failed(_)));
    assert!(live.text_visible());
    assert_eq!(live.log().last().map(String::as_str), Some("text true"));
}

#[tokio::test]
async fn live_without_element_is_empty() {
    let mut fake = FakeLive::new(Some((2, 1)));
    fake.snapshot_empty = true;
    let tier = LiveSnapshotTier::new(Arc::new(fake));
    let frame = Frame::new("base.png", None);
    let err = tier
        .capture(&request(&frame, CaptureOptions::EXPORT))
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::Empty));
}

#[tokio::test]
async fn live_is_skipped_when_not_applicable() {
    let live = Arc::new(FakeLive::new(None));
    let tier = LiveSnapshotTier::new(live.clone());

    let mut locked = Frame::new("base.png", None);
    locked.overlays_bakeable = false;
    let err = tier
        .capture(&request(&locked, CaptureOptions::EXPORT))
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::Skipped(_)));

    let frame = Frame::new("base.png", None);
    for opts in [
        CaptureOptions {
            prefer_live: false,
            ..CaptureOptions::EXPORT
        },
        CaptureOptions {
            include_overlays: false,
            ..CaptureOptions::EXPORT
        },
    ] {
        let err = tier.capture(&request(&frame, opts)).await.unwrap_err();
        assert!(matches!(err, CaptureError::Skipped(_)));
    }
    assert!(live.log().is_empty());
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([9, 9, 9, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn compositor(loader: MemoryImageLoader) -> Arc<FrameCompositor> {
    Arc::new(FrameCompositor::new(
        Arc::new(loader),
        Arc::new(FontBook::new()),
    ))
}

#[tokio::test]
async fn composite_and_reencode_tiers_use_the_base_image() {
    let c = compositor(MemoryImageLoader::new().with("base.png", png(6, 4)));
    let frame = Frame::new("base.png", None);
    let req = request(&frame, CaptureOptions::EXPORT);

    let a = CompositeTier::new(c.clone()).capture(&req).await.unwrap();
    let b = BaseReencodeTier::new(c).capture(&req).await.unwrap();
    assert_eq!((a.width, a.height), (6, 4));
    assert_eq!(a, b);
}

#[tokio::test]
async fn offline_tiers_are_empty_without_base() {
    let c = compositor(MemoryImageLoader::new());
    let frame = Frame::new("missing.png", None);
    let req = request(&frame, CaptureOptions::EXPORT);

    assert!(matches!(
        CompositeTier::new(c.clone()).capture(&req).await,
        Err(CaptureError::Empty)
    ));
    assert!(matches!(
        BaseReencodeTier::new(c).capture(&req).await,
        Err(CaptureError::Empty)
    ));
}

#[test]
fn tier_kinds_order_by_fidelity() {
    assert!(CaptureTierKind::LiveSnapshot < CaptureTierKind::Composite);
    assert!(CaptureTierKind::Composite < CaptureTierKind::BaseReencode);
    assert_eq!(CaptureTierKind::BaseReencode.as_str(), "base_reencode");
}
