use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::capture::tiers::CaptureOptions;
use crate::foundation::core::Size;
use crate::foundation::error::StoryframeError;
use crate::scene::model::Frame;

struct ScriptedTier {
    kind: CaptureTierKind,
    succeed: bool,
    calls: Arc<Mutex<Vec<CaptureTierKind>>>,
}

#[async_trait]
impl CaptureTier for ScriptedTier {
    fn kind(&self) -> CaptureTierKind {
        self.kind
    }

    async fn capture(&self, _request: &CaptureRequest<'_>) -> Result<FrameRGBA, CaptureError> {
        self.calls.lock().unwrap().push(self.kind);
        if self.succeed {
            Ok(FrameRGBA::transparent(Size::new(1, 1)?))
        } else {
            Err(CaptureError::Failed(StoryframeError::load("unreachable")))
        }
    }
}

fn resolver(plan: [bool; 3]) -> (CaptureResolver, Arc<Mutex<Vec<CaptureTierKind>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let kinds = [
        CaptureTierKind::LiveSnapshot,
        CaptureTierKind::Composite,
        CaptureTierKind::BaseReencode,
    ];
    let tiers = kinds
        .into_iter()
        .zip(plan)
        .map(|(kind, succeed)| {
            Box::new(ScriptedTier {
                kind,
                succeed,
                calls: calls.clone(),
            }) as Box<dyn CaptureTier>
        })
        .collect();
    (CaptureResolver::new(tiers), calls)
}

fn req(frame: &Frame) -> CaptureRequest<'_> {
    CaptureRequest {
        scene_number: 1,
        image_index: 0,
        frame,
        options: CaptureOptions::EXPORT,
    }
}

#[tokio::test]
async fn first_tier_success_stops_the_chain() {
    let (r, calls) = resolver([true, true, true]);
    let frame = Frame::new("b.png", None);
    let out = r.capture(&req(&frame)).await.unwrap();
    assert_eq!(out.tier, CaptureTierKind::LiveSnapshot);
    assert_eq!(*calls.lock().unwrap(), vec![CaptureTierKind::LiveSnapshot]);
}

#[tokio::test]
async fn falls_through_in_order() {
    let (r, calls) = resolver([false, false, true]);
    let frame = Frame::new("b.png", None);
    let out = r.capture(&req(&frame)).await.unwrap();
    assert_eq!(out.tier, CaptureTierKind::BaseReencode);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            CaptureTierKind::LiveSnapshot,
            CaptureTierKind::Composite,
            CaptureTierKind::BaseReencode,
        ]
    );
}

#[tokio::test]
async fn failure_only_after_every_tier_failed() {
    let (r, calls) = resolver([false, false, false]);
    let frame = Frame::new("b.png", None);
    let failure = r.capture(&req(&frame)).await.unwrap_err();
    let kinds: Vec<_> = failure.attempts.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, r.kinds());
    assert_eq!(calls.lock().unwrap().len(), 3);
    assert!(failure.to_string().contains("composite: load error"));
}

#[tokio::test]
async fn first_success_creates_futures_lazily() {
    let created = Mutex::new(Vec::new());
    let attempts = (0..4).map(|i| {
        created.lock().unwrap().push(i);
        async move { if i == 1 { Ok(i * 10) } else { Err(i) } }
    });
    let out = first_success(attempts).await;
    assert_eq!(out, Ok((1, 10)));
    assert_eq!(*created.lock().unwrap(), vec![0, 1]);
}

#[tokio::test]
async fn first_success_collects_errors_in_order() {
    let attempts = ["a", "b"].map(|e| async move { Err::<(), _>(e) });
    assert_eq!(first_success(attempts).await, Err(vec!["a", "b"]));
}

#[test]
fn constructors_order_tiers() {
    use crate::assets::fonts::FontBook;
    use crate::assets::loader::MemoryImageLoader;

    let c = Arc::new(FrameCompositor::new(
        Arc::new(MemoryImageLoader::new()),
        Arc::new(FontBook::new()),
    ));
    assert_eq!(
        CaptureResolver::offline(c.clone()).kinds(),
        vec![CaptureTierKind::Composite, CaptureTierKind::BaseReencode]
    );

    struct NoLive;

    #[async_trait]
    impl LivePresentation for NoLive {
        fn current(&self) -> Option<(u32, usize)> {
            None
        }
        async fn switch_to(&self, _: u32, _: usize) -> crate::foundation::error::StoryframeResult<()> {
            Ok(())
        }
        async fn settle(&self) {}
        fn set_text_visible(&self, visible: bool) -> bool {
            visible
        }
        async fn snapshot(
            &self,
            _: u32,
            _: usize,
        ) -> crate::foundation::error::StoryframeResult<Option<FrameRGBA>> {
            Ok(None)
        }
    }

    assert_eq!(
        CaptureResolver::with_live(Arc::new(NoLive), c).kinds(),
        vec![
            CaptureTierKind::LiveSnapshot,
            CaptureTierKind::Composite,
            CaptureTierKind::BaseReencode,
        ]
    );
}
