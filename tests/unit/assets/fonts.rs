use super::*;

fn local_font() -> Option<Vec<u8>> {
    [
        "assets/PlayfairDisplay.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}

#[test]
fn empty_book_resolves_nothing() {
    let book = FontBook::new();
    assert!(book.is_empty());
    assert!(book.resolve(Some("Inter")).is_none());
    assert!(book.resolve(None).is_none());
}

#[test]
fn garbage_bytes_are_rejected() {
    let mut book = FontBook::new();
    assert!(book.add_font_bytes(Some("junk"), b"nope".to_vec()).is_err());
    assert!(book.is_empty());
}

#[test]
fn missing_font_dir_is_config_error() {
    let mut book = FontBook::new();
    let err = book
        .load_dir(Path::new("/definitely/not/a/font/dir"))
        .unwrap_err();
    assert!(matches!(err, StoryframeError::Config(_)));
}

#[test]
fn resolve_walks_css_stack_then_default() {
    let Some(bytes) = local_font() else {
        return;
    };
    let mut book = FontBook::new();
    let key = book.add_font_bytes(Some("Brand"), bytes).unwrap();

    let f = book.resolve(Some("'Brand', sans-serif")).unwrap();
    assert_eq!(f.key, "brand");

    let f = book.resolve(Some("Nonexistent, serif")).unwrap();
    assert_eq!(f.key, key);

    let f = book.resolve(None).unwrap();
    assert_eq!(f.key, key);
}

#[test]
fn text_layout_smoke_with_local_font_if_present() {
    let Some(bytes) = local_font() else {
        return;
    };
    let mut book = FontBook::new();
    book.add_font_bytes(None, bytes).unwrap();
    let font = book.resolve(None).unwrap();

    let mut engine = TextLayoutEngine::new();
    let style = LineStyle {
        size_px: 48.0,
        weight: 700.0,
        italic: false,
        letter_spacing_px: 0.0,
    };
    let layout = engine.layout_line("hello", &font, style).unwrap();
    assert!(layout.lines().next().is_some());
    assert!(layout.width() > 0.0);

    let bad = LineStyle {
        size_px: 0.0,
        ..style
    };
    assert!(engine.layout_line("hello", &font, bad).is_err());
}
