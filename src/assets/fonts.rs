use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{StoryframeError, StoryframeResult};

/// A font picked for one caption.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    /// Lowercased family key the font was registered under.
    pub key: String,
    /// Raw font file bytes.
    pub bytes: Arc<Vec<u8>>,
}

/// Family name to font bytes lookup.
///
/// Families are keyed case-insensitively by the name the font file declares, and also by the file
/// stem when loaded from a directory. A CSS-style stack (`"Inter, sans-serif"`) resolves to its
/// first registered entry, then to the default font.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: BTreeMap<String, Arc<Vec<u8>>>,
    default_key: Option<String>,
}

impl FontBook {
    /// Empty book; every caption will be skipped until a font is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register font bytes. Returns the family key the font is reachable under.
    pub fn add_font_bytes(
        &mut self,
        alias: Option<&str>,
        bytes: Vec<u8>,
    ) -> StoryframeResult<String> {
        let family = family_name_of(&bytes)?;
        let key = family.to_ascii_lowercase();
        let bytes = Arc::new(bytes);
        if let Some(alias) = alias {
            let alias = alias.trim().to_ascii_lowercase();
            if !alias.is_empty() {
                self.faces.entry(alias).or_insert_with(|| bytes.clone());
            }
        }
        self.faces.entry(key.clone()).or_insert(bytes);
        if self.default_key.is_none() {
            self.default_key = Some(key.clone());
        }
        Ok(key)
    }

    /// Load every `.ttf`/`.otf`/`.ttc` in `dir`. Unreadable files are logged and skipped.
    pub fn load_dir(&mut self, dir: &Path) -> StoryframeResult<usize> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            StoryframeError::config(format!("read font dir '{}': {e}", dir.display()))
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| is_font_file(p))
            .collect();
        paths.sort();

        let mut loaded = 0usize;
        for path in paths {
            let stem = path.file_stem().and_then(|s| s.to_str());
            match std::fs::read(&path)
                .map_err(|e| StoryframeError::load(e.to_string()))
                .and_then(|bytes| self.add_font_bytes(stem, bytes))
            {
                Ok(key) => {
                    tracing::debug!(path = %path.display(), family = %key, "registered font");
                    loaded += 1;
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping font"),
            }
        }
        Ok(loaded)
    }

    /// Register a font file and make it the fallback for unknown families.
    pub fn set_default_font_file(&mut self, path: &Path) -> StoryframeResult<()> {
        let bytes = std::fs::read(path).map_err(|e| {
            StoryframeError::config(format!("read default font '{}': {e}", path.display()))
        })?;
        let stem = path.file_stem().and_then(|s| s.to_str());
        let key = self.add_font_bytes(stem, bytes)?;
        self.default_key = Some(key);
        Ok(())
    }

    /// Number of distinct lookup keys.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// True when no font is registered.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Pick the font for a caption's `font_family`.
    pub fn resolve(&self, family: Option<&str>) -> Option<ResolvedFont> {
        if let Some(stack) = family {
            for name in stack.split(',') {
                let key = name
                    .trim()
                    .trim_matches(|c| c == '"' || c == '\'')
                    .to_ascii_lowercase();
                if let Some(bytes) = self.faces.get(&key) {
                    return Some(ResolvedFont {
                        key,
                        bytes: bytes.clone(),
                    });
                }
            }
        }
        let key = self.default_key.as_ref()?;
        self.faces.get(key).map(|bytes| ResolvedFont {
            key: key.clone(),
            bytes: bytes.clone(),
        })
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
        .unwrap_or(false)
}

fn family_name_of(bytes: &[u8]) -> StoryframeResult<String> {
    let mut ctx = parley::FontContext::default();
    let families = ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| StoryframeError::decode("no font families found in font bytes"))?;
    ctx.collection
        .family_name(family_id)
        .map(str::to_string)
        .ok_or_else(|| StoryframeError::decode("registered font family has no name"))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Style inputs for shaping one line.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LineStyle {
    pub(crate) size_px: f32,
    pub(crate) weight: f32,
    pub(crate) italic: bool,
    pub(crate) letter_spacing_px: f32,
}

/// Stateful helper for building Parley layouts from [`FontBook`] fonts.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font: &ResolvedFont) -> StoryframeResult<String> {
        if let Some(name) = self.families.get(&font.key) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StoryframeError::render("no font families registered from font bytes")
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StoryframeError::render("registered font family has no name"))?
            .to_string();
        self.families.insert(font.key.clone(), name.clone());
        Ok(name)
    }

    /// Shape a single line without wrapping.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        style: LineStyle,
    ) -> StoryframeResult<parley::Layout<TextBrushRgba8>> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(StoryframeError::render(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(style.weight),
        ));
        if style.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        if style.letter_spacing_px != 0.0 && style.letter_spacing_px.is_finite() {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(
                style.letter_spacing_px,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        }));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
