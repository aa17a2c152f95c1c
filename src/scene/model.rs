use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::export::roles::RoleRule;
use crate::foundation::core::Size;
use crate::foundation::error::{StoryframeError, StoryframeResult};
use crate::scene::color::ColorDef;

/// Font size used when a text element does not carry one (normalized, fraction of height).
pub const DEFAULT_FONT_SIZE: f64 = 0.04;
/// Line height multiplier used when a text element does not carry one.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

/// Rectangle in either normalized (`0..=1`) or absolute-pixel units.
///
/// The unit convention is not stored; see [`crate::layout::Geometry::classify`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, when known.
    pub width: Option<f64>,
    /// Height, when known.
    pub height: Option<f64>,
}

/// Horizontal alignment of text lines within their box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
    /// Same as left for left-to-right text.
    Start,
    /// Same as right for left-to-right text.
    End,
    /// Lines are not stretched; laid out like left.
    Justify,
}

/// Which point of the text content the bounding box position refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Box position is the content's top-left corner.
    #[default]
    #[serde(alias = "top-left", alias = "topLeft")]
    TopLeft,
    /// Box position (plus half the box size, if known) is the content's center.
    Center,
}

/// Uniform drop shadow behind text.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextShadow {
    /// Whether the shadow is drawn at all.
    pub enabled: bool,
    /// Shadow color.
    pub color: ColorDef,
    /// Blur radius in pixels.
    pub blur: f64,
    /// Horizontal offset in pixels.
    #[serde(alias = "offsetX")]
    pub offset_x: f64,
    /// Vertical offset in pixels.
    #[serde(alias = "offsetY")]
    pub offset_y: f64,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            enabled: true,
            color: ColorDef::rgba(0.0, 0.0, 0.0, 0.5),
            blur: 4.0,
            offset_x: 2.0,
            offset_y: 2.0,
        }
    }
}

/// Glow intensity. Each tier maps to a fixed stack of soft blurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlowTier {
    /// One faint layer.
    Subtle,
    /// Two layers.
    Medium,
    /// Three wide layers.
    Strong,
    /// Three tight, saturated layers.
    Neon,
}

/// Fill mode that replaces the plain text color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillStyle {
    /// Diagonal two-stop gradient.
    #[serde(rename = "gradient")]
    Gradient,
    /// Stroke only, no fill.
    #[serde(rename = "outline")]
    Outline,
    /// Fill plus two hard offset copies.
    #[serde(rename = "3d")]
    ThreeD,
    /// Vertical chrome-like gradient.
    #[serde(rename = "metallic")]
    Metallic,
    /// Horizontal hue sweep.
    #[serde(rename = "gradient-rainbow", alias = "gradient_rainbow")]
    GradientRainbow,
}

/// Upright or slanted glyphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic (oblique is treated the same).
    #[serde(alias = "oblique")]
    Italic,
}

/// CSS-style numeric font weight (`100..=900`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FontWeight(pub f32);

impl Default for FontWeight {
    fn default() -> Self {
        Self(400.0)
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f32),
            Str(String),
        }

        let w = match Repr::deserialize(deserializer)? {
            Repr::Num(n) => n,
            Repr::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "normal" | "regular" => 400.0,
                "bold" => 700.0,
                "lighter" | "light" => 300.0,
                "bolder" => 800.0,
                other => other.parse::<f32>().map_err(|_| {
                    serde::de::Error::custom(format!("unsupported font weight \"{s}\""))
                })?,
            },
        };
        Ok(Self(w.clamp(1.0, 1000.0)))
    }
}

/// A positioned caption.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextElement {
    /// Text; `\n` starts a new line.
    pub text: String,
    /// Placement.
    #[serde(alias = "boundingBox")]
    pub bounding_box: BoundingBox,
    /// Font size: `<= 2` is a fraction of the container height, otherwise pixels.
    #[serde(alias = "fontSize")]
    pub font_size: Option<f64>,
    /// Requested family name.
    #[serde(alias = "fontFamily")]
    pub font_family: Option<String>,
    /// Weight.
    #[serde(alias = "fontWeight")]
    pub font_weight: FontWeight,
    /// Upright or italic.
    #[serde(alias = "fontStyle")]
    pub font_style: FontStyle,
    /// Plain fill color.
    pub color: ColorDef,
    /// Line advance as a multiple of the font size.
    #[serde(alias = "lineHeight")]
    pub line_height: Option<f64>,
    /// Extra spacing between glyphs, in pixels.
    #[serde(alias = "letterSpacing")]
    pub letter_spacing: f64,
    /// `0..=1`.
    pub opacity: Option<f64>,
    /// Horizontal alignment within the box.
    #[serde(alias = "textAlign")]
    pub align: TextAlign,
    /// Anchor point of the box position.
    #[serde(alias = "anchor_point", alias = "anchorPoint")]
    pub anchor: Anchor,
    /// Optional drop shadow.
    pub shadow: Option<TextShadow>,
    /// Optional glow tier.
    pub glow: Option<GlowTier>,
    /// Glow color; defaults to the text color.
    #[serde(alias = "glowColor")]
    pub glow_color: Option<ColorDef>,
    /// Fill mode overriding `color`.
    #[serde(alias = "fillStyle")]
    pub fill_style: Option<FillStyle>,
    /// Chip drawn behind the text.
    #[serde(alias = "backgroundColor")]
    pub background_color: Option<ColorDef>,
    /// Explicit stacking order.
    #[serde(alias = "zIndex")]
    pub z_index: Option<i64>,
}

impl Default for TextElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            bounding_box: BoundingBox::default(),
            font_size: None,
            font_family: None,
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            color: ColorDef::WHITE,
            line_height: None,
            letter_spacing: 0.0,
            opacity: None,
            align: TextAlign::default(),
            anchor: Anchor::default(),
            shadow: None,
            glow: None,
            glow_color: None,
            fill_style: None,
            background_color: None,
            z_index: None,
        }
    }
}

impl TextElement {
    /// Font size as recorded, or the default.
    pub fn font_size_or_default(&self) -> f64 {
        self.font_size
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Line height multiplier, or the default.
    pub fn line_height_or_default(&self) -> f64 {
        self.line_height
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_LINE_HEIGHT)
    }

    /// Opacity clamped into `0..=1`.
    pub fn opacity_or_default(&self) -> f32 {
        self.opacity.unwrap_or(1.0).clamp(0.0, 1.0) as f32
    }
}

/// A secondary image (chart, cut-out avatar, logo) drawn over the base image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayElement {
    /// Primary image reference.
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
    /// Alias used by some overlay producers.
    #[serde(alias = "overlayUrl")]
    pub overlay_url: Option<String>,
    /// Alias.
    pub url: Option<String>,
    /// Alias.
    pub src: Option<String>,
    /// Alias.
    pub image: Option<String>,
    /// Placement.
    #[serde(alias = "boundingBox")]
    pub bounding_box: BoundingBox,
    /// Clockwise rotation in degrees about the box center.
    pub rotation: f64,
    /// `0..=1`.
    pub opacity: Option<f64>,
    /// Explicit stacking order.
    #[serde(alias = "zIndex")]
    pub z_index: Option<i64>,
    /// Source already had its background stripped.
    #[serde(alias = "backgroundRemoved")]
    pub background_removed: bool,
    /// Identity tag.
    #[serde(alias = "elementId")]
    pub element_id: Option<String>,
    /// Identity tag.
    #[serde(alias = "labelName")]
    pub label_name: Option<String>,
}

impl OverlayElement {
    /// First non-empty image reference among the aliased fields.
    pub fn image_ref(&self) -> Option<&str> {
        [
            &self.image_url,
            &self.overlay_url,
            &self.url,
            &self.src,
            &self.image,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .map(str::trim)
        .find(|v| !v.is_empty())
    }

    /// Opacity clamped into `0..=1`.
    pub fn opacity_or_default(&self) -> f32 {
        self.opacity.unwrap_or(1.0).clamp(0.0, 1.0) as f32
    }
}

fn default_true() -> bool {
    true
}

/// One renderable scene image: a base image plus its element metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Base image reference.
    #[serde(default, alias = "image_url", alias = "imageUrl", alias = "baseImage")]
    pub base_image: Option<String>,
    /// Recorded pixel width of the base image.
    #[serde(default)]
    pub width: Option<f64>,
    /// Recorded pixel height of the base image.
    #[serde(default)]
    pub height: Option<f64>,
    /// Captions.
    #[serde(default, alias = "textElements")]
    pub text_elements: Vec<TextElement>,
    /// Image overlays.
    #[serde(default, alias = "overlayElements")]
    pub overlay_elements: Vec<OverlayElement>,
    /// `false` when this element set must never have overlays baked into a saved frame.
    #[serde(default = "default_true", alias = "overlaysBakeable")]
    pub overlays_bakeable: bool,
}

impl Frame {
    /// Frame with just a base image and recorded size.
    pub fn new(base_image: impl Into<String>, size: Option<Size>) -> Self {
        Self {
            base_image: Some(base_image.into()),
            width: size.map(Size::w),
            height: size.map(Size::h),
            text_elements: Vec::new(),
            overlay_elements: Vec::new(),
            overlays_bakeable: true,
        }
    }

    /// Trimmed base image reference, if any.
    pub fn base_image_ref(&self) -> Option<&str> {
        self.base_image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Recorded size when both dimensions are present and positive.
    pub fn recorded_size(&self) -> Option<Size> {
        Size::from_recorded(self.width, self.height)
    }
}

/// One storyboard scene and its resolved, ordered image list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// 1-based scene number as shown to the user.
    #[serde(alias = "sceneNumber")]
    pub scene_number: u32,
    /// Content-generation model identifier, passed through to the frame metadata.
    #[serde(default)]
    pub model: String,
    /// How image positions map to narrative roles.
    #[serde(default, alias = "roleRule")]
    pub role_rule: RoleRule,
    /// Ordered frames (typically 1-2).
    #[serde(default, alias = "images")]
    pub frames: Vec<Frame>,
}

/// A whole storyboard as handed over by the scene/version resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    /// Owner of the session.
    #[serde(alias = "userId")]
    pub user_id: String,
    /// Session the frames belong to.
    #[serde(alias = "sessionId")]
    pub session_id: String,
    /// Scenes in document order.
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl Storyboard {
    /// Parse a storyboard manifest from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> StoryframeResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| StoryframeError::serde(format!("storyboard manifest: {e}")))
    }

    /// Check identifiers and scene numbering.
    pub fn validate(&self) -> StoryframeResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(StoryframeError::validation("user_id must be non-empty"));
        }
        if self.session_id.trim().is_empty() {
            return Err(StoryframeError::validation("session_id must be non-empty"));
        }
        let mut seen = BTreeSet::new();
        for scene in &self.scenes {
            if !seen.insert(scene.scene_number) {
                return Err(StoryframeError::validation(format!(
                    "duplicate scene_number {}",
                    scene.scene_number
                )));
            }
        }
        Ok(())
    }

    /// Look up a scene by its number.
    pub fn scene(&self, scene_number: u32) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.scene_number == scene_number)
    }

    /// Total number of (scene, image) pairs.
    pub fn image_count(&self) -> usize {
        self.scenes.iter().map(|s| s.frames.len()).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
