use serde::{Deserialize, Serialize};

/// Narrative role a rendered frame plays in its scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRole {
    OpeningFrame,
    ClosingFrame,
    BackgroundFrame,
}

impl FrameRole {
    /// Key used in the frame metadata JSON.
    pub fn key(self) -> &'static str {
        match self {
            Self::OpeningFrame => "opening_frame",
            Self::ClosingFrame => "closing_frame",
            Self::BackgroundFrame => "background_frame",
        }
    }
}

/// How a scene's image positions map onto [`FrameRole`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleRule {
    /// `0 -> opening`, `1 -> closing`.
    #[default]
    #[serde(alias = "opening-closing", alias = "openingClosing")]
    OpeningClosing,
    /// `0 -> background`, `1 -> closing`.
    Background,
    /// A lone image becomes the background; otherwise like `OpeningClosing`.
    #[serde(alias = "combine-single", alias = "combineSingle")]
    CombineSingle,
}

const OPENING_CLOSING: &[FrameRole] = &[FrameRole::OpeningFrame, FrameRole::ClosingFrame];
const BACKGROUND_CLOSING: &[FrameRole] = &[FrameRole::BackgroundFrame, FrameRole::ClosingFrame];
const SINGLE_BACKGROUND: &[FrameRole] = &[FrameRole::BackgroundFrame];

impl RoleRule {
    /// Roles by position for a scene with `image_count` resolved images.
    pub fn table(self, image_count: usize) -> &'static [FrameRole] {
        match self {
            Self::OpeningClosing => OPENING_CLOSING,
            Self::Background => BACKGROUND_CLOSING,
            Self::CombineSingle if image_count == 1 => SINGLE_BACKGROUND,
            Self::CombineSingle => OPENING_CLOSING,
        }
    }

    /// Role of the image at `index`, or `None` past the end of the table.
    pub fn role_for(self, index: usize, image_count: usize) -> Option<FrameRole> {
        self.table(image_count).get(index).copied()
    }
}
