use serde::{Deserialize, Serialize};

use crate::export::cache::{RenderedAssetCache, file_name_for};
use crate::export::roles::FrameRole;
use crate::foundation::error::{StoryframeError, StoryframeResult};
use crate::scene::model::Storyboard;

/// Per-scene mapping from narrative role to multipart field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMetadataEntry {
    pub scene_number: u32,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_frame: Option<String>,
}

impl FrameMetadataEntry {
    pub fn new(scene_number: u32, model: impl Into<String>) -> Self {
        Self {
            scene_number,
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn assign(&mut self, role: FrameRole, field_name: impl Into<String>) {
        let slot = match role {
            FrameRole::OpeningFrame => &mut self.opening_frame,
            FrameRole::ClosingFrame => &mut self.closing_frame,
            FrameRole::BackgroundFrame => &mut self.background_frame,
        };
        *slot = Some(field_name.into());
    }

    pub fn get(&self, role: FrameRole) -> Option<&str> {
        match role {
            FrameRole::OpeningFrame => self.opening_frame.as_deref(),
            FrameRole::ClosingFrame => self.closing_frame.as_deref(),
            FrameRole::BackgroundFrame => self.background_frame.as_deref(),
        }
    }

    /// Number of populated roles.
    pub fn role_count(&self) -> usize {
        [
            &self.opening_frame,
            &self.closing_frame,
            &self.background_frame,
        ]
        .into_iter()
        .filter(|v| v.is_some())
        .count()
    }
}

/// One binary part of the upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackagePart {
    /// Multipart field name; also the value referenced from the metadata.
    pub field_name: String,
    /// Filename sent with the part.
    pub file_name: String,
    pub mime_type: String,
    pub binary: Vec<u8>,
    /// Cache entry the binary was taken from.
    pub cache_key: String,
}

/// Everything the ingestion endpoint receives for one export run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPackage {
    pub user_id: String,
    pub session_id: String,
    pub metadata: Vec<FrameMetadataEntry>,
    pub parts: Vec<PackagePart>,
}

impl UploadPackage {
    /// The `frame_metadata` sidecar.
    pub fn metadata_json(&self) -> StoryframeResult<String> {
        serde_json::to_string(&self.metadata)
            .map_err(|e| StoryframeError::serde(format!("frame metadata: {e}")))
    }

    /// Cache keys of every included binary.
    pub fn cache_keys(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.cache_key.as_str())
    }
}

/// Walk the storyboard in sweep order and collect cached binaries and their roles.
///
/// Images missing from the cache (and without an alias) are left out. Scenes that end up with no
/// binaries get no metadata entry. Zero binaries overall is [`StoryframeError::EmptyCache`].
#[tracing::instrument(level = "debug", skip_all, fields(session = %storyboard.session_id))]
pub fn build_package(
    storyboard: &Storyboard,
    cache: &RenderedAssetCache,
) -> StoryframeResult<UploadPackage> {
    if cache.is_empty() {
        return Err(StoryframeError::EmptyCache);
    }

    let mut metadata = Vec::new();
    let mut parts = Vec::new();
    for scene in &storyboard.scenes {
        let count = scene.frames.len();
        let mut entry = FrameMetadataEntry::new(scene.scene_number, scene.model.clone());
        for index in 0..count {
            let Some(role) = scene.role_rule.role_for(index, count) else {
                tracing::warn!(
                    scene = scene.scene_number,
                    image = index,
                    "no frame role for image position; left out of package"
                );
                continue;
            };
            let Some(asset) = cache.find(scene.scene_number, index) else {
                tracing::debug!(
                    scene = scene.scene_number,
                    image = index,
                    "image not in cache; left out of package"
                );
                continue;
            };

            let field_name = file_name_for(scene.scene_number, index);
            entry.assign(role, field_name.clone());
            parts.push(PackagePart {
                file_name: format!("{field_name}.png"),
                field_name,
                mime_type: asset.mime_type.clone(),
                binary: asset.binary.clone(),
                cache_key: asset.file_name.clone(),
            });
        }
        if entry.role_count() > 0 {
            metadata.push(entry);
        }
    }

    if parts.is_empty() {
        return Err(StoryframeError::EmptyCache);
    }
    tracing::debug!(parts = parts.len(), scenes = metadata.len(), "package built");
    Ok(UploadPackage {
        user_id: storyboard.user_id.clone(),
        session_id: storyboard.session_id.clone(),
        metadata,
        parts,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/package.rs"]
mod tests;
