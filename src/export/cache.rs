use std::collections::BTreeMap;

/// MIME type of every exported still.
pub const PNG_MIME: &str = "image/png";

/// Deterministic cache key for a (scene, image) pair: `scene-<N>-image-<K+1>`.
pub fn file_name_for(scene_number: u32, image_index: usize) -> String {
    format!("scene-{scene_number}-image-{}", image_index + 1)
}

/// Recover `(scene_number, image_index)` from a key that contains `scene-<N>-image-<K>`.
///
/// Prefixes and a trailing extension are tolerated so renamed entries still match.
pub fn parse_file_name(name: &str) -> Option<(u32, usize)> {
    let start = name.find("scene-")?;
    let rest = &name[start + "scene-".len()..];
    let (scene, rest) = rest.split_once("-image-")?;
    let scene = scene.parse::<u32>().ok()?;
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    let k = digits.parse::<usize>().ok()?;
    Some((scene, k.checked_sub(1)?))
}

/// One exported binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedAsset {
    pub file_name: String,
    pub binary: Vec<u8>,
    pub mime_type: String,
}

impl RenderedAsset {
    /// PNG asset for a (scene, image) pair.
    pub fn png(scene_number: u32, image_index: usize, binary: Vec<u8>) -> Self {
        Self {
            file_name: file_name_for(scene_number, image_index),
            binary,
            mime_type: PNG_MIME.to_string(),
        }
    }
}

/// Run-scoped store of exported binaries keyed by file name.
#[derive(Clone, Debug, Default)]
pub struct RenderedAssetCache {
    entries: BTreeMap<String, RenderedAsset>,
}

impl RenderedAssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Store `asset` under its file name, replacing any previous entry.
    pub fn put(&mut self, asset: RenderedAsset) {
        self.entries.insert(asset.file_name.clone(), asset);
    }

    pub fn get(&self, name: &str) -> Option<&RenderedAsset> {
        self.entries.get(name)
    }

    /// Exact key first, then any key naming the same scene and image.
    pub fn find(&self, scene_number: u32, image_index: usize) -> Option<&RenderedAsset> {
        let exact = file_name_for(scene_number, image_index);
        self.entries.get(&exact).or_else(|| {
            self.entries
                .iter()
                .find(|(k, _)| parse_file_name(k) == Some((scene_number, image_index)))
                .map(|(_, v)| v)
        })
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn delete(&mut self, name: &str) -> Option<RenderedAsset> {
        self.entries.remove(name)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/cache.rs"]
mod tests;
