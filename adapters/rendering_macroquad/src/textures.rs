use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use boss_arena_rendering::TextureId;
use glam::Vec2;
use macroquad::texture::{FilterMode, Texture2D};

/// Textures loaded during a session, addressed by [`TextureId`].
///
/// Loading the same path twice returns the id handed out the first time.
#[derive(Debug)]
pub(crate) struct TextureStore<T> {
    entries: Vec<StoredTexture<T>>,
    by_path: HashMap<PathBuf, TextureId>,
}

#[derive(Debug)]
struct StoredTexture<T> {
    texture: T,
    size: Vec2,
}

impl<T> Default for TextureStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_path: HashMap::new(),
        }
    }
}

impl<T: Copy> TextureStore<T> {
    /// Loads `path` through `loader` unless it is already cached.
    pub(crate) fn load_with(
        &mut self,
        path: &Path,
        loader: impl FnOnce(&Path) -> Result<(T, Vec2)>,
    ) -> Result<TextureId> {
        if let Some(id) = self.by_path.get(path) {
            return Ok(*id);
        }

        let (texture, size) =
            loader(path).with_context(|| format!("failed to load texture {}", path.display()))?;
        if size.x <= 0.0 || size.y <= 0.0 {
            bail!("texture {} has no pixels", path.display());
        }

        let index = u32::try_from(self.entries.len()).context("texture store is full")?;
        let id = TextureId::new(index);
        self.entries.push(StoredTexture { texture, size });
        let _ = self.by_path.insert(path.to_path_buf(), id);
        Ok(id)
    }

    pub(crate) fn texture(&self, id: TextureId) -> Option<T> {
        self.entries
            .get(id.get() as usize)
            .map(|entry| entry.texture)
    }

    pub(crate) fn size(&self, id: TextureId) -> Option<Vec2> {
        self.entries.get(id.get() as usize).map(|entry| entry.size)
    }
}

/// Reads an image from disk and uploads it as a pixel-art texture.
pub(crate) fn load_from_disk(path: &Path) -> Result<(Texture2D, Vec2)> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read image at {}", path.display()))?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    texture.set_filter(FilterMode::Nearest);
    let size = Vec2::new(texture.width(), texture.height());
    Ok((texture, size))
}
