//! Texture lookup.
//!
//! Entity definitions name textures without an extension
//! (`textures/entity/creeper/creeper`); the file on disk is a PNG or TGA.

use super::ResourcePack;

/// Extensions tried, in order, after the literal path.
pub const TEXTURE_EXTENSIONS: &[&str] = &[".png", ".tga"];

/// Default project resolution when no texture size is known.
pub const DEFAULT_RESOLUTION: (u32, u32) = (16, 16);

/// A texture reference resolved to a pack file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureFile {
    /// Path as declared by the entity.
    pub declared: String,
    /// Pack-relative path of the file found.
    pub path: String,
}

impl TextureFile {
    /// File name including extension.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without extension.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }

    pub fn is_png(&self) -> bool {
        self.path.ends_with(".png")
    }
}

impl ResourcePack {
    /// Locate the file for a declared texture path.
    ///
    /// The literal path wins if it exists; otherwise each known extension is
    /// appended in turn.
    pub fn find_texture(&self, declared: &str) -> Option<TextureFile> {
        let found = std::iter::once(declared.to_string())
            .chain(TEXTURE_EXTENSIONS.iter().map(|ext| format!("{}{}", declared, ext)))
            .find(|candidate| self.contains(candidate))?;

        Some(TextureFile {
            declared: declared.to_string(),
            path: found,
        })
    }

    /// Pixel dimensions of a PNG texture, read from its header.
    pub fn texture_size(&self, texture: &TextureFile) -> Option<(u32, u32)> {
        if !texture.is_png() {
            return None;
        }
        image::image_dimensions(self.absolute_path(&texture.path)).ok()
    }
}
