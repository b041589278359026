use glam::{Vec2, vec2};
use image::EncodableLayout;
use thiserror::Error;

use crate::renderer::{AtlasId, RenderContext, Renderer, SpriteDrawRecord};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Io(#[from] lib_io::FileError),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Level(#[from] crate::scene::LevelError),
}

/// A uniform-cell sprite atlas plus the scale its cells draw at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSheet {
    atlas: AtlasId,
    sheet_size: Vec2,
    cell_size: Vec2,
    scale: f32,
}

impl SpriteSheet {
    /// Reads `path` through the chunked reader, decodes it, uploads it as an
    /// atlas, and describes its cell grid.
    pub fn load(
        path: &str,
        cell_width: u32,
        cell_height: u32,
        scale: f32,
        renderer: &mut Renderer,
        ctx: RenderContext,
    ) -> Result<Self, AssetError> {
        let file = lib_io::read_file(path)?;
        let image = image::load_from_memory(file.as_bytes())?.to_rgba8();

        let atlas = renderer.upload_atlas(image.as_bytes(), image.width(), image.height(), ctx);

        log::info!(
            "loaded sprite sheet {path} ({}x{})",
            image.width(),
            image.height()
        );

        Ok(Self::new(
            atlas,
            vec2(image.width() as f32, image.height() as f32),
            vec2(cell_width as f32, cell_height as f32),
            scale,
        ))
    }

    /// Describes an atlas that is already uploaded.
    pub fn new(atlas: AtlasId, sheet_size: Vec2, cell_size: Vec2, scale: f32) -> Self {
        Self {
            atlas,
            sheet_size,
            cell_size,
            scale,
        }
    }

    pub fn columns(&self) -> u32 {
        (self.sheet_size.x / self.cell_size.x) as u32
    }

    pub fn rows(&self) -> u32 {
        (self.sheet_size.y / self.cell_size.y) as u32
    }

    /// Half the on-screen size of one scaled cell, in virtual pixels.
    pub fn cell_extents(&self) -> Vec2 {
        self.cell_size * self.scale / 2.0
    }

    /// Draw record for cell `(col, row)` centered at `dst_center`.
    pub fn record(&self, col: u32, row: u32, dst_center: Vec2, layer: f32) -> SpriteDrawRecord {
        let src_extents = self.cell_size / self.sheet_size / 2.0;
        let src_center = vec2(col as f32 + 0.5, row as f32 + 0.5) * self.cell_size / self.sheet_size;

        SpriteDrawRecord {
            dst_center,
            dst_extents: self.cell_extents(),
            src_center,
            src_extents,
            layer,
            atlas: self.atlas,
        }
    }
}
