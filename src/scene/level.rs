use glam::{Vec2, vec2};
use thiserror::Error;

use lib_batch::{Batch, OutOfMemory};
use lib_io::FileBuffer;

use crate::{
    renderer::SpriteDrawRecord,
    scene::{LAYER_LEVEL, SpriteSheet},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level text is empty")]
    Empty,

    #[error("level text is not UTF-8")]
    Utf8,

    #[error("unknown tile glyph {glyph:?} at row {row}, column {col}")]
    UnknownTile { glyph: char, row: usize, col: usize },
}

/// One tile of a level grid, addressing a cell of the level's sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Cell { col: u32, row: u32 },
}

/// A rectangular tile grid, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Level {
    /// Parses the text form: one line per row, `.` or space for an empty
    /// tile, any other glyph looked up in the tile table. Short rows are
    /// padded with empty tiles to the widest row.
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let mut rows: Vec<Vec<Tile>> = Vec::new();

        for (row_index, line) in text.lines().enumerate() {
            let mut row = Vec::new();

            for (col_index, glyph) in line.chars().enumerate() {
                row.push(tile_for_glyph(glyph).ok_or(LevelError::UnknownTile {
                    glyph,
                    row: row_index,
                    col: col_index,
                })?);
            }

            rows.push(row);
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();

        if width == 0 || height == 0 {
            return Err(LevelError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, Tile::Empty);
            tiles.extend(row);
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Parses a level straight out of a file buffer.
    pub fn from_buffer(buffer: &FileBuffer) -> Result<Self, LevelError> {
        Self::parse(buffer.as_str().map_err(|_| LevelError::Utf8)?)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile(&self, col: usize, row: usize) -> Tile {
        self.tiles[row * self.width + col]
    }
}

fn tile_for_glyph(glyph: char) -> Option<Tile> {
    Some(match glyph {
        '.' | ' ' => Tile::Empty,
        '#' => Tile::Cell { col: 1, row: 0 },
        '=' => Tile::Cell { col: 2, row: 0 },
        '~' => Tile::Cell { col: 3, row: 0 },
        'o' => Tile::Cell { col: 4, row: 0 },
        _ => return None,
    })
}

/// Appends one record per occupied tile, row-major from `origin` at the
/// grid's top-left corner.
pub fn push_level(
    batch: &mut Batch<SpriteDrawRecord>,
    level: &Level,
    sheet: &SpriteSheet,
    origin: Vec2,
) -> Result<(), OutOfMemory> {
    let step = sheet.cell_extents() * 2.0;

    for row in 0..level.height() {
        for col in 0..level.width() {
            let Tile::Cell {
                col: sheet_col,
                row: sheet_row,
            } = level.tile(col, row)
            else {
                continue;
            };

            let center = origin + (vec2(col as f32, row as f32) + 0.5) * step;

            batch.try_push(sheet.record(sheet_col, sheet_row, center, LAYER_LEVEL))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::AtlasId;

    #[test]
    fn parse_reads_dimensions_and_tiles() {
        let level = Level::parse("##.\n.=\n...").unwrap();

        assert_eq!(level.width(), 3);
        assert_eq!(level.height(), 3);
        assert_eq!(level.tile(0, 0), Tile::Cell { col: 1, row: 0 });
        assert_eq!(level.tile(2, 0), Tile::Empty);
        assert_eq!(level.tile(1, 1), Tile::Cell { col: 2, row: 0 });
        // Short second row is padded.
        assert_eq!(level.tile(2, 1), Tile::Empty);
    }

    #[test]
    fn parse_rejects_unknown_glyphs_with_their_position() {
        let err = Level::parse("..\n.X").unwrap_err();

        assert_eq!(
            err,
            LevelError::UnknownTile {
                glyph: 'X',
                row: 1,
                col: 1,
            }
        );
    }

    #[test]
    fn parse_rejects_empty_text() {
        assert_eq!(Level::parse(""), Err(LevelError::Empty));
        assert_eq!(Level::parse("\n\n"), Err(LevelError::Empty));
    }

    #[test]
    fn push_level_appends_occupied_tiles_row_major() {
        let sheet = SpriteSheet::new(
            AtlasId(3),
            vec2(64.0, 16.0),
            vec2(8.0, 8.0),
            4.0,
        );
        let level = Level::parse("#.\n.#").unwrap();
        let mut batch = Batch::try_with_capacity(0).unwrap();

        push_level(&mut batch, &level, &sheet, Vec2::ZERO).unwrap();

        assert_eq!(batch.len(), 2);

        // Cell step is 32px at this scale; centers land mid-cell.
        assert_eq!(batch[0].dst_center, vec2(16.0, 16.0));
        assert_eq!(batch[1].dst_center, vec2(48.0, 48.0));

        for record in &batch {
            assert_eq!(record.layer, LAYER_LEVEL);
            assert_eq!(record.atlas, AtlasId(3));
        }
    }
}
