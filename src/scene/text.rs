use glam::Vec2;

use lib_batch::{Batch, OutOfMemory};

use crate::{
    renderer::SpriteDrawRecord,
    scene::{LAYER_TEXT, SpriteSheet},
};

const FIRST_GLYPH: char = ' ';
const LAST_GLYPH: char = '~';

/// Cell of `ch` in a font sheet laid out in ASCII order from space.
fn glyph_cell(sheet: &SpriteSheet, ch: char) -> Option<(u32, u32)> {
    if !(FIRST_GLYPH..=LAST_GLYPH).contains(&ch) {
        return None;
    }

    let index = ch as u32 - FIRST_GLYPH as u32;
    let columns = sheet.columns();

    let col = index % columns;
    let row = index / columns;

    if row >= sheet.rows() {
        return None;
    }

    Some((col, row))
}

/// Appends one glyph centered at `pos`. Characters outside the sheet's
/// range push nothing.
pub fn push_glyph(
    batch: &mut Batch<SpriteDrawRecord>,
    sheet: &SpriteSheet,
    ch: char,
    pos: Vec2,
) -> Result<(), OutOfMemory> {
    let Some((col, row)) = glyph_cell(sheet, ch) else {
        return Ok(());
    };

    batch.try_push(sheet.record(col, row, pos, LAYER_TEXT))
}

/// Appends a whole string glyph by glyph; `\n` returns the pen to `pos.x`
/// one line down. Unmapped characters still advance the pen.
pub fn push_text(
    batch: &mut Batch<SpriteDrawRecord>,
    sheet: &SpriteSheet,
    text: &str,
    pos: Vec2,
) -> Result<(), OutOfMemory> {
    let step = sheet.cell_extents() * 2.0;
    let mut pen = pos;

    for ch in text.chars() {
        if ch == '\n' {
            pen.x = pos.x;
            pen.y += step.y;
            continue;
        }

        push_glyph(batch, sheet, ch, pen)?;
        pen.x += step.x;
    }

    Ok(())
}
