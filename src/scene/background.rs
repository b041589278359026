use glam::{Vec2, vec2};

use lib_batch::{Batch, OutOfMemory};

use crate::{
    renderer::{SCREEN_HEIGHT, SCREEN_WIDTH, SpriteDrawRecord},
    scene::{LAYER_BACKGROUND, SpriteSheet},
};

/// Fills the view around `camera_center` with the background cell. Pushed
/// first each frame, so everything else paints over it.
pub fn push_background(
    batch: &mut Batch<SpriteDrawRecord>,
    sheet: &SpriteSheet,
    camera_center: Vec2,
) -> Result<(), OutOfMemory> {
    let step = sheet.cell_extents() * 2.0;

    let min = camera_center - vec2(SCREEN_WIDTH, SCREEN_HEIGHT) / 2.0;
    let max = camera_center + vec2(SCREEN_WIDTH, SCREEN_HEIGHT) / 2.0;

    let first_col = (min.x / step.x).floor() as i32;
    let first_row = (min.y / step.y).floor() as i32;
    let last_col = (max.x / step.x).ceil() as i32;
    let last_row = (max.y / step.y).ceil() as i32;

    for row in first_row..last_row {
        for col in first_col..last_col {
            let center = (vec2(col as f32, row as f32) + 0.5) * step;

            batch.try_push(sheet.record(0, 0, center, LAYER_BACKGROUND))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::AtlasId;

    fn sheet() -> SpriteSheet {
        SpriteSheet::new(AtlasId(0), vec2(64.0, 16.0), vec2(8.0, 8.0), 4.0)
    }

    #[test]
    fn background_covers_the_whole_screen() {
        let mut batch = Batch::try_with_capacity(0).unwrap();
        let camera_center = vec2(SCREEN_WIDTH, SCREEN_HEIGHT) / 2.0;

        push_background(&mut batch, &sheet(), camera_center).unwrap();
        assert!(!batch.is_empty());

        let extents = sheet().cell_extents();
        let min = batch
            .iter()
            .map(|record| record.dst_center - extents)
            .fold(Vec2::MAX, Vec2::min);
        let max = batch
            .iter()
            .map(|record| record.dst_center + extents)
            .fold(Vec2::MIN, Vec2::max);

        assert!(min.x <= 0.0 && min.y <= 0.0);
        assert!(max.x >= SCREEN_WIDTH && max.y >= SCREEN_HEIGHT);

        for record in &batch {
            assert_eq!(record.layer, LAYER_BACKGROUND);
            assert_eq!(record.atlas, AtlasId(0));
        }
    }

    #[test]
    fn background_follows_the_camera() {
        let mut near = Batch::try_with_capacity(0).unwrap();
        let mut far = Batch::try_with_capacity(0).unwrap();

        push_background(&mut near, &sheet(), Vec2::ZERO).unwrap();
        push_background(&mut far, &sheet(), vec2(10_000.0, -7_000.0)).unwrap();

        let covers = |batch: &Batch<SpriteDrawRecord>, point: Vec2| {
            let extents = sheet().cell_extents();
            batch.iter().any(|record| {
                let delta = (record.dst_center - point).abs();
                delta.x <= extents.x && delta.y <= extents.y
            })
        };

        assert!(covers(&far, vec2(10_000.0, -7_000.0)));
        assert!(!covers(&near, vec2(10_000.0, -7_000.0)));
    }
}
