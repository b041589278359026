mod background;
mod level;
mod sprite_sheet;
mod text;

pub use background::*;
pub use level::*;
pub use sprite_sheet::*;
pub use text::*;

// Paint layers, back to front. Batch order is what actually decides
// overdraw; the layer rides along in each record.
pub const LAYER_BACKGROUND: f32 = 0.0;
pub const LAYER_LEVEL: f32 = 0.1;
pub const LAYER_TEXT: f32 = 0.2;

#[cfg(test)]
mod tests {
    use glam::{Vec2, vec2};

    use lib_batch::Batch;

    use super::*;
    use crate::renderer::{AtlasId, SpriteDrawRecord};

    fn bg_sheet() -> SpriteSheet {
        SpriteSheet::new(AtlasId(0), vec2(64.0, 16.0), vec2(8.0, 8.0), 4.0)
    }

    fn font_sheet() -> SpriteSheet {
        SpriteSheet::new(AtlasId(1), vec2(128.0, 48.0), vec2(8.0, 8.0), 3.0)
    }

    fn compose(batch: &mut Batch<SpriteDrawRecord>, level: &Level) {
        push_background(batch, &bg_sheet(), Vec2::ZERO).unwrap();
        push_level(batch, level, &bg_sheet(), Vec2::ZERO).unwrap();
        push_text(batch, &font_sheet(), "HI\nTHERE", vec2(40.0, 40.0)).unwrap();
    }

    #[test]
    fn producers_append_in_paint_order() {
        let level = Level::parse("##\n.#").unwrap();
        let mut batch = Batch::try_with_capacity(0).unwrap();

        compose(&mut batch, &level);

        let layers: Vec<f32> = batch.iter().map(|record| record.layer).collect();
        let mut sorted = layers.clone();
        sorted.sort_by(f32::total_cmp);
        assert_eq!(layers, sorted);

        let text_records = layers
            .iter()
            .filter(|layer| **layer == LAYER_TEXT)
            .count();
        assert_eq!(text_records, "HITHERE".len());

        let level_records = layers
            .iter()
            .filter(|layer| **layer == LAYER_LEVEL)
            .count();
        assert_eq!(level_records, 3);
    }

    #[test]
    fn cleared_batch_is_reused_without_reallocating() {
        let level = Level::parse("##\n.#").unwrap();
        let mut batch = Batch::try_with_capacity(0).unwrap();

        compose(&mut batch, &level);
        let first_len = batch.len();
        assert!(first_len > 0);

        // What submit_batch does with clear_after_render set.
        batch.clear();
        assert_eq!(batch.len(), 0);

        let cap = batch.capacity();
        let ptr = batch.as_slice().as_ptr();

        compose(&mut batch, &level);

        assert_eq!(batch.len(), first_len);
        assert_eq!(batch.capacity(), cap);
        assert_eq!(batch.as_slice().as_ptr(), ptr);
    }
}
