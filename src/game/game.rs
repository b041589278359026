use glam::{Vec2, vec2};
use wgpu::{Color, TextureView};
use winit::window::{Window, WindowAttributes};

use lib_batch::Batch;

use crate::{
    asset_path,
    game::{FsSwitch, GameContext, GameEvent, Time},
    input::{InputBindings, InputHandler},
    renderer::{Camera, Renderer, SCREEN_HEIGHT, SCREEN_WIDTH, SpriteDrawRecord},
    scene::{self, AssetError, Level, SpriteSheet},
};

const INITIAL_BATCH_CAP: usize = 1024;
const CAMERA_SPEED: f32 = 180.0;

const DEMO_TEXT: &str = "abcdefghijklmnopqrstuvwxyz\
                         \nABCDEFGHIJKLMNOPQRSTUVWXYZ\
                         \n0123456789\
                         \n!@#$%^&*()_+=\
                         \n,./<>?;':\"[]";

const LEVEL_PATHS: [&str; 2] = [
    asset_path!("levels/level0.txt"),
    asset_path!("levels/level1.txt"),
];

const FALLBACK_LEVEL: &str = "\
####====####\n\
#..........#\n\
#...~~.....#\n\
............\n\
#....oo....#\n\
####====####";

#[derive(Debug)]
pub struct Game {
    time: Time,
    fs_switch: FsSwitch,
    renderer: Renderer,
    input: InputHandler,
    batch: Batch<SpriteDrawRecord>,
    bg_sheet: SpriteSheet,
    font_sheet: SpriteSheet,
    levels: Vec<Level>,
    current_level: usize,
    camera_center: Vec2,
}

impl Game {
    pub fn window_attributes() -> WindowAttributes {
        Window::default_attributes()
            .with_title("Burrow")
            .with_maximized(true)
    }

    pub fn new(ctx: GameContext) -> Self {
        let mut renderer = Renderer::new(ctx.into());

        let bg_sheet = SpriteSheet::load(asset_path!("bg.png"), 8, 8, 4.0, &mut renderer, ctx.into())
            .expect("failed to load background sheet");
        let font_sheet =
            SpriteSheet::load(asset_path!("font.png"), 8, 8, 3.0, &mut renderer, ctx.into())
                .expect("failed to load font sheet");

        let levels = match Self::load_levels() {
            Ok(levels) => levels,
            Err(err) => {
                log::error!("falling back to the built-in level: {err}");

                vec![Level::parse(FALLBACK_LEVEL).expect("the built-in level must parse")]
            }
        };

        let batch =
            Batch::try_with_capacity(INITIAL_BATCH_CAP).expect("failed to allocate frame batch");

        Self {
            time: Time::new(),
            fs_switch: FsSwitch::new(),
            renderer,
            input: InputHandler::new(&InputBindings::default()),
            batch,
            bg_sheet,
            font_sheet,
            levels,
            current_level: 0,
            camera_center: vec2(SCREEN_WIDTH, SCREEN_HEIGHT) / 2.0,
        }
    }

    fn load_levels() -> Result<Vec<Level>, AssetError> {
        LEVEL_PATHS
            .iter()
            .map(|path| {
                let file = lib_io::read_file(path)?;
                let level = Level::from_buffer(&file)?;

                log::info!(
                    "loaded level {path} ({}x{})",
                    level.width(),
                    level.height()
                );

                Ok(level)
            })
            .collect()
    }

    pub fn update(&mut self, ctx: GameContext) {
        let dt = self.time.tick();

        let input = self.input.next_state();

        if input.quit.is_pressed {
            ctx.exit();
            return;
        }

        self.camera_center += vec2(input.x.value(), input.y.value()) * CAMERA_SPEED * dt;
    }

    pub fn render(&mut self, output: &TextureView, ctx: GameContext) {
        let camera = Camera {
            center: self.camera_center,
            clear_color: Color::BLACK,
        };

        let mut frame = self.renderer.begin_frame(&camera, output, ctx.into());

        let wobble = 10.0 + self.time.elapsed().cos() * 10.0;
        let text_pos = vec2(8.0 * wobble, 8.0 * wobble);

        let pushed = scene::push_background(&mut self.batch, &self.bg_sheet, self.camera_center)
            .and_then(|_| {
                scene::push_level(
                    &mut self.batch,
                    &self.levels[self.current_level],
                    &self.bg_sheet,
                    Vec2::ZERO,
                )
            })
            .and_then(|_| {
                scene::push_text(&mut self.batch, &self.font_sheet, DEMO_TEXT, text_pos)
            });

        if let Err(err) = pushed {
            log::error!("dropping this frame's batch: {err}");
            self.batch.clear();
        }

        frame.submit_batch(&mut self.batch, true);
        frame.end();
    }

    pub fn event(&mut self, event: &GameEvent, ctx: GameContext) {
        self.fs_switch.event(event, ctx);
        self.input.event(event);

        match event {
            GameEvent::CloseRequested => ctx.exit(),
            _ => {}
        }
    }

    pub fn end(&mut self, _: GameContext) {}
}
