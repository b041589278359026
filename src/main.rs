mod asset;
mod game;
mod input;
mod renderer;
mod scene;

fn main() {
    env_logger::init();

    game::run();
}
