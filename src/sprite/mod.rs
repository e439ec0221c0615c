// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Where things live                                   │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ src/              │                                                      │
// │ ├── lib.rs        │ wasm entry point                                     │
// │ ├── browser.rs    │ web_sys plumbing + log! / error!                     │
// │ ├── engine.rs     │ Game trait, GameLoop, Renderer, geometry, input      │
// │ ├── config.rs     │ tuning knobs, config.json                            │
// │ ├── obstacle.rs   │ the stream of pipes + scoring                        │
// │ ├── game.rs       │ Start -> Playing -> GameOver state machine           │
// │ └── sprite/       │                                                      │
// │     ├── mod.rs    │ image handles shared by every sprite                 │
// │     ├── bird.rs   │ the player                                           │
// │     └── pipe.rs   │ one obstacle (top + bottom segment)                  │
// └───────────────────┴──────────────────────────────────────────────────────┘
use crate::engine::ImageId;

pub mod bird;
pub mod pipe;

pub use bird::{Bird, Flight};
pub use pipe::{GapSource, Pipe};

pub const BIRD: ImageId = ImageId("assets/bird.png");
pub const SKY: ImageId = ImageId("assets/sky.png");
pub const PIPE: ImageId = ImageId("assets/pipe.png");
pub const START: ImageId = ImageId("assets/start.png");

/// Everything the renderer has to load before the first frame
pub const IMAGES: [ImageId; 4] = [BIRD, SKY, PIPE, START];
