// ==================== Imports ====================
use wasm_bindgen::prelude::*;

#[macro_use]
mod browser;
pub mod config;
pub mod engine;
pub mod game;
pub mod obstacle;
pub mod sprite;
#[cfg(test)]
mod testing;

use engine::GameLoop;
use game::FlappyGame;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs the panic hook
/// - hands the game to the loop, which loads config + images and starts
///   requesting animation frames
#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(FlappyGame::new()).await {
            error!("Could not start game : {:#}", err);
        }
    });

    Ok(())
}
