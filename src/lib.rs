#![warn(clippy::all)]

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOC: talc::TalckWasm = unsafe { talc::TalckWasm::new_global() };

pub mod cache;
pub mod constants;
pub mod features;
#[cfg(feature = "screeps")]
mod game_loop;
pub mod jobs;
pub mod logging;
#[cfg(feature = "screeps")]
mod memory_helper;
pub mod military;
pub mod pathing;
pub mod serialize;
pub mod status;
pub mod world;

#[cfg(feature = "screeps")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "screeps")]
#[wasm_bindgen(js_name = setup)]
pub fn setup() {
    logging::setup_logging(logging::Info);
    logging::panic::setup_panic_hook();
}

#[cfg(feature = "screeps")]
#[wasm_bindgen(js_name = game_loop)]
pub fn game_loop_export() {
    game_loop::tick();
}
