pub mod core;
pub mod dash;
pub mod explorer;
pub mod render;
pub mod runtime;
pub mod stats;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbVizError {
    /// A distribution or sampler parameter is outside its domain.
    InvalidParameter,
    /// A configuration value could not be turned into an explorer state.
    Config,
}

impl fmt::Display for ProbVizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbVizError::InvalidParameter => write!(f, "invalid distribution parameter"),
            ProbVizError::Config => write!(f, "invalid explorer configuration"),
        }
    }
}

impl std::error::Error for ProbVizError {}

pub type Result<T> = std::result::Result<T, error_stack::Report<ProbVizError>>;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Start the explorer in the canvas with id `canvas_id`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn run_in_canvas(canvas_id: &str, seed: u32) {
    let explorer = explorer::Explorer::default().with_seed(seed.into());
    runtime::run_explorer(explorer, runtime::WindowOptions::default(), canvas_id);
}

pub mod prelude {
    pub use crate::core::*;
    pub use crate::dash::*;
    pub use crate::explorer::*;
    pub use crate::render::*;
    pub use crate::runtime::*;
    pub use crate::stats::*;
}
