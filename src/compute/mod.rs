//! Compute module - Sprite motion and software rasterization.

mod motion;
mod raster;

pub use motion::*;
pub use raster::*;
