//! Schema module - Configuration and scene description types.

mod config;
mod scene;

pub use config::*;
pub use scene::*;
