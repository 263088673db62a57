//! Rendering
//!
//! `scene` turns game state into draw commands; backends paint them.
//! The wasm build paints on a 2D canvas.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use scene::{Color, DrawCmd, build_scene};
