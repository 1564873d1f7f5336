mod canvas;
mod component;
pub mod config;
pub mod document;
pub mod format;
pub mod legend;
pub mod message;
pub mod render;
pub mod state;
pub mod transform;

pub use component::FoldPreview;
