//! UI components.

pub mod fold_preview;
