//! Result renderer.
//!
//! `render(&AppState) -> ViewFragments` is the whole presentation contract;
//! any front end (terminal, DOM, egui) draws from the fragments.

pub mod format;
pub mod render;

pub use render::*;
