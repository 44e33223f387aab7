//! Application State Module
//!
//! Selection store, view-state coordinator, and the event/command types
//! that drive them.

pub mod app_state;
pub mod selection;
pub mod types;

pub use app_state::*;
pub use selection::*;
pub use types::*;
