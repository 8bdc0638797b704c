//! UI widgets.

pub mod clip;

pub use clip::{ClipConfig, ClipView};
