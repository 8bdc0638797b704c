//! Clip widget - lazy-loading embedded clip player.

mod clip;
mod clip_ui;

pub use clip::{ClipConfig, ClipView};
