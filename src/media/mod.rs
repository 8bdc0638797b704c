//! Media layer - decoded clips and the background loader.
//!
//! UI-free: frames are plain RGBA buffers; texture upload lives in the
//! widget layer.

pub mod clip;
pub mod loader;

pub use clip::{Clip, ClipError, ClipFrame, Playhead};
pub use loader::{ClipElement, LoaderMsg, PosterLoader};
