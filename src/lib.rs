//! clipview - lazy-loading embedded clip player for documentation pages.
//!
//! One presentational component, [`ClipView`], renders a short looping clip
//! inside an egui page with optional lazy-loading, poster fallback, loading
//! skeleton, and error handling. Clips attach when their container nears
//! the viewport and release their decoded frames the moment it leaves, so a
//! long page with many clips keeps bounded memory.

pub mod cli;
pub mod core;
pub mod media;
pub mod widgets;

// Re-export commonly used types
pub use crate::core::lifecycle::{Command, Lifecycle, Phase, PlaybackEvent};
pub use crate::core::poster::derive_poster_path;
pub use crate::core::visibility::{DEFAULT_TRIGGER_MARGIN, VisibilityEvent, VisibilityTracker};
pub use crate::media::clip::{Clip, ClipError, ClipFrame, Playhead};
pub use crate::media::loader::{ClipElement, LoaderMsg};
pub use crate::widgets::clip::{ClipConfig, ClipView};
