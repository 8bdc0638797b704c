//! Core behavioral logic - visibility tracking, playback lifecycle, poster
//! derivation.
//!
//! Everything here is per-instance state with no cross-instance sharing.

pub mod lifecycle;
pub mod poster;
pub mod visibility;

// Re-exports for convenience
pub use lifecycle::{Command, Lifecycle, Phase, PlaybackEvent};
pub use poster::derive_poster_path;
pub use visibility::{VisibilityEvent, VisibilityTracker};
