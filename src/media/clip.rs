//! Decoded clip data and the playback clock.
//!
//! A clip is a short, silent, looping animation: a list of RGBA frames with
//! per-frame delays taken from the container. The playhead advances on wall
//! clock time and wraps to frame zero at the end - no seek, no pause, no
//! resume-from-position across viewport visits.

use std::time::{Duration, Instant};

use image::RgbaImage;

/// Fallback delay when the container reports none (10 fps).
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// One decoded frame with its display duration.
#[derive(Debug, Clone)]
pub struct ClipFrame {
    pub image: RgbaImage,
    pub delay: Duration,
}

impl ClipFrame {
    /// Frame with a sanitized delay (zero delays get the fallback).
    pub fn new(image: RgbaImage, delay: Duration) -> Self {
        let delay = if delay.is_zero() {
            DEFAULT_FRAME_DELAY
        } else {
            delay
        };
        Self { image, delay }
    }
}

/// A fully decoded clip.
#[derive(Debug, Clone, Default)]
pub struct Clip {
    pub frames: Vec<ClipFrame>,
}

impl Clip {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Pixel dimensions of the first frame, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames
            .first()
            .map(|f| (f.image.width(), f.image.height()))
    }
}

/// Clip loading errors.
#[derive(Debug)]
pub enum ClipError {
    Open(String),
    Decode(String),
    UnsupportedFormat(String),
}

impl std::fmt::Display for ClipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipError::Open(e) => write!(f, "Cannot open clip: {}", e),
            ClipError::Decode(e) => write!(f, "Cannot decode clip: {}", e),
            ClipError::UnsupportedFormat(e) => write!(f, "Unsupported clip format: {}", e),
        }
    }
}

impl std::error::Error for ClipError {}

/// Wall-clock playhead: autoplays, advances by the current frame's delay,
/// loops back to frame zero after the last frame.
#[derive(Debug, Clone, Default)]
pub struct Playhead {
    index: usize,
    last_advance: Option<Instant>,
}

impl Playhead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current frame index, clamped to the clip.
    pub fn current(&self, clip: &Clip) -> usize {
        if self.index < clip.frames.len() {
            self.index
        } else {
            0
        }
    }

    /// Advance based on elapsed time. Returns true if the index changed.
    pub fn tick(&mut self, clip: &Clip) -> bool {
        if clip.frames.len() <= 1 {
            return false;
        }
        if self.index >= clip.frames.len() {
            self.index = 0;
        }

        let now = Instant::now();
        let Some(last) = self.last_advance else {
            self.last_advance = Some(now);
            return false;
        };

        if now.duration_since(last) >= clip.frames[self.index].delay {
            self.index = (self.index + 1) % clip.frames.len();
            self.last_advance = Some(now);
            true
        } else {
            false
        }
    }

    /// Delay of the current frame (drives repaint scheduling).
    pub fn current_delay(&self, clip: &Clip) -> Duration {
        clip.frames
            .get(self.current(clip))
            .map(|f| f.delay)
            .unwrap_or(DEFAULT_FRAME_DELAY)
    }

    pub fn rewind(&mut self) {
        self.index = 0;
        self.last_advance = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(frames: usize, delay_ms: u64) -> Clip {
        Clip {
            frames: (0..frames)
                .map(|_| ClipFrame::new(RgbaImage::new(2, 2), Duration::from_millis(delay_ms)))
                .collect(),
        }
    }

    #[test]
    fn test_zero_delay_gets_fallback() {
        let frame = ClipFrame::new(RgbaImage::new(1, 1), Duration::ZERO);
        assert_eq!(frame.delay, DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn test_single_frame_never_advances() {
        let clip = clip(1, 10);
        let mut playhead = Playhead::new();
        std::thread::sleep(Duration::from_millis(15));
        assert!(!playhead.tick(&clip));
        assert_eq!(playhead.current(&clip), 0);
    }

    #[test]
    fn test_advances_after_delay() {
        let clip = clip(3, 10);
        let mut playhead = Playhead::new();

        // First tick only starts the clock
        assert!(!playhead.tick(&clip));
        std::thread::sleep(Duration::from_millis(15));
        assert!(playhead.tick(&clip));
        assert_eq!(playhead.current(&clip), 1);
    }

    #[test]
    fn test_loops_to_start() {
        let clip = clip(2, 10);
        let mut playhead = Playhead::new();
        playhead.tick(&clip);

        std::thread::sleep(Duration::from_millis(15));
        assert!(playhead.tick(&clip));
        assert_eq!(playhead.current(&clip), 1);

        std::thread::sleep(Duration::from_millis(15));
        assert!(playhead.tick(&clip));
        // Wrapped back to frame zero
        assert_eq!(playhead.current(&clip), 0);
    }

    #[test]
    fn test_rewind_resets_clock_and_index() {
        let clip = clip(3, 10);
        let mut playhead = Playhead::new();
        playhead.tick(&clip);
        std::thread::sleep(Duration::from_millis(15));
        playhead.tick(&clip);

        playhead.rewind();
        assert_eq!(playhead.current(&clip), 0);
        // Clock restarted: next tick is a no-op again
        assert!(!playhead.tick(&clip));
    }
}
