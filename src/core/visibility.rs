//! Viewport visibility tracking for lazy-loaded clips.
//!
//! egui is immediate-mode: there is no observer to register with, the widget
//! sees its own rect once per paint pass. The tracker turns that stream of
//! rect observations into enter/exit edge events by intersecting the widget
//! rect with the viewport rect expanded by a trigger margin, so a clip can
//! start loading slightly before it scrolls into view and release its
//! resources promptly after it scrolls out.
//!
//! One tracker per component instance. The tracker is owned by its component
//! and dropped with it, so observation state is released exactly once per
//! mount - there is nothing to unsubscribe from the host.

use eframe::egui;
use log::trace;

/// Extra distance beyond the viewport edges within which a clip is still
/// considered near enough to start preparing its media (logical pixels).
pub const DEFAULT_TRIGGER_MARGIN: f32 = 200.0;

/// Edge event produced when the tracked rect crosses the trigger boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityEvent {
    /// Rect moved inside the expanded viewport.
    Entered,
    /// Rect moved outside the expanded viewport.
    Exited,
}

/// Edge detector over per-paint-pass rect observations.
///
/// Repeated identical observations produce no event; only transitions do.
/// A disabled tracker (eager loading) performs no intersection test at all
/// and reports permanently in-view.
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    margin: f32,
    enabled: bool,
    in_view: bool,
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityTracker {
    /// Tracker with the default trigger margin, initially out of view.
    pub fn new() -> Self {
        Self::with_margin(DEFAULT_TRIGGER_MARGIN)
    }

    /// Tracker with a custom trigger margin, initially out of view.
    pub fn with_margin(margin: f32) -> Self {
        Self {
            margin,
            enabled: true,
            in_view: false,
        }
    }

    /// Tracker for eagerly-loaded clips: never observes, permanently in view.
    pub fn disabled() -> Self {
        Self {
            margin: DEFAULT_TRIGGER_MARGIN,
            enabled: false,
            in_view: true,
        }
    }

    /// Whether the tracked rect is currently within the trigger margin.
    pub fn in_view(&self) -> bool {
        self.in_view
    }

    /// Whether this tracker observes at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Trigger margin in logical pixels.
    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Feed one rect observation for the current paint pass.
    ///
    /// Returns an event only when the near-viewport status flips.
    pub fn observe(
        &mut self,
        widget_rect: egui::Rect,
        viewport_rect: egui::Rect,
    ) -> Option<VisibilityEvent> {
        if !self.enabled {
            return None;
        }

        let near = viewport_rect.expand(self.margin).intersects(widget_rect);
        if near == self.in_view {
            return None;
        }

        self.in_view = near;
        if near {
            trace!("entered viewport (margin {}px)", self.margin);
            Some(VisibilityEvent::Entered)
        } else {
            trace!("exited viewport (margin {}px)", self.margin);
            Some(VisibilityEvent::Exited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{Rect, pos2};

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
        Rect::from_min_max(pos2(x0, y0), pos2(x1, y1))
    }

    #[test]
    fn test_enter_and_exit_edges() {
        let mut tracker = VisibilityTracker::with_margin(0.0);
        let viewport = rect(0.0, 0.0, 800.0, 600.0);

        // Far below the viewport
        assert_eq!(tracker.observe(rect(0.0, 2000.0, 100.0, 2100.0), viewport), None);
        assert!(!tracker.in_view());

        // Scrolled into view
        assert_eq!(
            tracker.observe(rect(0.0, 100.0, 100.0, 200.0), viewport),
            Some(VisibilityEvent::Entered)
        );
        assert!(tracker.in_view());

        // Scrolled back out
        assert_eq!(
            tracker.observe(rect(0.0, 2000.0, 100.0, 2100.0), viewport),
            Some(VisibilityEvent::Exited)
        );
        assert!(!tracker.in_view());
    }

    #[test]
    fn test_repeated_observations_emit_nothing() {
        let mut tracker = VisibilityTracker::with_margin(0.0);
        let viewport = rect(0.0, 0.0, 800.0, 600.0);
        let visible = rect(0.0, 100.0, 100.0, 200.0);

        assert_eq!(tracker.observe(visible, viewport), Some(VisibilityEvent::Entered));
        assert_eq!(tracker.observe(visible, viewport), None);
        assert_eq!(tracker.observe(visible, viewport), None);
    }

    #[test]
    fn test_margin_extends_viewport() {
        let mut tracker = VisibilityTracker::with_margin(200.0);
        let viewport = rect(0.0, 0.0, 800.0, 600.0);

        // 100px below the bottom edge: inside the 200px margin
        assert_eq!(
            tracker.observe(rect(0.0, 700.0, 100.0, 750.0), viewport),
            Some(VisibilityEvent::Entered)
        );

        // 300px below the bottom edge: outside the margin
        assert_eq!(
            tracker.observe(rect(0.0, 900.0, 100.0, 950.0), viewport),
            Some(VisibilityEvent::Exited)
        );
    }

    #[test]
    fn test_disabled_tracker_never_observes() {
        let mut tracker = VisibilityTracker::disabled();
        let viewport = rect(0.0, 0.0, 800.0, 600.0);

        assert!(tracker.in_view());
        assert_eq!(tracker.observe(rect(0.0, 5000.0, 100.0, 5100.0), viewport), None);
        // Still in view regardless of geometry
        assert!(tracker.in_view());
    }
}
