//! Embedded clip component - configuration, state, and event wiring.
//!
//! `ClipView` owns the three collaborating pieces:
//! - a [`VisibilityTracker`] turning per-pass rect observations into
//!   enter/exit edges,
//! - the [`Lifecycle`] reducer deciding attach/detach,
//! - an optional [`ClipElement`] (present only while attached).
//!
//! Data flow per paint pass: observe -> reduce -> apply command -> drain
//! loader -> reduce -> advance playhead -> render. The render surface itself
//! lives in `clip_ui`.

use std::path::PathBuf;

use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::core::lifecycle::{Command, Lifecycle, Phase, PlaybackEvent};
use crate::core::poster::derive_poster_path;
use crate::core::visibility::{VisibilityEvent, VisibilityTracker};
use crate::media::loader::{ClipElement, PosterLoader};

use super::clip_ui;

/// Aspect ratio used until the clip's own dimensions are known.
const PLACEHOLDER_ASPECT: f32 = 16.0 / 9.0;

fn default_lazy_load() -> bool {
    true
}

/// Construction-time configuration, immutable per instance.
///
/// Changing the source of a mounted clip is not supported; create a new
/// `ClipView` instead (the poster is derived exactly once).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Path to the clip resource (required).
    pub source: PathBuf,
    /// Poster override; defaults to the derived sibling-`posters` path.
    #[serde(default)]
    pub poster: Option<PathBuf>,
    /// Attach only when near the viewport (default true).
    #[serde(default = "default_lazy_load")]
    pub lazy_load: bool,
}

impl ClipConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            poster: None,
            lazy_load: true,
        }
    }

    pub fn with_poster(mut self, poster: impl Into<PathBuf>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    pub fn eager(mut self) -> Self {
        self.lazy_load = false;
        self
    }
}

/// One embedded clip. Fire-and-forget: exposes nothing to its caller.
pub struct ClipView {
    lifecycle: Lifecycle,
    tracker: VisibilityTracker,
    element: Option<ClipElement>,
    /// In-flight poster decode; consumed on completion.
    poster_loader: Option<PosterLoader>,
    /// Poster texture cache: `None` = decode pending, `Some(None)` = unavailable.
    poster_texture: Option<Option<egui::TextureHandle>>,
    frame_texture: Option<egui::TextureHandle>,
    uploaded_frame: Option<usize>,
}

impl ClipView {
    pub fn new(config: ClipConfig) -> Self {
        let poster = config
            .poster
            .clone()
            .unwrap_or_else(|| derive_poster_path(&config.source));
        let tracker = if config.lazy_load {
            VisibilityTracker::new()
        } else {
            VisibilityTracker::disabled()
        };

        // The poster is the lazy placeholder for every phase, so its decode
        // starts right away - on its own thread, never on a paint pass
        let poster_loader = Some(PosterLoader::load(&poster));

        let mut view = Self {
            lifecycle: Lifecycle::new(config.source, poster),
            tracker,
            element: None,
            poster_loader,
            poster_texture: None,
            frame_texture: None,
            uploaded_frame: None,
        };

        // Eager clips attach at construction; the disabled tracker keeps
        // them permanently in view so no exit can ever detach them.
        if !view.tracker.is_enabled() {
            let command = view.lifecycle.handle(PlaybackEvent::EnteredView);
            view.apply(command);
        }
        view
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub(crate) fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub(crate) fn element(&self) -> Option<&ClipElement> {
        self.element.as_ref()
    }

    /// Show the clip inside the current UI. Call once per paint pass.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let width = ui.available_width();
        let aspect = self
            .element
            .as_ref()
            .and_then(ClipElement::dimensions)
            .map(|(w, h)| w as f32 / h as f32)
            .unwrap_or(PLACEHOLDER_ASPECT);
        let (rect, _response) =
            ui.allocate_exact_size(egui::vec2(width, width / aspect), egui::Sense::hover());

        // 1. Visibility edge for this pass
        if let Some(edge) = self.tracker.observe(rect, ui.clip_rect()) {
            let event = match edge {
                VisibilityEvent::Entered => PlaybackEvent::EnteredView,
                VisibilityEvent::Exited => PlaybackEvent::ExitedView,
            };
            let command = self.lifecycle.handle(event);
            self.apply(command);
        }

        // 2. Loader outcomes (drained first, reduced after, so a detach in
        // step 1 already dropped the receiver and with it any stale outcome)
        let events = match self.element.as_mut() {
            Some(element) => element.poll(),
            None => Vec::new(),
        };
        for event in events {
            let command = self.lifecycle.handle(event);
            self.apply(command);
        }

        // 3. Advance playback and keep repainting while attached
        if let Some(element) = self.element.as_mut() {
            element.tick();
            ui.ctx().request_repaint_after(element.current_delay());
        }

        // 4. Render surface
        self.upload_current_frame(ui.ctx());
        clip_ui::render(ui, rect, self);
    }

    fn apply(&mut self, command: Option<Command>) {
        match command {
            Some(Command::Attach) => {
                self.element = Some(ClipElement::attach(self.lifecycle.source()));
            }
            Some(Command::Detach) => {
                // Eager release: decoded frames and texture go with the
                // element, not just the playback clock.
                self.element = None;
                self.frame_texture = None;
                self.uploaded_frame = None;
            }
            None => {}
        }
    }

    /// Upload the currently visible frame if it changed since last pass.
    fn upload_current_frame(&mut self, ctx: &egui::Context) {
        let pending = match self.element.as_ref().and_then(ClipElement::current_frame) {
            Some((index, frame))
                if self.uploaded_frame != Some(index) || self.frame_texture.is_none() =>
            {
                let size = [frame.image.width() as usize, frame.image.height() as usize];
                Some((
                    index,
                    egui::ColorImage::from_rgba_unmultiplied(size, frame.image.as_raw()),
                ))
            }
            _ => None,
        };

        if let Some((index, color_image)) = pending {
            let name = format!("clip:{}", self.lifecycle.source().display());
            self.frame_texture =
                Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR));
            self.uploaded_frame = Some(index);
        }
    }

    pub(crate) fn frame_texture(&self) -> Option<&egui::TextureHandle> {
        self.frame_texture.as_ref()
    }

    /// Poster texture, once the background decode has finished.
    pub(crate) fn poster_texture(&mut self, ctx: &egui::Context) -> Option<&egui::TextureHandle> {
        if self.poster_texture.is_none() {
            let outcome = self.poster_loader.as_ref().and_then(PosterLoader::poll);
            if let Some(outcome) = outcome {
                let name = format!("poster:{}", self.lifecycle.poster().display());
                let loaded = outcome.map(|rgba| {
                    let size = [rgba.width() as usize, rgba.height() as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                    ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
                });
                self.poster_texture = Some(loaded);
                self.poster_loader = None;
            }
        }
        self.poster_texture.as_ref().and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_lazy_clip_starts_idle_and_detached() {
        let view = ClipView::new(ClipConfig::new("/videos/demo.mp4"));
        assert_eq!(view.phase(), Phase::Idle);
        assert!(view.element().is_none());
        assert!(!view.tracker.in_view());
    }

    #[test]
    fn test_eager_clip_attaches_at_construction() {
        let view = ClipView::new(ClipConfig::new("/videos/demo.gif").eager());
        assert_eq!(view.phase(), Phase::Attaching);
        assert!(view.element().is_some());
        // No observation happens for eager clips
        assert!(!view.tracker.is_enabled());
        assert!(view.tracker.in_view());
    }

    #[test]
    fn test_poster_derived_once_by_convention() {
        let view = ClipView::new(ClipConfig::new("/videos/demo.mp4"));
        assert_eq!(
            view.lifecycle().poster(),
            Path::new("/videos/posters/demo.jpg")
        );
    }

    #[test]
    fn test_poster_override_wins() {
        let view =
            ClipView::new(ClipConfig::new("/videos/demo.mp4").with_poster("/art/custom.png"));
        assert_eq!(view.lifecycle().poster(), Path::new("/art/custom.png"));
    }

    #[test]
    fn test_idle_clip_shows_poster_without_media() {
        let dir = tempfile::tempdir().unwrap();
        let poster_path = dir.path().join("poster.png");
        image::RgbaImage::from_pixel(8, 8, image::Rgba([10, 20, 30, 255]))
            .save(&poster_path)
            .unwrap();

        let mut view =
            ClipView::new(ClipConfig::new("/videos/demo.gif").with_poster(&poster_path));
        assert_eq!(view.phase(), Phase::Idle);

        let ctx = egui::Context::default();
        let deadline = std::time::Instant::now() + std::time::Duration::from_millis(2000);
        while view.poster_texture(&ctx).is_none() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        // The poster is available as the Idle placeholder...
        assert!(view.poster_texture(&ctx).is_some());
        // ...while no media element exists
        assert_eq!(view.phase(), Phase::Idle);
        assert!(view.element().is_none());
    }

    #[test]
    fn test_missing_poster_falls_back_to_skeleton() {
        let mut view = ClipView::new(
            ClipConfig::new("/videos/demo.gif").with_poster("/nonexistent/posters/demo.jpg"),
        );

        let ctx = egui::Context::default();
        let deadline = std::time::Instant::now() + std::time::Duration::from_millis(2000);
        while view.poster_loader.is_some() && std::time::Instant::now() < deadline {
            view.poster_texture(&ctx);
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        // Decode settled as unavailable; render falls back to the skeleton fill
        assert!(matches!(view.poster_texture, Some(None)));
        assert!(view.poster_texture(&ctx).is_none());
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: ClipConfig = serde_json::from_str(r#"{"source": "/videos/demo.gif"}"#).unwrap();
        assert!(config.lazy_load);
        assert!(config.poster.is_none());
    }
}
