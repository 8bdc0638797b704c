//! Clip widget - render surface.
//!
//! Pure mapping from playback phase to painted output, nothing else.
//! Precedence when several conditions could apply: errored > not-yet-loaded
//! (skeleton) > ready (clip visible). The media element only contributes to
//! the output while attached; while `Idle` the reserved area holds only the
//! poster (or the bare skeleton fill when no poster exists) and no media
//! exists at all - that absence is what realizes the resource-release
//! guarantee at the rendering layer.

use eframe::egui;

use crate::core::lifecycle::Phase;

use super::clip::ClipView;

/// Skeleton fill while nothing is decoded yet.
const SKELETON_FILL: egui::Color32 = egui::Color32::from_gray(25);

/// Corner rounding of the clip area.
const CORNER: f32 = 4.0;

/// Render one clip into its reserved rect.
pub(crate) fn render(ui: &mut egui::Ui, rect: egui::Rect, view: &mut ClipView) {
    if !ui.is_rect_visible(rect) && view.phase() == Phase::Idle {
        // Fully clipped and detached: nothing worth painting
        return;
    }

    match view.phase() {
        Phase::Errored => {
            ui.painter().rect_filled(rect, CORNER, SKELETON_FILL);
            let message = view
                .lifecycle()
                .error_message()
                .unwrap_or("Clip failed to load")
                .to_string();
            ui.put(
                rect,
                egui::Label::new(egui::RichText::new(message).color(egui::Color32::RED)),
            );
        }
        Phase::Attaching => {
            ui.painter().rect_filled(rect, CORNER, SKELETON_FILL);
            let ctx = ui.ctx().clone();
            if let Some(poster) = view.poster_texture(&ctx) {
                let fitted = fit_rect(rect, texture_aspect(poster));
                paint_texture(ui, fitted, poster);
            }
            ui.put(rect, egui::Spinner::new().size(24.0));
        }
        Phase::Ready => {
            ui.painter()
                .rect_filled(rect, CORNER, egui::Color32::BLACK);
            if let Some(texture) = view.frame_texture() {
                let fitted = fit_rect(rect, texture_aspect(texture));
                paint_texture(ui, fitted, texture);
            }
        }
        Phase::Idle => {
            // Lazy placeholder: poster only, no media element
            ui.painter().rect_filled(rect, CORNER, SKELETON_FILL);
            let ctx = ui.ctx().clone();
            if let Some(poster) = view.poster_texture(&ctx) {
                let fitted = fit_rect(rect, texture_aspect(poster));
                paint_texture(ui, fitted, poster);
            }
        }
    }
}

fn texture_aspect(texture: &egui::TextureHandle) -> f32 {
    let size = texture.size_vec2();
    if size.y > 0.0 { size.x / size.y } else { 1.0 }
}

fn paint_texture(ui: &egui::Ui, rect: egui::Rect, texture: &egui::TextureHandle) {
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    ui.painter()
        .image(texture.id(), rect, uv, egui::Color32::WHITE);
}

/// Largest aspect-preserving rect centered inside `outer`.
fn fit_rect(outer: egui::Rect, aspect: f32) -> egui::Rect {
    let outer_aspect = outer.width() / outer.height();
    let size = if aspect >= outer_aspect {
        egui::vec2(outer.width(), outer.width() / aspect)
    } else {
        egui::vec2(outer.height() * aspect, outer.height())
    };
    egui::Rect::from_center_size(outer.center(), size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{Rect, pos2};

    #[test]
    fn test_fit_rect_wide_clip_letterboxes() {
        let outer = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let fitted = fit_rect(outer, 2.0);
        assert_eq!(fitted.width(), 100.0);
        assert_eq!(fitted.height(), 50.0);
        assert_eq!(fitted.center(), outer.center());
    }

    #[test]
    fn test_fit_rect_tall_clip_pillarboxes() {
        let outer = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let fitted = fit_rect(outer, 0.5);
        assert_eq!(fitted.width(), 50.0);
        assert_eq!(fitted.height(), 100.0);
    }

    #[test]
    fn test_fit_rect_matching_aspect_fills() {
        let outer = Rect::from_min_max(pos2(0.0, 0.0), pos2(160.0, 90.0));
        let fitted = fit_rect(outer, 16.0 / 9.0);
        assert_eq!(fitted, outer);
    }
}
