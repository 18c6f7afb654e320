// Timeline widget - egui render surface for the timeline view
// The engine presents views from wherever it runs; the widget keeps the
// latest one and paints it each frame. Clicks on a lane are queued and
// collected by the app, which forwards them as mute toggles.

use crate::timeline::TimelineError;
use crate::timeline::render::{Gradient, LaneView, TimelineSurface, TimelineView};
use eframe::egui;
use std::sync::{Arc, Mutex};

const LANE_HEIGHT: f32 = 44.0;
const LANE_ROUNDING: f32 = 4.0;
const MARKER_ROUNDING: f32 = 3.0;
/// Fraction of the lane reserved for the name label; markers use the rest.
const LABEL_FRACTION: f32 = 0.35;

const ACTIVE_BORDER: egui::Color32 = egui::Color32::from_rgb(0xFF, 0xE6, 0x6D);

struct WidgetState {
    attached: bool,
    hidden: bool,
    view: TimelineView,
    clicks: Vec<String>,
}

/// Cheaply cloneable widget handle. One clone is boxed as the engine's render
/// surface, another stays with the app to paint and collect clicks.
#[derive(Clone)]
pub struct TimelineWidget {
    state: Arc<Mutex<WidgetState>>,
}

impl TimelineWidget {
    pub fn new() -> Self {
        Self::with_attachment(true)
    }

    /// A widget with no screen real estate, for hosts without a timeline
    /// pane. The engine sees this at init and disables itself.
    pub fn detached() -> Self {
        Self::with_attachment(false)
    }

    fn with_attachment(attached: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(WidgetState {
                attached,
                hidden: false,
                view: TimelineView::empty(),
                clicks: Vec::new(),
            })),
        }
    }

    /// The engine-facing half of this widget.
    pub fn surface(&self) -> Box<dyn TimelineSurface> {
        Box::new(self.clone())
    }

    /// Lane ids clicked since the last call.
    pub fn take_clicks(&self) -> Vec<String> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut state.clicks)
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let view = {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.hidden {
                return;
            }
            state.view.clone()
        };

        if let Some(text) = view.placeholder {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.label(egui::RichText::new(text).weak());
                ui.add_space(24.0);
            });
            return;
        }

        let mut clicked = Vec::new();
        for lane in &view.lanes {
            if draw_lane(ui, lane) {
                clicked.push(lane.id.clone());
            }
            ui.add_space(4.0);
        }

        if !clicked.is_empty() {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.clicks.extend(clicked);
        }
    }
}

impl Default for TimelineWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineSurface for TimelineWidget {
    fn is_attached(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.attached
    }

    fn present(&mut self, view: &TimelineView) -> Result<(), TimelineError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| TimelineError::Surface("widget state poisoned".to_string()))?;
        state.view = view.clone();
        Ok(())
    }

    fn hide(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.hidden = true;
        state.view = TimelineView::empty();
    }
}

/// Paint one lane; returns true when it was clicked.
fn draw_lane(ui: &mut egui::Ui, lane: &LaneView) -> bool {
    let desired = egui::vec2(ui.available_width(), LANE_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::click());
    if !ui.is_rect_visible(rect) {
        return response.clicked();
    }

    let painter = ui.painter();
    painter.add(gradient_mesh(rect, lane.gradient));
    if lane.active {
        painter.rect_stroke(rect, LANE_ROUNDING, egui::Stroke::new(2.0, ACTIVE_BORDER));
    }

    painter.text(
        rect.left_center() + egui::vec2(10.0, 0.0),
        egui::Align2::LEFT_CENTER,
        format!("{} · {}", lane.id, lane.kind.label()),
        egui::FontId::proportional(13.0),
        egui::Color32::WHITE,
    );

    let area = egui::Rect::from_min_max(
        egui::pos2(rect.left() + rect.width() * LABEL_FRACTION, rect.top() + 6.0),
        egui::pos2(rect.right() - 10.0, rect.bottom() - 6.0),
    );
    for marker in &lane.markers {
        let x = area.left() + area.width() * marker.offset_pct / 100.0;
        let width = area.width() * marker.width_pct / 100.0;
        let marker_rect =
            egui::Rect::from_min_size(egui::pos2(x, area.top()), egui::vec2(width, area.height()));
        let fill = if marker.highlighted {
            egui::Color32::from_white_alpha(200)
        } else {
            egui::Color32::from_white_alpha(48)
        };
        painter.rect_filled(marker_rect, MARKER_ROUNDING, fill);
    }

    response.clicked()
}

/// Horizontal two-stop gradient as a quad mesh.
pub(crate) fn gradient_mesh(rect: egui::Rect, gradient: Gradient) -> egui::Shape {
    let [r, g, b] = gradient.start;
    let start = egui::Color32::from_rgb(r, g, b);
    let [r, g, b] = gradient.end;
    let end = egui::Color32::from_rgb(r, g, b);

    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(rect.left_top(), start);
    mesh.colored_vertex(rect.right_top(), end);
    mesh.colored_vertex(rect.right_bottom(), end);
    mesh.colored_vertex(rect.left_bottom(), start);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    egui::Shape::mesh(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::registry::InstrumentKind;
    use crate::timeline::render::{LaneView, PLACEHOLDER_TEXT};

    fn lane(id: &str) -> LaneView {
        LaneView {
            id: id.to_string(),
            kind: InstrumentKind::Synth,
            gradient: InstrumentKind::Synth.gradient(),
            active: false,
            markers: Vec::new(),
        }
    }

    #[test]
    fn test_presented_view_is_retained() {
        let widget = TimelineWidget::new();
        let mut surface = widget.surface();
        assert!(surface.is_attached());

        let view = TimelineView {
            beat: 1,
            lanes: vec![lane("kick")],
            placeholder: None,
        };
        surface.present(&view).unwrap();

        let state = widget.state.lock().unwrap();
        assert_eq!(state.view.lanes.len(), 1);
        assert_eq!(state.view.beat, 1);
    }

    #[test]
    fn test_hide_drops_back_to_empty_view() {
        let widget = TimelineWidget::new();
        let mut surface = widget.surface();
        surface
            .present(&TimelineView {
                beat: 0,
                lanes: vec![lane("kick")],
                placeholder: None,
            })
            .unwrap();

        surface.hide();

        let state = widget.state.lock().unwrap();
        assert!(state.hidden);
        assert_eq!(state.view.placeholder, Some(PLACEHOLDER_TEXT));
    }

    #[test]
    fn test_detached_widget_reports_unattached() {
        let widget = TimelineWidget::detached();
        assert!(!widget.surface().is_attached());
    }

    #[test]
    fn test_take_clicks_drains_queue() {
        let widget = TimelineWidget::new();
        {
            let mut state = widget.state.lock().unwrap();
            state.clicks.push("kick".to_string());
            state.clicks.push("lead".to_string());
        }

        assert_eq!(widget.take_clicks(), vec!["kick", "lead"]);
        assert!(widget.take_clicks().is_empty());
    }
}
