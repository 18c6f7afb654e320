// Beat indicator - four pads flashing with the metronome

use crate::timeline::render::Gradient;
use crate::ui::widget;
use eframe::egui;

const PAD_SIZE: f32 = 18.0;
const PAD_GAP: f32 = 6.0;
const PAD_ROUNDING: f32 = 3.0;

const IDLE: egui::Color32 = egui::Color32::from_rgb(0x29, 0x2F, 0x36);

/// One flash gradient per beat of the measure.
const BEAT_GRADIENTS: [Gradient; 4] = [
    Gradient { start: [0xFF, 0x6B, 0x6B], end: [0xFF, 0xE6, 0x6D] },
    Gradient { start: [0x4E, 0xCD, 0xC4], end: [0x1A, 0x53, 0x5C] },
    Gradient { start: [0xF7, 0xFF, 0xF7], end: [0xA8, 0xDA, 0xDC] },
    Gradient { start: [0x6B, 0x90, 0x80], end: [0xA4, 0xC3, 0xB2] },
];

pub fn show(ui: &mut egui::Ui, beat: u32) {
    ui.horizontal(|ui| {
        for (slot, gradient) in BEAT_GRADIENTS.iter().enumerate() {
            let (rect, _) = ui.allocate_exact_size(
                egui::vec2(PAD_SIZE, PAD_SIZE),
                egui::Sense::hover(),
            );
            if !ui.is_rect_visible(rect) {
                continue;
            }
            if slot as u32 == beat % BEAT_GRADIENTS.len() as u32 {
                ui.painter().add(widget::gradient_mesh(rect, *gradient));
            } else {
                ui.painter().rect_filled(rect, PAD_ROUNDING, IDLE);
            }
            ui.add_space(PAD_GAP);
        }
    });
}
