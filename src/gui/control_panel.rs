// src/gui/control_panel.rs
use eframe::egui;
use egui::{Color32, RichText};
use crate::control::{ControlPanel, Mode, BUTTONS};
/// Draw the "EPG Controls" window. Edits go through the panel model, which
/// queues the outbound messages.
pub fn show(ctx: &egui::Context, panel: &mut ControlPanel, open: &mut bool) {
    let mut close_requested = false;
    egui::Window::new("EPG Controls")
        .open(open)
        .resizable(false)
        .default_width(420.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Mode");
                let mut mode = panel.mode();
                egui::ComboBox::from_id_source("epg_mode")
                    .selected_text(mode.as_str())
                    .show_ui(ui, |ui| {
                        for m in Mode::ALL {
                            ui.selectable_value(&mut mode, m, m.as_str());
                        }
                    });
                if mode != panel.mode() {
                    panel.mode_selected(mode);
                }
                if panel.is_suppressed() {
                    ui.label(RichText::new("syncing").small().color(Color32::GRAY));
                }
            });
            ui.separator();
            let rows: Vec<_> = panel
                .sliders()
                .iter()
                .filter(|s| s.is_visible())
                .map(|s| (s.spec, s.value(), s.entry().to_owned()))
                .collect();
            egui::Grid::new("epg_sliders")
                .num_columns(4)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    for (spec, value, entry) in rows {
                        ui.label(spec.label);
                        let mut slider_value = value;
                        if ui
                            .add(egui::Slider::new(&mut slider_value, spec.min..=spec.max).show_value(false))
                            .changed()
                        {
                            panel.slider_moved(spec.name, slider_value);
                        }
                        let mut text = entry;
                        if ui
                            .add(egui::TextEdit::singleline(&mut text).desired_width(56.0))
                            .changed()
                        {
                            panel.entry_edited(spec.name, &text);
                        }
                        ui.label(spec.unit);
                        ui.end_row();
                    }
                });
            ui.separator();
            ui.horizontal_wrapped(|ui| {
                for (name, caption) in BUTTONS {
                    if ui.button(caption).clicked() && panel.button_clicked(name) {
                        close_requested = true;
                    }
                }
            });
            ui.label(
                RichText::new(format!("id {}", panel.client_id()))
                    .small()
                    .color(Color32::GRAY),
            );
        });
    if close_requested {
        *open = false;
    }
}
