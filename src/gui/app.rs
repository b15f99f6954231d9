// src/gui/app.rs
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context as _, Result};
use eframe::egui;
use egui::{Align2, Color32, CursorIcon, FontId, Pos2, Rect, RichText, Rounding, Stroke, Vec2};
use egui_plot::{HLine, Line, LineStyle, Plot, PlotBounds, PlotPoints, Points, VLine};
use log::{debug, info, warn};
use plotters::style::RGBColor;
use crate::control::{random_client_id, ControlPanel, SocketClient};
use crate::data::viewport::{compression_text, zoom_text};
use crate::data::{
    downsample_visible, render_view_png, DataPoint, DownsampleMethod, Downsampled, EpgData,
    HoverTarget, InteractionMode, PlotStyle, Prepost, Released, ScreenRect, Selection, Viewport,
};
use crate::gui::control_panel;
use crate::settings::{Settings, SETTINGS_FILE};
use crate::types::{Dialog, LaunchOptions, LinkStatus, MenuAction};
/// egui reports wheel motion in points (about 50 per notch); the pan and zoom
/// constants expect eighths of a degree (120 per notch).
const WHEEL_POINTS_TO_DELTA: f64 = 2.4;
/// egui folds Ctrl+wheel into `zoom_delta() = exp(points / 200)`.
const ZOOM_POINTS_PER_E: f64 = 200.0;
const LOG_LINES: usize = 8;
pub struct EpgViewerApp {
    settings: Settings,
    data: EpgData,
    file: Option<String>,
    prepost: Prepost,
    method: DownsampleMethod,
    viewport: Viewport,
    series: Downsampled,
    selection: Selection,
    comments: Vec<(f64, String)>,
    pointer: Option<DataPoint>,
    context_target: Option<HoverTarget>,
    dialog: Dialog,
    path_input: String,
    busy: bool,
    log_messages: Vec<String>,
    panel: ControlPanel,
    show_panel: bool,
    socket: Option<SocketClient>,
    link: LinkStatus,
}
impl EpgViewerApp {
    pub fn new(settings: Settings, launch: LaunchOptions) -> Self {
        let client_id = if settings.client_id.trim().is_empty() {
            random_client_id()
        } else {
            settings.client_id.clone()
        };
        let method = settings.method();
        let mut app = Self {
            settings,
            data: EpgData::new(),
            file: None,
            prepost: launch.prepost,
            method,
            viewport: Viewport::default(),
            series: Downsampled::default(),
            selection: Selection::new(),
            comments: Vec::new(),
            pointer: None,
            context_target: None,
            dialog: Dialog::None,
            path_input: launch.file.clone().unwrap_or_default(),
            busy: false,
            log_messages: vec!["EPG viewer ready.".to_owned()],
            panel: ControlPanel::new(client_id),
            show_panel: false,
            socket: None,
            link: LinkStatus::Offline,
        };
        if let Some(path) = launch.file {
            app.open_file(&path);
        }
        app
    }
    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > LOG_LINES {
            self.log_messages.remove(0);
        }
    }
    fn open_file(&mut self, path: &str) {
        self.busy = true;
        match self.data.load_data(path) {
            Ok(key) => {
                let marks = self.data.get_transitions(&key).map(|t| t.len()).unwrap_or(0);
                self.log(&format!("Loaded {key}, {marks} label transitions"));
                self.file = Some(key);
                self.selection.clear();
                self.refresh_from_store();
                self.reset_view();
            }
            Err(e) => {
                warn!("failed to load {path}: {e}");
                self.log(&format!("Load failed: {e}"));
                self.dialog = Dialog::Error(format!("Could not open {path}:\n{e}"));
            }
        }
    }
    /// Re-read regions and comments of the current file from the store.
    fn refresh_from_store(&mut self) {
        let Some(file) = self.file.as_deref() else { return };
        let Ok(recording) = self.data.get(file) else { return };
        let times = recording.times();
        let limits = match (times.first(), times.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => (0.0, 0.0),
        };
        self.selection.set_regions(recording.label_regions(), limits);
        self.comments = recording.comments();
    }
    /// Show the whole recording: full-range downsample, view fitted to it.
    fn reset_view(&mut self) {
        let Some(file) = self.file.clone() else { return };
        let full = self
            .data
            .get_recording(&file, self.prepost)
            .and_then(|(x, y)| downsample_visible(x, y, None, self.settings.max_points, self.method));
        match full {
            Ok(series) => {
                let x = match (series.x.first(), series.x.last()) {
                    (Some(&lo), Some(&hi)) => (lo, hi),
                    _ => (0.0, 1.0),
                };
                let y = series.value_bounds().unwrap_or((-1.0, 1.0));
                self.viewport.reset_to(x, y);
                self.series = series;
            }
            Err(e) => self.log(&format!("Reset failed: {e}")),
        }
    }
    /// Re-downsample the visible window after a pan, zoom or method change.
    fn update_plot(&mut self) {
        let Some(file) = self.file.as_deref() else { return };
        let visible = self.data.get_recording(file, self.prepost).and_then(|(x, y)| {
            downsample_visible(
                x,
                y,
                Some(self.viewport.x_range()),
                self.settings.max_points,
                self.method,
            )
        });
        match visible {
            Ok(series) => self.series = series,
            Err(e) => warn!("downsampling failed: {e}"),
        }
    }
    fn duration(&self) -> f64 {
        self.file
            .as_deref()
            .and_then(|f| self.data.get(f).ok())
            .map(|r| r.duration())
            .unwrap_or(0.0)
    }
    fn write_back_transitions(&mut self, transitions: Vec<(f64, Option<String>)>) {
        let Some(file) = self.file.clone() else { return };
        if let Err(e) = self.data.set_transitions(&file, &transitions) {
            warn!("could not store transitions: {e}");
            return;
        }
        debug!("stored {} transitions", transitions.len());
        self.refresh_from_store();
    }
    fn save_current(&mut self) {
        let Some(file) = self.file.clone() else { return };
        match self.data.save(&file, &file) {
            Ok(()) => self.log(&format!("Saved {file}")),
            Err(e) => self.dialog = Dialog::Error(format!("Save failed: {e}")),
        }
    }
    fn export_png(&self) -> Result<PathBuf> {
        let file = self.file.as_deref().context("no recording loaded")?;
        let path = PathBuf::from(file).with_extension("png");
        let regions = self.selection.regions();
        let png = render_view_png(
            &self.series,
            regions,
            |label| {
                let [r, g, b] = self.settings.label_color(label);
                RGBColor(r, g, b)
            },
            &PlotStyle::default(),
        )
        .context("rendering view")?;
        fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
    fn connect_socket(&mut self) {
        let addr = self.settings.socket_addr.clone();
        match SocketClient::connect(&addr, self.panel.client_id()) {
            Ok(client) => {
                self.socket = Some(client);
                self.link = LinkStatus::Connected(addr);
            }
            Err(e) => {
                warn!("{e:#}");
                self.link = LinkStatus::Failed(e.to_string());
            }
        }
    }
    /// Exchange control messages with the instrument server.
    fn pump_socket(&mut self) {
        if let Some(socket) = self.socket.as_mut() {
            for msg in socket.poll() {
                self.panel.apply_inbound(&msg);
            }
        }
        let outbox = self.panel.drain_outbox();
        let Some(socket) = self.socket.as_mut() else {
            if !outbox.is_empty() {
                debug!("dropping {} control messages, not connected", outbox.len());
            }
            return;
        };
        for msg in &outbox {
            if let Err(e) = socket.send(msg) {
                warn!("{e:#}");
                self.link = LinkStatus::Failed(e.to_string());
                self.socket = None;
                return;
            }
        }
        if !socket.is_connected() {
            self.link = LinkStatus::Offline;
            self.socket = None;
        }
    }
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.dialog.is_open() {
            return;
        }
        let (reset, baseline, comment, escape, delete) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::R),
                i.key_pressed(egui::Key::B),
                i.key_pressed(egui::Key::C),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Delete),
            )
        });
        if reset {
            self.reset_view();
        }
        if baseline {
            self.selection.toggle_baseline_preview();
        }
        if comment {
            self.selection.toggle_comment_preview();
        }
        if escape {
            self.selection.cancel();
        }
        let single = match self.selection.selected() {
            [idx] => Some(*idx),
            _ => None,
        };
        if let (true, Some(idx)) = (delete, single) {
            if let Some(t) = self.selection.delete_region(idx) {
                self.write_back_transitions(t);
            }
        }
    }
    /// Ctrl+wheel zooms (Shift for the y axis); plain wheel pans.
    fn handle_wheel(&mut self, ctx: &egui::Context, center: DataPoint) {
        let (scroll, zoom, modifiers) = ctx.input(|i| (i.scroll_delta, i.zoom_delta(), i.modifiers));
        let mut changed = false;
        if (zoom - 1.0).abs() > f32::EPSILON {
            self.viewport
                .wheel_zoom(zoom_to_wheel_delta(zoom), center, modifiers.shift);
            changed = true;
        } else {
            let raw = if modifiers.shift { scroll.x + scroll.y } else { scroll.y };
            if raw != 0.0 {
                let delta = raw as f64 * WHEEL_POINTS_TO_DELTA;
                changed = self.viewport.pan_by_wheel(delta, modifiers.shift);
            }
        }
        if changed {
            self.update_plot();
        }
    }
    fn handle_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let (pressed, released, additive) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.modifiers.command || i.modifiers.shift,
            )
        });
        if released {
            match self.selection.release() {
                Released::Transitions(t) => self.write_back_transitions(t),
                Released::Baseline(y) => debug!("baseline moved to {y:.3}"),
                Released::Nothing => {}
            }
        }
        let Some(point) = self.pointer else { return };
        let times = self.comment_times();
        let hovered = self.selection.hover(point, &self.viewport, &times);
        match hovered {
            Some(HoverTarget::Transition(_)) => ctx.set_cursor_icon(CursorIcon::ResizeHorizontal),
            Some(HoverTarget::Baseline) => ctx.set_cursor_icon(CursorIcon::ResizeVertical),
            Some(HoverTarget::Comment(_)) => ctx.set_cursor_icon(CursorIcon::PointingHand),
            _ => {}
        }
        if pressed && response.hovered() {
            match self.selection.mode() {
                InteractionMode::BaselinePreview => {
                    if self.selection.set_baseline(point, &self.viewport) {
                        self.log(&format!("Baseline at {:.3} V", point.y));
                    }
                }
                InteractionMode::CommentPreview => {
                    self.begin_comment(point.x);
                    self.selection.cancel();
                }
                InteractionMode::MovingComment(old) => {
                    self.move_comment(old, point.x);
                    self.selection.cancel();
                }
                InteractionMode::Normal => {
                    self.selection.press(point, &self.viewport, &times, additive);
                }
            }
        }
        if self.selection.is_dragging() && response.dragged() {
            self.selection.drag_to(point);
        }
        if response.secondary_clicked() {
            self.context_target = hovered;
        }
    }
    fn comment_times(&self) -> Vec<f64> {
        self.comments.iter().map(|(t, _)| *t).collect()
    }
    fn begin_comment(&mut self, x: f64) {
        let Some(file) = self.file.as_deref() else { return };
        let Ok(recording) = self.data.get(file) else { return };
        let Some((time, existing)) = recording.comment_near(x) else { return };
        self.dialog = match existing.map(str::trim).filter(|s| !s.is_empty()) {
            Some(existing) => Dialog::ConfirmOverwrite {
                time,
                existing: existing.to_owned(),
            },
            None => Dialog::EditComment {
                time,
                text: String::new(),
            },
        };
    }
    fn move_comment(&mut self, old: f64, x: f64) {
        let Some(file) = self.file.clone() else { return };
        if let Ok(recording) = self.data.get_mut(&file) {
            if let Some(t) = recording.move_comment(old, x) {
                debug!("comment moved {old:.3}s -> {t:.3}s");
            }
        }
        self.refresh_from_store();
    }
    fn apply_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Relabel(idx, label) => {
                if let Some(t) = self.selection.change_label_type(idx, &label) {
                    self.write_back_transitions(t);
                }
            }
            MenuAction::DeleteRegion(idx) => {
                if let Some(t) = self.selection.delete_region(idx) {
                    self.write_back_transitions(t);
                }
            }
            MenuAction::EditComment(time) => {
                let text = self
                    .comments
                    .iter()
                    .find(|(t, _)| *t == time)
                    .map(|(_, c)| c.clone())
                    .unwrap_or_default();
                self.dialog = Dialog::EditComment { time, text };
            }
            MenuAction::MoveComment(time) => self.selection.start_moving_comment(time),
            MenuAction::DeleteComment(time) => {
                if let Some(file) = self.file.clone() {
                    if let Ok(recording) = self.data.get_mut(&file) {
                        recording.delete_comment(time);
                    }
                }
                self.refresh_from_store();
            }
        }
    }
    fn context_menu(&mut self, response: &egui::Response) {
        let Some(target) = self.context_target else { return };
        let labels = self.settings.selectable_labels();
        let current = match target {
            HoverTarget::LabelArea(idx) => self.selection.regions().get(idx).map(|r| r.label.clone()),
            _ => None,
        };
        let mut action = None;
        response.clone().context_menu(|ui| match target {
            HoverTarget::LabelArea(idx) => {
                ui.menu_button("Label type", |ui| {
                    for label in &labels {
                        let checked = current.as_deref() == Some(label.as_str());
                        if ui.radio(checked, label.as_str()).clicked() {
                            action = Some(MenuAction::Relabel(idx, label.clone()));
                            ui.close_menu();
                        }
                    }
                });
                if ui.button("Delete region").clicked() {
                    action = Some(MenuAction::DeleteRegion(idx));
                    ui.close_menu();
                }
            }
            HoverTarget::Comment(time) => {
                if ui.button("Edit comment").clicked() {
                    action = Some(MenuAction::EditComment(time));
                    ui.close_menu();
                }
                if ui.button("Move comment").clicked() {
                    action = Some(MenuAction::MoveComment(time));
                    ui.close_menu();
                }
                if ui.button("Delete comment").clicked() {
                    action = Some(MenuAction::DeleteComment(time));
                    ui.close_menu();
                }
            }
            _ => {
                ui.label("Nothing here");
            }
        });
        if let Some(action) = action {
            self.context_target = None;
            self.apply_menu_action(action);
        }
    }
    fn show_dialog(&mut self, ctx: &egui::Context) {
        let mut next = None;
        let mut commit = None;
        match &mut self.dialog {
            Dialog::None => return,
            Dialog::ConfirmOverwrite { time, existing } => {
                egui::Window::new("Overwrite Comment?")
                    .collapsible(false)
                    .resizable(false)
                    .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                    .show(ctx, |ui| {
                        ui.label(format!(
                            "A comment already exists at {:.2}s:\n\n\"{}\"\n\nReplace it?",
                            time, existing
                        ));
                        ui.horizontal(|ui| {
                            if ui.button("Yes").clicked() {
                                next = Some(Dialog::EditComment {
                                    time: *time,
                                    text: existing.clone(),
                                });
                            }
                            if ui.button("No").clicked() {
                                next = Some(Dialog::None);
                            }
                        });
                    });
            }
            Dialog::EditComment { time, text } => {
                egui::Window::new(format!("Add Comment @ {:.2}s", time))
                    .collapsible(false)
                    .resizable(false)
                    .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                    .show(ctx, |ui| {
                        ui.label("Enter your comment:");
                        ui.add(egui::TextEdit::multiline(text).desired_rows(3));
                        ui.horizontal(|ui| {
                            if ui.button("OK").clicked() {
                                commit = Some((*time, text.clone()));
                            }
                            if ui.button("Cancel").clicked() {
                                next = Some(Dialog::None);
                            }
                        });
                    });
            }
            Dialog::Error(msg) => {
                egui::Window::new("Error")
                    .collapsible(false)
                    .resizable(false)
                    .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                    .show(ctx, |ui| {
                        ui.label(RichText::new(msg.as_str()).color(Color32::LIGHT_RED));
                        if ui.button("OK").clicked() {
                            next = Some(Dialog::None);
                        }
                    });
            }
        }
        if let Some((time, text)) = commit {
            next = Some(Dialog::None);
            self.commit_comment(time, &text);
        }
        if let Some(dialog) = next {
            self.dialog = dialog;
        }
    }
    fn commit_comment(&mut self, time: f64, text: &str) {
        let Some(file) = self.file.clone() else { return };
        if let Ok(recording) = self.data.get_mut(&file) {
            match recording.add_comment(time, text) {
                Some((t, _)) => info!("comment added at {t:.2}s"),
                None => debug!("blank comment ignored"),
            }
        }
        self.refresh_from_store();
    }
    fn color_of(&self, label: &str, alpha: u8) -> Color32 {
        let [r, g, b] = self.settings.label_color(label);
        Color32::from_rgba_unmultiplied(r, g, b, alpha)
    }
    fn draw_plot(&mut self, ui: &mut egui::Ui) {
        let (x_min, x_max) = self.viewport.x_range();
        let (y_min, y_max) = self.viewport.y_range();
        let points = self.series.points();
        let show_scatter = points.len() <= self.settings.scatter_threshold;
        let hovered = self.selection.hovered();
        let mode = self.selection.mode();
        let pointer = self.pointer;
        let baseline = self.selection.baseline();
        let viewport = self.viewport;
        let transitions: Vec<(usize, f64)> = self
            .selection
            .regions()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.start >= x_min && r.start <= x_max)
            .map(|(i, r)| (i, r.start))
            .collect();
        let comment_times = self.comment_times();
        let response = Plot::new("epg_plot")
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false)
            .show_grid(self.settings.show_grid)
            .x_axis_label("Time [s]")
            .y_axis_label("Voltage [V]")
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, y_min], [x_max, y_max]));
                if !points.is_empty() {
                    if show_scatter {
                        plot_ui.points(Points::new(PlotPoints::new(points.clone())).radius(2.5).color(Color32::LIGHT_BLUE));
                    }
                    plot_ui.line(Line::new(PlotPoints::new(points)).color(Color32::from_rgb(0, 160, 255)).name("signal"));
                }
                for (idx, x) in transitions {
                    let hot = hovered == Some(HoverTarget::Transition(idx));
                    plot_ui.vline(VLine::new(x).color(Color32::WHITE).width(if hot { 3.0 } else { 1.5 }));
                }
                if let Some(y) = baseline {
                    let hot = hovered == Some(HoverTarget::Baseline);
                    plot_ui.hline(HLine::new(y).color(Color32::GRAY).width(if hot { 3.0 } else { 1.5 }));
                }
                for t in comment_times.iter().copied().filter(|t| (x_min..=x_max).contains(t)) {
                    let hot = hovered == Some(HoverTarget::Comment(t));
                    plot_ui.vline(
                        VLine::new(t)
                            .color(Color32::YELLOW)
                            .style(LineStyle::dashed_loose())
                            .width(if hot { 2.5 } else { 1.0 }),
                    );
                }
                match (mode, pointer) {
                    (InteractionMode::BaselinePreview, Some(p)) if viewport.contains(p) => {
                        plot_ui.hline(HLine::new(p.y).color(Color32::GRAY).style(LineStyle::dashed_dense()));
                    }
                    (InteractionMode::CommentPreview | InteractionMode::MovingComment(_), Some(p)) => {
                        plot_ui.vline(VLine::new(p.x).color(Color32::YELLOW).style(LineStyle::dashed_dense()));
                    }
                    _ => {}
                }
                (plot_ui.pointer_coordinate(), *plot_ui.transform().frame())
            });
        let (coordinate, frame) = response.inner;
        self.viewport.set_screen(ScreenRect::new(
            frame.left() as f64,
            frame.top() as f64,
            frame.width() as f64,
            frame.height() as f64,
        ));
        self.pointer = coordinate.map(|c| DataPoint::new(c.x, c.y));
        self.paint_regions(ui, frame);
        let ctx = ui.ctx().clone();
        if response.response.hovered() {
            if let Some(center) = self.pointer {
                self.handle_wheel(&ctx, center);
            }
        }
        self.handle_pointer(&ctx, &response.response);
        self.context_menu(&response.response);
    }
    /// Label backgrounds and captions, painted over the plot frame.
    fn paint_regions(&self, ui: &egui::Ui, frame: Rect) {
        let painter = ui.painter_at(frame);
        let (x_min, x_max) = self.viewport.x_range();
        let hovered = self.selection.hovered();
        for (idx, region) in self.selection.regions().iter().enumerate() {
            if region.is_end_area() || !region.overlaps(x_min, x_max) {
                continue;
            }
            let left = self.viewport.data_to_screen(DataPoint::new(region.start.max(x_min), 0.0)).x;
            let right = self.viewport.data_to_screen(DataPoint::new(region.end().min(x_max), 0.0)).x;
            if right - left < 1.0 {
                continue;
            }
            let emphasised = self.selection.is_selected(idx) || hovered == Some(HoverTarget::LabelArea(idx));
            let alpha = if emphasised { 90 } else { 45 };
            let rect = Rect::from_min_max(
                Pos2::new(left as f32, frame.top()),
                Pos2::new(right as f32, frame.bottom()),
            );
            painter.rect_filled(rect, Rounding::ZERO, self.color_of(&region.label, alpha));
            if self.selection.is_selected(idx) {
                painter.rect_stroke(rect, Rounding::ZERO, Stroke::new(1.5, Color32::WHITE));
            }
            let top = Pos2::new(rect.center().x, frame.top() + 4.0);
            painter.text(top, Align2::CENTER_TOP, &region.label, FontId::proportional(14.0), Color32::WHITE);
            painter.text(
                top + Vec2::new(0.0, 16.0),
                Align2::CENTER_TOP,
                region.duration_text(),
                FontId::proportional(11.0),
                Color32::LIGHT_GRAY,
            );
        }
    }
}
impl eframe::App for EpgViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.panel.tick();
        self.pump_socket();
        if self.socket.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if self.busy {
            ctx.set_cursor_icon(CursorIcon::Progress);
            self.busy = false;
        }
        self.handle_keys(ctx);
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("File");
                ui.add(egui::TextEdit::singleline(&mut self.path_input).desired_width(320.0));
                if ui.button("Open").clicked() {
                    let path = self.path_input.trim().to_owned();
                    if !path.is_empty() {
                        self.open_file(&path);
                    }
                }
                ui.add_enabled_ui(self.file.is_some(), |ui| {
                    if ui.button("Save").clicked() {
                        self.save_current();
                    }
                    if ui.button("Export PNG").clicked() {
                        match self.export_png() {
                            Ok(path) => self.log(&format!("Exported {}", path.display())),
                            Err(e) => self.dialog = Dialog::Error(format!("{e:#}")),
                        }
                    }
                    if ui.button("Reset view").clicked() {
                        self.reset_view();
                    }
                });
                ui.separator();
                let mut prepost = self.prepost;
                ui.selectable_value(&mut prepost, Prepost::Pre, "pre");
                ui.selectable_value(&mut prepost, Prepost::Post, "post");
                let mut method = self.method;
                egui::ComboBox::from_id_source("downsample_method")
                    .selected_text(method.as_str())
                    .show_ui(ui, |ui| {
                        for m in DownsampleMethod::ALL {
                            ui.selectable_value(&mut method, m, m.as_str());
                        }
                    });
                if prepost != self.prepost {
                    self.prepost = prepost;
                    self.reset_view();
                }
                if method != self.method {
                    self.method = method;
                    self.update_plot();
                }
                ui.separator();
                ui.toggle_value(&mut self.show_panel, "Controls");
                if self.socket.is_none() && ui.button("Connect").clicked() {
                    self.connect_socket();
                }
                if ui.button("Save settings").clicked() {
                    self.settings.downsample_method = self.method.as_str().to_owned();
                    self.settings.client_id = self.panel.client_id().to_owned();
                    if let Err(e) = self.settings.save(SETTINGS_FILE) {
                        self.dialog = Dialog::Error(format!("{e:#}"));
                    }
                }
            });
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let compression = self.viewport.compression(ctx.pixels_per_point() as f64);
                ui.monospace(compression_text(compression));
                ui.separator();
                ui.monospace(zoom_text(self.viewport.zoom_level(self.duration())));
                ui.separator();
                ui.label(format!("{} pts", self.series.len()));
                ui.separator();
                let mode = match self.selection.mode() {
                    InteractionMode::Normal => "",
                    InteractionMode::BaselinePreview => "click to set baseline",
                    InteractionMode::CommentPreview => "click to add comment",
                    InteractionMode::MovingComment(_) => "click to move comment",
                };
                ui.label(RichText::new(mode).color(Color32::YELLOW));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(self.link.text());
                });
            });
            egui::ScrollArea::vertical().max_height(60.0).show(ui, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.file.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label("Open a recording to begin. Keys: R reset, B baseline, C comment.");
                });
                return;
            }
            self.draw_plot(ui);
        });
        self.show_dialog(ctx);
        let mut open = self.show_panel;
        if open {
            control_panel::show(ctx, &mut self.panel, &mut open);
        }
        self.show_panel = open;
    }
}
/// Recover the wheel delta, in eighths of a degree, behind an egui zoom factor.
fn zoom_to_wheel_delta(zoom: f32) -> f64 {
    (zoom as f64).ln() * ZOOM_POINTS_PER_E * WHEEL_POINTS_TO_DELTA
}
