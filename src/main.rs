// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod control;
mod data;
mod gui;
mod settings;
mod types;
use eframe::egui;
use settings::{Settings, SETTINGS_FILE};
use types::LaunchOptions;
fn main() -> eframe::Result<()> {
    env_logger::init();
    let launch = LaunchOptions::from_args(std::env::args().skip(1));
    let settings = Settings::load_or_default(SETTINGS_FILE);
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1463.0, 915.0])
        .with_min_inner_size([900.0, 600.0])
        .with_title("SCIDO Waveform Editor");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "epgview",
        options,
        Box::new(move |_cc| Box::new(gui::EpgViewerApp::new(settings, launch))),
    )
}
