// src/gui/mod.rs
pub mod app;
pub mod control_panel;
pub use app::EpgViewerApp;
