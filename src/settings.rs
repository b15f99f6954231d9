// src/settings.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use crate::data::{DownsampleMethod, DEFAULT_MAX_POINTS, END_AREA_LABEL};
pub const SETTINGS_FILE: &str = "epgview_settings.json";
pub const DEFAULT_SOCKET_ADDR: &str = "127.0.0.1:65432";
/// Waveform labels and their region fill colours (RGB).
pub static DEFAULT_LABEL_COLORS: Lazy<BTreeMap<String, [u8; 3]>> = Lazy::new(|| {
    [
        ("NP", [0x9e, 0x9e, 0x9e]),
        ("C", [0x4c, 0xaf, 0x50]),
        ("E1", [0x21, 0x96, 0xf3]),
        ("E2", [0x3f, 0x51, 0xb5]),
        ("F", [0xff, 0x98, 0x00]),
        ("G", [0x00, 0xbc, 0xd4]),
        ("pd", [0xe9, 0x1e, 0x63]),
        (END_AREA_LABEL, [0x21, 0x21, 0x21]),
    ]
    .into_iter()
    .map(|(label, rgb)| (label.to_owned(), rgb))
    .collect()
});
const FALLBACK_COLOR: [u8; 3] = [0xbd, 0xbd, 0xbd];
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub label_colors: BTreeMap<String, [u8; 3]>,
    pub show_grid: bool,
    pub max_points: usize,
    pub downsample_method: String,
    pub socket_addr: String,
    /// Empty means a random id is generated on start.
    pub client_id: String,
    pub scatter_threshold: usize,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            label_colors: DEFAULT_LABEL_COLORS.clone(),
            show_grid: true,
            max_points: DEFAULT_MAX_POINTS,
            downsample_method: DownsampleMethod::Peak.as_str().to_owned(),
            socket_addr: DEFAULT_SOCKET_ADDR.to_owned(),
            client_id: String::new(),
            scatter_threshold: 500,
        }
    }
}
impl Settings {
    /// Load from `path`, or defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        Ok(settings)
    }
    /// Like [`Settings::load`] but logs failures and falls back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("{e:#}");
            Self::default()
        })
    }
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).context("encoding settings")?;
        fs::write(path, text).with_context(|| format!("writing settings {}", path.display()))
    }
    pub fn method(&self) -> DownsampleMethod {
        self.downsample_method.parse().unwrap_or_else(|e| {
            warn!("{e}, falling back to peak");
            DownsampleMethod::Peak
        })
    }
    pub fn label_color(&self, label: &str) -> [u8; 3] {
        self.label_colors
            .get(label)
            .or_else(|| DEFAULT_LABEL_COLORS.get(label))
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }
    /// Labels a region can be switched to; the end marker is not one of them.
    pub fn selectable_labels(&self) -> Vec<String> {
        self.label_colors
            .keys()
            .filter(|label| label.as_str() != END_AREA_LABEL)
            .cloned()
            .collect()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    #[test]
    fn missing_file_gives_defaults() {
        let path = env::temp_dir().join("epgview_settings_missing_nope.json");
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.scatter_threshold, 500);
        assert_eq!(settings.method(), DownsampleMethod::Peak);
    }
    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = env::temp_dir().join(format!("epgview_settings_{}.json", std::process::id()));
        fs::write(&path, r#"{"max_points": 1000, "downsample_method": "mean"}"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(settings.max_points, 1000);
        assert_eq!(settings.method(), DownsampleMethod::Mean);
        assert_eq!(settings.socket_addr, DEFAULT_SOCKET_ADDR);
    }
    #[test]
    fn save_then_load() {
        let path = env::temp_dir().join(format!("epgview_settings_rt_{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.show_grid = false;
        settings.client_id = "cafe".into();
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(loaded, settings);
    }
    #[test]
    fn colors_and_labels() {
        let settings = Settings::default();
        assert_eq!(settings.label_color("C"), [0x4c, 0xaf, 0x50]);
        assert_eq!(settings.label_color("unknown"), FALLBACK_COLOR);
        let labels = settings.selectable_labels();
        assert!(labels.contains(&"NP".to_owned()));
        assert!(!labels.iter().any(|l| l == END_AREA_LABEL));
    }
    #[test]
    fn bad_method_falls_back() {
        let settings = Settings {
            downsample_method: "median".into(),
            ..Settings::default()
        };
        assert_eq!(settings.method(), DownsampleMethod::Peak);
    }
}
