use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use log::{debug, warn};
use crate::control::message::{ControlMessage, ControlValue};
/// Static description of one slider row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliderSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}
pub const SLIDERS: [SliderSpec; 4] = [
    SliderSpec {
        name: "ddso",
        label: "Excitation Voltage",
        unit: "V",
        min: -33,
        max: 33,
        default: 0,
    },
    SliderSpec {
        name: "ddsa",
        label: "Excitation Voltage",
        unit: "Vrms",
        min: -500,
        max: 1,
        default: 0,
    },
    SliderSpec {
        name: "sca",
        label: "Gain",
        unit: "V",
        min: 1,
        max: 700,
        default: 1,
    },
    SliderSpec {
        name: "sco",
        label: "Offset",
        unit: "V",
        min: -33,
        max: 33,
        default: 0,
    },
];
/// `(control name, caption)` of every push button.
pub const BUTTONS: [(&str, &str); 7] = [
    ("on", "ON"),
    ("start", "START"),
    ("off", "OFF"),
    ("cancel", "Cancel"),
    ("revert", "Revert to Defaults"),
    ("apply", "Apply"),
    ("applyClose", "Apply & Close"),
];
pub const MODE_CONTROL: &str = "mode";
/// DC keeps the DDS amplitude pinned; AC keeps the DDS offset pinned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Dc,
    Ac,
}
impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Dc, Mode::Ac];
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Dc => "DC",
            Mode::Ac => "AC",
        }
    }
}
impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for Mode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "DC" | "dc" => Ok(Mode::Dc),
            "AC" | "ac" => Ok(Mode::Ac),
            other => Err(format!("unknown mode {other:?}")),
        }
    }
}
/// A slider and its text entry, kept in sync in both directions.
#[derive(Clone, Debug)]
pub struct BoundSlider {
    pub spec: SliderSpec,
    value: i64,
    entry: String,
    visible: bool,
}
impl BoundSlider {
    fn new(spec: SliderSpec) -> Self {
        Self {
            spec,
            value: spec.default,
            entry: spec.default.to_string(),
            visible: true,
        }
    }
    pub fn value(&self) -> i64 {
        self.value
    }
    pub fn entry(&self) -> &str {
        &self.entry
    }
    pub fn is_visible(&self) -> bool {
        self.visible
    }
    /// Clamp and apply; the entry always mirrors the slider. Returns whether
    /// the value changed.
    fn set_value(&mut self, value: i64) -> bool {
        let value = value.clamp(self.spec.min, self.spec.max);
        self.entry = value.to_string();
        if value == self.value {
            return false;
        }
        self.value = value;
        true
    }
    /// Text typed into the entry. Invalid numbers leave the slider untouched.
    fn text_edited(&mut self, text: &str) -> bool {
        self.entry = text.to_owned();
        match text.trim().parse::<i64>() {
            Ok(parsed) => {
                let clamped = parsed.clamp(self.spec.min, self.spec.max);
                clamped != self.value && self.set_value(clamped)
            }
            Err(_) => false,
        }
    }
}
/// State behind the "EPG Controls" window.
///
/// Local edits queue outbound messages; remote updates are applied with
/// emission suppressed until the next frame so they do not echo back.
#[derive(Debug)]
pub struct ControlPanel {
    client_id: String,
    mode: Mode,
    sliders: Vec<BoundSlider>,
    suppress: bool,
    release_pending: bool,
    outbox: Vec<ControlMessage>,
}
impl ControlPanel {
    pub fn new(client_id: impl Into<String>) -> Self {
        let mut panel = Self {
            client_id: client_id.into(),
            mode: Mode::Dc,
            sliders: SLIDERS.iter().copied().map(BoundSlider::new).collect(),
            suppress: false,
            release_pending: false,
            outbox: Vec::new(),
        };
        panel.apply_mode(Mode::Dc);
        panel
    }
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
    pub fn mode(&self) -> Mode {
        self.mode
    }
    pub fn is_suppressed(&self) -> bool {
        self.suppress
    }
    pub fn sliders(&self) -> &[BoundSlider] {
        &self.sliders
    }
    pub fn slider(&self, name: &str) -> Option<&BoundSlider> {
        self.sliders.iter().find(|s| s.spec.name == name)
    }
    fn slider_mut(&mut self, name: &str) -> Option<&mut BoundSlider> {
        self.sliders.iter_mut().find(|s| s.spec.name == name)
    }
    /// Run once per frame before drawing: lifts suppression scheduled by the
    /// previous frame.
    pub fn tick(&mut self) {
        if self.release_pending {
            self.suppress = false;
            self.release_pending = false;
        }
    }
    fn suppress_until_next_tick(&mut self) {
        self.suppress = true;
        self.release_pending = true;
    }
    /// Messages queued since the last call.
    pub fn drain_outbox(&mut self) -> Vec<ControlMessage> {
        std::mem::take(&mut self.outbox)
    }
    pub fn send_control_update(&mut self, name: &str, value: impl Into<ControlValue>) {
        if self.suppress {
            debug!("suppressed control update {name}");
            return;
        }
        self.outbox
            .push(ControlMessage::control(&self.client_id, name, value));
    }
    /// Slider dragged by the user.
    pub fn slider_moved(&mut self, name: &str, value: i64) {
        let changed = self
            .slider_mut(name)
            .map(|s| s.set_value(value))
            .unwrap_or(false);
        if changed {
            self.send_control_update(name, value_of(self.slider(name)));
        }
    }
    /// Text typed into a slider's entry.
    pub fn entry_edited(&mut self, name: &str, text: &str) {
        let changed = self
            .slider_mut(name)
            .map(|s| s.text_edited(text))
            .unwrap_or(false);
        if changed {
            self.send_control_update(name, value_of(self.slider(name)));
        }
    }
    /// Button clicked. Returns `true` when the panel should close.
    pub fn button_clicked(&mut self, name: &str) -> bool {
        self.send_control_update(name, ControlValue::clicked());
        match name {
            "revert" => {
                self.revert_to_defaults();
                false
            }
            "applyClose" | "cancel" => true,
            _ => false,
        }
    }
    pub fn revert_to_defaults(&mut self) {
        let defaults: Vec<(&'static str, i64)> = self
            .sliders
            .iter()
            .map(|s| (s.spec.name, s.spec.default))
            .collect();
        for (name, value) in defaults {
            self.slider_moved(name, value);
        }
    }
    /// Mode picked in the combo box by the user.
    pub fn mode_selected(&mut self, mode: Mode) {
        if mode != self.mode {
            self.apply_mode(mode);
        }
    }
    /// Switch DC/AC: show the relevant excitation slider and pin the other.
    /// The setpoint goes through [`Self::send_control_update`], so it is
    /// dropped while the switch holds suppression.
    fn apply_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.suppress_until_next_tick();
        for slider in &mut self.sliders {
            slider.visible = match slider.spec.name {
                "ddso" => mode == Mode::Dc,
                "ddsa" => mode == Mode::Ac,
                _ => true,
            };
        }
        let setpoint = match mode {
            Mode::Dc => {
                if let Some(s) = self.slider_mut("ddsa") {
                    s.set_value(1);
                }
                ControlValue::Int(1)
            }
            Mode::Ac => {
                if let Some(s) = self.slider_mut("ddso") {
                    s.set_value(-1);
                }
                ControlValue::Float(-0.3)
            }
        };
        debug!("mode changed to {mode}");
        self.send_control_update("ddsa", setpoint);
    }
    /// Apply one remote control update. Updates from our own id are ignored
    /// and unknown names are logged and dropped.
    pub fn set_control_value(&mut self, name: &str, value: &ControlValue, source: Option<&str>) -> bool {
        if source == Some(self.client_id.as_str()) {
            return false;
        }
        if name == MODE_CONTROL {
            let Some(mode) = value.as_text().and_then(|t| t.parse::<Mode>().ok()) else {
                warn!("[CS] Invalid mode value: {value}");
                return false;
            };
            if mode != self.mode {
                self.apply_mode(mode);
            }
            return true;
        }
        if BUTTONS.iter().any(|(button, _)| *button == name) {
            return true;
        }
        if self.slider(name).is_none() {
            warn!("[CS] Unknown control name: {name}");
            return false;
        }
        let Some(number) = value.as_i64() else {
            warn!("[CS] Non-numeric value for {name}: {value}");
            return false;
        };
        self.suppress_until_next_tick();
        if let Some(slider) = self.slider_mut(name) {
            slider.set_value(number);
        }
        true
    }
    /// Apply a full state snapshot, mode first.
    pub fn set_all_controls(&mut self, state: &BTreeMap<String, ControlValue>, source: Option<&str>) {
        if let Some(mode) = state.get(MODE_CONTROL) {
            self.set_control_value(MODE_CONTROL, mode, source);
        }
        for (name, value) in state.iter().filter(|(name, _)| *name != MODE_CONTROL) {
            self.set_control_value(name, value, source);
        }
    }
    pub fn apply_inbound(&mut self, message: &ControlMessage) {
        match message {
            ControlMessage::Control {
                source,
                name,
                value,
            } => {
                self.set_control_value(name, value, Some(source));
            }
            ControlMessage::FullState { source, state } => {
                if source != &self.client_id {
                    self.set_all_controls(state, Some(source));
                }
            }
        }
    }
}
fn value_of(slider: Option<&BoundSlider>) -> i64 {
    slider.map(BoundSlider::value).unwrap_or_default()
}
