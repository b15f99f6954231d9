use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};
/// Value carried by a control message: a slider position, a float setpoint or
/// an enum/button string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Int(i64),
    Float(f64),
    Text(String),
}
impl ControlValue {
    pub fn clicked() -> Self {
        ControlValue::Text("clicked".to_owned())
    }
    /// Integer view, truncating floats toward zero and parsing numeric text.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ControlValue::Int(v) => Some(*v),
            ControlValue::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            ControlValue::Float(_) => None,
            ControlValue::Text(s) => s.trim().parse().ok(),
        }
    }
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ControlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}
impl From<i64> for ControlValue {
    fn from(value: i64) -> Self {
        ControlValue::Int(value)
    }
}
impl From<i32> for ControlValue {
    fn from(value: i32) -> Self {
        ControlValue::Int(value.into())
    }
}
impl From<f64> for ControlValue {
    fn from(value: f64) -> Self {
        ControlValue::Float(value)
    }
}
impl From<&str> for ControlValue {
    fn from(value: &str) -> Self {
        ControlValue::Text(value.to_owned())
    }
}
impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::Int(v) => write!(f, "{v}"),
            ControlValue::Float(v) => write!(f, "{v}"),
            ControlValue::Text(s) => f.write_str(s),
        }
    }
}
/// Messages exchanged with the instrument server, one JSON object per line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// A single named control changed.
    Control {
        source: String,
        name: String,
        value: ControlValue,
    },
    /// Every control value at once, typically sent on connect.
    FullState {
        source: String,
        state: BTreeMap<String, ControlValue>,
    },
}
impl ControlMessage {
    pub fn control(source: &str, name: &str, value: impl Into<ControlValue>) -> Self {
        ControlMessage::Control {
            source: source.to_owned(),
            name: name.to_owned(),
            value: value.into(),
        }
    }
    /// Serialize as a newline-terminated JSON line.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    #[test]
    fn control_message_has_flat_shape() {
        let msg = ControlMessage::control("abc", "sca", 42);
        let value: serde_json::Value = serde_json::from_str(&msg.to_line().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"source": "abc", "type": "control", "name": "sca", "value": 42})
        );
        let click = ControlMessage::control("abc", "apply", ControlValue::clicked());
        let value = serde_json::to_value(&click).unwrap();
        assert_eq!(value["value"], "clicked");
    }
    #[test]
    fn parses_inbound_messages() {
        let msg = ControlMessage::from_line(
            r#"{"type":"control","source":"srv","name":"ddsa","value":-0.3}"#,
        )
        .unwrap();
        assert_eq!(msg, ControlMessage::control("srv", "ddsa", -0.3));
        let full = ControlMessage::from_line(
            r#"{"type":"full_state","source":"srv","state":{"mode":"AC","sco":-5}}"#,
        )
        .unwrap();
        match full {
            ControlMessage::FullState { source, state } => {
                assert_eq!(source, "srv");
                assert_eq!(state["mode"], ControlValue::from("AC"));
                assert_eq!(state["sco"], ControlValue::Int(-5));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(ControlMessage::from_line(r#"{"type":"bogus"}"#).is_err());
    }
    #[test]
    fn integer_view_truncates() {
        assert_eq!(ControlValue::Float(-0.3).as_i64(), Some(0));
        assert_eq!(ControlValue::Float(12.9).as_i64(), Some(12));
        assert_eq!(ControlValue::from(" 7 ").as_i64(), Some(7));
        assert_eq!(ControlValue::from("DC").as_i64(), None);
    }
}
