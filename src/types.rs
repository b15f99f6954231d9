// src/types.rs
use log::warn;
use crate::data::Prepost;
/// Command line: `epgview [FILE] [--pre|--post]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaunchOptions {
    pub file: Option<String>,
    pub prepost: Prepost,
}
impl LaunchOptions {
    /// Parse arguments, program name excluded. Unknown flags are logged and skipped.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        for arg in args.into_iter().map(Into::into) {
            match arg.as_str() {
                "--pre" => options.prepost = Prepost::Pre,
                "--post" => options.prepost = Prepost::Post,
                flag if flag.starts_with("--") => warn!("Ignoring unknown option {flag}"),
                _ => options.file = Some(arg.clone()),
            }
        }
        options
    }
}
// Modal dialog shown over the plot
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Dialog {
    #[default]
    None,
    /// A comment already sits on the clicked sample.
    ConfirmOverwrite { time: f64, existing: String },
    EditComment { time: f64, text: String },
    Error(String),
}
impl Dialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, Dialog::None)
    }
}
// Picked from the plot context menu
#[derive(Clone, Debug, PartialEq)]
pub enum MenuAction {
    Relabel(usize, String),
    DeleteRegion(usize),
    EditComment(f64),
    MoveComment(f64),
    DeleteComment(f64),
}
// Control socket status
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LinkStatus {
    #[default]
    Offline,
    Connected(String),
    Failed(String),
}
impl LinkStatus {
    pub fn text(&self) -> String {
        match self {
            LinkStatus::Offline => "Control: offline".to_owned(),
            LinkStatus::Connected(addr) => format!("Control: {addr}"),
            LinkStatus::Failed(e) => format!("Control: failed ({e})"),
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn parses_file_and_stage() {
        let opts = LaunchOptions::from_args(["rec.csv", "--pre"]);
        assert_eq!(opts.file.as_deref(), Some("rec.csv"));
        assert_eq!(opts.prepost, Prepost::Pre);
        let opts = LaunchOptions::from_args(["--pre", "--verbose", "--post"]);
        assert_eq!(opts.file, None);
        assert_eq!(opts.prepost, Prepost::Post);
        assert_eq!(LaunchOptions::from_args(Vec::<String>::new()), LaunchOptions::default());
    }
    #[test]
    fn dialog_state() {
        assert!(!Dialog::default().is_open());
        assert!(Dialog::Error("x".into()).is_open());
        assert_eq!(LinkStatus::default().text(), "Control: offline");
    }
}
