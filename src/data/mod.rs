// src/data/mod.rs
pub mod downsample;
pub mod error;
pub mod labels;
pub mod plot;
pub mod recording;
pub mod selection;
pub mod viewport;
pub use downsample::{downsample_visible, DownsampleMethod, Downsampled, DEFAULT_MAX_POINTS};
pub use error::EpgError;
pub use labels::{LabelRegion, END_AREA_LABEL};
pub use plot::{render_view_png, PlotStyle};
pub use recording::{EpgData, Prepost, Recording};
pub use selection::{HoverTarget, InteractionMode, Released, Selection};
pub use viewport::{DataPoint, ScreenPoint, ScreenRect, Viewport};
