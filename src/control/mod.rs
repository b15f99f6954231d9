pub mod message;
pub mod panel;
pub mod socket;
pub use message::{ControlMessage, ControlValue};
pub use panel::{BoundSlider, ControlPanel, Mode, SliderSpec, BUTTONS, SLIDERS};
pub use socket::{random_client_id, SocketClient};
