/// WinDAQ compression is seconds-per-pixel times this factor.
pub const WINDAQ_COMPRESSION_FACTOR: f64 = 125.0;
/// Wheel zoom multiplier per unit of scroll delta.
pub const WHEEL_ZOOM_BASE: f64 = 1.001;
/// Fraction of the visible width panned per unit of horizontal scroll delta.
pub const H_PAN_FACTOR: f64 = 2e-4;
/// Fraction of the visible height panned per unit of vertical scroll delta.
pub const V_PAN_FACTOR: f64 = 5e-4;
/// A point in data space: seconds and volts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}
impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
/// A point in screen pixels, y grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}
impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
/// Axis-aligned pixel rectangle the plot occupies on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}
impl ScreenRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}
/// Visible data range plus the screen rectangle it is drawn into.
///
/// The mapping between the two is affine on each axis; pan and zoom only move
/// the data range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub screen: ScreenRect,
}
impl Default for Viewport {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 1.0,
            y_min: -1.0,
            y_max: 1.0,
            screen: ScreenRect::new(0.0, 0.0, 400.0, 400.0),
        }
    }
}
impl Viewport {
    pub fn x_range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }
    pub fn y_range(&self) -> (f64, f64) {
        (self.y_min, self.y_max)
    }
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
    pub fn set_range(&mut self, x: (f64, f64), y: (f64, f64)) {
        (self.x_min, self.x_max) = x;
        (self.y_min, self.y_max) = y;
    }
    /// Show the whole recording again. Degenerate ranges are padded so the
    /// mapping stays invertible.
    pub fn reset_to(&mut self, x: (f64, f64), y: (f64, f64)) {
        let pad = |(lo, hi): (f64, f64)| {
            if hi > lo {
                (lo, hi)
            } else {
                (lo - 0.5, lo + 0.5)
            }
        };
        self.set_range(pad(x), pad(y));
    }
    pub fn set_screen(&mut self, screen: ScreenRect) {
        self.screen = screen;
    }
    pub fn contains(&self, p: DataPoint) -> bool {
        (self.x_min..=self.x_max).contains(&p.x) && (self.y_min..=self.y_max).contains(&p.y)
    }
    pub fn data_to_screen(&self, p: DataPoint) -> ScreenPoint {
        let s = self.screen;
        ScreenPoint {
            x: s.left + (p.x - self.x_min) / self.width() * s.width,
            y: s.top + (self.y_max - p.y) / self.height() * s.height,
        }
    }
    pub fn screen_to_data(&self, p: ScreenPoint) -> DataPoint {
        let s = self.screen;
        DataPoint {
            x: self.x_min + (p.x - s.left) / s.width * self.width(),
            y: self.y_max - (p.y - s.top) / s.height * self.height(),
        }
    }
    /// On-screen width of a data-space x distance.
    pub fn pixel_width(&self, dx: f64) -> f64 {
        dx / self.width() * self.screen.width
    }
    /// On-screen height of a data-space y distance.
    pub fn pixel_height(&self, dy: f64) -> f64 {
        dy / self.height() * self.screen.height
    }
    /// Zoom by `factor` around `center`; the y axis instead of x when `vertical`.
    pub fn zoom_about(&mut self, factor: f64, center: DataPoint, vertical: bool) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let scale = 1.0 / factor;
        if vertical {
            self.y_min = center.y + (self.y_min - center.y) * scale;
            self.y_max = center.y + (self.y_max - center.y) * scale;
        } else {
            self.x_min = center.x + (self.x_min - center.x) * scale;
            self.x_max = center.x + (self.x_max - center.x) * scale;
        }
    }
    /// Wheel zoom: `delta` is the raw wheel delta in eighths of a degree.
    pub fn wheel_zoom(&mut self, delta: f64, center: DataPoint, vertical: bool) {
        self.zoom_about(WHEEL_ZOOM_BASE.powf(delta), center, vertical);
    }
    /// Wheel pan. Returns `false` when a horizontal pan was refused because it
    /// would push `x = 0` more than half way across the view.
    pub fn pan_by_wheel(&mut self, delta: f64, vertical: bool) -> bool {
        if vertical {
            let dy = delta * V_PAN_FACTOR * self.height();
            self.y_min += dy;
            self.y_max += dy;
            return true;
        }
        let width = self.width();
        let dx = delta * H_PAN_FACTOR * width;
        let new_min = self.x_min + dx;
        if new_min + 0.5 * width < 0.0 {
            return false;
        }
        self.x_min = new_min;
        self.x_max += dx;
        true
    }
    /// WinDAQ-style compression readout, infinite for an empty time span.
    pub fn compression(&self, pixels_per_point: f64) -> f64 {
        let span = self.width();
        let plot_width = self.screen.width * pixels_per_point;
        if span == 0.0 || plot_width == 0.0 {
            return f64::INFINITY;
        }
        span / plot_width * WINDAQ_COMPRESSION_FACTOR
    }
    /// Current magnification relative to showing `file_length_sec` seconds.
    pub fn zoom_level(&self, file_length_sec: f64) -> f64 {
        let span = self.width();
        if span == 0.0 {
            return f64::INFINITY;
        }
        file_length_sec / span
    }
}
/// Format a zoom level as the percentage readout, dropping decimals for whole values.
pub fn zoom_text(level: f64) -> String {
    if !level.is_finite() {
        return "Zoom: --".to_owned();
    }
    if (level - level.round()).abs() < 1e-9 {
        format!("Zoom: {:.0}%", level * 100.0)
    } else {
        format!("Zoom: {:.1}%", level * 100.0)
    }
}
pub fn compression_text(compression: f64) -> String {
    if compression.is_finite() {
        format!("Compression Level: {compression:.1}")
    } else {
        "Compression Level: --".to_owned()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn viewport() -> Viewport {
        Viewport {
            x_min: 10.0,
            x_max: 30.0,
            y_min: -2.0,
            y_max: 2.0,
            screen: ScreenRect::new(50.0, 20.0, 800.0, 400.0),
        }
    }
    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * (1.0 + a.abs().max(b.abs()))
    }
    #[test]
    fn corners_map_to_screen_corners() {
        let vp = viewport();
        let top_left = vp.data_to_screen(DataPoint::new(10.0, 2.0));
        assert_eq!(top_left, ScreenPoint::new(50.0, 20.0));
        let bottom_right = vp.data_to_screen(DataPoint::new(30.0, -2.0));
        assert_eq!(bottom_right, ScreenPoint::new(850.0, 420.0));
    }
    #[test]
    fn mapping_round_trips_under_pan_and_zoom() {
        let mut vp = viewport();
        let points = [
            DataPoint::new(12.5, 0.3),
            DataPoint::new(-4.0, 17.0),
            DataPoint::new(29.999, -1.999),
        ];
        for step in 0..6 {
            match step % 3 {
                0 => vp.wheel_zoom(120.0, DataPoint::new(20.0, 0.0), false),
                1 => vp.wheel_zoom(-240.0, DataPoint::new(15.0, 1.0), true),
                _ => {
                    vp.pan_by_wheel(360.0, false);
                    vp.pan_by_wheel(-120.0, true);
                }
            }
            for p in points {
                let back = vp.screen_to_data(vp.data_to_screen(p));
                assert!(close(back.x, p.x) && close(back.y, p.y), "{p:?} -> {back:?}");
            }
        }
    }
    #[test]
    fn zoom_keeps_center_fixed() {
        let mut vp = viewport();
        let center = DataPoint::new(14.0, 0.0);
        let before = vp.data_to_screen(center);
        vp.zoom_about(2.0, center, false);
        assert!(close(vp.width(), 10.0));
        let after = vp.data_to_screen(center);
        assert!(close(before.x, after.x));
    }
    #[test]
    fn pan_refuses_to_drag_origin_past_half_the_view() {
        let mut vp = Viewport {
            x_min: -4.0,
            x_max: 6.0,
            ..viewport()
        };
        assert!(!vp.pan_by_wheel(-1000.0, false));
        assert_eq!(vp.x_range(), (-4.0, 6.0));
        assert!(vp.pan_by_wheel(500.0, false));
        assert!(close(vp.x_min, -3.0));
    }
    #[test]
    fn compression_and_zoom_guard_zero_span() {
        let mut vp = viewport();
        assert!(close(vp.compression(1.0), 20.0 / 800.0 * 125.0));
        assert!(close(vp.zoom_level(40.0), 2.0));
        vp.x_max = vp.x_min;
        assert!(vp.compression(1.0).is_infinite());
        assert!(vp.zoom_level(40.0).is_infinite());
    }
    #[test]
    fn zoom_text_drops_decimals_for_whole_levels() {
        assert_eq!(zoom_text(2.0), "Zoom: 200%");
        assert_eq!(zoom_text(1.234), "Zoom: 123.4%");
        assert_eq!(zoom_text(f64::INFINITY), "Zoom: --");
    }
}
