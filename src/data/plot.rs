use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;
use crate::data::downsample::Downsampled;
use crate::data::error::EpgError;
use crate::data::labels::LabelRegion;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub line: RGBColor,
    pub title: String,
    /// Caption, axis descriptions and tick labels; needs a system font.
    pub draw_text: bool,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 500,
            background: WHITE,
            line: BLUE,
            title: "SCIDO Waveform Editor".to_owned(),
            draw_text: true,
        }
    }
}
/// Render a downsampled view with its label regions into a PNG.
///
/// `color_of` maps a label to its background fill.
pub fn render_view_png(
    series: &Downsampled,
    regions: &[LabelRegion],
    color_of: impl Fn(&str) -> RGBColor,
    style: &PlotStyle,
) -> Result<Vec<u8>, EpgError> {
    if series.is_empty() {
        return Err(EpgError::Plot("view has no samples".into()));
    }
    let (y_lo, y_hi) = series.value_bounds().unwrap_or((-1.0, 1.0));
    let y_bounds = if (y_hi - y_lo).abs() < f64::EPSILON {
        (y_lo - 1.0, y_hi + 1.0)
    } else {
        (y_lo, y_hi)
    };
    let x_lo = series.x[0];
    let x_hi = series.x[series.len() - 1].max(x_lo + f64::EPSILON);
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut builder = ChartBuilder::on(&root);
        builder.margin(10);
        if style.draw_text {
            builder
                .caption(&style.title, ("sans-serif", 20).into_font().color(&BLACK))
                .set_label_area_size(LabelAreaPosition::Left, 55)
                .set_label_area_size(LabelAreaPosition::Bottom, 40);
        }
        let mut chart = builder.build_cartesian_2d(x_lo..x_hi, y_bounds.0..y_bounds.1)?;
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(&BLACK.mix(0.05));
        if style.draw_text {
            mesh.x_desc("Time [s]").y_desc("Voltage [V]");
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;
        let visible = regions
            .iter()
            .filter(|r| !r.is_end_area() && r.overlaps(x_lo, x_hi));
        for region in visible {
            let fill = color_of(&region.label).mix(0.3).filled();
            let left = region.start.max(x_lo);
            let right = region.end().min(x_hi);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(left, y_bounds.0), (right, y_bounds.1)],
                fill,
            )))?;
        }
        let transitions = regions
            .iter()
            .filter(|r| r.start >= x_lo && r.start <= x_hi)
            .map(|r| PathElement::new(vec![(r.start, y_bounds.0), (r.start, y_bounds.1)], BLACK));
        chart.draw_series(transitions)?;
        chart.draw_series(LineSeries::new(
            series.x.iter().copied().zip(series.y.iter().copied()),
            &style.line,
        ))?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EpgError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| EpgError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::labels::END_AREA_LABEL;
    #[test]
    fn renders_png_with_regions() {
        let series = Downsampled {
            x: (0..200).map(|i| i as f64 * 0.05).collect(),
            y: (0..200).map(|i| (i as f64 * 0.1).sin()).collect(),
        };
        let regions = vec![
            LabelRegion::new(0.0, 4.0, "NP"),
            LabelRegion::new(4.0, 5.95, "C"),
            LabelRegion::new(9.95, 0.0, END_AREA_LABEL),
        ];
        let style = PlotStyle {
            width: 320,
            height: 160,
            draw_text: false,
            ..PlotStyle::default()
        };
        let png = render_view_png(&series, &regions, |_| GREEN, &style).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
    #[test]
    fn empty_view_is_an_error() {
        let err = render_view_png(&Downsampled::default(), &[], |_| RED, &PlotStyle::default());
        assert!(matches!(err, Err(EpgError::Plot(_))));
    }
}
