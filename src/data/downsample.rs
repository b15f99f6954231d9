use std::ops::Range;
use std::str::FromStr;
use ndarray::{ArrayView2, Axis};
use crate::data::EpgError;
/// Default number of points handed to the renderer.
pub const DEFAULT_MAX_POINTS: usize = 4000;
/// Visible slices this small get one extra sample on each side.
pub const EDGE_EXPANSION_THRESHOLD: usize = 250;
/// How a visible slice is reduced to the point budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DownsampleMethod {
    /// First sample of every bucket. Fastest, drops transients.
    Subsample,
    /// Bucket mean at the bucket centre. Smooths noise, drops transients.
    Mean,
    /// Max then min of every bucket at the bucket centre. Keeps the envelope.
    #[default]
    Peak,
}
impl DownsampleMethod {
    pub const ALL: [DownsampleMethod; 3] = [Self::Subsample, Self::Mean, Self::Peak];
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subsample => "subsampling",
            Self::Mean => "mean",
            Self::Peak => "peak",
        }
    }
}
impl FromStr for DownsampleMethod {
    type Err = EpgError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subsampling" | "subsample" | "stride" => Ok(Self::Subsample),
            "mean" => Ok(Self::Mean),
            "peak" => Ok(Self::Peak),
            _ => Err(EpgError::UnknownDownsampleMethod(s.to_owned())),
        }
    }
}
/// Points ready to be drawn, in the same time order as the source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Downsampled {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
impl Downsampled {
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y]).collect()
    }
    /// `(min, max)` of the values, `None` when empty.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        if self.y.is_empty() {
            return None;
        }
        let lo = self.y.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lo, hi))
    }
}
/// Index range of `x` inside `[x_min, x_max]`, widened by one sample per side
/// when the range holds few samples.
pub fn visible_range(x: &[f64], range: Option<(f64, f64)>) -> Range<usize> {
    let Some((x_min, x_max)) = range else {
        return 0..x.len();
    };
    let mut left = x.partition_point(|&t| t < x_min);
    let mut right = x.partition_point(|&t| t <= x_max).max(left);
    if right - left <= EDGE_EXPANSION_THRESHOLD {
        left = left.saturating_sub(1);
        right = (right + 1).min(x.len());
    }
    left..right
}
/// Reduce the visible part of `(x, y)` to at most roughly `max_points` points.
///
/// The source slices are never touched, so calling again with another range or
/// method starts from scratch. A budget below 2 is treated as 2.
pub fn downsample_visible(
    x: &[f64],
    y: &[f64],
    range: Option<(f64, f64)>,
    max_points: usize,
    method: DownsampleMethod,
) -> Result<Downsampled, EpgError> {
    if x.len() != y.len() {
        return Err(EpgError::LengthMismatch {
            times: x.len(),
            values: y.len(),
        });
    }
    let max_points = max_points.max(2);
    let window = visible_range(x, range);
    let x = &x[window.clone()];
    let y = &y[window];
    let count = x.len();
    if count <= max_points || count < 2 {
        return Ok(Downsampled {
            x: x.to_vec(),
            y: y.to_vec(),
        });
    }
    match method {
        DownsampleMethod::Subsample => Ok(subsample(x, y, count / max_points)),
        DownsampleMethod::Mean => bucket_mean(x, y, count / max_points),
        DownsampleMethod::Peak => {
            // two output points per bucket
            let stride = count.div_ceil(max_points / 2).max(1);
            peak(x, y, stride)
        }
    }
}
fn subsample(x: &[f64], y: &[f64], stride: usize) -> Downsampled {
    Downsampled {
        x: x.iter().step_by(stride).copied().collect(),
        y: y.iter().step_by(stride).copied().collect(),
    }
}
fn bucket_centres(x: &[f64], stride: usize, buckets: usize) -> Vec<f64> {
    x.iter()
        .skip(stride / 2)
        .step_by(stride)
        .take(buckets)
        .copied()
        .collect()
}
fn buckets<'a>(y: &'a [f64], stride: usize) -> Result<ArrayView2<'a, f64>, EpgError> {
    let count = y.len() / stride;
    Ok(ArrayView2::from_shape((count, stride), &y[..count * stride])?)
}
fn bucket_mean(x: &[f64], y: &[f64], stride: usize) -> Result<Downsampled, EpgError> {
    let view = buckets(y, stride)?;
    let means = view.map_axis(Axis(1), |row| row.sum() / stride as f64);
    Ok(Downsampled {
        x: bucket_centres(x, stride, view.nrows()),
        y: means.to_vec(),
    })
}
fn peak(x: &[f64], y: &[f64], stride: usize) -> Result<Downsampled, EpgError> {
    let view = buckets(y, stride)?;
    let centres = bucket_centres(x, stride, view.nrows());
    let mut out_x = Vec::with_capacity(centres.len() * 2);
    let mut out_y = Vec::with_capacity(centres.len() * 2);
    for (centre, row) in centres.iter().zip(view.axis_iter(Axis(0))) {
        let hi = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lo = row.iter().copied().fold(f64::INFINITY, f64::min);
        out_x.extend([*centre, *centre]);
        out_y.extend([hi, lo]);
    }
    Ok(Downsampled { x: out_x, y: out_y })
}
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 0.25).collect()
    }
    fn noisy(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }
    #[test]
    fn small_inputs_pass_through() {
        let x = ramp(4000);
        let y = noisy(4000, 1);
        for method in DownsampleMethod::ALL {
            let out = downsample_visible(&x, &y, None, DEFAULT_MAX_POINTS, method).unwrap();
            assert_eq!(out.x, x);
            assert_eq!(out.y, y);
        }
    }
    #[test]
    fn peak_keeps_every_bucket_envelope() {
        let x = ramp(10_000);
        let mut y = noisy(10_000, 7);
        y[1234] = 50.0;
        y[8765] = -50.0;
        let out = downsample_visible(&x, &y, None, 4000, DownsampleMethod::Peak).unwrap();
        let stride = 10_000usize.div_ceil(2000);
        assert_eq!(out.len(), 2 * (10_000 / stride));
        assert!(out.len() <= 4000);
        for (i, bucket) in y.chunks_exact(stride).enumerate() {
            let hi = bucket.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let lo = bucket.iter().copied().fold(f64::INFINITY, f64::min);
            assert_eq!(out.y[2 * i], hi);
            assert_eq!(out.y[2 * i + 1], lo);
            assert_eq!(out.x[2 * i], x[i * stride + stride / 2]);
            assert_eq!(out.x[2 * i], out.x[2 * i + 1]);
        }
        assert!(out.y.contains(&50.0));
        assert!(out.y.contains(&-50.0));
    }
    #[test]
    fn peak_never_exceeds_budget() {
        for n in [4001, 5999, 8001, 12_345] {
            let x = ramp(n);
            let y = noisy(n, n as u64);
            let out = downsample_visible(&x, &y, None, 4000, DownsampleMethod::Peak).unwrap();
            assert!(out.len() <= 4000, "{n} samples gave {} points", out.len());
        }
    }
    #[test]
    fn subsample_is_ordered_subsequence() {
        let x = ramp(9_000);
        let y = noisy(9_000, 3);
        let out = downsample_visible(&x, &y, None, 4000, DownsampleMethod::Subsample).unwrap();
        assert_eq!(out.len(), 9_000usize.div_ceil(2));
        let mut cursor = 0;
        for (ox, oy) in out.x.iter().zip(&out.y) {
            let idx = (cursor..x.len()).find(|&i| x[i] == *ox).unwrap();
            assert_eq!(y[idx], *oy);
            cursor = idx + 1;
        }
    }
    #[test]
    fn mean_averages_each_bucket() {
        let x = ramp(12_000);
        let y: Vec<f64> = (0..12_000).map(|i| (i % 3) as f64).collect();
        let out = downsample_visible(&x, &y, None, 4000, DownsampleMethod::Mean).unwrap();
        assert_eq!(out.len(), 4000);
        assert!(out.y.iter().all(|v| (v - 1.0).abs() < 1e-12));
        assert_eq!(out.x[0], x[1]);
    }
    #[test]
    fn narrow_range_is_widened_by_one_sample() {
        let x = ramp(1_000);
        let range = visible_range(&x, Some((25.1, 27.4)));
        assert_eq!(range, 100..111);
        let full = visible_range(&x, Some((0.0, 125.0)));
        assert_eq!(full, 0..501);
    }
    #[test]
    fn widening_clamps_to_array_bounds() {
        let x = ramp(100);
        assert_eq!(visible_range(&x, Some((-1.0, 12.5))), 0..52);
        assert_eq!(visible_range(&x, Some((22.5, 100.0))), 89..100);
        assert_eq!(visible_range(&x, Some((200.0, 300.0))), 99..100);
    }
    #[test]
    fn repeated_calls_do_not_depend_on_previous_output() {
        let x = ramp(20_000);
        let y = noisy(20_000, 11);
        let first = downsample_visible(&x, &y, Some((100.0, 1500.0)), 4000, DownsampleMethod::Peak)
            .unwrap();
        let _ = downsample_visible(&x, &y, Some((0.0, 5.0)), 500, DownsampleMethod::Mean).unwrap();
        let again = downsample_visible(&x, &y, Some((100.0, 1500.0)), 4000, DownsampleMethod::Peak)
            .unwrap();
        assert_eq!(first, again);
    }
    #[test]
    fn unknown_method_is_rejected() {
        assert!(matches!(
            "median".parse::<DownsampleMethod>(),
            Err(EpgError::UnknownDownsampleMethod(m)) if m == "median"
        ));
        assert_eq!("Peak".parse::<DownsampleMethod>().unwrap(), DownsampleMethod::Peak);
        assert_eq!(
            "subsampling".parse::<DownsampleMethod>().unwrap(),
            DownsampleMethod::Subsample
        );
    }
    #[test]
    fn mismatched_lengths_are_an_error() {
        let err = downsample_visible(&[0.0, 1.0], &[0.0], None, 10, DownsampleMethod::Peak);
        assert!(matches!(err, Err(EpgError::LengthMismatch { .. })));
    }
}
