/// Label carried by the zero-width region that closes the last real region.
pub const END_AREA_LABEL: &str = "END AREA";
/// A contiguous labelled time interval.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelRegion {
    pub start: f64,
    pub duration: f64,
    pub label: String,
}
impl LabelRegion {
    pub fn new(start: f64, duration: f64, label: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            label: label.into(),
        }
    }
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
    pub fn is_end_area(&self) -> bool {
        self.label == END_AREA_LABEL
    }
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.end()
    }
    pub fn duration_text(&self) -> String {
        format!("{:.2}", self.duration)
    }
    /// Whether the region overlaps `[x_min, x_max]`.
    pub fn overlaps(&self, x_min: f64, x_max: f64) -> bool {
        self.end() >= x_min && self.start <= x_max
    }
}
/// `(time, label)` at the first sample and at every label change.
pub fn transitions(times: &[f64], labels: &[Option<String>]) -> Vec<(f64, Option<String>)> {
    let mut out: Vec<(f64, Option<String>)> = Vec::new();
    for (time, label) in times.iter().zip(labels) {
        match out.last() {
            Some((_, previous)) if previous == label => {}
            _ => out.push((*time, label.clone())),
        }
    }
    out
}
/// Derive the drawable label regions from a per-sample label column.
///
/// Unlabelled stretches are skipped and a zero-width [`END_AREA_LABEL`] region is
/// appended at the end of the last interval. An unlabelled recording gives no
/// regions.
pub fn derive_regions(times: &[f64], labels: &[Option<String>]) -> Vec<LabelRegion> {
    if labels.iter().all(Option::is_none) {
        return Vec::new();
    }
    let Some(&last_time) = times.last() else {
        return Vec::new();
    };
    let changes = transitions(times, labels);
    let mut spans: Vec<(f64, f64, Option<String>)> = changes
        .windows(2)
        .map(|pair| (pair[0].0, pair[1].0 - pair[0].0, pair[0].1.clone()))
        .collect();
    if let Some((time, label)) = changes.last() {
        spans.push((*time, last_time - time, label.clone()));
    }
    let end_start = spans
        .last()
        .map(|(start, duration, _)| start + duration)
        .unwrap_or(last_time);
    let mut regions: Vec<LabelRegion> = spans
        .into_iter()
        .filter_map(|(start, duration, label)| {
            label.map(|label| LabelRegion::new(start, duration, label))
        })
        .collect();
    regions.push(LabelRegion::new(end_start, 0.0, END_AREA_LABEL));
    regions
}
/// Inverse of [`derive_regions`]: the transitions that reproduce `regions`.
///
/// Gaps between regions become unlabelled transitions.
pub fn regions_to_transitions(regions: &[LabelRegion]) -> Vec<(f64, Option<String>)> {
    let mut out: Vec<(f64, Option<String>)> = Vec::new();
    let mut cursor: Option<f64> = None;
    for region in regions {
        if let Some(end) = cursor {
            if region.start > end {
                out.push((end, None));
            }
        }
        if region.is_end_area() {
            break;
        }
        out.push((region.start, Some(region.label.clone())));
        cursor = Some(region.end());
    }
    out
}
/// Index of the region whose start line is nearest to `x`, with the distance.
pub fn closest_transition(regions: &[LabelRegion], x: f64) -> Option<(usize, f64)> {
    if regions.is_empty() {
        return None;
    }
    let idx = regions.partition_point(|r| r.start < x);
    if idx == regions.len() {
        return Some((idx - 1, (x - regions[idx - 1].start).abs()));
    }
    if idx == 0 {
        return Some((0, (regions[0].start - x).abs()));
    }
    let left = (x - regions[idx - 1].start).abs();
    let right = (regions[idx].start - x).abs();
    if left <= right {
        Some((idx - 1, left))
    } else {
        Some((idx, right))
    }
}
/// Index of the region covering `x`, ignoring the terminal end area.
pub fn region_at(regions: &[LabelRegion], x: f64) -> Option<usize> {
    let visible = match regions.last() {
        Some(last) if last.is_end_area() => &regions[..regions.len() - 1],
        _ => regions,
    };
    let first = visible.first()?;
    let last = visible.last()?;
    if x < first.start || x > last.end() {
        return None;
    }
    let idx = visible.partition_point(|r| r.end() < x);
    let idx = idx.min(visible.len() - 1);
    visible[idx].contains(x).then_some(idx)
}
