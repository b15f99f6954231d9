use log::debug;
use crate::data::labels::{self, LabelRegion};
use crate::data::viewport::{DataPoint, Viewport};
/// Pointer distance, in pixels, within which a line counts as hovered.
pub const HOVER_TOLERANCE_PX: f64 = 3.0;
/// What the pointer is currently over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HoverTarget {
    /// Start line of the region at this index.
    Transition(usize),
    Baseline,
    /// Comment marker at this sample time.
    Comment(f64),
    LabelArea(usize),
}
/// Pending click behaviour of the plot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InteractionMode {
    #[default]
    Normal,
    /// Next click places the baseline.
    BaselinePreview,
    /// Next click opens the comment editor.
    CommentPreview,
    /// Next click moves the comment at this time.
    MovingComment(f64),
}
/// Outcome of a button release the caller has to act on.
#[derive(Clone, Debug, PartialEq)]
pub enum Released {
    Nothing,
    /// Label regions changed; write these transitions back to the recording.
    Transitions(Vec<(f64, Option<String>)>),
    Baseline(f64),
}
/// Hover, drag and selection state over the interactive plot items.
#[derive(Debug, Default)]
pub struct Selection {
    regions: Vec<LabelRegion>,
    time_limits: (f64, f64),
    baseline: Option<f64>,
    mode: InteractionMode,
    hovered: Option<HoverTarget>,
    dragging: Option<HoverTarget>,
    selected: Vec<usize>,
}
impl Selection {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn regions(&self) -> &[LabelRegion] {
        &self.regions
    }
    /// Replace the regions, e.g. after loading a file. `time_limits` bounds
    /// transition drags.
    pub fn set_regions(&mut self, regions: Vec<LabelRegion>, time_limits: (f64, f64)) {
        self.regions = regions;
        self.time_limits = time_limits;
        self.hovered = None;
        self.dragging = None;
        self.selected.clear();
    }
    pub fn clear(&mut self) {
        self.set_regions(Vec::new(), (0.0, 0.0));
        self.baseline = None;
        self.mode = InteractionMode::Normal;
    }
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }
    pub fn hovered(&self) -> Option<HoverTarget> {
        self.hovered
    }
    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }
    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }
    pub fn toggle_baseline_preview(&mut self) {
        self.mode = match self.mode {
            InteractionMode::BaselinePreview => InteractionMode::Normal,
            _ => InteractionMode::BaselinePreview,
        };
        self.deselect_all();
        self.hovered = None;
    }
    pub fn toggle_comment_preview(&mut self) {
        self.mode = match self.mode {
            InteractionMode::CommentPreview | InteractionMode::MovingComment(_) => {
                InteractionMode::Normal
            }
            _ => InteractionMode::CommentPreview,
        };
        self.deselect_all();
        self.hovered = None;
    }
    pub fn start_moving_comment(&mut self, time: f64) {
        self.mode = InteractionMode::MovingComment(time);
        self.deselect_all();
        self.hovered = None;
    }
    pub fn cancel(&mut self) {
        self.mode = InteractionMode::Normal;
        self.dragging = None;
        self.deselect_all();
    }
    /// Place the baseline at `y` if the point lies inside the view.
    pub fn set_baseline(&mut self, point: DataPoint, viewport: &Viewport) -> bool {
        if !viewport.contains(point) {
            return false;
        }
        self.baseline = Some(point.y);
        self.mode = InteractionMode::Normal;
        true
    }
    /// Work out what is under the pointer. Lines win over areas.
    pub fn hover(
        &mut self,
        point: DataPoint,
        viewport: &Viewport,
        comment_times: &[f64],
    ) -> Option<HoverTarget> {
        if self.dragging.is_some() {
            return self.hovered;
        }
        self.hovered = self.hit_test(point, viewport, comment_times);
        self.hovered
    }
    fn hit_test(
        &self,
        point: DataPoint,
        viewport: &Viewport,
        comment_times: &[f64],
    ) -> Option<HoverTarget> {
        if self.mode != InteractionMode::Normal {
            return None;
        }
        if let Some((idx, dist)) = labels::closest_transition(&self.regions, point.x) {
            if viewport.pixel_width(dist) <= HOVER_TOLERANCE_PX {
                return Some(HoverTarget::Transition(idx));
            }
        }
        if let Some(y) = self.baseline {
            if viewport.pixel_height((point.y - y).abs()) <= HOVER_TOLERANCE_PX {
                return Some(HoverTarget::Baseline);
            }
        }
        let near_comment = comment_times
            .iter()
            .copied()
            .find(|t| viewport.pixel_width((point.x - t).abs()) <= HOVER_TOLERANCE_PX);
        if let Some(time) = near_comment {
            return Some(HoverTarget::Comment(time));
        }
        labels::region_at(&self.regions, point.x).map(HoverTarget::LabelArea)
    }
    /// Primary button pressed in normal mode: start a drag or change selection.
    pub fn press(&mut self, point: DataPoint, viewport: &Viewport, comment_times: &[f64], additive: bool) {
        match self.hover(point, viewport, comment_times) {
            Some(target @ (HoverTarget::Transition(_) | HoverTarget::Baseline)) => {
                self.dragging = Some(target);
            }
            Some(HoverTarget::LabelArea(idx)) => {
                if !additive {
                    self.selected.clear();
                    self.selected.push(idx);
                } else if let Some(pos) = self.selected.iter().position(|&s| s == idx) {
                    self.selected.remove(pos);
                } else {
                    self.selected.push(idx);
                }
            }
            Some(HoverTarget::Comment(_)) => {}
            None => self.deselect_all(),
        }
    }
    /// Pointer moved with the button held.
    pub fn drag_to(&mut self, point: DataPoint) {
        match self.dragging {
            Some(HoverTarget::Transition(idx)) => self.move_transition(idx, point.x),
            Some(HoverTarget::Baseline) => self.baseline = Some(point.y),
            _ => {}
        }
    }
    pub fn release(&mut self) -> Released {
        match self.dragging.take() {
            Some(HoverTarget::Transition(idx)) => {
                debug!("transition {idx} released");
                Released::Transitions(labels::regions_to_transitions(&self.regions))
            }
            Some(HoverTarget::Baseline) => self.baseline.map_or(Released::Nothing, Released::Baseline),
            _ => Released::Nothing,
        }
    }
    /// Move the start of region `idx` (and the end of the region before it
    /// when they touch). The new start stays strictly inside the boundaries
    /// around it: the previous region's start, or its end across a gap, and
    /// the region's own end. The end area may reach the end of the recording.
    pub fn move_transition(&mut self, idx: usize, x: f64) {
        let Some(region) = self.regions.get(idx) else { return };
        let (start, end, is_end) = (region.start, region.end(), region.is_end_area());
        let (lower, touches_prev) = match idx.checked_sub(1).map(|i| &self.regions[i]) {
            Some(prev) if (prev.end() - start).abs() <= 1e-9 * start.abs().max(1.0) => {
                (prev.start, true)
            }
            Some(prev) => (prev.end(), false),
            None => (self.time_limits.0, false),
        };
        let upper = if is_end { self.time_limits.1 } else { end };
        let span = upper - lower;
        if span <= 0.0 {
            return;
        }
        let eps = span * 1e-9;
        let hi = if is_end { upper } else { upper - eps };
        let new_start = x.clamp(lower + eps, hi);
        if touches_prev {
            let prev = &mut self.regions[idx - 1];
            prev.duration = new_start - prev.start;
        }
        let region = &mut self.regions[idx];
        if !is_end {
            region.duration = end - new_start;
        }
        region.start = new_start;
    }
    /// Relabel region `idx`. Returns the transitions to store, or `None` when
    /// nothing changed.
    pub fn change_label_type(&mut self, idx: usize, label: &str) -> Option<Vec<(f64, Option<String>)>> {
        let region = self.regions.get_mut(idx)?;
        if region.is_end_area() || region.label == label {
            return None;
        }
        region.label = label.to_owned();
        Some(labels::regions_to_transitions(&self.regions))
    }
    /// Merge region `idx` into its neighbour (the previous one, or the next
    /// when it is first).
    pub fn delete_region(&mut self, idx: usize) -> Option<Vec<(f64, Option<String>)>> {
        let region = self.regions.get(idx)?.clone();
        if region.is_end_area() {
            return None;
        }
        if idx > 0 && self.regions[idx - 1].end() == region.start {
            self.regions[idx - 1].duration += region.duration;
            self.regions.remove(idx);
        } else if let Some(next) = self.regions.get_mut(idx + 1).filter(|n| !n.is_end_area()) {
            next.duration += next.start - region.start;
            next.start = region.start;
            self.regions.remove(idx);
        } else {
            self.regions.remove(idx);
        }
        if self.regions.iter().all(LabelRegion::is_end_area) {
            self.regions.clear();
        }
        self.selected.clear();
        self.hovered = None;
        Some(labels::regions_to_transitions(&self.regions))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::labels::END_AREA_LABEL;
    use crate::data::viewport::ScreenRect;
    fn regions() -> Vec<LabelRegion> {
        vec![
            LabelRegion::new(0.0, 2.0, "A"),
            LabelRegion::new(2.0, 3.0, "B"),
            LabelRegion::new(5.0, 0.0, END_AREA_LABEL),
        ]
    }
    fn viewport() -> Viewport {
        // 100 px per second horizontally, 100 px per volt vertically
        Viewport {
            x_min: 0.0,
            x_max: 10.0,
            y_min: -2.0,
            y_max: 2.0,
            screen: ScreenRect::new(0.0, 0.0, 1000.0, 400.0),
        }
    }
    fn selection() -> Selection {
        let mut sel = Selection::new();
        sel.set_regions(regions(), (0.0, 10.0));
        sel
    }
    #[test]
    fn hover_prefers_lines_over_areas() {
        let mut sel = selection();
        let vp = viewport();
        assert_eq!(
            sel.hover(DataPoint::new(2.02, 0.0), &vp, &[]),
            Some(HoverTarget::Transition(1))
        );
        assert_eq!(
            sel.hover(DataPoint::new(3.0, 0.0), &vp, &[]),
            Some(HoverTarget::LabelArea(1))
        );
        assert_eq!(
            sel.hover(DataPoint::new(3.0, 0.0), &vp, &[3.01]),
            Some(HoverTarget::Comment(3.01))
        );
        assert!(sel.set_baseline(DataPoint::new(1.0, 0.5), &vp));
        assert_eq!(
            sel.hover(DataPoint::new(3.0, 0.52), &vp, &[]),
            Some(HoverTarget::Baseline)
        );
        assert_eq!(sel.hover(DataPoint::new(8.0, 0.0), &vp, &[]), None);
    }
    #[test]
    fn baseline_outside_view_is_ignored() {
        let mut sel = selection();
        assert!(!sel.set_baseline(DataPoint::new(1.0, 5.0), &viewport()));
        assert_eq!(sel.baseline(), None);
    }
    #[test]
    fn dragging_a_transition_moves_both_edges() {
        let mut sel = selection();
        let vp = viewport();
        sel.press(DataPoint::new(2.0, 0.0), &vp, &[], false);
        assert!(sel.is_dragging());
        sel.drag_to(DataPoint::new(3.0, 0.0));
        match sel.release() {
            Released::Transitions(t) => assert_eq!(
                t,
                vec![(0.0, Some("A".to_owned())), (3.0, Some("B".to_owned()))]
            ),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(sel.regions()[0].duration, 3.0);
        assert_eq!(sel.regions()[1], LabelRegion::new(3.0, 2.0, "B"));
    }
    #[test]
    fn transition_drag_is_clamped_to_neighbours() {
        let mut sel = selection();
        sel.move_transition(1, 9.0);
        let b = &sel.regions()[1];
        assert!(b.start < 5.0 && b.start > 4.999);
        assert!(b.duration > 0.0);
        assert!((b.end() - 5.0).abs() < 1e-9);
        // the edges still touch, so the drag runs back to A's start
        sel.move_transition(1, -3.0);
        assert!(sel.regions()[1].start > 0.0 && sel.regions()[1].start < 1e-6);
        assert!(sel.regions()[0].duration > 0.0);
        sel.move_transition(2, 20.0);
        assert_eq!(sel.regions()[2].start, 10.0);
        assert!(sel.regions()[2].is_end_area());
        assert_eq!(sel.regions()[2].duration, 0.0);
    }
    fn gapped() -> Selection {
        // Z[0,1], unlabelled until 3, C[3,4], end of recording at 4
        let mut sel = Selection::new();
        sel.set_regions(
            vec![
                LabelRegion::new(0.0, 1.0, "Z"),
                LabelRegion::new(3.0, 1.0, "C"),
                LabelRegion::new(4.0, 0.0, END_AREA_LABEL),
            ],
            (0.0, 4.0),
        );
        sel
    }
    fn assert_ordered(regions: &[LabelRegion]) {
        for pair in regions.windows(2) {
            assert!(pair[0].duration >= 0.0, "negative duration in {pair:?}");
            assert!(pair[0].end() <= pair[1].start + 1e-12, "overlap in {pair:?}");
        }
    }
    #[test]
    fn drag_stops_at_own_end_before_a_gap() {
        let mut sel = gapped();
        sel.move_transition(0, 2.5);
        let z = &sel.regions()[0];
        assert!(z.start < 1.0 && z.duration > 0.0);
        assert!((z.end() - 1.0).abs() < 1e-9);
        assert_ordered(sel.regions());
        let t = labels::regions_to_transitions(sel.regions());
        assert_eq!(t.len(), 3);
        assert_eq!(t[0].1.as_deref(), Some("Z"));
        assert!((t[1].0 - 1.0).abs() < 1e-9 && t[1].1.is_none());
        assert_eq!(t[2], (3.0, Some("C".to_owned())));
        assert!(t.windows(2).all(|w| w[0].0 < w[1].0));
    }
    #[test]
    fn drag_stops_at_previous_end_after_a_gap() {
        let mut sel = gapped();
        sel.move_transition(1, 0.5);
        assert_eq!(sel.regions()[0], LabelRegion::new(0.0, 1.0, "Z"));
        let c = &sel.regions()[1];
        assert!(c.start > 1.0 && c.start < 1.001);
        assert!((c.end() - 4.0).abs() < 1e-9);
        assert_ordered(sel.regions());
        sel.move_transition(1, 2.0);
        assert_eq!(sel.regions()[1], LabelRegion::new(2.0, 2.0, "C"));
    }
    #[test]
    fn relabel_and_delete() {
        let mut sel = selection();
        assert_eq!(sel.change_label_type(2, "C"), None);
        let t = sel.change_label_type(1, "C").unwrap();
        assert_eq!(t[1], (2.0, Some("C".to_owned())));
        let t = sel.delete_region(1).unwrap();
        assert_eq!(t, vec![(0.0, Some("A".to_owned()))]);
        assert_eq!(sel.regions()[0].end(), 5.0);
        let t = sel.delete_region(0).unwrap();
        assert!(t.is_empty());
        assert!(sel.regions().is_empty());
    }
    #[test]
    fn preview_modes_are_exclusive() {
        let mut sel = selection();
        sel.toggle_baseline_preview();
        assert_eq!(sel.mode(), InteractionMode::BaselinePreview);
        sel.toggle_comment_preview();
        assert_eq!(sel.mode(), InteractionMode::CommentPreview);
        sel.toggle_comment_preview();
        assert_eq!(sel.mode(), InteractionMode::Normal);
    }
}
