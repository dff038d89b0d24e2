//! Selectors: turn pixel gestures into data-space selections and select the
//! matching points of target marks.
//!
//! A selector owns its own scale views, so it inverts pixels exactly the way
//! the marks it targets map data. It holds no domain state.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::data::Value;
use crate::domain::Extent;
use crate::geom::{Direction, Point};
use crate::mark::{Channel, Mark, MarkId};
use crate::scale::{PixelMapper, PixelScale, ScaleId, ScaleModel};

static SELECTOR_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(u64);

impl SelectorId {
    fn next() -> Self {
        Self(SELECTOR_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Selector gesture type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    /// Two-dimensional rectangle.
    Brush,
    /// One-dimensional interval along a direction.
    BrushInterval(Direction),
    /// Free-form polygon.
    Lasso,
    /// Single position along x.
    Index,
}

impl SelectorKind {
    /// Resolve a widget model name such as `BrushSelectorModel`.
    pub fn from_model_name(name: &str) -> Option<Self> {
        let kind = match name {
            "BrushSelectorModel" => Self::Brush,
            "BrushIntervalSelectorModel" | "FastIntervalSelectorModel" => {
                Self::BrushInterval(Direction::X)
            }
            "LassoSelectorModel" => Self::Lasso,
            "IndexSelectorModel" => Self::Index,
            _ => return None,
        };
        Some(kind)
    }
}

/// Selection along one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisSelection {
    /// No constraint on this axis.
    Unbounded,
    /// Closed numeric interval.
    Range(Extent),
    /// Set of ordinal labels.
    Labels(Vec<String>),
}

impl AxisSelection {
    /// Check whether a point's value on this axis is selected.
    pub fn contains(&self, value: Option<&Value>) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Range(extent) => value
                .and_then(Value::as_number)
                .is_some_and(|number| extent.contains(number)),
            Self::Labels(labels) => value.is_some_and(|value| {
                let label = value.to_label();
                labels.iter().any(|existing| *existing == label)
            }),
        }
    }
}

/// A selection in data space.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    None,
    /// Per-axis intervals; a point is selected when both axes contain it.
    Rect {
        /// Horizontal selection.
        x: AxisSelection,
        /// Vertical selection.
        y: AxisSelection,
    },
    /// Closed polygon of data points.
    Polygon(Vec<Point>),
    /// Single x position; selects the nearest point.
    Index(Value),
}

/// Pixel outline of a selection, relative to the plot area.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOverlay {
    /// Brushed rectangle as `[start, end]` per axis.
    Rect {
        /// Horizontal pixel span.
        x: [f64; 2],
        /// Vertical pixel span.
        y: [f64; 2],
    },
    /// Lasso outline.
    Polygon(Vec<Point>),
    /// Index cursor at a pixel column.
    Line(f64),
}

/// Something a selector can select points of.
pub trait SelectionTarget {
    /// Number of selectable items.
    fn selectable_len(&self) -> usize;

    /// Data value of an item along a direction.
    fn selection_value(&self, index: usize, direction: Direction) -> Option<Value>;

    /// Store the selected indices.
    fn apply_selection(&mut self, selected: Option<Vec<usize>>);
}

impl SelectionTarget for Mark {
    fn selectable_len(&self) -> usize {
        self.mark_data().len()
    }

    fn selection_value(&self, index: usize, direction: Direction) -> Option<Value> {
        let channel = match direction {
            Direction::X => Channel::X,
            Direction::Y => Channel::Y,
        };
        self.position(index, channel)
    }

    fn apply_selection(&mut self, selected: Option<Vec<usize>>) {
        self.set_selected_indices(selected);
    }
}

/// Even-odd ray casting test.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// An interactive selector over one or two scales.
#[derive(Debug, Clone)]
pub struct Selector {
    id: SelectorId,
    kind: SelectorKind,
    x_scale: Option<ScaleId>,
    y_scale: Option<ScaleId>,
    marks: Vec<MarkId>,
    x_view: Option<PixelScale>,
    y_view: Option<PixelScale>,
    selection: Selection,
    model_id: Option<String>,
}

impl Selector {
    /// Create a selector.
    pub fn new(kind: SelectorKind, x_scale: Option<ScaleId>, y_scale: Option<ScaleId>) -> Self {
        Self {
            id: SelectorId::next(),
            kind,
            x_scale,
            y_scale,
            marks: Vec::new(),
            x_view: None,
            y_view: None,
            selection: Selection::None,
            model_id: None,
        }
    }

    /// Create a rectangle brush.
    pub fn brush(x_scale: ScaleId, y_scale: ScaleId) -> Self {
        Self::new(SelectorKind::Brush, Some(x_scale), Some(y_scale))
    }

    /// Create a horizontal interval brush.
    pub fn brush_interval(x_scale: ScaleId) -> Self {
        Self::new(SelectorKind::BrushInterval(Direction::X), Some(x_scale), None)
    }

    /// Create a lasso.
    pub fn lasso(x_scale: ScaleId, y_scale: ScaleId) -> Self {
        Self::new(SelectorKind::Lasso, Some(x_scale), Some(y_scale))
    }

    /// Create an index selector.
    pub fn index(x_scale: ScaleId) -> Self {
        Self::new(SelectorKind::Index, Some(x_scale), None)
    }

    /// Restrict the selector to specific marks. An empty list targets every
    /// mark sharing the selector's x scale.
    pub fn with_marks(mut self, marks: Vec<MarkId>) -> Self {
        self.marks = marks;
        self
    }

    /// Remember the widget model this selector was built from.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Access the selector identifier.
    pub fn id(&self) -> SelectorId {
        self.id
    }

    /// Access the selector kind.
    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    /// Access the horizontal scale.
    pub fn x_scale(&self) -> Option<ScaleId> {
        self.x_scale
    }

    /// Access the vertical scale.
    pub fn y_scale(&self) -> Option<ScaleId> {
        self.y_scale
    }

    /// Access the explicit target marks.
    pub fn marks(&self) -> &[MarkId] {
        &self.marks
    }

    /// Access the widget model id, if any.
    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    /// Access the current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Check whether a mark is a target of this selector.
    pub fn targets(&self, mark: &Mark) -> bool {
        if self.marks.is_empty() {
            self.x_scale.is_some() && mark.x_scale() == self.x_scale
        } else {
            self.marks.contains(&mark.id())
        }
    }

    pub(crate) fn sync(&mut self, model: &ScaleModel) {
        for (scale, view) in [
            (self.x_scale, &mut self.x_view),
            (self.y_scale, &mut self.y_view),
        ] {
            if scale != Some(model.id()) {
                continue;
            }
            match view.as_mut() {
                Some(view) => view.sync(model),
                None => *view = Some(PixelScale::new(model)),
            }
        }
    }

    pub(crate) fn set_range(&mut self, direction: Direction, range: [f64; 2]) {
        let view = match direction {
            Direction::X => self.x_view.as_mut(),
            Direction::Y => self.y_view.as_mut(),
        };
        if let Some(view) = view {
            view.set_range(range, 0.0);
        }
    }

    /// Replace the selection with a data-space selection.
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.selection = Selection::None;
    }

    /// Select the data under a pixel rectangle spanned by two plot-area
    /// points. Interval brushes ignore the other direction. Returns `false`
    /// and keeps the selection when no brushed axis has a usable scale.
    pub fn brush_pixels(&mut self, start: Point, end: Point) -> bool {
        let x = match self.kind {
            SelectorKind::BrushInterval(Direction::Y) => None,
            _ => pixel_interval(self.x_view.as_ref(), start.x, end.x),
        };
        let y = match self.kind {
            SelectorKind::BrushInterval(Direction::X) => None,
            _ => pixel_interval(self.y_view.as_ref(), start.y, end.y),
        };
        if x.is_none() && y.is_none() {
            return false;
        }
        self.selection = Selection::Rect {
            x: x.unwrap_or(AxisSelection::Unbounded),
            y: y.unwrap_or(AxisSelection::Unbounded),
        };
        true
    }

    /// Select the data inside a pixel polygon. Returns `false` without both
    /// scales.
    pub fn lasso_pixels(&mut self, vertices: &[Point]) -> bool {
        let (Some(x_view), Some(y_view)) = (self.x_view.as_ref(), self.y_view.as_ref()) else {
            return false;
        };
        let polygon = vertices
            .iter()
            .filter_map(|vertex| {
                let x = x_view.invert(vertex.x)?.as_number()?;
                let y = y_view.invert(vertex.y)?.as_number()?;
                Some(Point::new(x, y))
            })
            .collect();
        self.selection = Selection::Polygon(polygon);
        true
    }

    /// Select the point nearest a pixel column. Returns `false` when the
    /// column does not invert.
    pub fn index_pixel(&mut self, pixel_x: f64) -> bool {
        match self.x_view.as_ref().and_then(|view| view.invert(pixel_x)) {
            Some(value) => {
                self.selection = Selection::Index(value);
                true
            }
            None => false,
        }
    }

    /// Pixel outline of the selection inside a `width` x `height` plot area.
    pub fn overlay(&self, width: f64, height: f64) -> Option<SelectionOverlay> {
        match &self.selection {
            Selection::None => None,
            Selection::Rect { x, y } => Some(SelectionOverlay::Rect {
                x: axis_pixels(self.x_view.as_ref(), x, [0.0, width]),
                y: axis_pixels(self.y_view.as_ref(), y, [0.0, height]),
            }),
            Selection::Polygon(polygon) => {
                let (x_view, y_view) = (self.x_view.as_ref()?, self.y_view.as_ref()?);
                Some(SelectionOverlay::Polygon(
                    polygon
                        .iter()
                        .filter_map(|vertex| {
                            Some(Point::new(
                                x_view.scale_number(vertex.x)?,
                                y_view.scale_number(vertex.y)?,
                            ))
                        })
                        .collect(),
                ))
            }
            Selection::Index(value) => self
                .x_view
                .as_ref()?
                .scale_center(value)
                .map(SelectionOverlay::Line),
        }
    }

    /// Indices of a target's items inside the selection; `None` when the
    /// selection is cleared.
    pub fn selected_indices(&self, target: &impl SelectionTarget) -> Option<Vec<usize>> {
        let len = target.selectable_len();
        match &self.selection {
            Selection::None => None,
            Selection::Rect { x, y } => Some(
                (0..len)
                    .filter(|index| {
                        x.contains(target.selection_value(*index, Direction::X).as_ref())
                            && y.contains(target.selection_value(*index, Direction::Y).as_ref())
                    })
                    .collect(),
            ),
            Selection::Polygon(polygon) => Some(
                (0..len)
                    .filter(|index| {
                        let x = target.selection_value(*index, Direction::X);
                        let y = target.selection_value(*index, Direction::Y);
                        match (x.and_then(|v| v.as_number()), y.and_then(|v| v.as_number())) {
                            (Some(x), Some(y)) => point_in_polygon(Point::new(x, y), polygon),
                            _ => false,
                        }
                    })
                    .collect(),
            ),
            Selection::Index(value) => Some(nearest_index(target, value).into_iter().collect()),
        }
    }
}

fn nearest_index(target: &impl SelectionTarget, value: &Value) -> Option<usize> {
    let len = target.selectable_len();
    match value {
        Value::Number(wanted) => (0..len)
            .filter_map(|index| {
                let x = target.selection_value(index, Direction::X)?.as_number()?;
                Some((index, (x - wanted).abs()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index),
        Value::Label(label) => (0..len).find(|index| {
            target
                .selection_value(*index, Direction::X)
                .is_some_and(|x| x.to_label() == *label)
        }),
    }
}

/// Pixel span of an axis selection; unbounded axes cover `full`.
fn axis_pixels(view: Option<&PixelScale>, selection: &AxisSelection, full: [f64; 2]) -> [f64; 2] {
    let Some(view) = view else {
        return full;
    };
    match selection {
        AxisSelection::Unbounded => full,
        AxisSelection::Range(extent) => {
            match (view.scale_number(extent.min), view.scale_number(extent.max)) {
                (Some(a), Some(b)) => [a.min(b), a.max(b)],
                _ => full,
            }
        }
        AxisSelection::Labels(labels) => {
            let band = view.band_width();
            let starts: Vec<f64> = labels
                .iter()
                .filter_map(|label| view.scale(&Value::Label(label.clone())))
                .collect();
            if starts.is_empty() {
                return full;
            }
            let low = starts.iter().copied().fold(f64::INFINITY, f64::min);
            let high = starts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            [low, high + band]
        }
    }
}

/// Data interval covered by two pixel positions. A zero-width interval
/// leaves the axis unconstrained; `None` when the axis has no scale or the
/// pixels do not invert.
fn pixel_interval(view: Option<&PixelScale>, a: f64, b: f64) -> Option<AxisSelection> {
    let view = view?;
    if (a - b).abs() < f64::EPSILON {
        return Some(AxisSelection::Unbounded);
    }
    if view.kind().is_ordinal() {
        let (low, high) = (a.min(b), a.max(b));
        let labels = view
            .domain()
            .labels()?
            .iter()
            .filter(|label| {
                view.scale_center(&Value::Label((*label).clone()))
                    .is_some_and(|center| center >= low && center <= high)
            })
            .cloned()
            .collect();
        return Some(AxisSelection::Labels(labels));
    }
    let a = view.invert(a)?.as_number()?;
    let b = view.invert(b)?.as_number()?;
    Some(AxisSelection::Range(Extent::new(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Values;
    use crate::scale::ContributorId;

    fn points(xs: Vec<f64>, ys: Vec<f64>) -> Mark {
        let mut mark = Mark::scatter()
            .with_field(Channel::X, xs)
            .with_field(Channel::Y, ys);
        mark.update_data();
        mark
    }

    #[test]
    fn interval_selects_inside_points() {
        let mark = points(vec![0.0, 1.0], vec![0.0, 0.0]);
        let mut selector = Selector::new(SelectorKind::BrushInterval(Direction::X), None, None);
        selector.select(Selection::Rect {
            x: AxisSelection::Range(Extent::new(0.5, 1.5)),
            y: AxisSelection::Unbounded,
        });
        assert_eq!(selector.selected_indices(&mark), Some(vec![1]));
    }

    #[test]
    fn lasso_uses_even_odd_rule() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        assert!(point_in_polygon(Point::new(1.0, 1.0), &square));
        assert!(!point_in_polygon(Point::new(3.0, 1.0), &square));

        let mark = points(vec![1.0, 3.0], vec![1.0, 1.0]);
        let mut selector = Selector::new(SelectorKind::Lasso, None, None);
        selector.select(Selection::Polygon(square.to_vec()));
        assert_eq!(selector.selected_indices(&mark), Some(vec![0]));
    }

    #[test]
    fn brush_pixels_inverts_through_own_views() {
        let mut model = ScaleModel::linear();
        model.compute_and_set_domain(&Values::Numbers(vec![0.0, 10.0]), ContributorId::new(1));
        let mut selector = Selector::brush_interval(model.id());
        selector.sync(&model);
        selector.set_range(Direction::X, [0.0, 100.0]);
        selector.brush_pixels(Point::new(20.0, 5.0), Point::new(60.0, 50.0));
        assert_eq!(
            selector.selection(),
            &Selection::Rect {
                x: AxisSelection::Range(Extent::new(2.0, 6.0)),
                y: AxisSelection::Unbounded,
            }
        );
    }

    #[test]
    fn zero_width_brush_is_unbounded() {
        let mut model = ScaleModel::linear();
        model.compute_and_set_domain(&Values::Numbers(vec![0.0, 10.0]), ContributorId::new(1));
        let mut y = ScaleModel::linear();
        y.compute_and_set_domain(&Values::Numbers(vec![0.0, 10.0]), ContributorId::new(1));
        let mut selector = Selector::brush(model.id(), y.id());
        selector.sync(&model);
        selector.sync(&y);
        selector.set_range(Direction::X, [0.0, 100.0]);
        selector.set_range(Direction::Y, [100.0, 0.0]);
        selector.brush_pixels(Point::new(30.0, 10.0), Point::new(30.0, 90.0));
        let mark = points(vec![0.0, 5.0], vec![5.0, 50.0]);
        assert_eq!(selector.selected_indices(&mark), Some(vec![0]));
    }

    #[test]
    fn brush_without_views_keeps_selection() {
        let mut selector = Selector::new(SelectorKind::Brush, None, None);
        assert!(!selector.brush_pixels(Point::new(0.0, 0.0), Point::new(50.0, 50.0)));
        assert_eq!(selector.selection(), &Selection::None);
    }

    #[test]
    fn brush_over_empty_domain_keeps_selection() {
        let model = ScaleModel::linear();
        let mut selector = Selector::brush_interval(model.id());
        selector.sync(&model);
        selector.set_range(Direction::X, [0.0, 100.0]);
        assert!(!selector.brush_pixels(Point::new(20.0, 0.0), Point::new(60.0, 0.0)));
        assert_eq!(selector.selection(), &Selection::None);
    }

    #[test]
    fn index_selects_nearest_point() {
        let mark = points(vec![0.0, 1.0, 2.0], vec![0.0, 0.0, 0.0]);
        let mut selector = Selector::new(SelectorKind::Index, None, None);
        selector.select(Selection::Index(Value::Number(1.4)));
        assert_eq!(selector.selected_indices(&mark), Some(vec![1]));
        selector.clear();
        assert_eq!(selector.selected_indices(&mark), None);
    }

    #[test]
    fn overlay_maps_back_to_pixels() {
        let mut model = ScaleModel::linear();
        model.compute_and_set_domain(&Values::Numbers(vec![0.0, 10.0]), ContributorId::new(1));
        let mut selector = Selector::brush_interval(model.id());
        selector.sync(&model);
        selector.set_range(Direction::X, [0.0, 100.0]);
        assert!(selector.overlay(100.0, 50.0).is_none());
        selector.brush_pixels(Point::new(60.0, 0.0), Point::new(20.0, 0.0));
        let Some(SelectionOverlay::Rect { x, y }) = selector.overlay(100.0, 50.0) else {
            panic!("expected a rectangle");
        };
        assert!((x[0] - 20.0).abs() < 1e-9 && (x[1] - 60.0).abs() < 1e-9);
        assert_eq!(y, [0.0, 50.0]);
    }

    #[test]
    fn ordinal_brush_selects_labels() {
        let mut model = ScaleModel::ordinal();
        model.compute_and_set_domain(&Values::from(vec!["a", "b", "c"]), ContributorId::new(1));
        let mut selector = Selector::brush_interval(model.id());
        selector.sync(&model);
        selector.set_range(Direction::X, [0.0, 300.0]);
        selector.brush_pixels(Point::new(100.0, 0.0), Point::new(300.0, 0.0));
        assert_eq!(
            selector.selection(),
            &Selection::Rect {
                x: AxisSelection::Labels(vec!["b".to_string(), "c".to_string()]),
                y: AxisSelection::Unbounded,
            }
        );
    }
}
