//! Axes: tick generation, label formatting, and the space they claim.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::AxisStyle;
use crate::data::Value;
use crate::geom::Side;
use crate::scale::ticks::{format_date, format_number};
use crate::scale::{PixelMapper, PixelScale, ScaleId, ScaleKind, ScaleModel};

const DEFAULT_TICK_COUNT: usize = 10;

static AXIS_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxisId(u64);

impl AxisId {
    fn next() -> Self {
        Self(AXIS_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Measures text extents in pixels.
pub trait TextMeasurer {
    /// Width and height of `text` at font `size`.
    fn measure(&self, text: &str, size: f32) -> (f32, f32);
}

/// Glyph-count estimate used when no backend measurer is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasurer;

impl TextMeasurer for ApproxTextMeasurer {
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        let widest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        let lines = text.lines().count().max(1);
        (widest as f32 * size * 0.6, lines as f32 * size * 1.2)
    }
}

/// Formatter for axis tick labels.
#[derive(Clone, Default)]
pub enum AxisFormatter {
    /// Precision follows the tick step; dates use a granularity pattern.
    #[default]
    Default,
    /// Custom formatter callback.
    Custom(Arc<dyn Fn(&Value) -> String + Send + Sync>),
}

impl AxisFormatter {
    /// Format a tick value for display.
    pub fn format(&self, value: &Value, kind: ScaleKind, step: f64) -> String {
        match (self, value) {
            (Self::Custom(formatter), _) => formatter(value),
            (Self::Default, Value::Label(label)) => label.clone(),
            (Self::Default, Value::Number(number)) if kind.is_date() => {
                format_date(*number, step)
            }
            (Self::Default, Value::Number(number)) => format_number(*number, step),
        }
    }
}

impl std::fmt::Debug for AxisFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "AxisFormatter::Default"),
            Self::Custom(_) => write!(f, "AxisFormatter::Custom(..)"),
        }
    }
}

/// A positioned, labelled tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Tick value.
    pub value: Value,
    /// Pixel offset along the axis (band centre for ordinal scales).
    pub position: f64,
    /// Formatted label.
    pub label: String,
}

/// An axis drawn along one side of the plot area.
#[derive(Debug, Clone)]
pub struct Axis {
    id: AxisId,
    scale: ScaleId,
    side: Side,
    label: Option<String>,
    formatter: AxisFormatter,
    tick_values: Option<Vec<Value>>,
    grid_lines: bool,
    visible: bool,
    style: AxisStyle,
    view: Option<PixelScale>,
    required_space: f64,
    model_id: Option<String>,
}

impl Axis {
    /// Create an axis on a side of the plot area.
    pub fn new(scale: ScaleId, side: Side) -> Self {
        Self {
            id: AxisId::next(),
            scale,
            side,
            label: None,
            formatter: AxisFormatter::default(),
            tick_values: None,
            grid_lines: false,
            visible: true,
            style: AxisStyle::default(),
            view: None,
            required_space: 0.0,
            model_id: None,
        }
    }

    /// Create a horizontal axis below the plot area.
    pub fn bottom(scale: ScaleId) -> Self {
        Self::new(scale, Side::Bottom)
    }

    /// Create a vertical axis left of the plot area.
    pub fn left(scale: ScaleId) -> Self {
        Self::new(scale, Side::Left)
    }

    /// Set the axis label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the tick formatter.
    pub fn with_formatter(mut self, formatter: AxisFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Use explicit tick values.
    pub fn with_tick_values(mut self, values: Vec<Value>) -> Self {
        self.tick_values = Some(values);
        self
    }

    /// Set the tick style.
    pub fn with_style(mut self, style: AxisStyle) -> Self {
        self.style = style;
        self
    }

    /// Draw grid lines across the plot area.
    pub fn with_grid_lines(mut self, grid_lines: bool) -> Self {
        self.grid_lines = grid_lines;
        self
    }

    /// Remember the widget model this axis was built from.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Access the axis identifier.
    pub fn id(&self) -> AxisId {
        self.id
    }

    /// Access the scale this axis displays.
    pub fn scale_id(&self) -> ScaleId {
        self.scale
    }

    /// Access the side.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Access the axis label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Set or clear the axis label.
    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    /// Access the formatter.
    pub fn formatter(&self) -> &AxisFormatter {
        &self.formatter
    }

    /// Replace the formatter.
    pub fn set_formatter(&mut self, formatter: AxisFormatter) {
        self.formatter = formatter;
    }

    /// Set or clear explicit tick values.
    pub fn set_tick_values(&mut self, values: Option<Vec<Value>>) {
        self.tick_values = values;
    }

    /// Check whether grid lines are drawn.
    pub fn grid_lines(&self) -> bool {
        self.grid_lines
    }

    /// Check whether the axis is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the axis.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Access the tick style.
    pub fn style(&self) -> &AxisStyle {
        &self.style
    }

    /// Replace the tick style.
    pub fn set_style(&mut self, style: AxisStyle) {
        self.style = style;
    }

    /// Access the widget model id, if any.
    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    /// Access this axis' own scale view.
    pub fn view(&self) -> Option<&PixelScale> {
        self.view.as_ref()
    }

    /// Space last computed by [`Axis::update_required_space`].
    pub fn required_space(&self) -> f64 {
        self.required_space
    }

    /// Pull the shared domain into this axis' view.
    pub(crate) fn sync(&mut self, model: &ScaleModel) {
        match self.view.as_mut() {
            Some(view) => view.sync(model),
            None => self.view = Some(PixelScale::new(model)),
        }
    }

    /// Fit the view to the plot area so ticks line up with marks drawn over
    /// `padded_range`.
    pub(crate) fn rescale(&mut self, padded_range: [f64; 2], range: [f64; 2]) {
        if let Some(view) = self.view.as_mut() {
            view.set_range(range, 0.0);
            view.expand_domain(padded_range, range);
        }
    }

    /// Ticks of the current view.
    pub fn ticks(&self) -> Vec<Tick> {
        let Some(view) = self.view.as_ref() else {
            return Vec::new();
        };
        let values = match &self.tick_values {
            Some(values) => values.clone(),
            None => view.ticks(self.style.num_ticks.unwrap_or(DEFAULT_TICK_COUNT)),
        };
        let step = tick_step(&values, view);
        let [r0, r1] = view.range();
        let (low, high) = (r0.min(r1), r0.max(r1));
        values
            .into_iter()
            .filter_map(|value| {
                let position = view.scale_center(&value)?;
                if position < low - 0.5 || position > high + 0.5 {
                    return None;
                }
                let label = self.formatter.format(&value, view.kind(), step);
                Some(Tick {
                    value,
                    position,
                    label,
                })
            })
            .collect()
    }

    /// Recompute the margin this axis needs; returns whether it changed.
    pub(crate) fn update_required_space(&mut self, measurer: &dyn TextMeasurer) -> bool {
        let space = self.measure_space(measurer);
        let changed = (space - self.required_space).abs() > f64::EPSILON;
        self.required_space = space;
        changed
    }

    fn measure_space(&self, measurer: &dyn TextMeasurer) -> f64 {
        if !self.visible {
            return 0.0;
        }
        let size = self.style.font_size as f32;
        let widest = self
            .ticks()
            .iter()
            .map(|tick| {
                let (width, height) = measurer.measure(&tick.label, size);
                if self.side.is_vertical() { width } else { height }
            })
            .fold(0.0_f32, f32::max);
        let mut space = self.style.tick_size + self.style.tick_padding + f64::from(widest);
        if let Some(label) = self.label.as_deref().filter(|label| !label.is_empty()) {
            let (_, height) = measurer.measure(label, size);
            space += self.style.label_offset + f64::from(height);
        }
        space
    }
}

fn tick_step(values: &[Value], view: &PixelScale) -> f64 {
    let numbers: Vec<f64> = values.iter().filter_map(Value::as_number).collect();
    if let [first, second, ..] = numbers.as_slice() {
        return (second - first).abs();
    }
    view.domain().extent().map_or(1.0, |extent| extent.span())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Values;
    use crate::scale::ContributorId;

    fn axis_over(min: f64, max: f64, side: Side) -> Axis {
        let mut model = ScaleModel::linear();
        model.compute_and_set_domain(&Values::Numbers(vec![min, max]), ContributorId::new(1));
        let mut axis = Axis::new(model.id(), side);
        axis.sync(&model);
        axis.rescale([0.0, 400.0], [0.0, 400.0]);
        axis
    }

    #[test]
    fn ticks_cover_domain() {
        let axis = axis_over(0.0, 1.0, Side::Bottom);
        let ticks = axis.ticks();
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks.first().unwrap().label, "0.0");
        assert_eq!(ticks.last().unwrap().label, "1.0");
        assert_eq!(ticks.last().unwrap().position, 400.0);
    }

    #[test]
    fn label_adds_space() {
        let measurer = ApproxTextMeasurer;
        let mut axis = axis_over(0.0, 1000.0, Side::Left);
        assert!(axis.update_required_space(&measurer));
        let bare = axis.required_space();
        axis.set_label(Some("volume".to_string()));
        axis.update_required_space(&measurer);
        assert!(axis.required_space() > bare);
        assert!(!axis.update_required_space(&measurer));
    }

    #[test]
    fn hidden_axis_needs_no_space() {
        let mut axis = axis_over(0.0, 1.0, Side::Bottom);
        axis.set_visible(false);
        axis.update_required_space(&ApproxTextMeasurer);
        assert_eq!(axis.required_space(), 0.0);
    }

    #[test]
    fn custom_formatter() {
        let formatter = AxisFormatter::Custom(Arc::new(|value: &Value| format!("<{}>", value.to_label())));
        assert_eq!(formatter.format(&Value::Number(2.0), ScaleKind::Linear, 1.0), "<2>");
    }

    #[test]
    fn ordinal_ticks_are_band_centres() {
        let mut model = ScaleModel::ordinal();
        model.compute_and_set_domain(&Values::from(vec!["a", "b"]), ContributorId::new(1));
        let mut axis = Axis::bottom(model.id());
        axis.sync(&model);
        axis.rescale([0.0, 100.0], [0.0, 100.0]);
        let ticks = axis.ticks();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].position, 25.0);
        assert_eq!(ticks[1].label, "b");
    }
}
