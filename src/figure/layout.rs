//! Plot-area layout: margins from axis space, pixel ranges, and the rescale
//! pass run after every margin change.

use crate::event::FigureEvent;
use crate::geom::{Direction, Margin, PlotArea};
use crate::mark::Channel;
use crate::scale::ScaleId;

use super::Figure;

impl Figure {
    /// The plot area inside the current margin.
    pub fn plot_area(&self) -> PlotArea {
        let margin = self.margin;
        PlotArea {
            x: margin.left,
            y: margin.top,
            width: (self.config.width - margin.left - margin.right).max(0.0),
            height: (self.config.height - margin.top - margin.bottom).max(0.0),
        }
    }

    /// Pixel range of a direction: `[0, width]` for x, `[height, 0]` for y.
    pub fn range(&self, direction: Direction) -> [f64; 2] {
        let area = self.plot_area();
        match direction {
            Direction::X => [0.0, area.width],
            Direction::Y => [area.height, 0.0],
        }
    }

    /// Range marks on `scale` draw over: [`Figure::range`] inset by the
    /// figure padding plus the largest pixel padding any mark on that scale
    /// asks for. Scales with `allow_padding` off, and ordinal scales, get
    /// the plain range.
    pub fn padded_range(&self, direction: Direction, scale: ScaleId) -> [f64; 2] {
        let [start, end] = self.range(direction);
        let Some(model) = self.scales.get(scale) else {
            return [start, end];
        };
        if !model.config().allow_padding || model.kind().is_ordinal() {
            return [start, end];
        }
        let fraction = match direction {
            Direction::X => self.config.padding_x,
            Direction::Y => self.config.padding_y,
        };
        let mark_padding = self
            .marks
            .iter()
            .filter(|mark| {
                mark.scales().any(|(channel, bound)| {
                    bound == scale && channel.direction() == Some(direction)
                })
            })
            .map(|mark| mark.padding_request())
            .fold(0.0, f64::max);
        let pad = fraction * (end - start).abs() + mark_padding;
        let sign = if end >= start { 1.0 } else { -1.0 };
        [start + sign * pad, end - sign * pad]
    }

    /// Figure margin plus, with auto layout, the space every visible axis
    /// needs on its side. Axes on one side add up.
    pub(super) fn compute_margin(&self) -> Margin {
        let mut margin = self.config.fig_margin;
        if !self.config.auto_layout {
            return margin;
        }
        for axis in self.axes.iter().filter(|axis| axis.is_visible()) {
            *margin.side_mut(axis.side()) += axis.required_space();
        }
        margin
    }

    /// Recompute axis space and queue `MarginUpdated` if the margin moved.
    pub(crate) fn relayout(&mut self) {
        let measurer = self.measurer.as_ref();
        for axis in &mut self.axes {
            axis.update_required_space(measurer);
        }
        let margin = self.compute_margin();
        if margin != self.margin {
            tracing::debug!(?margin, "figure margin updated");
            self.margin = margin;
            self.bus.emit(FigureEvent::MarginUpdated(margin));
        }
    }

    /// Re-set every pixel range from the current layout.
    pub(crate) fn rescale_all(&mut self) {
        for index in 0..self.marks.len() {
            self.rescale_mark(index);
        }
        self.rescale_axes();
        self.rescale_selectors();
    }

    pub(super) fn rescale_mark(&mut self, index: usize) {
        let Some(mark) = self.marks.get(index) else {
            return;
        };
        let band_padding = mark.band_padding();
        let ranges: Vec<(Channel, [f64; 2], f64)> = mark
            .scales()
            .filter_map(|(channel, scale)| match channel.direction() {
                Some(direction) => {
                    let padding = if direction == Direction::X { band_padding } else { 0.0 };
                    Some((channel, self.padded_range(direction, scale), padding))
                }
                None => channel.value_range().map(|range| (channel, range, 0.0)),
            })
            .collect();
        let mark = &mut self.marks[index];
        for (channel, range, padding) in ranges {
            mark.set_view_range(channel, range, padding);
        }
    }

    pub(super) fn rescale_axes(&mut self) {
        let ranges: Vec<([f64; 2], [f64; 2])> = self
            .axes
            .iter()
            .map(|axis| {
                let direction = axis.side().direction();
                (self.padded_range(direction, axis.scale_id()), self.range(direction))
            })
            .collect();
        for (axis, (padded, range)) in self.axes.iter_mut().zip(ranges) {
            axis.rescale(padded, range);
        }
    }

    fn rescale_selectors(&mut self) {
        let ranges: Vec<(Option<[f64; 2]>, Option<[f64; 2]>)> = self
            .selectors
            .iter()
            .map(|selector| {
                (
                    selector.x_scale().map(|scale| self.padded_range(Direction::X, scale)),
                    selector.y_scale().map(|scale| self.padded_range(Direction::Y, scale)),
                )
            })
            .collect();
        for (selector, (x, y)) in self.selectors.iter_mut().zip(ranges) {
            if let Some(range) = x {
                selector.set_range(Direction::X, range);
            }
            if let Some(range) = y {
                selector.set_range(Direction::Y, range);
            }
        }
    }
}
