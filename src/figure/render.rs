//! Lowering of a figure to backend-agnostic render commands.

use std::f64::consts::TAU;

use crate::axis::Axis;
use crate::data::Value;
use crate::geom::{PlotArea, ScreenPoint, ScreenRect, Side};
use crate::mark::{BarKind, Channel, Mark, MarkData, MarkKind};
use crate::render::{
    Color, LineSegment, LineStyle, Marker, RectStyle, RenderCommand, RenderList, TextStyle,
    build_line_segments, clip_markers,
};
use crate::scale::{CATEGORY10, PixelMapper, parse_hex};
use crate::selector::SelectionOverlay;

use super::Figure;

const RISING: Color = Color::new(0.17, 0.63, 0.17, 1.0);
const FALLING: Color = Color::new(0.84, 0.15, 0.16, 1.0);
const ARC_STEP: f64 = 0.05;

impl Figure {
    /// Lower the figure into backend-agnostic render commands, in figure
    /// pixel coordinates.
    pub fn render(&self) -> RenderList {
        let mut list = RenderList::new();
        let area = self.plot_area();
        list.push(RenderCommand::Rect {
            rect: ScreenRect::new(
                ScreenPoint::new(0.0, 0.0),
                ScreenPoint::new(self.config.width as f32, self.config.height as f32),
            ),
            style: filled(self.theme.background),
        });

        for axis in self.axes.iter().filter(|a| a.is_visible() && a.grid_lines()) {
            self.paint_grid(axis, area, &mut list);
        }

        list.push(RenderCommand::ClipRect(area.rect()));
        for mark in self.marks.iter().filter(|mark| mark.is_visible()) {
            self.paint_mark(mark, area, &mut list);
        }
        for selector in &self.selectors {
            if let Some(overlay) = selector.overlay(area.width, area.height) {
                self.paint_overlay(&overlay, area, &mut list);
            }
        }
        list.push(RenderCommand::ClipEnd);

        for axis in self.axes.iter().filter(|axis| axis.is_visible()) {
            self.paint_axis(axis, area, &mut list);
        }

        if let Some(title) = self.config.title.as_deref() {
            let size = 16.0;
            let (width, height) = self.measurer.measure(title, size);
            list.push(RenderCommand::Text {
                position: ScreenPoint::new(
                    (self.config.width as f32 - width) * 0.5,
                    ((self.margin.top as f32 - height) * 0.5).max(0.0),
                ),
                text: title.to_string(),
                style: TextStyle {
                    color: self.theme.axis,
                    size,
                },
            });
        }
        list
    }

    fn paint_mark(&self, mark: &Mark, area: PlotArea, list: &mut RenderList) {
        match mark.mark_data() {
            MarkData::Points(points) => {
                let (Some(x_view), Some(y_view), MarkKind::Scatter(options)) =
                    (mark.view(Channel::X), mark.view(Channel::Y), mark.kind())
                else {
                    return;
                };
                let markers = points
                    .iter()
                    .filter_map(|point| {
                        let x = x_view.scale_center(&point.x)?;
                        let y = y_view.scale_center(&point.y)?;
                        let base = point
                            .color
                            .as_ref()
                            .and_then(|value| mark.view(Channel::Color)?.color(value))
                            .unwrap_or(self.theme.mark);
                        let size = point
                            .size
                            .and_then(|size| mark.view(Channel::Size)?.scale_number(size))
                            .unwrap_or(1.0);
                        let opacity = point
                            .opacity
                            .and_then(|value| mark.view(Channel::Opacity)?.scale_number(value))
                            .unwrap_or(options.default_opacity);
                        let color = self.selection_color(mark, point.index, base);
                        Some(Marker {
                            center: to_screen(area, x, y),
                            size: (options.default_size * size) as f32,
                            color: color.with_alpha(color.a * opacity as f32),
                            shape: options.marker,
                        })
                    })
                    .collect();
                list.push(RenderCommand::Markers(clip_markers(markers, area.rect())));
            }
            MarkData::Lines(lines) => {
                let (Some(x_view), Some(y_view)) = (mark.view(Channel::X), mark.view(Channel::Y))
                else {
                    return;
                };
                let width = match mark.kind() {
                    MarkKind::Lines(options) => options.stroke_width as f32,
                    _ => 1.0,
                };
                for line in lines {
                    let points: Vec<Option<ScreenPoint>> = line
                        .points
                        .iter()
                        .map(|(x, y)| {
                            Some(to_screen(area, x_view.scale_center(x)?, y_view.scale_number(*y)?))
                        })
                        .collect();
                    let mut segments = Vec::new();
                    build_line_segments(&points, area.rect(), &mut segments);
                    let color = line
                        .color
                        .as_ref()
                        .and_then(|value| mark.view(Channel::Color)?.color(value))
                        .unwrap_or_else(|| self.series_color(line.index));
                    list.push(RenderCommand::LineSegments {
                        segments,
                        style: LineStyle { color, width },
                    });
                }
            }
            MarkData::Bars(bars) => {
                let (Some(x_view), Some(y_view), MarkKind::Bars(options)) =
                    (mark.view(Channel::X), mark.view(Channel::Y), mark.kind())
                else {
                    return;
                };
                let banded = x_view.band_width() > 0.0;
                let band = if banded {
                    x_view.band_width()
                } else {
                    area.width / bars.len().max(1) as f64 * (1.0 - options.padding)
                };
                let series = bars
                    .iter()
                    .flat_map(|bar| bar.segments.iter().map(|s| s.series + 1))
                    .max()
                    .unwrap_or(1);
                for bar in bars {
                    let Some(start) = x_view
                        .scale(&bar.x)
                        .map(|x| if banded { x } else { x - band * 0.5 })
                    else {
                        continue;
                    };
                    for segment in &bar.segments {
                        let (left, width) = match options.kind {
                            BarKind::Stacked => (start, band),
                            BarKind::Grouped => {
                                let width = band / series as f64;
                                (start + width * segment.series as f64, width)
                            }
                        };
                        let (Some(y0), Some(y1)) =
                            (y_view.scale_number(segment.y0), y_view.scale_number(segment.y1))
                        else {
                            continue;
                        };
                        let base = segment
                            .color
                            .as_ref()
                            .and_then(|value| mark.view(Channel::Color)?.color(value))
                            .unwrap_or_else(|| self.series_color(segment.series));
                        list.push(RenderCommand::Rect {
                            rect: ScreenRect::from_corners(
                                to_screen(area, left, y0),
                                to_screen(area, left + width, y1),
                            ),
                            style: filled(self.selection_color(mark, bar.index, base)),
                        });
                    }
                }
            }
            MarkData::Bins(bins) => {
                let (Some(x_view), Some(y_view)) =
                    (mark.view(Channel::Sample), mark.view(Channel::Count))
                else {
                    return;
                };
                for bin in bins {
                    let (Some(x0), Some(x1), Some(y0), Some(y1)) = (
                        x_view.scale_number(bin.x0),
                        x_view.scale_number(bin.x1),
                        y_view.scale_number(0.0),
                        y_view.scale_number(bin.count),
                    ) else {
                        continue;
                    };
                    list.push(RenderCommand::Rect {
                        rect: ScreenRect::from_corners(
                            to_screen(area, x0, y0),
                            to_screen(area, x1, y1),
                        ),
                        style: RectStyle {
                            fill: self.selection_color(mark, bin.index, self.theme.mark),
                            stroke: self.theme.background,
                            stroke_width: 1.0,
                        },
                    });
                }
            }
            MarkData::Ohlc(glyphs) => {
                let (Some(x_view), Some(y_view)) = (mark.view(Channel::X), mark.view(Channel::Y))
                else {
                    return;
                };
                let tick = (x_view.band_width() * 0.3).max(3.0);
                let (mut rising, mut falling) = (Vec::new(), Vec::new());
                for glyph in glyphs {
                    let Some(x) = x_view.scale_center(&glyph.x) else {
                        continue;
                    };
                    let (Some(high), Some(low)) =
                        (y_view.scale_number(glyph.high), y_view.scale_number(glyph.low))
                    else {
                        continue;
                    };
                    let up = match (glyph.open, glyph.close) {
                        (Some(open), Some(close)) => close >= open,
                        _ => true,
                    };
                    let out = if up { &mut rising } else { &mut falling };
                    out.push(LineSegment::new(to_screen(area, x, high), to_screen(area, x, low)));
                    if let Some(open) = glyph.open.and_then(|v| y_view.scale_number(v)) {
                        out.push(LineSegment::new(
                            to_screen(area, x - tick, open),
                            to_screen(area, x, open),
                        ));
                    }
                    if let Some(close) = glyph.close.and_then(|v| y_view.scale_number(v)) {
                        out.push(LineSegment::new(
                            to_screen(area, x, close),
                            to_screen(area, x + tick, close),
                        ));
                    }
                }
                for (segments, color) in [(rising, RISING), (falling, FALLING)] {
                    if !segments.is_empty() {
                        list.push(RenderCommand::LineSegments {
                            segments,
                            style: LineStyle { color, width: 1.5 },
                        });
                    }
                }
            }
            MarkData::Cells(cells) => {
                let (Some(x_view), Some(y_view)) = (mark.view(Channel::X), mark.view(Channel::Y))
                else {
                    return;
                };
                let columns = cells.iter().map(|c| c.column + 1).max().unwrap_or(1) as f64;
                let rows = cells.iter().map(|c| c.row + 1).max().unwrap_or(1) as f64;
                let width = match x_view.band_width() {
                    band if band > 0.0 => band,
                    _ => area.width / columns,
                };
                let height = match y_view.band_width() {
                    band if band > 0.0 => band,
                    _ => area.height / rows,
                };
                for cell in cells {
                    let (Some(x), Some(y)) = (x_view.scale_center(&cell.x), y_view.scale_center(&cell.y))
                    else {
                        continue;
                    };
                    let fill = mark
                        .view(Channel::Color)
                        .and_then(|view| view.color(&Value::Number(cell.color)))
                        .unwrap_or(self.theme.mark);
                    list.push(RenderCommand::Rect {
                        rect: ScreenRect::from_corners(
                            to_screen(area, x - width * 0.5, y - height * 0.5),
                            to_screen(area, x + width * 0.5, y + height * 0.5),
                        ),
                        style: filled(fill),
                    });
                }
            }
            MarkData::Slices(slices) => {
                let MarkKind::Pie(options) = mark.kind() else {
                    return;
                };
                let center = (area.width * 0.5, area.height * 0.5);
                let outer = options.radius.min(area.width.min(area.height) * 0.5).max(0.0);
                let inner = options.inner_radius.clamp(0.0, outer);
                for slice in slices.iter().filter(|s| s.end_angle > s.start_angle) {
                    let mut points = arc(center, outer, slice.start_angle, slice.end_angle);
                    let mut hole = arc(center, inner, slice.start_angle, slice.end_angle);
                    hole.reverse();
                    points.extend(hole);
                    let base = slice
                        .color
                        .as_ref()
                        .and_then(|value| mark.view(Channel::Color)?.color(value))
                        .unwrap_or_else(|| self.series_color(slice.index));
                    list.push(RenderCommand::Polygon {
                        points: points.into_iter().map(|(x, y)| to_screen(area, x, y)).collect(),
                        fill: self.selection_color(mark, slice.index, base),
                    });
                }
            }
        }
    }

    fn paint_axis(&self, axis: &Axis, area: PlotArea, list: &mut RenderList) {
        if axis.view().is_none() {
            return;
        }
        let style = axis.style();
        let size = style.font_size as f32;
        let text_style = TextStyle {
            color: self.theme.axis,
            size,
        };
        let (left, top) = (area.x, area.y);
        let (right, bottom) = (area.x + area.width, area.y + area.height);
        let baseline = match axis.side() {
            Side::Bottom => (left, bottom, right, bottom),
            Side::Top => (left, top, right, top),
            Side::Left => (left, top, left, bottom),
            Side::Right => (right, top, right, bottom),
        };
        let mut segments = vec![LineSegment::new(
            ScreenPoint::new(baseline.0 as f32, baseline.1 as f32),
            ScreenPoint::new(baseline.2 as f32, baseline.3 as f32),
        )];
        let reach = style.tick_size + style.tick_padding;
        for tick in axis.ticks() {
            let (w, h) = self.measurer.measure(&tick.label, size);
            let (w, h) = (f64::from(w), f64::from(h));
            let (from, to, label) = match axis.side() {
                Side::Bottom => {
                    let x = left + tick.position;
                    ((x, bottom), (x, bottom + style.tick_size), (x - w * 0.5, bottom + reach))
                }
                Side::Top => {
                    let x = left + tick.position;
                    ((x, top), (x, top - style.tick_size), (x - w * 0.5, top - reach - h))
                }
                Side::Left => {
                    let y = top + tick.position;
                    ((left, y), (left - style.tick_size, y), (left - reach - w, y - h * 0.5))
                }
                Side::Right => {
                    let y = top + tick.position;
                    ((right, y), (right + style.tick_size, y), (right + reach, y - h * 0.5))
                }
            };
            segments.push(LineSegment::new(
                ScreenPoint::new(from.0 as f32, from.1 as f32),
                ScreenPoint::new(to.0 as f32, to.1 as f32),
            ));
            list.push(RenderCommand::Text {
                position: ScreenPoint::new(label.0 as f32, label.1 as f32),
                text: tick.label,
                style: text_style.clone(),
            });
        }
        list.push(RenderCommand::LineSegments {
            segments,
            style: LineStyle {
                color: self.theme.axis,
                width: 1.0,
            },
        });

        if let Some(label) = axis.label().filter(|label| !label.is_empty()) {
            let (w, h) = self.measurer.measure(label, size);
            let (w, h) = (f64::from(w), f64::from(h));
            let space = axis.required_space();
            let position = match axis.side() {
                Side::Bottom => (left + area.width * 0.5 - w * 0.5, bottom + space - h),
                Side::Top => (left + area.width * 0.5 - w * 0.5, top - space),
                Side::Left => (left - space, top + area.height * 0.5 - h * 0.5),
                Side::Right => (right + space - w, top + area.height * 0.5 - h * 0.5),
            };
            list.push(RenderCommand::Text {
                position: ScreenPoint::new(position.0 as f32, position.1 as f32),
                text: label.to_string(),
                style: text_style,
            });
        }
    }

    fn paint_grid(&self, axis: &Axis, area: PlotArea, list: &mut RenderList) {
        let segments = axis
            .ticks()
            .into_iter()
            .map(|tick| {
                if axis.side().is_vertical() {
                    let y = tick.position;
                    LineSegment::new(to_screen(area, 0.0, y), to_screen(area, area.width, y))
                } else {
                    let x = tick.position;
                    LineSegment::new(to_screen(area, x, 0.0), to_screen(area, x, area.height))
                }
            })
            .collect();
        list.push(RenderCommand::LineSegments {
            segments,
            style: LineStyle {
                color: self.theme.grid,
                width: 1.0,
            },
        });
    }

    fn paint_overlay(&self, overlay: &SelectionOverlay, area: PlotArea, list: &mut RenderList) {
        match overlay {
            SelectionOverlay::Rect { x, y } => list.push(RenderCommand::Rect {
                rect: ScreenRect::from_corners(
                    to_screen(area, x[0], y[0]),
                    to_screen(area, x[1], y[1]),
                ),
                style: RectStyle {
                    fill: self.theme.selection_fill,
                    stroke: self.theme.axis,
                    stroke_width: 1.0,
                },
            }),
            SelectionOverlay::Polygon(points) => list.push(RenderCommand::Polygon {
                points: points.iter().map(|p| to_screen(area, p.x, p.y)).collect(),
                fill: self.theme.selection_fill,
            }),
            SelectionOverlay::Line(x) => list.push(RenderCommand::LineSegments {
                segments: vec![LineSegment::new(
                    to_screen(area, *x, 0.0),
                    to_screen(area, *x, area.height),
                )],
                style: LineStyle {
                    color: self.theme.selected,
                    width: 1.0,
                },
            }),
        }
    }

    fn series_color(&self, index: usize) -> Color {
        parse_hex(CATEGORY10[index % CATEGORY10.len()]).unwrap_or(self.theme.mark)
    }

    /// Highlight selected items and fade the rest while a selection exists.
    fn selection_color(&self, mark: &Mark, index: usize, base: Color) -> Color {
        match mark.selected() {
            Some(selected) if selected.contains(&index) => self.theme.selected,
            Some(_) => base.with_alpha(base.a * self.theme.unselected_opacity),
            None => base,
        }
    }
}

fn to_screen(area: PlotArea, x: f64, y: f64) -> ScreenPoint {
    ScreenPoint::new((area.x + x) as f32, (area.y + y) as f32)
}

fn filled(fill: Color) -> RectStyle {
    RectStyle {
        fill,
        stroke: Color::TRANSPARENT,
        stroke_width: 0.0,
    }
}

/// Points along an arc, clockwise from twelve o'clock.
fn arc(center: (f64, f64), radius: f64, start: f64, end: f64) -> Vec<(f64, f64)> {
    let steps = (((end - start) / ARC_STEP).ceil() as usize).clamp(1, (TAU / ARC_STEP) as usize);
    (0..=steps)
        .map(|step| {
            let angle = start + (end - start) * step as f64 / steps as f64;
            (center.0 + radius * angle.sin(), center.1 - radius * angle.cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FigureConfig;
    use crate::data::Values;
    use crate::geom::Point;
    use crate::scale::ScaleModel;
    use crate::selector::Selector;

    fn scatter_figure() -> (Figure, crate::scale::ScaleId) {
        let mut figure = Figure::new(FigureConfig {
            title: Some("prices".to_string()),
            ..FigureConfig::default()
        });
        let x = figure.add_scale(ScaleModel::linear());
        let y = figure.add_scale(ScaleModel::linear());
        figure
            .add_mark(
                Mark::scatter()
                    .with_field(Channel::X, vec![0.0, 1.0, 2.0])
                    .with_field(Channel::Y, vec![0.0, 1.0, 4.0])
                    .with_scale(Channel::X, x)
                    .with_scale(Channel::Y, y),
            )
            .unwrap();
        figure.add_axis(Axis::bottom(x).with_label("x")).unwrap();
        figure.add_axis(Axis::left(y)).unwrap();
        (figure, x)
    }

    #[test]
    fn markers_land_inside_plot_area() {
        let (figure, _) = scatter_figure();
        let list = figure.render();
        let rect = figure.plot_area().rect();
        let markers: Vec<&Marker> = list
            .commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::Markers(markers) => Some(markers),
                _ => None,
            })
            .flatten()
            .collect();
        assert_eq!(markers.len(), 3);
        assert!(markers.iter().all(|marker| rect.contains(marker.center)));
    }

    #[test]
    fn clip_wraps_marks_and_title_is_drawn() {
        let (figure, _) = scatter_figure();
        let list = figure.render();
        let commands = list.commands();
        let clip = commands
            .iter()
            .position(|c| matches!(c, RenderCommand::ClipRect(_)))
            .unwrap();
        let end = commands
            .iter()
            .position(|c| matches!(c, RenderCommand::ClipEnd))
            .unwrap();
        assert!(clip < end);
        assert!(commands.iter().any(
            |c| matches!(c, RenderCommand::Text { text, .. } if text == "prices")
        ));
    }

    #[test]
    fn selection_fades_unselected_markers() {
        let (mut figure, x) = scatter_figure();
        let selector = figure.add_selector(Selector::brush_interval(x)).unwrap();
        let width = figure.plot_area().width;
        figure
            .brush(selector, Point::new(width * 0.75, 0.0), Point::new(width, 0.0))
            .unwrap();
        let list = figure.render();
        let theme = figure.theme().clone();
        let markers = list
            .commands()
            .iter()
            .find_map(|command| match command {
                RenderCommand::Markers(markers) => Some(markers.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(markers[2].color, theme.selected);
        assert!(markers[0].color.a < 1.0);
        assert!(
            list.commands()
                .iter()
                .any(|c| matches!(c, RenderCommand::Rect { style, .. } if style.fill == theme.selection_fill))
        );
    }

    #[test]
    fn pie_slices_become_polygons() {
        let mut figure = Figure::default();
        figure
            .add_mark(Mark::pie().with_field(Channel::Size, Values::Numbers(vec![1.0, 1.0])))
            .unwrap();
        let polygons = figure
            .render()
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::Polygon { .. }))
            .count();
        assert_eq!(polygons, 2);
    }

    #[test]
    fn arc_endpoints() {
        let points = arc((0.0, 0.0), 1.0, 0.0, TAU / 4.0);
        let first = points[0];
        let last = points[points.len() - 1];
        assert!((first.0).abs() < 1e-9 && (first.1 + 1.0).abs() < 1e-9);
        assert!((last.0 - 1.0).abs() < 1e-9 && last.1.abs() < 1e-9);
    }
}
