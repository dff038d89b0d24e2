//! Rendering primitives and clipping helpers.
//!
//! These types are backend-agnostic: a figure lowers its marks and axes into a
//! [`RenderList`] and a backend (such as the optional GPUI one) paints it.

use crate::geom::{ScreenPoint, ScreenRect};

/// RGBA color in linear space.
///
/// All components are expected to be in the 0.0..=1.0 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Line stroke styling.
///
/// The width is expressed in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// Marker shape for scatter marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    /// Circle marker.
    Circle,
    /// Square marker.
    Square,
    /// Cross marker.
    Cross,
}

/// One positioned scatter marker.
///
/// Sizes are marker areas in square pixels, the way scatter sizes are given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Marker centre.
    pub center: ScreenPoint,
    /// Marker area in square pixels.
    pub size: f32,
    /// Fill color, alpha already multiplied by opacity.
    pub color: Color,
    /// Marker shape.
    pub shape: MarkerShape,
}

impl Marker {
    /// Radius of a circle with the marker's area.
    pub fn radius(&self) -> f32 {
        self.size.max(0.0).sqrt() * 0.5
    }
}

/// Rectangle styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectStyle {
    /// Fill color.
    pub fill: Color,
    /// Stroke color.
    pub stroke: Color,
    /// Stroke width.
    pub stroke_width: f32,
}

impl Default for RectStyle {
    fn default() -> Self {
        Self {
            fill: Color::TRANSPARENT,
            stroke: Color::BLACK,
            stroke_width: 1.0,
        }
    }
}

/// Text styling.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Text color.
    pub color: Color,
    /// Font size in pixels.
    pub size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 12.0,
        }
    }
}

/// A line segment in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Segment start.
    pub start: ScreenPoint,
    /// Segment end.
    pub end: ScreenPoint,
}

impl LineSegment {
    /// Create a new line segment.
    pub fn new(start: ScreenPoint, end: ScreenPoint) -> Self {
        Self { start, end }
    }
}

/// Render command list.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Start clipping to a rectangle.
    ClipRect(ScreenRect),
    /// End clipping.
    ClipEnd,
    /// Draw line segments.
    LineSegments {
        /// Segments to draw.
        segments: Vec<LineSegment>,
        /// Styling for the segments.
        style: LineStyle,
    },
    /// Draw scatter markers.
    Markers(Vec<Marker>),
    /// Draw a rectangle.
    Rect {
        /// Rectangle bounds.
        rect: ScreenRect,
        /// Rectangle styling.
        style: RectStyle,
    },
    /// Fill a closed polygon.
    Polygon {
        /// Polygon vertices.
        points: Vec<ScreenPoint>,
        /// Fill color.
        fill: Color,
    },
    /// Draw text.
    Text {
        /// Text position (top-left).
        position: ScreenPoint,
        /// Text content.
        text: String,
        /// Text styling.
        style: TextStyle,
    },
}

/// Aggregated render commands.
#[derive(Debug, Default, Clone)]
pub struct RenderList {
    commands: Vec<RenderCommand>,
}

impl RenderList {
    /// Create an empty render list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a render command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Access all render commands.
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Build clipped line segments through consecutive pixel points.
///
/// `None` entries break the polyline, so undefined values leave gaps.
pub fn build_line_segments(
    points: &[Option<ScreenPoint>],
    clip: ScreenRect,
    out: &mut Vec<LineSegment>,
) {
    out.clear();
    for window in points.windows(2) {
        let (Some(start), Some(end)) = (window[0], window[1]) else {
            continue;
        };
        if let Some((clipped_start, clipped_end)) = clip_segment(start, end, clip) {
            out.push(LineSegment::new(clipped_start, clipped_end));
        }
    }
}

/// Keep only the markers whose centre lies inside the clip rectangle.
pub fn clip_markers(markers: Vec<Marker>, clip: ScreenRect) -> Vec<Marker> {
    markers
        .into_iter()
        .filter(|marker| clip.contains(marker.center))
        .collect()
}

fn clip_segment(
    mut start: ScreenPoint,
    mut end: ScreenPoint,
    rect: ScreenRect,
) -> Option<(ScreenPoint, ScreenPoint)> {
    let mut out_start = region_code(start, rect);
    let mut out_end = region_code(end, rect);

    loop {
        if (out_start | out_end) == 0 {
            return Some((start, end));
        }
        if (out_start & out_end) != 0 {
            return None;
        }

        let out_code = if out_start != 0 { out_start } else { out_end };
        let (mut x, mut y) = (0.0_f32, 0.0_f32);

        if (out_code & TOP) != 0 {
            x = start.x + (end.x - start.x) * (rect.min.y - start.y) / (end.y - start.y);
            y = rect.min.y;
        } else if (out_code & BOTTOM) != 0 {
            x = start.x + (end.x - start.x) * (rect.max.y - start.y) / (end.y - start.y);
            y = rect.max.y;
        } else if (out_code & RIGHT) != 0 {
            y = start.y + (end.y - start.y) * (rect.max.x - start.x) / (end.x - start.x);
            x = rect.max.x;
        } else if (out_code & LEFT) != 0 {
            y = start.y + (end.y - start.y) * (rect.min.x - start.x) / (end.x - start.x);
            x = rect.min.x;
        }

        let clipped = ScreenPoint::new(x, y);
        if out_code == out_start {
            start = clipped;
            out_start = region_code(start, rect);
        } else {
            end = clipped;
            out_end = region_code(end, rect);
        }
    }
}

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

fn region_code(point: ScreenPoint, rect: ScreenRect) -> u8 {
    let mut code = 0;
    if point.x < rect.min.x {
        code |= LEFT;
    } else if point.x > rect.max.x {
        code |= RIGHT;
    }
    if point.y < rect.min.y {
        code |= TOP;
    } else if point.y > rect.max.y {
        code |= BOTTOM;
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> ScreenRect {
        ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0))
    }

    #[test]
    fn clip_segment_inside() {
        let start = ScreenPoint::new(2.0, 2.0);
        let end = ScreenPoint::new(8.0, 8.0);
        let clipped = clip_segment(start, end, rect()).expect("segment should clip");
        assert_eq!(clipped, (start, end));
    }

    #[test]
    fn clip_segment_crossing_edge() {
        let clipped = clip_segment(ScreenPoint::new(5.0, 5.0), ScreenPoint::new(15.0, 5.0), rect())
            .expect("segment should clip");
        assert_eq!(clipped.1, ScreenPoint::new(10.0, 5.0));
        assert!(clip_segment(ScreenPoint::new(11.0, 1.0), ScreenPoint::new(12.0, 2.0), rect()).is_none());
    }

    #[test]
    fn gaps_break_polylines() {
        let points = [
            Some(ScreenPoint::new(0.0, 0.0)),
            Some(ScreenPoint::new(1.0, 1.0)),
            None,
            Some(ScreenPoint::new(3.0, 3.0)),
            Some(ScreenPoint::new(4.0, 4.0)),
        ];
        let mut out = Vec::new();
        build_line_segments(&points, rect(), &mut out);
        assert_eq!(out.len(), 2);
    }
}
