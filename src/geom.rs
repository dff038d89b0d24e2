//! Geometric primitives shared by layout, selection, and rendering.
//!
//! Data-space values use `f64`; pixel-space values use `f32` the way render
//! backends consume them.

use serde::{Deserialize, Serialize};

/// A point in data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X value in data coordinates.
    pub x: f64,
    /// Y value in data coordinates.
    pub y: f64,
}

impl Point {
    /// Create a new data point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// X value in screen pixels.
    pub x: f32,
    /// Y value in screen pixels.
    pub y: f32,
}

impl ScreenPoint {
    /// Create a new screen point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: ScreenPoint,
    /// Bottom-right corner.
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Create a new screen rectangle from corners.
    pub fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// Rectangle from two arbitrary corners, normalized so `min <= max`.
    pub fn from_corners(a: ScreenPoint, b: ScreenPoint) -> Self {
        Self {
            min: ScreenPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: ScreenPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Rectangle width in pixels.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Rectangle height in pixels.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check whether the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Check whether the point lies inside the rectangle (inclusive).
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Figure margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    /// Space above the plot area.
    pub top: f64,
    /// Space below the plot area.
    pub bottom: f64,
    /// Space left of the plot area.
    pub left: f64,
    /// Space right of the plot area.
    pub right: f64,
}

impl Margin {
    /// Create margins from explicit sides.
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// The same margin on every side.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Access the margin on one side.
    pub fn side(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Mutable access to the margin on one side.
    pub fn side_mut(&mut self, side: Side) -> &mut f64 {
        match side {
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(60.0)
    }
}

/// A figure side an axis can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Above the plot area.
    Top,
    /// Below the plot area.
    Bottom,
    /// Left of the plot area.
    Left,
    /// Right of the plot area.
    Right,
}

impl Side {
    /// Whether axes on this side run vertically.
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// The layout direction of an axis on this side.
    pub fn direction(self) -> Direction {
        if self.is_vertical() {
            Direction::Y
        } else {
            Direction::X
        }
    }
}

/// Pixel direction of a scale inside the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Horizontal, growing to the right.
    X,
    /// Vertical, growing downwards in pixels (data grows upwards).
    Y,
}

/// The plot area inside a figure, in figure pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    /// Left edge offset from the figure origin.
    pub x: f64,
    /// Top edge offset from the figure origin.
    pub y: f64,
    /// Plot area width.
    pub width: f64,
    /// Plot area height.
    pub height: f64,
}

impl PlotArea {
    /// Screen rectangle covering the plot area.
    pub fn rect(&self) -> ScreenRect {
        ScreenRect::new(
            ScreenPoint::new(self.x as f32, self.y as f32),
            ScreenPoint::new((self.x + self.width) as f32, (self.y + self.height) as f32),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_normalizes() {
        let rect = ScreenRect::from_corners(ScreenPoint::new(10.0, 2.0), ScreenPoint::new(4.0, 8.0));
        assert_eq!(rect.min, ScreenPoint::new(4.0, 2.0));
        assert_eq!(rect.max, ScreenPoint::new(10.0, 8.0));
        assert!(rect.contains(ScreenPoint::new(5.0, 5.0)));
        assert!(!rect.contains(ScreenPoint::new(11.0, 5.0)));
    }

    #[test]
    fn margin_side_access() {
        let mut margin = Margin::new(1.0, 2.0, 3.0, 4.0);
        *margin.side_mut(Side::Left) += 10.0;
        assert_eq!(margin.side(Side::Left), 13.0);
        assert_eq!(margin.side(Side::Bottom), 2.0);
    }
}
