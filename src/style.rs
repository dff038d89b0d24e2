//! Figure theming.

use crate::render::Color;

/// Colors used when lowering a figure into render commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Figure background.
    pub background: Color,
    /// Axis lines, ticks, and labels.
    pub axis: Color,
    /// Grid lines.
    pub grid: Color,
    /// Default mark color when no color scale applies.
    pub mark: Color,
    /// Color of selected points.
    pub selected: Color,
    /// Opacity applied to unselected points while a selection exists.
    pub unselected_opacity: f32,
    /// Brush and lasso overlay fill.
    pub selection_fill: Color,
}

impl Theme {
    /// Light theme.
    pub fn light() -> Self {
        Self::default()
    }

    /// Dark theme.
    pub fn dark() -> Self {
        Self {
            background: Color::new(0.08, 0.08, 0.1, 1.0),
            axis: Color::new(0.85, 0.85, 0.88, 1.0),
            grid: Color::new(0.3, 0.3, 0.34, 1.0),
            mark: Color::new(0.2, 0.75, 0.95, 1.0),
            selected: Color::new(1.0, 0.55, 0.1, 1.0),
            unselected_opacity: 0.3,
            selection_fill: Color::new(1.0, 1.0, 1.0, 0.15),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            axis: Color::new(0.2, 0.2, 0.2, 1.0),
            grid: Color::new(0.88, 0.88, 0.88, 1.0),
            mark: Color::new(0.12, 0.47, 0.71, 1.0),
            selected: Color::new(1.0, 0.5, 0.05, 1.0),
            unselected_opacity: 0.3,
            selection_fill: Color::new(0.0, 0.0, 0.0, 0.1),
        }
    }
}
