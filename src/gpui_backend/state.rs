use crate::geom::{ScreenPoint, ScreenRect};
use crate::selector::SelectorId;

use super::text::FontMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DragMode {
    Pan,
    Brush(SelectorId),
    Lasso(SelectorId),
}

#[derive(Debug, Clone)]
pub(crate) struct DragState {
    pub(crate) mode: DragMode,
    pub(crate) start: ScreenPoint,
    pub(crate) last: ScreenPoint,
    pub(crate) active: bool,
    pub(crate) path: Vec<ScreenPoint>,
}

impl DragState {
    pub(crate) fn new(mode: DragMode, start: ScreenPoint) -> Self {
        Self {
            mode,
            start,
            last: start,
            active: false,
            path: vec![start],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FigureUiState {
    /// Plot area in window coordinates, from the last frame.
    pub(crate) plot_rect: Option<ScreenRect>,
    pub(crate) drag: Option<DragState>,
    pub(crate) metrics: Option<FontMetrics>,
}

impl FigureUiState {
    pub(crate) fn clear_interaction(&mut self) {
        self.drag = None;
    }
}
