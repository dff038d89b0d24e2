use gpui::{Bounds, Pixels, Window};

use crate::figure::Figure;
use crate::geom::ScreenPoint;
use crate::render::RenderList;

use super::geometry::offset_rect;
use super::state::FigureUiState;
use super::text::{FontMetrics, GpuiTextMeasurer};

pub(crate) struct FigureFrame {
    pub(crate) render: RenderList,
    /// Window position of the figure's top-left corner.
    pub(crate) origin: ScreenPoint,
}

/// Fit the figure to `bounds` and lower it for painting.
pub(crate) fn build_frame(
    figure: &mut Figure,
    state: &mut FigureUiState,
    bounds: Bounds<Pixels>,
    window: &Window,
) -> FigureFrame {
    let origin = ScreenPoint::new(f32::from(bounds.origin.x), f32::from(bounds.origin.y));
    let width = f32::from(bounds.size.width);
    let height = f32::from(bounds.size.height);
    if width <= 1.0 || height <= 1.0 {
        state.plot_rect = None;
        return FigureFrame {
            render: RenderList::new(),
            origin,
        };
    }

    let metrics = FontMetrics::sample(&GpuiTextMeasurer::new(window));
    if state.metrics != Some(metrics) {
        state.metrics = Some(metrics);
        figure.set_text_measurer(Box::new(metrics));
    }

    let (width, height) = (width as f64, height as f64);
    if figure.config().width != width || figure.config().height != height {
        figure.resize(width, height);
    }

    state.plot_rect = Some(offset_rect(figure.plot_area().rect(), origin));
    FigureFrame {
        render: figure.render(),
        origin,
    }
}
