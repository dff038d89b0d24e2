use std::sync::{Arc, PoisonError, RwLock};

use gpui::prelude::*;
use gpui::{
    MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels, Point, ScrollWheelEvent,
    Window, canvas, div, px,
};

use crate::figure::Figure;
use crate::geom::ScreenPoint;
use crate::interaction::Interaction;
use crate::selector::SelectorKind;

use super::config::FigureViewConfig;
use super::frame::build_frame;
use super::geometry::{distance_sq, plot_point};
use super::paint::{paint_frame, to_hsla};
use super::state::{DragMode, DragState, FigureUiState};

/// A GPUI view that renders a [`Figure`] and drives its interaction.
///
/// Plot-area drags brush or lasso with the active selector, or pan when the
/// interaction is pan/zoom. The wheel zooms; double-click resets the zoom or
/// clears the selection.
#[derive(Clone)]
pub struct FigureView {
    figure: Arc<RwLock<Figure>>,
    state: Arc<RwLock<FigureUiState>>,
    config: FigureViewConfig,
}

impl FigureView {
    /// Create a view with the default [`FigureViewConfig`].
    pub fn new(figure: Figure) -> Self {
        Self::with_config(figure, FigureViewConfig::default())
    }

    pub fn with_config(figure: Figure, config: FigureViewConfig) -> Self {
        Self {
            figure: Arc::new(RwLock::new(figure)),
            state: Arc::new(RwLock::new(FigureUiState::default())),
            config,
        }
    }

    /// Get a handle for mutating the figure, e.g. from async tasks.
    pub fn figure_handle(&self) -> FigureHandle {
        FigureHandle {
            figure: Arc::clone(&self.figure),
        }
    }

    fn on_mouse_down(&mut self, ev: &MouseDownEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let Some(plot) = state.plot_rect.filter(|rect| rect.contains(pos)) else {
            return;
        };
        let mut figure = self.figure.write().unwrap_or_else(PoisonError::into_inner);
        let interaction = figure.interaction().cloned();

        if ev.click_count >= 2 {
            match interaction {
                Some(Interaction::PanZoom(_)) => figure.reset_zoom(),
                Some(Interaction::Selector(id)) => {
                    if let Err(err) = figure.clear_selection(id) {
                        tracing::warn!(%err, "failed to clear selection");
                    }
                }
                None => {}
            }
            state.clear_interaction();
            cx.notify();
            return;
        }

        let mode = match interaction {
            Some(Interaction::PanZoom(_)) => Some(DragMode::Pan),
            Some(Interaction::Selector(id)) => match figure.selector(id).map(|s| s.kind()) {
                Some(SelectorKind::Lasso) => Some(DragMode::Lasso(id)),
                Some(SelectorKind::Index) => {
                    if let Err(err) = figure.index_select(id, plot_point(pos, plot).x) {
                        tracing::warn!(%err, "index selection failed");
                    }
                    None
                }
                Some(_) => Some(DragMode::Brush(id)),
                None => None,
            },
            None => None,
        };
        state.drag = mode.map(|mode| DragState::new(mode, pos));
        cx.notify();
    }

    fn on_mouse_move(&mut self, ev: &MouseMoveEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let (Some(mut drag), Some(plot)) = (state.drag.clone(), state.plot_rect) else {
            return;
        };

        if !drag.active && distance_sq(drag.start, pos) > self.config.drag_threshold_px.powi(2) {
            drag.active = true;
        }
        if !drag.active {
            return;
        }

        let mut figure = self.figure.write().unwrap_or_else(PoisonError::into_inner);
        let result = match drag.mode {
            DragMode::Pan => {
                let last = plot_point(drag.last, plot);
                let now = plot_point(pos, plot);
                figure.pan(crate::geom::Point::new(now.x - last.x, now.y - last.y));
                Ok(())
            }
            DragMode::Brush(id) => figure.brush(id, plot_point(drag.start, plot), plot_point(pos, plot)),
            DragMode::Lasso(id) => {
                let spacing = self.config.lasso_spacing_px.powi(2);
                if drag.path.last().is_none_or(|last| distance_sq(*last, pos) >= spacing) {
                    drag.path.push(pos);
                }
                let vertices: Vec<_> = drag.path.iter().map(|p| plot_point(*p, plot)).collect();
                figure.lasso(id, &vertices)
            }
        };
        if let Err(err) = result {
            tracing::warn!(%err, "drag interaction failed");
            state.clear_interaction();
        } else {
            drag.last = pos;
            state.drag = Some(drag);
        }
        cx.notify();
    }

    fn on_mouse_up(&mut self, _ev: &MouseUpEvent, cx: &mut Context<Self>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.clear_interaction();
        cx.notify();
    }

    fn on_scroll(&mut self, ev: &ScrollWheelEvent, _window: &Window, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let Some(plot) = state.plot_rect.filter(|rect| rect.contains(pos)) else {
            return;
        };

        let delta = ev.delta.pixel_delta(px(16.0));
        let zoom_delta = -f32::from(delta.y);
        if zoom_delta.abs() < 0.01 {
            return;
        }
        let factor = (1.0 - zoom_delta as f64 * self.config.wheel_zoom_speed).clamp(0.1, 10.0);
        let mut figure = self.figure.write().unwrap_or_else(PoisonError::into_inner);
        figure.zoom(plot_point(pos, plot), factor);
        cx.notify();
    }
}

impl Render for FigureView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let figure = Arc::clone(&self.figure);
        let state = Arc::clone(&self.state);
        let background = figure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .theme()
            .background;

        div()
            .size_full()
            .bg(to_hsla(background))
            .child(
                canvas(
                    move |bounds, window, _| {
                        let mut figure = figure.write().unwrap_or_else(PoisonError::into_inner);
                        let mut state = state.write().unwrap_or_else(PoisonError::into_inner);
                        build_frame(&mut figure, &mut state, bounds, window)
                    },
                    move |_, frame, window, cx| {
                        paint_frame(&frame, window, cx);
                    },
                )
                .size_full(),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_down(ev, cx);
                }),
            )
            .on_mouse_move(cx.listener(|this, ev, _, cx| {
                this.on_mouse_move(ev, cx);
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_up(ev, cx);
                }),
            )
            .on_scroll_wheel(cx.listener(|this, ev, window, cx| {
                this.on_scroll(ev, window, cx);
            }))
    }
}

/// A handle for mutating a [`Figure`] held inside a [`FigureView`].
///
/// The handle clones cheaply and can be moved into async tasks.
#[derive(Clone)]
pub struct FigureHandle {
    figure: Arc<RwLock<Figure>>,
}

impl FigureHandle {
    /// Read the figure; it stays locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(&Figure) -> R) -> R {
        let figure = self.figure.read().unwrap_or_else(PoisonError::into_inner);
        f(&figure)
    }

    /// Mutate the figure; it stays locked for the duration of the callback.
    pub fn write<R>(&self, f: impl FnOnce(&mut Figure) -> R) -> R {
        let mut figure = self.figure.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut figure)
    }
}

fn screen_point(point: Point<Pixels>) -> ScreenPoint {
    ScreenPoint::new(f32::from(point.x), f32::from(point.y))
}
