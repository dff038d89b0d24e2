//! Figure: owns scales, marks, axes, and selectors, and runs the update
//! cycle between them.
//!
//! Every mutation follows the same path: the affected mark recomputes its
//! data and pushes partial domains, scale changes are queued as events, and
//! the queue is drained in FIFO order. Handling a `DomainChanged` refreshes
//! views and recomputes axis space, which may queue a `MarginUpdated`; that
//! one re-sets every pixel range once.

mod layout;
mod render;

use crate::axis::{ApproxTextMeasurer, Axis, AxisId, TextMeasurer};
use crate::config::FigureConfig;
use crate::data::Values;
use crate::error::{PlotError, Result};
use crate::event::{EventBus, FigureEvent, SubscriptionId};
use crate::geom::{Margin, Point};
use crate::interaction::Interaction;
use crate::mark::{Channel, DomainContributor, Mark, MarkId, UpdatePhase};
use crate::scale::{DomainChanged, ScaleId, ScaleModel, ScaleRegistry};
use crate::selector::{Selection, SelectionTarget, Selector, SelectorId};
use crate::style::Theme;

/// A composed plot.
pub struct Figure {
    config: FigureConfig,
    theme: Theme,
    scales: ScaleRegistry,
    marks: Vec<Mark>,
    axes: Vec<Axis>,
    selectors: Vec<Selector>,
    interaction: Option<Interaction>,
    margin: Margin,
    bus: EventBus,
    dispatching: bool,
    measurer: Box<dyn TextMeasurer + Send + Sync>,
}

impl Figure {
    /// Create an empty figure.
    pub fn new(config: FigureConfig) -> Self {
        let margin = config.fig_margin;
        Self {
            config,
            theme: Theme::default(),
            scales: ScaleRegistry::new(),
            marks: Vec::new(),
            axes: Vec::new(),
            selectors: Vec::new(),
            interaction: None,
            margin,
            bus: EventBus::new(),
            dispatching: false,
            measurer: Box::new(ApproxTextMeasurer),
        }
    }

    /// Set the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Access the layout configuration.
    pub fn config(&self) -> &FigureConfig {
        &self.config
    }

    /// Access the theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Replace the theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Access the current margin.
    pub fn margin(&self) -> Margin {
        self.margin
    }

    /// Access the scale registry.
    pub fn scales(&self) -> &ScaleRegistry {
        &self.scales
    }

    /// Access a scale model.
    pub fn scale(&self, id: ScaleId) -> Option<&ScaleModel> {
        self.scales.get(id)
    }

    /// Access all marks in draw order.
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Access a mark.
    pub fn mark(&self, id: MarkId) -> Option<&Mark> {
        self.marks.iter().find(|mark| mark.id() == id)
    }

    /// Access all axes.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Access an axis.
    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.id() == id)
    }

    /// Access all selectors.
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Access a selector.
    pub fn selector(&self, id: SelectorId) -> Option<&Selector> {
        self.selectors.iter().find(|selector| selector.id() == id)
    }

    /// Access the active interaction.
    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    /// Replace the active interaction.
    pub fn set_interaction(&mut self, interaction: Option<Interaction>) {
        self.interaction = interaction;
    }

    /// Register an event listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&FigureEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    /// Remove an event listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Replace the text measurer used for axis space.
    pub fn set_text_measurer(&mut self, measurer: Box<dyn TextMeasurer + Send + Sync>) {
        self.measurer = measurer;
        self.relayout();
        self.dispatch();
    }

    /// Take ownership of a scale model.
    pub fn add_scale(&mut self, model: ScaleModel) -> ScaleId {
        self.scales.insert(model)
    }

    /// Mutate a scale model and propagate any domain change.
    pub fn update_scale(
        &mut self,
        id: ScaleId,
        update: impl FnOnce(&mut ScaleModel) -> Option<DomainChanged>,
    ) -> Result<()> {
        let model = self.scales.get_mut(id).ok_or(PlotError::UnknownScale(id))?;
        if let Some(change) = update(model) {
            self.bus.emit(FigureEvent::DomainChanged(change));
        }
        self.dispatch();
        Ok(())
    }

    /// Set or clear a scale's explicit lower bound.
    pub fn set_scale_min(&mut self, id: ScaleId, min: Option<f64>) -> Result<()> {
        self.update_scale(id, |model| model.set_min(min))
    }

    /// Set or clear a scale's explicit upper bound.
    pub fn set_scale_max(&mut self, id: ScaleId, max: Option<f64>) -> Result<()> {
        self.update_scale(id, |model| model.set_max(max))
    }

    /// Add a mark and push its contributions.
    pub fn add_mark(&mut self, mark: Mark) -> Result<MarkId> {
        if let Some((_, missing)) = mark.scales().find(|(_, scale)| !self.scales.contains(*scale)) {
            return Err(PlotError::UnknownScale(missing));
        }
        let id = mark.id();
        tracing::debug!(mark = ?id, "adding mark");
        self.marks.push(mark);
        self.refresh_mark(id);
        self.rescale_all();
        Ok(id)
    }

    /// Remove a mark and withdraw its contributions.
    pub fn remove_mark(&mut self, id: MarkId) -> Result<Mark> {
        let index = self.mark_index(id)?;
        let mark = self.marks.remove(index);
        for change in mark.release_domains(&mut self.scales) {
            self.bus.emit(FigureEvent::DomainChanged(change));
        }
        self.dispatch();
        self.rescale_all();
        Ok(mark)
    }

    /// Mutate a mark, then run its update cycle. Contributions to scales the
    /// mark no longer uses are withdrawn. On error the mark is left as it was.
    pub fn update_mark(&mut self, id: MarkId, update: impl FnOnce(&mut Mark)) -> Result<()> {
        let index = self.mark_index(id)?;
        let mut mark = self.marks[index].clone();
        let before: Vec<ScaleId> = mark.scales().map(|(_, scale)| scale).collect();
        update(&mut mark);
        let after: Vec<ScaleId> = mark.scales().map(|(_, scale)| scale).collect();
        if let Some(missing) = after.iter().find(|scale| !self.scales.contains(**scale)) {
            return Err(PlotError::UnknownScale(*missing));
        }
        let contributor = mark.contributor_id();
        self.marks[index] = mark;
        for scale in before.iter().filter(|scale| !after.contains(scale)) {
            if let Some(change) = self
                .scales
                .get_mut(*scale)
                .and_then(|model| model.del_domain(contributor))
            {
                self.bus.emit(FigureEvent::DomainChanged(change));
            }
        }
        self.refresh_mark(id);
        if before != after {
            self.rescale_all();
        }
        Ok(())
    }

    /// Replace a channel's values on a mark.
    pub fn set_mark_field(&mut self, id: MarkId, channel: Channel, values: Values) -> Result<()> {
        self.update_mark(id, |mark| mark.set_field(channel, values))
    }

    /// Stop (or resume) a mark driving a channel's scale domain.
    pub fn set_preserve_domain(&mut self, id: MarkId, channel: Channel, preserve: bool) -> Result<()> {
        self.update_mark(id, |mark| mark.set_preserve_domain(channel, preserve))
    }

    /// Add an axis.
    pub fn add_axis(&mut self, mut axis: Axis) -> Result<AxisId> {
        let model = self
            .scales
            .get(axis.scale_id())
            .ok_or(PlotError::UnknownScale(axis.scale_id()))?;
        axis.sync(model);
        let id = axis.id();
        self.axes.push(axis);
        self.rescale_all();
        self.relayout();
        self.dispatch();
        Ok(id)
    }

    /// Remove an axis.
    pub fn remove_axis(&mut self, id: AxisId) -> Result<Axis> {
        let index = self
            .axes
            .iter()
            .position(|axis| axis.id() == id)
            .ok_or(PlotError::UnknownAxis(id))?;
        let axis = self.axes.remove(index);
        self.relayout();
        self.dispatch();
        Ok(axis)
    }

    /// Mutate an axis (label, visibility, style) and re-run layout.
    pub fn update_axis(&mut self, id: AxisId, update: impl FnOnce(&mut Axis)) -> Result<()> {
        let axis = self
            .axes
            .iter_mut()
            .find(|axis| axis.id() == id)
            .ok_or(PlotError::UnknownAxis(id))?;
        update(axis);
        self.relayout();
        self.dispatch();
        Ok(())
    }

    /// Add a selector.
    pub fn add_selector(&mut self, mut selector: Selector) -> Result<SelectorId> {
        for scale in [selector.x_scale(), selector.y_scale()].into_iter().flatten() {
            let model = self.scales.get(scale).ok_or(PlotError::UnknownScale(scale))?;
            selector.sync(model);
        }
        let id = selector.id();
        self.selectors.push(selector);
        self.rescale_all();
        Ok(id)
    }

    /// Remove a selector, clearing the selections it wrote.
    pub fn remove_selector(&mut self, id: SelectorId) -> Result<Selector> {
        self.clear_selection(id)?;
        let index = self.selector_index(id)?;
        if matches!(self.interaction, Some(Interaction::Selector(active)) if active == id) {
            self.interaction = None;
        }
        Ok(self.selectors.remove(index))
    }

    /// Set a data-space selection and write it onto the target marks.
    pub fn select(&mut self, id: SelectorId, selection: Selection) -> Result<()> {
        let index = self.selector_index(id)?;
        self.selectors[index].select(selection);
        self.apply_selector(index);
        Ok(())
    }

    /// Brush between two plot-area pixel positions.
    pub fn brush(&mut self, id: SelectorId, start: Point, end: Point) -> Result<()> {
        let index = self.selector_index(id)?;
        if self.selectors[index].brush_pixels(start, end) {
            self.apply_selector(index);
        }
        Ok(())
    }

    /// Lasso with plot-area pixel vertices.
    pub fn lasso(&mut self, id: SelectorId, vertices: &[Point]) -> Result<()> {
        let index = self.selector_index(id)?;
        if self.selectors[index].lasso_pixels(vertices) {
            self.apply_selector(index);
        }
        Ok(())
    }

    /// Index-select at a plot-area pixel column.
    pub fn index_select(&mut self, id: SelectorId, pixel_x: f64) -> Result<()> {
        let index = self.selector_index(id)?;
        if self.selectors[index].index_pixel(pixel_x) {
            self.apply_selector(index);
        }
        Ok(())
    }

    /// Clear a selector; target marks get `selected = None`.
    pub fn clear_selection(&mut self, id: SelectorId) -> Result<()> {
        self.select(id, Selection::None)
    }

    /// Pan the active pan/zoom interaction by a pixel delta.
    pub fn pan(&mut self, delta: Point) {
        let area = self.plot_area();
        if let Some(Interaction::PanZoom(panzoom)) = self.interaction.as_mut() {
            for change in panzoom.pan(&mut self.scales, delta, area) {
                self.bus.emit(FigureEvent::DomainChanged(change));
            }
        }
        self.dispatch();
    }

    /// Zoom the active pan/zoom interaction around a plot-area pixel.
    pub fn zoom(&mut self, center: Point, factor: f64) {
        let area = self.plot_area();
        if let Some(Interaction::PanZoom(panzoom)) = self.interaction.as_mut() {
            for change in panzoom.zoom(&mut self.scales, center, factor, area) {
                self.bus.emit(FigureEvent::DomainChanged(change));
            }
        }
        self.dispatch();
    }

    /// Undo every pan and zoom.
    pub fn reset_zoom(&mut self) {
        if let Some(Interaction::PanZoom(panzoom)) = self.interaction.as_mut() {
            for change in panzoom.reset(&mut self.scales) {
                self.bus.emit(FigureEvent::DomainChanged(change));
            }
        }
        self.dispatch();
    }

    /// Resize the figure.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.update_config(|config| {
            config.width = width;
            config.height = height;
        });
    }

    /// Mutate the layout configuration and re-run layout.
    pub fn update_config(&mut self, update: impl FnOnce(&mut FigureConfig)) {
        update(&mut self.config);
        self.rescale_all();
        self.relayout();
        self.dispatch();
    }

    fn mark_index(&self, id: MarkId) -> Result<usize> {
        self.marks
            .iter()
            .position(|mark| mark.id() == id)
            .ok_or(PlotError::UnknownMark(id))
    }

    fn selector_index(&self, id: SelectorId) -> Result<usize> {
        self.selectors
            .iter()
            .position(|selector| selector.id() == id)
            .ok_or(PlotError::UnknownSelector(id))
    }

    /// `Dirty → DomainsRecomputed → Clean`, drawing once at the end.
    fn refresh_mark(&mut self, id: MarkId) {
        let Ok(index) = self.mark_index(id) else {
            return;
        };
        let mark = &mut self.marks[index];
        mark.update_data();
        let changes = mark.update_domains(&mut self.scales);
        mark.sync_views(&self.scales);
        for change in changes {
            self.bus.emit(FigureEvent::DomainChanged(change));
        }
        self.dispatch();
        self.rescale_mark(index);
        let mark = &mut self.marks[index];
        mark.finish_update();
        mark.record_draw();
    }

    /// Drain the event queue. Nested calls return immediately; the outer
    /// loop picks up whatever they queued.
    fn dispatch(&mut self) {
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        while let Some(event) = self.bus.pop() {
            match &event {
                FigureEvent::DomainChanged(change) => self.on_domain_changed(change),
                FigureEvent::MarginUpdated(_) => self.on_margin_updated(),
                FigureEvent::SelectionChanged { .. } => {}
            }
            self.bus.notify(&event);
        }
        self.dispatching = false;
    }

    fn on_domain_changed(&mut self, change: &DomainChanged) {
        let Some(model) = self.scales.get(change.scale) else {
            return;
        };
        for mark in &mut self.marks {
            if mark.sync_scale(model) && mark.phase() == UpdatePhase::Clean {
                mark.record_draw();
            }
        }
        for axis in self.axes.iter_mut().filter(|axis| axis.scale_id() == change.scale) {
            axis.sync(model);
        }
        for selector in &mut self.selectors {
            selector.sync(model);
        }
        self.rescale_axes();
        self.relayout();
    }

    fn on_margin_updated(&mut self) {
        self.rescale_all();
        for mark in &mut self.marks {
            if mark.phase() == UpdatePhase::Clean {
                mark.record_draw();
            }
        }
    }

    fn apply_selector(&mut self, index: usize) {
        let selector = &self.selectors[index];
        let selector_id = selector.id();
        let mut written = Vec::new();
        for mark in self.marks.iter_mut().filter(|mark| selector.targets(mark)) {
            let selected = selector.selected_indices(&*mark);
            mark.apply_selection(selected.clone());
            written.push((mark.id(), selected));
        }
        for (mark, selected) in written {
            self.bus.emit(FigureEvent::SelectionChanged {
                selector: selector_id,
                mark,
                selected,
            });
        }
        self.dispatch();
    }
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(FigureConfig::default())
    }
}

impl std::fmt::Debug for Figure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Figure")
            .field("config", &self.config)
            .field("margin", &self.margin)
            .field("scales", &self.scales.len())
            .field("marks", &self.marks.len())
            .field("axes", &self.axes.len())
            .field("selectors", &self.selectors.len())
            .field("bus", &self.bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::{Domain, Extent};
    use crate::selector::{AxisSelection, SelectorKind};

    fn scatter(x: ScaleId, y: ScaleId, xs: Vec<f64>, ys: Vec<f64>) -> Mark {
        Mark::scatter()
            .with_field(Channel::X, xs)
            .with_field(Channel::Y, ys)
            .with_scale(Channel::X, x)
            .with_scale(Channel::Y, y)
    }

    fn figure_with_scales() -> (Figure, ScaleId, ScaleId) {
        let mut figure = Figure::new(FigureConfig {
            width: 400.0,
            ..FigureConfig::default()
        });
        let x = figure.add_scale(ScaleModel::linear());
        let y = figure.add_scale(ScaleModel::linear());
        (figure, x, y)
    }

    #[test]
    fn shared_scale_resolves_union() {
        let (mut figure, x, y) = figure_with_scales();
        figure.add_mark(scatter(x, y, vec![0.0, 1.0], vec![0.0, 1.0])).unwrap();
        figure.add_mark(scatter(x, y, vec![0.5, 2.0], vec![0.0, 1.0])).unwrap();
        assert_eq!(
            figure.scale(x).unwrap().domain(),
            &Domain::Continuous { min: 0.0, max: 2.0 }
        );
    }

    #[test]
    fn removing_mark_withdraws_contribution() {
        let (mut figure, x, y) = figure_with_scales();
        let a = figure.add_mark(scatter(x, y, vec![0.0, 1.0], vec![0.0, 1.0])).unwrap();
        figure.add_mark(scatter(x, y, vec![0.5, 2.0], vec![0.0, 1.0])).unwrap();
        figure.remove_mark(a).unwrap();
        assert_eq!(
            figure.scale(x).unwrap().domain(),
            &Domain::Continuous { min: 0.5, max: 2.0 }
        );
    }

    #[test]
    fn axis_add_and_remove_moves_plot_area() {
        let (mut figure, x, y) = figure_with_scales();
        figure.add_mark(scatter(x, y, vec![0.0, 100.0], vec![0.0, 1000.0])).unwrap();
        let before = figure.plot_area();
        let axis = figure.add_axis(Axis::left(y)).unwrap();
        let with_axis = figure.plot_area();
        assert!(with_axis.width < before.width);
        assert!(with_axis.x > before.x);

        figure.remove_axis(axis).unwrap();
        assert_eq!(figure.plot_area(), before);
    }

    #[test]
    fn auto_layout_off_keeps_fig_margin() {
        let (mut figure, x, y) = figure_with_scales();
        figure.update_config(|config| config.auto_layout = false);
        figure.add_mark(scatter(x, y, vec![0.0, 1.0], vec![0.0, 1.0])).unwrap();
        figure.add_axis(Axis::left(y)).unwrap();
        assert_eq!(figure.margin(), figure.config().fig_margin);
    }

    #[test]
    fn brush_interval_selects_point_inside() {
        let (mut figure, x, y) = figure_with_scales();
        let mark = figure.add_mark(scatter(x, y, vec![0.0, 1.0], vec![0.0, 0.0])).unwrap();
        let selector = figure.add_selector(Selector::brush_interval(x)).unwrap();
        figure
            .select(
                selector,
                Selection::Rect {
                    x: AxisSelection::Range(Extent::new(0.5, 1.5)),
                    y: AxisSelection::Unbounded,
                },
            )
            .unwrap();
        assert_eq!(figure.mark(mark).unwrap().selected(), Some(&[1][..]));

        figure.clear_selection(selector).unwrap();
        assert_eq!(figure.mark(mark).unwrap().selected(), None);
    }

    #[test]
    fn failed_update_leaves_mark_untouched() {
        let (mut figure, x, y) = figure_with_scales();
        let mark = figure.add_mark(scatter(x, y, vec![0.0, 10.0], vec![0.0, 1.0])).unwrap();
        let foreign = ScaleRegistry::new().insert(ScaleModel::linear());
        let result = figure.update_mark(mark, |m| {
            m.set_field(Channel::X, Values::Numbers(vec![100.0, 200.0]));
            m.set_scale(Channel::X, Some(foreign));
        });
        assert!(matches!(result, Err(PlotError::UnknownScale(id)) if id == foreign));

        let kept = figure.mark(mark).unwrap();
        assert_eq!(kept.scale(Channel::X), Some(x));
        assert_eq!(kept.phase(), UpdatePhase::Clean);
        figure
            .set_mark_field(mark, Channel::X, Values::Numbers(vec![0.0, 20.0]))
            .unwrap();
        assert_eq!(
            figure.scale(x).unwrap().domain(),
            &Domain::Continuous { min: 0.0, max: 20.0 }
        );
    }

    #[test]
    fn brush_without_scales_leaves_marks_alone() {
        let (mut figure, x, y) = figure_with_scales();
        let mark = figure.add_mark(scatter(x, y, vec![0.0, 1.0, 2.0], vec![0.0, 0.0, 0.0])).unwrap();
        let selector = figure
            .add_selector(Selector::new(SelectorKind::Brush, None, None).with_marks(vec![mark]))
            .unwrap();
        figure
            .brush(selector, Point::new(0.0, 0.0), Point::new(50.0, 50.0))
            .unwrap();
        assert_eq!(figure.mark(mark).unwrap().selected(), None);
        assert_eq!(figure.selector(selector).unwrap().selection(), &Selection::None);
    }

    #[test]
    fn lasso_selects_from_multi_line_mark() {
        let (mut figure, x, y) = figure_with_scales();
        let lines = Mark::lines()
            .with_field(Channel::X, vec![0.0, 1.0, 2.0])
            .with_field(
                Channel::Y,
                Values::Nested(vec![vec![0.0, 5.0, 10.0], vec![10.0, 5.0, 0.0]]),
            )
            .with_scale(Channel::X, x)
            .with_scale(Channel::Y, y);
        let mark = figure.add_mark(lines).unwrap();
        let selector = figure
            .add_selector(Selector::new(SelectorKind::Lasso, Some(x), Some(y)).with_marks(vec![mark]))
            .unwrap();
        figure
            .select(
                selector,
                Selection::Polygon(vec![
                    Point::new(0.5, 2.0),
                    Point::new(1.5, 2.0),
                    Point::new(1.5, 8.0),
                    Point::new(0.5, 8.0),
                ]),
            )
            .unwrap();
        assert_eq!(figure.mark(mark).unwrap().selected(), Some(&[1][..]));
    }

    #[test]
    fn updating_one_mark_redraws_each_once() {
        let (mut figure, x, y) = figure_with_scales();
        let a = figure.add_mark(scatter(x, y, vec![0.0, 1.0], vec![0.0, 1.0])).unwrap();
        let b = figure.add_mark(scatter(x, y, vec![0.0, 1.0], vec![0.0, 1.0])).unwrap();
        let draws = |figure: &Figure, id| figure.mark(id).unwrap().draw_count();
        let (a0, b0) = (draws(&figure, a), draws(&figure, b));

        figure
            .set_mark_field(a, Channel::X, Values::Numbers(vec![0.0, 5.0]))
            .unwrap();
        assert_eq!(draws(&figure, a), a0 + 1);
        assert_eq!(draws(&figure, b), b0 + 1);
        assert_eq!(figure.mark(a).unwrap().phase(), UpdatePhase::Clean);
    }

    #[test]
    fn events_reach_subscribers_in_order() {
        let (mut figure, x, y) = figure_with_scales();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        figure.subscribe(move |event| {
            let name = match event {
                FigureEvent::DomainChanged(_) => "domain",
                FigureEvent::MarginUpdated(_) => "margin",
                FigureEvent::SelectionChanged { .. } => "selection",
            };
            sink.lock().unwrap().push(name);
        });
        figure.add_axis(Axis::left(y)).unwrap();
        figure.add_mark(scatter(x, y, vec![0.0, 1.0], vec![0.0, 12345.0])).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&"margin"));
        let first_domain = seen.iter().position(|name| *name == "domain").unwrap();
        assert!(seen[first_domain..].contains(&"margin"));
    }

    #[test]
    fn unknown_scale_is_rejected() {
        let (mut figure, _, _) = figure_with_scales();
        let foreign = ScaleRegistry::new().insert(ScaleModel::linear());
        let result = figure.add_mark(Mark::scatter().with_scale(Channel::X, foreign));
        assert!(matches!(result, Err(PlotError::UnknownScale(id)) if id == foreign));
    }

    #[test]
    fn pan_zoom_moves_shared_domain() {
        let (mut figure, x, y) = figure_with_scales();
        figure.add_mark(scatter(x, y, vec![0.0, 10.0], vec![0.0, 1.0])).unwrap();
        figure.set_interaction(Some(Interaction::PanZoom(crate::interaction::PanZoom::new(
            vec![x],
            Vec::new(),
        ))));
        let width = figure.plot_area().width;
        figure.pan(Point::new(width / 10.0, 0.0));
        let extent = figure.scale(x).unwrap().domain().extent().unwrap();
        assert!((extent.min - -1.0).abs() < 1e-9);
        figure.reset_zoom();
        assert_eq!(
            figure.scale(x).unwrap().domain(),
            &Domain::Continuous { min: 0.0, max: 10.0 }
        );
    }
}
