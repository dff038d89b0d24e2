//! Building figures from widget state.
//!
//! [`ModelFactory`] maps widget model names to constructors. The built-in
//! names are registered by [`ModelFactory::new`]; hosts can register more.
//! [`ModelFactory::build_figure`] walks a `FigureModel` and its references
//! and returns the figure with a [`FigureBinding`] that remembers which
//! widget model each object came from, so host changes can be applied and
//! selections written back.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Value as Json, json};

use crate::axis::{Axis, AxisId};
use crate::config::{AxisStyle, FigureConfig, ScaleConfig};
use crate::data::{Value, Values};
use crate::error::{PlotError, Result};
use crate::figure::Figure;
use crate::geom::{Direction, Side};
use crate::interaction::{Interaction, PanZoom};
use crate::mark::{BarKind, Channel, Mark, MarkId, MarkKind};
use crate::render::MarkerShape;
use crate::scale::{ScaleId, ScaleKind, ScaleModel};
use crate::selector::{AxisSelection, Selection, Selector, SelectorId, SelectorKind};
use crate::widget::{ModelStore, WidgetModel};
use crate::wire::values_from_json;

type Constructor<T> = Box<dyn Fn(&WidgetModel) -> Result<T> + Send + Sync>;

const SCALE_MODELS: [&str; 7] = [
    "LinearScaleModel",
    "LogScaleModel",
    "DateScaleModel",
    "OrdinalScaleModel",
    "ColorScaleModel",
    "OrdinalColorScaleModel",
    "DateColorScaleModel",
];

const MARK_MODELS: [&str; 7] = [
    "ScatterModel",
    "LinesModel",
    "BarsModel",
    "HistModel",
    "OHLCModel",
    "GridHeatMapModel",
    "PieModel",
];

const SELECTOR_MODELS: [&str; 5] = [
    "BrushSelectorModel",
    "BrushIntervalSelectorModel",
    "FastIntervalSelectorModel",
    "LassoSelectorModel",
    "IndexSelectorModel",
];

const AXIS_MODELS: [&str; 2] = ["AxisModel", "ColorAxisModel"];

const DATA_CHANNELS: [Channel; 7] = [
    Channel::X,
    Channel::Y,
    Channel::Color,
    Channel::Size,
    Channel::Opacity,
    Channel::Rotation,
    Channel::Sample,
];

/// Registry of constructors keyed by widget model name.
pub struct ModelFactory {
    scales: HashMap<String, Constructor<ScaleModel>>,
    marks: HashMap<String, Constructor<Mark>>,
    selectors: HashMap<String, Constructor<SelectorKind>>,
}

impl ModelFactory {
    /// A factory with every built-in model name registered.
    pub fn new() -> Self {
        let mut factory = Self::empty();
        for name in SCALE_MODELS {
            if let Some(kind) = ScaleKind::from_model_name(name) {
                factory.register_scale(name, move |model| scale_from_state(kind, model));
            }
        }
        for name in MARK_MODELS {
            if let Some(kind) = MarkKind::from_model_name(name) {
                factory.register_mark(name, move |model| mark_from_state(kind.clone(), model));
            }
        }
        for name in SELECTOR_MODELS {
            if let Some(kind) = SelectorKind::from_model_name(name) {
                factory.register_selector(name, move |model| selector_kind_from_state(kind, model));
            }
        }
        factory
    }

    /// A factory with nothing registered.
    pub fn empty() -> Self {
        Self {
            scales: HashMap::new(),
            marks: HashMap::new(),
            selectors: HashMap::new(),
        }
    }

    pub fn register_scale(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn(&WidgetModel) -> Result<ScaleModel> + Send + Sync + 'static,
    ) {
        self.scales.insert(name.into(), Box::new(constructor));
    }

    /// Register a mark constructor. Scale bindings are resolved by the
    /// factory afterwards from the model's `scales` attribute.
    pub fn register_mark(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn(&WidgetModel) -> Result<Mark> + Send + Sync + 'static,
    ) {
        self.marks.insert(name.into(), Box::new(constructor));
    }

    pub fn register_selector(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn(&WidgetModel) -> Result<SelectorKind> + Send + Sync + 'static,
    ) {
        self.selectors.insert(name.into(), Box::new(constructor));
    }

    pub fn build_scale(&self, model: &WidgetModel) -> Result<ScaleModel> {
        let constructor = self
            .scales
            .get(model.model_name())
            .ok_or_else(|| PlotError::UnknownModel(model.model_name().to_string()))?;
        constructor(model)
    }

    pub fn build_mark(&self, model: &WidgetModel) -> Result<Mark> {
        let constructor = self
            .marks
            .get(model.model_name())
            .ok_or_else(|| PlotError::UnknownModel(model.model_name().to_string()))?;
        Ok(constructor(model)?.with_model_id(model.id()))
    }

    pub fn build_axis(&self, model: &WidgetModel, scale: ScaleId) -> Result<Axis> {
        if !AXIS_MODELS.contains(&model.model_name()) {
            return Err(PlotError::UnknownModel(model.model_name().to_string()));
        }
        let side = match model.get_as::<Side>("side")? {
            Some(side) => side,
            None if model.get_as::<String>("orientation")?.as_deref() == Some("vertical") => {
                Side::Left
            }
            None => Side::Bottom,
        };
        let style: AxisStyle = serde_json::from_value(Json::Object(model.state().clone()))?;
        let mut axis = Axis::new(scale, side)
            .with_style(style)
            .with_grid_lines(model.get_as::<String>("grid_lines")?.is_some_and(|g| g != "none"))
            .with_model_id(model.id());
        axis.set_label(model.get_as::<String>("label")?.filter(|label| !label.is_empty()));
        axis.set_tick_values(tick_values(model)?);
        if let Some(visible) = model.get_as::<bool>("visible")? {
            axis.set_visible(visible);
        }
        Ok(axis)
    }

    pub fn selector_kind(&self, model: &WidgetModel) -> Result<SelectorKind> {
        let constructor = self
            .selectors
            .get(model.model_name())
            .ok_or_else(|| PlotError::UnknownModel(model.model_name().to_string()))?;
        constructor(model)
    }

    /// Build a figure and everything it references.
    pub fn build_figure(&self, store: &ModelStore, figure_id: &str) -> Result<(Figure, FigureBinding)> {
        let model = store.get(figure_id)?;
        if model.model_name() != "FigureModel" {
            return Err(PlotError::UnknownModel(model.model_name().to_string()));
        }
        let config: FigureConfig = serde_json::from_value(Json::Object(model.state().clone()))?;
        let mut figure = Figure::new(config);
        let mut binding = FigureBinding::new(figure_id);

        for mark_model in store.resolve_list(model, "marks")? {
            self.add_mark(store, &mut binding, &mut figure, mark_model)?;
        }
        for axis_model in store.resolve_list(model, "axes")? {
            let scale_model = store
                .resolve_attr(axis_model, "scale")?
                .ok_or_else(|| PlotError::MissingAttribute("scale".to_string()))?;
            let scale = self.scale_for(&mut binding, &mut figure, scale_model)?;
            let id = figure.add_axis(self.build_axis(axis_model, scale)?)?;
            binding.axes.insert(axis_model.id().to_string(), id);
        }
        if let Some(interaction) = store.resolve_attr(model, "interaction")? {
            self.add_interaction(store, &mut binding, &mut figure, interaction)?;
        }
        tracing::debug!(
            figure = figure_id,
            marks = binding.marks.len(),
            axes = binding.axes.len(),
            scales = binding.scales.len(),
            "figure built from widget state"
        );
        Ok((figure, binding))
    }

    /// Apply a host-side change of `attr` on `model_id` to the figure.
    pub fn apply_change(
        &self,
        store: &ModelStore,
        binding: &mut FigureBinding,
        figure: &mut Figure,
        model_id: &str,
        attr: &str,
    ) -> Result<()> {
        let model = store.get(model_id)?;
        if let Some(&mark) = binding.marks.get(model_id) {
            return self.apply_mark_change(store, binding, figure, mark, model, attr);
        }
        if let Some(&scale) = binding.scales.get(model_id) {
            return apply_scale_change(figure, scale, model, attr);
        }
        if let Some(&axis) = binding.axes.get(model_id) {
            return apply_axis_change(figure, axis, model, attr);
        }
        if model_id == binding.figure {
            let config: FigureConfig = serde_json::from_value(Json::Object(model.state().clone()))?;
            figure.update_config(|current| *current = config);
            return Ok(());
        }
        tracing::trace!(model = model_id, attr, "change on unbound model ignored");
        Ok(())
    }

    fn add_mark(
        &self,
        store: &ModelStore,
        binding: &mut FigureBinding,
        figure: &mut Figure,
        model: &WidgetModel,
    ) -> Result<MarkId> {
        let mut mark = self.build_mark(model)?;
        for (channel, scale) in self.mark_scales(store, binding, figure, model)? {
            mark.set_scale(channel, Some(scale));
        }
        for (channel, preserve) in preserve_domain(model)? {
            mark.set_preserve_domain(channel, preserve);
        }
        let id = figure.add_mark(mark)?;
        binding.marks.insert(model.id().to_string(), id);
        Ok(id)
    }

    fn mark_scales(
        &self,
        store: &ModelStore,
        binding: &mut FigureBinding,
        figure: &mut Figure,
        model: &WidgetModel,
    ) -> Result<Vec<(Channel, ScaleId)>> {
        let mut scales = Vec::new();
        for (name, scale_model) in store.resolve_map(model, "scales")? {
            let Some(channel) = Channel::from_name(&name) else {
                tracing::warn!(model = model.id(), channel = %name, "unknown channel in scales");
                continue;
            };
            scales.push((channel, self.scale_for(binding, figure, scale_model)?));
        }
        Ok(scales)
    }

    fn scale_for(
        &self,
        binding: &mut FigureBinding,
        figure: &mut Figure,
        model: &WidgetModel,
    ) -> Result<ScaleId> {
        if let Some(&id) = binding.scales.get(model.id()) {
            return Ok(id);
        }
        let id = figure.add_scale(self.build_scale(model)?);
        binding.scales.insert(model.id().to_string(), id);
        Ok(id)
    }

    fn add_interaction(
        &self,
        store: &ModelStore,
        binding: &mut FigureBinding,
        figure: &mut Figure,
        model: &WidgetModel,
    ) -> Result<()> {
        if model.model_name() == "PanZoomModel" {
            let mut x_scales = Vec::new();
            let mut y_scales = Vec::new();
            if let Some(Json::Object(entries)) = model.get("scales") {
                for (direction, references) in entries {
                    let target = match direction.as_str() {
                        "x" => &mut x_scales,
                        "y" => &mut y_scales,
                        _ => continue,
                    };
                    for reference in references.as_array().into_iter().flatten() {
                        let scale_model = store.resolve(reference)?;
                        target.push(self.scale_for(binding, figure, scale_model)?);
                    }
                }
            }
            let panzoom = PanZoom::new(x_scales, y_scales)
                .with_pan(model.get_as::<bool>("allow_pan")?.unwrap_or(true))
                .with_zoom(model.get_as::<bool>("allow_zoom")?.unwrap_or(true));
            figure.set_interaction(Some(Interaction::PanZoom(panzoom)));
            return Ok(());
        }

        let kind = self.selector_kind(model)?;
        let mut scale = |attr: &str| -> Result<Option<ScaleId>> {
            store
                .resolve_attr(model, attr)?
                .map(|scale_model| self.scale_for(binding, figure, scale_model))
                .transpose()
        };
        let (x_scale, y_scale) = match kind {
            SelectorKind::Brush | SelectorKind::Lasso => (scale("x_scale")?, scale("y_scale")?),
            SelectorKind::BrushInterval(Direction::Y) => (None, scale("scale")?),
            SelectorKind::BrushInterval(Direction::X) | SelectorKind::Index => {
                (scale("scale")?, None)
            }
        };
        let marks = store
            .resolve_list(model, "marks")?
            .into_iter()
            .filter_map(|mark_model| binding.marks.get(mark_model.id()).copied())
            .collect();
        let selector = Selector::new(kind, x_scale, y_scale)
            .with_marks(marks)
            .with_model_id(model.id());
        let id = figure.add_selector(selector)?;
        binding.selectors.insert(model.id().to_string(), id);
        figure.set_interaction(Some(Interaction::Selector(id)));
        Ok(())
    }

    fn apply_mark_change(
        &self,
        store: &ModelStore,
        binding: &mut FigureBinding,
        figure: &mut Figure,
        mark: MarkId,
        model: &WidgetModel,
        attr: &str,
    ) -> Result<()> {
        if let Some(channel) = Channel::from_name(attr).filter(|c| DATA_CHANNELS.contains(c)) {
            let values = match model.get(attr) {
                Some(value) => values_from_json(attr, value)?,
                None => Values::Numbers(Vec::new()),
            };
            return figure.set_mark_field(mark, channel, values);
        }
        match attr {
            "scales" => {
                let scales = self.mark_scales(store, binding, figure, model)?;
                figure.update_mark(mark, |mark| {
                    let bound: Vec<Channel> = mark.scales().map(|(channel, _)| channel).collect();
                    for channel in bound {
                        if !scales.iter().any(|(wanted, _)| *wanted == channel) {
                            mark.set_scale(channel, None);
                        }
                    }
                    for (channel, scale) in scales {
                        mark.set_scale(channel, Some(scale));
                    }
                })
            }
            "preserve_domain" => {
                for (channel, preserve) in preserve_domain(model)? {
                    figure.set_preserve_domain(mark, channel, preserve)?;
                }
                Ok(())
            }
            "visible" => {
                let visible = model.get_as::<bool>("visible")?.unwrap_or(true);
                figure.update_mark(mark, |mark| mark.set_visible(visible))
            }
            "selected" => {
                let selected = model.get_as::<Vec<usize>>("selected")?;
                figure.update_mark(mark, |mark| mark.set_selected_indices(selected))
            }
            _ => {
                let kind = self.build_mark(model)?.kind().clone();
                figure.update_mark(mark, |mark| mark.set_kind(kind))
            }
        }
    }
}

impl Default for ModelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelFactory")
            .field("scales", &sorted_names(&self.scales))
            .field("marks", &sorted_names(&self.marks))
            .field("selectors", &sorted_names(&self.selectors))
            .finish()
    }
}

fn sorted_names<T>(map: &HashMap<String, T>) -> Vec<&str> {
    let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

/// Which widget model each figure object was built from.
#[derive(Debug, Clone, Default)]
pub struct FigureBinding {
    figure: String,
    scales: BTreeMap<String, ScaleId>,
    marks: BTreeMap<String, MarkId>,
    axes: BTreeMap<String, AxisId>,
    selectors: BTreeMap<String, SelectorId>,
}

impl FigureBinding {
    fn new(figure: &str) -> Self {
        Self {
            figure: figure.to_string(),
            ..Self::default()
        }
    }

    pub fn figure_model(&self) -> &str {
        &self.figure
    }

    pub fn scale(&self, model_id: &str) -> Option<ScaleId> {
        self.scales.get(model_id).copied()
    }

    pub fn mark(&self, model_id: &str) -> Option<MarkId> {
        self.marks.get(model_id).copied()
    }

    pub fn axis(&self, model_id: &str) -> Option<AxisId> {
        self.axes.get(model_id).copied()
    }

    pub fn selector(&self, model_id: &str) -> Option<SelectorId> {
        self.selectors.get(model_id).copied()
    }

    /// Write selections and interaction-driven scale bounds back onto the
    /// widget models, returning the dirty attributes per model.
    pub fn sync_to_store(
        &self,
        figure: &Figure,
        store: &mut ModelStore,
    ) -> Result<Vec<(String, Vec<String>)>> {
        for (model_id, &id) in &self.marks {
            if let Some(mark) = figure.mark(id) {
                store.get_mut(model_id)?.set("selected", json!(mark.selected()));
            }
        }
        for (model_id, &id) in &self.selectors {
            if let Some(selector) = figure.selector(id) {
                store
                    .get_mut(model_id)?
                    .set("selected", selection_to_json(selector.selection()));
            }
        }
        for (model_id, &id) in &self.scales {
            if let Some(scale) = figure.scale(id) {
                let model = store.get_mut(model_id)?;
                model.set("min", json!(scale.config().min));
                model.set("max", json!(scale.config().max));
            }
        }
        Ok(store.touch_all())
    }
}

fn scale_from_state(kind: ScaleKind, model: &WidgetModel) -> Result<ScaleModel> {
    let mut config: ScaleConfig = serde_json::from_value(Json::Object(model.state().clone()))?;
    config.domain = config.domain.filter(|domain| !domain.is_empty());
    Ok(ScaleModel::with_config(kind, config))
}

fn mark_from_state(kind: MarkKind, model: &WidgetModel) -> Result<Mark> {
    let mut mark = Mark::new(kind_from_state(kind, model)?);
    for channel in DATA_CHANNELS {
        if let Some(value) = model.get(channel.name()) {
            mark = mark.with_field(channel, values_from_json(channel.name(), value)?);
        }
    }
    if let Some(name) = model.get_as::<String>("display_name")? {
        mark = mark.with_name(name);
    }
    if let Some(visible) = model.get_as::<bool>("visible")? {
        mark.set_visible(visible);
    }
    Ok(mark)
}

fn read<T: serde::de::DeserializeOwned>(model: &WidgetModel, attr: &str, target: &mut T) -> Result<()> {
    if let Some(value) = model.get_as(attr)? {
        *target = value;
    }
    Ok(())
}

fn kind_from_state(kind: MarkKind, model: &WidgetModel) -> Result<MarkKind> {
    let kind = match kind {
        MarkKind::Scatter(mut options) => {
            read(model, "default_size", &mut options.default_size)?;
            if let Some(opacities) = model.get_as::<Vec<f64>>("default_opacities")? {
                options.default_opacity = opacities.first().copied().unwrap_or(1.0);
            }
            if let Some(marker) = model.get_as::<String>("marker")? {
                options.marker = marker_shape(&marker).ok_or_else(|| invalid("marker", &marker))?;
            }
            MarkKind::Scatter(options)
        }
        MarkKind::Lines(mut options) => {
            read(model, "stroke_width", &mut options.stroke_width)?;
            MarkKind::Lines(options)
        }
        MarkKind::Bars(mut options) => {
            if let Some(kind) = model.get_as::<String>("type")? {
                options.kind = BarKind::from_name(&kind).ok_or_else(|| invalid("type", &kind))?;
            }
            read(model, "base", &mut options.base)?;
            read(model, "padding", &mut options.padding)?;
            MarkKind::Bars(options)
        }
        MarkKind::Hist(mut options) => {
            read(model, "bins", &mut options.bins)?;
            read(model, "normalized", &mut options.normalized)?;
            MarkKind::Hist(options)
        }
        MarkKind::Ohlc(mut options) => {
            read(model, "format", &mut options.format)?;
            MarkKind::Ohlc(options)
        }
        MarkKind::Pie(mut options) => {
            read(model, "start_angle", &mut options.start_angle)?;
            read(model, "end_angle", &mut options.end_angle)?;
            read(model, "sort", &mut options.sort)?;
            read(model, "radius", &mut options.radius)?;
            read(model, "inner_radius", &mut options.inner_radius)?;
            MarkKind::Pie(options)
        }
        MarkKind::HeatMap => MarkKind::HeatMap,
    };
    Ok(kind)
}

fn selector_kind_from_state(kind: SelectorKind, model: &WidgetModel) -> Result<SelectorKind> {
    match kind {
        SelectorKind::BrushInterval(_) => {
            let vertical = model.get_as::<String>("orientation")?.as_deref() == Some("vertical");
            Ok(SelectorKind::BrushInterval(if vertical { Direction::Y } else { Direction::X }))
        }
        other => Ok(other),
    }
}

fn marker_shape(name: &str) -> Option<MarkerShape> {
    match name {
        "circle" => Some(MarkerShape::Circle),
        "square" => Some(MarkerShape::Square),
        "cross" => Some(MarkerShape::Cross),
        _ => None,
    }
}

fn invalid(name: &str, value: &str) -> PlotError {
    PlotError::InvalidAttribute {
        name: name.to_string(),
        reason: format!("unsupported value `{value}`"),
    }
}

fn preserve_domain(model: &WidgetModel) -> Result<Vec<(Channel, bool)>> {
    let entries = model
        .get_as::<BTreeMap<String, bool>>("preserve_domain")?
        .unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|(name, preserve)| Some((Channel::from_name(&name)?, preserve)))
        .collect())
}

fn tick_values(model: &WidgetModel) -> Result<Option<Vec<Value>>> {
    let Some(value) = model.get("tick_values") else {
        return Ok(None);
    };
    let values = values_from_json("tick_values", value)?;
    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some((0..values.len()).filter_map(|index| values.get(index)).collect()))
}

fn apply_scale_change(figure: &mut Figure, scale: ScaleId, model: &WidgetModel, attr: &str) -> Result<()> {
    match attr {
        "min" => figure.set_scale_min(scale, model.get_as("min")?),
        "max" => figure.set_scale_max(scale, model.get_as("max")?),
        "mid" => {
            let mid = model.get_as("mid")?;
            figure.update_scale(scale, |target| target.set_mid(mid))
        }
        "reverse" => {
            let reverse = model.get_as("reverse")?.unwrap_or(false);
            figure.update_scale(scale, |target| target.set_reverse(reverse))
        }
        "divergent" => {
            let divergent = model.get_as("divergent")?.unwrap_or(false);
            figure.update_scale(scale, |target| target.set_divergent(divergent))
        }
        "stabilized" => {
            let stabilized = model.get_as("stabilized")?.unwrap_or(false);
            figure.update_scale(scale, |target| {
                target.set_stabilized(stabilized);
                target.update_domain()
            })
        }
        "domain" => {
            let domain = model
                .get_as::<Vec<String>>("domain")?
                .filter(|domain| !domain.is_empty());
            figure.update_scale(scale, |target| target.set_ordinal_domain(domain))
        }
        _ => Ok(()),
    }
}

fn apply_axis_change(figure: &mut Figure, axis: AxisId, model: &WidgetModel, attr: &str) -> Result<()> {
    match attr {
        "label" => {
            let label = model.get_as::<String>("label")?.filter(|label| !label.is_empty());
            figure.update_axis(axis, |axis| axis.set_label(label))
        }
        "visible" => {
            let visible = model.get_as("visible")?.unwrap_or(true);
            figure.update_axis(axis, |axis| axis.set_visible(visible))
        }
        "tick_values" => {
            let values = tick_values(model)?;
            figure.update_axis(axis, |axis| axis.set_tick_values(values))
        }
        "tick_size" | "tick_padding" | "font_size" | "label_offset" | "num_ticks" => {
            let style: AxisStyle = serde_json::from_value(Json::Object(model.state().clone()))?;
            figure.update_axis(axis, |axis| axis.set_style(style))
        }
        _ => Ok(()),
    }
}

fn axis_selection_to_json(selection: &AxisSelection) -> Json {
    match selection {
        AxisSelection::Unbounded => Json::Null,
        AxisSelection::Range(extent) => json!([extent.min, extent.max]),
        AxisSelection::Labels(labels) => json!(labels),
    }
}

/// Widget form of a selection: `[min, max]` for intervals,
/// `[[x0, y0], [x1, y1]]` for rectangles, vertex lists for polygons.
pub fn selection_to_json(selection: &Selection) -> Json {
    match selection {
        Selection::None => Json::Null,
        Selection::Rect { x, y: AxisSelection::Unbounded } => axis_selection_to_json(x),
        Selection::Rect { x: AxisSelection::Unbounded, y } => axis_selection_to_json(y),
        Selection::Rect {
            x: AxisSelection::Range(x),
            y: AxisSelection::Range(y),
        } => json!([[x.min, y.min], [x.max, y.max]]),
        Selection::Rect { x, y } => json!([axis_selection_to_json(x), axis_selection_to_json(y)]),
        Selection::Polygon(vertices) => {
            Json::Array(vertices.iter().map(|vertex| json!([vertex.x, vertex.y])).collect())
        }
        Selection::Index(Value::Number(value)) => json!([value]),
        Selection::Index(Value::Label(label)) => json!([label]),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{Domain, Extent};

    fn store() -> ModelStore {
        ModelStore::from_json(&json!({
            "fig": {"model_name": "FigureModel", "state": {
                "width": 400,
                "height": 300,
                "marks": ["IPY_MODEL_a", "IPY_MODEL_b"],
                "axes": ["IPY_MODEL_ax"],
                "interaction": "IPY_MODEL_brush"
            }},
            "sx": {"model_name": "LinearScaleModel", "state": {"min": null}},
            "sy": {"model_name": "LinearScaleModel"},
            "a": {"model_name": "ScatterModel", "state": {
                "x": [0, 1], "y": [0, 1],
                "scales": {"x": "IPY_MODEL_sx", "y": "IPY_MODEL_sy"}
            }},
            "b": {"model_name": "ScatterModel", "state": {
                "x": [0.5, 2], "y": [0, 1],
                "scales": {"x": "IPY_MODEL_sx", "y": "IPY_MODEL_sy"}
            }},
            "ax": {"model_name": "AxisModel", "state": {
                "scale": "IPY_MODEL_sx", "label": "time"
            }},
            "brush": {"model_name": "BrushIntervalSelectorModel", "state": {
                "scale": "IPY_MODEL_sx", "marks": ["IPY_MODEL_a"]
            }}
        }))
        .unwrap()
    }

    #[test]
    fn builds_figure_with_shared_scale() {
        let store = store();
        let (figure, binding) = ModelFactory::new().build_figure(&store, "fig").unwrap();
        let x = binding.scale("sx").unwrap();
        assert_eq!(figure.scale(x).unwrap().domain(), &Domain::Continuous { min: 0.0, max: 2.0 });
        assert_eq!(figure.marks().len(), 2);
        assert_eq!(figure.axes()[0].label(), Some("time"));
        assert!(figure.margin().bottom > figure.config().fig_margin.bottom);
        assert!(matches!(figure.interaction(), Some(Interaction::Selector(_))));
    }

    #[test]
    fn selections_flow_back_to_widgets() {
        let mut store = store();
        let (mut figure, binding) = ModelFactory::new().build_figure(&store, "fig").unwrap();
        let selector = binding.selector("brush").unwrap();
        figure
            .select(
                selector,
                Selection::Rect {
                    x: AxisSelection::Range(Extent::new(0.5, 1.5)),
                    y: AxisSelection::Unbounded,
                },
            )
            .unwrap();
        let dirty = binding.sync_to_store(&figure, &mut store).unwrap();
        assert_eq!(store.get("a").unwrap().get("selected"), Some(&json!([1])));
        assert_eq!(store.get("b").unwrap().get("selected"), None);
        assert_eq!(store.get("brush").unwrap().get("selected"), Some(&json!([0.5, 1.5])));
        assert!(dirty.iter().any(|(id, attrs)| id == "a" && attrs.contains(&"selected".to_string())));
        assert!(binding.sync_to_store(&figure, &mut store).unwrap().is_empty());
    }

    #[test]
    fn host_changes_update_domains() {
        let mut store = store();
        let factory = ModelFactory::new();
        let (mut figure, mut binding) = factory.build_figure(&store, "fig").unwrap();
        store.get_mut("b").unwrap().set("x", json!([0.5, 5]));
        factory
            .apply_change(&store, &mut binding, &mut figure, "b", "x")
            .unwrap();
        let x = binding.scale("sx").unwrap();
        assert_eq!(figure.scale(x).unwrap().domain(), &Domain::Continuous { min: 0.0, max: 5.0 });

        store.get_mut("sx").unwrap().set("max", json!(10.0));
        factory
            .apply_change(&store, &mut binding, &mut figure, "sx", "max")
            .unwrap();
        assert_eq!(figure.scale(x).unwrap().domain(), &Domain::Continuous { min: 0.0, max: 10.0 });
    }

    #[test]
    fn unknown_models_and_references_error() {
        let store = ModelStore::from_json(&json!({
            "fig": {"model_name": "FigureModel", "state": {"marks": ["IPY_MODEL_m"]}},
            "m": {"model_name": "SankeyModel"},
            "bad": {"model_name": "FigureModel", "state": {"marks": ["IPY_MODEL_gone"]}}
        }))
        .unwrap();
        let factory = ModelFactory::new();
        assert!(matches!(
            factory.build_figure(&store, "fig"),
            Err(PlotError::UnknownModel(name)) if name == "SankeyModel"
        ));
        assert!(matches!(
            factory.build_figure(&store, "bad"),
            Err(PlotError::DanglingReference(_))
        ));
    }

    #[test]
    fn hosts_can_register_constructors() {
        let mut factory = ModelFactory::empty();
        factory.register_mark("DotsModel", |model| {
            let x = values_from_json("x", model.get("x").unwrap_or(&Json::Null))?;
            Ok(Mark::scatter().with_field(Channel::X, x.clone()).with_field(Channel::Y, x))
        });
        factory.register_scale("LinearScaleModel", |_| Ok(ScaleModel::linear()));
        let store = ModelStore::from_json(&json!({
            "fig": {"model_name": "FigureModel", "state": {"marks": ["IPY_MODEL_d"]}},
            "s": {"model_name": "LinearScaleModel"},
            "d": {"model_name": "DotsModel", "state": {"x": [3, 4], "scales": {"x": "IPY_MODEL_s"}}}
        }))
        .unwrap();
        let (figure, binding) = factory.build_figure(&store, "fig").unwrap();
        let scale = binding.scale("s").unwrap();
        assert_eq!(figure.scale(scale).unwrap().domain(), &Domain::Continuous { min: 3.0, max: 4.0 });
    }

    #[test]
    fn mark_options_come_from_state() {
        let model = WidgetModel::new("m", "BarsModel")
            .with_state(json!({"type": "grouped", "padding": 0.2}).as_object().unwrap().clone());
        let mark = ModelFactory::new().build_mark(&model).unwrap();
        let MarkKind::Bars(options) = mark.kind() else {
            panic!("expected bars");
        };
        assert_eq!(options.kind, BarKind::Grouped);
        assert_eq!(options.padding, 0.2);

        let bad = WidgetModel::new("m", "ScatterModel")
            .with_state(json!({"marker": "star"}).as_object().unwrap().clone());
        assert!(matches!(
            ModelFactory::new().build_mark(&bad),
            Err(PlotError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn brush_rectangles_serialize_as_corners() {
        let selection = Selection::Rect {
            x: AxisSelection::Range(Extent::new(0.0, 1.0)),
            y: AxisSelection::Range(Extent::new(2.0, 3.0)),
        };
        assert_eq!(selection_to_json(&selection), json!([[0.0, 2.0], [1.0, 3.0]]));
        assert_eq!(selection_to_json(&Selection::None), Json::Null);
    }
}
