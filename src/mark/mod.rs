//! Marks: data series bound to scales.
//!
//! A mark owns its raw channel values and the derived `mark_data` consumed by
//! the renderer. After every data change it contributes one partial domain per
//! bound scale, keyed by its own id.

mod bars;
mod heatmap;
mod hist;
mod lines;
mod ohlc;
mod pie;
mod scatter;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::data::{Value, Values};
use crate::domain::PartialDomain;
use crate::geom::Direction;
use crate::scale::{ContributorId, DomainChanged, PixelMapper, PixelScale, ScaleId, ScaleModel, ScaleRegistry};

pub use bars::{BarDatum, BarKind, BarSegment, BarsOptions};
pub use heatmap::CellDatum;
pub use hist::{Bin, HistOptions, histogram};
pub use lines::{LineDatum, LinesOptions};
pub use ohlc::{OhlcDatum, OhlcOptions};
pub use pie::{PieOptions, SliceDatum};
pub use scatter::{PointDatum, ScatterOptions};

static MARK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(u64);

impl MarkId {
    fn next() -> Self {
        Self(MARK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl From<MarkId> for ContributorId {
    fn from(id: MarkId) -> Self {
        ContributorId::new(id.0)
    }
}

/// A data channel of a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Color.
    Color,
    /// Marker area or slice size.
    Size,
    /// Opacity.
    Opacity,
    /// Marker rotation.
    Rotation,
    /// Histogram sample.
    Sample,
    /// Histogram bin counts (derived).
    Count,
}

impl Channel {
    /// Wire name of the channel.
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Color => "color",
            Self::Size => "size",
            Self::Opacity => "opacity",
            Self::Rotation => "rotation",
            Self::Sample => "sample",
            Self::Count => "count",
        }
    }

    /// Parse a wire channel name.
    pub fn from_name(name: &str) -> Option<Self> {
        let channel = match name {
            "x" => Self::X,
            "y" => Self::Y,
            "color" => Self::Color,
            "size" | "sizes" => Self::Size,
            "opacity" => Self::Opacity,
            "rotation" => Self::Rotation,
            "sample" => Self::Sample,
            "count" => Self::Count,
            _ => return None,
        };
        Some(channel)
    }

    /// Plot-area direction of positional channels.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::X | Self::Sample => Some(Direction::X),
            Self::Y | Self::Count => Some(Direction::Y),
            _ => None,
        }
    }

    /// Fixed output range of non-positional, non-color channels.
    pub(crate) fn value_range(self) -> Option<[f64; 2]> {
        match self {
            Self::Size => Some([0.0, 1.0]),
            Self::Opacity => Some([0.1, 1.0]),
            Self::Rotation => Some([0.0, 180.0]),
            _ => None,
        }
    }
}

/// Per-mark update phase.
///
/// `Clean → Dirty` on a field change, `Dirty → DomainsRecomputed` once the
/// mark has pushed its contributions, and back to `Clean` after the events
/// caused by the update have been dispatched. Only clean marks redraw in
/// response to scale events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePhase {
    /// No update in flight.
    #[default]
    Clean,
    /// Fields changed; derived data is stale.
    Dirty,
    /// Derived data and contributions are current; events pending.
    DomainsRecomputed,
}

/// Mark type with its kind-specific options.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkKind {
    /// Scatter plot.
    Scatter(ScatterOptions),
    /// One or more polylines.
    Lines(LinesOptions),
    /// Stacked or grouped bars.
    Bars(BarsOptions),
    /// Histogram of a sample.
    Hist(HistOptions),
    /// Open/high/low/close glyphs.
    Ohlc(OhlcOptions),
    /// Grid heat map.
    HeatMap,
    /// Pie chart.
    Pie(PieOptions),
}

impl MarkKind {
    /// Resolve a widget model name such as `ScatterModel`.
    pub fn from_model_name(name: &str) -> Option<Self> {
        let kind = match name {
            "ScatterModel" => Self::Scatter(ScatterOptions::default()),
            "LinesModel" => Self::Lines(LinesOptions::default()),
            "BarsModel" => Self::Bars(BarsOptions::default()),
            "HistModel" => Self::Hist(HistOptions::default()),
            "OHLCModel" => Self::Ohlc(OhlcOptions::default()),
            "GridHeatMapModel" => Self::HeatMap,
            "PieModel" => Self::Pie(PieOptions::default()),
            _ => return None,
        };
        Some(kind)
    }
}

/// Derived per-mark data consumed by the renderer and selectors.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkData {
    /// Scatter points.
    Points(Vec<PointDatum>),
    /// Polylines.
    Lines(Vec<LineDatum>),
    /// Bars with their stacked segments.
    Bars(Vec<BarDatum>),
    /// Histogram bins.
    Bins(Vec<Bin>),
    /// OHLC glyphs.
    Ohlc(Vec<OhlcDatum>),
    /// Heat map cells.
    Cells(Vec<CellDatum>),
    /// Pie slices.
    Slices(Vec<SliceDatum>),
}

impl MarkData {
    /// Number of selectable data items.
    pub fn len(&self) -> usize {
        match self {
            Self::Points(points) => points.len(),
            Self::Lines(lines) => lines.iter().map(|line| line.points.len()).max().unwrap_or(0),
            Self::Bars(bars) => bars.len(),
            Self::Bins(bins) => bins.len(),
            Self::Ohlc(glyphs) => glyphs.len(),
            Self::Cells(cells) => cells.len(),
            Self::Slices(slices) => slices.len(),
        }
    }

    /// Check whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capability of supplying partial domains to shared scales.
pub trait DomainContributor {
    /// Key under which contributions are stored.
    fn contributor_id(&self) -> ContributorId;

    /// Push (or relinquish) one contribution per bound scale.
    fn update_domains(&mut self, scales: &mut ScaleRegistry) -> Vec<DomainChanged>;

    /// Remove every contribution, e.g. when leaving the figure.
    fn release_domains(&self, scales: &mut ScaleRegistry) -> Vec<DomainChanged>;
}

/// A renderable data series.
#[derive(Debug, Clone)]
pub struct Mark {
    id: MarkId,
    name: String,
    kind: MarkKind,
    fields: BTreeMap<Channel, Values>,
    scales: BTreeMap<Channel, ScaleId>,
    views: BTreeMap<Channel, PixelScale>,
    preserve_domain: BTreeSet<Channel>,
    data: MarkData,
    selected: Option<Vec<usize>>,
    phase: UpdatePhase,
    visible: bool,
    model_id: Option<String>,
    draws: u64,
}

impl Mark {
    /// Create a mark of the given kind.
    pub fn new(kind: MarkKind) -> Self {
        let data = empty_data(&kind);
        let mut mark = Self {
            id: MarkId::next(),
            name: String::new(),
            kind,
            fields: BTreeMap::new(),
            scales: BTreeMap::new(),
            views: BTreeMap::new(),
            preserve_domain: BTreeSet::new(),
            data,
            selected: None,
            phase: UpdatePhase::Dirty,
            visible: true,
            model_id: None,
            draws: 0,
        };
        mark.update_data();
        mark
    }

    /// Create a scatter mark.
    pub fn scatter() -> Self {
        Self::new(MarkKind::Scatter(ScatterOptions::default()))
    }

    /// Create a lines mark.
    pub fn lines() -> Self {
        Self::new(MarkKind::Lines(LinesOptions::default()))
    }

    /// Create a bars mark.
    pub fn bars() -> Self {
        Self::new(MarkKind::Bars(BarsOptions::default()))
    }

    /// Create a histogram mark.
    pub fn hist(bins: usize) -> Self {
        Self::new(MarkKind::Hist(HistOptions {
            bins,
            ..HistOptions::default()
        }))
    }

    /// Create an OHLC mark.
    pub fn ohlc() -> Self {
        Self::new(MarkKind::Ohlc(OhlcOptions::default()))
    }

    /// Create a grid heat map mark.
    pub fn heatmap() -> Self {
        Self::new(MarkKind::HeatMap)
    }

    /// Create a pie mark.
    pub fn pie() -> Self {
        Self::new(MarkKind::Pie(PieOptions::default()))
    }

    /// Set a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set a channel's values.
    pub fn with_field(mut self, channel: Channel, values: impl Into<Values>) -> Self {
        self.set_field(channel, values.into());
        self
    }

    /// Bind a channel to a scale.
    pub fn with_scale(mut self, channel: Channel, scale: ScaleId) -> Self {
        self.scales.insert(channel, scale);
        self.phase = UpdatePhase::Dirty;
        self
    }

    /// Remember the widget model this mark was built from.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Access the mark identifier.
    pub fn id(&self) -> MarkId {
        self.id
    }

    /// Access the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Access the mark kind.
    pub fn kind(&self) -> &MarkKind {
        &self.kind
    }

    /// Replace kind options (for example histogram bin counts).
    pub fn set_kind(&mut self, kind: MarkKind) {
        self.kind = kind;
        self.phase = UpdatePhase::Dirty;
    }

    /// Access the widget model id, if any.
    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    /// Access a channel's raw values.
    pub fn field(&self, channel: Channel) -> Option<&Values> {
        self.fields.get(&channel)
    }

    /// Replace a channel's raw values and mark the data stale.
    pub fn set_field(&mut self, channel: Channel, values: Values) {
        self.fields.insert(channel, values);
        self.phase = UpdatePhase::Dirty;
    }

    /// Access the scale bound to a channel.
    pub fn scale(&self, channel: Channel) -> Option<ScaleId> {
        self.scales.get(&channel).copied()
    }

    /// Iterate over channel → scale bindings.
    pub fn scales(&self) -> impl Iterator<Item = (Channel, ScaleId)> + '_ {
        self.scales.iter().map(|(channel, scale)| (*channel, *scale))
    }

    /// Bind or unbind a channel's scale.
    pub fn set_scale(&mut self, channel: Channel, scale: Option<ScaleId>) {
        match scale {
            Some(scale) => {
                self.scales.insert(channel, scale);
            }
            None => {
                self.scales.remove(&channel);
            }
        }
        self.phase = UpdatePhase::Dirty;
    }

    /// Access this mark's own view of a channel's scale.
    pub fn view(&self, channel: Channel) -> Option<&PixelScale> {
        self.views.get(&channel)
    }

    /// Create, refresh, or drop views so they match the bound scales.
    pub(crate) fn sync_views(&mut self, scales: &ScaleRegistry) {
        let bound = &self.scales;
        self.views
            .retain(|channel, view| bound.get(channel) == Some(&view.scale_id()));
        for (channel, scale) in &self.scales {
            let Some(model) = scales.get(*scale) else {
                continue;
            };
            self.views
                .entry(*channel)
                .and_modify(|view| view.sync(model))
                .or_insert_with(|| PixelScale::new(model));
        }
    }

    /// Refresh the views of every channel bound to `model`. Returns whether
    /// any channel uses the scale.
    pub(crate) fn sync_scale(&mut self, model: &ScaleModel) -> bool {
        let mut bound = false;
        for (channel, view) in &mut self.views {
            if self.scales.get(channel) == Some(&model.id()) {
                view.sync(model);
                bound = true;
            }
        }
        bound
    }

    /// Set the pixel range of one channel's view.
    pub(crate) fn set_view_range(&mut self, channel: Channel, range: [f64; 2], padding: f64) {
        if let Some(view) = self.views.get_mut(&channel) {
            view.set_range(range, padding);
        }
    }

    /// Stop (or resume) driving a channel's scale domain.
    pub fn set_preserve_domain(&mut self, channel: Channel, preserve: bool) {
        if preserve {
            self.preserve_domain.insert(channel);
        } else {
            self.preserve_domain.remove(&channel);
        }
        self.phase = UpdatePhase::Dirty;
    }

    /// Check whether a channel's scale domain is preserved.
    pub fn preserves_domain(&self, channel: Channel) -> bool {
        self.preserve_domain.contains(&channel)
    }

    /// Access the derived data.
    pub fn mark_data(&self) -> &MarkData {
        &self.data
    }

    /// Access the selected indices.
    pub fn selected(&self) -> Option<&[usize]> {
        self.selected.as_deref()
    }

    /// Access the update phase.
    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    /// Check whether the mark is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Toggle mark visibility.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Number of draws performed for this mark.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub(crate) fn record_draw(&mut self) {
        self.draws += 1;
    }

    pub(crate) fn finish_update(&mut self) {
        self.phase = UpdatePhase::Clean;
    }

    /// Pixel padding requested on positional scales (marker radius).
    pub fn padding_request(&self) -> f64 {
        match &self.kind {
            MarkKind::Scatter(options) => options.default_size.max(0.0).sqrt() * 0.5,
            _ => 0.0,
        }
    }

    /// Band padding applied to an ordinal x scale.
    pub fn band_padding(&self) -> f64 {
        match &self.kind {
            MarkKind::Bars(options) => options.padding,
            _ => 0.0,
        }
    }

    /// Recompute `mark_data` from the raw fields.
    ///
    /// All channels are truncated to the shortest non-empty field, so fields
    /// that update one after another never index out of range.
    pub fn update_data(&mut self) {
        self.data = match &self.kind {
            MarkKind::Scatter(_) => MarkData::Points(scatter::build(&self.fields)),
            MarkKind::Lines(_) => MarkData::Lines(lines::build(&self.fields)),
            MarkKind::Bars(options) => MarkData::Bars(bars::build(&self.fields, options)),
            MarkKind::Hist(options) => MarkData::Bins(hist::build(&self.fields, options)),
            MarkKind::Ohlc(options) => MarkData::Ohlc(ohlc::build(&self.fields, options)),
            MarkKind::HeatMap => MarkData::Cells(heatmap::build(&self.fields)),
            MarkKind::Pie(options) => MarkData::Slices(pie::build(&self.fields, options)),
        };
        if let Some(selected) = self.selected.as_mut() {
            let len = self.data.len();
            selected.retain(|index| *index < len);
        }
    }

    /// Values this mark contributes per channel, derived from `mark_data`.
    pub fn domain_contributions(&self) -> BTreeMap<Channel, Values> {
        match &self.data {
            MarkData::Points(points) => scatter::contributions(points),
            MarkData::Lines(lines) => lines::contributions(lines),
            MarkData::Bars(bars) => match &self.kind {
                MarkKind::Bars(options) => bars::contributions(bars, options),
                _ => BTreeMap::new(),
            },
            MarkData::Bins(bins) => hist::contributions(bins),
            MarkData::Ohlc(glyphs) => ohlc::contributions(glyphs),
            MarkData::Cells(cells) => heatmap::contributions(cells),
            MarkData::Slices(slices) => pie::contributions(slices),
        }
    }

    pub(crate) fn set_selected_indices(&mut self, selected: Option<Vec<usize>>) {
        self.selected = selected;
    }

    /// Value at a data index on a positional channel, for selection tests.
    /// Multi-line marks answer with their first line.
    pub(crate) fn position(&self, index: usize, channel: Channel) -> Option<Value> {
        match (&self.data, channel) {
            (MarkData::Points(points), Channel::X) => points.get(index).map(|p| p.x.clone()),
            (MarkData::Points(points), Channel::Y) => points.get(index).map(|p| p.y.clone()),
            (MarkData::Lines(lines), Channel::X) => {
                lines.first()?.points.get(index).map(|(x, _)| x.clone())
            }
            (MarkData::Lines(lines), Channel::Y) => {
                lines.first()?.points.get(index).map(|(_, y)| Value::Number(*y))
            }
            (MarkData::Bars(bars), Channel::X) => bars.get(index).map(|bar| bar.x.clone()),
            (MarkData::Bins(bins), Channel::X | Channel::Sample) => {
                bins.get(index).map(|bin| Value::Number((bin.x0 + bin.x1) * 0.5))
            }
            (MarkData::Ohlc(glyphs), Channel::X) => glyphs.get(index).map(|g| g.x.clone()),
            (MarkData::Cells(cells), Channel::X) => cells.get(index).map(|c| c.x.clone()),
            (MarkData::Cells(cells), Channel::Y) => cells.get(index).map(|c| c.y.clone()),
            _ => None,
        }
    }

    /// Scale bound to the horizontal position channel.
    pub(crate) fn x_scale(&self) -> Option<ScaleId> {
        self.scale(Channel::X).or_else(|| self.scale(Channel::Sample))
    }
}

impl DomainContributor for Mark {
    fn contributor_id(&self) -> ContributorId {
        self.id.into()
    }

    fn update_domains(&mut self, scales: &mut ScaleRegistry) -> Vec<DomainChanged> {
        let contributions = self.domain_contributions();
        let contributor = self.contributor_id();
        let mut changes = Vec::new();
        for (channel, scale) in &self.scales {
            let Some(model) = scales.get_mut(*scale) else {
                tracing::warn!(mark = ?self.id, channel = channel.name(), scale = ?scale, "mark bound to unknown scale; skipping");
                continue;
            };
            let change = if self.preserve_domain.contains(channel) {
                model.del_domain(contributor)
            } else {
                match contributions.get(channel) {
                    Some(values) => model.compute_and_set_domain(values, contributor),
                    None => model.set_domain(PartialDomain::Empty, contributor),
                }
            };
            changes.extend(change);
        }
        self.phase = UpdatePhase::DomainsRecomputed;
        changes
    }

    fn release_domains(&self, scales: &mut ScaleRegistry) -> Vec<DomainChanged> {
        let contributor = self.contributor_id();
        let mut changes = Vec::new();
        for scale in self.scales.values() {
            if let Some(model) = scales.get_mut(*scale) {
                changes.extend(model.del_domain(contributor));
            }
        }
        changes
    }
}

/// Collect values into a channel, as labels if any value is categorical.
pub(crate) fn values_of<'a>(values: impl IntoIterator<Item = &'a Value>) -> Values {
    let values: Vec<&Value> = values.into_iter().collect();
    if values.iter().any(|value| matches!(value, Value::Label(_))) {
        Values::Labels(values.into_iter().map(Value::to_label).collect())
    } else {
        Values::Numbers(values.into_iter().filter_map(Value::as_number).collect())
    }
}

fn empty_data(kind: &MarkKind) -> MarkData {
    match kind {
        MarkKind::Scatter(_) => MarkData::Points(Vec::new()),
        MarkKind::Lines(_) => MarkData::Lines(Vec::new()),
        MarkKind::Bars(_) => MarkData::Bars(Vec::new()),
        MarkKind::Hist(_) => MarkData::Bins(Vec::new()),
        MarkKind::Ohlc(_) => MarkData::Ohlc(Vec::new()),
        MarkKind::HeatMap => MarkData::Cells(Vec::new()),
        MarkKind::Pie(_) => MarkData::Slices(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::scale::ScaleModel;

    #[test]
    fn two_scatters_share_an_x_scale() {
        let mut scales = ScaleRegistry::new();
        let x = scales.insert(ScaleModel::linear());
        let mut a = Mark::scatter()
            .with_field(Channel::X, vec![0.0, 1.0])
            .with_field(Channel::Y, vec![0.0, 0.0])
            .with_scale(Channel::X, x);
        let mut b = Mark::scatter()
            .with_field(Channel::X, vec![0.5, 2.0])
            .with_field(Channel::Y, vec![1.0, 1.0])
            .with_scale(Channel::X, x);
        a.update_data();
        a.update_domains(&mut scales);
        b.update_data();
        b.update_domains(&mut scales);
        assert_eq!(
            scales.get(x).unwrap().domain(),
            &Domain::Continuous { min: 0.0, max: 2.0 }
        );
    }

    #[test]
    fn preserve_domain_relinquishes_contribution() {
        let mut scales = ScaleRegistry::new();
        let x = scales.insert(ScaleModel::linear());
        let mut mark = Mark::scatter()
            .with_field(Channel::X, vec![1.0, 3.0])
            .with_field(Channel::Y, vec![0.0, 0.0])
            .with_scale(Channel::X, x);
        mark.update_data();
        mark.update_domains(&mut scales);
        assert_eq!(scales.get(x).unwrap().contributor_count(), 1);

        mark.set_preserve_domain(Channel::X, true);
        let changes = mark.update_domains(&mut scales);
        assert_eq!(changes.len(), 1);
        assert_eq!(scales.get(x).unwrap().contributor_count(), 0);
        assert!(scales.get(x).unwrap().domain().is_empty());
    }

    #[test]
    fn truncates_to_shortest_field() {
        let mut mark = Mark::scatter()
            .with_field(Channel::X, vec![0.0, 1.0, 2.0])
            .with_field(Channel::Y, vec![5.0, 6.0]);
        mark.update_data();
        assert_eq!(mark.mark_data().len(), 2);
    }

    #[test]
    fn phases_follow_update_cycle() {
        let mut scales = ScaleRegistry::new();
        let mut mark = Mark::scatter().with_field(Channel::X, vec![1.0]);
        assert_eq!(mark.phase(), UpdatePhase::Dirty);
        mark.update_data();
        mark.update_domains(&mut scales);
        assert_eq!(mark.phase(), UpdatePhase::DomainsRecomputed);
        mark.finish_update();
        assert_eq!(mark.phase(), UpdatePhase::Clean);
    }

    #[test]
    fn missing_scale_is_skipped() {
        let mut other = ScaleRegistry::new();
        let dangling = other.insert(ScaleModel::linear());
        let mut scales = ScaleRegistry::new();
        let mut mark = Mark::scatter()
            .with_field(Channel::X, vec![1.0])
            .with_scale(Channel::X, dangling);
        mark.update_data();
        assert!(mark.update_domains(&mut scales).is_empty());
    }

    #[test]
    fn selection_is_clamped_after_data_shrinks() {
        let mut mark = Mark::scatter()
            .with_field(Channel::X, vec![0.0, 1.0, 2.0])
            .with_field(Channel::Y, vec![0.0, 1.0, 2.0]);
        mark.update_data();
        mark.set_selected_indices(Some(vec![0, 2]));
        mark.set_field(Channel::X, Values::Numbers(vec![0.0, 1.0]));
        mark.update_data();
        assert_eq!(mark.selected(), Some(&[0][..]));
    }
}
