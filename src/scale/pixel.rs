//! Scale views: concrete mappings from a resolved domain to pixels.
//!
//! Every mark, axis, and selector owns its own [`PixelScale`] for each scale it
//! references, so padding and expansion are local to the owner while the
//! domain stays shared through the [`ScaleModel`].

use crate::data::Value;
use crate::domain::{Domain, Extent};
use crate::render::Color;

use super::color::{gradient_stops, interpolate, palette};
use super::model::{ScaleId, ScaleModel};
use super::ticks::{date_ticks, linear_ticks, log_ticks};
use super::ScaleKind;

/// Capability of mapping domain values onto a pixel range.
pub trait PixelMapper {
    /// Establish the pixel range; ordinal scales use `padding` for bands.
    fn set_range(&mut self, range: [f64; 2], padding: f64);

    /// Recompute the domain so values keep their pixel offsets when the
    /// range moves from `old_range` to `new_range`.
    fn expand_domain(&mut self, old_range: [f64; 2], new_range: [f64; 2]);

    /// Map a value to a pixel position.
    fn scale(&self, value: &Value) -> Option<f64>;

    /// Map a pixel position back into the domain.
    fn invert(&self, pixel: f64) -> Option<Value>;
}

/// A scale view bound to one scale model.
#[derive(Debug, Clone)]
pub struct PixelScale {
    scale: ScaleId,
    kind: ScaleKind,
    reverse: bool,
    divergent: bool,
    model_domain: Domain,
    domain: Domain,
    range: [f64; 2],
    inner_padding: f64,
    outer_padding: f64,
    colors: Vec<Color>,
}

impl PixelScale {
    /// Create a view of a scale model with a unit range.
    pub fn new(model: &ScaleModel) -> Self {
        let mut view = Self {
            scale: model.id(),
            kind: model.kind(),
            reverse: false,
            divergent: false,
            model_domain: Domain::Empty,
            domain: Domain::Empty,
            range: [0.0, 1.0],
            inner_padding: 0.0,
            outer_padding: 0.0,
            colors: Vec::new(),
        };
        view.sync(model);
        view
    }

    /// Pull the resolved domain and options from the model.
    ///
    /// Any previous expansion is discarded.
    pub fn sync(&mut self, model: &ScaleModel) {
        let config = model.config();
        self.reverse = config.reverse;
        self.divergent = config.divergent;
        self.model_domain = model.domain().clone();
        self.domain = self.model_domain.clone();
        self.colors = if self.kind.is_ordinal() {
            palette(&config.colors)
        } else {
            gradient_stops(&config.colors, config.divergent)
        };
    }

    /// Access the scale identifier.
    pub fn scale_id(&self) -> ScaleId {
        self.scale
    }

    /// Access the scale type.
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Access the effective domain (after any expansion).
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Access the pixel range.
    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Width of one ordinal band; zero for continuous scales.
    pub fn band_width(&self) -> f64 {
        match self.band_layout() {
            Some(layout) => layout.band,
            None => 0.0,
        }
    }

    /// Pixel position of a value's centre (band centre for ordinal scales).
    pub fn scale_center(&self, value: &Value) -> Option<f64> {
        Some(self.scale(value)? + self.band_width() * 0.5)
    }

    /// Map a number to a pixel position.
    pub fn scale_number(&self, value: f64) -> Option<f64> {
        self.scale(&Value::Number(value))
    }

    /// Map a value to a color on color scales.
    pub fn color(&self, value: &Value) -> Option<Color> {
        if self.kind.is_ordinal() {
            let labels = self.domain.labels()?;
            let label = value.to_label();
            let index = labels.iter().position(|existing| *existing == label)?;
            return self.colors.get(index % self.colors.len().max(1)).copied();
        }
        let value = value.as_number()?;
        let t = match self.domain {
            Domain::Continuous { min, max } => normalized(value, min, max),
            Domain::Divergent { min, mid, max } => {
                if value < mid {
                    0.5 * normalized(value, min, mid)
                } else {
                    0.5 + 0.5 * normalized(value, mid, max)
                }
            }
            _ => return None,
        };
        interpolate(&self.colors, t)
    }

    /// Tick values for the effective domain.
    pub fn ticks(&self, count: usize) -> Vec<Value> {
        if let Some(labels) = self.domain.labels() {
            return labels.iter().cloned().map(Value::Label).collect();
        }
        let Some(extent) = self.domain.extent() else {
            return Vec::new();
        };
        let values = match self.kind {
            ScaleKind::Log => log_ticks(extent.min, extent.max, count),
            ScaleKind::Date | ScaleKind::DateColor => date_ticks(extent.min, extent.max, count),
            _ => linear_ticks(extent.min, extent.max, count),
        };
        values.into_iter().map(Value::Number).collect()
    }

    fn working_extent(&self, domain: &Domain) -> Option<Extent> {
        let extent = domain.extent()?;
        let min = self.kind.map_value(extent.min)?;
        let max = self.kind.map_value(extent.max)?;
        Some(Extent { min, max })
    }

    fn oriented_range(&self, range: [f64; 2]) -> [f64; 2] {
        if self.reverse {
            [range[1], range[0]]
        } else {
            range
        }
    }

    fn band_layout(&self) -> Option<BandLayout> {
        let count = self.domain.labels()?.len();
        BandLayout::new(count, self.range, self.inner_padding, self.outer_padding)
    }
}

impl PixelMapper for PixelScale {
    fn set_range(&mut self, range: [f64; 2], padding: f64) {
        self.range = range;
        if self.kind.is_ordinal() {
            self.inner_padding = padding;
            self.outer_padding = padding * 0.5;
        }
    }

    fn expand_domain(&mut self, old_range: [f64; 2], new_range: [f64; 2]) {
        if self.kind.is_ordinal() {
            let count = self.model_domain.labels().map_or(0, <[String]>::len);
            let outer_padding = match BandLayout::new(count, old_range, 0.0, 0.0) {
                Some(layout) if layout.band > 0.0 => {
                    ((new_range[1] - old_range[1]) / layout.band).abs()
                }
                _ => 0.0,
            };
            self.range = new_range;
            self.inner_padding = 0.0;
            self.outer_padding = outer_padding;
            return;
        }

        self.domain = self.model_domain.clone();
        if old_range == new_range {
            return;
        }
        let Some(working) = self.working_extent(&self.model_domain) else {
            return;
        };
        let old = self.oriented_range(old_range);
        let span = old[1] - old[0];
        if span == 0.0 {
            return;
        }
        let invert = |pixel: f64| -> Option<f64> {
            let t = (pixel - old[0]) / span;
            self.kind
                .invert_value(working.min * (1.0 - t) + working.max * t)
        };
        if let (Some(a), Some(b)) = (invert(new_range[0]), invert(new_range[1])) {
            let extent = Extent::new(a, b);
            // The midpoint is a data value, so it keeps its pixel as is.
            self.domain = match self.model_domain {
                Domain::Divergent { mid, .. } => Domain::Divergent {
                    min: extent.min,
                    mid,
                    max: extent.max,
                },
                _ => Domain::Continuous {
                    min: extent.min,
                    max: extent.max,
                },
            };
        }
    }

    fn scale(&self, value: &Value) -> Option<f64> {
        if self.kind.is_ordinal() {
            let labels = self.domain.labels()?;
            let label = value.to_label();
            let index = labels.iter().position(|existing| *existing == label)?;
            return Some(self.band_layout()?.start(index));
        }
        let working = self.working_extent(&self.domain)?;
        let mapped = self.kind.map_value(value.as_number()?)?;
        let [r0, r1] = self.oriented_range(self.range);
        let span = working.span();
        if span == 0.0 {
            return Some((r0 + r1) * 0.5);
        }
        let t = (mapped - working.min) / span;
        Some(r0 * (1.0 - t) + r1 * t)
    }

    fn invert(&self, pixel: f64) -> Option<Value> {
        if self.kind.is_ordinal() {
            let labels = self.domain.labels()?;
            let layout = self.band_layout()?;
            let index = layout.nearest(pixel)?;
            return labels.get(index).cloned().map(Value::Label);
        }
        let working = self.working_extent(&self.domain)?;
        let [r0, r1] = self.oriented_range(self.range);
        let span = r1 - r0;
        if span == 0.0 {
            return None;
        }
        let t = (pixel - r0) / span;
        let value = self
            .kind
            .invert_value(working.min * (1.0 - t) + working.max * t)?;
        Some(Value::Number(value))
    }
}

fn normalized(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0 {
        return 0.5;
    }
    (value - min) / span
}

/// Band positions of an ordinal range.
#[derive(Debug, Clone, Copy)]
struct BandLayout {
    first: f64,
    step: f64,
    band: f64,
    count: usize,
}

impl BandLayout {
    fn new(count: usize, range: [f64; 2], inner: f64, outer: f64) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let denominator = count as f64 - inner + 2.0 * outer;
        if denominator <= 0.0 {
            return None;
        }
        let step = (range[1] - range[0]) / denominator;
        Some(Self {
            first: range[0] + step * outer,
            step,
            band: (step * (1.0 - inner)).abs(),
            count,
        })
    }

    fn start(&self, index: usize) -> f64 {
        let start = self.first + self.step * index as f64;
        if self.step < 0.0 {
            start - self.band
        } else {
            start
        }
    }

    fn nearest(&self, pixel: f64) -> Option<usize> {
        (0..self.count).min_by(|a, b| {
            let da = (self.start(*a) + self.band * 0.5 - pixel).abs();
            let db = (self.start(*b) + self.band * 0.5 - pixel).abs();
            da.total_cmp(&db)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Values;
    use crate::scale::ContributorId;

    fn linear_view(min: f64, max: f64) -> PixelScale {
        let mut model = ScaleModel::linear();
        model.compute_and_set_domain(&Values::Numbers(vec![min, max]), ContributorId::new(1));
        PixelScale::new(&model)
    }

    #[test]
    fn linear_maps_and_inverts() {
        let mut view = linear_view(0.0, 10.0);
        view.set_range([0.0, 200.0], 0.0);
        assert_eq!(view.scale_number(5.0), Some(100.0));
        assert_eq!(view.invert(50.0), Some(Value::Number(2.5)));
    }

    #[test]
    fn reverse_flips_pixels() {
        let mut model = ScaleModel::linear();
        model.set_reverse(true);
        model.compute_and_set_domain(&Values::Numbers(vec![0.0, 10.0]), ContributorId::new(1));
        let mut view = PixelScale::new(&model);
        view.set_range([0.0, 100.0], 0.0);
        assert_eq!(view.scale_number(0.0), Some(100.0));
        assert_eq!(view.scale_number(10.0), Some(0.0));
    }

    #[test]
    fn expand_domain_with_same_range_is_identity() {
        let mut view = linear_view(0.3, 0.7);
        view.set_range([10.0, 390.0], 0.0);
        let before = view.domain().clone();
        view.expand_domain([10.0, 390.0], [10.0, 390.0]);
        assert_eq!(view.domain(), &before);
    }

    #[test]
    fn expand_domain_keeps_values_at_pixels() {
        let mut view = linear_view(0.0, 10.0);
        view.expand_domain([10.0, 110.0], [0.0, 120.0]);
        view.set_range([0.0, 120.0], 0.0);
        let extent = view.domain().extent().unwrap();
        assert!((extent.min - -1.0).abs() < 1e-9);
        assert!((extent.max - 11.0).abs() < 1e-9);
        assert!((view.scale_number(0.0).unwrap() - 10.0).abs() < 1e-9);
        assert!((view.scale_number(10.0).unwrap() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn expand_domain_on_reversed_scale() {
        let mut model = ScaleModel::linear();
        model.set_reverse(true);
        model.compute_and_set_domain(&Values::Numbers(vec![0.0, 10.0]), ContributorId::new(1));
        let mut view = PixelScale::new(&model);
        view.expand_domain([10.0, 110.0], [0.0, 120.0]);
        view.set_range([0.0, 120.0], 0.0);
        assert!((view.scale_number(0.0).unwrap() - 110.0).abs() < 1e-9);
        assert!((view.scale_number(10.0).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn expand_domain_keeps_divergent_midpoint() {
        let mut model = ScaleModel::color();
        model.set_divergent(true);
        model.set_mid(Some(2.0));
        model.compute_and_set_domain(&Values::Numbers(vec![0.0, 10.0]), ContributorId::new(1));
        let mut view = PixelScale::new(&model);
        view.expand_domain([10.0, 110.0], [0.0, 120.0]);
        let Domain::Divergent { min, mid, max } = *view.domain() else {
            panic!("expected a divergent domain");
        };
        assert!((min - -1.0).abs() < 1e-9);
        assert_eq!(mid, 2.0);
        assert!((max - 11.0).abs() < 1e-9);
    }

    #[test]
    fn log_rejects_non_positive_values() {
        let mut model = ScaleModel::log();
        model.compute_and_set_domain(&Values::Numbers(vec![1.0, 100.0]), ContributorId::new(1));
        let mut view = PixelScale::new(&model);
        view.set_range([0.0, 100.0], 0.0);
        assert_eq!(view.scale_number(10.0), Some(50.0));
        assert!(view.scale_number(0.0).is_none());
    }

    #[test]
    fn ordinal_bands_with_padding() {
        let mut model = ScaleModel::ordinal();
        model.compute_and_set_domain(&Values::from(vec!["a", "b"]), ContributorId::new(1));
        let mut view = PixelScale::new(&model);
        view.set_range([0.0, 100.0], 0.0);
        assert_eq!(view.scale(&Value::Label("b".into())), Some(50.0));
        assert_eq!(view.band_width(), 50.0);
        assert_eq!(view.invert(80.0), Some(Value::Label("b".into())));

        view.set_range([0.0, 100.0], 0.5);
        // step = 100 / (2 - 0.5 + 0.5) = 50, band = 25, outer = 12.5
        assert_eq!(view.scale(&Value::Label("a".into())), Some(12.5));
        assert_eq!(view.band_width(), 25.0);
    }

    #[test]
    fn ordinal_expand_without_bands_has_no_padding() {
        let model = ScaleModel::ordinal();
        let mut view = PixelScale::new(&model);
        view.expand_domain([0.0, 100.0], [0.0, 120.0]);
        assert_eq!(view.range(), [0.0, 120.0]);
        assert_eq!(view.band_width(), 0.0);
    }

    #[test]
    fn ordinal_expand_sets_outer_padding() {
        let mut model = ScaleModel::ordinal();
        model.compute_and_set_domain(&Values::from(vec!["a", "b"]), ContributorId::new(1));
        let mut view = PixelScale::new(&model);
        view.expand_domain([0.0, 100.0], [0.0, 150.0]);
        // outer padding = 50 / 50 = 1 step on each side: step = 150 / 4
        assert!((view.band_width() - 37.5).abs() < 1e-9);
    }

    #[test]
    fn color_scale_interpolates() {
        let mut model = ScaleModel::color();
        model.compute_and_set_domain(&Values::Numbers(vec![0.0, 1.0]), ContributorId::new(1));
        let view = PixelScale::new(&model);
        let low = view.color(&Value::Number(0.0)).unwrap();
        let high = view.color(&Value::Number(1.0)).unwrap();
        assert_ne!(low, high);
        assert!(view.color(&Value::Label("x".into())).is_none());
    }
}
