//! Pan and zoom interaction.
//!
//! Gestures are applied by writing explicit `min`/`max` bounds onto the
//! affected scale models, so every mark and axis sharing a scale follows.
//! Resetting restores the bounds the scales had before the first gesture.

use std::collections::BTreeMap;

use crate::domain::Extent;
use crate::geom::{Point, PlotArea};
use crate::scale::{DomainChanged, ScaleId, ScaleRegistry};
use crate::selector::SelectorId;

/// The interaction currently driving pointer input on a figure.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Drag pans, wheel zooms.
    PanZoom(PanZoom),
    /// Drag feeds a selector.
    Selector(SelectorId),
}

/// Pan/zoom over a set of horizontal and vertical scales.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanZoom {
    x_scales: Vec<ScaleId>,
    y_scales: Vec<ScaleId>,
    allow_pan: bool,
    allow_zoom: bool,
    saved: BTreeMap<ScaleId, (Option<f64>, Option<f64>)>,
}

impl PanZoom {
    /// Create a pan/zoom over the given scales.
    pub fn new(x_scales: Vec<ScaleId>, y_scales: Vec<ScaleId>) -> Self {
        Self {
            x_scales,
            y_scales,
            allow_pan: true,
            allow_zoom: true,
            saved: BTreeMap::new(),
        }
    }

    /// Enable or disable panning.
    pub fn with_pan(mut self, allow_pan: bool) -> Self {
        self.allow_pan = allow_pan;
        self
    }

    /// Enable or disable zooming.
    pub fn with_zoom(mut self, allow_zoom: bool) -> Self {
        self.allow_zoom = allow_zoom;
        self
    }

    /// Horizontal scales.
    pub fn x_scales(&self) -> &[ScaleId] {
        &self.x_scales
    }

    /// Vertical scales.
    pub fn y_scales(&self) -> &[ScaleId] {
        &self.y_scales
    }

    /// Shift the domains by a pixel drag delta.
    pub fn pan(
        &mut self,
        scales: &mut ScaleRegistry,
        delta: Point,
        area: PlotArea,
    ) -> Vec<DomainChanged> {
        if !self.allow_pan {
            return Vec::new();
        }
        let mut changes = Vec::new();
        for (ids, pixels, length) in [
            (self.x_scales.clone(), -delta.x, area.width),
            (self.y_scales.clone(), delta.y, area.height),
        ] {
            if length <= 0.0 {
                continue;
            }
            for id in ids {
                changes.extend(self.rewrite(scales, id, |extent, reverse| {
                    let sign = if reverse { -1.0 } else { 1.0 };
                    let shift = sign * pixels / length * extent.span();
                    Extent {
                        min: extent.min + shift,
                        max: extent.max + shift,
                    }
                }));
            }
        }
        changes
    }

    /// Scale the domains around a plot-area pixel; `factor > 1` zooms out.
    pub fn zoom(
        &mut self,
        scales: &mut ScaleRegistry,
        center: Point,
        factor: f64,
        area: PlotArea,
    ) -> Vec<DomainChanged> {
        if !self.allow_zoom || !factor.is_finite() || factor <= 0.0 {
            return Vec::new();
        }
        let mut changes = Vec::new();
        for (ids, t) in [
            (self.x_scales.clone(), fraction(center.x, area.width)),
            (self.y_scales.clone(), 1.0 - fraction(center.y, area.height)),
        ] {
            for id in ids {
                changes.extend(self.rewrite(scales, id, |extent, reverse| {
                    let t = if reverse { 1.0 - t } else { t };
                    let pivot = extent.min + t * extent.span();
                    Extent {
                        min: pivot + (extent.min - pivot) * factor,
                        max: pivot + (extent.max - pivot) * factor,
                    }
                }));
            }
        }
        changes
    }

    /// Restore the bounds saved before the first gesture.
    pub fn reset(&mut self, scales: &mut ScaleRegistry) -> Vec<DomainChanged> {
        let saved = std::mem::take(&mut self.saved);
        saved
            .into_iter()
            .filter_map(|(id, (min, max))| {
                let model = scales.get_mut(id)?;
                let first = model.set_min(min);
                model.set_max(max).or(first)
            })
            .collect()
    }

    fn rewrite(
        &mut self,
        scales: &mut ScaleRegistry,
        id: ScaleId,
        map: impl Fn(Extent, bool) -> Extent,
    ) -> Option<DomainChanged> {
        let model = scales.get_mut(id)?;
        let kind = model.kind();
        if kind.is_ordinal() {
            return None;
        }
        let extent = model.domain().extent()?;
        let working = Extent {
            min: kind.map_value(extent.min)?,
            max: kind.map_value(extent.max)?,
        };
        let next = map(working, model.config().reverse);
        let min = kind.invert_value(next.min)?;
        let max = kind.invert_value(next.max)?;
        self.saved
            .entry(id)
            .or_insert((model.config().min, model.config().max));
        let first = model.set_min(Some(min));
        model.set_max(Some(max)).or(first)
    }
}

/// Compute a zoom factor from a drag delta and axis length.
pub fn zoom_factor_from_drag(delta_pixels: f32, axis_pixels: f32) -> f64 {
    if axis_pixels <= 0.0 {
        return 1.0;
    }
    let normalized = delta_pixels as f64 / axis_pixels as f64;
    (1.0 - normalized).clamp(0.1, 10.0)
}

fn fraction(pixel: f64, length: f64) -> f64 {
    if length <= 0.0 { 0.5 } else { pixel / length }
}
