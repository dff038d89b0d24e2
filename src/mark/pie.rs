use std::collections::BTreeMap;

use crate::data::{Value, Values};

use super::{Channel, values_of};

/// Pie options. Angles are in degrees, clockwise from twelve o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PieOptions {
    /// Angle of the first slice edge.
    pub start_angle: f64,
    /// Angle of the last slice edge.
    pub end_angle: f64,
    /// Order slices by decreasing size.
    pub sort: bool,
    /// Outer radius in pixels.
    pub radius: f64,
    /// Inner radius in pixels (donut hole).
    pub inner_radius: f64,
}

impl Default for PieOptions {
    fn default() -> Self {
        Self {
            start_angle: 0.0,
            end_angle: 360.0,
            sort: false,
            radius: 180.0,
            inner_radius: 0.1,
        }
    }
}

/// One pie slice. Angles are in radians, clockwise from twelve o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceDatum {
    /// Index into the raw fields.
    pub index: usize,
    /// Raw size value.
    pub value: f64,
    /// Leading edge angle.
    pub start_angle: f64,
    /// Trailing edge angle.
    pub end_angle: f64,
    /// Color value, when a color channel is set.
    pub color: Option<Value>,
}

pub(super) fn build(fields: &BTreeMap<Channel, Values>, options: &PieOptions) -> Vec<SliceDatum> {
    let Some(Values::Numbers(sizes)) = fields.get(&Channel::Size) else {
        return Vec::new();
    };
    let color = fields.get(&Channel::Color).filter(|values| !values.is_empty());
    let len = color.map_or(sizes.len(), |color| sizes.len().min(color.len()));
    let weight = |value: f64| if value.is_finite() { value.max(0.0) } else { 0.0 };
    let total: f64 = sizes.iter().take(len).copied().map(weight).sum();

    let mut order: Vec<usize> = (0..len).collect();
    if options.sort {
        order.sort_by(|a, b| sizes[*b].total_cmp(&sizes[*a]));
    }

    let start = options.start_angle.to_radians();
    let sweep = (options.end_angle - options.start_angle).to_radians();
    let mut angle = start;
    let mut slices: Vec<SliceDatum> = order
        .into_iter()
        .map(|index| {
            let value = sizes[index];
            let share = if total > 0.0 { weight(value) / total } else { 0.0 };
            let start_angle = angle;
            angle += share * sweep;
            SliceDatum {
                index,
                value,
                start_angle,
                end_angle: angle,
                color: color.and_then(|values| values.get(index)),
            }
        })
        .collect();
    slices.sort_by_key(|slice| slice.index);
    slices
}

pub(super) fn contributions(slices: &[SliceDatum]) -> BTreeMap<Channel, Values> {
    let mut out = BTreeMap::new();
    let colors: Vec<&Value> = slices.iter().filter_map(|s| s.color.as_ref()).collect();
    if !colors.is_empty() {
        out.insert(Channel::Color, values_of(colors));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;

    #[test]
    fn slices_cover_full_circle() {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::Size, Values::Numbers(vec![1.0, 3.0, -2.0]));
        let slices = build(&fields, &PieOptions::default());
        assert_eq!(slices.len(), 3);
        assert!((slices[1].end_angle - TAU).abs() < 1e-9);
        assert!((slices[0].end_angle - TAU / 4.0).abs() < 1e-9);
        assert_eq!(slices[2].start_angle, slices[2].end_angle);
    }

    #[test]
    fn sorted_slices_start_with_largest() {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::Size, Values::Numbers(vec![1.0, 3.0]));
        let options = PieOptions {
            sort: true,
            ..PieOptions::default()
        };
        let slices = build(&fields, &options);
        assert_eq!(slices[1].start_angle, 0.0);
        assert!((slices[0].start_angle - TAU * 0.75).abs() < 1e-9);
    }
}
