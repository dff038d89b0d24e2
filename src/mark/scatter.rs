use std::collections::BTreeMap;

use crate::data::{Value, Values, common_length};
use crate::render::MarkerShape;

use super::{Channel, values_of};

/// Scatter options.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterOptions {
    /// Marker area in square pixels when no size scale applies.
    pub default_size: f64,
    /// Marker opacity when no opacity scale applies.
    pub default_opacity: f64,
    /// Marker shape.
    pub marker: MarkerShape,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            default_size: 64.0,
            default_opacity: 1.0,
            marker: MarkerShape::Circle,
        }
    }
}

/// One scatter point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointDatum {
    /// Index into the raw fields.
    pub index: usize,
    /// Horizontal value.
    pub x: Value,
    /// Vertical value.
    pub y: Value,
    /// Color value, when a color channel is set.
    pub color: Option<Value>,
    /// Size value, when a size channel is set.
    pub size: Option<f64>,
    /// Opacity value, when an opacity channel is set.
    pub opacity: Option<f64>,
    /// Rotation value, when a rotation channel is set.
    pub rotation: Option<f64>,
}

const CHANNELS: [Channel; 6] = [
    Channel::X,
    Channel::Y,
    Channel::Color,
    Channel::Size,
    Channel::Opacity,
    Channel::Rotation,
];

pub(super) fn build(fields: &BTreeMap<Channel, Values>) -> Vec<PointDatum> {
    let (Some(x), Some(y)) = (fields.get(&Channel::X), fields.get(&Channel::Y)) else {
        return Vec::new();
    };
    if x.is_empty() || y.is_empty() {
        return Vec::new();
    }
    let len = common_length(CHANNELS.iter().filter_map(|channel| fields.get(channel)));
    let optional = |channel: Channel, index: usize| {
        fields
            .get(&channel)
            .filter(|values| !values.is_empty())
            .and_then(|values| values.get(index))
    };
    (0..len)
        .filter_map(|index| {
            Some(PointDatum {
                index,
                x: x.get(index)?,
                y: y.get(index)?,
                color: optional(Channel::Color, index),
                size: optional(Channel::Size, index).and_then(|v| v.as_number()),
                opacity: optional(Channel::Opacity, index).and_then(|v| v.as_number()),
                rotation: optional(Channel::Rotation, index).and_then(|v| v.as_number()),
            })
        })
        .collect()
}

pub(super) fn contributions(points: &[PointDatum]) -> BTreeMap<Channel, Values> {
    let mut out = BTreeMap::new();
    if points.is_empty() {
        return out;
    }
    out.insert(Channel::X, values_of(points.iter().map(|p| &p.x)));
    out.insert(Channel::Y, values_of(points.iter().map(|p| &p.y)));
    let colors: Vec<&Value> = points.iter().filter_map(|p| p.color.as_ref()).collect();
    if !colors.is_empty() {
        out.insert(Channel::Color, values_of(colors));
    }
    let numbers = |pick: fn(&PointDatum) -> Option<f64>| -> Option<Values> {
        let values: Vec<f64> = points.iter().filter_map(pick).collect();
        (!values.is_empty()).then_some(Values::Numbers(values))
    };
    if let Some(sizes) = numbers(|p| p.size) {
        out.insert(Channel::Size, sizes);
    }
    if let Some(opacities) = numbers(|p| p.opacity) {
        out.insert(Channel::Opacity, opacities);
    }
    if let Some(rotations) = numbers(|p| p.rotation) {
        out.insert(Channel::Rotation, rotations);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_channels_follow_truncation() {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::X, Values::Numbers(vec![0.0, 1.0, 2.0]));
        fields.insert(Channel::Y, Values::Numbers(vec![0.0, 1.0, 2.0]));
        fields.insert(Channel::Color, Values::from(vec!["a", "b"]));
        let points = build(&fields);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].color, Some(Value::Label("b".into())));

        let contributions = contributions(&points);
        assert_eq!(contributions[&Channel::X], Values::Numbers(vec![0.0, 1.0]));
        assert_eq!(contributions[&Channel::Color], Values::from(vec!["a", "b"]));
        assert!(!contributions.contains_key(&Channel::Size));
    }

    #[test]
    fn missing_position_yields_nothing() {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::X, Values::Numbers(vec![0.0]));
        assert!(build(&fields).is_empty());
    }
}
